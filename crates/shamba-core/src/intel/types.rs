//! Farm-Intelligence payload types
//!
//! The backend is treated as an opaque JSON collaborator: optional fields
//! are modeled as `Option` or defaulted so a sparse response renders with
//! gaps instead of failing to decode.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// Current conditions block of a weather response
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CurrentWeather {
    #[serde(default)]
    pub conditions: Option<String>,
    #[serde(default)]
    pub temperature_c: Option<f64>,
    #[serde(default)]
    pub humidity_percent: Option<f64>,
    #[serde(default)]
    pub wind_speed_kmh: Option<f64>,
}

/// One forecast day
#[derive(Debug, Clone, Deserialize)]
pub struct WeatherDay {
    pub date: String,
    #[serde(default)]
    pub conditions: Option<String>,
    #[serde(default)]
    pub temp_min_c: Option<f64>,
    #[serde(default)]
    pub temp_max_c: Option<f64>,
    #[serde(default)]
    pub rainfall_mm: f64,
}

/// Weather forecast response
#[derive(Debug, Clone, Default, Deserialize)]
pub struct WeatherForecast {
    #[serde(default)]
    pub current: CurrentWeather,
    #[serde(default)]
    pub forecast: Vec<WeatherDay>,
}

impl WeatherForecast {
    /// Total rainfall over the first seven forecast days.
    pub fn weekly_rainfall_mm(&self) -> f64 {
        self.forecast.iter().take(7).map(|d| d.rainfall_mm).sum()
    }
}

/// Advisory alert
#[derive(Debug, Clone, Deserialize)]
pub struct AdvisoryAlert {
    #[serde(default)]
    pub priority: String,
    pub title: String,
    pub message: String,
}

/// Advisory recommendation line
#[derive(Debug, Clone, Deserialize)]
pub struct AdvisoryRecommendation {
    pub message: String,
}

/// Advisory response
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Advisory {
    #[serde(default)]
    pub alerts: Vec<AdvisoryAlert>,
    #[serde(default)]
    pub recommendations: Vec<AdvisoryRecommendation>,
    #[serde(default)]
    pub farm_health_score: Option<i64>,
}

/// Market price snapshot for one commodity at one location
#[derive(Debug, Clone, Deserialize)]
pub struct MarketPrice {
    pub commodity: String,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub current_price: Option<f64>,
    #[serde(default = "default_currency")]
    pub currency: String,
    #[serde(default = "default_unit")]
    pub unit: String,
    #[serde(default)]
    pub trend: Option<String>,
    #[serde(default)]
    pub price_change_7d_percent: Option<f64>,
    #[serde(default)]
    pub recommendation: Option<String>,
}

fn default_currency() -> String {
    "KES".to_string()
}

fn default_unit() -> String {
    "kg".to_string()
}

/// Controllable inputs for a yield simulation
#[derive(Debug, Clone, Serialize)]
pub struct SimulationInputs {
    pub fertilizer_dap_kg_ha: f64,
    pub fertilizer_urea_kg_ha: f64,
    pub irrigation_mm_week: f64,
    pub pesticide_applications: u32,
}

impl Default for SimulationInputs {
    fn default() -> Self {
        Self {
            fertilizer_dap_kg_ha: 50.0,
            fertilizer_urea_kg_ha: 25.0,
            irrigation_mm_week: 20.0,
            pesticide_applications: 2,
        }
    }
}

/// One simulated scenario
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ScenarioResult {
    #[serde(default)]
    pub predicted_yield_kg_ha: Option<f64>,
    #[serde(default)]
    pub total_yield_kg: Option<f64>,
    #[serde(default)]
    pub harvest_date_estimate: Option<String>,
    #[serde(default)]
    pub revenue_estimate_usd: Option<f64>,
    #[serde(default)]
    pub net_profit_usd: Option<f64>,
    #[serde(default)]
    pub roi_percent: Option<f64>,
}

/// Simulation recommendation line
#[derive(Debug, Clone, Deserialize)]
pub struct SimulationRecommendation {
    pub action: String,
}

/// Yield simulation response
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Simulation {
    #[serde(default)]
    pub results: HashMap<String, ScenarioResult>,
    #[serde(default)]
    pub recommendations: Vec<SimulationRecommendation>,
}

impl Simulation {
    /// The scenario the farmer asked about; "current" inputs.
    pub fn current(&self) -> Option<&ScenarioResult> {
        self.results.get("current")
    }
}
