//! HTTP implementation of the Farm-Intelligence client

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde_json::json;
use thiserror::Error;
use tracing::{debug, warn};

use crate::config::IntelConfig;
use crate::intel::types::{
    Advisory, MarketPrice, Simulation, SimulationInputs, WeatherForecast,
};

/// Failure marker for Farm-Intelligence calls.
///
/// The engine never surfaces these to the farmer directly; they collapse
/// into the "data unavailable" apology.
#[derive(Error, Debug)]
pub enum IntelError {
    #[error("request failed: {0}")]
    Request(String),

    #[error("backend returned status {0}")]
    Status(u16),

    #[error("malformed response: {0}")]
    Decode(String),
}

impl From<reqwest::Error> for IntelError {
    fn from(err: reqwest::Error) -> Self {
        IntelError::Request(err.to_string())
    }
}

/// The four Farm-Intelligence lookups the engine dispatches to.
///
/// A trait so the engine can be tested against a scripted fake.
#[async_trait]
pub trait FarmIntel: Send + Sync {
    async fn weather_forecast(
        &self,
        latitude: f64,
        longitude: f64,
        days: u8,
    ) -> Result<WeatherForecast, IntelError>;

    async fn advisory(
        &self,
        farmer_id: &str,
        latitude: f64,
        longitude: f64,
        crop: &str,
        farm_size_ha: f64,
    ) -> Result<Advisory, IntelError>;

    async fn market_price(&self, commodity: &str, location: &str)
        -> Result<MarketPrice, IntelError>;

    async fn simulate_yield(
        &self,
        latitude: f64,
        longitude: f64,
        crop: &str,
        planting_date: &str,
        farm_size_ha: f64,
        inputs: &SimulationInputs,
    ) -> Result<Simulation, IntelError>;
}

/// HTTP client for the Farm-Intelligence backend
#[derive(Debug, Clone)]
pub struct IntelClient {
    client: Client,
    base_url: String,
}

impl IntelClient {
    /// Create a client from config.
    pub fn new(config: &IntelConfig) -> Self {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .unwrap_or_default();

        Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
        }
    }

    async fn post_json<T: DeserializeOwned>(
        &self,
        path: &str,
        body: serde_json::Value,
    ) -> Result<T, IntelError> {
        let url = format!("{}{}", self.base_url, path);
        debug!("POST {}", url);

        let response = self.client.post(&url).json(&body).send().await?;
        if !response.status().is_success() {
            warn!("Intel backend returned {} for {}", response.status(), path);
            return Err(IntelError::Status(response.status().as_u16()));
        }

        response
            .json::<T>()
            .await
            .map_err(|e| IntelError::Decode(e.to_string()))
    }

    async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T, IntelError> {
        let url = format!("{}{}", self.base_url, path);
        debug!("GET {}", url);

        let response = self.client.get(&url).send().await?;
        if !response.status().is_success() {
            warn!("Intel backend returned {} for {}", response.status(), path);
            return Err(IntelError::Status(response.status().as_u16()));
        }

        response
            .json::<T>()
            .await
            .map_err(|e| IntelError::Decode(e.to_string()))
    }
}

#[async_trait]
impl FarmIntel for IntelClient {
    async fn weather_forecast(
        &self,
        latitude: f64,
        longitude: f64,
        days: u8,
    ) -> Result<WeatherForecast, IntelError> {
        self.post_json(
            "/api/v1/weather/forecast",
            json!({
                "latitude": latitude,
                "longitude": longitude,
                "days": days,
            }),
        )
        .await
    }

    async fn advisory(
        &self,
        farmer_id: &str,
        latitude: f64,
        longitude: f64,
        crop: &str,
        farm_size_ha: f64,
    ) -> Result<Advisory, IntelError> {
        self.post_json(
            "/api/v1/advisory",
            json!({
                "farmer_id": farmer_id,
                "latitude": latitude,
                "longitude": longitude,
                "crop": crop,
                "farm_size_ha": farm_size_ha,
            }),
        )
        .await
    }

    async fn market_price(
        &self,
        commodity: &str,
        location: &str,
    ) -> Result<MarketPrice, IntelError> {
        let path = format!(
            "/api/v1/market/prices?commodity={}&location={}",
            commodity, location
        );
        self.get_json(&path).await
    }

    async fn simulate_yield(
        &self,
        latitude: f64,
        longitude: f64,
        crop: &str,
        planting_date: &str,
        farm_size_ha: f64,
        inputs: &SimulationInputs,
    ) -> Result<Simulation, IntelError> {
        self.post_json(
            "/api/v1/simulate",
            json!({
                "latitude": latitude,
                "longitude": longitude,
                "crop": crop,
                "planting_date": planting_date,
                "farm_size_ha": farm_size_ha,
                "inputs": inputs,
                "scenarios": ["current", "optimal"],
            }),
        )
        .await
    }
}
