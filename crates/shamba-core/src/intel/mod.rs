//! Farm-Intelligence API client
//!
//! Typed, stateless client for the external weather / advisory / market /
//! simulation backend. Every call has a bounded timeout and returns an
//! `IntelError` instead of panicking or hanging, so the engine can render
//! a "data unavailable" reply and move on. No automatic retries; the
//! farmer re-issuing the command is the retry mechanism.

mod client;
mod types;

pub use client::{FarmIntel, IntelClient, IntelError};
pub use types::{
    Advisory, AdvisoryAlert, AdvisoryRecommendation, CurrentWeather, MarketPrice, ScenarioResult,
    Simulation, SimulationInputs, SimulationRecommendation, WeatherDay, WeatherForecast,
};
