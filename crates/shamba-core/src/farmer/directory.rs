//! Farmer directory backed by the external Farmer Service
//!
//! Resolution never fails: unknown numbers and unreachable backends fall
//! back to the demo roster, then to a generic default profile, so the
//! conversation always has a farmer to talk to.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use reqwest::Client;
use tokio::sync::RwLock;
use tracing::{debug, warn};

use crate::config::FarmerServiceConfig;
use crate::farmer::types::{FarmerProfile, Language};

/// Phone-number to profile lookup with demo-data fallback
pub struct FarmerDirectory {
    client: Client,
    base_url: Option<String>,
    demo_roster: HashMap<String, FarmerProfile>,
    /// Language choices persisted via the toggle intent
    language_overrides: Arc<RwLock<HashMap<String, Language>>>,
}

impl FarmerDirectory {
    /// Create a directory from config.
    pub fn new(config: &FarmerServiceConfig) -> Self {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .unwrap_or_default();

        Self {
            client,
            base_url: config.base_url.clone(),
            demo_roster: demo_roster(),
            language_overrides: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    /// Create a directory with demo data only (for tests and local runs).
    pub fn demo_only() -> Self {
        Self::new(&FarmerServiceConfig::default())
    }

    /// Resolve a phone number to a profile. Never fails.
    pub async fn resolve(&self, phone: &str) -> FarmerProfile {
        let mut profile = match self.fetch_remote(phone).await {
            Some(profile) => profile,
            None => self
                .demo_roster
                .get(phone)
                .cloned()
                .unwrap_or_else(|| FarmerProfile::default_for(phone)),
        };

        if let Some(lang) = self.language_overrides.read().await.get(phone) {
            profile.language = *lang;
        }

        profile
    }

    /// Persist a language preference chosen via the toggle intent.
    pub async fn set_language(&self, phone: &str, language: Language) {
        self.language_overrides
            .write()
            .await
            .insert(phone.to_string(), language);
    }

    async fn fetch_remote(&self, phone: &str) -> Option<FarmerProfile> {
        let base_url = self.base_url.as_ref()?;
        let url = format!("{}/api/v1/farmers/{}", base_url, phone);

        debug!("Looking up farmer at {}", url);
        match self.client.get(&url).send().await {
            Ok(response) if response.status().is_success() => {
                match response.json::<FarmerProfile>().await {
                    Ok(profile) => Some(profile),
                    Err(e) => {
                        warn!("Farmer service returned malformed profile: {}", e);
                        None
                    }
                }
            }
            Ok(response) => {
                debug!("Farmer service returned {} for {}", response.status(), phone);
                None
            }
            Err(e) => {
                warn!("Farmer service unreachable: {}", e);
                None
            }
        }
    }
}

/// Seeded demo farmers, mirroring the pilot roster.
fn demo_roster() -> HashMap<String, FarmerProfile> {
    let mut roster = HashMap::new();

    roster.insert(
        "+254115568694".to_string(),
        FarmerProfile {
            phone: "+254115568694".to_string(),
            name: "Test Farmer".to_string(),
            location: "Nairobi County".to_string(),
            latitude: -1.2921,
            longitude: 36.8219,
            crops: vec!["onions".to_string()],
            farm_size_ha: 2.5,
            language: Language::En,
            points: 2450,
            level: "Sustainable Pioneer".to_string(),
        },
    );

    roster.insert(
        "+254111548797".to_string(),
        FarmerProfile {
            phone: "+254111548797".to_string(),
            name: "Test2".to_string(),
            location: "Loresho KARLO".to_string(),
            latitude: -1.2,
            longitude: 36.9,
            crops: vec!["honey".to_string()],
            farm_size_ha: 5.0,
            language: Language::Kik,
            points: 1890,
            level: "Eco Beekeeper".to_string(),
        },
    );

    roster
}
