//! Farmer profile types

use serde::{Deserialize, Serialize};

/// Supported conversation languages
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    /// English
    #[default]
    En,
    /// Kikuyu
    Kik,
}

impl Language {
    /// The other language; toggling twice returns to the original.
    pub fn toggled(self) -> Self {
        match self {
            Language::En => Language::Kik,
            Language::Kik => Language::En,
        }
    }

    /// Display name shown in the menu
    pub fn display_name(self) -> &'static str {
        match self {
            Language::En => "English",
            Language::Kik => "Kikuyu",
        }
    }
}

/// A farmer as known to the directory
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FarmerProfile {
    /// Phone number in E.164 format (primary key)
    pub phone: String,
    /// Display name
    pub name: String,
    /// Human-readable location label
    pub location: String,
    /// Farm latitude
    pub latitude: f64,
    /// Farm longitude
    pub longitude: f64,
    /// Crops grown; the first entry is the default for price and
    /// advisory lookups
    pub crops: Vec<String>,
    /// Farm size in hectares
    pub farm_size_ha: f64,
    /// Preferred conversation language
    #[serde(default)]
    pub language: Language,
    /// Starting points balance, used to seed the ledger on first contact
    #[serde(default)]
    pub points: u32,
    /// Display level label
    #[serde(default)]
    pub level: String,
}

impl FarmerProfile {
    /// Generic fallback profile for unknown numbers.
    pub fn default_for(phone: &str) -> Self {
        Self {
            phone: phone.to_string(),
            name: "Farmer".to_string(),
            location: "Unknown".to_string(),
            latitude: -1.2921,
            longitude: 36.8219,
            crops: vec!["maize".to_string()],
            farm_size_ha: 1.0,
            language: Language::En,
            points: 0,
            level: level_for(0).to_string(),
        }
    }

    /// Default crop for price and advisory lookups.
    pub fn default_crop(&self) -> &str {
        self.crops.first().map(String::as_str).unwrap_or("maize")
    }

    /// Stable farmer id derived from the phone number, matching the id
    /// format the backend expects.
    pub fn farmer_id(&self) -> String {
        let digits: String = self.phone.chars().filter(|c| c.is_ascii_digit()).collect();
        let suffix = &digits[digits.len().saturating_sub(6)..];
        format!("farmer_{}", suffix)
    }
}

/// Display level for a lifetime points balance.
pub fn level_for(points: u32) -> &'static str {
    if points >= 1500 {
        "Sustainable Pioneer"
    } else if points >= 500 {
        "Growing Farmer"
    } else {
        "New Farmer"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_language_toggle_roundtrip() {
        assert_eq!(Language::En.toggled(), Language::Kik);
        assert_eq!(Language::En.toggled().toggled(), Language::En);
        assert_eq!(Language::Kik.toggled().toggled(), Language::Kik);
    }

    #[test]
    fn test_default_profile() {
        let profile = FarmerProfile::default_for("+254700000001");
        assert_eq!(profile.name, "Farmer");
        assert_eq!(profile.default_crop(), "maize");
        assert_eq!(profile.points, 0);
        assert_eq!(profile.language, Language::En);
        assert!((profile.farm_size_ha - 1.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_farmer_id_uses_last_six_digits() {
        let profile = FarmerProfile::default_for("+254712345678");
        assert_eq!(profile.farmer_id(), "farmer_345678");
    }

    #[test]
    fn test_level_thresholds() {
        assert_eq!(level_for(0), "New Farmer");
        assert_eq!(level_for(499), "New Farmer");
        assert_eq!(level_for(500), "Growing Farmer");
        assert_eq!(level_for(1500), "Sustainable Pioneer");
        assert_eq!(level_for(2450), "Sustainable Pioneer");
    }
}
