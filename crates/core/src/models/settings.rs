use serde::{Deserialize, Serialize};

use crate::errors::CoreError;
use crate::services::series_service::GrowthModel;

/// Default CryptoRank API root.
pub const DEFAULT_API_BASE_URL: &str = "https://api.cryptorank.io/v2";

/// Dashboard configuration.
///
/// Plain serde data so a frontend can keep it as JSON next to its own state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Settings {
    /// Shape of the simulated post-investment growth
    #[serde(default)]
    pub growth: GrowthModel,

    /// How many funds to request per refresh
    #[serde(default = "default_fund_limit")]
    pub fund_limit: usize,

    /// CryptoRank API root (overridable for proxies and tests)
    #[serde(default = "default_api_base_url")]
    pub api_base_url: String,
}

fn default_fund_limit() -> usize {
    10
}

fn default_api_base_url() -> String {
    DEFAULT_API_BASE_URL.to_string()
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            growth: GrowthModel::default(),
            fund_limit: default_fund_limit(),
            api_base_url: default_api_base_url(),
        }
    }
}

impl Settings {
    /// Parse settings from JSON; missing fields take their defaults.
    pub fn from_json(json: &str) -> Result<Self, CoreError> {
        let settings: Settings = serde_json::from_str(json)?;
        settings.validate()?;
        Ok(settings)
    }

    pub fn to_json(&self) -> Result<String, CoreError> {
        serde_json::to_string_pretty(self).map_err(|e| CoreError::Serialization(e.to_string()))
    }

    pub fn validate(&self) -> Result<(), CoreError> {
        self.growth.validate()?;
        if !(1..=100).contains(&self.fund_limit) {
            return Err(CoreError::ValidationError(format!(
                "fund_limit must be between 1 and 100, got {}",
                self.fund_limit
            )));
        }
        if self.api_base_url.trim().is_empty() {
            return Err(CoreError::ValidationError("api_base_url must not be empty".into()));
        }
        Ok(())
    }
}
