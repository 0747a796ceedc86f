//! Remote storage
//!
//! The configuration store keeps the user's output volume; the unit catalog
//! serves unit records whose `sounds` map holds parameter vectors.

mod catalog;
mod config_store;

pub use catalog::{UnitCatalog, UnitRecord};
pub use config_store::HttpConfigStore;

use crate::config::StoreConfig;
use anyhow::{Context, Result};
use std::time::Duration;

/// Somewhere to push volume changes
pub trait VolumeStore: Send + Sync {
    /// Persist a volume in percent (0-100) without waiting for the outcome.
    ///
    /// Failures are logged by the implementation and otherwise ignored.
    fn persist(&self, percent: u8);
}

/// Convert a linear gain to a stored percent
pub fn volume_to_percent(level: f64) -> u8 {
    if !level.is_finite() {
        return 0;
    }
    (level * 100.0).round().clamp(0.0, 100.0) as u8
}

fn http_client(config: &StoreConfig) -> Result<reqwest::Client> {
    reqwest::Client::builder()
        .timeout(Duration::from_secs(config.timeout_secs))
        .build()
        .context("failed to build HTTP client")
}

fn base_url(config: &StoreConfig) -> String {
    config.base_url.trim_end_matches('/').to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_volume_to_percent() {
        assert_eq!(volume_to_percent(0.0), 0);
        assert_eq!(volume_to_percent(0.5), 50);
        assert_eq!(volume_to_percent(0.333), 33);
        assert_eq!(volume_to_percent(0.335), 34);
        assert_eq!(volume_to_percent(1.0), 100);
    }

    #[test]
    fn test_volume_to_percent_clamps() {
        assert_eq!(volume_to_percent(-0.2), 0);
        assert_eq!(volume_to_percent(3.0), 100);
        assert_eq!(volume_to_percent(f64::NAN), 0);
    }

    #[test]
    fn test_base_url_trims_slash() {
        let config = StoreConfig {
            base_url: "http://localhost:3000/".to_string(),
            timeout_secs: 5,
        };
        assert_eq!(base_url(&config), "http://localhost:3000");
    }
}
