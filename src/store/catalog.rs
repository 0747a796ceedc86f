//! Unit catalog client
//!
//! Fetches unit records from `{base}/api/units/{id}`. Only the `sounds` map is
//! interpreted; every other field is kept as opaque JSON.

use super::{base_url, http_client};
use crate::config::StoreConfig;
use crate::params::{validate, Validation};
use anyhow::{bail, Context, Result};
use serde::Deserialize;
use serde_json::{Map, Value};
use std::collections::BTreeMap;

/// A unit as served by the catalog
#[derive(Debug, Clone, Deserialize)]
pub struct UnitRecord {
    #[serde(default)]
    pub name: Option<String>,

    /// Sound name -> parameter vector
    #[serde(default)]
    pub sounds: BTreeMap<String, Value>,

    /// Stats, attack configuration, sprite frames and the rest
    #[serde(flatten)]
    pub other: Map<String, Value>,
}

impl UnitRecord {
    pub fn sound_names(&self) -> impl Iterator<Item = &str> {
        self.sounds.keys().map(String::as_str)
    }

    /// Validate a named sound, if the unit has it
    pub fn sound(&self, name: &str) -> Option<Validation> {
        self.sounds.get(name).map(validate)
    }
}

/// Read-only client for unit records
pub struct UnitCatalog {
    client: reqwest::Client,
    base_url: String,
}

impl UnitCatalog {
    pub fn new(config: &StoreConfig) -> Result<Self> {
        Ok(Self {
            client: http_client(config)?,
            base_url: base_url(config),
        })
    }

    fn unit_url(&self, id: &str) -> String {
        format!("{}/api/units/{}", self.base_url, urlencoding::encode(id))
    }

    /// Fetch one unit by id
    pub async fn fetch_unit(&self, id: &str) -> Result<UnitRecord> {
        let response = self
            .client
            .get(self.unit_url(id))
            .send()
            .await
            .with_context(|| format!("failed to fetch unit '{}'", id))?;

        if !response.status().is_success() {
            bail!("unit catalog returned status {} for '{}'", response.status(), id);
        }

        response
            .json::<UnitRecord>()
            .await
            .with_context(|| format!("failed to parse unit '{}'", id))
    }
}
