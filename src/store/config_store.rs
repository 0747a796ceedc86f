//! HTTP configuration store
//!
//! Reads and writes the stored output volume at `{base}/api/config2`.

use super::{base_url, http_client, VolumeStore};
use crate::config::StoreConfig;
use crate::engine::SharedEngine;
use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tokio::runtime::Handle;
use tokio::task::JoinHandle;

/// Body of `GET /api/config2`; other settings are ignored
#[derive(Debug, Deserialize)]
struct ConfigPayload {
    #[serde(default)]
    volume: Option<f64>,
}

/// Body of `POST /api/config2`
#[derive(Debug, Serialize)]
struct VolumeUpdate {
    volume: u8,
}

/// Configuration store reached over HTTP
#[derive(Clone)]
pub struct HttpConfigStore {
    client: reqwest::Client,
    base_url: String,
    runtime: Handle,
}

impl HttpConfigStore {
    /// Create a store whose background requests run on `runtime`
    pub fn new(config: &StoreConfig, runtime: Handle) -> Result<Self> {
        Ok(Self {
            client: http_client(config)?,
            base_url: base_url(config),
            runtime,
        })
    }

    fn config_url(&self) -> String {
        format!("{}/api/config2", self.base_url)
    }

    /// Fetch the stored volume in percent, if one has been saved
    pub async fn fetch_volume(&self) -> Result<Option<u8>> {
        let response = self
            .client
            .get(self.config_url())
            .send()
            .await
            .context("failed to fetch config")?;

        if !response.status().is_success() {
            bail!("config store returned status {}", response.status());
        }

        let payload = response
            .json::<ConfigPayload>()
            .await
            .context("failed to parse config response")?;

        Ok(stored_percent(&payload))
    }

    /// Write a volume in percent
    pub async fn store_volume(&self, percent: u8) -> Result<()> {
        let response = self
            .client
            .post(self.config_url())
            .json(&VolumeUpdate { volume: percent })
            .send()
            .await
            .context("failed to post config")?;

        if !response.status().is_success() {
            bail!("config store returned status {}", response.status());
        }
        Ok(())
    }

    /// Fetch the stored volume in the background and apply it to `engine`
    /// without persisting it again.
    pub fn restore_into(&self, engine: SharedEngine) -> JoinHandle<()> {
        let store = self.clone();
        self.runtime.spawn(async move {
            match store.fetch_volume().await {
                Ok(Some(percent)) => match engine.lock() {
                    Ok(mut engine) => engine.restore_volume(percent),
                    Err(_) => log::warn!(target: "store", "engine lock poisoned, stored volume ignored"),
                },
                Ok(None) => log::debug!(target: "store", "no stored volume"),
                Err(e) => log::warn!(target: "store", "could not load stored volume: {:#}", e),
            }
        })
    }

    /// Restore the stored volume into `engine`, giving up after `wait`.
    ///
    /// A restore that misses the deadline is aborted so a late answer cannot
    /// override volume changes made after it. Returns whether it finished.
    pub async fn restore_within(&self, engine: SharedEngine, wait: Duration) -> bool {
        let mut restore = self.restore_into(engine);
        if tokio::time::timeout(wait, &mut restore).await.is_ok() {
            return true;
        }
        restore.abort();
        false
    }
}

impl VolumeStore for HttpConfigStore {
    fn persist(&self, percent: u8) {
        let store = self.clone();
        self.runtime.spawn(async move {
            if let Err(e) = store.store_volume(percent).await {
                log::warn!(target: "store", "could not save volume {}%: {:#}", percent, e);
            }
        });
    }
}

/// Stored volume as a percent, ignoring values that are not a usable number
fn stored_percent(payload: &ConfigPayload) -> Option<u8> {
    payload
        .volume
        .filter(|v| v.is_finite())
        .map(|v| v.round().clamp(0.0, 100.0) as u8)
}
