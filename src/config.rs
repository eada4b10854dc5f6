//! Profile configuration
//!
//! Tunable behaviour of the Heart Rate Profile handler.  The host daemon
//! owns where this comes from; [`ProfileConfig::from_json`] covers the
//! common case of a JSON snippet in the daemon's own configuration.

use anyhow::Context;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// How the measurement characteristic is brought up after discovery.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SubscriptionFlow {
    /// Read the current value, store it, then enable notifications.
    ReadThenSubscribe,
    /// Enable notifications straight away.
    #[default]
    SubscribeOnly,
}

/// Capacity of [`ProfileConfig::name`].
pub const NAME_CAPACITY: usize = 32;

/// Name the profile registers under when none is configured.
pub const DEFAULT_NAME: &str = "heartrate-profile";

const _: () = assert!(DEFAULT_NAME.len() <= NAME_CAPACITY);

pub type ProfileName = heapless::String<NAME_CAPACITY>;

/// Core profile configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProfileConfig {
    /// Name the profile registers under with the daemon.
    pub name: ProfileName,
    /// Flow used for the Heart Rate Measurement characteristic.
    /// Body Sensor Location is always read first.
    pub measurement_flow: SubscriptionFlow,
}

impl Default for ProfileConfig {
    fn default() -> Self {
        Self {
            // Cannot fail, checked against NAME_CAPACITY at compile time.
            name: ProfileName::try_from(DEFAULT_NAME).unwrap_or_default(),
            measurement_flow: SubscriptionFlow::default(),
        }
    }
}

impl ProfileConfig {
    pub fn validate(&self) -> Result<()> {
        if self.name.is_empty() {
            return Err(Error::Config("profile name must not be empty"));
        }
        Ok(())
    }

    /// Parse and validate a JSON configuration.  Missing fields take
    /// their defaults.
    pub fn from_json(json: &str) -> anyhow::Result<Self> {
        let config: Self =
            serde_json::from_str(json).context("parsing heart rate profile config")?;
        config
            .validate()
            .context("validating heart rate profile config")?;
        Ok(config)
    }

    /// Compact binary form for persistent storage.
    pub fn to_bytes(&self) -> anyhow::Result<Vec<u8>> {
        postcard::to_allocvec(self)
            .map_err(|e| anyhow::anyhow!("encoding heart rate profile config: {e}"))
    }

    /// Inverse of [`to_bytes`](Self::to_bytes), validated.
    pub fn from_bytes(bytes: &[u8]) -> anyhow::Result<Self> {
        let config: Self = postcard::from_bytes(bytes)
            .map_err(|e| anyhow::anyhow!("decoding heart rate profile config: {e}"))?;
        config
            .validate()
            .context("validating heart rate profile config")?;
        Ok(config)
    }
}
