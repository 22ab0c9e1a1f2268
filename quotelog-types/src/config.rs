//! Configuration types shared by the scheduler, the store and the binaries.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::QuotelogError;

/// UTC hour window during which the market is considered open.
///
/// The market is open when `open_after_hour < hour < close_before_hour`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MarketHours {
    /// Last UTC hour (exclusive) before the open window.
    pub open_after_hour: u32,
    /// First UTC hour (exclusive) after the open window.
    pub close_before_hour: u32,
}

impl Default for MarketHours {
    fn default() -> Self {
        Self {
            open_after_hour: 12,
            close_before_hour: 21,
        }
    }
}

/// Polling configuration, usually read from a `parameters.json` file.
///
/// Only `tickers` is required; every other key has a default.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PollerConfig {
    /// Instrument identifiers in round-robin polling order.
    pub tickers: Vec<String>,
    /// Global ceiling on quote source calls per hour.
    pub calls_per_hour: f64,
    /// Directory holding the daily files.
    pub data_dir: PathBuf,
    /// Snapshot field that carries the instrument identifier.
    pub identifier_field: String,
    /// Open/closed policy for the market clock.
    pub market_hours: MarketHours,
    /// Upper bound on a single quote source call, in seconds.
    pub provider_timeout_secs: u64,
}

impl Default for PollerConfig {
    fn default() -> Self {
        Self {
            tickers: Vec::new(),
            calls_per_hour: 400.0,
            data_dir: PathBuf::from("workdir"),
            identifier_field: "symbol".to_string(),
            market_hours: MarketHours::default(),
            provider_timeout_secs: 30,
        }
    }
}

impl PollerConfig {
    /// Parse a JSON parameters document and validate it.
    ///
    /// # Errors
    /// Returns `ConfigInvalid` if the document is not valid JSON for this shape or if
    /// [`validate`](Self::validate) rejects it.
    pub fn from_json_str(json: &str) -> Result<Self, QuotelogError> {
        let cfg: Self = serde_json::from_str(json)
            .map_err(|e| QuotelogError::config(format!("parameters: {e}")))?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// Read and validate a JSON parameters file.
    ///
    /// # Errors
    /// Returns `ConfigInvalid` if the file cannot be read or fails validation.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, QuotelogError> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path)
            .map_err(|e| QuotelogError::config(format!("{}: {e}", path.display())))?;
        Self::from_json_str(&raw)
    }

    /// Check every startup invariant.
    ///
    /// # Errors
    /// Returns `ConfigInvalid` when the ticker list is empty or has blank, duplicate
    /// or path-like entries, when `calls_per_hour` is not a positive finite number,
    /// when the market hours are out of range, or when the timeout or identifier
    /// field is empty.
    pub fn validate(&self) -> Result<(), QuotelogError> {
        if self.tickers.is_empty() {
            return Err(QuotelogError::config("tickers must not be empty"));
        }
        for (i, t) in self.tickers.iter().enumerate() {
            if t.trim().is_empty() {
                return Err(QuotelogError::config(format!("ticker #{i} is blank")));
            }
            if t.contains(['/', '\\']) || t == "." || t == ".." {
                return Err(QuotelogError::config(format!(
                    "ticker {t:?} cannot be used in a file name"
                )));
            }
            if self.tickers[..i].contains(t) {
                return Err(QuotelogError::config(format!("ticker {t:?} listed twice")));
            }
        }
        if !(self.calls_per_hour.is_finite() && self.calls_per_hour > 0.0) {
            return Err(QuotelogError::config(format!(
                "calls_per_hour must be a positive number, got {}",
                self.calls_per_hour
            )));
        }
        let MarketHours {
            open_after_hour,
            close_before_hour,
        } = self.market_hours;
        if close_before_hour > 24 || open_after_hour >= close_before_hour {
            return Err(QuotelogError::config(format!(
                "market_hours must satisfy open_after_hour < close_before_hour <= 24, got {open_after_hour}..{close_before_hour}"
            )));
        }
        if self.identifier_field.trim().is_empty() {
            return Err(QuotelogError::config("identifier_field must not be empty"));
        }
        if self.provider_timeout_secs == 0 {
            return Err(QuotelogError::config(
                "provider_timeout_secs must be greater than zero",
            ));
        }
        Ok(())
    }

    /// Per-call timeout as a `Duration`.
    #[must_use]
    pub const fn provider_timeout(&self) -> Duration {
        Duration::from_secs(self.provider_timeout_secs)
    }
}
