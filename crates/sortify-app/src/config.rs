//! Environment-driven application configuration.

use std::env;
use std::path::PathBuf;
use std::time::Duration;

use sortify_client::{ClientConfig, DEFAULT_ENDPOINT, DEFAULT_TIMEOUT};
use sortify_gauge::{GaugeError, GaugePolicy, Palette};
use thiserror::Error;

/// Default recipient for support referrals.
pub const DEFAULT_SUPPORT_ADDRESS: &str = "support@sortify.ai";

/// Default log filter when neither `RUST_LOG` nor `SORTIFY_LOG` is set.
pub const DEFAULT_LOG_LEVEL: &str = "info";

/// Classification endpoint variable.
pub const ENDPOINT_VAR: &str = "SORTIFY_ENDPOINT";
/// Request timeout variable, in whole seconds.
pub const TIMEOUT_VAR: &str = "SORTIFY_TIMEOUT_SECS";
/// Gauge policy variable.
pub const POLICY_VAR: &str = "SORTIFY_GAUGE_POLICY";
/// Plain-http opt-in variable.
pub const INSECURE_HTTP_VAR: &str = "SORTIFY_ALLOW_INSECURE_HTTP";
/// Palette override file variable.
pub const PALETTE_VAR: &str = "SORTIFY_PALETTE_PATH";
/// Support referral recipient variable.
pub const SUPPORT_ADDRESS_VAR: &str = "SORTIFY_SUPPORT_ADDRESS";
/// Log filter variable.
pub const LOG_VAR: &str = "SORTIFY_LOG";

/// Resolved runtime configuration.
#[derive(Debug, Clone, PartialEq)]
pub struct AppConfig {
    /// Classification endpoint URL.
    pub endpoint: String,
    /// Upper bound for one classification call.
    pub timeout: Duration,
    /// Gauge positioning policy.
    pub policy: GaugePolicy,
    /// Permits plain `http` endpoints.
    pub allow_insecure_http: bool,
    /// Optional palette override file.
    pub palette_path: Option<PathBuf>,
    /// Support referral recipient.
    pub support_address: String,
    /// Fallback log filter.
    pub log_level: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_ENDPOINT.to_string(),
            timeout: DEFAULT_TIMEOUT,
            policy: GaugePolicy::Categorical,
            allow_insecure_http: false,
            palette_path: None,
            support_address: DEFAULT_SUPPORT_ADDRESS.to_string(),
            log_level: DEFAULT_LOG_LEVEL.to_string(),
        }
    }
}

impl AppConfig {
    /// Loads configuration from the process environment.
    ///
    /// A `.env` file is loaded first when present. `overrides` is consulted
    /// before the environment for every variable, so command-line values
    /// replace environment values before anything is validated.
    ///
    /// # Errors
    /// Returns [`ConfigError`] for values that are present but invalid.
    pub fn from_env_with<O>(overrides: O) -> Result<Self, ConfigError>
    where
        O: Fn(&str) -> Option<String>,
    {
        // Best-effort .env load; ignore if missing
        let _ = dotenvy::dotenv();
        Self::from_lookup(|key| overrides(key).or_else(|| env::var(key).ok()))
    }

    /// Loads configuration through an arbitrary variable lookup.
    ///
    /// # Errors
    /// Returns [`ConfigError`] for values that are present but invalid.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();
        let get = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());

        let timeout = match get(TIMEOUT_VAR) {
            Some(raw) => parse_timeout_secs(&raw)?,
            None => defaults.timeout,
        };

        let policy = match get(POLICY_VAR) {
            Some(raw) => raw.parse::<GaugePolicy>().map_err(ConfigError::Gauge)?,
            None => defaults.policy,
        };

        let allow_insecure_http = match get(INSECURE_HTTP_VAR) {
            Some(raw) => parse_flag(INSECURE_HTTP_VAR, &raw)?,
            None => defaults.allow_insecure_http,
        };

        Ok(Self {
            endpoint: get(ENDPOINT_VAR).unwrap_or(defaults.endpoint),
            timeout,
            policy,
            allow_insecure_http,
            palette_path: get(PALETTE_VAR).map(PathBuf::from),
            support_address: get(SUPPORT_ADDRESS_VAR).unwrap_or(defaults.support_address),
            log_level: get(LOG_VAR).unwrap_or(defaults.log_level),
        })
    }

    /// Client settings derived from this configuration.
    pub fn client_config(&self) -> ClientConfig {
        ClientConfig {
            timeout: self.timeout,
            allow_insecure_http: self.allow_insecure_http,
        }
    }

    /// Loads the palette, applying the override file when configured.
    ///
    /// # Errors
    /// Returns [`ConfigError::PaletteRead`] when the file cannot be read and
    /// [`ConfigError::Gauge`] when its contents are invalid.
    pub fn load_palette(&self) -> Result<Palette, ConfigError> {
        let Some(path) = &self.palette_path else {
            return Ok(Palette::default());
        };

        let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::PaletteRead {
            path: path.clone(),
            source,
        })?;
        Palette::from_json_str(&raw).map_err(ConfigError::Gauge)
    }
}

/// Parses a positive whole number of seconds.
///
/// # Errors
/// Returns [`ConfigError::InvalidValue`] for non-numeric or zero values.
pub fn parse_timeout_secs(raw: &str) -> Result<Duration, ConfigError> {
    match raw.trim().parse::<u64>() {
        Ok(0) | Err(_) => Err(ConfigError::InvalidValue {
            key: TIMEOUT_VAR,
            value: raw.to_string(),
            expected: "a positive number of seconds",
        }),
        Ok(secs) => Ok(Duration::from_secs(secs)),
    }
}

fn parse_flag(key: &'static str, raw: &str) -> Result<bool, ConfigError> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "on" | "yes" => Ok(true),
        "0" | "false" | "off" | "no" => Ok(false),
        _ => Err(ConfigError::InvalidValue {
            key,
            value: raw.to_string(),
            expected: "one of 1/0, true/false, on/off, yes/no",
        }),
    }
}

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// A variable is set to an unusable value.
    #[error("invalid {key}={value:?}: expected {expected}")]
    InvalidValue {
        /// Variable name.
        key: &'static str,
        /// Offending value.
        value: String,
        /// Accepted form.
        expected: &'static str,
    },
    /// Palette file could not be read.
    #[error("cannot read palette file {}: {source}", .path.display())]
    PaletteRead {
        /// Palette path.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },
    /// Gauge setting (policy or palette) is invalid.
    #[error(transparent)]
    Gauge(GaugeError),
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(key, value)| (key.to_string(), value.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn defaults_when_unset() {
        let config = AppConfig::from_lookup(lookup(&[])).expect("defaults should load");
        assert_eq!(config, AppConfig::default());
        assert_eq!(config.timeout, Duration::from_secs(10));
    }

    #[test]
    fn overrides_are_applied() {
        let config = AppConfig::from_lookup(lookup(&[
            ("SORTIFY_ENDPOINT", "http://localhost:9000/classify"),
            ("SORTIFY_TIMEOUT_SECS", "3"),
            ("SORTIFY_GAUGE_POLICY", "banded"),
            ("SORTIFY_ALLOW_INSECURE_HTTP", "on"),
            ("SORTIFY_SUPPORT_ADDRESS", "triage@example.test"),
        ]))
        .expect("overrides should load");

        assert_eq!(config.endpoint, "http://localhost:9000/classify");
        assert_eq!(config.timeout, Duration::from_secs(3));
        assert_eq!(config.policy, GaugePolicy::Banded);
        assert!(config.client_config().allow_insecure_http);
        assert_eq!(config.support_address, "triage@example.test");
    }

    #[test]
    fn rejects_invalid_values() {
        assert!(AppConfig::from_lookup(lookup(&[("SORTIFY_TIMEOUT_SECS", "0")])).is_err());
        assert!(AppConfig::from_lookup(lookup(&[("SORTIFY_TIMEOUT_SECS", "soon")])).is_err());
        assert!(AppConfig::from_lookup(lookup(&[("SORTIFY_GAUGE_POLICY", "continuous")])).is_err());
        assert!(
            AppConfig::from_lookup(lookup(&[("SORTIFY_ALLOW_INSECURE_HTTP", "maybe")])).is_err()
        );
    }
}
