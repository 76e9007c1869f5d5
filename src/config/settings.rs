use serde::{Deserialize, Serialize};
use std::env;
use std::path::{Path, PathBuf};

use crate::models::ProtocolKind;

/// Connection settings for one protocol adapter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProtocolConfig {
    pub api_url: String,
    /// Serve the in-memory catalog instead of calling the live endpoint
    pub enable_mock_data: bool,
    pub request_timeout_secs: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingSettings {
    pub level: String,
    /// "compact" or "pretty"
    pub format: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    pub config_dir: PathBuf,
    pub logging: LoggingSettings,
    pub helix: ProtocolConfig,
    pub hydro: ProtocolConfig,
    pub neptune: ProtocolConfig,
}

impl ProtocolConfig {
    /// Defaults for a protocol: its public API URL with mock data enabled
    pub fn for_protocol(protocol: ProtocolKind) -> Self {
        ProtocolConfig {
            api_url: protocol.default_api_url(),
            enable_mock_data: true,
            request_timeout_secs: 30,
        }
    }

    pub fn live(api_url: impl Into<String>) -> Self {
        ProtocolConfig {
            api_url: api_url.into(),
            enable_mock_data: false,
            request_timeout_secs: 30,
        }
    }

    /// Read `<config_dir>/<protocol>.{yaml,toml,json,...}` then `<PROTOCOL>_*` env overrides.
    ///
    /// The file is optional; its absence leaves the protocol defaults in place.
    pub fn try_load(protocol: ProtocolKind, config_dir: impl AsRef<Path>) -> Result<Self, config::ConfigError> {
        let defaults = Self::for_protocol(protocol);
        let file = config_dir.as_ref().join(protocol.id());

        let settings = config::Config::builder()
            .set_default("api_url", defaults.api_url)?
            .set_default("enable_mock_data", defaults.enable_mock_data)?
            .set_default("request_timeout_secs", defaults.request_timeout_secs as i64)?
            .add_source(config::File::with_name(&file.to_string_lossy()).required(false))
            .add_source(
                config::Environment::with_prefix(&protocol.id().to_uppercase()).try_parsing(true),
            )
            .build()?;

        settings.try_deserialize()
    }

    /// Like [`try_load`](Self::try_load) but a malformed file is logged and replaced by defaults
    pub fn load(protocol: ProtocolKind, config_dir: impl AsRef<Path>) -> Self {
        match Self::try_load(protocol, config_dir.as_ref()) {
            Ok(config) => config,
            Err(e) => {
                tracing::error!(
                    protocol = %protocol,
                    dir = %config_dir.as_ref().display(),
                    error = %e,
                    "Failed to load protocol config, using defaults"
                );
                Self::for_protocol(protocol)
            }
        }
    }
}

impl Default for LoggingSettings {
    fn default() -> Self {
        LoggingSettings {
            level: "info".to_string(),
            format: "compact".to_string(),
        }
    }
}

impl Default for Settings {
    fn default() -> Self {
        Settings {
            config_dir: PathBuf::from("config"),
            logging: LoggingSettings::default(),
            helix: ProtocolConfig::for_protocol(ProtocolKind::Helix),
            hydro: ProtocolConfig::for_protocol(ProtocolKind::Hydro),
            neptune: ProtocolConfig::for_protocol(ProtocolKind::Neptune),
        }
    }
}

impl Settings {
    /// Load `.env`, then every protocol config from `CONFIG_DIR` (default `config/`)
    pub fn new() -> Self {
        dotenvy::dotenv().ok();
        let config_dir = env::var("CONFIG_DIR").unwrap_or_else(|_| "config".to_string());
        let mut settings = Self::from_dir(config_dir);
        settings.logging = LoggingSettings {
            level: env::var("LOG_LEVEL").unwrap_or_else(|_| "info".to_string()),
            format: env::var("LOG_FORMAT").unwrap_or_else(|_| "compact".to_string()),
        };
        settings
    }

    pub fn from_dir(config_dir: impl Into<PathBuf>) -> Self {
        let config_dir = config_dir.into();
        Settings {
            helix: ProtocolConfig::load(ProtocolKind::Helix, &config_dir),
            hydro: ProtocolConfig::load(ProtocolKind::Hydro, &config_dir),
            neptune: ProtocolConfig::load(ProtocolKind::Neptune, &config_dir),
            logging: LoggingSettings::default(),
            config_dir,
        }
    }

    pub fn protocol(&self, protocol: ProtocolKind) -> &ProtocolConfig {
        match protocol {
            ProtocolKind::Helix => &self.helix,
            ProtocolKind::Hydro => &self.hydro,
            ProtocolKind::Neptune => &self.neptune,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_file_yields_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = ProtocolConfig::load(ProtocolKind::Neptune, dir.path());
        assert_eq!(config.api_url, "https://neptune.injective.network/api");
        assert!(config.enable_mock_data);
        assert_eq!(config.request_timeout_secs, 30);
    }

    #[test]
    fn test_yaml_file_overrides_defaults() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join("hydro.yaml"),
            "api_url: http://localhost:9000/api\nenable_mock_data: false\n",
        )
        .unwrap();

        let config = ProtocolConfig::try_load(ProtocolKind::Hydro, dir.path()).unwrap();
        assert_eq!(config.api_url, "http://localhost:9000/api");
        assert!(!config.enable_mock_data);
        assert_eq!(config.request_timeout_secs, 30);
    }

    #[test]
    fn test_malformed_file_falls_back_to_defaults() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("helix.toml"), "enable_mock_data = \"sometimes\"\n").unwrap();

        assert!(ProtocolConfig::try_load(ProtocolKind::Helix, dir.path()).is_err());
        let config = ProtocolConfig::load(ProtocolKind::Helix, dir.path());
        assert_eq!(config, ProtocolConfig::for_protocol(ProtocolKind::Helix));
    }
}
