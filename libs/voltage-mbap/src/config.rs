//! Client configuration

use figment::{
    providers::{Env, Format, Json, Serialized, Toml, Yaml},
    Figment,
};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

use crate::constants::{DEFAULT_CONNECT_TIMEOUT_MS, DEFAULT_TCP_PORT, DEFAULT_UNIT_ID};
use crate::error::{MbapError, Result};

/// Prefix for environment overrides (`MBAP_HOST`, `MBAP_PORT`, ...)
pub const ENV_PREFIX: &str = "MBAP_";

/// Connection parameters for a Modbus TCP server
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct ClientConfig {
    /// Server host name or IP address
    pub host: String,
    /// Server port
    pub port: u16,
    /// Unit identifier put on every request
    pub unit_id: u8,
    /// TCP connect timeout in milliseconds
    pub connect_timeout_ms: u64,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: DEFAULT_TCP_PORT,
            unit_id: DEFAULT_UNIT_ID,
            connect_timeout_ms: DEFAULT_CONNECT_TIMEOUT_MS,
        }
    }
}

impl ClientConfig {
    pub fn new(host: impl Into<String>, port: u16) -> Self {
        Self {
            host: host.into(),
            port,
            ..Self::default()
        }
    }

    /// Load from a toml, yaml or json file; missing keys take their defaults
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let extension = path
            .extension()
            .and_then(|s| s.to_str())
            .ok_or_else(|| MbapError::config("Config file must have an extension"))?;

        let figment = Figment::from(Serialized::defaults(Self::default()));
        let figment = match extension {
            "toml" => figment.merge(Toml::file(path)),
            "yaml" | "yml" => figment.merge(Yaml::file(path)),
            "json" => figment.merge(Json::file(path)),
            _ => {
                return Err(MbapError::Config(format!(
                    "Unsupported config file format: {}",
                    extension
                )))
            },
        };

        let config: Self = figment.extract()?;
        config.validate()?;
        Ok(config)
    }

    /// Defaults overridden by `MBAP_`-prefixed environment variables
    pub fn from_env() -> Result<Self> {
        let config: Self = Figment::from(Serialized::defaults(Self::default()))
            .merge(Env::prefixed(ENV_PREFIX))
            .extract()?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.host.trim().is_empty() {
            return Err(MbapError::config("host must not be empty"));
        }
        if self.port == 0 {
            return Err(MbapError::config("port must not be zero"));
        }
        Ok(())
    }

    /// `host:port` form accepted by `TcpStream::connect`
    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    pub fn connect_timeout(&self) -> Duration {
        Duration::from_millis(self.connect_timeout_ms)
    }
}

#[cfg(test)]
#[allow(clippy::disallowed_methods)] // Test code - unwrap is acceptable
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::Builder;

    fn write_config(suffix: &str, contents: &str) -> tempfile::NamedTempFile {
        let mut file = Builder::new().suffix(suffix).tempfile().unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        file
    }

    #[test]
    fn test_defaults() {
        let config = ClientConfig::default();
        assert_eq!(config.port, 502);
        assert_eq!(config.unit_id, 0);
        assert_eq!(config.connect_timeout(), Duration::from_secs(5));
        assert_eq!(config.address(), "127.0.0.1:502");
    }

    #[test]
    fn test_load_yaml_with_partial_keys() {
        let file = write_config(".yaml", "host: plc.local\nunit_id: 17\n");
        let config = ClientConfig::load_from_file(file.path()).unwrap();

        assert_eq!(config.host, "plc.local");
        assert_eq!(config.unit_id, 17);
        assert_eq!(config.port, 502);
    }

    #[test]
    fn test_load_toml() {
        let file = write_config(".toml", "host = \"10.0.0.5\"\nport = 1502\n");
        let config = ClientConfig::load_from_file(file.path()).unwrap();

        assert_eq!(config.address(), "10.0.0.5:1502");
    }

    #[test]
    fn test_load_json() {
        let file = write_config(".json", r#"{"host": "gw", "connect_timeout_ms": 250}"#);
        let config = ClientConfig::load_from_file(file.path()).unwrap();

        assert_eq!(config.host, "gw");
        assert_eq!(config.connect_timeout(), Duration::from_millis(250));
    }

    #[test]
    fn test_unsupported_extension() {
        let file = write_config(".ini", "host=gw");
        let err = ClientConfig::load_from_file(file.path()).unwrap_err();
        assert!(err.to_string().contains("Unsupported config file format"));
    }

    #[test]
    fn test_invalid_values_rejected() {
        let file = write_config(".yaml", "port: 0\n");
        assert!(matches!(
            ClientConfig::load_from_file(file.path()),
            Err(MbapError::Config(_))
        ));

        let file = write_config(".yaml", "host: \"  \"\n");
        assert!(ClientConfig::load_from_file(file.path()).is_err());

        let file = write_config(".yaml", "port: not-a-number\n");
        assert!(ClientConfig::load_from_file(file.path()).is_err());
    }

    #[test]
    fn test_from_env() {
        figment::Jail::expect_with(|jail| {
            jail.set_env("MBAP_HOST", "192.168.1.20");
            jail.set_env("MBAP_UNIT_ID", "3");

            let config = ClientConfig::from_env().map_err(|e| e.to_string())?;
            assert_eq!(config.host, "192.168.1.20");
            assert_eq!(config.unit_id, 3);
            assert_eq!(config.port, 502);
            Ok(())
        });
    }
}
