//! Config editor settings
//!
//! Handles TOML settings parsing and validation

use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use std::net::{IpAddr, SocketAddr};
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::constants::{
    DEFAULT_MODULE_DIR, STRUCTURED_CONFIG_FILE, WEB_BODY_TIMEOUT_MS, WEB_DEFAULT_BIND,
    WEB_DEFAULT_PORT,
};

/// Settings of the config editor server
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct WebSettings {
    /// Address to listen on
    pub bind_address: String,
    /// Port to listen on; first process to bind it serves
    pub port: u16,
    /// Module directory holding the structured config document
    pub module_dir: PathBuf,
    /// Wait for the rest of a request body before answering 408
    pub body_timeout_ms: u64,
}

impl Default for WebSettings {
    fn default() -> Self {
        Self {
            bind_address: WEB_DEFAULT_BIND.to_string(),
            port: WEB_DEFAULT_PORT,
            module_dir: PathBuf::from(DEFAULT_MODULE_DIR),
            body_timeout_ms: WEB_BODY_TIMEOUT_MS,
        }
    }
}

impl WebSettings {
    /// Load and validate settings from a TOML file
    pub fn load_from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read settings file: {}", path.display()))?;

        let settings: Self = toml::from_str(&content)
            .with_context(|| format!("Failed to parse settings file: {}", path.display()))?;

        settings.validate()?;
        Ok(settings)
    }

    pub fn validate(&self) -> Result<()> {
        if self.port == 0 {
            bail!("Invalid port: 0. Must be between 1 and 65535");
        }
        if self.body_timeout_ms == 0 {
            bail!("Invalid body_timeout_ms: 0. Must be at least 1");
        }
        self.bind_address
            .parse::<IpAddr>()
            .with_context(|| format!("Invalid bind address: {}", self.bind_address))?;
        Ok(())
    }

    /// Address the server listens on
    pub fn socket_addr(&self) -> Result<SocketAddr> {
        let ip: IpAddr = self
            .bind_address
            .parse()
            .with_context(|| format!("Invalid bind address: {}", self.bind_address))?;
        Ok(SocketAddr::new(ip, self.port))
    }

    pub fn body_timeout(&self) -> Duration {
        Duration::from_millis(self.body_timeout_ms)
    }

    /// Structured document the editor reads and overwrites
    pub fn config_path(&self) -> PathBuf {
        self.module_dir.join(STRUCTURED_CONFIG_FILE)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let settings = WebSettings::default();
        assert_eq!(settings.port, 8888);
        assert_eq!(settings.body_timeout(), Duration::from_secs(5));
        assert_eq!(settings.config_path(), PathBuf::from("/data/local/tmp/re.zyg.fri/config.json"));
        assert!(settings.validate().is_ok());
    }

    #[test]
    fn test_load_partial_file_keeps_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("web.toml");
        std::fs::write(&path, "port = 9090\n").unwrap();

        let settings = WebSettings::load_from_file(&path).unwrap();
        assert_eq!(settings.port, 9090);
        assert_eq!(settings.bind_address, "0.0.0.0");
    }

    #[test]
    fn test_invalid_settings_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("web.toml");

        std::fs::write(&path, "port = 0\n").unwrap();
        assert!(WebSettings::load_from_file(&path).is_err());

        std::fs::write(&path, "bind_address = \"localhost:80\"\n").unwrap();
        assert!(WebSettings::load_from_file(&path).is_err());

        std::fs::write(&path, "body_timeout_ms = 0\n").unwrap();
        assert!(WebSettings::load_from_file(&path).is_err());

        std::fs::write(&path, "port = \"eighty\"\n").unwrap();
        assert!(WebSettings::load_from_file(&path).is_err());
    }
}
