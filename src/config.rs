use serde::{Deserialize, Serialize};
use std::fs;
use thiserror::Error;

use crate::api_auth::{DEFAULT_PUBLIC_PATHS, DEFAULT_REPLAY_WINDOW_SECS};

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file {path}: {source}")]
    Read {
        path: String,
        source: std::io::Error,
    },

    #[error("Failed to parse config file {path}: {source}")]
    Parse {
        path: String,
        source: serde_yaml::Error,
    },

    #[error("Invalid value for {name}: {reason}")]
    InvalidEnv { name: &'static str, reason: String },
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct AppConfig {
    pub log_level: String,
    pub log_dir: String,
    pub log_file: String,
    pub use_json: bool,
    pub rotation: String,
    pub gateway: GatewayConfig,
    /// PostgreSQL connection URL. Absent means the in-memory store.
    #[serde(default)]
    pub database_url: Option<String>,
    #[serde(default)]
    pub vault: VaultConfig,
    #[serde(default)]
    pub auth: AuthConfig,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct GatewayConfig {
    pub host: String,
    pub port: u16,
    #[serde(default = "default_max_body_bytes")]
    pub max_body_bytes: usize,
}

fn default_max_body_bytes() -> usize {
    256 * 1024
}

/// Token encryption keys, hex encoded (64 chars each).
#[derive(Serialize, Deserialize, Clone, Default)]
pub struct VaultConfig {
    #[serde(default)]
    pub enc_key: Option<String>,
    #[serde(default)]
    pub enc_key_old: Option<String>,
}

/// Request authentication settings.
#[derive(Serialize, Deserialize, Clone)]
pub struct AuthConfig {
    #[serde(default)]
    pub api_key: Option<String>,
    #[serde(default)]
    pub api_key_old: Option<String>,
    #[serde(default)]
    pub hmac_secret: Option<String>,
    #[serde(default = "default_replay_window_secs")]
    pub replay_window_secs: u64,
    #[serde(default = "default_public_paths")]
    pub public_paths: Vec<String>,
}

fn default_replay_window_secs() -> u64 {
    DEFAULT_REPLAY_WINDOW_SECS
}

fn default_public_paths() -> Vec<String> {
    DEFAULT_PUBLIC_PATHS.iter().map(|p| p.to_string()).collect()
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            api_key_old: None,
            hmac_secret: None,
            replay_window_secs: default_replay_window_secs(),
            public_paths: default_public_paths(),
        }
    }
}

fn redacted(value: &Option<String>) -> &'static str {
    match value {
        Some(_) => "<set>",
        None => "<unset>",
    }
}

impl std::fmt::Debug for VaultConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("VaultConfig")
            .field("enc_key", &redacted(&self.enc_key))
            .field("enc_key_old", &redacted(&self.enc_key_old))
            .finish()
    }
}

impl std::fmt::Debug for AuthConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthConfig")
            .field("api_key", &redacted(&self.api_key))
            .field("api_key_old", &redacted(&self.api_key_old))
            .field("hmac_secret", &redacted(&self.hmac_secret))
            .field("replay_window_secs", &self.replay_window_secs)
            .field("public_paths", &self.public_paths)
            .finish()
    }
}

impl AppConfig {
    /// Load `config/<env>.yaml`, then apply environment overrides.
    pub fn load(env: &str) -> Result<Self, ConfigError> {
        let config_path = format!("config/{}.yaml", env);
        let content = fs::read_to_string(&config_path).map_err(|source| ConfigError::Read {
            path: config_path.clone(),
            source,
        })?;
        let mut config = Self::from_yaml(&content).map_err(|source| ConfigError::Parse {
            path: config_path,
            source,
        })?;
        config.apply_env(|name| std::env::var(name).ok())?;
        Ok(config)
    }

    pub fn from_yaml(content: &str) -> Result<Self, serde_yaml::Error> {
        serde_yaml::from_str(content)
    }

    /// Override secrets and connection settings from the environment.
    ///
    /// Recognized: `ENC_KEY`, `ENC_KEY_OLD`, `API_KEY`, `API_KEY_OLD`,
    /// `HMAC_SECRET`, `DATABASE_URL`, `PORT`. Empty values count as unset
    /// and do not override.
    pub fn apply_env<F>(&mut self, lookup: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

        if let Some(v) = get("ENC_KEY") {
            self.vault.enc_key = Some(v);
        }
        if let Some(v) = get("ENC_KEY_OLD") {
            self.vault.enc_key_old = Some(v);
        }
        if let Some(v) = get("API_KEY") {
            self.auth.api_key = Some(v);
        }
        if let Some(v) = get("API_KEY_OLD") {
            self.auth.api_key_old = Some(v);
        }
        if let Some(v) = get("HMAC_SECRET") {
            self.auth.hmac_secret = Some(v);
        }
        if let Some(v) = get("DATABASE_URL") {
            self.database_url = Some(v);
        }
        if let Some(v) = get("PORT") {
            self.gateway.port = v.trim().parse().map_err(|e| ConfigError::InvalidEnv {
                name: "PORT",
                reason: format!("{}", e),
            })?;
        }
        Ok(())
    }
}
