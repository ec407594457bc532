use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;

/// Environment variable that overrides `token.secret`.
pub const TOKEN_SECRET_ENV: &str = "DID_AUTH_TOKEN_SECRET";

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct AppConfig {
    pub log_level: String,
    pub log_dir: String,
    pub log_file: String,
    pub use_json: bool,
    pub rotation: String,
    pub gateway: GatewayConfig,
    #[serde(default)]
    pub auth: AuthConfig,
    pub token: TokenConfig,
    #[serde(default)]
    pub job_api: JobApiConfig,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct GatewayConfig {
    pub host: String,
    pub port: u16,
    #[serde(default)]
    pub cors_origins: Vec<String>,
}

/// Challenge-response settings
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct AuthConfig {
    /// Challenge lifetime in seconds
    pub challenge_ttl_secs: u64,
    /// Self-certifying DID methods accepted by the verifier
    pub did_methods: Vec<String>,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            challenge_ttl_secs: 300,
            did_methods: vec!["prism".to_string()],
        }
    }
}

#[derive(Serialize, Deserialize, Clone)]
pub struct TokenConfig {
    /// HS256 signing secret, at least 32 bytes
    #[serde(default)]
    pub secret: String,
    #[serde(default = "default_token_ttl_hours")]
    pub ttl_hours: u64,
}

fn default_token_ttl_hours() -> u64 {
    24
}

impl std::fmt::Debug for TokenConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenConfig")
            .field("secret", &"<redacted>")
            .field("ttl_hours", &self.ttl_hours)
            .finish()
    }
}

/// External job processing API
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct JobApiConfig {
    /// Job submission endpoint; submission is skipped when unset
    #[serde(default)]
    pub url: Option<String>,
    pub timeout_secs: u64,
}

impl Default for JobApiConfig {
    fn default() -> Self {
        Self {
            url: None,
            timeout_secs: 10,
        }
    }
}

impl AppConfig {
    /// Load `config/<env>.yaml`, then apply environment overrides.
    pub fn load(env: &str) -> Result<Self> {
        let config_path = format!("config/{}.yaml", env);
        let content = fs::read_to_string(&config_path)
            .with_context(|| format!("Failed to read config file: {}", config_path))?;
        let config = Self::from_yaml(&content)
            .with_context(|| format!("Failed to parse config file: {}", config_path))?;
        Ok(config.with_secret_override(std::env::var(TOKEN_SECRET_ENV).ok()))
    }

    pub fn from_yaml(content: &str) -> Result<Self> {
        Ok(serde_yaml::from_str(content)?)
    }

    /// Replace the token secret when `secret` is set and non-empty.
    pub fn with_secret_override(mut self, secret: Option<String>) -> Self {
        if let Some(secret) = secret.filter(|s| !s.is_empty()) {
            self.token.secret = secret;
        }
        self
    }
}
