use anyhow::{anyhow, Context, Result};
use serde::Deserialize;
use serde_json::Value;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{debug, warn};

use crate::accounts::ReceivingAccount;
use crate::error::{AppError, AppResult};

#[derive(Debug, Clone)]
pub struct Config {
    pub server: ServerConfig,
    pub storage: StorageConfig,
    pub uisp: UispConfig,
    pub session: SessionConfig,
}

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub environment: String,
}

#[derive(Debug, Clone)]
pub struct StorageConfig {
    pub data_dir: PathBuf,
    pub plugin_config_path: PathBuf,
}

#[derive(Debug, Clone)]
pub struct UispConfig {
    /// Base URL of the CRM API, e.g. `https://uisp.example.com/crm/api/v1.0`
    pub api_url: String,
    pub app_key: String,
    pub timeout_secs: u64,
}

#[derive(Debug, Clone)]
pub struct SessionConfig {
    pub ttl: Duration,
    pub redis_url: Option<String>,
}

/// Flat view of the environment as read through the `config` crate.
#[derive(Debug, Deserialize)]
struct RawSettings {
    host: String,
    port: u16,
    environment: String,
    data_dir: String,
    plugin_config_path: Option<String>,
    uisp_api_url: Option<String>,
    uisp_app_key: Option<String>,
    uisp_timeout_secs: u64,
    session_ttl_secs: u64,
    redis_url: Option<String>,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        let raw: RawSettings = config::Config::builder()
            .set_default("host", "0.0.0.0")?
            .set_default("port", 8080)?
            .set_default("environment", "development")?
            .set_default("data_dir", "data")?
            .set_default("uisp_timeout_secs", 30)?
            .set_default("session_ttl_secs", 600)?
            .add_source(config::Environment::default().try_parsing(true))
            .build()
            .context("Failed to read settings from environment")?
            .try_deserialize()
            .context("Invalid settings in environment")?;

        let data_dir = PathBuf::from(raw.data_dir);
        let plugin_config_path = raw
            .plugin_config_path
            .map(PathBuf::from)
            .unwrap_or_else(|| data_dir.join("config.json"));

        let config = Config {
            server: ServerConfig {
                host: raw.host,
                port: raw.port,
                environment: raw.environment,
            },
            storage: StorageConfig {
                data_dir,
                plugin_config_path,
            },
            uisp: UispConfig {
                api_url: raw.uisp_api_url.context("UISP_API_URL not set")?,
                app_key: raw.uisp_app_key.context("UISP_APP_KEY not set")?,
                timeout_secs: raw.uisp_timeout_secs,
            },
            session: SessionConfig {
                ttl: Duration::from_secs(raw.session_ttl_secs),
                redis_url: raw.redis_url.filter(|url| !url.trim().is_empty()),
            },
        };

        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.server.port < 1024 {
            return Err(anyhow!(
                "Port must be at least 1024, got {}",
                self.server.port
            ));
        }

        let valid_environments = ["development", "staging", "production"];
        if !valid_environments.contains(&self.server.environment.as_str()) {
            return Err(anyhow!(
                "Environment must be one of: {:?}, got {}",
                valid_environments,
                self.server.environment
            ));
        }

        if self.uisp.api_url.trim().is_empty() {
            return Err(anyhow!("UISP_API_URL cannot be empty"));
        }

        if !self.uisp.api_url.starts_with("http://") && !self.uisp.api_url.starts_with("https://")
        {
            return Err(anyhow!(
                "UISP_API_URL must be an http(s) URL, got {}",
                self.uisp.api_url
            ));
        }

        if self.uisp.app_key.trim().is_empty() {
            return Err(anyhow!("UISP_APP_KEY cannot be empty"));
        }

        if self.uisp.timeout_secs == 0 {
            return Err(anyhow!("UISP_TIMEOUT_SECS must be greater than 0"));
        }

        if self.session.ttl.is_zero() {
            return Err(anyhow!("SESSION_TTL_SECS must be greater than 0"));
        }

        Ok(())
    }
}

/// Plugin settings managed by the billing platform.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PluginConfig {
    pub accounts: Vec<ReceivingAccount>,
    /// Payment method UUID or display name
    pub payment_method: Option<String>,
    pub recaptcha_site_key: Option<String>,
    pub recaptcha_secret_key: Option<String>,
}

impl PluginConfig {
    /// Build from the raw key/value mapping. Account 1 uses the unsuffixed keys
    /// (`gcashNumber`), accounts 2 and 3 the numbered ones (`gcashNumber2`).
    pub fn from_map(map: &HashMap<String, Value>) -> Self {
        let text = |key: &str| -> String {
            match map.get(key) {
                Some(Value::String(s)) => s.trim().to_string(),
                Some(Value::Number(n)) => n.to_string(),
                Some(Value::Bool(b)) => b.to_string(),
                _ => String::new(),
            }
        };
        let optional = |key: &str| Some(text(key)).filter(|v| !v.is_empty());

        let accounts = (1u8..=3)
            .map(|slot| {
                let suffix = if slot == 1 { String::new() } else { slot.to_string() };
                let active_days = if slot == 1 {
                    // Older configs name the first account's active days with an explicit 1
                    let plain = text("gcashActiveDays");
                    if plain.is_empty() {
                        text("gcashActiveDays1")
                    } else {
                        plain
                    }
                } else {
                    text(&format!("gcashActiveDays{}", suffix))
                };

                ReceivingAccount {
                    slot,
                    number: text(&format!("gcashNumber{}", suffix)),
                    name: text(&format!("gcashName{}", suffix)),
                    qr_code: text(&format!("gcashQrCode{}", suffix)),
                    active_days,
                }
            })
            .collect();

        Self {
            accounts,
            payment_method: optional("paymentMethodId"),
            recaptcha_site_key: optional("recaptchaSiteKey"),
            recaptcha_secret_key: optional("recaptchaSecretKey"),
        }
    }

    /// The default (slot 1) account, if it has a number and name.
    pub fn default_account(&self) -> Option<&ReceivingAccount> {
        self.accounts
            .iter()
            .find(|account| account.slot == 1)
            .filter(|account| account.is_configured())
    }

    pub fn captcha_enabled(&self) -> bool {
        self.recaptcha_site_key.is_some() && self.recaptcha_secret_key.is_some()
    }
}

/// Read-only source of plugin settings.
pub trait ConfigProvider: Send + Sync {
    fn load_config(&self) -> AppResult<PluginConfig>;
}

/// Reads the platform-managed plugin config JSON object from disk on every call,
/// so edits made in the platform UI apply to the next request.
#[derive(Debug, Clone)]
pub struct JsonConfigProvider {
    path: PathBuf,
}

impl JsonConfigProvider {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl ConfigProvider for JsonConfigProvider {
    fn load_config(&self) -> AppResult<PluginConfig> {
        let raw = match std::fs::read_to_string(&self.path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                warn!(
                    "Plugin config {} not found, using empty settings",
                    self.path.display()
                );
                return Ok(PluginConfig::from_map(&HashMap::new()));
            }
            Err(e) => {
                return Err(AppError::configuration(format!(
                    "failed to read {}: {}",
                    self.path.display(),
                    e
                )))
            }
        };

        let map: HashMap<String, Value> = serde_json::from_str(&raw).map_err(|e| {
            AppError::configuration(format!("invalid plugin config {}: {}", self.path.display(), e))
        })?;

        debug!("Loaded {} plugin settings from {}", map.len(), self.path.display());
        Ok(PluginConfig::from_map(&map))
    }
}

/// Fixed settings, for embedding and tests.
#[derive(Debug, Clone, Default)]
pub struct StaticConfigProvider(pub PluginConfig);

impl ConfigProvider for StaticConfigProvider {
    fn load_config(&self) -> AppResult<PluginConfig> {
        Ok(self.0.clone())
    }
}
