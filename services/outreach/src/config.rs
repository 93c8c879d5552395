//! Configuration types for the outreach service

use std::fmt;
use std::path::Path;

use outreach_auth::Role;
use serde::{Deserialize, Serialize};

/// Main configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub mail: MailConfig,
    #[serde(default)]
    pub newsletter: NewsletterConfig,
    #[serde(default)]
    pub session: SessionConfig,
    #[serde(default)]
    pub accounts: Vec<AccountConfig>,
    /// Filled from the environment by [`Config::resolve_secrets`]
    #[serde(skip)]
    pub credentials: MailCredentials,
}

/// HTTP listener configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ServerConfig {
    #[serde(default = "default_bind_address")]
    pub bind_address: String,
    #[serde(default = "default_port")]
    pub port: u16,
    /// Origins allowed to call the API cross-origin
    #[serde(default)]
    pub allowed_origins: Vec<String>,
    /// Reject `/api/reply` and `/api/newsletter` calls without a session
    #[serde(default)]
    pub mail_api_requires_session: bool,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_address: default_bind_address(),
            port: default_port(),
            allowed_origins: Vec::new(),
            mail_api_requires_session: false,
        }
    }
}

/// How the SMTP connection is secured
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MailSecurity {
    /// Implicit TLS (usually port 465)
    #[default]
    Tls,
    /// STARTTLS upgrade (usually port 587)
    StartTls,
    /// Unencrypted, for local relays and test servers only
    Plain,
}

/// SMTP relay configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct MailConfig {
    #[serde(default = "default_smtp_host")]
    pub smtp_host: String,
    #[serde(default = "default_smtp_port")]
    pub smtp_port: u16,
    #[serde(default)]
    pub security: MailSecurity,
    #[serde(default = "default_from_name")]
    pub from_name: String,
    #[serde(default = "default_smtp_timeout")]
    pub timeout_seconds: u64,
    /// Environment variable holding the sender address
    #[serde(default = "default_address_env")]
    pub address_env: String,
    /// Environment variable holding the app password
    #[serde(default = "default_password_env")]
    pub password_env: String,
}

impl Default for MailConfig {
    fn default() -> Self {
        Self {
            smtp_host: default_smtp_host(),
            smtp_port: default_smtp_port(),
            security: MailSecurity::default(),
            from_name: default_from_name(),
            timeout_seconds: default_smtp_timeout(),
            address_env: default_address_env(),
            password_env: default_password_env(),
        }
    }
}

/// Transport credential pair read from the environment
#[derive(Clone, Default)]
pub struct MailCredentials {
    pub address: Option<String>,
    pub app_password: Option<String>,
}

impl fmt::Debug for MailCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MailCredentials")
            .field("address", &self.address)
            .field(
                "app_password",
                &self.app_password.as_ref().map(|_| "<redacted>"),
            )
            .finish()
    }
}

/// Pacing between newsletter batches
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum PacingConfig {
    /// Sleep a fixed delay between batches
    FixedDelay {
        #[serde(default = "default_batch_delay_ms")]
        delay_ms: u64,
    },
    /// Admit at most `tokens_per_interval` batches per interval
    TokenBucket {
        tokens_per_interval: u32,
        interval_ms: u64,
    },
    None,
}

impl Default for PacingConfig {
    fn default() -> Self {
        PacingConfig::FixedDelay {
            delay_ms: default_batch_delay_ms(),
        }
    }
}

/// Newsletter batching configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct NewsletterConfig {
    #[serde(default = "default_batch_size")]
    pub batch_size: usize,
    #[serde(default)]
    pub pacing: PacingConfig,
}

impl Default for NewsletterConfig {
    fn default() -> Self {
        Self {
            batch_size: default_batch_size(),
            pacing: PacingConfig::default(),
        }
    }
}

/// Session and persisted-state cookie configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SessionConfig {
    #[serde(default = "default_session_ttl")]
    pub ttl_minutes: u32,
    #[serde(default = "default_session_cookie")]
    pub cookie_name: String,
    #[serde(default = "default_state_cookie")]
    pub state_cookie_name: String,
    #[serde(default)]
    pub secure_cookies: bool,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            ttl_minutes: default_session_ttl(),
            cookie_name: default_session_cookie(),
            state_cookie_name: default_state_cookie(),
            secure_cookies: false,
        }
    }
}

/// A login account
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AccountConfig {
    pub id: String,
    pub name: String,
    pub email: String,
    pub role: Role,
    /// argon2 PHC string, see `outreach --hash-password`
    pub password_hash: String,
}

impl Config {
    /// Read the mail credential pair from the process environment.
    ///
    /// Missing variables are not an error here; the transport reports them
    /// when a send is attempted.
    pub fn resolve_secrets(&mut self) -> crate::Result<()> {
        self.resolve_secrets_with(|name| match std::env::var(name) {
            Ok(value) => Ok(Some(value)),
            Err(std::env::VarError::NotPresent) => Ok(None),
            Err(e) => Err(crate::OutreachError::Config(format!(
                "Environment variable {}: {}",
                name, e
            ))),
        })
    }

    pub fn resolve_secrets_with<F>(&mut self, lookup: F) -> crate::Result<()>
    where
        F: Fn(&str) -> crate::Result<Option<String>>,
    {
        let address = lookup(&self.mail.address_env)?.filter(|v| !v.trim().is_empty());
        let app_password = lookup(&self.mail.password_env)?.filter(|v| !v.is_empty());

        if address.is_none() {
            tracing::warn!(
                "{} is not set; outgoing mail will fail",
                self.mail.address_env
            );
        }
        if app_password.is_none() {
            tracing::warn!(
                "{} is not set; outgoing mail will fail",
                self.mail.password_env
            );
        }

        self.credentials = MailCredentials {
            address,
            app_password,
        };
        Ok(())
    }
}

fn default_bind_address() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    3000
}

fn default_smtp_host() -> String {
    "smtp.gmail.com".to_string()
}

fn default_smtp_port() -> u16 {
    465
}

fn default_from_name() -> String {
    "Outreach".to_string()
}

fn default_smtp_timeout() -> u64 {
    30
}

fn default_address_env() -> String {
    "EMAIL_USER".to_string()
}

fn default_password_env() -> String {
    "EMAIL_PASS".to_string()
}

fn default_batch_size() -> usize {
    10
}

fn default_batch_delay_ms() -> u64 {
    1000
}

fn default_session_ttl() -> u32 {
    720
}

fn default_session_cookie() -> String {
    "outreach_session".to_string()
}

fn default_state_cookie() -> String {
    "outreach_state".to_string()
}

/// Load configuration from a JSON file
pub fn load_config(path: &Path) -> crate::Result<Config> {
    let content = std::fs::read_to_string(path).map_err(|e| {
        crate::OutreachError::Config(format!("Failed to read config file {:?}: {}", path, e))
    })?;
    let config: Config = serde_json::from_str(&content)?;
    Ok(config)
}
