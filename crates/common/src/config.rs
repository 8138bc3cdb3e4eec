//! Application configuration.

use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Application configuration shared by both services.
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    /// Server configuration.
    #[serde(default)]
    pub server: ServerConfig,
    /// Database configuration.
    pub database: DatabaseConfig,
    /// Redis configuration.
    #[serde(default)]
    pub redis: RedisConfig,
    /// Token authentication configuration.
    #[serde(default)]
    pub auth: AuthConfig,
    /// Auth service (role assignment) configuration.
    #[serde(default)]
    pub auth_service: AuthServiceConfig,
    /// SMTP configuration. Mail is logged and dropped when absent.
    #[serde(default)]
    pub smtp: Option<SmtpConfig>,
    /// Media storage configuration.
    #[serde(default)]
    pub storage: MediaStorageConfig,
    /// Survey submission configuration.
    #[serde(default)]
    pub submission: SubmissionConfig,
    /// Conductor verification configuration.
    #[serde(default)]
    pub verification: VerificationConfig,
}

/// Server configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    /// Host to bind to.
    #[serde(default = "default_host")]
    pub host: String,
    /// Port of the participants service.
    #[serde(default = "default_participants_port")]
    pub participants_port: u16,
    /// Port of the survey management service.
    #[serde(default = "default_management_port")]
    pub management_port: u16,
    /// Per-request timeout in seconds.
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            participants_port: default_participants_port(),
            management_port: default_management_port(),
            request_timeout_secs: default_request_timeout_secs(),
        }
    }
}

/// Database connection configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    /// `PostgreSQL` connection URL.
    pub url: String,
    /// Maximum number of connections in the pool.
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
    /// Minimum number of connections in the pool.
    #[serde(default = "default_min_connections")]
    pub min_connections: u32,
}

/// Redis configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct RedisConfig {
    /// Redis connection URL. Verification codes are kept in memory when unset.
    #[serde(default)]
    pub url: Option<String>,
    /// Key prefix for all Redis keys.
    #[serde(default = "default_redis_prefix")]
    pub prefix: String,
}

impl Default for RedisConfig {
    fn default() -> Self {
        Self {
            url: None,
            prefix: default_redis_prefix(),
        }
    }
}

/// Bearer token configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct AuthConfig {
    /// HS256 secret for bearer tokens. Requests run as the development
    /// identity when unset.
    #[serde(default)]
    pub jwt_secret: Option<String>,
    /// User id injected when no secret is configured.
    #[serde(default = "default_dev_user_id")]
    pub dev_user_id: i32,
    /// Roles granted to the development identity.
    #[serde(default)]
    pub dev_roles: Vec<String>,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            jwt_secret: None,
            dev_user_id: default_dev_user_id(),
            dev_roles: Vec::new(),
        }
    }
}

impl AuthConfig {
    /// Whether requests bypass token verification.
    #[must_use]
    pub const fn is_dev_bypass(&self) -> bool {
        self.jwt_secret.is_none()
    }
}

/// Auth service configuration for conductor role assignment.
#[derive(Debug, Clone, Deserialize)]
pub struct AuthServiceConfig {
    /// Base URL of the Auth service. Role assignment is skipped when unset.
    #[serde(default)]
    pub base_url: Option<String>,
    /// Bearer token presented to the Auth service.
    #[serde(default)]
    pub service_token: Option<String>,
    /// Role granted to newly registered conductors.
    #[serde(default = "default_conductor_role")]
    pub role_name: String,
    /// Request timeout in seconds.
    #[serde(default = "default_auth_service_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for AuthServiceConfig {
    fn default() -> Self {
        Self {
            base_url: None,
            service_token: None,
            role_name: default_conductor_role(),
            timeout_secs: default_auth_service_timeout_secs(),
        }
    }
}

/// SMTP configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct SmtpConfig {
    /// SMTP host.
    pub host: String,
    /// SMTP port.
    #[serde(default = "default_smtp_port")]
    pub port: u16,
    /// Username.
    #[serde(default)]
    pub username: Option<String>,
    /// Password.
    #[serde(default)]
    pub password: Option<String>,
    /// Sender address.
    pub from_address: String,
    /// Sender display name.
    #[serde(default = "default_from_name")]
    pub from_name: String,
}

/// Local media storage configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct MediaStorageConfig {
    /// Directory files are written to.
    #[serde(default = "default_storage_path")]
    pub base_path: PathBuf,
    /// URL prefix files are served from.
    #[serde(default = "default_storage_url")]
    pub base_url: String,
    /// Largest accepted upload in bytes.
    #[serde(default = "default_max_upload_bytes")]
    pub max_upload_bytes: usize,
}

impl Default for MediaStorageConfig {
    fn default() -> Self {
        Self {
            base_path: default_storage_path(),
            base_url: default_storage_url(),
            max_upload_bytes: default_max_upload_bytes(),
        }
    }
}

/// What to do with an answer whose response cannot be encoded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AnswerEncodingPolicy {
    /// Leave the answer out and report it alongside the result.
    #[default]
    SkipAndContinue,
    /// Reject the whole submission.
    FailWholeBatch,
}

/// Survey submission configuration.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SubmissionConfig {
    /// Policy for unencodable answers.
    #[serde(default)]
    pub answer_policy: AnswerEncodingPolicy,
}

/// Conductor e-mail verification configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct VerificationConfig {
    /// Lifetime of a verification code in seconds.
    #[serde(default = "default_code_ttl_secs")]
    pub code_ttl_secs: u64,
}

impl Default for VerificationConfig {
    fn default() -> Self {
        Self {
            code_ttl_secs: default_code_ttl_secs(),
        }
    }
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

const fn default_participants_port() -> u16 {
    8081
}

const fn default_management_port() -> u16 {
    3000
}

const fn default_request_timeout_secs() -> u64 {
    30
}

const fn default_max_connections() -> u32 {
    20
}

const fn default_min_connections() -> u32 {
    2
}

fn default_redis_prefix() -> String {
    "survey".to_string()
}

const fn default_dev_user_id() -> i32 {
    1
}

fn default_conductor_role() -> String {
    "Conducting".to_string()
}

const fn default_auth_service_timeout_secs() -> u64 {
    10
}

const fn default_smtp_port() -> u16 {
    587
}

fn default_from_name() -> String {
    "Team".to_string()
}

fn default_storage_path() -> PathBuf {
    PathBuf::from("./files")
}

fn default_storage_url() -> String {
    "/files".to_string()
}

const fn default_max_upload_bytes() -> usize {
    50 * 1024 * 1024
}

const fn default_code_ttl_secs() -> u64 {
    15 * 60
}

impl Config {
    /// Load configuration from files and environment variables.
    ///
    /// Configuration is loaded in the following order:
    /// 1. `.env` (if present)
    /// 2. `config/default.toml`
    /// 3. `config/{environment}.toml` (based on `SURVEY_ENV`)
    /// 4. Environment variables with `SURVEY_` prefix
    pub fn load() -> Result<Self, config::ConfigError> {
        dotenvy::dotenv().ok();
        let env = std::env::var("SURVEY_ENV").unwrap_or_else(|_| "development".to_string());

        let config = config::Config::builder()
            .add_source(config::File::with_name("config/default").required(false))
            .add_source(config::File::with_name(&format!("config/{env}")).required(false))
            .add_source(
                config::Environment::with_prefix("SURVEY")
                    .separator("__")
                    .list_separator(",")
                    .with_list_parse_key("auth.dev_roles")
                    .try_parsing(true),
            )
            .build()?;

        config.try_deserialize()
    }

    /// Load configuration from a specific file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, config::ConfigError> {
        let config = config::Config::builder()
            .add_source(config::File::from(path.as_ref()))
            .add_source(
                config::Environment::with_prefix("SURVEY")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        config.try_deserialize()
    }

    /// Parse configuration from a TOML string.
    pub fn from_toml_str(toml: &str) -> Result<Self, config::ConfigError> {
        config::Config::builder()
            .add_source(config::File::from_str(toml, config::FileFormat::Toml))
            .build()?
            .try_deserialize()
    }
}
