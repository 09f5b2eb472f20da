//! Application configuration management.
//!
//! Configuration is loaded from a YAML file with environment variable overrides. The configuration
//! file path defaults to `config.yaml` but can be specified via `-f` flag or `CASHTRACKR_CONFIG`
//! environment variable.
//!
//! ## Loading Priority
//!
//! Configuration sources are merged in the following order (later sources override earlier ones):
//!
//! 1. **YAML config file** - Base configuration (default: `config.yaml`)
//! 2. **Environment variables** - Variables prefixed with `CASHTRACKR_` override YAML values
//! 3. **DATABASE_URL** - Special case: overrides `database_url` if set
//!
//! For nested config values, use double underscores in environment variables. For example,
//! `CASHTRACKR_AUTH__PASSWORD__MIN_LENGTH=10` sets the `auth.password.min_length` field.

use clap::Parser;
use figment::{
    providers::{Env, Format, Yaml},
    Figment,
};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use url::Url;

/// Simple CLI args - just for specifying config file
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Path to configuration file
    #[arg(short = 'f', long, env = "CASHTRACKR_CONFIG", default_value = "config.yaml")]
    pub config: String,

    /// Validate configuration and exit without starting the server.
    /// Useful for CI/CD pipelines to catch config errors before deployment.
    #[arg(long)]
    pub validate: bool,
}

/// Main application configuration.
///
/// This is the root configuration structure loaded from YAML and environment variables.
/// All fields have sensible defaults defined in the `Default` implementation.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// HTTP server host to bind to (e.g., "0.0.0.0" for all interfaces)
    pub host: String,
    /// HTTP server port to bind to
    pub port: u16,
    /// PostgreSQL connection string
    pub database_url: String,
    /// Base URL of the frontend, used for links in confirmation/reset emails
    pub frontend_url: Url,
    /// Secret key for signing session tokens (required to issue sessions)
    pub secret_key: Option<String>,
    /// Authentication configuration (password rules, session expiry)
    pub auth: AuthConfig,
    /// Email delivery configuration
    pub email: EmailConfig,
    /// CORS configuration for browser clients
    pub cors: CorsConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 4000,
            database_url: "postgres://localhost:5432/cashtrackr".to_string(),
            frontend_url: Url::parse("http://localhost:3000").expect("static URL is valid"),
            secret_key: None,
            auth: AuthConfig::default(),
            email: EmailConfig::default(),
            cors: CorsConfig::default(),
        }
    }
}

impl Config {
    /// Load configuration from YAML file and environment variables
    pub fn load(args: &Args) -> anyhow::Result<Self> {
        let mut config: Config = Figment::new()
            .merge(Yaml::file(&args.config))
            .merge(Env::prefixed("CASHTRACKR_").split("__"))
            .extract()?;

        // DATABASE_URL takes precedence when set (deployment convention)
        if let Ok(url) = std::env::var("DATABASE_URL") {
            config.database_url = url;
        }

        Ok(config)
    }

    /// Address to bind the HTTP listener to
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// Authentication configuration.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct AuthConfig {
    /// Password validation rules and hashing parameters
    pub password: PasswordConfig,
    /// Session token configuration
    pub session: SessionConfig,
}

/// Argon2 password hashing parameters.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct PasswordConfig {
    /// Argon2 memory cost in KiB (default: 19456 KiB = 19 MB, secure for production)
    pub argon2_memory_kib: u32,
    /// Argon2 iterations (default: 2, secure for production)
    pub argon2_iterations: u32,
    /// Argon2 parallelism (default: 1)
    pub argon2_parallelism: u32,
}

impl Default for PasswordConfig {
    fn default() -> Self {
        Self {
            argon2_memory_kib: 19456,
            argon2_iterations: 2,
            argon2_parallelism: 1,
        }
    }
}

/// Session token configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct SessionConfig {
    /// How long an issued session token remains valid
    #[serde(with = "humantime_serde")]
    pub expiry: Duration,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            // Sessions last 30 days
            expiry: Duration::from_secs(30 * 24 * 60 * 60),
        }
    }
}

/// Email delivery configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct EmailConfig {
    /// Sender address for outbound mail
    pub from_email: String,
    /// Sender display name for outbound mail
    pub from_name: String,
    /// Which transport to deliver mail through
    pub transport: EmailTransportConfig,
}

impl Default for EmailConfig {
    fn default() -> Self {
        Self {
            from_email: "admin@cashtrackr.com".to_string(),
            from_name: "CashTrackr".to_string(),
            transport: EmailTransportConfig::default(),
        }
    }
}

/// Email transport selection.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(tag = "type", rename_all = "lowercase", deny_unknown_fields)]
pub enum EmailTransportConfig {
    /// Deliver via an SMTP relay
    Smtp {
        host: String,
        port: u16,
        username: String,
        password: String,
        /// STARTTLS to the relay; disabling this is not recommended outside development
        #[serde(default = "default_use_tls")]
        use_tls: bool,
    },
    /// Write mail to files on disk (development/testing)
    File { path: String },
}

fn default_use_tls() -> bool {
    true
}

impl Default for EmailTransportConfig {
    fn default() -> Self {
        EmailTransportConfig::File {
            path: "./emails".to_string(),
        }
    }
}

/// CORS (Cross-Origin Resource Sharing) configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct CorsConfig {
    /// Allowed origins for CORS requests
    pub allowed_origins: Vec<CorsOrigin>,
    /// Allow credentials (cookies) in CORS requests
    pub allow_credentials: bool,
    /// Cache preflight requests for this many seconds
    pub max_age: Option<u64>,
}

impl Default for CorsConfig {
    fn default() -> Self {
        Self {
            allowed_origins: vec![CorsOrigin::Wildcard],
            allow_credentials: false,
            max_age: None,
        }
    }
}

/// A single allowed CORS origin: either the `*` wildcard or a concrete URL.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum CorsOrigin {
    Wildcard,
    Url(Url),
}

impl TryFrom<String> for CorsOrigin {
    type Error = url::ParseError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        if value == "*" {
            Ok(CorsOrigin::Wildcard)
        } else {
            Ok(CorsOrigin::Url(Url::parse(&value)?))
        }
    }
}

impl From<CorsOrigin> for String {
    fn from(origin: CorsOrigin) -> Self {
        match origin {
            CorsOrigin::Wildcard => "*".to_string(),
            CorsOrigin::Url(url) => url.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.port, 4000);
        assert_eq!(config.auth.password.argon2_iterations, 2);
        assert_eq!(config.auth.session.expiry, Duration::from_secs(30 * 24 * 60 * 60));
        assert!(config.secret_key.is_none());
    }

    #[test]
    fn test_cors_origin_parsing() {
        let wildcard = CorsOrigin::try_from("*".to_string()).unwrap();
        assert!(matches!(wildcard, CorsOrigin::Wildcard));

        let url = CorsOrigin::try_from("https://app.example.com".to_string()).unwrap();
        assert!(matches!(url, CorsOrigin::Url(_)));

        assert!(CorsOrigin::try_from("not a url".to_string()).is_err());
    }

    #[test]
    fn test_yaml_overrides() {
        let yaml = r#"
port: 4100
secret_key: yaml-secret
auth:
  password:
    argon2_iterations: 3
email:
  transport:
    type: file
    path: /tmp/mail
"#;
        let config: Config = Figment::new()
            .merge(Yaml::string(yaml))
            .extract()
            .expect("yaml config should parse");
        assert_eq!(config.port, 4100);
        assert_eq!(config.secret_key.as_deref(), Some("yaml-secret"));
        assert_eq!(config.auth.password.argon2_iterations, 3);
        assert!(matches!(config.email.transport, EmailTransportConfig::File { .. }));
        // Untouched sections keep defaults
        assert_eq!(config.auth.password.argon2_memory_kib, 19456);
    }
}
