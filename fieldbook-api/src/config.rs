/// Configuration management for the API server
///
/// Configuration comes from environment variables, with a `.env` file loaded
/// first when present.
///
/// # Environment Variables
///
/// - `API_HOST`: Host to bind to (default: 0.0.0.0)
/// - `API_PORT`: Port to bind to (default: 5000)
/// - `CORS_ORIGINS`: Comma-separated allowed origins, `*` for any
///   (default: `FRONTEND_URL`, else `*`)
/// - `DATABASE_URL`: PostgreSQL connection string (required)
/// - `DATABASE_MAX_CONNECTIONS`: Pool size (default: 10)
/// - `JWT_SECRET`: Secret key for JWT signing (required, at least 32 characters)
/// - `FRONTEND_URL`: Base URL of the web app, used in password reset links
/// - `MAIL_API_URL`, `MAIL_API_KEY`, `MAIL_FROM`: Mail relay; email is only
///   logged when `MAIL_API_URL` is unset
///
/// # Example
///
/// ```no_run
/// use fieldbook_api::config::Config;
///
/// # fn example() -> anyhow::Result<()> {
/// let config = Config::from_env()?;
/// println!("Server will listen on {}", config.bind_address());
/// # Ok(())
/// # }
/// ```

use std::env;

use fieldbook_shared::mail::MailConfig;
use serde::{Deserialize, Serialize};

const DEFAULT_FRONTEND_URL: &str = "http://localhost:3000";
const MAIL_TIMEOUT_SECS: u64 = 10;

/// Complete application configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub api: ApiConfig,
    pub database: DatabaseConfig,
    pub jwt: JwtConfig,

    /// Base URL of the web app
    pub frontend_url: String,

    /// Mail relay settings; `None` logs email instead of sending it
    pub mail: Option<MailSettings>,
}

/// API server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    pub host: String,
    pub port: u16,

    /// Allowed CORS origins; `["*"]` allows any origin
    pub cors_origins: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    /// PostgreSQL connection URL
    pub url: String,

    /// Maximum number of connections in pool
    pub max_connections: u32,
}

/// JWT configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JwtConfig {
    /// Secret key for JWT signing
    ///
    /// Must be at least 32 bytes. Generate with: `openssl rand -hex 32`
    pub secret: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MailSettings {
    pub api_url: String,
    pub api_key: String,
    pub from: String,
}

impl Config {
    /// Loads configuration from environment variables
    ///
    /// # Errors
    ///
    /// Returns an error if a required variable is missing or a value does
    /// not parse.
    pub fn from_env() -> anyhow::Result<Self> {
        // Load .env file if present (for development)
        dotenvy::dotenv().ok();

        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds the configuration from any key lookup
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> anyhow::Result<Self> {
        let var = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());

        let host = var("API_HOST").unwrap_or_else(|| "0.0.0.0".to_string());
        let port = var("API_PORT")
            .unwrap_or_else(|| "5000".to_string())
            .parse::<u16>()?;

        let database_url = var("DATABASE_URL")
            .ok_or_else(|| anyhow::anyhow!("DATABASE_URL environment variable is required"))?;

        let max_connections = var("DATABASE_MAX_CONNECTIONS")
            .unwrap_or_else(|| "10".to_string())
            .parse::<u32>()?;

        let jwt_secret = var("JWT_SECRET")
            .ok_or_else(|| anyhow::anyhow!("JWT_SECRET environment variable is required"))?;

        if jwt_secret.len() < 32 {
            anyhow::bail!("JWT_SECRET must be at least 32 characters long");
        }

        let frontend_url = var("FRONTEND_URL");

        let cors_origins = var("CORS_ORIGINS")
            .or_else(|| frontend_url.clone())
            .unwrap_or_else(|| "*".to_string())
            .split(',')
            .map(|origin| origin.trim().trim_end_matches('/').to_string())
            .filter(|origin| !origin.is_empty())
            .collect();

        let mail = match var("MAIL_API_URL") {
            Some(api_url) => Some(MailSettings {
                api_url,
                api_key: var("MAIL_API_KEY").ok_or_else(|| {
                    anyhow::anyhow!("MAIL_API_KEY is required when MAIL_API_URL is set")
                })?,
                from: var("MAIL_FROM")
                    .unwrap_or_else(|| "Fieldbook <no-reply@fieldbook.local>".to_string()),
            }),
            None => None,
        };

        Ok(Self {
            api: ApiConfig {
                host,
                port,
                cors_origins,
            },
            database: DatabaseConfig {
                url: database_url,
                max_connections,
            },
            jwt: JwtConfig { secret: jwt_secret },
            frontend_url: frontend_url
                .unwrap_or_else(|| DEFAULT_FRONTEND_URL.to_string())
                .trim_end_matches('/')
                .to_string(),
            mail,
        })
    }

    /// Returns the server bind address
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.api.host, self.api.port)
    }

    /// Link emailed by forgot-password
    pub fn reset_link(&self, token: &str) -> String {
        format!("{}/reset-password?token={}", self.frontend_url, token)
    }

    /// Relay client settings, if a relay is configured
    pub fn mail_config(&self) -> Option<MailConfig> {
        self.mail.as_ref().map(|mail| MailConfig {
            api_url: mail.api_url.clone(),
            api_key: mail.api_key.clone(),
            from: mail.from.clone(),
            timeout_secs: MAIL_TIMEOUT_SECS,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    const SECRET: &str = "test-secret-key-at-least-32-bytes-long";

    fn load(vars: &[(&str, &str)]) -> anyhow::Result<Config> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn test_defaults() {
        let config = load(&[
            ("DATABASE_URL", "postgresql://localhost/fieldbook"),
            ("JWT_SECRET", SECRET),
        ])
        .unwrap();

        assert_eq!(config.bind_address(), "0.0.0.0:5000");
        assert_eq!(config.database.max_connections, 10);
        assert_eq!(config.api.cors_origins, vec!["*".to_string()]);
        assert_eq!(config.frontend_url, "http://localhost:3000");
        assert!(config.mail.is_none());
        assert!(config.mail_config().is_none());
    }

    #[test]
    fn test_required_variables() {
        assert!(load(&[("JWT_SECRET", SECRET)]).is_err());
        assert!(load(&[("DATABASE_URL", "postgresql://localhost/fieldbook")]).is_err());
        assert!(load(&[
            ("DATABASE_URL", "postgresql://localhost/fieldbook"),
            ("JWT_SECRET", "short"),
        ])
        .is_err());
    }

    #[test]
    fn test_frontend_url_drives_cors_and_reset_link() {
        let config = load(&[
            ("DATABASE_URL", "postgresql://localhost/fieldbook"),
            ("JWT_SECRET", SECRET),
            ("FRONTEND_URL", "https://app.example.com/"),
        ])
        .unwrap();

        assert_eq!(config.api.cors_origins, vec!["https://app.example.com".to_string()]);
        assert_eq!(
            config.reset_link("abc"),
            "https://app.example.com/reset-password?token=abc"
        );
    }

    #[test]
    fn test_explicit_cors_list_and_mail_relay() {
        let config = load(&[
            ("DATABASE_URL", "postgresql://localhost/fieldbook"),
            ("JWT_SECRET", SECRET),
            ("API_PORT", "8080"),
            ("CORS_ORIGINS", "https://a.example.com, https://b.example.com"),
            ("MAIL_API_URL", "https://mail.example.com/send"),
            ("MAIL_API_KEY", "key"),
        ])
        .unwrap();

        assert_eq!(config.api.port, 8080);
        assert_eq!(config.api.cors_origins.len(), 2);
        assert_eq!(config.api.cors_origins[1], "https://b.example.com");

        let mail = config.mail_config().unwrap();
        assert_eq!(mail.api_url, "https://mail.example.com/send");
        assert_eq!(mail.timeout_secs, 10);
    }

    #[test]
    fn test_mail_relay_requires_key() {
        let result = load(&[
            ("DATABASE_URL", "postgresql://localhost/fieldbook"),
            ("JWT_SECRET", SECRET),
            ("MAIL_API_URL", "https://mail.example.com/send"),
        ]);
        assert!(result.is_err());
    }
}
