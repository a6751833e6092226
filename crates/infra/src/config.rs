//! Process configuration, read once at startup.
//!
//! | Variable | Required | Default |
//! |---|---|---|
//! | `JWT_SECRET_KEY` | yes | |
//! | `JWT_ALGORITHM` | no | `HS256` |
//! | `JWT_TTL_SECS` | no | 60 days |
//! | `DATABASE_URL` | no | in-memory stores |
//! | `BIND_ADDR` | no | `0.0.0.0:8080` |
//! | `MEDIA_DIR` | no | in-memory media store |
//! | `MEDIA_BASE_URL` | no | `/media` |

use std::net::SocketAddr;
use std::path::PathBuf;

use chrono::Duration;

use fixit_auth::{ConfigError, SigningConfig};

pub const DEFAULT_BIND_ADDR: &str = "0.0.0.0:8080";
pub const DEFAULT_MEDIA_BASE_URL: &str = "/media";

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub signing: SigningConfig,
    pub token_ttl: Duration,
    pub database_url: Option<String>,
    pub bind_addr: SocketAddr,
    pub media: MediaConfig,
}

/// Where uploaded flyers go.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MediaConfig {
    InMemory,
    Filesystem { root: PathBuf, base_url: String },
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build configuration from an arbitrary key lookup (tests pass a map).
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        let secret = var("JWT_SECRET_KEY").ok_or(ConfigError::MissingSecret)?;
        let signing = SigningConfig::new(secret, var("JWT_ALGORITHM").as_deref())?;

        let token_ttl = match var("JWT_TTL_SECS") {
            None => Duration::days(60),
            Some(raw) => {
                let secs: i64 = raw.parse().map_err(|_| ConfigError::Invalid {
                    key: "JWT_TTL_SECS",
                    message: format!("'{raw}' is not a whole number of seconds"),
                })?;
                if secs <= 0 {
                    return Err(ConfigError::Invalid {
                        key: "JWT_TTL_SECS",
                        message: "must be positive".to_string(),
                    });
                }
                Duration::seconds(secs)
            }
        };

        let bind_raw = var("BIND_ADDR").unwrap_or_else(|| DEFAULT_BIND_ADDR.to_string());
        let bind_addr = bind_raw.parse().map_err(|_| ConfigError::Invalid {
            key: "BIND_ADDR",
            message: format!("'{bind_raw}' is not a socket address"),
        })?;

        let media = match var("MEDIA_DIR") {
            None => MediaConfig::InMemory,
            Some(dir) => MediaConfig::Filesystem {
                root: PathBuf::from(dir),
                base_url: var("MEDIA_BASE_URL")
                    .unwrap_or_else(|| DEFAULT_MEDIA_BASE_URL.to_string()),
            },
        };

        Ok(Self {
            signing,
            token_ttl,
            database_url: var("DATABASE_URL"),
            bind_addr,
            media,
        })
    }
}
