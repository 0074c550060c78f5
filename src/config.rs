// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Feeding The Furballs

//! # Runtime Configuration
//!
//! Configuration is read once from the environment at startup.
//!
//! ## Environment Variables
//!
//! | Variable | Description | Default |
//! |----------|-------------|---------|
//! | `HOST` | Server bind address | `0.0.0.0` |
//! | `PORT` | Server bind port | `8080` |
//! | `DATA_DIR` | Root directory for the embedded backends | `./data` |
//! | `STORE_BACKEND` | `embedded`, `memory` or `firebase` | `embedded` |
//! | `FIREBASE_DATABASE_URL` | Realtime Database URL | Required for `firebase` |
//! | `FIREBASE_STORAGE_BUCKET` | Storage bucket name | Required for `firebase` |
//! | `FIREBASE_AUTH_TOKEN` | Token sent with Firebase requests | Optional |
//! | `ADMIN_API_KEY` | Bearer key for `/v1/admin` routes | Admin routes disabled |
//! | `PUBLIC_BASE_URL` | Base of signed media links | `http://localhost:{PORT}` |
//! | `MEDIA_URL_SECRET` | HMAC key for signed media links | Random per process |
//! | `MEDIA_URL_TTL_SECS` | Lifetime of signed media links | `3600` |
//! | `MAX_UPLOAD_BYTES` | Largest accepted gallery upload | `10485760` |
//! | `UTC_OFFSET_MINUTES` | Offset used for the "current month" | `120` |
//! | `DEBIT_ORDER_URL` | Debit order mandate form for monetary donations | feedingthefurballs.org mandate form |
//! | `ZAPPER_URL` | Zapper pay link for monetary donations | The charity's Zapper code |
//! | `LOG_FORMAT` | Logging format (`json` or `pretty`) | `pretty` |
//! | `RUST_LOG` | Log level filter | `info,tower_http=debug` |

use std::net::{IpAddr, SocketAddr};
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use url::Url;
use uuid::Uuid;

use crate::storage::paths::DATA_ROOT;

pub const HOST_ENV: &str = "HOST";
pub const PORT_ENV: &str = "PORT";
pub const DATA_DIR_ENV: &str = "DATA_DIR";
pub const STORE_BACKEND_ENV: &str = "STORE_BACKEND";
pub const FIREBASE_DATABASE_URL_ENV: &str = "FIREBASE_DATABASE_URL";
pub const FIREBASE_STORAGE_BUCKET_ENV: &str = "FIREBASE_STORAGE_BUCKET";
pub const FIREBASE_AUTH_TOKEN_ENV: &str = "FIREBASE_AUTH_TOKEN";
pub const ADMIN_API_KEY_ENV: &str = "ADMIN_API_KEY";
pub const PUBLIC_BASE_URL_ENV: &str = "PUBLIC_BASE_URL";
pub const MEDIA_URL_SECRET_ENV: &str = "MEDIA_URL_SECRET";
pub const MEDIA_URL_TTL_SECS_ENV: &str = "MEDIA_URL_TTL_SECS";
pub const MAX_UPLOAD_BYTES_ENV: &str = "MAX_UPLOAD_BYTES";
pub const UTC_OFFSET_MINUTES_ENV: &str = "UTC_OFFSET_MINUTES";
pub const LOG_FORMAT_ENV: &str = "LOG_FORMAT";
pub const DEBIT_ORDER_URL_ENV: &str = "DEBIT_ORDER_URL";
pub const ZAPPER_URL_ENV: &str = "ZAPPER_URL";

/// Debit order mandate form on the charity's website.
pub const DEFAULT_DEBIT_ORDER_URL: &str = "https://www.feedingthefurballs.org/payment-mandate.php";

/// Zapper pay link for the charity's merchant code.
pub const DEFAULT_ZAPPER_URL: &str = "https://www.zapper.com/payWithZapper/?qr=http%3A%2F%2F2.zap.pe%3Ft%3D8%26i%3D18686%3A16856%3A7%5B34%7C10.00-20.00-50.00-1%7C15%2C61%3A10%5B39%7CZAR%2C38%7CFeeding%20the%20Furballs";

/// Default log filter when `RUST_LOG` is unset.
pub const DEFAULT_LOG_FILTER: &str = "info,tower_http=debug";

const DEFAULT_PORT: u16 = 8080;
const DEFAULT_MEDIA_URL_TTL_SECS: u64 = 3600;
const DEFAULT_MAX_UPLOAD_BYTES: usize = 10 * 1024 * 1024;
/// South African Standard Time (UTC+02:00).
const DEFAULT_UTC_OFFSET_MINUTES: i32 = 120;
/// Offsets beyond ±18h are not real time zones.
const MAX_UTC_OFFSET_MINUTES: i32 = 18 * 60;

/// Timeout for each Firebase REST call.
pub const FIREBASE_REQUEST_TIMEOUT: Duration = Duration::from_secs(15);

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("{name} has an invalid value {value:?}: {reason}")]
    Invalid {
        name: &'static str,
        value: String,
        reason: String,
    },

    #[error("{name} is required when {context}")]
    Missing {
        name: &'static str,
        context: &'static str,
    },
}

fn invalid(name: &'static str, value: &str, reason: impl ToString) -> ConfigError {
    ConfigError::Invalid {
        name,
        value: value.to_string(),
        reason: reason.to_string(),
    }
}

/// Which stores back the service.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreBackend {
    /// redb documents and local files under `DATA_DIR`.
    Embedded,
    /// Process memory; lost on restart.
    Memory,
    /// Firebase Realtime Database and Cloud Storage.
    Firebase,
}

impl FromStr for StoreBackend {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "embedded" => Ok(StoreBackend::Embedded),
            "memory" => Ok(StoreBackend::Memory),
            "firebase" => Ok(StoreBackend::Firebase),
            _ => Err("expected embedded, memory or firebase".to_string()),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Pretty,
    Json,
}

impl FromStr for LogFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "pretty" => Ok(LogFormat::Pretty),
            "json" => Ok(LogFormat::Json),
            _ => Err("expected pretty or json".to_string()),
        }
    }
}

/// External payment links offered for monetary donations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MonetaryLinks {
    pub debit_order_url: String,
    pub zapper_url: String,
}

impl Default for MonetaryLinks {
    fn default() -> Self {
        Self {
            debit_order_url: DEFAULT_DEBIT_ORDER_URL.to_string(),
            zapper_url: DEFAULT_ZAPPER_URL.to_string(),
        }
    }
}

/// Firebase project settings.
#[derive(Clone)]
pub struct FirebaseConfig {
    pub database_url: String,
    pub storage_bucket: String,
    pub auth_token: Option<String>,
}

impl std::fmt::Debug for FirebaseConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FirebaseConfig")
            .field("database_url", &self.database_url)
            .field("storage_bucket", &self.storage_bucket)
            .field("auth_token", &self.auth_token.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}

/// Complete runtime configuration.
#[derive(Clone)]
pub struct Config {
    pub bind_addr: SocketAddr,
    pub data_dir: PathBuf,
    pub backend: StoreBackend,
    pub firebase: Option<FirebaseConfig>,
    pub admin_api_key: Option<String>,
    pub public_base_url: Url,
    pub media_url_secret: Vec<u8>,
    pub media_url_ttl: Duration,
    pub max_upload_bytes: usize,
    pub utc_offset_minutes: i32,
    pub monetary_links: MonetaryLinks,
    pub log_format: LogFormat,
}

impl std::fmt::Debug for Config {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Config")
            .field("bind_addr", &self.bind_addr)
            .field("data_dir", &self.data_dir)
            .field("backend", &self.backend)
            .field("firebase", &self.firebase)
            .field("admin_api_key", &self.admin_api_key.as_ref().map(|_| "<redacted>"))
            .field("public_base_url", &self.public_base_url.as_str())
            .field("media_url_ttl", &self.media_url_ttl)
            .field("max_upload_bytes", &self.max_upload_bytes)
            .field("utc_offset_minutes", &self.utc_offset_minutes)
            .field("monetary_links", &self.monetary_links)
            .field("log_format", &self.log_format)
            .finish_non_exhaustive()
    }
}

impl Config {
    /// Load configuration from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Load configuration through `lookup`, which returns a variable's value if set.
    ///
    /// Empty values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

        let host = get(HOST_ENV).unwrap_or_else(|| "0.0.0.0".to_string());
        let ip: IpAddr = host
            .trim()
            .parse()
            .map_err(|e| invalid(HOST_ENV, &host, e))?;
        let port = parse_or(get(PORT_ENV), PORT_ENV, DEFAULT_PORT)?;

        let data_dir = get(DATA_DIR_ENV)
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(DATA_ROOT));

        let backend = match get(STORE_BACKEND_ENV) {
            Some(value) => value
                .parse()
                .map_err(|e: String| invalid(STORE_BACKEND_ENV, &value, e))?,
            None => StoreBackend::Embedded,
        };

        let firebase = match backend {
            StoreBackend::Firebase => {
                let database_url = get(FIREBASE_DATABASE_URL_ENV).ok_or(ConfigError::Missing {
                    name: FIREBASE_DATABASE_URL_ENV,
                    context: "STORE_BACKEND=firebase",
                })?;
                Url::parse(&database_url)
                    .map_err(|e| invalid(FIREBASE_DATABASE_URL_ENV, &database_url, e))?;
                let storage_bucket =
                    get(FIREBASE_STORAGE_BUCKET_ENV).ok_or(ConfigError::Missing {
                        name: FIREBASE_STORAGE_BUCKET_ENV,
                        context: "STORE_BACKEND=firebase",
                    })?;
                Some(FirebaseConfig {
                    database_url,
                    storage_bucket,
                    auth_token: get(FIREBASE_AUTH_TOKEN_ENV),
                })
            }
            _ => None,
        };

        let public_base_url = match get(PUBLIC_BASE_URL_ENV) {
            Some(value) => {
                let url = Url::parse(value.trim())
                    .map_err(|e| invalid(PUBLIC_BASE_URL_ENV, &value, e))?;
                if url.cannot_be_a_base() {
                    return Err(invalid(PUBLIC_BASE_URL_ENV, &value, "not a base URL"));
                }
                url
            }
            None => Url::parse(&format!("http://localhost:{port}"))
                .map_err(|e| invalid(PORT_ENV, &port.to_string(), e))?,
        };

        let media_url_secret = match get(MEDIA_URL_SECRET_ENV) {
            Some(secret) => secret.into_bytes(),
            None => {
                // Links then stop verifying after a restart
                let mut secret = Uuid::new_v4().as_bytes().to_vec();
                secret.extend_from_slice(Uuid::new_v4().as_bytes());
                secret
            }
        };

        let media_url_ttl = Duration::from_secs(parse_or(
            get(MEDIA_URL_TTL_SECS_ENV),
            MEDIA_URL_TTL_SECS_ENV,
            DEFAULT_MEDIA_URL_TTL_SECS,
        )?);
        if media_url_ttl.is_zero() {
            return Err(invalid(MEDIA_URL_TTL_SECS_ENV, "0", "must be positive"));
        }

        let max_upload_bytes = parse_or(
            get(MAX_UPLOAD_BYTES_ENV),
            MAX_UPLOAD_BYTES_ENV,
            DEFAULT_MAX_UPLOAD_BYTES,
        )?;

        let utc_offset_minutes = parse_or(
            get(UTC_OFFSET_MINUTES_ENV),
            UTC_OFFSET_MINUTES_ENV,
            DEFAULT_UTC_OFFSET_MINUTES,
        )?;
        if utc_offset_minutes.abs() > MAX_UTC_OFFSET_MINUTES {
            return Err(invalid(
                UTC_OFFSET_MINUTES_ENV,
                &utc_offset_minutes.to_string(),
                "must be within ±1080",
            ));
        }

        let defaults = MonetaryLinks::default();
        let monetary_links = MonetaryLinks {
            debit_order_url: web_url_or(
                get(DEBIT_ORDER_URL_ENV),
                DEBIT_ORDER_URL_ENV,
                defaults.debit_order_url,
            )?,
            zapper_url: web_url_or(get(ZAPPER_URL_ENV), ZAPPER_URL_ENV, defaults.zapper_url)?,
        };

        let log_format = match get(LOG_FORMAT_ENV) {
            Some(value) => value
                .parse()
                .map_err(|e: String| invalid(LOG_FORMAT_ENV, &value, e))?,
            None => LogFormat::Pretty,
        };

        Ok(Self {
            bind_addr: SocketAddr::new(ip, port),
            data_dir,
            backend,
            firebase,
            admin_api_key: get(ADMIN_API_KEY_ENV),
            public_base_url,
            media_url_secret,
            media_url_ttl,
            max_upload_bytes,
            utc_offset_minutes,
            monetary_links,
            log_format,
        })
    }
}

fn parse_or<T>(value: Option<String>, name: &'static str, default: T) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match value {
        Some(value) => value.trim().parse().map_err(|e| invalid(name, &value, e)),
        None => Ok(default),
    }
}

/// An http(s) URL from `value`, or `default` when unset.
fn web_url_or(
    value: Option<String>,
    name: &'static str,
    default: String,
) -> Result<String, ConfigError> {
    let Some(value) = value else {
        return Ok(default);
    };
    let url = Url::parse(value.trim()).map_err(|e| invalid(name, &value, e))?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err(invalid(name, &value, "expected an http or https URL"));
    }
    Ok(url.to_string())
}
