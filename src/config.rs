use std::env;
use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};

use crate::models::GeoPoint;
use crate::services::images::validate::{DEFAULT_TRUSTED_DOMAINS, DEFAULT_VALIDATION_TIMEOUT};

#[derive(Debug, Clone)]
pub struct ImageConfig {
    pub unsplash_enabled: bool,
    pub pexels_api_key: Option<String>,
    pub pixabay_api_key: Option<String>,
    pub trusted_domains: Vec<String>,
    pub validation_timeout: Duration,
    pub search_timeout: Duration,
}

impl Default for ImageConfig {
    fn default() -> Self {
        Self {
            unsplash_enabled: true,
            pexels_api_key: None,
            pixabay_api_key: None,
            trusted_domains: DEFAULT_TRUSTED_DOMAINS.iter().map(|d| d.to_string()).collect(),
            validation_timeout: DEFAULT_VALIDATION_TIMEOUT,
            search_timeout: Duration::from_secs(5),
        }
    }
}

#[derive(Debug, Clone)]
pub struct ApiConfig {
    pub base_url: String,
    /// Issued by the identity provider; absent means vendor calls are disabled.
    pub vendor_token: Option<String>,
}

#[derive(Debug, Clone)]
pub struct DeliveryConfig {
    pub phone: String,
    pub password: String,
    pub ping_interval: Duration,
    pub session_file: PathBuf,
    pub location: GeoPoint,
}

#[derive(Debug, Clone)]
pub struct Config {
    pub server_addr: String,
    pub api: ApiConfig,
    pub images: ImageConfig,
    pub delivery: Option<DeliveryConfig>,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        let defaults = ImageConfig::default();

        let images = ImageConfig {
            unsplash_enabled: env_flag("UNSPLASH_ENABLED", true),
            pexels_api_key: optional("PEXELS_API_KEY"),
            pixabay_api_key: optional("PIXABAY_API_KEY"),
            trusted_domains: optional("IMAGE_TRUSTED_DOMAINS")
                .map(|raw| raw.split(',').map(|d| d.trim().to_string()).collect())
                .unwrap_or(defaults.trusted_domains),
            validation_timeout: seconds("IMAGE_VALIDATION_TIMEOUT_SECS", defaults.validation_timeout)?,
            search_timeout: seconds("IMAGE_SEARCH_TIMEOUT_SECS", defaults.search_timeout)?,
        };

        let api = ApiConfig {
            base_url: env::var("VENDOR_API_URL").unwrap_or_else(|_| "http://127.0.0.1:5000/api".to_string()),
            vendor_token: optional("VENDOR_TOKEN"),
        };

        Ok(Self {
            server_addr: env::var("SERVER_ADDR").unwrap_or_else(|_| "0.0.0.0:8080".to_string()),
            api,
            images,
            delivery: Self::delivery_from_env()?,
        })
    }

    /// Delivery tracking is on only when both credentials are present.
    fn delivery_from_env() -> Result<Option<DeliveryConfig>> {
        let (Some(phone), Some(password)) = (optional("DELIVERY_PHONE"), optional("DELIVERY_PASSWORD")) else {
            return Ok(None);
        };

        let lat: f64 = env::var("DELIVERY_LAT")
            .context("DELIVERY_LAT must be set when DELIVERY_PHONE is")?
            .parse()
            .context("DELIVERY_LAT must be a number")?;
        let lng: f64 = env::var("DELIVERY_LNG")
            .context("DELIVERY_LNG must be set when DELIVERY_PHONE is")?
            .parse()
            .context("DELIVERY_LNG must be a number")?;

        Ok(Some(DeliveryConfig {
            phone,
            password,
            ping_interval: seconds("DELIVERY_PING_INTERVAL_SECS", Duration::from_secs(30))?,
            session_file: optional("DELIVERY_SESSION_FILE")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from("delivery_session.json")),
            location: GeoPoint::new(lat, lng)?,
        }))
    }
}

fn optional(key: &str) -> Option<String> {
    env::var(key).ok().map(|v| v.trim().to_string()).filter(|v| !v.is_empty())
}

fn env_flag(key: &str, default: bool) -> bool {
    match optional(key).as_deref() {
        Some("1") | Some("true") | Some("yes") => true,
        Some("0") | Some("false") | Some("no") => false,
        Some(other) => {
            log::warn!("⚠️ {} has unrecognised value '{}', using {}", key, other, default);
            default
        }
        None => default,
    }
}

fn seconds(key: &str, default: Duration) -> Result<Duration> {
    match optional(key) {
        Some(raw) => {
            let secs: u64 = raw
                .parse()
                .with_context(|| format!("{} must be a whole number of seconds, got '{}'", key, raw))?;
            Ok(Duration::from_secs(secs))
        }
        None => Ok(default),
    }
}
