use secrecy::SecretString;

use crate::error::{CoreResult, ShipRatesError};

pub const DEFAULT_SHIPHAWK_BASE_URL: &str = "https://api.shiphawk.com";
pub const DEFAULT_USPS_BASE_URL: &str = "https://apis.usps.com";
pub const DEFAULT_PORT: u16 = 8080;
pub const DEFAULT_STATIC_DIR: &str = "dist";

/// Process configuration, read from environment variables. Credentials are
/// required; base URLs, the listen port, and the static dir have defaults.
#[derive(Debug, Clone)]
pub struct Config {
    pub shiphawk_api_key: SecretString,
    pub shiphawk_base_url: String,
    pub usps_consumer_key: SecretString,
    pub usps_consumer_secret: SecretString,
    pub usps_base_url: String,
    pub port: u16,
    pub static_dir: String,
}

impl Config {
    /// Load configuration from the process environment.
    pub fn load() -> CoreResult<Self> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Build a Config from an arbitrary variable lookup. Lets tests supply
    /// variables without touching the process environment.
    pub fn from_lookup<F>(lookup: F) -> CoreResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let required = |name: &str| -> CoreResult<String> {
            lookup(name)
                .filter(|v| !v.is_empty())
                .ok_or_else(|| {
                    ShipRatesError::Config(format!("{name} environment variable is required"))
                })
        };
        let defaulted =
            |name: &str, default: &str| lookup(name).unwrap_or_else(|| default.to_string());

        let port = match lookup("PORT") {
            Some(raw) => raw.parse::<u16>().map_err(|_| {
                ShipRatesError::Config(format!("PORT must be a port number, got {raw:?}"))
            })?,
            None => DEFAULT_PORT,
        };

        Ok(Self {
            shiphawk_api_key: required("SHIPHAWK_API_KEY")?.into(),
            shiphawk_base_url: defaulted("SHIPHAWK_BASE_URL", DEFAULT_SHIPHAWK_BASE_URL),
            usps_consumer_key: required("USPS_CONSUMER_KEY")?.into(),
            usps_consumer_secret: required("USPS_CONSUMER_SECRET")?.into(),
            usps_base_url: defaulted("USPS_BASE_URL", DEFAULT_USPS_BASE_URL),
            port,
            static_dir: defaulted("STATIC_DIR", DEFAULT_STATIC_DIR),
        })
    }
}
