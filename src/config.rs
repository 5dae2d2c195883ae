//! Service configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! - `HOST` - Bind address (default: 0.0.0.0)
//! - `PORT` - Listen port (default: 8083)
//! - `STOREFRONT_DATA_DIR` - Directory for JSON documents; in-memory store when unset
//! - `LOCATION_API_URL` - Location service base URL (default: https://provinces.open-api.vn/api)
//! - `LOCATION_API_LAYOUT` - `open-api-vn` (default) or `rest`
//! - `LOCATION_API_TIMEOUT_SECS` - Location request timeout (default: 10)
//! - `STOREFRONT_CURRENCY` - ISO currency for carts and orders (default: USD)

use std::net::{IpAddr, SocketAddr};
use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;

use crate::location::LocationRoutes;

pub const DEFAULT_LOCATION_API_URL: &str = "https://provinces.open-api.vn/api";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum LocationLayout {
    #[default]
    OpenApiVn,
    Rest,
}

impl LocationLayout {
    pub fn routes(self) -> LocationRoutes {
        match self { Self::OpenApiVn => LocationRoutes::open_api_vn(), Self::Rest => LocationRoutes::rest() }
    }
}

impl std::str::FromStr for LocationLayout {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "open-api-vn" => Ok(Self::OpenApiVn),
            "rest" => Ok(Self::Rest),
            other => Err(format!("unknown layout {other:?}, expected open-api-vn or rest")),
        }
    }
}

#[derive(Clone, Debug)]
pub struct StorefrontConfig {
    pub host: IpAddr,
    pub port: u16,
    /// File-backed documents live here; `None` keeps everything in memory.
    pub data_dir: Option<PathBuf>,
    pub location_api_url: String,
    pub location_layout: LocationLayout,
    pub location_timeout: Duration,
    pub currency: String,
}

impl StorefrontConfig {
    /// Loads `.env` if present, then reads the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        let _ = dotenvy::dotenv();
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let get = |name: &str, default: &str| lookup(name).filter(|v| !v.trim().is_empty()).unwrap_or_else(|| default.to_string());

        let host = parse("HOST", &get("HOST", "0.0.0.0"))?;
        let port = parse("PORT", &get("PORT", "8083"))?;
        let data_dir = lookup("STOREFRONT_DATA_DIR").filter(|v| !v.trim().is_empty()).map(PathBuf::from);
        let location_api_url = get("LOCATION_API_URL", DEFAULT_LOCATION_API_URL).trim_end_matches('/').to_string();
        if !location_api_url.starts_with("http://") && !location_api_url.starts_with("https://") {
            return Err(ConfigError::InvalidEnvVar("LOCATION_API_URL".into(), "must be an http(s) URL".into()));
        }
        let location_layout = parse("LOCATION_API_LAYOUT", &get("LOCATION_API_LAYOUT", "open-api-vn"))?;
        let timeout_secs: u64 = parse("LOCATION_API_TIMEOUT_SECS", &get("LOCATION_API_TIMEOUT_SECS", "10"))?;
        if timeout_secs == 0 {
            return Err(ConfigError::InvalidEnvVar("LOCATION_API_TIMEOUT_SECS".into(), "must be at least 1".into()));
        }
        let currency = get("STOREFRONT_CURRENCY", "USD").trim().to_uppercase();
        if currency.len() != 3 || !currency.chars().all(|c| c.is_ascii_alphabetic()) {
            return Err(ConfigError::InvalidEnvVar("STOREFRONT_CURRENCY".into(), format!("{currency:?} is not a 3-letter code")));
        }

        Ok(Self { host, port, data_dir, location_api_url, location_layout, location_timeout: Duration::from_secs(timeout_secs), currency })
    }

    pub fn socket_addr(&self) -> SocketAddr { SocketAddr::new(self.host, self.port) }
}

fn parse<T>(name: &str, value: &str) -> Result<T, ConfigError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    value.trim().parse::<T>().map_err(|e| ConfigError::InvalidEnvVar(name.to_string(), e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn load(vars: &[(&str, &str)]) -> Result<StorefrontConfig, ConfigError> {
        let vars: HashMap<String, String> = vars.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect();
        StorefrontConfig::from_lookup(|name| vars.get(name).cloned())
    }

    #[test]
    fn test_defaults() {
        let config = load(&[]).unwrap();
        assert_eq!(config.socket_addr().to_string(), "0.0.0.0:8083");
        assert!(config.data_dir.is_none());
        assert_eq!(config.location_api_url, DEFAULT_LOCATION_API_URL);
        assert_eq!(config.location_layout, LocationLayout::OpenApiVn);
        assert_eq!(config.location_timeout, Duration::from_secs(10));
        assert_eq!(config.currency, "USD");
    }

    #[test]
    fn test_overrides() {
        let config = load(&[
            ("PORT", "9000"), ("STOREFRONT_DATA_DIR", "/var/lib/storefront"), ("LOCATION_API_URL", "http://localhost:4000/"),
            ("LOCATION_API_LAYOUT", "REST"), ("STOREFRONT_CURRENCY", "vnd"),
        ]).unwrap();
        assert_eq!(config.port, 9000);
        assert_eq!(config.data_dir, Some(PathBuf::from("/var/lib/storefront")));
        assert_eq!(config.location_api_url, "http://localhost:4000");
        assert_eq!(config.location_layout, LocationLayout::Rest);
        assert_eq!(config.currency, "VND");
    }

    #[test]
    fn test_invalid_values_name_the_variable() {
        for (name, value) in [("PORT", "eighty"), ("HOST", "nowhere"), ("LOCATION_API_LAYOUT", "graphql"), ("LOCATION_API_TIMEOUT_SECS", "0"), ("STOREFRONT_CURRENCY", "dollars"), ("LOCATION_API_URL", "ftp://x")] {
            match load(&[(name, value)]) {
                Err(ConfigError::InvalidEnvVar(var, _)) => assert_eq!(var, name),
                other => panic!("{name}={value} gave {other:?}"),
            }
        }
    }
}
