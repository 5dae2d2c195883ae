//! Administrative location reference data (province, district, ward).
//!
//! Responses from the location service are parsed into [`LocationOption`]
//! values at the boundary; nothing downstream touches raw JSON.

mod http;
mod memory;

pub use http::{HttpLocationService, LocationRoutes};
pub use memory::StaticLocationService;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Codes the picker uses for "nothing selected".
pub const SENTINEL_CODES: [&str; 2] = ["", "0"];

#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct LocationOption {
    pub code: String,
    pub name: String,
}

impl LocationOption {
    pub fn new(code: impl Into<String>, name: impl Into<String>) -> Self {
        Self { code: code.into(), name: name.into() }
    }

    pub fn is_sentinel(&self) -> bool { SENTINEL_CODES.contains(&self.code.trim()) }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LocationLevel {
    Province,
    District,
    Ward,
}

impl LocationLevel {
    pub const ALL: [LocationLevel; 3] = [Self::Province, Self::District, Self::Ward];

    pub fn parent(self) -> Option<Self> {
        match self { Self::Province => None, Self::District => Some(Self::Province), Self::Ward => Some(Self::District) }
    }

    pub fn child(self) -> Option<Self> {
        match self { Self::Province => Some(Self::District), Self::District => Some(Self::Ward), Self::Ward => None }
    }

    pub(crate) fn index(self) -> usize {
        match self { Self::Province => 0, Self::District => 1, Self::Ward => 2 }
    }
}

impl fmt::Display for LocationLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self { Self::Province => write!(f, "province"), Self::District => write!(f, "district"), Self::Ward => write!(f, "ward") }
    }
}

#[derive(Debug, Error)]
pub enum LocationError {
    #[error("location request failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("location service returned status {0}")]
    Status(u16),
    #[error("malformed location response: {0}")]
    Malformed(String),
    #[error("unknown {level} code {code}")]
    NotFound { level: LocationLevel, code: String },
}

#[async_trait]
pub trait LocationService: Send + Sync {
    async fn provinces(&self) -> Result<Vec<LocationOption>, LocationError>;
    async fn districts(&self, province_code: &str) -> Result<Vec<LocationOption>, LocationError>;
    async fn wards(&self, district_code: &str) -> Result<Vec<LocationOption>, LocationError>;

    /// Options for `level`; `parent_code` is ignored for provinces.
    async fn options(&self, level: LocationLevel, parent_code: Option<&str>) -> Result<Vec<LocationOption>, LocationError> {
        match (level, parent_code) {
            (LocationLevel::Province, _) => self.provinces().await,
            (LocationLevel::District, Some(code)) => self.districts(code).await,
            (LocationLevel::Ward, Some(code)) => self.wards(code).await,
            (level, None) => Err(LocationError::Malformed(format!("{level} lookup needs a parent code"))),
        }
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawCode {
    Number(u64),
    Text(String),
}

#[derive(Deserialize)]
struct RawOption {
    code: RawCode,
    name: String,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawList {
    Bare(Vec<RawOption>),
    Wrapped {
        #[serde(alias = "provinces", alias = "districts", alias = "wards")]
        items: Vec<RawOption>,
    },
}

/// Parses a location-service body: either a bare array of `{code, name}` or
/// an object carrying the list under `provinces`, `districts` or `wards`.
/// Codes may be numbers or strings.
pub fn parse_options(body: &str) -> Result<Vec<LocationOption>, LocationError> {
    let raw: RawList = serde_json::from_str(body).map_err(|e| LocationError::Malformed(e.to_string()))?;
    let items = match raw { RawList::Bare(items) | RawList::Wrapped { items } => items };
    items
        .into_iter()
        .map(|item| {
            let code = match item.code { RawCode::Number(n) => n.to_string(), RawCode::Text(s) => s.trim().to_string() };
            let name = item.name.trim().to_string();
            if code.is_empty() || name.is_empty() {
                return Err(LocationError::Malformed("option with empty code or name".into()));
            }
            Ok(LocationOption { code, name })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_bare_array() {
        let opts = parse_options(r#"[{"code":"01","name":"Ha Noi"},{"code":79,"name":"Ho Chi Minh"}]"#).unwrap();
        assert_eq!(opts, vec![LocationOption::new("01", "Ha Noi"), LocationOption::new("79", "Ho Chi Minh")]);
    }

    #[test]
    fn test_parse_wrapped_with_extra_fields() {
        let body = r#"{"name":"Ha Noi","code":1,"division_type":"city","districts":[{"name":"Ba Dinh","code":1,"wards":[]}]}"#;
        assert_eq!(parse_options(body).unwrap(), vec![LocationOption::new("1", "Ba Dinh")]);
    }

    #[test]
    fn test_parse_rejects_bad_shapes() {
        assert!(matches!(parse_options("{}"), Err(LocationError::Malformed(_))));
        assert!(matches!(parse_options("not json"), Err(LocationError::Malformed(_))));
        assert!(matches!(parse_options(r#"[{"code":"1"}]"#), Err(LocationError::Malformed(_))));
        assert!(matches!(parse_options(r#"[{"code":"","name":"x"}]"#), Err(LocationError::Malformed(_))));
        assert!(matches!(parse_options(r#"[{"code":true,"name":"x"}]"#), Err(LocationError::Malformed(_))));
    }

    #[test]
    fn test_sentinel() {
        assert!(LocationOption::new("0", "-- select --").is_sentinel());
        assert!(LocationOption::new("", "").is_sentinel());
        assert!(!LocationOption::new("01", "Ha Noi").is_sentinel());
    }

    #[test]
    fn test_level_links() {
        assert_eq!(LocationLevel::Province.child(), Some(LocationLevel::District));
        assert_eq!(LocationLevel::Ward.parent(), Some(LocationLevel::District));
        assert_eq!(LocationLevel::Ward.child(), None);
    }
}
