use async_trait::async_trait;
use std::time::Duration;

use super::{parse_options, LocationError, LocationLevel, LocationOption, LocationService};

/// Path templates for the three lookups; `{code}` is replaced by the parent code.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LocationRoutes {
    pub provinces: String,
    pub districts: String,
    pub wards: String,
}

impl LocationRoutes {
    /// `GET /provinces`, `GET /provinces/{code}/districts`, `GET /districts/{code}/wards`.
    pub fn rest() -> Self {
        Self { provinces: "/provinces".into(), districts: "/provinces/{code}/districts".into(), wards: "/districts/{code}/wards".into() }
    }

    /// Layout of the public provinces.open-api.vn service.
    pub fn open_api_vn() -> Self {
        Self { provinces: "/p/".into(), districts: "/p/{code}?depth=2".into(), wards: "/d/{code}?depth=2".into() }
    }

    fn path(&self, level: LocationLevel, code: &str) -> String {
        let template = match level { LocationLevel::Province => &self.provinces, LocationLevel::District => &self.districts, LocationLevel::Ward => &self.wards };
        template.replace("{code}", code)
    }
}

impl Default for LocationRoutes {
    fn default() -> Self { Self::rest() }
}

#[derive(Clone, Debug)]
pub struct HttpLocationService {
    client: reqwest::Client,
    base_url: String,
    routes: LocationRoutes,
}

impl HttpLocationService {
    pub fn new(base_url: impl Into<String>, routes: LocationRoutes, timeout: Duration) -> Result<Self, LocationError> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self { client, base_url: base_url.into().trim_end_matches('/').to_string(), routes })
    }

    /// Lookup URL; `code` is ignored for provinces.
    pub fn url(&self, level: LocationLevel, code: &str) -> Result<String, LocationError> {
        let segment = match level {
            LocationLevel::Province => String::new(),
            LocationLevel::District | LocationLevel::Ward => encode_segment(level, code)?,
        };
        Ok(format!("{}{}", self.base_url, self.routes.path(level, &segment)))
    }

    async fn fetch(&self, level: LocationLevel, code: &str) -> Result<Vec<LocationOption>, LocationError> {
        let url = self.url(level, code)?;
        tracing::debug!(%url, %level, "fetching location options");
        let response = self.client.get(&url).send().await?;
        let status = response.status();
        if status == reqwest::StatusCode::NOT_FOUND && level != LocationLevel::Province {
            return Err(LocationError::NotFound { level: level.parent().unwrap_or(level), code: code.to_string() });
        }
        if !status.is_success() {
            return Err(LocationError::Status(status.as_u16()));
        }
        let body = response.text().await?;
        parse_options(&body)
    }
}

/// Percent-encodes a parent code into a single path segment. Blank and dot
/// codes cannot name a parent.
fn encode_segment(level: LocationLevel, code: &str) -> Result<String, LocationError> {
    let code = code.trim();
    if code.is_empty() || code == "." || code == ".." {
        return Err(LocationError::NotFound { level: level.parent().unwrap_or(level), code: code.to_string() });
    }
    Ok(urlencoding::encode(code).into_owned())
}

#[async_trait]
impl LocationService for HttpLocationService {
    async fn provinces(&self) -> Result<Vec<LocationOption>, LocationError> {
        self.fetch(LocationLevel::Province, "").await
    }

    async fn districts(&self, province_code: &str) -> Result<Vec<LocationOption>, LocationError> {
        self.fetch(LocationLevel::District, province_code).await
    }

    async fn wards(&self, district_code: &str) -> Result<Vec<LocationOption>, LocationError> {
        self.fetch(LocationLevel::Ward, district_code).await
    }
}
