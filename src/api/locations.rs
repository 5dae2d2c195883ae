//! Pass-through to the location service for the dashboard's address pickers.

use axum::{extract::{Path, State}, Json};

use super::{ApiError, AppState};
use crate::location::LocationOption;

pub async fn provinces(State(s): State<AppState>) -> Result<Json<Vec<LocationOption>>, ApiError> {
    Ok(Json(s.locations.provinces().await?))
}

pub async fn districts(State(s): State<AppState>, Path(code): Path<String>) -> Result<Json<Vec<LocationOption>>, ApiError> {
    Ok(Json(s.locations.districts(&code).await?))
}

pub async fn wards(State(s): State<AppState>, Path(code): Path<String>) -> Result<Json<Vec<LocationOption>>, ApiError> {
    Ok(Json(s.locations.wards(&code).await?))
}

#[cfg(test)]
mod tests {
    use crate::api::testing::{app, send};
    use axum::http::StatusCode;

    #[tokio::test]
    async fn test_cascade_lookup() {
        let app = app();
        let (status, provinces) = send(&app, "GET", "/api/v1/locations/provinces", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(provinces[0]["name"], "Ha Noi");

        let (_, districts) = send(&app, "GET", "/api/v1/locations/provinces/01/districts", None).await;
        assert_eq!(districts[0]["code"], "002");
        let (_, wards) = send(&app, "GET", "/api/v1/locations/districts/002/wards", None).await;
        assert_eq!(wards[0]["code"], "00037");
    }

    #[tokio::test]
    async fn test_unknown_parent_is_not_found() {
        let (status, body) = send(&app(), "GET", "/api/v1/locations/provinces/99/districts", None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert!(body["error"].as_str().unwrap().contains("99"));
    }
}
