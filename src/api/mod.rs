//! Admin dashboard HTTP API.

mod locations;
mod orders;

use axum::{http::StatusCode, response::{IntoResponse, Response}, routing::{get, put}, Json, Router};
use std::sync::Arc;
use thiserror::Error;

use crate::domain::aggregates::OrderError;
use crate::location::{LocationError, LocationService};
use crate::storage::{OrderRepository, StorageError};

pub use orders::{CreateOrderRequest, OrderItemRequest, StatusUpdate};

#[derive(Clone)]
pub struct AppState {
    pub orders: Arc<OrderRepository>,
    pub locations: Arc<dyn LocationService>,
    /// Currency for order prices given as bare amounts.
    pub currency: String,
}

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("{0} not found")]
    NotFound(&'static str),
    #[error(transparent)]
    Order(#[from] OrderError),
    #[error(transparent)]
    Storage(#[from] StorageError),
    #[error(transparent)]
    Location(#[from] LocationError),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match &self {
            Self::NotFound(_) | Self::Location(LocationError::NotFound { .. }) => StatusCode::NOT_FOUND,
            Self::Order(OrderError::Finalized(_)) => StatusCode::CONFLICT,
            Self::Order(_) => StatusCode::BAD_REQUEST,
            Self::Storage(e) => {
                tracing::error!(error = %e, "storage failure while serving request");
                StatusCode::INTERNAL_SERVER_ERROR
            }
            Self::Location(e) => {
                tracing::warn!(error = %e, "location service failure");
                StatusCode::BAD_GATEWAY
            }
        };
        (status, Json(serde_json::json!({"error": self.to_string()}))).into_response()
    }
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(|| async { Json(serde_json::json!({"status": "healthy", "service": "opensase-storefront"})) }))
        .route("/api/v1/orders", get(orders::list_orders).post(orders::create_order))
        .route("/api/v1/orders/stats", get(orders::order_stats))
        .route("/api/v1/orders/revenue/monthly", get(orders::monthly_revenue))
        .route("/api/v1/orders/:id", get(orders::get_order).delete(orders::delete_order))
        .route("/api/v1/orders/:id/status", put(orders::update_status))
        .route("/api/v1/locations/provinces", get(locations::provinces))
        .route("/api/v1/locations/provinces/:code/districts", get(locations::districts))
        .route("/api/v1/locations/districts/:code/wards", get(locations::wards))
        .with_state(state)
}
