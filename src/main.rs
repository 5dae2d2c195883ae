//! OpenSASE Storefront - order dashboard API

use anyhow::Result;
use opensase_storefront::api::{self, AppState};
use opensase_storefront::config::StorefrontConfig;
use opensase_storefront::location::{HttpLocationService, LocationService};
use opensase_storefront::storage::{DocumentStore, FileDocumentStore, MemoryDocumentStore, OrderRepository};
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

async fn document_store(config: &StorefrontConfig) -> opensase_storefront::Result<Arc<dyn DocumentStore>> {
    match &config.data_dir {
        Some(dir) => {
            let store = FileDocumentStore::open(dir).await?;
            tracing::info!(path = %store.root().display(), "using file document store");
            Ok(Arc::new(store))
        }
        None => {
            tracing::warn!("STOREFRONT_DATA_DIR not set; documents are kept in memory only");
            Ok(Arc::new(MemoryDocumentStore::new()))
        }
    }
}

fn location_service(config: &StorefrontConfig) -> opensase_storefront::Result<Arc<dyn LocationService>> {
    let service = HttpLocationService::new(&config.location_api_url, config.location_layout.routes(), config.location_timeout)?;
    Ok(Arc::new(service))
}

#[tokio::main]
async fn main() -> Result<()> {
    let config = StorefrontConfig::from_env()?;
    tracing_subscriber::registry().with(tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into())).with(tracing_subscriber::fmt::layer()).init();

    let store = document_store(&config).await?;
    let state = AppState {
        orders: Arc::new(OrderRepository::new(store)),
        locations: location_service(&config)?,
        currency: config.currency.clone(),
    };
    let app = api::router(state).layer(TraceLayer::new_for_http()).layer(CorsLayer::permissive());

    let addr = config.socket_addr();
    tracing::info!(%addr, location_api = %config.location_api_url, "OpenSASE Storefront listening");
    axum::serve(tokio::net::TcpListener::bind(addr).await?, app).await?;
    Ok(())
}
