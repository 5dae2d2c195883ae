//! OpenSASE Storefront
//!
//! Customer-side storefront state and the admin order dashboard.
//!
//! ## Features
//! - Per-user shopping cart with derived totals
//! - Address book with cascading province / district / ward selection
//! - Local-first persistence through a keyed document store
//! - Order checkout, status tracking and revenue analytics

pub mod address_editor;
pub mod address_form;
pub mod api;
pub mod config;
pub mod domain;
pub mod location;
pub mod selector;
pub mod session;
pub mod storage;

use thiserror::Error;

use crate::address_editor::EditorError;
use crate::config::ConfigError;
use crate::domain::aggregates::{AddressBookError, OrderError};
use crate::location::LocationError;
use crate::selector::SelectorError;
use crate::storage::StorageError;

// =============================================================================
// Error Types
// =============================================================================

#[derive(Error, Debug)]
pub enum StorefrontError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Location service error: {0}")]
    Location(#[from] LocationError),

    #[error("Address selection error: {0}")]
    Selector(#[from] SelectorError),

    #[error("Address book error: {0}")]
    AddressBook(#[from] AddressBookError),

    #[error("Address editor error: {0}")]
    Editor(#[from] EditorError),

    #[error("Order error: {0}")]
    Order(#[from] OrderError),

    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),
}

pub type Result<T> = std::result::Result<T, StorefrontError>;
