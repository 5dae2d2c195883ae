//! Domain layer: value objects, aggregates, events and dashboard analytics.
pub mod value_objects;
pub mod aggregates;
pub mod events;
pub mod analytics;
