//! Domain events
use crate::domain::value_objects::ProductId;
use rust_decimal::Decimal;

#[derive(Clone, Debug, PartialEq)]
pub enum DomainEvent {
    Cart(CartEvent),
    Address(AddressEvent),
    Order(OrderEvent),
}

#[derive(Clone, Debug, PartialEq)]
pub enum CartEvent {
    ItemAdded { product_id: ProductId, quantity: u32 },
    QuantityChanged { product_id: ProductId, quantity: u32 },
    ItemRemoved { product_id: ProductId },
    Cleared { lines: usize },
}

#[derive(Clone, Debug, PartialEq)]
pub enum AddressEvent {
    Added { address_id: String },
    Updated { address_id: String },
    Removed { address_id: String },
    DefaultChanged { address_id: String },
}

#[derive(Clone, Debug, PartialEq)]
pub enum OrderEvent {
    Placed { order_id: String, total: Decimal },
    StatusChanged { order_id: String, status: String },
    Paid { order_id: String },
}
