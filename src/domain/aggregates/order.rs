//! Order Aggregate

use chrono::{DateTime, Utc};
use rand::Rng;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;
use crate::domain::aggregates::{Address, CartStore};
use crate::domain::events::{DomainEvent, OrderEvent};
use crate::domain::value_objects::{Money, MoneyError, ProductId, UserId};

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    id: String,
    order_number: String,
    customer: Customer,
    items: Vec<OrderItem>,
    total_amount: Money,
    shipping_address: ShippingAddress,
    shipping_cost: Money,
    tax: Money,
    status: OrderStatus,
    payment_status: PaymentStatus,
    note: Option<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
    #[serde(skip)]
    events: Vec<DomainEvent>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Customer { pub user_id: Option<UserId>, pub name: String, pub email: String, pub phone: Option<String> }

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderItem { pub product_id: ProductId, pub name: String, pub price: Money, pub quantity: u32, pub image: Option<String> }

impl OrderItem {
    pub fn total(&self) -> Result<Money, MoneyError> { self.price.checked_multiply(self.quantity) }
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShippingAddress { pub full_name: String, pub phone: String, pub street: String, pub ward: String, pub district: String, pub province: String }

impl From<&Address> for ShippingAddress {
    fn from(a: &Address) -> Self {
        Self {
            full_name: a.full_name.clone(), phone: a.phone_number.to_string(), street: a.street_address.clone(),
            ward: a.ward_name.clone(), district: a.district_name.clone(), province: a.province_name.clone(),
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OrderStatus { #[default] Pending, Processing, Shipped, Delivered, Cancelled }

impl OrderStatus {
    pub fn is_terminal(self) -> bool { matches!(self, Self::Delivered | Self::Cancelled) }
    pub fn as_str(self) -> &'static str {
        match self { Self::Pending => "pending", Self::Processing => "processing", Self::Shipped => "shipped", Self::Delivered => "delivered", Self::Cancelled => "cancelled" }
    }
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { f.write_str(self.as_str()) }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PaymentStatus { #[default] Pending, Paid, Failed }

impl Order {
    /// Builds an order from explicit items; the total is items plus shipping and tax.
    pub fn place(customer: Customer, items: Vec<OrderItem>, shipping_address: ShippingAddress, shipping_cost: Money, tax: Money) -> Result<Self, OrderError> {
        let Some(first) = items.first() else { return Err(OrderError::NoItems) };
        let currency = first.price.currency().to_string();
        if items.iter().any(|i| i.quantity == 0) { return Err(OrderError::InvalidQuantity); }
        if items.iter().any(|i| i.price.is_negative()) || shipping_cost.is_negative() || tax.is_negative() {
            return Err(OrderError::NegativeAmount);
        }
        let mut total = Money::zero(&currency);
        for item in &items {
            total = total.checked_add(&item.total()?)?;
        }
        total = total.checked_add(&shipping_cost)?.checked_add(&tax)?;
        let now = Utc::now();
        let mut order = Self {
            id: Uuid::new_v4().to_string(), order_number: generate_order_number(now), customer, items,
            total_amount: total, shipping_address, shipping_cost, tax,
            status: OrderStatus::Pending, payment_status: PaymentStatus::Pending, note: None,
            created_at: now, updated_at: now, events: vec![],
        };
        order.raise_event(DomainEvent::Order(OrderEvent::Placed { order_id: order.id.clone(), total: order.total_amount.amount() }));
        Ok(order)
    }

    /// Turns the cart into an order. The cart itself is left for the caller to clear.
    pub fn checkout(cart: &CartStore, customer: Customer, deliver_to: &Address, shipping_cost: Money, tax: Money) -> Result<Self, OrderError> {
        if cart.is_empty() { return Err(OrderError::NoItems); }
        let items = cart.lines().iter().map(|l| OrderItem {
            product_id: l.product_id.clone(), name: l.name.clone(), price: l.unit_price.clone(),
            quantity: l.quantity.value(), image: l.image_refs.first().cloned(),
        }).collect();
        Self::place(customer, items, ShippingAddress::from(deliver_to), shipping_cost, tax)
    }

    pub fn id(&self) -> &str { &self.id }
    pub fn order_number(&self) -> &str { &self.order_number }
    pub fn customer(&self) -> &Customer { &self.customer }
    pub fn items(&self) -> &[OrderItem] { &self.items }
    pub fn total(&self) -> &Money { &self.total_amount }
    pub fn shipping_address(&self) -> &ShippingAddress { &self.shipping_address }
    pub fn status(&self) -> OrderStatus { self.status }
    pub fn payment_status(&self) -> PaymentStatus { self.payment_status }
    pub fn note(&self) -> Option<&str> { self.note.as_deref() }
    pub fn created_at(&self) -> DateTime<Utc> { self.created_at }

    /// Counts toward revenue: paid and not cancelled.
    pub fn is_revenue(&self) -> bool { self.payment_status == PaymentStatus::Paid && self.status != OrderStatus::Cancelled }

    pub fn with_note(mut self, note: impl Into<String>) -> Self { self.note = Some(note.into()); self }

    /// Delivered and cancelled orders are final.
    pub fn update_status(&mut self, status: OrderStatus) -> Result<(), OrderError> {
        if self.status == status { return Ok(()); }
        if self.status.is_terminal() { return Err(OrderError::Finalized(self.status)); }
        self.status = status;
        self.touch();
        self.raise_event(DomainEvent::Order(OrderEvent::StatusChanged { order_id: self.id.clone(), status: status.to_string() }));
        Ok(())
    }

    pub fn cancel(&mut self) -> Result<(), OrderError> { self.update_status(OrderStatus::Cancelled) }

    pub fn mark_paid(&mut self) -> Result<(), OrderError> {
        if self.status == OrderStatus::Cancelled { return Err(OrderError::Finalized(self.status)); }
        self.payment_status = PaymentStatus::Paid;
        self.touch();
        self.raise_event(DomainEvent::Order(OrderEvent::Paid { order_id: self.id.clone() }));
        Ok(())
    }

    pub fn mark_payment_failed(&mut self) { self.payment_status = PaymentStatus::Failed; self.touch(); }

    #[cfg(test)]
    pub(crate) fn backdate(&mut self, at: DateTime<Utc>) { self.created_at = at; self.updated_at = at; }

    pub fn take_events(&mut self) -> Vec<DomainEvent> { std::mem::take(&mut self.events) }
    fn raise_event(&mut self, e: DomainEvent) { self.events.push(e); }
    fn touch(&mut self) { self.updated_at = Utc::now(); }
}

/// `ORD-<last 6 digits of epoch millis>-<4 random digits>`
fn generate_order_number(at: DateTime<Utc>) -> String {
    let millis = at.timestamp_millis().rem_euclid(1_000_000);
    let suffix: u32 = rand::thread_rng().gen_range(0..10_000);
    format!("ORD-{millis:06}-{suffix:04}")
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum OrderError {
    #[error("order has no items")]
    NoItems,
    #[error("order item quantity must be at least 1")]
    InvalidQuantity,
    #[error("order amounts must not be negative")]
    NegativeAmount,
    #[error("order amounts use different currencies")]
    CurrencyMismatch,
    #[error("order total is too large")]
    AmountOverflow,
    #[error("order is already {0}")]
    Finalized(OrderStatus),
}

impl From<MoneyError> for OrderError {
    fn from(e: MoneyError) -> Self {
        match e { MoneyError::CurrencyMismatch => Self::CurrencyMismatch, MoneyError::Overflow => Self::AmountOverflow }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::aggregates::NewCartLine;

    fn usd(v: i64) -> Money { Money::usd(Decimal::new(v, 0)) }

    fn customer() -> Customer {
        Customer { user_id: Some(UserId::new("u1").unwrap()), name: "Test".into(), email: "test@example.com".into(), phone: None }
    }

    #[test]
    fn test_checkout_from_cart() {
        let mut cart = CartStore::new(UserId::new("u1").unwrap(), "USD");
        cart.add_item(NewCartLine::new("p1", "Widget", usd(10)).with_quantity(2).with_images(vec!["img-1".into()]));
        cart.add_item(NewCartLine::new("p2", "Gadget", usd(5)));
        let order = Order::checkout(&cart, customer(), &Address::for_test(), usd(3), usd(2)).unwrap();
        assert_eq!(order.total().amount(), Decimal::new(30, 0));
        assert_eq!(order.items().len(), 2);
        assert_eq!(order.items()[0].image.as_deref(), Some("img-1"));
        assert_eq!(order.shipping_address().ward, "Phuc Tan");
        assert_eq!(order.status(), OrderStatus::Pending);
        assert!(order.order_number().starts_with("ORD-"));
        assert_eq!(order.order_number().len(), "ORD-123456-1234".len());
    }

    #[test]
    fn test_empty_cart_rejected() {
        let cart = CartStore::new(UserId::new("u1").unwrap(), "USD");
        assert_eq!(Order::checkout(&cart, customer(), &Address::for_test(), usd(0), usd(0)), Err(OrderError::NoItems));
    }

    #[test]
    fn test_mixed_currency_rejected() {
        let item = OrderItem { product_id: "p1".into(), name: "W".into(), price: usd(1), quantity: 1, image: None };
        let result = Order::place(customer(), vec![item], ShippingAddress::default(), Money::zero("VND"), usd(0));
        assert_eq!(result, Err(OrderError::CurrencyMismatch));
    }

    #[test]
    fn test_oversized_amounts_rejected() {
        let huge = OrderItem { product_id: "p1".into(), name: "W".into(), price: Money::usd(Decimal::MAX), quantity: 2, image: None };
        assert_eq!(Order::place(customer(), vec![huge], ShippingAddress::default(), usd(0), usd(0)), Err(OrderError::AmountOverflow));
        let single = OrderItem { product_id: "p1".into(), name: "W".into(), price: Money::usd(Decimal::MAX), quantity: 1, image: None };
        assert_eq!(Order::place(customer(), vec![single], ShippingAddress::default(), usd(1), usd(0)), Err(OrderError::AmountOverflow));
    }

    #[test]
    fn test_status_workflow() {
        let item = OrderItem { product_id: "p1".into(), name: "W".into(), price: usd(10), quantity: 1, image: None };
        let mut order = Order::place(customer(), vec![item], ShippingAddress::default(), usd(0), usd(0)).unwrap();
        order.update_status(OrderStatus::Processing).unwrap();
        order.mark_paid().unwrap();
        assert!(order.is_revenue());
        order.update_status(OrderStatus::Delivered).unwrap();
        assert_eq!(order.cancel(), Err(OrderError::Finalized(OrderStatus::Delivered)));
        assert_eq!(order.take_events().len(), 4);
    }

    #[test]
    fn test_serde_shape() {
        let item = OrderItem { product_id: "p1".into(), name: "W".into(), price: usd(10), quantity: 1, image: None };
        let order = Order::place(customer(), vec![item], ShippingAddress::default(), usd(0), usd(0)).unwrap();
        let json = serde_json::to_value(&order).unwrap();
        assert_eq!(json["status"], "pending");
        assert_eq!(json["paymentStatus"], "pending");
        assert!(json.get("events").is_none());
        let back: Order = serde_json::from_value(json).unwrap();
        assert_eq!(back.id(), order.id());
    }
}
