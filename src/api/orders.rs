use axum::{extract::{Path, State}, http::StatusCode, Json};
use rust_decimal::Decimal;
use serde::Deserialize;
use serde_json::{json, Value};

use super::{ApiError, AppState};
use crate::domain::aggregates::{Customer, Order, OrderItem, OrderStatus, PaymentStatus, ShippingAddress};
use crate::domain::analytics::{self, MonthlyRevenue, OrderStats};
use crate::domain::value_objects::{Money, ProductId};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderItemRequest { pub product_id: ProductId, pub name: String, pub price: Decimal, pub quantity: u32, pub image: Option<String> }

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateOrderRequest {
    pub customer: Customer,
    pub items: Vec<OrderItemRequest>,
    #[serde(default)]
    pub shipping_address: ShippingAddress,
    #[serde(default)]
    pub shipping_cost: Decimal,
    #[serde(default)]
    pub tax: Decimal,
    pub note: Option<String>,
    #[serde(default)]
    pub payment_status: PaymentStatus,
}

#[derive(Debug, Deserialize)]
pub struct StatusUpdate { pub status: OrderStatus }

fn log_events(order: &mut Order) {
    for event in order.take_events() {
        tracing::info!(order_id = %order.id(), ?event, "order event");
    }
}

pub async fn list_orders(State(s): State<AppState>) -> Result<Json<Vec<Order>>, ApiError> {
    Ok(Json(s.orders.list().await?))
}

pub async fn get_order(State(s): State<AppState>, Path(id): Path<String>) -> Result<Json<Order>, ApiError> {
    s.orders.get(&id).await?.map(Json).ok_or(ApiError::NotFound("order"))
}

pub async fn create_order(State(s): State<AppState>, Json(r): Json<CreateOrderRequest>) -> Result<(StatusCode, Json<Value>), ApiError> {
    let money = |amount: Decimal| Money::new(amount, &s.currency);
    let items = r.items.into_iter().map(|i| OrderItem { product_id: i.product_id, name: i.name, price: money(i.price), quantity: i.quantity, image: i.image }).collect();
    let mut order = Order::place(r.customer, items, r.shipping_address, money(r.shipping_cost), money(r.tax))?;
    if let Some(note) = r.note.filter(|n| !n.trim().is_empty()) { order = order.with_note(note); }
    match r.payment_status {
        PaymentStatus::Paid => order.mark_paid()?,
        PaymentStatus::Failed => order.mark_payment_failed(),
        PaymentStatus::Pending => {}
    }
    log_events(&mut order);
    let order = s.orders.insert(order).await?;
    Ok((StatusCode::CREATED, Json(json!({"message": "Order created successfully", "order": order}))))
}

pub async fn update_status(State(s): State<AppState>, Path(id): Path<String>, Json(r): Json<StatusUpdate>) -> Result<Json<Value>, ApiError> {
    let updated = s.orders.modify(|orders| {
        let order = orders.iter_mut().find(|o| o.id() == id)?;
        Some(order.update_status(r.status).map(|()| {
            log_events(order);
            order.clone()
        }))
    }).await?;
    let order = updated.ok_or(ApiError::NotFound("order"))??;
    Ok(Json(json!({"message": "Order status updated successfully", "order": order})))
}

pub async fn delete_order(State(s): State<AppState>, Path(id): Path<String>) -> Result<Json<Value>, ApiError> {
    let removed = s.orders.remove(&id).await?.ok_or(ApiError::NotFound("order"))?;
    tracing::info!(order_id = %removed.id(), order_number = %removed.order_number(), "order deleted");
    Ok(Json(json!({"message": "Order deleted successfully"})))
}

pub async fn order_stats(State(s): State<AppState>) -> Result<Json<OrderStats>, ApiError> {
    Ok(Json(OrderStats::compute(&s.orders.list().await?)))
}

pub async fn monthly_revenue(State(s): State<AppState>) -> Result<Json<Vec<MonthlyRevenue>>, ApiError> {
    Ok(Json(analytics::monthly_revenue(&s.orders.list().await?)))
}
