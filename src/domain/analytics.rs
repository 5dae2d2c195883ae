//! Dashboard aggregation over orders.

use chrono::{Datelike, Month};
use rust_decimal::Decimal;
use serde::Serialize;
use std::collections::BTreeMap;

use crate::domain::aggregates::{Order, OrderStatus};

const RECENT_ORDERS: usize = 5;

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderStats {
    pub total_orders: usize,
    pub status_counts: BTreeMap<OrderStatus, usize>,
    /// Paid, non-cancelled orders only; saturates at `Decimal::MAX`.
    pub total_revenue: Decimal,
    pub recent_orders: Vec<Order>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MonthlyRevenue {
    /// Short month name, e.g. "Jan".
    pub month: String,
    pub year: i32,
    pub month_number: u32,
    pub revenue: Decimal,
    pub orders: usize,
}

impl OrderStats {
    pub fn compute(orders: &[Order]) -> Self {
        let mut status_counts = BTreeMap::new();
        for order in orders {
            *status_counts.entry(order.status()).or_insert(0) += 1;
        }
        let total_revenue = orders.iter().filter(|o| o.is_revenue()).fold(Decimal::ZERO, |sum, o| sum.saturating_add(o.total().amount()));

        let mut recent: Vec<&Order> = orders.iter().collect();
        recent.sort_by(|a, b| b.created_at().cmp(&a.created_at()));
        let recent_orders = recent.into_iter().take(RECENT_ORDERS).cloned().collect();

        Self { total_orders: orders.len(), status_counts, total_revenue, recent_orders }
    }
}

/// Revenue per calendar month, oldest first, over paid non-cancelled orders.
pub fn monthly_revenue(orders: &[Order]) -> Vec<MonthlyRevenue> {
    let mut buckets: BTreeMap<(i32, u32), (Decimal, usize)> = BTreeMap::new();
    for order in orders.iter().filter(|o| o.is_revenue()) {
        let at = order.created_at();
        let bucket = buckets.entry((at.year(), at.month())).or_insert((Decimal::ZERO, 0));
        bucket.0 = bucket.0.saturating_add(order.total().amount());
        bucket.1 += 1;
    }
    buckets
        .into_iter()
        .map(|((year, month_number), (revenue, orders))| MonthlyRevenue {
            month: short_month(month_number),
            year,
            month_number,
            revenue,
            orders,
        })
        .collect()
}

fn short_month(month: u32) -> String {
    u8::try_from(month)
        .ok()
        .and_then(|m| Month::try_from(m).ok())
        .map(|m| m.name()[..3].to_string())
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::aggregates::{Customer, OrderItem, ShippingAddress};
    use crate::domain::value_objects::Money;
    use chrono::{TimeZone, Utc};

    fn order(amount: i64, year: i32, month: u32, status: OrderStatus, paid: bool) -> Order {
        let item = OrderItem { product_id: "p".into(), name: "P".into(), price: Money::usd(Decimal::new(amount, 0)), quantity: 1, image: None };
        let customer = Customer { user_id: None, name: "C".into(), email: "c@example.com".into(), phone: None };
        let mut o = Order::place(customer, vec![item], ShippingAddress::default(), Money::usd(Decimal::ZERO), Money::usd(Decimal::ZERO)).unwrap();
        if paid { o.mark_paid().unwrap(); }
        o.update_status(status).unwrap();
        o.backdate(Utc.with_ymd_and_hms(year, month, 10, 12, 0, 0).unwrap());
        o
    }

    #[test]
    fn test_stats() {
        let orders = vec![
            order(100, 2024, 1, OrderStatus::Delivered, true),
            order(50, 2024, 2, OrderStatus::Cancelled, true),
            order(30, 2024, 3, OrderStatus::Pending, false),
            order(20, 2024, 4, OrderStatus::Processing, true),
            order(1, 2024, 5, OrderStatus::Pending, false),
            order(1, 2024, 6, OrderStatus::Pending, false),
        ];
        let stats = OrderStats::compute(&orders);
        assert_eq!(stats.total_orders, 6);
        assert_eq!(stats.status_counts[&OrderStatus::Pending], 3);
        assert_eq!(stats.status_counts[&OrderStatus::Cancelled], 1);
        assert!(!stats.status_counts.contains_key(&OrderStatus::Shipped));
        assert_eq!(stats.total_revenue, Decimal::new(120, 0));
        assert_eq!(stats.recent_orders.len(), 5);
        assert_eq!(stats.recent_orders[0].created_at().month(), 6);

        let json = serde_json::to_value(&stats).unwrap();
        assert_eq!(json["statusCounts"]["pending"], 3);
    }

    #[test]
    fn test_monthly_revenue_groups_and_sorts() {
        let orders = vec![
            order(20, 2024, 3, OrderStatus::Shipped, true),
            order(10, 2023, 12, OrderStatus::Delivered, true),
            order(5, 2024, 3, OrderStatus::Processing, true),
            order(99, 2024, 3, OrderStatus::Cancelled, true),
            order(42, 2024, 1, OrderStatus::Pending, false),
        ];
        let monthly = monthly_revenue(&orders);
        assert_eq!(monthly.len(), 2);
        assert_eq!((monthly[0].year, monthly[0].month.as_str(), monthly[0].orders), (2023, "Dec", 1));
        assert_eq!((monthly[1].year, monthly[1].month.as_str(), monthly[1].orders), (2024, "Mar", 2));
        assert_eq!(monthly[1].revenue, Decimal::new(25, 0));
    }

    #[test]
    fn test_revenue_saturates() {
        let huge = || {
            let item = OrderItem { product_id: "p".into(), name: "P".into(), price: Money::usd(Decimal::MAX), quantity: 1, image: None };
            let customer = Customer { user_id: None, name: "C".into(), email: "c@example.com".into(), phone: None };
            let mut o = Order::place(customer, vec![item], ShippingAddress::default(), Money::usd(Decimal::ZERO), Money::usd(Decimal::ZERO)).unwrap();
            o.mark_paid().unwrap();
            o
        };
        let orders = vec![huge(), huge()];
        assert_eq!(OrderStats::compute(&orders).total_revenue, Decimal::MAX);
        assert_eq!(monthly_revenue(&orders)[0].revenue, Decimal::MAX);
    }

    #[test]
    fn test_empty() {
        let stats = OrderStats::compute(&[]);
        assert_eq!(stats.total_revenue, Decimal::ZERO);
        assert!(monthly_revenue(&[]).is_empty());
    }
}
