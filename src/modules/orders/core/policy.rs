// Order statistics shown above the orders table.
//
// Total is the plain sum of every order's price. Revenue only counts orders that
// kept their money: cancelled and refunded orders are excluded.

use crate::modules::orders::core::order::{Order, OrderStatus};
use crate::modules::sync::core::stats::{average_by, count_by, latest_by, sum_by};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::BTreeMap;

pub const NON_REVENUE_STATUSES: [OrderStatus; 2] = [OrderStatus::Cancelled, OrderStatus::Refunded];

pub fn is_revenue_bearing(status: OrderStatus) -> bool {
    !NON_REVENUE_STATUSES.contains(&status)
}

pub fn revenue(orders: &[Order]) -> f64 {
    sum_by(orders, |order| {
        if is_revenue_bearing(order.status) {
            order.total_price
        } else {
            0.0
        }
    })
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OrderStats {
    pub count: usize,
    pub total: f64,
    pub revenue: f64,
    pub average_order_value: f64,
    pub by_status: BTreeMap<String, usize>,
    pub latest_order_at: Option<DateTime<Utc>>,
}

pub fn order_stats(orders: &[Order]) -> OrderStats {
    OrderStats {
        count: orders.len(),
        total: sum_by(orders, |order| order.total_price),
        revenue: revenue(orders),
        average_order_value: average_by(orders, |order| order.total_price),
        by_status: count_by(orders, |order| order.status.as_str().to_string()),
        latest_order_at: latest_by(orders, |order| order.created_at),
    }
}
