use crate::modules::orders::core::order::{Order, OrderStatus};
use crate::shared::core::entity::Entity;
use crate::shared::core::row::{RecordId, Row};
use crate::shared::core::table::Table;
use crate::shared::infrastructure::gateway::in_memory::InMemoryGateway;
use chrono::{DateTime, Utc};

#[derive(Debug, Clone)]
pub struct OrderBuilder {
    id: String,
    status: OrderStatus,
    total_price: f64,
    customer_email: Option<String>,
    created_at: Option<DateTime<Utc>>,
}

impl Default for OrderBuilder {
    fn default() -> Self {
        Self {
            id: "order-1".into(),
            status: OrderStatus::Pending,
            total_price: 0.0,
            customer_email: None,
            created_at: None,
        }
    }
}

impl OrderBuilder {
    pub fn new() -> Self {
        Self::default()
    }
    pub fn id(mut self, v: impl Into<String>) -> Self {
        self.id = v.into();
        self
    }
    pub fn status(mut self, v: OrderStatus) -> Self {
        self.status = v;
        self
    }
    pub fn total_price(mut self, v: f64) -> Self {
        self.total_price = v;
        self
    }
    pub fn customer_email(mut self, v: impl Into<String>) -> Self {
        self.customer_email = Some(v.into());
        self
    }
    pub fn created_at(mut self, v: DateTime<Utc>) -> Self {
        self.created_at = Some(v);
        self
    }
    pub fn build(self) -> Order {
        Order {
            id: RecordId::new(self.id),
            user_id: None,
            product_id: None,
            customer_email: self.customer_email,
            status: self.status,
            total_price: self.total_price,
            quantity: 1,
            currency: None,
            created_at: self.created_at,
            updated_at: None,
        }
    }
    pub fn build_row(self) -> Row {
        self.build().to_row().unwrap()
    }
}

/// Orders 1 (pending, 100) and 2 (completed, 50).
pub async fn seed_example_orders(gateway: &InMemoryGateway) {
    gateway
        .seed(
            Table::Orders,
            vec![
                OrderBuilder::new().id("1").total_price(100.0).build_row(),
                OrderBuilder::new()
                    .id("2")
                    .status(OrderStatus::Completed)
                    .total_price(50.0)
                    .build_row(),
            ],
        )
        .await;
}
