// Filter State and the Filtered View it produces.
//
// Purpose
// - Narrow an Entity Collection for display without touching the collection or the backend.
//
// Responsibilities
// - Case-insensitive search over an entity's search text.
// - Status filter, where "all" or an empty value disables it.
// - Inclusive creation-date range.

use crate::shared::core::entity::Entity;
use chrono::{DateTime, Utc};
use serde::Deserialize;

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct FilterState {
    pub search: Option<String>,
    pub status: Option<String>,
    pub created_from: Option<DateTime<Utc>>,
    pub created_to: Option<DateTime<Utc>>,
}

impl FilterState {
    pub fn search(mut self, text: impl Into<String>) -> Self {
        self.search = Some(text.into());
        self
    }

    pub fn status(mut self, status: impl Into<String>) -> Self {
        self.status = Some(status.into());
        self
    }

    pub fn created_between(mut self, from: DateTime<Utc>, to: DateTime<Utc>) -> Self {
        self.created_from = Some(from);
        self.created_to = Some(to);
        self
    }

    pub fn matches<E: Entity>(&self, entity: &E) -> bool {
        self.matches_search(entity) && self.matches_status(entity) && self.matches_range(entity)
    }

    fn matches_search<E: Entity>(&self, entity: &E) -> bool {
        let Some(needle) = self
            .search
            .as_deref()
            .map(str::trim)
            .filter(|needle| !needle.is_empty())
        else {
            return true;
        };
        let needle = needle.to_lowercase();
        entity
            .search_text()
            .iter()
            .any(|text| text.to_lowercase().contains(&needle))
    }

    fn matches_status<E: Entity>(&self, entity: &E) -> bool {
        match self.status.as_deref().map(str::trim) {
            None | Some("") | Some("all") => true,
            Some(wanted) => entity.status() == Some(wanted),
        }
    }

    fn matches_range<E: Entity>(&self, entity: &E) -> bool {
        if self.created_from.is_none() && self.created_to.is_none() {
            return true;
        }
        let Some(created_at) = entity.created_at() else {
            return false;
        };
        self.created_from.is_none_or(|from| created_at >= from)
            && self.created_to.is_none_or(|to| created_at <= to)
    }
}

/// Pure: the source slice is only read.
pub fn apply_filter<E: Clone>(items: &[E], predicate: impl Fn(&E) -> bool) -> Vec<E> {
    items.iter().filter(|item| predicate(item)).cloned().collect()
}

#[cfg(test)]
mod filter_state_tests {
    use super::*;
    use crate::modules::orders::core::order::{Order, OrderStatus};
    use crate::tests::fixtures::orders::OrderBuilder;
    use chrono::TimeZone;
    use rstest::{fixture, rstest};

    #[fixture]
    fn orders() -> Vec<Order> {
        vec![
            OrderBuilder::new()
                .id("1")
                .customer_email("ada@example.com")
                .created_at(Utc.with_ymd_and_hms(2024, 3, 1, 9, 0, 0).unwrap())
                .build(),
            OrderBuilder::new()
                .id("2")
                .status(OrderStatus::Completed)
                .customer_email("grace@example.com")
                .created_at(Utc.with_ymd_and_hms(2024, 4, 1, 9, 0, 0).unwrap())
                .build(),
        ]
    }

    #[rstest]
    fn it_should_search_case_insensitively(orders: Vec<Order>) {
        let filter = FilterState::default().search("  GRACE ");
        let view = apply_filter(&orders, |order| filter.matches(order));
        assert_eq!(view.len(), 1);
        assert_eq!(view[0].id.as_str(), "2");
    }

    #[rstest]
    #[case("all", 2)]
    #[case("", 2)]
    #[case("pending", 1)]
    #[case("refunded", 0)]
    fn it_should_filter_by_status(orders: Vec<Order>, #[case] status: &str, #[case] expected: usize) {
        let filter = FilterState::default().status(status);
        assert_eq!(apply_filter(&orders, |order| filter.matches(order)).len(), expected);
    }

    #[rstest]
    fn it_should_filter_by_inclusive_date_range(orders: Vec<Order>) {
        let filter = FilterState::default().created_between(
            Utc.with_ymd_and_hms(2024, 3, 1, 9, 0, 0).unwrap(),
            Utc.with_ymd_and_hms(2024, 3, 31, 0, 0, 0).unwrap(),
        );
        let view = apply_filter(&orders, |order| filter.matches(order));
        assert_eq!(view.len(), 1);
        assert_eq!(view[0].id.as_str(), "1");
    }

    #[rstest]
    fn it_should_be_pure(orders: Vec<Order>) {
        let source = orders.clone();
        let filter = FilterState::default().status("completed");
        let first = apply_filter(&orders, |order| filter.matches(order));
        let second = apply_filter(&orders, |order| filter.matches(order));
        assert_eq!(first, second);
        assert_eq!(orders, source);
    }
}
