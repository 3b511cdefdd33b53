// Question/answer pairs the support assistant is trained on.

use crate::modules::sync::core::stats::{compute_stats, count_by};
use crate::shared::core::entity::Entity;
use crate::shared::core::row::RecordId;
use crate::shared::core::table::Table;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

pub const UNCATEGORIZED: &str = "general";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrainingData {
    pub id: RecordId,
    pub question: String,
    pub answer: String,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default = "active")]
    pub is_active: bool,
    #[serde(default)]
    pub usage_count: i64,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
}

fn active() -> bool {
    true
}

impl TrainingData {
    pub fn category_or_default(&self) -> &str {
        self.category
            .as_deref()
            .filter(|category| !category.is_empty())
            .unwrap_or(UNCATEGORIZED)
    }
}

impl Entity for TrainingData {
    const TABLE: Table = Table::TrainingData;

    fn id(&self) -> &RecordId {
        &self.id
    }

    fn status(&self) -> Option<&str> {
        Some(if self.is_active { "active" } else { "inactive" })
    }

    fn created_at(&self) -> Option<DateTime<Utc>> {
        self.created_at
    }

    fn search_text(&self) -> Vec<&str> {
        let mut text = vec![self.question.as_str(), self.answer.as_str()];
        text.extend(self.category.as_deref());
        text.extend(self.tags.iter().map(String::as_str));
        text
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct TrainingDataStats {
    pub total: usize,
    pub active: usize,
    pub total_usage: i64,
    pub by_category: BTreeMap<String, usize>,
}

pub fn training_data_stats(items: &[TrainingData]) -> TrainingDataStats {
    let (active, total_usage) = compute_stats(items, (0usize, 0i64), |(active, usage), item| {
        (active + usize::from(item.is_active), usage + item.usage_count)
    });
    TrainingDataStats {
        total: items.len(),
        active,
        total_usage,
        by_category: count_by(items, |item| item.category_or_default().to_string()),
    }
}
