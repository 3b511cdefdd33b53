use crate::modules::training_data::core::training_data::TrainingData;
use crate::shared::core::entity::Entity;
use crate::shared::core::row::{RecordId, Row};

#[derive(Debug, Clone)]
pub struct TrainingDataBuilder {
    id: String,
    question: String,
    answer: String,
    category: Option<String>,
    tags: Vec<String>,
    is_active: bool,
    usage_count: i64,
}

impl Default for TrainingDataBuilder {
    fn default() -> Self {
        Self {
            id: "training-1".into(),
            question: "How do I trigger an SOS alert?".into(),
            answer: "Hold the SOS button for three seconds.".into(),
            category: None,
            tags: Vec::new(),
            is_active: true,
            usage_count: 0,
        }
    }
}

impl TrainingDataBuilder {
    pub fn new() -> Self {
        Self::default()
    }
    pub fn id(mut self, v: impl Into<String>) -> Self {
        self.id = v.into();
        self
    }
    pub fn question(mut self, v: impl Into<String>) -> Self {
        self.question = v.into();
        self
    }
    pub fn category(mut self, v: impl Into<String>) -> Self {
        self.category = Some(v.into());
        self
    }
    pub fn tags(mut self, v: &[&str]) -> Self {
        self.tags = v.iter().map(|tag| tag.to_string()).collect();
        self
    }
    pub fn active(mut self, v: bool) -> Self {
        self.is_active = v;
        self
    }
    pub fn usage_count(mut self, v: i64) -> Self {
        self.usage_count = v;
        self
    }
    pub fn build(self) -> TrainingData {
        TrainingData {
            id: RecordId::new(self.id),
            question: self.question,
            answer: self.answer,
            category: self.category,
            tags: self.tags,
            is_active: self.is_active,
            usage_count: self.usage_count,
            created_at: None,
            updated_at: None,
        }
    }
    pub fn build_row(self) -> Row {
        self.build().to_row().unwrap()
    }
}
