use crate::modules::sync::core::draft::{
    DraftForm, ValidationErrors, join_tags, optional_text, required, split_tags,
};
use crate::modules::training_data::core::training_data::TrainingData;
use crate::shared::core::row::{Row, into_row};
use serde::Deserialize;
use serde_json::json;

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct TrainingDataDraft {
    pub question: String,
    pub answer: String,
    pub category: String,
    /// Comma separated.
    pub tags: String,
    pub is_active: bool,
}

impl Default for TrainingDataDraft {
    fn default() -> Self {
        Self {
            question: String::new(),
            answer: String::new(),
            category: String::new(),
            tags: String::new(),
            is_active: true,
        }
    }
}

impl DraftForm for TrainingDataDraft {
    type Entity = TrainingData;

    fn empty() -> Self {
        Self::default()
    }

    fn from_entity(item: &TrainingData) -> Self {
        Self {
            question: item.question.clone(),
            answer: item.answer.clone(),
            category: item.category.clone().unwrap_or_default(),
            tags: join_tags(&item.tags),
            is_active: item.is_active,
        }
    }

    fn to_fields(&self) -> Result<Row, ValidationErrors> {
        let mut errors = ValidationErrors::new();
        let question = errors.check(required("question", &self.question));
        let answer = errors.check(required("answer", &self.answer));
        errors.into_result()?;

        Ok(into_row(json!({
            "question": question,
            "answer": answer,
            "category": optional_text(&self.category),
            "tags": split_tags(&self.tags),
            "is_active": self.is_active,
        })))
    }
}
