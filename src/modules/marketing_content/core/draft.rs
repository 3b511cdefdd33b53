use crate::modules::marketing_content::core::content::MarketingContent;
use crate::modules::sync::core::draft::{
    DraftForm, FieldError, ValidationErrors, join_tags, optional_text, required, split_tags,
};
use crate::shared::core::row::{Row, into_row};
use serde::Deserialize;
use serde_json::json;

pub const META_DESCRIPTION_MAX: usize = 160;

/// Status is left out: it only changes through the review workflow.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct MarketingContentDraft {
    pub title: String,
    pub content: String,
    pub content_type: String,
    /// Comma separated.
    pub keywords: String,
    pub seo_title: String,
    pub meta_description: String,
}

impl DraftForm for MarketingContentDraft {
    type Entity = MarketingContent;

    fn empty() -> Self {
        Self::default()
    }

    fn from_entity(content: &MarketingContent) -> Self {
        Self {
            title: content.title.clone(),
            content: content.content.clone(),
            content_type: content.content_type.clone().unwrap_or_default(),
            keywords: join_tags(&content.keywords),
            seo_title: content.seo_title.clone().unwrap_or_default(),
            meta_description: content.meta_description.clone().unwrap_or_default(),
        }
    }

    fn to_fields(&self) -> Result<Row, ValidationErrors> {
        let mut errors = ValidationErrors::new();
        let title = errors.check(required("title", &self.title));
        let content = errors.check(required("content", &self.content));
        if self.meta_description.trim().chars().count() > META_DESCRIPTION_MAX {
            errors.push(FieldError::new(
                "meta_description",
                format!("must be at most {META_DESCRIPTION_MAX} characters"),
            ));
        }
        errors.into_result()?;

        Ok(into_row(json!({
            "title": title,
            "content": content,
            "content_type": optional_text(&self.content_type),
            "keywords": split_tags(&self.keywords),
            "seo_title": optional_text(&self.seo_title),
            "meta_description": optional_text(&self.meta_description),
        })))
    }
}
