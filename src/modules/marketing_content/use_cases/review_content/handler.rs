// Moves marketing content through the editorial workflow.
//
// Publishing also stamps `published_at`; every other step is a plain status transition.

use crate::modules::marketing_content::core::content::{ContentStatus, MarketingContent};
use crate::modules::sync::core::mutation::{MutationOutcome, MutationRequest};
use crate::modules::sync::use_cases::mutate_entity::handler::{
    MutationCoordinator, MutationError,
};
use crate::shared::core::row::into_row;
use chrono::Utc;
use serde_json::json;
use thiserror::Error;

#[derive(Debug, Clone, Error, PartialEq)]
pub enum ReviewError {
    #[error("content cannot move from {from} to {to}")]
    NotAllowed { from: &'static str, to: &'static str },

    #[error(transparent)]
    Mutation(#[from] MutationError),
}

pub async fn move_content(
    coordinator: &MutationCoordinator<MarketingContent>,
    content: &MarketingContent,
    next: ContentStatus,
) -> Result<MarketingContent, ReviewError> {
    // Same-status requests fall through so the coordinator reports them as no-ops.
    if content.status != next && !content.status.can_transition_to(next) {
        return Err(ReviewError::NotAllowed {
            from: content.status.as_str(),
            to: next.as_str(),
        });
    }
    let request = if next == ContentStatus::Published && content.status != next {
        let patch = json!({ "status": next, "published_at": Utc::now().to_rfc3339() });
        MutationRequest::Update {
            id: content.id.clone(),
            patch: into_row(patch),
        }
    } else {
        MutationRequest::transition(
            content.id.clone(),
            "status",
            content.status.as_str(),
            next.as_str(),
        )
    };
    match coordinator.submit(request).await? {
        MutationOutcome::Created(updated) | MutationOutcome::Updated(updated) => Ok(updated),
        MutationOutcome::Deleted(_) => Ok(content.clone()),
    }
}
