use axum::{
    Json,
    extract::{Path, Query, State, rejection::JsonRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Deserialize;

use crate::modules::contact_submissions::core::submission::{ContactSubmission, SubmissionStatus};
use crate::modules::contact_submissions::use_cases::triage_submission::handler::{
    mark_read_on_open, set_status,
};
use crate::modules::sync::core::filter::FilterState;
use crate::shared::core::row::RecordId;
use crate::shell::http::{error_response, mutation_error_response};
use crate::shell::state::AppState;

#[derive(Deserialize)]
pub struct SetStatusBody {
    pub status: SubmissionStatus,
}

async fn current(state: &AppState, id: String) -> Result<ContactSubmission, Response> {
    let id = RecordId::new(id);
    state
        .contact_submissions
        .loader()
        .get(&id)
        .await
        .ok_or_else(|| error_response(StatusCode::NOT_FOUND, format!("submission {id} not found")))
}

pub async fn list(
    State(state): State<AppState>,
    Query(filter): Query<FilterState>,
) -> impl IntoResponse {
    Json(
        state
            .contact_submissions
            .loader()
            .apply_filter(|submission| filter.matches(submission))
            .await,
    )
}

pub async fn update_status(
    State(state): State<AppState>,
    Path(id): Path<String>,
    body: Result<Json<SetStatusBody>, JsonRejection>,
) -> Response {
    let Json(body) = match body {
        Ok(b) => b,
        Err(rejection) => {
            return error_response(StatusCode::UNPROCESSABLE_ENTITY, rejection.body_text());
        }
    };

    let submission = match current(&state, id).await {
        Ok(submission) => submission,
        Err(response) => return response,
    };
    match set_status(state.contact_submissions.coordinator(), &submission, body.status).await {
        Ok(outcome) => Json(outcome.entity().cloned()).into_response(),
        Err(error) => mutation_error_response(&error),
    }
}

/// Returns the submission as the operator sees it after opening it.
pub async fn open(State(state): State<AppState>, Path(id): Path<String>) -> Response {
    let submission = match current(&state, id).await {
        Ok(submission) => submission,
        Err(response) => return response,
    };
    match mark_read_on_open(state.contact_submissions.coordinator(), &submission).await {
        Ok(Some(outcome)) => Json(outcome.entity().cloned()).into_response(),
        Ok(None) => Json(submission).into_response(),
        Err(error) => mutation_error_response(&error),
    }
}
