use axum::{
    Json,
    extract::{Path, Query, State, rejection::JsonRejection},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
};
use serde::{Deserialize, Serialize};

use crate::modules::sync::core::draft::DraftForm;
use crate::modules::sync::core::filter::FilterState;
use crate::modules::sync::core::mutation::MutationRequest;
use crate::modules::sync::use_cases::edit_draft::handler::{FormController, SubmitOutcome};
use crate::modules::training_data::core::draft::TrainingDataDraft;
use crate::modules::training_data::core::training_data::{
    TrainingData, TrainingDataStats, training_data_stats,
};
use crate::shared::core::row::RecordId;
use crate::shell::http::{
    error_response, form_error_response, idempotency_key, mutation_error_response,
};
use crate::shell::state::AppState;

#[derive(Serialize)]
pub struct ListTrainingDataResponse {
    pub items: Vec<TrainingData>,
    pub stats: TrainingDataStats,
}

/// Only the fields present in the body change.
#[derive(Deserialize, Default)]
#[serde(default)]
pub struct TrainingDataPatchBody {
    pub question: Option<String>,
    pub answer: Option<String>,
    pub category: Option<String>,
    pub tags: Option<String>,
    pub is_active: Option<bool>,
}

impl TrainingDataPatchBody {
    fn apply(self, draft: &mut TrainingDataDraft) {
        if let Some(question) = self.question {
            draft.question = question;
        }
        if let Some(answer) = self.answer {
            draft.answer = answer;
        }
        if let Some(category) = self.category {
            draft.category = category;
        }
        if let Some(tags) = self.tags {
            draft.tags = tags;
        }
        if let Some(is_active) = self.is_active {
            draft.is_active = is_active;
        }
    }
}

pub async fn list(
    State(state): State<AppState>,
    Query(filter): Query<FilterState>,
) -> impl IntoResponse {
    let items = state
        .training_data
        .loader()
        .apply_filter(|item| filter.matches(item))
        .await;
    Json(ListTrainingDataResponse {
        stats: training_data_stats(&items),
        items,
    })
}

pub async fn create(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Result<Json<TrainingDataDraft>, JsonRejection>,
) -> Response {
    let Json(body) = match body {
        Ok(b) => b,
        Err(rejection) => {
            return error_response(StatusCode::UNPROCESSABLE_ENTITY, rejection.body_text());
        }
    };

    let mut form = FormController::<TrainingDataDraft>::new();
    match idempotency_key(&headers) {
        Some(client_id) => form.open_create_with(client_id),
        None => form.open_create(),
    }
    if let Some(draft) = form.draft_mut() {
        *draft = body;
    }
    match form.submit(state.training_data.coordinator()).await {
        Ok(SubmitOutcome::Saved(outcome)) => {
            (StatusCode::CREATED, Json(outcome.entity().cloned())).into_response()
        }
        Ok(SubmitOutcome::Unchanged) => StatusCode::NO_CONTENT.into_response(),
        Err(error) => form_error_response(&error),
    }
}

pub async fn update(
    State(state): State<AppState>,
    Path(id): Path<String>,
    body: Result<Json<TrainingDataPatchBody>, JsonRejection>,
) -> Response {
    let Json(body) = match body {
        Ok(b) => b,
        Err(rejection) => {
            return error_response(StatusCode::UNPROCESSABLE_ENTITY, rejection.body_text());
        }
    };

    let id = RecordId::new(id);
    let Some(current) = state.training_data.loader().get(&id).await else {
        return error_response(StatusCode::NOT_FOUND, format!("training data {id} not found"));
    };
    let mut form = FormController::<TrainingDataDraft>::new();
    form.open_edit(&current);
    if let Some(draft) = form.draft_mut() {
        body.apply(draft);
    }
    match form.submit(state.training_data.coordinator()).await {
        Ok(SubmitOutcome::Saved(outcome)) => Json(outcome.entity().cloned()).into_response(),
        Ok(SubmitOutcome::Unchanged) => Json(current).into_response(),
        Err(error) => form_error_response(&error),
    }
}

pub async fn delete(State(state): State<AppState>, Path(id): Path<String>) -> Response {
    let request = MutationRequest::Delete {
        id: RecordId::new(id),
    };
    match state.training_data.coordinator().submit(request).await {
        Ok(_) => StatusCode::NO_CONTENT.into_response(),
        Err(error) => mutation_error_response(&error),
    }
}

/// Blank draft as the create dialog shows it.
pub async fn template() -> impl IntoResponse {
    let draft = TrainingDataDraft::empty();
    Json(serde_json::json!({
        "question": draft.question,
        "answer": draft.answer,
        "category": draft.category,
        "tags": draft.tags,
        "is_active": draft.is_active,
    }))
}
