use axum::{
    Json,
    extract::{Path, State, rejection::JsonRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::{Deserialize, Serialize};

use crate::modules::marketing_content::core::content::{ContentStatus, MarketingContent};
use crate::modules::marketing_content::core::policy::{SeoScore, seo_score};
use crate::modules::marketing_content::use_cases::review_content::handler::{
    ReviewError, move_content,
};
use crate::shared::core::row::RecordId;
use crate::shell::http::{error_response, mutation_error_response};
use crate::shell::state::AppState;

#[derive(Deserialize)]
pub struct MoveContentBody {
    pub status: ContentStatus,
}

#[derive(Serialize)]
pub struct SeoResponse {
    pub id: RecordId,
    pub seo: SeoScore,
}

async fn current(state: &AppState, id: &RecordId) -> Result<MarketingContent, Response> {
    state
        .marketing_content
        .loader()
        .get(id)
        .await
        .ok_or_else(|| error_response(StatusCode::NOT_FOUND, format!("content {id} not found")))
}

pub async fn list(State(state): State<AppState>) -> impl IntoResponse {
    Json(state.marketing_content.loader().snapshot().await)
}

pub async fn move_status(
    State(state): State<AppState>,
    Path(id): Path<String>,
    body: Result<Json<MoveContentBody>, JsonRejection>,
) -> Response {
    let Json(body) = match body {
        Ok(b) => b,
        Err(rejection) => {
            return error_response(StatusCode::UNPROCESSABLE_ENTITY, rejection.body_text());
        }
    };

    let content = match current(&state, &RecordId::new(id)).await {
        Ok(content) => content,
        Err(response) => return response,
    };
    match move_content(state.marketing_content.coordinator(), &content, body.status).await {
        Ok(updated) => Json(updated).into_response(),
        Err(error @ ReviewError::NotAllowed { .. }) => {
            error_response(StatusCode::CONFLICT, error.to_string())
        }
        Err(ReviewError::Mutation(error)) => mutation_error_response(&error),
    }
}

pub async fn seo(State(state): State<AppState>, Path(id): Path<String>) -> Response {
    match current(&state, &RecordId::new(id)).await {
        Ok(content) => Json(SeoResponse {
            seo: seo_score(&content),
            id: content.id,
        })
        .into_response(),
        Err(response) => response,
    }
}
