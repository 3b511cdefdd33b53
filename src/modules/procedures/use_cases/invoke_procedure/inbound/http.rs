use axum::{
    Json,
    extract::{Query, State, rejection::JsonRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use chrono::NaiveDate;
use serde::Deserialize;

use crate::modules::procedures::use_cases::invoke_procedure::handler::ProcedureError;
use crate::shell::http::{error_response, mutation_error_response};
use crate::shell::state::AppState;

const DEFAULT_SCENARIO: &str = "sos_button";

#[derive(Deserialize)]
pub struct EmergencyTestBody {
    #[serde(default)]
    pub scenario: Option<String>,
}

#[derive(Deserialize)]
pub struct ChatTestBody {
    pub message: String,
}

#[derive(Deserialize, Default)]
pub struct RevenueRange {
    pub from: Option<NaiveDate>,
    pub to: Option<NaiveDate>,
}

fn procedure_error_response(error: &ProcedureError) -> Response {
    match error {
        ProcedureError::Mutation(error) => mutation_error_response(error),
        other => error_response(StatusCode::BAD_GATEWAY, other.to_string()),
    }
}

pub async fn health(State(state): State<AppState>) -> Response {
    match state.procedures.health_check().await {
        Ok(report) if report.is_healthy() => Json(report).into_response(),
        Ok(report) => (StatusCode::SERVICE_UNAVAILABLE, Json(report)).into_response(),
        Err(error) => procedure_error_response(&error),
    }
}

pub async fn performance(State(state): State<AppState>) -> Response {
    match state.procedures.performance_test().await {
        Ok(report) => Json(report).into_response(),
        Err(error) => procedure_error_response(&error),
    }
}

pub async fn revenue(
    State(state): State<AppState>,
    Query(range): Query<RevenueRange>,
) -> Response {
    match state.procedures.revenue_report(range.from, range.to).await {
        Ok(report) => Json(report).into_response(),
        Err(error) => procedure_error_response(&error),
    }
}

pub async fn emergency_test(
    State(state): State<AppState>,
    body: Result<Json<EmergencyTestBody>, JsonRejection>,
) -> Response {
    let scenario = match body {
        Ok(Json(body)) => body.scenario.unwrap_or_else(|| DEFAULT_SCENARIO.to_owned()),
        Err(JsonRejection::MissingJsonContentType(_)) => DEFAULT_SCENARIO.to_owned(),
        Err(rejection) => {
            return error_response(StatusCode::UNPROCESSABLE_ENTITY, rejection.body_text());
        }
    };

    match state.procedures.run_emergency_test(&scenario).await {
        Ok(report) => Json(report).into_response(),
        Err(error) => procedure_error_response(&error),
    }
}

pub async fn chat_test(
    State(state): State<AppState>,
    body: Result<Json<ChatTestBody>, JsonRejection>,
) -> Response {
    let Json(body) = match body {
        Ok(b) => b,
        Err(rejection) => {
            return error_response(StatusCode::UNPROCESSABLE_ENTITY, rejection.body_text());
        }
    };

    match state.procedures.ai_chat_test(&body.message).await {
        Ok(reply) => Json(reply).into_response(),
        Err(error) => procedure_error_response(&error),
    }
}
