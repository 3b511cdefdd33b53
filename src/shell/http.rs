use axum::{
    Json, Router,
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, patch, post},
};
use serde_json::json;
use tower_http::trace::TraceLayer;

use crate::modules::ai_settings::use_cases::update_setting::inbound::http as ai_settings_http;
use crate::modules::contact_submissions::use_cases::triage_submission::inbound::http as submissions_http;
use crate::modules::family::use_cases::send_invite::inbound::http as family_invites_http;
use crate::modules::location_pings::use_cases::export_locations::inbound::http as export_locations_http;
use crate::modules::marketing_content::use_cases::review_content::inbound::http as marketing_content_http;
use crate::modules::orders::use_cases::list_orders::inbound::http as list_orders_http;
use crate::modules::orders::use_cases::reconcile_payments::inbound::http as reconcile_payments_http;
use crate::modules::orders::use_cases::transition_order_status::inbound::http as transition_http;
use crate::modules::procedures::use_cases::invoke_procedure::inbound::http as procedures_http;
use crate::modules::products::use_cases::manage_products::inbound::http as products_http;
use crate::modules::sync::use_cases::edit_draft::handler::FormError;
use crate::modules::sync::use_cases::mutate_entity::handler::MutationError;
use crate::modules::training_data::use_cases::manage_training_data::inbound::http as training_data_http;
use crate::shared::core::row::RecordId;
use crate::shared::infrastructure::gateway::{RemoteError, RemoteErrorReason};
use crate::shell::state::AppState;

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/orders", get(list_orders_http::handle))
        .route("/orders/reconcile", post(reconcile_payments_http::handle))
        .route("/orders/{id}/status", post(transition_http::handle))
        .route(
            "/training-data",
            get(training_data_http::list).post(training_data_http::create),
        )
        .route("/training-data/template", get(training_data_http::template))
        .route(
            "/training-data/{id}",
            patch(training_data_http::update).delete(training_data_http::delete),
        )
        .route(
            "/products",
            get(products_http::list).post(products_http::create),
        )
        .route("/marketing-content", get(marketing_content_http::list))
        .route(
            "/marketing-content/{id}/status",
            post(marketing_content_http::move_status),
        )
        .route("/marketing-content/{id}/seo", get(marketing_content_http::seo))
        .route("/contact-submissions", get(submissions_http::list))
        .route(
            "/contact-submissions/{id}/status",
            post(submissions_http::update_status),
        )
        .route("/contact-submissions/{id}/open", post(submissions_http::open))
        .route(
            "/family-invites",
            get(family_invites_http::list).post(family_invites_http::create),
        )
        .route("/ai-settings", get(ai_settings_http::list))
        .route("/ai-settings/{id}", patch(ai_settings_http::update))
        .route("/location-pings.csv", get(export_locations_http::handle))
        .route("/health", get(procedures_http::health))
        .route("/reports/performance", get(procedures_http::performance))
        .route("/reports/revenue", get(procedures_http::revenue))
        .route("/emergency-test", post(procedures_http::emergency_test))
        .route("/ai/chat-test", post(procedures_http::chat_test))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

pub const IDEMPOTENCY_KEY: &str = "idempotency-key";

/// Client-chosen id for a create. Resending a request with the same key lands on the same
/// record instead of adding a second one.
pub fn idempotency_key(headers: &HeaderMap) -> Option<RecordId> {
    headers
        .get(IDEMPOTENCY_KEY)
        .and_then(|value| value.to_str().ok())
        .map(str::trim)
        .filter(|key| !key.is_empty())
        .map(RecordId::from)
}

pub fn error_response(status: StatusCode, message: impl Into<String>) -> Response {
    (status, Json(json!({ "error": message.into() }))).into_response()
}

fn remote_status(error: &RemoteError) -> StatusCode {
    match error.reason() {
        RemoteErrorReason::Validation => StatusCode::UNPROCESSABLE_ENTITY,
        RemoteErrorReason::Permission => StatusCode::FORBIDDEN,
        RemoteErrorReason::Conflict => StatusCode::CONFLICT,
        RemoteErrorReason::NotFound => StatusCode::NOT_FOUND,
        RemoteErrorReason::Timeout => StatusCode::GATEWAY_TIMEOUT,
        RemoteErrorReason::Network | RemoteErrorReason::Procedure | RemoteErrorReason::Backend => {
            StatusCode::BAD_GATEWAY
        }
    }
}

pub fn mutation_error_response(error: &MutationError) -> Response {
    let status = match error {
        MutationError::Busy | MutationError::NoOpTransition { .. } => StatusCode::CONFLICT,
        MutationError::EmptyPatch => StatusCode::UNPROCESSABLE_ENTITY,
        MutationError::Remote(remote) => remote_status(remote),
        MutationError::Decode(_) | MutationError::PartialFailure { .. } => StatusCode::BAD_GATEWAY,
    };
    error_response(status, error.to_string())
}

/// Field errors go back as a list so the caller can highlight each field.
pub fn form_error_response(error: &FormError) -> Response {
    match error {
        FormError::Closed => error_response(StatusCode::CONFLICT, error.to_string()),
        FormError::Invalid(errors) => {
            (StatusCode::UNPROCESSABLE_ENTITY, Json(errors)).into_response()
        }
        FormError::Mutation(error) => mutation_error_response(error),
    }
}
