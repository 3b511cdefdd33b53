use axum::{
    Json,
    extract::{Path, State, rejection::JsonRejection},
    http::StatusCode,
    response::IntoResponse,
};
use serde::Deserialize;

use crate::modules::orders::core::order::OrderStatus;
use crate::modules::orders::use_cases::transition_order_status::handler::{
    TransitionError, transition_order_status,
};
use crate::shared::core::row::RecordId;
use crate::shell::http::{error_response, mutation_error_response};
use crate::shell::state::AppState;

#[derive(Deserialize)]
pub struct TransitionOrderStatusBody {
    pub status: OrderStatus,
}

pub async fn handle(
    State(state): State<AppState>,
    Path(id): Path<String>,
    body: Result<Json<TransitionOrderStatusBody>, JsonRejection>,
) -> impl IntoResponse {
    let Json(body) = match body {
        Ok(b) => b,
        Err(rejection) => {
            return error_response(StatusCode::UNPROCESSABLE_ENTITY, rejection.body_text());
        }
    };

    let id = RecordId::new(id);
    match transition_order_status(state.orders.coordinator(), &id, body.status).await {
        Ok(order) => Json(order).into_response(),
        Err(TransitionError::UnknownOrder(_)) => {
            error_response(StatusCode::NOT_FOUND, format!("order {id} not found"))
        }
        Err(TransitionError::Mutation(error)) => mutation_error_response(&error),
    }
}
