use axum::{
    Json,
    extract::{Query, State, rejection::JsonRejection},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
};
use serde::Serialize;

use crate::modules::products::core::draft::ProductDraft;
use crate::modules::products::core::product::Product;
use crate::modules::sync::core::filter::FilterState;
use crate::modules::sync::use_cases::edit_draft::handler::{FormController, SubmitOutcome};
use crate::shell::http::{error_response, form_error_response, idempotency_key};
use crate::shell::state::AppState;

#[derive(Serialize)]
pub struct ListProductsResponse {
    pub items: Vec<Product>,
    pub in_stock: usize,
    pub live: bool,
}

pub async fn list(
    State(state): State<AppState>,
    Query(filter): Query<FilterState>,
) -> impl IntoResponse {
    let items = state
        .products
        .loader()
        .apply_filter(|product| filter.matches(product))
        .await;
    Json(ListProductsResponse {
        in_stock: items.iter().filter(|product| product.in_stock()).count(),
        items,
        live: !state.products.is_degraded(),
    })
}

pub async fn create(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Result<Json<ProductDraft>, JsonRejection>,
) -> Response {
    let Json(body) = match body {
        Ok(b) => b,
        Err(rejection) => {
            return error_response(StatusCode::UNPROCESSABLE_ENTITY, rejection.body_text());
        }
    };

    let mut form = FormController::<ProductDraft>::new();
    match idempotency_key(&headers) {
        Some(client_id) => form.open_create_with(client_id),
        None => form.open_create(),
    }
    if let Some(draft) = form.draft_mut() {
        *draft = body;
    }
    match form.submit(state.products.coordinator()).await {
        Ok(SubmitOutcome::Saved(outcome)) => {
            (StatusCode::CREATED, Json(outcome.entity().cloned())).into_response()
        }
        Ok(SubmitOutcome::Unchanged) => StatusCode::NO_CONTENT.into_response(),
        Err(error) => form_error_response(&error),
    }
}
