use axum::{Json, extract::State, http::StatusCode, response::IntoResponse};

use crate::modules::procedures::use_cases::invoke_procedure::handler::ProcedureError;
use crate::shell::http::{error_response, mutation_error_response};
use crate::shell::state::AppState;

/// Runs payment reconciliation server-side, then reloads the orders view.
pub async fn handle(State(state): State<AppState>) -> impl IntoResponse {
    match state
        .procedures
        .reconcile_stripe(state.orders.coordinator())
        .await
    {
        Ok(report) => Json(report).into_response(),
        Err(ProcedureError::Mutation(error)) => mutation_error_response(&error),
        Err(error) => error_response(StatusCode::BAD_GATEWAY, error.to_string()),
    }
}

#[cfg(test)]
mod reconcile_payments_http_inbound_tests {
    use axum::{
        Router,
        body::Body,
        http::{Request, StatusCode},
        routing::post,
    };
    use serde_json::json;
    use tower::ServiceExt;

    use crate::modules::procedures::core::reports::RECONCILE_STRIPE;
    use crate::shell::state::AppState;
    use crate::tests::fixtures::context::make_context;

    use super::handle;

    #[tokio::test]
    async fn it_should_return_200_when_reconciliation_succeeds() {
        let (gateway, _, ctx) = make_context();
        gateway.register_procedure(RECONCILE_STRIPE, |_| Ok(json!({ "checked": 4, "updated": 1 })));
        let app = Router::new()
            .route("/orders/reconcile", post(handle))
            .with_state(AppState::mount(ctx).await);

        let response = app
            .oneshot(Request::post("/orders/reconcile").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn it_should_return_502_when_the_procedure_fails() {
        let (_, _, ctx) = make_context();
        let app = Router::new()
            .route("/orders/reconcile", post(handle))
            .with_state(AppState::mount(ctx).await);

        let response = app
            .oneshot(Request::post("/orders/reconcile").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
    }
}
