use axum::{
    Json,
    extract::{Query, State},
    response::IntoResponse,
};
use serde::Serialize;

use crate::modules::orders::core::order::Order;
use crate::modules::orders::core::policy::{OrderStats, order_stats};
use crate::modules::sync::core::filter::FilterState;
use crate::shell::state::AppState;

#[derive(Serialize)]
pub struct ListOrdersResponse {
    pub items: Vec<Order>,
    pub stats: OrderStats,
    pub loading: bool,
    pub live: bool,
    pub last_error: Option<String>,
}

pub async fn handle(
    State(state): State<AppState>,
    Query(filter): Query<FilterState>,
) -> impl IntoResponse {
    let loader = state.orders.loader();
    let items = loader.apply_filter(|order| filter.matches(order)).await;
    Json(ListOrdersResponse {
        stats: order_stats(&items),
        items,
        loading: loader.is_loading(),
        live: !state.orders.is_degraded(),
        last_error: loader.last_error().await.map(|error| error.to_string()),
    })
}

#[cfg(test)]
mod list_orders_http_inbound_tests {
    use axum::{
        Router,
        body::Body,
        http::{Request, StatusCode},
        routing::get,
    };
    use http_body_util::BodyExt;
    use tower::ServiceExt;

    use crate::shell::state::AppState;
    use crate::tests::fixtures::context::make_context;
    use crate::tests::fixtures::orders::seed_example_orders;

    use super::handle;

    async fn get_json(uri: &str) -> serde_json::Value {
        let (gateway, _, ctx) = make_context();
        seed_example_orders(&gateway).await;
        let app = Router::new()
            .route("/orders", get(handle))
            .with_state(AppState::mount(ctx).await);

        let response = app
            .oneshot(Request::get(uri).body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn it_should_return_every_order_with_stats() {
        let json = get_json("/orders").await;

        assert_eq!(json["items"].as_array().unwrap().len(), 2);
        assert_eq!(json["stats"]["total"], 150.0);
        assert_eq!(json["live"], true);
        assert!(json["last_error"].is_null());
    }

    #[tokio::test]
    async fn it_should_apply_the_status_filter() {
        let json = get_json("/orders?status=completed").await;

        let items = json["items"].as_array().unwrap();
        assert_eq!(items.len(), 1);
        assert_eq!(items[0]["id"], "2");
        assert_eq!(json["stats"]["total"], 50.0);
    }
}
