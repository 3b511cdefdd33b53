use crate::modules::orders::core::order::{Order, OrderStatus};
use crate::modules::orders::use_cases::transition_order_status::handler::transition_order_status;
use crate::modules::sync::core::mutation::MutationRequest;
use crate::modules::sync::use_cases::mutate_entity::handler::MutationError;
use crate::modules::orders::use_cases::transition_order_status::handler::TransitionError;
use crate::shared::core::table::Table;
use crate::shared::infrastructure::gateway::in_memory::GatewayCall;
use crate::shell::http::router;
use crate::shell::state::AppState;
use crate::tests::fixtures::context::make_context;
use crate::tests::fixtures::orders::seed_example_orders;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use http_body_util::BodyExt;
use tower::ServiceExt;

fn total(orders: &[Order]) -> f64 {
    orders.iter().map(|order| order.total_price).sum()
}

#[tokio::test]
async fn completes_an_order_without_changing_the_total() {
    let (gateway, _, ctx) = make_context();
    seed_example_orders(&gateway).await;
    let state = AppState::mount(ctx).await;
    let coordinator = state.orders.coordinator();
    assert_eq!(total(&state.orders.loader().snapshot().await), 150.0);

    let updated = transition_order_status(coordinator, &"1".into(), OrderStatus::Completed)
        .await
        .unwrap();

    assert_eq!(updated.status, OrderStatus::Completed);
    assert!(gateway.calls().contains(&GatewayCall::Update(Table::Orders, "1".into())));
    let orders = state.orders.loader().snapshot().await;
    assert!(orders.iter().all(|order| order.status == OrderStatus::Completed));
    assert_eq!(total(&orders), 150.0);

    let again = transition_order_status(coordinator, &"1".into(), OrderStatus::Completed).await;
    assert!(matches!(
        again,
        Err(TransitionError::Mutation(MutationError::NoOpTransition { .. }))
    ));
    let updates = gateway
        .calls()
        .into_iter()
        .filter(|call| matches!(call, GatewayCall::Update(..)))
        .count();
    assert_eq!(updates, 1);
}

#[tokio::test]
async fn deleting_twice_leaves_the_collection_alone() {
    let (gateway, _, ctx) = make_context();
    seed_example_orders(&gateway).await;
    let state = AppState::mount(ctx).await;
    let coordinator = state.orders.coordinator();

    coordinator
        .submit(MutationRequest::Delete { id: "2".into() })
        .await
        .unwrap();
    let after_first = state.orders.loader().snapshot().await;
    let second = coordinator
        .submit(MutationRequest::Delete { id: "2".into() })
        .await;

    assert!(second.is_ok());
    assert_eq!(state.orders.loader().snapshot().await, after_first);
    assert_eq!(total(&after_first), 100.0);
}

#[tokio::test]
async fn serves_the_dashboard_over_http() {
    let (gateway, _, ctx) = make_context();
    seed_example_orders(&gateway).await;
    let app = router(AppState::mount(ctx).await);

    let response = app
        .clone()
        .oneshot(
            Request::post("/orders/1/status")
                .header("content-type", "application/json")
                .body(Body::from(r#"{"status":"completed"}"#))
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let response = app
        .oneshot(Request::get("/orders?status=completed").body(Body::empty()).unwrap())
        .await
        .unwrap();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let json: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(json["items"].as_array().unwrap().len(), 2);
    assert_eq!(json["stats"]["total"], 150.0);
}
