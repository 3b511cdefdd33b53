use crate::modules::orders::core::order::OrderStatus;
use crate::modules::orders::use_cases::transition_order_status::handler::transition_order_status;
use crate::shared::core::table::Table;
use crate::shared::infrastructure::gateway::RemoteGateway;
use crate::shared::infrastructure::notifier::NotificationLevel;
use crate::shell::state::AppState;
use crate::tests::fixtures::context::make_context;
use crate::tests::fixtures::orders::{OrderBuilder, seed_example_orders};
use std::time::Duration;

async fn eventually(mut check: impl AsyncFnMut() -> bool) -> bool {
    for _ in 0..100 {
        if check().await {
            return true;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    false
}

#[tokio::test]
async fn a_second_console_sees_another_consoles_change() {
    let (gateway, _, ctx) = make_context();
    seed_example_orders(&gateway).await;
    let first = AppState::mount(ctx.clone()).await;
    let second = AppState::mount(ctx).await;

    transition_order_status(first.orders.coordinator(), &"1".into(), OrderStatus::Shipped)
        .await
        .unwrap();

    assert!(
        eventually(async || {
            second
                .orders
                .loader()
                .get(&"1".into())
                .await
                .is_some_and(|order| order.status == OrderStatus::Shipped)
        })
        .await
    );
}

#[tokio::test]
async fn an_unmounted_console_stops_following_changes() {
    let (gateway, _, ctx) = make_context();
    let state = AppState::mount(ctx).await;
    assert_eq!(gateway.subscriber_count(), 8);

    state.unmount().await;
    gateway
        .insert(Table::Orders, OrderBuilder::new().id("9").build_row())
        .await
        .unwrap();
    tokio::time::sleep(Duration::from_millis(50)).await;

    assert_eq!(gateway.subscriber_count(), 0);
    assert_eq!(state.orders.loader().len().await, 0);
}

#[tokio::test]
async fn a_console_goes_manual_when_its_change_channel_drops() {
    let (gateway, notifier, ctx) = make_context();
    let state = AppState::mount(ctx).await;

    gateway.drop_subscriptions(Table::Orders);

    assert!(eventually(async || state.orders.is_degraded()).await);
    assert!(!state.products.is_degraded());
    assert_eq!(notifier.count(NotificationLevel::Warning), 1);
    assert_eq!(gateway.subscriber_count(), 7);
}
