// In memory implementation of the RemoteGateway port.
//
// Purpose
// - Support loader, coordinator and view tests, and local development without a backend.
//
// Responsibilities
// - Store rows per table, assign ids and timestamps the way the hosted backend does.
// - Emit change events for every committed mutation.
// - Run registered procedures.
// - Offer knobs to simulate an offline backend, slow responses, lost responses after a
//   commit, dropped realtime channels and injected failures.

use crate::shared::core::predicate::{Predicate, QuerySpec};
use crate::shared::core::row::{RecordId, Row, row_id};
use crate::shared::core::table::Table;
use crate::shared::infrastructure::gateway::change_feed::ChangeFeed;
use crate::shared::infrastructure::gateway::{
    ChangeKind, RemoteError, RemoteGateway, Subscription,
};
use chrono::Utc;
use serde_json::Value;
use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;
use tokio::sync::RwLock;

type ProcedureFn = Arc<dyn Fn(Value) -> Result<Value, RemoteError> + Send + Sync>;

/// One recorded call, for asserting what reached the backend.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GatewayCall {
    Query(Table),
    Insert(Table),
    Update(Table, RecordId),
    Delete(Table, RecordId),
    Invoke(String),
}

#[derive(Default)]
pub struct InMemoryGateway {
    tables: RwLock<HashMap<Table, Vec<Row>>>,
    procedures: Mutex<HashMap<String, ProcedureFn>>,
    failures: Mutex<HashMap<Table, VecDeque<RemoteError>>>,
    query_delays: Mutex<VecDeque<u64>>,
    insert_response_delays: Mutex<VecDeque<u64>>,
    calls: Mutex<Vec<GatewayCall>>,
    feed: ChangeFeed,
    delay_ms: AtomicU64,
    is_offline: AtomicBool,
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

impl InMemoryGateway {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn toggle_offline(&self) {
        self.is_offline.fetch_xor(true, Ordering::SeqCst);
    }

    /// Delay applied to every call.
    pub fn set_delay_ms(&self, delay_ms: u64) {
        self.delay_ms.store(delay_ms, Ordering::SeqCst);
    }

    /// Delay for the next query only; queued delays are consumed in call order.
    pub fn push_query_delay_ms(&self, delay_ms: u64) {
        lock(&self.query_delays).push_back(delay_ms);
    }

    /// Delay between the next insert committing and its response reaching the caller.
    /// A caller that times out in between never learns the row was written.
    pub fn push_insert_response_delay_ms(&self, delay_ms: u64) {
        lock(&self.insert_response_delays).push_back(delay_ms);
    }

    /// Ends every open realtime subscription on `table`.
    pub fn drop_subscriptions(&self, table: Table) {
        self.feed.close(table);
    }

    /// Makes the next call against `table` fail with `error`.
    pub fn fail_next(&self, table: Table, error: RemoteError) {
        lock(&self.failures).entry(table).or_default().push_back(error);
    }

    pub fn register_procedure(
        &self,
        name: impl Into<String>,
        procedure: impl Fn(Value) -> Result<Value, RemoteError> + Send + Sync + 'static,
    ) {
        lock(&self.procedures).insert(name.into(), Arc::new(procedure));
    }

    /// Writes rows straight into a table, bypassing change events.
    pub async fn seed(&self, table: Table, rows: Vec<Row>) {
        self.tables.write().await.entry(table).or_default().extend(rows);
    }

    pub async fn rows(&self, table: Table) -> Vec<Row> {
        self.tables
            .read()
            .await
            .get(&table)
            .cloned()
            .unwrap_or_default()
    }

    pub fn calls(&self) -> Vec<GatewayCall> {
        lock(&self.calls).clone()
    }

    pub fn subscriber_count(&self) -> usize {
        self.feed.subscriber_count()
    }

    fn record(&self, call: GatewayCall) {
        lock(&self.calls).push(call);
    }

    fn guard(&self, table: Table) -> Result<(), RemoteError> {
        if self.is_offline.load(Ordering::SeqCst) {
            return Err(RemoteError::Network("Gateway offline".into()));
        }
        match lock(&self.failures)
            .get_mut(&table)
            .and_then(VecDeque::pop_front)
        {
            Some(error) => Err(error),
            None => Ok(()),
        }
    }

    async fn pause(&self, delay_ms: u64) {
        if delay_ms > 0 {
            tokio::time::sleep(Duration::from_millis(delay_ms)).await;
        }
    }

    fn fixed_delay(&self) -> u64 {
        self.delay_ms.load(Ordering::SeqCst)
    }
}

#[async_trait::async_trait]
impl RemoteGateway for InMemoryGateway {
    async fn query(&self, table: Table, spec: &QuerySpec) -> Result<Vec<Row>, RemoteError> {
        self.record(GatewayCall::Query(table));
        let delay = lock(&self.query_delays)
            .pop_front()
            .unwrap_or_else(|| self.fixed_delay());
        self.guard(table)?;
        if let Some(predicate) = &spec.predicate {
            predicate.validate().map_err(RemoteError::Validation)?;
        }

        // Snapshot first, respond later: a slow response carries the rows as they were
        // when the request reached the backend.
        let mut rows: Vec<Row> = self
            .tables
            .read()
            .await
            .get(&table)
            .map(|rows| {
                rows.iter()
                    .filter(|row| spec.predicate.as_ref().is_none_or(|p| p.matches(row)))
                    .cloned()
                    .collect()
            })
            .unwrap_or_default();
        if let Some(order_by) = &spec.order_by {
            rows.sort_by(|left, right| order_by.compare(left, right));
        }
        if let Some(limit) = spec.limit {
            rows.truncate(limit);
        }

        self.pause(delay).await;
        Ok(rows)
    }

    async fn insert(&self, table: Table, fields: Row) -> Result<Row, RemoteError> {
        self.record(GatewayCall::Insert(table));
        self.pause(self.fixed_delay()).await;
        self.guard(table)?;

        let mut row = fields;
        let id = match row_id(&row) {
            Some(id) => id,
            None => {
                let id = RecordId::generate();
                row.insert("id".into(), Value::String(id.to_string()));
                id
            }
        };
        let now = Value::String(Utc::now().to_rfc3339());
        row.entry("created_at").or_insert_with(|| now.clone());
        row.entry("updated_at").or_insert(now);

        {
            let mut tables = self.tables.write().await;
            let rows = tables.entry(table).or_default();
            if rows.iter().any(|existing| row_id(existing).as_ref() == Some(&id)) {
                return Err(RemoteError::Conflict(format!(
                    "duplicate key value violates unique constraint \"{table}_pkey\" ({id})"
                )));
            }
            rows.push(row.clone());
        }
        self.feed.publish(table, ChangeKind::Insert, &[&row]);

        let response_delay = lock(&self.insert_response_delays).pop_front().unwrap_or(0);
        self.pause(response_delay).await;
        Ok(row)
    }

    async fn update(&self, table: Table, id: &RecordId, patch: Row) -> Result<Row, RemoteError> {
        self.record(GatewayCall::Update(table, id.clone()));
        self.pause(self.fixed_delay()).await;
        self.guard(table)?;

        let (before, after) = {
            let mut tables = self.tables.write().await;
            let row = tables
                .get_mut(&table)
                .and_then(|rows| {
                    rows.iter_mut()
                        .find(|row| row_id(row).as_ref() == Some(id))
                })
                .ok_or_else(|| RemoteError::NotFound {
                    table,
                    id: id.clone(),
                })?;
            let before = row.clone();
            for (field, value) in patch {
                if field != "id" {
                    row.insert(field, value);
                }
            }
            row.insert("updated_at".into(), Value::String(Utc::now().to_rfc3339()));
            (before, row.clone())
        };
        self.feed
            .publish(table, ChangeKind::Update, &[&before, &after]);
        Ok(after)
    }

    async fn delete(&self, table: Table, id: &RecordId) -> Result<(), RemoteError> {
        self.record(GatewayCall::Delete(table, id.clone()));
        self.pause(self.fixed_delay()).await;
        self.guard(table)?;

        let removed = {
            let mut tables = self.tables.write().await;
            tables.get_mut(&table).and_then(|rows| {
                rows.iter()
                    .position(|row| row_id(row).as_ref() == Some(id))
                    .map(|index| rows.remove(index))
            })
        };
        if let Some(row) = removed {
            self.feed.publish(table, ChangeKind::Delete, &[&row]);
        }
        Ok(())
    }

    async fn invoke(&self, procedure: &str, payload: Value) -> Result<Value, RemoteError> {
        self.record(GatewayCall::Invoke(procedure.to_string()));
        self.pause(self.fixed_delay()).await;
        if self.is_offline.load(Ordering::SeqCst) {
            return Err(RemoteError::Network("Gateway offline".into()));
        }
        let registered = lock(&self.procedures).get(procedure).cloned();
        match registered {
            Some(run) => run(payload),
            None => Err(RemoteError::Procedure {
                procedure: procedure.to_string(),
                message: Some("function not found".into()),
            }),
        }
    }

    fn subscribe(
        &self,
        table: Table,
        predicate: Option<Predicate>,
    ) -> Result<Subscription, RemoteError> {
        if self.is_offline.load(Ordering::SeqCst) {
            return Err(RemoteError::Network("realtime channel unavailable".into()));
        }
        Ok(self.feed.subscribe(table, predicate))
    }
}

#[cfg(test)]
mod in_memory_gateway_tests {
    use super::*;
    use crate::shared::core::predicate::OrderBy;
    use rstest::{fixture, rstest};
    use serde_json::json;

    fn row(value: Value) -> Row {
        value.as_object().cloned().unwrap()
    }

    #[fixture]
    fn before_each() -> InMemoryGateway {
        InMemoryGateway::new()
    }

    #[rstest]
    #[tokio::test]
    async fn it_should_insert_and_assign_backend_columns(before_each: InMemoryGateway) {
        let gateway = before_each;
        let stored = gateway
            .insert(Table::Orders, row(json!({ "status": "pending", "total_price": 10 })))
            .await
            .expect("insert failed");
        assert!(stored.contains_key("id"));
        assert!(stored.contains_key("created_at"));
        assert!(stored.contains_key("updated_at"));
        assert_eq!(gateway.rows(Table::Orders).await.len(), 1);
    }

    #[rstest]
    #[tokio::test]
    async fn it_should_reject_a_duplicate_id_as_a_conflict(before_each: InMemoryGateway) {
        let gateway = before_each;
        let fields = row(json!({ "id": "o-1", "status": "pending" }));
        gateway.insert(Table::Orders, fields.clone()).await.unwrap();
        let result = gateway.insert(Table::Orders, fields).await;
        assert!(matches!(result, Err(RemoteError::Conflict(_))));
    }

    #[rstest]
    #[tokio::test]
    async fn it_should_filter_order_and_limit_queries(before_each: InMemoryGateway) {
        let gateway = before_each;
        gateway
            .seed(
                Table::Orders,
                vec![
                    row(json!({ "id": "1", "status": "pending", "total_price": 5 })),
                    row(json!({ "id": "2", "status": "completed", "total_price": 50 })),
                    row(json!({ "id": "3", "status": "pending", "total_price": 20 })),
                ],
            )
            .await;
        let spec = QuerySpec::new()
            .filter(Predicate::eq("status", "pending"))
            .order_by(OrderBy::desc("total_price"))
            .limit(1);
        let rows = gateway.query(Table::Orders, &spec).await.unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0]["id"], json!("3"));
    }

    #[rstest]
    #[tokio::test]
    async fn it_should_reject_a_malformed_filter_entirely(before_each: InMemoryGateway) {
        let gateway = before_each;
        let spec = QuerySpec::new().filter(Predicate::eq("", 1));
        let result = gateway.query(Table::Orders, &spec).await;
        assert!(matches!(result, Err(RemoteError::Validation(_))));
    }

    #[rstest]
    #[tokio::test]
    async fn it_should_fail_to_update_an_unknown_id(before_each: InMemoryGateway) {
        let gateway = before_each;
        let result = gateway
            .update(Table::Orders, &RecordId::from("missing"), Row::new())
            .await;
        assert_eq!(
            result,
            Err(RemoteError::NotFound {
                table: Table::Orders,
                id: RecordId::from("missing")
            })
        );
    }

    #[rstest]
    #[tokio::test]
    async fn it_should_treat_deleting_a_missing_id_as_success(before_each: InMemoryGateway) {
        let gateway = before_each;
        let result = gateway
            .delete(Table::Orders, &RecordId::from("missing"))
            .await;
        assert!(result.is_ok());
    }

    #[rstest]
    #[tokio::test]
    async fn it_should_publish_change_events_to_subscribers(before_each: InMemoryGateway) {
        let gateway = before_each;
        let mut subscription = gateway.subscribe(Table::Orders, None).unwrap();
        let stored = gateway
            .insert(Table::Orders, row(json!({ "status": "pending" })))
            .await
            .unwrap();
        let id = row_id(&stored).unwrap();
        gateway.delete(Table::Orders, &id).await.unwrap();

        assert_eq!(subscription.next().await.unwrap().kind, ChangeKind::Insert);
        assert_eq!(subscription.next().await.unwrap().kind, ChangeKind::Delete);
    }

    #[rstest]
    #[tokio::test]
    async fn it_should_fail_every_call_when_offline(before_each: InMemoryGateway) {
        let gateway = before_each;
        gateway.toggle_offline();
        assert!(gateway.query(Table::Orders, &QuerySpec::new()).await.is_err());
        assert!(gateway.subscribe(Table::Orders, None).is_err());
        assert!(gateway.invoke("health-check", json!({})).await.is_err());
    }

    #[rstest]
    #[tokio::test]
    async fn it_should_fail_the_next_call_with_an_injected_error(before_each: InMemoryGateway) {
        let gateway = before_each;
        gateway.fail_next(Table::Orders, RemoteError::Permission("rls".into()));
        let first = gateway.query(Table::Orders, &QuerySpec::new()).await;
        let second = gateway.query(Table::Orders, &QuerySpec::new()).await;
        assert_eq!(first, Err(RemoteError::Permission("rls".into())));
        assert!(second.is_ok());
    }

    #[rstest]
    #[tokio::test]
    async fn it_should_run_registered_procedures(before_each: InMemoryGateway) {
        let gateway = before_each;
        gateway.register_procedure("echo", Ok);
        let result = gateway.invoke("echo", json!({ "ping": true })).await;
        assert_eq!(result, Ok(json!({ "ping": true })));

        let missing = gateway.invoke("missing", json!({})).await;
        assert!(matches!(missing, Err(RemoteError::Procedure { .. })));
        assert_eq!(
            gateway.calls(),
            vec![
                GatewayCall::Invoke("echo".into()),
                GatewayCall::Invoke("missing".into())
            ]
        );
    }

    #[rstest]
    #[tokio::test(start_paused = true)]
    async fn it_should_keep_the_row_when_the_insert_response_is_lost(
        before_each: InMemoryGateway,
    ) {
        let gateway = before_each;
        gateway.push_insert_response_delay_ms(500);

        let result = tokio::time::timeout(
            Duration::from_millis(100),
            gateway.insert(Table::Orders, row(json!({ "id": "o-1", "status": "pending" }))),
        )
        .await;

        assert!(result.is_err());
        assert_eq!(gateway.rows(Table::Orders).await.len(), 1);
    }

    #[rstest]
    #[tokio::test]
    async fn it_should_end_subscriptions_when_they_are_dropped(before_each: InMemoryGateway) {
        let gateway = before_each;
        let mut subscription = gateway.subscribe(Table::Orders, None).unwrap();

        gateway.drop_subscriptions(Table::Orders);

        assert_eq!(subscription.next().await, None);
        assert_eq!(gateway.subscriber_count(), 0);
    }
}
