// Mutation Coordinator.
//
// Purpose
// - Turn one create/update/delete/status change into a backend write and mirror the
//   committed result into the view's collection.
//
// Responsibilities
// - Reject no-op transitions and empty patches before any remote call.
// - One submission at a time per record; a second submit for a record that is still being
//   written is Busy, while writes to other records proceed.
// - On failure leave the collection untouched and tell the operator why.
// - Recognise a retried create whose first attempt already committed, also across restarts:
//   a conflicting insert is accepted when the stored row carries the submitted fields.
// - Report multi-step operations that stop half way as partial failures, without rollback.

use crate::modules::sync::core::mutation::{
    MutationOutcome, MutationRequest, MutationStatus, ReconcileStrategy,
};
use crate::modules::sync::use_cases::load_collection::handler::{
    EntityListLoader, LoadError, LocalChange,
};
use crate::modules::sync::use_cases::mutate_entity::decide::{DecideError, RemoteWrite, decide};
use crate::shared::context::AppContext;
use crate::shared::core::entity::Entity;
use crate::shared::core::predicate::{Predicate, QuerySpec};
use crate::shared::core::row::{RecordId, Row, values_equal};
use crate::shared::infrastructure::gateway::policy::{CallPolicy, run_with_policy};
use crate::shared::infrastructure::gateway::{RemoteError, RemoteGateway};
use crate::shared::infrastructure::notifier::{Notification, Notifier};
use serde_json::Value;
use std::collections::HashSet;
use std::sync::{Arc, Mutex, PoisonError};
use thiserror::Error;
use tracing::{info, warn};

#[derive(Debug, Clone, Error, PartialEq)]
pub enum MutationError {
    #[error("a submission is already in progress")]
    Busy,

    #[error("{field} is already {value}")]
    NoOpTransition { field: String, value: String },

    #[error("nothing to update")]
    EmptyPatch,

    #[error(transparent)]
    Remote(#[from] RemoteError),

    #[error("backend returned an unreadable record: {0}")]
    Decode(String),

    #[error("{completed} succeeded but {failed}")]
    PartialFailure { completed: String, failed: String },
}

impl From<DecideError> for MutationError {
    fn from(error: DecideError) -> Self {
        match error {
            DecideError::NoOpTransition { field, value } => {
                MutationError::NoOpTransition { field, value }
            }
            DecideError::EmptyPatch => MutationError::EmptyPatch,
        }
    }
}

/// What a running submission holds exclusively.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
enum SubmitKey {
    Record(RecordId),
    Procedure(String),
}

/// Releases the key when the submission ends; resets the status to Idle if it was dropped
/// before finishing and nothing else is in flight.
struct SubmitGuard<'a> {
    status: &'a Mutex<MutationStatus>,
    in_flight: &'a Mutex<HashSet<SubmitKey>>,
    key: SubmitKey,
    finished: bool,
}

impl<'a> SubmitGuard<'a> {
    fn begin(
        status: &'a Mutex<MutationStatus>,
        in_flight: &'a Mutex<HashSet<SubmitKey>>,
        key: SubmitKey,
    ) -> Result<Self, MutationError> {
        let mut keys = in_flight.lock().unwrap_or_else(PoisonError::into_inner);
        if !keys.insert(key.clone()) {
            return Err(MutationError::Busy);
        }
        *status.lock().unwrap_or_else(PoisonError::into_inner) = MutationStatus::Submitting;
        Ok(Self {
            status,
            in_flight,
            key,
            finished: false,
        })
    }

    fn finish<T>(mut self, result: &Result<T, MutationError>) {
        let next = match result {
            Ok(_) => MutationStatus::Succeeded,
            Err(error) => MutationStatus::Failed(error.to_string()),
        };
        *self.status.lock().unwrap_or_else(PoisonError::into_inner) = next;
        self.finished = true;
    }
}

impl Drop for SubmitGuard<'_> {
    fn drop(&mut self) {
        let mut keys = self.in_flight.lock().unwrap_or_else(PoisonError::into_inner);
        keys.remove(&self.key);
        if !self.finished && keys.is_empty() {
            *self.status.lock().unwrap_or_else(PoisonError::into_inner) = MutationStatus::Idle;
        }
    }
}

pub struct MutationCoordinator<E: Entity> {
    gateway: Arc<dyn RemoteGateway>,
    notifier: Arc<dyn Notifier>,
    loader: Arc<EntityListLoader<E>>,
    strategy: ReconcileStrategy,
    policy: CallPolicy,
    status: Mutex<MutationStatus>,
    in_flight: Mutex<HashSet<SubmitKey>>,
}

impl<E: Entity> MutationCoordinator<E> {
    pub fn new(
        ctx: &AppContext,
        loader: Arc<EntityListLoader<E>>,
        strategy: ReconcileStrategy,
    ) -> Self {
        Self {
            gateway: ctx.gateway.clone(),
            notifier: ctx.notifier.clone(),
            loader,
            strategy,
            policy: ctx.config.mutation_policy(),
            status: Mutex::new(MutationStatus::Idle),
            in_flight: Mutex::new(HashSet::new()),
        }
    }

    /// Status of the most recent submission to start or finish.
    pub fn status(&self) -> MutationStatus {
        self.status
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn loader(&self) -> &Arc<EntityListLoader<E>> {
        &self.loader
    }

    pub async fn submit(
        &self,
        request: MutationRequest,
    ) -> Result<MutationOutcome<E>, MutationError> {
        let label = request.label();
        let write = decide(request)?;
        let guard = self.begin(SubmitKey::Record(write.target().clone()))?;
        let result = self.run(label, write).await;
        guard.finish(&result);
        result
    }

    /// Writes a row, then calls a procedure about it (for example, send the invite email).
    pub async fn submit_then_invoke(
        &self,
        request: MutationRequest,
        procedure: &str,
        payload: impl FnOnce(&MutationOutcome<E>) -> Value,
    ) -> Result<(MutationOutcome<E>, Value), MutationError> {
        let label = request.label();
        let write = decide(request)?;
        let guard = self.begin(SubmitKey::Record(write.target().clone()))?;
        let outcome = match self.run(label, write).await {
            Ok(outcome) => outcome,
            Err(error) => {
                guard.finish::<()>(&Err(error.clone()));
                return Err(error);
            }
        };
        let result = match self.invoke(procedure, payload(&outcome)).await {
            Ok(response) => Ok((outcome, response)),
            Err(error) => Err(self.partial_failure(
                format!("{} {label}", E::TABLE),
                format!("{procedure} failed: {error}"),
            )),
        };
        guard.finish(&result);
        result
    }

    /// Calls a procedure that changes the table server-side, then reloads the view.
    pub async fn invoke_then_reload(
        &self,
        procedure: &str,
        payload: Value,
    ) -> Result<Value, MutationError> {
        let guard = self.begin(SubmitKey::Procedure(procedure.to_string()))?;
        let result = match self.invoke(procedure, payload).await {
            Err(error) => {
                self.notifier.notify(Notification::error(
                    format!("{procedure} failed"),
                    error.to_string(),
                ));
                Err(MutationError::Remote(error))
            }
            Ok(response) => match self.loader.load().await {
                Ok(_) => {
                    self.notifier
                        .notify(Notification::success(format!("{procedure} completed")));
                    Ok(response)
                }
                Err(error) => Err(self.partial_failure(
                    procedure.to_string(),
                    format!("reloading {} failed: {error}", E::TABLE),
                )),
            },
        };
        guard.finish(&result);
        result
    }

    fn begin(&self, key: SubmitKey) -> Result<SubmitGuard<'_>, MutationError> {
        SubmitGuard::begin(&self.status, &self.in_flight, key)
    }

    async fn run(
        &self,
        label: &'static str,
        write: RemoteWrite,
    ) -> Result<MutationOutcome<E>, MutationError> {
        let target = write.target().clone();
        let outcome = match self.execute(write).await {
            Ok(outcome) => outcome,
            Err(error) => {
                warn!(table = %E::TABLE, id = %target, action = label, %error, "mutation failed");
                self.notifier.notify(Notification::error(
                    format!("Could not {label} {} record", E::TABLE),
                    error.to_string(),
                ));
                return Err(error);
            }
        };
        info!(table = %E::TABLE, id = %outcome.id(), action = label, "mutation committed");

        match self.strategy {
            ReconcileStrategy::InPlace => {
                let change = match &outcome {
                    MutationOutcome::Created(entity) | MutationOutcome::Updated(entity) => {
                        LocalChange::Upserted(entity.clone())
                    }
                    MutationOutcome::Deleted(id) => LocalChange::Removed(id.clone()),
                };
                self.loader.reconcile(change).await;
            }
            ReconcileStrategy::Reload => {
                if let Err(error) = self.loader.load().await {
                    return Err(self.reload_failed(label, error));
                }
            }
        }
        self.notifier.notify(Notification::success(format!(
            "{} {label} saved",
            E::TABLE
        )));
        Ok(outcome)
    }

    async fn execute(&self, write: RemoteWrite) -> Result<MutationOutcome<E>, MutationError> {
        match write {
            RemoteWrite::Insert { fields, client_id } => self.create(fields, client_id).await,
            RemoteWrite::Update { id, patch } => {
                let row = run_with_policy(&self.policy, || {
                    self.gateway.update(E::TABLE, &id, patch.clone())
                })
                .await?;
                Ok(MutationOutcome::Updated(decode(row)?))
            }
            RemoteWrite::Delete { id } => {
                run_with_policy(&self.policy, || self.gateway.delete(E::TABLE, &id)).await?;
                Ok(MutationOutcome::Deleted(id))
            }
        }
    }

    async fn create(
        &self,
        fields: Row,
        client_id: RecordId,
    ) -> Result<MutationOutcome<E>, MutationError> {
        let inserted =
            run_with_policy(&self.policy, || self.gateway.insert(E::TABLE, fields.clone())).await;
        let row = match inserted {
            Ok(row) => row,
            Err(RemoteError::Conflict(message)) => match self.find(&client_id).await? {
                Some(row) if carries_fields(&row, &fields, E::SUBMIT_TIME_FIELDS) => {
                    info!(table = %E::TABLE, id = %client_id, "retried create had already committed");
                    row
                }
                _ => return Err(RemoteError::Conflict(message).into()),
            },
            Err(error) => return Err(error.into()),
        };
        Ok(MutationOutcome::Created(decode(row)?))
    }

    async fn find(&self, id: &RecordId) -> Result<Option<Row>, RemoteError> {
        let spec = QuerySpec::new()
            .filter(Predicate::eq("id", id.as_str()))
            .limit(1);
        let rows = run_with_policy(&self.policy, || self.gateway.query(E::TABLE, &spec)).await?;
        Ok(rows.into_iter().next())
    }

    async fn invoke(&self, procedure: &str, payload: Value) -> Result<Value, RemoteError> {
        run_with_policy(&self.policy, || self.gateway.invoke(procedure, payload.clone())).await
    }

    fn reload_failed(&self, label: &str, error: LoadError) -> MutationError {
        self.partial_failure(
            format!("{} {label}", E::TABLE),
            format!("reloading {} failed: {error}", E::TABLE),
        )
    }

    fn partial_failure(&self, completed: String, failed: String) -> MutationError {
        warn!(table = %E::TABLE, %completed, %failed, "multi-step operation stopped half way");
        self.notifier.notify(Notification::warning(
            format!("{completed} succeeded, but not every step finished"),
            failed.clone(),
        ));
        MutationError::PartialFailure { completed, failed }
    }
}

/// True when `stored` holds every submitted field with the submitted value, `ignored`
/// aside. A column the backend left out counts as null.
fn carries_fields(stored: &Row, submitted: &Row, ignored: &[&str]) -> bool {
    submitted
        .iter()
        .filter(|(field, _)| !ignored.contains(&field.as_str()))
        .all(|(field, value)| values_equal(stored.get(field).unwrap_or(&Value::Null), value))
}

fn decode<E: Entity>(row: Row) -> Result<E, MutationError> {
    E::from_row(row).map_err(|error| MutationError::Decode(error.to_string()))
}
