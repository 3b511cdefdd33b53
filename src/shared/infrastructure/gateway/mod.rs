// Remote Data Gateway port.
//
// Purpose
// - Describe everything the views need from the hosted backend as one object-safe trait:
//   table queries and mutations, named server procedures, and change subscriptions.
//
// Boundaries
// - No transport here. Adapters (in memory, HTTP) implement the trait.
// - Subscriptions carry a coarse "table changed" event, never a row diff.

use crate::shared::core::predicate::{Predicate, QuerySpec};
use crate::shared::core::row::{RecordId, Row};
use crate::shared::core::table::Table;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::time::Duration;
use thiserror::Error;
use tokio::sync::mpsc;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RemoteErrorReason {
    Validation,
    Permission,
    Conflict,
    NotFound,
    Timeout,
    Network,
    Procedure,
    Backend,
}

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum RemoteError {
    #[error("validation failed: {0}")]
    Validation(String),

    #[error("permission denied: {0}")]
    Permission(String),

    #[error("conflict: {0}")]
    Conflict(String),

    #[error("{table} record {id} not found")]
    NotFound { table: Table, id: RecordId },

    #[error("request timed out after {0:?}")]
    Timeout(Duration),

    #[error("network error: {0}")]
    Network(String),

    #[error("procedure {procedure} failed: {}", .message.as_deref().unwrap_or("no details"))]
    Procedure {
        procedure: String,
        message: Option<String>,
    },

    #[error("backend error: {0}")]
    Backend(String),
}

impl RemoteError {
    pub fn reason(&self) -> RemoteErrorReason {
        match self {
            Self::Validation(_) => RemoteErrorReason::Validation,
            Self::Permission(_) => RemoteErrorReason::Permission,
            Self::Conflict(_) => RemoteErrorReason::Conflict,
            Self::NotFound { .. } => RemoteErrorReason::NotFound,
            Self::Timeout(_) => RemoteErrorReason::Timeout,
            Self::Network(_) => RemoteErrorReason::Network,
            Self::Procedure { .. } => RemoteErrorReason::Procedure,
            Self::Backend(_) => RemoteErrorReason::Backend,
        }
    }

    /// Failures a later attempt of the same call could get past.
    pub fn is_transient(&self) -> bool {
        matches!(self, Self::Timeout(_) | Self::Network(_) | Self::Backend(_))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChangeKind {
    Insert,
    Update,
    Delete,
}

/// "Something in `table` changed." Subscribers reload; they never patch from it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChangeEvent {
    pub table: Table,
    pub kind: ChangeKind,
}

/// Live registration for change events of one table.
///
/// Dropping the subscription releases the registration, so a view that forgets
/// to call [`Subscription::unsubscribe`] cannot leak it.
pub struct Subscription {
    table: Table,
    receiver: mpsc::UnboundedReceiver<ChangeEvent>,
    release: Option<Box<dyn FnOnce() + Send>>,
}

impl Subscription {
    pub fn new(
        table: Table,
        receiver: mpsc::UnboundedReceiver<ChangeEvent>,
        release: impl FnOnce() + Send + 'static,
    ) -> Self {
        Self {
            table,
            receiver,
            release: Some(Box::new(release)),
        }
    }

    pub fn table(&self) -> Table {
        self.table
    }

    pub async fn next(&mut self) -> Option<ChangeEvent> {
        self.receiver.recv().await
    }

    pub fn try_next(&mut self) -> Option<ChangeEvent> {
        self.receiver.try_recv().ok()
    }

    pub fn unsubscribe(mut self) {
        if let Some(release) = self.release.take() {
            release();
        }
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        if let Some(release) = self.release.take() {
            release();
        }
    }
}

impl std::fmt::Debug for Subscription {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Subscription")
            .field("table", &self.table)
            .field("active", &self.release.is_some())
            .finish()
    }
}

#[async_trait]
pub trait RemoteGateway: Send + Sync {
    async fn query(&self, table: Table, spec: &QuerySpec) -> Result<Vec<Row>, RemoteError>;

    /// Returns the stored row, including backend-assigned columns.
    async fn insert(&self, table: Table, fields: Row) -> Result<Row, RemoteError>;

    /// Partial update. Unknown ids fail with [`RemoteError::NotFound`].
    async fn update(&self, table: Table, id: &RecordId, patch: Row) -> Result<Row, RemoteError>;

    /// Deleting an id that does not exist succeeds.
    async fn delete(&self, table: Table, id: &RecordId) -> Result<(), RemoteError>;

    async fn invoke(&self, procedure: &str, payload: Value) -> Result<Value, RemoteError>;

    fn subscribe(
        &self,
        table: Table,
        predicate: Option<Predicate>,
    ) -> Result<Subscription, RemoteError>;
}

pub mod change_feed;
pub mod http;
pub mod in_memory;
pub mod policy;
