// Mutation vocabulary shared by the coordinator, the forms and the domain modules.

use crate::shared::core::entity::Entity;
use crate::shared::core::row::{RecordId, Row};
use serde::Serialize;
use serde_json::Value;

#[derive(Debug, Clone, PartialEq)]
pub enum MutationRequest {
    /// `client_id` is written as the row id so a retried create can be recognised.
    Create { fields: Row, client_id: RecordId },
    Update { id: RecordId, patch: Row },
    Delete { id: RecordId },
    /// A single-field status change.
    Transition {
        id: RecordId,
        field: String,
        from: Value,
        to: Value,
    },
}

impl MutationRequest {
    pub fn create(fields: Row) -> Self {
        Self::Create {
            fields,
            client_id: RecordId::generate(),
        }
    }

    pub fn transition(
        id: impl Into<RecordId>,
        field: impl Into<String>,
        from: impl Into<Value>,
        to: impl Into<Value>,
    ) -> Self {
        Self::Transition {
            id: id.into(),
            field: field.into(),
            from: from.into(),
            to: to.into(),
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Create { .. } => "create",
            Self::Update { .. } => "update",
            Self::Delete { .. } => "delete",
            Self::Transition { .. } => "status change",
        }
    }

    pub fn target(&self) -> &RecordId {
        match self {
            Self::Create { client_id, .. } => client_id,
            Self::Update { id, .. } | Self::Delete { id } | Self::Transition { id, .. } => id,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum MutationOutcome<E> {
    Created(E),
    Updated(E),
    Deleted(RecordId),
}

impl<E: Entity> MutationOutcome<E> {
    pub fn id(&self) -> &RecordId {
        match self {
            Self::Created(entity) | Self::Updated(entity) => entity.id(),
            Self::Deleted(id) => id,
        }
    }

    pub fn entity(&self) -> Option<&E> {
        match self {
            Self::Created(entity) | Self::Updated(entity) => Some(entity),
            Self::Deleted(_) => None,
        }
    }
}

/// Idle -> Submitting -> {Succeeded, Failed}. A new submit starts from any state but Submitting.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "state", content = "reason", rename_all = "snake_case")]
pub enum MutationStatus {
    Idle,
    Submitting,
    Succeeded,
    Failed(String),
}

/// How the collection catches up after a successful mutation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ReconcileStrategy {
    #[default]
    InPlace,
    Reload,
}
