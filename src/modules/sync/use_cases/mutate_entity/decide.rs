use crate::modules::sync::core::mutation::MutationRequest;
use crate::shared::core::row::{RecordId, Row, values_equal};
use serde_json::Value;

#[derive(Debug, Clone, thiserror::Error, PartialEq, Eq)]
pub enum DecideError {
    #[error("{field} is already {value}")]
    NoOpTransition { field: String, value: String },

    #[error("nothing to update")]
    EmptyPatch,
}

/// The single backend write a request turns into.
#[derive(Debug, Clone, PartialEq)]
pub enum RemoteWrite {
    Insert { fields: Row, client_id: RecordId },
    Update { id: RecordId, patch: Row },
    Delete { id: RecordId },
}

impl RemoteWrite {
    /// The record the write lands on; for inserts, the client-chosen id.
    pub fn target(&self) -> &RecordId {
        match self {
            RemoteWrite::Insert { client_id, .. } => client_id,
            RemoteWrite::Update { id, .. } | RemoteWrite::Delete { id } => id,
        }
    }
}

fn display(value: &Value) -> String {
    match value {
        Value::String(text) => text.clone(),
        other => other.to_string(),
    }
}

pub fn decide(request: MutationRequest) -> Result<RemoteWrite, DecideError> {
    match request {
        MutationRequest::Create {
            mut fields,
            client_id,
        } => {
            fields.insert("id".into(), Value::String(client_id.to_string()));
            Ok(RemoteWrite::Insert { fields, client_id })
        }
        MutationRequest::Update { id, mut patch } => {
            patch.remove("id");
            if patch.is_empty() {
                return Err(DecideError::EmptyPatch);
            }
            Ok(RemoteWrite::Update { id, patch })
        }
        MutationRequest::Delete { id } => Ok(RemoteWrite::Delete { id }),
        MutationRequest::Transition { id, field, from, to } => {
            if values_equal(&from, &to) {
                return Err(DecideError::NoOpTransition {
                    value: display(&to),
                    field,
                });
            }
            let mut patch = Row::new();
            patch.insert(field, to);
            Ok(RemoteWrite::Update { id, patch })
        }
    }
}
