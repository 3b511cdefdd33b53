// Typed records bound to one backend table.
//
// Purpose
// - Let loaders, coordinators and forms work with concrete structs instead of open maps.
//
// Responsibilities
// - Name the table and the identity of a record.
// - Expose the optional facets the generic filter reads (status, creation time, search text).
// - Convert between typed records and backend rows through serde.

use crate::shared::core::row::{RecordId, Row};
use crate::shared::core::table::Table;
use chrono::{DateTime, Utc};
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;

pub trait Entity: Serialize + DeserializeOwned + Clone + Send + Sync + 'static {
    const TABLE: Table;

    /// Fields a create computes at submit time (an expiry, say), so a resubmission of the
    /// same create may carry a different value.
    const SUBMIT_TIME_FIELDS: &'static [&'static str] = &[];

    fn id(&self) -> &RecordId;

    fn status(&self) -> Option<&str> {
        None
    }

    fn created_at(&self) -> Option<DateTime<Utc>> {
        None
    }

    /// Text the free-form search box looks at.
    fn search_text(&self) -> Vec<&str> {
        Vec::new()
    }

    fn field(&self, name: &str) -> Option<Value> {
        match serde_json::to_value(self) {
            Ok(Value::Object(mut row)) => row.remove(name),
            _ => None,
        }
    }

    fn from_row(row: Row) -> Result<Self, serde_json::Error> {
        serde_json::from_value(Value::Object(row))
    }

    fn to_row(&self) -> Result<Row, serde_json::Error> {
        match serde_json::to_value(self)? {
            Value::Object(row) => Ok(row),
            other => Err(serde::ser::Error::custom(format!(
                "{} record serialized to a non-object: {other}",
                Self::TABLE
            ))),
        }
    }
}
