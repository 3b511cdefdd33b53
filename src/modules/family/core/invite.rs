use crate::shared::core::entity::Entity;
use crate::shared::core::row::RecordId;
use crate::shared::core::table::Table;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InviteStatus {
    #[default]
    Pending,
    Accepted,
    Declined,
    Expired,
}

impl InviteStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            InviteStatus::Pending => "pending",
            InviteStatus::Accepted => "accepted",
            InviteStatus::Declined => "declined",
            InviteStatus::Expired => "expired",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FamilyInvite {
    pub id: RecordId,
    pub email: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub relationship: Option<String>,
    #[serde(default)]
    pub group_id: Option<String>,
    #[serde(default)]
    pub status: InviteStatus,
    #[serde(default)]
    pub expires_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

impl FamilyInvite {
    /// Pending invites past their expiry count as expired even before the backend flips them.
    pub fn effective_status(&self, now: DateTime<Utc>) -> InviteStatus {
        match (self.status, self.expires_at) {
            (InviteStatus::Pending, Some(expires_at)) if expires_at <= now => InviteStatus::Expired,
            (status, _) => status,
        }
    }
}

impl Entity for FamilyInvite {
    const TABLE: Table = Table::FamilyInvites;
    const SUBMIT_TIME_FIELDS: &'static [&'static str] = &["expires_at"];

    fn id(&self) -> &RecordId {
        &self.id
    }

    fn status(&self) -> Option<&str> {
        Some(self.status.as_str())
    }

    fn created_at(&self) -> Option<DateTime<Utc>> {
        self.created_at
    }

    fn search_text(&self) -> Vec<&str> {
        let mut text = vec![self.email.as_str()];
        text.extend(self.name.as_deref());
        text.extend(self.relationship.as_deref());
        text
    }
}
