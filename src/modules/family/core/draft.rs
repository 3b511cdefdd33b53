use crate::modules::family::core::invite::{FamilyInvite, InviteStatus};
use crate::modules::sync::core::draft::{
    DraftForm, ValidationErrors, optional_text, valid_email,
};
use crate::shared::core::row::{Row, into_row};
use chrono::{Duration, Utc};
use serde::Deserialize;
use serde_json::json;

pub const INVITE_VALID_FOR_DAYS: i64 = 7;

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct FamilyInviteDraft {
    pub email: String,
    pub name: String,
    pub relationship: String,
    pub group_id: String,
}

impl DraftForm for FamilyInviteDraft {
    type Entity = FamilyInvite;

    fn empty() -> Self {
        Self::default()
    }

    fn from_entity(invite: &FamilyInvite) -> Self {
        Self {
            email: invite.email.clone(),
            name: invite.name.clone().unwrap_or_default(),
            relationship: invite.relationship.clone().unwrap_or_default(),
            group_id: invite.group_id.clone().unwrap_or_default(),
        }
    }

    fn to_fields(&self) -> Result<Row, ValidationErrors> {
        let mut errors = ValidationErrors::new();
        let email = errors.check(valid_email("email", &self.email));
        errors.into_result()?;

        Ok(into_row(json!({
            "email": email,
            "name": optional_text(&self.name),
            "relationship": optional_text(&self.relationship),
            "group_id": optional_text(&self.group_id),
        })))
    }
}

impl FamilyInviteDraft {
    /// Fields for a brand new invite: pending, expiring after the validity window.
    pub fn to_new_invite(&self) -> Result<Row, ValidationErrors> {
        let mut fields = self.to_fields()?;
        fields.insert("status".into(), json!(InviteStatus::Pending));
        fields.insert(
            "expires_at".into(),
            json!((Utc::now() + Duration::days(INVITE_VALID_FOR_DAYS)).to_rfc3339()),
        );
        Ok(fields)
    }
}
