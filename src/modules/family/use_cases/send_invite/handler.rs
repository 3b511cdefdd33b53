// Creating a family invite is two independent remote steps: insert the invite row,
// then ask the backend to email it. A failed email leaves the row in place and is
// reported as a partial failure.

use crate::modules::family::core::draft::FamilyInviteDraft;
use crate::modules::family::core::invite::FamilyInvite;
use crate::modules::procedures::core::reports::SEND_FAMILY_INVITE;
use crate::modules::sync::core::mutation::MutationRequest;
use crate::modules::sync::use_cases::edit_draft::handler::FormError;
use crate::modules::sync::use_cases::mutate_entity::handler::{
    MutationCoordinator, MutationError,
};
use crate::shared::core::row::RecordId;
use serde_json::json;

pub async fn send_invite(
    coordinator: &MutationCoordinator<FamilyInvite>,
    draft: &FamilyInviteDraft,
    client_id: RecordId,
) -> Result<FamilyInvite, FormError> {
    let fields = draft.to_new_invite()?;
    let request = MutationRequest::Create { fields, client_id };
    let (outcome, _) = coordinator
        .submit_then_invoke(request, SEND_FAMILY_INVITE, |outcome| {
            let invite = outcome.entity();
            json!({
                "invite_id": outcome.id(),
                "email": invite.map(|invite| &invite.email),
                "name": invite.and_then(|invite| invite.name.as_ref()),
                "relationship": invite.and_then(|invite| invite.relationship.as_ref()),
            })
        })
        .await?;
    outcome.entity().cloned().ok_or_else(|| {
        FormError::Mutation(MutationError::Decode("create returned no invite".into()))
    })
}
