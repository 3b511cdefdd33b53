use axum::{
    Json,
    extract::{State, rejection::JsonRejection},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
};
use chrono::Utc;
use serde::Serialize;

use crate::modules::family::core::draft::FamilyInviteDraft;
use crate::modules::family::core::invite::{FamilyInvite, InviteStatus};
use crate::modules::family::use_cases::send_invite::handler::send_invite;
use crate::shared::core::row::RecordId;
use crate::shell::http::{error_response, form_error_response, idempotency_key};
use crate::shell::state::AppState;

#[derive(Serialize)]
pub struct InviteView {
    #[serde(flatten)]
    pub invite: FamilyInvite,
    pub effective_status: InviteStatus,
}

pub async fn list(State(state): State<AppState>) -> impl IntoResponse {
    let now = Utc::now();
    let invites: Vec<InviteView> = state
        .family_invites
        .loader()
        .snapshot()
        .await
        .into_iter()
        .map(|invite| InviteView {
            effective_status: invite.effective_status(now),
            invite,
        })
        .collect();
    Json(invites)
}

pub async fn create(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Result<Json<FamilyInviteDraft>, JsonRejection>,
) -> Response {
    let Json(draft) = match body {
        Ok(b) => b,
        Err(rejection) => {
            return error_response(StatusCode::UNPROCESSABLE_ENTITY, rejection.body_text());
        }
    };

    let client_id = idempotency_key(&headers).unwrap_or_else(RecordId::generate);
    match send_invite(state.family_invites.coordinator(), &draft, client_id).await {
        Ok(invite) => (StatusCode::CREATED, Json(invite)).into_response(),
        Err(error) => form_error_response(&error),
    }
}
