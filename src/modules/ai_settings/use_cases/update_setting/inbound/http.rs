use axum::{
    Json,
    extract::{Path, State, rejection::JsonRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::modules::ai_settings::core::setting::{AiModelConfig, AiSetting};
use crate::modules::ai_settings::use_cases::update_setting::handler::{
    parse_input, update_setting,
};
use crate::shared::core::row::RecordId;
use crate::shell::http::{error_response, form_error_response};
use crate::shell::state::AppState;

#[derive(Serialize)]
pub struct ListSettingsResponse {
    pub items: Vec<AiSetting>,
    pub effective: AiModelConfig,
}

/// `value` is what the operator typed; JSON scalars are accepted as their text.
#[derive(Deserialize)]
pub struct UpdateSettingBody {
    pub value: Value,
}

pub async fn list(State(state): State<AppState>) -> impl IntoResponse {
    let items = state.ai_settings.loader().snapshot().await;
    Json(ListSettingsResponse {
        effective: AiModelConfig::from_settings(&items),
        items,
    })
}

pub async fn update(
    State(state): State<AppState>,
    Path(id): Path<String>,
    body: Result<Json<UpdateSettingBody>, JsonRejection>,
) -> Response {
    let Json(body) = match body {
        Ok(b) => b,
        Err(rejection) => {
            return error_response(StatusCode::UNPROCESSABLE_ENTITY, rejection.body_text());
        }
    };

    let id = RecordId::new(id);
    let Some(setting) = state.ai_settings.loader().get(&id).await else {
        return error_response(StatusCode::NOT_FOUND, format!("setting {id} not found"));
    };
    let raw = match body.value {
        Value::String(text) => text,
        other => other.to_string(),
    };
    let value = match parse_input(setting.value.key(), &raw) {
        Ok(value) => value,
        Err(error) => return form_error_response(&error),
    };
    match update_setting(state.ai_settings.coordinator(), &setting, value).await {
        Ok(outcome) => Json(outcome.entity().cloned()).into_response(),
        Err(error) => form_error_response(&error),
    }
}
