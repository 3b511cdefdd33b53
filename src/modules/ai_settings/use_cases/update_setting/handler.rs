use crate::modules::ai_settings::core::setting::{AiSetting, AiSettingValue};
use crate::modules::sync::core::draft::{FieldError, ValidationErrors};
use crate::modules::sync::core::mutation::{MutationOutcome, MutationRequest};
use crate::modules::sync::use_cases::edit_draft::handler::FormError;
use crate::modules::sync::use_cases::mutate_entity::handler::MutationCoordinator;
use crate::shared::core::row::Row;
use serde_json::Value;

/// Saves a new value for an existing setting. The key itself never changes.
pub async fn update_setting(
    coordinator: &MutationCoordinator<AiSetting>,
    setting: &AiSetting,
    value: AiSettingValue,
) -> Result<MutationOutcome<AiSetting>, FormError> {
    let mut errors = ValidationErrors::new();
    if value.key() != setting.value.key() {
        errors.push(FieldError::new(
            "setting_key",
            format!("cannot change {} into {}", setting.value.key(), value.key()),
        ));
    }
    errors.check(value.validate());
    errors.into_result()?;

    let mut patch = Row::new();
    patch.insert("setting_value".into(), value.to_json());
    let request = MutationRequest::Update {
        id: setting.id.clone(),
        patch,
    };
    Ok(coordinator.submit(request).await?)
}

/// Parses operator input for a setting key, the way the settings form submits it.
pub fn parse_input(key: &str, raw: &str) -> Result<AiSettingValue, FormError> {
    let value = serde_json::from_str::<Value>(raw.trim())
        .unwrap_or_else(|_| Value::String(raw.trim().to_string()));
    AiSettingValue::parse(key, value).map_err(|message| {
        let mut errors = ValidationErrors::new();
        errors.push(FieldError::new(key, message));
        FormError::Invalid(errors)
    })
}
