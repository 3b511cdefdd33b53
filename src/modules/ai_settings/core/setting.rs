// AI model settings, stored as key/value rows and handled here as a closed set of
// typed settings.
//
// Keys the dashboard does not know are kept as `Unknown` so a new server-side key never
// breaks the settings view.

use crate::modules::sync::core::draft::FieldError;
use crate::shared::core::entity::Entity;
use crate::shared::core::row::RecordId;
use crate::shared::core::table::Table;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::ops::RangeInclusive;

pub const TEMPERATURE_RANGE: RangeInclusive<f64> = 0.0..=2.0;
pub const MAX_TOKENS_RANGE: RangeInclusive<u32> = 1..=32_000;

#[derive(Debug, Clone, PartialEq)]
pub enum AiSettingValue {
    Model(String),
    Temperature(f64),
    MaxTokens(u32),
    SystemPrompt(String),
    Enabled(bool),
    Unknown { key: String, value: Value },
}

impl AiSettingValue {
    pub fn key(&self) -> &str {
        match self {
            AiSettingValue::Model(_) => "model",
            AiSettingValue::Temperature(_) => "temperature",
            AiSettingValue::MaxTokens(_) => "max_tokens",
            AiSettingValue::SystemPrompt(_) => "system_prompt",
            AiSettingValue::Enabled(_) => "enabled",
            AiSettingValue::Unknown { key, .. } => key,
        }
    }

    pub fn to_json(&self) -> Value {
        match self {
            AiSettingValue::Model(model) => Value::from(model.as_str()),
            AiSettingValue::Temperature(temperature) => Value::from(*temperature),
            AiSettingValue::MaxTokens(max_tokens) => Value::from(*max_tokens),
            AiSettingValue::SystemPrompt(prompt) => Value::from(prompt.as_str()),
            AiSettingValue::Enabled(enabled) => Value::from(*enabled),
            AiSettingValue::Unknown { value, .. } => value.clone(),
        }
    }

    pub fn parse(key: &str, value: Value) -> Result<Self, String> {
        let wrong_type =
            |expected: &str, value: &Value| format!("setting {key} must be {expected}, got {value}");
        Ok(match key {
            "model" => AiSettingValue::Model(
                value.as_str().ok_or_else(|| wrong_type("text", &value))?.to_string(),
            ),
            "temperature" => AiSettingValue::Temperature(
                value
                    .as_f64()
                    .ok_or_else(|| wrong_type("a number", &value))?,
            ),
            "max_tokens" => AiSettingValue::MaxTokens(
                value
                    .as_u64()
                    .and_then(|tokens| u32::try_from(tokens).ok())
                    .ok_or_else(|| wrong_type("a whole number", &value))?,
            ),
            "system_prompt" => AiSettingValue::SystemPrompt(
                value.as_str().ok_or_else(|| wrong_type("text", &value))?.to_string(),
            ),
            "enabled" => AiSettingValue::Enabled(
                value
                    .as_bool()
                    .ok_or_else(|| wrong_type("true or false", &value))?,
            ),
            other => AiSettingValue::Unknown {
                key: other.to_string(),
                value,
            },
        })
    }

    pub fn validate(&self) -> Result<(), FieldError> {
        match self {
            AiSettingValue::Model(model) if model.trim().is_empty() => {
                Err(FieldError::new("model", "is required"))
            }
            AiSettingValue::Temperature(temperature) if !TEMPERATURE_RANGE.contains(temperature) => {
                Err(FieldError::new("temperature", "must be between 0 and 2"))
            }
            AiSettingValue::MaxTokens(max_tokens) if !MAX_TOKENS_RANGE.contains(max_tokens) => Err(
                FieldError::new("max_tokens", "must be between 1 and 32000"),
            ),
            AiSettingValue::Model(_)
            | AiSettingValue::Temperature(_)
            | AiSettingValue::MaxTokens(_)
            | AiSettingValue::SystemPrompt(_)
            | AiSettingValue::Enabled(_)
            | AiSettingValue::Unknown { .. } => Ok(()),
        }
    }
}

/// Wire shape of an `ai_model_settings` row.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AiModelSettingRow {
    id: RecordId,
    setting_key: String,
    #[serde(default)]
    setting_value: Value,
    #[serde(default)]
    description: Option<String>,
    #[serde(default)]
    updated_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "AiModelSettingRow", into = "AiModelSettingRow")]
pub struct AiSetting {
    pub id: RecordId,
    pub value: AiSettingValue,
    pub description: Option<String>,
    pub updated_at: Option<DateTime<Utc>>,
}

impl TryFrom<AiModelSettingRow> for AiSetting {
    type Error = String;

    fn try_from(row: AiModelSettingRow) -> Result<Self, Self::Error> {
        Ok(Self {
            value: AiSettingValue::parse(&row.setting_key, row.setting_value)?,
            id: row.id,
            description: row.description,
            updated_at: row.updated_at,
        })
    }
}

impl From<AiSetting> for AiModelSettingRow {
    fn from(setting: AiSetting) -> Self {
        Self {
            setting_key: setting.value.key().to_string(),
            setting_value: setting.value.to_json(),
            id: setting.id,
            description: setting.description,
            updated_at: setting.updated_at,
        }
    }
}

impl Entity for AiSetting {
    const TABLE: Table = Table::AiModelSettings;

    fn id(&self) -> &RecordId {
        &self.id
    }

    fn search_text(&self) -> Vec<&str> {
        let mut text = vec![self.value.key()];
        text.extend(self.description.as_deref());
        text
    }
}

/// The effective model configuration after applying every known setting.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AiModelConfig {
    pub model: String,
    pub temperature: f64,
    pub max_tokens: u32,
    pub system_prompt: Option<String>,
    pub enabled: bool,
}

impl Default for AiModelConfig {
    fn default() -> Self {
        Self {
            model: "gpt-4o-mini".into(),
            temperature: 0.7,
            max_tokens: 1_000,
            system_prompt: None,
            enabled: true,
        }
    }
}

impl AiModelConfig {
    pub fn from_settings(settings: &[AiSetting]) -> Self {
        settings
            .iter()
            .fold(Self::default(), |mut config, setting| {
                match &setting.value {
                    AiSettingValue::Model(model) => config.model = model.clone(),
                    AiSettingValue::Temperature(temperature) => config.temperature = *temperature,
                    AiSettingValue::MaxTokens(max_tokens) => config.max_tokens = *max_tokens,
                    AiSettingValue::SystemPrompt(prompt) => {
                        config.system_prompt = Some(prompt.clone())
                    }
                    AiSettingValue::Enabled(enabled) => config.enabled = *enabled,
                    AiSettingValue::Unknown { .. } => {}
                }
                config
            })
    }
}

#[cfg(test)]
mod ai_setting_tests {
    use super::*;
    use rstest::rstest;
    use serde_json::json;

    fn setting(key: &str, value: Value) -> Result<AiSetting, serde_json::Error> {
        AiSetting::from_row(
            json!({ "id": key, "setting_key": key, "setting_value": value })
                .as_object()
                .unwrap()
                .clone(),
        )
    }

    #[rstest]
    fn it_should_decode_known_keys_into_typed_values() {
        assert_eq!(setting("temperature", json!(0.2)).unwrap().value, AiSettingValue::Temperature(0.2));
        assert_eq!(setting("max_tokens", json!(512)).unwrap().value, AiSettingValue::MaxTokens(512));
        assert_eq!(setting("enabled", json!(false)).unwrap().value, AiSettingValue::Enabled(false));
    }

    #[rstest]
    fn it_should_reject_a_known_key_with_the_wrong_type() {
        assert!(setting("temperature", json!("hot")).is_err());
    }

    #[rstest]
    fn it_should_keep_unknown_keys() {
        let unknown = setting("voice", json!("calm")).unwrap();
        assert_eq!(unknown.value.key(), "voice");
        let row = unknown.to_row().unwrap();
        assert_eq!(row.get("setting_key"), Some(&json!("voice")));
        assert_eq!(row.get("setting_value"), Some(&json!("calm")));
    }

    #[rstest]
    fn it_should_fold_settings_into_a_config() {
        let settings = vec![
            setting("model", json!("claude")).unwrap(),
            setting("temperature", json!(1.5)).unwrap(),
            setting("voice", json!("calm")).unwrap(),
        ];
        let config = AiModelConfig::from_settings(&settings);
        assert_eq!(config.model, "claude");
        assert_eq!(config.temperature, 1.5);
        assert_eq!(config.max_tokens, AiModelConfig::default().max_tokens);
    }

    #[rstest]
    #[case(AiSettingValue::Temperature(2.5), false)]
    #[case(AiSettingValue::Temperature(0.0), true)]
    #[case(AiSettingValue::MaxTokens(0), false)]
    #[case(AiSettingValue::Model(" ".into()), false)]
    #[case(AiSettingValue::Enabled(true), true)]
    fn it_should_validate_ranges(#[case] value: AiSettingValue, #[case] valid: bool) {
        assert_eq!(value.validate().is_ok(), valid);
    }
}
