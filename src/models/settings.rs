// src/models/settings.rs

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

use crate::common::validation::validate_percentage;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub enum Theme {
    #[default]
    Light,
    Dark,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SyncSettings {
    pub enabled: bool,
    pub last_sync: Option<DateTime<Utc>>,
}

// Configurações persistidas junto com os dados (chave `config`).
// A URL do banco remoto fica no ambiente, nunca aqui.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Settings {
    #[schema(example = "0.20")]
    pub default_markup: Decimal,
    #[serde(default)]
    pub theme: Theme,
    #[serde(default)]
    pub sync: SyncSettings,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            default_markup: Decimal::new(20, 2),
            theme: Theme::default(),
            sync: SyncSettings::default(),
        }
    }
}

#[derive(Debug, Default, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateSettingsRequest {
    #[validate(custom(function = "validate_percentage"))]
    #[schema(example = "0.25")]
    pub default_markup: Option<Decimal>,
    pub theme: Option<Theme>,
    pub sync_enabled: Option<bool>,
}

impl UpdateSettingsRequest {
    pub fn apply_to(self, settings: &mut Settings) {
        if let Some(markup) = self.default_markup {
            settings.default_markup = markup;
        }
        if let Some(theme) = self.theme {
            settings.theme = theme;
        }
        if let Some(enabled) = self.sync_enabled {
            settings.sync.enabled = enabled;
        }
    }
}
