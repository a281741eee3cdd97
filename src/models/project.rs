// src/models/project.rs

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

// --- Obra ---
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Project {
    pub id: Uuid,
    #[schema(example = "Obra Residencial Centro")]
    pub name: String,
    #[schema(example = "São Paulo")]
    pub city: Option<String>,
    pub active: bool,
    #[schema(value_type = String, format = Date, example = "2025-03-10")]
    pub created_at: NaiveDate,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateProjectPayload {
    #[validate(length(min = 1, message = "O nome é obrigatório."))]
    pub name: String,
    pub city: Option<String>,
    #[serde(default = "default_true")]
    pub active: bool,
}

// Patch: apenas os campos enviados são substituídos (merge raso).
#[derive(Debug, Default, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateProjectPayload {
    #[validate(length(min = 1, message = "O nome não pode ficar vazio."))]
    pub name: Option<String>,
    pub city: Option<String>,
    pub active: Option<bool>,
}

impl UpdateProjectPayload {
    pub fn apply_to(self, project: &mut Project) {
        if let Some(name) = self.name {
            project.name = name;
        }
        if let Some(city) = self.city {
            project.city = Some(city);
        }
        if let Some(active) = self.active {
            project.active = active;
        }
    }
}

pub(crate) fn default_true() -> bool {
    true
}
