// src/models/markup.rs

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::{Validate, ValidationError};

use crate::common::validation::{validate_not_negative, validate_percentage};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub enum MarkupTarget {
    Global,
    Category,
    Project,
}

// --- Regra de Markup ---
// `reference` é o nome da categoria ou o id da obra (em texto), conforme o alvo.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct MarkupRule {
    pub id: Uuid,
    pub target: MarkupTarget,
    #[schema(example = "Materiais Básicos")]
    pub reference: Option<String>,
    #[schema(example = "0.15")]
    pub percentage: Decimal,
}

/// Contexto usado na resolução do markup.
#[derive(Debug, Clone, Default)]
pub struct MarkupContext<'a> {
    pub project_id: Option<Uuid>,
    pub category: Option<&'a str>,
    pub internal_product: bool,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
#[validate(schema(function = "validate_rule_reference"))]
pub struct CreateMarkupRulePayload {
    pub target: MarkupTarget,
    pub reference: Option<String>,
    #[validate(custom(function = "validate_percentage"))]
    pub percentage: Decimal,
}

fn validate_rule_reference(rule: &CreateMarkupRulePayload) -> Result<(), ValidationError> {
    check_rule_reference(rule.target, rule.reference.as_deref())
}

// Regras de categoria/obra precisam de referência; a global não.
pub fn check_rule_reference(
    target: MarkupTarget,
    reference: Option<&str>,
) -> Result<(), ValidationError> {
    let has_reference = reference.is_some_and(|r| !r.trim().is_empty());
    if target != MarkupTarget::Global && !has_reference {
        let mut err = ValidationError::new("ReferenceRequired");
        err.message = Some("Regras por categoria ou obra precisam de referência.".into());
        return Err(err);
    }
    Ok(())
}

#[derive(Debug, Default, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateMarkupRulePayload {
    pub target: Option<MarkupTarget>,
    pub reference: Option<String>,
    #[validate(custom(function = "validate_percentage"))]
    pub percentage: Option<Decimal>,
}

impl UpdateMarkupRulePayload {
    pub fn apply_to(self, rule: &mut MarkupRule) {
        if let Some(target) = self.target {
            rule.target = target;
        }
        if let Some(reference) = self.reference {
            rule.reference = Some(reference.trim().to_string());
        }
        if let Some(percentage) = self.percentage {
            rule.percentage = percentage;
        }
        if rule.target == MarkupTarget::Global {
            rule.reference = None;
        }
    }
}

// Simulação de preço para a obra (sem gravar nada)
#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct MarkupQuotePayload {
    #[validate(custom(function = "validate_not_negative"))]
    pub unit_cost: Decimal,
    pub project_id: Option<Uuid>,
    pub product_id: Option<Uuid>,
    // Usada quando não há produto do catálogo
    pub category: Option<String>,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct MarkupQuote {
    pub unit_cost: Decimal,
    pub percentage: Decimal,
    pub project_unit_price: Decimal,
}
