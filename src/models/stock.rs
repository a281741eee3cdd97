// src/models/stock.rs

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::{Validate, ValidationError};

use crate::common::validation::validate_max_amount;

// --- Ajuste de Estoque (livro-razão, nunca alterado) ---
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct StockAdjustment {
    pub id: Uuid,
    pub product_id: Uuid,
    // Positivo = entrada, negativo = saída
    #[schema(example = "-5")]
    pub delta: Decimal,
    #[schema(example = "Devolução do talão TAL-482913")]
    pub reason: String,
    pub created_at: DateTime<Utc>,
}

// --- Devolução (auditoria) ---
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ReturnRecord {
    pub id: Uuid,
    pub voucher_id: Uuid,
    pub voucher_item_id: Uuid,
    #[schema(example = "3")]
    pub quantity: Decimal,
    #[schema(example = "Sobra de material")]
    pub reason: Option<String>,
    pub created_at: DateTime<Utc>,
}

fn validate_non_zero(val: &Decimal) -> Result<(), ValidationError> {
    validate_max_amount(val)?;
    if val.is_zero() {
        let mut err = ValidationError::new("nonZero");
        err.message = Some("O ajuste não pode ser zero.".into());
        return Err(err);
    }
    Ok(())
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct StockAdjustmentPayload {
    #[validate(custom(function = "validate_non_zero"))]
    pub delta: Decimal,
    #[validate(length(min = 1, message = "O motivo é obrigatório."))]
    pub reason: String,
}
