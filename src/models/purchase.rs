// src/models/purchase.rs

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::common::{
    money,
    validation::{validate_not_negative, validate_positive},
};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Attachment {
    #[schema(example = "nf-1234.pdf")]
    pub name: String,
    #[schema(example = "application/pdf")]
    pub mime: String,
    pub data_url: String,
}

// --- Item de compra externa ---
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PurchaseItem {
    pub id: Uuid,
    pub product_id: Option<Uuid>,
    #[schema(example = "Vergalhão CA-50 10mm")]
    pub description: String,
    #[schema(example = "50")]
    pub quantity: Decimal,
    #[schema(example = "KG")]
    pub unit: String,
    #[schema(example = "35.00")]
    pub unit_cost: Decimal,
    // Fração efetivamente aplicada (0.20 = 20%)
    #[schema(example = "0.20")]
    pub applied_markup: Decimal,
    // Preço repassado à obra = custo x (1 + markup)
    #[schema(example = "42.00")]
    pub project_unit_price: Decimal,
}

impl PurchaseItem {
    pub fn total_cost(&self) -> Decimal {
        self.quantity.saturating_mul(self.unit_cost)
    }

    pub fn total_billed(&self) -> Decimal {
        self.quantity.saturating_mul(self.project_unit_price)
    }
}

// --- Compra externa ---
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ExternalPurchase {
    pub id: Uuid,
    pub supplier_id: Uuid,
    // Obra de destino (opcional). Quando presente, regras de markup da obra se aplicam.
    pub project_id: Option<Uuid>,
    #[schema(example = "NF 001234")]
    pub invoice_number: Option<String>,
    #[schema(value_type = String, format = Date, example = "2025-03-12")]
    pub date: NaiveDate,
    #[serde(default)]
    pub attachments: Vec<Attachment>,
    pub items: Vec<PurchaseItem>,
}

impl ExternalPurchase {
    pub fn item(&self, item_id: Uuid) -> Option<&PurchaseItem> {
        self.items.iter().find(|i| i.id == item_id)
    }

    pub fn total_cost(&self) -> Decimal {
        money::sum(self.items.iter().map(PurchaseItem::total_cost))
    }

    pub fn total_billed(&self) -> Decimal {
        money::sum(self.items.iter().map(PurchaseItem::total_billed))
    }
}

// ---
// Payloads
// ---

#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct NewPurchaseItem {
    pub product_id: Option<Uuid>,
    #[validate(length(min = 1, message = "A descrição é obrigatória."))]
    pub description: String,
    #[validate(custom(function = "validate_positive"))]
    pub quantity: Decimal,
    #[validate(length(min = 1, message = "A unidade é obrigatória."))]
    pub unit: String,
    #[validate(custom(function = "validate_not_negative"))]
    pub unit_cost: Decimal,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreatePurchasePayload {
    pub supplier_id: Uuid,
    pub project_id: Option<Uuid>,
    pub invoice_number: Option<String>,
    #[schema(value_type = String, format = Date, example = "2025-03-12")]
    pub date: NaiveDate,
    #[serde(default)]
    pub attachments: Vec<Attachment>,
    #[validate(length(min = 1, message = "A compra precisa de pelo menos um item."), nested)]
    pub items: Vec<NewPurchaseItem>,
}

// Enviar `items` reprecifica todos os itens com as regras atuais.
#[derive(Debug, Default, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdatePurchasePayload {
    pub supplier_id: Option<Uuid>,
    // Ausente = mantém; `null` = desvincula da obra.
    #[serde(default, deserialize_with = "present_or_null")]
    #[schema(value_type = Option<Uuid>, nullable)]
    pub project_id: Option<Option<Uuid>>,
    pub invoice_number: Option<String>,
    #[schema(value_type = Option<String>, format = Date)]
    pub date: Option<NaiveDate>,
    pub attachments: Option<Vec<Attachment>>,
    #[validate(length(min = 1, message = "A compra precisa de pelo menos um item."), nested)]
    pub items: Option<Vec<NewPurchaseItem>>,
}

// Distingue campo ausente (None) de `null` explícito (Some(None)).
fn present_or_null<'de, D, T>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn update_project_id_tells_missing_from_null() {
        let missing: UpdatePurchasePayload = serde_json::from_str("{}").unwrap();
        assert_eq!(missing.project_id, None);

        let cleared: UpdatePurchasePayload = serde_json::from_str(r#"{"projectId": null}"#).unwrap();
        assert_eq!(cleared.project_id, Some(None));

        let id = Uuid::new_v4();
        let set: UpdatePurchasePayload =
            serde_json::from_str(&format!(r#"{{"projectId": "{id}"}}"#)).unwrap();
        assert_eq!(set.project_id, Some(Some(id)));
    }
}
