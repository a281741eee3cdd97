// src/models/voucher.rs

use std::fmt;

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;
use validator::{Validate, ValidationError};

use crate::common::{
    money,
    validation::{validate_not_negative, validate_positive},
};

// --- Status do Talão ---
//
//   pendingPick ──> inDelivery ──> completed
//        │              │              │
//        └──────────────┴──> partiallyReturned / fullyReturned (após alguma entrega)
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub enum VoucherStatus {
    #[default]
    PendingPick,
    InDelivery,
    Completed,
    PartiallyReturned,
    FullyReturned,
}

impl VoucherStatus {
    pub fn label(&self) -> &'static str {
        match self {
            VoucherStatus::PendingPick => "A separar",
            VoucherStatus::InDelivery => "Em entrega",
            VoucherStatus::Completed => "Concluído",
            VoucherStatus::PartiallyReturned => "Devolvido Parcial",
            VoucherStatus::FullyReturned => "Devolvido Total",
        }
    }

    /// Talão ainda aceita registro de entrega.
    pub fn accepts_delivery(&self) -> bool {
        matches!(self, VoucherStatus::PendingPick | VoucherStatus::InDelivery)
    }

    /// Conta como "aberto" no dashboard.
    pub fn is_open(&self) -> bool {
        !matches!(self, VoucherStatus::Completed | VoucherStatus::FullyReturned)
    }
}

impl fmt::Display for VoucherStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

// --- Origem do item ---
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub enum ItemSource {
    #[default]
    Stock,
    ExternalPurchase,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PurchaseLink {
    pub purchase_item_id: Uuid,
    pub quantity: Decimal,
}

// --- Item do Talão ---
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct VoucherItem {
    pub id: Uuid,
    pub product_id: Option<Uuid>,
    #[schema(example = "Areia lavada (avulso)")]
    pub description: Option<String>,
    #[schema(example = "10")]
    pub quantity: Decimal,
    #[schema(example = "SC")]
    pub unit: String,
    pub source: ItemSource,
    #[schema(example = "25.50")]
    pub unit_price: Option<Decimal>,
    #[serde(default)]
    pub delivered_quantity: Decimal,
    #[serde(default)]
    pub returned_quantity: Decimal,
    #[serde(default)]
    pub purchase_links: Vec<PurchaseLink>,
}

impl VoucherItem {
    /// Quantidade líquida consumida pela obra (entregue - devolvida).
    /// É também o máximo que ainda pode ser devolvido.
    pub fn net_quantity(&self) -> Decimal {
        self.delivered_quantity - self.returned_quantity
    }

    pub fn is_fully_delivered(&self) -> bool {
        self.delivered_quantity >= self.quantity
    }

    pub fn net_value(&self) -> Decimal {
        self.net_quantity()
            .saturating_mul(self.unit_price.unwrap_or(Decimal::ZERO))
    }

    pub fn returned_value(&self) -> Decimal {
        self.returned_quantity
            .saturating_mul(self.unit_price.unwrap_or(Decimal::ZERO))
    }
}

// --- Assinatura do recebedor ---
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Signature {
    #[schema(example = "João da Silva")]
    pub receiver_name: String,
    #[schema(example = "123.456.789-00")]
    pub tax_id: Option<String>,
    pub signed_at: DateTime<Utc>,
    pub image_data_url: Option<String>,
}

// --- Talão ---
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Voucher {
    pub id: Uuid,
    #[schema(example = "TAL-482913")]
    pub number: String,
    pub project_id: Uuid,
    #[schema(example = "Mestre de obras Carlos")]
    pub requester: String,
    pub status: VoucherStatus,
    pub items: Vec<VoucherItem>,
    pub signature: Option<Signature>,
    #[schema(value_type = String, format = Date, example = "2025-03-10")]
    pub created_at: NaiveDate,
}

impl Voucher {
    pub fn item(&self, item_id: Uuid) -> Option<&VoucherItem> {
        self.items.iter().find(|i| i.id == item_id)
    }

    pub fn item_mut(&mut self, item_id: Uuid) -> Option<&mut VoucherItem> {
        self.items.iter_mut().find(|i| i.id == item_id)
    }

    pub fn total_delivered(&self) -> Decimal {
        money::sum(self.items.iter().map(|i| i.delivered_quantity))
    }

    pub fn total_returned(&self) -> Decimal {
        money::sum(self.items.iter().map(|i| i.returned_quantity))
    }

    pub fn all_delivered(&self) -> bool {
        !self.items.is_empty() && self.items.iter().all(VoucherItem::is_fully_delivered)
    }

    /// Valor do talão: soma de (qtd líquida x preço unitário).
    pub fn total_value(&self) -> Decimal {
        money::sum(self.items.iter().map(VoucherItem::net_value))
    }

    /// Status após uma devolução, a partir dos totais agregados.
    pub fn status_after_return(&self) -> VoucherStatus {
        let delivered = self.total_delivered();
        let returned = self.total_returned();

        if returned > Decimal::ZERO && returned == delivered {
            VoucherStatus::FullyReturned
        } else if returned > Decimal::ZERO {
            VoucherStatus::PartiallyReturned
        } else {
            self.status
        }
    }
}

// ---
// Payloads
// ---

#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
#[validate(schema(function = "validate_item_reference"))]
pub struct NewVoucherItem {
    pub product_id: Option<Uuid>,
    pub description: Option<String>,
    #[validate(custom(function = "validate_positive"))]
    pub quantity: Decimal,
    #[validate(length(min = 1, message = "A unidade é obrigatória."))]
    pub unit: String,
    #[serde(default)]
    pub source: ItemSource,
    #[validate(custom(function = "validate_not_negative"))]
    pub unit_price: Option<Decimal>,
}

// Todo item precisa de um produto do catálogo ou de uma descrição livre.
fn validate_item_reference(item: &NewVoucherItem) -> Result<(), ValidationError> {
    let has_description = item
        .description
        .as_deref()
        .is_some_and(|d| !d.trim().is_empty());
    if item.product_id.is_none() && !has_description {
        let mut err = ValidationError::new("ProductOrDescriptionRequired");
        err.message = Some("Informe um produto ou uma descrição livre.".into());
        return Err(err);
    }
    Ok(())
}

impl NewVoucherItem {
    pub fn into_item(self) -> VoucherItem {
        VoucherItem {
            id: Uuid::new_v4(),
            product_id: self.product_id,
            description: self.description,
            quantity: self.quantity,
            unit: self.unit,
            source: self.source,
            unit_price: self.unit_price,
            delivered_quantity: Decimal::ZERO,
            returned_quantity: Decimal::ZERO,
            purchase_links: Vec::new(),
        }
    }
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateVoucherPayload {
    pub project_id: Uuid,
    #[validate(length(min = 1, message = "O solicitante é obrigatório."))]
    pub requester: String,
    #[validate(length(min = 1, message = "O talão precisa de pelo menos um item."), nested)]
    pub items: Vec<NewVoucherItem>,
}

// Substituir `items` gera novos ids e zera entregas; só é aceito antes da separação.
#[derive(Debug, Default, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateVoucherPayload {
    pub project_id: Option<Uuid>,
    #[validate(length(min = 1, message = "O solicitante não pode ficar vazio."))]
    pub requester: Option<String>,
    #[validate(length(min = 1, message = "O talão precisa de pelo menos um item."), nested)]
    pub items: Option<Vec<NewVoucherItem>>,
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ItemDelivery {
    pub item_id: Uuid,
    // Valor absoluto entregue até agora (não é incremento).
    #[validate(custom(function = "validate_not_negative"))]
    pub delivered_quantity: Decimal,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RecordDeliveryPayload {
    #[validate(nested)]
    pub items: Vec<ItemDelivery>,
    #[validate(nested)]
    pub signature: Option<SignaturePayload>,
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SignaturePayload {
    #[validate(length(min = 1, message = "O nome do recebedor é obrigatório."))]
    pub receiver_name: String,
    pub tax_id: Option<String>,
    pub image_data_url: Option<String>,
}

impl SignaturePayload {
    pub fn sign(self, signed_at: DateTime<Utc>) -> Signature {
        Signature {
            receiver_name: self.receiver_name,
            tax_id: self.tax_id,
            signed_at,
            image_data_url: self.image_data_url,
        }
    }
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RegisterReturnPayload {
    pub item_id: Uuid,
    #[validate(custom(function = "validate_positive"))]
    pub quantity: Decimal,
    pub reason: Option<String>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct LinkPurchasePayload {
    pub purchase_item_id: Uuid,
    pub voucher_item_id: Uuid,
    #[validate(custom(function = "validate_positive"))]
    pub quantity: Decimal,
}

#[derive(Debug, Default, Deserialize, IntoParams, ToSchema)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct VoucherListQuery {
    pub project_id: Option<Uuid>,
    pub status: Option<VoucherStatus>,
    // Busca por número ou solicitante
    pub search: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(s: &str) -> Decimal {
        s.parse().unwrap()
    }

    fn item(qty: &str, delivered: &str, returned: &str) -> VoucherItem {
        VoucherItem {
            id: Uuid::new_v4(),
            product_id: None,
            description: Some("Areia".into()),
            quantity: d(qty),
            unit: "M3".into(),
            source: ItemSource::Stock,
            unit_price: Some(d("45")),
            delivered_quantity: d(delivered),
            returned_quantity: d(returned),
            purchase_links: vec![],
        }
    }

    fn voucher(items: Vec<VoucherItem>, status: VoucherStatus) -> Voucher {
        Voucher {
            id: Uuid::new_v4(),
            number: "TAL-000001".into(),
            project_id: Uuid::new_v4(),
            requester: "Carlos".into(),
            status,
            items,
            signature: None,
            created_at: NaiveDate::from_ymd_opt(2025, 3, 10).unwrap(),
        }
    }

    #[test]
    fn status_after_return_is_derived_from_totals() {
        let v = voucher(vec![item("10", "10", "3")], VoucherStatus::Completed);
        assert_eq!(v.status_after_return(), VoucherStatus::PartiallyReturned);

        let v = voucher(
            vec![item("10", "10", "10"), item("5", "5", "5")],
            VoucherStatus::Completed,
        );
        assert_eq!(v.status_after_return(), VoucherStatus::FullyReturned);

        let v = voucher(vec![item("10", "10", "0")], VoucherStatus::Completed);
        assert_eq!(v.status_after_return(), VoucherStatus::Completed);
    }

    #[test]
    fn nothing_delivered_never_counts_as_fully_returned() {
        let v = voucher(vec![item("10", "0", "0")], VoucherStatus::InDelivery);
        assert_eq!(v.status_after_return(), VoucherStatus::InDelivery);
    }

    #[test]
    fn total_value_uses_net_quantity() {
        let v = voucher(vec![item("10", "10", "3")], VoucherStatus::PartiallyReturned);
        assert_eq!(v.total_value(), d("315"));
    }

    #[test]
    fn new_item_requires_product_or_description() {
        let payload = NewVoucherItem {
            product_id: None,
            description: Some("   ".into()),
            quantity: d("1"),
            unit: "UN".into(),
            source: ItemSource::ExternalPurchase,
            unit_price: None,
        };
        assert!(payload.validate().is_err());
    }
}
