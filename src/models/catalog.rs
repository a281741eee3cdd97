// src/models/catalog.rs

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::common::validation::validate_not_negative;
use crate::models::project::default_true;

// --- Tipo de produto ---
// Produtos de produção própria ("interno") nunca recebem markup.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub enum ProductKind {
    #[default]
    Resale,
    Internal,
}

// --- Produto (catálogo + saldo de estoque) ---
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    pub id: Uuid,
    #[schema(example = "Cimento CP II-E-32")]
    pub name: String,
    #[schema(example = "Materiais Básicos")]
    pub category: Option<String>,
    #[schema(example = "SC")]
    pub unit: String,
    #[schema(example = "CIM001")]
    pub sku: Option<String>,
    #[schema(example = "25.50")]
    pub price: Option<Decimal>,
    #[serde(default)]
    #[schema(example = "100")]
    pub stock: Decimal,
    pub active: bool,
    #[serde(default)]
    pub kind: ProductKind,
}

impl Product {
    pub fn is_internal(&self) -> bool {
        self.kind == ProductKind::Internal
    }
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateProductPayload {
    #[validate(length(min = 1, message = "O nome é obrigatório."))]
    pub name: String,
    pub category: Option<String>,
    #[validate(length(min = 1, message = "A unidade é obrigatória."))]
    pub unit: String,
    pub sku: Option<String>,
    #[validate(custom(function = "validate_not_negative"))]
    pub price: Option<Decimal>,
    // Estoque inicial. Pode ser zero.
    #[serde(default)]
    #[validate(custom(function = "validate_not_negative"))]
    pub stock: Decimal,
    #[serde(default = "default_true")]
    pub active: bool,
    #[serde(default)]
    pub kind: ProductKind,
}

// O saldo não é editável por patch: use o ajuste de estoque, que deixa trilha de auditoria.
#[derive(Debug, Default, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateProductPayload {
    #[validate(length(min = 1, message = "O nome não pode ficar vazio."))]
    pub name: Option<String>,
    pub category: Option<String>,
    #[validate(length(min = 1, message = "A unidade não pode ficar vazia."))]
    pub unit: Option<String>,
    pub sku: Option<String>,
    #[validate(custom(function = "validate_not_negative"))]
    pub price: Option<Decimal>,
    pub active: Option<bool>,
    pub kind: Option<ProductKind>,
}

impl UpdateProductPayload {
    pub fn apply_to(self, product: &mut Product) {
        if let Some(name) = self.name {
            product.name = name;
        }
        if let Some(category) = self.category {
            product.category = Some(category);
        }
        if let Some(unit) = self.unit {
            product.unit = unit;
        }
        if let Some(sku) = self.sku {
            product.sku = Some(sku);
        }
        if let Some(price) = self.price {
            product.price = Some(price);
        }
        if let Some(active) = self.active {
            product.active = active;
        }
        if let Some(kind) = self.kind {
            product.kind = kind;
        }
    }
}

// --- Fornecedor ---
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Supplier {
    pub id: Uuid,
    #[schema(example = "Materiais XYZ")]
    pub name: String,
    #[schema(example = "98.765.432/0001-10")]
    pub tax_id: Option<String>,
    #[schema(example = "(21) 91234-5678")]
    pub contact: Option<String>,
    pub active: bool,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateSupplierPayload {
    #[validate(length(min = 1, message = "O nome é obrigatório."))]
    pub name: String,
    pub tax_id: Option<String>,
    pub contact: Option<String>,
    #[serde(default = "default_true")]
    pub active: bool,
}

#[derive(Debug, Default, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateSupplierPayload {
    #[validate(length(min = 1, message = "O nome não pode ficar vazio."))]
    pub name: Option<String>,
    pub tax_id: Option<String>,
    pub contact: Option<String>,
    pub active: Option<bool>,
}

impl UpdateSupplierPayload {
    pub fn apply_to(self, supplier: &mut Supplier) {
        if let Some(name) = self.name {
            supplier.name = name;
        }
        if let Some(tax_id) = self.tax_id {
            supplier.tax_id = Some(tax_id);
        }
        if let Some(contact) = self.contact {
            supplier.contact = Some(contact);
        }
        if let Some(active) = self.active {
            supplier.active = active;
        }
    }
}
