// src/models/remote.rs
//
// Linhas do espelho remoto. Os campos seguem a nomenclatura snake_case das
// colunas do Postgres; os itens de talão e de compra viram tabelas filhas
// com a chave do pai.

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::{
    catalog::{Product, ProductKind, Supplier},
    markup::{MarkupRule, MarkupTarget},
    project::Project,
    purchase::{Attachment, ExternalPurchase, PurchaseItem},
    stock::ReturnRecord,
    voucher::{ItemSource, PurchaseLink, Signature, Voucher, VoucherItem, VoucherStatus},
};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProjectRow {
    pub id: Uuid,
    pub name: String,
    pub city: Option<String>,
    pub active: bool,
    pub created_at: NaiveDate,
}

impl From<&Project> for ProjectRow {
    fn from(p: &Project) -> Self {
        Self {
            id: p.id,
            name: p.name.clone(),
            city: p.city.clone(),
            active: p.active,
            created_at: p.created_at,
        }
    }
}

impl From<ProjectRow> for Project {
    fn from(r: ProjectRow) -> Self {
        Self {
            id: r.id,
            name: r.name,
            city: r.city,
            active: r.active,
            created_at: r.created_at,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductRow {
    pub id: Uuid,
    pub name: String,
    pub category: Option<String>,
    pub unit: String,
    pub sku: Option<String>,
    pub price: Option<Decimal>,
    pub stock: Decimal,
    pub active: bool,
    pub kind: ProductKind,
}

impl From<&Product> for ProductRow {
    fn from(p: &Product) -> Self {
        Self {
            id: p.id,
            name: p.name.clone(),
            category: p.category.clone(),
            unit: p.unit.clone(),
            sku: p.sku.clone(),
            price: p.price,
            stock: p.stock,
            active: p.active,
            kind: p.kind,
        }
    }
}

impl From<ProductRow> for Product {
    fn from(r: ProductRow) -> Self {
        Self {
            id: r.id,
            name: r.name,
            category: r.category,
            unit: r.unit,
            sku: r.sku,
            price: r.price,
            stock: r.stock,
            active: r.active,
            kind: r.kind,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SupplierRow {
    pub id: Uuid,
    pub name: String,
    pub tax_id: Option<String>,
    pub contact: Option<String>,
    pub active: bool,
}

impl From<&Supplier> for SupplierRow {
    fn from(s: &Supplier) -> Self {
        Self {
            id: s.id,
            name: s.name.clone(),
            tax_id: s.tax_id.clone(),
            contact: s.contact.clone(),
            active: s.active,
        }
    }
}

impl From<SupplierRow> for Supplier {
    fn from(r: SupplierRow) -> Self {
        Self {
            id: r.id,
            name: r.name,
            tax_id: r.tax_id,
            contact: r.contact,
            active: r.active,
        }
    }
}

// Cabeçalho do talão, sem os itens
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VoucherRow {
    pub id: Uuid,
    pub number: String,
    pub project_id: Uuid,
    pub requester: String,
    pub status: VoucherStatus,
    pub signature: Option<Signature>,
    pub created_at: NaiveDate,
}

impl From<&Voucher> for VoucherRow {
    fn from(v: &Voucher) -> Self {
        Self {
            id: v.id,
            number: v.number.clone(),
            project_id: v.project_id,
            requester: v.requester.clone(),
            status: v.status,
            signature: v.signature.clone(),
            created_at: v.created_at,
        }
    }
}

impl VoucherRow {
    pub fn into_voucher(self, items: Vec<VoucherItem>) -> Voucher {
        Voucher {
            id: self.id,
            number: self.number,
            project_id: self.project_id,
            requester: self.requester,
            status: self.status,
            items,
            signature: self.signature,
            created_at: self.created_at,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VoucherItemRow {
    pub id: Uuid,
    pub voucher_id: Uuid,
    // Ordem do item dentro do talão
    pub position: i32,
    pub product_id: Option<Uuid>,
    pub description: Option<String>,
    pub quantity: Decimal,
    pub unit: String,
    pub source: ItemSource,
    pub unit_price: Option<Decimal>,
    pub delivered_quantity: Decimal,
    pub returned_quantity: Decimal,
    pub purchase_links: Vec<PurchaseLink>,
}

impl VoucherItemRow {
    pub fn flatten(voucher: &Voucher) -> Vec<VoucherItemRow> {
        voucher
            .items
            .iter()
            .enumerate()
            .map(|(position, i)| VoucherItemRow {
                id: i.id,
                voucher_id: voucher.id,
                position: position as i32,
                product_id: i.product_id,
                description: i.description.clone(),
                quantity: i.quantity,
                unit: i.unit.clone(),
                source: i.source,
                unit_price: i.unit_price,
                delivered_quantity: i.delivered_quantity,
                returned_quantity: i.returned_quantity,
                purchase_links: i.purchase_links.clone(),
            })
            .collect()
    }
}

impl From<VoucherItemRow> for VoucherItem {
    fn from(r: VoucherItemRow) -> Self {
        Self {
            id: r.id,
            product_id: r.product_id,
            description: r.description,
            quantity: r.quantity,
            unit: r.unit,
            source: r.source,
            unit_price: r.unit_price,
            delivered_quantity: r.delivered_quantity,
            returned_quantity: r.returned_quantity,
            purchase_links: r.purchase_links,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PurchaseRow {
    pub id: Uuid,
    pub supplier_id: Uuid,
    pub project_id: Option<Uuid>,
    pub invoice_number: Option<String>,
    pub date: NaiveDate,
    pub attachments: Vec<Attachment>,
}

impl From<&ExternalPurchase> for PurchaseRow {
    fn from(p: &ExternalPurchase) -> Self {
        Self {
            id: p.id,
            supplier_id: p.supplier_id,
            project_id: p.project_id,
            invoice_number: p.invoice_number.clone(),
            date: p.date,
            attachments: p.attachments.clone(),
        }
    }
}

impl PurchaseRow {
    pub fn into_purchase(self, items: Vec<PurchaseItem>) -> ExternalPurchase {
        ExternalPurchase {
            id: self.id,
            supplier_id: self.supplier_id,
            project_id: self.project_id,
            invoice_number: self.invoice_number,
            date: self.date,
            attachments: self.attachments,
            items,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PurchaseItemRow {
    pub id: Uuid,
    pub purchase_id: Uuid,
    pub position: i32,
    pub product_id: Option<Uuid>,
    pub description: String,
    pub quantity: Decimal,
    pub unit: String,
    pub unit_cost: Decimal,
    pub applied_markup: Decimal,
    pub project_unit_price: Decimal,
}

impl PurchaseItemRow {
    pub fn flatten(purchase: &ExternalPurchase) -> Vec<PurchaseItemRow> {
        purchase
            .items
            .iter()
            .enumerate()
            .map(|(position, i)| PurchaseItemRow {
                id: i.id,
                purchase_id: purchase.id,
                position: position as i32,
                product_id: i.product_id,
                description: i.description.clone(),
                quantity: i.quantity,
                unit: i.unit.clone(),
                unit_cost: i.unit_cost,
                applied_markup: i.applied_markup,
                project_unit_price: i.project_unit_price,
            })
            .collect()
    }
}

impl From<PurchaseItemRow> for PurchaseItem {
    fn from(r: PurchaseItemRow) -> Self {
        Self {
            id: r.id,
            product_id: r.product_id,
            description: r.description,
            quantity: r.quantity,
            unit: r.unit,
            unit_cost: r.unit_cost,
            applied_markup: r.applied_markup,
            project_unit_price: r.project_unit_price,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReturnRow {
    pub id: Uuid,
    pub voucher_id: Uuid,
    pub voucher_item_id: Uuid,
    pub quantity: Decimal,
    pub reason: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl From<&ReturnRecord> for ReturnRow {
    fn from(r: &ReturnRecord) -> Self {
        Self {
            id: r.id,
            voucher_id: r.voucher_id,
            voucher_item_id: r.voucher_item_id,
            quantity: r.quantity,
            reason: r.reason.clone(),
            created_at: r.created_at,
        }
    }
}

impl From<ReturnRow> for ReturnRecord {
    fn from(r: ReturnRow) -> Self {
        Self {
            id: r.id,
            voucher_id: r.voucher_id,
            voucher_item_id: r.voucher_item_id,
            quantity: r.quantity,
            reason: r.reason,
            created_at: r.created_at,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MarkupRuleRow {
    pub id: Uuid,
    pub target: MarkupTarget,
    pub reference: Option<String>,
    pub percentage: Decimal,
}

impl From<&MarkupRule> for MarkupRuleRow {
    fn from(r: &MarkupRule) -> Self {
        Self {
            id: r.id,
            target: r.target,
            reference: r.reference.clone(),
            percentage: r.percentage,
        }
    }
}

impl From<MarkupRuleRow> for MarkupRule {
    fn from(r: MarkupRuleRow) -> Self {
        Self {
            id: r.id,
            target: r.target,
            reference: r.reference,
            percentage: r.percentage,
        }
    }
}
