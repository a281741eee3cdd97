// src/models/report.rs

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;

use crate::models::{catalog::Product, voucher::VoucherStatus};

// Filtro do relatório: obra e período (datas inclusivas)
#[derive(Debug, Clone, Default, Serialize, Deserialize, IntoParams, ToSchema)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct ReportFilter {
    pub project_id: Option<Uuid>,
    #[param(value_type = Option<String>, format = Date)]
    #[schema(value_type = Option<String>, format = Date)]
    pub from: Option<NaiveDate>,
    #[param(value_type = Option<String>, format = Date)]
    #[schema(value_type = Option<String>, format = Date)]
    pub to: Option<NaiveDate>,
}

impl ReportFilter {
    pub fn contains(&self, date: NaiveDate) -> bool {
        self.from.is_none_or(|from| date >= from) && self.to.is_none_or(|to| date <= to)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ReportTotals {
    pub voucher_count: usize,
    // Valor líquido (entregue - devolvido) de itens do estoque
    pub stock_value: Decimal,
    // Valor líquido de itens vindos de compra externa
    pub external_value: Decimal,
    pub total_value: Decimal,
    pub returned_value: Decimal,
}

impl ReportTotals {
    pub fn add(&mut self, other: &ReportTotals) {
        self.voucher_count += other.voucher_count;
        self.stock_value = self.stock_value.saturating_add(other.stock_value);
        self.external_value = self.external_value.saturating_add(other.external_value);
        self.total_value = self.total_value.saturating_add(other.total_value);
        self.returned_value = self.returned_value.saturating_add(other.returned_value);
    }
}

#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ProjectTotals {
    pub project_id: Uuid,
    pub project_name: String,
    pub city: Option<String>,
    #[serde(flatten)]
    pub totals: ReportTotals,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct VoucherReportLine {
    pub voucher_id: Uuid,
    pub number: String,
    pub project_name: Option<String>,
    pub requester: String,
    pub status: VoucherStatus,
    #[schema(value_type = String, format = Date)]
    pub created_at: NaiveDate,
    pub total_value: Decimal,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ReturnReportLine {
    pub created_at: DateTime<Utc>,
    pub voucher_number: Option<String>,
    pub project_name: Option<String>,
    pub item_description: Option<String>,
    pub quantity: Decimal,
    pub reason: Option<String>,
    pub value: Decimal,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ReportSummary {
    pub filter: ReportFilter,
    pub generated_at: DateTime<Utc>,
    pub per_project: Vec<ProjectTotals>,
    pub totals: ReportTotals,
    pub vouchers: Vec<VoucherReportLine>,
    pub returns: Vec<ReturnReportLine>,
}

// Cards do painel inicial
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DashboardSummary {
    pub open_vouchers: usize,       // Aguardando separação/entrega
    pub deliveries_today: usize,    // Talões em entrega criados hoje
    pub purchase_cost: Decimal,     // Custo das compras externas
    pub purchase_billed: Decimal,   // Valor repassado às obras
    pub returns_today: usize,
    pub active_projects: usize,
    pub active_products: usize,
    pub low_stock_products: Vec<Product>,
}
