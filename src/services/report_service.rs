// src/services/report_service.rs

use chrono::{NaiveDate, Utc};
use rust_decimal::Decimal;

use crate::{
    common::money,
    db::{Snapshot, Store},
    models::{
        report::{
            DashboardSummary, ProjectTotals, ReportFilter, ReportSummary, ReportTotals,
            ReturnReportLine, VoucherReportLine,
        },
        voucher::{ItemSource, Voucher, VoucherStatus},
    },
};

/// Produtos ativos com saldo igual ou abaixo disso aparecem no painel.
pub const LOW_STOCK_THRESHOLD: Decimal = Decimal::TEN;

#[derive(Clone)]
pub struct ReportService {
    store: Store,
}

impl ReportService {
    pub fn new(store: Store) -> Self {
        Self { store }
    }

    pub async fn summary(&self, filter: ReportFilter) -> ReportSummary {
        let state = self.store.read().await;
        build_summary(&state, filter)
    }

    pub async fn dashboard(&self) -> DashboardSummary {
        let state = self.store.read().await;
        build_dashboard(&state, Utc::now().date_naive())
    }
}

// Só entram talões que já tiveram entrega concluída.
fn is_reportable(voucher: &Voucher) -> bool {
    matches!(
        voucher.status,
        VoucherStatus::Completed | VoucherStatus::PartiallyReturned | VoucherStatus::FullyReturned
    )
}

fn voucher_totals(voucher: &Voucher) -> ReportTotals {
    let mut totals = ReportTotals {
        voucher_count: 1,
        ..ReportTotals::default()
    };
    for item in &voucher.items {
        let bucket = match item.source {
            ItemSource::Stock => &mut totals.stock_value,
            ItemSource::ExternalPurchase => &mut totals.external_value,
        };
        *bucket = bucket.saturating_add(item.net_value());
        totals.returned_value = totals.returned_value.saturating_add(item.returned_value());
    }
    totals.total_value = totals.stock_value.saturating_add(totals.external_value);
    totals
}

pub fn build_summary(state: &Snapshot, filter: ReportFilter) -> ReportSummary {
    let vouchers: Vec<&Voucher> = state
        .vouchers
        .iter()
        .filter(|v| is_reportable(v))
        .filter(|v| filter.project_id.is_none_or(|id| v.project_id == id))
        .filter(|v| filter.contains(v.created_at))
        .collect();

    let per_project: Vec<ProjectTotals> = state
        .projects
        .iter()
        .filter(|p| filter.project_id.is_none_or(|id| p.id == id))
        .map(|project| {
            let mut totals = ReportTotals::default();
            for voucher in vouchers.iter().filter(|v| v.project_id == project.id) {
                totals.add(&voucher_totals(voucher));
            }
            ProjectTotals {
                project_id: project.id,
                project_name: project.name.clone(),
                city: project.city.clone(),
                totals,
            }
        })
        .collect();

    let mut totals = ReportTotals::default();
    for project in &per_project {
        totals.add(&project.totals);
    }

    let project_name = |id| state.projects.get(id).map(|p| p.name.clone());

    let voucher_lines = vouchers
        .iter()
        .map(|v| VoucherReportLine {
            voucher_id: v.id,
            number: v.number.clone(),
            project_name: project_name(v.project_id),
            requester: v.requester.clone(),
            status: v.status,
            created_at: v.created_at,
            total_value: v.total_value(),
        })
        .collect();

    let returns = state
        .returns
        .iter()
        .filter(|r| filter.contains(r.created_at.date_naive()))
        .filter_map(|r| {
            let voucher = state.vouchers.get(r.voucher_id);
            if let Some(project_id) = filter.project_id {
                if voucher.is_none_or(|v| v.project_id != project_id) {
                    return None;
                }
            }
            let item = voucher.and_then(|v| v.item(r.voucher_item_id));
            Some(ReturnReportLine {
                created_at: r.created_at,
                voucher_number: voucher.map(|v| v.number.clone()),
                project_name: voucher.and_then(|v| project_name(v.project_id)),
                item_description: item.and_then(|i| {
                    i.description
                        .clone()
                        .or_else(|| i.product_id.and_then(|id| state.products.get(id)).map(|p| p.name.clone()))
                }),
                quantity: r.quantity,
                reason: r.reason.clone(),
                value: item
                    .and_then(|i| i.unit_price)
                    .unwrap_or(Decimal::ZERO)
                    .saturating_mul(r.quantity),
            })
        })
        .collect();

    ReportSummary {
        filter,
        generated_at: Utc::now(),
        per_project,
        totals,
        vouchers: voucher_lines,
        returns,
    }
}

pub fn build_dashboard(state: &Snapshot, today: NaiveDate) -> DashboardSummary {
    let open_vouchers = state.vouchers.iter().filter(|v| v.status.is_open()).count();
    let deliveries_today = state
        .vouchers
        .iter()
        .filter(|v| v.status == VoucherStatus::InDelivery && v.created_at == today)
        .count();

    let purchase_cost = money::sum(state.purchases.iter().map(|p| p.total_cost()));
    let purchase_billed = money::sum(state.purchases.iter().map(|p| p.total_billed()));

    let returns_today = state
        .returns
        .iter()
        .filter(|r| r.created_at.date_naive() == today)
        .count();

    let mut low_stock_products =
        state.products.filter(|p| p.active && p.stock <= LOW_STOCK_THRESHOLD);
    low_stock_products.sort_by(|a, b| a.stock.cmp(&b.stock));

    DashboardSummary {
        open_vouchers,
        deliveries_today,
        purchase_cost,
        purchase_billed,
        returns_today,
        active_projects: state.projects.iter().filter(|p| p.active).count(),
        active_products: state.products.iter().filter(|p| p.active).count(),
        low_stock_products,
    }
}
