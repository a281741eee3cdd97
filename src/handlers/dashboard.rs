// src/handlers/dashboard.rs

use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};

use crate::{
    common::error::AppError,
    config::AppState,
    models::report::{DashboardSummary, ReportFilter, ReportSummary},
};

// GET /api/dashboard
#[utoipa::path(
    get,
    path = "/api/dashboard",
    tag = "Dashboard",
    responses(
        (status = 200, description = "Indicadores do dia", body = DashboardSummary),
        (status = 401, description = "Não autorizado")
    ),
    security(("api_jwt" = []))
)]
pub async fn get_dashboard(State(app_state): State<AppState>) -> Result<impl IntoResponse, AppError> {
    let summary = app_state.report_service.dashboard().await;
    Ok((StatusCode::OK, Json(summary)))
}

// GET /api/reports/summary
#[utoipa::path(
    get,
    path = "/api/reports/summary",
    tag = "Reports",
    params(ReportFilter),
    responses(
        (status = 200, description = "Totais por obra, talões entregues e devoluções", body = ReportSummary)
    ),
    security(("api_jwt" = []))
)]
pub async fn get_report_summary(
    State(app_state): State<AppState>,
    Query(filter): Query<ReportFilter>,
) -> Result<impl IntoResponse, AppError> {
    let report = app_state.report_service.summary(filter).await;
    Ok((StatusCode::OK, Json(report)))
}
