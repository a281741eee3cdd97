// src/handlers/documents.rs

use axum::{
    extract::{Path, Query, State},
    http::header,
    response::{IntoResponse, Response},
};
use uuid::Uuid;

use crate::{common::error::AppError, config::AppState, models::report::ReportFilter};

const XLSX_MIME: &str = "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet";

fn attachment(content_type: &'static str, filename: String, bytes: Vec<u8>) -> Response {
    // Configura os Headers para o navegador baixar o arquivo
    let headers = [
        (header::CONTENT_TYPE, content_type.to_string()),
        (header::CONTENT_DISPOSITION, format!("attachment; filename=\"{}\"", filename)),
    ];
    (headers, bytes).into_response()
}

#[utoipa::path(
    get,
    path = "/api/vouchers/{id}/pdf",
    tag = "Vouchers",
    params(("id" = Uuid, Path, description = "ID do talão")),
    responses(
        (status = 200, description = "Talão para impressão, com QR Code", content_type = "application/pdf"),
        (status = 404, description = "Talão não encontrado")
    ),
    security(("api_jwt" = []))
)]
pub async fn voucher_pdf(
    State(app_state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Response, AppError> {
    let (number, pdf_bytes) = app_state.document_service.voucher_pdf(id).await?;
    Ok(attachment("application/pdf", format!("talao_{}.pdf", number), pdf_bytes))
}

#[utoipa::path(
    get,
    path = "/api/reports/pdf",
    tag = "Reports",
    params(ReportFilter),
    responses((status = 200, description = "Relatório por obra em PDF", content_type = "application/pdf")),
    security(("api_jwt" = []))
)]
pub async fn report_pdf(
    State(app_state): State<AppState>,
    Query(filter): Query<ReportFilter>,
) -> Result<Response, AppError> {
    let report = app_state.report_service.summary(filter).await;
    let pdf_bytes = app_state.document_service.report_pdf(&report)?;

    let filename = format!("relatorio_{}.pdf", report.generated_at.format("%Y%m%d"));
    Ok(attachment("application/pdf", filename, pdf_bytes))
}

#[utoipa::path(
    get,
    path = "/api/reports/xlsx",
    tag = "Reports",
    params(ReportFilter),
    responses((status = 200, description = "Relatório por obra em planilha", content_type = "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet")),
    security(("api_jwt" = []))
)]
pub async fn report_xlsx(
    State(app_state): State<AppState>,
    Query(filter): Query<ReportFilter>,
) -> Result<Response, AppError> {
    let report = app_state.report_service.summary(filter).await;
    let bytes = app_state.document_service.report_xlsx(&report)?;

    let filename = format!("relatorio_{}.xlsx", report.generated_at.format("%Y%m%d"));
    Ok(attachment(XLSX_MIME, filename, bytes))
}
