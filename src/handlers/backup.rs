// src/handlers/backup.rs

use axum::{
    extract::State,
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use utoipa::ToSchema;

use crate::{common::error::AppError, config::AppState};

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ImportSummary {
    pub projects: usize,
    pub products: usize,
    pub suppliers: usize,
    pub vouchers: usize,
    pub purchases: usize,
    pub returns: usize,
    pub markup_rules: usize,
}

#[utoipa::path(
    get,
    path = "/api/backup/export",
    tag = "Backup",
    responses((status = 200, description = "Documento JSON com todo o estado", content_type = "application/json")),
    security(("api_jwt" = []))
)]
pub async fn export_backup(State(app_state): State<AppState>) -> Result<Response, AppError> {
    let json = app_state.backup_service.export_json().await?;
    let filename = format!("pls-obras-backup-{}.json", chrono::Utc::now().format("%Y%m%d"));

    let headers = [
        (header::CONTENT_TYPE, "application/json".to_string()),
        (header::CONTENT_DISPOSITION, format!("attachment; filename=\"{}\"", filename)),
    ];
    Ok((headers, json).into_response())
}

// Só as coleções presentes no documento substituem as atuais.
#[utoipa::path(
    post,
    path = "/api/backup/import",
    tag = "Backup",
    request_body(content = String, content_type = "application/json", description = "Documento exportado"),
    responses(
        (status = 200, description = "Backup importado", body = ImportSummary),
        (status = 422, description = "Documento inválido")
    ),
    security(("api_jwt" = []))
)]
pub async fn import_backup(
    State(app_state): State<AppState>,
    body: String,
) -> Result<impl IntoResponse, AppError> {
    let snapshot = app_state.backup_service.import_json(&body).await?;

    let summary = ImportSummary {
        projects: snapshot.projects.len(),
        products: snapshot.products.len(),
        suppliers: snapshot.suppliers.len(),
        vouchers: snapshot.vouchers.len(),
        purchases: snapshot.purchases.len(),
        returns: snapshot.returns.len(),
        markup_rules: snapshot.markup_rules.len(),
    };
    Ok((StatusCode::OK, Json(summary)))
}
