// src/handlers/sync.rs

use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};

use crate::{
    common::error::AppError,
    config::AppState,
    models::sync::{SyncReport, SyncStatus},
};

#[utoipa::path(
    post,
    path = "/api/sync/push",
    tag = "Sync",
    responses(
        (status = 200, description = "Estado local enviado ao espelho remoto", body = SyncReport),
        (status = 502, description = "Falha em uma das tabelas remotas"),
        (status = 503, description = "Sincronização não configurada")
    ),
    security(("api_jwt" = []))
)]
pub async fn push(State(app_state): State<AppState>) -> Result<impl IntoResponse, AppError> {
    let report = app_state.sync_service.push().await?;
    Ok((StatusCode::OK, Json(report)))
}

// Substitui as coleções locais pelo conteúdo remoto.
#[utoipa::path(
    post,
    path = "/api/sync/pull",
    tag = "Sync",
    responses(
        (status = 200, description = "Estado local substituído pelo remoto", body = SyncReport),
        (status = 502, description = "Falha ao ler o espelho remoto"),
        (status = 503, description = "Sincronização não configurada")
    ),
    security(("api_jwt" = []))
)]
pub async fn pull(State(app_state): State<AppState>) -> Result<impl IntoResponse, AppError> {
    let report = app_state.sync_service.pull().await?;
    Ok((StatusCode::OK, Json(report)))
}

#[utoipa::path(
    get,
    path = "/api/sync/status",
    tag = "Sync",
    responses((status = 200, description = "Estado do sincronizador", body = SyncStatus)),
    security(("api_jwt" = []))
)]
pub async fn status(State(app_state): State<AppState>) -> Result<impl IntoResponse, AppError> {
    let mut status = app_state
        .sync_status
        .as_ref()
        .map(|rx| rx.borrow().clone())
        .unwrap_or_default();
    status.enabled = app_state.sync_service.is_enabled().await;

    Ok((StatusCode::OK, Json(status)))
}

// Só verifica se o banco remoto responde; não envia nada.
#[utoipa::path(
    get,
    path = "/api/sync/test",
    tag = "Sync",
    responses(
        (status = 204, description = "Espelho remoto acessível"),
        (status = 500, description = "Banco remoto inacessível"),
        (status = 503, description = "Sincronização não configurada")
    ),
    security(("api_jwt" = []))
)]
pub async fn test_connection(State(app_state): State<AppState>) -> Result<StatusCode, AppError> {
    app_state.sync_service.ping().await?;
    tracing::info!("☁️ Conexão com o espelho remoto verificada");
    Ok(StatusCode::NO_CONTENT)
}
