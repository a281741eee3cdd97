// src/handlers/markup.rs

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use uuid::Uuid;
use validator::Validate;

use crate::{
    common::error::AppError,
    config::AppState,
    models::markup::{
        CreateMarkupRulePayload, MarkupQuote, MarkupQuotePayload, MarkupRule, UpdateMarkupRulePayload,
    },
};

#[utoipa::path(
    get,
    path = "/api/markup-rules",
    tag = "Markup",
    responses((status = 200, description = "Regras de markup", body = Vec<MarkupRule>)),
    security(("api_jwt" = []))
)]
pub async fn list_rules(State(app_state): State<AppState>) -> Result<impl IntoResponse, AppError> {
    let rules = app_state.markup_service.list_rules().await;
    Ok((StatusCode::OK, Json(rules)))
}

#[utoipa::path(
    post,
    path = "/api/markup-rules",
    tag = "Markup",
    request_body = CreateMarkupRulePayload,
    responses(
        (status = 201, description = "Regra criada", body = MarkupRule),
        (status = 400, description = "Dados inválidos")
    ),
    security(("api_jwt" = []))
)]
pub async fn create_rule(
    State(app_state): State<AppState>,
    Json(payload): Json<CreateMarkupRulePayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate().map_err(AppError::ValidationError)?;

    let rule = app_state.markup_service.create_rule(payload).await?;
    Ok((StatusCode::CREATED, Json(rule)))
}

#[utoipa::path(
    patch,
    path = "/api/markup-rules/{id}",
    tag = "Markup",
    params(("id" = Uuid, Path, description = "ID da regra")),
    request_body = UpdateMarkupRulePayload,
    responses(
        (status = 200, description = "Regra atualizada", body = MarkupRule),
        (status = 404, description = "Regra não encontrada")
    ),
    security(("api_jwt" = []))
)]
pub async fn update_rule(
    State(app_state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateMarkupRulePayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate().map_err(AppError::ValidationError)?;

    let rule = app_state.markup_service.update_rule(id, payload).await?;
    Ok((StatusCode::OK, Json(rule)))
}

#[utoipa::path(
    delete,
    path = "/api/markup-rules/{id}",
    tag = "Markup",
    params(("id" = Uuid, Path, description = "ID da regra")),
    responses(
        (status = 204, description = "Regra removida"),
        (status = 404, description = "Regra não encontrada")
    ),
    security(("api_jwt" = []))
)]
pub async fn delete_rule(
    State(app_state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    app_state.markup_service.delete_rule(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

// Simula o preço para a obra sem gravar nada.
#[utoipa::path(
    post,
    path = "/api/markup/quote",
    tag = "Markup",
    request_body = MarkupQuotePayload,
    responses((status = 200, description = "Markup aplicado e preço para a obra", body = MarkupQuote)),
    security(("api_jwt" = []))
)]
pub async fn quote(
    State(app_state): State<AppState>,
    Json(payload): Json<MarkupQuotePayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate().map_err(AppError::ValidationError)?;

    let quote = app_state.markup_service.quote(payload).await?;
    Ok((StatusCode::OK, Json(quote)))
}
