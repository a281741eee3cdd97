// src/handlers/purchases.rs

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use serde::Deserialize;
use utoipa::IntoParams;
use uuid::Uuid;
use validator::Validate;

use crate::{
    common::error::AppError,
    config::AppState,
    models::purchase::{CreatePurchasePayload, ExternalPurchase, UpdatePurchasePayload},
};

#[derive(Debug, Default, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct PurchaseListQuery {
    pub supplier_id: Option<Uuid>,
    pub project_id: Option<Uuid>,
}

#[utoipa::path(
    get,
    path = "/api/purchases",
    tag = "Purchases",
    params(PurchaseListQuery),
    responses((status = 200, description = "Compras externas, mais recentes primeiro", body = Vec<ExternalPurchase>)),
    security(("api_jwt" = []))
)]
pub async fn list_purchases(
    State(app_state): State<AppState>,
    Query(query): Query<PurchaseListQuery>,
) -> Result<impl IntoResponse, AppError> {
    let purchases = app_state
        .purchase_service
        .list(query.supplier_id, query.project_id)
        .await;
    Ok((StatusCode::OK, Json(purchases)))
}

// O preço para a obra de cada item é calculado pelo markup vigente.
#[utoipa::path(
    post,
    path = "/api/purchases",
    tag = "Purchases",
    request_body = CreatePurchasePayload,
    responses(
        (status = 201, description = "Compra registrada com preços para a obra", body = ExternalPurchase),
        (status = 404, description = "Fornecedor ou obra não encontrado")
    ),
    security(("api_jwt" = []))
)]
pub async fn create_purchase(
    State(app_state): State<AppState>,
    Json(payload): Json<CreatePurchasePayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate().map_err(AppError::ValidationError)?;

    let purchase = app_state.purchase_service.create(payload).await?;
    Ok((StatusCode::CREATED, Json(purchase)))
}

#[utoipa::path(
    get,
    path = "/api/purchases/{id}",
    tag = "Purchases",
    params(("id" = Uuid, Path, description = "ID da compra")),
    responses(
        (status = 200, description = "Compra externa", body = ExternalPurchase),
        (status = 404, description = "Compra não encontrada")
    ),
    security(("api_jwt" = []))
)]
pub async fn get_purchase(
    State(app_state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    let purchase = app_state.purchase_service.get(id).await?;
    Ok((StatusCode::OK, Json(purchase)))
}

#[utoipa::path(
    patch,
    path = "/api/purchases/{id}",
    tag = "Purchases",
    params(("id" = Uuid, Path, description = "ID da compra")),
    request_body = UpdatePurchasePayload,
    responses(
        (status = 200, description = "Compra atualizada", body = ExternalPurchase),
        (status = 404, description = "Compra não encontrada")
    ),
    security(("api_jwt" = []))
)]
pub async fn update_purchase(
    State(app_state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdatePurchasePayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate().map_err(AppError::ValidationError)?;

    let purchase = app_state.purchase_service.update(id, payload).await?;
    Ok((StatusCode::OK, Json(purchase)))
}

#[utoipa::path(
    delete,
    path = "/api/purchases/{id}",
    tag = "Purchases",
    params(("id" = Uuid, Path, description = "ID da compra")),
    responses(
        (status = 204, description = "Compra removida"),
        (status = 404, description = "Compra não encontrada")
    ),
    security(("api_jwt" = []))
)]
pub async fn delete_purchase(
    State(app_state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    app_state.purchase_service.delete(id).await?;
    Ok(StatusCode::NO_CONTENT)
}
