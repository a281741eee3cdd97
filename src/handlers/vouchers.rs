// src/handlers/vouchers.rs

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
    models::{
        stock::ReturnRecord,
        voucher::{
            CreateVoucherPayload, LinkPurchasePayload, RecordDeliveryPayload, RegisterReturnPayload,
            UpdateVoucherPayload, Voucher, VoucherListQuery,
        },
    },
};

#[derive(Debug, Default, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct ReturnListQuery {
    pub voucher_id: Option<Uuid>,
}

#[utoipa::path(
    get,
    path = "/api/vouchers",
    tag = "Vouchers",
    params(VoucherListQuery),
    responses((status = 200, description = "Talões, mais recentes primeiro", body = Vec<Voucher>)),
    security(("api_jwt" = []))
)]
pub async fn list_vouchers(
    State(app_state): State<AppState>,
    Query(query): Query<VoucherListQuery>,
) -> Result<impl IntoResponse, AppError> {
    let vouchers = app_state.voucher_service.list(&query).await;
    Ok((StatusCode::OK, Json(vouchers)))
}

#[utoipa::path(
    post,
    path = "/api/vouchers",
    tag = "Vouchers",
    request_body = CreateVoucherPayload,
    responses(
        (status = 201, description = "Talão criado (A separar)", body = Voucher),
        (status = 400, description = "Dados inválidos"),
        (status = 404, description = "Obra ou produto não encontrado")
    ),
    security(("api_jwt" = []))
)]
pub async fn create_voucher(
    State(app_state): State<AppState>,
    Json(payload): Json<CreateVoucherPayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate().map_err(AppError::ValidationError)?;

    let voucher = app_state.voucher_service.create(payload).await?;
    Ok((StatusCode::CREATED, Json(voucher)))
}

#[utoipa::path(
    get,
    path = "/api/vouchers/{id}",
    tag = "Vouchers",
    params(("id" = Uuid, Path, description = "ID do talão")),
    responses(
        (status = 200, description = "Talão", body = Voucher),
        (status = 404, description = "Talão não encontrado")
    ),
    security(("api_jwt" = []))
)]
pub async fn get_voucher(
    State(app_state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    let voucher = app_state.voucher_service.get(id).await?;
    Ok((StatusCode::OK, Json(voucher)))
}

#[utoipa::path(
    patch,
    path = "/api/vouchers/{id}",
    tag = "Vouchers",
    params(("id" = Uuid, Path, description = "ID do talão")),
    request_body = UpdateVoucherPayload,
    responses(
        (status = 200, description = "Talão atualizado", body = Voucher),
        (status = 409, description = "Itens só podem ser trocados antes da separação")
    ),
    security(("api_jwt" = []))
)]
pub async fn update_voucher(
    State(app_state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateVoucherPayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate().map_err(AppError::ValidationError)?;

    let voucher = app_state.voucher_service.update(id, payload).await?;
    Ok((StatusCode::OK, Json(voucher)))
}

#[utoipa::path(
    delete,
    path = "/api/vouchers/{id}",
    tag = "Vouchers",
    params(("id" = Uuid, Path, description = "ID do talão")),
    responses(
        (status = 204, description = "Talão removido"),
        (status = 404, description = "Talão não encontrado")
    ),
    security(("api_jwt" = []))
)]
pub async fn delete_voucher(
    State(app_state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    app_state.voucher_service.delete(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

#[utoipa::path(
    post,
    path = "/api/vouchers/{id}/dispatch",
    tag = "Vouchers",
    params(("id" = Uuid, Path, description = "ID do talão")),
    responses(
        (status = 200, description = "Talão enviado para entrega", body = Voucher),
        (status = 409, description = "Talão não está em separação")
    ),
    security(("api_jwt" = []))
)]
pub async fn dispatch_voucher(
    State(app_state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    let voucher = app_state.voucher_service.dispatch(id).await?;
    Ok((StatusCode::OK, Json(voucher)))
}

#[utoipa::path(
    post,
    path = "/api/vouchers/{id}/deliveries",
    tag = "Vouchers",
    params(("id" = Uuid, Path, description = "ID do talão")),
    request_body = RecordDeliveryPayload,
    responses(
        (status = 200, description = "Entrega registrada", body = Voucher),
        (status = 409, description = "Talão já concluído ou quantidade abaixo da devolvida"),
        (status = 422, description = "Assinatura obrigatória para concluir")
    ),
    security(("api_jwt" = []))
)]
pub async fn record_delivery(
    State(app_state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<RecordDeliveryPayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate().map_err(AppError::ValidationError)?;

    let voucher = app_state.voucher_service.record_delivery(id, payload).await?;
    Ok((StatusCode::OK, Json(voucher)))
}

#[utoipa::path(
    post,
    path = "/api/vouchers/{id}/returns",
    tag = "Vouchers",
    params(("id" = Uuid, Path, description = "ID do talão")),
    request_body = RegisterReturnPayload,
    responses(
        (status = 200, description = "Devolução registrada", body = Voucher),
        (status = 409, description = "Quantidade de devolução maior que disponível")
    ),
    security(("api_jwt" = []))
)]
pub async fn register_return(
    State(app_state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<RegisterReturnPayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate().map_err(AppError::ValidationError)?;

    let voucher = app_state.voucher_service.register_return(id, payload).await?;
    Ok((StatusCode::OK, Json(voucher)))
}

#[utoipa::path(
    post,
    path = "/api/vouchers/{id}/links",
    tag = "Vouchers",
    params(("id" = Uuid, Path, description = "ID do talão")),
    request_body = LinkPurchasePayload,
    responses(
        (status = 200, description = "Item vinculado à compra externa", body = Voucher),
        (status = 404, description = "Talão, item ou compra não encontrado")
    ),
    security(("api_jwt" = []))
)]
pub async fn link_purchase(
    State(app_state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<LinkPurchasePayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate().map_err(AppError::ValidationError)?;

    let voucher = app_state.purchase_service.link_purchase(id, payload).await?;
    Ok((StatusCode::OK, Json(voucher)))
}

#[utoipa::path(
    get,
    path = "/api/returns",
    tag = "Vouchers",
    params(ReturnListQuery),
    responses((status = 200, description = "Devoluções registradas", body = Vec<ReturnRecord>)),
    security(("api_jwt" = []))
)]
pub async fn list_returns(
    State(app_state): State<AppState>,
    Query(query): Query<ReturnListQuery>,
) -> Result<impl IntoResponse, AppError> {
    let returns = app_state.voucher_service.list_returns(query.voucher_id).await;
    Ok((StatusCode::OK, Json(returns)))
}
