// src/handlers/catalog.rs
//
// Produtos (com saldo de estoque) e fornecedores.

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
        catalog::{
            CreateProductPayload, CreateSupplierPayload, Product, Supplier, UpdateProductPayload,
            UpdateSupplierPayload,
        },
        stock::{StockAdjustment, StockAdjustmentPayload},
    },
};

#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ProductListQuery {
    pub category: Option<String>,
}

#[derive(Debug, Default, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct AdjustmentListQuery {
    pub product_id: Option<Uuid>,
}

// ---
// Produtos
// ---

#[utoipa::path(
    get,
    path = "/api/products",
    tag = "Products",
    params(ProductListQuery),
    responses((status = 200, description = "Catálogo de produtos", body = Vec<Product>)),
    security(("api_jwt" = []))
)]
pub async fn list_products(
    State(app_state): State<AppState>,
    Query(query): Query<ProductListQuery>,
) -> Result<impl IntoResponse, AppError> {
    let products = app_state
        .catalog_service
        .list_products(query.category.as_deref())
        .await;
    Ok((StatusCode::OK, Json(products)))
}

#[utoipa::path(
    post,
    path = "/api/products",
    tag = "Products",
    request_body = CreateProductPayload,
    responses(
        (status = 201, description = "Produto criado", body = Product),
        (status = 400, description = "Dados inválidos")
    ),
    security(("api_jwt" = []))
)]
pub async fn create_product(
    State(app_state): State<AppState>,
    Json(payload): Json<CreateProductPayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate().map_err(AppError::ValidationError)?;

    let product = app_state.catalog_service.create_product(payload).await?;
    Ok((StatusCode::CREATED, Json(product)))
}

#[utoipa::path(
    get,
    path = "/api/products/{id}",
    tag = "Products",
    params(("id" = Uuid, Path, description = "ID do produto")),
    responses(
        (status = 200, description = "Produto", body = Product),
        (status = 404, description = "Produto não encontrado")
    ),
    security(("api_jwt" = []))
)]
pub async fn get_product(
    State(app_state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    let product = app_state.catalog_service.get_product(id).await?;
    Ok((StatusCode::OK, Json(product)))
}

#[utoipa::path(
    patch,
    path = "/api/products/{id}",
    tag = "Products",
    params(("id" = Uuid, Path, description = "ID do produto")),
    request_body = UpdateProductPayload,
    responses(
        (status = 200, description = "Produto atualizado", body = Product),
        (status = 404, description = "Produto não encontrado")
    ),
    security(("api_jwt" = []))
)]
pub async fn update_product(
    State(app_state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateProductPayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate().map_err(AppError::ValidationError)?;

    let product = app_state.catalog_service.update_product(id, payload).await?;
    Ok((StatusCode::OK, Json(product)))
}

#[utoipa::path(
    delete,
    path = "/api/products/{id}",
    tag = "Products",
    params(("id" = Uuid, Path, description = "ID do produto")),
    responses(
        (status = 204, description = "Produto removido"),
        (status = 404, description = "Produto não encontrado")
    ),
    security(("api_jwt" = []))
)]
pub async fn delete_product(
    State(app_state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    app_state.catalog_service.delete_product(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

// ---
// Ajustes de estoque
// ---

#[utoipa::path(
    post,
    path = "/api/products/{id}/stock-adjustments",
    tag = "Products",
    params(("id" = Uuid, Path, description = "ID do produto")),
    request_body = StockAdjustmentPayload,
    responses(
        (status = 201, description = "Ajuste registrado", body = StockAdjustment),
        (status = 404, description = "Produto não encontrado")
    ),
    security(("api_jwt" = []))
)]
pub async fn adjust_stock(
    State(app_state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<StockAdjustmentPayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate().map_err(AppError::ValidationError)?;

    let adjustment = app_state.catalog_service.adjust_stock(id, payload).await?;
    Ok((StatusCode::CREATED, Json(adjustment)))
}

#[utoipa::path(
    get,
    path = "/api/products/{id}/stock-adjustments",
    tag = "Products",
    params(("id" = Uuid, Path, description = "ID do produto")),
    responses((status = 200, description = "Histórico do produto", body = Vec<StockAdjustment>)),
    security(("api_jwt" = []))
)]
pub async fn list_product_adjustments(
    State(app_state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    let adjustments = app_state.catalog_service.list_adjustments(Some(id)).await;
    Ok((StatusCode::OK, Json(adjustments)))
}

#[utoipa::path(
    get,
    path = "/api/stock-adjustments",
    tag = "Products",
    params(AdjustmentListQuery),
    responses((status = 200, description = "Ajustes de estoque, mais recentes primeiro", body = Vec<StockAdjustment>)),
    security(("api_jwt" = []))
)]
pub async fn list_adjustments(
    State(app_state): State<AppState>,
    Query(query): Query<AdjustmentListQuery>,
) -> Result<impl IntoResponse, AppError> {
    let adjustments = app_state.catalog_service.list_adjustments(query.product_id).await;
    Ok((StatusCode::OK, Json(adjustments)))
}

// ---
// Fornecedores
// ---

#[utoipa::path(
    get,
    path = "/api/suppliers",
    tag = "Suppliers",
    responses((status = 200, description = "Fornecedores", body = Vec<Supplier>)),
    security(("api_jwt" = []))
)]
pub async fn list_suppliers(State(app_state): State<AppState>) -> Result<impl IntoResponse, AppError> {
    let suppliers = app_state.catalog_service.list_suppliers().await;
    Ok((StatusCode::OK, Json(suppliers)))
}

#[utoipa::path(
    post,
    path = "/api/suppliers",
    tag = "Suppliers",
    request_body = CreateSupplierPayload,
    responses(
        (status = 201, description = "Fornecedor criado", body = Supplier),
        (status = 400, description = "Dados inválidos")
    ),
    security(("api_jwt" = []))
)]
pub async fn create_supplier(
    State(app_state): State<AppState>,
    Json(payload): Json<CreateSupplierPayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate().map_err(AppError::ValidationError)?;

    let supplier = app_state.catalog_service.create_supplier(payload).await?;
    Ok((StatusCode::CREATED, Json(supplier)))
}

#[utoipa::path(
    get,
    path = "/api/suppliers/{id}",
    tag = "Suppliers",
    params(("id" = Uuid, Path, description = "ID do fornecedor")),
    responses(
        (status = 200, description = "Fornecedor", body = Supplier),
        (status = 404, description = "Fornecedor não encontrado")
    ),
    security(("api_jwt" = []))
)]
pub async fn get_supplier(
    State(app_state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    let supplier = app_state.catalog_service.get_supplier(id).await?;
    Ok((StatusCode::OK, Json(supplier)))
}

#[utoipa::path(
    patch,
    path = "/api/suppliers/{id}",
    tag = "Suppliers",
    params(("id" = Uuid, Path, description = "ID do fornecedor")),
    request_body = UpdateSupplierPayload,
    responses(
        (status = 200, description = "Fornecedor atualizado", body = Supplier),
        (status = 404, description = "Fornecedor não encontrado")
    ),
    security(("api_jwt" = []))
)]
pub async fn update_supplier(
    State(app_state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateSupplierPayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate().map_err(AppError::ValidationError)?;

    let supplier = app_state.catalog_service.update_supplier(id, payload).await?;
    Ok((StatusCode::OK, Json(supplier)))
}

#[utoipa::path(
    delete,
    path = "/api/suppliers/{id}",
    tag = "Suppliers",
    params(("id" = Uuid, Path, description = "ID do fornecedor")),
    responses(
        (status = 204, description = "Fornecedor removido"),
        (status = 404, description = "Fornecedor não encontrado")
    ),
    security(("api_jwt" = []))
)]
pub async fn delete_supplier(
    State(app_state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    app_state.catalog_service.delete_supplier(id).await?;
    Ok(StatusCode::NO_CONTENT)
}
