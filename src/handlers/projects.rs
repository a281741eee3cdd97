// src/handlers/projects.rs

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
        project::{CreateProjectPayload, Project, UpdateProjectPayload},
        voucher::Voucher,
    },
};

#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ProjectListQuery {
    /// Somente obras ativas
    pub active: Option<bool>,
}

#[utoipa::path(
    get,
    path = "/api/projects",
    tag = "Projects",
    params(ProjectListQuery),
    responses(
        (status = 200, description = "Obras ordenadas por nome", body = Vec<Project>)
    ),
    security(("api_jwt" = []))
)]
pub async fn list_projects(
    State(app_state): State<AppState>,
    Query(query): Query<ProjectListQuery>,
) -> Result<impl IntoResponse, AppError> {
    let projects = app_state
        .project_service
        .list(query.active.unwrap_or(false))
        .await;
    Ok((StatusCode::OK, Json(projects)))
}

#[utoipa::path(
    post,
    path = "/api/projects",
    tag = "Projects",
    request_body = CreateProjectPayload,
    responses(
        (status = 201, description = "Obra criada", body = Project),
        (status = 400, description = "Dados inválidos")
    ),
    security(("api_jwt" = []))
)]
pub async fn create_project(
    State(app_state): State<AppState>,
    Json(payload): Json<CreateProjectPayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate().map_err(AppError::ValidationError)?;

    let project = app_state.project_service.create(payload).await?;
    Ok((StatusCode::CREATED, Json(project)))
}

#[utoipa::path(
    get,
    path = "/api/projects/{id}",
    tag = "Projects",
    params(("id" = Uuid, Path, description = "ID da obra")),
    responses(
        (status = 200, description = "Obra", body = Project),
        (status = 404, description = "Obra não encontrada")
    ),
    security(("api_jwt" = []))
)]
pub async fn get_project(
    State(app_state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    let project = app_state.project_service.get(id).await?;
    Ok((StatusCode::OK, Json(project)))
}

#[utoipa::path(
    patch,
    path = "/api/projects/{id}",
    tag = "Projects",
    params(("id" = Uuid, Path, description = "ID da obra")),
    request_body = UpdateProjectPayload,
    responses(
        (status = 200, description = "Obra atualizada", body = Project),
        (status = 404, description = "Obra não encontrada")
    ),
    security(("api_jwt" = []))
)]
pub async fn update_project(
    State(app_state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateProjectPayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate().map_err(AppError::ValidationError)?;

    let project = app_state.project_service.update(id, payload).await?;
    Ok((StatusCode::OK, Json(project)))
}

// Os talões da obra continuam existindo.
#[utoipa::path(
    delete,
    path = "/api/projects/{id}",
    tag = "Projects",
    params(("id" = Uuid, Path, description = "ID da obra")),
    responses(
        (status = 204, description = "Obra removida"),
        (status = 404, description = "Obra não encontrada")
    ),
    security(("api_jwt" = []))
)]
pub async fn delete_project(
    State(app_state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    app_state.project_service.delete(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

#[utoipa::path(
    get,
    path = "/api/projects/{id}/vouchers",
    tag = "Projects",
    params(("id" = Uuid, Path, description = "ID da obra")),
    responses(
        (status = 200, description = "Talões da obra", body = Vec<Voucher>)
    ),
    security(("api_jwt" = []))
)]
pub async fn list_project_vouchers(
    State(app_state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    let query = crate::models::voucher::VoucherListQuery {
        project_id: Some(id),
        ..Default::default()
    };
    let vouchers = app_state.voucher_service.list(&query).await;
    Ok((StatusCode::OK, Json(vouchers)))
}
