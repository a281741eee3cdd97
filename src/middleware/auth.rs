// src/middleware/auth.rs

use axum::{
    extract::{FromRequestParts, Request, State},
    http::request::Parts,
    middleware::Next,
    response::Response,
};
use axum_extra::{
    headers::{authorization::Bearer, Authorization},
    TypedHeader,
};

use crate::{common::error::AppError, config::AppState, models::auth::Operator};

// Valida o `Authorization: Bearer <token>` e guarda o operador nas extensions.
pub async fn auth_guard(
    State(app_state): State<AppState>,
    bearer: Option<TypedHeader<Authorization<Bearer>>>,
    mut request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let TypedHeader(Authorization(bearer)) = bearer.ok_or(AppError::InvalidToken)?;

    let operator = app_state.auth_service.validate_token(bearer.token())?;
    request.extensions_mut().insert(operator);

    Ok(next.run(request).await)
}

// Extrator para obter o operador autenticado diretamente nos handlers
pub struct AuthenticatedOperator(pub Operator);

impl<S> FromRequestParts<S> for AuthenticatedOperator
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<Operator>()
            .cloned()
            .map(AuthenticatedOperator)
            .ok_or(AppError::InvalidToken)
    }
}
