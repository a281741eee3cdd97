use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use rust_decimal::Decimal;
use serde_json::json;
use thiserror::Error;
use uuid::Uuid;

use crate::models::voucher::VoucherStatus;

// Tipo de erro único da aplicação. Cada variante vira um status HTTP em `into_response`.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Erro de validação")]
    ValidationError(#[from] validator::ValidationErrors),

    #[error("{entity} não encontrado(a): {id}")]
    NotFound { entity: &'static str, id: Uuid },

    #[error("Quantidade de devolução maior que disponível (solicitado {requested}, disponível {available})")]
    ReturnExceedsAvailable { requested: Decimal, available: Decimal },

    #[error("Quantidade entregue ({delivered}) menor que a já devolvida ({returned})")]
    DeliveryBelowReturned { delivered: Decimal, returned: Decimal },

    #[error("Operação '{action}' não permitida para talão com status '{status}'")]
    InvalidVoucherTransition {
        status: VoucherStatus,
        action: &'static str,
    },

    #[error("A assinatura do recebedor é obrigatória para concluir a entrega")]
    SignatureRequired,

    #[error("Dados inválidos para importação: {0}")]
    InvalidImport(String),

    #[error("Sincronização remota não configurada")]
    SyncDisabled,

    #[error("{table}: {message}")]
    SyncFailed { table: &'static str, message: String },

    #[error("Erro de armazenamento local: {0}")]
    StorageError(#[from] std::io::Error),

    #[error("Erro de serialização: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("Erro de banco de dados")]
    DatabaseError(#[from] sqlx::Error),

    #[error("Erro ao executar migrações: {0}")]
    MigrationError(#[from] sqlx::migrate::MigrateError),

    #[error("Credenciais inválidas")]
    InvalidCredentials,

    #[error("Token inválido")]
    InvalidToken,

    #[error("Fonte não encontrada: {0}")]
    FontNotFound(String),

    #[error("Erro ao gerar documento: {0}")]
    DocumentError(String),

    // Variante genérica para qualquer outro erro inesperado
    #[error("Erro interno do servidor")]
    InternalServerError(#[from] anyhow::Error),

    #[error("Erro de Bcrypt: {0}")]
    BcryptError(#[from] bcrypt::BcryptError),

    #[error("Erro de JWT: {0}")]
    JwtError(#[from] jsonwebtoken::errors::Error),
}

impl AppError {
    pub fn not_found(entity: &'static str, id: Uuid) -> Self {
        AppError::NotFound { entity, id }
    }
}

impl From<rust_xlsxwriter::XlsxError> for AppError {
    fn from(e: rust_xlsxwriter::XlsxError) -> Self {
        AppError::DocumentError(e.to_string())
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error_message) = match self {
            // Retorna todos os detalhes da validação, campo a campo.
            AppError::ValidationError(errors) => {
                let mut details = std::collections::HashMap::new();
                for (field, field_errors) in errors.field_errors() {
                    let messages: Vec<String> = field_errors
                        .iter()
                        .map(|e| {
                            e.message
                                .as_ref()
                                .map(|m| m.to_string())
                                .unwrap_or_else(|| e.code.to_string())
                        })
                        .collect();
                    details.insert(field.to_string(), messages);
                }
                let body = Json(json!({
                    "error": "Um ou mais campos são inválidos.",
                    "details": details,
                }));
                return (StatusCode::BAD_REQUEST, body).into_response();
            }
            e @ AppError::NotFound { .. } => (StatusCode::NOT_FOUND, e.to_string()),
            e @ (AppError::ReturnExceedsAvailable { .. }
            | AppError::DeliveryBelowReturned { .. }
            | AppError::InvalidVoucherTransition { .. }) => (StatusCode::CONFLICT, e.to_string()),
            e @ (AppError::SignatureRequired | AppError::InvalidImport(_)) => {
                (StatusCode::UNPROCESSABLE_ENTITY, e.to_string())
            }
            e @ AppError::SyncDisabled => (StatusCode::SERVICE_UNAVAILABLE, e.to_string()),
            e @ AppError::SyncFailed { .. } => {
                tracing::error!("Falha na sincronização remota: {}", e);
                (StatusCode::BAD_GATEWAY, e.to_string())
            }
            AppError::InvalidCredentials => (
                StatusCode::UNAUTHORIZED,
                "E-mail ou senha inválidos.".to_string(),
            ),
            AppError::InvalidToken => (
                StatusCode::UNAUTHORIZED,
                "Token de autenticação inválido ou ausente.".to_string(),
            ),

            // Todos os outros erros viram 500. O `tracing` registra a mensagem detalhada.
            ref e => {
                tracing::error!("Erro Interno do Servidor: {}", e);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Ocorreu um erro inesperado.".to_string(),
                )
            }
        };

        let body = Json(json!({ "error": error_message }));
        (status, body).into_response()
    }
}
