//! Error taxonomy of the credential core and its HTTP rendering.
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use serde_json::json;
use thiserror::Error;
use tracing::error;

use crate::auth::repo::StoreError;

pub const MSG_DUPLICATE_ACCOUNT: &str = "Usuário já registrado";
pub const MSG_ACCOUNT_NOT_FOUND: &str = "Usuário não registrado";
pub const MSG_INVALID_CREDENTIALS: &str = "Credenciais inválidas";
pub const MSG_VALIDATION_FAILED: &str = "Dados de entrada inválidos";
pub const MSG_MALFORMED_BODY: &str = "Corpo da requisição inválido";
pub const MSG_INVALID_TOKEN: &str = "Token inválido ou expirado";
pub const MSG_INTERNAL: &str = "Erro interno do servidor";

/// A single failed validation rule.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldError {
    pub field: &'static str,
    pub msg: &'static str,
}

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("{}", MSG_DUPLICATE_ACCOUNT)]
    DuplicateAccount,

    #[error("{}", MSG_ACCOUNT_NOT_FOUND)]
    AccountNotFound,

    #[error("{}", MSG_INVALID_CREDENTIALS)]
    InvalidCredentials,

    #[error("{}", MSG_VALIDATION_FAILED)]
    ValidationFailed(Vec<FieldError>),

    #[error("{}", MSG_INVALID_TOKEN)]
    InvalidToken,

    /// Store or runtime failure. Never rendered to the caller.
    #[error("internal error: {0:#}")]
    Internal(#[from] anyhow::Error),
}

pub type AuthResult<T> = Result<T, AuthError>;

impl AuthError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            AuthError::DuplicateAccount
            | AuthError::AccountNotFound
            | AuthError::InvalidCredentials
            | AuthError::ValidationFailed(_) => StatusCode::BAD_REQUEST,
            AuthError::InvalidToken => StatusCode::UNAUTHORIZED,
            AuthError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// The one message string a caller gets to see.
    pub fn public_message(&self) -> &'static str {
        match self {
            AuthError::DuplicateAccount => MSG_DUPLICATE_ACCOUNT,
            AuthError::AccountNotFound => MSG_ACCOUNT_NOT_FOUND,
            AuthError::InvalidCredentials => MSG_INVALID_CREDENTIALS,
            AuthError::ValidationFailed(_) => MSG_VALIDATION_FAILED,
            AuthError::InvalidToken => MSG_INVALID_TOKEN,
            AuthError::Internal(_) => MSG_INTERNAL,
        }
    }
}

impl From<StoreError> for AuthError {
    fn from(e: StoreError) -> Self {
        match e {
            StoreError::Duplicate(_) => AuthError::DuplicateAccount,
            StoreError::Backend(inner) => AuthError::Internal(inner),
        }
    }
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let body = match &self {
            AuthError::ValidationFailed(errors) => json!({
                "msg": self.public_message(),
                "errors": errors,
            }),
            AuthError::Internal(e) => {
                error!(error = %e, "request failed");
                json!({ "msg": self.public_message() })
            }
            _ => json!({ "msg": self.public_message() }),
        };
        (status, Json(body)).into_response()
    }
}
