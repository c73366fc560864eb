//! API error types with structured JSON responses.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;

use crate::authorization::AcessoNegado;
use crate::db::DatabaseError;

/// Structured error response body.
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub error: ErrorDetail,
}

#[derive(Debug, Serialize)]
pub struct ErrorDetail {
    pub code: &'static str,
    pub message: String,
}

/// API-level errors with HTTP status mapping.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("Validation failed: {0}")]
    Validation(String),
    #[error("Missing credential")]
    MissingToken,
    #[error("Invalid or expired credential")]
    InvalidToken,
    #[error("Invalid credentials")]
    InvalidCredentials,
    #[error("Unauthenticated")]
    Unauthenticated,
    #[error("Forbidden: {0}")]
    Forbidden(String),
    #[error("Not found: {0}")]
    NotFound(String),
    #[error("Conflict: {0}")]
    Conflict(String),
    #[error("Slot unavailable")]
    SlotUnavailable,
    #[error("Internal error: {0}")]
    Internal(String),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, code, message) = match &self {
            ApiError::Validation(detail) => {
                (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", detail.clone())
            }
            ApiError::MissingToken => (
                StatusCode::UNAUTHORIZED,
                "AUTH_MISSING_TOKEN",
                "Token de autenticação não fornecido".to_string(),
            ),
            ApiError::InvalidToken => (
                StatusCode::UNAUTHORIZED,
                "AUTH_INVALID_TOKEN",
                "Token inválido ou expirado".to_string(),
            ),
            ApiError::InvalidCredentials => (
                StatusCode::UNAUTHORIZED,
                "AUTH_INVALID_CREDENTIALS",
                "Email ou senha inválidos".to_string(),
            ),
            ApiError::Unauthenticated => (
                StatusCode::UNAUTHORIZED,
                "AUTH_FORBIDDEN",
                "Usuário não autenticado".to_string(),
            ),
            ApiError::Forbidden(detail) => {
                (StatusCode::FORBIDDEN, "AUTH_FORBIDDEN", detail.clone())
            }
            ApiError::NotFound(detail) => {
                (StatusCode::NOT_FOUND, "RESOURCE_NOT_FOUND", detail.clone())
            }
            ApiError::Conflict(detail) => {
                (StatusCode::CONFLICT, "RESOURCE_CONFLICT", detail.clone())
            }
            ApiError::SlotUnavailable => (
                StatusCode::CONFLICT,
                "SLOT_UNAVAILABLE",
                "Horário indisponível".to_string(),
            ),
            ApiError::Internal(detail) => {
                tracing::error!(%detail, "API internal error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "INTERNAL_SERVER_ERROR",
                    "Ocorreu um erro interno no servidor".to_string(),
                )
            }
        };

        let body = ErrorBody {
            error: ErrorDetail { code, message },
        };

        (status, Json(body)).into_response()
    }
}

/// Catch-all boundary for uncaught storage failures: unique-constraint
/// violations become RESOURCE_CONFLICT, storage-level not-found becomes
/// RESOURCE_NOT_FOUND, everything else is INTERNAL_SERVER_ERROR.
impl From<DatabaseError> for ApiError {
    fn from(err: DatabaseError) -> Self {
        if err.is_unique_violation() {
            return ApiError::Conflict("Um registro com estes dados já existe".into());
        }
        match err {
            DatabaseError::NotFound { entity_type, id } => {
                ApiError::NotFound(format!("{entity_type} {id} não encontrado"))
            }
            other => ApiError::Internal(other.to_string()),
        }
    }
}

impl From<AcessoNegado> for ApiError {
    fn from(err: AcessoNegado) -> Self {
        match err {
            AcessoNegado::NaoAutenticado => ApiError::Unauthenticated,
            AcessoNegado::Proibido(detail) => ApiError::Forbidden(detail),
        }
    }
}

impl From<crate::agenda::AgendaError> for ApiError {
    fn from(err: crate::agenda::AgendaError) -> Self {
        ApiError::Validation(err.to_string())
    }
}

impl From<crate::auth::PasswordError> for ApiError {
    fn from(err: crate::auth::PasswordError) -> Self {
        ApiError::Internal(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::to_bytes;

    async fn body_json(response: Response) -> serde_json::Value {
        let body = to_bytes(response.into_body(), 1024).await.unwrap();
        serde_json::from_slice(&body).unwrap()
    }

    #[tokio::test]
    async fn validation_returns_400() {
        let response = ApiError::Validation("Campos obrigatórios ausentes".into()).into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let json = body_json(response).await;
        assert_eq!(json["error"]["code"], "VALIDATION_ERROR");
    }

    #[tokio::test]
    async fn missing_token_returns_401() {
        let response = ApiError::MissingToken.into_response();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        let json = body_json(response).await;
        assert_eq!(json["error"]["code"], "AUTH_MISSING_TOKEN");
    }

    #[tokio::test]
    async fn unauthenticated_is_401_forbidden_code() {
        let response = ApiError::Unauthenticated.into_response();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        let json = body_json(response).await;
        assert_eq!(json["error"]["code"], "AUTH_FORBIDDEN");
    }

    #[tokio::test]
    async fn forbidden_returns_403() {
        let response = ApiError::Forbidden("Acesso negado".into()).into_response();
        assert_eq!(response.status(), StatusCode::FORBIDDEN);
        let json = body_json(response).await;
        assert_eq!(json["error"]["code"], "AUTH_FORBIDDEN");
    }

    #[tokio::test]
    async fn slot_unavailable_returns_409() {
        let response = ApiError::SlotUnavailable.into_response();
        assert_eq!(response.status(), StatusCode::CONFLICT);
        let json = body_json(response).await;
        assert_eq!(json["error"]["code"], "SLOT_UNAVAILABLE");
        assert_eq!(json["error"]["message"], "Horário indisponível");
    }

    #[tokio::test]
    async fn internal_hides_detail_from_client() {
        let response = ApiError::Internal("db exploded".into()).into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let json = body_json(response).await;
        assert_eq!(json["error"]["code"], "INTERNAL_SERVER_ERROR");
        assert!(!json["error"]["message"]
            .as_str()
            .unwrap()
            .contains("exploded"));
    }

    #[test]
    fn unique_violation_maps_to_conflict() {
        let err = DatabaseError::ConstraintViolation("UNIQUE usuarios.email".into());
        assert!(matches!(ApiError::from(err), ApiError::Conflict(_)));
    }

    #[test]
    fn db_not_found_maps_to_not_found() {
        let err = DatabaseError::NotFound {
            entity_type: "usuario".into(),
            id: "abc".into(),
        };
        assert!(matches!(ApiError::from(err), ApiError::NotFound(_)));
    }

    #[test]
    fn access_denied_maps_to_401_or_403() {
        assert!(matches!(
            ApiError::from(AcessoNegado::NaoAutenticado),
            ApiError::Unauthenticated
        ));
        assert!(matches!(
            ApiError::from(AcessoNegado::Proibido("x".into())),
            ApiError::Forbidden(_)
        ));
    }
}
