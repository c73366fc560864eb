//! Bearer-token authentication middleware.
//!
//! Verifies the access token and attaches the authenticated subject to
//! the request extensions. A missing or non-Bearer Authorization header
//! is "missing token"; a present but unverifiable one is "invalid".

use axum::extract::Request;
use axum::http::header::AUTHORIZATION;
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};

use crate::api::error::ApiError;
use crate::api::types::ApiContext;
use crate::auth::{verificar_token, TipoToken};
use crate::authorization::UsuarioAutenticado;

pub async fn require_auth(request: Request, next: Next) -> Response {
    match authenticate(request, next).await {
        Ok(response) => response,
        Err(err) => err.into_response(),
    }
}

async fn authenticate(mut request: Request, next: Next) -> Result<Response, ApiError> {
    let ctx = request
        .extensions()
        .get::<ApiContext>()
        .cloned()
        .ok_or_else(|| ApiError::Internal("ApiContext missing from request extensions".into()))?;

    let header = request
        .headers()
        .get(AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .ok_or(ApiError::MissingToken)?;

    // Present but not a two-part Bearer header is malformed, not missing
    let token = match header.split_once(' ') {
        Some((scheme, rest)) if scheme.eq_ignore_ascii_case("bearer") && !rest.trim().is_empty() => {
            rest.trim()
        }
        _ => return Err(ApiError::InvalidToken),
    };

    let claims = verificar_token(token, ctx.config.token_secret.as_bytes(), TipoToken::Acesso)
        .map_err(|err| {
            tracing::debug!(%err, "access token rejected");
            ApiError::InvalidToken
        })?;
    // Access tokens always carry a perfil; refresh tokens never reach here.
    let perfil = claims.perfil.ok_or(ApiError::InvalidToken)?;

    request.extensions_mut().insert(UsuarioAutenticado {
        id: claims.sub,
        perfil,
    });

    Ok(next.run(request).await)
}
