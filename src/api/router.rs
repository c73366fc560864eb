//! Route table and middleware assembly.

use axum::http::Method;
use axum::routing::{delete, get, post};
use axum::{middleware, Extension, Json, Router};
use tower_http::cors::{Any, CorsLayer};

use crate::config::{APP_NAME, APP_VERSION};

use super::endpoints::{auth, consultas, exames, push_tokens, resultados, usuarios};
use super::middleware::{audit, auth as auth_middleware};
use super::types::ApiContext;

async fn health() -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "status": "ok",
        "service": APP_NAME,
        "version": APP_VERSION,
    }))
}

/// Build the full application router. Public routes skip the auth
/// layer; everything else requires a Bearer access token.
pub fn build_router(ctx: ApiContext) -> Router {
    let publicas = Router::new()
        .route("/health", get(health))
        .route("/auth/register", post(auth::register))
        .route("/auth/login", post(auth::login))
        .route("/auth/refresh", post(auth::refresh));

    let protegidas = Router::new()
        .route("/auth/me", get(auth::me))
        .route("/consultas", post(consultas::agendar).get(consultas::listar))
        .route(
            "/consultas/:id",
            get(consultas::buscar)
                .put(consultas::atualizar)
                .delete(consultas::cancelar),
        )
        .route("/exames", post(exames::agendar).get(exames::listar))
        .route(
            "/exames/:id",
            get(exames::buscar)
                .put(exames::atualizar)
                .delete(exames::cancelar),
        )
        .route("/resultados", post(resultados::criar).get(resultados::listar))
        .route("/resultados/:id", get(resultados::buscar))
        .route("/users", get(usuarios::listar).post(usuarios::criar))
        .route(
            "/users/:id",
            get(usuarios::buscar)
                .put(usuarios::atualizar)
                .delete(usuarios::remover),
        )
        .route("/push-tokens", post(push_tokens::registrar))
        .route("/push-tokens/:id", delete(push_tokens::remover))
        // audit sits inside auth so it sees the authenticated subject
        .layer(middleware::from_fn(audit::log_access))
        .layer(middleware::from_fn(auth_middleware::require_auth));

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers(Any);

    Router::new()
        .merge(publicas)
        .merge(protegidas)
        .layer(cors)
        .with_state(ctx.clone())
        // outermost so the auth middleware can reach the context
        .layer(Extension(ctx))
}
