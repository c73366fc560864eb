//! Access logging middleware. Runs inside the auth layer so the
//! authenticated subject is already attached when present.

use std::time::Instant;

use axum::extract::Request;
use axum::middleware::Next;
use axum::response::Response;

use crate::authorization::UsuarioAutenticado;

pub async fn log_access(request: Request, next: Next) -> Response {
    let method = request.method().clone();
    let path = request.uri().path().to_string();
    let sujeito = request
        .extensions()
        .get::<UsuarioAutenticado>()
        .map(|u| u.id.to_string());

    let inicio = Instant::now();
    let response = next.run(request).await;
    let elapsed_ms = inicio.elapsed().as_millis() as u64;

    tracing::info!(
        %method,
        %path,
        status = response.status().as_u16(),
        elapsed_ms,
        usuario = sujeito.as_deref().unwrap_or("-"),
        "request"
    );

    response
}
