//! Request handlers, one module per resource.

pub mod auth;
pub mod consultas;
pub mod exames;
pub mod push_tokens;
pub mod resultados;
pub mod usuarios;

use rusqlite::Connection;
use uuid::Uuid;

use crate::api::error::ApiError;
use crate::db::repository;
use crate::models::UsuarioResumo;

/// Required-field check for hand-validated payloads. Missing fields are
/// a 400, not the framework's 422.
pub(crate) fn obrigatorio<T>(campo: Option<T>, nome: &str) -> Result<T, ApiError> {
    campo.ok_or_else(|| ApiError::Validation(format!("Campo obrigatório ausente: {nome}")))
}

pub(crate) fn parse_id(valor: &str) -> Result<Uuid, ApiError> {
    Uuid::parse_str(valor.trim()).map_err(|_| ApiError::Validation("Identificador inválido".into()))
}

/// Party summary for embedding. Records always reference existing
/// usuarios, so a dangling id is a data fault, not a client error.
pub(crate) fn resumo_usuario(conn: &Connection, id: &Uuid) -> Result<UsuarioResumo, ApiError> {
    repository::buscar_usuario(conn, id)?
        .map(|u| u.resumo())
        .ok_or_else(|| ApiError::Internal(format!("usuario {id} referenciado mas ausente")))
}
