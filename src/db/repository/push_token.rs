use std::str::FromStr;

use rusqlite::{params, Connection, OptionalExtension};
use uuid::Uuid;

use crate::db::DatabaseError;
use crate::models::enums::Plataforma;
use crate::models::PushToken;

const COLUNAS: &str = "id, usuario_id, token, plataforma, ativo";

pub fn inserir_push_token(conn: &Connection, push: &PushToken) -> Result<(), DatabaseError> {
    conn.execute(
        "INSERT INTO push_tokens (id, usuario_id, token, plataforma, ativo)
         VALUES (?1, ?2, ?3, ?4, ?5)",
        params![
            push.id.to_string(),
            push.usuario_id.to_string(),
            push.token,
            push.plataforma.as_str(),
            push.ativo,
        ],
    )?;
    Ok(())
}

pub fn buscar_push_token(conn: &Connection, id: &Uuid) -> Result<Option<PushToken>, DatabaseError> {
    let row = conn
        .query_row(
            &format!("SELECT {COLUNAS} FROM push_tokens WHERE id = ?1"),
            params![id.to_string()],
            push_row_from_rusqlite,
        )
        .optional()?;
    row.map(push_from_row).transpose()
}

/// Device tokens are unique; lookup drives the reassign-on-register
/// behavior.
pub fn buscar_push_token_por_token(
    conn: &Connection,
    token: &str,
) -> Result<Option<PushToken>, DatabaseError> {
    let row = conn
        .query_row(
            &format!("SELECT {COLUNAS} FROM push_tokens WHERE token = ?1"),
            params![token],
            push_row_from_rusqlite,
        )
        .optional()?;
    row.map(push_from_row).transpose()
}

/// Re-registration: the token keeps its row but switches owner,
/// platform and becomes active again.
pub fn reatribuir_push_token(
    conn: &Connection,
    token: &str,
    usuario_id: &Uuid,
    plataforma: Plataforma,
) -> Result<(), DatabaseError> {
    conn.execute(
        "UPDATE push_tokens SET usuario_id = ?2, plataforma = ?3, ativo = 1 WHERE token = ?1",
        params![token, usuario_id.to_string(), plataforma.as_str()],
    )?;
    Ok(())
}

/// Soft removal: clears `ativo` only.
pub fn desativar_push_token(conn: &Connection, id: &Uuid) -> Result<(), DatabaseError> {
    conn.execute(
        "UPDATE push_tokens SET ativo = 0 WHERE id = ?1",
        params![id.to_string()],
    )?;
    Ok(())
}

// Internal row type for PushToken mapping
struct PushRow {
    id: String,
    usuario_id: String,
    token: String,
    plataforma: String,
    ativo: bool,
}

fn push_row_from_rusqlite(row: &rusqlite::Row<'_>) -> Result<PushRow, rusqlite::Error> {
    Ok(PushRow {
        id: row.get(0)?,
        usuario_id: row.get(1)?,
        token: row.get(2)?,
        plataforma: row.get(3)?,
        ativo: row.get(4)?,
    })
}

fn push_from_row(row: PushRow) -> Result<PushToken, DatabaseError> {
    Ok(PushToken {
        id: Uuid::parse_str(&row.id)
            .map_err(|e| DatabaseError::ConstraintViolation(e.to_string()))?,
        usuario_id: Uuid::parse_str(&row.usuario_id)
            .map_err(|e| DatabaseError::ConstraintViolation(e.to_string()))?,
        token: row.token,
        plataforma: Plataforma::from_str(&row.plataforma)?,
        ativo: row.ativo,
    })
}
