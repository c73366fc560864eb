use std::str::FromStr;

use chrono::NaiveDateTime;
use rusqlite::{params, Connection, OptionalExtension};
use uuid::Uuid;

use crate::db::DatabaseError;
use crate::models::enums::Perfil;
use crate::models::Usuario;

const COLUNAS: &str = "id, nome, email, senha_hash, perfil, ativo, criado_em, atualizado_em";

pub fn inserir_usuario(conn: &Connection, usuario: &Usuario) -> Result<(), DatabaseError> {
    conn.execute(
        "INSERT INTO usuarios (id, nome, email, senha_hash, perfil, ativo, criado_em, atualizado_em)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
        params![
            usuario.id.to_string(),
            usuario.nome,
            usuario.email,
            usuario.senha_hash,
            usuario.perfil.as_str(),
            usuario.ativo,
            usuario.criado_em,
            usuario.atualizado_em,
        ],
    )?;
    Ok(())
}

pub fn buscar_usuario(conn: &Connection, id: &Uuid) -> Result<Option<Usuario>, DatabaseError> {
    let row = conn
        .query_row(
            &format!("SELECT {COLUNAS} FROM usuarios WHERE id = ?1"),
            params![id.to_string()],
            |row| usuario_row_from_rusqlite(row),
        )
        .optional()?;
    row.map(usuario_from_row).transpose()
}

pub fn buscar_usuario_por_email(
    conn: &Connection,
    email: &str,
) -> Result<Option<Usuario>, DatabaseError> {
    let row = conn
        .query_row(
            &format!("SELECT {COLUNAS} FROM usuarios WHERE email = ?1"),
            params![email],
            |row| usuario_row_from_rusqlite(row),
        )
        .optional()?;
    row.map(usuario_from_row).transpose()
}

pub fn listar_usuarios(conn: &Connection) -> Result<Vec<Usuario>, DatabaseError> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {COLUNAS} FROM usuarios ORDER BY criado_em DESC"
    ))?;

    let rows = stmt.query_map([], |row| usuario_row_from_rusqlite(row))?;

    let mut usuarios = Vec::new();
    for row in rows {
        usuarios.push(usuario_from_row(row?)?);
    }
    Ok(usuarios)
}

/// Full-row update. Callers merge the changed fields into the fetched
/// row and bump `atualizado_em` before calling.
pub fn atualizar_usuario(conn: &Connection, usuario: &Usuario) -> Result<(), DatabaseError> {
    conn.execute(
        "UPDATE usuarios SET nome = ?2, email = ?3, senha_hash = ?4, perfil = ?5,
         ativo = ?6, atualizado_em = ?7 WHERE id = ?1",
        params![
            usuario.id.to_string(),
            usuario.nome,
            usuario.email,
            usuario.senha_hash,
            usuario.perfil.as_str(),
            usuario.ativo,
            usuario.atualizado_em,
        ],
    )?;
    Ok(())
}

/// Soft delete: clears `ativo` only, the row stays.
pub fn desativar_usuario(
    conn: &Connection,
    id: &Uuid,
    agora: NaiveDateTime,
) -> Result<(), DatabaseError> {
    conn.execute(
        "UPDATE usuarios SET ativo = 0, atualizado_em = ?2 WHERE id = ?1",
        params![id.to_string(), agora],
    )?;
    Ok(())
}

// Internal row type for Usuario mapping
struct UsuarioRow {
    id: String,
    nome: String,
    email: String,
    senha_hash: String,
    perfil: String,
    ativo: bool,
    criado_em: NaiveDateTime,
    atualizado_em: NaiveDateTime,
}

fn usuario_row_from_rusqlite(row: &rusqlite::Row<'_>) -> Result<UsuarioRow, rusqlite::Error> {
    Ok(UsuarioRow {
        id: row.get(0)?,
        nome: row.get(1)?,
        email: row.get(2)?,
        senha_hash: row.get(3)?,
        perfil: row.get(4)?,
        ativo: row.get(5)?,
        criado_em: row.get(6)?,
        atualizado_em: row.get(7)?,
    })
}

fn usuario_from_row(row: UsuarioRow) -> Result<Usuario, DatabaseError> {
    Ok(Usuario {
        id: Uuid::parse_str(&row.id)
            .map_err(|e| DatabaseError::ConstraintViolation(e.to_string()))?,
        nome: row.nome,
        email: row.email,
        senha_hash: row.senha_hash,
        perfil: Perfil::from_str(&row.perfil)?,
        ativo: row.ativo,
        criado_em: row.criado_em,
        atualizado_em: row.atualizado_em,
    })
}
