use std::str::FromStr;

use chrono::{NaiveDate, NaiveDateTime};
use rusqlite::{params, Connection, OptionalExtension};
use uuid::Uuid;

use crate::authorization::Escopo;
use crate::db::DatabaseError;
use crate::models::enums::StatusAgendamento;
use crate::models::Exame;

const COLUNAS: &str = "id, nome, paciente_id, medico_id, dia, hora, data_hora, detalhes, status, criado_em, atualizado_em";

/// Insert relies on the partial unique index `idx_exames_slot` as the
/// race backstop, same contract as consultas but scoped to exames.
pub fn inserir_exame(conn: &Connection, exame: &Exame) -> Result<(), DatabaseError> {
    conn.execute(
        "INSERT INTO exames (id, nome, paciente_id, medico_id, dia, hora, data_hora, detalhes,
         status, criado_em, atualizado_em)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)",
        params![
            exame.id.to_string(),
            exame.nome,
            exame.paciente_id.to_string(),
            exame.medico_id.to_string(),
            exame.dia,
            exame.hora,
            exame.data_hora,
            exame.detalhes,
            exame.status.as_str(),
            exame.criado_em,
            exame.atualizado_em,
        ],
    )?;
    Ok(())
}

pub fn buscar_exame(conn: &Connection, id: &Uuid) -> Result<Option<Exame>, DatabaseError> {
    let row = conn
        .query_row(
            &format!("SELECT {COLUNAS} FROM exames WHERE id = ?1"),
            params![id.to_string()],
            exame_row_from_rusqlite,
        )
        .optional()?;
    row.map(exame_from_row).transpose()
}

pub fn listar_exames(conn: &Connection, escopo: &Escopo) -> Result<Vec<Exame>, DatabaseError> {
    let base = format!("SELECT {COLUNAS} FROM exames");
    let (sql, param) = match escopo {
        Escopo::Todos => (format!("{base} ORDER BY data_hora ASC"), None),
        Escopo::DoPaciente(id) => (
            format!("{base} WHERE paciente_id = ?1 ORDER BY data_hora ASC"),
            Some(id.to_string()),
        ),
        Escopo::DoMedico(id) => (
            format!("{base} WHERE medico_id = ?1 ORDER BY data_hora ASC"),
            Some(id.to_string()),
        ),
    };

    let mut stmt = conn.prepare(&sql)?;
    let rows = match param {
        Some(p) => stmt.query_map(params![p], exame_row_from_rusqlite)?,
        None => stmt.query_map([], exame_row_from_rusqlite)?,
    };

    let mut exames = Vec::new();
    for row in rows {
        exames.push(exame_from_row(row?)?);
    }
    Ok(exames)
}

/// Exact-equality slot check over non-cancelled exames.
pub fn slot_exame_ocupado(
    conn: &Connection,
    medico_id: &Uuid,
    data_hora: NaiveDateTime,
) -> Result<bool, DatabaseError> {
    let count: i64 = conn.query_row(
        "SELECT COUNT(*) FROM exames
         WHERE medico_id = ?1 AND data_hora = ?2 AND status != 'CANCELADA'",
        params![medico_id.to_string(), data_hora],
        |row| row.get(0),
    )?;
    Ok(count > 0)
}

pub fn atualizar_exame(conn: &Connection, exame: &Exame) -> Result<(), DatabaseError> {
    conn.execute(
        "UPDATE exames SET detalhes = ?2, status = ?3, atualizado_em = ?4 WHERE id = ?1",
        params![
            exame.id.to_string(),
            exame.detalhes,
            exame.status.as_str(),
            exame.atualizado_em,
        ],
    )?;
    Ok(())
}

// Internal row type for Exame mapping
struct ExameRow {
    id: String,
    nome: String,
    paciente_id: String,
    medico_id: String,
    dia: NaiveDate,
    hora: String,
    data_hora: NaiveDateTime,
    detalhes: Option<String>,
    status: String,
    criado_em: NaiveDateTime,
    atualizado_em: NaiveDateTime,
}

fn exame_row_from_rusqlite(row: &rusqlite::Row<'_>) -> Result<ExameRow, rusqlite::Error> {
    Ok(ExameRow {
        id: row.get(0)?,
        nome: row.get(1)?,
        paciente_id: row.get(2)?,
        medico_id: row.get(3)?,
        dia: row.get(4)?,
        hora: row.get(5)?,
        data_hora: row.get(6)?,
        detalhes: row.get(7)?,
        status: row.get(8)?,
        criado_em: row.get(9)?,
        atualizado_em: row.get(10)?,
    })
}

fn exame_from_row(row: ExameRow) -> Result<Exame, DatabaseError> {
    Ok(Exame {
        id: Uuid::parse_str(&row.id)
            .map_err(|e| DatabaseError::ConstraintViolation(e.to_string()))?,
        nome: row.nome,
        paciente_id: Uuid::parse_str(&row.paciente_id)
            .map_err(|e| DatabaseError::ConstraintViolation(e.to_string()))?,
        medico_id: Uuid::parse_str(&row.medico_id)
            .map_err(|e| DatabaseError::ConstraintViolation(e.to_string()))?,
        dia: row.dia,
        hora: row.hora,
        data_hora: row.data_hora,
        detalhes: row.detalhes,
        status: StatusAgendamento::from_str(&row.status)?,
        criado_em: row.criado_em,
        atualizado_em: row.atualizado_em,
    })
}
