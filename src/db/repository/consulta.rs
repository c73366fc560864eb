use std::str::FromStr;

use chrono::{NaiveDate, NaiveDateTime};
use rusqlite::{params, Connection, OptionalExtension};
use uuid::Uuid;

use crate::authorization::Escopo;
use crate::db::DatabaseError;
use crate::models::enums::StatusAgendamento;
use crate::models::Consulta;

const COLUNAS: &str =
    "id, paciente_id, medico_id, dia, hora, data_hora, detalhes, status, criado_em, atualizado_em";

/// Insert relies on the partial unique index `idx_consultas_slot`:
/// a racing insert for an occupied slot fails as a constraint
/// violation even when the pre-check passed.
pub fn inserir_consulta(conn: &Connection, consulta: &Consulta) -> Result<(), DatabaseError> {
    conn.execute(
        "INSERT INTO consultas (id, paciente_id, medico_id, dia, hora, data_hora, detalhes,
         status, criado_em, atualizado_em)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)",
        params![
            consulta.id.to_string(),
            consulta.paciente_id.to_string(),
            consulta.medico_id.to_string(),
            consulta.dia,
            consulta.hora,
            consulta.data_hora,
            consulta.detalhes,
            consulta.status.as_str(),
            consulta.criado_em,
            consulta.atualizado_em,
        ],
    )?;
    Ok(())
}

pub fn buscar_consulta(conn: &Connection, id: &Uuid) -> Result<Option<Consulta>, DatabaseError> {
    let row = conn
        .query_row(
            &format!("SELECT {COLUNAS} FROM consultas WHERE id = ?1"),
            params![id.to_string()],
            consulta_row_from_rusqlite,
        )
        .optional()?;
    row.map(consulta_from_row).transpose()
}

pub fn listar_consultas(conn: &Connection, escopo: &Escopo) -> Result<Vec<Consulta>, DatabaseError> {
    let base = format!("SELECT {COLUNAS} FROM consultas");
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
        Some(p) => stmt.query_map(params![p], consulta_row_from_rusqlite)?,
        None => stmt.query_map([], consulta_row_from_rusqlite)?,
    };

    let mut consultas = Vec::new();
    for row in rows {
        consultas.push(consulta_from_row(row?)?);
    }
    Ok(consultas)
}

/// Exact-equality slot check over non-cancelled rows.
pub fn slot_consulta_ocupado(
    conn: &Connection,
    medico_id: &Uuid,
    data_hora: NaiveDateTime,
) -> Result<bool, DatabaseError> {
    let count: i64 = conn.query_row(
        "SELECT COUNT(*) FROM consultas
         WHERE medico_id = ?1 AND data_hora = ?2 AND status != 'CANCELADA'",
        params![medico_id.to_string(), data_hora],
        |row| row.get(0),
    )?;
    Ok(count > 0)
}

pub fn atualizar_consulta(conn: &Connection, consulta: &Consulta) -> Result<(), DatabaseError> {
    conn.execute(
        "UPDATE consultas SET detalhes = ?2, status = ?3, atualizado_em = ?4 WHERE id = ?1",
        params![
            consulta.id.to_string(),
            consulta.detalhes,
            consulta.status.as_str(),
            consulta.atualizado_em,
        ],
    )?;
    Ok(())
}

// Internal row type for Consulta mapping
struct ConsultaRow {
    id: String,
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

fn consulta_row_from_rusqlite(row: &rusqlite::Row<'_>) -> Result<ConsultaRow, rusqlite::Error> {
    Ok(ConsultaRow {
        id: row.get(0)?,
        paciente_id: row.get(1)?,
        medico_id: row.get(2)?,
        dia: row.get(3)?,
        hora: row.get(4)?,
        data_hora: row.get(5)?,
        detalhes: row.get(6)?,
        status: row.get(7)?,
        criado_em: row.get(8)?,
        atualizado_em: row.get(9)?,
    })
}

fn consulta_from_row(row: ConsultaRow) -> Result<Consulta, DatabaseError> {
    Ok(Consulta {
        id: Uuid::parse_str(&row.id)
            .map_err(|e| DatabaseError::ConstraintViolation(e.to_string()))?,
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
