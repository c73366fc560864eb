use chrono::NaiveDateTime;
use rusqlite::{params, Connection, OptionalExtension};
use uuid::Uuid;

use crate::authorization::Escopo;
use crate::db::DatabaseError;
use crate::models::Resultado;

const COLUNAS: &str = "id, exame_id, paciente_id, medico_id, detalhes, arquivo_url, publicado_em";

pub fn inserir_resultado(conn: &Connection, resultado: &Resultado) -> Result<(), DatabaseError> {
    conn.execute(
        "INSERT INTO resultados (id, exame_id, paciente_id, medico_id, detalhes, arquivo_url, publicado_em)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
        params![
            resultado.id.to_string(),
            resultado.exame_id.to_string(),
            resultado.paciente_id.to_string(),
            resultado.medico_id.to_string(),
            resultado.detalhes,
            resultado.arquivo_url,
            resultado.publicado_em,
        ],
    )?;
    Ok(())
}

pub fn buscar_resultado(conn: &Connection, id: &Uuid) -> Result<Option<Resultado>, DatabaseError> {
    let row = conn
        .query_row(
            &format!("SELECT {COLUNAS} FROM resultados WHERE id = ?1"),
            params![id.to_string()],
            resultado_row_from_rusqlite,
        )
        .optional()?;
    row.map(resultado_from_row).transpose()
}

pub fn listar_resultados(
    conn: &Connection,
    escopo: &Escopo,
) -> Result<Vec<Resultado>, DatabaseError> {
    let base = format!("SELECT {COLUNAS} FROM resultados");
    let (sql, param) = match escopo {
        Escopo::Todos => (format!("{base} ORDER BY publicado_em DESC"), None),
        Escopo::DoPaciente(id) => (
            format!("{base} WHERE paciente_id = ?1 ORDER BY publicado_em DESC"),
            Some(id.to_string()),
        ),
        Escopo::DoMedico(id) => (
            format!("{base} WHERE medico_id = ?1 ORDER BY publicado_em DESC"),
            Some(id.to_string()),
        ),
    };

    let mut stmt = conn.prepare(&sql)?;
    let rows = match param {
        Some(p) => stmt.query_map(params![p], resultado_row_from_rusqlite)?,
        None => stmt.query_map([], resultado_row_from_rusqlite)?,
    };

    let mut resultados = Vec::new();
    for row in rows {
        resultados.push(resultado_from_row(row?)?);
    }
    Ok(resultados)
}

/// All resultados published for one exame, embedded in exame detail.
pub fn listar_resultados_do_exame(
    conn: &Connection,
    exame_id: &Uuid,
) -> Result<Vec<Resultado>, DatabaseError> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {COLUNAS} FROM resultados WHERE exame_id = ?1 ORDER BY publicado_em DESC"
    ))?;

    let rows = stmt.query_map(params![exame_id.to_string()], resultado_row_from_rusqlite)?;

    let mut resultados = Vec::new();
    for row in rows {
        resultados.push(resultado_from_row(row?)?);
    }
    Ok(resultados)
}

// Internal row type for Resultado mapping
struct ResultadoRow {
    id: String,
    exame_id: String,
    paciente_id: String,
    medico_id: String,
    detalhes: Option<String>,
    arquivo_url: Option<String>,
    publicado_em: NaiveDateTime,
}

fn resultado_row_from_rusqlite(row: &rusqlite::Row<'_>) -> Result<ResultadoRow, rusqlite::Error> {
    Ok(ResultadoRow {
        id: row.get(0)?,
        exame_id: row.get(1)?,
        paciente_id: row.get(2)?,
        medico_id: row.get(3)?,
        detalhes: row.get(4)?,
        arquivo_url: row.get(5)?,
        publicado_em: row.get(6)?,
    })
}

fn resultado_from_row(row: ResultadoRow) -> Result<Resultado, DatabaseError> {
    Ok(Resultado {
        id: Uuid::parse_str(&row.id)
            .map_err(|e| DatabaseError::ConstraintViolation(e.to_string()))?,
        exame_id: Uuid::parse_str(&row.exame_id)
            .map_err(|e| DatabaseError::ConstraintViolation(e.to_string()))?,
        paciente_id: Uuid::parse_str(&row.paciente_id)
            .map_err(|e| DatabaseError::ConstraintViolation(e.to_string()))?,
        medico_id: Uuid::parse_str(&row.medico_id)
            .map_err(|e| DatabaseError::ConstraintViolation(e.to_string()))?,
        detalhes: row.detalhes,
        arquivo_url: row.arquivo_url,
        publicado_em: row.publicado_em,
    })
}
