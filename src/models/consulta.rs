use chrono::{NaiveDate, NaiveDateTime};
use serde::Serialize;
use uuid::Uuid;

use super::enums::StatusAgendamento;
use super::usuario::UsuarioResumo;

/// A consultation appointment. `data_hora` is the derived slot instant:
/// `dia` at midnight with hour/minute overwritten from `hora`.
/// Rows are never hard-deleted; cancellation is a status transition.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Consulta {
    pub id: Uuid,
    pub paciente_id: Uuid,
    pub medico_id: Uuid,
    pub dia: NaiveDate,
    pub hora: String,
    pub data_hora: NaiveDateTime,
    pub detalhes: Option<String>,
    pub status: StatusAgendamento,
    pub criado_em: NaiveDateTime,
    pub atualizado_em: NaiveDateTime,
}

/// Consulta with both parties expanded to summaries, as returned
/// by the API.
#[derive(Debug, Clone, Serialize)]
pub struct ConsultaDetalhada {
    #[serde(flatten)]
    pub consulta: Consulta,
    pub paciente: UsuarioResumo,
    pub medico: UsuarioResumo,
}
