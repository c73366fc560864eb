use chrono::{NaiveDate, NaiveDateTime};
use serde::Serialize;
use uuid::Uuid;

use super::enums::StatusAgendamento;
use super::resultado::Resultado;
use super::usuario::UsuarioResumo;

/// An exam order. Shares the consulta lifecycle and slot rules, but
/// slot uniqueness is scoped to exames only: an exame and a consulta
/// may occupy the same (medico, data_hora) pair.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Exame {
    pub id: Uuid,
    pub nome: String,
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

/// Exame with parties expanded, as returned by the API.
#[derive(Debug, Clone, Serialize)]
pub struct ExameDetalhado {
    #[serde(flatten)]
    pub exame: Exame,
    pub paciente: UsuarioResumo,
    pub medico: UsuarioResumo,
    /// Populated on single-record reads.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub resultados: Option<Vec<Resultado>>,
}
