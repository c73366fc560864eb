use chrono::NaiveDateTime;
use serde::Serialize;
use uuid::Uuid;

use super::usuario::UsuarioResumo;

/// A published exam result. Authored by the assigned doctor (or an
/// admin); visible only to the involved patient, the involved doctor,
/// or staff/admin.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Resultado {
    pub id: Uuid,
    pub exame_id: Uuid,
    pub paciente_id: Uuid,
    pub medico_id: Uuid,
    pub detalhes: Option<String>,
    pub arquivo_url: Option<String>,
    pub publicado_em: NaiveDateTime,
}

/// Resultado with parties expanded, as returned by the API.
#[derive(Debug, Clone, Serialize)]
pub struct ResultadoDetalhado {
    #[serde(flatten)]
    pub resultado: Resultado,
    pub paciente: UsuarioResumo,
    pub medico: UsuarioResumo,
}
