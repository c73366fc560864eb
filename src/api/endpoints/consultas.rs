//! Consultation scheduling.
//!
//! Booking pre-checks the slot and answers SLOT_UNAVAILABLE; the
//! partial unique index on (medico_id, data_hora) closes the remaining
//! race, surfacing as RESOURCE_CONFLICT.

use std::str::FromStr;

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::{Extension, Json};
use rusqlite::Connection;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::agenda::compor_slot;
use crate::api::error::ApiError;
use crate::api::types::ApiContext;
use crate::authorization::{
    escopo_de, exigir, exigir_agendamento_proprio, exigir_parte, Acao, UsuarioAutenticado,
};
use crate::db::repository;
use crate::models::enums::{Perfil, StatusAgendamento};
use crate::models::{Consulta, ConsultaDetalhada};

use super::{obrigatorio, parse_id, resumo_usuario};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AgendarConsultaRequest {
    pub paciente_id: Option<String>,
    pub medico_id: Option<String>,
    pub dia: Option<String>,
    pub hora: Option<String>,
    pub detalhes: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct ConsultaMutationResponse {
    pub message: String,
    pub consulta: ConsultaDetalhada,
}

fn detalhar(conn: &Connection, consulta: Consulta) -> Result<ConsultaDetalhada, ApiError> {
    let paciente = resumo_usuario(conn, &consulta.paciente_id)?;
    let medico = resumo_usuario(conn, &consulta.medico_id)?;
    Ok(ConsultaDetalhada {
        consulta,
        paciente,
        medico,
    })
}

pub async fn agendar(
    State(ctx): State<ApiContext>,
    Extension(sujeito): Extension<UsuarioAutenticado>,
    Json(payload): Json<AgendarConsultaRequest>,
) -> Result<(StatusCode, Json<ConsultaMutationResponse>), ApiError> {
    exigir(Some(&sujeito), Acao::AgendarConsulta)?;

    let paciente_id = parse_id(&obrigatorio(payload.paciente_id, "pacienteId")?)?;
    let medico_id = parse_id(&obrigatorio(payload.medico_id, "medicoId")?)?;
    let dia = obrigatorio(payload.dia, "dia")?;
    let hora = obrigatorio(payload.hora, "hora")?;
    let slot = compor_slot(&dia, &hora)?;

    exigir_agendamento_proprio(&sujeito, paciente_id)?;

    let conn = ctx.conn()?;
    let paciente = repository::buscar_usuario(&conn, &paciente_id)?
        .filter(|u| u.ativo)
        .ok_or_else(|| ApiError::Validation("Paciente inválido ou inativo".into()))?;
    let medico = repository::buscar_usuario(&conn, &medico_id)?
        .filter(|u| u.ativo && u.perfil == Perfil::Medico)
        .ok_or_else(|| ApiError::Validation("Médico inválido ou inativo".into()))?;

    if repository::slot_consulta_ocupado(&conn, &medico_id, slot.data_hora)? {
        return Err(ApiError::SlotUnavailable);
    }

    let agora = chrono::Utc::now().naive_utc();
    let consulta = Consulta {
        id: Uuid::new_v4(),
        paciente_id,
        medico_id,
        dia: slot.dia,
        hora: hora.trim().to_string(),
        data_hora: slot.data_hora,
        detalhes: payload.detalhes,
        status: StatusAgendamento::Agendada,
        criado_em: agora,
        atualizado_em: agora,
    };
    repository::inserir_consulta(&conn, &consulta)?;

    tracing::info!(consulta = %consulta.id, medico = %medico_id, "consulta agendada");

    let detalhada = ConsultaDetalhada {
        consulta,
        paciente: paciente.resumo(),
        medico: medico.resumo(),
    };
    Ok((
        StatusCode::CREATED,
        Json(ConsultaMutationResponse {
            message: "Consulta agendada com sucesso".into(),
            consulta: detalhada,
        }),
    ))
}

pub async fn listar(
    State(ctx): State<ApiContext>,
    Extension(sujeito): Extension<UsuarioAutenticado>,
) -> Result<Json<Vec<ConsultaDetalhada>>, ApiError> {
    exigir(Some(&sujeito), Acao::VerConsulta)?;

    let conn = ctx.conn()?;
    let consultas = repository::listar_consultas(&conn, &escopo_de(&sujeito))?;

    let mut detalhadas = Vec::with_capacity(consultas.len());
    for consulta in consultas {
        detalhadas.push(detalhar(&conn, consulta)?);
    }
    Ok(Json(detalhadas))
}

pub async fn buscar(
    State(ctx): State<ApiContext>,
    Extension(sujeito): Extension<UsuarioAutenticado>,
    Path(id): Path<String>,
) -> Result<Json<ConsultaDetalhada>, ApiError> {
    exigir(Some(&sujeito), Acao::VerConsulta)?;
    let id = parse_id(&id)?;

    let conn = ctx.conn()?;
    let consulta = repository::buscar_consulta(&conn, &id)?
        .ok_or_else(|| ApiError::NotFound("Consulta não encontrada".into()))?;
    exigir_parte(&sujeito, consulta.paciente_id, consulta.medico_id)?;

    Ok(Json(detalhar(&conn, consulta)?))
}

#[derive(Debug, Deserialize)]
pub struct AtualizarConsultaRequest {
    pub detalhes: Option<String>,
    pub status: Option<String>,
}

pub async fn atualizar(
    State(ctx): State<ApiContext>,
    Extension(sujeito): Extension<UsuarioAutenticado>,
    Path(id): Path<String>,
    Json(payload): Json<AtualizarConsultaRequest>,
) -> Result<Json<ConsultaMutationResponse>, ApiError> {
    exigir(Some(&sujeito), Acao::AtualizarConsulta)?;
    let id = parse_id(&id)?;

    let conn = ctx.conn()?;
    let mut consulta = repository::buscar_consulta(&conn, &id)?
        .ok_or_else(|| ApiError::NotFound("Consulta não encontrada".into()))?;
    exigir_parte(&sujeito, consulta.paciente_id, consulta.medico_id)?;

    if let Some(status) = payload.status {
        consulta.status = StatusAgendamento::from_str(&status)
            .map_err(|_| ApiError::Validation(format!("Status inválido: {status}")))?;
    }
    if let Some(detalhes) = payload.detalhes {
        consulta.detalhes = Some(detalhes);
    }
    consulta.atualizado_em = chrono::Utc::now().naive_utc();
    repository::atualizar_consulta(&conn, &consulta)?;

    Ok(Json(ConsultaMutationResponse {
        message: "Consulta atualizada com sucesso".into(),
        consulta: detalhar(&conn, consulta)?,
    }))
}

/// Soft cancel. The row stays; the slot frees up for rebooking.
pub async fn cancelar(
    State(ctx): State<ApiContext>,
    Extension(sujeito): Extension<UsuarioAutenticado>,
    Path(id): Path<String>,
) -> Result<Json<ConsultaMutationResponse>, ApiError> {
    exigir(Some(&sujeito), Acao::CancelarConsulta)?;
    let id = parse_id(&id)?;

    let conn = ctx.conn()?;
    let mut consulta = repository::buscar_consulta(&conn, &id)?
        .ok_or_else(|| ApiError::NotFound("Consulta não encontrada".into()))?;
    exigir_parte(&sujeito, consulta.paciente_id, consulta.medico_id)?;

    consulta.status = StatusAgendamento::Cancelada;
    consulta.atualizado_em = chrono::Utc::now().naive_utc();
    repository::atualizar_consulta(&conn, &consulta)?;

    tracing::info!(consulta = %consulta.id, "consulta cancelada");

    Ok(Json(ConsultaMutationResponse {
        message: "Consulta cancelada com sucesso".into(),
        consulta: detalhar(&conn, consulta)?,
    }))
}
