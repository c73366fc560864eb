//! Exam-order scheduling. Same lifecycle as consultas, with the slot
//! uniqueness scoped to exames and resultados embedded on detail reads.

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
use crate::models::{Exame, ExameDetalhado};

use super::{obrigatorio, parse_id, resumo_usuario};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AgendarExameRequest {
    pub nome: Option<String>,
    pub paciente_id: Option<String>,
    pub medico_id: Option<String>,
    pub dia: Option<String>,
    pub hora: Option<String>,
    pub detalhes: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct ExameMutationResponse {
    pub message: String,
    pub exame: ExameDetalhado,
}

fn detalhar(
    conn: &Connection,
    exame: Exame,
    com_resultados: bool,
) -> Result<ExameDetalhado, ApiError> {
    let paciente = resumo_usuario(conn, &exame.paciente_id)?;
    let medico = resumo_usuario(conn, &exame.medico_id)?;
    let resultados = if com_resultados {
        Some(repository::listar_resultados_do_exame(conn, &exame.id)?)
    } else {
        None
    };
    Ok(ExameDetalhado {
        exame,
        paciente,
        medico,
        resultados,
    })
}

pub async fn agendar(
    State(ctx): State<ApiContext>,
    Extension(sujeito): Extension<UsuarioAutenticado>,
    Json(payload): Json<AgendarExameRequest>,
) -> Result<(StatusCode, Json<ExameMutationResponse>), ApiError> {
    exigir(Some(&sujeito), Acao::AgendarExame)?;

    let nome = obrigatorio(payload.nome, "nome")?.trim().to_string();
    if nome.is_empty() {
        return Err(ApiError::Validation("Campo obrigatório ausente: nome".into()));
    }
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

    if repository::slot_exame_ocupado(&conn, &medico_id, slot.data_hora)? {
        return Err(ApiError::SlotUnavailable);
    }

    let agora = chrono::Utc::now().naive_utc();
    let exame = Exame {
        id: Uuid::new_v4(),
        nome,
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
    repository::inserir_exame(&conn, &exame)?;

    tracing::info!(exame = %exame.id, medico = %medico_id, "exame agendado");

    let detalhado = ExameDetalhado {
        exame,
        paciente: paciente.resumo(),
        medico: medico.resumo(),
        resultados: None,
    };
    Ok((
        StatusCode::CREATED,
        Json(ExameMutationResponse {
            message: "Exame agendado com sucesso".into(),
            exame: detalhado,
        }),
    ))
}

pub async fn listar(
    State(ctx): State<ApiContext>,
    Extension(sujeito): Extension<UsuarioAutenticado>,
) -> Result<Json<Vec<ExameDetalhado>>, ApiError> {
    exigir(Some(&sujeito), Acao::VerExame)?;

    let conn = ctx.conn()?;
    let exames = repository::listar_exames(&conn, &escopo_de(&sujeito))?;

    let mut detalhados = Vec::with_capacity(exames.len());
    for exame in exames {
        detalhados.push(detalhar(&conn, exame, false)?);
    }
    Ok(Json(detalhados))
}

pub async fn buscar(
    State(ctx): State<ApiContext>,
    Extension(sujeito): Extension<UsuarioAutenticado>,
    Path(id): Path<String>,
) -> Result<Json<ExameDetalhado>, ApiError> {
    exigir(Some(&sujeito), Acao::VerExame)?;
    let id = parse_id(&id)?;

    let conn = ctx.conn()?;
    let exame = repository::buscar_exame(&conn, &id)?
        .ok_or_else(|| ApiError::NotFound("Exame não encontrado".into()))?;
    exigir_parte(&sujeito, exame.paciente_id, exame.medico_id)?;

    Ok(Json(detalhar(&conn, exame, true)?))
}

#[derive(Debug, Deserialize)]
pub struct AtualizarExameRequest {
    pub detalhes: Option<String>,
    pub status: Option<String>,
}

pub async fn atualizar(
    State(ctx): State<ApiContext>,
    Extension(sujeito): Extension<UsuarioAutenticado>,
    Path(id): Path<String>,
    Json(payload): Json<AtualizarExameRequest>,
) -> Result<Json<ExameMutationResponse>, ApiError> {
    exigir(Some(&sujeito), Acao::AtualizarExame)?;
    let id = parse_id(&id)?;

    let conn = ctx.conn()?;
    let mut exame = repository::buscar_exame(&conn, &id)?
        .ok_or_else(|| ApiError::NotFound("Exame não encontrado".into()))?;
    exigir_parte(&sujeito, exame.paciente_id, exame.medico_id)?;

    if let Some(status) = payload.status {
        exame.status = StatusAgendamento::from_str(&status)
            .map_err(|_| ApiError::Validation(format!("Status inválido: {status}")))?;
    }
    if let Some(detalhes) = payload.detalhes {
        exame.detalhes = Some(detalhes);
    }
    exame.atualizado_em = chrono::Utc::now().naive_utc();
    repository::atualizar_exame(&conn, &exame)?;

    Ok(Json(ExameMutationResponse {
        message: "Exame atualizado com sucesso".into(),
        exame: detalhar(&conn, exame, false)?,
    }))
}

/// Soft cancel, mirroring consultas.
pub async fn cancelar(
    State(ctx): State<ApiContext>,
    Extension(sujeito): Extension<UsuarioAutenticado>,
    Path(id): Path<String>,
) -> Result<Json<ExameMutationResponse>, ApiError> {
    exigir(Some(&sujeito), Acao::CancelarExame)?;
    let id = parse_id(&id)?;

    let conn = ctx.conn()?;
    let mut exame = repository::buscar_exame(&conn, &id)?
        .ok_or_else(|| ApiError::NotFound("Exame não encontrado".into()))?;
    exigir_parte(&sujeito, exame.paciente_id, exame.medico_id)?;

    exame.status = StatusAgendamento::Cancelada;
    exame.atualizado_em = chrono::Utc::now().naive_utc();
    repository::atualizar_exame(&conn, &exame)?;

    tracing::info!(exame = %exame.id, "exame cancelado");

    Ok(Json(ExameMutationResponse {
        message: "Exame cancelado com sucesso".into(),
        exame: detalhar(&conn, exame, false)?,
    }))
}
