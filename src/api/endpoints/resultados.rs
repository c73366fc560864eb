//! Exam results. Authored by the assigned doctor or an admin; the
//! paciente/medico pair is copied from the exame, never client-supplied.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::{Extension, Json};
use rusqlite::Connection;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::api::error::ApiError;
use crate::api::types::ApiContext;
use crate::authorization::{
    escopo_de, exigir, exigir_autoria_propria, exigir_parte, Acao, UsuarioAutenticado,
};
use crate::db::repository;
use crate::models::enums::StatusAgendamento;
use crate::models::{Resultado, ResultadoDetalhado};

use super::{obrigatorio, parse_id, resumo_usuario};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CriarResultadoRequest {
    pub exame_id: Option<String>,
    pub detalhes: Option<String>,
    pub arquivo_url: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct ResultadoMutationResponse {
    pub message: String,
    pub resultado: ResultadoDetalhado,
}

fn detalhar(conn: &Connection, resultado: Resultado) -> Result<ResultadoDetalhado, ApiError> {
    let paciente = resumo_usuario(conn, &resultado.paciente_id)?;
    let medico = resumo_usuario(conn, &resultado.medico_id)?;
    Ok(ResultadoDetalhado {
        resultado,
        paciente,
        medico,
    })
}

pub async fn criar(
    State(ctx): State<ApiContext>,
    Extension(sujeito): Extension<UsuarioAutenticado>,
    Json(payload): Json<CriarResultadoRequest>,
) -> Result<(StatusCode, Json<ResultadoMutationResponse>), ApiError> {
    exigir(Some(&sujeito), Acao::CriarResultado)?;

    let exame_id = parse_id(&obrigatorio(payload.exame_id, "exameId")?)?;
    if payload.detalhes.is_none() && payload.arquivo_url.is_none() {
        return Err(ApiError::Validation(
            "Informe detalhes ou arquivoUrl".into(),
        ));
    }

    let conn = ctx.conn()?;
    let exame = repository::buscar_exame(&conn, &exame_id)?
        .ok_or_else(|| ApiError::NotFound("Exame não encontrado".into()))?;

    if exame.status == StatusAgendamento::Cancelada {
        return Err(ApiError::Conflict(
            "Exame cancelado não pode receber resultados".into(),
        ));
    }
    exigir_autoria_propria(&sujeito, exame.medico_id)?;

    let resultado = Resultado {
        id: Uuid::new_v4(),
        exame_id: exame.id,
        paciente_id: exame.paciente_id,
        medico_id: exame.medico_id,
        detalhes: payload.detalhes,
        arquivo_url: payload.arquivo_url,
        publicado_em: chrono::Utc::now().naive_utc(),
    };
    repository::inserir_resultado(&conn, &resultado)?;

    tracing::info!(resultado = %resultado.id, exame = %exame.id, "resultado publicado");

    Ok((
        StatusCode::CREATED,
        Json(ResultadoMutationResponse {
            message: "Resultado publicado com sucesso".into(),
            resultado: detalhar(&conn, resultado)?,
        }),
    ))
}

pub async fn listar(
    State(ctx): State<ApiContext>,
    Extension(sujeito): Extension<UsuarioAutenticado>,
) -> Result<Json<Vec<ResultadoDetalhado>>, ApiError> {
    exigir(Some(&sujeito), Acao::VerResultado)?;

    let conn = ctx.conn()?;
    let resultados = repository::listar_resultados(&conn, &escopo_de(&sujeito))?;

    let mut detalhados = Vec::with_capacity(resultados.len());
    for resultado in resultados {
        detalhados.push(detalhar(&conn, resultado)?);
    }
    Ok(Json(detalhados))
}

pub async fn buscar(
    State(ctx): State<ApiContext>,
    Extension(sujeito): Extension<UsuarioAutenticado>,
    Path(id): Path<String>,
) -> Result<Json<ResultadoDetalhado>, ApiError> {
    exigir(Some(&sujeito), Acao::VerResultado)?;
    let id = parse_id(&id)?;

    let conn = ctx.conn()?;
    let resultado = repository::buscar_resultado(&conn, &id)?
        .ok_or_else(|| ApiError::NotFound("Resultado não encontrado".into()))?;
    exigir_parte(&sujeito, resultado.paciente_id, resultado.medico_id)?;

    Ok(Json(detalhar(&conn, resultado)?))
}
