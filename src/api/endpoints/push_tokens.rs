//! Device push-token registry. A token value is unique across the
//! system; re-registering an existing token moves it to the caller.

use std::str::FromStr;

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::{Extension, Json};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::api::error::ApiError;
use crate::api::types::ApiContext;
use crate::authorization::{exigir, Acao, UsuarioAutenticado};
use crate::db::repository;
use crate::models::enums::{Perfil, Plataforma};
use crate::models::PushToken;

use super::{obrigatorio, parse_id};

#[derive(Debug, Deserialize)]
pub struct RegistrarPushTokenRequest {
    pub token: Option<String>,
    pub plataforma: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PushTokenMutationResponse {
    pub message: String,
    pub push_token: PushToken,
}

pub async fn registrar(
    State(ctx): State<ApiContext>,
    Extension(sujeito): Extension<UsuarioAutenticado>,
    Json(payload): Json<RegistrarPushTokenRequest>,
) -> Result<(StatusCode, Json<PushTokenMutationResponse>), ApiError> {
    exigir(Some(&sujeito), Acao::RegistrarPushToken)?;

    let token = obrigatorio(payload.token, "token")?.trim().to_string();
    if token.is_empty() {
        return Err(ApiError::Validation("Campo obrigatório ausente: token".into()));
    }
    let plataforma = obrigatorio(payload.plataforma, "plataforma")?;
    let plataforma = Plataforma::from_str(plataforma.trim())
        .map_err(|_| ApiError::Validation(format!("Plataforma inválida: {plataforma}")))?;

    let conn = ctx.conn()?;
    let (status, push) = match repository::buscar_push_token_por_token(&conn, &token)? {
        Some(existente) => {
            repository::reatribuir_push_token(&conn, &token, &sujeito.id, plataforma)?;
            let push = PushToken {
                usuario_id: sujeito.id,
                plataforma,
                ativo: true,
                ..existente
            };
            (StatusCode::OK, push)
        }
        None => {
            let push = PushToken {
                id: Uuid::new_v4(),
                usuario_id: sujeito.id,
                token,
                plataforma,
                ativo: true,
            };
            repository::inserir_push_token(&conn, &push)?;
            (StatusCode::CREATED, push)
        }
    };

    tracing::info!(push_token = %push.id, usuario = %sujeito.id, "push token registrado");

    Ok((
        status,
        Json(PushTokenMutationResponse {
            message: "Token registrado com sucesso".into(),
            push_token: push,
        }),
    ))
}

#[derive(Debug, Serialize)]
pub struct RemoverPushTokenResponse {
    pub message: String,
}

/// Soft removal: only the owner or staff may deactivate a token.
pub async fn remover(
    State(ctx): State<ApiContext>,
    Extension(sujeito): Extension<UsuarioAutenticado>,
    Path(id): Path<String>,
) -> Result<Json<RemoverPushTokenResponse>, ApiError> {
    exigir(Some(&sujeito), Acao::RemoverPushToken)?;
    let id = parse_id(&id)?;

    let conn = ctx.conn()?;
    let push = repository::buscar_push_token(&conn, &id)?
        .ok_or_else(|| ApiError::NotFound("Token não encontrado".into()))?;

    let equipe = matches!(sujeito.perfil, Perfil::Admin | Perfil::Atendente);
    if push.usuario_id != sujeito.id && !equipe {
        return Err(ApiError::Forbidden("Acesso negado".into()));
    }

    repository::desativar_push_token(&conn, &id)?;

    Ok(Json(RemoverPushTokenResponse {
        message: "Token removido com sucesso".into(),
    }))
}
