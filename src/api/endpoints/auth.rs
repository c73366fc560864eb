//! Registration, login, token refresh and the current-user lookup.

use axum::extract::State;
use axum::http::StatusCode;
use axum::{Extension, Json};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::api::error::ApiError;
use crate::api::types::ApiContext;
use crate::auth::{self, TipoToken, TAMANHO_MINIMO_SENHA};
use crate::authorization::UsuarioAutenticado;
use crate::db::repository;
use crate::models::enums::Perfil;
use crate::models::Usuario;

use super::obrigatorio;

/// Self-registration payload. There is deliberately no perfil field:
/// anonymous registration always yields PACIENTE, staff accounts come
/// from POST /users.
#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub nome: Option<String>,
    pub email: Option<String>,
    pub senha: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct RegisterResponse {
    pub message: String,
    pub usuario: Usuario,
}

pub async fn register(
    State(ctx): State<ApiContext>,
    Json(payload): Json<RegisterRequest>,
) -> Result<(StatusCode, Json<RegisterResponse>), ApiError> {
    let nome = obrigatorio(payload.nome, "nome")?.trim().to_string();
    let email = obrigatorio(payload.email, "email")?.trim().to_lowercase();
    let senha = obrigatorio(payload.senha, "senha")?;

    if nome.is_empty() {
        return Err(ApiError::Validation("Campo obrigatório ausente: nome".into()));
    }
    if email.is_empty() || !email.contains('@') {
        return Err(ApiError::Validation("Email inválido".into()));
    }
    if senha.chars().count() < TAMANHO_MINIMO_SENHA {
        return Err(ApiError::Validation(format!(
            "A senha deve ter pelo menos {TAMANHO_MINIMO_SENHA} caracteres"
        )));
    }

    let senha_hash = auth::hash_senha(&senha)?;

    let conn = ctx.conn()?;
    if repository::buscar_usuario_por_email(&conn, &email)?.is_some() {
        return Err(ApiError::Conflict("Email já cadastrado".into()));
    }

    let agora = chrono::Utc::now().naive_utc();
    let usuario = Usuario {
        id: Uuid::new_v4(),
        nome,
        email,
        senha_hash,
        perfil: Perfil::Paciente,
        ativo: true,
        criado_em: agora,
        atualizado_em: agora,
    };
    repository::inserir_usuario(&conn, &usuario)?;

    tracing::info!(usuario = %usuario.id, perfil = usuario.perfil.as_str(), "usuario registrado");

    Ok((
        StatusCode::CREATED,
        Json(RegisterResponse {
            message: "Usuário criado com sucesso".into(),
            usuario,
        }),
    ))
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: Option<String>,
    pub senha: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginResponse {
    pub message: String,
    pub access_token: String,
    pub refresh_token: String,
    pub usuario: Usuario,
}

pub async fn login(
    State(ctx): State<ApiContext>,
    Json(payload): Json<LoginRequest>,
) -> Result<Json<LoginResponse>, ApiError> {
    let email = obrigatorio(payload.email, "email")?.trim().to_lowercase();
    let senha = obrigatorio(payload.senha, "senha")?;

    let usuario = {
        let conn = ctx.conn()?;
        repository::buscar_usuario_por_email(&conn, &email)?
    };
    // Inactive accounts fail exactly like wrong credentials.
    let usuario = usuario
        .filter(|u| u.ativo)
        .ok_or(ApiError::InvalidCredentials)?;
    if !auth::verificar_senha(&senha, &usuario.senha_hash) {
        return Err(ApiError::InvalidCredentials);
    }

    let access_token = auth::emitir_token_acesso(
        usuario.id,
        usuario.perfil,
        ctx.config.token_secret.as_bytes(),
        ctx.config.access_ttl_secs,
    );
    let refresh_token = auth::emitir_token_refresh(
        usuario.id,
        ctx.config.refresh_secret.as_bytes(),
        ctx.config.refresh_ttl_secs,
    );

    tracing::info!(usuario = %usuario.id, "login");

    Ok(Json(LoginResponse {
        message: "Login realizado com sucesso".into(),
        access_token,
        refresh_token,
        usuario,
    }))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RefreshRequest {
    pub refresh_token: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RefreshResponse {
    pub message: String,
    pub access_token: String,
}

pub async fn refresh(
    State(ctx): State<ApiContext>,
    Json(payload): Json<RefreshRequest>,
) -> Result<Json<RefreshResponse>, ApiError> {
    let refresh_token = obrigatorio(payload.refresh_token, "refreshToken")?;

    let claims = auth::verificar_token(
        &refresh_token,
        ctx.config.refresh_secret.as_bytes(),
        TipoToken::Refresh,
    )
    .map_err(|_| ApiError::InvalidToken)?;

    // Re-read the account so a deactivation invalidates outstanding
    // refresh tokens.
    let usuario = {
        let conn = ctx.conn()?;
        repository::buscar_usuario(&conn, &claims.sub)?
    };
    let usuario = usuario.ok_or(ApiError::InvalidToken)?;
    if !usuario.ativo {
        return Err(ApiError::Forbidden("Usuário inativo".into()));
    }

    let access_token = auth::emitir_token_acesso(
        usuario.id,
        usuario.perfil,
        ctx.config.token_secret.as_bytes(),
        ctx.config.access_ttl_secs,
    );

    Ok(Json(RefreshResponse {
        message: "Token renovado com sucesso".into(),
        access_token,
    }))
}

pub async fn me(
    State(ctx): State<ApiContext>,
    Extension(sujeito): Extension<UsuarioAutenticado>,
) -> Result<Json<Usuario>, ApiError> {
    let conn = ctx.conn()?;
    let usuario = repository::buscar_usuario(&conn, &sujeito.id)?
        .ok_or_else(|| ApiError::NotFound("Usuário não encontrado".into()))?;
    Ok(Json(usuario))
}
