//! Account management. Listing, updating and deactivation are staff
//! operations; a user may always read and edit their own account.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::{Extension, Json};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::api::error::ApiError;
use crate::api::types::ApiContext;
use crate::auth::{self, TAMANHO_MINIMO_SENHA};
use crate::authorization::{exigir, Acao, UsuarioAutenticado};
use crate::db::repository;
use crate::models::enums::Perfil;
use crate::models::Usuario;

use super::{obrigatorio, parse_id};

#[derive(Debug, Serialize)]
pub struct UsuarioMutationResponse {
    pub message: String,
    pub usuario: Usuario,
}

#[derive(Debug, Deserialize)]
pub struct CriarUsuarioRequest {
    pub nome: Option<String>,
    pub email: Option<String>,
    pub senha: Option<String>,
    pub perfil: Option<Perfil>,
}

/// Staff-created account. Unlike self-registration this may set any
/// perfil directly.
pub async fn criar(
    State(ctx): State<ApiContext>,
    Extension(sujeito): Extension<UsuarioAutenticado>,
    Json(payload): Json<CriarUsuarioRequest>,
) -> Result<(StatusCode, Json<UsuarioMutationResponse>), ApiError> {
    exigir(Some(&sujeito), Acao::GerirUsuarios)?;

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
        perfil: payload.perfil.unwrap_or(Perfil::Paciente),
        ativo: true,
        criado_em: agora,
        atualizado_em: agora,
    };
    repository::inserir_usuario(&conn, &usuario)?;

    tracing::info!(usuario = %usuario.id, por = %sujeito.id, "usuario criado");

    Ok((
        StatusCode::CREATED,
        Json(UsuarioMutationResponse {
            message: "Usuário criado com sucesso".into(),
            usuario,
        }),
    ))
}

pub async fn listar(
    State(ctx): State<ApiContext>,
    Extension(sujeito): Extension<UsuarioAutenticado>,
) -> Result<Json<Vec<Usuario>>, ApiError> {
    exigir(Some(&sujeito), Acao::GerirUsuarios)?;

    let conn = ctx.conn()?;
    Ok(Json(repository::listar_usuarios(&conn)?))
}

pub async fn buscar(
    State(ctx): State<ApiContext>,
    Extension(sujeito): Extension<UsuarioAutenticado>,
    Path(id): Path<String>,
) -> Result<Json<Usuario>, ApiError> {
    let id = parse_id(&id)?;
    if id != sujeito.id {
        exigir(Some(&sujeito), Acao::GerirUsuarios)?;
    }

    let conn = ctx.conn()?;
    let usuario = repository::buscar_usuario(&conn, &id)?
        .ok_or_else(|| ApiError::NotFound("Usuário não encontrado".into()))?;
    Ok(Json(usuario))
}

#[derive(Debug, Deserialize)]
pub struct AtualizarUsuarioRequest {
    pub nome: Option<String>,
    pub email: Option<String>,
    pub senha: Option<String>,
    pub perfil: Option<Perfil>,
    pub ativo: Option<bool>,
}

pub async fn atualizar(
    State(ctx): State<ApiContext>,
    Extension(sujeito): Extension<UsuarioAutenticado>,
    Path(id): Path<String>,
    Json(payload): Json<AtualizarUsuarioRequest>,
) -> Result<Json<UsuarioMutationResponse>, ApiError> {
    let id = parse_id(&id)?;
    if id != sujeito.id {
        exigir(Some(&sujeito), Acao::GerirUsuarios)?;
    }
    // Role and activation changes are staff-only even on one's own
    // account.
    if payload.perfil.is_some() || payload.ativo.is_some() {
        exigir(Some(&sujeito), Acao::GerirUsuarios)?;
    }

    let conn = ctx.conn()?;
    let mut usuario = repository::buscar_usuario(&conn, &id)?
        .ok_or_else(|| ApiError::NotFound("Usuário não encontrado".into()))?;

    if let Some(nome) = payload.nome {
        let nome = nome.trim().to_string();
        if nome.is_empty() {
            return Err(ApiError::Validation("Nome não pode ser vazio".into()));
        }
        usuario.nome = nome;
    }
    if let Some(email) = payload.email {
        let email = email.trim().to_lowercase();
        if email.is_empty() || !email.contains('@') {
            return Err(ApiError::Validation("Email inválido".into()));
        }
        if email != usuario.email
            && repository::buscar_usuario_por_email(&conn, &email)?.is_some()
        {
            return Err(ApiError::Conflict("Email já cadastrado".into()));
        }
        usuario.email = email;
    }
    if let Some(senha) = payload.senha {
        if senha.chars().count() < TAMANHO_MINIMO_SENHA {
            return Err(ApiError::Validation(format!(
                "A senha deve ter pelo menos {TAMANHO_MINIMO_SENHA} caracteres"
            )));
        }
        usuario.senha_hash = auth::hash_senha(&senha)?;
    }
    if let Some(perfil) = payload.perfil {
        usuario.perfil = perfil;
    }
    if let Some(ativo) = payload.ativo {
        usuario.ativo = ativo;
    }

    usuario.atualizado_em = chrono::Utc::now().naive_utc();
    repository::atualizar_usuario(&conn, &usuario)?;

    Ok(Json(UsuarioMutationResponse {
        message: "Usuário atualizado com sucesso".into(),
        usuario,
    }))
}

/// Soft delete. The account row stays so historical records keep their
/// party references; login and refresh stop working immediately.
pub async fn remover(
    State(ctx): State<ApiContext>,
    Extension(sujeito): Extension<UsuarioAutenticado>,
    Path(id): Path<String>,
) -> Result<Json<UsuarioMutationResponse>, ApiError> {
    exigir(Some(&sujeito), Acao::GerirUsuarios)?;
    let id = parse_id(&id)?;

    let conn = ctx.conn()?;
    let mut usuario = repository::buscar_usuario(&conn, &id)?
        .ok_or_else(|| ApiError::NotFound("Usuário não encontrado".into()))?;

    let agora = chrono::Utc::now().naive_utc();
    repository::desativar_usuario(&conn, &id, agora)?;
    usuario.ativo = false;
    usuario.atualizado_em = agora;

    tracing::info!(usuario = %id, por = %sujeito.id, "usuario desativado");

    Ok(Json(UsuarioMutationResponse {
        message: "Usuário desativado com sucesso".into(),
        usuario,
    }))
}
