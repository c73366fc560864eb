//! Signed bearer credentials.
//!
//! Wire form is `base64url(claims_json).base64url(hmac_sha256)`.
//! Access tokens carry the subject's perfil and a short TTL; refresh
//! tokens carry only the subject and a long TTL. Signature comparison
//! is constant-time.

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use hmac::{Hmac, Mac};
use serde::{Deserialize, Serialize};
use sha2::Sha256;
use subtle::ConstantTimeEq;
use thiserror::Error;
use uuid::Uuid;

use crate::models::enums::Perfil;

type HmacSha256 = Hmac<Sha256>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TipoToken {
    #[serde(rename = "access")]
    Acesso,
    #[serde(rename = "refresh")]
    Refresh,
}

/// Token payload. `exp` is a unix timestamp in seconds.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    pub sub: Uuid,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub perfil: Option<Perfil>,
    pub exp: i64,
    pub typ: TipoToken,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum TokenError {
    #[error("Malformed token")]
    Malformado,
    #[error("Invalid signature")]
    AssinaturaInvalida,
    #[error("Token expired")]
    Expirado,
    #[error("Wrong token type")]
    TipoErrado,
}

fn assinar(payload_b64: &str, secret: &[u8]) -> Vec<u8> {
    // HMAC accepts keys of any length
    let mut mac = HmacSha256::new_from_slice(secret).expect("hmac key length");
    mac.update(payload_b64.as_bytes());
    mac.finalize().into_bytes().to_vec()
}

fn emitir(claims: &Claims, secret: &[u8]) -> String {
    let payload = serde_json::to_vec(claims).expect("claims serialize");
    let payload_b64 = URL_SAFE_NO_PAD.encode(payload);
    let sig_b64 = URL_SAFE_NO_PAD.encode(assinar(&payload_b64, secret));
    format!("{payload_b64}.{sig_b64}")
}

/// Issue a short-lived access token carrying subject + perfil.
pub fn emitir_token_acesso(sub: Uuid, perfil: Perfil, secret: &[u8], ttl_secs: i64) -> String {
    emitir(
        &Claims {
            sub,
            perfil: Some(perfil),
            exp: chrono::Utc::now().timestamp() + ttl_secs,
            typ: TipoToken::Acesso,
        },
        secret,
    )
}

/// Issue a long-lived refresh token carrying the subject only.
pub fn emitir_token_refresh(sub: Uuid, secret: &[u8], ttl_secs: i64) -> String {
    emitir(
        &Claims {
            sub,
            perfil: None,
            exp: chrono::Utc::now().timestamp() + ttl_secs,
            typ: TipoToken::Refresh,
        },
        secret,
    )
}

/// Verify signature, expiry and token type; return the claims.
pub fn verificar_token(
    token: &str,
    secret: &[u8],
    esperado: TipoToken,
) -> Result<Claims, TokenError> {
    let (payload_b64, sig_b64) = token.split_once('.').ok_or(TokenError::Malformado)?;

    let sig = URL_SAFE_NO_PAD
        .decode(sig_b64)
        .map_err(|_| TokenError::Malformado)?;
    let esperada = assinar(payload_b64, secret);
    if !bool::from(esperada.ct_eq(&sig)) {
        return Err(TokenError::AssinaturaInvalida);
    }

    let payload = URL_SAFE_NO_PAD
        .decode(payload_b64)
        .map_err(|_| TokenError::Malformado)?;
    let claims: Claims = serde_json::from_slice(&payload).map_err(|_| TokenError::Malformado)?;

    if claims.typ != esperado {
        return Err(TokenError::TipoErrado);
    }
    if claims.exp < chrono::Utc::now().timestamp() {
        return Err(TokenError::Expirado);
    }
    Ok(claims)
}
