use chrono::NaiveDateTime;
use serde::Serialize;
use uuid::Uuid;

use super::enums::Perfil;

/// An account: patient, doctor, front-desk clerk or admin.
///
/// The password hash never leaves the server: it is skipped on
/// serialization and every response path goes through serde.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Usuario {
    pub id: Uuid,
    pub nome: String,
    pub email: String,
    #[serde(skip_serializing)]
    pub senha_hash: String,
    pub perfil: Perfil,
    pub ativo: bool,
    pub criado_em: NaiveDateTime,
    pub atualizado_em: NaiveDateTime,
}

/// Party summary embedded in consulta/exame/resultado responses.
#[derive(Debug, Clone, Serialize)]
pub struct UsuarioResumo {
    pub id: Uuid,
    pub nome: String,
    pub email: String,
}

impl Usuario {
    pub fn resumo(&self) -> UsuarioResumo {
        UsuarioResumo {
            id: self.id,
            nome: self.nome.clone(),
            email: self.email.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Usuario {
        Usuario {
            id: Uuid::new_v4(),
            nome: "Ana".into(),
            email: "ana@example.com".into(),
            senha_hash: "pbkdf2-sha256$...".into(),
            perfil: Perfil::Paciente,
            ativo: true,
            criado_em: chrono::Utc::now().naive_utc(),
            atualizado_em: chrono::Utc::now().naive_utc(),
        }
    }

    #[test]
    fn senha_hash_never_serialized() {
        let json = serde_json::to_value(sample()).unwrap();
        assert!(json.get("senhaHash").is_none());
        assert!(json.get("senha_hash").is_none());
        assert_eq!(json["perfil"], "PACIENTE");
        assert_eq!(json["nome"], "Ana");
    }

    #[test]
    fn resumo_carries_identity_only() {
        let usuario = sample();
        let json = serde_json::to_value(usuario.resumo()).unwrap();
        assert_eq!(json["email"], "ana@example.com");
        assert!(json.get("perfil").is_none());
    }
}
