use serde::Serialize;
use uuid::Uuid;

use super::enums::Plataforma;

/// A push-notification device registration. The device token maps to
/// exactly one current owner; re-registration reassigns ownership and
/// reactivates. Removal clears `ativo`, never a hard delete.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PushToken {
    pub id: Uuid,
    pub usuario_id: Uuid,
    pub token: String,
    pub plataforma: Plataforma,
    pub ativo: bool,
}
