//! Authorization policy: role allow-lists + ownership predicates.
//!
//! Every operation is keyed by an [`Acao`]; each acao carries a fixed
//! set of permitted roles. Ownership is a second, per-record layer:
//! patients see and touch only records where they are the paciente,
//! doctors only records where they are the medico, staff/admin see
//! all. Default-deny, checked in order: authenticated → role → owner.

use uuid::Uuid;

use crate::models::enums::Perfil;

/// Authenticated subject, extracted from the access token by the
/// auth middleware and attached to the request.
#[derive(Debug, Clone)]
pub struct UsuarioAutenticado {
    pub id: Uuid,
    pub perfil: Perfil,
}

/// Operations gated by role.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Acao {
    AgendarConsulta,
    VerConsulta,
    AtualizarConsulta,
    CancelarConsulta,
    AgendarExame,
    VerExame,
    AtualizarExame,
    CancelarExame,
    CriarResultado,
    VerResultado,
    GerirUsuarios,
    RegistrarPushToken,
    RemoverPushToken,
}

const TODOS: &[Perfil] = &[
    Perfil::Admin,
    Perfil::Paciente,
    Perfil::Atendente,
    Perfil::Medico,
];
const EQUIPE: &[Perfil] = &[Perfil::Admin, Perfil::Atendente];
const AUTORES_RESULTADO: &[Perfil] = &[Perfil::Admin, Perfil::Medico];

impl Acao {
    /// Fixed role allow-list for this operation.
    pub fn perfis_permitidos(self) -> &'static [Perfil] {
        match self {
            Acao::GerirUsuarios => EQUIPE,
            Acao::CriarResultado => AUTORES_RESULTADO,
            _ => TODOS,
        }
    }
}

/// Denial outcome of a policy check.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AcessoNegado {
    #[error("Usuário não autenticado")]
    NaoAutenticado,
    #[error("{0}")]
    Proibido(String),
}

/// Role gate: subject's role must be in the acao's allow-list.
///
/// A missing subject is "unauthenticated", never "forbidden"; the
/// distinction maps to 401 vs 403 at the HTTP boundary.
pub fn exigir(sujeito: Option<&UsuarioAutenticado>, acao: Acao) -> Result<(), AcessoNegado> {
    let sujeito = sujeito.ok_or(AcessoNegado::NaoAutenticado)?;
    if acao.perfis_permitidos().contains(&sujeito.perfil) {
        Ok(())
    } else {
        Err(AcessoNegado::Proibido(
            "Você não tem permissão para acessar este recurso".into(),
        ))
    }
}

/// Visibility scope for list queries, derived from the caller's role.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Escopo {
    Todos,
    DoPaciente(Uuid),
    DoMedico(Uuid),
}

pub fn escopo_de(sujeito: &UsuarioAutenticado) -> Escopo {
    match sujeito.perfil {
        Perfil::Paciente => Escopo::DoPaciente(sujeito.id),
        Perfil::Medico => Escopo::DoMedico(sujeito.id),
        Perfil::Admin | Perfil::Atendente => Escopo::Todos,
    }
}

/// Single-record ownership check: the caller must be a party to the
/// record (as paciente or medico) unless staff/admin.
pub fn exigir_parte(
    sujeito: &UsuarioAutenticado,
    paciente_id: Uuid,
    medico_id: Uuid,
) -> Result<(), AcessoNegado> {
    let negado = match sujeito.perfil {
        Perfil::Paciente => paciente_id != sujeito.id,
        Perfil::Medico => medico_id != sujeito.id,
        Perfil::Admin | Perfil::Atendente => false,
    };
    if negado {
        Err(AcessoNegado::Proibido("Acesso negado".into()))
    } else {
        Ok(())
    }
}

/// Write-side rule: a patient may only schedule for themselves.
pub fn exigir_agendamento_proprio(
    sujeito: &UsuarioAutenticado,
    paciente_id: Uuid,
) -> Result<(), AcessoNegado> {
    if sujeito.perfil == Perfil::Paciente && paciente_id != sujeito.id {
        return Err(AcessoNegado::Proibido("Você só pode agendar para si".into()));
    }
    Ok(())
}

/// Write-side rule: a doctor may only author resultados assigned to
/// themselves; admin may set any doctor.
pub fn exigir_autoria_propria(
    sujeito: &UsuarioAutenticado,
    medico_id: Uuid,
) -> Result<(), AcessoNegado> {
    if sujeito.perfil == Perfil::Medico && medico_id != sujeito.id {
        return Err(AcessoNegado::Proibido(
            "O médico só pode criar resultados vinculados a si mesmo".into(),
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sujeito(perfil: Perfil) -> UsuarioAutenticado {
        UsuarioAutenticado {
            id: Uuid::new_v4(),
            perfil,
        }
    }

    #[test]
    fn missing_subject_is_unauthenticated_not_forbidden() {
        assert_eq!(
            exigir(None, Acao::GerirUsuarios),
            Err(AcessoNegado::NaoAutenticado)
        );
    }

    #[test]
    fn user_management_restricted_to_staff() {
        assert!(exigir(Some(&sujeito(Perfil::Admin)), Acao::GerirUsuarios).is_ok());
        assert!(exigir(Some(&sujeito(Perfil::Atendente)), Acao::GerirUsuarios).is_ok());
        assert!(matches!(
            exigir(Some(&sujeito(Perfil::Paciente)), Acao::GerirUsuarios),
            Err(AcessoNegado::Proibido(_))
        ));
        assert!(exigir(Some(&sujeito(Perfil::Medico)), Acao::GerirUsuarios).is_err());
    }

    #[test]
    fn resultado_creation_restricted_to_doctor_and_admin() {
        assert!(exigir(Some(&sujeito(Perfil::Medico)), Acao::CriarResultado).is_ok());
        assert!(exigir(Some(&sujeito(Perfil::Admin)), Acao::CriarResultado).is_ok());
        assert!(exigir(Some(&sujeito(Perfil::Paciente)), Acao::CriarResultado).is_err());
        assert!(exigir(Some(&sujeito(Perfil::Atendente)), Acao::CriarResultado).is_err());
    }

    #[test]
    fn scheduling_open_to_every_role() {
        for perfil in [
            Perfil::Admin,
            Perfil::Paciente,
            Perfil::Atendente,
            Perfil::Medico,
        ] {
            assert!(exigir(Some(&sujeito(perfil)), Acao::AgendarConsulta).is_ok());
        }
    }

    #[test]
    fn scope_follows_role() {
        let paciente = sujeito(Perfil::Paciente);
        assert_eq!(escopo_de(&paciente), Escopo::DoPaciente(paciente.id));

        let medico = sujeito(Perfil::Medico);
        assert_eq!(escopo_de(&medico), Escopo::DoMedico(medico.id));

        assert_eq!(escopo_de(&sujeito(Perfil::Admin)), Escopo::Todos);
        assert_eq!(escopo_de(&sujeito(Perfil::Atendente)), Escopo::Todos);
    }

    #[test]
    fn patient_sees_only_own_records() {
        let paciente = sujeito(Perfil::Paciente);
        let outro = Uuid::new_v4();
        let medico = Uuid::new_v4();
        assert!(exigir_parte(&paciente, paciente.id, medico).is_ok());
        assert!(exigir_parte(&paciente, outro, medico).is_err());
    }

    #[test]
    fn doctor_sees_only_assigned_records() {
        let medico = sujeito(Perfil::Medico);
        let paciente = Uuid::new_v4();
        assert!(exigir_parte(&medico, paciente, medico.id).is_ok());
        assert!(exigir_parte(&medico, paciente, Uuid::new_v4()).is_err());
    }

    #[test]
    fn staff_sees_everything() {
        let atendente = sujeito(Perfil::Atendente);
        assert!(exigir_parte(&atendente, Uuid::new_v4(), Uuid::new_v4()).is_ok());
    }

    #[test]
    fn patient_schedules_only_for_self() {
        let paciente = sujeito(Perfil::Paciente);
        assert!(exigir_agendamento_proprio(&paciente, paciente.id).is_ok());
        assert!(exigir_agendamento_proprio(&paciente, Uuid::new_v4()).is_err());

        // Staff can schedule for anyone
        let atendente = sujeito(Perfil::Atendente);
        assert!(exigir_agendamento_proprio(&atendente, Uuid::new_v4()).is_ok());
    }

    #[test]
    fn doctor_signs_only_as_self_admin_signs_any() {
        let medico = sujeito(Perfil::Medico);
        assert!(exigir_autoria_propria(&medico, medico.id).is_ok());
        assert!(exigir_autoria_propria(&medico, Uuid::new_v4()).is_err());

        let admin = sujeito(Perfil::Admin);
        assert!(exigir_autoria_propria(&admin, Uuid::new_v4()).is_ok());
    }
}
