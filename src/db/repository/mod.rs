//! Repository layer: entity-scoped database operations.
//!
//! Free functions over a borrowed `Connection`, one sub-module per
//! entity. All public functions are re-exported here.

mod consulta;
mod exame;
mod push_token;
mod resultado;
mod usuario;

pub use consulta::*;
pub use exame::*;
pub use push_token::*;
pub use resultado::*;
pub use usuario::*;

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDateTime;
    use rusqlite::Connection;
    use uuid::Uuid;

    use crate::agenda::compor_slot;
    use crate::authorization::Escopo;
    use crate::db::sqlite::open_memory_database;
    use crate::db::DatabaseError;
    use crate::models::enums::*;
    use crate::models::*;

    fn test_db() -> Connection {
        open_memory_database().unwrap()
    }

    fn agora() -> NaiveDateTime {
        chrono::Utc::now().naive_utc()
    }

    fn make_usuario(conn: &Connection, perfil: Perfil) -> Usuario {
        let id = Uuid::new_v4();
        let usuario = Usuario {
            id,
            nome: format!("Usuario {id}"),
            email: format!("{id}@example.com"),
            senha_hash: "hash".into(),
            perfil,
            ativo: true,
            criado_em: agora(),
            atualizado_em: agora(),
        };
        inserir_usuario(conn, &usuario).unwrap();
        usuario
    }

    fn make_consulta(conn: &Connection, paciente: &Usuario, medico: &Usuario, hora: &str) -> Consulta {
        let slot = compor_slot("2025-12-15", hora).unwrap();
        let consulta = Consulta {
            id: Uuid::new_v4(),
            paciente_id: paciente.id,
            medico_id: medico.id,
            dia: slot.dia,
            hora: hora.into(),
            data_hora: slot.data_hora,
            detalhes: None,
            status: StatusAgendamento::Agendada,
            criado_em: agora(),
            atualizado_em: agora(),
        };
        inserir_consulta(conn, &consulta).unwrap();
        consulta
    }

    #[test]
    fn usuario_insert_and_retrieve() {
        let conn = test_db();
        let usuario = make_usuario(&conn, Perfil::Paciente);
        let lido = buscar_usuario(&conn, &usuario.id).unwrap().unwrap();
        assert_eq!(lido.email, usuario.email);
        assert_eq!(lido.perfil, Perfil::Paciente);
        assert!(lido.ativo);
    }

    #[test]
    fn usuario_email_is_unique() {
        let conn = test_db();
        let usuario = make_usuario(&conn, Perfil::Paciente);
        let duplicado = Usuario {
            id: Uuid::new_v4(),
            email: usuario.email.clone(),
            ..usuario.clone()
        };
        let err = inserir_usuario(&conn, &duplicado).unwrap_err();
        assert!(err.is_unique_violation(), "got: {err}");
    }

    #[test]
    fn usuario_lookup_by_email() {
        let conn = test_db();
        let usuario = make_usuario(&conn, Perfil::Medico);
        let lido = buscar_usuario_por_email(&conn, &usuario.email).unwrap();
        assert_eq!(lido.unwrap().id, usuario.id);
        assert!(buscar_usuario_por_email(&conn, "ninguem@example.com")
            .unwrap()
            .is_none());
    }

    #[test]
    fn usuario_soft_delete_keeps_row() {
        let conn = test_db();
        let usuario = make_usuario(&conn, Perfil::Paciente);
        desativar_usuario(&conn, &usuario.id, agora()).unwrap();
        let lido = buscar_usuario(&conn, &usuario.id).unwrap().unwrap();
        assert!(!lido.ativo);
    }

    #[test]
    fn consulta_slot_unique_per_medico() {
        let conn = test_db();
        let paciente = make_usuario(&conn, Perfil::Paciente);
        let medico = make_usuario(&conn, Perfil::Medico);
        let primeira = make_consulta(&conn, &paciente, &medico, "14:00");

        assert!(slot_consulta_ocupado(&conn, &medico.id, primeira.data_hora).unwrap());

        // Same slot, same medico: index rejects
        let segunda = Consulta {
            id: Uuid::new_v4(),
            paciente_id: paciente.id,
            ..primeira.clone()
        };
        let err = inserir_consulta(&conn, &segunda).unwrap_err();
        assert!(err.is_unique_violation());

        // Same slot, another medico: allowed
        let outro_medico = make_usuario(&conn, Perfil::Medico);
        make_consulta(&conn, &paciente, &outro_medico, "14:00");
    }

    #[test]
    fn cancelled_consulta_frees_the_slot() {
        let conn = test_db();
        let paciente = make_usuario(&conn, Perfil::Paciente);
        let medico = make_usuario(&conn, Perfil::Medico);
        let mut primeira = make_consulta(&conn, &paciente, &medico, "14:00");

        primeira.status = StatusAgendamento::Cancelada;
        primeira.atualizado_em = agora();
        atualizar_consulta(&conn, &primeira).unwrap();

        assert!(!slot_consulta_ocupado(&conn, &medico.id, primeira.data_hora).unwrap());

        // Rebooking the freed slot passes the partial index
        let segunda = Consulta {
            id: Uuid::new_v4(),
            status: StatusAgendamento::Agendada,
            ..primeira.clone()
        };
        inserir_consulta(&conn, &segunda).unwrap();
    }

    #[test]
    fn consulta_and_exame_may_share_a_slot() {
        let conn = test_db();
        let paciente = make_usuario(&conn, Perfil::Paciente);
        let medico = make_usuario(&conn, Perfil::Medico);
        let consulta = make_consulta(&conn, &paciente, &medico, "14:00");

        // Uniqueness is per resource type
        assert!(!slot_exame_ocupado(&conn, &medico.id, consulta.data_hora).unwrap());

        let exame = Exame {
            id: Uuid::new_v4(),
            nome: "Hemograma".into(),
            paciente_id: paciente.id,
            medico_id: medico.id,
            dia: consulta.dia,
            hora: consulta.hora.clone(),
            data_hora: consulta.data_hora,
            detalhes: None,
            status: StatusAgendamento::Agendada,
            criado_em: agora(),
            atualizado_em: agora(),
        };
        inserir_exame(&conn, &exame).unwrap();
        assert!(slot_exame_ocupado(&conn, &medico.id, consulta.data_hora).unwrap());
    }

    #[test]
    fn consulta_listing_respects_scope() {
        let conn = test_db();
        let paciente_a = make_usuario(&conn, Perfil::Paciente);
        let paciente_b = make_usuario(&conn, Perfil::Paciente);
        let medico = make_usuario(&conn, Perfil::Medico);
        make_consulta(&conn, &paciente_a, &medico, "09:00");
        make_consulta(&conn, &paciente_b, &medico, "10:00");

        let todas = listar_consultas(&conn, &Escopo::Todos).unwrap();
        assert_eq!(todas.len(), 2);
        // Ordered by data_hora ascending
        assert!(todas[0].data_hora < todas[1].data_hora);

        let do_a = listar_consultas(&conn, &Escopo::DoPaciente(paciente_a.id)).unwrap();
        assert_eq!(do_a.len(), 1);
        assert_eq!(do_a[0].paciente_id, paciente_a.id);

        let do_medico = listar_consultas(&conn, &Escopo::DoMedico(medico.id)).unwrap();
        assert_eq!(do_medico.len(), 2);

        let de_ninguem = listar_consultas(&conn, &Escopo::DoMedico(Uuid::new_v4())).unwrap();
        assert!(de_ninguem.is_empty());
    }

    #[test]
    fn resultado_insert_and_exame_embedding() {
        let conn = test_db();
        let paciente = make_usuario(&conn, Perfil::Paciente);
        let medico = make_usuario(&conn, Perfil::Medico);
        let slot = compor_slot("2025-12-16", "08:00").unwrap();
        let exame = Exame {
            id: Uuid::new_v4(),
            nome: "Raio-X".into(),
            paciente_id: paciente.id,
            medico_id: medico.id,
            dia: slot.dia,
            hora: "08:00".into(),
            data_hora: slot.data_hora,
            detalhes: None,
            status: StatusAgendamento::Realizada,
            criado_em: agora(),
            atualizado_em: agora(),
        };
        inserir_exame(&conn, &exame).unwrap();

        let resultado = Resultado {
            id: Uuid::new_v4(),
            exame_id: exame.id,
            paciente_id: paciente.id,
            medico_id: medico.id,
            detalhes: Some("Sem alterações".into()),
            arquivo_url: None,
            publicado_em: agora(),
        };
        inserir_resultado(&conn, &resultado).unwrap();

        let do_exame = listar_resultados_do_exame(&conn, &exame.id).unwrap();
        assert_eq!(do_exame.len(), 1);
        assert_eq!(do_exame[0].detalhes.as_deref(), Some("Sem alterações"));

        let do_paciente = listar_resultados(&conn, &Escopo::DoPaciente(paciente.id)).unwrap();
        assert_eq!(do_paciente.len(), 1);
        let de_outro = listar_resultados(&conn, &Escopo::DoPaciente(Uuid::new_v4())).unwrap();
        assert!(de_outro.is_empty());
    }

    #[test]
    fn push_token_reassignment_keeps_single_row() {
        let conn = test_db();
        let dono_original = make_usuario(&conn, Perfil::Paciente);
        let novo_dono = make_usuario(&conn, Perfil::Paciente);

        let push = PushToken {
            id: Uuid::new_v4(),
            usuario_id: dono_original.id,
            token: "device-abc".into(),
            plataforma: Plataforma::Android,
            ativo: true,
        };
        inserir_push_token(&conn, &push).unwrap();
        desativar_push_token(&conn, &push.id).unwrap();

        reatribuir_push_token(&conn, "device-abc", &novo_dono.id, Plataforma::Ios).unwrap();

        let lido = buscar_push_token_por_token(&conn, "device-abc")
            .unwrap()
            .unwrap();
        assert_eq!(lido.id, push.id, "row is reused, not duplicated");
        assert_eq!(lido.usuario_id, novo_dono.id);
        assert_eq!(lido.plataforma, Plataforma::Ios);
        assert!(lido.ativo);
    }

    #[test]
    fn push_token_value_is_unique() {
        let conn = test_db();
        let dono = make_usuario(&conn, Perfil::Paciente);
        let push = PushToken {
            id: Uuid::new_v4(),
            usuario_id: dono.id,
            token: "device-abc".into(),
            plataforma: Plataforma::Web,
            ativo: true,
        };
        inserir_push_token(&conn, &push).unwrap();

        let duplicado = PushToken {
            id: Uuid::new_v4(),
            ..push.clone()
        };
        let err = inserir_push_token(&conn, &duplicado).unwrap_err();
        assert!(matches!(err, DatabaseError::Sqlite(_)));
        assert!(err.is_unique_violation());
    }
}
