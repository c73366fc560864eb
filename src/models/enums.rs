use crate::db::DatabaseError;
use serde::{Deserialize, Serialize};

/// Macro to generate enum with as_str + std::str::FromStr pattern.
/// The serde rename keeps the JSON representation identical to the
/// database string.
macro_rules! str_enum {
    ($name:ident { $($variant:ident => $s:literal),+ $(,)? }) => {
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
        pub enum $name {
            $(#[serde(rename = $s)] $variant),+
        }

        impl $name {
            pub fn as_str(&self) -> &'static str {
                match self {
                    $(Self::$variant => $s),+
                }
            }
        }

        impl std::str::FromStr for $name {
            type Err = DatabaseError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s {
                    $($s => Ok(Self::$variant)),+,
                    _ => Err(DatabaseError::InvalidEnum {
                        field: stringify!($name).into(),
                        value: s.into(),
                    }),
                }
            }
        }
    };
}

str_enum!(Perfil {
    Admin => "ADMIN",
    Paciente => "PACIENTE",
    Atendente => "ATENDENTE",
    Medico => "MEDICO",
});

str_enum!(StatusAgendamento {
    Agendada => "AGENDADA",
    Realizada => "REALIZADA",
    Cancelada => "CANCELADA",
    NaoCompareceu => "NAO_COMPARECEU",
});

str_enum!(Plataforma {
    Ios => "ios",
    Android => "android",
    Web => "web",
});

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn perfil_round_trip() {
        for (variant, s) in [
            (Perfil::Admin, "ADMIN"),
            (Perfil::Paciente, "PACIENTE"),
            (Perfil::Atendente, "ATENDENTE"),
            (Perfil::Medico, "MEDICO"),
        ] {
            assert_eq!(variant.as_str(), s);
            assert_eq!(Perfil::from_str(s).unwrap(), variant);
        }
    }

    #[test]
    fn status_round_trip() {
        for (variant, s) in [
            (StatusAgendamento::Agendada, "AGENDADA"),
            (StatusAgendamento::Realizada, "REALIZADA"),
            (StatusAgendamento::Cancelada, "CANCELADA"),
            (StatusAgendamento::NaoCompareceu, "NAO_COMPARECEU"),
        ] {
            assert_eq!(variant.as_str(), s);
            assert_eq!(StatusAgendamento::from_str(s).unwrap(), variant);
        }
    }

    #[test]
    fn plataforma_round_trip() {
        for (variant, s) in [
            (Plataforma::Ios, "ios"),
            (Plataforma::Android, "android"),
            (Plataforma::Web, "web"),
        ] {
            assert_eq!(variant.as_str(), s);
            assert_eq!(Plataforma::from_str(s).unwrap(), variant);
        }
    }

    #[test]
    fn serde_uses_wire_strings() {
        assert_eq!(
            serde_json::to_string(&Perfil::Paciente).unwrap(),
            "\"PACIENTE\""
        );
        assert_eq!(
            serde_json::to_string(&StatusAgendamento::NaoCompareceu).unwrap(),
            "\"NAO_COMPARECEU\""
        );
        let p: Plataforma = serde_json::from_str("\"android\"").unwrap();
        assert_eq!(p, Plataforma::Android);
    }

    #[test]
    fn invalid_enum_returns_error() {
        assert!(Perfil::from_str("GERENTE").is_err());
        assert!(StatusAgendamento::from_str("agendada").is_err());
        assert!(Plataforma::from_str("").is_err());
    }
}
