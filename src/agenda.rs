//! Slot composition for consultas and exames.
//!
//! A slot is the (medico, data_hora) pair. `data_hora` is built by
//! taking `dia` at midnight and overwriting hour/minute from `hora`
//! (`HH:MM`). Conflict detection compares this single instant for
//! exact equality. There is no interval or overlap logic, so
//! bookings at different minute offsets never conflict. Known
//! limitation inherited from the product contract.

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum AgendaError {
    #[error("Data inválida: {0} (esperado AAAA-MM-DD)")]
    DiaInvalido(String),
    #[error("Hora inválida: {0} (esperado HH:MM)")]
    HoraInvalida(String),
}

/// A validated bookable slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Slot {
    pub dia: NaiveDate,
    pub data_hora: NaiveDateTime,
}

/// Compose `dia` (`AAAA-MM-DD`) and `hora` (`HH:MM`) into a slot.
pub fn compor_slot(dia: &str, hora: &str) -> Result<Slot, AgendaError> {
    let dia = NaiveDate::parse_from_str(dia.trim(), "%Y-%m-%d")
        .map_err(|_| AgendaError::DiaInvalido(dia.to_string()))?;
    let hora = NaiveTime::parse_from_str(hora.trim(), "%H:%M")
        .map_err(|_| AgendaError::HoraInvalida(hora.to_string()))?;
    Ok(Slot {
        dia,
        data_hora: dia.and_time(hora),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Timelike;

    #[test]
    fn compose_valid_slot() {
        let slot = compor_slot("2025-12-15", "14:00").unwrap();
        assert_eq!(slot.dia, NaiveDate::from_ymd_opt(2025, 12, 15).unwrap());
        assert_eq!(slot.data_hora.hour(), 14);
        assert_eq!(slot.data_hora.minute(), 0);
        assert_eq!(slot.data_hora.second(), 0);
    }

    #[test]
    fn trims_whitespace() {
        let slot = compor_slot(" 2025-12-15 ", " 09:30").unwrap();
        assert_eq!(slot.data_hora.minute(), 30);
    }

    #[test]
    fn rejects_bad_date() {
        assert_eq!(
            compor_slot("15/12/2025", "14:00"),
            Err(AgendaError::DiaInvalido("15/12/2025".into()))
        );
        assert!(compor_slot("2025-13-40", "14:00").is_err());
        assert!(compor_slot("", "14:00").is_err());
    }

    #[test]
    fn rejects_bad_time() {
        assert!(matches!(
            compor_slot("2025-12-15", "25:00"),
            Err(AgendaError::HoraInvalida(_))
        ));
        assert!(compor_slot("2025-12-15", "14h00").is_err());
        assert!(compor_slot("2025-12-15", "").is_err());
    }

    #[test]
    fn same_inputs_compose_equal_instants() {
        let a = compor_slot("2025-12-15", "14:00").unwrap();
        let b = compor_slot("2025-12-15", "14:00").unwrap();
        assert_eq!(a.data_hora, b.data_hora);
    }

    #[test]
    fn adjacent_minutes_are_distinct_slots() {
        let a = compor_slot("2025-12-15", "14:00").unwrap();
        let b = compor_slot("2025-12-15", "14:01").unwrap();
        assert_ne!(a.data_hora, b.data_hora);
    }
}
