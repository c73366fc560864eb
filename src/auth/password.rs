//! Password hashing with PBKDF2-SHA256 (PHC string format).

use pbkdf2::password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString};
use pbkdf2::Pbkdf2;
use rand::rngs::OsRng;
use thiserror::Error;

/// Minimum accepted password length.
pub const TAMANHO_MINIMO_SENHA: usize = 8;

#[derive(Debug, Error)]
pub enum PasswordError {
    #[error("Password hashing failed: {0}")]
    Hash(String),
}

/// Hash a password with a fresh random salt.
pub fn hash_senha(senha: &str) -> Result<String, PasswordError> {
    let salt = SaltString::generate(&mut OsRng);
    let hash = Pbkdf2
        .hash_password(senha.as_bytes(), &salt)
        .map_err(|e| PasswordError::Hash(e.to_string()))?;
    Ok(hash.to_string())
}

/// Verify a password against a stored PHC hash string.
/// A malformed stored hash counts as a failed verification.
pub fn verificar_senha(senha: &str, hash: &str) -> bool {
    match PasswordHash::new(hash) {
        Ok(parsed) => Pbkdf2.verify_password(senha.as_bytes(), &parsed).is_ok(),
        Err(_) => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hash_and_verify_round_trip() {
        let hash = hash_senha("correct horse battery").unwrap();
        assert!(verificar_senha("correct horse battery", &hash));
        assert!(!verificar_senha("wrong password", &hash));
    }

    #[test]
    fn hashes_are_salted() {
        let a = hash_senha("12345678").unwrap();
        let b = hash_senha("12345678").unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn malformed_stored_hash_fails_closed() {
        assert!(!verificar_senha("12345678", "not-a-phc-string"));
        assert!(!verificar_senha("12345678", ""));
    }
}
