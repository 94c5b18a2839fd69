//! Salted password hashing for user profiles.
//!
//! Hashes are stored as PHC strings (`$pbkdf2-sha256$i=...,l=32$<salt>$<hash>`)
//! so the algorithm and round count travel with the stored value.

use pbkdf2::password_hash::{
    Error as HashError, PasswordHash, PasswordHasher, PasswordVerifier, SaltString,
};
use pbkdf2::{Algorithm, Params, Pbkdf2};
use rand::rngs::OsRng;

const ROUNDS: u32 = 100_000;
const HASH_LEN: usize = 32;

/// Hash `password` with a fresh random salt.
pub fn hash_password(password: &str) -> Result<String, HashError> {
    let salt = SaltString::generate(&mut OsRng);
    let params = Params {
        rounds: ROUNDS,
        output_length: HASH_LEN,
    };
    let hash = Pbkdf2.hash_password_customized(
        password.as_bytes(),
        Some(Algorithm::Pbkdf2Sha256.ident()),
        None,
        params,
        &salt,
    )?;
    Ok(hash.to_string())
}

/// Check `password` against a stored hash. Malformed hashes never verify.
pub fn verify_password(password: &str, stored: &str) -> bool {
    match PasswordHash::new(stored) {
        Ok(parsed) => Pbkdf2
            .verify_password(password.as_bytes(), &parsed)
            .is_ok(),
        Err(_) => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hash_round_trips_and_never_stores_plain_text() {
        let stored = hash_password("hunter2").unwrap();
        assert!(stored.starts_with("$pbkdf2-sha256$i=100000,l=32$"), "{stored}");
        assert!(!stored.contains("hunter2"));
        assert!(verify_password("hunter2", &stored));
        assert!(!verify_password("hunter3", &stored));
    }

    #[test]
    fn same_password_gets_different_salts() {
        assert_ne!(
            hash_password("secret").unwrap(),
            hash_password("secret").unwrap()
        );
    }

    #[test]
    fn malformed_hashes_are_rejected() {
        assert!(!verify_password("secret", ""));
        assert!(!verify_password("secret", "secret"));
        assert!(!verify_password("secret", "pbkdf2-sha256$100000$00$00"));
        assert!(!verify_password("secret", "$md5$abc$def"));
    }
}
