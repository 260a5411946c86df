//! Credential Codec
//!
//! Salted-hash generation and verification for member passwords, plus the
//! password strength policy.

use rand::{distributions::Alphanumeric, Rng};
use sha2::{Digest, Sha256};

/// Salt length used for every member credential, in characters.
pub const SALT_LENGTH: usize = 32;

/// Generate a cryptographically random salt of the given length.
///
/// `rand::thread_rng` is a CSPRNG; the output is printable alphanumeric so it
/// can be stored in a text column alongside the hash.
pub fn generate_salt(length: usize) -> String {
    rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(length)
        .map(char::from)
        .collect()
}

/// Compute the salted password digest as a lowercase hex string.
///
/// Deterministic by design: authentication compares
/// `generate_hash(candidate, stored_salt)` against the stored hash, so the
/// same inputs must always produce the same output.
pub fn generate_hash(password: &str, salt: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(password.as_bytes());
    hasher.update(salt.as_bytes());
    format!("{:x}", hasher.finalize())
}

/// Check a candidate password against a stored `(hash, salt)` pair.
pub fn verify_password(candidate: &str, stored_hash: &str, salt: &str) -> bool {
    generate_hash(candidate, salt) == stored_hash
}

/// Password strength policy: at least 8 characters with at least one
/// lowercase letter, one uppercase letter, one digit, and one symbol.
/// Every condition is mandatory.
pub fn is_valid_password(password: &str) -> bool {
    password.len() >= 8
        && password.chars().any(|c| c.is_ascii_lowercase())
        && password.chars().any(|c| c.is_ascii_uppercase())
        && password.chars().any(|c| c.is_ascii_digit())
        && password.chars().any(|c| !c.is_alphanumeric())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generate_salt_length_and_uniqueness() {
        let s1 = generate_salt(SALT_LENGTH);
        let s2 = generate_salt(SALT_LENGTH);

        assert_eq!(s1.len(), SALT_LENGTH);
        assert_eq!(s2.len(), SALT_LENGTH);
        assert_ne!(s1, s2);
        assert!(s1.chars().all(|c| c.is_ascii_alphanumeric()));
    }

    #[test]
    fn test_hash_is_deterministic() {
        let salt = generate_salt(SALT_LENGTH);
        assert_eq!(
            generate_hash("SecurePass123!", &salt),
            generate_hash("SecurePass123!", &salt)
        );
    }

    #[test]
    fn test_salts_differentiate_identical_passwords() {
        let h1 = generate_hash("SamePassword123!", "saltsaltsaltsaltsaltsaltsaltsal1");
        let h2 = generate_hash("SamePassword123!", "saltsaltsaltsaltsaltsaltsaltsal2");
        assert_ne!(h1, h2);
    }

    #[test]
    fn test_hash_is_hex_digest() {
        let hash = generate_hash("SecurePass123!", "salt");
        assert_eq!(hash.len(), 64);
        assert!(hash.chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn test_verify_password() {
        let salt = generate_salt(SALT_LENGTH);
        let hash = generate_hash("SecurePass123!", &salt);

        assert!(verify_password("SecurePass123!", &hash, &salt));
        assert!(!verify_password("WrongPass123!", &hash, &salt));
    }

    #[test]
    fn test_password_policy() {
        assert!(is_valid_password("Abc12345!"));

        // no uppercase, no symbol
        assert!(!is_valid_password("abc12345"));
        // too short
        assert!(!is_valid_password("Ab1!"));
        // no digit
        assert!(!is_valid_password("Abcdefgh!"));
        // no lowercase
        assert!(!is_valid_password("ABC12345!"));
        // no symbol
        assert!(!is_valid_password("Abc12345"));
    }
}
