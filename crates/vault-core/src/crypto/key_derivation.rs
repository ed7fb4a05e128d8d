//! Password-based key derivation using PBKDF2-HMAC-SHA256
//!
//! The vault blob format fixes the KDF parameters: a 16-byte random salt and
//! 100,000 iterations. The iteration count is a crate constant rather than
//! part of the blob, so changing it invalidates existing vault files.

use base64::{engine::general_purpose::STANDARD, Engine as _};
use pbkdf2::pbkdf2_hmac;
use rand::RngCore;
use sha2::Sha256;

use super::{MasterKey, MasterPassword};

/// PBKDF2 iteration count
pub const PBKDF2_ITERATIONS: u32 = 100_000;

/// Salt length in bytes
pub const SALT_LEN: usize = 16;

/// Derived key length in bytes (AES-256)
pub const KEY_LEN: usize = 32;

/// Generate a cryptographically secure random salt
pub fn generate_salt() -> [u8; SALT_LEN] {
    let mut salt = [0u8; SALT_LEN];
    rand::rngs::OsRng.fill_bytes(&mut salt);
    salt
}

/// Derive a 256-bit key from a master password and salt
///
/// Deterministic: the same password and salt always produce the same key.
pub fn derive_key(password: &MasterPassword, salt: &[u8; SALT_LEN]) -> MasterKey {
    let mut key = [0u8; KEY_LEN];
    pbkdf2_hmac::<Sha256>(
        password.expose().as_bytes(),
        salt,
        PBKDF2_ITERATIONS,
        &mut key,
    );
    MasterKey::new(key)
}

/// Hash a password for verification, producing `base64(salt || pbkdf2(password, salt))`
///
/// Lets a host confirm a master password (e.g. on a re-entry prompt) without
/// reading the vault file. The hash is not a vault encryption key.
pub fn hash_password(password: &MasterPassword) -> String {
    let salt = generate_salt();
    let key = derive_key(password, &salt);

    let mut combined = Vec::with_capacity(SALT_LEN + KEY_LEN);
    combined.extend_from_slice(&salt);
    combined.extend_from_slice(key.as_bytes());

    STANDARD.encode(combined)
}

/// Verify a password against a hash produced by [`hash_password`]
///
/// Returns `false` on any decode failure rather than surfacing an error.
pub fn verify_password(password: &MasterPassword, stored_hash: &str) -> bool {
    let combined = match STANDARD.decode(stored_hash) {
        Ok(bytes) => bytes,
        Err(_) => return false,
    };

    if combined.len() != SALT_LEN + KEY_LEN {
        return false;
    }

    let mut salt = [0u8; SALT_LEN];
    salt.copy_from_slice(&combined[..SALT_LEN]);
    let expected = &combined[SALT_LEN..];

    let key = derive_key(password, &salt);

    // Fold the comparison so it does not short-circuit on the first mismatch
    let diff = key
        .as_bytes()
        .iter()
        .zip(expected)
        .fold(0u8, |acc, (a, b)| acc | (a ^ b));
    diff == 0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generate_salt() {
        let salt1 = generate_salt();
        let salt2 = generate_salt();

        // Salts should be different
        assert_ne!(salt1, salt2);
    }

    #[test]
    fn test_derive_key_deterministic() {
        let password = MasterPassword::new("test-password-123");
        let salt = generate_salt();

        let key1 = derive_key(&password, &salt);
        let key2 = derive_key(&password, &salt);

        // Same password + salt should produce same key
        assert_eq!(key1.as_bytes(), key2.as_bytes());
    }

    #[test]
    fn test_derive_key_different_passwords() {
        let salt = generate_salt();

        let key1 = derive_key(&MasterPassword::new("password1"), &salt);
        let key2 = derive_key(&MasterPassword::new("password2"), &salt);

        assert_ne!(key1.as_bytes(), key2.as_bytes());
    }

    #[test]
    fn test_derive_key_different_salts() {
        let password = MasterPassword::new("test-password");

        let key1 = derive_key(&password, &generate_salt());
        let key2 = derive_key(&password, &generate_salt());

        assert_ne!(key1.as_bytes(), key2.as_bytes());
    }

    #[test]
    fn test_empty_password_accepted() {
        // Policy rules (minimum length) live in the manager, not the KDF
        let key = derive_key(&MasterPassword::new(""), &generate_salt());
        assert_eq!(key.as_bytes().len(), KEY_LEN);
    }

    #[test]
    fn test_hash_and_verify_password() {
        let password = MasterPassword::new("correct horse battery staple");
        let hash = hash_password(&password);

        assert!(verify_password(&password, &hash));
        assert!(!verify_password(&MasterPassword::new("wrong"), &hash));
    }

    #[test]
    fn test_verify_rejects_garbage_hash() {
        let password = MasterPassword::new("whatever");
        assert!(!verify_password(&password, "not base64 at all!!"));
        assert!(!verify_password(&password, "dG9vIHNob3J0"));
    }

    #[test]
    fn test_hash_password_salted() {
        let password = MasterPassword::new("same password");
        // Fresh salt per hash, so two hashes of the same password differ
        assert_ne!(hash_password(&password), hash_password(&password));
    }
}
