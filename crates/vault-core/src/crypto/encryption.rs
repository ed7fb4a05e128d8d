//! AES-256-GCM authenticated encryption
//!
//! A fresh 96-bit nonce is drawn from the OS RNG for every encryption call.
//! The 16-byte authentication tag stays appended to the ciphertext, so a
//! wrong key and tampered data fail identically at tag verification.

use aes_gcm::{
    aead::{Aead, KeyInit},
    Aes256Gcm, Key, Nonce,
};
use rand::RngCore;

use super::MasterKey;
use crate::error::{Result, VaultError};

/// Nonce length in bytes (96 bits, standard for GCM)
pub const NONCE_LEN: usize = 12;

/// Authentication tag length in bytes
pub const TAG_LEN: usize = 16;

/// Encrypt plaintext using AES-256-GCM
///
/// Returns the random nonce and the ciphertext with the auth tag appended.
pub fn encrypt(plaintext: &[u8], key: &MasterKey) -> Result<([u8; NONCE_LEN], Vec<u8>)> {
    let cipher = Aes256Gcm::new(Key::<Aes256Gcm>::from_slice(key.as_bytes()));

    let mut nonce_bytes = [0u8; NONCE_LEN];
    rand::rngs::OsRng.fill_bytes(&mut nonce_bytes);
    let nonce = Nonce::from_slice(&nonce_bytes);

    let ciphertext = cipher
        .encrypt(nonce, plaintext)
        .map_err(|e| VaultError::Crypto(e.to_string()))?;

    Ok((nonce_bytes, ciphertext))
}

/// Decrypt ciphertext using AES-256-GCM
///
/// Fails with [`VaultError::AuthenticationFailed`] whenever the tag does not
/// verify. The caller cannot tell a wrong key from tampered data.
pub fn decrypt(ciphertext: &[u8], key: &MasterKey, nonce: &[u8; NONCE_LEN]) -> Result<Vec<u8>> {
    let cipher = Aes256Gcm::new(Key::<Aes256Gcm>::from_slice(key.as_bytes()));
    let nonce = Nonce::from_slice(nonce);

    cipher
        .decrypt(nonce, ciphertext)
        .map_err(|_| VaultError::AuthenticationFailed)
}
