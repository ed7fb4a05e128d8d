//! Cryptographic primitives for the encrypted vault
//!
//! This module provides:
//! - AES-256-GCM authenticated encryption
//! - PBKDF2-HMAC-SHA256 key derivation from the master password
//! - Secure memory handling with zeroize

mod encryption;
mod key_derivation;
mod secure_memory;

pub use encryption::{decrypt, encrypt, NONCE_LEN, TAG_LEN};
pub use key_derivation::{
    derive_key, generate_salt, hash_password, verify_password, KEY_LEN, PBKDF2_ITERATIONS,
    SALT_LEN,
};
pub use secure_memory::{MasterKey, MasterPassword};
