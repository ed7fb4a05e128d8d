//! Error types for vault-core

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for vault operations
pub type Result<T> = std::result::Result<T, VaultError>;

/// Vault error types
#[derive(Error, Debug)]
pub enum VaultError {
    /// Wrong master password and tampered data are deliberately
    /// indistinguishable: the caller only learns that decryption failed.
    #[error("wrong master password or corrupted vault data")]
    AuthenticationFailed,

    #[error("vault data is corrupted: {0}")]
    CorruptData(String),

    #[error("entry for {service}/{username} already exists")]
    DuplicateEntry { service: String, username: String },

    #[error("no entry at index {0}")]
    EntryNotFound(usize),

    #[error("vault is locked - unlock with the master password first")]
    VaultLocked,

    #[error("vault is not initialized - create it first")]
    NotInitialized,

    #[error("a vault already exists at {0}")]
    AlreadyExists(PathBuf),

    #[error("master password must be at least {0} characters")]
    WeakMasterPassword(usize),

    #[error("invalid generator options: {0}")]
    InvalidGeneratorOptions(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("crypto error: {0}")]
    Crypto(String),

    #[error("storage error: {0}")]
    Storage(String),
}
