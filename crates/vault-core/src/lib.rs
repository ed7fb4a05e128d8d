//! # vault-core
//!
//! Core vault functionality for Keeper including:
//! - PBKDF2-HMAC-SHA256 key derivation from a master password
//! - AES-256-GCM authenticated encryption of the credential store
//! - Single-file persistence with atomic replace and fresh salt per save
//! - Password generation and strength scoring
//!
//! The crate exposes a stateful [`VaultManager`] meant to be owned by a UI
//! or CLI shell; secrets live in memory only while the vault is unlocked.

pub mod codec;
pub mod crypto;
pub mod entry;
pub mod error;
pub mod generator;
mod manager;

pub use crypto::{hash_password, verify_password, MasterKey, MasterPassword};
pub use entry::{EntryUpdate, VaultEntry};
pub use error::{Result, VaultError};
pub use generator::{assess, generate, GeneratorOptions, StrengthLevel, StrengthReport};
pub use manager::{VaultManager, VaultState, VaultStats, MIN_MASTER_PASSWORD_LEN};
