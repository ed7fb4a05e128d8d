//! Vault lifecycle orchestration
//!
//! [`VaultManager`] owns the decrypted entry collection while the vault is
//! unlocked and is the only writer of the vault file. Every mutation
//! re-serializes the whole collection and seals it under a fresh salt and
//! nonce, then replaces the file atomically, so a failed save never clobbers
//! the previous vault.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use directories::ProjectDirs;
use serde::Serialize;
use tracing::{debug, info};

use crate::codec;
use crate::crypto::{decrypt, derive_key, encrypt, generate_salt, MasterPassword};
use crate::entry::{EntryUpdate, VaultEntry};
use crate::error::{Result, VaultError};

/// Minimum master password length, enforced at the core boundary
pub const MIN_MASTER_PASSWORD_LEN: usize = 8;

/// Default vault file name inside the project data directory
const VAULT_FILE_NAME: &str = "vault.dat";

/// Vault state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VaultState {
    /// No vault file exists yet
    NotInitialized,
    /// The vault file exists but no key material is in memory
    Locked,
    /// Master password and entries are in memory
    Unlocked,
}

/// Aggregate statistics over an unlocked vault
#[derive(Debug, Clone, Serialize)]
pub struct VaultStats {
    pub total_entries: usize,
    /// Entries whose secret is shorter than 8 characters
    pub weak_passwords: usize,
    /// Distinct secrets stored under more than one entry
    pub reused_passwords: usize,
    pub oldest_entry: Option<DateTime<Utc>>,
    pub newest_entry: Option<DateTime<Utc>>,
}

/// Stateful vault service
///
/// Intended to be owned by whatever shell (GUI, CLI, server) fronts the
/// vault; there is no global instance.
pub struct VaultManager {
    vault_path: PathBuf,
    /// Kept while unlocked so each save can re-derive a key from a fresh salt
    master_password: Option<MasterPassword>,
    entries: Vec<VaultEntry>,
    state: VaultState,
}

impl VaultManager {
    /// Create a manager for the vault file at `path`
    pub fn new(path: impl Into<PathBuf>) -> Self {
        let vault_path = path.into();
        let state = if vault_path.exists() {
            VaultState::Locked
        } else {
            VaultState::NotInitialized
        };

        Self {
            vault_path,
            master_password: None,
            entries: Vec::new(),
            state,
        }
    }

    /// Create a manager for the vault file in the user's data directory
    pub fn open_default() -> Result<Self> {
        let dirs = ProjectDirs::from("com", "keeper-vault", "keeper")
            .ok_or_else(|| VaultError::Storage("could not determine data directory".to_string()))?;

        let data_dir = dirs.data_dir();
        std::fs::create_dir_all(data_dir)?;

        Ok(Self::new(data_dir.join(VAULT_FILE_NAME)))
    }

    /// Path of the vault file this manager owns
    pub fn vault_path(&self) -> &Path {
        &self.vault_path
    }

    /// Current state
    pub fn state(&self) -> VaultState {
        self.state
    }

    /// Whether the vault is unlocked
    pub fn is_unlocked(&self) -> bool {
        self.state == VaultState::Unlocked
    }

    /// Whether a vault file exists on disk
    pub fn vault_exists(&self) -> bool {
        self.vault_path.exists()
    }

    /// Create a new empty vault protected by `master_password`
    ///
    /// Fails if a vault file already exists or the password is shorter than
    /// [`MIN_MASTER_PASSWORD_LEN`]. On success the vault is left unlocked.
    pub fn create(&mut self, master_password: &str) -> Result<()> {
        if self.vault_path.exists() {
            return Err(VaultError::AlreadyExists(self.vault_path.clone()));
        }
        Self::check_password_policy(master_password)?;

        info!("creating new vault at {:?}", self.vault_path);

        self.master_password = Some(MasterPassword::new(master_password));
        self.entries = Vec::new();

        if let Err(e) = self.persist() {
            self.master_password = None;
            return Err(e);
        }

        self.state = VaultState::Unlocked;
        info!("vault created");
        Ok(())
    }

    /// Unlock the vault with the master password
    ///
    /// A wrong password and a corrupted file surface the same
    /// [`VaultError::AuthenticationFailed`]; on any failure the vault stays
    /// locked. Unlocking an already-unlocked vault is a no-op.
    pub fn unlock(&mut self, master_password: &str) -> Result<()> {
        if self.state == VaultState::NotInitialized {
            return Err(VaultError::NotInitialized);
        }
        if self.state == VaultState::Unlocked {
            debug!("vault already unlocked");
            return Ok(());
        }

        let password = MasterPassword::new(master_password);
        let blob = std::fs::read_to_string(&self.vault_path)?;
        let plaintext = Self::open_blob(&blob, &password)?;

        let json = String::from_utf8(plaintext)
            .map_err(|_| VaultError::CorruptData("decrypted payload is not UTF-8".to_string()))?;
        let entries = codec::deserialize(&json)?;

        self.entries = entries;
        self.master_password = Some(password);
        self.state = VaultState::Unlocked;

        info!("vault unlocked, {} entries loaded", self.entries.len());
        Ok(())
    }

    /// Lock the vault, discarding key material and entries unconditionally
    pub fn lock(&mut self) {
        for entry in &mut self.entries {
            entry.scrub();
        }
        self.entries.clear();
        self.master_password = None;

        self.state = if self.vault_path.exists() {
            VaultState::Locked
        } else {
            VaultState::NotInitialized
        };

        info!("vault locked");
    }

    /// Add a new entry and persist
    ///
    /// Fails with [`VaultError::DuplicateEntry`] when an entry with the same
    /// `(service, username)` pair already exists (case-insensitively).
    pub fn add_entry(
        &mut self,
        service: &str,
        username: &str,
        password: &str,
        notes: &str,
    ) -> Result<()> {
        self.require_unlocked()?;

        if self.entries.iter().any(|e| e.same_identity(service, username)) {
            return Err(VaultError::DuplicateEntry {
                service: service.to_string(),
                username: username.to_string(),
            });
        }

        self.entries
            .push(VaultEntry::new(service, username, password, notes));

        if let Err(e) = self.persist() {
            self.entries.pop();
            return Err(e);
        }

        debug!("added entry for {}", service);
        Ok(())
    }

    /// Update the entry at `index` and persist
    pub fn update_entry(&mut self, index: usize, update: EntryUpdate) -> Result<()> {
        self.require_unlocked()?;

        if index >= self.entries.len() {
            return Err(VaultError::EntryNotFound(index));
        }

        let previous = self.entries[index].clone();
        self.entries[index].apply(update);

        if let Err(e) = self.persist() {
            self.entries[index] = previous;
            return Err(e);
        }

        debug!("updated entry {}", index);
        Ok(())
    }

    /// Delete the entry at `index` and persist
    ///
    /// Deletion shifts the positions of all later entries; callers holding
    /// indices (e.g. from [`search`](Self::search)) must re-fetch them after
    /// any mutation.
    pub fn delete_entry(&mut self, index: usize) -> Result<()> {
        self.require_unlocked()?;

        if index >= self.entries.len() {
            return Err(VaultError::EntryNotFound(index));
        }

        let removed = self.entries.remove(index);

        if let Err(e) = self.persist() {
            self.entries.insert(index, removed);
            return Err(e);
        }

        debug!("deleted entry {}", index);
        Ok(())
    }

    /// Positions of entries matching `query`
    ///
    /// Case-insensitive substring match over service, username, and notes.
    pub fn search(&self, query: &str) -> Result<Vec<usize>> {
        self.require_unlocked()?;

        Ok(self
            .entries
            .iter()
            .enumerate()
            .filter(|(_, e)| e.matches(query))
            .map(|(i, _)| i)
            .collect())
    }

    /// All entries, in insertion order
    pub fn entries(&self) -> Result<&[VaultEntry]> {
        self.require_unlocked()?;
        Ok(&self.entries)
    }

    /// Aggregate statistics over the unlocked vault
    pub fn stats(&self) -> Result<VaultStats> {
        self.require_unlocked()?;

        let weak_passwords = self
            .entries
            .iter()
            .filter(|e| e.password.chars().count() < 8)
            .count();

        let mut occurrences: HashMap<&str, usize> = HashMap::new();
        for entry in &self.entries {
            *occurrences.entry(entry.password.as_str()).or_default() += 1;
        }
        let reused_passwords = occurrences.values().filter(|&&n| n > 1).count();

        Ok(VaultStats {
            total_entries: self.entries.len(),
            weak_passwords,
            reused_passwords,
            oldest_entry: self.entries.iter().map(|e| e.created_at).min(),
            newest_entry: self.entries.iter().map(|e| e.created_at).max(),
        })
    }

    /// Export the full entry collection to `path`
    ///
    /// Same blob format as the vault file, sealed under an independent fresh
    /// salt and nonce with the current master password.
    pub fn export(&self, path: &Path) -> Result<()> {
        self.require_unlocked()?;
        let password = self
            .master_password
            .as_ref()
            .ok_or(VaultError::VaultLocked)?;

        let json = codec::serialize(&self.entries)?;
        let blob = Self::seal(json.as_bytes(), password)?;
        Self::write_atomic(path, &blob)?;

        info!("exported {} entries to {:?}", self.entries.len(), path);
        Ok(())
    }

    /// Import entries from a file exported with the same master password
    ///
    /// Entries whose `(service, username)` identity already exists are
    /// skipped. Returns the number of entries merged. A file sealed under a
    /// different password fails with the uniform authentication error.
    pub fn import(&mut self, path: &Path) -> Result<usize> {
        self.require_unlocked()?;
        let password = self
            .master_password
            .as_ref()
            .ok_or(VaultError::VaultLocked)?
            .clone();

        let blob = std::fs::read_to_string(path)?;
        let plaintext = Self::open_blob(&blob, &password)?;
        let json = String::from_utf8(plaintext)
            .map_err(|_| VaultError::CorruptData("decrypted payload is not UTF-8".to_string()))?;
        let incoming = codec::deserialize(&json)?;

        let before = self.entries.len();
        for entry in incoming {
            let exists = self
                .entries
                .iter()
                .any(|e| e.same_identity(&entry.service, &entry.username));
            if !exists {
                self.entries.push(entry);
            }
        }
        let merged = self.entries.len() - before;

        if let Err(e) = self.persist() {
            self.entries.truncate(before);
            return Err(e);
        }

        info!("imported {} entries from {:?}", merged, path);
        Ok(merged)
    }

    /// Re-encrypt the vault under a new master password
    ///
    /// `current` must match the password the vault was unlocked with.
    pub fn change_master_password(&mut self, current: &str, new: &str) -> Result<()> {
        self.require_unlocked()?;

        let matches_current = self
            .master_password
            .as_ref()
            .is_some_and(|p| p.expose() == current);
        if !matches_current {
            return Err(VaultError::AuthenticationFailed);
        }
        Self::check_password_policy(new)?;

        let previous = self.master_password.replace(MasterPassword::new(new));

        if let Err(e) = self.persist() {
            self.master_password = previous;
            return Err(e);
        }

        info!("master password changed");
        Ok(())
    }

    fn require_unlocked(&self) -> Result<()> {
        if self.state == VaultState::Unlocked {
            Ok(())
        } else {
            Err(VaultError::VaultLocked)
        }
    }

    fn check_password_policy(password: &str) -> Result<()> {
        if password.chars().count() < MIN_MASTER_PASSWORD_LEN {
            return Err(VaultError::WeakMasterPassword(MIN_MASTER_PASSWORD_LEN));
        }
        Ok(())
    }

    /// Serialize, seal, and atomically replace the vault file
    fn persist(&self) -> Result<()> {
        let password = self
            .master_password
            .as_ref()
            .ok_or(VaultError::VaultLocked)?;

        let json = codec::serialize(&self.entries)?;
        let blob = Self::seal(json.as_bytes(), password)?;
        Self::write_atomic(&self.vault_path, &blob)?;

        debug!("persisted {} entries", self.entries.len());
        Ok(())
    }

    /// Encrypt plaintext under a fresh salt and nonce and pack it into a blob
    fn seal(plaintext: &[u8], password: &MasterPassword) -> Result<String> {
        let salt = generate_salt();
        let key = derive_key(password, &salt);
        let (nonce, ciphertext) = encrypt(plaintext, &key)?;
        Ok(codec::pack(&salt, &nonce, &ciphertext))
    }

    /// Unpack a blob and decrypt it with a key derived from its own salt
    fn open_blob(blob: &str, password: &MasterPassword) -> Result<Vec<u8>> {
        let (salt, nonce, ciphertext) = codec::unpack(blob)?;
        let key = derive_key(password, &salt);
        decrypt(&ciphertext, &key, &nonce)
    }

    /// Write-new-then-replace so a failed save never truncates the old file
    fn write_atomic(path: &Path, contents: &str) -> Result<()> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }

        let temp_path = path.with_extension("tmp");
        std::fs::write(&temp_path, contents)?;
        std::fs::rename(&temp_path, path)?;
        Ok(())
    }
}
