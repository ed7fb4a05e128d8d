//! Vault entry type definitions

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use zeroize::Zeroize;

/// One stored credential
///
/// Identity within a vault is the `(service, username)` pair, compared
/// case-insensitively.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VaultEntry {
    /// Service name (e.g. "GitHub")
    pub service: String,

    /// Account username or email
    pub username: String,

    /// The stored secret
    pub password: String,

    /// Free-form notes
    #[serde(default)]
    pub notes: String,

    /// Created timestamp, immutable after creation
    pub created_at: DateTime<Utc>,

    /// Refreshed on every mutation
    pub updated_at: DateTime<Utc>,
}

/// Partial update for an existing entry; `None` fields are left untouched
#[derive(Debug, Clone, Default)]
pub struct EntryUpdate {
    pub service: Option<String>,
    pub username: Option<String>,
    pub password: Option<String>,
    pub notes: Option<String>,
}

impl VaultEntry {
    /// Create a new entry stamped with the current time
    pub fn new(
        service: impl Into<String>,
        username: impl Into<String>,
        password: impl Into<String>,
        notes: impl Into<String>,
    ) -> Self {
        let now = Utc::now();
        Self {
            service: service.into(),
            username: username.into(),
            password: password.into(),
            notes: notes.into(),
            created_at: now,
            updated_at: now,
        }
    }

    /// Case-insensitive identity comparison
    pub fn same_identity(&self, service: &str, username: &str) -> bool {
        self.service.eq_ignore_ascii_case(service) && self.username.eq_ignore_ascii_case(username)
    }

    /// Case-insensitive substring match over service, username, and notes
    pub fn matches(&self, query: &str) -> bool {
        let query = query.to_lowercase();
        self.service.to_lowercase().contains(&query)
            || self.username.to_lowercase().contains(&query)
            || self.notes.to_lowercase().contains(&query)
    }

    /// Apply a partial update and refresh `updated_at`
    pub fn apply(&mut self, update: EntryUpdate) {
        if let Some(service) = update.service {
            self.service = service;
        }
        if let Some(username) = update.username {
            self.username = username;
        }
        if let Some(password) = update.password {
            self.password = password;
        }
        if let Some(notes) = update.notes {
            self.notes = notes;
        }
        self.updated_at = Utc::now();
    }

    /// Best-effort scrub of the secret, used when the vault locks
    pub(crate) fn scrub(&mut self) {
        self.password.zeroize();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_same_identity_case_insensitive() {
        let entry = VaultEntry::new("Gmail", "a@x.com", "pw", "");

        assert!(entry.same_identity("gmail", "A@X.COM"));
        assert!(entry.same_identity("GMAIL", "a@x.com"));
        assert!(!entry.same_identity("Gmail", "b@x.com"));
    }

    #[test]
    fn test_matches_query() {
        let entry = VaultEntry::new("GitHub", "dev@example.com", "pw", "work account");

        assert!(entry.matches("hub"));
        assert!(entry.matches("DEV@"));
        assert!(entry.matches("work"));
        assert!(!entry.matches("gitlab"));
    }

    #[test]
    fn test_apply_partial_update() {
        let mut entry = VaultEntry::new("GitHub", "dev@example.com", "old", "");
        let created = entry.created_at;

        entry.apply(EntryUpdate {
            password: Some("new".to_string()),
            ..Default::default()
        });

        assert_eq!(entry.password, "new");
        assert_eq!(entry.service, "GitHub");
        assert_eq!(entry.created_at, created);
        assert!(entry.updated_at >= created);
    }

    #[test]
    fn test_serde_field_names() {
        let entry = VaultEntry::new("GitHub", "dev@example.com", "pw", "note");
        let json = serde_json::to_value(&entry).unwrap();

        assert_eq!(json["service"], "GitHub");
        assert_eq!(json["username"], "dev@example.com");
        assert_eq!(json["password"], "pw");
        assert_eq!(json["notes"], "note");
        assert!(json["created_at"].is_string());
        assert!(json["updated_at"].is_string());
    }
}
