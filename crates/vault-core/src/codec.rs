//! Vault blob packaging and JSON serialization
//!
//! On-disk blob format: `base64(salt(16) || nonce(12) || ciphertext+tag)`.
//! The plaintext inside is a JSON document `{"entries": [...]}` preserving
//! insertion order.

use base64::{engine::general_purpose::STANDARD, Engine as _};
use serde::{Deserialize, Serialize};

use crate::crypto::{NONCE_LEN, SALT_LEN, TAG_LEN};
use crate::entry::VaultEntry;
use crate::error::{Result, VaultError};

/// Smallest decodable blob: salt, nonce, and the tag of an empty ciphertext
const MIN_BLOB_LEN: usize = SALT_LEN + NONCE_LEN + TAG_LEN;

/// Plaintext document stored inside the encrypted blob
#[derive(Debug, Serialize, Deserialize)]
struct VaultDocument {
    entries: Vec<VaultEntry>,
}

/// Pack salt, nonce, and ciphertext into a single base64 blob
pub fn pack(salt: &[u8; SALT_LEN], nonce: &[u8; NONCE_LEN], ciphertext: &[u8]) -> String {
    let mut combined = Vec::with_capacity(SALT_LEN + NONCE_LEN + ciphertext.len());
    combined.extend_from_slice(salt);
    combined.extend_from_slice(nonce);
    combined.extend_from_slice(ciphertext);
    STANDARD.encode(combined)
}

/// Split a base64 blob back into salt, nonce, and ciphertext
///
/// Fails with [`VaultError::CorruptData`] on malformed base64 or a decoded
/// length below the minimum.
pub fn unpack(blob: &str) -> Result<([u8; SALT_LEN], [u8; NONCE_LEN], Vec<u8>)> {
    let combined = STANDARD
        .decode(blob.trim())
        .map_err(|e| VaultError::CorruptData(format!("invalid base64: {}", e)))?;

    if combined.len() < MIN_BLOB_LEN {
        return Err(VaultError::CorruptData(format!(
            "blob too short: {} bytes, need at least {}",
            combined.len(),
            MIN_BLOB_LEN
        )));
    }

    let mut salt = [0u8; SALT_LEN];
    salt.copy_from_slice(&combined[..SALT_LEN]);

    let mut nonce = [0u8; NONCE_LEN];
    nonce.copy_from_slice(&combined[SALT_LEN..SALT_LEN + NONCE_LEN]);

    let ciphertext = combined[SALT_LEN + NONCE_LEN..].to_vec();

    Ok((salt, nonce, ciphertext))
}

/// Serialize entries to the JSON vault document
pub fn serialize(entries: &[VaultEntry]) -> Result<String> {
    let document = VaultDocument {
        entries: entries.to_vec(),
    };
    Ok(serde_json::to_string_pretty(&document)?)
}

/// Parse a JSON vault document back into entries, preserving order
pub fn deserialize(json: &str) -> Result<Vec<VaultEntry>> {
    let document: VaultDocument = serde_json::from_str(json)
        .map_err(|e| VaultError::CorruptData(format!("invalid vault document: {}", e)))?;
    Ok(document.entries)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pack_unpack_roundtrip() {
        let salt = [1u8; SALT_LEN];
        let nonce = [2u8; NONCE_LEN];
        let ciphertext = vec![3u8; 48];

        let blob = pack(&salt, &nonce, &ciphertext);
        let (salt2, nonce2, ciphertext2) = unpack(&blob).unwrap();

        assert_eq!(salt, salt2);
        assert_eq!(nonce, nonce2);
        assert_eq!(ciphertext, ciphertext2);
    }

    #[test]
    fn test_unpack_tolerates_surrounding_whitespace() {
        let blob = pack(&[0u8; SALT_LEN], &[0u8; NONCE_LEN], &[0u8; TAG_LEN]);
        assert!(unpack(&format!("{}\n", blob)).is_ok());
    }

    #[test]
    fn test_unpack_rejects_malformed_base64() {
        let result = unpack("this is !!! not base64");
        assert!(matches!(result, Err(VaultError::CorruptData(_))));
    }

    #[test]
    fn test_unpack_rejects_truncated_blob() {
        // Valid base64, but shorter than salt + nonce + tag
        let blob = STANDARD.encode([0u8; MIN_BLOB_LEN - 1]);
        let result = unpack(&blob);
        assert!(matches!(result, Err(VaultError::CorruptData(_))));
    }

    #[test]
    fn test_serialize_deserialize_preserves_order() {
        let entries = vec![
            VaultEntry::new("zeta", "z@example.com", "pw1", ""),
            VaultEntry::new("alpha", "a@example.com", "pw2", "first"),
            VaultEntry::new("mid", "m@example.com", "pw3", ""),
        ];

        let json = serialize(&entries).unwrap();
        let parsed = deserialize(&json).unwrap();

        assert_eq!(parsed, entries);
    }

    #[test]
    fn test_deserialize_rejects_garbage() {
        assert!(matches!(
            deserialize("not json"),
            Err(VaultError::CorruptData(_))
        ));
        assert!(matches!(
            deserialize(r#"{"something": "else"}"#),
            Err(VaultError::CorruptData(_))
        ));
    }

    #[test]
    fn test_empty_vault_document() {
        let json = serialize(&[]).unwrap();
        let parsed = deserialize(&json).unwrap();
        assert!(parsed.is_empty());
    }
}
