use std::fmt::{self, Write};

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

/// Hex characters kept from the SHA-256 digest of a credential.
pub const FINGERPRINT_LEN: usize = 16;

/// Non-reversible identifier of an API credential.
///
/// Only the first 64 bits of the digest are kept, so two distinct keys can
/// collide. That is acceptable for a handful of keys per organization.
#[derive(Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct CredentialFingerprint(String);

impl CredentialFingerprint {
    pub fn of(credential: &str) -> Self {
        let digest = Sha256::digest(credential.as_bytes());
        let mut hex = hex_digest(&digest);
        hex.truncate(FINGERPRINT_LEN);
        Self(hex)
    }

    /// Wraps a fingerprint that was already computed, e.g. read back from storage.
    pub fn from_stored(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for CredentialFingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "CredentialFingerprint({})", self.0)
    }
}

impl fmt::Display for CredentialFingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

fn hex_digest(bytes: &[u8]) -> String {
    let mut out = String::with_capacity(bytes.len() * 2);
    for byte in bytes {
        let _ = write!(&mut out, "{:02x}", byte);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fingerprint_is_truncated_sha256() {
        let fp = CredentialFingerprint::of("k1");
        assert_eq!(fp.as_str(), "6ab9f1eb8f7d3388");
        assert_eq!(fp.as_str().len(), FINGERPRINT_LEN);
        assert!(fp.as_str().chars().all(|c| c.is_ascii_hexdigit()));
        assert_eq!(fp, CredentialFingerprint::of("k1"));
        assert_ne!(fp, CredentialFingerprint::of("k2"));
    }

    #[test]
    fn fingerprint_never_contains_secret() {
        let secret = "sk-ant-0123456789abcdef";
        let fp = CredentialFingerprint::of(secret);
        assert!(!fp.as_str().contains("sk-ant"));
        assert!(!format!("{:?}", fp).contains(secret));
    }
}
