//! Storage key generation.
//!
//! Key format: `[{prefix}/]{token}.{ext}`. The token carries 256 bits of
//! entropy so keys are never reused in practice.

use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine as _};
use rand::RngCore;
use std::fmt::{Display, Formatter, Result as FmtResult};

/// Number of random bytes behind every key.
pub const TOKEN_BYTES: usize = 32;

/// A unique, filename-safe key under which a committed upload is stored.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct StorageKey(String);

impl StorageKey {
    /// Generate a fresh key with an optional classification prefix.
    ///
    /// `extension` comes from a validated media type and is used as-is.
    pub fn generate(prefix: Option<&str>, extension: &str) -> Self {
        let token = random_token();
        let key = match prefix.map(|p| p.trim_matches('/')).filter(|p| !p.is_empty()) {
            Some(prefix) => format!("{}/{}.{}", prefix, token, extension),
            None => format!("{}.{}", token, extension),
        };
        StorageKey(key)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Leading path segment, if the key was generated with one.
    pub fn prefix(&self) -> Option<&str> {
        self.0.split_once('/').map(|(prefix, _)| prefix)
    }
}

impl AsRef<str> for StorageKey {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl Display for StorageKey {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.write_str(&self.0)
    }
}

fn random_token() -> String {
    let mut bytes = [0u8; TOKEN_BYTES];
    rand::rng().fill_bytes(&mut bytes);
    URL_SAFE_NO_PAD.encode(bytes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    fn token_of(key: &StorageKey) -> &str {
        let name = key.as_str().rsplit('/').next().unwrap();
        name.rsplit_once('.').unwrap().0
    }

    #[test]
    fn test_keys_are_unique() {
        let keys: HashSet<StorageKey> = (0..10_000)
            .map(|_| StorageKey::generate(None, "png"))
            .collect();
        assert_eq!(keys.len(), 10_000);
    }

    #[test]
    fn test_token_is_url_safe_and_unpadded() {
        for _ in 0..1_000 {
            let key = StorageKey::generate(Some("portrait"), "mp4");
            let token = token_of(&key);
            assert_eq!(token.len(), 43);
            assert!(!token.contains('='));
            assert!(token
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_'));
            assert!(!key.as_str().contains(".."));
            assert!(!key.as_str().starts_with('/'));
        }
    }

    #[test]
    fn test_prefix_and_extension_layout() {
        let key = StorageKey::generate(Some("landscape"), "mp4");
        assert!(key.as_str().starts_with("landscape/"));
        assert!(key.as_str().ends_with(".mp4"));
        assert_eq!(key.prefix(), Some("landscape"));

        let key = StorageKey::generate(None, "jpeg");
        assert!(key.as_str().ends_with(".jpeg"));
        assert_eq!(key.prefix(), None);
    }

    #[test]
    fn test_prefix_slashes_are_normalized() {
        let key = StorageKey::generate(Some("/portrait/"), "mp4");
        assert!(key.as_str().starts_with("portrait/"));
        assert_eq!(key.as_str().matches('/').count(), 1);

        let key = StorageKey::generate(Some(""), "png");
        assert_eq!(key.prefix(), None);
    }
}
