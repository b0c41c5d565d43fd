//! API key secret generation and hashing

use rand::Rng;
use sha2::{Digest, Sha256};

/// Prefix that identifies an API key in an `Authorization` header
pub const API_KEY_PREFIX: &str = "ak_";

/// Random bytes per key (rendered as twice as many hex chars)
const SECRET_BYTES: usize = 20;

/// Result of API key generation
#[derive(Debug, Clone)]
pub struct GeneratedApiKey {
    /// The full secret (only shown once!)
    pub secret: String,
    /// SHA-256 of the secret, hex encoded
    pub secret_hash: String,
    /// Last four characters of the secret, for display
    pub last4: String,
}

/// Generate a new API key: `ak_<40 hex chars>`
pub fn generate_api_key() -> GeneratedApiKey {
    let mut rng = rand::thread_rng();
    let random_bytes: [u8; SECRET_BYTES] = rng.gen();
    let secret = format!("{}{}", API_KEY_PREFIX, hex::encode(random_bytes));

    let last4 = secret[secret.len() - 4..].to_string();
    let secret_hash = hash_api_key(&secret);

    GeneratedApiKey {
        secret,
        secret_hash,
        last4,
    }
}

/// Hash an API key for storage using SHA-256
pub fn hash_api_key(key: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(key.as_bytes());
    hex::encode(hasher.finalize())
}

/// Whether `s` looks like a key produced by [`generate_api_key`]
pub fn is_api_key_format(s: &str) -> bool {
    s.strip_prefix(API_KEY_PREFIX)
        .is_some_and(|rest| rest.len() == SECRET_BYTES * 2 && rest.bytes().all(|b| b.is_ascii_hexdigit()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generated_key_has_expected_shape() {
        let generated = generate_api_key();
        assert!(generated.secret.starts_with(API_KEY_PREFIX));
        assert_eq!(generated.secret.len(), API_KEY_PREFIX.len() + 40);
        assert!(is_api_key_format(&generated.secret));
        assert!(generated.secret.ends_with(&generated.last4));
        assert_eq!(generated.secret_hash, hash_api_key(&generated.secret));
    }

    #[test]
    fn generated_keys_are_unique() {
        let a = generate_api_key();
        let b = generate_api_key();
        assert_ne!(a.secret, b.secret);
        assert_ne!(a.secret_hash, b.secret_hash);
    }

    #[test]
    fn rejects_foreign_formats() {
        assert!(!is_api_key_format("eyJhbGciOiJIUzI1NiJ9.e30.sig"));
        assert!(!is_api_key_format("ak_short"));
        assert!(!is_api_key_format(&format!("ak_{}", "z".repeat(40))));
    }
}
