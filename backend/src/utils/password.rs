//! One-way password hashing with bcrypt.

use bcrypt::{BcryptError, DEFAULT_COST, non_truncating_hash, non_truncating_verify};

/// Hashes and verifies stored credentials.
#[derive(Debug, Clone, Copy)]
pub struct PasswordHasher {
    cost: u32,
}

impl PasswordHasher {
    pub fn new(cost: u32) -> Self {
        Self { cost }
    }

    /// Longest plaintext bcrypt can hash without dropping bytes.
    pub const MAX_PASSWORD_BYTES: usize = 72;

    /// Hashes a plaintext password. Each call embeds a fresh random salt.
    /// Plaintexts longer than [`Self::MAX_PASSWORD_BYTES`] are an error.
    pub fn hash(&self, plaintext: &str) -> Result<String, BcryptError> {
        non_truncating_hash(plaintext, self.cost)
    }

    /// Returns `true` iff `plaintext` matches `digest`. A malformed digest
    /// or an over-long plaintext never matches.
    pub fn verify(&self, plaintext: &str, digest: &str) -> bool {
        non_truncating_verify(plaintext, digest).unwrap_or(false)
    }
}

impl Default for PasswordHasher {
    fn default() -> Self {
        Self::new(DEFAULT_COST)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TEST_COST: u32 = 4;

    #[test]
    fn test_hash_then_verify() {
        let hasher = PasswordHasher::new(TEST_COST);
        let digest = hasher.hash("pw1").unwrap();

        assert_ne!(digest, "pw1");
        assert!(hasher.verify("pw1", &digest));
        assert!(!hasher.verify("wrong", &digest));
    }

    #[test]
    fn test_same_password_gets_fresh_salt() {
        let hasher = PasswordHasher::new(TEST_COST);
        let first = hasher.hash("pw1").unwrap();
        let second = hasher.hash("pw1").unwrap();

        assert_ne!(first, second);
        assert!(hasher.verify("pw1", &first));
        assert!(hasher.verify("pw1", &second));
    }

    #[test]
    fn test_malformed_digest_does_not_match() {
        let hasher = PasswordHasher::new(TEST_COST);

        assert!(!hasher.verify("pw1", ""));
        assert!(!hasher.verify("pw1", "not-a-bcrypt-digest"));
        assert!(!hasher.verify("pw1", "$2b$04$tooshort"));
    }

    #[test]
    fn test_invalid_cost_is_an_error() {
        let hasher = PasswordHasher::new(2);
        assert!(hasher.hash("pw1").is_err());
    }

    #[test]
    fn test_default_hasher_round_trips() {
        let hasher = PasswordHasher::default();
        let digest = hasher.hash("pw1").unwrap();

        assert!(digest.contains(&format!("${:02}$", DEFAULT_COST)));
        assert!(hasher.verify("pw1", &digest));
    }

    #[test]
    fn test_bytes_past_the_limit_are_not_ignored() {
        let hasher = PasswordHasher::new(TEST_COST);
        let prefix = "A".repeat(PasswordHasher::MAX_PASSWORD_BYTES);
        let digest = hasher.hash(&prefix).unwrap();

        assert!(hasher.verify(&prefix, &digest));
        assert!(!hasher.verify(&format!("{}WRONG", prefix), &digest));
        assert!(hasher.hash(&format!("{}correct", prefix)).is_err());
    }
}
