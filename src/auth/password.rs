//! bcrypt password hashing.

use tracing::warn;

/// Work factor used for stored password hashes.
pub const DEFAULT_COST: u32 = 10;

#[derive(Clone, Copy, Debug)]
pub struct PasswordHasher {
    cost: u32,
}

impl PasswordHasher {
    #[must_use]
    pub fn new(cost: u32) -> Self {
        Self { cost }
    }

    #[must_use]
    pub fn cost(&self) -> u32 {
        self.cost
    }

    /// Hash `password` with a fresh salt.
    ///
    /// # Errors
    /// Returns an error if the cost is outside the range bcrypt accepts.
    pub fn hash(&self, password: &str) -> Result<String, bcrypt::BcryptError> {
        bcrypt::hash(password, self.cost)
    }

    /// Compare `password` against a stored hash.
    ///
    /// A malformed hash is reported as a mismatch.
    #[must_use]
    pub fn verify(&self, password: &str, password_hash: &str) -> bool {
        match bcrypt::verify(password, password_hash) {
            Ok(matches) => matches,
            Err(err) => {
                warn!("Failed to verify password hash: {err}");
                false
            }
        }
    }
}

impl Default for PasswordHasher {
    fn default() -> Self {
        Self::new(DEFAULT_COST)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    // Lowest cost bcrypt accepts, keeps the suite fast.
    fn fast_hasher() -> PasswordHasher {
        PasswordHasher::new(4)
    }

    #[test]
    fn default_cost_is_ten() {
        assert_eq!(PasswordHasher::default().cost(), 10);
    }

    #[test]
    fn hash_is_salted() {
        let hasher = fast_hasher();
        let first = hasher.hash("twixrox").unwrap();
        let second = hasher.hash("twixrox").unwrap();
        assert_ne!(first, second);
        assert!(hasher.verify("twixrox", &first));
        assert!(hasher.verify("twixrox", &second));
    }

    #[test]
    fn verify_rejects_wrong_password() {
        let hasher = fast_hasher();
        let hash = hasher.hash("twixrox").unwrap();
        assert!(!hasher.verify("twixr0x", &hash));
    }

    #[test]
    fn verify_treats_malformed_hash_as_mismatch() {
        assert!(!fast_hasher().verify("twixrox", "not-a-bcrypt-hash"));
    }

    #[test]
    fn stored_hash_carries_cost() {
        let hash = PasswordHasher::default().hash("twixrox").unwrap();
        assert!(hash.starts_with("$2b$10$"));
    }
}
