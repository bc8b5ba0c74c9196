use subtle::ConstantTimeEq;

use super::hashing::verify_hash;
use super::legacy_cipher::LegacyCipher;

/// Checks a submitted password against the stored `password` column, which
/// may hold either a legacy shift-transformed value or a one-way hash.
#[derive(Debug, Clone, Copy, Default)]
pub struct CredentialVerifier {
    cipher: LegacyCipher,
}

impl CredentialVerifier {
    pub fn new(cipher: LegacyCipher) -> Self {
        Self { cipher }
    }

    pub fn cipher(&self) -> &LegacyCipher {
        &self.cipher
    }

    /// Pure comparison; a malformed stored hash is a failed match.
    pub fn verify(&self, stored: &str, provided: &str) -> bool {
        let transformed = self.cipher.encrypt(provided);
        if bool::from(transformed.as_bytes().ct_eq(stored.as_bytes())) {
            return true;
        }
        verify_hash(stored, provided)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::hashing::hash_secret;

    #[test]
    fn accepts_legacy_transformed_password() {
        let verifier = CredentialVerifier::default();
        for password in ["Secret#123", "pässwörd!9", ""] {
            let stored = verifier.cipher().encrypt(password);
            assert!(verifier.verify(&stored, password));
        }
        assert!(!verifier.verify("Vhfuhw&456", "Secret#124"));
    }

    #[test]
    fn stored_plaintext_is_not_accepted() {
        let verifier = CredentialVerifier::default();
        assert!(!verifier.verify("Secret#123", "Secret#123"));
    }

    #[test]
    fn accepts_modern_hash() {
        let verifier = CredentialVerifier::default();
        let stored = hash_secret("Secret#123").expect("hash");
        assert!(verifier.verify(&stored, "Secret#123"));
        assert!(!verifier.verify(&stored, "Secret#12"));
    }

    #[test]
    fn malformed_stored_value_is_a_failure() {
        let verifier = CredentialVerifier::default();
        assert!(!verifier.verify("$argon2id$v=19$broken", "Secret#123"));
        assert!(!verifier.verify("pbkdf2:sha256:x$salt$zz", "Secret#123"));
    }
}
