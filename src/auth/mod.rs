//! Password storage formats and verification.

pub mod hashing;
pub mod legacy_cipher;
pub mod verifier;

pub use hashing::{HASH_MARKER, hash_secret, hash_secret_blocking, verify_hash, with_hash_marker};
pub use legacy_cipher::{LEGACY_KEY, LegacyCipher};
pub use verifier::CredentialVerifier;
