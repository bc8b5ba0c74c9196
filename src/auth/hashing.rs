//! One-way hashing for passwords, MPINs and card numbers.
//!
//! New hashes are argon2 PHC strings. Verification also understands the
//! `pbkdf2:<digest>[:<iterations>]$<salt>$<hex>` strings written by older
//! deployments.

use argon2::{
    Argon2, PasswordHasher, PasswordVerifier,
    password_hash::{PasswordHash, SaltString, rand_core::OsRng},
};
use pbkdf2::pbkdf2_hmac;
use sha2::{Sha256, Sha512};
use subtle::ConstantTimeEq;

use crate::error::PortalError;

/// Leading character that marks a stored MPIN value as hashed.
pub const HASH_MARKER: char = '#';

/// Iteration count assumed when a pbkdf2 string omits it.
const DEFAULT_PBKDF2_ITERATIONS: u32 = 600_000;

/// Hash `secret` with a fresh random salt.
pub fn hash_secret(secret: &str) -> Result<String, PortalError> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(secret.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| PortalError::Hashing(e.to_string()))
}

/// `hash_secret` on the blocking pool; argon2 is deliberately slow.
pub async fn hash_secret_blocking(secret: String) -> Result<String, PortalError> {
    tokio::task::spawn_blocking(move || hash_secret(&secret)).await?
}

/// Prefix `value` with the hash marker unless it already carries one.
pub fn with_hash_marker(value: &str) -> String {
    if value.starts_with(HASH_MARKER) {
        value.to_string()
    } else {
        format!("{HASH_MARKER}{value}")
    }
}

/// Check `provided` against a stored one-way hash. Values that are not a
/// recognised hash format simply fail.
pub fn verify_hash(stored: &str, provided: &str) -> bool {
    if stored.starts_with('$') {
        return verify_phc(stored, provided);
    }
    match WerkzeugPbkdf2::parse(stored) {
        Some(hash) => hash.verify(provided),
        None => false,
    }
}

fn verify_phc(stored: &str, provided: &str) -> bool {
    let Ok(parsed) = PasswordHash::new(stored) else {
        return false;
    };
    Argon2::default()
        .verify_password(provided.as_bytes(), &parsed)
        .is_ok()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Pbkdf2Digest {
    Sha256,
    Sha512,
}

#[derive(Debug, PartialEq, Eq)]
struct WerkzeugPbkdf2<'a> {
    digest: Pbkdf2Digest,
    iterations: u32,
    salt: &'a str,
    expected: Vec<u8>,
}

impl<'a> WerkzeugPbkdf2<'a> {
    fn parse(stored: &'a str) -> Option<Self> {
        let (method, rest) = stored.split_once('$')?;
        let (salt, digest_hex) = rest.split_once('$')?;

        let mut params = method.split(':');
        if params.next()? != "pbkdf2" {
            return None;
        }
        let digest = match params.next().unwrap_or("sha256") {
            "sha256" => Pbkdf2Digest::Sha256,
            "sha512" => Pbkdf2Digest::Sha512,
            _ => return None,
        };
        let iterations = match params.next() {
            Some(n) => n.parse::<u32>().ok().filter(|n| *n > 0)?,
            None => DEFAULT_PBKDF2_ITERATIONS,
        };
        if params.next().is_some() {
            return None;
        }

        let expected = hex::decode(digest_hex).ok()?;
        if expected.is_empty() || expected.len() > 64 {
            return None;
        }

        Some(Self {
            digest,
            iterations,
            salt,
            expected,
        })
    }

    fn verify(&self, provided: &str) -> bool {
        let mut derived = vec![0u8; self.expected.len()];
        let (password, salt) = (provided.as_bytes(), self.salt.as_bytes());
        match self.digest {
            Pbkdf2Digest::Sha256 => {
                pbkdf2_hmac::<Sha256>(password, salt, self.iterations, &mut derived)
            }
            Pbkdf2Digest::Sha512 => {
                pbkdf2_hmac::<Sha512>(password, salt, self.iterations, &mut derived)
            }
        }
        derived.ct_eq(&self.expected).into()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const PBKDF2_SHA256: &str = "pbkdf2:sha256:1000$NaClSalt$ceea50add10d8d7d9d751fcdc72864dd7c4864778f353fe621d0c35db312af68";
    const PBKDF2_SHA512: &str = "pbkdf2:sha512:1000$NaClSalt$a498e9a55d61cea83e0563a01bd6819918c3508394e461f42673f28e381069556219b213f97238ed7d0b57b50a1d1d7f6bdce525fa6159b032e72bc5eac3e40c";

    #[test]
    fn argon2_hash_verifies_only_original_secret() {
        let hash = hash_secret("1234").expect("hash");
        assert!(hash.starts_with("$argon2"));
        assert!(verify_hash(&hash, "1234"));
        assert!(!verify_hash(&hash, "1235"));
    }

    #[test]
    fn salts_differ_between_hashes() {
        let a = hash_secret("123456789012").expect("hash");
        let b = hash_secret("123456789012").expect("hash");
        assert_ne!(a, b);
    }

    #[test]
    fn verifies_pbkdf2_strings() {
        assert!(verify_hash(PBKDF2_SHA256, "Secret#123"));
        assert!(!verify_hash(PBKDF2_SHA256, "Secret#124"));
        assert!(verify_hash(PBKDF2_SHA512, "Secret#123"));
        assert!(!verify_hash(PBKDF2_SHA512, "secret#123"));
    }

    #[test]
    fn pbkdf2_iterations_default_when_omitted() {
        let parsed = WerkzeugPbkdf2::parse("pbkdf2:sha256$salt$00ff").expect("parses");
        assert_eq!(parsed.iterations, DEFAULT_PBKDF2_ITERATIONS);
        assert_eq!(parsed.digest, Pbkdf2Digest::Sha256);
        assert_eq!(parsed.expected, vec![0x00, 0xff]);
    }

    #[test]
    fn malformed_hashes_fail_without_error() {
        for stored in [
            "",
            "plaintext",
            "$argon2id$garbage",
            "pbkdf2:sha256:1000$salt",
            "pbkdf2:sha256:0$salt$00",
            "pbkdf2:md5:1000$salt$00",
            "pbkdf2:sha256:1000$salt$not-hex",
            "scrypt:32768:8:1$salt$00ff",
        ] {
            assert!(!verify_hash(stored, "anything"), "{stored}");
        }
    }

    #[test]
    fn marker_is_added_once() {
        assert_eq!(with_hash_marker("abc"), "#abc");
        assert_eq!(with_hash_marker("#abc"), "#abc");
    }
}
