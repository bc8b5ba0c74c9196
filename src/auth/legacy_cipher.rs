//! Reversible per-character shift used by older deployments to store passwords.
//!
//! This is not encryption in any meaningful sense: anyone holding a stored
//! value can recover the password by trying every key. It is kept only so
//! that passwords written by those deployments keep working.

/// Key every legacy deployment used.
pub const LEGACY_KEY: u32 = 3;

const SURROGATE_START: u32 = 0xD800;
const SURROGATE_LEN: u32 = 0x800;
/// Number of Unicode scalar values (code points minus surrogates).
const SCALAR_COUNT: u32 = 0x11_0000 - SURROGATE_LEN;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LegacyCipher {
    key: u32,
}

impl Default for LegacyCipher {
    fn default() -> Self {
        Self::new(LEGACY_KEY)
    }
}

impl LegacyCipher {
    pub fn new(key: u32) -> Self {
        Self {
            key: key % SCALAR_COUNT,
        }
    }

    pub fn encrypt(&self, plain: &str) -> String {
        plain.chars().map(|c| shift(c, self.key)).collect()
    }

    pub fn decrypt(&self, cipher: &str) -> String {
        let back = (SCALAR_COUNT - self.key) % SCALAR_COUNT;
        cipher.chars().map(|c| shift(c, back)).collect()
    }
}

/// Rotate `c` by `offset` positions over the scalar values, skipping the
/// surrogate block so the result is always a valid `char`.
fn shift(c: char, offset: u32) -> char {
    let index = to_index(c as u32);
    let rotated = (index + offset) % SCALAR_COUNT;
    char::from_u32(from_index(rotated)).unwrap_or(char::REPLACEMENT_CHARACTER)
}

fn to_index(scalar: u32) -> u32 {
    if scalar >= SURROGATE_START {
        scalar - SURROGATE_LEN
    } else {
        scalar
    }
}

fn from_index(index: u32) -> u32 {
    if index >= SURROGATE_START {
        index + SURROGATE_LEN
    } else {
        index
    }
}
