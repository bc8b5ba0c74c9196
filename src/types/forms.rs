use serde::Deserialize;
use thiserror::Error as ThisError;

/// Reasons a registration is rejected. `Display` is the message shown to
/// the user above the form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ThisError)]
pub enum RegistrationError {
    #[error(
        "Password must be at least 8 characters and include a letter, number, and special character."
    )]
    WeakPassword,
    #[error("MPIN must be exactly 4 digits.")]
    InvalidMpin,
    #[error("ATM card number must be exactly 12 digits.")]
    InvalidCardNumber,
    #[error("An account with this email already exists.")]
    DuplicateEmail,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RegisterForm {
    pub name: String,
    pub email: String,
    pub password: String,
    pub mpin: String,
    pub credit_card: String,
}

impl RegisterForm {
    /// Trim free-text fields and case-fold the email. The password is kept verbatim.
    pub fn normalized(self) -> Self {
        Self {
            name: self.name.trim().to_string(),
            email: normalize_email(&self.email),
            password: self.password,
            mpin: self.mpin.trim().to_string(),
            credit_card: self.credit_card.trim().to_string(),
        }
    }

    /// Format checks, in the order their messages take priority.
    pub fn validate(&self) -> Result<(), RegistrationError> {
        if !meets_password_policy(&self.password) {
            return Err(RegistrationError::WeakPassword);
        }
        if !is_digits(&self.mpin, 4) {
            return Err(RegistrationError::InvalidMpin);
        }
        if !is_digits(&self.credit_card, 12) {
            return Err(RegistrationError::InvalidCardNumber);
        }
        Ok(())
    }

    /// Last four digits of a validated card number.
    pub fn card_last4(&self) -> String {
        let start = self.credit_card.len().saturating_sub(4);
        self.credit_card[start..].to_string()
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct LoginForm {
    pub email: String,
    pub password: String,
}

pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

/// At least 8 characters on a single line, with an ASCII letter, an ASCII
/// digit, and something that is neither. One trailing newline is tolerated
/// and itself counts as the non-alphanumeric character.
pub fn meets_password_policy(password: &str) -> bool {
    let (line, trailing_newline) = match password.strip_suffix('\n') {
        Some(line) => (line, true),
        None => (password, false),
    };
    line.chars().count() >= 8
        && !line.contains('\n')
        && line.chars().any(|c| c.is_ascii_alphabetic())
        && line.chars().any(|c| c.is_ascii_digit())
        && (trailing_newline || line.chars().any(|c| !c.is_ascii_alphanumeric()))
}

fn is_digits(value: &str, len: usize) -> bool {
    value.len() == len && value.bytes().all(|b| b.is_ascii_digit())
}
