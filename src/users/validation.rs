use crate::validator::{self, Validator, EMAIL_RX};

use super::repo_types::User;

/// Raised when a user reaches validation without a hashed credential.
/// That only happens through a bug in the calling code, never through input.
#[derive(Debug, thiserror::Error)]
#[error("missing password hash for user")]
pub struct InvariantViolation;

pub fn validate_user(v: &mut Validator, user: &User) -> Result<(), InvariantViolation> {
    validate_profile(v, user);

    if let Some(plain) = user.password.plaintext() {
        validate_password_plaintext(v, plain);
    }

    if user.password.hash().is_none() {
        return Err(InvariantViolation);
    }
    Ok(())
}

/// Username and email rules; everything except the credential.
pub fn validate_profile(v: &mut Validator, user: &User) {
    v.check(!user.username.is_empty(), "username", "must be provided");
    v.check(user.username.len() <= 100, "username", "must not be more than 100 bytes long");

    validate_email(v, &user.email);
}

pub fn validate_email(v: &mut Validator, email: &str) {
    v.check(!email.is_empty(), "email", "must be provided");
    v.check(email.len() <= 255, "email", "must not be more than 255 bytes long");
    v.check(validator::matches(email, &EMAIL_RX), "email", "must be a valid email address");
}

pub fn validate_password_plaintext(v: &mut Validator, password: &str) {
    v.check(!password.is_empty(), "password", "must be provided");
    v.check(password.len() >= 8, "password", "must be at least 8 bytes long");
    v.check(password.len() <= 72, "password", "must not be more than 72 bytes long");
}
