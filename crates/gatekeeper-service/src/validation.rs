//! Request shapes accepted by the services, with input validation.

use std::borrow::Cow;

use serde::{Deserialize, Serialize};
use validator::{Validate, ValidationError};

use gatekeeper_core::error::AppError;

/// Longest accepted username, in bytes.
pub const MAX_USERNAME_LENGTH: u64 = 128;
/// Longest accepted email, in bytes.
pub const MAX_EMAIL_LENGTH: u64 = 256;

/// Registration input.
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
pub struct RegisterRequest {
    /// Login name; defaults to the email when empty.
    #[serde(default)]
    #[validate(length(max = 128, message = "username too long"))]
    pub username: String,
    /// Email address.
    #[validate(
        length(max = 256, message = "email too long"),
        custom(function = "email_shape")
    )]
    pub email: String,
    /// Plaintext password. The minimum length is configured.
    #[validate(custom(function = "required_password"))]
    pub password: String,
    /// `client`, `operator` or `admin`; defaults to `client` when empty.
    #[serde(default)]
    pub role: String,
}

/// Login input.
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
pub struct LoginRequest {
    /// Email address.
    #[validate(custom(function = "required_email"))]
    pub email: String,
    /// Plaintext password.
    #[validate(custom(function = "required_password"))]
    pub password: String,
}

/// Profile changes. Absent fields are left untouched.
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
pub struct UpdateProfileRequest {
    /// New login name.
    #[validate(length(min = 1, max = 128, message = "username must be 1 to 128 characters"))]
    pub username: Option<String>,
    /// New email.
    #[validate(
        length(max = 256, message = "email too long"),
        custom(function = "email_shape")
    )]
    pub email: Option<String>,
    /// New plaintext password.
    pub password: Option<String>,
}

/// Run the derived checks and fold any failures into one validation error.
pub fn check<T: Validate>(input: &T) -> Result<(), AppError> {
    input
        .validate()
        .map_err(|errors| AppError::validation(format!("validation: {errors}")))
}

/// Enforce the configured minimum password length (in characters).
pub fn check_password_length(password: &str, min_length: usize) -> Result<(), AppError> {
    if password.chars().count() < min_length {
        return Err(AppError::validation(format!(
            "validation: password must be at least {min_length} characters"
        )));
    }
    Ok(())
}

/// `local@domain.tld`: exactly one `@`, non-empty local part, and a dot in
/// the domain with at least one character on each side.
pub fn is_valid_email(email: &str) -> bool {
    let Some((local, domain)) = email.split_once('@') else {
        return false;
    };
    if local.is_empty() || domain.contains('@') {
        return false;
    }
    domain
        .char_indices()
        .any(|(i, c)| c == '.' && i > 0 && i + 1 < domain.len())
}

fn failure(code: &'static str, message: &'static str) -> ValidationError {
    ValidationError::new(code).with_message(Cow::Borrowed(message))
}

fn email_shape(email: &str) -> Result<(), ValidationError> {
    if email.trim().is_empty() {
        return Err(failure("required", "email is required"));
    }
    if !is_valid_email(email) {
        return Err(failure("email", "email format is invalid"));
    }
    Ok(())
}

fn required_email(email: &str) -> Result<(), ValidationError> {
    if email.trim().is_empty() {
        return Err(failure("required", "email is required"));
    }
    Ok(())
}

fn required_password(password: &str) -> Result<(), ValidationError> {
    if password.trim().is_empty() {
        return Err(failure("required", "password is required"));
    }
    Ok(())
}
