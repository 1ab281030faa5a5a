//! Form-field validation.
//!
//! The predicates are pure; the form checks collect every failing field so the
//! front end can show all hints at once.

use std::sync::LazyLock;

use regex::Regex;

use crate::errors::{AppError, FieldError};
use crate::models::{ContactRequest, LoginRequest, SignupRequest};

static EMAIL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").unwrap());

static NAME_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^[A-Za-z\s]+$").unwrap());

const PASSWORD_HINT: &str =
    "Password must be at least 8 characters with uppercase, lowercase, and a number";

/// Whether `email` has the shape `local@domain.tld`.
pub fn is_valid_email(email: &str) -> bool {
    EMAIL_RE.is_match(email)
}

/// At least 8 characters including an ASCII lowercase letter, an ASCII uppercase letter and a digit.
pub fn is_strong_password(password: &str) -> bool {
    password.chars().count() >= 8
        && password.chars().any(|c| c.is_ascii_lowercase())
        && password.chars().any(|c| c.is_ascii_uppercase())
        && password.chars().any(|c| c.is_ascii_digit())
}

/// Letters and whitespace only.
pub fn is_valid_name(name: &str) -> bool {
    NAME_RE.is_match(name)
}

fn check_email(field: &str, email: &str, errors: &mut Vec<FieldError>) {
    if email.trim().is_empty() {
        errors.push(FieldError::new(field, "Email is required"));
    } else if !is_valid_email(email.trim()) {
        errors.push(FieldError::new(field, "Please enter a valid email address"));
    }
}

fn finish(errors: Vec<FieldError>) -> Result<(), AppError> {
    if errors.is_empty() {
        Ok(())
    } else {
        Err(AppError::Validation(errors))
    }
}

/// Validate the signup form. `email_taken` tells whether an account already
/// uses the address.
///
/// A taken email on an otherwise valid form is `DuplicateEmail`; next to
/// other failures it becomes one more field error.
pub fn validate_signup(request: &SignupRequest, email_taken: bool) -> Result<(), AppError> {
    let mut errors = Vec::new();

    let name = request.name.trim();
    if name.is_empty() {
        errors.push(FieldError::new("name", "Name is required"));
    } else if !is_valid_name(name) {
        errors.push(FieldError::new("name", "Name must contain only letters"));
    } else if name.chars().count() < 2 {
        errors.push(FieldError::new("name", "Name must be at least 2 characters"));
    }

    let before_email = errors.len();
    check_email("email", &request.email, &mut errors);
    let email_ok = errors.len() == before_email;

    if request.password.is_empty() {
        errors.push(FieldError::new("password", "Password is required"));
    } else if !is_strong_password(&request.password) {
        errors.push(FieldError::new("password", PASSWORD_HINT));
    }

    if request.confirm_password.is_empty() {
        errors.push(FieldError::new(
            "confirmPassword",
            "Please confirm your password",
        ));
    } else if request.confirm_password != request.password {
        errors.push(FieldError::new("confirmPassword", "Passwords do not match"));
    }

    if email_taken && email_ok {
        if errors.is_empty() {
            return Err(AppError::DuplicateEmail);
        }
        errors.insert(
            before_email,
            FieldError::new("email", &AppError::DuplicateEmail.message()),
        );
    }

    finish(errors)
}

/// Validate the login form.
pub fn validate_login(request: &LoginRequest) -> Result<(), AppError> {
    let mut errors = Vec::new();

    check_email("email", &request.email, &mut errors);
    if request.password.is_empty() {
        errors.push(FieldError::new("password", "Password is required"));
    }

    finish(errors)
}

/// Validate the contact form.
pub fn validate_contact(request: &ContactRequest) -> Result<(), AppError> {
    let mut errors = Vec::new();

    if request.name.trim().is_empty() {
        errors.push(FieldError::new("name", "Name is required"));
    }
    check_email("email", &request.email, &mut errors);
    if request.subject.trim().is_empty() {
        errors.push(FieldError::new("subject", "Subject is required"));
    }

    let message = request.message.trim();
    if message.is_empty() {
        errors.push(FieldError::new("message", "Message is required"));
    } else if message.chars().count() < 10 {
        errors.push(FieldError::new(
            "message",
            "Message must be at least 10 characters",
        ));
    }

    finish(errors)
}
