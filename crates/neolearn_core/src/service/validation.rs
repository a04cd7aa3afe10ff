//! Form validation helpers for registration and task entry.
//!
//! # Invariants
//! - Validators never short-circuit; every failing rule is reported.

use once_cell::sync::Lazy;
use regex::Regex;

static EMAIL_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("valid email regex"));
static UPPERCASE_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"[A-Z]").expect("valid upper regex"));
static LOWERCASE_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"[a-z]").expect("valid lower regex"));
static DIGIT_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\d").expect("valid digit regex"));

pub const MIN_PASSWORD_LEN: usize = 8;

/// Returns whether `email` looks like `local@domain.tld`.
pub fn validate_email(email: &str) -> bool {
    EMAIL_RE.is_match(email)
}

/// Checks password strength rules.
///
/// Returns every violated rule as a user-facing message; empty when valid.
pub fn validate_password(password: &str) -> Vec<String> {
    let mut errors = Vec::new();
    if password.chars().count() < MIN_PASSWORD_LEN {
        errors.push(format!(
            "Password must be at least {MIN_PASSWORD_LEN} characters long"
        ));
    }
    if !UPPERCASE_RE.is_match(password) {
        errors.push("Password must contain at least one uppercase letter".to_string());
    }
    if !LOWERCASE_RE.is_match(password) {
        errors.push("Password must contain at least one lowercase letter".to_string());
    }
    if !DIGIT_RE.is_match(password) {
        errors.push("Password must contain at least one number".to_string());
    }
    errors
}

/// Returns a "required" message when `value` is blank.
pub fn require(field_label: &str, value: &str) -> Option<String> {
    if value.trim().is_empty() {
        Some(format!("Please enter {field_label}"))
    } else {
        None
    }
}
