//! Client-side form rules. A failure here never reaches the network.

use std::collections::BTreeMap;

use models::{LoginInput, RegisterInput};
use serde::Serialize;
use thiserror::Error;

/// Characters accepted by the "special character" password rule.
const SPECIAL_CHARS: &str = r#"!@#$%^&*()_+-=[]{};':"\|,.<>/?"#;

pub const MIN_PASSWORD_LEN: usize = 8;
pub const MIN_TITLE_LEN: usize = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum PasswordRule {
    MinLength,
    HasUppercase,
    HasLowercase,
    HasSpecial,
}

impl PasswordRule {
    pub fn key(&self) -> &'static str {
        match self {
            PasswordRule::MinLength => "minLength",
            PasswordRule::HasUppercase => "hasUppercase",
            PasswordRule::HasLowercase => "hasLowercase",
            PasswordRule::HasSpecial => "hasSpecial",
        }
    }
}

/// Violated rules mapped to `true`.
pub type PasswordViolations = BTreeMap<PasswordRule, bool>;

#[derive(Debug, Clone, Error, PartialEq)]
pub enum ValidationError {
    #[error("{field} is required")]
    Required { field: &'static str },
    #[error("{field} must be at least {min} characters")]
    TooShort { field: &'static str, min: usize },
    #[error("amount must be greater than 0")]
    NonPositiveAmount,
    #[error("{field} is not a valid email address")]
    InvalidEmail { field: &'static str },
    #[error("password is too weak ({})", rule_list(.0))]
    WeakPassword(Vec<PasswordRule>),
}

fn rule_list(rules: &[PasswordRule]) -> String {
    rules.iter().map(PasswordRule::key).collect::<Vec<_>>().join(", ")
}

/// Returns `None` when every rule passes.
pub fn password_strength(value: &str) -> Option<PasswordViolations> {
    let mut errors = PasswordViolations::new();
    if value.chars().count() < MIN_PASSWORD_LEN {
        errors.insert(PasswordRule::MinLength, true);
    }
    if !value.chars().any(|c| c.is_ascii_uppercase()) {
        errors.insert(PasswordRule::HasUppercase, true);
    }
    if !value.chars().any(|c| c.is_ascii_lowercase()) {
        errors.insert(PasswordRule::HasLowercase, true);
    }
    if !value.chars().any(|c| SPECIAL_CHARS.contains(c)) {
        errors.insert(PasswordRule::HasSpecial, true);
    }
    if errors.is_empty() { None } else { Some(errors) }
}

pub fn validate_title(title: &str) -> Result<(), ValidationError> {
    let title = title.trim();
    if title.is_empty() {
        return Err(ValidationError::Required { field: "title" });
    }
    if title.chars().count() < MIN_TITLE_LEN {
        return Err(ValidationError::TooShort { field: "title", min: MIN_TITLE_LEN });
    }
    Ok(())
}

pub fn validate_amount(amount: f64) -> Result<(), ValidationError> {
    if !amount.is_finite() || amount <= 0.0 {
        return Err(ValidationError::NonPositiveAmount);
    }
    Ok(())
}

pub fn validate_debt_fields(title: &str, amount: f64) -> Result<(), ValidationError> {
    validate_title(title)?;
    validate_amount(amount)
}

/// Structural email check: `local@domain`, no whitespace, dot-separated
/// non-empty domain labels that do not start or end with `-`.
pub fn is_valid_email(value: &str) -> bool {
    let Some((local, domain)) = value.split_once('@') else { return false };
    if local.is_empty() || domain.is_empty() || local.len() > 64 {
        return false;
    }
    if value.chars().any(char::is_whitespace) || domain.contains('@') {
        return false;
    }
    domain.split('.').all(|label| {
        !label.is_empty()
            && !label.starts_with('-')
            && !label.ends_with('-')
            && label.chars().all(|c| c.is_alphanumeric() || c == '-')
    })
}

fn require(field: &'static str, value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(ValidationError::Required { field });
    }
    Ok(())
}

fn require_email(value: &str) -> Result<(), ValidationError> {
    require("email", value)?;
    if !is_valid_email(value.trim()) {
        return Err(ValidationError::InvalidEmail { field: "email" });
    }
    Ok(())
}

pub fn validate_login(input: &LoginInput) -> Result<(), ValidationError> {
    require_email(&input.email)?;
    require("password", &input.password)
}

pub fn validate_register(input: &RegisterInput) -> Result<(), ValidationError> {
    require("firstName", &input.first_name)?;
    require("lastName", &input.last_name)?;
    require_email(&input.email)?;
    require("password", &input.password)?;
    if let Some(violations) = password_strength(&input.password) {
        return Err(ValidationError::WeakPassword(violations.into_keys().collect()));
    }
    Ok(())
}
