use lazy_static::lazy_static;
use regex::Regex;
use serde::Serialize;

use super::dto::{CreateUserInput, RawUserInput, UpdateUserInput};

pub const PASSWORD_MIN_LEN: usize = 6;

/// One failed rule on one field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldError {
    pub field: &'static str,
    pub rule: &'static str,
    pub message: String,
}

impl FieldError {
    pub fn required(field: &'static str) -> Self {
        Self {
            field,
            rule: "required",
            message: format!("{field} is required"),
        }
    }

    fn email(field: &'static str) -> Self {
        Self {
            field,
            rule: "email",
            message: format!("{field} must be a valid email"),
        }
    }

    fn min_length(field: &'static str, min: usize) -> Self {
        Self {
            field,
            rule: "minLength",
            message: format!("{field} must be at least {min} characters"),
        }
    }
}

pub(crate) fn is_valid_email(email: &str) -> bool {
    lazy_static! {
        static ref EMAIL_RE: Regex = Regex::new(
            r"^[A-Za-z0-9.!#$%&'*+/=?^_`{|}~-]+@[A-Za-z0-9](?:[A-Za-z0-9-]{0,61}[A-Za-z0-9])?(?:\.[A-Za-z0-9](?:[A-Za-z0-9-]{0,61}[A-Za-z0-9])?)+$"
        )
        .unwrap();
    }
    EMAIL_RE.is_match(email)
}

/// Blank strings count as missing.
fn present(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

/// The three credentials shared by create and update.
struct Credentials {
    email: String,
    username: String,
    password: String,
}

fn check_credentials(
    raw_email: Option<String>,
    raw_username: Option<String>,
    raw_password: Option<String>,
    errors: &mut Vec<FieldError>,
) -> Option<Credentials> {
    let email = match present(raw_email) {
        None => {
            errors.push(FieldError::required("email"));
            None
        }
        Some(e) if !is_valid_email(&e) => {
            errors.push(FieldError::email("email"));
            None
        }
        Some(e) => Some(e),
    };

    let username = present(raw_username);
    if username.is_none() {
        errors.push(FieldError::required("username"));
    }

    let password = match raw_password.filter(|p| !p.is_empty()) {
        None => {
            errors.push(FieldError::required("password"));
            None
        }
        Some(p) if p.chars().count() < PASSWORD_MIN_LEN => {
            errors.push(FieldError::min_length("password", PASSWORD_MIN_LEN));
            None
        }
        Some(p) => Some(p),
    };

    Some(Credentials {
        email: email?,
        username: username?,
        password: password?,
    })
}

pub fn validate_create(raw: RawUserInput) -> Result<CreateUserInput, Vec<FieldError>> {
    let mut errors = Vec::new();
    let creds = check_credentials(raw.email, raw.username, raw.password, &mut errors);

    match creds {
        Some(c) if errors.is_empty() => Ok(CreateUserInput {
            email: c.email,
            username: c.username,
            password: c.password,
            avatar: raw.avatar,
        }),
        _ => Err(errors),
    }
}

pub fn validate_update(raw: RawUserInput) -> Result<UpdateUserInput, Vec<FieldError>> {
    let mut errors = Vec::new();
    let creds = check_credentials(raw.email, raw.username, raw.password, &mut errors);

    match creds {
        Some(c) if errors.is_empty() => Ok(UpdateUserInput {
            email: c.email,
            username: c.username,
            password: c.password,
            // blank means "keep the stored avatar"
            avatar: present(raw.avatar),
        }),
        _ => Err(errors),
    }
}
