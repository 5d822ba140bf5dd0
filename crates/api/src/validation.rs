//! Input validation for form submissions.

use chrono::NaiveDate;
use once_cell::sync::Lazy;
use regex::Regex;

use crate::services::ServiceError;

static EMAIL_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[a-zA-Z0-9._%+-]+@[a-zA-Z0-9.-]+\.[a-zA-Z]{2,}$").expect("valid email regex")
});

static USERNAME_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[a-zA-Z0-9_.-]+$").expect("valid username regex"));

static COLOR_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^#[0-9a-fA-F]{6}$").expect("valid color regex"));

pub fn validate_email(email: &str) -> Result<(), ServiceError> {
    if email.len() > 255 || !EMAIL_RE.is_match(email) {
        return Err(ServiceError::bad_request("Invalid email format."));
    }
    Ok(())
}

pub fn validate_username(username: &str) -> Result<(), ServiceError> {
    if username.len() < 3 || username.len() > 30 {
        return Err(ServiceError::bad_request(
            "Username must be between 3 and 30 characters long.",
        ));
    }
    if !USERNAME_RE.is_match(username) {
        return Err(ServiceError::bad_request(
            "Username can only contain letters, numbers, dots, underscores, and hyphens.",
        ));
    }
    Ok(())
}

pub fn validate_password(password: &str) -> Result<(), ServiceError> {
    if password.is_empty() {
        return Err(ServiceError::bad_request("Password cannot be empty."));
    }
    if password.len() > 128 {
        return Err(ServiceError::bad_request(
            "Password must be less than 128 characters long.",
        ));
    }
    Ok(())
}

/// Display names, nicknames and titles: non-blank, single line, bounded.
pub fn validate_name(field: &str, value: &str, max: usize) -> Result<(), ServiceError> {
    if value.trim().is_empty() {
        return Err(ServiceError::bad_request(format!("{field} cannot be empty.")));
    }
    if value.chars().count() > max {
        return Err(ServiceError::bad_request(format!(
            "{field} must be at most {max} characters long."
        )));
    }
    if value.chars().any(|c| matches!(c, '\n' | '\r' | '\t' | '\0')) {
        return Err(ServiceError::bad_request(format!(
            "{field} contains invalid characters."
        )));
    }
    Ok(())
}

pub fn validate_color(color: &str) -> Result<(), ServiceError> {
    if !COLOR_RE.is_match(color) {
        return Err(ServiceError::bad_request("Color must have the form #rrggbb."));
    }
    Ok(())
}

/// Parse an ISO `YYYY-MM-DD` birthday.
pub fn parse_birthday(raw: &str) -> Result<NaiveDate, ServiceError> {
    NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d")
        .map_err(|_| ServiceError::bad_request("Birthday must be a date in the form YYYY-MM-DD."))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn email_format() {
        assert!(validate_email("bob@email.com").is_ok());
        assert!(validate_email("bob@").is_err());
        assert!(validate_email("bob email.com").is_err());
    }

    #[test]
    fn username_rules() {
        assert!(validate_username("Bob").is_ok());
        assert!(validate_username("jo").is_err());
        assert!(validate_username("no spaces").is_err());
    }

    #[test]
    fn colors_must_be_hex_triplets() {
        assert!(validate_color("#ffffff").is_ok());
        assert!(validate_color("#A0b1C2").is_ok());
        assert!(validate_color("ffffff").is_err());
        assert!(validate_color("#fff").is_err());
    }

    #[test]
    fn names_reject_blank_and_control_characters() {
        assert!(validate_name("Name", "Algebra", 100).is_ok());
        assert!(validate_name("Name", "   ", 100).is_err());
        assert!(validate_name("Name", "two\nlines", 100).is_err());
        assert!(validate_name("Name", "abcdef", 5).is_err());
    }

    #[test]
    fn birthdays_parse_iso_dates() {
        assert_eq!(
            parse_birthday("2000-01-01").unwrap(),
            NaiveDate::from_ymd_opt(2000, 1, 1).unwrap()
        );
        assert!(parse_birthday("01/01/2000").is_err());
    }
}
