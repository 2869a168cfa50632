use crate::utils::error::{ChocAnError, Result};
use std::ops::RangeInclusive;

pub trait Validate {
    fn validate(&self) -> Result<()>;
}

fn invalid(field_name: &str, value: impl ToString, reason: String) -> ChocAnError {
    ChocAnError::InvalidValue {
        field: field_name.to_string(),
        value: value.to_string(),
        reason,
    }
}

pub fn validate_path(field_name: &str, path: &str) -> Result<()> {
    if path.is_empty() {
        return Err(invalid(field_name, path, "Path cannot be empty".to_string()));
    }

    if path.contains('\0') {
        return Err(invalid(field_name, path, "Path contains null bytes".to_string()));
    }

    Ok(())
}

pub fn validate_non_empty_string(field_name: &str, value: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(invalid(
            field_name,
            value,
            "Value cannot be empty or whitespace-only".to_string(),
        ));
    }
    Ok(())
}

pub fn validate_range<T: PartialOrd + std::fmt::Display + Copy>(
    field_name: &str,
    value: T,
    min: T,
    max: T,
) -> Result<()> {
    if value < min || value > max {
        return Err(invalid(
            field_name,
            value,
            format!("Value must be between {} and {}", min, max),
        ));
    }
    Ok(())
}

/// Checks the character count (not byte count) of `value`.
pub fn validate_char_limit(field_name: &str, value: &str, limit: RangeInclusive<usize>) -> Result<()> {
    let len = value.chars().count();
    if !limit.contains(&len) {
        let reason = if limit.start() == limit.end() {
            format!("Must be exactly {} characters long", limit.start())
        } else {
            format!(
                "Must be between {} and {} characters long",
                limit.start(),
                limit.end()
            )
        };
        return Err(invalid(field_name, value, reason));
    }
    Ok(())
}

/// A number with exactly `digits` decimal digits and no leading zero.
pub fn validate_digit_count(field_name: &str, value: u64, digits: u32) -> Result<()> {
    let min = 10u64.pow(digits - 1);
    let max = 10u64.pow(digits) - 1;
    if value < min || value > max {
        return Err(invalid(field_name, value, format!("Must be a {} digit number", digits)));
    }
    Ok(())
}

pub fn validate_ascii_digits(field_name: &str, value: &str, count: usize) -> Result<()> {
    if value.len() != count || !value.bytes().all(|b| b.is_ascii_digit()) {
        return Err(invalid(field_name, value, format!("Must be exactly {} digits", count)));
    }
    Ok(())
}

pub fn validate_ascii_letters(field_name: &str, value: &str, count: usize) -> Result<()> {
    if value.len() != count || !value.bytes().all(|b| b.is_ascii_alphabetic()) {
        return Err(invalid(field_name, value, format!("Must be exactly {} letters", count)));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_path() {
        assert!(validate_path("storage.data_dir", "./storage").is_ok());
        assert!(validate_path("storage.data_dir", "").is_err());
        assert!(validate_path("storage.data_dir", "bad\0path").is_err());
    }

    #[test]
    fn test_validate_range() {
        assert!(validate_range("reports.window_days", 7, 1, 31).is_ok());
        assert!(validate_range("reports.window_days", 0, 1, 31).is_err());
        assert!(validate_range("reports.window_days", 32, 1, 31).is_err());
    }

    #[test]
    fn test_validate_char_limit_counts_characters() {
        assert!(validate_char_limit("name", "José", 1..=4).is_ok());
        assert!(validate_char_limit("name", "", 1..=25).is_err());
        assert!(validate_char_limit("state", "ORE", 2..=2).is_err());
    }

    #[test]
    fn test_validate_digit_count() {
        assert!(validate_digit_count("member_id", 123456789, 9).is_ok());
        assert!(validate_digit_count("member_id", 12345678, 9).is_err());
        assert!(validate_digit_count("member_id", 1234567890, 9).is_err());
        assert!(validate_digit_count("service_id", 100000, 6).is_ok());
    }

    #[test]
    fn test_validate_zip_and_state() {
        assert!(validate_ascii_digits("zipcode", "01234", 5).is_ok());
        assert!(validate_ascii_digits("zipcode", "1234a", 5).is_err());
        assert!(validate_ascii_letters("state", "OR", 2).is_ok());
        assert!(validate_ascii_letters("state", "O1", 2).is_err());
    }
}
