//! Table definitions: which file each record type lives in, its key, its field
//! limits and which fields a manager may edit.

use crate::domain::model::{Member, Service, ServiceLogEntry, User};
use crate::domain::password::generate_secure_password;
use crate::utils::error::{ChocAnError, Result};
use crate::utils::validation::{
    validate_ascii_digits, validate_ascii_letters, validate_char_limit, validate_digit_count,
    validate_non_empty_string, validate_range, Validate,
};
use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::fmt::Display;
use std::ops::RangeInclusive;

pub const PERSON_ID_DIGITS: u32 = 9;
pub const SERVICE_ID_DIGITS: u32 = 6;
pub const NAME_LIMIT: RangeInclusive<usize> = 1..=25;
pub const ADDRESS_LIMIT: RangeInclusive<usize> = 1..=25;
pub const CITY_LIMIT: RangeInclusive<usize> = 1..=14;
pub const STATE_LEN: usize = 2;
pub const ZIPCODE_LEN: usize = 5;
pub const SERVICE_NAME_LIMIT: RangeInclusive<usize> = 1..=20;
pub const PRICE_DOLLARS_MAX: u32 = 999;
pub const PRICE_CENTS_MAX: u32 = 99;
pub const COMMENTS_MAX: usize = 100;

pub trait TableRecord: Serialize + DeserializeOwned + Clone + Validate + Send + Sync {
    type Key: PartialEq + Display + Clone + Send + Sync;

    /// File stem of the table, also used in messages.
    const TABLE: &'static str;

    fn key(&self) -> Self::Key;
}

pub trait EditableRecord: TableRecord {
    const EDITABLE_FIELDS: &'static [&'static str];

    /// Parses `value` into `field`. Limits are checked separately by `validate`.
    fn set_field(&mut self, field: &str, value: &str) -> Result<()>;
}

/// Tables whose keys are handed out by the system.
pub trait GeneratedId: TableRecord<Key = u32> {
    const ID_RANGE: RangeInclusive<u32>;
}

fn unknown_field(table: &str, field: &str) -> ChocAnError {
    ChocAnError::UnknownField {
        table: table.to_string(),
        field: field.to_string(),
    }
}

pub fn parse_number(field: &str, value: &str) -> Result<u32> {
    value.trim().parse().map_err(|_| ChocAnError::InvalidValue {
        field: field.to_string(),
        value: value.to_string(),
        reason: "Expected a whole number".to_string(),
    })
}

pub fn parse_flag(field: &str, value: &str) -> Result<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "y" | "yes" | "true" => Ok(true),
        "n" | "no" | "false" => Ok(false),
        _ => Err(ChocAnError::InvalidValue {
            field: field.to_string(),
            value: value.to_string(),
            reason: "Expected yes or no".to_string(),
        }),
    }
}

fn validate_address(name: &str, address: &str, city: &str, state: &str, zipcode: &str) -> Result<()> {
    validate_char_limit("name", name, NAME_LIMIT)?;
    validate_char_limit("address", address, ADDRESS_LIMIT)?;
    validate_char_limit("city", city, CITY_LIMIT)?;
    validate_ascii_letters("state", state, STATE_LEN)?;
    validate_ascii_digits("zipcode", zipcode, ZIPCODE_LEN)
}

/// Sets one of the shared contact fields; returns false if `field` is not one.
fn set_contact_field(
    field: &str,
    value: &str,
    name: &mut String,
    address: &mut String,
    city: &mut String,
    state: &mut String,
    zipcode: &mut String,
) -> bool {
    let target = match field {
        "name" => name,
        "address" => address,
        "city" => city,
        "state" => {
            *state = value.trim().to_ascii_uppercase();
            return true;
        }
        "zipcode" => zipcode,
        _ => return false,
    };
    *target = value.trim().to_string();
    true
}

impl Validate for Member {
    fn validate(&self) -> Result<()> {
        validate_digit_count("member_id", u64::from(self.member_id), PERSON_ID_DIGITS)?;
        validate_address(&self.name, &self.address, &self.city, &self.state, &self.zipcode)
    }
}

impl TableRecord for Member {
    type Key = u32;
    const TABLE: &'static str = "members";

    fn key(&self) -> u32 {
        self.member_id
    }
}

impl EditableRecord for Member {
    const EDITABLE_FIELDS: &'static [&'static str] =
        &["name", "address", "city", "state", "zipcode", "suspended"];

    fn set_field(&mut self, field: &str, value: &str) -> Result<()> {
        if field == "suspended" {
            self.suspended = parse_flag(field, value)?;
            return Ok(());
        }
        if set_contact_field(
            field,
            value,
            &mut self.name,
            &mut self.address,
            &mut self.city,
            &mut self.state,
            &mut self.zipcode,
        ) {
            Ok(())
        } else {
            Err(unknown_field(Self::TABLE, field))
        }
    }
}

impl GeneratedId for Member {
    const ID_RANGE: RangeInclusive<u32> = 100_000_000..=999_999_999;
}

impl Validate for User {
    fn validate(&self) -> Result<()> {
        validate_digit_count("id", u64::from(self.id), PERSON_ID_DIGITS)?;
        validate_address(&self.name, &self.address, &self.city, &self.state, &self.zipcode)?;
        validate_non_empty_string("password_hash", &self.password_hash)
    }
}

impl TableRecord for User {
    type Key = u32;
    const TABLE: &'static str = "users";

    fn key(&self) -> u32 {
        self.id
    }
}

impl EditableRecord for User {
    const EDITABLE_FIELDS: &'static [&'static str] =
        &["name", "address", "city", "state", "zipcode", "password"];

    fn set_field(&mut self, field: &str, value: &str) -> Result<()> {
        if field == "password" {
            validate_non_empty_string("password", value)?;
            self.password_hash = generate_secure_password(value);
            return Ok(());
        }
        if set_contact_field(
            field,
            value,
            &mut self.name,
            &mut self.address,
            &mut self.city,
            &mut self.state,
            &mut self.zipcode,
        ) {
            Ok(())
        } else {
            Err(unknown_field(Self::TABLE, field))
        }
    }
}

impl GeneratedId for User {
    const ID_RANGE: RangeInclusive<u32> = 100_000_000..=999_999_999;
}

impl Validate for Service {
    fn validate(&self) -> Result<()> {
        validate_digit_count("service_id", u64::from(self.service_id), SERVICE_ID_DIGITS)?;
        validate_char_limit("service_name", &self.service_name, SERVICE_NAME_LIMIT)?;
        validate_range("price_dollars", self.price_dollars, 0, PRICE_DOLLARS_MAX)?;
        validate_range("price_cents", self.price_cents, 0, PRICE_CENTS_MAX)
    }
}

impl TableRecord for Service {
    type Key = u32;
    const TABLE: &'static str = "provider_directory";

    fn key(&self) -> u32 {
        self.service_id
    }
}

impl EditableRecord for Service {
    const EDITABLE_FIELDS: &'static [&'static str] = &["service_name", "price_dollars", "price_cents"];

    fn set_field(&mut self, field: &str, value: &str) -> Result<()> {
        match field {
            "service_name" => self.service_name = value.trim().to_string(),
            "price_dollars" => self.price_dollars = parse_number(field, value)?,
            "price_cents" => self.price_cents = parse_number(field, value)?,
            _ => return Err(unknown_field(Self::TABLE, field)),
        }
        Ok(())
    }
}

impl GeneratedId for Service {
    const ID_RANGE: RangeInclusive<u32> = 100_000..=999_999;
}

impl Validate for ServiceLogEntry {
    fn validate(&self) -> Result<()> {
        validate_digit_count("provider_id", u64::from(self.provider_id), PERSON_ID_DIGITS)?;
        validate_digit_count("member_id", u64::from(self.member_id), PERSON_ID_DIGITS)?;
        validate_digit_count("service_id", u64::from(self.service_id), SERVICE_ID_DIGITS)?;
        if self.service_date > self.entry_datetime_utc.date_naive() {
            return Err(ChocAnError::InvalidValue {
                field: "service_date".to_string(),
                value: self.service_date.to_string(),
                reason: "Service date cannot be after the date it was recorded".to_string(),
            });
        }
        if let Some(comments) = &self.comments {
            validate_char_limit("comments", comments, 0..=COMMENTS_MAX)?;
        }
        Ok(())
    }
}

impl TableRecord for ServiceLogEntry {
    type Key = DateTime<Utc>;
    const TABLE: &'static str = "service_log";

    fn key(&self) -> DateTime<Utc> {
        self.entry_datetime_utc
    }
}
