use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::iter::Sum;
use std::ops::Add;

pub const DATE_FMT: &str = "%m-%d-%Y";
pub const DATETIME_FMT: &str = "%m-%d-%Y %H:%M:%S";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Member {
    pub member_id: u32,
    pub name: String,
    pub address: String,
    pub city: String,
    pub state: String,
    pub zipcode: String,
    pub suspended: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UserType {
    #[serde(alias = "0")]
    Manager,
    #[serde(alias = "1")]
    Provider,
}

impl fmt::Display for UserType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UserType::Manager => write!(f, "manager"),
            UserType::Provider => write!(f, "provider"),
        }
    }
}

/// A terminal user: provider or manager.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: u32,
    pub user_type: UserType,
    pub name: String,
    pub address: String,
    pub city: String,
    pub state: String,
    pub zipcode: String,
    pub password_hash: String,
}

/// One entry of the provider directory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Service {
    pub service_id: u32,
    pub service_name: String,
    pub price_dollars: u32,
    pub price_cents: u32,
}

impl Service {
    pub fn fee(&self) -> Money {
        Money::from_parts(self.price_dollars, self.price_cents)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServiceLogEntry {
    pub entry_datetime_utc: DateTime<Utc>,
    pub service_date: NaiveDate,
    pub provider_id: u32,
    pub member_id: u32,
    pub service_id: u32,
    pub comments: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MemberStatus {
    Valid,
    Suspended,
    Invalid,
}

impl MemberStatus {
    pub fn of(member: Option<&Member>) -> Self {
        match member {
            Some(m) if m.suspended => MemberStatus::Suspended,
            Some(_) => MemberStatus::Valid,
            None => MemberStatus::Invalid,
        }
    }
}

impl fmt::Display for MemberStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MemberStatus::Valid => write!(f, "Valid"),
            MemberStatus::Suspended => write!(f, "Suspended"),
            MemberStatus::Invalid => write!(f, "Invalid"),
        }
    }
}

/// An amount in whole cents.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Money(u64);

impl Money {
    pub const fn from_cents(cents: u64) -> Self {
        Money(cents)
    }

    pub fn from_parts(dollars: u32, cents: u32) -> Self {
        Money(u64::from(dollars) * 100 + u64::from(cents))
    }

    pub fn cents(self) -> u64 {
        self.0
    }

    pub fn capped(self, cap: Money) -> Money {
        self.min(cap)
    }
}

impl Add for Money {
    type Output = Money;

    fn add(self, rhs: Money) -> Money {
        Money(self.0.saturating_add(rhs.0))
    }
}

impl Sum for Money {
    fn sum<I: Iterator<Item = Money>>(iter: I) -> Money {
        iter.fold(Money::default(), Add::add)
    }
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{:02}", self.0 / 100, self.0 % 100)
    }
}
