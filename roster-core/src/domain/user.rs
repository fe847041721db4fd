//! User domain model

use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::result::{Error, Result};

/// Age as stored on a record
///
/// Everything created through the service carries `Years`. `Raw` only
/// appears when a record is put into the store directly, bypassing
/// validation, and is excluded from numeric statistics unless it happens
/// to hold a number.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Age {
    Years(i64),
    Raw(String),
}

impl Age {
    /// Numeric value of the age, if it has one
    pub fn numeric(&self) -> Option<f64> {
        match self {
            Age::Years(years) => Some(*years as f64),
            Age::Raw(raw) => raw.trim().parse::<f64>().ok().filter(|v| v.is_finite()),
        }
    }
}

impl From<i64> for Age {
    fn from(years: i64) -> Self {
        Age::Years(years)
    }
}

impl fmt::Display for Age {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Age::Years(years) => write!(f, "{}", years),
            Age::Raw(raw) => f.write_str(raw),
        }
    }
}

/// A stored user record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub id: Uuid,
    pub name: String,
    pub age: Age,
}

impl User {
    pub fn new(id: Uuid, name: impl Into<String>, age: i64) -> Self {
        Self {
            id,
            name: name.into(),
            age: Age::Years(age),
        }
    }

    /// A record whose age was never validated
    pub fn with_raw_age(id: Uuid, name: impl Into<String>, age: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            age: Age::Raw(age.into()),
        }
    }

    /// Uppercased first character of the name, used as the statistics group
    pub fn initial(&self) -> Option<String> {
        self.name.chars().next().map(|c| c.to_uppercase().collect())
    }
}

/// Payload for creating a user
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewUser {
    pub name: String,
    pub age: i64,
}

impl NewUser {
    pub fn new(name: impl Into<String>, age: i64) -> Self {
        Self {
            name: name.into(),
            age,
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.name.is_empty() {
            return Err(Error::validation("name must not be empty"));
        }
        Ok(())
    }
}
