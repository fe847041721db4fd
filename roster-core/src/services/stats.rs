//! Stats service - grouped average age

use std::collections::BTreeMap;
use std::sync::Arc;

use serde::Serialize;

use crate::domain::result::Result;
use crate::domain::User;
use crate::ports::UserRepository;

const NO_USERS_MESSAGE: &str = "No users available to calculate average age.";

/// Average age per name initial
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum AverageAgeReport {
    /// The store holds no users at all
    NoUsers { message: String },
    /// Initial -> mean age, rounded to two decimals. Only initials with at
    /// least one numeric age appear.
    Groups(BTreeMap<String, f64>),
}

impl AverageAgeReport {
    pub fn no_users() -> Self {
        Self::NoUsers {
            message: NO_USERS_MESSAGE.to_string(),
        }
    }

    pub fn is_no_users(&self) -> bool {
        matches!(self, Self::NoUsers { .. })
    }

    /// The grouped averages, or `None` when there were no users
    pub fn groups(&self) -> Option<&BTreeMap<String, f64>> {
        match self {
            Self::Groups(groups) => Some(groups),
            Self::NoUsers { .. } => None,
        }
    }
}

/// Stats service for aggregate queries over the store
pub struct StatsService {
    repository: Arc<dyn UserRepository>,
}

impl StatsService {
    pub fn new(repository: Arc<dyn UserRepository>) -> Self {
        Self { repository }
    }

    /// Average age grouped by the uppercased first letter of each name
    ///
    /// Records whose age is not numeric are left out entirely, and an
    /// initial with no remaining records is absent from the result.
    pub fn average_age_by_initial(&self) -> Result<AverageAgeReport> {
        let users = self.repository.get_all()?;
        if users.is_empty() {
            return Ok(AverageAgeReport::no_users());
        }
        Ok(AverageAgeReport::Groups(average_by_initial(&users)))
    }
}

fn average_by_initial(users: &[User]) -> BTreeMap<String, f64> {
    let mut sums: BTreeMap<String, (f64, u32)> = BTreeMap::new();

    for user in users {
        let (Some(initial), Some(age)) = (user.initial(), user.age.numeric()) else {
            continue;
        };
        let entry = sums.entry(initial).or_insert((0.0, 0));
        entry.0 += age;
        entry.1 += 1;
    }

    sums.into_iter()
        .map(|(initial, (sum, count))| (initial, round2(sum / f64::from(count))))
        .collect()
}

/// Round to two decimals, ties to even
fn round2(value: f64) -> f64 {
    (value * 100.0).round_ties_even() / 100.0
}
