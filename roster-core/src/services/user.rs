//! User service - validated creation, listing and deletion

use std::sync::Arc;

use uuid::Uuid;

use crate::domain::result::{Error, Result};
use crate::domain::{NewUser, User};
use crate::ports::UserRepository;

/// User service for single-record operations
pub struct UserService {
    repository: Arc<dyn UserRepository>,
}

impl UserService {
    pub fn new(repository: Arc<dyn UserRepository>) -> Self {
        Self { repository }
    }

    /// Create a user with a freshly generated id
    ///
    /// Fails with `DuplicateName` if any live record already has this exact name.
    pub fn create(&self, new_user: NewUser) -> Result<User> {
        new_user.validate()?;

        let user = User::new(Uuid::new_v4(), new_user.name, new_user.age);
        match self.repository.insert_unique(user.clone()) {
            Ok(()) => {
                tracing::info!(user_id = %user.id, "user created");
                Ok(user)
            }
            Err(e @ Error::DuplicateName(_)) => {
                tracing::debug!(name = %user.name, "rejected duplicate name");
                Err(e)
            }
            Err(e) => Err(e),
        }
    }

    /// All users, in no particular order
    pub fn list_all(&self) -> Result<Vec<User>> {
        self.repository.get_all()
    }

    /// Delete a user by id
    ///
    /// Ids that do not parse as UUIDs can never have been issued, so they
    /// are reported as not found rather than as bad input.
    pub fn delete(&self, id: &str) -> Result<()> {
        let id = Uuid::parse_str(id).map_err(|_| Error::not_found("User"))?;
        self.repository.delete(id)?;
        tracing::info!(user_id = %id, "user deleted");
        Ok(())
    }

    /// Whether a user with exactly this name exists
    pub fn name_exists(&self, name: &str) -> Result<bool> {
        self.repository.contains_name(name)
    }

    /// Store a record as-is, skipping validation and the uniqueness check
    ///
    /// Only for seeding and test harnesses; regular callers go through `create`.
    pub fn insert_raw(&self, user: User) -> Result<()> {
        self.repository.put(user)
    }

    /// Remove every user
    pub fn clear(&self) -> Result<()> {
        self.repository.clear()
    }
}
