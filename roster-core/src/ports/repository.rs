//! Repository port - user record storage abstraction

use uuid::Uuid;

use crate::domain::result::Result;
use crate::domain::User;

/// User record storage
///
/// Implementations own the records for the lifetime of the process. All
/// methods take `&self`; implementations serialize mutations internally.
pub trait UserRepository: Send + Sync {
    /// Insert a record, overwriting any record with the same id
    fn put(&self, user: User) -> Result<()>;

    /// Insert a record unless its name is already taken
    ///
    /// The name check and the insert happen under one exclusive lock, so
    /// two concurrent callers can never both store the same name.
    fn insert_unique(&self, user: User) -> Result<()>;

    /// Snapshot of all records, in no particular order
    fn get_all(&self) -> Result<Vec<User>>;

    /// Remove a record, failing with `NotFound` if it is absent
    fn delete(&self, id: Uuid) -> Result<()>;

    /// Whether a record with exactly this name exists
    fn contains_name(&self, name: &str) -> Result<bool>;

    /// Number of stored records
    fn len(&self) -> Result<usize>;

    fn is_empty(&self) -> Result<bool> {
        Ok(self.len()? == 0)
    }

    /// Drop every record
    fn clear(&self) -> Result<()>;
}
