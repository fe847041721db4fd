//! In-memory repository implementation

use std::collections::HashMap;
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use uuid::Uuid;

use crate::domain::result::{Error, Result};
use crate::domain::User;
use crate::ports::UserRepository;

#[derive(Debug, Default)]
struct Records {
    by_id: HashMap<Uuid, User>,
    /// Live record count per name. Counts rather than ids because `put`
    /// bypasses the uniqueness check and may store the same name twice.
    names: HashMap<String, usize>,
}

impl Records {
    fn insert(&mut self, user: User) {
        *self.names.entry(user.name.clone()).or_insert(0) += 1;
        if let Some(previous) = self.by_id.insert(user.id, user) {
            self.release_name(&previous.name);
        }
    }

    fn remove(&mut self, id: &Uuid) -> Option<User> {
        let user = self.by_id.remove(id)?;
        self.release_name(&user.name);
        Some(user)
    }

    fn release_name(&mut self, name: &str) {
        if let Some(count) = self.names.get_mut(name) {
            *count -= 1;
            if *count == 0 {
                self.names.remove(name);
            }
        }
    }

    fn contains_name(&self, name: &str) -> bool {
        self.names.contains_key(name)
    }
}

/// Process-lifetime user storage
///
/// Records live in a hash map keyed by id, with a name index alongside it.
/// Both sit behind one lock, so readers share and writers exclude.
#[derive(Debug, Default)]
pub struct InMemoryRepository {
    records: RwLock<Records>,
}

impl InMemoryRepository {
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self) -> Result<RwLockReadGuard<'_, Records>> {
        self.records
            .read()
            .map_err(|e| Error::storage(format!("Lock poisoned: {}", e)))
    }

    fn write(&self) -> Result<RwLockWriteGuard<'_, Records>> {
        self.records
            .write()
            .map_err(|e| Error::storage(format!("Lock poisoned: {}", e)))
    }
}

impl UserRepository for InMemoryRepository {
    fn put(&self, user: User) -> Result<()> {
        self.write()?.insert(user);
        Ok(())
    }

    fn insert_unique(&self, user: User) -> Result<()> {
        let mut records = self.write()?;
        if records.contains_name(&user.name) {
            return Err(Error::duplicate_name(user.name));
        }
        records.insert(user);
        Ok(())
    }

    fn get_all(&self) -> Result<Vec<User>> {
        Ok(self.read()?.by_id.values().cloned().collect())
    }

    fn delete(&self, id: Uuid) -> Result<()> {
        match self.write()?.remove(&id) {
            Some(_) => Ok(()),
            None => Err(Error::not_found("User")),
        }
    }

    fn contains_name(&self, name: &str) -> Result<bool> {
        Ok(self.read()?.contains_name(name))
    }

    fn len(&self) -> Result<usize> {
        Ok(self.read()?.by_id.len())
    }

    fn clear(&self) -> Result<()> {
        let mut records = self.write()?;
        records.by_id.clear();
        records.names.clear();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user(name: &str, age: i64) -> User {
        User::new(Uuid::new_v4(), name, age)
    }

    #[test]
    fn test_put_and_get_all() {
        let repo = InMemoryRepository::new();
        repo.put(user("Alice", 30)).unwrap();
        repo.put(user("Bob", 25)).unwrap();

        let mut names: Vec<_> = repo.get_all().unwrap().into_iter().map(|u| u.name).collect();
        names.sort();
        assert_eq!(names, vec!["Alice", "Bob"]);
        assert_eq!(repo.len().unwrap(), 2);
    }

    #[test]
    fn test_put_overwrites_by_id() {
        let repo = InMemoryRepository::new();
        let mut alice = user("Alice", 30);
        repo.put(alice.clone()).unwrap();

        alice.name = "Alicia".to_string();
        repo.put(alice).unwrap();

        assert_eq!(repo.len().unwrap(), 1);
        assert!(!repo.contains_name("Alice").unwrap());
        assert!(repo.contains_name("Alicia").unwrap());
    }

    #[test]
    fn test_delete_missing_is_not_found() {
        let repo = InMemoryRepository::new();
        let err = repo.delete(Uuid::new_v4()).unwrap_err();
        assert!(matches!(err, Error::NotFound(_)));
    }

    #[test]
    fn test_delete_releases_name() {
        let repo = InMemoryRepository::new();
        let eve = user("Eve", 28);
        let id = eve.id;
        repo.insert_unique(eve).unwrap();
        assert!(repo.contains_name("Eve").unwrap());

        repo.delete(id).unwrap();
        assert!(!repo.contains_name("Eve").unwrap());
        assert!(repo.is_empty().unwrap());
    }

    #[test]
    fn test_contains_name_is_case_sensitive() {
        let repo = InMemoryRepository::new();
        repo.put(user("Bob", 25)).unwrap();
        assert!(repo.contains_name("Bob").unwrap());
        assert!(!repo.contains_name("bob").unwrap());
        assert!(!repo.contains_name("Bob ").unwrap());
    }

    #[test]
    fn test_insert_unique_rejects_taken_name() {
        let repo = InMemoryRepository::new();
        repo.insert_unique(user("Bob", 25)).unwrap();
        let err = repo.insert_unique(user("Bob", 26)).unwrap_err();
        assert!(matches!(err, Error::DuplicateName(ref n) if n == "Bob"));
        assert_eq!(repo.len().unwrap(), 1);
    }

    #[test]
    fn test_name_index_survives_forced_duplicates() {
        let repo = InMemoryRepository::new();
        let first = User::with_raw_age(Uuid::new_v4(), "Noah", "x");
        let second = user("Noah", 40);
        let first_id = first.id;
        repo.put(first).unwrap();
        repo.put(second).unwrap();

        repo.delete(first_id).unwrap();
        assert!(repo.contains_name("Noah").unwrap());
    }

    #[test]
    fn test_clear() {
        let repo = InMemoryRepository::new();
        repo.put(user("Alice", 30)).unwrap();
        repo.clear().unwrap();
        assert!(repo.is_empty().unwrap());
        assert!(!repo.contains_name("Alice").unwrap());
    }
}
