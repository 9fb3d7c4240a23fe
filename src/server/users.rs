//! The in-memory user store.

use std::collections::BTreeMap;
use serde::Serialize;

/// A stored user. `age` is kept verbatim, never validated as a number.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct User {
    pub id: u64,
    pub name: String,
    pub age: String,
}

/// Users keyed by id, iterated in id order.
///
/// Ids start at 1 and are handed out sequentially; none is ever reused.
#[derive(Debug)]
pub struct UserStore {
    users: BTreeMap<u64, User>,
    next_id: u64,
}

impl Default for UserStore {
    fn default() -> Self {
        Self {
            users: BTreeMap::new(),
            next_id: 1,
        }
    }
}

impl UserStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store a new user under the next free id.
    pub fn insert(&mut self, name: impl Into<String>, age: impl Into<String>) -> &User {
        let id = self.next_id;
        self.next_id += 1;
        self.users.entry(id).or_insert(User {
            id,
            name: name.into(),
            age: age.into(),
        })
    }

    pub fn get(&self, id: u64) -> Option<&User> {
        self.users.get(&id)
    }

    /// All users in id order.
    pub fn all(&self) -> &BTreeMap<u64, User> {
        &self.users
    }

    pub fn len(&self) -> usize {
        self.users.len()
    }

    pub fn is_empty(&self) -> bool {
        self.users.is_empty()
    }
}
