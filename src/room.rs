//! Room membership state
//!
//! The set of usernames currently in the room. Owned by the dispatcher
//! loop; nothing else holds a mutable reference while it runs.

use std::collections::HashSet;

/// Usernames currently present in the room
///
/// Joins and leaves are idempotent: a duplicate join or a leave for an
/// absent user leaves the set untouched.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct RoomMembership {
    members: HashSet<String>,
}

impl RoomMembership {
    /// Create an empty room
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a user
    ///
    /// Returns false if the user was already present.
    pub fn join(&mut self, username: &str) -> bool {
        if self.members.contains(username) {
            return false;
        }
        self.members.insert(username.to_string())
    }

    /// Remove a user
    ///
    /// Returns false if the user was not present.
    pub fn leave(&mut self, username: &str) -> bool {
        self.members.remove(username)
    }

    /// Check if a user is in the room
    pub fn contains(&self, username: &str) -> bool {
        self.members.contains(username)
    }

    /// Get the number of users in the room
    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    /// Sorted copy of the member names
    pub fn members(&self) -> Vec<String> {
        let mut names: Vec<String> = self.members.iter().cloned().collect();
        names.sort();
        names
    }
}
