//! User model

use serde::{Deserialize, Serialize};

/// A registered user. Users are keyed by username in the ledger, so the
/// record itself only carries the contact details handed to buyers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub roll: String,
    pub mobile: String,
}

impl User {
    pub fn new(roll: impl Into<String>, mobile: impl Into<String>) -> Self {
        Self {
            roll: roll.into(),
            mobile: mobile.into(),
        }
    }
}

/// Outcome of a successful login attempt
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoginResult {
    /// A new user record was created
    Registered,
    /// The username already existed; stored details were left as they were
    ReturningUser,
}
