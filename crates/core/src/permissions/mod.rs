//! Administrator checks for ledger maintenance actions
//!
//! The ledger itself never authenticates anyone. Front ends consult
//! [`AdminIdentity`] before offering the maintenance actions.

use serde::{Deserialize, Serialize};

use crate::models::User;

/// Actions a front end may gate behind the administrator identity
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LedgerAction {
    Register,
    Sell,
    ViewListings,
    Buy,
    RemoveUser,
    ResetUsers,
}

impl LedgerAction {
    pub fn requires_admin(&self) -> bool {
        matches!(self, LedgerAction::RemoveUser | LedgerAction::ResetUsers)
    }
}

/// The configured administrator account
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AdminIdentity {
    pub username: String,
    pub roll: String,
    pub mobile: String,
}

impl Default for AdminIdentity {
    fn default() -> Self {
        Self {
            username: "admin".to_string(),
            roll: "000000".to_string(),
            mobile: "01111111111".to_string(),
        }
    }
}

impl AdminIdentity {
    /// True when the logged-in user matches the admin username, roll and mobile
    pub fn authorizes(&self, username: &str, user: Option<&User>) -> bool {
        match user {
            Some(user) => {
                username == self.username && user.roll == self.roll && user.mobile == self.mobile
            }
            None => false,
        }
    }

    /// Check if the given session may perform an action
    pub fn can_perform(&self, username: &str, user: Option<&User>, action: LedgerAction) -> bool {
        match action {
            LedgerAction::Register => true,
            _ if action.requires_admin() => self.authorizes(username, user),
            _ => user.is_some(),
        }
    }
}
