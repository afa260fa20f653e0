//! JSON encoding of the ledger snapshot
//!
//! ```json
//! {
//!   "users": { "alice": { "roll": "1903001", "mobile": "017..." } },
//!   "halls": {
//!     "Zia Hall": [
//!       { "username": "alice", "meal_type": "Lunch", "tokens": 2,
//!         "timestamp": "2024-03-05 12:10:00" }
//!     ],
//!     ...
//!   }
//! }
//! ```

use std::collections::{BTreeMap, HashSet};

use serde::{Deserialize, Serialize};

use super::parse::{format_timestamp, parse_timestamp};
use crate::models::{HallName, MealType, Offer, Snapshot, User};

#[derive(Debug, Serialize)]
struct SnapshotOut<'a> {
    users: &'a BTreeMap<String, User>,
    halls: BTreeMap<HallName, Vec<StoredOffer>>,
}

#[derive(Debug, Deserialize)]
struct SnapshotIn {
    #[serde(default)]
    users: BTreeMap<String, User>,
    #[serde(default)]
    halls: BTreeMap<String, Vec<StoredOffer>>,
}

/// On-disk offer. Unknown fields (older files also copied the seller's
/// roll and mobile here) are ignored.
#[derive(Debug, Serialize, Deserialize)]
struct StoredOffer {
    username: String,
    meal_type: String,
    tokens: i64,
    timestamp: String,
}

impl From<&Offer> for StoredOffer {
    fn from(offer: &Offer) -> Self {
        Self {
            username: offer.seller.clone(),
            meal_type: offer.meal_type.as_str().to_string(),
            tokens: i64::from(offer.tokens),
            timestamp: format_timestamp(&offer.created_at),
        }
    }
}

impl StoredOffer {
    fn into_offer(self) -> Option<Offer> {
        let meal_type = self.meal_type.parse::<MealType>().ok()?;
        let tokens = u32::try_from(self.tokens).ok().filter(|t| *t > 0)?;
        let created_at = parse_timestamp(&self.timestamp).ok()?;
        Some(Offer::new(self.username, meal_type, tokens, created_at))
    }
}

/// Encode a snapshot as pretty-printed JSON
pub fn encode(snapshot: &Snapshot) -> serde_json::Result<String> {
    let out = SnapshotOut {
        users: &snapshot.users,
        halls: snapshot
            .halls()
            .map(|(hall, offers)| (hall, offers.iter().map(StoredOffer::from).collect()))
            .collect(),
    };
    serde_json::to_string_pretty(&out)
}

/// Decode a snapshot, normalising whatever was stored.
///
/// Only malformed JSON (or a malformed user record) is an error. Unknown
/// halls are ignored, missing halls come back empty, and offers that
/// cannot be used are dropped with a warning.
pub fn decode(content: &str) -> serde_json::Result<Snapshot> {
    let raw: SnapshotIn = serde_json::from_str(content)?;
    let mut snapshot = Snapshot::empty();

    let mut seen_rolls = HashSet::new();
    for (username, user) in raw.users {
        if seen_rolls.insert(user.roll.clone()) {
            snapshot.users.insert(username, user);
        } else {
            tracing::warn!(username = %username, roll = %user.roll, "Dropping user with duplicate roll");
        }
    }

    for (name, stored) in raw.halls {
        let Ok(hall) = name.parse::<HallName>() else {
            tracing::warn!(hall = %name, "Ignoring unknown hall in snapshot");
            continue;
        };
        let mut offers = Vec::with_capacity(stored.len());
        for stored in stored {
            match stored.into_offer() {
                Some(offer) if snapshot.users.contains_key(&offer.seller) => offers.push(offer),
                Some(offer) => {
                    tracing::warn!(hall = %hall, seller = %offer.seller, "Dropping offer from unregistered seller");
                }
                None => tracing::warn!(hall = %hall, "Dropping malformed offer"),
            }
        }
        snapshot.offers_mut(hall).extend(offers);
    }

    Ok(snapshot)
}
