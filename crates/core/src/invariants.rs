//! Developer guardrails and invariants
//!
//! Debug assertions for detecting impossible ledger states during
//! development. These checks are compiled out in release builds.

use std::collections::HashSet;

use crate::models::{HallName, Offer, Snapshot};

/// Validate a snapshot before it is committed
pub fn assert_snapshot_invariants(snapshot: &Snapshot) {
    if !cfg!(debug_assertions) {
        return;
    }

    debug_assert_eq!(
        snapshot.halls().count(),
        HallName::ALL.len(),
        "Snapshot is missing halls"
    );

    let mut rolls = HashSet::new();
    for (username, user) in &snapshot.users {
        debug_assert!(
            rolls.insert(user.roll.as_str()),
            "Roll {} is registered more than once (seen again on {})",
            user.roll,
            username
        );
    }

    for (hall, offers) in snapshot.halls() {
        for offer in offers {
            assert_offer_invariants(hall, offer);
            debug_assert!(
                snapshot.users.contains_key(&offer.seller),
                "{} has an offer from unregistered seller {}",
                hall,
                offer.seller
            );
        }
    }
}

/// Validate that a live offer still holds tokens
pub fn assert_offer_invariants(hall: HallName, offer: &Offer) {
    debug_assert!(
        offer.tokens > 0,
        "{} holds an empty offer from {}",
        hall,
        offer.seller
    );
}
