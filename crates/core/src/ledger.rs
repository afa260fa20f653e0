//! Ledger store
//!
//! The in-memory users and hall queues for one session. Every mutating
//! operation validates first, stages its change on a copy of the
//! snapshot, writes that copy through the [`SnapshotStore`], and only then
//! makes it current. A rejected or unsaved action leaves the ledger as it
//! was.

use chrono::NaiveDateTime;
use tracing::instrument;

use crate::error::{Error, Result};
use crate::expiry::ExpiryPolicy;
use crate::invariants::assert_snapshot_invariants;
use crate::models::{HallName, LoginResult, MealType, Offer, Snapshot, User};
use crate::storage::SnapshotStore;

/// One hall's sellable offers, as shown to buyers
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HallListing {
    pub hall: HallName,
    pub offers: Vec<Offer>,
}

pub struct Ledger<S: SnapshotStore> {
    store: S,
    policy: ExpiryPolicy,
    pub(crate) state: Snapshot,
}

impl<S: SnapshotStore> Ledger<S> {
    /// Load the ledger from `store` and write back the normalised snapshot,
    /// so a fresh start leaves a valid file behind.
    #[instrument(skip(store, policy))]
    pub fn open(store: S, policy: ExpiryPolicy) -> Result<Self> {
        let state = store.load();
        assert_snapshot_invariants(&state);
        store.save(&state)?;
        tracing::info!(
            users = state.users.len(),
            offers = state.offer_count(),
            "Ledger opened"
        );
        Ok(Self {
            store,
            policy,
            state,
        })
    }

    pub fn snapshot(&self) -> &Snapshot {
        &self.state
    }

    pub fn policy(&self) -> &ExpiryPolicy {
        &self.policy
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn user(&self, username: &str) -> Option<&User> {
        self.state.users.get(username)
    }

    /// Registered users ordered by username
    pub fn users(&self) -> impl Iterator<Item = (&str, &User)> {
        self.state.users.iter().map(|(name, user)| (name.as_str(), user))
    }

    /// Stored offers for a hall, expired ones included until the next purge
    pub fn offers(&self, hall: HallName) -> &[Offer] {
        self.state.offers(hall)
    }

    /// Persist `next` and make it the current state
    pub(crate) fn commit(&mut self, next: Snapshot) -> Result<()> {
        assert_snapshot_invariants(&next);
        self.store.save(&next)?;
        self.state = next;
        Ok(())
    }

    /// Log in an existing user or register a new one.
    ///
    /// A returning username keeps its stored roll and mobile even if
    /// different values were supplied.
    #[instrument(skip(self, mobile))]
    pub fn register_or_login(
        &mut self,
        username: &str,
        roll: &str,
        mobile: &str,
    ) -> Result<LoginResult> {
        let username = required(username, "username")?;
        let roll = required(roll, "roll")?;
        let mobile = required(mobile, "mobile")?;

        if let Some(owner) = self.state.roll_owner(roll) {
            if owner != username {
                return Err(Error::RollAlreadyRegistered {
                    roll: roll.to_string(),
                    username: owner.to_string(),
                });
            }
        }

        if self.state.users.contains_key(username) {
            tracing::info!("Returning user logged in");
            return Ok(LoginResult::ReturningUser);
        }

        let mut next = self.state.clone();
        next.users
            .insert(username.to_string(), User::new(roll, mobile));
        self.commit(next)?;
        tracing::info!("Registered new user");
        Ok(LoginResult::Registered)
    }

    /// Post `tokens` tokens of `meal_type` at `hall`
    #[instrument(skip(self))]
    pub fn sell(
        &mut self,
        username: &str,
        hall: HallName,
        meal_type: MealType,
        tokens: u32,
        at: NaiveDateTime,
    ) -> Result<Offer> {
        if !self.state.users.contains_key(username) {
            return Err(Error::UnknownUser(username.to_string()));
        }
        if tokens == 0 {
            return Err(Error::InvalidTokenCount(tokens.to_string()));
        }
        self.policy.check_sell_window(meal_type, at)?;

        let offer = Offer::new(username.to_string(), meal_type, tokens, at);
        let mut next = self.state.clone();
        next.offers_mut(hall).push(offer.clone());
        self.commit(next)?;

        tracing::info!("Offer posted");
        Ok(offer)
    }

    /// Delete a user and every offer they posted. Returns the number of
    /// offers removed.
    #[instrument(skip(self))]
    pub fn remove_user(&mut self, username: &str) -> Result<usize> {
        if !self.state.users.contains_key(username) {
            return Err(Error::UnknownUser(username.to_string()));
        }

        let mut next = self.state.clone();
        next.users.remove(username);
        let removed = next.remove_offers_by(username);
        self.commit(next)?;

        tracing::info!(offers_removed = removed, "User removed");
        Ok(removed)
    }

    /// Erase every user and, with them, every offer. Returns the number of
    /// users erased.
    #[instrument(skip(self))]
    pub fn reset_users(&mut self) -> Result<usize> {
        let count = self.state.users.len();
        self.commit(Snapshot::empty())?;
        tracing::info!(users_removed = count, "All users erased");
        Ok(count)
    }

    /// Drop expired offers from every hall. Only writes when something
    /// was removed.
    #[instrument(skip(self))]
    pub fn purge_expired(&mut self, now: NaiveDateTime) -> Result<usize> {
        let mut next = self.state.clone();
        let removed: usize = next
            .halls_mut()
            .map(|(_, offers)| self.policy.purge_expired(offers, now))
            .sum();

        if removed > 0 {
            self.commit(next)?;
        }
        tracing::debug!(removed, "Purged expired offers");
        Ok(removed)
    }

    /// Purge, then list what is still sellable in every hall
    pub fn listings(&mut self, now: NaiveDateTime) -> Result<Vec<HallListing>> {
        self.purge_expired(now)?;
        Ok(self
            .state
            .halls()
            .map(|(hall, offers)| HallListing {
                hall,
                offers: offers.to_vec(),
            })
            .collect())
    }
}

fn required<'a>(value: &'a str, field: &'static str) -> Result<&'a str> {
    let value = value.trim();
    if value.is_empty() {
        Err(Error::MissingField(field))
    } else {
        Ok(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryStore;
    use chrono::NaiveDate;

    fn at(day: u32, hour: u32, minute: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 3, day)
            .unwrap()
            .and_hms_opt(hour, minute, 0)
            .unwrap()
    }

    fn ledger() -> Ledger<MemoryStore> {
        Ledger::open(MemoryStore::new(), ExpiryPolicy::default()).unwrap()
    }

    #[test]
    fn test_open_writes_fresh_snapshot() {
        let ledger = ledger();
        assert_eq!(ledger.store().write_count(), 1);
        assert_eq!(ledger.store().load(), Snapshot::empty());
    }

    #[test]
    fn test_register_then_login() {
        let mut ledger = ledger();
        assert_eq!(
            ledger.register_or_login("alice", "123", "017").unwrap(),
            LoginResult::Registered
        );
        assert_eq!(
            ledger.register_or_login("alice", "456", "018").unwrap(),
            LoginResult::ReturningUser
        );
        assert_eq!(ledger.user("alice"), Some(&User::new("123", "017")));
    }

    #[test]
    fn test_roll_must_be_unique() {
        let mut ledger = ledger();
        ledger.register_or_login("alice", "123", "x").unwrap();
        let err = ledger.register_or_login("bob", "123", "y").unwrap_err();
        assert!(matches!(
            err,
            Error::RollAlreadyRegistered { ref username, .. } if username == "alice"
        ));
        assert!(ledger.user("bob").is_none());
    }

    #[test]
    fn test_register_requires_all_fields() {
        let mut ledger = ledger();
        assert!(matches!(
            ledger.register_or_login("alice", "  ", "017"),
            Err(Error::MissingField("roll"))
        ));
        assert_eq!(ledger.users().count(), 0);
    }

    #[test]
    fn test_sell_appends_in_order() {
        let mut ledger = ledger();
        ledger.register_or_login("alice", "1", "017").unwrap();
        ledger.register_or_login("bob", "2", "018").unwrap();

        ledger
            .sell("alice", HallName::Zia, MealType::Lunch, 3, at(5, 11, 0))
            .unwrap();
        ledger
            .sell("bob", HallName::Zia, MealType::Lunch, 5, at(5, 11, 5))
            .unwrap();

        let sellers: Vec<&str> = ledger
            .offers(HallName::Zia)
            .iter()
            .map(|o| o.seller.as_str())
            .collect();
        assert_eq!(sellers, vec!["alice", "bob"]);
        assert_eq!(ledger.store().load(), *ledger.snapshot());
    }

    #[test]
    fn test_sell_window_enforced() {
        let mut ledger = ledger();
        ledger.register_or_login("alice", "1", "017").unwrap();

        assert!(ledger
            .sell("alice", HallName::Hamid, MealType::Lunch, 1, at(5, 13, 59))
            .is_ok());
        let err = ledger
            .sell("alice", HallName::Hamid, MealType::Lunch, 1, at(5, 14, 30))
            .unwrap_err();
        assert!(matches!(err, Error::SellWindowClosed { .. }));
        assert_eq!(ledger.offers(HallName::Hamid).len(), 1);
    }

    #[test]
    fn test_sell_validation() {
        let mut ledger = ledger();
        ledger.register_or_login("alice", "1", "017").unwrap();

        assert!(matches!(
            ledger.sell("ghost", HallName::Zia, MealType::Dinner, 1, at(5, 18, 0)),
            Err(Error::UnknownUser(_))
        ));
        assert!(matches!(
            ledger.sell("alice", HallName::Zia, MealType::Dinner, 0, at(5, 18, 0)),
            Err(Error::InvalidTokenCount(_))
        ));
        assert_eq!(ledger.snapshot().offer_count(), 0);
    }

    #[test]
    fn test_failed_write_leaves_state_untouched() {
        let mut ledger = ledger();
        ledger.register_or_login("alice", "1", "017").unwrap();
        ledger.store().set_fail_writes(true);

        let err = ledger
            .sell("alice", HallName::Zia, MealType::Lunch, 2, at(5, 10, 0))
            .unwrap_err();
        assert!(matches!(err, Error::PersistenceWriteFailed { .. }));
        assert_eq!(ledger.snapshot().offer_count(), 0);

        let err = ledger.register_or_login("bob", "2", "018").unwrap_err();
        assert!(matches!(err, Error::PersistenceWriteFailed { .. }));
        assert!(ledger.user("bob").is_none());
    }

    #[test]
    fn test_remove_user_cascades() {
        let mut ledger = ledger();
        ledger.register_or_login("alice", "1", "017").unwrap();
        ledger.register_or_login("bob", "2", "018").unwrap();
        ledger
            .sell("alice", HallName::Zia, MealType::Lunch, 1, at(5, 10, 0))
            .unwrap();
        ledger
            .sell("bob", HallName::Zia, MealType::Lunch, 1, at(5, 10, 0))
            .unwrap();
        ledger
            .sell("alice", HallName::Selim, MealType::Dinner, 2, at(5, 19, 0))
            .unwrap();

        assert_eq!(ledger.remove_user("alice").unwrap(), 2);
        assert!(ledger.user("alice").is_none());
        assert_eq!(ledger.snapshot().offer_count(), 1);
        assert_eq!(ledger.store().load(), *ledger.snapshot());

        assert!(matches!(
            ledger.remove_user("alice"),
            Err(Error::UnknownUser(_))
        ));
    }

    #[test]
    fn test_reset_users_clears_everything() {
        let mut ledger = ledger();
        ledger.register_or_login("alice", "1", "017").unwrap();
        ledger
            .sell("alice", HallName::Zia, MealType::Lunch, 1, at(5, 10, 0))
            .unwrap();

        assert_eq!(ledger.reset_users().unwrap(), 1);
        assert_eq!(*ledger.snapshot(), Snapshot::empty());
    }

    #[test]
    fn test_listings_purge_and_persist() {
        let mut ledger = ledger();
        ledger.register_or_login("alice", "1", "017").unwrap();
        ledger
            .sell("alice", HallName::Zia, MealType::Lunch, 1, at(4, 10, 0))
            .unwrap();
        ledger
            .sell("alice", HallName::Zia, MealType::Dinner, 2, at(5, 10, 0))
            .unwrap();

        let listings = ledger.listings(at(5, 12, 0)).unwrap();
        assert_eq!(listings.len(), 5);
        let zia = listings.iter().find(|l| l.hall == HallName::Zia).unwrap();
        assert_eq!(zia.offers.len(), 1);
        assert_eq!(zia.offers[0].meal_type, MealType::Dinner);

        // The purge reached the store too
        assert_eq!(ledger.store().load().offer_count(), 1);
    }

    #[test]
    fn test_purge_without_expired_offers_does_not_write() {
        let mut ledger = ledger();
        ledger.register_or_login("alice", "1", "017").unwrap();
        let writes = ledger.store().write_count();

        assert_eq!(ledger.purge_expired(at(5, 12, 0)).unwrap(), 0);
        assert_eq!(ledger.store().write_count(), writes);
    }

    #[test]
    fn test_reopen_restores_state() {
        let mut ledger = ledger();
        ledger.register_or_login("alice", "1", "017").unwrap();
        ledger
            .sell("alice", HallName::Shahidul, MealType::Dinner, 4, at(5, 20, 0))
            .unwrap();

        let content = ledger.store().content().unwrap();
        let reopened = Ledger::open(MemoryStore::with_content(content), ExpiryPolicy::default())
            .unwrap();
        assert_eq!(reopened.snapshot(), ledger.snapshot());
    }
}
