//! Snapshot - the complete ledger state as one durable unit

use std::collections::BTreeMap;

use super::{HallName, Offer, User};

/// All registered users plus every hall's offer queue.
///
/// Every hall in [`HallName::ALL`] always has an entry, possibly empty.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Snapshot {
    pub users: BTreeMap<String, User>,
    halls: BTreeMap<HallName, Vec<Offer>>,
}

impl Snapshot {
    /// Empty ledger: no users, all halls present with no offers
    pub fn empty() -> Self {
        Self {
            users: BTreeMap::new(),
            halls: HallName::ALL.into_iter().map(|h| (h, Vec::new())).collect(),
        }
    }

    /// Offers for a hall in insertion order
    pub fn offers(&self, hall: HallName) -> &[Offer] {
        self.halls.get(&hall).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn offers_mut(&mut self, hall: HallName) -> &mut Vec<Offer> {
        self.halls.entry(hall).or_default()
    }

    /// Iterate halls in display order with their offers
    pub fn halls(&self) -> impl Iterator<Item = (HallName, &[Offer])> {
        self.halls.iter().map(|(hall, offers)| (*hall, offers.as_slice()))
    }

    pub fn halls_mut(&mut self) -> impl Iterator<Item = (HallName, &mut Vec<Offer>)> {
        self.halls.iter_mut().map(|(hall, offers)| (*hall, offers))
    }

    /// Username that owns the given roll number, if any
    pub fn roll_owner(&self, roll: &str) -> Option<&str> {
        self.users
            .iter()
            .find(|(_, user)| user.roll == roll)
            .map(|(username, _)| username.as_str())
    }

    /// Drop every offer posted by `username`, returning how many were removed
    pub fn remove_offers_by(&mut self, username: &str) -> usize {
        self.halls_mut()
            .map(|(_, offers)| {
                let before = offers.len();
                offers.retain(|offer| offer.seller != username);
                before - offers.len()
            })
            .sum()
    }

    pub fn offer_count(&self) -> usize {
        self.halls.values().map(Vec::len).sum()
    }
}

impl Default for Snapshot {
    fn default() -> Self {
        Self::empty()
    }
}
