//! Matching engine
//!
//! Buy requests are filled FIFO: the oldest offer of the requested meal
//! type in the hall is drained first. The engine only brokers the
//! introduction; the result lists which sellers to contact and for how
//! many tokens.

use chrono::NaiveDateTime;
use tracing::instrument;

use crate::error::{Error, Result};
use crate::ledger::Ledger;
use crate::models::{HallName, MealType, Offer, User};
use crate::storage::SnapshotStore;

/// One seller's share of a purchase
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LineItem {
    pub seller: String,
    /// Seller's roll and mobile, looked up at purchase time
    pub contact: Option<User>,
    pub tokens: u32,
}

/// Outcome of a buy request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MatchResult {
    pub hall: HallName,
    pub meal_type: MealType,
    /// Sellers in the order their offers were consumed
    pub line_items: Vec<LineItem>,
}

impl MatchResult {
    pub fn total_tokens(&self) -> u32 {
        self.line_items.iter().map(|item| item.tokens).sum()
    }
}

/// Tokens of `meal_type` currently offered
pub fn available_tokens(offers: &[Offer], meal_type: MealType) -> u32 {
    offers
        .iter()
        .filter(|offer| offer.meal_type == meal_type)
        .fold(0u32, |sum, offer| sum.saturating_add(offer.tokens))
}

/// Take up to `requested` tokens from matching offers in insertion order,
/// then drop emptied offers. Returns `(seller, tokens)` fills.
///
/// Callers check availability first; a short fill is not an error here.
pub fn allocate(offers: &mut Vec<Offer>, meal_type: MealType, requested: u32) -> Vec<(String, u32)> {
    let mut remaining = requested;
    let mut fills = Vec::new();

    for offer in offers.iter_mut().filter(|o| o.meal_type == meal_type) {
        if remaining == 0 {
            break;
        }
        let take = remaining.min(offer.tokens);
        offer.tokens -= take;
        remaining -= take;
        fills.push((offer.seller.clone(), take));
    }

    offers.retain(|offer| offer.tokens > 0);
    fills
}

impl<S: SnapshotStore> Ledger<S> {
    /// Fill a request for `requested` tokens of `meal_type` at `hall`.
    ///
    /// Expired offers are ignored. Nothing is changed unless the whole
    /// request can be filled; on success the purge and the allocation are
    /// saved together.
    #[instrument(skip(self))]
    pub fn match_buy(
        &mut self,
        hall: HallName,
        meal_type: MealType,
        requested: u32,
        now: NaiveDateTime,
    ) -> Result<MatchResult> {
        if requested == 0 {
            return Err(Error::InvalidTokenCount(requested.to_string()));
        }

        let mut next = self.state.clone();
        let offers = next.offers_mut(hall);
        self.policy().purge_expired(offers, now);

        let available = available_tokens(offers, meal_type);
        if available == 0 {
            return Err(Error::NoOffersAvailable {
                hall,
                meal_type: Some(meal_type),
            });
        }
        if requested > available {
            return Err(Error::InsufficientTokens {
                requested,
                available,
            });
        }

        let fills = allocate(offers, meal_type, requested);
        let line_items = fills
            .into_iter()
            .map(|(seller, tokens)| LineItem {
                contact: next.users.get(&seller).cloned(),
                seller,
                tokens,
            })
            .collect::<Vec<_>>();

        self.commit(next)?;
        tracing::info!(sellers = line_items.len(), "Buy request matched");
        Ok(MatchResult {
            hall,
            meal_type,
            line_items,
        })
    }

    /// Take one whole offer by its 1-based position in the hall's listing
    #[instrument(skip(self))]
    pub fn claim_offer(
        &mut self,
        buyer: &str,
        hall: HallName,
        index: usize,
        now: NaiveDateTime,
    ) -> Result<LineItem> {
        if self.user(buyer).is_none() {
            return Err(Error::UnknownUser(buyer.to_string()));
        }

        let mut next = self.state.clone();
        let offers = next.offers_mut(hall);
        self.policy().purge_expired(offers, now);

        if offers.is_empty() {
            return Err(Error::NoOffersAvailable {
                hall,
                meal_type: None,
            });
        }
        if index == 0 || index > offers.len() {
            return Err(Error::InvalidSellerSelection { hall, index });
        }

        let offer = offers.remove(index - 1);
        let item = LineItem {
            contact: next.users.get(&offer.seller).cloned(),
            seller: offer.seller,
            tokens: offer.tokens,
        };

        self.commit(next)?;
        tracing::info!(seller = %item.seller, tokens = item.tokens, "Offer claimed");
        Ok(item)
    }
}
