//! Expiry policy
//!
//! Two independent time-of-day thresholds per meal type: the sell cutoff
//! stops new offers from being posted, the display cutoff removes offers
//! that were already posted. Both are inclusive: at exactly the cutoff the
//! action is still allowed.

use chrono::{NaiveDateTime, NaiveTime};
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::models::{MealType, Offer};

/// Cutoff pair for one meal type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Cutoffs {
    /// Latest time of day a new offer may be created
    #[serde(with = "hhmm")]
    pub sell: NaiveTime,
    /// Latest time of day an existing offer stays listed and matchable
    #[serde(with = "hhmm")]
    pub display: NaiveTime,
}

impl Cutoffs {
    pub fn new(sell: NaiveTime, display: NaiveTime) -> Self {
        Self { sell, display }
    }
}

/// Deserialized through a partial form, so any key left out of the
/// config keeps that meal's own default.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "PolicyConfig")]
pub struct ExpiryPolicy {
    pub lunch: Cutoffs,
    pub dinner: Cutoffs,
}

impl Default for ExpiryPolicy {
    fn default() -> Self {
        Self {
            lunch: Cutoffs::new(hm(14, 0), hm(14, 10)),
            dinner: Cutoffs::new(hm(22, 15), hm(22, 30)),
        }
    }
}

fn hm(hour: u32, minute: u32) -> NaiveTime {
    NaiveTime::from_hms_opt(hour, minute, 0).unwrap_or_default()
}

/// Config form of [`Cutoffs`] where either key may be missing
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct PartialCutoffs {
    #[serde(deserialize_with = "hhmm::deserialize_opt")]
    sell: Option<NaiveTime>,
    #[serde(deserialize_with = "hhmm::deserialize_opt")]
    display: Option<NaiveTime>,
}

impl PartialCutoffs {
    fn over(self, defaults: Cutoffs) -> Cutoffs {
        Cutoffs {
            sell: self.sell.unwrap_or(defaults.sell),
            display: self.display.unwrap_or(defaults.display),
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct PolicyConfig {
    lunch: PartialCutoffs,
    dinner: PartialCutoffs,
}

impl From<PolicyConfig> for ExpiryPolicy {
    fn from(config: PolicyConfig) -> Self {
        let defaults = ExpiryPolicy::default();
        Self {
            lunch: config.lunch.over(defaults.lunch),
            dinner: config.dinner.over(defaults.dinner),
        }
    }
}

impl ExpiryPolicy {
    pub fn cutoffs(&self, meal_type: MealType) -> &Cutoffs {
        match meal_type {
            MealType::Lunch => &self.lunch,
            MealType::Dinner => &self.dinner,
        }
    }

    pub fn sell_cutoff(&self, meal_type: MealType) -> NaiveTime {
        self.cutoffs(meal_type).sell
    }

    pub fn display_cutoff(&self, meal_type: MealType) -> NaiveTime {
        self.cutoffs(meal_type).display
    }

    /// Whether a new offer of `meal_type` may be created at `at`
    pub fn can_sell(&self, meal_type: MealType, at: NaiveDateTime) -> bool {
        at.time() <= self.sell_cutoff(meal_type)
    }

    pub fn check_sell_window(&self, meal_type: MealType, at: NaiveDateTime) -> Result<()> {
        if self.can_sell(meal_type, at) {
            Ok(())
        } else {
            Err(Error::SellWindowClosed {
                meal_type,
                cutoff: self.sell_cutoff(meal_type),
            })
        }
    }

    /// An offer is expired once `now` is past its display cutoff, or when it
    /// was created on a different day than `now`.
    pub fn is_expired(&self, offer: &Offer, now: NaiveDateTime) -> bool {
        offer.created_at.date() != now.date() || now.time() > self.display_cutoff(offer.meal_type)
    }

    /// Remove expired offers in place, keeping order. Returns how many were removed.
    pub fn purge_expired(&self, offers: &mut Vec<Offer>, now: NaiveDateTime) -> usize {
        let before = offers.len();
        offers.retain(|offer| !self.is_expired(offer, now));
        before - offers.len()
    }

    /// Log thresholds that look inconsistent. They are still honoured as given.
    pub fn warn_on_inverted_cutoffs(&self) {
        for meal_type in MealType::ALL {
            let cutoffs = self.cutoffs(meal_type);
            if cutoffs.display < cutoffs.sell {
                tracing::warn!(
                    meal_type = %meal_type,
                    sell = %cutoffs.sell.format("%H:%M"),
                    display = %cutoffs.display.format("%H:%M"),
                    "Display cutoff is earlier than sell cutoff; new offers may be hidden immediately"
                );
            }
        }
    }
}

/// Serde helpers for "HH:MM" times
mod hhmm {
    use chrono::NaiveTime;
    use serde::{Deserialize, Deserializer, Serializer};

    const FORMAT: &str = "%H:%M";

    pub fn serialize<S: Serializer>(time: &NaiveTime, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&time.format(FORMAT).to_string())
    }

    pub fn deserialize_opt<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<Option<NaiveTime>, D::Error> {
        deserialize(deserializer).map(Some)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<NaiveTime, D::Error> {
        let s = String::deserialize(deserializer)?;
        NaiveTime::parse_from_str(s.trim(), FORMAT)
            .map_err(|e| serde::de::Error::custom(format!("invalid time '{}' (expected HH:MM): {}", s, e)))
    }
}
