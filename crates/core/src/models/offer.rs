//! Offer model - a seller's posted tokens at one hall

use std::fmt;
use std::str::FromStr;

use chrono::{NaiveDateTime, Timelike};
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Which cafeteria meal a token is good for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MealType {
    Lunch,
    Dinner,
}

impl MealType {
    pub const ALL: [MealType; 2] = [MealType::Lunch, MealType::Dinner];

    pub fn as_str(&self) -> &'static str {
        match self {
            MealType::Lunch => "Lunch",
            MealType::Dinner => "Dinner",
        }
    }
}

impl fmt::Display for MealType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MealType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "lunch" => Ok(MealType::Lunch),
            "dinner" => Ok(MealType::Dinner),
            _ => Err(Error::UnknownMealType(s.trim().to_string())),
        }
    }
}

/// Outstanding tokens posted by one seller.
///
/// `created_at` is campus wall-clock time; all cutoffs are compared
/// against it without any timezone conversion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Offer {
    pub seller: String,
    pub meal_type: MealType,
    pub tokens: u32,
    pub created_at: NaiveDateTime,
}

impl Offer {
    /// Create an offer. The timestamp is truncated to whole seconds, which
    /// is the precision the snapshot keeps.
    pub fn new(seller: String, meal_type: MealType, tokens: u32, created_at: NaiveDateTime) -> Self {
        Self {
            seller,
            meal_type,
            tokens,
            created_at: created_at.with_nanosecond(0).unwrap_or(created_at),
        }
    }
}

/// Parse a user-entered token quantity. Must be a positive integer.
pub fn parse_token_count(input: &str) -> Result<u32> {
    let trimmed = input.trim();
    match trimmed.parse::<u32>() {
        Ok(0) | Err(_) => Err(Error::InvalidTokenCount(trimmed.to_string())),
        Ok(count) => Ok(count),
    }
}
