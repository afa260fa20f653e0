//! Error types for the meal-token ledger

use chrono::NaiveTime;
use thiserror::Error;

use crate::config::ConfigError;
use crate::models::{HallName, MealType};

#[derive(Error, Debug)]
pub enum Error {
    #[error("Roll number {roll} is already registered to '{username}'")]
    RollAlreadyRegistered { roll: String, username: String },

    #[error("Cannot sell {meal_type} tokens after {}", .cutoff.format("%H:%M"))]
    SellWindowClosed {
        meal_type: MealType,
        cutoff: NaiveTime,
    },

    #[error("Invalid token count: '{0}'")]
    InvalidTokenCount(String),

    #[error("Unknown hall: {0}")]
    UnknownHall(String),

    #[error("Unknown meal type: {0}")]
    UnknownMealType(String),

    #[error("Unknown user: {0}")]
    UnknownUser(String),

    #[error("Missing required field: {0}")]
    MissingField(&'static str),

    #[error(
        "No {} tokens available in {hall}",
        .meal_type.map(|m| m.as_str()).unwrap_or("meal")
    )]
    NoOffersAvailable {
        hall: HallName,
        meal_type: Option<MealType>,
    },

    #[error("Not enough tokens available: requested {requested}, only {available} available")]
    InsufficientTokens { requested: u32, available: u32 },

    #[error("Invalid seller selection {index} for {hall}")]
    InvalidSellerSelection { hall: HallName, index: usize },

    #[error("Failed to write snapshot to {target}: {source}")]
    PersistenceWriteFailed {
        target: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
