//! Data models for the meal-token exchange

mod hall;
mod offer;
mod snapshot;
mod user;

pub use hall::*;
pub use offer::*;
pub use snapshot::*;
pub use user::*;
