//! Hall model - the fixed set of residential halls

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::Error;

/// A residential hall. The set is closed; halls are never created or removed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum HallName {
    #[serde(rename = "Zia Hall")]
    Zia,
    #[serde(rename = "Hamid Hall")]
    Hamid,
    #[serde(rename = "Shahidul Hall")]
    Shahidul,
    #[serde(rename = "Bongobandhu Hall")]
    Bongobandhu,
    #[serde(rename = "Selim Hall")]
    Selim,
}

impl HallName {
    /// Every hall, in display order
    pub const ALL: [HallName; 5] = [
        HallName::Zia,
        HallName::Hamid,
        HallName::Shahidul,
        HallName::Bongobandhu,
        HallName::Selim,
    ];

    /// Full display name, also used as the snapshot key
    pub fn as_str(&self) -> &'static str {
        match self {
            HallName::Zia => "Zia Hall",
            HallName::Hamid => "Hamid Hall",
            HallName::Shahidul => "Shahidul Hall",
            HallName::Bongobandhu => "Bongobandhu Hall",
            HallName::Selim => "Selim Hall",
        }
    }

    fn short_name(&self) -> &'static str {
        match self {
            HallName::Zia => "zia",
            HallName::Hamid => "hamid",
            HallName::Shahidul => "shahidul",
            HallName::Bongobandhu => "bongobandhu",
            HallName::Selim => "selim",
        }
    }
}

impl fmt::Display for HallName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Accepts "Zia Hall", "zia hall" or just "zia".
impl FromStr for HallName {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let needle = s.trim().to_lowercase();
        HallName::ALL
            .into_iter()
            .find(|hall| needle == hall.as_str().to_lowercase() || needle == hall.short_name())
            .ok_or_else(|| Error::UnknownHall(s.trim().to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_full_and_short_names() {
        assert_eq!("Zia Hall".parse::<HallName>().unwrap(), HallName::Zia);
        assert_eq!("  bongobandhu hall ".parse::<HallName>().unwrap(), HallName::Bongobandhu);
        assert_eq!("SELIM".parse::<HallName>().unwrap(), HallName::Selim);
    }

    #[test]
    fn test_unknown_hall() {
        let err = "Curzon Hall".parse::<HallName>().unwrap_err();
        assert!(matches!(err, Error::UnknownHall(name) if name == "Curzon Hall"));
    }

    #[test]
    fn test_serde_uses_display_name() {
        let json = serde_json::to_string(&HallName::Shahidul).unwrap();
        assert_eq!(json, "\"Shahidul Hall\"");
    }
}
