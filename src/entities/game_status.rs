use serde::{Deserialize, Serialize};
use std::fmt;

/// Publication status of a catalog game.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "UPPERCASE")]
pub enum GameStatus {
    /// Visible in public listings
    #[default]
    Active,
    /// Hidden from the public
    Inactive,
    /// Awaiting review
    Pending,
    /// Promoted by staff; hidden from public listings like any non-active game
    Featured,
}

impl fmt::Display for GameStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl GameStatus {
    /// Convert from database string representation
    #[allow(clippy::should_implement_trait)]
    #[must_use]
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_uppercase().as_str() {
            "ACTIVE" => Some(Self::Active),
            "INACTIVE" => Some(Self::Inactive),
            "PENDING" => Some(Self::Pending),
            "FEATURED" => Some(Self::Featured),
            _ => None,
        }
    }

    /// Convert to database string representation
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Active => "ACTIVE",
            Self::Inactive => "INACTIVE",
            Self::Pending => "PENDING",
            Self::Featured => "FEATURED",
        }
    }

    /// Check if the game shows up for anonymous visitors
    #[must_use]
    pub const fn is_public(&self) -> bool {
        matches!(self, Self::Active)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_str() {
        assert_eq!(GameStatus::from_str("ACTIVE"), Some(GameStatus::Active));
        assert_eq!(GameStatus::from_str("active"), Some(GameStatus::Active));
        assert_eq!(GameStatus::from_str("INACTIVE"), Some(GameStatus::Inactive));
        assert_eq!(GameStatus::from_str("PENDING"), Some(GameStatus::Pending));
        assert_eq!(GameStatus::from_str("FEATURED"), Some(GameStatus::Featured));
        assert_eq!(GameStatus::from_str("archived"), None);
    }

    #[test]
    fn test_as_str() {
        assert_eq!(GameStatus::Active.as_str(), "ACTIVE");
        assert_eq!(GameStatus::Featured.to_string(), "FEATURED");
    }

    #[test]
    fn test_is_public() {
        assert!(GameStatus::Active.is_public());
        assert!(!GameStatus::Inactive.is_public());
        assert!(!GameStatus::Pending.is_public());
        assert!(!GameStatus::Featured.is_public());
    }

    #[test]
    fn test_default() {
        assert_eq!(GameStatus::default(), GameStatus::Active);
    }
}
