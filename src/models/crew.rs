//! Crew position model.

use serde::{Deserialize, Serialize};

/// The crew member's position, which selects the rate table row.
///
/// # Example
///
/// ```
/// use crew_pay_engine::models::Position;
///
/// let position: Position = serde_json::from_str("\"sccm\"").unwrap();
/// assert_eq!(position, Position::Sccm);
/// assert_eq!(position.to_string(), "SCCM");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Position {
    /// Cabin Crew Member.
    Ccm,
    /// Senior Cabin Crew Member.
    Sccm,
}

impl Position {
    /// Human-readable title of the position.
    pub fn title(&self) -> &'static str {
        match self {
            Position::Ccm => "Cabin Crew Member",
            Position::Sccm => "Senior Cabin Crew Member",
        }
    }
}

impl std::fmt::Display for Position {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Position::Ccm => write!(f, "CCM"),
            Position::Sccm => write!(f, "SCCM"),
        }
    }
}
