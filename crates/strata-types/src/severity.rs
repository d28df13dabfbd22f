use std::fmt;

use serde::{Deserialize, Serialize};

/// Impact severity, totally ordered: none < low < medium < high < critical.
///
/// The derived `Ord` follows declaration order, which is what the analyzer
/// relies on when combining a manifest entry's declared impact level with
/// the conflict-derived severity (`max` of the two).
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, Default,
)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    #[default]
    None,
    Low,
    Medium,
    High,
    Critical,
}

impl Severity {
    /// Numeric rank from 0 (none) to 4 (critical).
    pub fn rank(&self) -> u8 {
        match self {
            Self::None => 0,
            Self::Low => 1,
            Self::Medium => 2,
            Self::High => 3,
            Self::Critical => 4,
        }
    }

    /// Returns `true` if this severity blocks `apply_upgrade` until the
    /// corresponding impact record reaches a terminal status.
    pub fn is_blocking(&self) -> bool {
        matches!(self, Self::High | Self::Critical)
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::None => write!(f, "none"),
            Self::Low => write!(f, "low"),
            Self::Medium => write!(f, "medium"),
            Self::High => write!(f, "high"),
            Self::Critical => write!(f, "critical"),
        }
    }
}
