//! Player skill tiers.
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Ordered set of player skill tiers, from optimal play down to dismal play.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SkillLevel {
    Optimal,
    Expert,
    VeryGood,
    Good,
    AboveAverage,
    Average,
    BelowAverage,
    Poor,
    VeryPoor,
    Terrible,
    Dismal,
}

impl SkillLevel {
    /// Canonical iteration order, best to worst.
    pub const ALL: [SkillLevel; 11] = [
        SkillLevel::Optimal,
        SkillLevel::Expert,
        SkillLevel::VeryGood,
        SkillLevel::Good,
        SkillLevel::AboveAverage,
        SkillLevel::Average,
        SkillLevel::BelowAverage,
        SkillLevel::Poor,
        SkillLevel::VeryPoor,
        SkillLevel::Terrible,
        SkillLevel::Dismal,
    ];

    /// Weight in `[0, 1]` biasing every stochastic decision.
    #[must_use]
    pub const fn weight(self) -> f64 {
        match self {
            Self::Optimal => 1.0,
            Self::Expert => 0.9,
            Self::VeryGood => 0.8,
            Self::Good => 0.7,
            Self::AboveAverage => 0.6,
            Self::Average => 0.5,
            Self::BelowAverage => 0.4,
            Self::Poor => 0.3,
            Self::VeryPoor => 0.2,
            Self::Terrible => 0.1,
            Self::Dismal => 0.0,
        }
    }

    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Optimal => "Optimal (100%)",
            Self::Expert => "Expert (90%)",
            Self::VeryGood => "Very Good (80%)",
            Self::Good => "Good (70%)",
            Self::AboveAverage => "Above Average (60%)",
            Self::Average => "Average (50%)",
            Self::BelowAverage => "Below Average (40%)",
            Self::Poor => "Poor (30%)",
            Self::VeryPoor => "Very Poor (20%)",
            Self::Terrible => "Terrible (10%)",
            Self::Dismal => "Dismal (0%)",
        }
    }

    #[must_use]
    pub const fn key(self) -> &'static str {
        match self {
            Self::Optimal => "optimal",
            Self::Expert => "expert",
            Self::VeryGood => "very_good",
            Self::Good => "good",
            Self::AboveAverage => "above_average",
            Self::Average => "average",
            Self::BelowAverage => "below_average",
            Self::Poor => "poor",
            Self::VeryPoor => "very_poor",
            Self::Terrible => "terrible",
            Self::Dismal => "dismal",
        }
    }

    /// Position in [`SkillLevel::ALL`].
    #[must_use]
    pub const fn index(self) -> usize {
        self as usize
    }

    /// Whether this tier executes without any downside variance.
    #[must_use]
    pub fn is_perfect(self) -> bool {
        self.weight() >= 1.0
    }
}

impl fmt::Display for SkillLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for SkillLevel {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_lowercase().replace([' ', '-'], "_");
        Self::ALL
            .into_iter()
            .find(|level| level.key() == normalized)
            .ok_or(())
    }
}
