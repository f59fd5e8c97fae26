//! Classification of aggregate success rates.
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::skill::SkillLevel;

const TOO_EASY_RATE: f64 = 0.9;
const BALANCED_RATE: f64 = 0.7;
const HARD_RATE: f64 = 0.5;

/// How a single skill tier experiences the game.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TierStatus {
    TooEasy,
    Balanced,
    Hard,
    TooHard,
}

impl TierStatus {
    #[must_use]
    pub fn classify(success_rate: f64) -> Self {
        if success_rate >= TOO_EASY_RATE {
            Self::TooEasy
        } else if success_rate >= BALANCED_RATE {
            Self::Balanced
        } else if success_rate >= HARD_RATE {
            Self::Hard
        } else {
            Self::TooHard
        }
    }

    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::TooEasy => "Too Easy",
            Self::Balanced => "Balanced",
            Self::Hard => "Hard",
            Self::TooHard => "Too Hard",
        }
    }
}

impl fmt::Display for TierStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Overall balance verdict of a sweep.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Verdict {
    TooEasy,
    TooHard,
    Optimal,
    Acceptable,
}

impl Verdict {
    /// Whether this verdict should let a balance check pass.
    #[must_use]
    pub const fn is_passing(self) -> bool {
        matches!(self, Self::Optimal | Self::Acceptable)
    }

    #[must_use]
    pub const fn key(self) -> &'static str {
        match self {
            Self::TooEasy => "TOO_EASY",
            Self::TooHard => "TOO_HARD",
            Self::Optimal => "OPTIMAL",
            Self::Acceptable => "ACCEPTABLE",
        }
    }

    #[must_use]
    pub const fn summary(self) -> &'static str {
        match self {
            Self::TooEasy => "Even expert players trivialize the content",
            Self::TooHard => "Even expert players struggle significantly",
            Self::Optimal => "Challenging progression across all skill levels",
            Self::Acceptable => "Within reasonable difficulty parameters",
        }
    }

    #[must_use]
    pub const fn recommendation(self) -> &'static str {
        match self {
            Self::TooEasy => "Increase enemy health or reduce tower power",
            Self::TooHard => "Reduce enemy health or increase tower power",
            Self::Optimal => "Keep current settings",
            Self::Acceptable => "Minor adjustments may improve the experience",
        }
    }
}

impl fmt::Display for Verdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

/// Number of skill tiers in each status band.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct SkillDistribution {
    pub too_easy: usize,
    pub balanced: usize,
    pub hard: usize,
    pub too_hard: usize,
}

impl SkillDistribution {
    pub fn from_rates<I>(rates: I) -> Self
    where
        I: IntoIterator<Item = f64>,
    {
        rates
            .into_iter()
            .fold(Self::default(), |mut dist, rate| {
                match TierStatus::classify(rate) {
                    TierStatus::TooEasy => dist.too_easy += 1,
                    TierStatus::Balanced => dist.balanced += 1,
                    TierStatus::Hard => dist.hard += 1,
                    TierStatus::TooHard => dist.too_hard += 1,
                }
                dist
            })
    }

    #[must_use]
    pub const fn total(&self) -> usize {
        self.too_easy + self.balanced + self.hard + self.too_hard
    }
}

/// Key success rates and the verdict derived from them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BalanceAnalysis {
    pub optimal_success: f64,
    pub expert_success: f64,
    pub average_success: f64,
    pub poor_success: f64,
    pub distribution: SkillDistribution,
    pub verdict: Verdict,
}

impl BalanceAnalysis {
    /// Analyse overall success per tier. Tiers missing from `rates` count as 0.
    pub fn from_rates<I>(rates: I) -> Self
    where
        I: IntoIterator<Item = (SkillLevel, f64)>,
    {
        let mut by_tier = [0.0; SkillLevel::ALL.len()];
        let mut seen = Vec::with_capacity(by_tier.len());
        for (skill, rate) in rates {
            by_tier[skill.index()] = rate;
            seen.push(rate);
        }
        let rate = |skill: SkillLevel| by_tier[skill.index()];
        let optimal = rate(SkillLevel::Optimal);
        let expert = rate(SkillLevel::Expert);
        let average = rate(SkillLevel::Average);
        let poor = rate(SkillLevel::Poor);

        Self {
            optimal_success: optimal,
            expert_success: expert,
            average_success: average,
            poor_success: poor,
            distribution: SkillDistribution::from_rates(seen),
            verdict: decide(optimal, expert, average, poor),
        }
    }
}

/// Verdict from the four anchor tiers, checked in order.
#[must_use]
pub fn decide(optimal: f64, expert: f64, average: f64, poor: f64) -> Verdict {
    if optimal >= 0.98 || expert >= 0.95 {
        Verdict::TooEasy
    } else if expert < 0.6 || average < 0.3 {
        Verdict::TooHard
    } else if (0.75..=0.92).contains(&expert) && (0.4..=0.7).contains(&average) && poor >= 0.15 {
        Verdict::Optimal
    } else {
        Verdict::Acceptable
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_bands() {
        assert_eq!(TierStatus::classify(1.0), TierStatus::TooEasy);
        assert_eq!(TierStatus::classify(0.9), TierStatus::TooEasy);
        assert_eq!(TierStatus::classify(0.89), TierStatus::Balanced);
        assert_eq!(TierStatus::classify(0.7), TierStatus::Balanced);
        assert_eq!(TierStatus::classify(0.5), TierStatus::Hard);
        assert_eq!(TierStatus::classify(0.49), TierStatus::TooHard);
    }

    #[test]
    fn verdict_rules_apply_in_order() {
        assert_eq!(decide(0.98, 0.5, 0.1, 0.0), Verdict::TooEasy);
        assert_eq!(decide(0.9, 0.95, 0.5, 0.2), Verdict::TooEasy);
        assert_eq!(decide(0.9, 0.59, 0.5, 0.2), Verdict::TooHard);
        assert_eq!(decide(0.9, 0.8, 0.29, 0.2), Verdict::TooHard);
        assert_eq!(decide(0.95, 0.85, 0.55, 0.2), Verdict::Optimal);
        assert_eq!(decide(0.95, 0.85, 0.55, 0.1), Verdict::Acceptable);
        assert_eq!(decide(0.97, 0.93, 0.55, 0.2), Verdict::Acceptable);
    }

    #[test]
    fn only_optimal_and_acceptable_pass() {
        assert!(Verdict::Optimal.is_passing());
        assert!(Verdict::Acceptable.is_passing());
        assert!(!Verdict::TooEasy.is_passing());
        assert!(!Verdict::TooHard.is_passing());
        assert_eq!(
            serde_json::to_string(&Verdict::TooEasy).unwrap(),
            "\"TOO_EASY\""
        );
    }

    #[test]
    fn analysis_reads_anchor_tiers() {
        let rates = SkillLevel::ALL
            .iter()
            .map(|skill| (*skill, skill.weight()));
        let analysis = BalanceAnalysis::from_rates(rates);
        assert!((analysis.expert_success - 0.9).abs() < f64::EPSILON);
        assert!((analysis.poor_success - 0.3).abs() < f64::EPSILON);
        assert_eq!(analysis.verdict, Verdict::TooEasy);
        assert_eq!(
            analysis.distribution,
            SkillDistribution {
                too_easy: 2,
                balanced: 2,
                hard: 2,
                too_hard: 5
            }
        );
        assert_eq!(analysis.distribution.total(), 11);
    }
}
