//! Tunable policy tables for strategy synthesis and combat resolution.
//!
//! The numbers here are empirical choices rather than game rules, so they are
//! loaded from data (`assets/policy.json`) and every table can be replaced by
//! a partial JSON override. A missing or unreadable asset falls back to the
//! built-in tables, which match the shipped asset.
use serde::{Deserialize, Deserializer, Serialize};
use thiserror::Error;

use crate::gems::GemKind;
use crate::tower::TowerKind;

const DEFAULT_POLICY_DATA: &str = include_str!("../assets/policy.json");
const SPLIT_TOLERANCE: f64 = 1e-9;
/// Widest execution variance band; rolls stay within `[0, 2]`.
const MAX_VARIANCE_BAND: f64 = 1.0;

/// Linear function of skill weight: `base + per_skill × skill`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SkillCurve {
    pub base: f64,
    pub per_skill: f64,
}

impl SkillCurve {
    #[must_use]
    pub fn at(&self, skill: f64) -> f64 {
        self.per_skill.mul_add(skill, self.base)
    }
}

/// Fractions of available money given to each synthesis phase.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BudgetSplit {
    /// Lowest skill weight this band applies to.
    pub min_skill: f64,
    pub towers: f64,
    pub upgrades: f64,
    pub gems: f64,
}

impl BudgetSplit {
    #[must_use]
    pub fn total(&self) -> f64 {
        self.towers + self.upgrades + self.gems
    }
}

impl Default for BudgetSplit {
    fn default() -> Self {
        Self {
            min_skill: 0.0,
            towers: 1.0,
            upgrades: 0.0,
            gems: 0.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PurchasePolicy {
    /// Archetypes the synthesizer may buy, in preference order for ties.
    #[serde(
        default = "PurchasePolicy::default_archetypes",
        deserialize_with = "lenient_archetypes"
    )]
    pub archetypes: Vec<TowerKind>,
    /// Budget from which an expensive premature purchase becomes possible.
    #[serde(default = "PurchasePolicy::default_blunder_min_budget")]
    pub blunder_min_budget: u32,
    /// Blunder probability at skill 0; scales with `1 - skill`.
    #[serde(default = "PurchasePolicy::default_blunder_rate")]
    pub blunder_rate: f64,
}

impl PurchasePolicy {
    fn default_archetypes() -> Vec<TowerKind> {
        TowerKind::ALL.to_vec()
    }

    const fn default_blunder_min_budget() -> u32 {
        150
    }

    const fn default_blunder_rate() -> f64 {
        0.4
    }

    #[must_use]
    pub fn blunder_chance(&self, skill: f64) -> f64 {
        (1.0 - skill) * self.blunder_rate
    }
}

impl Default for PurchasePolicy {
    fn default() -> Self {
        Self {
            archetypes: Self::default_archetypes(),
            blunder_min_budget: Self::default_blunder_min_budget(),
            blunder_rate: Self::default_blunder_rate(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UpgradePolicy {
    /// Price of reaching level 2, 3, 4 and 5.
    #[serde(default = "UpgradePolicy::default_level_costs")]
    pub level_costs: Vec<u32>,
    /// Skill from which upgrades concentrate on the first towers built.
    #[serde(default = "UpgradePolicy::default_focus_min_skill")]
    pub focus_min_skill: f64,
    #[serde(default = "UpgradePolicy::default_focus_tower_count")]
    pub focus_tower_count: usize,
}

impl UpgradePolicy {
    fn default_level_costs() -> Vec<u32> {
        vec![30, 50, 80, 120]
    }

    const fn default_focus_min_skill() -> f64 {
        0.7
    }

    const fn default_focus_tower_count() -> usize {
        2
    }

    /// Price of moving a tower from `level` to `level + 1`, if that level is for sale.
    #[must_use]
    pub fn next_level_cost(&self, level: u8) -> Option<u32> {
        let index = usize::from(level).checked_sub(1)?;
        self.level_costs.get(index).copied()
    }

    /// How many of the built towers receive upgrades at `skill`.
    #[must_use]
    pub fn towers_to_upgrade(&self, skill: f64, built: usize) -> usize {
        if skill >= self.focus_min_skill {
            built.min(self.focus_tower_count)
        } else {
            built
        }
    }
}

impl Default for UpgradePolicy {
    fn default() -> Self {
        Self {
            level_costs: Self::default_level_costs(),
            focus_min_skill: Self::default_focus_min_skill(),
            focus_tower_count: Self::default_focus_tower_count(),
        }
    }
}

/// Gems a skill band tries, best first.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GemPriority {
    pub min_skill: f64,
    #[serde(deserialize_with = "lenient_gems")]
    pub gems: Vec<GemKind>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CombatPolicy {
    /// Share of nominal DPS a player realises through targeting.
    #[serde(default = "CombatPolicy::default_micro")]
    pub micro: SkillCurve,
    #[serde(default = "CombatPolicy::default_armor_per_penetration")]
    pub armor_per_penetration: f64,
    #[serde(default = "CombatPolicy::default_armor_reduction_cap")]
    pub armor_reduction_cap: f64,
    #[serde(default = "CombatPolicy::default_variance_base")]
    pub variance_base: f64,
    #[serde(default = "CombatPolicy::default_variance_per_missing_skill")]
    pub variance_per_missing_skill: f64,
}

impl CombatPolicy {
    const fn default_micro() -> SkillCurve {
        SkillCurve {
            base: 0.7,
            per_skill: 0.3,
        }
    }

    const fn default_armor_per_penetration() -> f64 {
        0.01
    }

    const fn default_armor_reduction_cap() -> f64 {
        0.2
    }

    const fn default_variance_base() -> f64 {
        0.05
    }

    const fn default_variance_per_missing_skill() -> f64 {
        0.1
    }

    #[must_use]
    pub fn micro_effectiveness(&self, skill: f64) -> f64 {
        self.micro.at(skill)
    }

    /// Fraction of enemy health removed by total armor penetration.
    #[must_use]
    pub fn armor_reduction(&self, penetration: f64) -> f64 {
        (penetration.max(0.0) * self.armor_per_penetration).min(self.armor_reduction_cap)
    }

    /// Half-width of the execution variance band at `skill`, clamped to `[0, 1]`.
    #[must_use]
    pub fn variance_band(&self, skill: f64) -> f64 {
        self.variance_per_missing_skill
            .mul_add(1.0 - skill, self.variance_base)
            .clamp(0.0, MAX_VARIANCE_BAND)
    }
}

impl Default for CombatPolicy {
    fn default() -> Self {
        Self {
            micro: Self::default_micro(),
            armor_per_penetration: Self::default_armor_per_penetration(),
            armor_reduction_cap: Self::default_armor_reduction_cap(),
            variance_base: Self::default_variance_base(),
            variance_per_missing_skill: Self::default_variance_per_missing_skill(),
        }
    }
}

/// Every tunable table the synthesizer and simulator consult.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BalancePolicy {
    /// Bands ordered by descending `min_skill`; the first match wins.
    #[serde(default = "BalancePolicy::default_budget_splits")]
    pub budget_splits: Vec<BudgetSplit>,
    #[serde(default)]
    pub purchase: PurchasePolicy,
    #[serde(default = "BalancePolicy::default_placement")]
    pub placement: SkillCurve,
    #[serde(default)]
    pub upgrades: UpgradePolicy,
    #[serde(default = "BalancePolicy::default_gem_priorities")]
    pub gem_priorities: Vec<GemPriority>,
    #[serde(default)]
    pub combat: CombatPolicy,
}

impl BalancePolicy {
    fn default_budget_splits() -> Vec<BudgetSplit> {
        [
            (0.95, 0.80, 0.15, 0.05),
            (0.85, 0.75, 0.18, 0.07),
            (0.75, 0.70, 0.20, 0.10),
            (0.65, 0.68, 0.22, 0.10),
            (0.45, 0.65, 0.25, 0.10),
            (0.0, 0.60, 0.30, 0.10),
        ]
        .into_iter()
        .map(|(min_skill, towers, upgrades, gems)| BudgetSplit {
            min_skill,
            towers,
            upgrades,
            gems,
        })
        .collect()
    }

    const fn default_placement() -> SkillCurve {
        SkillCurve {
            base: 0.6,
            per_skill: 0.4,
        }
    }

    fn default_gem_priorities() -> Vec<GemPriority> {
        use GemKind::{
            ElementalFury, Magma, PureEarth, PureFire, PureThunder, PureWater, PureWind, Steam,
            Storm,
        };
        vec![
            GemPriority {
                min_skill: 0.8,
                gems: vec![ElementalFury, Magma, Storm, PureFire, PureThunder, Steam],
            },
            GemPriority {
                min_skill: 0.5,
                gems: vec![PureFire, PureThunder, PureWind, Steam, Storm, PureWater],
            },
            GemPriority {
                min_skill: 0.0,
                gems: vec![PureFire, PureWater, PureWind, PureEarth],
            },
        ]
    }

    /// Policy parsed from the bundled asset, or the built-in tables if that fails.
    #[must_use]
    pub fn load_from_static() -> Self {
        serde_json::from_str(DEFAULT_POLICY_DATA).unwrap_or_else(|err| {
            log::warn!("bundled balance policy is unreadable ({err}); using built-in tables");
            Self::default()
        })
    }

    #[must_use]
    pub fn default_config() -> Self {
        Self::load_from_static()
    }

    /// Parse a (possibly partial) policy document.
    ///
    /// # Errors
    ///
    /// Returns an error if the document is not valid JSON or a value has the wrong type.
    pub fn from_json(raw: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(raw)
    }

    /// Budget split for `skill`: the first band whose `min_skill` it reaches.
    #[must_use]
    pub fn budget_split(&self, skill: f64) -> BudgetSplit {
        self.budget_splits
            .iter()
            .find(|band| skill >= band.min_skill)
            .or_else(|| self.budget_splits.last())
            .copied()
            .unwrap_or_default()
    }

    /// Gem priority list for `skill`.
    #[must_use]
    pub fn gem_priority(&self, skill: f64) -> &[GemKind] {
        self.gem_priorities
            .iter()
            .find(|band| skill >= band.min_skill)
            .or_else(|| self.gem_priorities.last())
            .map(|band| band.gems.as_slice())
            .unwrap_or_default()
    }

    #[must_use]
    pub fn placement_quality(&self, skill: f64) -> f64 {
        self.placement.at(skill).clamp(0.0, 1.0)
    }

    /// Check that the tables describe a usable policy.
    ///
    /// # Errors
    ///
    /// Returns the first table that is empty, overspends or contains a free level.
    pub fn validate(&self) -> Result<(), PolicyError> {
        if self.budget_splits.is_empty() {
            return Err(PolicyError::EmptyTable {
                table: "budget_splits",
            });
        }
        for band in &self.budget_splits {
            let shares = [band.towers, band.upgrades, band.gems];
            if shares.iter().any(|share| !share.is_finite() || *share < 0.0) {
                return Err(PolicyError::NegativeShare {
                    min_skill: band.min_skill,
                });
            }
            let total = band.total();
            if total > 1.0 + SPLIT_TOLERANCE {
                return Err(PolicyError::SplitOverflow {
                    min_skill: band.min_skill,
                    total,
                });
            }
        }
        if self.purchase.archetypes.is_empty() {
            return Err(PolicyError::EmptyTable {
                table: "purchase.archetypes",
            });
        }
        if let Some(position) = self.upgrades.level_costs.iter().position(|cost| *cost == 0) {
            return Err(PolicyError::FreeUpgrade {
                level: position + 2,
            });
        }
        Ok(())
    }
}

impl Default for BalancePolicy {
    fn default() -> Self {
        Self {
            budget_splits: Self::default_budget_splits(),
            purchase: PurchasePolicy::default(),
            placement: Self::default_placement(),
            upgrades: UpgradePolicy::default(),
            gem_priorities: Self::default_gem_priorities(),
            combat: CombatPolicy::default(),
        }
    }
}

/// Errors raised by [`BalancePolicy::validate`].
#[derive(Debug, Error, PartialEq)]
pub enum PolicyError {
    #[error("policy table {table} is empty")]
    EmptyTable { table: &'static str },
    #[error("budget band from skill {min_skill} allocates {total} of available money")]
    SplitOverflow { min_skill: f64, total: f64 },
    #[error("budget band from skill {min_skill} has a negative or non-finite share")]
    NegativeShare { min_skill: f64 },
    #[error("upgrade to level {level} must cost at least 1")]
    FreeUpgrade { level: usize },
}

fn lenient_gems<'de, D>(deserializer: D) -> Result<Vec<GemKind>, D::Error>
where
    D: Deserializer<'de>,
{
    let keys = Vec::<String>::deserialize(deserializer)?;
    Ok(keys.iter().filter_map(|key| GemKind::lookup(key)).collect())
}

fn lenient_archetypes<'de, D>(deserializer: D) -> Result<Vec<TowerKind>, D::Error>
where
    D: Deserializer<'de>,
{
    let keys = Vec::<String>::deserialize(deserializer)?;
    let mut kinds: Vec<TowerKind> = Vec::with_capacity(keys.len());
    for kind in keys.iter().map(|key| TowerKind::lookup(key)) {
        if !kinds.contains(&kind) {
            kinds.push(kind);
        }
    }
    Ok(kinds)
}
