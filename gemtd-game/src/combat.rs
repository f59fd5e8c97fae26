//! Resolve one loadout against one wave.
use rand::Rng;
use serde::Serialize;
use thiserror::Error;

use crate::policy::BalancePolicy;
use crate::settings::GameSettings;
use crate::skill::SkillLevel;
use crate::strategy::Strategy;
use crate::tower::EffectiveStats;
use crate::wave::WaveComposition;

/// Outcome of one trial.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SimulationResult {
    pub skill: SkillLevel,
    pub wave: u32,
    pub success: bool,
    pub strategy: Strategy,
    pub total_spend: u32,
    /// Sum of tower DPS before targeting losses.
    pub raw_dps: f64,
    pub effective_dps: f64,
    pub effective_health: f64,
    pub damage_dealt: f64,
    pub variance_roll: f64,
    pub overkill_ratio: f64,
    /// Effective DPS per unit of money spent; 0 when nothing was spent.
    pub efficiency: f64,
}

/// A trial that cannot contribute to aggregate statistics.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum TrialError {
    #[error("trial produced a non-finite {metric} ({value})")]
    NonFinite { metric: &'static str, value: f64 },
}

/// Totals over every tower of a loadout.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
struct LoadoutPower {
    dps: f64,
    armor_penetration: f64,
}

impl LoadoutPower {
    fn from_stats(stats: &[EffectiveStats], single_burn_source: bool) -> Self {
        let armor_penetration = stats.iter().map(|s| s.armor_penetration).sum();
        let dps = if single_burn_source {
            let direct: f64 = stats.iter().map(|s| s.dps - s.burn_dps).sum();
            let strongest_burn = stats.iter().map(|s| s.burn_dps).fold(0.0, f64::max);
            direct + strongest_burn
        } else {
            stats.iter().map(|s| s.dps).sum()
        };
        Self {
            dps,
            armor_penetration,
        }
    }
}

/// Decides whether loadouts beat waves under a fixed settings and policy pair.
#[derive(Debug, Clone, Copy)]
pub struct CombatSimulator<'a> {
    settings: &'a GameSettings,
    policy: &'a BalancePolicy,
}

impl<'a> CombatSimulator<'a> {
    #[must_use]
    pub const fn new(settings: &'a GameSettings, policy: &'a BalancePolicy) -> Self {
        Self { settings, policy }
    }

    /// Play `strategy` against `wave` at `skill`.
    ///
    /// An empty strategy is a loss with zero damage. A wave with no health
    /// is won by any non-empty strategy with an overkill ratio of exactly 1.
    ///
    /// # Errors
    ///
    /// Returns [`TrialError::NonFinite`] if a metric overflows or turns NaN,
    /// which only happens with extreme settings or policy values.
    pub fn simulate<R: Rng + ?Sized>(
        &self,
        strategy: Strategy,
        wave: &WaveComposition,
        skill: SkillLevel,
        rng: &mut R,
    ) -> Result<SimulationResult, TrialError> {
        let weight = skill.weight();
        let combat = &self.policy.combat;
        #[allow(clippy::cast_precision_loss)]
        let total_health = wave.total_health as f64;
        let total_spend = strategy.spend().total();

        if strategy.is_empty() {
            return Ok(SimulationResult {
                skill,
                wave: wave.wave,
                success: false,
                strategy,
                total_spend,
                raw_dps: 0.0,
                effective_dps: 0.0,
                effective_health: total_health,
                damage_dealt: 0.0,
                variance_roll: 1.0,
                overkill_ratio: 0.0,
                efficiency: 0.0,
            });
        }

        let stats: Vec<EffectiveStats> = strategy
            .towers()
            .iter()
            .map(|tower| tower.effective_stats(self.settings))
            .collect();
        let power = LoadoutPower::from_stats(&stats, self.settings.has_poison_stacking_prevention);
        let raw_dps = finite("raw_dps", power.dps)?;
        let effective_dps = finite(
            "effective_dps",
            raw_dps * combat.micro_effectiveness(weight),
        )?;
        let effective_health =
            total_health * (1.0 - combat.armor_reduction(power.armor_penetration));

        let band = finite("variance_band", combat.variance_band(weight))?;
        let mut variance_roll = rng.gen_range((1.0 - band)..=(1.0 + band));
        if skill.is_perfect() {
            variance_roll = variance_roll.max(1.0);
        }
        let damage_dealt = finite(
            "damage_dealt",
            effective_dps * wave.damage_window() * variance_roll,
        )?;

        let (success, overkill_ratio) = if effective_health <= 0.0 {
            (true, 1.0)
        } else {
            let ratio = finite("overkill_ratio", damage_dealt / effective_health)?;
            (damage_dealt >= effective_health, ratio)
        };
        let efficiency = if total_spend == 0 {
            0.0
        } else {
            effective_dps / f64::from(total_spend)
        };

        Ok(SimulationResult {
            skill,
            wave: wave.wave,
            success,
            strategy,
            total_spend,
            raw_dps,
            effective_dps,
            effective_health,
            damage_dealt,
            variance_roll,
            overkill_ratio,
            efficiency,
        })
    }
}

fn finite(metric: &'static str, value: f64) -> Result<f64, TrialError> {
    if value.is_finite() {
        Ok(value)
    } else {
        Err(TrialError::NonFinite { metric, value })
    }
}
