//! Monte Carlo sweep over skill tiers and waves.
//!
//! Every trial draws from its own [`TrialRng`] keyed by (tier, wave, trial),
//! so a cell gives the same statistics whether its trials run sequentially or
//! on the rayon pool (feature `parallel`).
#[cfg(feature = "parallel")]
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::BalanceEngine;
use crate::combat::{SimulationResult, TrialError};
use crate::numbers::{count_to_f64, fraction};
use crate::rng::{TrialKey, TrialRng};
use crate::settings::GameSettings;
use crate::skill::SkillLevel;
use crate::verdict::{BalanceAnalysis, TierStatus};

/// Shape of a sweep.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SweepConfig {
    #[serde(default = "SweepConfig::default_max_waves")]
    pub max_waves: u32,
    /// Trials per (tier, wave) cell.
    #[serde(default = "SweepConfig::default_trials")]
    pub trials: u32,
    #[serde(default = "SweepConfig::default_seed")]
    pub seed: u64,
}

impl SweepConfig {
    const fn default_max_waves() -> u32 {
        5
    }

    const fn default_trials() -> u32 {
        20
    }

    const fn default_seed() -> u64 {
        1337
    }
}

impl Default for SweepConfig {
    fn default() -> Self {
        Self {
            max_waves: Self::default_max_waves(),
            trials: Self::default_trials(),
            seed: Self::default_seed(),
        }
    }
}

/// Reduced statistics of one (tier, wave) cell.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CellStats {
    pub wave: u32,
    /// Successes over completed trials; 0 if none completed.
    pub success_rate: f64,
    pub mean_efficiency: f64,
    pub mean_overkill: f64,
    pub enemy_health: u64,
    pub available_money: u32,
    pub trials_run: u32,
    pub trials_skipped: u32,
}

/// One skill tier across every wave of the sweep.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TierReport {
    pub skill: SkillLevel,
    pub label: String,
    pub weight: f64,
    pub overall_success: f64,
    pub status: TierStatus,
    pub waves: Vec<CellStats>,
}

impl TierReport {
    fn from_cells(skill: SkillLevel, waves: Vec<CellStats>) -> Self {
        let rates: f64 = waves.iter().map(|cell| cell.success_rate).sum();
        let overall_success = if waves.is_empty() {
            0.0
        } else {
            rates / count_to_f64(waves.len())
        };
        Self {
            skill,
            label: skill.label().to_string(),
            weight: skill.weight(),
            overall_success,
            status: TierStatus::classify(overall_success),
            waves,
        }
    }

    #[must_use]
    pub fn trials_skipped(&self) -> u32 {
        self.waves.iter().map(|cell| cell.trials_skipped).sum()
    }
}

/// Full sweep output: settings used, per-tier results and the verdict.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BalanceReport {
    pub sweep: SweepConfig,
    pub settings: GameSettings,
    pub tiers: Vec<TierReport>,
    pub analysis: BalanceAnalysis,
}

impl BalanceReport {
    #[must_use]
    pub fn tier(&self, skill: SkillLevel) -> Option<&TierReport> {
        self.tiers.iter().find(|tier| tier.skill == skill)
    }

    #[must_use]
    pub fn trials_skipped(&self) -> u32 {
        self.tiers.iter().map(TierReport::trials_skipped).sum()
    }
}

/// Running sums for a cell.
#[derive(Debug, Clone, Copy, Default)]
struct CellAccumulator {
    completed: usize,
    skipped: usize,
    successes: usize,
    efficiency: f64,
    overkill: f64,
}

impl CellAccumulator {
    fn record(mut self, outcome: Result<&SimulationResult, &TrialError>) -> Self {
        match outcome {
            Ok(result) => {
                self.completed += 1;
                if result.success {
                    self.successes += 1;
                }
                self.efficiency += result.efficiency;
                self.overkill += result.overkill_ratio;
            }
            Err(err) => {
                log::debug!("skipping trial: {err}");
                self.skipped += 1;
            }
        }
        self
    }

    fn merge(self, other: Self) -> Self {
        Self {
            completed: self.completed + other.completed,
            skipped: self.skipped + other.skipped,
            successes: self.successes + other.successes,
            efficiency: self.efficiency + other.efficiency,
            overkill: self.overkill + other.overkill,
        }
    }

    fn mean(&self, sum: f64) -> f64 {
        if self.completed == 0 {
            0.0
        } else {
            sum / count_to_f64(self.completed)
        }
    }

    fn finish(&self, wave: u32, enemy_health: u64, available_money: u32) -> CellStats {
        CellStats {
            wave,
            success_rate: fraction(self.successes, self.completed),
            mean_efficiency: self.mean(self.efficiency),
            mean_overkill: self.mean(self.overkill),
            enemy_health,
            available_money,
            trials_run: u32::try_from(self.completed).unwrap_or(u32::MAX),
            trials_skipped: u32::try_from(self.skipped).unwrap_or(u32::MAX),
        }
    }
}

impl BalanceEngine {
    /// One full trial: fresh money, fresh loadout, one combat roll.
    ///
    /// # Errors
    ///
    /// Propagates [`TrialError`] from the combat simulation.
    pub fn run_trial(&self, key: TrialKey, seed: u64) -> Result<SimulationResult, TrialError> {
        let mut rng = TrialRng::for_trial(seed, key);
        let wave = self.compose_wave(key.wave);
        let money = self.available_money(key.wave);
        let strategy = self.synthesize(key.skill, money, key.wave, rng.strategy());
        self.simulate(strategy, &wave, key.skill, rng.execution())
    }

    /// Run `trials` independent trials of one cell and reduce them.
    #[must_use]
    pub fn run_cell(&self, skill: SkillLevel, wave: u32, trials: u32, seed: u64) -> CellStats {
        let composition = self.compose_wave(wave);
        let money = self.available_money(wave);
        let run = |trial: u32| {
            let outcome = self.run_trial(TrialKey::new(skill, wave, trial), seed);
            CellAccumulator::default().record(outcome.as_ref())
        };

        // Collected in trial order so the float sums match across modes.
        #[cfg(feature = "parallel")]
        let outcomes: Vec<CellAccumulator> = (0..trials).into_par_iter().map(run).collect();
        #[cfg(not(feature = "parallel"))]
        let outcomes: Vec<CellAccumulator> = (0..trials).map(run).collect();
        let totals = outcomes
            .into_iter()
            .fold(CellAccumulator::default(), CellAccumulator::merge);

        if totals.skipped > 0 {
            log::warn!(
                "{skill} wave {wave}: skipped {} of {trials} trials",
                totals.skipped
            );
        }
        log::debug!(
            "{skill} wave {wave}: {}/{} successes",
            totals.successes,
            totals.completed
        );
        totals.finish(wave, composition.total_health, money)
    }

    /// Sweep every skill tier over waves `1..=max_waves` and classify the result.
    #[must_use]
    pub fn run_sweep(&self, sweep: SweepConfig) -> BalanceReport {
        let tiers: Vec<TierReport> = SkillLevel::ALL
            .into_iter()
            .map(|skill| {
                let cells = (1..=sweep.max_waves)
                    .map(|wave| self.run_cell(skill, wave, sweep.trials, sweep.seed))
                    .collect();
                TierReport::from_cells(skill, cells)
            })
            .collect();
        let analysis =
            BalanceAnalysis::from_rates(tiers.iter().map(|tier| (tier.skill, tier.overall_success)));
        BalanceReport {
            sweep,
            settings: self.settings().clone(),
            tiers,
            analysis,
        }
    }
}
