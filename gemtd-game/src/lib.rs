//! Gem tower-defense balance engine
//!
//! Platform-agnostic Monte Carlo model of a gem tower-defense game. For a
//! player skill tier and a wave it synthesizes a plausible loadout (towers,
//! levels, gems), computes its combat power and decides whether it clears the
//! wave. Many independent trials per (tier, wave) cell reduce to success rates
//! and a balance verdict.
//!
//! The crate performs no I/O. Settings come in through [`SettingsSource`],
//! randomness through explicit per-trial streams, and results go out as plain
//! data for a reporting layer to render.

pub mod aggregate;
pub mod combat;
pub mod constants;
pub mod economy;
pub mod gems;
pub mod numbers;
pub mod policy;
pub mod rng;
pub mod settings;
pub mod skill;
pub mod strategy;
pub mod tower;
pub mod verdict;
pub mod wave;

use rand::Rng;
use thiserror::Error;

// Re-export commonly used types
pub use aggregate::{BalanceReport, CellStats, SweepConfig, TierReport};
pub use combat::{CombatSimulator, SimulationResult, TrialError};
pub use economy::{available_money, inflated_cost, wave_income};
pub use gems::{GemEffect, GemKind};
pub use policy::{BalancePolicy, BudgetSplit, PolicyError};
pub use rng::{TrialKey, TrialRng};
pub use settings::{DefaultSettings, GameSettings, SettingsError, SettingsSource};
pub use skill::SkillLevel;
pub use strategy::{PhaseBudgets, SpendLedger, Strategy, StrategySynthesizer};
pub use tower::{BaseStats, EffectiveStats, TowerConfig, TowerKind};
pub use verdict::{BalanceAnalysis, SkillDistribution, TierStatus, Verdict, decide};
pub use wave::{EnemyCounts, EnemyKind, WaveComposition, compose_wave};

/// Errors raised while assembling a [`BalanceEngine`].
#[derive(Debug, Error)]
pub enum EngineError {
    #[error("failed to load game settings")]
    Source(#[source] Box<dyn std::error::Error + Send + Sync>),
    #[error("invalid game settings: {0}")]
    Settings(#[from] SettingsError),
    #[error("invalid balance policy: {0}")]
    Policy(#[from] PolicyError),
}

/// Settings and policy bound together; entry point for every core operation.
#[derive(Debug, Clone, PartialEq)]
pub struct BalanceEngine {
    settings: GameSettings,
    policy: BalancePolicy,
}

impl BalanceEngine {
    #[must_use]
    pub const fn new(settings: GameSettings, policy: BalancePolicy) -> Self {
        Self { settings, policy }
    }

    /// Engine with default settings and the bundled policy.
    #[must_use]
    pub fn with_defaults() -> Self {
        Self::new(GameSettings::default(), BalancePolicy::default_config())
    }

    /// Load settings from `source`, validate them and pair them with `policy`.
    ///
    /// # Errors
    ///
    /// Returns an error if the source fails or the settings or policy are invalid.
    pub fn from_source<S: SettingsSource>(
        source: &S,
        policy: BalancePolicy,
    ) -> Result<Self, EngineError> {
        let settings = source
            .load_settings()
            .map_err(|err| EngineError::Source(Box::new(err)))?;
        settings.validate()?;
        policy.validate()?;
        Ok(Self::new(settings, policy))
    }

    #[must_use]
    pub const fn settings(&self) -> &GameSettings {
        &self.settings
    }

    #[must_use]
    pub const fn policy(&self) -> &BalancePolicy {
        &self.policy
    }

    /// Enemy composition of `wave`.
    #[must_use]
    pub fn compose_wave(&self, wave: u32) -> WaveComposition {
        wave::compose_wave(&self.settings, wave)
    }

    /// Money available at the start of `wave`.
    #[must_use]
    pub fn available_money(&self, wave: u32) -> u32 {
        economy::available_money(&self.settings, wave)
    }

    /// Draw a loadout for `skill` spending at most `money` before `wave`.
    pub fn synthesize<R: Rng + ?Sized>(
        &self,
        skill: SkillLevel,
        money: u32,
        wave: u32,
        rng: &mut R,
    ) -> Strategy {
        StrategySynthesizer::new(&self.settings, &self.policy).synthesize(skill, money, wave, rng)
    }

    /// Play `strategy` against `wave` at `skill`.
    ///
    /// # Errors
    ///
    /// Returns [`TrialError`] if the outcome contains a non-finite metric.
    pub fn simulate<R: Rng + ?Sized>(
        &self,
        strategy: Strategy,
        wave: &WaveComposition,
        skill: SkillLevel,
        rng: &mut R,
    ) -> Result<SimulationResult, TrialError> {
        CombatSimulator::new(&self.settings, &self.policy).simulate(strategy, wave, skill, rng)
    }
}

impl Default for BalanceEngine {
    fn default() -> Self {
        Self::with_defaults()
    }
}
