//! Centralized scaling and tuning constants for the balance simulation.
//!
//! These values define the deterministic math of the tower, wave and economy
//! models. Stochastic policy knobs (budget splits, menus, variance bands) live
//! in [`crate::policy`] so they can be overridden without a code change.

// Tower levels ---------------------------------------------------------------
pub const MIN_TOWER_LEVEL: u8 = 1;
pub const MAX_TOWER_LEVEL: u8 = 5;
pub(crate) const LEVEL_DAMAGE_STEP: f64 = 0.5;
pub(crate) const LEVEL_RANGE_STEP: f64 = 0.2;
pub(crate) const LEVEL_FIRE_RATE_STEP: f64 = 0.3;

// Gem folding ----------------------------------------------------------------
pub(crate) const BURN_TICK_DIVISOR: f64 = 3.0;
pub(crate) const SLOW_EFFECTIVENESS_WEIGHT: f64 = 0.3;
pub(crate) const CHAIN_BONUS_PER_TARGET: f64 = 0.4;

// Archetype modifiers --------------------------------------------------------
pub(crate) const SPLASH_DAMAGE_BONUS: f64 = 5.0;
pub(crate) const SPLASH_RANGE_DELTA: f64 = -10.0;
pub(crate) const SPLASH_FIRE_RATE_MULT: f64 = 0.8;
pub(crate) const POISON_RANGE_DELTA: f64 = 5.0;
pub(crate) const POISON_FIRE_RATE_MULT: f64 = 1.2;
pub(crate) const SNIPER_DAMAGE_MULT: f64 = 2.0;
pub(crate) const SNIPER_RANGE_DELTA: f64 = 45.0;
pub(crate) const SNIPER_FIRE_RATE_MULT: f64 = 0.5;

// Gem slots per archetype ----------------------------------------------------
pub(crate) const BASIC_GEM_SLOTS: usize = 2;
pub(crate) const SPLASH_GEM_SLOTS: usize = 3;
pub(crate) const POISON_GEM_SLOTS: usize = 2;
pub(crate) const SNIPER_GEM_SLOTS: usize = 1;
/// Largest slot count of any archetype; sizes the inline gem storage.
pub const MAX_GEM_SLOTS: usize = 3;

// Wave tiers -----------------------------------------------------------------
pub(crate) const EARLY_TIER_LAST_WAVE: u32 = 3;
pub(crate) const MID_TIER_LAST_WAVE: u32 = 6;
pub(crate) const EARLY_BASE_COUNT: u32 = 3;
pub(crate) const MID_BASE_COUNT: u32 = 5;
pub(crate) const LATE_BASE_COUNT: u32 = 8;
pub(crate) const COUNT_PER_WAVE: u32 = 2;
pub(crate) const MID_FAST_SHARE_STEP: f64 = 0.1;
pub(crate) const MID_FAST_SHARE_CAP: f64 = 0.3;
pub(crate) const LATE_ARMORED_SHARE_STEP: f64 = 0.1;
pub(crate) const LATE_ARMORED_SHARE_CAP: f64 = 0.2;
pub(crate) const LATE_FAST_SHARE_BASE: f64 = 0.2;
pub(crate) const LATE_FAST_SHARE_STEP: f64 = 0.05;
pub(crate) const LATE_FAST_SHARE_CAP: f64 = 0.4;
pub(crate) const SPAWN_INTERVAL_SECS: f64 = 1.2;

// Economy --------------------------------------------------------------------
pub(crate) const BONUS_DECAY_PER_WAVE: f64 = 0.025;
pub(crate) const BONUS_DECAY_FLOOR: f64 = 0.15;
pub(crate) const KILL_DECAY_PER_WAVE: f64 = 0.02;
pub(crate) const KILL_DECAY_FLOOR: f64 = 0.25;
pub(crate) const COST_INFLATION_PER_WAVE: f64 = 0.03;
