//! Tower archetypes, configured towers and their effective combat stats.
use serde::{Deserialize, Serialize};
use smallvec::{SmallVec, smallvec};
use std::fmt;
use std::str::FromStr;

use crate::constants::{
    BASIC_GEM_SLOTS, BURN_TICK_DIVISOR, CHAIN_BONUS_PER_TARGET, LEVEL_DAMAGE_STEP,
    LEVEL_FIRE_RATE_STEP, LEVEL_RANGE_STEP, MAX_GEM_SLOTS, MAX_TOWER_LEVEL, MIN_TOWER_LEVEL,
    POISON_FIRE_RATE_MULT, POISON_GEM_SLOTS, POISON_RANGE_DELTA, SLOW_EFFECTIVENESS_WEIGHT,
    SNIPER_DAMAGE_MULT, SNIPER_FIRE_RATE_MULT, SNIPER_GEM_SLOTS, SNIPER_RANGE_DELTA,
    SPLASH_DAMAGE_BONUS, SPLASH_FIRE_RATE_MULT, SPLASH_GEM_SLOTS, SPLASH_RANGE_DELTA,
};
use crate::gems::GemKind;
use crate::settings::GameSettings;

/// Tower archetypes available to the player.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TowerKind {
    Basic,
    Splash,
    Poison,
    Sniper,
}

impl TowerKind {
    pub const ALL: [TowerKind; 4] = [
        TowerKind::Basic,
        TowerKind::Splash,
        TowerKind::Poison,
        TowerKind::Sniper,
    ];

    #[must_use]
    pub const fn key(self) -> &'static str {
        match self {
            Self::Basic => "basic",
            Self::Splash => "splash",
            Self::Poison => "poison",
            Self::Sniper => "sniper",
        }
    }

    #[must_use]
    pub const fn gem_slots(self) -> usize {
        match self {
            Self::Basic => BASIC_GEM_SLOTS,
            Self::Splash => SPLASH_GEM_SLOTS,
            Self::Poison => POISON_GEM_SLOTS,
            Self::Sniper => SNIPER_GEM_SLOTS,
        }
    }

    /// List price before any wave inflation.
    #[must_use]
    pub const fn cost(self, settings: &GameSettings) -> u32 {
        match self {
            Self::Basic => settings.basic_tower_cost,
            Self::Splash => settings.splash_tower_cost,
            Self::Poison => settings.poison_tower_cost,
            Self::Sniper => settings.sniper_tower_cost,
        }
    }

    /// Level-1, gemless stats derived from the basic tower constants.
    #[must_use]
    pub fn base_stats(self, settings: &GameSettings) -> BaseStats {
        let damage = settings.basic_tower_damage;
        let range = settings.basic_tower_range;
        let fire_rate = settings.basic_tower_fire_rate;
        let cost = self.cost(settings);
        match self {
            Self::Basic => BaseStats {
                damage,
                range,
                fire_rate,
                cost,
            },
            Self::Splash => BaseStats {
                damage: damage + SPLASH_DAMAGE_BONUS,
                range: range + SPLASH_RANGE_DELTA,
                fire_rate: fire_rate * SPLASH_FIRE_RATE_MULT,
                cost,
            },
            Self::Poison => BaseStats {
                damage: settings.poison_tower_damage,
                range: range + POISON_RANGE_DELTA,
                fire_rate: fire_rate * POISON_FIRE_RATE_MULT,
                cost,
            },
            Self::Sniper => BaseStats {
                damage: damage * SNIPER_DAMAGE_MULT,
                range: range + SNIPER_RANGE_DELTA,
                fire_rate: fire_rate * SNIPER_FIRE_RATE_MULT,
                cost,
            },
        }
    }

    /// Resolve an archetype key, falling back to [`TowerKind::Basic`] with a warning.
    ///
    /// Callers that care should validate against [`TowerKind::ALL`] first.
    #[must_use]
    pub fn lookup(key: &str) -> Self {
        key.parse().unwrap_or_else(|()| {
            log::warn!("unknown tower archetype {key:?}; using basic tower stats");
            Self::Basic
        })
    }
}

impl fmt::Display for TowerKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

impl FromStr for TowerKind {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_lowercase();
        Self::ALL
            .into_iter()
            .find(|kind| kind.key() == normalized)
            .ok_or(())
    }
}

/// Nominal stats of an archetype at level 1 with no gems.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct BaseStats {
    pub damage: f64,
    pub range: f64,
    pub fire_rate: f64,
    pub cost: u32,
}

impl BaseStats {
    /// Nominal damage per second bought per unit of money.
    #[must_use]
    pub fn dps_per_cost(&self) -> f64 {
        if self.cost == 0 {
            return 0.0;
        }
        self.damage * self.fire_rate / f64::from(self.cost)
    }
}

/// Gem slot storage; never longer than the widest archetype.
pub type GemSlots = SmallVec<[Option<GemKind>; MAX_GEM_SLOTS]>;

/// A placed tower: archetype, level, gem slots and placement quality.
///
/// The slot list is sized from the archetype on construction and every empty
/// slot is an explicit `None`. Levels only ever go up.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TowerConfig {
    kind: TowerKind,
    level: u8,
    gems: GemSlots,
    placement_quality: f64,
}

impl TowerConfig {
    /// Level-1 tower with every slot empty and perfect placement.
    #[must_use]
    pub fn new(kind: TowerKind) -> Self {
        Self {
            kind,
            level: MIN_TOWER_LEVEL,
            gems: smallvec![None; kind.gem_slots()],
            placement_quality: 1.0,
        }
    }

    /// Set placement quality, clamped to `[0, 1]`.
    #[must_use]
    pub fn with_placement(mut self, quality: f64) -> Self {
        self.placement_quality = if quality.is_finite() {
            quality.clamp(0.0, 1.0)
        } else {
            0.0
        };
        self
    }

    /// Start the tower at `level`, clamped to the valid level range.
    #[must_use]
    pub fn with_level(mut self, level: u8) -> Self {
        self.level = level.clamp(MIN_TOWER_LEVEL, MAX_TOWER_LEVEL);
        self
    }

    /// Socket `gem` into `slot` if that slot exists and is empty.
    #[must_use]
    pub fn with_gem(mut self, slot: usize, gem: GemKind) -> Self {
        self.socket(slot, gem);
        self
    }

    #[must_use]
    pub const fn kind(&self) -> TowerKind {
        self.kind
    }

    #[must_use]
    pub const fn level(&self) -> u8 {
        self.level
    }

    #[must_use]
    pub fn gems(&self) -> &[Option<GemKind>] {
        &self.gems
    }

    #[must_use]
    pub const fn placement_quality(&self) -> f64 {
        self.placement_quality
    }

    /// Raise the tower one level. Returns `false` at the level cap.
    pub fn level_up(&mut self) -> bool {
        if self.level >= MAX_TOWER_LEVEL {
            return false;
        }
        self.level += 1;
        true
    }

    /// Fill an empty slot. Returns `false` if the slot is missing or occupied.
    pub fn socket(&mut self, slot: usize, gem: GemKind) -> bool {
        match self.gems.get_mut(slot) {
            Some(entry) if entry.is_none() => {
                *entry = Some(gem);
                true
            }
            _ => false,
        }
    }

    /// Indices of slots that still hold no gem.
    pub fn empty_slots(&self) -> impl Iterator<Item = usize> + '_ {
        self.gems
            .iter()
            .enumerate()
            .filter(|(_, gem)| gem.is_none())
            .map(|(idx, _)| idx)
    }

    /// Sum of catalog prices of socketed gems.
    #[must_use]
    pub fn gem_spend(&self) -> u32 {
        self.gems.iter().flatten().map(|gem| gem.cost()).sum()
    }

    /// Fold level scaling, gems and placement into effective stats.
    #[must_use]
    pub fn effective_stats(&self, settings: &GameSettings) -> EffectiveStats {
        let base = self.kind.base_stats(settings);
        let steps = f64::from(self.level.saturating_sub(MIN_TOWER_LEVEL));

        let mut damage = base.damage * LEVEL_DAMAGE_STEP.mul_add(steps, 1.0);
        let mut range = base.range * LEVEL_RANGE_STEP.mul_add(steps, 1.0);
        let mut fire_rate = base.fire_rate * LEVEL_FIRE_RATE_STEP.mul_add(steps, 1.0);

        let mut armor_penetration = 0.0;
        let mut burn_dps = 0.0;
        let mut slow_effectiveness = 0.0;
        let mut chain_bonus = 1.0;

        for effect in self.gems.iter().flatten().map(|gem| gem.effect()) {
            damage *= effect.damage_multiplier;
            fire_rate *= effect.attack_speed_multiplier;
            range *= effect.range_multiplier;
            armor_penetration += effect.armor_penetration;
            burn_dps += effect.burn_damage * (effect.burn_duration / BURN_TICK_DIVISOR);
            slow_effectiveness += (1.0 - effect.slow_factor) * SLOW_EFFECTIVENESS_WEIGHT;
            chain_bonus += f64::from(effect.chain_targets) * CHAIN_BONUS_PER_TARGET;
        }

        let effective_damage = damage * self.placement_quality;
        let effective_fire_rate = fire_rate * self.placement_quality;
        let dps = effective_damage * effective_fire_rate * chain_bonus + burn_dps;

        EffectiveStats {
            damage: effective_damage,
            fire_rate: effective_fire_rate,
            range,
            dps,
            burn_dps,
            armor_penetration,
            slow_effectiveness,
            chain_bonus,
        }
    }
}

/// Combat stats of a configured tower after levels, gems and placement.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct EffectiveStats {
    pub damage: f64,
    pub fire_rate: f64,
    pub range: f64,
    /// Total damage per second including chain bonus and burn.
    pub dps: f64,
    /// Burn portion of `dps`.
    pub burn_dps: f64,
    pub armor_penetration: f64,
    pub slow_effectiveness: f64,
    pub chain_bonus: f64,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx(actual: f64, expected: f64) {
        assert!(
            (actual - expected).abs() < 1e-9,
            "expected {expected}, got {actual}"
        );
    }

    #[test]
    fn slots_are_sized_from_archetype() {
        for kind in TowerKind::ALL {
            let tower = TowerConfig::new(kind);
            assert_eq!(tower.gems().len(), kind.gem_slots());
            assert!(tower.gems().iter().all(Option::is_none));
        }
        assert_eq!(TowerConfig::new(TowerKind::Splash).gems().len(), 3);
        assert_eq!(TowerConfig::new(TowerKind::Sniper).gems().len(), 1);
    }

    #[test]
    fn plain_basic_tower_dps() {
        let settings = GameSettings::default();
        let stats = TowerConfig::new(TowerKind::Basic).effective_stats(&settings);
        approx(stats.dps, 22.0 * 1.4);
        approx(stats.dps, 30.8);
        approx(stats.range, 105.0);
        approx(stats.chain_bonus, 1.0);
    }

    #[test]
    fn fire_gem_adds_multiplier_and_burn() {
        let settings = GameSettings::default();
        let tower = TowerConfig::new(TowerKind::Basic).with_gem(0, GemKind::PureFire);
        let stats = tower.effective_stats(&settings);
        approx(stats.dps, 22.0 * 1.25 * 1.4 + 10.0 * (2.0 / 3.0));
        assert!((stats.dps - 45.17).abs() < 0.01);
        approx(stats.burn_dps, 20.0 / 3.0);
    }

    #[test]
    fn level_scaling_is_linear_per_level() {
        let settings = GameSettings::default();
        let stats = TowerConfig::new(TowerKind::Basic)
            .with_level(3)
            .effective_stats(&settings);
        approx(stats.damage, 22.0 * 2.0);
        approx(stats.range, 105.0 * 1.4);
        approx(stats.fire_rate, 1.4 * 1.6);
    }

    #[test]
    fn chain_bonus_applies_before_burn() {
        let settings = GameSettings::default();
        let stats = TowerConfig::new(TowerKind::Basic)
            .with_gem(0, GemKind::Storm)
            .with_gem(1, GemKind::PureFire)
            .effective_stats(&settings);
        let damage = 22.0 * 1.2 * 1.25;
        let fire_rate = 1.4 * 1.5;
        approx(stats.chain_bonus, 1.8);
        approx(stats.dps, damage * fire_rate * 1.8 + 20.0 / 3.0);
    }

    #[test]
    fn placement_degrades_damage_and_rate_not_range() {
        let settings = GameSettings::default();
        let stats = TowerConfig::new(TowerKind::Basic)
            .with_placement(0.5)
            .effective_stats(&settings);
        approx(stats.damage, 11.0);
        approx(stats.fire_rate, 0.7);
        approx(stats.range, 105.0);
        approx(stats.dps, 7.7);
    }

    #[test]
    fn placement_is_clamped() {
        let high = TowerConfig::new(TowerKind::Basic).with_placement(3.0);
        assert!((high.placement_quality() - 1.0).abs() < f64::EPSILON);
        let nan = TowerConfig::new(TowerKind::Basic).with_placement(f64::NAN);
        assert!(nan.placement_quality().abs() < f64::EPSILON);
    }

    #[test]
    fn level_up_stops_at_cap() {
        let mut tower = TowerConfig::new(TowerKind::Sniper);
        let mut steps = 0;
        while tower.level_up() {
            steps += 1;
        }
        assert_eq!(steps, 4);
        assert_eq!(tower.level(), MAX_TOWER_LEVEL);
    }

    #[test]
    fn socket_only_fills_empty_existing_slots() {
        let mut tower = TowerConfig::new(TowerKind::Sniper);
        assert!(tower.socket(0, GemKind::Magma));
        assert!(!tower.socket(0, GemKind::PureFire));
        assert!(!tower.socket(1, GemKind::PureFire));
        assert_eq!(tower.gems(), &[Some(GemKind::Magma)]);
        assert_eq!(tower.empty_slots().count(), 0);
        assert_eq!(tower.gem_spend(), 75);
    }

    #[test]
    fn effective_stats_is_pure() {
        let settings = GameSettings::default();
        let tower = TowerConfig::new(TowerKind::Splash)
            .with_level(2)
            .with_gem(1, GemKind::PureEarth)
            .with_placement(0.8);
        assert_eq!(
            tower.effective_stats(&settings),
            tower.effective_stats(&settings)
        );
    }

    #[test]
    fn archetype_modifiers_follow_basic_constants() {
        let settings = GameSettings::default();
        let sniper = TowerKind::Sniper.base_stats(&settings);
        approx(sniper.damage, 44.0);
        approx(sniper.fire_rate, 0.7);
        approx(sniper.range, 150.0);
        assert_eq!(sniper.cost, 150);
        let poison = TowerKind::Poison.base_stats(&settings);
        approx(poison.damage, 5.0);
        approx(poison.fire_rate, 1.68);
        let splash = TowerKind::Splash.base_stats(&settings);
        approx(splash.damage, 27.0);
        approx(splash.range, 95.0);
    }

    #[test]
    fn basic_tower_is_most_cost_effective_by_default() {
        let settings = GameSettings::default();
        let best = TowerKind::ALL
            .into_iter()
            .max_by(|a, b| {
                a.base_stats(&settings)
                    .dps_per_cost()
                    .total_cmp(&b.base_stats(&settings).dps_per_cost())
            })
            .unwrap();
        assert_eq!(best, TowerKind::Basic);
    }

    #[test]
    fn unknown_archetype_falls_back_to_basic() {
        assert_eq!(TowerKind::lookup("laser"), TowerKind::Basic);
        assert_eq!(TowerKind::lookup("Sniper"), TowerKind::Sniper);
    }
}
