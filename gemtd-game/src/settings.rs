//! Game settings supplied by the configuration layer.
//!
//! Every field carries a serde default so a partial settings document only
//! overrides what it names; anything missing falls back to the documented
//! default below.
use serde::{Deserialize, Serialize};
use std::convert::Infallible;
use thiserror::Error;

/// Immutable economic and combat base constants.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GameSettings {
    #[serde(default = "GameSettings::default_starting_money")]
    pub starting_money: u32,
    #[serde(default = "GameSettings::default_wave_bonus")]
    pub wave_bonus: u32,
    #[serde(default = "GameSettings::default_basic_tower_damage")]
    pub basic_tower_damage: f64,
    #[serde(default = "GameSettings::default_poison_tower_damage")]
    pub poison_tower_damage: f64,
    #[serde(default = "GameSettings::default_basic_tower_fire_rate")]
    pub basic_tower_fire_rate: f64,
    #[serde(default = "GameSettings::default_basic_tower_range")]
    pub basic_tower_range: f64,
    #[serde(default = "GameSettings::default_basic_tower_cost")]
    pub basic_tower_cost: u32,
    #[serde(default = "GameSettings::default_splash_tower_cost")]
    pub splash_tower_cost: u32,
    #[serde(default = "GameSettings::default_poison_tower_cost")]
    pub poison_tower_cost: u32,
    #[serde(default = "GameSettings::default_sniper_tower_cost")]
    pub sniper_tower_cost: u32,
    #[serde(default = "GameSettings::default_basic_enemy_health")]
    pub basic_enemy_health: u32,
    #[serde(default = "GameSettings::default_fast_enemy_health")]
    pub fast_enemy_health: u32,
    #[serde(default = "GameSettings::default_armored_enemy_health")]
    pub armored_enemy_health: u32,
    /// Estimated money earned per basic enemy killed.
    #[serde(default = "GameSettings::default_basic_enemy_reward")]
    pub basic_enemy_reward: u32,
    #[serde(default = "GameSettings::default_fast_enemy_reward")]
    pub fast_enemy_reward: u32,
    #[serde(default = "GameSettings::default_armored_enemy_reward")]
    pub armored_enemy_reward: u32,
    /// Seconds an enemy needs to walk the map path.
    #[serde(default = "GameSettings::default_path_duration")]
    pub path_duration: f64,
    #[serde(default)]
    pub has_diminishing_returns: bool,
    #[serde(default)]
    pub has_cost_inflation: bool,
    /// Only the strongest damage-over-time source counts against a wave.
    #[serde(default)]
    pub has_poison_stacking_prevention: bool,
}

impl GameSettings {
    const fn default_starting_money() -> u32 {
        220
    }

    const fn default_wave_bonus() -> u32 {
        12
    }

    const fn default_basic_tower_damage() -> f64 {
        22.0
    }

    const fn default_poison_tower_damage() -> f64 {
        5.0
    }

    const fn default_basic_tower_fire_rate() -> f64 {
        1.4
    }

    const fn default_basic_tower_range() -> f64 {
        105.0
    }

    const fn default_basic_tower_cost() -> u32 {
        50
    }

    const fn default_splash_tower_cost() -> u32 {
        75
    }

    const fn default_poison_tower_cost() -> u32 {
        100
    }

    const fn default_sniper_tower_cost() -> u32 {
        150
    }

    const fn default_basic_enemy_health() -> u32 {
        102
    }

    const fn default_fast_enemy_health() -> u32 {
        72
    }

    const fn default_armored_enemy_health() -> u32 {
        420
    }

    const fn default_basic_enemy_reward() -> u32 {
        5
    }

    const fn default_fast_enemy_reward() -> u32 {
        7
    }

    const fn default_armored_enemy_reward() -> u32 {
        12
    }

    const fn default_path_duration() -> f64 {
        12.0
    }

    /// Parse settings from a JSON document, filling missing fields with defaults.
    ///
    /// # Errors
    ///
    /// Returns an error if the document is not valid JSON or a value has the wrong type.
    pub fn from_json(raw: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(raw)
    }

    /// Check that every constant can drive the simulation.
    ///
    /// # Errors
    ///
    /// Returns the first violated constraint.
    pub fn validate(&self) -> Result<(), SettingsError> {
        let non_negative = [
            ("basic_tower_damage", self.basic_tower_damage),
            ("poison_tower_damage", self.poison_tower_damage),
            ("basic_tower_range", self.basic_tower_range),
            ("path_duration", self.path_duration),
        ];
        for (field, value) in non_negative {
            if !value.is_finite() || value < 0.0 {
                return Err(SettingsError::Negative { field, value });
            }
        }
        if !self.basic_tower_fire_rate.is_finite() || self.basic_tower_fire_rate <= 0.0 {
            return Err(SettingsError::NonPositiveFireRate {
                value: self.basic_tower_fire_rate,
            });
        }
        let costs = [
            ("basic_tower_cost", self.basic_tower_cost),
            ("splash_tower_cost", self.splash_tower_cost),
            ("poison_tower_cost", self.poison_tower_cost),
            ("sniper_tower_cost", self.sniper_tower_cost),
        ];
        for (field, value) in costs {
            if value == 0 {
                return Err(SettingsError::FreeTower { field });
            }
        }
        if self.armored_enemy_health < self.basic_enemy_health {
            return Err(SettingsError::ArmorBelowBasic {
                armored: self.armored_enemy_health,
                basic: self.basic_enemy_health,
            });
        }
        Ok(())
    }
}

impl Default for GameSettings {
    fn default() -> Self {
        Self {
            starting_money: Self::default_starting_money(),
            wave_bonus: Self::default_wave_bonus(),
            basic_tower_damage: Self::default_basic_tower_damage(),
            poison_tower_damage: Self::default_poison_tower_damage(),
            basic_tower_fire_rate: Self::default_basic_tower_fire_rate(),
            basic_tower_range: Self::default_basic_tower_range(),
            basic_tower_cost: Self::default_basic_tower_cost(),
            splash_tower_cost: Self::default_splash_tower_cost(),
            poison_tower_cost: Self::default_poison_tower_cost(),
            sniper_tower_cost: Self::default_sniper_tower_cost(),
            basic_enemy_health: Self::default_basic_enemy_health(),
            fast_enemy_health: Self::default_fast_enemy_health(),
            armored_enemy_health: Self::default_armored_enemy_health(),
            basic_enemy_reward: Self::default_basic_enemy_reward(),
            fast_enemy_reward: Self::default_fast_enemy_reward(),
            armored_enemy_reward: Self::default_armored_enemy_reward(),
            path_duration: Self::default_path_duration(),
            has_diminishing_returns: false,
            has_cost_inflation: false,
            has_poison_stacking_prevention: false,
        }
    }
}

/// Errors raised when settings cannot drive a meaningful simulation.
#[derive(Debug, Error, PartialEq)]
pub enum SettingsError {
    #[error("{field} must be a finite non-negative number (got {value})")]
    Negative { field: &'static str, value: f64 },
    #[error("basic_tower_fire_rate must be positive (got {value})")]
    NonPositiveFireRate { value: f64 },
    #[error("{field} must cost at least 1")]
    FreeTower { field: &'static str },
    /// Wave health must not shrink as later waves swap basic enemies for armored.
    #[error("armored_enemy_health ({armored}) must be at least basic_enemy_health ({basic})")]
    ArmorBelowBasic { armored: u32, basic: u32 },
}

/// Source of [`GameSettings`] for a balance run.
/// Platform-specific implementations should provide this
pub trait SettingsSource {
    type Error: std::error::Error + Send + Sync + 'static;

    /// Produce the settings a run should use.
    ///
    /// # Errors
    ///
    /// Returns an error if the source exists but cannot be read or parsed.
    fn load_settings(&self) -> Result<GameSettings, Self::Error>;
}

/// Source that always yields the documented defaults.
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultSettings;

impl SettingsSource for DefaultSettings {
    type Error = Infallible;

    fn load_settings(&self) -> Result<GameSettings, Self::Error> {
        Ok(GameSettings::default())
    }
}
