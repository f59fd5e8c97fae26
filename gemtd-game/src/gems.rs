//! Closed gem catalog: effects and prices per gem key.
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Identifier of a gem in the catalog.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum GemKind {
    PureFire,
    PureWater,
    PureThunder,
    PureWind,
    PureEarth,
    Steam,
    Storm,
    Magma,
    ElementalFury,
}

impl GemKind {
    pub const ALL: [GemKind; 9] = [
        GemKind::PureFire,
        GemKind::PureWater,
        GemKind::PureThunder,
        GemKind::PureWind,
        GemKind::PureEarth,
        GemKind::Steam,
        GemKind::Storm,
        GemKind::Magma,
        GemKind::ElementalFury,
    ];

    #[must_use]
    pub const fn key(self) -> &'static str {
        match self {
            Self::PureFire => "PURE_FIRE",
            Self::PureWater => "PURE_WATER",
            Self::PureThunder => "PURE_THUNDER",
            Self::PureWind => "PURE_WIND",
            Self::PureEarth => "PURE_EARTH",
            Self::Steam => "STEAM",
            Self::Storm => "STORM",
            Self::Magma => "MAGMA",
            Self::ElementalFury => "ELEMENTAL_FURY",
        }
    }

    /// Price of socketing this gem.
    #[must_use]
    pub const fn cost(self) -> u32 {
        match self {
            Self::PureFire | Self::PureWater => 40,
            Self::PureThunder => 45,
            Self::PureWind | Self::PureEarth => 35,
            Self::Steam => 65,
            Self::Storm => 70,
            Self::Magma => 75,
            Self::ElementalFury => 120,
        }
    }

    #[must_use]
    pub fn effect(self) -> GemEffect {
        let base = GemEffect::default();
        match self {
            Self::PureFire => GemEffect {
                damage_multiplier: 1.25,
                burn_damage: 10.0,
                burn_duration: 2.0,
                ..base
            },
            Self::PureWater => GemEffect {
                damage_multiplier: 1.2,
                slow_factor: 0.7,
                slow_duration: 2.0,
                ..base
            },
            Self::PureThunder => GemEffect {
                damage_multiplier: 1.15,
                attack_speed_multiplier: 1.2,
                chain_targets: 1,
                ..base
            },
            Self::PureWind => GemEffect {
                attack_speed_multiplier: 1.4,
                range_multiplier: 1.1,
                ..base
            },
            Self::PureEarth => GemEffect {
                damage_multiplier: 1.1,
                armor_penetration: 5.0,
                ..base
            },
            // Fire + Water
            Self::Steam => GemEffect {
                damage_multiplier: 1.3,
                slow_factor: 0.8,
                burn_damage: 5.0,
                ..base
            },
            // Thunder + Wind
            Self::Storm => GemEffect {
                damage_multiplier: 1.2,
                attack_speed_multiplier: 1.5,
                chain_targets: 2,
                ..base
            },
            // Fire + Earth
            Self::Magma => GemEffect {
                damage_multiplier: 1.4,
                armor_penetration: 8.0,
                burn_damage: 15.0,
                ..base
            },
            Self::ElementalFury => GemEffect {
                damage_multiplier: 1.5,
                attack_speed_multiplier: 1.3,
                range_multiplier: 1.2,
                chain_targets: 1,
                burn_damage: 8.0,
                ..base
            },
        }
    }

    /// Resolve a catalog key, logging and returning `None` for unknown keys.
    ///
    /// An unknown key behaves as an empty slot rather than aborting a run.
    #[must_use]
    pub fn lookup(key: &str) -> Option<Self> {
        let parsed = key.parse().ok();
        if parsed.is_none() {
            log::warn!("unknown gem key {key:?}; treating slot as empty");
        }
        parsed
    }
}

impl fmt::Display for GemKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

impl FromStr for GemKind {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_uppercase().replace([' ', '-'], "_");
        Self::ALL
            .into_iter()
            .find(|gem| gem.key() == normalized)
            .ok_or(())
    }
}

/// Modifiers a socketed gem applies to its tower.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GemEffect {
    pub damage_multiplier: f64,
    pub attack_speed_multiplier: f64,
    pub range_multiplier: f64,
    pub armor_penetration: f64,
    pub burn_damage: f64,
    pub burn_duration: f64,
    pub slow_factor: f64,
    pub slow_duration: f64,
    pub chain_targets: u32,
    pub splash_radius: f64,
}

impl Default for GemEffect {
    /// The no-op gem.
    fn default() -> Self {
        Self {
            damage_multiplier: 1.0,
            attack_speed_multiplier: 1.0,
            range_multiplier: 1.0,
            armor_penetration: 0.0,
            burn_damage: 0.0,
            burn_duration: 0.0,
            slow_factor: 1.0,
            slow_duration: 0.0,
            chain_targets: 0,
            splash_radius: 0.0,
        }
    }
}
