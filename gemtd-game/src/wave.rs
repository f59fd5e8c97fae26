//! Wave composition by wave index.
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::constants::{
    COUNT_PER_WAVE, EARLY_BASE_COUNT, EARLY_TIER_LAST_WAVE, LATE_ARMORED_SHARE_CAP,
    LATE_ARMORED_SHARE_STEP, LATE_BASE_COUNT, LATE_FAST_SHARE_BASE, LATE_FAST_SHARE_CAP,
    LATE_FAST_SHARE_STEP, MID_BASE_COUNT, MID_FAST_SHARE_CAP, MID_FAST_SHARE_STEP,
    MID_TIER_LAST_WAVE, SPAWN_INTERVAL_SECS,
};
use crate::numbers::scale_floor;
use crate::settings::GameSettings;

/// Enemy archetypes that appear in waves.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EnemyKind {
    Basic,
    Fast,
    Armored,
}

impl EnemyKind {
    pub const ALL: [EnemyKind; 3] = [EnemyKind::Basic, EnemyKind::Fast, EnemyKind::Armored];

    #[must_use]
    pub const fn health(self, settings: &GameSettings) -> u32 {
        match self {
            Self::Basic => settings.basic_enemy_health,
            Self::Fast => settings.fast_enemy_health,
            Self::Armored => settings.armored_enemy_health,
        }
    }

    /// Estimated money a kill of this archetype pays out.
    #[must_use]
    pub const fn reward(self, settings: &GameSettings) -> u32 {
        match self {
            Self::Basic => settings.basic_enemy_reward,
            Self::Fast => settings.fast_enemy_reward,
            Self::Armored => settings.armored_enemy_reward,
        }
    }
}

impl fmt::Display for EnemyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Basic => write!(f, "basic"),
            Self::Fast => write!(f, "fast"),
            Self::Armored => write!(f, "armored"),
        }
    }
}

/// Enemy head-count per archetype.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct EnemyCounts {
    pub basic: u32,
    pub fast: u32,
    pub armored: u32,
}

impl EnemyCounts {
    #[must_use]
    pub const fn get(&self, kind: EnemyKind) -> u32 {
        match kind {
            EnemyKind::Basic => self.basic,
            EnemyKind::Fast => self.fast,
            EnemyKind::Armored => self.armored,
        }
    }

    #[must_use]
    pub const fn total(&self) -> u32 {
        self.basic + self.fast + self.armored
    }

    pub fn iter(&self) -> impl Iterator<Item = (EnemyKind, u32)> + '_ {
        EnemyKind::ALL.into_iter().map(|kind| (kind, self.get(kind)))
    }
}

/// Enemies and time budget of one wave.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WaveComposition {
    pub wave: u32,
    pub counts: EnemyCounts,
    pub total_health: u64,
    pub spawn_duration: f64,
    pub path_duration: f64,
}

impl WaveComposition {
    /// Seconds during which towers can deal damage to this wave.
    #[must_use]
    pub fn damage_window(&self) -> f64 {
        self.spawn_duration + self.path_duration
    }

    /// Kill income if every enemy dies, before any diminishing returns.
    #[must_use]
    pub fn kill_rewards(&self, settings: &GameSettings) -> u32 {
        self.counts
            .iter()
            .map(|(kind, count)| count.saturating_mul(kind.reward(settings)))
            .fold(0, u32::saturating_add)
    }
}

/// Build the enemy composition of `wave` (1-based; 0 is treated as 1).
#[must_use]
pub fn compose_wave(settings: &GameSettings, wave: u32) -> WaveComposition {
    let wave = wave.max(1);
    let counts = if wave <= EARLY_TIER_LAST_WAVE {
        EnemyCounts {
            basic: EARLY_BASE_COUNT + wave,
            ..EnemyCounts::default()
        }
    } else if wave <= MID_TIER_LAST_WAVE {
        let total = MID_BASE_COUNT + wave * COUNT_PER_WAVE;
        let fast_share = (f64::from(wave - EARLY_TIER_LAST_WAVE) * MID_FAST_SHARE_STEP)
            .min(MID_FAST_SHARE_CAP);
        let fast = scale_floor(total, fast_share);
        EnemyCounts {
            basic: total - fast,
            fast,
            armored: 0,
        }
    } else {
        let total = LATE_BASE_COUNT.saturating_add(wave.saturating_mul(COUNT_PER_WAVE));
        let late_steps = f64::from(wave - MID_TIER_LAST_WAVE);
        let armored_share = (late_steps * LATE_ARMORED_SHARE_STEP).min(LATE_ARMORED_SHARE_CAP);
        let fast_share =
            LATE_FAST_SHARE_STEP.mul_add(late_steps, LATE_FAST_SHARE_BASE).min(LATE_FAST_SHARE_CAP);
        let armored = scale_floor(total, armored_share);
        let fast = scale_floor(total, fast_share);
        EnemyCounts {
            basic: total - armored - fast,
            fast,
            armored,
        }
    };

    let total_health = counts
        .iter()
        .map(|(kind, count)| u64::from(count) * u64::from(kind.health(settings)))
        .sum();

    WaveComposition {
        wave,
        counts,
        total_health,
        spawn_duration: f64::from(counts.total()) * SPAWN_INTERVAL_SECS,
        path_duration: settings.path_duration,
    }
}
