use crate::constants::{
    BONUS_DECAY_FLOOR, BONUS_DECAY_PER_WAVE, COST_INFLATION_PER_WAVE, KILL_DECAY_FLOOR,
    KILL_DECAY_PER_WAVE,
};
use crate::numbers::scale_floor;
use crate::settings::GameSettings;
use crate::wave::compose_wave;

/// Money a player has at the start of `wave` (1-based).
///
/// Every prior wave `k` pays its completion bonus plus the estimated kill
/// income of its composition. With diminishing returns enabled both parts
/// decay with `k` down to a floor.
#[must_use]
pub fn available_money(settings: &GameSettings, wave: u32) -> u32 {
    (1..wave.max(1)).fold(settings.starting_money, |money, prior| {
        money.saturating_add(wave_income(settings, prior))
    })
}

/// Income earned for clearing wave `k`.
#[must_use]
pub fn wave_income(settings: &GameSettings, k: u32) -> u32 {
    let kills = compose_wave(settings, k).kill_rewards(settings);
    if settings.has_diminishing_returns {
        let step = f64::from(k);
        let bonus_factor = (1.0 - step * BONUS_DECAY_PER_WAVE).max(BONUS_DECAY_FLOOR);
        let kill_factor = (1.0 - step * KILL_DECAY_PER_WAVE).max(KILL_DECAY_FLOOR);
        scale_floor(settings.wave_bonus, bonus_factor)
            .saturating_add(scale_floor(kills, kill_factor))
    } else {
        k.saturating_mul(settings.wave_bonus).saturating_add(kills)
    }
}

/// Purchase price of something listed at `cost` when bought before `wave`.
///
/// Identity unless cost inflation is enabled.
#[must_use]
pub fn inflated_cost(settings: &GameSettings, cost: u32, wave: u32) -> u32 {
    if !settings.has_cost_inflation {
        return cost;
    }
    let factor = 1.0 + f64::from(wave.max(1) - 1) * COST_INFLATION_PER_WAVE;
    scale_floor(cost, factor)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_wave_has_starting_money() {
        let settings = GameSettings::default();
        assert_eq!(available_money(&settings, 1), 220);
        assert_eq!(available_money(&settings, 0), 220);
    }

    #[test]
    fn linear_mode_adds_bonus_and_kills() {
        let settings = GameSettings::default();
        // wave 1: 12 bonus + 4 basic kills at 5
        assert_eq!(available_money(&settings, 2), 252);
        // wave 2: 24 bonus + 5 kills at 5
        assert_eq!(available_money(&settings, 3), 301);
        assert_eq!(available_money(&settings, 4), 367);
        assert_eq!(available_money(&settings, 5), 482);
    }

    #[test]
    fn diminishing_mode_decays_income() {
        let settings = GameSettings {
            has_diminishing_returns: true,
            ..GameSettings::default()
        };
        // floor(12 * 0.975) + floor(20 * 0.98)
        assert_eq!(wave_income(&settings, 1), 11 + 19);
        assert!(available_money(&settings, 6) < available_money(&GameSettings::default(), 6));
    }

    #[test]
    fn money_never_decreases() {
        for diminishing in [false, true] {
            let settings = GameSettings {
                has_diminishing_returns: diminishing,
                ..GameSettings::default()
            };
            let mut previous = 0;
            for wave in 1..=40 {
                let money = available_money(&settings, wave);
                assert!(money >= previous, "wave {wave}: {money} < {previous}");
                previous = money;
            }
        }
    }

    #[test]
    fn inflation_scales_prices_by_wave() {
        let plain = GameSettings::default();
        assert_eq!(inflated_cost(&plain, 150, 10), 150);

        let inflated = GameSettings {
            has_cost_inflation: true,
            ..GameSettings::default()
        };
        assert_eq!(inflated_cost(&inflated, 50, 1), 50);
        // 50 * 1.03 = 51.5
        assert_eq!(inflated_cost(&inflated, 50, 2), 51);
        assert_eq!(inflated_cost(&inflated, 100, 11), 130);
    }
}
