//! Skill-conditioned loadout synthesis.
//!
//! A synthesis run splits the available money into three phase budgets and
//! then spends each one in turn: tower purchases, level upgrades, gem
//! sockets. Every stochastic choice draws from the caller's random stream.
use rand::Rng;
use serde::Serialize;

use crate::economy::inflated_cost;
use crate::numbers::scale_floor;
use crate::policy::{BalancePolicy, BudgetSplit};
use crate::settings::GameSettings;
use crate::skill::SkillLevel;
use crate::tower::{TowerConfig, TowerKind};

/// Money actually spent per phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct SpendLedger {
    pub towers: u32,
    pub upgrades: u32,
    pub gems: u32,
}

impl SpendLedger {
    #[must_use]
    pub const fn total(&self) -> u32 {
        self.towers + self.upgrades + self.gems
    }
}

/// Money set aside per phase before anything is bought.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct PhaseBudgets {
    pub towers: u32,
    pub upgrades: u32,
    pub gems: u32,
}

impl PhaseBudgets {
    /// Floor each share of `money`; never hands out more than `money` in total.
    #[must_use]
    pub fn split(money: u32, split: &BudgetSplit) -> Self {
        let towers = scale_floor(money, split.towers).min(money);
        let upgrades = scale_floor(money, split.upgrades).min(money - towers);
        let gems = scale_floor(money, split.gems).min(money - towers - upgrades);
        Self {
            towers,
            upgrades,
            gems,
        }
    }

    /// Raise the tower budget to `price` by borrowing from the other phases.
    ///
    /// Used when the split leaves too little for even one tower but the
    /// total does not. No-op if the total cannot cover `price` either.
    fn ensure_one_tower(&mut self, price: u32) {
        if self.towers >= price || self.total() < price {
            return;
        }
        let mut shortfall = price - self.towers;
        let from_upgrades = shortfall.min(self.upgrades);
        self.upgrades -= from_upgrades;
        shortfall -= from_upgrades;
        let from_gems = shortfall.min(self.gems);
        self.gems -= from_gems;
        self.towers = price;
    }

    #[must_use]
    pub const fn total(&self) -> u32 {
        self.towers + self.upgrades + self.gems
    }
}

/// A synthesized loadout plus what it cost.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct Strategy {
    towers: Vec<TowerConfig>,
    budgets: PhaseBudgets,
    spend: SpendLedger,
}

impl Strategy {
    /// No towers; always loses.
    #[must_use]
    pub fn empty() -> Self {
        Self::default()
    }

    /// Wrap a hand-built loadout, pricing it as the synthesizer would have paid.
    #[must_use]
    pub fn priced(
        towers: Vec<TowerConfig>,
        settings: &GameSettings,
        policy: &BalancePolicy,
        wave: u32,
    ) -> Self {
        let mut spend = SpendLedger::default();
        for tower in &towers {
            let price = inflated_cost(settings, tower.kind().cost(settings), wave);
            spend.towers = spend.towers.saturating_add(price);
            let levels: u32 = (1..tower.level())
                .filter_map(|level| policy.upgrades.next_level_cost(level))
                .sum();
            spend.upgrades = spend.upgrades.saturating_add(levels);
            spend.gems = spend.gems.saturating_add(tower.gem_spend());
        }
        Self {
            towers,
            budgets: PhaseBudgets {
                towers: spend.towers,
                upgrades: spend.upgrades,
                gems: spend.gems,
            },
            spend,
        }
    }

    #[must_use]
    pub fn towers(&self) -> &[TowerConfig] {
        &self.towers
    }

    #[must_use]
    pub const fn budgets(&self) -> PhaseBudgets {
        self.budgets
    }

    #[must_use]
    pub const fn spend(&self) -> SpendLedger {
        self.spend
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.towers.is_empty()
    }
}

/// Draws loadouts for a fixed settings and policy pair.
#[derive(Debug, Clone, Copy)]
pub struct StrategySynthesizer<'a> {
    settings: &'a GameSettings,
    policy: &'a BalancePolicy,
}

impl<'a> StrategySynthesizer<'a> {
    #[must_use]
    pub const fn new(settings: &'a GameSettings, policy: &'a BalancePolicy) -> Self {
        Self { settings, policy }
    }

    /// Build a loadout for `skill` with `money` to spend before `wave`.
    ///
    /// Returns an empty strategy when not even the cheapest tower is affordable.
    pub fn synthesize<R: Rng + ?Sized>(
        &self,
        skill: SkillLevel,
        money: u32,
        wave: u32,
        rng: &mut R,
    ) -> Strategy {
        let weight = skill.weight();
        let prices = self.prices(wave);
        let Some(cheapest) = prices.iter().map(|(_, price)| *price).min() else {
            log::warn!("no purchasable tower archetypes; strategy is empty");
            return Strategy::empty();
        };

        let mut budgets = PhaseBudgets::split(money, &self.policy.budget_split(weight));
        budgets.ensure_one_tower(cheapest);

        let mut spend = SpendLedger::default();
        let mut towers = self.buy_towers(weight, budgets.towers, &prices, &mut spend, rng);
        self.upgrade_towers(weight, budgets.upgrades, &mut towers, &mut spend);
        self.socket_gems(weight, budgets.gems, &mut towers, &mut spend);

        Strategy {
            towers,
            budgets,
            spend,
        }
    }

    /// Purchasable archetypes at their price for `wave`; free ones are skipped.
    fn prices(&self, wave: u32) -> Vec<(TowerKind, u32)> {
        self.policy
            .purchase
            .archetypes
            .iter()
            .filter_map(|kind| {
                let list = kind.cost(self.settings);
                if list == 0 {
                    log::warn!("{} tower has no price; leaving it out of purchases", kind.key());
                    return None;
                }
                Some((*kind, inflated_cost(self.settings, list, wave)))
            })
            .collect()
    }

    fn buy_towers<R: Rng + ?Sized>(
        &self,
        skill: f64,
        mut budget: u32,
        prices: &[(TowerKind, u32)],
        spend: &mut SpendLedger,
        rng: &mut R,
    ) -> Vec<TowerConfig> {
        let placement = self.policy.placement_quality(skill);
        let mut towers = Vec::new();
        while let Some((kind, price)) = self.choose_archetype(skill, budget, prices, rng) {
            budget -= price;
            spend.towers += price;
            towers.push(TowerConfig::new(kind).with_placement(placement));
        }
        towers
    }

    /// Pick the next archetype to buy, or `None` once nothing is affordable.
    fn choose_archetype<R: Rng + ?Sized>(
        &self,
        skill: f64,
        budget: u32,
        prices: &[(TowerKind, u32)],
        rng: &mut R,
    ) -> Option<(TowerKind, u32)> {
        let affordable: Vec<(TowerKind, u32)> = prices
            .iter()
            .copied()
            .filter(|(_, price)| *price <= budget)
            .collect();
        if affordable.is_empty() {
            return None;
        }

        let purchase = &self.policy.purchase;
        if budget >= purchase.blunder_min_budget
            && rng.r#gen::<f64>() < purchase.blunder_chance(skill)
        {
            return first_max_by(&affordable, |(_, price)| f64::from(*price));
        }
        if rng.r#gen::<f64>() < skill {
            return first_max_by(&affordable, |(kind, _)| {
                kind.base_stats(self.settings).dps_per_cost()
            });
        }
        let idx = rng.gen_range(0..affordable.len());
        affordable.get(idx).copied()
    }

    fn upgrade_towers(
        &self,
        skill: f64,
        mut budget: u32,
        towers: &mut [TowerConfig],
        spend: &mut SpendLedger,
    ) {
        let upgrades = &self.policy.upgrades;
        let targets = upgrades.towers_to_upgrade(skill, towers.len());
        for tower in towers.iter_mut().take(targets) {
            if budget == 0 {
                break;
            }
            while let Some(cost) = upgrades.next_level_cost(tower.level()) {
                if cost > budget || !tower.level_up() {
                    break;
                }
                budget -= cost;
                spend.upgrades += cost;
            }
        }
    }

    fn socket_gems(
        &self,
        skill: f64,
        mut budget: u32,
        towers: &mut [TowerConfig],
        spend: &mut SpendLedger,
    ) {
        let priority = self.policy.gem_priority(skill);
        for tower in towers.iter_mut() {
            let empty: Vec<usize> = tower.empty_slots().collect();
            for slot in empty {
                let Some(gem) = priority.iter().copied().find(|gem| gem.cost() <= budget) else {
                    return;
                };
                if tower.socket(slot, gem) {
                    budget -= gem.cost();
                    spend.gems += gem.cost();
                }
            }
        }
    }
}

/// Highest-scoring entry, keeping the earliest on ties.
fn first_max_by<F>(candidates: &[(TowerKind, u32)], score: F) -> Option<(TowerKind, u32)>
where
    F: Fn(&(TowerKind, u32)) -> f64,
{
    let mut best: Option<((TowerKind, u32), f64)> = None;
    for candidate in candidates {
        let value = score(candidate);
        if best.is_none_or(|(_, top)| value > top) {
            best = Some((*candidate, value));
        }
    }
    best.map(|(candidate, _)| candidate)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::MAX_TOWER_LEVEL;
    use crate::gems::GemKind;
    use crate::rng::TrialRng;

    fn synth(skill: SkillLevel, money: u32, wave: u32, seed: u64) -> Strategy {
        let settings = GameSettings::default();
        let policy = BalancePolicy::default();
        let mut rng = TrialRng::from_seed(seed);
        StrategySynthesizer::new(&settings, &policy).synthesize(skill, money, wave, rng.strategy())
    }

    #[test]
    fn budgets_are_floored_and_within_money() {
        let policy = BalancePolicy::default();
        let budgets = PhaseBudgets::split(220, &policy.budget_split(1.0));
        assert_eq!(
            budgets,
            PhaseBudgets {
                towers: 176,
                upgrades: 33,
                gems: 11
            }
        );
        for money in [0, 1, 49, 50, 99, 220, 1234] {
            for level in SkillLevel::ALL {
                let split = PhaseBudgets::split(money, &policy.budget_split(level.weight()));
                assert!(split.total() <= money);
            }
        }
    }

    #[test]
    fn optimal_play_buys_cost_effective_towers_and_focuses_upgrades() {
        let strategy = synth(SkillLevel::Optimal, 220, 1, 1);
        let kinds: Vec<TowerKind> = strategy.towers().iter().map(TowerConfig::kind).collect();
        assert_eq!(kinds, vec![TowerKind::Basic; 3]);
        assert_eq!(strategy.spend().towers, 150);
        // 33 upgrade money buys a single level on the first tower
        assert_eq!(strategy.towers()[0].level(), 2);
        assert_eq!(strategy.towers()[1].level(), 1);
        assert_eq!(strategy.spend().upgrades, 30);
        // 11 gem money buys nothing
        assert_eq!(strategy.spend().gems, 0);
        assert!((strategy.towers()[0].placement_quality() - 1.0).abs() < 1e-12);
    }

    #[test]
    fn spend_never_exceeds_phase_budgets() {
        for seed in 0..50 {
            for level in SkillLevel::ALL {
                let money = 180 + u32::try_from(seed).unwrap_or(0) * 17;
                let strategy = synth(level, money, 4, seed);
                let budgets = strategy.budgets();
                let spend = strategy.spend();
                assert!(spend.towers <= budgets.towers);
                assert!(spend.upgrades <= budgets.upgrades);
                assert!(spend.gems <= budgets.gems);
                assert!(budgets.total() <= money);
            }
        }
    }

    #[test]
    fn gem_slots_always_match_archetype() {
        for seed in 0..30 {
            let strategy = synth(SkillLevel::VeryGood, 900, 6, seed);
            for tower in strategy.towers() {
                assert_eq!(tower.gems().len(), tower.kind().gem_slots());
                assert!(tower.level() <= MAX_TOWER_LEVEL);
            }
        }
    }

    #[test]
    fn gems_follow_skill_priority() {
        let strategy = synth(SkillLevel::Optimal, 3000, 5, 3);
        let first_gem = strategy
            .towers()
            .iter()
            .flat_map(|tower| tower.gems().iter().flatten())
            .next()
            .copied();
        assert_eq!(first_gem, Some(GemKind::ElementalFury));
    }

    #[test]
    fn tight_split_still_buys_one_tower() {
        // 60 * 0.6 = 36 is below the cheapest tower, the total is not
        let strategy = synth(SkillLevel::Dismal, 60, 1, 5);
        assert_eq!(strategy.towers().len(), 1);
        assert_eq!(strategy.spend().towers, 50);
        assert!(strategy.spend().total() <= 60);
    }

    #[test]
    fn no_money_means_empty_strategy() {
        let strategy = synth(SkillLevel::Optimal, 49, 1, 5);
        assert!(strategy.is_empty());
        assert_eq!(strategy.spend().total(), 0);
    }

    #[test]
    fn free_archetypes_are_never_bought() {
        let settings = GameSettings {
            basic_tower_cost: 0,
            ..GameSettings::default()
        };
        let policy = BalancePolicy::default();
        let mut rng = TrialRng::from_seed(5);
        let strategy = StrategySynthesizer::new(&settings, &policy).synthesize(
            SkillLevel::Optimal,
            220,
            1,
            rng.strategy(),
        );
        assert!(!strategy.is_empty());
        assert!(
            strategy
                .towers()
                .iter()
                .all(|tower| tower.kind() != TowerKind::Basic)
        );
        assert!(strategy.spend().total() <= 220);
    }

    #[test]
    fn all_free_archetypes_give_empty_strategy() {
        let settings = GameSettings {
            basic_tower_cost: 0,
            splash_tower_cost: 0,
            poison_tower_cost: 0,
            sniper_tower_cost: 0,
            ..GameSettings::default()
        };
        let policy = BalancePolicy::default();
        let mut rng = TrialRng::from_seed(5);
        let strategy = StrategySynthesizer::new(&settings, &policy).synthesize(
            SkillLevel::Average,
            500,
            2,
            rng.strategy(),
        );
        assert!(strategy.is_empty());
        assert_eq!(strategy.spend().total(), 0);
    }

    #[test]
    fn inflation_raises_tower_prices() {
        let settings = GameSettings {
            has_cost_inflation: true,
            ..GameSettings::default()
        };
        let policy = BalancePolicy::default();
        let mut rng = TrialRng::from_seed(8);
        let strategy = StrategySynthesizer::new(&settings, &policy).synthesize(
            SkillLevel::Optimal,
            220,
            11,
            rng.strategy(),
        );
        // basic towers cost 65 at wave 11: two fit in 176
        assert_eq!(strategy.towers().len(), 2);
        assert_eq!(strategy.spend().towers, 130);
    }

    #[test]
    fn priced_counts_list_prices() {
        let settings = GameSettings::default();
        let policy = BalancePolicy::default();
        let towers = vec![
            TowerConfig::new(TowerKind::Sniper)
                .with_level(3)
                .with_gem(0, GemKind::Magma),
            TowerConfig::new(TowerKind::Basic),
        ];
        let strategy = Strategy::priced(towers, &settings, &policy, 1);
        assert_eq!(
            strategy.spend(),
            SpendLedger {
                towers: 200,
                upgrades: 80,
                gems: 75
            }
        );
        assert_eq!(Strategy::empty().spend().total(), 0);
    }

    #[test]
    fn same_seed_same_strategy() {
        let a = synth(SkillLevel::Average, 400, 5, 77);
        let b = synth(SkillLevel::Average, 400, 5, 77);
        assert_eq!(a, b);
    }
}
