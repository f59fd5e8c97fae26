use gemtd_game::{
    BalanceEngine, BalancePolicy, GameSettings, GemKind, SkillLevel, Strategy, TowerConfig,
    TowerKind, TrialRng, available_money, compose_wave,
};

fn approx(actual: f64, expected: f64, tolerance: f64) {
    assert!(
        (actual - expected).abs() <= tolerance,
        "expected {expected}, got {actual}"
    );
}

#[test]
fn default_first_wave_and_starting_money() {
    let settings = GameSettings::default();
    assert_eq!(settings.starting_money, 220);
    assert_eq!(settings.basic_tower_cost, 50);
    assert_eq!(settings.basic_enemy_health, 102);

    let wave = compose_wave(&settings, 1);
    assert_eq!(wave.counts.basic, 4);
    assert_eq!(wave.counts.total(), 4);
    assert_eq!(wave.total_health, 408);
    assert_eq!(available_money(&settings, 1), 220);
}

#[test]
fn bare_basic_tower_dps() {
    let settings = GameSettings::default();
    let tower = TowerConfig::new(TowerKind::Basic).with_placement(1.0);
    assert_eq!(tower.level(), 1);
    assert_eq!(tower.gems(), &[None, None]);
    approx(tower.effective_stats(&settings).dps, 22.0 * 1.4, 1e-9);
}

#[test]
fn fire_gem_on_basic_tower_dps() {
    let settings = GameSettings::default();
    let tower = TowerConfig::new(TowerKind::Basic)
        .with_placement(1.0)
        .with_gem(0, GemKind::PureFire);
    let expected = 22.0 * 1.25 * 1.4 + 10.0 * (2.0 / 3.0);
    approx(tower.effective_stats(&settings).dps, expected, 1e-9);
    approx(tower.effective_stats(&settings).dps, 45.17, 0.01);
}

#[test]
fn zero_spend_strategy_has_zero_efficiency() {
    let engine = BalanceEngine::default();
    let mut rng = TrialRng::from_seed(21);
    let wave = engine.compose_wave(1);
    let result = engine
        .simulate(Strategy::empty(), &wave, SkillLevel::Good, rng.execution())
        .expect("empty strategy is not an error");
    assert_eq!(result.total_spend, 0);
    assert!(result.efficiency.abs() < f64::EPSILON);
    assert!(!result.success);
}

#[test]
fn optimal_play_clears_first_wave() {
    let engine = BalanceEngine::default();
    let cell = engine.run_cell(SkillLevel::Optimal, 1, 1000, 1337);
    assert_eq!(cell.trials_run, 1000);
    assert!(
        cell.success_rate >= 0.95,
        "optimal success on wave 1 was {}",
        cell.success_rate
    );
}

#[test]
fn optimal_play_with_ample_money_clears_first_wave() {
    let engine = BalanceEngine::default();
    let wave = engine.compose_wave(1);
    let mut successes = 0;
    for seed in 0..1000 {
        let mut rng = TrialRng::from_seed(seed);
        let strategy = engine.synthesize(SkillLevel::Optimal, 1000, 1, rng.strategy());
        let result = engine
            .simulate(strategy, &wave, SkillLevel::Optimal, rng.execution())
            .expect("finite trial");
        if result.success {
            successes += 1;
        }
    }
    assert!(successes >= 950, "only {successes} of 1000 trials won");
}

#[test]
fn hand_built_loadout_is_priced_and_simulated() {
    let settings = GameSettings::default();
    let policy = BalancePolicy::default();
    let towers = vec![
        TowerConfig::new(TowerKind::Splash)
            .with_level(2)
            .with_gem(0, GemKind::Storm),
        TowerConfig::new(TowerKind::Basic).with_gem(1, GemKind::PureWind),
    ];
    let strategy = Strategy::priced(towers, &settings, &policy, 3);
    assert_eq!(strategy.spend().total(), 75 + 30 + 70 + 50 + 35);

    let engine = BalanceEngine::new(settings, policy);
    let wave = engine.compose_wave(3);
    let mut rng = TrialRng::from_seed(5);
    let result = engine
        .simulate(strategy, &wave, SkillLevel::Average, rng.execution())
        .expect("finite trial");
    assert_eq!(result.total_spend, 260);
    approx(
        result.overkill_ratio,
        result.damage_dealt / result.effective_health,
        1e-12,
    );
    assert_eq!(result.success, result.overkill_ratio >= 1.0);
}
