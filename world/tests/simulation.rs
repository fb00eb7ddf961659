use std::collections::BTreeMap;

use bastion_core::{
    Bounds, Command, EnemyKind, Event, Path, PlacementRejected, RemovalRejected, Tower, TowerId,
    TowerKind, UpgradeRejected, UpgradeTrack, WaveStage,
};
use bastion_world::{apply, query, PlacementValidator, SimulationConfig, SimulationState};
use glam::Vec2;

fn straight_config(seed: u64) -> SimulationConfig {
    let path =
        Path::new(vec![Vec2::new(0.0, 100.0), Vec2::new(600.0, 100.0)]).expect("valid path");
    SimulationConfig {
        seed,
        bounds: Bounds::new(Vec2::ZERO, Vec2::new(600.0, 300.0)),
        paths: vec![path],
        ..SimulationConfig::default()
    }
}

fn defended_state(config: SimulationConfig, events: &mut Vec<Event>) -> SimulationState {
    let mut state = SimulationState::new(config).expect("valid config");
    for position in [Vec2::new(300.0, 130.0), Vec2::new(400.0, 130.0)] {
        apply(
            &mut state,
            Command::PlaceTower {
                kind: TowerKind::Basic,
                position,
            },
            events,
        );
    }
    apply(&mut state, Command::StartWave, events);
    state
}

fn run_ticks(state: &mut SimulationState, ticks: u32, events: &mut Vec<Event>) {
    for _ in 0..ticks {
        apply(state, Command::Tick, events);
    }
}

#[test]
fn identical_seeds_produce_identical_event_streams() {
    let mut first = Vec::new();
    let mut second = Vec::new();
    let mut a = defended_state(straight_config(42), &mut first);
    let mut b = defended_state(straight_config(42), &mut second);

    run_ticks(&mut a, 1_200, &mut first);
    run_ticks(&mut b, 1_200, &mut second);

    assert_eq!(first, second);
    assert_eq!(a.snapshot(), b.snapshot());
}

#[test]
fn double_speed_frames_match_two_single_ticks() {
    let mut fast_events = Vec::new();
    let mut slow_events = Vec::new();
    let mut fast = defended_state(straight_config(7), &mut fast_events);
    let mut slow = defended_state(straight_config(7), &mut slow_events);

    apply(&mut fast, Command::SetSpeed { multiplier: 2 }, &mut fast_events);
    run_ticks(&mut fast, 400, &mut fast_events);
    run_ticks(&mut slow, 800, &mut slow_events);

    assert_eq!(fast_events, slow_events);
    assert_eq!(query::tick(&fast), 800);
    assert_eq!(fast.snapshot().enemies, slow.snapshot().enemies);
}

#[test]
fn first_wave_spawns_the_base_count_from_the_opening_table() {
    let mut state = SimulationState::new(straight_config(3)).expect("valid config");
    let mut events = Vec::new();
    assert!(state.start_wave(&mut events));
    assert_eq!(
        events,
        vec![Event::WaveStarted {
            wave: 1,
            quota: 8,
            boss: false,
        }]
    );

    run_ticks(&mut state, 600, &mut events);

    let spawned: Vec<EnemyKind> = events
        .iter()
        .filter_map(|event| match event {
            Event::EnemySpawned { kind, .. } => Some(*kind),
            _ => None,
        })
        .collect();
    assert_eq!(spawned.len(), 8);
    assert!(spawned
        .iter()
        .all(|kind| matches!(kind, EnemyKind::Grunt | EnemyKind::Runner)));
}

#[test]
fn leaked_wave_costs_lives_and_still_pays_the_completion_bonus() {
    let config = straight_config(11);
    let starting_money = config.starting_money;
    let mut state = SimulationState::new(config).expect("valid config");
    let mut events = Vec::new();
    assert!(state.start_wave(&mut events));

    run_ticks(&mut state, 1_500, &mut events);

    let lost: u32 = events
        .iter()
        .filter_map(|event| match event {
            Event::EnemyLeaked { lives_lost, .. } => Some(*lives_lost),
            _ => None,
        })
        .sum();
    assert_eq!(lost, 8);
    assert_eq!(query::lives(&state), 12);
    assert!(events.contains(&Event::WaveCompleted { wave: 1, bonus: 25 }));
    assert_eq!(query::money(&state), starting_money + 25);

    let wave = query::wave(&state);
    assert_eq!(wave.stage, WaveStage::Idle);
    assert_eq!(wave.number, 1);
}

#[test]
fn running_out_of_lives_ends_the_game_once() {
    let config = SimulationConfig {
        starting_lives: 3,
        ..straight_config(5)
    };
    let mut state = SimulationState::new(config).expect("valid config");
    let mut events = Vec::new();
    assert!(state.start_wave(&mut events));

    run_ticks(&mut state, 1_500, &mut events);

    let game_overs = events
        .iter()
        .filter(|event| matches!(event, Event::GameOver { .. }))
        .count();
    assert_eq!(game_overs, 1);
    assert!(events.contains(&Event::GameOver { wave: 1 }));
    assert_eq!(query::lives(&state), 0);
    assert!(query::is_game_over(&state));
    assert!(!events
        .iter()
        .any(|event| matches!(event, Event::WaveCompleted { .. })));
}

#[test]
fn towers_kill_enemies_and_earn_currency_for_upgrades() {
    let config = SimulationConfig {
        currency_per_damage: 10.0,
        ..straight_config(19)
    };
    let starting_money = config.starting_money;
    let mut events = Vec::new();
    let mut state = defended_state(config, &mut events);
    let spent = 2 * TowerKind::Basic.cost();

    run_ticks(&mut state, 1_500, &mut events);

    let rewards: u32 = events
        .iter()
        .filter_map(|event| match event {
            Event::EnemyKilled {
                reward,
                tower: Some(_),
                ..
            } => Some(*reward),
            _ => None,
        })
        .sum();
    assert!(rewards > 0);
    assert!(query::money(&state) >= starting_money - spent + rewards);

    let first = TowerId::new(0);
    let tower = query::tower(&state, first).expect("tower");
    assert!(tower.damage_dealt > 0.0);
    let currency = query::currency(&state, first);
    assert!((currency - tower.damage_dealt * 10.0).abs() < 1e-6);

    let total_kills: u32 = query::towers(&state).map(|(_, tower)| tower.kills).sum();
    assert!(total_kills > 0);

    let cost = query::upgrade_cost(&state, first, UpgradeTrack::Damage).expect("cost");
    assert!(currency >= cost);
    assert!(query::can_upgrade(&state, first, UpgradeTrack::Damage));

    events.clear();
    apply(
        &mut state,
        Command::PurchaseUpgrade {
            tower: first,
            track: UpgradeTrack::Damage,
        },
        &mut events,
    );
    assert_eq!(
        events,
        vec![Event::UpgradePurchased {
            tower: first,
            track: UpgradeTrack::Damage,
            level: 1,
        }]
    );
    let upgraded = query::tower(&state, first).expect("tower");
    assert!(upgraded.stats.damage > upgraded.base.damage);
    assert!((query::currency(&state, first) - (currency - cost)).abs() < 1e-6);
}

#[test]
fn rejected_commands_broadcast_their_reasons() {
    let config = straight_config(1);
    let mut state = SimulationState::new(config).expect("valid config");
    let mut events = Vec::new();

    apply(
        &mut state,
        Command::PlaceTower {
            kind: TowerKind::Basic,
            position: Vec2::new(-10.0, 50.0),
        },
        &mut events,
    );
    apply(
        &mut state,
        Command::PlaceTower {
            kind: TowerKind::Basic,
            position: Vec2::new(100.0, 110.0),
        },
        &mut events,
    );
    apply(
        &mut state,
        Command::RemoveTower {
            tower: TowerId::new(9),
        },
        &mut events,
    );
    apply(
        &mut state,
        Command::PlaceTower {
            kind: TowerKind::Basic,
            position: Vec2::new(100.0, 200.0),
        },
        &mut events,
    );
    apply(
        &mut state,
        Command::PurchaseUpgrade {
            tower: TowerId::new(0),
            track: UpgradeTrack::Damage,
        },
        &mut events,
    );
    apply(
        &mut state,
        Command::PurchaseUpgrade {
            tower: TowerId::new(5),
            track: UpgradeTrack::Range,
        },
        &mut events,
    );

    assert_eq!(
        events,
        vec![
            Event::TowerPlacementRejected {
                kind: TowerKind::Basic,
                position: Vec2::new(-10.0, 50.0),
                reason: PlacementRejected::OutOfBounds,
            },
            Event::TowerPlacementRejected {
                kind: TowerKind::Basic,
                position: Vec2::new(100.0, 110.0),
                reason: PlacementRejected::TooCloseToPath,
            },
            Event::TowerRemovalRejected {
                tower: TowerId::new(9),
                reason: RemovalRejected::MissingTower,
            },
            Event::TowerPlaced {
                tower: TowerId::new(0),
                kind: TowerKind::Basic,
                cost: TowerKind::Basic.cost(),
            },
            Event::UpgradeRejected {
                tower: TowerId::new(0),
                track: UpgradeTrack::Damage,
                reason: UpgradeRejected::InsufficientCurrency {
                    cost: 50.0,
                    available: 0.0,
                },
            },
            Event::UpgradeRejected {
                tower: TowerId::new(5),
                track: UpgradeTrack::Range,
                reason: UpgradeRejected::UnknownTower,
            },
        ]
    );
}

#[test]
fn placement_and_removal_conserve_money() {
    let mut state = SimulationState::new(straight_config(2)).expect("valid config");
    let mut events = Vec::new();
    let start = query::money(&state);

    let positions = [
        (TowerKind::Basic, Vec2::new(50.0, 200.0)),
        (TowerKind::Sniper, Vec2::new(150.0, 200.0)),
        (TowerKind::Cannon, Vec2::new(250.0, 200.0)),
    ];
    let mut placed = Vec::new();
    for (kind, position) in positions {
        placed.push((
            state.place_tower(kind, position).expect("placed"),
            kind.cost(),
        ));
    }
    let spent: u32 = placed.iter().map(|(_, cost)| cost).sum();
    assert_eq!(query::money(&state), start - spent);

    let mut refunded = 0;
    for (tower, _) in &placed {
        apply(&mut state, Command::RemoveTower { tower: *tower }, &mut events);
    }
    for event in &events {
        if let Event::TowerRemoved { refund, .. } = event {
            refunded += refund;
        }
    }
    let expected: u32 = placed.iter().map(|(_, cost)| cost / 2).sum();
    assert_eq!(refunded, expected);
    assert_eq!(query::money(&state), start - spent + expected);
    assert_eq!(query::towers(&state).count(), 0);
}

#[test]
fn waves_start_on_their_own_after_the_idle_delay() {
    let config = SimulationConfig {
        auto_start_delay: Some(30),
        ..straight_config(4)
    };
    let mut state = SimulationState::new(config).expect("valid config");
    let mut events = Vec::new();

    run_ticks(&mut state, 29, &mut events);
    assert!(!events
        .iter()
        .any(|event| matches!(event, Event::WaveStarted { .. })));

    run_ticks(&mut state, 1, &mut events);
    assert!(events.contains(&Event::WaveStarted {
        wave: 1,
        quota: 8,
        boss: false,
    }));
    assert!(events
        .iter()
        .any(|event| matches!(event, Event::EnemySpawned { .. })));
}

#[derive(Debug)]
struct Forbidden;

impl PlacementValidator for Forbidden {
    fn check(
        &self,
        _kind: TowerKind,
        _position: Vec2,
        _towers: &BTreeMap<TowerId, Tower>,
    ) -> Result<(), PlacementRejected> {
        Err(PlacementRejected::Overlapping)
    }
}

#[test]
fn custom_validators_replace_the_clearance_rules() {
    let config = straight_config(6);
    let money = config.starting_money;
    let mut state =
        SimulationState::with_validator(config, Box::new(Forbidden)).expect("valid config");

    assert_eq!(
        state.place_tower(TowerKind::Basic, Vec2::new(50.0, 250.0)),
        Err(PlacementRejected::Overlapping)
    );
    assert_eq!(query::money(&state), money);
}
