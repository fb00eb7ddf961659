#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Command-line adapter that runs a headless Bastion Defence simulation.

mod script;

use anyhow::{Context, Result};
use bastion_core::{Command, Event, TowerId, UpgradeTrack};
use bastion_world::{apply, query, SimulationConfig, SimulationState};
use clap::Parser;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use script::TowerOrder;

/// Headless Bastion Defence runner.
#[derive(Parser, Debug)]
#[command(name = "bastion", about = "Runs a headless Bastion Defence simulation")]
struct Args {
    /// Seed for wave composition; random when omitted.
    #[arg(long)]
    seed: Option<u64>,

    /// Ticks to simulate before stopping.
    #[arg(long, default_value_t = 3_600)]
    ticks: u64,

    /// Ticks executed per frame.
    #[arg(long, default_value_t = 1)]
    speed: u32,

    /// Money the player starts with.
    #[arg(long)]
    money: Option<u32>,

    /// Lives the player starts with.
    #[arg(long)]
    lives: Option<u32>,

    /// Idle ticks before the next wave starts on its own.
    #[arg(long, default_value_t = 180)]
    auto_start: u32,

    /// Tower to build before the first wave, as `kind@x,y`; repeatable.
    #[arg(long = "tower", value_name = "KIND@X,Y")]
    towers: Vec<TowerOrder>,

    /// Spend tower currency on upgrades as soon as it suffices.
    #[arg(long)]
    auto_upgrade: bool,
}

/// Counters gathered from the event stream.
#[derive(Debug, Default)]
struct Tally {
    kills: u32,
    leaks: u32,
    waves_completed: u32,
    upgrades: u32,
}

impl Tally {
    fn record(&mut self, events: &[Event]) {
        for event in events {
            match event {
                Event::EnemyKilled { .. } => self.kills += 1,
                Event::EnemyLeaked { .. } => self.leaks += 1,
                Event::WaveCompleted { .. } => self.waves_completed += 1,
                Event::UpgradePurchased { .. } => self.upgrades += 1,
                Event::TowerPlacementRejected {
                    kind,
                    position,
                    reason,
                } => warn!(?kind, x = position.x, y = position.y, %reason, "tower rejected"),
                _ => {}
            }
        }
    }
}

/// Entry point for the Bastion Defence command-line interface.
fn main() -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let args = Args::parse();
    let defaults = SimulationConfig::default();
    let config = SimulationConfig {
        seed: args.seed.unwrap_or_else(rand::random),
        starting_money: args.money.unwrap_or(defaults.starting_money),
        starting_lives: args.lives.unwrap_or(defaults.starting_lives),
        speed_multiplier: args.speed,
        auto_start_delay: Some(args.auto_start),
        ..defaults
    };
    let seed = config.seed;
    let mut state = SimulationState::new(config).context("invalid simulation settings")?;
    info!(seed, ticks = args.ticks, speed = args.speed, "simulation configured");

    let mut events = Vec::new();
    let mut tally = Tally::default();
    for order in &args.towers {
        apply(
            &mut state,
            Command::PlaceTower {
                kind: order.kind,
                position: order.position,
            },
            &mut events,
        );
    }
    apply(&mut state, Command::StartWave, &mut events);
    tally.record(&events);

    while query::tick(&state) < args.ticks && !query::is_game_over(&state) {
        events.clear();
        apply(&mut state, Command::Tick, &mut events);
        if args.auto_upgrade {
            buy_affordable_upgrades(&mut state, &mut events);
        }
        tally.record(&events);
    }

    print_summary(&state, &tally, seed);
    Ok(())
}

/// Buys every upgrade the towers can currently afford, cheapest track first.
fn buy_affordable_upgrades(state: &mut SimulationState, events: &mut Vec<Event>) {
    let towers: Vec<TowerId> = query::towers(state).map(|(id, _)| id).collect();
    for tower in towers {
        loop {
            let cheapest = UpgradeTrack::ALL
                .into_iter()
                .filter(|track| query::can_upgrade(state, tower, *track))
                .filter_map(|track| {
                    query::upgrade_cost(state, tower, track).map(|cost| (track, cost))
                })
                .min_by(|a, b| a.1.total_cmp(&b.1));
            let Some((track, _)) = cheapest else {
                break;
            };
            apply(state, Command::PurchaseUpgrade { tower, track }, events);
        }
    }
}

fn print_summary(state: &SimulationState, tally: &Tally, seed: u64) {
    let view = state.snapshot();
    println!("seed            {seed}");
    println!("ticks           {}", view.tick);
    println!("wave            {} ({:?})", view.wave.number, view.wave.stage);
    println!("waves cleared   {}", tally.waves_completed);
    println!("lives           {}", view.lives);
    println!("money           {}", view.money);
    println!("enemies killed  {}", tally.kills);
    println!("enemies leaked  {}", tally.leaks);
    println!("upgrades bought {}", tally.upgrades);
    if view.game_over {
        println!("result          defeated");
    }

    for tower in &view.towers {
        println!(
            "tower {:>3} {:<10} at ({:>6.1}, {:>6.1})  levels {}/{}/{}  \
             damage {:>9.1}  kills {:>4}  currency {:>8.1}",
            tower.id.get(),
            format!("{:?}", tower.kind),
            tower.position.x,
            tower.position.y,
            tower.levels.get(UpgradeTrack::Damage),
            tower.levels.get(UpgradeTrack::Range),
            tower.levels.get(UpgradeTrack::Utility),
            tower.damage_dealt,
            tower.kills,
            tower.currency,
        );
    }
}
