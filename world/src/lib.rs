#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Authoritative simulation state for Bastion Defence.
//!
//! [`SimulationState`] owns every tower, enemy and projectile and drives the
//! pure systems in a fixed order once per tick. Adapters mutate it through
//! [`apply`] and observe it through [`query`] or
//! [`SimulationState::snapshot`].

mod config;
mod placement;
mod waves;

use std::collections::BTreeMap;

use bastion_core::{
    Command, Enemy, EnemyId, EnemyKind, EnemySnapshot, Event, PathId, PhaseEntered,
    PhasesByHealth, PlacementRejected, Projectile, ProjectileId, ProjectileSnapshot,
    RemovalRejected, SimulationView, SplitsOnDeath, StatScale, StatusKind, Tower, TowerId,
    TowerKind, TowerSnapshot, UpgradeRejected, UpgradeTrack, WaveStage,
};
use bastion_system_movement::{Movement, MovementReport};
use bastion_system_tower_combat::TowerCombat;
use bastion_system_tower_targeting::{TowerTarget, TowerTargeting};
use bastion_system_upgrades::UpgradeEconomy;
use bastion_system_wave_generation::WaveDirector;
use glam::Vec2;
use tracing::{debug, info};

pub use config::{ConfigError, SimulationConfig, MAX_SPEED_MULTIPLIER};
pub use placement::{ClearanceValidator, PlacementValidator};

use waves::{DueSpawn, WaveRuntime};

/// Distance kept between consecutive summoned minions along the path.
const SUMMON_SPACING: f32 = 8.0;

/// Where newly hatched enemies enter the path and which wave they count for.
#[derive(Clone, Copy, Debug)]
struct Lineage {
    path: PathId,
    progress: f32,
    wave: u32,
    scale: StatScale,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum BroodOrigin {
    Summon,
    Split,
}

/// Enemies queued to hatch from a parent during the current tick.
#[derive(Clone, Copy, Debug)]
struct Brood {
    parent: EnemyId,
    lineage: Lineage,
    kind: EnemyKind,
    count: u32,
    origin: BroodOrigin,
}

/// Represents the authoritative Bastion Defence simulation state.
#[derive(Debug)]
pub struct SimulationState {
    config: SimulationConfig,
    validator: Box<dyn PlacementValidator>,
    director: WaveDirector,
    economy: UpgradeEconomy,
    movement: Movement,
    targeting: TowerTargeting,
    combat: TowerCombat,
    towers: BTreeMap<TowerId, Tower>,
    enemies: BTreeMap<EnemyId, Enemy>,
    projectiles: BTreeMap<ProjectileId, Projectile>,
    next_tower: u32,
    next_enemy: u32,
    next_projectile: u32,
    money: u32,
    lives: u32,
    tick: u64,
    speed: u32,
    game_over: bool,
    wave: WaveRuntime,
    report: MovementReport,
    targets: Vec<TowerTarget>,
    shots: Vec<Projectile>,
    phases: Vec<PhaseEntered>,
    broods: Vec<Brood>,
    doomed: Vec<EnemyId>,
}

impl SimulationState {
    /// Creates a simulation guarded by a [`ClearanceValidator`] built from
    /// the configuration.
    pub fn new(config: SimulationConfig) -> Result<Self, ConfigError> {
        let validator = ClearanceValidator::new(
            config.bounds,
            config.paths.clone(),
            config.path_clearance,
            config.tower_spacing,
        );
        Self::with_validator(config, Box::new(validator))
    }

    /// Creates a simulation that consults `validator` before placing towers.
    pub fn with_validator(
        config: SimulationConfig,
        validator: Box<dyn PlacementValidator>,
    ) -> Result<Self, ConfigError> {
        config.validate()?;
        let director = WaveDirector::new(config.waves.clone(), config.seed)?;
        let economy = UpgradeEconomy::new(config.upgrades.clone());
        Ok(Self {
            money: config.starting_money,
            lives: config.starting_lives,
            speed: config.speed_multiplier,
            config,
            validator,
            director,
            economy,
            movement: Movement::new(),
            targeting: TowerTargeting::new(),
            combat: TowerCombat::new(),
            towers: BTreeMap::new(),
            enemies: BTreeMap::new(),
            projectiles: BTreeMap::new(),
            next_tower: 0,
            next_enemy: 0,
            next_projectile: 0,
            tick: 0,
            game_over: false,
            wave: WaveRuntime::new(),
            report: MovementReport::default(),
            targets: Vec::new(),
            shots: Vec::new(),
            phases: Vec::new(),
            broods: Vec::new(),
            doomed: Vec::new(),
        })
    }

    /// Restores the state right after construction, keeping the configuration.
    pub fn reset(&mut self) {
        self.economy.reset();
        self.towers.clear();
        self.enemies.clear();
        self.projectiles.clear();
        self.next_tower = 0;
        self.next_enemy = 0;
        self.next_projectile = 0;
        self.money = self.config.starting_money;
        self.lives = self.config.starting_lives;
        self.tick = 0;
        self.speed = self.config.speed_multiplier;
        self.game_over = false;
        self.wave = WaveRuntime::new();
        self.report.clear();
        self.targets.clear();
        self.shots.clear();
        self.phases.clear();
        self.broods.clear();
        self.doomed.clear();
    }

    /// Runs `speed_multiplier` full ticks.
    pub fn advance_frame(&mut self, out: &mut Vec<Event>) {
        for _ in 0..self.speed {
            self.tick(out);
        }
    }

    /// Advances the simulation by exactly one tick.
    ///
    /// Once the game is over only the clock moves.
    pub fn tick(&mut self, out: &mut Vec<Event>) {
        if self.game_over {
            self.advance_clock(out);
            return;
        }
        let mark = out.len();

        self.step_wave(out);

        self.report.clear();
        self.movement
            .handle(&mut self.enemies, &self.config.paths, out, &mut self.report);
        self.collect_leaks(out);
        self.queue_summons();

        self.targeting
            .handle(&mut self.towers, &self.enemies, &mut self.targets);
        self.fire(out);
        self.combat.resolve(
            &mut self.projectiles,
            &mut self.enemies,
            &self.config.bounds,
            out,
        );

        self.advance_phases(out);
        self.accrue_currency(mark, out);
        self.collect_dead(out);
        self.hatch(out);
        self.projectiles
            .retain(|_, projectile| !projectile.should_remove());
        self.complete_wave(out);

        self.advance_clock(out);
    }

    /// Builds a tower of `kind` at `position`, paying its cost.
    pub fn place_tower(
        &mut self,
        kind: TowerKind,
        position: Vec2,
    ) -> Result<TowerId, PlacementRejected> {
        self.validator.check(kind, position, &self.towers)?;
        let cost = kind.cost();
        if cost > self.money {
            return Err(PlacementRejected::InsufficientMoney {
                cost,
                available: self.money,
            });
        }

        self.money -= cost;
        let id = TowerId::new(self.next_tower);
        self.next_tower += 1;
        let _ = self.towers.insert(id, Tower::new(kind, position));
        debug!(tower = id.get(), ?kind, cost, "tower placed");
        Ok(id)
    }

    /// Removes a tower, refunding half of its cost rounded down.
    pub fn remove_tower(&mut self, id: TowerId) -> Result<u32, RemovalRejected> {
        let tower = self
            .towers
            .remove(&id)
            .ok_or(RemovalRejected::MissingTower)?;
        let refund = tower.kind.cost() / 2;
        self.money = self.money.saturating_add(refund);
        self.economy.forget(id);
        debug!(tower = id.get(), kind = ?tower.kind, refund, "tower removed");
        Ok(refund)
    }

    /// Buys the next level on `track` with the tower's own currency.
    pub fn purchase_upgrade(
        &mut self,
        id: TowerId,
        track: UpgradeTrack,
    ) -> Result<u8, UpgradeRejected> {
        self.economy.upgrade(&mut self.towers, id, track)
    }

    /// Starts the next wave if none is running.
    ///
    /// Returns `false` while a wave is still spawning or clearing, and after
    /// the game ended.
    pub fn start_wave(&mut self, out: &mut Vec<Event>) -> bool {
        if self.game_over || self.wave.stage() != WaveStage::Idle {
            return false;
        }

        let plan = self.director.advance(self.wave.number() + 1);
        let quota = u32::try_from(plan.spawns.len()).unwrap_or(u32::MAX);
        info!(wave = plan.wave, quota, boss = plan.boss, "wave started");
        out.push(Event::WaveStarted {
            wave: plan.wave,
            quota,
            boss: plan.boss,
        });
        self.wave.start(plan);
        true
    }

    /// Sets how many ticks run per frame, clamped to `1..=MAX_SPEED_MULTIPLIER`.
    pub fn set_speed(&mut self, multiplier: u32) {
        self.speed = multiplier.clamp(1, MAX_SPEED_MULTIPLIER);
    }

    /// Captures a read-only view of the whole simulation.
    #[must_use]
    pub fn snapshot(&self) -> SimulationView {
        let towers = self
            .towers
            .iter()
            .map(|(id, tower)| TowerSnapshot {
                id: *id,
                kind: tower.kind,
                position: tower.position,
                stats: tower.stats,
                levels: tower.levels,
                target: tower.target,
                currency: self.economy.currency(*id, tower.kind),
                damage_dealt: tower.damage_dealt,
                kills: tower.kills,
            })
            .collect();
        let enemies = self
            .enemies
            .iter()
            .map(|(id, enemy)| EnemySnapshot {
                id: *id,
                kind: enemy.kind,
                position: enemy.position,
                health: enemy.health,
                max_health: enemy.max_health,
                shield: enemy.shield,
                size: enemy.size,
                flying: enemy.flying,
                visible: enemy.is_visible(),
                statuses: StatusKind::ALL
                    .into_iter()
                    .filter(|status| enemy.status.is_active(*status))
                    .collect(),
                immunities: enemy.immunity.immunities().collect(),
            })
            .collect();
        let projectiles = self
            .projectiles
            .iter()
            .map(|(id, projectile)| ProjectileSnapshot {
                id: *id,
                origin: projectile.origin,
                position: projectile.position,
                behavior: projectile.behavior,
            })
            .collect();

        SimulationView {
            tick: self.tick,
            money: self.money,
            lives: self.lives,
            wave: self.wave.info(),
            towers,
            enemies,
            projectiles,
            speed: self.speed,
            game_over: self.game_over,
        }
    }

    fn advance_clock(&mut self, out: &mut Vec<Event>) {
        self.tick = self.tick.saturating_add(1);
        out.push(Event::TimeAdvanced { tick: self.tick });
    }

    fn step_wave(&mut self, out: &mut Vec<Event>) {
        if self.wave.idle_elapsed(self.config.auto_start_delay) {
            let _ = self.start_wave(out);
        }
        if let Some(due) = self.wave.poll_spawn() {
            self.spawn_planned(due, out);
        }
    }

    fn spawn_planned(&mut self, due: DueSpawn, out: &mut Vec<Event>) {
        let index = due.slot % self.config.paths.len().max(1);
        let Some(path) = self.config.paths.get(index) else {
            return;
        };
        let path_id = PathId::new(u32::try_from(index).unwrap_or(u32::MAX));
        let enemy = Enemy::spawn(
            due.order.kind,
            path_id,
            path,
            0.0,
            due.wave,
            due.scale,
            due.order.rolled_immunity,
        );
        let _ = self.insert_enemy(enemy, out);
    }

    fn insert_enemy(&mut self, enemy: Enemy, out: &mut Vec<Event>) -> EnemyId {
        let id = EnemyId::new(self.next_enemy);
        self.next_enemy += 1;
        out.push(Event::EnemySpawned {
            enemy: id,
            kind: enemy.kind,
        });
        let _ = self.enemies.insert(id, enemy);
        id
    }

    fn collect_leaks(&mut self, out: &mut Vec<Event>) {
        for id in std::mem::take(&mut self.report.leaked) {
            let Some(enemy) = self.enemies.remove(&id) else {
                continue;
            };
            self.lives = self.lives.saturating_sub(enemy.lives_cost);
            out.push(Event::EnemyLeaked {
                enemy: id,
                lives_lost: enemy.lives_cost,
            });

            if self.lives == 0 && !self.game_over {
                self.game_over = true;
                info!(wave = self.wave.number(), tick = self.tick, "game over");
                out.push(Event::GameOver {
                    wave: self.wave.number(),
                });
            }
        }
    }

    fn queue_summons(&mut self) {
        for request in &self.report.summons {
            let Some(parent) = self.enemies.get(&request.parent) else {
                continue;
            };
            self.broods.push(Brood {
                parent: request.parent,
                lineage: lineage_of(parent),
                kind: request.kind,
                count: request.count,
                origin: BroodOrigin::Summon,
            });
        }
    }

    fn fire(&mut self, out: &mut Vec<Event>) {
        self.shots.clear();
        self.combat.fire(
            &mut self.towers,
            &self.targets,
            &mut self.enemies,
            &mut self.shots,
            out,
        );

        for shot in self.shots.drain(..) {
            let id = ProjectileId::new(self.next_projectile);
            self.next_projectile += 1;
            if let Some(target) = shot.target {
                out.push(Event::ProjectileFired {
                    tower: shot.origin,
                    projectile: id,
                    target,
                });
            }
            let _ = self.projectiles.insert(id, shot);
        }
    }

    fn advance_phases(&mut self, out: &mut Vec<Event>) {
        for (id, enemy) in self.enemies.iter_mut() {
            self.phases.clear();
            enemy.advance_phases(&mut self.phases);
            for entered in &self.phases {
                debug!(
                    enemy = id.get(),
                    kind = ?enemy.kind,
                    phase = entered.phase,
                    "phase entered"
                );
                out.push(Event::PhaseChanged {
                    enemy: *id,
                    phase: entered.phase,
                });
                if let Some((kind, count)) = entered.summon {
                    self.broods.push(Brood {
                        parent: *id,
                        lineage: lineage_of(enemy),
                        kind,
                        count,
                        origin: BroodOrigin::Summon,
                    });
                }
            }
        }
    }

    /// Credits tower currency for the hits and detections emitted this tick.
    fn accrue_currency(&mut self, mark: usize, out: &[Event]) {
        for event in out.iter().skip(mark) {
            match event {
                Event::DamageDealt(report) if !report.immune && report.damage > 0.0 => {
                    let Some(tower) = self.towers.get_mut(&report.tower) else {
                        continue;
                    };
                    let damage = f64::from(report.damage);
                    tower.damage_dealt += damage;
                    let _ = self.economy.add_currency(
                        report.tower,
                        tower.kind,
                        damage * self.config.currency_per_damage,
                    );
                }
                Event::EnemyDetected { tower, .. } => {
                    let Some(detector) = self.towers.get(tower) else {
                        continue;
                    };
                    let _ = self.economy.add_currency(
                        *tower,
                        detector.kind,
                        self.config.detector_currency,
                    );
                }
                _ => {}
            }
        }
    }

    fn collect_dead(&mut self, out: &mut Vec<Event>) {
        self.doomed.clear();
        self.doomed.extend(
            self.enemies
                .iter()
                .filter(|(_, enemy)| !enemy.is_alive())
                .map(|(id, _)| *id),
        );

        for id in std::mem::take(&mut self.doomed) {
            let Some(enemy) = self.enemies.remove(&id) else {
                continue;
            };
            self.money = self.money.saturating_add(enemy.reward);
            if let Some(tower) = enemy
                .last_hit_by
                .and_then(|tower| self.towers.get_mut(&tower))
            {
                tower.kills += 1;
            }
            out.push(Event::EnemyKilled {
                enemy: id,
                kind: enemy.kind,
                reward: enemy.reward,
                tower: enemy.last_hit_by,
            });

            if let Some((kind, count)) = enemy.split() {
                self.broods.push(Brood {
                    parent: id,
                    lineage: lineage_of(&enemy),
                    kind,
                    count,
                    origin: BroodOrigin::Split,
                });
            }
        }
    }

    fn hatch(&mut self, out: &mut Vec<Event>) {
        for brood in std::mem::take(&mut self.broods) {
            let lineage = brood.lineage;
            let Some(path) = usize::try_from(lineage.path.get())
                .ok()
                .and_then(|index| self.config.paths.get(index))
            else {
                continue;
            };

            let spacing = match brood.origin {
                BroodOrigin::Summon => SUMMON_SPACING,
                BroodOrigin::Split => 0.0,
            };
            let children: Vec<Enemy> = (0..brood.count)
                .map(|index| {
                    Enemy::spawn(
                        brood.kind,
                        lineage.path,
                        path,
                        lineage.progress - spacing * index as f32,
                        lineage.wave,
                        lineage.scale,
                        None,
                    )
                })
                .collect();

            match brood.origin {
                BroodOrigin::Summon => out.push(Event::MinionsSummoned {
                    enemy: brood.parent,
                    minion: brood.kind,
                    count: brood.count,
                }),
                BroodOrigin::Split => {
                    debug!(
                        enemy = brood.parent.get(),
                        child = ?brood.kind,
                        count = brood.count,
                        "enemy split"
                    );
                    out.push(Event::EnemySplit {
                        enemy: brood.parent,
                        child: brood.kind,
                        count: brood.count,
                    });
                }
            }
            for child in children {
                let _ = self.insert_enemy(child, out);
            }
        }
    }

    fn complete_wave(&mut self, out: &mut Vec<Event>) {
        if self.game_over
            || self.wave.stage() != WaveStage::Clearing
            || !self.enemies.is_empty()
        {
            return;
        }
        let Some((wave, bonus)) = self.wave.complete() else {
            return;
        };
        self.money = self.money.saturating_add(bonus);
        info!(wave, bonus, money = self.money, "wave completed");
        out.push(Event::WaveCompleted { wave, bonus });
    }
}

fn lineage_of(enemy: &Enemy) -> Lineage {
    Lineage {
        path: enemy.path,
        progress: enemy.progress,
        wave: enemy.wave,
        scale: enemy.scale,
    }
}

/// Applies the provided command to the simulation, broadcasting the outcome.
pub fn apply(state: &mut SimulationState, command: Command, out_events: &mut Vec<Event>) {
    match command {
        Command::Tick => state.advance_frame(out_events),
        Command::PlaceTower { kind, position } => match state.place_tower(kind, position) {
            Ok(tower) => out_events.push(Event::TowerPlaced {
                tower,
                kind,
                cost: kind.cost(),
            }),
            Err(reason) => out_events.push(Event::TowerPlacementRejected {
                kind,
                position,
                reason,
            }),
        },
        Command::RemoveTower { tower } => match state.remove_tower(tower) {
            Ok(refund) => out_events.push(Event::TowerRemoved { tower, refund }),
            Err(reason) => out_events.push(Event::TowerRemovalRejected { tower, reason }),
        },
        Command::PurchaseUpgrade { tower, track } => match state.purchase_upgrade(tower, track) {
            Ok(level) => out_events.push(Event::UpgradePurchased {
                tower,
                track,
                level,
            }),
            Err(reason) => out_events.push(Event::UpgradeRejected {
                tower,
                track,
                reason,
            }),
        },
        Command::StartWave => {
            let _ = state.start_wave(out_events);
        }
        Command::SetSpeed { multiplier } => state.set_speed(multiplier),
    }
}

/// Query functions that provide read-only access to the simulation state.
pub mod query {
    use bastion_core::{
        Enemy, EnemyId, Projectile, ProjectileId, Tower, TowerId, UpgradeTrack, WaveInfo,
    };

    use super::{SimulationConfig, SimulationState};

    /// Configuration the simulation was built from.
    #[must_use]
    pub fn config(state: &SimulationState) -> &SimulationConfig {
        &state.config
    }

    /// Money held by the player.
    #[must_use]
    pub fn money(state: &SimulationState) -> u32 {
        state.money
    }

    /// Lives left.
    #[must_use]
    pub fn lives(state: &SimulationState) -> u32 {
        state.lives
    }

    /// Ticks simulated so far.
    #[must_use]
    pub fn tick(state: &SimulationState) -> u64 {
        state.tick
    }

    /// Ticks executed per frame.
    #[must_use]
    pub fn speed(state: &SimulationState) -> u32 {
        state.speed
    }

    /// Whether the player ran out of lives.
    #[must_use]
    pub fn is_game_over(state: &SimulationState) -> bool {
        state.game_over
    }

    /// Progress of the current wave.
    #[must_use]
    pub fn wave(state: &SimulationState) -> WaveInfo {
        state.wave.info()
    }

    /// Looks up a tower.
    #[must_use]
    pub fn tower(state: &SimulationState, id: TowerId) -> Option<&Tower> {
        state.towers.get(&id)
    }

    /// Every tower in identifier order.
    pub fn towers(state: &SimulationState) -> impl Iterator<Item = (TowerId, &Tower)> {
        state.towers.iter().map(|(id, tower)| (*id, tower))
    }

    /// Looks up an enemy.
    #[must_use]
    pub fn enemy(state: &SimulationState, id: EnemyId) -> Option<&Enemy> {
        state.enemies.get(&id)
    }

    /// Every enemy in identifier order.
    pub fn enemies(state: &SimulationState) -> impl Iterator<Item = (EnemyId, &Enemy)> {
        state.enemies.iter().map(|(id, enemy)| (*id, enemy))
    }

    /// Every projectile in identifier order.
    pub fn projectiles(
        state: &SimulationState,
    ) -> impl Iterator<Item = (ProjectileId, &Projectile)> {
        state
            .projectiles
            .iter()
            .map(|(id, projectile)| (*id, projectile))
    }

    /// Upgrade currency held by a tower; zero for unknown towers.
    #[must_use]
    pub fn currency(state: &SimulationState, id: TowerId) -> f64 {
        state
            .towers
            .get(&id)
            .map_or(0.0, |tower| state.economy.currency(id, tower.kind))
    }

    /// Price of the tower's next level on `track`, or `None` at the cap.
    #[must_use]
    pub fn upgrade_cost(
        state: &SimulationState,
        id: TowerId,
        track: UpgradeTrack,
    ) -> Option<f64> {
        let tower = state.towers.get(&id)?;
        state
            .economy
            .get_cost(tower.kind, track, tower.levels.get(track))
    }

    /// Reports whether the tower can afford its next level on `track`.
    #[must_use]
    pub fn can_upgrade(
        state: &SimulationState,
        id: TowerId,
        track: UpgradeTrack,
    ) -> bool {
        state.economy.can_upgrade(&state.towers, id, track)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bastion_core::Path;

    fn straight_config() -> SimulationConfig {
        let path = Path::new(vec![Vec2::new(0.0, 100.0), Vec2::new(600.0, 100.0)])
            .expect("valid path");
        SimulationConfig {
            bounds: bastion_core::Bounds::new(Vec2::ZERO, Vec2::new(600.0, 300.0)),
            paths: vec![path],
            ..SimulationConfig::default()
        }
    }

    fn state() -> SimulationState {
        SimulationState::new(straight_config()).expect("valid config")
    }

    #[test]
    fn placement_spends_money_and_assigns_sequential_ids() {
        let mut state = state();
        let money = query::money(&state);

        let first = state
            .place_tower(TowerKind::Basic, Vec2::new(50.0, 200.0))
            .expect("placed");
        let second = state
            .place_tower(TowerKind::Basic, Vec2::new(150.0, 200.0))
            .expect("placed");

        assert_eq!(first, TowerId::new(0));
        assert_eq!(second, TowerId::new(1));
        assert_eq!(query::money(&state), money - 2 * TowerKind::Basic.cost());
    }

    #[test]
    fn placement_checks_location_before_money() {
        let config = SimulationConfig {
            starting_money: 0,
            ..straight_config()
        };
        let mut state = SimulationState::new(config).expect("valid config");

        assert_eq!(
            state.place_tower(TowerKind::Basic, Vec2::new(50.0, 105.0)),
            Err(PlacementRejected::TooCloseToPath)
        );
        assert_eq!(
            state.place_tower(TowerKind::Basic, Vec2::new(50.0, 200.0)),
            Err(PlacementRejected::InsufficientMoney {
                cost: TowerKind::Basic.cost(),
                available: 0,
            })
        );
    }

    #[test]
    fn removal_refunds_half_the_cost_rounded_down() {
        let mut state = state();
        let tower = state
            .place_tower(TowerKind::Sniper, Vec2::new(50.0, 200.0))
            .expect("placed");
        let after_purchase = query::money(&state);

        let refund = state.remove_tower(tower).expect("removed");
        assert_eq!(refund, TowerKind::Sniper.cost() / 2);
        assert_eq!(query::money(&state), after_purchase + refund);
        assert_eq!(
            state.remove_tower(tower),
            Err(RemovalRejected::MissingTower)
        );
    }

    #[test]
    fn start_wave_is_refused_while_a_wave_runs() {
        let mut state = state();
        let mut events = Vec::new();

        assert!(state.start_wave(&mut events));
        assert!(!state.start_wave(&mut events));
        assert_eq!(
            events
                .iter()
                .filter(|event| matches!(event, Event::WaveStarted { .. }))
                .count(),
            1
        );
        assert_eq!(query::wave(&state).stage, WaveStage::Spawning);
    }

    #[test]
    fn speed_is_clamped() {
        let mut state = state();
        state.set_speed(0);
        assert_eq!(query::speed(&state), 1);
        state.set_speed(99);
        assert_eq!(query::speed(&state), MAX_SPEED_MULTIPLIER);
    }

    #[test]
    fn reset_restores_the_starting_state() {
        let mut state = state();
        let mut events = Vec::new();
        let _ = state
            .place_tower(TowerKind::Basic, Vec2::new(50.0, 200.0))
            .expect("placed");
        assert!(state.start_wave(&mut events));
        for _ in 0..30 {
            state.tick(&mut events);
        }

        state.reset();
        let view = state.snapshot();
        assert_eq!(view.tick, 0);
        assert_eq!(view.money, query::config(&state).starting_money);
        assert!(view.towers.is_empty());
        assert!(view.enemies.is_empty());
        assert_eq!(view.wave.number, 0);
    }

    #[test]
    fn game_over_freezes_everything_but_the_clock() {
        let config = SimulationConfig {
            starting_lives: 1,
            ..straight_config()
        };
        let mut state = SimulationState::new(config).expect("valid config");
        let mut events = Vec::new();
        assert!(state.start_wave(&mut events));

        for _ in 0..2_000 {
            state.tick(&mut events);
            if query::is_game_over(&state) {
                break;
            }
        }
        assert!(query::is_game_over(&state));
        let frozen = state.snapshot();

        events.clear();
        state.tick(&mut events);
        let view = state.snapshot();
        assert_eq!(events, vec![Event::TimeAdvanced { tick: view.tick }]);
        assert_eq!(view.enemies, frozen.enemies);
        assert!(!state.start_wave(&mut events));
    }
}
