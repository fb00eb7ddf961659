#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Pure system that fires towers and resolves projectiles against enemies.
//!
//! Firing and resolution are split so the world can assign projectile
//! identifiers between the two phases. Every hit goes through
//! [`Enemy::receive_hit`], which reports it as [`Event::DamageDealt`]; the
//! world credits currency from those reports.

use std::collections::BTreeMap;

use bastion_core::{
    Bounds, Delivery, Enemy, EnemyId, Event, HitSource, Projectile, ProjectileBehavior,
    ProjectileId, StatusApplication, Tower, TowerId, TowerRole,
};
use bastion_system_tower_targeting::TowerTarget;
use glam::Vec2;
use tracing::trace;

/// Tower combat system that reuses scratch buffers between ticks.
#[derive(Debug, Default)]
pub struct TowerCombat {
    contacts: Vec<Contact>,
    victims: Vec<(EnemyId, f32)>,
}

impl TowerCombat {
    /// Creates a new tower combat system with empty scratch buffers.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Counts fire timers down and emits shots for ready towers with targets.
    ///
    /// New projectiles are appended to `shots` in tower order; the caller
    /// assigns identifiers. Detectors reveal invisible enemies instead of
    /// shooting.
    pub fn fire(
        &mut self,
        towers: &mut BTreeMap<TowerId, Tower>,
        targets: &[TowerTarget],
        enemies: &mut BTreeMap<EnemyId, Enemy>,
        shots: &mut Vec<Projectile>,
        out: &mut Vec<Event>,
    ) {
        for (id, tower) in towers.iter_mut() {
            tower.cool_down();
            if !tower.is_ready() {
                continue;
            }

            match tower.archetype().role {
                TowerRole::Detector => {
                    reveal(*id, tower, enemies, out);
                    tower.mark_fired();
                }
                TowerRole::Attack {
                    damage_type,
                    behavior,
                    delivery,
                } => {
                    let mut fired = false;
                    for target in targets.iter().filter(|target| target.tower == *id) {
                        let Some(enemy) = enemies.get(&target.enemy) else {
                            continue;
                        };
                        let shot = match delivery {
                            Delivery::Instant => Projectile::instant(
                                *id,
                                tower.kind,
                                enemy.position,
                                target.enemy,
                                damage_type,
                                behavior,
                                tower.stats,
                            ),
                            Delivery::Travelling => {
                                let heading = (enemy.position - tower.position).normalize_or_zero();
                                let heading = if heading == Vec2::ZERO {
                                    Vec2::X
                                } else {
                                    heading
                                };
                                Projectile::travelling(
                                    *id,
                                    tower.kind,
                                    tower.position,
                                    heading * tower.stats.projectile_speed,
                                    target.enemy,
                                    damage_type,
                                    behavior,
                                    tower.stats,
                                )
                            }
                        };
                        shots.push(shot);
                        fired = true;
                    }
                    if fired {
                        tower.mark_fired();
                    }
                }
            }
        }
    }

    /// Advances every live projectile by one tick and resolves its hits.
    ///
    /// Projectiles are flagged for removal, never removed here; the caller
    /// discards flagged projectiles during cleanup.
    pub fn resolve(
        &mut self,
        projectiles: &mut BTreeMap<ProjectileId, Projectile>,
        enemies: &mut BTreeMap<EnemyId, Enemy>,
        bounds: &Bounds,
        out: &mut Vec<Event>,
    ) {
        for (id, projectile) in projectiles.iter_mut() {
            if projectile.should_remove() {
                continue;
            }
            projectile.age = projectile.age.saturating_add(1);

            if projectile.is_instant() {
                let primary = projectile
                    .target
                    .filter(|target| enemies.get(target).is_some_and(Enemy::is_alive));
                if let Some(primary) = primary {
                    self.impact(projectile, primary, enemies, out);
                }
                let _ = projectile.mark_removed();
                trace!(
                    projectile = id.get(),
                    hits = projectile.hits.len(),
                    "instant shot resolved"
                );
                continue;
            }

            if projectile.behavior == ProjectileBehavior::Homing {
                steer(projectile, enemies);
            }

            let from = projectile.position;
            let to = from + projectile.velocity;
            projectile.position = to;
            projectile.travelled += projectile.velocity.length();

            self.collect_contacts(projectile, from, to, enemies);
            let contacts = std::mem::take(&mut self.contacts);
            for contact in &contacts {
                if projectile.behavior == ProjectileBehavior::Pierce {
                    if projectile.has_hit(contact.enemy) {
                        continue;
                    }
                    self.impact(projectile, contact.enemy, enemies, out);
                    projectile.pierce_remaining = projectile.pierce_remaining.saturating_sub(1);
                    if projectile.pierce_remaining == 0 {
                        let _ = projectile.mark_removed();
                        break;
                    }
                } else {
                    self.impact(projectile, contact.enemy, enemies, out);
                    let _ = projectile.mark_removed();
                    break;
                }
            }
            self.contacts = contacts;

            if !projectile.should_remove()
                && (projectile.is_exhausted() || !bounds.contains(projectile.position))
            {
                let _ = projectile.mark_removed();
            }

            if projectile.should_remove() {
                trace!(
                    projectile = id.get(),
                    hits = projectile.hits.len(),
                    age = projectile.age,
                    "projectile resolved"
                );
            }
        }
    }

    fn collect_contacts(
        &mut self,
        projectile: &Projectile,
        from: Vec2,
        to: Vec2,
        enemies: &BTreeMap<EnemyId, Enemy>,
    ) {
        self.contacts.clear();
        let archetype = projectile.tower_kind.archetype();
        for (id, enemy) in enemies {
            if !archetype.reaches(enemy) || projectile.has_hit(*id) {
                continue;
            }
            if let Some(entry) = sweep(from, to, enemy.position, enemy.size) {
                self.contacts.push(Contact { enemy: *id, entry });
            }
        }
        self.contacts.sort_by(|a, b| {
            a.entry
                .total_cmp(&b.entry)
                .then_with(|| a.enemy.cmp(&b.enemy))
        });
    }

    fn impact(
        &mut self,
        projectile: &mut Projectile,
        primary: EnemyId,
        enemies: &mut BTreeMap<EnemyId, Enemy>,
        out: &mut Vec<Event>,
    ) {
        let Some(point) = enemies.get(&primary).map(|enemy| enemy.position) else {
            return;
        };
        let damage = projectile.damage;
        let radius = projectile.stats.splash_radius;

        match projectile.behavior {
            ProjectileBehavior::Direct | ProjectileBehavior::Pierce => {
                strike(projectile, primary, damage, enemies, out);
            }
            ProjectileBehavior::Splash => {
                self.collect_area(projectile, point, radius, None, enemies);
                if !self.victims.iter().any(|(id, _)| *id == primary) {
                    self.victims.insert(0, (primary, 1.0));
                }
                self.apply_victims(projectile, damage, None, enemies, out);
            }
            ProjectileBehavior::Homing => {
                strike(projectile, primary, damage, enemies, out);
                if radius > 0.0 {
                    self.collect_area(projectile, point, radius, Some(primary), enemies);
                    self.apply_victims(projectile, damage, None, enemies, out);
                }
            }
            ProjectileBehavior::Chain => chain(projectile, primary, enemies, out),
            ProjectileBehavior::AreaFreeze
            | ProjectileBehavior::AreaWet
            | ProjectileBehavior::Dot(_) => {
                let status = status_for(projectile);
                self.collect_area(projectile, point, radius, None, enemies);
                for victim in &mut self.victims {
                    victim.1 = 1.0;
                }
                if !self.victims.iter().any(|(id, _)| *id == primary) {
                    self.victims.insert(0, (primary, 1.0));
                }
                self.apply_victims(projectile, damage, status, enemies, out);
            }
        }
    }

    /// Gathers reachable enemies around `point` with their splash falloff.
    fn collect_area(
        &mut self,
        projectile: &Projectile,
        point: Vec2,
        radius: f32,
        skip: Option<EnemyId>,
        enemies: &BTreeMap<EnemyId, Enemy>,
    ) {
        self.victims.clear();
        if radius <= 0.0 {
            return;
        }
        let archetype = projectile.tower_kind.archetype();
        for (id, enemy) in enemies {
            if Some(*id) == skip || !archetype.reaches(enemy) {
                continue;
            }
            let distance = enemy.position.distance(point);
            if distance <= radius {
                self.victims.push((*id, splash_falloff(distance, radius)));
            }
        }
    }

    fn apply_victims(
        &self,
        projectile: &mut Projectile,
        damage: f32,
        status: Option<StatusApplication>,
        enemies: &mut BTreeMap<EnemyId, Enemy>,
        out: &mut Vec<Event>,
    ) {
        for (id, factor) in &self.victims {
            strike(projectile, *id, damage * factor, enemies, out);
            let Some(application) = status else {
                continue;
            };
            if let Some(enemy) = enemies.get_mut(id) {
                if enemy.is_alive() && enemy.apply_status(application) {
                    out.push(Event::StatusApplied {
                        enemy: *id,
                        status: application.kind(),
                    });
                }
            }
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
struct Contact {
    enemy: EnemyId,
    entry: f32,
}

/// Linear falloff from full damage at the centre to half at the edge.
#[must_use]
pub fn splash_falloff(distance: f32, radius: f32) -> f32 {
    if radius <= 0.0 {
        return 1.0;
    }
    1.0 - 0.5 * (distance / radius).clamp(0.0, 1.0)
}

/// Earliest fraction of the segment `from..to` that touches the circle.
fn sweep(from: Vec2, to: Vec2, centre: Vec2, radius: f32) -> Option<f32> {
    let segment = to - from;
    let length_sq = segment.length_squared();
    let t = if length_sq <= f32::EPSILON {
        0.0
    } else {
        ((centre - from).dot(segment) / length_sq).clamp(0.0, 1.0)
    };
    let closest = from + segment * t;
    (closest.distance_squared(centre) <= radius * radius).then_some(t)
}

fn strike(
    projectile: &mut Projectile,
    enemy_id: EnemyId,
    amount: f32,
    enemies: &mut BTreeMap<EnemyId, Enemy>,
    out: &mut Vec<Event>,
) {
    let Some(enemy) = enemies.get_mut(&enemy_id) else {
        return;
    };
    if !enemy.is_alive() {
        return;
    }
    let source = HitSource {
        tower: projectile.origin,
        kind: projectile.tower_kind,
    };
    let _ = enemy.receive_hit(enemy_id, amount, projectile.damage_type, source, out);
    projectile.hits.push(enemy_id);
}

fn chain(
    projectile: &mut Projectile,
    primary: EnemyId,
    enemies: &mut BTreeMap<EnemyId, Enemy>,
    out: &mut Vec<Event>,
) {
    let Some(mut previous) = enemies.get(&primary).map(|enemy| enemy.position) else {
        return;
    };
    let damage = projectile.damage;
    strike(projectile, primary, damage, enemies, out);

    let archetype = projectile.tower_kind.archetype();
    let reach_sq = projectile.stats.chain_range * projectile.stats.chain_range;
    for _ in 0..projectile.stats.chain_count {
        let next = enemies
            .iter()
            .filter(|(id, enemy)| archetype.can_engage(enemy) && !projectile.has_hit(**id))
            .map(|(id, enemy)| (*id, enemy.position, enemy.position.distance_squared(previous)))
            .filter(|(_, _, distance_sq)| *distance_sq <= reach_sq)
            .min_by(|a, b| a.2.total_cmp(&b.2).then_with(|| a.0.cmp(&b.0)));
        let Some((id, position, _)) = next else {
            break;
        };
        strike(projectile, id, damage, enemies, out);
        previous = position;
    }
}

/// Rotates a homing projectile toward the nearest engageable enemy, by at
/// most its turn rate.
fn steer(projectile: &mut Projectile, enemies: &BTreeMap<EnemyId, Enemy>) {
    let archetype = projectile.tower_kind.archetype();
    let position = projectile.position;
    let nearest = enemies
        .iter()
        .filter(|(id, enemy)| archetype.can_engage(enemy) && !projectile.has_hit(**id))
        .map(|(id, enemy)| (*id, enemy.position, enemy.position.distance_squared(position)))
        .min_by(|a, b| a.2.total_cmp(&b.2).then_with(|| a.0.cmp(&b.0)));
    let Some((id, target, _)) = nearest else {
        return;
    };

    let desired = target - position;
    if desired.length_squared() <= f32::EPSILON || projectile.velocity == Vec2::ZERO {
        return;
    }
    let angle = projectile.velocity.angle_between(desired);
    if !angle.is_finite() {
        return;
    }
    let limit = projectile.stats.turn_rate.max(0.0);
    let turn = angle.clamp(-limit, limit);
    projectile.velocity = Vec2::from_angle(turn).rotate(projectile.velocity);
    projectile.target = Some(id);
}

fn status_for(projectile: &Projectile) -> Option<StatusApplication> {
    let stats = &projectile.stats;
    match projectile.behavior {
        ProjectileBehavior::AreaFreeze => Some(StatusApplication::Freeze {
            duration: stats.effect_duration,
            slow_factor: stats.effect_strength,
        }),
        ProjectileBehavior::AreaWet => Some(StatusApplication::Wet {
            duration: stats.effect_duration,
            multiplier: stats.effect_strength,
        }),
        ProjectileBehavior::Dot(kind) => Some(StatusApplication::Dot {
            kind,
            tick_damage: stats.tick_damage,
            interval: stats.tick_interval,
            duration: stats.effect_duration,
            source: Some(HitSource {
                tower: projectile.origin,
                kind: projectile.tower_kind,
            }),
        }),
        _ => None,
    }
}

fn reveal(
    tower_id: TowerId,
    tower: &Tower,
    enemies: &mut BTreeMap<EnemyId, Enemy>,
    out: &mut Vec<Event>,
) {
    let range_sq = tower.stats.range * tower.stats.range;
    for (id, enemy) in enemies.iter_mut() {
        if !enemy.is_alive() || !enemy.invisible || enemy.detected {
            continue;
        }
        if enemy.position.distance_squared(tower.position) <= range_sq {
            enemy.detected = true;
            out.push(Event::EnemyDetected {
                enemy: *id,
                tower: tower_id,
            });
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bastion_core::{
        DamageReport, DamageType, EnemyKind, Path, PathId, StatScale, StatusKind, TowerKind,
        MAX_PROJECTILE_AGE,
    };

    fn path() -> Path {
        Path::new(vec![Vec2::new(0.0, 0.0), Vec2::new(2_000.0, 0.0)]).expect("valid path")
    }

    fn bounds() -> Bounds {
        Bounds::new(Vec2::new(-100.0, -500.0), Vec2::new(2_100.0, 500.0))
    }

    fn enemy_at(kind: EnemyKind, x: f32) -> Enemy {
        Enemy::spawn(
            kind,
            PathId::new(0),
            &path(),
            x,
            1,
            StatScale::IDENTITY,
            None,
        )
    }

    fn registry(enemies: Vec<(u32, Enemy)>) -> BTreeMap<EnemyId, Enemy> {
        enemies
            .into_iter()
            .map(|(id, enemy)| (EnemyId::new(id), enemy))
            .collect()
    }

    fn towers(kind: TowerKind, position: Vec2) -> BTreeMap<TowerId, Tower> {
        let mut towers = BTreeMap::new();
        let _ = towers.insert(TowerId::new(1), Tower::new(kind, position));
        towers
    }

    fn target(enemy: u32) -> TowerTarget {
        TowerTarget {
            tower: TowerId::new(1),
            enemy: EnemyId::new(enemy),
        }
    }

    fn shot_at(kind: TowerKind, enemy: u32, enemies: &BTreeMap<EnemyId, Enemy>) -> Projectile {
        let archetype = kind.archetype();
        let TowerRole::Attack {
            damage_type,
            behavior,
            ..
        } = archetype.role
        else {
            panic!("attack tower expected");
        };
        Projectile::instant(
            TowerId::new(1),
            kind,
            enemies[&EnemyId::new(enemy)].position,
            EnemyId::new(enemy),
            damage_type,
            behavior,
            archetype.base,
        )
    }

    fn resolve_one(
        projectile: Projectile,
        enemies: &mut BTreeMap<EnemyId, Enemy>,
    ) -> (Projectile, Vec<Event>) {
        let mut projectiles = BTreeMap::new();
        let _ = projectiles.insert(ProjectileId::new(1), projectile);
        let mut events = Vec::new();
        TowerCombat::new().resolve(&mut projectiles, enemies, &bounds(), &mut events);
        let projectile = projectiles.remove(&ProjectileId::new(1)).expect("projectile");
        (projectile, events)
    }

    fn reports(events: &[Event]) -> Vec<DamageReport> {
        events
            .iter()
            .filter_map(|event| match event {
                Event::DamageDealt(report) => Some(*report),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn ready_tower_fires_and_resets_timer() {
        let mut towers = towers(TowerKind::Basic, Vec2::new(100.0, 0.0));
        let mut enemies = registry(vec![(1, enemy_at(EnemyKind::Grunt, 150.0))]);
        let mut system = TowerCombat::new();
        let mut shots = Vec::new();
        let mut events = Vec::new();

        system.fire(&mut towers, &[target(1)], &mut enemies, &mut shots, &mut events);
        assert_eq!(shots.len(), 1);
        assert_eq!(shots[0].velocity, Vec2::new(8.0, 0.0));
        assert_eq!(towers[&TowerId::new(1)].fire_timer, 40);

        shots.clear();
        system.fire(&mut towers, &[target(1)], &mut enemies, &mut shots, &mut events);
        assert!(shots.is_empty());
        assert_eq!(towers[&TowerId::new(1)].fire_timer, 39);
    }

    #[test]
    fn tower_without_target_keeps_timer_ready() {
        let mut towers = towers(TowerKind::Basic, Vec2::ZERO);
        let mut enemies = BTreeMap::new();
        let mut shots = Vec::new();
        let mut events = Vec::new();

        TowerCombat::new().fire(&mut towers, &[], &mut enemies, &mut shots, &mut events);
        assert!(shots.is_empty());
        assert!(towers[&TowerId::new(1)].is_ready());
    }

    #[test]
    fn multishot_fires_one_projectile_per_target() {
        let mut towers = towers(TowerKind::Gatling, Vec2::new(100.0, 0.0));
        let mut enemies = registry(vec![
            (1, enemy_at(EnemyKind::Grunt, 80.0)),
            (2, enemy_at(EnemyKind::Grunt, 140.0)),
        ]);
        let mut shots = Vec::new();
        let mut events = Vec::new();

        TowerCombat::new().fire(
            &mut towers,
            &[target(2), target(1)],
            &mut enemies,
            &mut shots,
            &mut events,
        );
        let aimed: Vec<_> = shots.iter().map(|shot| shot.target).collect();
        assert_eq!(aimed, vec![Some(EnemyId::new(2)), Some(EnemyId::new(1))]);
    }

    #[test]
    fn direct_projectile_hits_first_enemy_and_is_removed_once() {
        let mut enemies = registry(vec![
            (1, enemy_at(EnemyKind::Grunt, 120.0)),
            (2, enemy_at(EnemyKind::Grunt, 110.0)),
        ]);
        let archetype = TowerKind::Basic.archetype();
        let projectile = Projectile::travelling(
            TowerId::new(1),
            TowerKind::Basic,
            Vec2::new(100.0, 0.0),
            Vec2::new(8.0, 0.0),
            EnemyId::new(1),
            DamageType::Physical,
            ProjectileBehavior::Direct,
            archetype.base,
        );

        let (projectile, events) = resolve_one(projectile, &mut enemies);
        assert!(projectile.should_remove());
        let reports = reports(&events);
        assert_eq!(reports.len(), 1);
        assert_eq!(reports[0].enemy, EnemyId::new(2));
        assert_eq!(reports[0].damage, 10.0);
        assert_eq!(enemies[&EnemyId::new(1)].health, 40.0);
    }

    #[test]
    fn splash_at_radius_edge_deals_half_damage() {
        let mut enemies = registry(vec![
            (1, enemy_at(EnemyKind::Brute, 200.0)),
            (2, enemy_at(EnemyKind::Brute, 240.0)),
            (3, enemy_at(EnemyKind::Brute, 241.0)),
        ]);
        let shot = shot_at(TowerKind::Cannon, 1, &enemies);

        let (_, events) = resolve_one(shot, &mut enemies);
        let reports = reports(&events);
        assert_eq!(reports.len(), 2);
        assert_eq!(reports[0].damage, 25.0);
        assert!((reports[1].damage - 12.5).abs() < 1e-4);
        assert_eq!(enemies[&EnemyId::new(3)].health, 120.0);
    }

    #[test]
    fn splash_falloff_is_linear() {
        assert_eq!(splash_falloff(0.0, 40.0), 1.0);
        assert!((splash_falloff(20.0, 40.0) - 0.75).abs() < 1e-6);
        assert_eq!(splash_falloff(40.0, 40.0), 0.5);
    }

    #[test]
    fn chain_hops_to_nearest_unhit_enemies() {
        let mut enemies = registry(vec![
            (1, enemy_at(EnemyKind::Brute, 100.0)),
            (2, enemy_at(EnemyKind::Brute, 160.0)),
            (3, enemy_at(EnemyKind::Brute, 150.0)),
            (4, enemy_at(EnemyKind::Brute, 400.0)),
        ]);
        let shot = shot_at(TowerKind::Lightning, 1, &enemies);

        let (projectile, events) = resolve_one(shot, &mut enemies);
        assert_eq!(
            projectile.hits,
            vec![EnemyId::new(1), EnemyId::new(3), EnemyId::new(2)]
        );
        assert_eq!(reports(&events).len(), 3);
        assert_eq!(enemies[&EnemyId::new(4)].health, 120.0);
    }

    #[test]
    fn wet_enemies_take_double_lightning() {
        let mut soaked = enemy_at(EnemyKind::Brute, 100.0);
        assert!(soaked.apply_status(StatusApplication::Wet {
            duration: 100,
            multiplier: 2.0,
        }));
        let mut enemies = registry(vec![(1, soaked)]);
        let shot = shot_at(TowerKind::Lightning, 1, &enemies);

        let (_, events) = resolve_one(shot, &mut enemies);
        assert_eq!(reports(&events)[0].damage, 36.0);
    }

    #[test]
    fn pierce_hits_each_enemy_once_up_to_limit() {
        let mut enemies = registry(
            (1..=6)
                .map(|id| (id, enemy_at(EnemyKind::Brute, 100.0 + id as f32 * 2.0)))
                .collect(),
        );
        let archetype = TowerKind::Laser.archetype();
        let projectile = Projectile::travelling(
            TowerId::new(1),
            TowerKind::Laser,
            Vec2::new(90.0, 0.0),
            Vec2::new(14.0, 0.0),
            EnemyId::new(1),
            DamageType::Energy,
            ProjectileBehavior::Pierce,
            archetype.base,
        );

        let (projectile, events) = resolve_one(projectile, &mut enemies);
        assert!(projectile.should_remove());
        assert_eq!(projectile.hits.len(), 4);
        assert_eq!(reports(&events).len(), 4);
    }

    #[test]
    fn freeze_pulse_skips_freeze_immune_enemies() {
        let mut enemies = registry(vec![
            (1, enemy_at(EnemyKind::Grunt, 100.0)),
            (2, enemy_at(EnemyKind::FrostGiant, 110.0)),
        ]);
        let giant_speed = enemies[&EnemyId::new(2)].effective_speed();
        let shot = shot_at(TowerKind::Freeze, 1, &enemies);

        let (_, events) = resolve_one(shot, &mut enemies);
        assert!(enemies[&EnemyId::new(1)].status.is_active(StatusKind::Freeze));
        let giant = &enemies[&EnemyId::new(2)];
        assert!(!giant.status.is_active(StatusKind::Freeze));
        assert_eq!(giant.effective_speed(), giant_speed);
        assert_eq!(giant.health, giant.max_health);

        let applied: Vec<_> = events
            .iter()
            .filter(|event| matches!(event, Event::StatusApplied { .. }))
            .collect();
        assert_eq!(applied.len(), 1);
        assert!(reports(&events).iter().any(|report| report.immune));
    }

    #[test]
    fn poison_burst_credits_the_firing_tower() {
        let mut enemies = registry(vec![(1, enemy_at(EnemyKind::Brute, 100.0))]);
        let shot = shot_at(TowerKind::Poison, 1, &enemies);

        let _ = resolve_one(shot, &mut enemies);
        let brute = enemies.get_mut(&EnemyId::new(1)).expect("brute");
        assert!(brute.status.is_active(StatusKind::Poison));
        let pulses: Vec<_> = (0..60).flat_map(|_| brute.status.tick().pulses).collect();
        assert_eq!(pulses.len(), 1);
        assert_eq!(
            pulses[0].source,
            Some(HitSource {
                tower: TowerId::new(1),
                kind: TowerKind::Poison,
            })
        );
    }

    #[test]
    fn projectile_without_target_terminates() {
        let mut projectiles = BTreeMap::new();
        let archetype = TowerKind::Missile.archetype();
        let _ = projectiles.insert(
            ProjectileId::new(1),
            Projectile::travelling(
                TowerId::new(1),
                TowerKind::Missile,
                Vec2::new(1_000.0, 0.0),
                Vec2::new(0.0, 6.0),
                EnemyId::new(99),
                DamageType::Explosive,
                ProjectileBehavior::Homing,
                archetype.base,
            ),
        );
        let mut enemies = BTreeMap::new();
        let mut system = TowerCombat::new();
        let mut events = Vec::new();

        let mut ticks = 0;
        while !projectiles[&ProjectileId::new(1)].should_remove() {
            system.resolve(&mut projectiles, &mut enemies, &bounds(), &mut events);
            ticks += 1;
            assert!(ticks <= MAX_PROJECTILE_AGE, "projectile never expired");
        }
        assert!(events.is_empty());
    }

    #[test]
    fn homing_turn_is_bounded() {
        let mut enemies = registry(vec![(1, enemy_at(EnemyKind::Brute, 1_000.0))]);
        let archetype = TowerKind::Missile.archetype();
        let mut projectiles = BTreeMap::new();
        let _ = projectiles.insert(
            ProjectileId::new(1),
            Projectile::travelling(
                TowerId::new(1),
                TowerKind::Missile,
                Vec2::new(1_000.0, 200.0),
                Vec2::new(6.0, 0.0),
                EnemyId::new(1),
                DamageType::Explosive,
                ProjectileBehavior::Homing,
                archetype.base,
            ),
        );
        let mut events = Vec::new();
        TowerCombat::new().resolve(&mut projectiles, &mut enemies, &bounds(), &mut events);

        let velocity = projectiles[&ProjectileId::new(1)].velocity;
        let turned = Vec2::X.angle_between(velocity).abs();
        assert!((turned - archetype.base.turn_rate).abs() < 1e-4);
        assert!((velocity.length() - 6.0).abs() < 1e-4);
    }

    #[test]
    fn detector_reveals_invisible_enemies_once() {
        let mut towers = towers(TowerKind::Detector, Vec2::new(100.0, 0.0));
        let mut enemies = registry(vec![
            (1, enemy_at(EnemyKind::Wraith, 120.0)),
            (2, enemy_at(EnemyKind::Grunt, 120.0)),
            (3, enemy_at(EnemyKind::Phantom, 900.0)),
        ]);
        let mut system = TowerCombat::new();
        let mut shots = Vec::new();
        let mut events = Vec::new();

        system.fire(&mut towers, &[], &mut enemies, &mut shots, &mut events);
        assert_eq!(
            events,
            vec![Event::EnemyDetected {
                enemy: EnemyId::new(1),
                tower: TowerId::new(1),
            }]
        );
        assert!(enemies[&EnemyId::new(1)].detected);
        assert!(!enemies[&EnemyId::new(3)].detected);
        assert!(shots.is_empty());
    }
}
