//! Timed status effects tracked independently per enemy.
//!
//! Every effect follows the same `Inactive -> Active(timer) -> Inactive`
//! lifecycle. The tracker never consults immunities itself; callers apply
//! effects through [`crate::Enemy::apply_status`], which refuses effects the
//! enemy is immune to.

use serde::{Deserialize, Serialize};

use crate::immunity::DamageType;
use crate::HitSource;

/// Status effects an enemy can carry.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum StatusKind {
    /// Movement slowed by a factor.
    Freeze,
    /// Lightning damage amplified.
    Wet,
    /// Periodic poison damage.
    Poison,
    /// Periodic fire damage.
    Burn,
}

impl StatusKind {
    /// Number of status kinds.
    pub const COUNT: usize = 4;

    /// Every status in declaration order.
    pub const ALL: [StatusKind; Self::COUNT] = [
        StatusKind::Freeze,
        StatusKind::Wet,
        StatusKind::Poison,
        StatusKind::Burn,
    ];

    /// Dense index used by per-status tables.
    #[must_use]
    pub const fn index(self) -> usize {
        self as usize
    }
}

/// Damage-over-time flavours.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DotKind {
    /// Poison clouds.
    Poison,
    /// Burning.
    Burn,
}

impl DotKind {
    /// Damage type carried by each pulse.
    #[must_use]
    pub const fn damage_type(self) -> DamageType {
        match self {
            Self::Poison => DamageType::Poison,
            Self::Burn => DamageType::Fire,
        }
    }

    /// Status tracked for this damage-over-time flavour.
    #[must_use]
    pub const fn status(self) -> StatusKind {
        match self {
            Self::Poison => StatusKind::Poison,
            Self::Burn => StatusKind::Burn,
        }
    }
}

/// Request to activate or refresh a status effect.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum StatusApplication {
    /// Slow the enemy.
    Freeze {
        /// Ticks the effect lasts.
        duration: u32,
        /// Speed multiplier while active, within `0.0..=1.0`.
        slow_factor: f32,
    },
    /// Soak the enemy.
    Wet {
        /// Ticks the effect lasts.
        duration: u32,
        /// Multiplier applied to lightning damage while active.
        multiplier: f32,
    },
    /// Apply damage over time.
    Dot {
        /// Poison or burn.
        kind: DotKind,
        /// Damage dealt every `interval` ticks.
        tick_damage: f32,
        /// Ticks between damage pulses.
        interval: u32,
        /// Ticks the effect lasts.
        duration: u32,
        /// Tower credited with the periodic damage.
        source: Option<HitSource>,
    },
}

impl StatusApplication {
    /// Status activated by this application.
    #[must_use]
    pub const fn kind(&self) -> StatusKind {
        match self {
            Self::Freeze { .. } => StatusKind::Freeze,
            Self::Wet { .. } => StatusKind::Wet,
            Self::Dot { kind, .. } => kind.status(),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
struct Freeze {
    remaining: u32,
    slow_factor: f32,
}

#[derive(Clone, Copy, Debug, PartialEq)]
struct Wet {
    remaining: u32,
    multiplier: f32,
}

#[derive(Clone, Copy, Debug, PartialEq)]
struct Dot {
    remaining: u32,
    tick_damage: f32,
    interval: u32,
    elapsed: u32,
    source: Option<HitSource>,
}

impl Dot {
    fn tick(&mut self) -> Option<f32> {
        self.remaining = self.remaining.saturating_sub(1);
        self.elapsed = self.elapsed.saturating_add(1);
        if self.elapsed >= self.interval {
            self.elapsed = 0;
            Some(self.tick_damage)
        } else {
            None
        }
    }
}

/// Periodic damage emitted by a damage-over-time effect during a tick.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct DotPulse {
    /// Poison or burn.
    pub kind: DotKind,
    /// Damage to apply.
    pub damage: f32,
    /// Tower credited with the damage.
    pub source: Option<HitSource>,
}

/// Everything that happened to a tracker during one tick.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct StatusTick {
    /// Damage pulses due this tick.
    pub pulses: Vec<DotPulse>,
    /// Effects that returned to `Inactive` this tick.
    pub expired: Vec<StatusKind>,
}

/// Per-enemy status state machine.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct StatusEffects {
    freeze: Option<Freeze>,
    wet: Option<Wet>,
    poison: Option<Dot>,
    burn: Option<Dot>,
}

impl StatusEffects {
    /// Creates a tracker with every effect inactive.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Activates or refreshes the provided effect.
    pub fn apply(&mut self, application: StatusApplication) {
        match application {
            StatusApplication::Freeze {
                duration,
                slow_factor,
            } => {
                let slow_factor = slow_factor.clamp(0.0, 1.0);
                self.freeze = Some(match self.freeze {
                    Some(current) => Freeze {
                        remaining: current.remaining.max(duration),
                        slow_factor: current.slow_factor.min(slow_factor),
                    },
                    None => Freeze {
                        remaining: duration,
                        slow_factor,
                    },
                });
            }
            StatusApplication::Wet {
                duration,
                multiplier,
            } => {
                self.wet = Some(match self.wet {
                    Some(current) => Wet {
                        remaining: current.remaining.max(duration),
                        multiplier: current.multiplier.max(multiplier),
                    },
                    None => Wet {
                        remaining: duration,
                        multiplier,
                    },
                });
            }
            StatusApplication::Dot {
                kind,
                tick_damage,
                interval,
                duration,
                source,
            } => {
                let dot = Dot {
                    remaining: duration,
                    tick_damage,
                    interval: interval.max(1),
                    elapsed: 0,
                    source,
                };
                match kind {
                    DotKind::Poison => self.poison = Some(dot),
                    DotKind::Burn => self.burn = Some(dot),
                }
            }
        }
    }

    /// Advances every active timer by one tick.
    pub fn tick(&mut self) -> StatusTick {
        let mut report = StatusTick::default();

        if let Some(freeze) = self.freeze.as_mut() {
            freeze.remaining = freeze.remaining.saturating_sub(1);
            if freeze.remaining == 0 {
                self.freeze = None;
                report.expired.push(StatusKind::Freeze);
            }
        }

        if let Some(wet) = self.wet.as_mut() {
            wet.remaining = wet.remaining.saturating_sub(1);
            if wet.remaining == 0 {
                self.wet = None;
                report.expired.push(StatusKind::Wet);
            }
        }

        for kind in [DotKind::Poison, DotKind::Burn] {
            let slot = match kind {
                DotKind::Poison => &mut self.poison,
                DotKind::Burn => &mut self.burn,
            };
            if let Some(dot) = slot.as_mut() {
                if let Some(damage) = dot.tick() {
                    report.pulses.push(DotPulse {
                        kind,
                        damage,
                        source: dot.source,
                    });
                }
                if dot.remaining == 0 {
                    *slot = None;
                    report.expired.push(kind.status());
                }
            }
        }

        report
    }

    /// Reports whether the effect is currently active.
    #[must_use]
    pub fn is_active(&self, status: StatusKind) -> bool {
        self.remaining(status).is_some()
    }

    /// Ticks left on the effect, or `None` when it is inactive.
    #[must_use]
    pub fn remaining(&self, status: StatusKind) -> Option<u32> {
        match status {
            StatusKind::Freeze => self.freeze.map(|freeze| freeze.remaining),
            StatusKind::Wet => self.wet.map(|wet| wet.remaining),
            StatusKind::Poison => self.poison.map(|dot| dot.remaining),
            StatusKind::Burn => self.burn.map(|dot| dot.remaining),
        }
    }

    /// Multiplier applied to movement speed.
    #[must_use]
    pub fn speed_factor(&self) -> f32 {
        self.freeze.map_or(1.0, |freeze| freeze.slow_factor)
    }

    /// Multiplier applied to incoming lightning damage.
    #[must_use]
    pub fn lightning_multiplier(&self) -> f32 {
        self.wet.map_or(1.0, |wet| wet.multiplier)
    }

    /// Damage dealt per pulse by the damage-over-time effect, if active.
    #[must_use]
    pub fn dot_damage(&self, kind: DotKind) -> Option<f32> {
        match kind {
            DotKind::Poison => self.poison.map(|dot| dot.tick_damage),
            DotKind::Burn => self.burn.map(|dot| dot.tick_damage),
        }
    }

    /// Deactivates every effect.
    pub fn clear(&mut self) {
        *self = Self::default();
    }
}
