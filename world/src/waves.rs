//! Lifecycle of the wave currently being played.

use bastion_core::{StatScale, WaveInfo, WaveStage};
use bastion_system_wave_generation::{SpawnOrder, SpawnPlan};

/// Spawn released by the runtime on the current tick.
#[derive(Clone, Copy, Debug, PartialEq)]
pub(crate) struct DueSpawn {
    pub(crate) slot: usize,
    pub(crate) order: SpawnOrder,
    pub(crate) wave: u32,
    pub(crate) scale: StatScale,
}

/// Tracks spawning progress and idle time between waves.
#[derive(Clone, Debug)]
pub(crate) struct WaveRuntime {
    number: u32,
    stage: WaveStage,
    plan: Option<SpawnPlan>,
    cursor: usize,
    countdown: u32,
    idle_ticks: u32,
}

impl WaveRuntime {
    pub(crate) fn new() -> Self {
        Self {
            number: 0,
            stage: WaveStage::Idle,
            plan: None,
            cursor: 0,
            countdown: 0,
            idle_ticks: 0,
        }
    }

    /// Number of the current or most recently completed wave.
    ///
    /// Set once when a wave starts; completion leaves it unchanged.
    pub(crate) fn number(&self) -> u32 {
        self.number
    }

    pub(crate) fn stage(&self) -> WaveStage {
        self.stage
    }

    /// Counts an idle tick and reports whether the auto-start delay elapsed.
    pub(crate) fn idle_elapsed(&mut self, delay: Option<u32>) -> bool {
        if self.stage != WaveStage::Idle {
            return false;
        }
        let Some(delay) = delay else {
            return false;
        };
        self.idle_ticks = self.idle_ticks.saturating_add(1);
        self.idle_ticks >= delay
    }

    /// Begins spawning `plan`; the first spawn is due on the next poll.
    pub(crate) fn start(&mut self, plan: SpawnPlan) {
        self.number = plan.wave;
        self.stage = if plan.spawns.is_empty() {
            WaveStage::Clearing
        } else {
            WaveStage::Spawning
        };
        self.plan = Some(plan);
        self.cursor = 0;
        self.countdown = 0;
        self.idle_ticks = 0;
    }

    /// Releases the spawn due this tick, if any.
    pub(crate) fn poll_spawn(&mut self) -> Option<DueSpawn> {
        if self.stage != WaveStage::Spawning {
            return None;
        }
        if self.countdown > 0 {
            self.countdown -= 1;
            return None;
        }

        let plan = self.plan.as_ref()?;
        let order = *plan.spawns.get(self.cursor)?;
        let due = DueSpawn {
            slot: self.cursor,
            order,
            wave: plan.wave,
            scale: plan.scale,
        };
        self.cursor += 1;
        self.countdown = plan.spawn_delay.saturating_sub(1);
        if self.cursor >= plan.spawns.len() {
            self.stage = WaveStage::Clearing;
        }
        Some(due)
    }

    /// Finishes a clearing wave, returning its number and bonus.
    pub(crate) fn complete(&mut self) -> Option<(u32, u32)> {
        if self.stage != WaveStage::Clearing {
            return None;
        }
        let bonus = self.plan.take().map_or(0, |plan| plan.bonus);
        self.stage = WaveStage::Idle;
        self.idle_ticks = 0;
        Some((self.number, bonus))
    }

    pub(crate) fn info(&self) -> WaveInfo {
        let (quota, boss) = self.plan.as_ref().map_or((0, false), |plan| {
            (u32::try_from(plan.spawns.len()).unwrap_or(u32::MAX), plan.boss)
        });
        WaveInfo {
            number: self.number,
            stage: self.stage,
            spawned: u32::try_from(self.cursor).unwrap_or(u32::MAX),
            quota,
            boss,
        }
    }
}
