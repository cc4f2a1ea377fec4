//! Test setup utilities.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use crate::clock::{Clock, ManualClock};
use crate::config::EngineConfig;
use crate::entity::EntityId;
use crate::scheduler::GateMode;
use crate::system::ResourceSystem;

/// System under test, driven by a shared manual clock.
pub type TestSystem = ResourceSystem<Arc<ManualClock>>;

// =============================================================================
// Setup
// =============================================================================

/// Builds a system at `t = 0` with `config`.
pub fn setup(config: EngineConfig) -> (Arc<ManualClock>, TestSystem) {
    let clock = Arc::new(ManualClock::new(0));
    let system = ResourceSystem::new(Arc::clone(&clock), config);
    (clock, system)
}

/// Hunger only, with the given rate, loss threshold and damage.
pub fn hunger_config(decay_rate: f32, loss_threshold: f32, damage_amount: f32) -> EngineConfig {
    let mut config = EngineConfig::default();
    config.hunger.decay_rate = decay_rate;
    config.hunger.loss_threshold = loss_threshold;
    config.hunger.damage_amount = damage_amount;
    config
}

/// Defaults with thirst turned on.
pub fn thirst_config() -> EngineConfig {
    let mut config = EngineConfig::default();
    config.thirst.enabled = true;
    config
}

/// `config` switched to the global gate with its default interval.
pub fn global(mut config: EngineConfig) -> EngineConfig {
    config.scheduler.gate = GateMode::Global;
    config.scheduler.interval_ms = None;
    config
}

/// Spawns `count` characters and returns their IDs in spawn order.
pub fn spawn_characters(system: &mut TestSystem, count: usize) -> Vec<EntityId> {
    (0..count)
        .map(|_| system.spawn_character().unwrap())
        .collect()
}

/// Float comparison with a tolerance suited to `f32` decay arithmetic.
pub fn approx(actual: f32, expected: f32) -> bool {
    (actual - expected).abs() < 1e-3
}

// =============================================================================
// Clocks
// =============================================================================

/// Clock that counts reads and moves forward `step` ms after each one.
///
/// An operation that read it twice would see two different instants.
#[derive(Debug)]
pub struct SteppingClock {
    now: AtomicU64,
    step: u64,
    reads: AtomicU64,
}

impl SteppingClock {
    pub fn new(start: u64, step: u64) -> Self {
        Self {
            now: AtomicU64::new(start),
            step,
            reads: AtomicU64::new(0),
        }
    }

    pub fn reads(&self) -> u64 {
        self.reads.load(Ordering::SeqCst)
    }

    /// What the next read will return.
    pub fn peek(&self) -> u64 {
        self.now.load(Ordering::SeqCst)
    }
}

impl Clock for SteppingClock {
    fn now_ms(&self) -> u64 {
        self.reads.fetch_add(1, Ordering::SeqCst);
        self.now.fetch_add(self.step, Ordering::SeqCst)
    }
}
