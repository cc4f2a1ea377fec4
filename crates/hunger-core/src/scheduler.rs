//! Periodic damage scheduler.
//!
//! Decay itself is lazy and needs no ticking. The scheduler exists for the
//! side effect that does: every interval, starving characters take damage.
//!
//! Each run goes `Idle -> Evaluate -> ApplyDamage -> Idle`:
//!
//! 1. **Idle**: nothing happens until `now` reaches the gate
//! 2. **Evaluate**: settle decay through the hook chain, then check the
//!    starving predicate against the settled value
//! 3. **ApplyDamage**: dispatch the state's damage amount to the sink
//! 4. Advance the gate by whole intervals until it lies after `now`
//!
//! Missed intervals are skipped, never replayed: a host that stops ticking
//! for a minute gets one evaluation when it resumes, not twenty.
//!
//! # Gate modes
//!
//! [`GateMode::PerEntity`] stores the gate on each state, so every
//! character runs on its own cadence from spawn. [`GateMode::Global`] stores
//! one gate on the world-driver entity and evaluates every tracked state when
//! it opens. Both are the same machine; only the gate's home differs.
//!
//! # Determinism
//!
//! Evaluation is partitioned by entity and runs in parallel. Damage is
//! collected, sorted by `(entity, kind)`, and only then dispatched.

use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::{debug, trace, warn};

use crate::arena::{Arena, EntityQuery};
use crate::entity::{CharacterComponents, EntityId};
use crate::error::{DecayError, Result};
use crate::hook::HookRegistry;
use crate::resource::{settle_decay, ResourceKind, ResourceState, ThresholdEvaluator};
use crate::sink::{DamageCause, DamageEvent, DamageSink};

// =============================================================================
// Gate Mode
// =============================================================================

/// Where the damage gate timestamp lives.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GateMode {
    /// One gate per resource state.
    #[default]
    PerEntity,
    /// One gate on the world driver.
    Global,
}

impl GateMode {
    /// Interval used when the configuration does not set one.
    #[must_use]
    pub const fn default_interval_ms(self) -> u64 {
        match self {
            Self::PerEntity => 30_000,
            Self::Global => 3_000,
        }
    }
}

// =============================================================================
// Tick Report
// =============================================================================

/// Outcome of one scheduler run.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct TickReport {
    /// The single `now` used for the whole run.
    pub now: u64,
    /// Number of states evaluated.
    pub evaluated: usize,
    /// Damage dispatched, in dispatch order.
    pub damage: Vec<DamageEvent>,
}

// =============================================================================
// Scheduler
// =============================================================================

/// Gates and dispatches periodic starvation damage.
#[derive(Debug, Clone)]
pub struct DamageScheduler {
    mode: GateMode,
    interval_ms: u64,
    /// World driver holding the global gate.
    driver: Option<EntityId>,
    /// Global gate used while no driver exists.
    fallback_gate: Option<u64>,
    /// Last global gate seen, carried over when the driver disappears.
    last_gate: Option<u64>,
    warned_missing_driver: bool,
}

impl DamageScheduler {
    /// Creates a scheduler. A zero interval is raised to one millisecond.
    #[must_use]
    pub fn new(mode: GateMode, interval_ms: u64) -> Self {
        Self {
            mode,
            interval_ms: interval_ms.max(1),
            driver: None,
            fallback_gate: None,
            last_gate: None,
            warned_missing_driver: false,
        }
    }

    /// Gate mode.
    #[must_use]
    pub const fn mode(&self) -> GateMode {
        self.mode
    }

    /// Evaluation interval in milliseconds.
    #[must_use]
    pub const fn interval_ms(&self) -> u64 {
        self.interval_ms
    }

    /// World driver currently anchoring the global gate.
    #[must_use]
    pub const fn driver(&self) -> Option<EntityId> {
        self.driver
    }

    /// First gate for a state attached at `now`.
    #[must_use]
    pub const fn initial_gate(&self, now: u64) -> u64 {
        now.saturating_add(self.interval_ms)
    }

    /// Finds the world driver and anchors the global gate.
    ///
    /// Only meaningful in [`GateMode::Global`]. With several drivers the
    /// lowest ID wins and the rest are ignored. With none, the scheduler
    /// keeps the gate itself until a driver appears.
    pub fn attach(&mut self, arena: &mut Arena, now: u64) -> Option<EntityId> {
        if self.mode != GateMode::Global {
            return None;
        }

        let drivers = arena.world_drivers();
        let Some((&first, ignored)) = drivers.split_first() else {
            if !self.warned_missing_driver {
                warn!(now, "no world driver found, scheduler keeps the global gate itself");
                self.warned_missing_driver = true;
            }
            let pending = self.last_gate.unwrap_or_else(|| self.initial_gate(now));
            self.driver = None;
            self.fallback_gate.get_or_insert(pending);
            return None;
        };

        if !ignored.is_empty() {
            warn!(driver = %first, ?ignored, "multiple world drivers found, using the first");
        }

        let carried = self.fallback_gate.take().or(self.last_gate);
        let initial = self.initial_gate(now);
        if let Some(driver) = arena.get_mut(first).and_then(|e| e.as_driver_mut()) {
            let gate = *driver.next_tick.get_or_insert(carried.unwrap_or(initial));
            self.last_gate = Some(gate);
            debug!(driver = %first, gate, "world driver attached");
        }
        self.driver = Some(first);
        self.warned_missing_driver = false;
        Some(first)
    }

    /// Earliest time a run would evaluate anything.
    ///
    /// `None` when nothing is scheduled: per-entity mode with no tracked
    /// states, or global mode before [`attach`](Self::attach).
    #[must_use]
    pub fn next_gate(&self, arena: &Arena) -> Option<u64> {
        match self.mode {
            GateMode::Global => self.global_gate(arena),
            GateMode::PerEntity => arena
                .entities_with_resource_state()
                .into_iter()
                .filter_map(|id| arena.character(id))
                .flat_map(CharacterComponents::resources)
                .map(ResourceState::next_damage_tick)
                .min(),
        }
    }

    /// Runs the scheduler at `now`.
    ///
    /// # Errors
    ///
    /// [`DecayError::ClockRegression`] if any tracked state was committed
    /// after `now`. Nothing is mutated and nothing is dispatched in that case.
    pub fn run(
        &mut self,
        now: u64,
        arena: &mut Arena,
        hooks: &HookRegistry,
        evaluator: &ThresholdEvaluator,
        sink: &dyn DamageSink,
    ) -> Result<TickReport> {
        check_clock(arena, now)?;

        let (evaluated, mut damage) = match self.mode {
            GateMode::PerEntity => self.evaluate(now, arena, hooks, evaluator, true)?,
            GateMode::Global => {
                let gate = self.resolve_global_gate(arena, now);
                if now < gate {
                    trace!(now, gate, "global gate closed");
                    return Ok(TickReport {
                        now,
                        ..TickReport::default()
                    });
                }
                let outcome = self.evaluate(now, arena, hooks, evaluator, false)?;
                self.store_global_gate(arena, advance_gate(gate, self.interval_ms, now));
                outcome
            }
        };

        damage.sort_by_key(|(kind, event)| (event.entity, *kind));
        let damage: Vec<DamageEvent> = damage.into_iter().map(|(_, event)| event).collect();
        for event in &damage {
            debug!(entity = %event.entity, amount = event.amount, cause = %event.cause, now, "dispatching damage");
            sink.apply_damage(event.entity, event.amount, event.cause);
        }

        Ok(TickReport {
            now,
            evaluated,
            damage,
        })
    }

    fn evaluate(
        &self,
        now: u64,
        arena: &mut Arena,
        hooks: &HookRegistry,
        evaluator: &ThresholdEvaluator,
        per_entity: bool,
    ) -> Result<(usize, Vec<(ResourceKind, DamageEvent)>)> {
        let interval = self.interval_ms;
        let per_character: Vec<(usize, Vec<(ResourceKind, DamageEvent)>)> = arena
            .par_characters_mut()
            .map(|(entity, character)| -> Result<(usize, Vec<_>)> {
                let mut evaluated = 0;
                let mut damage = Vec::new();
                for state in character.resources_mut() {
                    if per_entity && now < state.next_damage_tick {
                        continue;
                    }
                    evaluated += 1;
                    let event = evaluate_state(entity, state, now, hooks, evaluator)?;
                    if per_entity {
                        state.next_damage_tick = advance_gate(state.next_damage_tick, interval, now);
                    }
                    if let Some(event) = event {
                        damage.push((state.kind(), event));
                    }
                }
                Ok((evaluated, damage))
            })
            .collect::<Result<_>>()?;

        Ok(per_character
            .into_iter()
            .fold((0, Vec::new()), |(total, mut all), (evaluated, damage)| {
                all.extend(damage);
                (total + evaluated, all)
            }))
    }

    fn global_gate(&self, arena: &Arena) -> Option<u64> {
        self.driver
            .and_then(|id| arena.get(id))
            .and_then(|e| e.as_driver())
            .and_then(|d| d.next_tick)
            .or(self.fallback_gate)
    }

    fn resolve_global_gate(&mut self, arena: &mut Arena, now: u64) -> u64 {
        let driver_alive = self
            .driver
            .and_then(|id| arena.get(id))
            .is_some_and(|e| e.is_world_driver());
        if !driver_alive {
            self.attach(arena, now);
        }
        self.global_gate(arena)
            .unwrap_or_else(|| self.initial_gate(now))
    }

    fn store_global_gate(&mut self, arena: &mut Arena, gate: u64) {
        let driver = self
            .driver
            .and_then(|id| arena.get_mut(id))
            .and_then(|e| e.as_driver_mut());
        self.last_gate = Some(gate);
        match driver {
            Some(driver) => driver.next_tick = Some(gate),
            None => self.fallback_gate = Some(gate),
        }
    }
}

fn check_clock(arena: &Arena, now: u64) -> Result<()> {
    let stale = arena
        .entities_with_resource_state()
        .into_iter()
        .filter_map(|id| arena.character(id))
        .flat_map(CharacterComponents::resources)
        .map(ResourceState::last_calculation_time)
        .find(|&last| last > now);
    match stale {
        Some(last) => Err(DecayError::ClockRegression { now, last }),
        None => Ok(()),
    }
}

fn evaluate_state(
    entity: EntityId,
    state: &mut ResourceState,
    now: u64,
    hooks: &HookRegistry,
    evaluator: &ThresholdEvaluator,
) -> Result<Option<DamageEvent>> {
    let kind = state.kind();
    let settled = settle_decay(state, now, |expected| hooks.adjust(entity, kind, expected))?;
    if !evaluator.is_starving(state, settled.value) || state.damage_amount() <= 0.0 {
        return Ok(None);
    }
    Ok(Some(DamageEvent {
        entity,
        amount: state.damage_amount(),
        cause: DamageCause::from(kind),
        at: now,
    }))
}

/// Moves `gate` forward by whole intervals until it lies after `now`.
fn advance_gate(gate: u64, interval: u64, now: u64) -> u64 {
    if gate > now {
        return gate;
    }
    let missed = (now - gate) / interval + 1;
    gate.saturating_add(missed.saturating_mul(interval))
}
