//! The resource system: one owner for entities, clock and scheduler.
//!
//! `ResourceSystem` is what a host embeds. It reads the clock exactly once
//! per public operation and threads that single `now` through every
//! reconstruct and commit the operation performs, so no operation can ever
//! observe two different instants.
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//! use hunger_core::clock::ManualClock;
//! use hunger_core::config::EngineConfig;
//! use hunger_core::consumable::{ConsumableComponents, UsePolicy};
//! use hunger_core::event::{Message, Response};
//! use hunger_core::resource::ResourceKind;
//! use hunger_core::sink::DamageLog;
//! use hunger_core::system::ResourceSystem;
//!
//! let clock = Arc::new(ManualClock::new(0));
//! let mut system = ResourceSystem::new(Arc::clone(&clock), EngineConfig::default());
//!
//! let player = system.spawn_character().unwrap();
//! let bread = system.spawn_consumable(ConsumableComponents::new(
//!     ResourceKind::Hunger,
//!     20.0,
//!     UsePolicy::Reusable,
//! ));
//!
//! clock.advance(600_000);
//! let value = system.current_value(player, ResourceKind::Hunger).unwrap();
//! assert_eq!(value, Some(94.0));
//!
//! let response = system.handle(Message::Consumed { entity: player, item: bread }).unwrap();
//! assert!(matches!(response, Response::Consumed { value, .. } if value == 100.0));
//!
//! let report = system.tick(&DamageLog::new()).unwrap();
//! assert!(report.damage.is_empty());
//! ```

use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::arena::Arena;
use crate::clock::Clock;
use crate::config::EngineConfig;
use crate::consumable::{ConsumableComponents, ItemDisposition};
use crate::entity::{
    CharacterComponents, DriverComponents, Entity, EntityId, EntityInner, MovementMode,
};
use crate::error::{DecayError, Result};
use crate::event::{Message, Response};
use crate::hook::{HookRegistry, ModifierHook};
use crate::regen::RegenGate;
use crate::resource::{
    change_rate, consume, freeze, rebase, reconstruct, reset_full, validate_rate, ResourceFlags,
    ResourceKind, ResourceState, ThresholdEvaluator, VersionedResource,
};
use crate::scheduler::{DamageScheduler, TickReport};
use crate::sink::DamageSink;

// =============================================================================
// Status
// =============================================================================

/// Snapshot of one resource for presentation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ResourceStatus {
    /// Which resource.
    pub kind: ResourceKind,
    /// Reconstructed value.
    pub value: f32,
    /// Capacity.
    pub capacity: f32,
    /// Tripped gates.
    pub flags: ResourceFlags,
}

// =============================================================================
// Resource System
// =============================================================================

/// Owns the arena, the clock and everything that acts on resource states.
pub struct ResourceSystem<C: Clock> {
    arena: Arena,
    clock: C,
    config: EngineConfig,
    evaluator: ThresholdEvaluator,
    hooks: HookRegistry,
    scheduler: DamageScheduler,
}

impl<C: Clock> fmt::Debug for ResourceSystem<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ResourceSystem")
            .field("entities", &self.arena.entity_count())
            .field("evaluator", &self.evaluator)
            .field("hooks", &self.hooks)
            .field("scheduler", &self.scheduler)
            .finish_non_exhaustive()
    }
}

impl<C: Clock> ResourceSystem<C> {
    /// Creates an empty system.
    ///
    /// In global gate mode the scheduler anchors its gate one interval after
    /// construction and holds it until
    /// [`spawn_world_driver`](Self::spawn_world_driver) hands it to a driver.
    #[must_use]
    pub fn new(clock: C, config: EngineConfig) -> Self {
        let evaluator = ThresholdEvaluator::new(config.scheduler.threshold_policy);
        let scheduler = DamageScheduler::new(config.scheduler.gate, config.scheduler.interval_ms());
        info!(
            gate = ?config.scheduler.gate,
            interval_ms = scheduler.interval_ms(),
            policy = ?evaluator.policy(),
            thirst = config.thirst.enabled,
            "resource system created"
        );
        let mut system = Self {
            arena: Arena::new(),
            clock,
            config,
            evaluator,
            hooks: HookRegistry::new(),
            scheduler,
        };
        let now = system.clock.now_ms();
        system.scheduler.attach(&mut system.arena, now);
        system
    }

    /// Entity storage, read-only.
    #[must_use]
    pub const fn arena(&self) -> &Arena {
        &self.arena
    }

    /// The clock.
    #[must_use]
    pub const fn clock(&self) -> &C {
        &self.clock
    }

    /// Active configuration.
    #[must_use]
    pub const fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// The damage scheduler.
    #[must_use]
    pub const fn scheduler(&self) -> &DamageScheduler {
        &self.scheduler
    }

    /// The threshold evaluator.
    #[must_use]
    pub const fn evaluator(&self) -> &ThresholdEvaluator {
        &self.evaluator
    }

    /// Appends a decay modifier hook to the chain.
    pub fn register_hook(&mut self, hook: Arc<dyn ModifierHook>) {
        self.hooks.register(hook);
    }

    // -------------------------------------------------------------------------
    // Spawning
    // -------------------------------------------------------------------------

    /// Spawns a character and runs its first-spawn handler.
    ///
    /// # Errors
    ///
    /// Never in practice: a fresh character has no states to regress.
    pub fn spawn_character(&mut self) -> Result<EntityId> {
        let id = self
            .arena
            .spawn(EntityInner::Character(CharacterComponents::default()));
        self.handle(Message::Spawned { entity: id })?;
        Ok(id)
    }

    /// Spawns a character from persisted records, migrating legacy ones.
    ///
    /// Records resume from their stored value at the current time, the same
    /// as a [`restore`](Self::restore), and each damage gate is set one
    /// interval ahead. A later record of the same kind replaces an earlier
    /// one.
    ///
    /// # Errors
    ///
    /// [`DecayError::ClockRegression`] if a record was committed after the
    /// current time. Nothing is spawned in that case.
    pub fn load_character(
        &mut self,
        records: impl IntoIterator<Item = VersionedResource>,
    ) -> Result<EntityId> {
        let now = self.clock.now_ms();
        let gate = self.scheduler.initial_gate(now);
        let mut character = CharacterComponents::default();
        for record in records {
            let mut state = record.into_current(now, &self.config);
            rebase(&mut state, now)?;
            let kind = state.kind();
            *character.slot_mut(kind) = Some(state.with_next_damage_tick(gate));
        }
        let id = self.arena.spawn(EntityInner::Character(character));
        debug!(entity = %id, now, "character loaded from records");
        Ok(id)
    }

    /// Spawns a world driver and attaches the scheduler to it.
    pub fn spawn_world_driver(&mut self) -> EntityId {
        let now = self.clock.now_ms();
        let id = self
            .arena
            .spawn(EntityInner::WorldDriver(DriverComponents::default()));
        self.scheduler.attach(&mut self.arena, now);
        id
    }

    /// Spawns a consumable item.
    pub fn spawn_consumable(&mut self, item: ConsumableComponents) -> EntityId {
        self.arena.spawn(EntityInner::Consumable(item))
    }

    /// Brings a deactivated entity back.
    ///
    /// Resource states resume from the value committed at deactivation; the
    /// time spent away does not decay them.
    ///
    /// # Errors
    ///
    /// [`DecayError::ClockRegression`] if any state was committed after the
    /// current time. The entity is not restored in that case.
    pub fn restore(&mut self, mut entity: Entity) -> Result<EntityId> {
        let now = self.clock.now_ms();
        if let Some(character) = entity.as_character_mut() {
            check_states(character, now)?;
            for state in character.resources_mut() {
                rebase(state, now)?;
            }
        }
        let id = entity.id();
        if self.arena.restore(entity).is_some() {
            warn!(entity = %id, "restored entity replaced a live one");
        }
        if self.arena.get(id).is_some_and(Entity::is_world_driver) {
            self.scheduler.attach(&mut self.arena, now);
        }
        debug!(entity = %id, now, "entity restored");
        Ok(id)
    }

    // -------------------------------------------------------------------------
    // Messages
    // -------------------------------------------------------------------------

    /// Dispatches a lifecycle message.
    ///
    /// # Errors
    ///
    /// - [`DecayError::ClockRegression`] if a touched state was committed
    ///   after the current time
    /// - [`DecayError::UnknownEntity`] / [`DecayError::NotConsumable`] if a
    ///   consumption names a bad item
    /// - [`DecayError::NegativeFilling`] / [`DecayError::InvalidRate`] for
    ///   malformed payloads
    ///
    /// No state changes when an error is returned.
    pub fn handle(&mut self, message: Message) -> Result<Response> {
        let now = self.clock.now_ms();
        debug!(kind = %message.kind(), entity = %message.entity(), now, "handling message");
        match message {
            Message::Spawned { entity } => self.on_spawned(entity, now),
            Message::Consumed { entity, item } => self.on_consumed(entity, item, now),
            Message::Deactivated { entity } => self.on_deactivated(entity, now),
            Message::MovementChanged { entity, mode } => self.on_movement_changed(entity, mode, now),
            Message::DecayRateChanged { entity, kind, rate } => {
                self.on_rate_changed(entity, kind, rate, now)
            }
        }
    }

    fn on_spawned(&mut self, entity: EntityId, now: u64) -> Result<Response> {
        let gate = self.scheduler.initial_gate(now);
        let config = &self.config;
        let Some(character) = self.arena.character_mut(entity) else {
            return Ok(Response::Ignored);
        };
        check_states(character, now)?;
        check_sprint_rates(character, false)?;

        character.movement = MovementMode::Normal;
        let mut first_spawn = false;
        for kind in ResourceKind::ALL {
            if let Some(state) = character.resource_mut(kind) {
                reset_full(state, now)?;
                if let Some(sprint) = state.sprint().copied() {
                    change_rate(state, now, sprint.normal_rate)?;
                }
                state.next_damage_tick = gate;
            } else if let Some(state) = config.new_state(kind, now) {
                *character.slot_mut(kind) = Some(state.with_next_damage_tick(gate));
                first_spawn = true;
            }
        }
        debug!(%entity, now, first_spawn, "character spawned");
        Ok(Response::Spawned { first_spawn })
    }

    fn on_consumed(&mut self, entity: EntityId, item: EntityId, now: u64) -> Result<Response> {
        let (kind, filling) = match self.arena.get(item) {
            None => return Err(DecayError::UnknownEntity { entity: item }),
            Some(e) => match e.as_consumable() {
                Some(c) => (c.restores, c.filling),
                None => return Err(DecayError::NotConsumable { item }),
            },
        };
        let Some(state) = self
            .arena
            .character_mut(entity)
            .and_then(|c| c.resource_mut(kind))
        else {
            return Ok(Response::Ignored);
        };

        let value = consume(state, now, filling)?;
        let disposition = self
            .arena
            .get_mut(item)
            .and_then(Entity::as_consumable_mut)
            .map_or(ItemDisposition::Destroy, ConsumableComponents::after_use);
        if disposition == ItemDisposition::Destroy {
            self.arena.despawn(item);
        }
        debug!(%entity, %item, %kind, filling, value, ?disposition, "consumed item");
        Ok(Response::Consumed {
            kind,
            value,
            disposition,
        })
    }

    fn on_deactivated(&mut self, entity: EntityId, now: u64) -> Result<Response> {
        let Some(target) = self.arena.get_mut(entity) else {
            return Ok(Response::Ignored);
        };
        if let Some(character) = target.as_character_mut() {
            check_states(character, now)?;
            for state in character.resources_mut() {
                freeze(state, now)?;
            }
        }
        let Some(removed) = self.arena.despawn(entity) else {
            return Ok(Response::Ignored);
        };
        debug!(%entity, now, tag = %removed.tag(), "entity deactivated");
        Ok(Response::Deactivated(removed))
    }

    fn on_movement_changed(
        &mut self,
        entity: EntityId,
        mode: MovementMode,
        now: u64,
    ) -> Result<Response> {
        let Some(character) = self.arena.character_mut(entity) else {
            return Ok(Response::Ignored);
        };
        check_states(character, now)?;
        check_sprint_rates(character, mode.is_sprinting())?;

        character.movement = mode;
        let mut rate_changed = false;
        for state in character.resources_mut() {
            if let Some(sprint) = state.sprint().copied() {
                rate_changed |= change_rate(state, now, sprint.rate_for(mode.is_sprinting()))?;
            }
        }
        Ok(Response::MovementChanged { rate_changed })
    }

    fn on_rate_changed(
        &mut self,
        entity: EntityId,
        kind: ResourceKind,
        rate: f32,
        now: u64,
    ) -> Result<Response> {
        let Some(state) = self
            .arena
            .character_mut(entity)
            .and_then(|c| c.resource_mut(kind))
        else {
            return Ok(Response::Ignored);
        };
        let changed = change_rate(state, now, rate)?;
        Ok(Response::RateChanged { changed })
    }

    // -------------------------------------------------------------------------
    // Scheduler
    // -------------------------------------------------------------------------

    /// Runs the damage scheduler at the current time.
    ///
    /// # Errors
    ///
    /// [`DecayError::ClockRegression`] if any tracked state was committed
    /// after the current time; nothing is mutated or dispatched.
    pub fn tick(&mut self, sink: &dyn DamageSink) -> Result<TickReport> {
        let now = self.clock.now_ms();
        self.scheduler
            .run(now, &mut self.arena, &self.hooks, &self.evaluator, sink)
    }

    /// Earliest time a [`tick`](Self::tick) would do anything.
    #[must_use]
    pub fn next_gate(&self) -> Option<u64> {
        self.scheduler.next_gate(&self.arena)
    }

    // -------------------------------------------------------------------------
    // Queries
    // -------------------------------------------------------------------------

    /// The stored state for `kind`, if the entity has one.
    #[must_use]
    pub fn state(&self, entity: EntityId, kind: ResourceKind) -> Option<&ResourceState> {
        self.arena.character(entity).and_then(|c| c.resource(kind))
    }

    pub(crate) fn state_mut(
        &mut self,
        entity: EntityId,
        kind: ResourceKind,
    ) -> Option<&mut ResourceState> {
        self.arena
            .character_mut(entity)
            .and_then(|c| c.resource_mut(kind))
    }

    /// Value of `kind` as of now, or `None` if the entity has no such state.
    ///
    /// # Errors
    ///
    /// [`DecayError::ClockRegression`] if the state was committed after now.
    pub fn current_value(&self, entity: EntityId, kind: ResourceKind) -> Result<Option<f32>> {
        let now = self.clock.now_ms();
        self.state(entity, kind)
            .map(|state| reconstruct(state, now))
            .transpose()
    }

    /// Capacity of `kind`, or `None` if the entity has no such state.
    #[must_use]
    pub fn capacity(&self, entity: EntityId, kind: ResourceKind) -> Option<f32> {
        self.state(entity, kind).map(ResourceState::capacity)
    }

    /// Value, capacity and tripped gates for every resource of `entity`.
    ///
    /// # Errors
    ///
    /// [`DecayError::ClockRegression`] if a state was committed after now.
    pub fn status(&self, entity: EntityId) -> Result<Vec<ResourceStatus>> {
        let now = self.clock.now_ms();
        let Some(character) = self.arena.character(entity) else {
            return Ok(Vec::new());
        };
        character
            .resources()
            .map(|state| {
                let value = reconstruct(state, now)?;
                Ok(ResourceStatus {
                    kind: state.kind(),
                    value,
                    capacity: state.capacity(),
                    flags: self.evaluator.flags(state, value),
                })
            })
            .collect()
    }

    /// True unless a resource with a sprint profile is below its sprint
    /// threshold. Characters without such a resource can always sprint.
    ///
    /// # Errors
    ///
    /// [`DecayError::ClockRegression`] if a state was committed after now.
    pub fn can_sprint(&self, entity: EntityId) -> Result<bool> {
        let now = self.clock.now_ms();
        let Some(character) = self.arena.character(entity) else {
            return Ok(true);
        };
        for state in character.resources().filter(|s| s.sprint().is_some()) {
            let value = reconstruct(state, now)?;
            if self.evaluator.is_sprint_blocked(state, value) {
                return Ok(false);
            }
        }
        Ok(true)
    }

    /// Reads the clock once. Used by operations split across modules.
    pub(crate) fn now(&self) -> u64 {
        self.clock.now_ms()
    }
}

impl<C: Clock> RegenGate for ResourceSystem<C> {
    fn should_block_base_regen(&self, entity: EntityId) -> bool {
        let now = self.clock.now_ms();
        let Some(character) = self.arena.character(entity) else {
            return false;
        };
        character.resources().any(|state| match reconstruct(state, now) {
            Ok(value) => self.evaluator.is_regen_blocked(state, value),
            Err(err) => {
                warn!(%entity, %err, "regen gate could not read resource, not blocking");
                false
            }
        })
    }
}

/// Rejects the operation up front if any state would regress, so multi-state
/// handlers never commit half their states.
fn check_states(character: &CharacterComponents, now: u64) -> Result<()> {
    match character
        .resources()
        .map(ResourceState::last_calculation_time)
        .find(|&last| last > now)
    {
        Some(last) => Err(DecayError::ClockRegression { now, last }),
        None => Ok(()),
    }
}

/// Rejects a movement switch whose target rate `change_rate` would refuse.
fn check_sprint_rates(character: &CharacterComponents, sprinting: bool) -> Result<()> {
    character
        .resources()
        .filter_map(ResourceState::sprint)
        .try_for_each(|sprint| validate_rate(sprint.rate_for(sprinting)))
}
