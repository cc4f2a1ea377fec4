//! # Hunger Core
//!
//! Lazily decaying consumable resources (hunger, thirst) and the gameplay
//! effects they drive.
//!
//! A resource's value is never ticked down. Each state stores the value it
//! had at its last commit plus a decay rate, and the current value is
//! rebuilt on demand. Every discrete event (eating, respawning, a rate
//! change, deactivation) commits the rebuilt value before it changes
//! anything, so decay is never lost or applied twice.
//!
//! ## Architecture
//!
//! - **Resource**: state, reconstruction, the commit-based mutator, threshold
//!   predicates, and the versioned persisted schema
//! - **Scheduler**: the periodic damage gate, per entity or on a world driver
//! - **System**: owns the arena and clock and dispatches lifecycle messages
//! - **Collaborators**: [`clock::Clock`], [`sink::DamageSink`],
//!   [`regen::RegenGate`], [`hook::ModifierHook`]
//!
//! ## Usage
//!
//! ```rust
//! use std::sync::Arc;
//! use hunger_core::{EngineConfig, ManualClock, ResourceKind, ResourceSystem};
//!
//! let clock = Arc::new(ManualClock::new(0));
//! let mut system = ResourceSystem::new(Arc::clone(&clock), EngineConfig::default());
//! let player = system.spawn_character()?;
//!
//! clock.advance(100_000);
//! assert_eq!(system.current_value(player, ResourceKind::Hunger)?, Some(99.0));
//! # Ok::<(), hunger_core::DecayError>(())
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

pub mod arena;
pub mod clock;
pub mod commands;
pub mod config;
pub mod consumable;
pub mod entity;
pub mod error;
pub mod event;
pub mod hook;
pub mod regen;
pub mod resource;
pub mod scheduler;
pub mod sink;
pub mod system;

pub use arena::{Arena, EntityQuery};
pub use clock::{Clock, ManualClock};
pub use commands::{Bound, CapacityOutcome, SetValueOutcome, ShowReport};
pub use config::{ConfigError, EngineConfig};
pub use consumable::{ConsumableComponents, ItemDisposition, UsePolicy};
pub use entity::{Entity, EntityId, EntityTag, MovementMode};
pub use error::{DecayError, Result};
pub use event::{Message, MessageKind, Response};
pub use hook::{DecayModifier, HookRegistry, ModifierHook};
pub use regen::{HealChannel, RegenGate};
pub use resource::{ResourceFlags, ResourceKind, ResourceState, ThresholdPolicy};
pub use scheduler::{DamageScheduler, GateMode, TickReport};
pub use sink::{DamageCause, DamageEvent, DamageLog, DamageSink, NullSink};
pub use system::{ResourceStatus, ResourceSystem};

#[cfg(test)]
mod tests;
