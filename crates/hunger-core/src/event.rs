//! Lifecycle messages and their responses.
//!
//! Hosts report gameplay events as [`Message`]s. Each message carries the
//! entity it concerns plus a fixed payload, and
//! [`ResourceSystem::handle`](crate::system::ResourceSystem::handle)
//! dispatches on its [`MessageKind`]. The only ordering guarantee between
//! handlers is that a deactivation commits every state before the entity is
//! removed.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::consumable::ItemDisposition;
use crate::entity::{Entity, EntityId, MovementMode};
use crate::resource::ResourceKind;

/// A gameplay event the engine reacts to.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Message {
    /// A character spawned or respawned.
    Spawned {
        /// The character.
        entity: EntityId,
    },
    /// A character used a consumable item.
    Consumed {
        /// The character eating or drinking.
        entity: EntityId,
        /// The item entity.
        item: EntityId,
    },
    /// An entity is leaving the simulation.
    Deactivated {
        /// The departing entity.
        entity: EntityId,
    },
    /// A character switched movement mode.
    MovementChanged {
        /// The character.
        entity: EntityId,
        /// New mode.
        mode: MovementMode,
    },
    /// Something outside the engine changed a decay rate.
    DecayRateChanged {
        /// The character.
        entity: EntityId,
        /// Which resource.
        kind: ResourceKind,
        /// New rate in units per second.
        rate: f32,
    },
}

/// Tag of a [`Message`], used as its dispatch key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MessageKind {
    /// [`Message::Spawned`].
    Spawned,
    /// [`Message::Consumed`].
    Consumed,
    /// [`Message::Deactivated`].
    Deactivated,
    /// [`Message::MovementChanged`].
    MovementChanged,
    /// [`Message::DecayRateChanged`].
    DecayRateChanged,
}

impl fmt::Display for MessageKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Spawned => write!(f, "spawned"),
            Self::Consumed => write!(f, "consumed"),
            Self::Deactivated => write!(f, "deactivated"),
            Self::MovementChanged => write!(f, "movement_changed"),
            Self::DecayRateChanged => write!(f, "decay_rate_changed"),
        }
    }
}

impl Message {
    /// The message's dispatch key.
    #[must_use]
    pub const fn kind(&self) -> MessageKind {
        match self {
            Self::Spawned { .. } => MessageKind::Spawned,
            Self::Consumed { .. } => MessageKind::Consumed,
            Self::Deactivated { .. } => MessageKind::Deactivated,
            Self::MovementChanged { .. } => MessageKind::MovementChanged,
            Self::DecayRateChanged { .. } => MessageKind::DecayRateChanged,
        }
    }

    /// The entity the message concerns.
    #[must_use]
    pub const fn entity(&self) -> EntityId {
        match *self {
            Self::Spawned { entity }
            | Self::Consumed { entity, .. }
            | Self::Deactivated { entity }
            | Self::MovementChanged { entity, .. }
            | Self::DecayRateChanged { entity, .. } => entity,
        }
    }
}

/// What a handler did.
#[derive(Debug, Clone, PartialEq)]
pub enum Response {
    /// States were created (`first_spawn`) or reset to full.
    Spawned {
        /// True when at least one state was created rather than reset.
        first_spawn: bool,
    },
    /// A consumable was applied.
    Consumed {
        /// Resource that was refilled.
        kind: ResourceKind,
        /// Value after consumption.
        value: f32,
        /// What the inventory should do with the item.
        disposition: ItemDisposition,
    },
    /// The entity was removed after committing its states.
    ///
    /// Hand it back to
    /// [`ResourceSystem::restore`](crate::system::ResourceSystem::restore)
    /// to reactivate it.
    Deactivated(Entity),
    /// Movement mode was recorded.
    MovementChanged {
        /// True if any decay rate changed as a result.
        rate_changed: bool,
    },
    /// A decay rate change was processed.
    RateChanged {
        /// False if the new rate equalled the old one.
        changed: bool,
    },
    /// The entity is unknown or has no matching resource state.
    Ignored,
}
