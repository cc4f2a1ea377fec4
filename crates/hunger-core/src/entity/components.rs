//! Component structs for each entity type.

use serde::{Deserialize, Serialize};

use crate::resource::{ResourceKind, ResourceState};

/// How a character is currently moving.
///
/// Only matters for resources with a sprint profile, whose decay rate follows
/// the mode.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MovementMode {
    /// Walking or standing.
    #[default]
    Normal,
    /// Sprinting.
    Sprinting,
}

impl MovementMode {
    /// True while sprinting.
    #[must_use]
    pub const fn is_sprinting(self) -> bool {
        matches!(self, Self::Sprinting)
    }
}

/// Components for character entities.
///
/// A character holds at most one state per [`ResourceKind`]. A missing state
/// means the feature is absent for this character.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CharacterComponents {
    /// Food.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hunger: Option<ResourceState>,
    /// Water.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub thirst: Option<ResourceState>,
    /// Current movement mode.
    #[serde(default)]
    pub movement: MovementMode,
}

impl CharacterComponents {
    /// The state for `kind`, if present.
    #[must_use]
    pub const fn resource(&self, kind: ResourceKind) -> Option<&ResourceState> {
        match kind {
            ResourceKind::Hunger => self.hunger.as_ref(),
            ResourceKind::Thirst => self.thirst.as_ref(),
        }
    }

    /// Mutable state for `kind`, if present.
    #[must_use]
    pub fn resource_mut(&mut self, kind: ResourceKind) -> Option<&mut ResourceState> {
        match kind {
            ResourceKind::Hunger => self.hunger.as_mut(),
            ResourceKind::Thirst => self.thirst.as_mut(),
        }
    }

    /// The slot for `kind`, for spawning or replacing a state.
    pub fn slot_mut(&mut self, kind: ResourceKind) -> &mut Option<ResourceState> {
        match kind {
            ResourceKind::Hunger => &mut self.hunger,
            ResourceKind::Thirst => &mut self.thirst,
        }
    }

    /// All present states, hunger first.
    pub fn resources(&self) -> impl Iterator<Item = &ResourceState> + '_ {
        self.hunger.iter().chain(self.thirst.iter())
    }

    /// All present states, mutably, hunger first.
    pub fn resources_mut(&mut self) -> impl Iterator<Item = &mut ResourceState> + '_ {
        self.hunger.iter_mut().chain(self.thirst.iter_mut())
    }

    /// True if the character tracks any resource.
    #[must_use]
    pub const fn has_resources(&self) -> bool {
        self.hunger.is_some() || self.thirst.is_some()
    }
}

/// Components for the world driver.
///
/// `next_tick` is the global damage gate. It stays `None` until the scheduler
/// anchors it.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DriverComponents {
    /// Earliest time the global gate opens.
    pub next_tick: Option<u64>,
}
