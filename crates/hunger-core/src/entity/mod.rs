//! Entity types for the resource engine.
//!
//! - [`EntityId`]: unique identifier, ordered numerically
//! - [`EntityTag`]: what kind of entity this is
//! - [`EntityInner`]: type-safe storage for the entity's components
//! - [`Entity`]: the complete container
//!
//! Three kinds of entity take part in the engine. Characters hold resource
//! states, world drivers anchor the global damage gate, and consumables carry
//! a filling amount that is applied to whoever activates them.
//!
//! # Example
//!
//! ```
//! use hunger_core::entity::{Entity, EntityId, EntityTag};
//!
//! let player = Entity::new_character(EntityId::new(42));
//!
//! assert_eq!(player.id().as_u64(), 42);
//! assert_eq!(player.tag(), EntityTag::Character);
//! assert!(player.as_character().is_some());
//! ```

pub mod components;

use serde::{Deserialize, Serialize};
use std::fmt;

pub use components::{CharacterComponents, DriverComponents, MovementMode};

use crate::consumable::ConsumableComponents;

/// Unique identifier for an entity.
///
/// Entity IDs are ordered by their numeric value. Every pass that touches
/// more than one entity visits them in this order, and damage is dispatched
/// in it.
///
/// # Example
///
/// ```
/// use hunger_core::entity::EntityId;
///
/// let id1 = EntityId::new(1);
/// let id2 = EntityId::new(2);
///
/// assert!(id1 < id2);
/// assert_eq!(id1.as_u64(), 1);
/// ```
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct EntityId(u64);

impl EntityId {
    /// Creates a new `EntityId` from a raw `u64` value.
    #[must_use]
    pub const fn new(id: u64) -> Self {
        Self(id)
    }

    /// Returns the raw `u64` value of this identifier.
    #[must_use]
    pub const fn as_u64(self) -> u64 {
        self.0
    }
}

impl fmt::Debug for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "EntityId({})", self.0)
    }
}

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u64> for EntityId {
    fn from(id: u64) -> Self {
        Self::new(id)
    }
}

impl From<EntityId> for u64 {
    fn from(id: EntityId) -> Self {
        id.0
    }
}

/// Entity type tag.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EntityTag {
    /// A game-playing entity that eats, drinks and takes damage.
    Character,
    /// The singleton that anchors the global damage gate.
    WorldDriver,
    /// Food or drink.
    Consumable,
}

impl fmt::Display for EntityTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Character => write!(f, "Character"),
            Self::WorldDriver => write!(f, "WorldDriver"),
            Self::Consumable => write!(f, "Consumable"),
        }
    }
}

/// Type-safe storage for entity-specific components.
///
/// The variant always matches the entity's [`EntityTag`]; [`Entity`]
/// derives its tag from it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum EntityInner {
    /// Resource states and movement mode.
    Character(CharacterComponents),
    /// Global damage gate.
    WorldDriver(DriverComponents),
    /// Filling amount and use policy.
    Consumable(ConsumableComponents),
}

impl EntityInner {
    /// Returns the corresponding `EntityTag` for this inner storage.
    #[must_use]
    pub const fn tag(&self) -> EntityTag {
        match self {
            Self::Character(_) => EntityTag::Character,
            Self::WorldDriver(_) => EntityTag::WorldDriver,
            Self::Consumable(_) => EntityTag::Consumable,
        }
    }

    /// Returns the character components, if this is a character.
    #[must_use]
    pub const fn as_character(&self) -> Option<&CharacterComponents> {
        match self {
            Self::Character(components) => Some(components),
            _ => None,
        }
    }

    /// Returns mutable character components, if this is a character.
    #[must_use]
    pub fn as_character_mut(&mut self) -> Option<&mut CharacterComponents> {
        match self {
            Self::Character(components) => Some(components),
            _ => None,
        }
    }

    /// Returns the driver components, if this is a world driver.
    #[must_use]
    pub const fn as_driver(&self) -> Option<&DriverComponents> {
        match self {
            Self::WorldDriver(components) => Some(components),
            _ => None,
        }
    }

    /// Returns mutable driver components, if this is a world driver.
    #[must_use]
    pub fn as_driver_mut(&mut self) -> Option<&mut DriverComponents> {
        match self {
            Self::WorldDriver(components) => Some(components),
            _ => None,
        }
    }

    /// Returns the consumable components, if this is a consumable.
    #[must_use]
    pub const fn as_consumable(&self) -> Option<&ConsumableComponents> {
        match self {
            Self::Consumable(components) => Some(components),
            _ => None,
        }
    }

    /// Returns mutable consumable components, if this is a consumable.
    #[must_use]
    pub fn as_consumable_mut(&mut self) -> Option<&mut ConsumableComponents> {
        match self {
            Self::Consumable(components) => Some(components),
            _ => None,
        }
    }
}

/// A complete entity.
///
/// # Invariants
///
/// - The `EntityId` is unique within an arena
/// - The tag always matches the `EntityInner` variant
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Entity {
    id: EntityId,
    inner: EntityInner,
}

impl Entity {
    /// Creates an entity from its components.
    #[must_use]
    pub const fn new(id: EntityId, inner: EntityInner) -> Self {
        Self { id, inner }
    }

    /// Creates a character with no resource states yet.
    #[must_use]
    pub fn new_character(id: EntityId) -> Self {
        Self::new(id, EntityInner::Character(CharacterComponents::default()))
    }

    /// Creates a world driver whose gate has not been anchored.
    #[must_use]
    pub fn new_world_driver(id: EntityId) -> Self {
        Self::new(id, EntityInner::WorldDriver(DriverComponents::default()))
    }

    /// Returns the entity's unique identifier.
    #[must_use]
    pub const fn id(&self) -> EntityId {
        self.id
    }

    /// Returns the entity's type tag.
    #[must_use]
    pub const fn tag(&self) -> EntityTag {
        self.inner.tag()
    }

    /// Returns a reference to the entity's inner component storage.
    #[must_use]
    pub const fn inner(&self) -> &EntityInner {
        &self.inner
    }

    /// Returns a mutable reference to the entity's inner component storage.
    #[must_use]
    pub fn inner_mut(&mut self) -> &mut EntityInner {
        &mut self.inner
    }

    /// Returns `true` if this entity is a character.
    #[must_use]
    pub const fn is_character(&self) -> bool {
        matches!(self.inner, EntityInner::Character(_))
    }

    /// Returns `true` if this entity is a world driver.
    #[must_use]
    pub const fn is_world_driver(&self) -> bool {
        matches!(self.inner, EntityInner::WorldDriver(_))
    }

    /// Returns the character components if this is a character.
    #[must_use]
    pub const fn as_character(&self) -> Option<&CharacterComponents> {
        self.inner.as_character()
    }

    /// Returns mutable character components if this is a character.
    #[must_use]
    pub fn as_character_mut(&mut self) -> Option<&mut CharacterComponents> {
        self.inner.as_character_mut()
    }

    /// Returns the driver components if this is a world driver.
    #[must_use]
    pub const fn as_driver(&self) -> Option<&DriverComponents> {
        self.inner.as_driver()
    }

    /// Returns mutable driver components if this is a world driver.
    #[must_use]
    pub fn as_driver_mut(&mut self) -> Option<&mut DriverComponents> {
        self.inner.as_driver_mut()
    }

    /// Returns the consumable components if this is a consumable.
    #[must_use]
    pub const fn as_consumable(&self) -> Option<&ConsumableComponents> {
        self.inner.as_consumable()
    }

    /// Returns mutable consumable components if this is a consumable.
    #[must_use]
    pub fn as_consumable_mut(&mut self) -> Option<&mut ConsumableComponents> {
        self.inner.as_consumable_mut()
    }
}
