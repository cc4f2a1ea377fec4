//! Entity storage.
//!
//! The Arena holds every entity the engine knows about:
//! - Storage with deterministic iteration order (`BTreeMap`)
//! - Entity lifecycle (spawn, restore, despawn)
//! - The [`EntityQuery`] view the scheduler uses to find tracked entities and
//!   the world driver
//!
//! Entity IDs are handed out monotonically. A despawned entity can be put
//! back with [`Arena::restore`] under its original ID, which is how
//! deactivated characters come back with their committed resource states.
//!
//! # Example
//!
//! ```
//! use hunger_core::arena::{Arena, EntityQuery};
//! use hunger_core::entity::{CharacterComponents, DriverComponents, EntityInner};
//!
//! let mut arena = Arena::new();
//! let player = arena.spawn(EntityInner::Character(CharacterComponents::default()));
//! let driver = arena.spawn(EntityInner::WorldDriver(DriverComponents::default()));
//!
//! assert_eq!(arena.world_drivers(), vec![driver]);
//! // No resource state attached yet.
//! assert!(arena.entities_with_resource_state().is_empty());
//! assert!(arena.get(player).is_some());
//! ```

use std::collections::BTreeMap;

use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::entity::{CharacterComponents, Entity, EntityId, EntityInner};

/// Read-only lookups the scheduler needs from entity storage.
///
/// Both lists come back in ascending ID order.
pub trait EntityQuery {
    /// Characters holding at least one resource state.
    fn entities_with_resource_state(&self) -> Vec<EntityId>;

    /// All world-driver entities. Normally exactly one.
    fn world_drivers(&self) -> Vec<EntityId>;
}

/// Container for all engine entities.
///
/// # Determinism
///
/// Iteration always follows ascending entity ID. The parallel iterator
/// visits entities in arbitrary order, so anything order-sensitive it
/// produces is sorted by ID afterwards.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Arena {
    /// Monotonically increasing entity ID counter.
    next_id: u64,
    /// Entity storage with deterministic iteration order.
    entities: BTreeMap<EntityId, Entity>,
}

impl Arena {
    /// Creates a new empty arena.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Spawns a new entity and returns its ID.
    pub fn spawn(&mut self, inner: EntityInner) -> EntityId {
        let id = EntityId::new(self.next_id);
        self.next_id += 1;
        self.entities.insert(id, Entity::new(id, inner));
        id
    }

    /// Puts a previously despawned entity back under its own ID.
    ///
    /// Returns whatever was stored under that ID before, which is `None`
    /// unless the caller reused a live ID.
    pub fn restore(&mut self, entity: Entity) -> Option<Entity> {
        let id = entity.id();
        self.next_id = self.next_id.max(id.as_u64() + 1);
        self.entities.insert(id, entity)
    }

    /// Removes an entity, returning it if it existed.
    pub fn despawn(&mut self, id: EntityId) -> Option<Entity> {
        self.entities.remove(&id)
    }

    /// Returns a reference to an entity by ID.
    #[must_use]
    pub fn get(&self, id: EntityId) -> Option<&Entity> {
        self.entities.get(&id)
    }

    /// Returns a mutable reference to an entity by ID.
    #[must_use]
    pub fn get_mut(&mut self, id: EntityId) -> Option<&mut Entity> {
        self.entities.get_mut(&id)
    }

    /// Character components of `id`, if it is a live character.
    #[must_use]
    pub fn character(&self, id: EntityId) -> Option<&CharacterComponents> {
        self.get(id).and_then(Entity::as_character)
    }

    /// Mutable character components of `id`, if it is a live character.
    #[must_use]
    pub fn character_mut(&mut self, id: EntityId) -> Option<&mut CharacterComponents> {
        self.get_mut(id).and_then(Entity::as_character_mut)
    }

    /// Returns an iterator over entity IDs in ascending order.
    pub fn entity_ids_sorted(&self) -> impl Iterator<Item = EntityId> + '_ {
        self.entities.keys().copied()
    }

    /// Returns an iterator over entities in ascending ID order.
    pub fn entities_sorted(&self) -> impl Iterator<Item = &Entity> + '_ {
        self.entities.values()
    }

    /// Parallel iterator over every character, mutably.
    ///
    /// Characters are independent, so evaluation partitioned this way needs
    /// no synchronisation.
    pub fn par_characters_mut(
        &mut self,
    ) -> impl ParallelIterator<Item = (EntityId, &mut CharacterComponents)> + '_ {
        self.entities
            .par_iter_mut()
            .filter_map(|(id, entity)| entity.as_character_mut().map(|c| (*id, c)))
    }

    /// Returns the number of entities in the arena.
    #[must_use]
    pub fn entity_count(&self) -> usize {
        self.entities.len()
    }

    /// Returns true if the arena has no entities.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }
}

impl EntityQuery for Arena {
    fn entities_with_resource_state(&self) -> Vec<EntityId> {
        self.entities_sorted()
            .filter(|e| e.as_character().is_some_and(CharacterComponents::has_resources))
            .map(Entity::id)
            .collect()
    }

    fn world_drivers(&self) -> Vec<EntityId> {
        self.entities_sorted()
            .filter(|e| e.is_world_driver())
            .map(Entity::id)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entity::DriverComponents;
    use crate::resource::{ResourceKind, ResourceState};

    fn character() -> EntityInner {
        EntityInner::Character(CharacterComponents::default())
    }

    fn fed_character() -> EntityInner {
        EntityInner::Character(CharacterComponents {
            hunger: Some(ResourceState::new(ResourceKind::Hunger, 100.0, 0.01, 0)),
            ..CharacterComponents::default()
        })
    }

    mod arena_tests {
        use super::*;

        #[test]
        fn new_creates_empty_arena() {
            let arena = Arena::new();
            assert!(arena.is_empty());
            assert_eq!(arena.entity_count(), 0);
        }

        #[test]
        fn spawn_creates_entity_with_sequential_ids() {
            let mut arena = Arena::new();

            let id1 = arena.spawn(character());
            let id2 = arena.spawn(character());
            let id3 = arena.spawn(character());

            assert_eq!(id1, EntityId::new(0));
            assert_eq!(id2, EntityId::new(1));
            assert_eq!(id3, EntityId::new(2));
            assert_eq!(arena.entity_count(), 3);
        }

        #[test]
        fn despawn_removes_entity() {
            let mut arena = Arena::new();
            let id = arena.spawn(character());

            assert!(arena.despawn(id).is_some());
            assert!(arena.get(id).is_none());
            assert!(arena.is_empty());
        }

        #[test]
        fn despawn_nonexistent_returns_none() {
            let mut arena = Arena::new();
            assert!(arena.despawn(EntityId::new(999)).is_none());
        }

        #[test]
        fn restore_keeps_id_and_components() {
            let mut arena = Arena::new();
            let id = arena.spawn(fed_character());
            let entity = arena.despawn(id).unwrap();

            assert!(arena.restore(entity.clone()).is_none());
            assert_eq!(arena.get(id), Some(&entity));
        }

        #[test]
        fn restore_does_not_collide_with_later_spawns() {
            let mut arena = Arena::new();
            arena.restore(Entity::new_character(EntityId::new(10)));

            let next = arena.spawn(character());
            assert_eq!(next, EntityId::new(11));
        }

        #[test]
        fn entity_ids_sorted_after_despawn() {
            let mut arena = Arena::new();
            let id0 = arena.spawn(character());
            let id1 = arena.spawn(character());
            let id2 = arena.spawn(character());

            arena.despawn(id1);

            let ids: Vec<_> = arena.entity_ids_sorted().collect();
            assert_eq!(ids, vec![id0, id2]);
        }

        #[test]
        fn character_accessor_skips_other_kinds() {
            let mut arena = Arena::new();
            let driver = arena.spawn(EntityInner::WorldDriver(DriverComponents::default()));
            let player = arena.spawn(character());

            assert!(arena.character(driver).is_none());
            assert!(arena.character_mut(player).is_some());
        }
    }

    mod query_tests {
        use super::*;

        #[test]
        fn only_characters_with_state_are_tracked() {
            let mut arena = Arena::new();
            arena.spawn(character());
            let fed = arena.spawn(fed_character());
            arena.spawn(EntityInner::WorldDriver(DriverComponents::default()));

            assert_eq!(arena.entities_with_resource_state(), vec![fed]);
        }

        #[test]
        fn world_drivers_in_id_order() {
            let mut arena = Arena::new();
            let first = arena.spawn(EntityInner::WorldDriver(DriverComponents::default()));
            arena.spawn(character());
            let second = arena.spawn(EntityInner::WorldDriver(DriverComponents::default()));

            assert_eq!(arena.world_drivers(), vec![first, second]);
        }

        #[test]
        fn empty_arena_queries_are_empty() {
            let arena = Arena::new();
            assert!(arena.entities_with_resource_state().is_empty());
            assert!(arena.world_drivers().is_empty());
        }
    }

    #[test]
    fn par_characters_mut_visits_every_character() {
        let mut arena = Arena::new();
        for _ in 0..64 {
            arena.spawn(fed_character());
        }
        arena.spawn(EntityInner::WorldDriver(DriverComponents::default()));

        let mut seen: Vec<EntityId> = arena.par_characters_mut().map(|(id, _)| id).collect();
        seen.sort();

        assert_eq!(seen.len(), 64);
        assert_eq!(seen.first(), Some(&EntityId::new(0)));
        assert_eq!(seen.last(), Some(&EntityId::new(63)));
    }
}
