//! Health regeneration gating.
//!
//! Low food or water suppresses the passive base regeneration channel only.
//! Healing from any other channel (potions, abilities) is never blocked here.

use serde::{Deserialize, Serialize};

use crate::entity::EntityId;

/// Identifies a source of healing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct HealChannel(u32);

impl HealChannel {
    /// Passive base regeneration.
    pub const BASE: Self = Self(0);

    /// Creates a channel id.
    #[must_use]
    pub const fn new(id: u32) -> Self {
        Self(id)
    }

    /// Raw channel id.
    #[must_use]
    pub const fn id(self) -> u32 {
        self.0
    }
}

/// Answers whether healing may proceed for an entity.
pub trait RegenGate {
    /// True when base regeneration must be suppressed for `entity`.
    fn should_block_base_regen(&self, entity: EntityId) -> bool;

    /// True when healing through `channel` must be suppressed.
    fn should_block_heal(&self, entity: EntityId, channel: HealChannel) -> bool {
        channel == HealChannel::BASE && self.should_block_base_regen(entity)
    }
}
