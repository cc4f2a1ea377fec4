//! Food and drink items.
//!
//! The engine applies an item's filling to the activating character. What
//! happens to the item afterwards is the inventory's business; the engine
//! only reports an [`ItemDisposition`].

use serde::{Deserialize, Serialize};

use crate::resource::ResourceKind;

/// How an item behaves across uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "policy")]
pub enum UsePolicy {
    /// Never used up.
    Reusable,
    /// Used up after `charges` activations.
    ConsumedOnUse {
        /// Activations left, including the current one.
        charges: u32,
    },
}

impl Default for UsePolicy {
    fn default() -> Self {
        Self::ConsumedOnUse { charges: 1 }
    }
}

/// What the inventory should do with an item after a successful use.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ItemDisposition {
    /// Leave it alone.
    Keep,
    /// One charge was spent; the item stays.
    SpendCharge,
    /// Last charge spent; destroy the item.
    Destroy,
}

/// Components for consumable entities.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConsumableComponents {
    /// Which resource the item refills.
    pub restores: ResourceKind,
    /// Amount added on use.
    pub filling: f32,
    /// Charge policy.
    #[serde(default)]
    pub use_policy: UsePolicy,
}

impl ConsumableComponents {
    /// Creates a consumable.
    #[must_use]
    pub const fn new(restores: ResourceKind, filling: f32, use_policy: UsePolicy) -> Self {
        Self {
            restores,
            filling,
            use_policy,
        }
    }

    /// A two-bite item: the first use spends a charge, the second destroys it.
    #[must_use]
    pub const fn two_stage(restores: ResourceKind, filling: f32) -> Self {
        Self::new(restores, filling, UsePolicy::ConsumedOnUse { charges: 2 })
    }

    /// Records one successful use and returns what the inventory should do.
    ///
    /// A spent item keeps reporting [`ItemDisposition::Destroy`].
    pub fn after_use(&mut self) -> ItemDisposition {
        match &mut self.use_policy {
            UsePolicy::Reusable => ItemDisposition::Keep,
            UsePolicy::ConsumedOnUse { charges } => {
                *charges = charges.saturating_sub(1);
                if *charges == 0 {
                    ItemDisposition::Destroy
                } else {
                    ItemDisposition::SpendCharge
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reusable_item_is_kept() {
        let mut canteen = ConsumableComponents::new(ResourceKind::Thirst, 30.0, UsePolicy::Reusable);
        assert_eq!(canteen.after_use(), ItemDisposition::Keep);
        assert_eq!(canteen.after_use(), ItemDisposition::Keep);
    }

    #[test]
    fn two_stage_item_spends_then_destroys() {
        let mut apple = ConsumableComponents::two_stage(ResourceKind::Hunger, 10.0);
        assert_eq!(apple.after_use(), ItemDisposition::SpendCharge);
        assert_eq!(apple.after_use(), ItemDisposition::Destroy);
        assert_eq!(apple.after_use(), ItemDisposition::Destroy);
    }

    #[test]
    fn default_policy_is_single_use() {
        let json = r#"{"restores":"hunger","filling":5.0}"#;
        let mut bread: ConsumableComponents = serde_json::from_str(json).unwrap();
        assert_eq!(bread.use_policy, UsePolicy::ConsumedOnUse { charges: 1 });
        assert_eq!(bread.after_use(), ItemDisposition::Destroy);
    }
}
