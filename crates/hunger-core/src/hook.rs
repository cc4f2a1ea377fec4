//! Decay modifier hooks.
//!
//! Each scheduler evaluation computes the decay a state's rate predicts since
//! its last commit, then offers that number to every registered
//! [`ModifierHook`] in registration order. Each hook receives the previous
//! hook's result. The scheduler applies the final value, not the prediction.
//!
//! Environmental effects (a hot biome, a buff that slows hunger) register a
//! hook; with no hooks registered the chain is the identity and settling is
//! indistinguishable from pure lazy decay.
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//! use hunger_core::entity::EntityId;
//! use hunger_core::hook::{DecayModifier, HookRegistry};
//! use hunger_core::resource::ResourceKind;
//!
//! let mut hooks = HookRegistry::new();
//! hooks.register(Arc::new(DecayModifier::scaled(2.0)));
//! hooks.register(Arc::new(|_: EntityId, _: ResourceKind, decay: f32| decay + 1.0));
//!
//! assert_eq!(hooks.adjust(EntityId::new(0), ResourceKind::Hunger, 3.0), 7.0);
//! ```

use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::entity::EntityId;
use crate::resource::ResourceKind;

/// Rewrites the decay about to be settled for one state.
pub trait ModifierHook: Send + Sync {
    /// Returns the decay to apply instead of `expected`.
    ///
    /// Negative results restore the resource; the commit still clamps to
    /// `[0, capacity]`.
    fn adjust_decay(&self, entity: EntityId, kind: ResourceKind, expected: f32) -> f32;
}

impl<F> ModifierHook for F
where
    F: Fn(EntityId, ResourceKind, f32) -> f32 + Send + Sync,
{
    fn adjust_decay(&self, entity: EntityId, kind: ResourceKind, expected: f32) -> f32 {
        self(entity, kind, expected)
    }
}

/// Accumulating modifier: `(expected + pre_add) * multiplier + post_add`.
///
/// Restricted to one resource kind when `only` is set.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DecayModifier {
    /// Added before scaling.
    #[serde(default)]
    pub pre_add: f32,
    /// Scale factor.
    #[serde(default = "one")]
    pub multiplier: f32,
    /// Added after scaling.
    #[serde(default)]
    pub post_add: f32,
    /// Kind this modifier applies to; all kinds when `None`.
    #[serde(default)]
    pub only: Option<ResourceKind>,
}

const fn one() -> f32 {
    1.0
}

impl DecayModifier {
    /// The identity modifier.
    #[must_use]
    pub const fn identity() -> Self {
        Self {
            pre_add: 0.0,
            multiplier: 1.0,
            post_add: 0.0,
            only: None,
        }
    }

    /// A pure scale factor.
    #[must_use]
    pub const fn scaled(multiplier: f32) -> Self {
        Self {
            multiplier,
            ..Self::identity()
        }
    }

    /// Restricts the modifier to one resource kind.
    #[must_use]
    pub const fn only(mut self, kind: ResourceKind) -> Self {
        self.only = Some(kind);
        self
    }

    /// Applies the accumulator to a decay amount.
    #[must_use]
    pub fn apply(&self, expected: f32) -> f32 {
        (expected + self.pre_add).mul_add(self.multiplier, self.post_add)
    }
}

impl Default for DecayModifier {
    fn default() -> Self {
        Self::identity()
    }
}

impl ModifierHook for DecayModifier {
    fn adjust_decay(&self, _entity: EntityId, kind: ResourceKind, expected: f32) -> f32 {
        match self.only {
            Some(only) if only != kind => expected,
            _ => self.apply(expected),
        }
    }
}

/// Ordered chain of hooks.
#[derive(Default, Clone)]
pub struct HookRegistry {
    hooks: Vec<Arc<dyn ModifierHook>>,
}

impl HookRegistry {
    /// Creates an empty chain.
    #[must_use]
    pub fn new() -> Self {
        Self { hooks: Vec::new() }
    }

    /// Appends a hook to the chain.
    pub fn register(&mut self, hook: Arc<dyn ModifierHook>) {
        self.hooks.push(hook);
    }

    /// Runs `expected` through every hook in registration order.
    ///
    /// A hook that returns a non-finite value is skipped for this call and
    /// the chain carries on with the previous value.
    #[must_use]
    pub fn adjust(&self, entity: EntityId, kind: ResourceKind, expected: f32) -> f32 {
        self.hooks.iter().enumerate().fold(expected, |decay, (index, hook)| {
            let adjusted = hook.adjust_decay(entity, kind, decay);
            if adjusted.is_finite() {
                adjusted
            } else {
                warn!(%entity, %kind, index, adjusted, "modifier hook returned a non-finite decay, ignoring it");
                decay
            }
        })
    }

    /// Number of registered hooks.
    #[must_use]
    pub fn len(&self) -> usize {
        self.hooks.len()
    }

    /// True when no hooks are registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.hooks.is_empty()
    }
}

impl fmt::Debug for HookRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HookRegistry")
            .field("hook_count", &self.hooks.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const E: EntityId = EntityId::new(1);

    mod modifier_tests {
        use super::*;

        #[test]
        fn identity_is_a_no_op() {
            assert_eq!(DecayModifier::identity().apply(4.25), 4.25);
        }

        #[test]
        fn accumulates_in_order() {
            let modifier = DecayModifier {
                pre_add: 1.0,
                multiplier: 3.0,
                post_add: -0.5,
                only: None,
            };
            assert!((modifier.apply(2.0) - 8.5).abs() < 1e-6);
        }

        #[test]
        fn restricted_modifier_ignores_other_kind() {
            let modifier = DecayModifier::scaled(0.0).only(ResourceKind::Thirst);
            assert_eq!(modifier.adjust_decay(E, ResourceKind::Hunger, 5.0), 5.0);
            assert_eq!(modifier.adjust_decay(E, ResourceKind::Thirst, 5.0), 0.0);
        }

        #[test]
        fn missing_fields_deserialize_to_identity() {
            let modifier: DecayModifier = serde_json::from_str("{}").unwrap();
            assert_eq!(modifier, DecayModifier::identity());
        }
    }

    mod registry_tests {
        use super::*;

        #[test]
        fn empty_registry_is_identity() {
            let hooks = HookRegistry::new();
            assert!(hooks.is_empty());
            assert_eq!(hooks.adjust(E, ResourceKind::Hunger, 2.5), 2.5);
        }

        #[test]
        fn hooks_chain_in_registration_order() {
            let mut hooks = HookRegistry::new();
            hooks.register(Arc::new(|_: EntityId, _: ResourceKind, d: f32| d + 1.0));
            hooks.register(Arc::new(|_: EntityId, _: ResourceKind, d: f32| d * 10.0));
            assert_eq!(hooks.len(), 2);
            assert_eq!(hooks.adjust(E, ResourceKind::Hunger, 1.0), 20.0);

            let mut reversed = HookRegistry::new();
            reversed.register(Arc::new(|_: EntityId, _: ResourceKind, d: f32| d * 10.0));
            reversed.register(Arc::new(|_: EntityId, _: ResourceKind, d: f32| d + 1.0));
            assert_eq!(reversed.adjust(E, ResourceKind::Hunger, 1.0), 11.0);
        }

        #[test]
        fn hooks_see_entity_and_kind() {
            let mut hooks = HookRegistry::new();
            hooks.register(Arc::new(|entity: EntityId, kind: ResourceKind, d: f32| {
                if entity == E && kind == ResourceKind::Thirst {
                    0.0
                } else {
                    d
                }
            }));
            assert_eq!(hooks.adjust(E, ResourceKind::Thirst, 3.0), 0.0);
            assert_eq!(hooks.adjust(E, ResourceKind::Hunger, 3.0), 3.0);
            assert_eq!(hooks.adjust(EntityId::new(2), ResourceKind::Thirst, 3.0), 3.0);
        }

        #[test]
        fn non_finite_result_is_skipped() {
            let mut hooks = HookRegistry::new();
            hooks.register(Arc::new(|_: EntityId, _: ResourceKind, _: f32| f32::NAN));
            hooks.register(Arc::new(|_: EntityId, _: ResourceKind, d: f32| d * 2.0));
            assert_eq!(hooks.adjust(E, ResourceKind::Hunger, 1.5), 3.0);
        }
    }
}
