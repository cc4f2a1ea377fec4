//! Threshold gates derived from a reconstructed value.
//!
//! The predicates here are plain comparisons. Callers reconstruct first and
//! pass the fresh value in, so a gate can never look at a stale base value.

use bitflags::bitflags;
use serde::{Deserialize, Serialize};

use super::state::ResourceState;

/// Whether a value sitting exactly on a threshold counts as below it.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ThresholdPolicy {
    /// `value < threshold` trips the gate.
    #[default]
    Exclusive,
    /// `value <= threshold` trips the gate.
    Inclusive,
}

impl ThresholdPolicy {
    /// Applies the policy to one comparison.
    #[must_use]
    pub fn below(self, value: f32, threshold: f32) -> bool {
        match self {
            Self::Exclusive => value < threshold,
            Self::Inclusive => value <= threshold,
        }
    }
}

bitflags! {
    /// Gates currently tripped for one resource.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
    pub struct ResourceFlags: u8 {
        /// Below the loss threshold: periodic damage applies.
        const STARVING = 0b0000_0001;
        /// Below the regen threshold: base regeneration is suppressed.
        const REGEN_BLOCKED = 0b0000_0010;
        /// Below the sprint threshold: sprinting is disabled.
        const SPRINT_BLOCKED = 0b0000_0100;
    }
}

/// Evaluates threshold gates under a configured boundary policy.
///
/// # Example
///
/// ```
/// use hunger_core::resource::{ResourceKind, ResourceState, ThresholdEvaluator};
///
/// let state = ResourceState::new(ResourceKind::Hunger, 100.0, 0.0, 0)
///     .with_loss_threshold(10.0);
/// let evaluator = ThresholdEvaluator::default();
///
/// assert!(evaluator.is_starving(&state, 9.9));
/// assert!(!evaluator.is_starving(&state, 10.0));
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ThresholdEvaluator {
    policy: ThresholdPolicy,
}

impl ThresholdEvaluator {
    /// Creates an evaluator using `policy` for every gate.
    #[must_use]
    pub const fn new(policy: ThresholdPolicy) -> Self {
        Self { policy }
    }

    /// The boundary policy in use.
    #[must_use]
    pub const fn policy(&self) -> ThresholdPolicy {
        self.policy
    }

    /// True when `value` is below the loss threshold.
    #[must_use]
    pub fn is_starving(&self, state: &ResourceState, value: f32) -> bool {
        self.policy.below(value, state.loss_threshold)
    }

    /// True when `value` is below the regeneration threshold.
    #[must_use]
    pub fn is_regen_blocked(&self, state: &ResourceState, value: f32) -> bool {
        self.policy.below(value, state.regen_stop_threshold)
    }

    /// True when the state has a sprint profile and `value` is below its
    /// sprint threshold.
    #[must_use]
    pub fn is_sprint_blocked(&self, state: &ResourceState, value: f32) -> bool {
        state
            .sprint
            .as_ref()
            .is_some_and(|sprint| self.policy.below(value, sprint.sprint_stop_threshold))
    }

    /// All gates at once.
    #[must_use]
    pub fn flags(&self, state: &ResourceState, value: f32) -> ResourceFlags {
        let mut flags = ResourceFlags::empty();
        flags.set(ResourceFlags::STARVING, self.is_starving(state, value));
        flags.set(ResourceFlags::REGEN_BLOCKED, self.is_regen_blocked(state, value));
        flags.set(ResourceFlags::SPRINT_BLOCKED, self.is_sprint_blocked(state, value));
        flags
    }
}
