//! Per-entity resource state.
//!
//! A [`ResourceState`] never stores the instantaneous value. It stores the
//! value as of `last_calculation_time` together with the decay rate, and the
//! current value is rebuilt on demand by [`reconstruct`](super::reconstruct).
//!
//! Fields are only writable inside the crate. Hosts build states through the
//! constructors and builder methods here and change them through the
//! [`mutator`](super::mutator) functions.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Which consumable resource a state tracks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResourceKind {
    /// Food. Starvation deals damage.
    Hunger,
    /// Water. Decay depends on movement mode; low water disables sprinting.
    Thirst,
}

impl ResourceKind {
    /// All kinds, in the order the engine visits them.
    pub const ALL: [Self; 2] = [Self::Hunger, Self::Thirst];

    /// Human-readable label used by command output.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Hunger => "Food",
            Self::Thirst => "Water",
        }
    }
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Hunger => write!(f, "hunger"),
            Self::Thirst => write!(f, "thirst"),
        }
    }
}

/// Movement-dependent decay profile.
///
/// When present, the state's decay rate follows the holder's movement mode:
/// `normal_rate` while walking, `sprint_rate` while sprinting.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SprintDecay {
    /// Units per second while moving normally.
    pub normal_rate: f32,
    /// Units per second while sprinting.
    pub sprint_rate: f32,
    /// Below this value sprinting is disabled.
    pub sprint_stop_threshold: f32,
}

impl SprintDecay {
    /// Returns the rate for the given movement mode.
    #[must_use]
    pub const fn rate_for(&self, sprinting: bool) -> f32 {
        if sprinting {
            self.sprint_rate
        } else {
            self.normal_rate
        }
    }

    /// Maps negative or non-finite rates to zero.
    pub(crate) fn sanitized(self) -> Self {
        Self {
            normal_rate: sanitize_rate(self.normal_rate),
            sprint_rate: sanitize_rate(self.sprint_rate),
            ..self
        }
    }
}

impl Default for SprintDecay {
    fn default() -> Self {
        Self {
            normal_rate: 0.05,
            sprint_rate: 0.2,
            sprint_stop_threshold: 50.0,
        }
    }
}

/// Lazily decaying resource attached to one entity.
///
/// # Invariants
///
/// - `capacity > 0`
/// - `0 <= base_value <= capacity`
/// - `decay_rate >= 0`
/// - `last_calculation_time` never decreases
///
/// # Example
///
/// ```
/// use hunger_core::resource::{reconstruct, ResourceKind, ResourceState};
///
/// let state = ResourceState::new(ResourceKind::Hunger, 100.0, 1.0, 0);
/// assert_eq!(reconstruct(&state, 5_000).unwrap(), 95.0);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResourceState {
    pub(crate) kind: ResourceKind,
    pub(crate) capacity: f32,
    pub(crate) base_value: f32,
    pub(crate) last_calculation_time: u64,
    pub(crate) decay_rate: f32,
    pub(crate) loss_threshold: f32,
    pub(crate) regen_stop_threshold: f32,
    pub(crate) damage_amount: f32,
    pub(crate) next_damage_tick: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub(crate) sprint: Option<SprintDecay>,
}

impl ResourceState {
    /// Creates a full state stamped at `now`.
    ///
    /// Non-positive capacities are raised to a minimal positive value and
    /// negative rates are treated as zero, so the invariants hold from the
    /// start. Thresholds and damage default to zero; use the `with_*`
    /// builders to configure them.
    #[must_use]
    pub fn new(kind: ResourceKind, capacity: f32, decay_rate: f32, now: u64) -> Self {
        let capacity = sanitize_capacity(capacity);
        Self {
            kind,
            capacity,
            base_value: capacity,
            last_calculation_time: now,
            decay_rate: sanitize_rate(decay_rate),
            loss_threshold: 0.0,
            regen_stop_threshold: 0.0,
            damage_amount: 0.0,
            next_damage_tick: now,
            sprint: None,
        }
    }

    /// Sets the stored base value, clamped to `[0, capacity]`.
    #[must_use]
    pub fn with_base_value(mut self, value: f32) -> Self {
        self.base_value = clamp_value(value, self.capacity);
        self
    }

    /// Sets the value below which the holder is starving.
    #[must_use]
    pub fn with_loss_threshold(mut self, threshold: f32) -> Self {
        self.loss_threshold = threshold;
        self
    }

    /// Sets the value below which base regeneration is suppressed.
    #[must_use]
    pub fn with_regen_stop_threshold(mut self, threshold: f32) -> Self {
        self.regen_stop_threshold = threshold;
        self
    }

    /// Sets the damage dealt per starving evaluation.
    #[must_use]
    pub fn with_damage_amount(mut self, amount: f32) -> Self {
        self.damage_amount = amount;
        self
    }

    /// Sets the per-entity damage gate.
    #[must_use]
    pub fn with_next_damage_tick(mut self, tick: u64) -> Self {
        self.next_damage_tick = tick;
        self
    }

    /// Attaches a movement-dependent decay profile and switches the current
    /// rate to its normal rate.
    #[must_use]
    pub fn with_sprint(mut self, sprint: SprintDecay) -> Self {
        let sprint = sprint.sanitized();
        self.decay_rate = sprint.normal_rate;
        self.sprint = Some(sprint);
        self
    }

    /// Which resource this is.
    #[must_use]
    pub const fn kind(&self) -> ResourceKind {
        self.kind
    }

    /// Maximum value.
    #[must_use]
    pub const fn capacity(&self) -> f32 {
        self.capacity
    }

    /// Value as of [`last_calculation_time`](Self::last_calculation_time).
    #[must_use]
    pub const fn base_value(&self) -> f32 {
        self.base_value
    }

    /// Timestamp of the stored base value.
    #[must_use]
    pub const fn last_calculation_time(&self) -> u64 {
        self.last_calculation_time
    }

    /// Units lost per second.
    #[must_use]
    pub const fn decay_rate(&self) -> f32 {
        self.decay_rate
    }

    /// Starvation threshold.
    #[must_use]
    pub const fn loss_threshold(&self) -> f32 {
        self.loss_threshold
    }

    /// Regeneration-stop threshold.
    #[must_use]
    pub const fn regen_stop_threshold(&self) -> f32 {
        self.regen_stop_threshold
    }

    /// Damage per starving evaluation.
    #[must_use]
    pub const fn damage_amount(&self) -> f32 {
        self.damage_amount
    }

    /// Earliest time the per-entity gate lets the next evaluation run.
    #[must_use]
    pub const fn next_damage_tick(&self) -> u64 {
        self.next_damage_tick
    }

    /// Movement-dependent decay profile, if any.
    #[must_use]
    pub const fn sprint(&self) -> Option<&SprintDecay> {
        self.sprint.as_ref()
    }

    /// Brings a deserialized state back inside its invariants.
    ///
    /// Used when loading records written by other tools: capacity is forced
    /// positive (falling back to `default_capacity`), the rate is forced
    /// non-negative and the base value is clamped into range.
    pub(crate) fn sanitize(&mut self, default_capacity: f32) {
        if !(self.capacity.is_finite() && self.capacity > 0.0) {
            self.capacity = sanitize_capacity(default_capacity);
        }
        self.decay_rate = sanitize_rate(self.decay_rate);
        self.base_value = clamp_value(self.base_value, self.capacity);
        self.sprint = self.sprint.map(SprintDecay::sanitized);
    }
}

const MIN_CAPACITY: f32 = f32::EPSILON;

fn sanitize_capacity(capacity: f32) -> f32 {
    if capacity.is_finite() && capacity > 0.0 {
        capacity
    } else {
        MIN_CAPACITY
    }
}

fn sanitize_rate(rate: f32) -> f32 {
    if rate.is_finite() && rate > 0.0 {
        rate
    } else {
        0.0
    }
}

/// Clamps a value into `[0, capacity]`, mapping NaN to zero.
pub(crate) fn clamp_value(value: f32, capacity: f32) -> f32 {
    if value.is_nan() {
        return 0.0;
    }
    value.clamp(0.0, capacity)
}
