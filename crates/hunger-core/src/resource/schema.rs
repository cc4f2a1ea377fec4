//! Versioned persisted form of a resource state.
//!
//! Records carry a `version` tag:
//!
//! - `"1"`: the legacy tick-based record, which stored the current value and
//!   subtracted a fixed amount every fixed interval
//! - `"2"`: a [`ResourceState`] as the lazy engine keeps it
//!
//! Loading always produces a current [`ResourceState`]. A legacy record is
//! converted to an equivalent continuous rate and stamped at the load time.

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::config::EngineConfig;

use super::state::{clamp_value, ResourceKind, ResourceState};

/// Tick-based record written before decay became lazy.
///
/// Thresholds and damage were not persisted by every writer; missing ones
/// take the configured defaults for the kind.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LegacyTickState {
    /// Which resource the record describes.
    pub kind: ResourceKind,
    /// Value at save time.
    pub current: f32,
    /// Capacity.
    pub max: f32,
    /// Amount subtracted per interval.
    pub decrease_amount: f32,
    /// Interval length in milliseconds.
    pub decrease_interval_ms: u64,
    /// Starvation threshold.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub loss_threshold: Option<f32>,
    /// Regeneration-stop threshold.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub regen_stop_threshold: Option<f32>,
    /// Damage per starving evaluation.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub damage_amount: Option<f32>,
}

impl LegacyTickState {
    /// Continuous rate equivalent to `decrease_amount` per interval.
    ///
    /// A zero interval or a negative amount yields no decay.
    #[must_use]
    #[allow(clippy::cast_precision_loss, clippy::cast_possible_truncation)]
    pub fn decay_rate(&self) -> f32 {
        if self.decrease_interval_ms == 0
            || self.decrease_amount.is_nan()
            || self.decrease_amount <= 0.0
        {
            return 0.0;
        }
        let seconds = self.decrease_interval_ms as f64 / 1000.0;
        (f64::from(self.decrease_amount) / seconds) as f32
    }

    fn migrate(self, now: u64, config: &EngineConfig) -> ResourceState {
        let mut state = config.template(self.kind, now);
        if self.max.is_finite() && self.max > 0.0 {
            state.capacity = self.max;
        } else {
            warn!(kind = %self.kind, max = self.max, "legacy record has no usable capacity, using configured capacity");
        }
        if self.decrease_interval_ms == 0 {
            warn!(kind = %self.kind, "legacy record has a zero decrease interval, migrating without decay");
        }
        state.decay_rate = self.decay_rate();
        state.base_value = clamp_value(self.current, state.capacity);
        if let Some(threshold) = self.loss_threshold {
            state.loss_threshold = threshold;
        }
        if let Some(threshold) = self.regen_stop_threshold {
            state.regen_stop_threshold = threshold;
        }
        if let Some(amount) = self.damage_amount {
            state.damage_amount = amount;
        }
        debug!(kind = %self.kind, rate = state.decay_rate, value = state.base_value, "migrated legacy resource record");
        state
    }
}

/// A persisted resource state of any known version.
///
/// # Example
///
/// ```
/// use hunger_core::config::EngineConfig;
/// use hunger_core::resource::VersionedResource;
///
/// let json = r#"{
///     "version": "1",
///     "kind": "hunger",
///     "current": 80.0,
///     "max": 100.0,
///     "decrease_amount": 1.0,
///     "decrease_interval_ms": 2000
/// }"#;
/// let record: VersionedResource = serde_json::from_str(json).unwrap();
/// let state = record.into_current(5_000, &EngineConfig::default());
///
/// assert_eq!(state.base_value(), 80.0);
/// assert_eq!(state.decay_rate(), 0.5);
/// assert_eq!(state.last_calculation_time(), 5_000);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "version")]
pub enum VersionedResource {
    /// Legacy tick-based record.
    #[serde(rename = "1")]
    V1(LegacyTickState),
    /// Lazy-decay state.
    #[serde(rename = "2")]
    V2(ResourceState),
}

impl VersionedResource {
    /// Converts any version into a current state loaded at `now`.
    ///
    /// Current-version records keep their timestamps and are only brought
    /// back inside their invariants.
    #[must_use]
    pub fn into_current(self, now: u64, config: &EngineConfig) -> ResourceState {
        match self {
            Self::V1(legacy) => legacy.migrate(now, config),
            Self::V2(mut state) => {
                state.sanitize(config.default_capacity);
                state
            }
        }
    }
}

impl From<ResourceState> for VersionedResource {
    fn from(state: ResourceState) -> Self {
        Self::V2(state)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resource::reconstruct;

    fn legacy(kind: ResourceKind) -> LegacyTickState {
        LegacyTickState {
            kind,
            current: 60.0,
            max: 100.0,
            decrease_amount: 3.0,
            decrease_interval_ms: 3_000,
            loss_threshold: None,
            regen_stop_threshold: None,
            damage_amount: None,
        }
    }

    mod migration_tests {
        use super::*;

        #[test]
        fn legacy_rate_is_amount_per_second() {
            let state = VersionedResource::V1(legacy(ResourceKind::Hunger))
                .into_current(10_000, &EngineConfig::default());

            assert_eq!(state.decay_rate(), 1.0);
            assert_eq!(state.base_value(), 60.0);
            assert_eq!(state.last_calculation_time(), 10_000);
            assert_eq!(reconstruct(&state, 13_000).unwrap(), 57.0);
        }

        #[test]
        fn missing_fields_take_configured_defaults() {
            let state = VersionedResource::V1(legacy(ResourceKind::Hunger))
                .into_current(0, &EngineConfig::default());

            assert_eq!(state.loss_threshold(), 1.0);
            assert_eq!(state.regen_stop_threshold(), 50.0);
            assert_eq!(state.damage_amount(), 15.0);
        }

        #[test]
        fn present_fields_override_defaults() {
            let mut record = legacy(ResourceKind::Hunger);
            record.loss_threshold = Some(15.0);
            record.damage_amount = Some(4.0);

            let state = VersionedResource::V1(record).into_current(0, &EngineConfig::default());
            assert_eq!(state.loss_threshold(), 15.0);
            assert_eq!(state.damage_amount(), 4.0);
        }

        #[test]
        fn legacy_thirst_gets_sprint_profile() {
            let state = VersionedResource::V1(legacy(ResourceKind::Thirst))
                .into_current(0, &EngineConfig::default());

            assert!(state.sprint().is_some());
            assert_eq!(state.decay_rate(), 1.0);
        }

        #[test]
        fn out_of_range_legacy_value_is_clamped() {
            let mut record = legacy(ResourceKind::Hunger);
            record.current = 140.0;
            record.max = -1.0;

            let state = VersionedResource::V1(record).into_current(0, &EngineConfig::default());
            assert_eq!(state.capacity(), 100.0);
            assert_eq!(state.base_value(), 100.0);
        }

        #[test]
        fn zero_interval_means_no_decay() {
            let mut record = legacy(ResourceKind::Hunger);
            record.decrease_interval_ms = 0;
            assert_eq!(record.decay_rate(), 0.0);
        }
    }

    mod format_tests {
        use super::*;

        #[test]
        fn current_version_is_tagged_2() {
            let state = ResourceState::new(ResourceKind::Hunger, 100.0, 0.01, 42);
            let json = serde_json::to_value(VersionedResource::from(state.clone())).unwrap();
            assert_eq!(json["version"], "2");

            let back: VersionedResource = serde_json::from_value(json).unwrap();
            assert_eq!(back.into_current(99, &EngineConfig::default()), state);
        }

        #[test]
        fn unknown_version_is_rejected() {
            let json = r#"{ "version": "9", "kind": "hunger" }"#;
            assert!(serde_json::from_str::<VersionedResource>(json).is_err());
        }
    }
}
