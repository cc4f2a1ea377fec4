//! Administrative overrides.
//!
//! Cheat and debug commands still go through the mutator. Nothing here
//! assigns a field directly, so a command can never break continuity or the
//! `[0, capacity]` bound.

use std::fmt;

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::clock::Clock;
use crate::entity::EntityId;
use crate::error::Result;
use crate::resource::{reconstruct, resize, set_to, ResourceKind};
use crate::system::ResourceSystem;

/// The bound a set-value request was clamped to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Bound {
    /// Requested value was negative.
    Zero,
    /// Requested value exceeded capacity.
    Capacity,
}

/// Result of [`ResourceSystem::set_value`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SetValueOutcome {
    /// The requested value was stored as given.
    Set(f32),
    /// The request was out of range and `value` was stored instead.
    ClampedTo {
        /// Which end of the range applied.
        bound: Bound,
        /// Stored value.
        value: f32,
    },
    /// The entity has no such resource.
    Absent,
}

/// Result of [`ResourceSystem::set_capacity`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum CapacityOutcome {
    /// Capacity set as requested.
    Set {
        /// New capacity.
        capacity: f32,
    },
    /// The request was not a positive number; the configured default was
    /// used instead.
    FellBackToDefault {
        /// Capacity actually applied.
        capacity: f32,
    },
    /// The entity has no such resource.
    Absent,
}

/// Result of [`ResourceSystem::show`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ShowReport {
    /// Which resource.
    pub kind: ResourceKind,
    /// Value as of the query.
    pub value: f32,
    /// Capacity.
    pub capacity: f32,
}

impl fmt::Display for ShowReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} level: {:.2}/{:.2}",
            self.kind.label(),
            self.value,
            self.capacity
        )
    }
}

impl<C: Clock> ResourceSystem<C> {
    /// Sets the current value of `kind`, clamped into `[0, capacity]`.
    ///
    /// # Errors
    ///
    /// [`DecayError::ClockRegression`](crate::error::DecayError::ClockRegression)
    /// if the state was committed after now.
    pub fn set_value(
        &mut self,
        entity: EntityId,
        kind: ResourceKind,
        value: f32,
    ) -> Result<SetValueOutcome> {
        let now = self.now();
        let Some(state) = self.state_mut(entity, kind) else {
            return Ok(SetValueOutcome::Absent);
        };
        let stored = set_to(state, now, value)?;
        let outcome = if value < 0.0 || value.is_nan() {
            SetValueOutcome::ClampedTo {
                bound: Bound::Zero,
                value: stored,
            }
        } else if value > state.capacity() {
            SetValueOutcome::ClampedTo {
                bound: Bound::Capacity,
                value: stored,
            }
        } else {
            SetValueOutcome::Set(stored)
        };
        info!(%entity, %kind, requested = value, stored, "set value command");
        Ok(outcome)
    }

    /// Sets the capacity of `kind`, clamping the current value into the new
    /// range. A capacity that is not a positive finite number is replaced by
    /// the configured `default_capacity`.
    ///
    /// # Errors
    ///
    /// [`DecayError::ClockRegression`](crate::error::DecayError::ClockRegression)
    /// if the state was committed after now.
    pub fn set_capacity(
        &mut self,
        entity: EntityId,
        kind: ResourceKind,
        capacity: f32,
    ) -> Result<CapacityOutcome> {
        let now = self.now();
        let fallback = self.config().default_capacity;
        let Some(state) = self.state_mut(entity, kind) else {
            return Ok(CapacityOutcome::Absent);
        };
        if capacity.is_finite() && capacity > 0.0 {
            let value = resize(state, now, capacity)?;
            info!(%entity, %kind, capacity, value, "set capacity command");
            Ok(CapacityOutcome::Set { capacity })
        } else {
            let value = resize(state, now, fallback)?;
            info!(%entity, %kind, requested = capacity, capacity = fallback, value, "set capacity fell back to default");
            Ok(CapacityOutcome::FellBackToDefault { capacity: fallback })
        }
    }

    /// Reports the value of `kind` as of now. Read-only.
    ///
    /// # Errors
    ///
    /// [`DecayError::ClockRegression`](crate::error::DecayError::ClockRegression)
    /// if the state was committed after now.
    pub fn show(&self, entity: EntityId, kind: ResourceKind) -> Result<Option<ShowReport>> {
        let now = self.now();
        let Some(state) = self.state(entity, kind) else {
            return Ok(None);
        };
        Ok(Some(ShowReport {
            kind,
            value: reconstruct(state, now)?,
            capacity: state.capacity(),
        }))
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::clock::ManualClock;
    use crate::config::EngineConfig;
    use crate::error::DecayError;

    fn system() -> (Arc<ManualClock>, ResourceSystem<Arc<ManualClock>>, EntityId) {
        let clock = Arc::new(ManualClock::new(0));
        let mut system = ResourceSystem::new(Arc::clone(&clock), EngineConfig::default());
        let player = system.spawn_character().unwrap();
        (clock, system, player)
    }

    mod set_value_tests {
        use super::*;

        #[test]
        fn in_range_value_is_stored() {
            let (_clock, mut system, player) = system();
            let outcome = system.set_value(player, ResourceKind::Hunger, 42.0).unwrap();
            assert_eq!(outcome, SetValueOutcome::Set(42.0));
            assert_eq!(system.current_value(player, ResourceKind::Hunger).unwrap(), Some(42.0));
        }

        #[test]
        fn negative_value_clamps_to_zero() {
            let (_clock, mut system, player) = system();
            let outcome = system.set_value(player, ResourceKind::Hunger, -5.0).unwrap();
            assert_eq!(
                outcome,
                SetValueOutcome::ClampedTo {
                    bound: Bound::Zero,
                    value: 0.0
                }
            );
        }

        #[test]
        fn oversized_value_clamps_to_capacity() {
            let (_clock, mut system, player) = system();
            let outcome = system.set_value(player, ResourceKind::Hunger, 500.0).unwrap();
            assert_eq!(
                outcome,
                SetValueOutcome::ClampedTo {
                    bound: Bound::Capacity,
                    value: 100.0
                }
            );
        }

        #[test]
        fn value_is_stamped_so_decay_restarts() {
            let (clock, mut system, player) = system();
            clock.set(10_000);
            system.set_value(player, ResourceKind::Hunger, 50.0).unwrap();
            let state = system.state(player, ResourceKind::Hunger).unwrap();
            assert_eq!(state.last_calculation_time(), 10_000);

            clock.set(110_000);
            let value = system.current_value(player, ResourceKind::Hunger).unwrap().unwrap();
            assert!((value - 49.0).abs() < 1e-4);
        }

        #[test]
        fn disabled_thirst_is_absent() {
            let (_clock, mut system, player) = system();
            let outcome = system.set_value(player, ResourceKind::Thirst, 10.0).unwrap();
            assert_eq!(outcome, SetValueOutcome::Absent);
        }

        #[test]
        fn regression_leaves_state_alone() {
            let (clock, mut system, player) = system();
            clock.set(5_000);
            system.set_value(player, ResourceKind::Hunger, 80.0).unwrap();
            clock.set(1_000);
            let err = system.set_value(player, ResourceKind::Hunger, 10.0).unwrap_err();
            assert!(matches!(err, DecayError::ClockRegression { now: 1_000, last: 5_000 }));
            assert_eq!(system.state(player, ResourceKind::Hunger).unwrap().base_value(), 80.0);
        }
    }

    mod set_capacity_tests {
        use super::*;

        #[test]
        fn shrinking_clamps_current_value() {
            let (_clock, mut system, player) = system();
            let outcome = system.set_capacity(player, ResourceKind::Hunger, 40.0).unwrap();
            assert_eq!(outcome, CapacityOutcome::Set { capacity: 40.0 });
            assert_eq!(system.capacity(player, ResourceKind::Hunger), Some(40.0));
            assert_eq!(system.current_value(player, ResourceKind::Hunger).unwrap(), Some(40.0));
        }

        #[test]
        fn growing_keeps_current_value() {
            let (_clock, mut system, player) = system();
            system.set_capacity(player, ResourceKind::Hunger, 250.0).unwrap();
            assert_eq!(system.current_value(player, ResourceKind::Hunger).unwrap(), Some(100.0));
        }

        #[test]
        fn non_positive_capacity_falls_back_to_default() {
            let (_clock, mut system, player) = system();
            system.set_capacity(player, ResourceKind::Hunger, 30.0).unwrap();

            for bad in [0.0, -10.0, f32::NAN, f32::INFINITY] {
                let outcome = system.set_capacity(player, ResourceKind::Hunger, bad).unwrap();
                assert_eq!(outcome, CapacityOutcome::FellBackToDefault { capacity: 100.0 });
            }
            assert_eq!(system.capacity(player, ResourceKind::Hunger), Some(100.0));
        }

        #[test]
        fn unknown_entity_is_absent() {
            let (_clock, mut system, _player) = system();
            let outcome = system
                .set_capacity(EntityId::new(999), ResourceKind::Hunger, 50.0)
                .unwrap();
            assert_eq!(outcome, CapacityOutcome::Absent);
        }
    }

    mod show_tests {
        use super::*;

        #[test]
        fn show_formats_label_value_and_capacity() {
            let (clock, system, player) = system();
            clock.set(600_000);
            let report = system.show(player, ResourceKind::Hunger).unwrap().unwrap();
            assert_eq!(report.to_string(), "Food level: 94.00/100.00");
        }

        #[test]
        fn show_does_not_commit() {
            let (clock, system, player) = system();
            clock.set(600_000);
            system.show(player, ResourceKind::Hunger).unwrap();
            let state = system.state(player, ResourceKind::Hunger).unwrap();
            assert_eq!(state.last_calculation_time(), 0);
        }

        #[test]
        fn show_missing_resource_is_none() {
            let (_clock, system, player) = system();
            assert!(system.show(player, ResourceKind::Thirst).unwrap().is_none());
        }
    }
}
