//! Error types for the resource engine.
//!
//! Everything that can go wrong while reading or committing a resource is a
//! [`DecayError`]. These are integration faults (a clock that ran backwards, a
//! malformed message), not gameplay outcomes: a missing resource component or
//! an out-of-range administrative value is reported through the normal return
//! types instead.

use crate::entity::EntityId;

/// Errors raised by the decay/commit pipeline.
///
/// Any operation that returns one of these leaves the resource state exactly
/// as it was before the call.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum DecayError {
    /// The supplied `now` is earlier than the state's last calculation time.
    #[error("clock regression: now={now}ms is earlier than last calculation at {last}ms")]
    ClockRegression {
        /// The timestamp that was supplied.
        now: u64,
        /// The timestamp stored on the state.
        last: u64,
    },

    /// A consumption event carried a negative or non-finite filling.
    #[error("invalid filling {filling}: consumption must be a finite, non-negative amount")]
    NegativeFilling {
        /// The rejected filling amount.
        filling: f32,
    },

    /// A decay-rate change carried a negative or non-finite rate.
    #[error("invalid decay rate {rate}: rates must be finite and >= 0")]
    InvalidRate {
        /// The rejected rate.
        rate: f32,
    },

    /// A message named an item entity that does not exist.
    #[error("unknown entity {entity}")]
    UnknownEntity {
        /// The missing entity.
        entity: EntityId,
    },

    /// An activation named an item entity that is not a consumable.
    #[error("entity {item} is not a consumable")]
    NotConsumable {
        /// The entity that was activated.
        item: EntityId,
    },
}

/// Convenience alias used throughout the crate.
pub type Result<T> = std::result::Result<T, DecayError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clock_regression_message_names_both_timestamps() {
        let err = DecayError::ClockRegression { now: 10, last: 20 };
        let msg = err.to_string();
        assert!(msg.contains("10ms"));
        assert!(msg.contains("20ms"));
    }

    #[test]
    fn not_consumable_names_entity() {
        let err = DecayError::NotConsumable {
            item: EntityId::new(7),
        };
        assert_eq!(err.to_string(), "entity 7 is not a consumable");
    }
}
