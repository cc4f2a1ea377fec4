//! The lazy-decay resource engine.
//!
//! - [`ResourceState`]: committed value, timestamp, rate, capacity, thresholds
//! - [`reconstruct`]: value as of `now`, computed on demand
//! - [`mutator`]: commits (consume, reset, freeze, rate change, settle)
//! - [`ThresholdEvaluator`]: starving / regen-blocked / sprint-blocked gates
//! - [`schema`]: versioned persisted form with legacy migration
//!
//! Nothing outside [`mutator`] writes a state's value or timestamp.

mod decay;
pub mod mutator;
pub mod schema;
mod state;
mod threshold;

pub use decay::reconstruct;
pub(crate) use mutator::validate_rate;
pub use mutator::{
    change_rate, commit, consume, freeze, rebase, reset_full, resize, set_to, settle_decay,
    Settlement,
};
pub use schema::{LegacyTickState, VersionedResource};
pub use state::{ResourceKind, ResourceState, SprintDecay};
pub use threshold::{ResourceFlags, ThresholdEvaluator, ThresholdPolicy};
