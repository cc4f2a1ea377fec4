//! Committing reconstructed values.
//!
//! A commit is the only sanctioned way to change a [`ResourceState`]:
//!
//! 1. reconstruct the value as of `now`
//! 2. apply the delta
//! 3. clamp to `[0, capacity]`
//! 4. store the result as the new base value stamped at `now`
//!
//! Every other operation in this module is a commit with a particular delta.
//! All of them validate before writing, so an error always leaves the state
//! untouched.

use tracing::debug;

use crate::error::{DecayError, Result};

use super::decay::{elapsed_ms, expected_decay, reconstruct};
use super::state::{clamp_value, ResourceState};

/// Commits the reconstructed value plus `delta` and returns the new value.
///
/// # Errors
///
/// [`DecayError::ClockRegression`] if `now` precedes the last commit.
///
/// # Example
///
/// ```
/// use hunger_core::resource::{commit, reconstruct, ResourceKind, ResourceState};
///
/// let mut state = ResourceState::new(ResourceKind::Hunger, 100.0, 1.0, 0);
/// assert_eq!(commit(&mut state, 5_000, 10.0).unwrap(), 100.0);
/// assert_eq!(state.last_calculation_time(), 5_000);
/// assert_eq!(reconstruct(&state, 10_000).unwrap(), 95.0);
/// ```
pub fn commit(state: &mut ResourceState, now: u64, delta: f32) -> Result<f32> {
    let current = reconstruct(state, now)?;
    let updated = clamp_value(current + delta, state.capacity);
    write(state, now, updated);
    debug!(kind = %state.kind, now, current, delta, updated, "committed resource");
    Ok(updated)
}

/// Commits a zero delta, freezing the reconstructed value at `now`.
///
/// # Errors
///
/// [`DecayError::ClockRegression`] if `now` precedes the last commit.
pub fn freeze(state: &mut ResourceState, now: u64) -> Result<f32> {
    commit(state, now, 0.0)
}

/// Adds `filling` to the resource, saturating at capacity.
///
/// # Errors
///
/// - [`DecayError::NegativeFilling`] if `filling` is negative or not finite
/// - [`DecayError::ClockRegression`] if `now` precedes the last commit
pub fn consume(state: &mut ResourceState, now: u64, filling: f32) -> Result<f32> {
    if !(filling.is_finite() && filling >= 0.0) {
        return Err(DecayError::NegativeFilling { filling });
    }
    commit(state, now, filling)
}

/// Refills the resource to capacity.
///
/// # Errors
///
/// [`DecayError::ClockRegression`] if `now` precedes the last commit.
pub fn reset_full(state: &mut ResourceState, now: u64) -> Result<f32> {
    let current = reconstruct(state, now)?;
    commit(state, now, state.capacity - current)
}

/// Commits so that the stored value becomes `target`, clamped into range.
///
/// Equivalent to a commit with `delta = target - current`, but writes the
/// clamped target directly so no rounding creeps in.
///
/// # Errors
///
/// [`DecayError::ClockRegression`] if `now` precedes the last commit.
pub fn set_to(state: &mut ResourceState, now: u64, target: f32) -> Result<f32> {
    let current = reconstruct(state, now)?;
    let updated = clamp_value(target, state.capacity);
    write(state, now, updated);
    debug!(kind = %state.kind, now, current, updated, "set resource value");
    Ok(updated)
}

/// Changes the decay rate without applying it to time already elapsed.
///
/// When `new_rate` differs from the stored rate the value is frozen at `now`
/// first, so only time after `now` decays at the new rate. Returns whether
/// the rate actually changed.
///
/// # Errors
///
/// - [`DecayError::InvalidRate`] if `new_rate` is negative or not finite
/// - [`DecayError::ClockRegression`] if `now` precedes the last commit
#[allow(clippy::float_cmp)]
pub fn change_rate(state: &mut ResourceState, now: u64, new_rate: f32) -> Result<bool> {
    validate_rate(new_rate)?;
    if new_rate == state.decay_rate {
        return Ok(false);
    }
    freeze(state, now)?;
    debug!(kind = %state.kind, now, old = state.decay_rate, new = new_rate, "decay rate changed");
    state.decay_rate = new_rate;
    Ok(true)
}

/// Rejects rates [`change_rate`] would refuse.
pub(crate) fn validate_rate(rate: f32) -> Result<()> {
    if rate.is_finite() && rate >= 0.0 {
        Ok(())
    } else {
        Err(DecayError::InvalidRate { rate })
    }
}

/// Outcome of [`settle_decay`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Settlement {
    /// Decay the rate predicted since the last commit.
    pub expected: f32,
    /// Decay actually applied after adjustment.
    pub actual: f32,
    /// Committed value.
    pub value: f32,
}

/// Settles the decay accumulated since the last commit through `adjust`.
///
/// `adjust` receives the expected decay and returns the decay to apply
/// instead. The stored value becomes `clamp(base_value - actual)`. With an
/// identity adjustment this is exactly a [`freeze`].
///
/// # Errors
///
/// [`DecayError::ClockRegression`] if `now` precedes the last commit.
pub fn settle_decay<F>(state: &mut ResourceState, now: u64, adjust: F) -> Result<Settlement>
where
    F: FnOnce(f32) -> f32,
{
    let expected = expected_decay(state, now)?;
    let actual = adjust(expected);
    let value = clamp_value(state.base_value - actual, state.capacity);
    write(state, now, value);
    debug!(kind = %state.kind, now, expected, actual, value, "settled decay");
    Ok(Settlement {
        expected,
        actual,
        value,
    })
}

/// Changes the capacity, freezing the value first and clamping it into the
/// new range.
///
/// The caller guarantees `capacity` is finite and positive.
///
/// # Errors
///
/// [`DecayError::ClockRegression`] if `now` precedes the last commit.
pub fn resize(state: &mut ResourceState, now: u64, capacity: f32) -> Result<f32> {
    let current = reconstruct(state, now)?;
    state.capacity = capacity;
    let updated = clamp_value(current, capacity);
    write(state, now, updated);
    debug!(kind = %state.kind, now, capacity, updated, "resized resource");
    Ok(updated)
}

/// Restamps the stored value at `now` without decaying it.
///
/// Used when an entity comes back from deactivation: the value committed on
/// the way out is the value it resumes with. The per-entity damage gate moves
/// by the same offset so the remaining wait is preserved.
///
/// # Errors
///
/// [`DecayError::ClockRegression`] if `now` precedes the last commit.
pub fn rebase(state: &mut ResourceState, now: u64) -> Result<f32> {
    let offline = elapsed_ms(state, now)?;
    state.last_calculation_time = now;
    state.next_damage_tick = state.next_damage_tick.saturating_add(offline);
    debug!(kind = %state.kind, now, offline, value = state.base_value, "rebased resource");
    Ok(state.base_value)
}

fn write(state: &mut ResourceState, now: u64, value: f32) {
    state.base_value = value;
    state.last_calculation_time = now;
}
