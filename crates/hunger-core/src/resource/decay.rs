//! Lazy decay: rebuilding "value as of now" from a committed state.

use tracing::trace;

use crate::error::{DecayError, Result};

use super::state::ResourceState;

/// Returns the resource value as of `now`.
///
/// `decayed = decay_rate * (now - last_calculation_time) / 1000`, and the
/// result is `max(0, base_value - decayed)`. Reading never writes and never
/// exceeds capacity, since the base value is already bounded.
///
/// # Errors
///
/// [`DecayError::ClockRegression`] if `now` is earlier than the state's last
/// calculation time.
///
/// # Example
///
/// ```
/// use hunger_core::resource::{reconstruct, ResourceKind, ResourceState};
///
/// let state = ResourceState::new(ResourceKind::Thirst, 100.0, 0.2, 7_000);
/// let value = reconstruct(&state, 8_000).unwrap();
/// assert!((value - 99.8).abs() < 1e-4);
///
/// assert!(reconstruct(&state, 6_999).is_err());
/// ```
pub fn reconstruct(state: &ResourceState, now: u64) -> Result<f32> {
    let elapsed = elapsed_ms(state, now)?;
    let value = (state.base_value - decayed_over(state.decay_rate, elapsed)).max(0.0);
    trace!(kind = %state.kind, now, elapsed, value, "reconstructed resource value");
    Ok(value)
}

/// Decay expected between the last commit and `now`, before any clamping.
pub(crate) fn expected_decay(state: &ResourceState, now: u64) -> Result<f32> {
    let elapsed = elapsed_ms(state, now)?;
    Ok(decayed_over(state.decay_rate, elapsed))
}

/// Milliseconds since the last commit.
pub(crate) fn elapsed_ms(state: &ResourceState, now: u64) -> Result<u64> {
    now.checked_sub(state.last_calculation_time)
        .ok_or(DecayError::ClockRegression {
            now,
            last: state.last_calculation_time,
        })
}

// Computed in f64: millisecond counts lose precision in f32 long before a
// session ends.
#[allow(clippy::cast_precision_loss, clippy::cast_possible_truncation)]
fn decayed_over(rate: f32, elapsed_ms: u64) -> f32 {
    (f64::from(rate) * elapsed_ms as f64 / 1000.0) as f32
}
