//! Damage dispatch.
//!
//! The engine decides *that* a starving character takes damage; applying it
//! is a host concern behind [`DamageSink`]. [`DamageLog`] records dispatches
//! for telemetry and tests.

use std::fmt;
use std::sync::{Mutex, MutexGuard, PoisonError};

use serde::{Deserialize, Serialize};

use crate::entity::EntityId;
use crate::resource::ResourceKind;

/// Why damage was dealt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DamageCause {
    /// Hunger below its loss threshold.
    Starvation,
    /// Thirst below its loss threshold.
    Dehydration,
}

impl From<ResourceKind> for DamageCause {
    fn from(kind: ResourceKind) -> Self {
        match kind {
            ResourceKind::Hunger => Self::Starvation,
            ResourceKind::Thirst => Self::Dehydration,
        }
    }
}

impl fmt::Display for DamageCause {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Starvation => write!(f, "starvation"),
            Self::Dehydration => write!(f, "dehydration"),
        }
    }
}

/// One damage dispatch.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DamageEvent {
    /// Damaged entity.
    pub entity: EntityId,
    /// Amount of damage.
    pub amount: f32,
    /// Cause tag.
    pub cause: DamageCause,
    /// Game time of the evaluation that dealt it.
    pub at: u64,
}

/// Receives damage from the scheduler. Fire-and-forget.
pub trait DamageSink: Send + Sync {
    /// Applies `amount` of damage to `entity`.
    fn apply_damage(&self, entity: EntityId, amount: f32, cause: DamageCause);
}

/// Sink that discards everything.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullSink;

impl DamageSink for NullSink {
    fn apply_damage(&self, _entity: EntityId, _amount: f32, _cause: DamageCause) {}
}

/// Sink that records every dispatch in order.
///
/// # Example
///
/// ```
/// use hunger_core::entity::EntityId;
/// use hunger_core::sink::{DamageCause, DamageLog, DamageSink};
///
/// let log = DamageLog::new();
/// log.apply_damage(EntityId::new(3), 15.0, DamageCause::Starvation);
///
/// let events = log.take_events();
/// assert_eq!(events.len(), 1);
/// assert!(log.is_empty());
/// ```
#[derive(Debug, Default)]
pub struct DamageLog {
    events: Mutex<Vec<(EntityId, f32, DamageCause)>>,
}

impl DamageLog {
    /// Creates an empty log.
    #[must_use]
    pub fn new() -> Self {
        Self {
            events: Mutex::new(Vec::new()),
        }
    }

    /// Drains and returns all recorded dispatches.
    pub fn take_events(&self) -> Vec<(EntityId, f32, DamageCause)> {
        std::mem::take(&mut *self.lock())
    }

    /// Number of recorded dispatches.
    #[must_use]
    pub fn event_count(&self) -> usize {
        self.lock().len()
    }

    /// True if nothing has been recorded.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    /// Discards all recorded dispatches.
    pub fn clear(&self) {
        self.lock().clear();
    }

    // A panic while holding the lock cannot leave the Vec half-written.
    fn lock(&self) -> MutexGuard<'_, Vec<(EntityId, f32, DamageCause)>> {
        self.events.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl DamageSink for DamageLog {
    fn apply_damage(&self, entity: EntityId, amount: f32, cause: DamageCause) {
        self.lock().push((entity, amount, cause));
    }
}

impl<S: DamageSink + ?Sized> DamageSink for &S {
    fn apply_damage(&self, entity: EntityId, amount: f32, cause: DamageCause) {
        (**self).apply_damage(entity, amount, cause);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    #[test]
    fn cause_follows_kind() {
        assert_eq!(DamageCause::from(ResourceKind::Hunger), DamageCause::Starvation);
        assert_eq!(DamageCause::from(ResourceKind::Thirst), DamageCause::Dehydration);
        assert_eq!(DamageCause::Dehydration.to_string(), "dehydration");
    }

    #[test]
    fn log_preserves_order() {
        let log = DamageLog::new();
        log.apply_damage(EntityId::new(2), 1.0, DamageCause::Starvation);
        log.apply_damage(EntityId::new(1), 2.0, DamageCause::Dehydration);

        assert_eq!(log.event_count(), 2);
        assert_eq!(
            log.take_events(),
            vec![
                (EntityId::new(2), 1.0, DamageCause::Starvation),
                (EntityId::new(1), 2.0, DamageCause::Dehydration),
            ]
        );
    }

    #[test]
    fn clear_discards_events() {
        let log = DamageLog::new();
        log.apply_damage(EntityId::new(0), 5.0, DamageCause::Starvation);
        log.clear();
        assert!(log.is_empty());
    }

    #[test]
    fn poisoned_log_keeps_recording() {
        let log = Arc::new(DamageLog::new());
        let poisoner = Arc::clone(&log);
        let _ = std::thread::spawn(move || {
            let _guard = poisoner.events.lock().unwrap();
            panic!("poison the lock");
        })
        .join();

        log.apply_damage(EntityId::new(4), 3.0, DamageCause::Starvation);
        assert_eq!(log.event_count(), 1);
    }

    #[test]
    fn null_sink_accepts_anything() {
        NullSink.apply_damage(EntityId::new(0), f32::MAX, DamageCause::Dehydration);
    }
}
