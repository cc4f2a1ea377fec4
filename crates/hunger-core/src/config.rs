//! Engine configuration.
//!
//! Every section defaults independently, so a config file only needs the
//! values it changes:
//!
//! ```json
//! { "thirst": { "enabled": true }, "scheduler": { "gate": "global" } }
//! ```

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::resource::{ResourceKind, ResourceState, SprintDecay, ThresholdPolicy};
use crate::scheduler::GateMode;

/// Errors raised while loading or validating configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// The config file could not be read.
    #[error("failed to read config file {path}")]
    Io {
        /// File that was being read.
        path: PathBuf,
        /// Underlying error.
        #[source]
        source: std::io::Error,
    },

    /// The config text is not valid JSON for [`EngineConfig`].
    #[error("failed to parse config")]
    Json(#[from] serde_json::Error),

    /// A value is out of range.
    #[error("invalid config: {field} {reason}")]
    Invalid {
        /// Dotted path of the offending field.
        field: &'static str,
        /// What is wrong with it.
        reason: &'static str,
    },
}

/// Hunger defaults.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HungerConfig {
    /// Maximum food.
    pub capacity: f32,
    /// Food lost per second.
    pub decay_rate: f32,
    /// Below this the character starves.
    pub loss_threshold: f32,
    /// Below this base regeneration stops.
    pub regen_stop_threshold: f32,
    /// Damage per starving evaluation.
    pub damage_amount: f32,
}

impl Default for HungerConfig {
    fn default() -> Self {
        Self {
            capacity: 100.0,
            decay_rate: 0.01,
            loss_threshold: 1.0,
            regen_stop_threshold: 50.0,
            damage_amount: 15.0,
        }
    }
}

/// Thirst defaults. Thirst is off unless `enabled` is set.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ThirstConfig {
    /// Whether new characters get a thirst state.
    pub enabled: bool,
    /// Maximum water.
    pub capacity: f32,
    /// Water lost per second while moving normally.
    pub normal_rate: f32,
    /// Water lost per second while sprinting.
    pub sprint_rate: f32,
    /// Below this sprinting is disabled.
    pub sprint_stop_threshold: f32,
    /// Below this the character is dehydrated.
    pub loss_threshold: f32,
    /// Below this base regeneration stops.
    pub regen_stop_threshold: f32,
    /// Damage per dehydrated evaluation.
    pub damage_amount: f32,
}

impl Default for ThirstConfig {
    fn default() -> Self {
        let sprint = SprintDecay::default();
        Self {
            enabled: false,
            capacity: 100.0,
            normal_rate: sprint.normal_rate,
            sprint_rate: sprint.sprint_rate,
            sprint_stop_threshold: sprint.sprint_stop_threshold,
            loss_threshold: 0.0,
            regen_stop_threshold: 0.0,
            damage_amount: 0.0,
        }
    }
}

impl ThirstConfig {
    /// The movement-dependent decay profile.
    #[must_use]
    pub const fn sprint(&self) -> SprintDecay {
        SprintDecay {
            normal_rate: self.normal_rate,
            sprint_rate: self.sprint_rate,
            sprint_stop_threshold: self.sprint_stop_threshold,
        }
    }
}

/// Damage scheduler settings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SchedulerConfig {
    /// Where the damage gate lives.
    pub gate: GateMode,
    /// Evaluation interval. Defaults depend on `gate`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub interval_ms: Option<u64>,
    /// Boundary policy for every threshold comparison.
    pub threshold_policy: ThresholdPolicy,
}

impl SchedulerConfig {
    /// Configured interval, or the gate mode's default.
    #[must_use]
    pub fn interval_ms(&self) -> u64 {
        self.interval_ms
            .unwrap_or_else(|| self.gate.default_interval_ms())
    }
}

/// Complete engine configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Hunger section.
    pub hunger: HungerConfig,
    /// Thirst section.
    pub thirst: ThirstConfig,
    /// Scheduler section.
    pub scheduler: SchedulerConfig,
    /// Capacity used when a set-capacity command asks for a value `<= 0`.
    pub default_capacity: f32,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            hunger: HungerConfig::default(),
            thirst: ThirstConfig::default(),
            scheduler: SchedulerConfig::default(),
            default_capacity: 100.0,
        }
    }
}

impl EngineConfig {
    /// Parses and validates a JSON config.
    ///
    /// # Errors
    ///
    /// [`ConfigError::Json`] on malformed input, [`ConfigError::Invalid`] if a
    /// value is out of range.
    pub fn from_json_str(text: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// Reads, parses and validates a JSON config file.
    ///
    /// # Errors
    ///
    /// [`ConfigError::Io`] if the file cannot be read, otherwise as
    /// [`from_json_str`](Self::from_json_str).
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json_str(&text)
    }

    /// Checks every value is in range.
    ///
    /// # Errors
    ///
    /// [`ConfigError::Invalid`] naming the first offending field.
    pub fn validate(&self) -> Result<(), ConfigError> {
        positive("hunger.capacity", self.hunger.capacity)?;
        non_negative("hunger.decay_rate", self.hunger.decay_rate)?;
        finite("hunger.loss_threshold", self.hunger.loss_threshold)?;
        finite("hunger.regen_stop_threshold", self.hunger.regen_stop_threshold)?;
        non_negative("hunger.damage_amount", self.hunger.damage_amount)?;

        positive("thirst.capacity", self.thirst.capacity)?;
        non_negative("thirst.normal_rate", self.thirst.normal_rate)?;
        non_negative("thirst.sprint_rate", self.thirst.sprint_rate)?;
        finite("thirst.sprint_stop_threshold", self.thirst.sprint_stop_threshold)?;
        finite("thirst.loss_threshold", self.thirst.loss_threshold)?;
        finite("thirst.regen_stop_threshold", self.thirst.regen_stop_threshold)?;
        non_negative("thirst.damage_amount", self.thirst.damage_amount)?;

        positive("default_capacity", self.default_capacity)?;

        if self.scheduler.interval_ms() == 0 {
            return Err(ConfigError::Invalid {
                field: "scheduler.interval_ms",
                reason: "must be greater than zero",
            });
        }
        Ok(())
    }

    /// Fresh state for `kind` stamped at `now`, or `None` if the kind is
    /// disabled.
    ///
    /// The per-entity damage gate is left at `now`; the system moves it one
    /// interval ahead when it attaches the state.
    #[must_use]
    pub fn new_state(&self, kind: ResourceKind, now: u64) -> Option<ResourceState> {
        match kind {
            ResourceKind::Thirst if !self.thirst.enabled => None,
            _ => Some(self.template(kind, now)),
        }
    }

    /// Configured state for `kind` stamped at `now`, whether or not the kind
    /// is enabled.
    #[must_use]
    pub fn template(&self, kind: ResourceKind, now: u64) -> ResourceState {
        match kind {
            ResourceKind::Hunger => {
                let h = &self.hunger;
                ResourceState::new(kind, h.capacity, h.decay_rate, now)
                    .with_loss_threshold(h.loss_threshold)
                    .with_regen_stop_threshold(h.regen_stop_threshold)
                    .with_damage_amount(h.damage_amount)
            }
            ResourceKind::Thirst => {
                let t = &self.thirst;
                ResourceState::new(kind, t.capacity, t.normal_rate, now)
                    .with_sprint(t.sprint())
                    .with_loss_threshold(t.loss_threshold)
                    .with_regen_stop_threshold(t.regen_stop_threshold)
                    .with_damage_amount(t.damage_amount)
            }
        }
    }
}

fn finite(field: &'static str, value: f32) -> Result<(), ConfigError> {
    if value.is_finite() {
        Ok(())
    } else {
        Err(ConfigError::Invalid {
            field,
            reason: "must be finite",
        })
    }
}

fn non_negative(field: &'static str, value: f32) -> Result<(), ConfigError> {
    finite(field, value)?;
    if value >= 0.0 {
        Ok(())
    } else {
        Err(ConfigError::Invalid {
            field,
            reason: "must not be negative",
        })
    }
}

fn positive(field: &'static str, value: f32) -> Result<(), ConfigError> {
    finite(field, value)?;
    if value > 0.0 {
        Ok(())
    } else {
        Err(ConfigError::Invalid {
            field,
            reason: "must be greater than zero",
        })
    }
}
