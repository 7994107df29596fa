//! Actuator service seam
//!
//! The platform's vibration stack is reached through two historical API
//! shapes: an older single-vibrator interface and a newer manager that
//! enumerates actuators and accepts per-actuator effects. The shape is
//! picked once when the service handle is acquired; everything above
//! this seam is branch-free.
//!
//! SPDX-License-Identifier: GPL-3.0

use std::fmt;

use crate::effect::Effect;
use crate::primitive::Primitive;

/// First platform API level with multi-actuator support
pub const MULTI_ACTUATOR_MIN_API: u32 = 31;

/// Opaque actuator identifier
///
/// Ordinal position is the id's index in [`ActuatorService::actuator_ids`]
/// at query time; nothing about an id persists across acquisitions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ActuatorId(pub u32);

impl fmt::Display for ActuatorId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Which API shape a service handle speaks
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApiGeneration {
    /// Single-vibrator interface, no actuator enumeration or primitives
    Legacy,
    /// Manager interface with actuator enumeration and combined dispatch
    MultiActuator,
}

impl ApiGeneration {
    /// Get human-readable name for the generation
    pub fn name(&self) -> &'static str {
        match self {
            ApiGeneration::Legacy => "legacy",
            ApiGeneration::MultiActuator => "multi-actuator",
        }
    }
}

impl fmt::Display for ApiGeneration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// One dispatch handed to a service
///
/// Either the same effect broadcast to every actuator, or a combined
/// command assigning each listed actuator its own effect. Both shapes
/// start all actuators together.
#[derive(Debug, Clone, PartialEq)]
pub enum Dispatch {
    /// Same effect on every actuator
    Parallel(Effect),
    /// Per-actuator effects started in parallel
    PerActuator(Vec<(ActuatorId, Effect)>),
}

/// Operations the platform vibration service exposes
///
/// Implementations swallow nothing: callers decide which failures are
/// fatal. The controller above this seam treats every error as a logged
/// no-op.
pub trait ActuatorService: Send {
    /// Which API shape this handle speaks
    fn generation(&self) -> ApiGeneration;

    /// Whether vibration hardware is present at all
    fn hardware_present(&self) -> bool {
        true
    }

    /// Ids of all actuators, in the service's fixed order
    fn actuator_ids(&self) -> Vec<ActuatorId>;

    /// The actuator compositions are dispatched to
    fn default_actuator(&self) -> Option<ActuatorId>;

    /// Whether `actuator` can render every listed primitive
    fn supports_primitives(&self, actuator: ActuatorId, primitives: &[Primitive]) -> bool;

    /// Play a dispatch, replacing any effect already in flight
    fn play(&mut self, dispatch: Dispatch) -> Result<(), HapticError>;

    /// Stop the in-flight effect, if any
    fn cancel(&mut self) -> Result<(), HapticError>;
}

/// Probe for acquiring an actuator service handle
///
/// Mirrors the platform boot sequence: check the vibrate permission,
/// read the API level, then hand out a handle of the matching
/// generation. `acquire` returns None when the platform has no
/// vibration service registered.
pub trait Platform {
    /// Whether the caller holds the vibrate permission
    fn permission_granted(&self) -> bool;

    /// Platform API level, compared against [`MULTI_ACTUATOR_MIN_API`]
    fn api_level(&self) -> u32;

    /// Acquire a service handle of the generation matching the API level
    fn acquire(&self) -> Option<Box<dyn ActuatorService>>;
}

// ============================================================================
// Error Types
// ============================================================================

/// Actuator service error type
#[derive(Debug)]
pub enum HapticError {
    /// Operation not available on this interface generation
    Unsupported,
    /// Malformed dispatch or effect
    InvalidRequest(String),
    /// I/O error talking to the service
    IoError(std::io::Error),
}

impl fmt::Display for HapticError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HapticError::Unsupported => {
                write!(f, "operation not supported by this actuator interface")
            }
            HapticError::InvalidRequest(msg) => write!(f, "invalid request: {}", msg),
            HapticError::IoError(e) => write!(f, "I/O error: {}", e),
        }
    }
}

impl std::error::Error for HapticError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            HapticError::IoError(e) => Some(e),
            _ => None,
        }
    }
}

impl From<std::io::Error> for HapticError {
    fn from(err: std::io::Error) -> Self {
        HapticError::IoError(err)
    }
}
