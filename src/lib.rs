//! hapticd Library
//!
//! Public API for testing and integration.

pub mod actuator;
pub mod config;
pub mod controller;
pub mod dbus;
pub mod direction;
pub mod effect;
pub mod primitive;
pub mod sim;
pub mod watcher;

/// Re-export commonly used types
pub use actuator::{ActuatorId, ActuatorService, ApiGeneration, Dispatch, HapticError, Platform, MULTI_ACTUATOR_MIN_API};
pub use config::{Config, ConfigError, HapticsConfig, SharedConfig, SimConfig, load_shared_config, new_shared_config};
pub use controller::{HapticController, SharedController, new_shared_controller};
pub use dbus::{init_dbus_service, HapticService, DBUS_INTERFACE, DBUS_NAME, DBUS_PATH};
pub use direction::{AxisWeights, Direction};
pub use effect::{Composition, Effect, OneShot, PrimitiveSegment, Waveform};
pub use primitive::{Primitive, ALL_PRIMITIVES};
pub use sim::{CommandLog, SimActuator, SimCommand, SimManager, SimPlatform, SimVibrator};
pub use watcher::start_config_watcher;
