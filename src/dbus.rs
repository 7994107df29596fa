//! D-Bus IPC server for hapticd
//!
//! Implements the org.hapticd.Controller interface so desktop clients
//! can drive the haptic controller without linking the library.
//!
//! ## Interface: org.hapticd.Controller
//!
//! ### Methods:
//! - `Vibrate(duration_ms: u32, amplitude: u8)` - One-shot on every actuator
//! - `VibrateDirectional(duration_ms: u32, amplitude: u8, dir_x: f64, dir_y: f64)`
//! - `VibratePattern(timings_ms: au, amplitudes: ay)` - Amplitude waveform
//! - `VibrateDirectionalPattern(timings_ms: au, amplitudes: ay, dir_x: f64, dir_y: f64)`
//! - `IsPrimitiveSupported(primitive_id: u32) -> bool`
//! - `VibratePredefined(primitive_ids: au, scales: ad, delays_ms: au)`
//! - `VibratePatternData(data: String)` - Waveform as serialized JSON
//! - `Cancel()` - Stop the in-flight effect
//! - `ListActuators() -> au` - Ids of the acquired actuators
//! - `ReloadConfig()` - Re-read config.json and apply haptics settings

use zbus::{fdo, interface};

use crate::config::{Config, SharedConfig};
use crate::controller::SharedController;
use crate::direction::Direction;

/// D-Bus interface name
pub const DBUS_INTERFACE: &str = "org.hapticd.Controller";

/// D-Bus object path
pub const DBUS_PATH: &str = "/org/hapticd/Controller";

/// D-Bus bus name
pub const DBUS_NAME: &str = "org.hapticd";

/// hapticd D-Bus service
///
/// Every method forwards into the shared controller; vibration failures
/// stay silent there, so the only bus errors a client can see are lock
/// poisoning and config reload failures.
pub struct HapticService {
    /// Daemon version
    version: String,
    /// Shared configuration for hot-reload
    config: SharedConfig,
    /// Shared controller the methods dispatch through
    controller: SharedController,
}

impl HapticService {
    /// Create a new D-Bus service instance over the shared controller
    pub fn new(config: SharedConfig, controller: SharedController) -> Self {
        Self {
            version: env!("CARGO_PKG_VERSION").to_string(),
            config,
            controller,
        }
    }
}

#[interface(name = "org.hapticd.Controller")]
impl HapticService {
    // =========================================================================
    // METHODS
    // =========================================================================

    /// Vibrate every actuator with a one-shot effect
    async fn vibrate(&self, duration_ms: u32, amplitude: u8) -> fdo::Result<()> {
        tracing::debug!(duration_ms, amplitude, "Vibrate called");
        match self.controller.lock() {
            Ok(mut controller) => {
                controller.vibrate_one_shot(duration_ms, amplitude);
                Ok(())
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to lock controller");
                Err(fdo::Error::Failed(format!("Lock error: {}", e)))
            }
        }
    }

    /// Vibrate with a one-shot effect weighted toward a direction
    async fn vibrate_directional(
        &self,
        duration_ms: u32,
        amplitude: u8,
        dir_x: f64,
        dir_y: f64,
    ) -> fdo::Result<()> {
        tracing::debug!(duration_ms, amplitude, dir_x, dir_y, "VibrateDirectional called");
        match self.controller.lock() {
            Ok(mut controller) => {
                controller.vibrate_directional_one_shot(
                    duration_ms,
                    amplitude,
                    Direction::new(dir_x, dir_y),
                );
                Ok(())
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to lock controller");
                Err(fdo::Error::Failed(format!("Lock error: {}", e)))
            }
        }
    }

    /// Vibrate every actuator with an amplitude waveform
    async fn vibrate_pattern(&self, timings_ms: Vec<u32>, amplitudes: Vec<u8>) -> fdo::Result<()> {
        tracing::debug!(segments = timings_ms.len(), "VibratePattern called");
        match self.controller.lock() {
            Ok(mut controller) => {
                controller.vibrate_pattern(&timings_ms, &amplitudes);
                Ok(())
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to lock controller");
                Err(fdo::Error::Failed(format!("Lock error: {}", e)))
            }
        }
    }

    /// Vibrate with a waveform weighted toward a direction
    async fn vibrate_directional_pattern(
        &self,
        timings_ms: Vec<u32>,
        amplitudes: Vec<u8>,
        dir_x: f64,
        dir_y: f64,
    ) -> fdo::Result<()> {
        tracing::debug!(
            segments = timings_ms.len(),
            dir_x,
            dir_y,
            "VibrateDirectionalPattern called"
        );
        match self.controller.lock() {
            Ok(mut controller) => {
                controller.vibrate_directional_pattern(
                    &timings_ms,
                    &amplitudes,
                    Direction::new(dir_x, dir_y),
                );
                Ok(())
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to lock controller");
                Err(fdo::Error::Failed(format!("Lock error: {}", e)))
            }
        }
    }

    /// Check whether the default actuator supports a primitive
    ///
    /// Returns false (never an error) without a service handle or for an
    /// unknown id.
    async fn is_primitive_supported(&self, primitive_id: u32) -> fdo::Result<bool> {
        match self.controller.lock() {
            Ok(controller) => Ok(controller.is_primitive_supported(primitive_id)),
            Err(e) => {
                tracing::error!(error = %e, "Failed to lock controller");
                Ok(false)
            }
        }
    }

    /// Vibrate with a composition of predefined primitives
    ///
    /// The three arrays run in parallel. The request is dropped in full
    /// when any primitive is unsupported.
    async fn vibrate_predefined(
        &self,
        primitive_ids: Vec<u32>,
        scales: Vec<f64>,
        delays_ms: Vec<u32>,
    ) -> fdo::Result<()> {
        tracing::debug!(primitives = primitive_ids.len(), "VibratePredefined called");
        match self.controller.lock() {
            Ok(mut controller) => {
                controller.vibrate_predefined(&primitive_ids, &scales, &delays_ms);
                Ok(())
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to lock controller");
                Err(fdo::Error::Failed(format!("Lock error: {}", e)))
            }
        }
    }

    /// Vibrate with a waveform handed over as serialized JSON
    ///
    /// Expected shape: `{"timings_ms": [...], "amplitudes": [...]}`.
    /// Unparseable data drops the request without a bus error.
    async fn vibrate_pattern_data(&self, data: String) -> fdo::Result<()> {
        tracing::debug!(bytes = data.len(), "VibratePatternData called");
        match self.controller.lock() {
            Ok(mut controller) => {
                controller.vibrate_pattern_data(data.as_bytes());
                Ok(())
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to lock controller");
                Err(fdo::Error::Failed(format!("Lock error: {}", e)))
            }
        }
    }

    /// Stop the in-flight effect, keeping the service handle
    async fn cancel(&self) -> fdo::Result<()> {
        tracing::debug!("Cancel called");
        match self.controller.lock() {
            Ok(mut controller) => {
                controller.cancel();
                Ok(())
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to lock controller");
                Err(fdo::Error::Failed(format!("Lock error: {}", e)))
            }
        }
    }

    /// Ids of the acquired actuators, empty without a service handle
    async fn list_actuators(&self) -> fdo::Result<Vec<u32>> {
        match self.controller.lock() {
            Ok(controller) => Ok(controller
                .actuator_ids()
                .into_iter()
                .map(|id| id.0)
                .collect()),
            Err(e) => {
                tracing::error!(error = %e, "Failed to lock controller");
                Ok(Vec::new())
            }
        }
    }

    /// Reload configuration from disk
    ///
    /// Re-reads config.json, updates the shared configuration, and
    /// applies the haptics settings to the live controller. This allows
    /// settings changes to take effect without restarting the daemon.
    async fn reload_config(&self) -> fdo::Result<()> {
        tracing::info!("ReloadConfig called - reloading configuration from disk");

        let path = self
            .config
            .read()
            .ok()
            .and_then(|config| config.config_path.clone());

        let load_result = match &path {
            Some(path) => Config::load(path),
            None => Config::load_default(),
        };

        match load_result {
            Ok(new_config) => {
                let haptics = new_config.haptics.clone();

                // Update the shared config
                match self.config.write() {
                    Ok(mut config) => {
                        *config = new_config;
                        tracing::info!(
                            haptics_enabled = config.haptics.enabled,
                            intensity = config.haptics.intensity,
                            directional = config.haptics.directional,
                            "Configuration reloaded successfully"
                        );
                    }
                    Err(e) => {
                        tracing::error!(error = %e, "Failed to acquire config write lock");
                        return Err(fdo::Error::Failed(format!("Lock error: {}", e)));
                    }
                }

                // Update the controller with new settings
                match self.controller.lock() {
                    Ok(mut controller) => {
                        controller.update_from_config(&haptics);
                    }
                    Err(e) => {
                        tracing::error!(error = %e, "Failed to lock controller for update");
                        return Err(fdo::Error::Failed(format!("Controller lock error: {}", e)));
                    }
                }

                Ok(())
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to reload configuration");
                Err(fdo::Error::Failed(format!("Config reload failed: {}", e)))
            }
        }
    }

    // =========================================================================
    // PROPERTIES
    // =========================================================================

    /// Get haptics enabled status
    #[zbus(property)]
    async fn haptics_enabled(&self) -> bool {
        self.config
            .read()
            .map(|c| c.haptics.enabled)
            .unwrap_or(true)
    }

    /// Get the API generation of the acquired service handle
    ///
    /// Empty string while no handle is held.
    #[zbus(property)]
    async fn api_generation(&self) -> String {
        self.controller
            .lock()
            .ok()
            .and_then(|controller| controller.generation())
            .map(|generation| generation.to_string())
            .unwrap_or_default()
    }

    /// Get daemon version
    #[zbus(property)]
    async fn daemon_version(&self) -> &str {
        &self.version
    }
}

/// Initialize and run the D-Bus service
///
/// Connects to the session bus, registers the service name, and exports
/// the interface at the specified object path.
///
/// # Returns
/// A `zbus::Connection` that should be kept alive for the service to run.
pub async fn init_dbus_service(
    config: SharedConfig,
    controller: SharedController,
) -> zbus::Result<zbus::Connection> {
    let service = HapticService::new(config, controller);

    let connection = zbus::connection::Builder::session()?
        .name(DBUS_NAME)?
        .serve_at(DBUS_PATH, service)?
        .build()
        .await?;

    tracing::info!(
        name = DBUS_NAME,
        path = DBUS_PATH,
        "D-Bus service registered"
    );

    Ok(connection)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::new_shared_config;
    use crate::controller::new_shared_controller;

    #[test]
    fn test_dbus_constants() {
        assert_eq!(DBUS_INTERFACE, "org.hapticd.Controller");
        assert_eq!(DBUS_PATH, "/org/hapticd/Controller");
        assert_eq!(DBUS_NAME, "org.hapticd");
    }

    #[test]
    fn test_service_creation() {
        let config = new_shared_config();
        let haptics = config.read().unwrap().haptics.clone();
        let controller = new_shared_controller(&haptics);
        let service = HapticService::new(config, controller);

        assert!(!service.version.is_empty());
        assert!(service.config.read().unwrap().haptics.enabled);
        // No platform acquired yet
        assert!(!service.controller.lock().unwrap().is_initialized());
    }
}
