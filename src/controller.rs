//! Haptic dispatch controller
//!
//! Owns the optional actuator-service handle and forwards vibration
//! requests to it. Every entry point is a silent no-op when the handle
//! is missing, the hardware is absent, or the request is malformed;
//! callers are never blocked by haptic failures. Directional requests
//! are spread across the actuator list by weight, everything else is a
//! parallel broadcast.

use std::sync::{Arc, Mutex};

use crate::actuator::{ActuatorId, ActuatorService, ApiGeneration, Dispatch, Platform};
use crate::config::HapticsConfig;
use crate::direction::{AxisWeights, Direction};
use crate::effect::{Composition, Effect, OneShot, Waveform};
use crate::primitive::Primitive;

/// Haptic dispatch controller
pub struct HapticController {
    /// Optional service handle, acquired by `initialize`
    service: Option<Box<dyn ActuatorService>>,
    /// Whether haptics are enabled
    enabled: bool,
    /// Global intensity multiplier (0-100)
    intensity: u8,
    /// Whether directional requests spread across actuators
    directional: bool,
}

impl HapticController {
    /// Create a controller without a service handle
    pub fn new(enabled: bool) -> Self {
        Self {
            service: None,
            enabled,
            intensity: 100,
            directional: true,
        }
    }

    /// Create a controller from configuration
    pub fn from_config(config: &HapticsConfig) -> Self {
        Self {
            service: None,
            enabled: config.enabled,
            intensity: config.intensity.min(100),
            directional: config.directional,
        }
    }

    /// Update settings from configuration (for hot-reload)
    pub fn update_from_config(&mut self, config: &HapticsConfig) {
        self.enabled = config.enabled;
        self.intensity = config.intensity.min(100);
        self.directional = config.directional;

        tracing::debug!(
            enabled = self.enabled,
            intensity = self.intensity,
            directional = self.directional,
            "Haptic settings updated from config"
        );
    }

    // =========================================================================
    // Lifecycle
    // =========================================================================

    /// Acquire a service handle from the platform
    ///
    /// Does nothing when the vibrate permission is missing or the
    /// platform has no vibration service; later calls then no-op. A
    /// repeated initialize replaces the previous handle.
    pub fn initialize(&mut self, platform: &dyn Platform) {
        if !platform.permission_granted() {
            tracing::info!("Vibrate permission not granted, haptics stay off");
            return;
        }

        match platform.acquire() {
            Some(service) => {
                tracing::info!(
                    api_level = platform.api_level(),
                    generation = %service.generation(),
                    actuators = service.actuator_ids().len(),
                    "Actuator service acquired"
                );
                self.service = Some(service);
            }
            None => {
                tracing::info!("No actuator service on this platform, haptics stay off");
            }
        }
    }

    /// Stop any in-flight effect and release the service handle
    ///
    /// Idempotent; entry points called after dispose are no-ops.
    pub fn dispose(&mut self) {
        if let Some(mut service) = self.service.take() {
            if let Err(e) = service.cancel() {
                tracing::debug!(error = %e, "Cancel during dispose failed");
            }
            tracing::info!("Actuator service released");
        }
    }

    /// Stop the in-flight effect, keeping the service handle
    pub fn cancel(&mut self) {
        let Some(service) = self.service.as_mut() else {
            return;
        };
        if let Err(e) = service.cancel() {
            tracing::debug!(error = %e, "Cancel failed");
        }
    }

    /// Whether a service handle is held
    pub fn is_initialized(&self) -> bool {
        self.service.is_some()
    }

    /// API generation of the held service handle
    pub fn generation(&self) -> Option<ApiGeneration> {
        self.service.as_ref().map(|s| s.generation())
    }

    /// Actuator ids of the held service handle, empty without one
    pub fn actuator_ids(&self) -> Vec<ActuatorId> {
        self.service
            .as_ref()
            .map(|s| s.actuator_ids())
            .unwrap_or_default()
    }

    /// Whether haptics are enabled
    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Global intensity multiplier (0-100)
    pub fn intensity(&self) -> u8 {
        self.intensity
    }

    /// Whether directional spreading is active
    pub fn is_directional(&self) -> bool {
        self.directional
    }

    // =========================================================================
    // One-Shot & Waveform Dispatch
    // =========================================================================

    /// Vibrate every actuator with a single fixed effect
    pub fn vibrate_one_shot(&mut self, duration_ms: u32, amplitude: u8) {
        let amplitude = self.apply_intensity(amplitude);
        self.broadcast(Effect::OneShot(OneShot::new(duration_ms, amplitude)));
    }

    /// Vibrate with a one-shot effect weighted toward a direction
    pub fn vibrate_directional_one_shot(
        &mut self,
        duration_ms: u32,
        amplitude: u8,
        direction: Direction,
    ) {
        let amplitude = self.apply_intensity(amplitude);
        self.vibrate_directed(
            Effect::OneShot(OneShot::new(duration_ms, amplitude)),
            direction,
        );
    }

    /// Vibrate every actuator with an amplitude waveform
    ///
    /// `timings_ms` and `amplitudes` must have the same non-zero
    /// length; mismatched requests are dropped.
    pub fn vibrate_pattern(&mut self, timings_ms: &[u32], amplitudes: &[u8]) {
        let amplitudes = self.apply_intensity_slice(amplitudes);
        match Waveform::new(timings_ms.to_vec(), amplitudes) {
            Ok(waveform) => self.broadcast(Effect::Waveform(waveform)),
            Err(e) => tracing::warn!(error = %e, "Waveform request dropped"),
        }
    }

    /// Vibrate with a waveform weighted toward a direction
    ///
    /// Every amplitude sample is scaled by the per-actuator weight.
    pub fn vibrate_directional_pattern(
        &mut self,
        timings_ms: &[u32],
        amplitudes: &[u8],
        direction: Direction,
    ) {
        let amplitudes = self.apply_intensity_slice(amplitudes);
        match Waveform::new(timings_ms.to_vec(), amplitudes) {
            Ok(waveform) => self.vibrate_directed(Effect::Waveform(waveform), direction),
            Err(e) => tracing::warn!(error = %e, "Waveform request dropped"),
        }
    }

    /// Vibrate with a waveform handed over as serialized JSON bytes
    ///
    /// Unparseable bytes drop the request.
    pub fn vibrate_pattern_data(&mut self, bytes: &[u8]) {
        match Waveform::from_json(bytes) {
            Ok(mut waveform) => {
                waveform.amplitudes = self.apply_intensity_slice(&waveform.amplitudes);
                self.broadcast(Effect::Waveform(waveform));
            }
            Err(e) => tracing::warn!(error = %e, "Pattern data dropped"),
        }
    }

    // =========================================================================
    // Primitive Compositions
    // =========================================================================

    /// Whether the default actuator can render every listed primitive id
    ///
    /// False without a service handle or when any id is unknown. An
    /// empty list is vacuously supported.
    pub fn are_primitives_supported(&self, primitive_ids: &[u32]) -> bool {
        let Some(service) = self.service.as_ref() else {
            return false;
        };

        let mut primitives = Vec::with_capacity(primitive_ids.len());
        for &id in primitive_ids {
            match Primitive::from_id(id) {
                Some(primitive) => primitives.push(primitive),
                None => return false,
            }
        }

        let Some(default) = service.default_actuator() else {
            return false;
        };
        service.supports_primitives(default, &primitives)
    }

    /// Whether the default actuator can render one primitive id
    pub fn is_primitive_supported(&self, primitive_id: u32) -> bool {
        self.are_primitives_supported(&[primitive_id])
    }

    /// Vibrate with a composition of predefined primitives
    ///
    /// The three arrays run in parallel: `primitive_ids[i]` plays at
    /// `scales[i]` after waiting `delays_ms[i]`. The whole request is
    /// dropped unless every primitive is supported by the default
    /// actuator; partial compositions are never dispatched.
    pub fn vibrate_predefined(&mut self, primitive_ids: &[u32], scales: &[f64], delays_ms: &[u32]) {
        if !self.enabled {
            return;
        }
        if primitive_ids.is_empty() {
            tracing::debug!("Empty composition request dropped");
            return;
        }
        if primitive_ids.len() != scales.len() || primitive_ids.len() != delays_ms.len() {
            tracing::warn!(
                primitives = primitive_ids.len(),
                scales = scales.len(),
                delays = delays_ms.len(),
                "Composition array lengths differ, request dropped"
            );
            return;
        }

        let mut primitives = Vec::with_capacity(primitive_ids.len());
        for &id in primitive_ids {
            match Primitive::from_id(id) {
                Some(primitive) => primitives.push(primitive),
                None => {
                    tracing::debug!(id, "Unknown primitive id, request dropped");
                    return;
                }
            }
        }

        let intensity = self.intensity;
        let Some(service) = self.service.as_mut() else {
            tracing::debug!("No actuator service, composition dropped");
            return;
        };
        let Some(default) = service.default_actuator() else {
            tracing::debug!("Service has no default actuator, composition dropped");
            return;
        };
        if !service.supports_primitives(default, &primitives) {
            tracing::debug!("Unsupported primitive in composition, request dropped");
            return;
        }

        let mut composition = Composition::new();
        for ((primitive, scale), delay) in primitives.iter().zip(scales).zip(delays_ms) {
            let scale = (*scale * intensity as f64 / 100.0) as f32;
            composition = composition.add(*primitive, scale, *delay);
        }

        tracing::debug!(segments = composition.len(), "Dispatching composition");
        if let Err(e) = service.play(Dispatch::Parallel(Effect::Composed(composition))) {
            tracing::debug!(error = %e, "Composition dispatch failed");
        }
    }

    // =========================================================================
    // Dispatch Internals
    // =========================================================================

    /// Scale an amplitude by the global intensity multiplier
    fn apply_intensity(&self, amplitude: u8) -> u8 {
        ((amplitude as u32 * self.intensity as u32) / 100) as u8
    }

    fn apply_intensity_slice(&self, amplitudes: &[u8]) -> Vec<u8> {
        amplitudes.iter().map(|a| self.apply_intensity(*a)).collect()
    }

    /// Send the same effect to every actuator
    fn broadcast(&mut self, effect: Effect) {
        if !self.enabled {
            return;
        }
        let Some(service) = self.service.as_mut() else {
            tracing::debug!("No actuator service, vibration dropped");
            return;
        };
        if !service.hardware_present() {
            tracing::debug!("No vibration hardware, vibration dropped");
            return;
        }

        let kind = effect.kind();
        if let Err(e) = service.play(Dispatch::Parallel(effect)) {
            tracing::debug!(error = %e, kind, "Parallel dispatch failed");
        }
    }

    /// Spread an effect across actuators by directional weight
    ///
    /// Falls back to the parallel broadcast when the direction carries
    /// no information (zero-length vector) or when there are fewer than
    /// two actuators to spread across. Actuators with zero weight are
    /// left out of the dispatch entirely.
    fn vibrate_directed(&mut self, effect: Effect, direction: Direction) {
        if !self.enabled {
            return;
        }
        if !self.directional {
            self.broadcast(effect);
            return;
        }
        let Some(service) = self.service.as_mut() else {
            tracing::debug!("No actuator service, vibration dropped");
            return;
        };
        if !service.hardware_present() {
            tracing::debug!("No vibration hardware, vibration dropped");
            return;
        }

        let ids = service.actuator_ids();
        if ids.len() > 1 {
            if let Some(axis) = AxisWeights::from_direction(direction) {
                let weights = axis.spread(ids.len());
                let plan: Vec<(ActuatorId, Effect)> = ids
                    .iter()
                    .zip(weights)
                    .filter(|(_, weight)| *weight > 0.0)
                    .map(|(id, weight)| (*id, effect.scaled(weight)))
                    .collect();

                tracing::debug!(
                    direction = %direction,
                    active = plan.len(),
                    actuators = ids.len(),
                    kind = effect.kind(),
                    "Directional dispatch"
                );
                if let Err(e) = service.play(Dispatch::PerActuator(plan)) {
                    tracing::debug!(error = %e, "Directional dispatch failed");
                }
                return;
            }
            tracing::debug!("Zero-length direction, using parallel dispatch");
        }

        let kind = effect.kind();
        if let Err(e) = service.play(Dispatch::Parallel(effect)) {
            tracing::debug!(error = %e, kind, "Parallel dispatch failed");
        }
    }
}

impl Default for HapticController {
    fn default() -> Self {
        Self::new(true)
    }
}

// ============================================================================
// Shared Controller (for the D-Bus service)
// ============================================================================

/// Thread-safe shared controller handle
pub type SharedController = Arc<Mutex<HapticController>>;

/// Create a shared controller from configuration
pub fn new_shared_controller(config: &HapticsConfig) -> SharedController {
    Arc::new(Mutex::new(HapticController::from_config(config)))
}

// ============================================================================
// Tests
// ============================================================================
