//! Simulated actuator platform
//!
//! In-process stand-in for the platform vibration stack: one service
//! type per API generation, plus a probe that picks the generation from
//! a configured API level. Every accepted command lands in a shared log
//! so the daemon's callers and the test suite can observe exactly what
//! would have reached hardware.
//!
//! SPDX-License-Identifier: GPL-3.0

use std::sync::{Arc, Mutex};

use crate::actuator::{
    ActuatorId, ActuatorService, ApiGeneration, Dispatch, HapticError, Platform,
    MULTI_ACTUATOR_MIN_API,
};
use crate::effect::Effect;
use crate::primitive::{Primitive, ALL_PRIMITIVES};

/// One command accepted by a simulated service
#[derive(Debug, Clone)]
pub enum SimCommand {
    /// An effect dispatch
    Play(Dispatch),
    /// A cancel request
    Cancel,
}

/// Shared record of every command a simulated service accepted
#[derive(Debug, Clone, Default)]
pub struct CommandLog {
    inner: Arc<Mutex<Vec<SimCommand>>>,
}

impl CommandLog {
    /// Create an empty log
    pub fn new() -> Self {
        Self::default()
    }

    fn record(&self, command: SimCommand) {
        self.inner.lock().unwrap().push(command);
    }

    /// All commands in acceptance order
    pub fn commands(&self) -> Vec<SimCommand> {
        self.inner.lock().unwrap().clone()
    }

    /// Only the dispatched effects, in acceptance order
    pub fn played(&self) -> Vec<Dispatch> {
        self.inner
            .lock()
            .unwrap()
            .iter()
            .filter_map(|command| match command {
                SimCommand::Play(dispatch) => Some(dispatch.clone()),
                SimCommand::Cancel => None,
            })
            .collect()
    }

    /// Number of cancel requests seen
    pub fn cancel_count(&self) -> usize {
        self.inner
            .lock()
            .unwrap()
            .iter()
            .filter(|command| matches!(command, SimCommand::Cancel))
            .count()
    }

    /// Total number of commands
    pub fn len(&self) -> usize {
        self.inner.lock().unwrap().len()
    }

    /// Whether no command has been accepted yet
    pub fn is_empty(&self) -> bool {
        self.inner.lock().unwrap().is_empty()
    }

    /// Drop all recorded commands
    pub fn clear(&self) {
        self.inner.lock().unwrap().clear();
    }
}

// ============================================================================
// Simulated Actuators
// ============================================================================

/// One simulated actuator with its supported primitive set
#[derive(Debug, Clone)]
pub struct SimActuator {
    id: ActuatorId,
    primitives: Vec<Primitive>,
}

impl SimActuator {
    /// Create an actuator supporting every primitive
    pub fn new(id: u32) -> Self {
        Self {
            id: ActuatorId(id),
            primitives: ALL_PRIMITIVES.to_vec(),
        }
    }

    /// Restrict the supported primitive set
    pub fn with_primitives(mut self, primitives: Vec<Primitive>) -> Self {
        self.primitives = primitives;
        self
    }

    /// The actuator's id
    pub fn id(&self) -> ActuatorId {
        self.id
    }

    fn supports_all(&self, primitives: &[Primitive]) -> bool {
        primitives.iter().all(|p| self.primitives.contains(p))
    }
}

// ============================================================================
// Multi-Actuator Service
// ============================================================================

/// Simulated manager-generation service
pub struct SimManager {
    actuators: Vec<SimActuator>,
    log: CommandLog,
}

impl SimManager {
    /// Create a manager over the given actuators, recording into `log`
    pub fn new(actuators: Vec<SimActuator>, log: CommandLog) -> Self {
        Self { actuators, log }
    }

    fn find(&self, id: ActuatorId) -> Option<&SimActuator> {
        self.actuators.iter().find(|a| a.id == id)
    }
}

impl ActuatorService for SimManager {
    fn generation(&self) -> ApiGeneration {
        ApiGeneration::MultiActuator
    }

    fn actuator_ids(&self) -> Vec<ActuatorId> {
        self.actuators.iter().map(|a| a.id).collect()
    }

    fn default_actuator(&self) -> Option<ActuatorId> {
        self.actuators.first().map(|a| a.id)
    }

    fn supports_primitives(&self, actuator: ActuatorId, primitives: &[Primitive]) -> bool {
        self.find(actuator)
            .map(|a| a.supports_all(primitives))
            .unwrap_or(false)
    }

    fn play(&mut self, dispatch: Dispatch) -> Result<(), HapticError> {
        if let Dispatch::PerActuator(plan) = &dispatch {
            if plan.is_empty() {
                return Err(HapticError::InvalidRequest(
                    "per-actuator dispatch with no entries".to_string(),
                ));
            }
            for (id, _) in plan {
                if self.find(*id).is_none() {
                    return Err(HapticError::InvalidRequest(format!(
                        "unknown actuator id {}",
                        id
                    )));
                }
            }
        }

        match &dispatch {
            Dispatch::Parallel(effect) => {
                tracing::debug!(kind = effect.kind(), "Sim manager playing parallel effect");
            }
            Dispatch::PerActuator(plan) => {
                tracing::debug!(actuators = plan.len(), "Sim manager playing combined effect");
            }
        }

        self.log.record(SimCommand::Play(dispatch));
        Ok(())
    }

    fn cancel(&mut self) -> Result<(), HapticError> {
        self.log.record(SimCommand::Cancel);
        Ok(())
    }
}

// ============================================================================
// Legacy Service
// ============================================================================

/// Simulated legacy-generation service
///
/// Single actuator, no primitive support, no per-actuator dispatch. A
/// missing motor makes plays silent no-ops, matching devices that ship
/// the interface without hardware behind it.
pub struct SimVibrator {
    present: bool,
    log: CommandLog,
}

impl SimVibrator {
    /// Create a legacy service, recording into `log`
    pub fn new(present: bool, log: CommandLog) -> Self {
        Self { present, log }
    }
}

impl ActuatorService for SimVibrator {
    fn generation(&self) -> ApiGeneration {
        ApiGeneration::Legacy
    }

    fn hardware_present(&self) -> bool {
        self.present
    }

    fn actuator_ids(&self) -> Vec<ActuatorId> {
        vec![ActuatorId(0)]
    }

    fn default_actuator(&self) -> Option<ActuatorId> {
        Some(ActuatorId(0))
    }

    fn supports_primitives(&self, _actuator: ActuatorId, _primitives: &[Primitive]) -> bool {
        false
    }

    fn play(&mut self, dispatch: Dispatch) -> Result<(), HapticError> {
        match &dispatch {
            Dispatch::PerActuator(_) => return Err(HapticError::Unsupported),
            Dispatch::Parallel(Effect::Composed(_)) => return Err(HapticError::Unsupported),
            Dispatch::Parallel(effect) => {
                if !self.present {
                    tracing::debug!(kind = effect.kind(), "No motor present, effect discarded");
                    return Ok(());
                }
                tracing::debug!(kind = effect.kind(), "Sim vibrator playing effect");
            }
        }

        self.log.record(SimCommand::Play(dispatch));
        Ok(())
    }

    fn cancel(&mut self) -> Result<(), HapticError> {
        if self.present {
            self.log.record(SimCommand::Cancel);
        }
        Ok(())
    }
}

// ============================================================================
// Platform Probe
// ============================================================================

/// Simulated platform probe
///
/// Hands out a [`SimManager`] at API level [`MULTI_ACTUATOR_MIN_API`]
/// and above, a [`SimVibrator`] below it.
pub struct SimPlatform {
    api_level: u32,
    permission: bool,
    service_available: bool,
    actuators: Vec<SimActuator>,
    log: CommandLog,
}

impl SimPlatform {
    /// Create a platform at the given API level with two actuators
    pub fn new(api_level: u32) -> Self {
        Self {
            api_level,
            permission: true,
            service_available: true,
            actuators: vec![SimActuator::new(0), SimActuator::new(1)],
            log: CommandLog::new(),
        }
    }

    /// Build from daemon configuration
    pub fn from_config(config: &crate::config::SimConfig) -> Self {
        let primitives = config.primitives.as_ref().map(|names| {
            names
                .iter()
                .filter_map(|name| {
                    let parsed = Primitive::from_name(name);
                    if parsed.is_none() {
                        tracing::warn!(name = %name, "Unknown primitive name in config, ignoring");
                    }
                    parsed
                })
                .collect::<Vec<_>>()
        });

        let actuators = (0..config.actuators)
            .map(|i| {
                let actuator = SimActuator::new(i as u32);
                match &primitives {
                    Some(set) => actuator.with_primitives(set.clone()),
                    None => actuator,
                }
            })
            .collect();

        Self {
            api_level: config.api_level,
            permission: config.permission,
            service_available: true,
            actuators,
            log: CommandLog::new(),
        }
    }

    /// Replace the actuator topology with `count` full-featured actuators
    pub fn with_actuator_count(mut self, count: usize) -> Self {
        self.actuators = (0..count).map(|i| SimActuator::new(i as u32)).collect();
        self
    }

    /// Replace the actuator topology
    pub fn with_actuators(mut self, actuators: Vec<SimActuator>) -> Self {
        self.actuators = actuators;
        self
    }

    /// Simulate a caller without the vibrate permission
    pub fn deny_permission(mut self) -> Self {
        self.permission = false;
        self
    }

    /// Simulate a platform with no vibration service registered
    pub fn without_service(mut self) -> Self {
        self.service_available = false;
        self
    }

    /// Handle to the shared command log
    pub fn log(&self) -> CommandLog {
        self.log.clone()
    }
}

impl Platform for SimPlatform {
    fn permission_granted(&self) -> bool {
        self.permission
    }

    fn api_level(&self) -> u32 {
        self.api_level
    }

    fn acquire(&self) -> Option<Box<dyn ActuatorService>> {
        if !self.service_available {
            return None;
        }

        if self.api_level >= MULTI_ACTUATOR_MIN_API {
            Some(Box::new(SimManager::new(
                self.actuators.clone(),
                self.log.clone(),
            )))
        } else {
            Some(Box::new(SimVibrator::new(
                !self.actuators.is_empty(),
                self.log.clone(),
            )))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::effect::{Composition, OneShot};

    fn one_shot() -> Effect {
        Effect::OneShot(OneShot::new(20, 200))
    }

    #[test]
    fn test_api_level_selects_generation() {
        let modern = SimPlatform::new(MULTI_ACTUATOR_MIN_API);
        assert_eq!(
            modern.acquire().unwrap().generation(),
            ApiGeneration::MultiActuator
        );

        let old = SimPlatform::new(MULTI_ACTUATOR_MIN_API - 1);
        assert_eq!(old.acquire().unwrap().generation(), ApiGeneration::Legacy);
    }

    #[test]
    fn test_missing_service_yields_no_handle() {
        let platform = SimPlatform::new(31).without_service();
        assert!(platform.acquire().is_none());
    }

    #[test]
    fn test_manager_records_plays() {
        let platform = SimPlatform::new(31).with_actuator_count(3);
        let log = platform.log();
        let mut service = platform.acquire().unwrap();

        service.play(Dispatch::Parallel(one_shot())).unwrap();

        let played = log.played();
        assert_eq!(played.len(), 1);
        assert_eq!(played[0], Dispatch::Parallel(one_shot()));
    }

    #[test]
    fn test_manager_rejects_empty_plan() {
        let platform = SimPlatform::new(31);
        let mut service = platform.acquire().unwrap();

        let result = service.play(Dispatch::PerActuator(vec![]));
        assert!(result.is_err());
        assert!(platform.log().is_empty());
    }

    #[test]
    fn test_manager_rejects_unknown_actuator() {
        let platform = SimPlatform::new(31).with_actuator_count(2);
        let mut service = platform.acquire().unwrap();

        let plan = vec![(ActuatorId(7), one_shot())];
        let result = service.play(Dispatch::PerActuator(plan));
        assert!(result.is_err());
        assert!(platform.log().is_empty());
    }

    #[test]
    fn test_manager_primitive_support_per_actuator() {
        let actuators = vec![
            SimActuator::new(0).with_primitives(vec![Primitive::Click, Primitive::Tick]),
            SimActuator::new(1),
        ];
        let platform = SimPlatform::new(31).with_actuators(actuators);
        let service = platform.acquire().unwrap();

        assert!(service.supports_primitives(ActuatorId(0), &[Primitive::Click]));
        assert!(!service.supports_primitives(ActuatorId(0), &[Primitive::Thud]));
        assert!(service.supports_primitives(ActuatorId(1), &[Primitive::Thud]));
        assert!(!service.supports_primitives(ActuatorId(9), &[Primitive::Click]));
    }

    #[test]
    fn test_legacy_rejects_combined_and_composed() {
        let platform = SimPlatform::new(30);
        let mut service = platform.acquire().unwrap();

        let combined = Dispatch::PerActuator(vec![(ActuatorId(0), one_shot())]);
        assert!(service.play(combined).is_err());

        let composed = Dispatch::Parallel(Effect::Composed(
            Composition::new().add(Primitive::Click, 1.0, 0),
        ));
        assert!(service.play(composed).is_err());
        assert!(!service.supports_primitives(ActuatorId(0), &[Primitive::Click]));
    }

    #[test]
    fn test_legacy_without_motor_discards_silently() {
        let platform = SimPlatform::new(30).with_actuator_count(0);
        let mut service = platform.acquire().unwrap();

        assert!(!service.hardware_present());
        service.play(Dispatch::Parallel(one_shot())).unwrap();
        service.cancel().unwrap();
        assert!(platform.log().is_empty());
    }

    #[test]
    fn test_cancel_is_recorded() {
        let platform = SimPlatform::new(31);
        let mut service = platform.acquire().unwrap();

        service.play(Dispatch::Parallel(one_shot())).unwrap();
        service.cancel().unwrap();

        let log = platform.log();
        assert_eq!(log.cancel_count(), 1);
        assert_eq!(log.played().len(), 1);
        assert_eq!(log.len(), 2);
    }

    #[test]
    fn test_log_clear() {
        let platform = SimPlatform::new(31);
        let log = platform.log();
        let mut service = platform.acquire().unwrap();

        service.play(Dispatch::Parallel(one_shot())).unwrap();
        assert!(!log.is_empty());
        log.clear();
        assert!(log.is_empty());
    }

    #[test]
    fn test_platform_from_config() {
        let config = crate::config::SimConfig {
            api_level: 31,
            actuators: 1,
            permission: true,
            primitives: Some(vec!["click".to_string(), "nonsense".to_string()]),
        };
        let platform = SimPlatform::from_config(&config);
        let service = platform.acquire().unwrap();

        assert_eq!(service.actuator_ids(), vec![ActuatorId(0)]);
        assert!(service.supports_primitives(ActuatorId(0), &[Primitive::Click]));
        assert!(!service.supports_primitives(ActuatorId(0), &[Primitive::Thud]));
    }
}
