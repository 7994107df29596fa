//! Configuration management for hapticd
//!
//! Handles loading, validation, and hot-reload of JSON configuration files.
//! Configuration is stored at `~/.config/hapticd/config.json`.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::actuator::MULTI_ACTUATOR_MIN_API;

// ============================================================================
// Constants
// ============================================================================

/// Default config directory name
const CONFIG_DIR: &str = "hapticd";

/// Default config file name
const CONFIG_FILE: &str = "config.json";

/// Default global intensity multiplier (0-100, 100 = identity)
const DEFAULT_INTENSITY: u8 = 100;

// ============================================================================
// Haptics Configuration
// ============================================================================

/// Haptic dispatch configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HapticsConfig {
    /// Enable haptic dispatch
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// Global intensity multiplier (0-100)
    #[serde(default = "default_intensity")]
    pub intensity: u8,

    /// Spread directional requests across actuators by weight
    ///
    /// When false, the directional entry points behave like the plain
    /// parallel ones.
    #[serde(default = "default_true")]
    pub directional: bool,
}

fn default_true() -> bool { true }
fn default_intensity() -> u8 { DEFAULT_INTENSITY }

impl Default for HapticsConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            intensity: DEFAULT_INTENSITY,
            directional: true,
        }
    }
}

impl HapticsConfig {
    /// Validate and clamp all values
    pub fn validate(&mut self) {
        self.intensity = self.intensity.min(100);
    }

    /// Check if haptics are effectively disabled
    pub fn is_disabled(&self) -> bool {
        !self.enabled || self.intensity == 0
    }
}

// ============================================================================
// Simulated Platform Configuration
// ============================================================================

/// Simulated platform topology the daemon binds at startup
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SimConfig {
    /// Platform API level, selects the service generation
    #[serde(default = "default_api_level")]
    pub api_level: u32,

    /// Number of actuators the platform enumerates
    #[serde(default = "default_actuators")]
    pub actuators: usize,

    /// Whether the vibrate permission is granted
    #[serde(default = "default_true")]
    pub permission: bool,

    /// Primitive names the default actuator supports (snake_case)
    ///
    /// Absent means every primitive is supported; unknown names are
    /// logged and ignored.
    #[serde(default)]
    pub primitives: Option<Vec<String>>,
}

fn default_api_level() -> u32 { MULTI_ACTUATOR_MIN_API }
fn default_actuators() -> usize { 2 }

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            api_level: MULTI_ACTUATOR_MIN_API,
            actuators: 2,
            permission: true,
            primitives: None,
        }
    }
}

// ============================================================================
// Main Configuration
// ============================================================================

/// Main configuration structure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Haptic dispatch settings
    #[serde(default)]
    pub haptics: HapticsConfig,

    /// Simulated platform topology
    #[serde(default)]
    pub sim: SimConfig,

    /// Configuration file path (not serialized)
    #[serde(skip)]
    pub config_path: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            haptics: HapticsConfig::default(),
            sim: SimConfig::default(),
            config_path: None,
        }
    }
}

impl Config {
    /// Get the default config directory path
    pub fn default_config_dir() -> Option<PathBuf> {
        dirs::config_dir().map(|p| p.join(CONFIG_DIR))
    }

    /// Get the default config file path
    pub fn default_config_path() -> Option<PathBuf> {
        Self::default_config_dir().map(|p| p.join(CONFIG_FILE))
    }

    /// Load configuration from the default location
    ///
    /// Returns default config if file doesn't exist.
    pub fn load_default() -> Result<Self, ConfigError> {
        match Self::default_config_path() {
            Some(path) => Self::load(&path),
            None => {
                tracing::warn!("Could not determine config directory, using defaults");
                Ok(Self::default())
            }
        }
    }

    /// Load configuration from file path
    ///
    /// Returns default config if file doesn't exist.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();

        // If file doesn't exist, return defaults
        if !path.exists() {
            tracing::info!(path = %path.display(), "Config file not found, using defaults");
            let mut config = Self::default();
            config.config_path = Some(path.to_path_buf());
            return Ok(config);
        }

        // Read and parse the file
        let contents = fs::read_to_string(path).map_err(ConfigError::IoError)?;
        let mut config: Config =
            serde_json::from_str(&contents).map_err(ConfigError::ParseError)?;

        // Validate and clamp values
        config.haptics.validate();
        config.config_path = Some(path.to_path_buf());

        tracing::info!(
            path = %path.display(),
            haptics_enabled = config.haptics.enabled,
            intensity = config.haptics.intensity,
            directional = config.haptics.directional,
            sim_api_level = config.sim.api_level,
            sim_actuators = config.sim.actuators,
            "Configuration loaded"
        );

        Ok(config)
    }

    /// Save configuration to file
    pub fn save(&self) -> Result<(), ConfigError> {
        let path = match &self.config_path {
            Some(p) => p.clone(),
            None => Self::default_config_path()
                .ok_or_else(|| ConfigError::ValidationError("No config path".to_string()))?,
        };

        // Ensure directory exists
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(ConfigError::IoError)?;
        }

        // Serialize and write
        let contents = serde_json::to_string_pretty(self).map_err(ConfigError::ParseError)?;
        fs::write(&path, contents).map_err(ConfigError::IoError)?;

        tracing::info!(path = %path.display(), "Configuration saved");
        Ok(())
    }

    /// Create default config file if it doesn't exist
    pub fn create_default_if_missing() -> Result<Self, ConfigError> {
        let config = Self::load_default()?;

        // Save defaults if file didn't exist
        if let Some(path) = &config.config_path {
            if !path.exists() {
                config.save()?;
                tracing::info!(path = %path.display(), "Created default configuration file");
            }
        }

        Ok(config)
    }

    /// Check if haptics are enabled
    pub fn haptics_enabled(&self) -> bool {
        self.haptics.enabled && self.haptics.intensity > 0
    }
}

// ============================================================================
// Shared Config (for hot-reload)
// ============================================================================

use std::sync::{Arc, RwLock};

/// Thread-safe shared configuration for hot-reload support
pub type SharedConfig = Arc<RwLock<Config>>;

/// Create a new shared config with defaults
pub fn new_shared_config() -> SharedConfig {
    Arc::new(RwLock::new(Config::default()))
}

/// Create a new shared config from file (or defaults if file doesn't exist)
pub fn load_shared_config() -> Result<SharedConfig, ConfigError> {
    let config = Config::load_default()?;
    Ok(Arc::new(RwLock::new(config)))
}

// ============================================================================
// Error Types
// ============================================================================

/// Configuration error type
#[derive(Debug)]
pub enum ConfigError {
    /// I/O error reading/writing file
    IoError(std::io::Error),
    /// JSON parsing error
    ParseError(serde_json::Error),
    /// Validation error
    ValidationError(String),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::IoError(e) => write!(f, "I/O error: {}", e),
            ConfigError::ParseError(e) => write!(f, "Parse error: {}", e),
            ConfigError::ValidationError(msg) => write!(f, "Validation error: {}", msg),
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::IoError(e) => Some(e),
            ConfigError::ParseError(e) => Some(e),
            ConfigError::ValidationError(_) => None,
        }
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert!(config.haptics.enabled);
        assert_eq!(config.haptics.intensity, 100);
        assert!(config.haptics.directional);
        assert_eq!(config.sim.api_level, MULTI_ACTUATOR_MIN_API);
        assert_eq!(config.sim.actuators, 2);
        assert!(config.sim.permission);
        assert!(config.sim.primitives.is_none());
    }

    #[test]
    fn test_haptics_config_validation() {
        let mut haptics = HapticsConfig {
            enabled: true,
            intensity: 150, // Should be clamped
            directional: true,
        };

        haptics.validate();
        assert_eq!(haptics.intensity, 100);
    }

    #[test]
    fn test_haptics_disabled_check() {
        let mut haptics = HapticsConfig::default();
        assert!(!haptics.is_disabled());

        haptics.enabled = false;
        assert!(haptics.is_disabled());

        haptics.enabled = true;
        haptics.intensity = 0;
        assert!(haptics.is_disabled());
    }

    #[test]
    fn test_config_json_parsing() {
        let json = r#"{
            "haptics": {
                "enabled": true,
                "intensity": 75
            },
            "sim": {
                "api_level": 30,
                "actuators": 1
            }
        }"#;

        let config: Config = serde_json::from_str(json).unwrap();
        assert_eq!(config.haptics.intensity, 75);
        // Defaults should fill in missing fields
        assert!(config.haptics.directional);
        assert_eq!(config.sim.api_level, 30);
        assert_eq!(config.sim.actuators, 1);
        assert!(config.sim.permission);
    }

    #[test]
    fn test_config_json_minimal() {
        // Minimal config should use all defaults
        let json = r#"{}"#;
        let config: Config = serde_json::from_str(json).unwrap();

        assert!(config.haptics.enabled);
        assert_eq!(config.haptics.intensity, 100);
        assert_eq!(config.sim.actuators, 2);
    }

    #[test]
    fn test_sim_primitive_list_parsing() {
        let json = r#"{"sim": {"primitives": ["click", "tick"]}}"#;
        let config: Config = serde_json::from_str(json).unwrap();

        let names = config.sim.primitives.unwrap();
        assert_eq!(names, vec!["click".to_string(), "tick".to_string()]);
    }

    #[test]
    fn test_zero_intensity_disables() {
        let json = r#"{"haptics": {"intensity": 0}}"#;
        let config: Config = serde_json::from_str(json).unwrap();

        assert!(!config.haptics_enabled()); // Effectively disabled
        assert!(config.haptics.is_disabled());
    }

    #[test]
    fn test_config_serialization() {
        let config = Config::default();
        let json = serde_json::to_string_pretty(&config).unwrap();

        // Should contain expected fields
        assert!(json.contains("haptics"));
        assert!(json.contains("intensity"));
        assert!(json.contains("directional"));
        assert!(json.contains("api_level"));
    }
}
