//! hapticd Daemon
//!
//! A daemon exposing the haptic dispatch controller on the session bus:
//! one-shot, waveform, and primitive-composition vibration with
//! directional weighting across actuators.

use std::path::PathBuf;
use std::sync::{Arc, RwLock};

use clap::Parser;
use tracing::{error, info, warn, Level};
use tracing_subscriber::FmtSubscriber;

use hapticd::{
    config::{Config, SharedConfig},
    controller::new_shared_controller,
    dbus::init_dbus_service,
    primitive::ALL_PRIMITIVES,
    sim::SimPlatform,
    watcher::start_config_watcher,
};

/// hapticd - Haptics dispatch daemon with directional actuator routing
#[derive(Parser, Debug)]
#[command(name = "hapticd")]
#[command(version, about, long_about = None)]
struct Args {
    /// Configuration file path (default: ~/.config/hapticd/config.json)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    /// List the acquired actuator topology and exit
    #[arg(long)]
    list_actuators: bool,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    // Initialize logging
    let level = if args.verbose { Level::DEBUG } else { Level::INFO };
    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    info!("hapticd starting...");

    // Load configuration from the given path or the default location
    let config = match &args.config {
        Some(path) => Config::load(path),
        None => Config::create_default_if_missing(),
    };
    let config = match config {
        Ok(config) => config,
        Err(e) => {
            warn!("Failed to load config, using defaults: {}", e);
            Config::default()
        }
    };

    // Bind the configured platform and acquire the service handle
    let platform = SimPlatform::from_config(&config.sim);
    let controller = new_shared_controller(&config.haptics);
    {
        let mut controller = controller.lock().unwrap();
        controller.initialize(&platform);
        if !controller.is_initialized() {
            warn!("No actuator service acquired, all requests will no-op");
        }
    }

    // Handle --list-actuators flag
    if args.list_actuators {
        list_actuators(&controller);
        return Ok(());
    }

    let config_path = config.config_path.clone();
    let shared_config: SharedConfig = Arc::new(RwLock::new(config));

    // Initialize D-Bus service with config and controller
    let _dbus_connection = match init_dbus_service(
        shared_config.clone(),
        controller.clone(),
    ).await {
        Ok(conn) => {
            info!("D-Bus service initialized successfully");
            conn
        }
        Err(e) => {
            error!("Failed to initialize D-Bus service: {}", e);
            return Err(e.into());
        }
    };

    // Watch the config file for edits (non-fatal when unavailable)
    match config_path {
        Some(path) => {
            if let Err(e) = start_config_watcher(path, shared_config.clone(), controller.clone()) {
                warn!("Config watcher unavailable: {}", e);
            }
        }
        None => warn!("No config path resolved, hot-reload disabled"),
    }

    info!("hapticd ready");

    // Wait for shutdown signal
    tokio::signal::ctrl_c().await?;
    info!("Shutdown signal received, exiting...");

    // Stop any in-flight effect and release the service handle
    match controller.lock() {
        Ok(mut controller) => controller.dispose(),
        Err(e) => error!("Failed to lock controller for dispose: {}", e),
    }

    Ok(())
}

/// Print the acquired actuator topology and primitive support
fn list_actuators(controller: &hapticd::controller::SharedController) {
    let controller = controller.lock().unwrap();

    let Some(generation) = controller.generation() else {
        println!("No actuator service acquired.");
        println!("\nTroubleshooting:");
        println!("  - Check that sim.permission is true in config.json");
        println!("  - Check the configured sim.api_level and sim.actuators");
        return;
    };

    let ids = controller.actuator_ids();
    println!("Actuator service: {} interface", generation);
    println!("Actuators: {}\n", ids.len());

    for (i, id) in ids.iter().enumerate() {
        println!("{}. actuator id {}", i + 1, id);
    }

    println!("\nPrimitive support (default actuator):");
    for primitive in ALL_PRIMITIVES {
        let supported = controller.is_primitive_supported(primitive.to_id());
        let marker = if supported { "yes" } else { "no" };
        println!("  {:<16} {}", primitive.to_string(), marker);
    }
}
