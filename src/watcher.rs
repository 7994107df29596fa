//! Config file hot-reload
//!
//! Watches the configuration file and re-applies haptics settings to
//! the live controller when it changes. Complements the `ReloadConfig`
//! D-Bus method for editors that write the file directly.

use std::path::{Path, PathBuf};
use std::sync::mpsc;
use std::thread;

use notify::{recommended_watcher, EventKind, RecursiveMode, Watcher};

use crate::config::{Config, SharedConfig};
use crate::controller::SharedController;

/// Watch a config file and push changes into config and controller
///
/// Spawns a background thread owning the filesystem watcher; the thread
/// lives for the rest of the process. The parent directory is watched
/// rather than the file itself because most editors replace the file on
/// save, which would invalidate a direct watch.
///
/// Returns an error when the watch cannot be established (missing
/// directory, exhausted inotify instances); the daemon treats that as
/// non-fatal and keeps running without hot-reload.
pub fn start_config_watcher(
    path: PathBuf,
    config: SharedConfig,
    controller: SharedController,
) -> notify::Result<()> {
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from("."),
    };

    let (tx, rx) = mpsc::channel();
    let mut watcher = recommended_watcher(tx)?;
    watcher.watch(&dir, RecursiveMode::NonRecursive)?;

    tracing::info!(path = %path.display(), "Config file watcher started");

    thread::Builder::new()
        .name("config-watcher".to_string())
        .spawn(move || {
            // Moved into the thread so the watch stays alive
            let _watcher = watcher;

            for event in rx {
                match event {
                    Ok(event) => {
                        if !matches!(
                            event.kind,
                            EventKind::Modify(_) | EventKind::Create(_)
                        ) {
                            continue;
                        }
                        if !event.paths.iter().any(|p| same_file(p, &path)) {
                            continue;
                        }
                        reload(&path, &config, &controller);
                    }
                    Err(e) => {
                        tracing::warn!(error = %e, "Config watch error");
                    }
                }
            }

            tracing::debug!("Config watcher channel closed");
        })
        .map_err(notify::Error::io)?;

    Ok(())
}

fn same_file(candidate: &Path, config_path: &Path) -> bool {
    match (candidate.file_name(), config_path.file_name()) {
        (Some(a), Some(b)) => a == b,
        _ => false,
    }
}

/// Re-read the config file and apply haptics settings to the controller
fn reload(path: &Path, config: &SharedConfig, controller: &SharedController) {
    let new_config = match Config::load(path) {
        Ok(new_config) => new_config,
        Err(e) => {
            tracing::warn!(error = %e, "Config reload after file change failed");
            return;
        }
    };

    let haptics = new_config.haptics.clone();

    match config.write() {
        Ok(mut config) => {
            *config = new_config;
            tracing::info!(
                haptics_enabled = config.haptics.enabled,
                intensity = config.haptics.intensity,
                directional = config.haptics.directional,
                "Configuration reloaded after file change"
            );
        }
        Err(e) => {
            tracing::error!(error = %e, "Failed to acquire config write lock");
            return;
        }
    }

    match controller.lock() {
        Ok(mut controller) => controller.update_from_config(&haptics),
        Err(e) => {
            tracing::error!(error = %e, "Failed to lock controller for update");
        }
    }
}
