//! Unidle - A state-managed background agent to keep the system awake
//!
//! This is the main entry point for the unidle application.

use tokio::sync::watch;
use tracing::{debug, info};

use unidle::{
    config::Config,
    controller::Controller,
    hotkey::register_toggle_hotkey,
    platform,
    state::ActivityState,
    utils::shutdown_signal,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::parse();

    // Initialize tracing with appropriate log level
    tracing_subscriber::fmt()
        .with_env_filter(format!("unidle={}", config.log_level()))
        .init();

    info!("Starting unidle v1.0.0");
    info!(
        "Configuration: interval={}s, tick={}ms, action={:?}",
        config.interval, config.tick_ms, config.action
    );

    // Construct the single controller instance and move it into its task;
    // everything else holds a handle, never the state itself.
    let (controller, handle) = Controller::new(
        config.interval(),
        config.granularity(),
        config.action,
        platform::default_driver(),
        platform::default_guard(),
    );
    let controller_task = tokio::spawn(controller.run());

    // Global toggle hotkey; the manager must outlive the registration.
    // Registration failure was already logged and the agent stays usable.
    let _hotkey_manager = register_toggle_hotkey(&handle);

    // Textual status indicator fed by the controller's watch channel.
    let status_task = tokio::spawn(status_indicator_task(handle.updates()));

    if config.start_active {
        handle.toggle();
    }

    info!("Press Super+Shift+J to toggle, Ctrl+C to quit");

    // Setup graceful shutdown
    tokio::select! {
        _ = controller_task => {
            tracing::error!("Controller task ended unexpectedly");
        }
        signal = shutdown_signal() => {
            match signal {
                Some(signal) => info!("Shutdown signal {} received", signal),
                None => info!("Signal stream ended"),
            }
        }
    }

    status_task.abort();
    info!("Shutdown complete");
    Ok(())
}

/// Log activation flips and performed actions observed on the watch channel.
///
/// Stands in for the popover/status-bar surface: it consumes the same
/// snapshots a real UI would render.
async fn status_indicator_task(mut updates: watch::Receiver<ActivityState>) {
    let mut last_seen: ActivityState = updates.borrow().clone();

    while updates.changed().await.is_ok() {
        let snapshot = updates.borrow().clone();

        if snapshot.action_count > last_seen.action_count {
            info!(
                "Action #{} performed; next in {}s",
                snapshot.action_count,
                snapshot.remaining_seconds()
            );
        } else if snapshot.is_active() {
            debug!("Next action in {}s", snapshot.remaining_seconds());
        }

        last_seen = snapshot;
    }
}
