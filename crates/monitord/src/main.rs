// # monitord - Monitor Reconciliation Daemon
//
// Keeps real-time monitors on the hosted configuration service converged
// with a declared desired-state file. monitord is a thin host around
// monitor-core: it owns configuration, the poll loop, persistence and
// shutdown. Every reconciliation decision lives in monitor-core.
//
// Each cycle:
// 1. Re-reads the desired-state file
// 2. Observes every declared monitor, then creates or updates it as needed
// 3. Deletes monitors that were removed from the file
// 4. Persists identities and status conditions to the state file
//
// See `config.rs` for the environment variables.
//
// ## Example
//
// ```bash
// export MONITOR_API_KEY=...
// export MONITOR_SPEC_PATH=/etc/monitord/monitors.json
// export MONITOR_STATE_PATH=/var/lib/monitord/state.json
//
// monitord
// ```

mod config;
mod cycle;
mod desired;
mod state;

use anyhow::{Context, Result};
use monitor_client_http::HttpMonitorClient;
use monitor_core::{MonitorClient, MonitorReconciler};
use std::process::ExitCode;
use std::time::Duration;
use tokio::time::MissedTickBehavior;
use tracing::{Level, error, info, warn};
use tracing_subscriber::FmtSubscriber;

#[cfg(unix)]
use tokio::signal::unix::{SignalKind, signal};

use crate::config::Config;
use crate::state::{FileMonitorStore, MonitorStore};

/// Exit codes for different termination scenarios
///
/// These codes follow systemd conventions:
/// - 0: Clean shutdown
/// - 1: Configuration or startup error
/// - 2: Runtime error (unexpected)
#[derive(Debug, Clone, Copy)]
enum MonitordExitCode {
    /// Clean shutdown (normal exit)
    CleanShutdown = 0,
    /// Configuration error or startup failure
    ConfigError = 1,
    /// Runtime error (unexpected failure)
    RuntimeError = 2,
}

impl From<MonitordExitCode> for ExitCode {
    fn from(code: MonitordExitCode) -> Self {
        ExitCode::from(code as u8)
    }
}

fn main() -> ExitCode {
    let config = match Config::from_env() {
        Ok(cfg) => cfg,
        Err(e) => {
            eprintln!("Configuration error: {:#}", e);
            return MonitordExitCode::ConfigError.into();
        }
    };

    if let Err(e) = config.validate() {
        eprintln!("Configuration validation error: {:#}", e);
        return MonitordExitCode::ConfigError.into();
    }

    let log_level = match config.log_level.to_lowercase().as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    };

    let subscriber = FmtSubscriber::builder().with_max_level(log_level).finish();

    if let Err(e) = tracing::subscriber::set_global_default(subscriber) {
        eprintln!("Failed to set tracing subscriber: {}", e);
        return MonitordExitCode::ConfigError.into();
    }

    info!("Starting monitord");
    info!("Configuration loaded: {:?}", config.client_config());

    let rt = match tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
    {
        Ok(runtime) => runtime,
        Err(e) => {
            error!("Failed to create tokio runtime: {}", e);
            return MonitordExitCode::RuntimeError.into();
        }
    };

    let result = rt.block_on(async {
        let (reconciler, store, desired) = match start(&config).await {
            Ok(parts) => parts,
            Err(e) => {
                error!("Startup failed: {:#}", e);
                return MonitordExitCode::ConfigError;
            }
        };

        if let Err(e) = run_daemon(&config, &reconciler, &store, desired).await {
            error!("Daemon error: {:#}", e);
            MonitordExitCode::RuntimeError
        } else {
            MonitordExitCode::CleanShutdown
        }
    });

    result.into()
}

/// Build the client, check connectivity, open the state store and load the
/// desired state once so that a broken setup fails fast
async fn start(
    config: &Config,
) -> Result<(MonitorReconciler, FileMonitorStore, desired::DesiredMonitors)> {
    let client = HttpMonitorClient::new(config.client_config())?;

    let existing = client
        .list_monitors()
        .await
        .context("Connectivity check against the monitor service failed")?;
    info!(
        "Connected to monitor service via {} client: {} monitor(s) visible",
        client.client_name(),
        existing.len()
    );

    let reconciler = MonitorReconciler::new(Box::new(client));

    let store = FileMonitorStore::new(&config.state_path).await?;
    info!("Using state file {}", config.state_path.display());

    let desired = desired::load(&config.spec_path).await?;
    info!("Managing {} monitor(s)", desired.len());

    Ok((reconciler, store, desired))
}

/// Run reconciliation cycles until a shutdown signal arrives
async fn run_daemon(
    config: &Config,
    reconciler: &MonitorReconciler,
    store: &FileMonitorStore,
    mut desired: desired::DesiredMonitors,
) -> Result<()> {
    let mut ticker = tokio::time::interval(Duration::from_secs(config.poll_interval_secs));
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    let shutdown = wait_for_shutdown();
    tokio::pin!(shutdown);

    loop {
        tokio::select! {
            signal = &mut shutdown => {
                info!("Received shutdown signal: {}", signal?);
                break;
            }
            _ = ticker.tick() => {
                match desired::load(&config.spec_path).await {
                    Ok(reloaded) => desired = reloaded,
                    Err(e) => warn!("Keeping previous desired state: {:#}", e),
                }
                cycle::run_cycle(reconciler, store, &desired).await?;
            }
        }
    }

    info!("Shutting down daemon");
    store.flush().await
}

/// Wait for shutdown signals (SIGTERM, SIGINT)
///
/// Returns the name of the signal received.
#[cfg(unix)]
async fn wait_for_shutdown() -> Result<&'static str> {
    let mut sigterm = signal(SignalKind::terminate())
        .map_err(|e| anyhow::anyhow!("Failed to setup SIGTERM handler: {}", e))?;
    let mut sigint = signal(SignalKind::interrupt())
        .map_err(|e| anyhow::anyhow!("Failed to setup SIGINT handler: {}", e))?;

    Ok(tokio::select! {
        _ = sigterm.recv() => "SIGTERM",
        _ = sigint.recv() => "SIGINT",
    })
}

/// Wait for shutdown signals (SIGINT only)
///
/// Fallback implementation for non-Unix platforms.
#[cfg(not(unix))]
async fn wait_for_shutdown() -> Result<&'static str> {
    tokio::signal::ctrl_c()
        .await
        .map_err(|e| anyhow::anyhow!("Failed to wait for CTRL-C: {}", e))?;
    Ok("SIGINT")
}
