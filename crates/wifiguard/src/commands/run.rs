//! Daemon mode: aligned poll loop plus the HTTP trigger.

use std::net::SocketAddr;

use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use wifiguard_core::{WifiController, run_poll_loop};

use crate::cli::{GlobalOpts, RunArgs};
use crate::config;
use crate::error::CliError;
use crate::server;

fn trigger_addr(args: &RunArgs, configured: &str) -> Result<SocketAddr, CliError> {
    if let Some(addr) = args.bind {
        return Ok(addr);
    }
    configured.parse().map_err(|e| CliError::Validation {
        field: "server.bind".into(),
        reason: format!("'{configured}': {e}"),
    })
}

/// Log every router session transition until shutdown.
async fn log_session_phases(controller: WifiController, cancel: CancellationToken) {
    let mut phases = controller.subscribe_phase();
    loop {
        tokio::select! {
            () = cancel.cancelled() => break,
            changed = phases.changed() => {
                if changed.is_err() {
                    break;
                }
                let phase = *phases.borrow_and_update();
                debug!(?phase, "router session");
            }
        }
    }
}

pub async fn handle(args: RunArgs, global: &GlobalOpts) -> Result<(), CliError> {
    let cfg = config::load(global)?;
    let mut schedule = wifiguard_config::poll_schedule(&cfg.schedule)?;
    schedule.run_on_start |= args.now;

    let controller = config::build_controller(&cfg, global)?;

    // Bind before spawning anything so a taken port fails fast
    let listener = if cfg.server.enabled && !args.no_server {
        let addr = trigger_addr(&args, &cfg.server.bind)?;
        Some(server::bind(addr).await?)
    } else {
        None
    };

    let cancel = CancellationToken::new();
    let phases = tokio::spawn(log_session_phases(controller.clone(), cancel.clone()));
    let poller = tokio::spawn(run_poll_loop(
        controller.clone(),
        schedule,
        cancel.clone(),
    ));
    let trigger = listener.map(|listener| {
        tokio::spawn(server::serve(listener, controller.clone(), cancel.clone()))
    });

    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!(error = %e, "cannot listen for ctrl-c, stopping");
    }
    info!("shutting down");
    cancel.cancel();

    if let Err(e) = poller.await {
        warn!(error = %e, "poll loop ended abnormally");
    }
    if let Err(e) = phases.await {
        warn!(error = %e, "session logger ended abnormally");
    }
    let served = match trigger {
        Some(handle) => match handle.await {
            Ok(result) => result,
            Err(e) => {
                warn!(error = %e, "http trigger ended abnormally");
                Ok(())
            }
        },
        None => Ok(()),
    };

    controller.close().await;
    served
}
