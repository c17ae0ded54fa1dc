use anyhow::{Context, Result};
use convoy_application::SessionCoordinator;
use convoy_core::session::SessionId;
use std::time::Duration;

pub fn verify(coordinator: &SessionCoordinator, session_id: &SessionId, worker: &str) -> Result<bool> {
    let passed = coordinator.verify_worker_compliance(session_id, worker);
    let report = coordinator.check_worker_compliance(session_id, worker);

    if passed {
        println!("{} is compliant ({} events)", worker, report.events_seen.len());
    } else {
        println!("{} is NOT compliant", worker);
        for failure in report.failures() {
            println!("  - {}", failure);
        }
    }
    Ok(passed)
}

pub fn health(coordinator: &SessionCoordinator, session_id: &SessionId) -> Result<bool> {
    let stale = coordinator
        .check_worker_health(session_id)
        .with_context(|| format!("Failed to check health of {}", session_id))?;

    if stale.is_empty() {
        println!("All active workers are healthy");
    }
    for worker in &stale {
        println!(
            "STALE {} (last heartbeat {}, {}s ago)",
            worker.worker, worker.last_heartbeat, worker.elapsed_seconds
        );
    }
    Ok(stale.is_empty())
}

/// Checks health every `interval_secs` until Ctrl-C.
pub async fn watch(
    coordinator: &SessionCoordinator,
    session_id: &SessionId,
    interval_secs: u64,
) -> Result<bool> {
    let mut ticker = tokio::time::interval(Duration::from_secs(interval_secs.max(1)));

    tracing::info!(
        "[watch] Polling {} every {}s (Ctrl-C to stop)",
        session_id,
        interval_secs.max(1)
    );

    loop {
        tokio::select! {
            _ = ticker.tick() => {
                match coordinator.check_worker_health(session_id) {
                    Ok(stale) if stale.is_empty() => {
                        tracing::info!("[watch] {}: all active workers healthy", session_id);
                    }
                    Ok(stale) => {
                        for worker in stale {
                            tracing::warn!(
                                "[watch] {}: {} stale for {}s (last heartbeat {})",
                                session_id,
                                worker.worker,
                                worker.elapsed_seconds,
                                worker.last_heartbeat
                            );
                        }
                    }
                    Err(e) => tracing::error!("[watch] {}: {}", session_id, e),
                }
            }
            signal = tokio::signal::ctrl_c() => {
                signal.context("Failed to listen for Ctrl-C")?;
                tracing::info!("[watch] Stopped");
                return Ok(true);
            }
        }
    }
}
