use anyhow::{Context, Result};
use convoy_application::SessionCoordinator;
use convoy_core::session::SessionId;
use convoy_core::state::MergeStrategy;
use serde_json::Value;

pub fn update(
    coordinator: &SessionCoordinator,
    session_id: &SessionId,
    patch: &str,
    strategy: MergeStrategy,
) -> Result<bool> {
    let patch: Value = serde_json::from_str(patch).context("Patch must be valid JSON")?;
    let state = coordinator
        .update_state(session_id, &patch, strategy)
        .with_context(|| format!("Failed to update state of {}", session_id))?;

    println!("{}", serde_json::to_string_pretty(&state)?);
    Ok(true)
}

pub fn show(coordinator: &SessionCoordinator, session_id: &SessionId, recover: bool) -> Result<bool> {
    let state = if recover {
        coordinator.load_or_recover(session_id)
    } else {
        coordinator.read_state(session_id)
    }
    .with_context(|| format!("Failed to read state of {}", session_id))?;

    println!("{}", serde_json::to_string_pretty(&state)?);
    Ok(true)
}

pub fn validate(coordinator: &SessionCoordinator, session_id: &SessionId) -> Result<bool> {
    let validation = coordinator
        .validate(session_id)
        .with_context(|| format!("Failed to read state of {}", session_id))?;

    if validation.workers.is_empty() {
        println!("No workers registered in {}", session_id);
    }
    for (worker, result) in &validation.workers {
        if result.passed() {
            println!("ok    {}", worker);
        } else {
            println!("FAIL  {}: {}", worker, result.failed_checks().join(", "));
        }
    }
    Ok(validation.passed())
}

pub fn recover(coordinator: &SessionCoordinator, session_id: &SessionId, write: bool) -> Result<bool> {
    let state = if write {
        coordinator.restore_from_events(session_id, "requested from the command line")?
    } else {
        serde_json::to_value(coordinator.recover_state(session_id)?)?
    };

    println!("{}", serde_json::to_string_pretty(&state)?);
    Ok(true)
}
