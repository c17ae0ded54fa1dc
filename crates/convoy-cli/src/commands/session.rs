use anyhow::{Context, Result};
use chrono::Utc;
use convoy_application::SessionCoordinator;
use convoy_core::debug::DebugLevel;
use convoy_core::session::SessionId;

pub fn create(
    coordinator: &SessionCoordinator,
    task: &str,
    session_id: Option<SessionId>,
    description: Option<String>,
) -> Result<bool> {
    let session_id = session_id.unwrap_or_else(|| SessionId::generate(task, Utc::now()));
    let description = description.unwrap_or_else(|| task.to_string());

    coordinator
        .create_session(&session_id, Some(&description))
        .with_context(|| format!("Failed to create session {}", session_id))?;

    println!("{}", session_id);
    println!("  {}", coordinator.layout(&session_id).dir().display());
    Ok(true)
}

pub fn event(
    coordinator: &SessionCoordinator,
    session_id: &SessionId,
    event_type: &str,
    agent: &str,
    details: &str,
    status: Option<&str>,
) -> Result<bool> {
    coordinator
        .log_event(session_id, event_type, agent, details, status)
        .with_context(|| format!("Failed to log {} for {}", event_type, session_id))?;
    Ok(true)
}

pub fn debug(
    coordinator: &SessionCoordinator,
    session_id: &SessionId,
    level: DebugLevel,
    agent: &str,
    message: &str,
    context: Option<&str>,
) -> Result<bool> {
    let context = context
        .map(serde_json::from_str::<serde_json::Value>)
        .transpose()
        .context("--context must be valid JSON")?;

    coordinator
        .log_debug(session_id, level, agent, message, context)
        .with_context(|| format!("Failed to log debug entry for {}", session_id))?;
    Ok(true)
}
