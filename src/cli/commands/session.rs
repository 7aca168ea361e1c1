use anyhow::{Context, Result};
use uuid::Uuid;

use crate::cli::context::CliContext;
use crate::domain::models::{BreakType, Session};
use crate::services::ActiveSessionView;

fn format_clock(seconds: i64) -> String {
    let seconds = seconds.max(0);
    format!("{:02}:{:02}", seconds / 60, seconds % 60)
}

fn print_session(session: &Session) {
    let kind = if session.is_break {
        session
            .break_type
            .map_or("break", |b| b.as_str())
            .to_string()
    } else {
        "focus".to_string()
    };

    println!("  Session: {}", session.id);
    println!("  Kind: {kind}");
    if let Some(task_id) = session.task_id {
        println!("  Task: {task_id}");
    }
    println!("  Length: {} minute(s)", session.duration_minutes);
    println!(
        "  Started at: {}",
        session.started_at.format("%Y-%m-%d %H:%M:%S UTC")
    );
}

/// Handle start command
pub async fn handle_start(
    ctx: &CliContext,
    user_id: Uuid,
    task_id: Uuid,
    duration: Option<u32>,
    json: bool,
) -> Result<()> {
    let session = ctx
        .service
        .start_focus(user_id, task_id, duration)
        .await
        .context("Failed to start focus session")?;

    if json {
        println!("{}", serde_json::to_string_pretty(&session)?);
    } else {
        println!("Focus session running!");
        print_session(&session);
    }
    Ok(())
}

/// Handle pause command
pub async fn handle_pause(ctx: &CliContext, user_id: Uuid, task_id: Uuid, json: bool) -> Result<()> {
    let session = ctx
        .service
        .pause(user_id, task_id)
        .await
        .context("Failed to pause session")?;

    if json {
        println!("{}", serde_json::to_string_pretty(&session)?);
    } else {
        println!("Session paused.");
        print_session(&session);
    }
    Ok(())
}

/// Handle resume command
pub async fn handle_resume(
    ctx: &CliContext,
    user_id: Uuid,
    task_id: Uuid,
    json: bool,
) -> Result<()> {
    let session = ctx
        .service
        .resume(user_id, task_id)
        .await
        .context("Failed to resume session")?;

    if json {
        println!("{}", serde_json::to_string_pretty(&session)?);
    } else {
        println!("Session resumed.");
        print_session(&session);
    }
    Ok(())
}

/// Handle break command
pub async fn handle_break(
    ctx: &CliContext,
    user_id: Uuid,
    kind: String,
    duration: Option<u32>,
    json: bool,
) -> Result<()> {
    let break_type = BreakType::from_str(&kind)
        .with_context(|| format!("Invalid break kind '{kind}'. Use short or long."))?;

    let session = ctx
        .service
        .start_break(user_id, break_type, duration)
        .await
        .context("Failed to start break")?;

    if json {
        println!("{}", serde_json::to_string_pretty(&session)?);
    } else {
        println!("Break running!");
        print_session(&session);
    }
    Ok(())
}

/// Handle complete command
pub async fn handle_complete(
    ctx: &CliContext,
    user_id: Uuid,
    task_id: Uuid,
    json: bool,
) -> Result<()> {
    let task = ctx
        .service
        .complete_task(user_id, task_id)
        .await
        .context("Failed to complete task")?;

    if json {
        println!("{}", serde_json::to_string_pretty(&task)?);
    } else {
        println!("Task completed!");
        println!("  ID: {}", task.id);
        println!("  Title: {}", task.title);
        println!("  Total focus time: {}", format_clock(task.total_focus_seconds));
    }
    Ok(())
}

fn print_view(view: &ActiveSessionView) {
    if !view.active {
        println!("No active session.");
        return;
    }

    println!("State: {}", view.fsm_state.as_str());
    if let Some(session_id) = view.session_id {
        println!("  Session: {session_id}");
    }
    if let Some(task_id) = view.task_id {
        println!("  Task: {task_id}");
    }
    println!(
        "  Remaining: {} of {}",
        format_clock(view.remaining_seconds),
        format_clock(view.total_duration_seconds)
    );
    if view.paused_seconds > 0 {
        println!("  Paused: {}", format_clock(view.paused_seconds));
    }
}

/// Handle status command
pub async fn handle_status(
    ctx: &CliContext,
    user_id: Uuid,
    task_id: Option<Uuid>,
    json: bool,
) -> Result<()> {
    let view = ctx
        .service
        .get_active(user_id, task_id)
        .await
        .context("Failed to read session status")?;

    if json {
        println!("{}", serde_json::to_string_pretty(&view)?);
    } else {
        print_view(&view);
    }
    Ok(())
}

/// Handle sessions command
pub async fn handle_sessions(
    ctx: &CliContext,
    user_id: Uuid,
    task_id: Uuid,
    json: bool,
) -> Result<()> {
    let sessions = ctx
        .service
        .task_sessions(user_id, task_id)
        .await
        .context("Failed to list sessions")?;

    if json {
        println!("{}", serde_json::to_string_pretty(&sessions)?);
    } else {
        if sessions.is_empty() {
            println!("No sessions recorded for this task.");
            return Ok(());
        }

        for session in &sessions {
            let kind = if session.is_break {
                session.break_type.map_or("break", |b| b.as_str())
            } else {
                "focus"
            };
            let outcome = if session.completed {
                session
                    .actual_duration_seconds
                    .map_or_else(|| "done".to_string(), format_clock)
            } else {
                "open".to_string()
            };
            println!(
                "{}  {}  {:5}  {}",
                session.started_at.format("%Y-%m-%d %H:%M"),
                session.id,
                kind,
                outcome
            );
        }
        println!("\nShowing {} session(s)", sessions.len());
    }
    Ok(())
}

/// Handle watch command: poll the heartbeat and print each tick.
pub async fn handle_watch(ctx: &CliContext, user_id: Uuid, interval: u64, json: bool) -> Result<()> {
    let interval = std::time::Duration::from_secs(interval.max(1));

    loop {
        let heartbeat = ctx
            .service
            .heartbeat(user_id)
            .await
            .context("Failed to poll session")?;

        if json {
            println!("{}", serde_json::to_string(&heartbeat)?);
        } else if let Some(snapshot) = &heartbeat.snapshot {
            println!(
                "{}  {}  remaining {}",
                chrono::Utc::now().format("%H:%M:%S"),
                snapshot.fsm_state.as_str(),
                format_clock(snapshot.remaining_seconds)
            );
        }

        if !heartbeat.active {
            if !json {
                println!("No active session.");
            }
            return Ok(());
        }

        tokio::time::sleep(interval).await;
    }
}
