use anyhow::{Context, Result};
use uuid::Uuid;

use crate::cli::context::CliContext;
use crate::domain::models::{Task, TaskPriority, TaskStatus};

/// Handle task add command
pub async fn handle_add(
    ctx: &CliContext,
    user_id: Uuid,
    title: String,
    description: Option<String>,
    priority: String,
    estimate: Option<u32>,
    json: bool,
) -> Result<()> {
    let priority = TaskPriority::from_str(&priority)
        .with_context(|| format!("Invalid priority '{priority}'. Use low, medium, or high."))?;

    let mut task = Task::new(user_id, title).with_priority(priority);
    if let Some(description) = description {
        task = task.with_description(description);
    }
    if let Some(estimate) = estimate {
        task = task.with_estimate(estimate);
    }
    task.validate().map_err(|msg| anyhow::anyhow!(msg))?;

    ctx.tasks.create(&task).await.context("Failed to add task")?;

    if json {
        println!("{}", serde_json::to_string_pretty(&task)?);
    } else {
        println!("Task added!");
        println!("  ID: {}", task.id);
        println!("  Title: {}", task.title);
        println!("  Priority: {}", task.priority.as_str());
        if let Some(estimate) = task.estimated_pomodoros {
            println!("  Estimate: {estimate} pomodoro(s)");
        }
    }

    Ok(())
}

/// Handle task list command
pub async fn handle_list(
    ctx: &CliContext,
    user_id: Uuid,
    status: Option<String>,
    json: bool,
) -> Result<()> {
    let status = match status {
        Some(s) => Some(
            TaskStatus::from_str(&s).with_context(|| format!("Invalid status filter '{s}'"))?,
        ),
        None => None,
    };

    let tasks = ctx
        .tasks
        .list_for_owner(user_id, status)
        .await
        .context("Failed to list tasks")?;

    if json {
        println!("{}", serde_json::to_string_pretty(&tasks)?);
    } else {
        if tasks.is_empty() {
            println!("No tasks found.");
            return Ok(());
        }

        for task in &tasks {
            println!(
                "{}  [{}] {} ({})",
                task.id,
                task.status.as_str(),
                task.title,
                task.priority.as_str()
            );
        }
        println!("\nShowing {} task(s)", tasks.len());
    }

    Ok(())
}

/// Handle task show command
pub async fn handle_show(ctx: &CliContext, user_id: Uuid, task_id: Uuid, json: bool) -> Result<()> {
    let task = ctx
        .tasks
        .get_owned(task_id, user_id)
        .await
        .context("Failed to retrieve task")?
        .ok_or_else(|| {
            anyhow::anyhow!("Task {task_id} not found. Use 'focusflow task list' to see your tasks.")
        })?;

    if json {
        println!("{}", serde_json::to_string_pretty(&task)?);
    } else {
        println!("Task Details:");
        println!("  ID: {}", task.id);
        println!("  Title: {}", task.title);
        if !task.description.is_empty() {
            println!("  Description: {}", task.description);
        }
        println!("  Status: {}", task.status.as_str());
        println!("  Priority: {}", task.priority.as_str());
        if let Some(estimate) = task.estimated_pomodoros {
            println!("  Estimate: {estimate} pomodoro(s)");
        }
        println!("  Focus time: {}s", task.total_focus_seconds);
        println!(
            "  Created at: {}",
            task.created_at.format("%Y-%m-%d %H:%M:%S UTC")
        );
        if let Some(started_at) = task.started_at {
            println!(
                "  Started at: {}",
                started_at.format("%Y-%m-%d %H:%M:%S UTC")
            );
        }
        if let Some(ended_at) = task.ended_at {
            println!("  Ended at: {}", ended_at.format("%Y-%m-%d %H:%M:%S UTC"));
        }
    }

    Ok(())
}
