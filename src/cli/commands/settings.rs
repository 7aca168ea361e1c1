use anyhow::{Context, Result};
use uuid::Uuid;

use crate::cli::context::CliContext;

/// Handle settings show command
pub async fn handle_show(ctx: &CliContext, user_id: Uuid, json: bool) -> Result<()> {
    let settings = ctx
        .service
        .get_settings(user_id)
        .await
        .context("Failed to load settings")?;

    if json {
        println!("{}", serde_json::to_string_pretty(&settings)?);
    } else {
        println!("Pomodoro settings:");
        println!("  Focus: {} minute(s)", settings.focus_minutes);
        println!("  Short break: {} minute(s)", settings.short_break_minutes);
        println!("  Long break: {} minute(s)", settings.long_break_minutes);
        println!("  Long break every: {} focus session(s)", settings.long_break_every);
        println!("  Auto-start breaks: {}", settings.auto_start_breaks);
        println!("  Auto-start focus: {}", settings.auto_start_focus);
        println!("  Sound: {}", settings.sound);
        println!("  Notifications: {}", settings.notifications);
    }
    Ok(())
}

/// Handle settings set command
#[allow(clippy::too_many_arguments, clippy::fn_params_excessive_bools)]
pub async fn handle_set(
    ctx: &CliContext,
    user_id: Uuid,
    focus: Option<u32>,
    short_break: Option<u32>,
    long_break: Option<u32>,
    long_break_every: Option<u32>,
    auto_start_breaks: Option<bool>,
    auto_start_focus: Option<bool>,
    sound: Option<String>,
    notifications: Option<bool>,
    json: bool,
) -> Result<()> {
    if focus.is_none()
        && short_break.is_none()
        && long_break.is_none()
        && long_break_every.is_none()
        && auto_start_breaks.is_none()
        && auto_start_focus.is_none()
        && sound.is_none()
        && notifications.is_none()
    {
        anyhow::bail!("At least one setting must be given. See 'focusflow settings set --help'.");
    }

    let mut settings = ctx
        .service
        .get_settings(user_id)
        .await
        .context("Failed to load settings")?;

    if let Some(v) = focus {
        settings.focus_minutes = v;
    }
    if let Some(v) = short_break {
        settings.short_break_minutes = v;
    }
    if let Some(v) = long_break {
        settings.long_break_minutes = v;
    }
    if let Some(v) = long_break_every {
        settings.long_break_every = v;
    }
    if let Some(v) = auto_start_breaks {
        settings.auto_start_breaks = v;
    }
    if let Some(v) = auto_start_focus {
        settings.auto_start_focus = v;
    }
    if let Some(v) = sound {
        settings.sound = v;
    }
    if let Some(v) = notifications {
        settings.notifications = v;
    }

    if settings.focus_minutes == 0 || settings.short_break_minutes == 0 || settings.long_break_minutes == 0 {
        anyhow::bail!("Durations must be at least 1 minute.");
    }
    if settings.long_break_every == 0 {
        anyhow::bail!("long_break_every must be at least 1.");
    }

    ctx.service
        .update_settings(user_id, &settings)
        .await
        .context("Failed to save settings")?;

    if json {
        println!("{}", serde_json::to_string_pretty(&settings)?);
    } else {
        println!("Settings updated.");
    }
    Ok(())
}
