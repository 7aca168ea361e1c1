//! Command line interface: clap definitions, context wiring, and dispatch.

pub mod commands;
pub mod context;
pub mod types;

pub use context::CliContext;
pub use types::{Cli, Commands, SettingsCommands, TaskCommands};

use anyhow::Result;

/// Dispatch a parsed invocation.
pub async fn run(cli: Cli) -> Result<()> {
    // Init runs before any database or user exists.
    let command = match cli.command {
        Commands::Init { force } => {
            return commands::init::handle_init(force, cli.json).await;
        }
        command => command,
    };

    let ctx = CliContext::init().await?;
    let user_id = ctx.resolve_user(cli.user)?;

    match command {
        Commands::Init { .. } => unreachable!("handled above"),
        Commands::Task(task) => match task {
            TaskCommands::Add {
                title,
                description,
                priority,
                estimate,
            } => {
                commands::task::handle_add(&ctx, user_id, title, description, priority, estimate, cli.json)
                    .await
            }
            TaskCommands::List { status } => {
                commands::task::handle_list(&ctx, user_id, status, cli.json).await
            }
            TaskCommands::Show { task_id } => {
                commands::task::handle_show(&ctx, user_id, task_id, cli.json).await
            }
        },
        Commands::Start { task_id, duration } => {
            commands::session::handle_start(&ctx, user_id, task_id, duration, cli.json).await
        }
        Commands::Pause { task_id } => {
            commands::session::handle_pause(&ctx, user_id, task_id, cli.json).await
        }
        Commands::Resume { task_id } => {
            commands::session::handle_resume(&ctx, user_id, task_id, cli.json).await
        }
        Commands::Break { kind, duration } => {
            commands::session::handle_break(&ctx, user_id, kind, duration, cli.json).await
        }
        Commands::Complete { task_id } => {
            commands::session::handle_complete(&ctx, user_id, task_id, cli.json).await
        }
        Commands::Status { task_id } => {
            commands::session::handle_status(&ctx, user_id, task_id, cli.json).await
        }
        Commands::Sessions { task_id } => {
            commands::session::handle_sessions(&ctx, user_id, task_id, cli.json).await
        }
        Commands::Watch { interval } => {
            commands::session::handle_watch(&ctx, user_id, interval, cli.json).await
        }
        Commands::Settings(settings) => match settings {
            SettingsCommands::Show => commands::settings::handle_show(&ctx, user_id, cli.json).await,
            SettingsCommands::Set {
                focus,
                short_break,
                long_break,
                long_break_every,
                auto_start_breaks,
                auto_start_focus,
                sound,
                notifications,
            } => {
                commands::settings::handle_set(
                    &ctx,
                    user_id,
                    focus,
                    short_break,
                    long_break,
                    long_break_every,
                    auto_start_breaks,
                    auto_start_focus,
                    sound,
                    notifications,
                    cli.json,
                )
                .await
            }
        },
    }
}

/// Print a command failure and exit non-zero.
pub fn handle_error(err: anyhow::Error, json: bool) -> ! {
    if json {
        println!(
            "{}",
            serde_json::json!({ "error": format!("{err:#}") })
        );
    } else {
        eprintln!("Error: {err:#}");
    }
    std::process::exit(1);
}
