//! CLI type definitions
//!
//! This module contains clap command structures that define the CLI interface.

use clap::{Parser, Subcommand};
use uuid::Uuid;

#[derive(Parser)]
#[command(name = "focusflow")]
#[command(about = "FocusFlow - Pomodoro session tracker", long_about = None)]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Output in JSON format
    #[arg(short, long, global = true)]
    pub json: bool,

    /// User to act as (falls back to default_user in config)
    #[arg(short, long, global = true, env = "FOCUSFLOW_USER")]
    pub user: Option<Uuid>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Initialize FocusFlow configuration and database
    Init {
        /// Force reinitialization even if already initialized
        #[arg(short, long)]
        force: bool,
    },

    /// Task management commands
    #[command(subcommand)]
    Task(TaskCommands),

    /// Start a focus session on a task
    Start {
        /// Task ID
        task_id: Uuid,

        /// Session length in minutes (defaults to your focus setting)
        #[arg(short, long)]
        duration: Option<u32>,
    },

    /// Pause the running session on a task
    Pause {
        /// Task ID
        task_id: Uuid,
    },

    /// Resume the paused session on a task
    Resume {
        /// Task ID
        task_id: Uuid,
    },

    /// Start a standalone break
    Break {
        /// Break kind: short or long
        #[arg(default_value = "short")]
        kind: String,

        /// Break length in minutes (defaults to your break settings)
        #[arg(short, long)]
        duration: Option<u32>,
    },

    /// Complete the active session and close its task
    Complete {
        /// Task ID
        task_id: Uuid,
    },

    /// Show the active session, optionally scoped to a task
    Status {
        /// Task ID
        task_id: Option<Uuid>,
    },

    /// List the session history for a task
    Sessions {
        /// Task ID
        task_id: Uuid,
    },

    /// Poll the active session and print updates
    Watch {
        /// Seconds between polls
        #[arg(short, long, default_value = "2")]
        interval: u64,
    },

    /// Pomodoro settings commands
    #[command(subcommand)]
    Settings(SettingsCommands),
}

#[derive(Subcommand)]
pub enum TaskCommands {
    /// Add a new task
    Add {
        /// Task title (positional argument)
        title: String,

        /// Optional longer description
        #[arg(short, long)]
        description: Option<String>,

        /// Task priority (low, medium, high)
        #[arg(short, long, default_value = "medium")]
        priority: String,

        /// Estimated number of focus sessions
        #[arg(short, long)]
        estimate: Option<u32>,
    },

    /// List your tasks
    List {
        /// Filter by status (pending, in_progress, paused, completed)
        #[arg(short, long)]
        status: Option<String>,
    },

    /// Show details for a specific task
    Show {
        /// Task ID
        task_id: Uuid,
    },
}

#[derive(Subcommand)]
pub enum SettingsCommands {
    /// Show your pomodoro settings
    Show,

    /// Update one or more settings
    Set {
        /// Focus session length in minutes
        #[arg(long)]
        focus: Option<u32>,

        /// Short break length in minutes
        #[arg(long)]
        short_break: Option<u32>,

        /// Long break length in minutes
        #[arg(long)]
        long_break: Option<u32>,

        /// Every Nth completed focus session earns a long break
        #[arg(long)]
        long_break_every: Option<u32>,

        /// Automatically start breaks after focus sessions
        #[arg(long)]
        auto_start_breaks: Option<bool>,

        /// Automatically start focus after breaks
        #[arg(long)]
        auto_start_focus: Option<bool>,

        /// Notification sound name
        #[arg(long)]
        sound: Option<String>,

        /// Enable desktop notifications
        #[arg(long)]
        notifications: Option<bool>,
    },
}
