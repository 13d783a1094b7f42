//! Presence commands.

use clap::{Args, Subcommand};
use serde::Serialize;
use tabled::Tabled;

use beacon_core::result::AppResult;
use beacon_core::types::UserId;
use beacon_entity::presence::{Presence, PresenceChange, PresenceStatus};

use crate::output::{self, OutputFormat};

/// Arguments for presence commands
#[derive(Debug, Args)]
pub struct PresenceArgs {
    /// Presence subcommand
    #[command(subcommand)]
    pub command: PresenceCommand,
}

/// Presence subcommands
#[derive(Debug, Subcommand)]
pub enum PresenceCommand {
    /// Show a user's presence
    Get {
        /// User ID
        #[arg(short, long)]
        user: UserId,
    },
    /// Set a user's status
    Set {
        /// User ID
        #[arg(short, long)]
        user: UserId,
        /// Status: online, away, offline or any custom label
        #[arg(short, long)]
        status: PresenceStatus,
        /// Metadata as a JSON object
        #[arg(short, long)]
        metadata: Option<String>,
    },
    /// Record a heartbeat (marks the user online)
    Heartbeat {
        /// User ID
        #[arg(short, long)]
        user: UserId,
    },
    /// Force a user offline
    Offline {
        /// User ID
        #[arg(short, long)]
        user: UserId,
    },
    /// Log a user out
    Logout {
        /// User ID
        #[arg(short, long)]
        user: UserId,
    },
    /// Show a user's recent status changes
    History {
        /// User ID
        #[arg(short, long)]
        user: UserId,
        /// Number of entries
        #[arg(short, long, default_value = "20")]
        limit: usize,
    },
    /// List online users
    Online,
}

/// Presence row
#[derive(Debug, Serialize, Tabled)]
struct PresenceRow {
    #[tabled(rename = "User")]
    user_id: String,
    #[tabled(rename = "Status")]
    status: String,
    #[tabled(rename = "Last seen")]
    last_seen_at: String,
    #[tabled(rename = "Metadata")]
    metadata: String,
}

impl From<Presence> for PresenceRow {
    fn from(p: Presence) -> Self {
        Self {
            user_id: p.user_id.to_string(),
            status: p.status.to_string(),
            last_seen_at: p.last_seen_at.to_rfc3339(),
            metadata: p.metadata.body.to_string(),
        }
    }
}

/// History row
#[derive(Debug, Serialize, Tabled)]
struct HistoryRow {
    #[tabled(rename = "Changed at")]
    changed_at: String,
    #[tabled(rename = "From")]
    old_status: String,
    #[tabled(rename = "To")]
    new_status: String,
}

impl From<PresenceChange> for HistoryRow {
    fn from(c: PresenceChange) -> Self {
        Self {
            changed_at: c.changed_at.to_rfc3339(),
            old_status: c.old_status.to_string(),
            new_status: c.new_status.to_string(),
        }
    }
}

/// Online user row
#[derive(Debug, Serialize, Tabled)]
struct OnlineRow {
    #[tabled(rename = "User")]
    user_id: String,
}

/// Execute presence commands
pub async fn execute(args: &PresenceArgs, config_path: &str, format: OutputFormat) -> AppResult<()> {
    let config = super::load_config(config_path)?;
    let engine = super::build_engine(&config).await?;
    let presence = &engine.presence;

    match &args.command {
        PresenceCommand::Get { user } => {
            let record = presence.get_presence(*user).await?;
            output::print_item(&PresenceRow::from(record), format);
        }
        PresenceCommand::Set {
            user,
            status,
            metadata,
        } => {
            let metadata = super::parse_payload(metadata.as_deref())?;
            presence
                .update_presence(*user, status.clone(), metadata)
                .await?;
            output::print_success(&format!("User {user} is now {status}"));
        }
        PresenceCommand::Heartbeat { user } => {
            presence.heartbeat(*user).await?;
            output::print_success(&format!("Heartbeat recorded for {user}"));
        }
        PresenceCommand::Offline { user } => {
            presence.set_offline(*user).await?;
            output::print_success(&format!("User {user} set offline"));
        }
        PresenceCommand::Logout { user } => {
            presence.handle_user_logout(*user).await?;
            output::print_success(&format!("User {user} logged out"));
        }
        PresenceCommand::History { user, limit } => {
            let history = presence.get_presence_history(*user, *limit).await?;
            let rows: Vec<HistoryRow> = history.into_iter().map(HistoryRow::from).collect();
            output::print_list(&rows, format);
        }
        PresenceCommand::Online => {
            let users = presence.get_online_users().await?;
            let rows: Vec<OnlineRow> = users
                .iter()
                .map(|u| OnlineRow {
                    user_id: u.to_string(),
                })
                .collect();
            output::print_list(&rows, format);
            if format == OutputFormat::Table {
                output::print_kv("Online users", &rows.len().to_string());
            }
        }
    }

    Ok(())
}
