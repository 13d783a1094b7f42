//! Offline queue commands.

use clap::{Args, Subcommand};
use serde::Serialize;
use tabled::Tabled;

use beacon_core::result::AppResult;
use beacon_core::types::{EventId, UserId};
use beacon_entity::message::QueuedMessage;

use crate::output::{self, OutputFormat};

/// Arguments for queue commands
#[derive(Debug, Args)]
pub struct QueueArgs {
    /// Queue subcommand
    #[command(subcommand)]
    pub command: QueueCommand,
}

/// Queue subcommands
#[derive(Debug, Subcommand)]
pub enum QueueCommand {
    /// List a user's pending messages, oldest first
    Pending {
        /// User ID
        #[arg(short, long)]
        user: UserId,
        /// Maximum number of messages (defaults to realtime.pending_default_limit)
        #[arg(short, long)]
        limit: Option<usize>,
    },
    /// Acknowledge one event for a user
    Ack {
        /// User ID
        #[arg(short, long)]
        user: UserId,
        /// Event ID
        #[arg(short, long)]
        event: EventId,
        /// Keep the message as delivered instead of deleting it
        #[arg(long)]
        keep: bool,
    },
    /// Remove every pending message of a user
    Clear {
        /// User ID
        #[arg(short, long)]
        user: UserId,
    },
    /// Show the backlog a reconnecting user would receive
    Replay {
        /// User ID
        #[arg(short, long)]
        user: UserId,
    },
    /// Count a user's pending messages
    Count {
        /// User ID
        #[arg(short, long)]
        user: UserId,
    },
}

/// Queued message row
#[derive(Debug, Serialize, Tabled)]
struct MessageRow {
    #[tabled(rename = "Event ID")]
    event_id: String,
    #[tabled(rename = "Channel")]
    channel: String,
    #[tabled(rename = "Event")]
    event_name: String,
    #[tabled(rename = "Data")]
    data: String,
    #[tabled(rename = "Created")]
    created_at: String,
}

impl From<QueuedMessage> for MessageRow {
    fn from(m: QueuedMessage) -> Self {
        Self {
            event_id: m.event_id.to_string(),
            channel: m.channel,
            event_name: m.event_name,
            data: m.data.body.to_string(),
            created_at: m.created_at.to_rfc3339(),
        }
    }
}

fn rows(messages: Vec<QueuedMessage>) -> Vec<MessageRow> {
    messages.into_iter().map(MessageRow::from).collect()
}

/// Execute queue commands
pub async fn execute(args: &QueueArgs, config_path: &str, format: OutputFormat) -> AppResult<()> {
    let config = super::load_config(config_path)?;
    let engine = super::build_engine(&config).await?;
    let queue = &engine.queue;

    match &args.command {
        QueueCommand::Pending { user, limit } => {
            let limit = limit.unwrap_or(config.realtime.pending_default_limit);
            let pending = queue.get_pending_events(*user, limit).await?;
            output::print_list(&rows(pending), format);
        }
        QueueCommand::Ack { user, event, keep } => {
            let acknowledged = if *keep {
                queue.mark_delivered(*user, *event).await?
            } else {
                queue.remove_event_from_queue(*user, *event).await?
            };
            if acknowledged {
                output::print_success(&format!("Event {event} acknowledged for {user}"));
            } else {
                output::print_kv("Not queued", &event.to_string());
            }
        }
        QueueCommand::Clear { user } => {
            let removed = queue.clear_event_queue(*user).await?;
            output::print_success(&format!("Removed {removed} message(s) for {user}"));
        }
        QueueCommand::Replay { user } => {
            let backlog = engine.reconnection.handle_reconnection(*user).await?;
            output::print_list(&rows(backlog), format);
        }
        QueueCommand::Count { user } => {
            let count = queue.pending_count(*user).await?;
            output::print_kv("Pending", &count.to_string());
        }
    }

    Ok(())
}
