//! Channel subscription and publishing commands.

use clap::{Args, Subcommand};
use serde::Serialize;
use tabled::Tabled;

use beacon_core::result::AppResult;
use beacon_core::types::UserId;

use crate::output::{self, OutputFormat};

/// Arguments for channel commands
#[derive(Debug, Args)]
pub struct ChannelArgs {
    /// Channel subcommand
    #[command(subcommand)]
    pub command: ChannelCommand,
}

/// Channel subcommands
#[derive(Debug, Subcommand)]
pub enum ChannelCommand {
    /// Subscribe a user to one or more channels (in order, stops at first error)
    Subscribe {
        /// User ID
        #[arg(short, long)]
        user: UserId,
        /// Channel names
        #[arg(required = true)]
        channels: Vec<String>,
    },
    /// Unsubscribe a user from a channel, or from every channel with --all
    Unsubscribe {
        /// User ID
        #[arg(short, long)]
        user: UserId,
        /// Channel name
        #[arg(short, long, required_unless_present = "all", conflicts_with = "all")]
        channel: Option<String>,
        /// Remove every subscription of the user
        #[arg(long)]
        all: bool,
    },
    /// List a user's channels
    List {
        /// User ID
        #[arg(short, long)]
        user: UserId,
    },
    /// List a channel's subscribers
    Subscribers {
        /// Channel name
        #[arg(short, long)]
        channel: String,
    },
    /// Show a channel summary
    Info {
        /// Channel name
        #[arg(short, long)]
        channel: String,
    },
    /// Publish an event to every subscriber of a channel
    Publish {
        /// Channel name
        #[arg(short, long)]
        channel: String,
        /// Event name
        #[arg(short, long)]
        event: String,
        /// Event data as JSON
        #[arg(short, long)]
        data: Option<String>,
    },
    /// Store a global broadcast event
    Broadcast {
        /// Event name
        #[arg(short, long)]
        event: String,
        /// Event data as JSON
        #[arg(short, long)]
        data: Option<String>,
    },
    /// Queue a direct message between two users
    Direct {
        /// Sender user ID
        #[arg(long)]
        from: UserId,
        /// Recipient user ID
        #[arg(long)]
        to: UserId,
        /// Message text
        #[arg(short, long)]
        message: String,
    },
}

/// Channel name row
#[derive(Debug, Serialize, Tabled)]
struct ChannelRow {
    #[tabled(rename = "Channel")]
    channel: String,
}

/// Subscriber row
#[derive(Debug, Serialize, Tabled)]
struct SubscriberRow {
    #[tabled(rename = "User")]
    user_id: String,
}

/// Channel summary row
#[derive(Debug, Serialize, Tabled)]
struct InfoRow {
    #[tabled(rename = "Channel")]
    channel: String,
    #[tabled(rename = "Members")]
    members: usize,
}

/// Publish receipt row
#[derive(Debug, Serialize, Tabled)]
struct ReceiptRow {
    #[tabled(rename = "Event ID")]
    event_id: String,
    #[tabled(rename = "Recipients")]
    recipients: usize,
}

/// Execute channel commands
pub async fn execute(args: &ChannelArgs, config_path: &str, format: OutputFormat) -> AppResult<()> {
    let config = super::load_config(config_path)?;
    let engine = super::build_engine(&config).await?;
    let registry = &engine.subscriptions;
    let publisher = &engine.publisher;

    match &args.command {
        ChannelCommand::Subscribe { user, channels } => {
            registry.subscribe_many(*user, channels.as_slice()).await?;
            output::print_success(&format!(
                "User {user} subscribed to {} channel(s)",
                channels.len()
            ));
        }
        ChannelCommand::Unsubscribe { user, channel, all } => {
            if *all {
                let removed = registry.unsubscribe_all(*user).await?;
                output::print_success(&format!("Removed {removed} subscription(s) of {user}"));
            } else if let Some(channel) = channel {
                registry.unsubscribe(*user, channel).await?;
                output::print_success(&format!("User {user} unsubscribed from {channel}"));
            }
        }
        ChannelCommand::List { user } => {
            let rows: Vec<ChannelRow> = registry
                .list_subscriptions(*user)
                .await?
                .into_iter()
                .map(|channel| ChannelRow { channel })
                .collect();
            output::print_list(&rows, format);
        }
        ChannelCommand::Subscribers { channel } => {
            let rows: Vec<SubscriberRow> = registry
                .list_subscribers(channel)
                .await?
                .iter()
                .map(|u| SubscriberRow {
                    user_id: u.to_string(),
                })
                .collect();
            output::print_list(&rows, format);
        }
        ChannelCommand::Info { channel } => {
            let info = registry.channel_info(channel).await?;
            match format {
                OutputFormat::Json => output::print_item(
                    &InfoRow {
                        channel: info.channel.clone(),
                        members: info.member_count(),
                    },
                    format,
                ),
                OutputFormat::Table => {
                    output::print_kv("Channel", &info.channel);
                    output::print_kv("Members", &info.member_count().to_string());
                    for member in &info.members {
                        output::print_kv("Member", &member.to_string());
                    }
                }
            }
        }
        ChannelCommand::Publish {
            channel,
            event,
            data,
        } => {
            let payload = super::parse_payload(data.as_deref())?;
            let receipt = publisher.publish_to_channel(channel, event, payload).await?;
            output::print_item(
                &ReceiptRow {
                    event_id: receipt.event_id.to_string(),
                    recipients: receipt.recipients.len(),
                },
                format,
            );
        }
        ChannelCommand::Broadcast { event, data } => {
            let payload = super::parse_payload(data.as_deref())?;
            let event_id = publisher.broadcast_event(event, payload).await?;
            output::print_success(&format!("Broadcast stored as event {event_id}"));
        }
        ChannelCommand::Direct { from, to, message } => {
            let event_id = publisher.send_direct_message(*from, *to, message).await?;
            output::print_success(&format!("Direct message queued as event {event_id}"));
        }
    }

    Ok(())
}
