use std::time::Duration;

use anyhow::Context;
use clap::{Parser, Subcommand};
use serde::Serialize;

use memberhub::{
    config::{PortalMode, Settings},
    domain::{DirectoryFilter, MemberStatus, PaymentStatus},
    portal::{self, InboxPoller},
};

/// Command-line client for the member portal, in process or against a
/// running server.
#[derive(Parser, Debug)]
#[command(name = "portal")]
struct Args {
    /// Talk to the server at this base URL instead of the local database
    #[arg(long)]
    remote: Option<String>,

    /// Log in before running the command
    #[arg(long, requires = "password")]
    email: Option<String>,

    #[arg(long)]
    password: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// List every user
    Users,
    /// Show one user
    User { id: String },
    /// Set a user's membership status (Pending, Active, Suspended, Expired)
    Status { id: String, status: String },
    /// Give a user a new member id
    Reassign { id: String, new_id: String },
    /// Search the member directory
    Directory {
        #[arg(long)]
        category: Option<String>,
        #[arg(long)]
        state: Option<String>,
        #[arg(short, long)]
        q: Option<String>,
    },
    Announcements,
    /// Payments for one user, or all payments when no user is given
    Payments { user_id: Option<String> },
    /// Set a payment's status (Successful, Pending, Failed)
    PaymentStatus { id: String, status: String },
    /// Send a message as the logged-in user
    Send { to: String, content: String },
    /// Poll the logged-in user's inbox
    Watch {
        /// Also follow the conversation with this user
        #[arg(long)]
        with: Option<String>,
        #[arg(long)]
        interval_ms: Option<u64>,
        /// Stop after this many refreshes
        #[arg(long, default_value_t = 5)]
        rounds: u64,
    },
}

fn print_json<T: Serialize>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn parse_enum<T: serde::de::DeserializeOwned>(value: &str) -> anyhow::Result<T> {
    serde_json::from_value(serde_json::Value::String(value.to_string()))
        .with_context(|| format!("Unrecognised value '{}'", value))
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "memberhub=info".into()),
        )
        .init();

    let args = Args::parse();

    let mut settings = Settings::new().unwrap_or_default();
    if let Some(url) = args.remote {
        settings.portal.mode = PortalMode::Remote;
        settings.portal.remote_base_url = url;
    }

    let portal = portal::connect(&settings).await?;

    let me = match (&args.email, &args.password) {
        (Some(email), Some(password)) => Some(portal.login(email, password).await?),
        _ => None,
    };

    match args.command {
        Command::Users => print_json(&portal.get_users().await?)?,
        Command::User { id } => print_json(&portal.get_user(&id).await?)?,
        Command::Status { id, status } => {
            let status: MemberStatus = parse_enum(&status)?;
            print_json(&portal.update_user_status(&id, status).await?)?
        }
        Command::Reassign { id, new_id } => {
            print_json(&portal.reassign_user_id(&id, &new_id).await?)?
        }
        Command::Directory { category, state, q } => {
            let filter = DirectoryFilter { category, state, q };
            print_json(&portal.get_directory(&filter).await?)?
        }
        Command::Announcements => print_json(&portal.get_announcements().await?)?,
        Command::Payments { user_id: Some(user_id) } => {
            print_json(&portal.get_payments(&user_id).await?)?
        }
        Command::Payments { user_id: None } => print_json(&portal.get_all_payments().await?)?,
        Command::PaymentStatus { id, status } => {
            let status: PaymentStatus = parse_enum(&status)?;
            print_json(&portal.update_payment_status(&id, status).await?)?
        }
        Command::Send { to, content } => {
            let me = me.as_ref().context("Sending requires --email and --password")?;
            print_json(&portal.send_message(&me.id, &to, &content).await?)?
        }
        Command::Watch { with, interval_ms, rounds } => {
            let me = me.as_ref().context("Watching requires --email and --password")?;
            let interval = Duration::from_millis(
                interval_ms.unwrap_or(settings.portal.poll_interval_ms),
            );

            let mut poller = InboxPoller::new(portal.clone(), me.id.clone(), interval);
            if let Some(other) = with {
                poller = poller.with_conversation(other);
            }
            let handle = poller.start();
            let mut snapshots = handle.subscribe();

            loop {
                tokio::select! {
                    _ = tokio::signal::ctrl_c() => break,
                    changed = snapshots.changed() => {
                        if changed.is_err() {
                            break;
                        }
                        let snapshot = snapshots.borrow_and_update().clone();
                        println!(
                            "[{}] {} conversations, {} unread, {} messages open",
                            snapshot.round,
                            snapshot.conversations.len(),
                            snapshot.unread,
                            snapshot.messages.len()
                        );
                        if snapshot.round >= rounds {
                            break;
                        }
                    }
                }
            }

            handle.stop().await;
        }
    }

    if me.is_some() {
        portal.logout().await?;
    }

    Ok(())
}
