//! Channel Push Command Line Interface

use anyhow::{Context, Result};
use channel_push::{Credentials, PushClient, PushConfig, PushMsgOptions, QueryBindListOptions};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing::info;

#[derive(Parser)]
#[command(name = "channel-push")]
#[command(about = "Query device bindings and push messages through the Channel push API", version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Configuration file path
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// API host, overrides the configuration
    #[arg(long)]
    host: Option<String>,

    /// Verbose logging, including request and response bodies
    #[arg(short, long)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// List the devices bound to a user
    QueryBindlist {
        /// User id
        #[arg(short, long)]
        user_id: String,
        /// Device type (1-5)
        #[arg(long)]
        device_type: Option<i64>,
        /// Start position
        #[arg(long)]
        start: Option<i64>,
        /// Number of entries
        #[arg(long)]
        limit: Option<i64>,
        /// Channel id
        #[arg(long)]
        channel_id: Option<String>,
    },
    /// Push messages to a user, a tag or everyone
    Push {
        /// Push type: 1 user, 2 tag, 3 all
        #[arg(short, long)]
        push_type: i64,
        /// Message text, repeat for several messages
        #[arg(short, long = "message", required = true)]
        messages: Vec<String>,
        /// Message key, one per message
        #[arg(short = 'k', long = "msg-key", required = true)]
        msg_keys: Vec<String>,
        /// Target user (push type 1)
        #[arg(short, long)]
        user_id: Option<String>,
        /// Target tag (push type 2)
        #[arg(short, long)]
        tag: Option<String>,
        /// Device type (1-5)
        #[arg(long)]
        device_type: Option<i64>,
        /// 0 message, 1 notification
        #[arg(long)]
        message_type: Option<i64>,
        /// Expiry in seconds
        #[arg(long)]
        message_expires: Option<String>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let log_level = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(format!("channel_push={log_level},channel_push_cli={log_level}"))
        .with_writer(std::io::stderr)
        .init();

    let mut config = load_config(cli.config.as_deref())?;
    if let Some(host) = cli.host {
        config.host = host;
    }
    if cli.verbose {
        config.api.enable_logging = true;
    }

    let credentials = Credentials::from_env().context("Failed to load credentials")?;
    credentials
        .validate()
        .map_err(|e| anyhow::anyhow!("Invalid credentials: {e}"))?;

    info!(host = %config.host, "using push API");
    let client = PushClient::new(credentials, config).context("Failed to create push client")?;

    let outcome = match cli.command {
        Commands::QueryBindlist {
            user_id,
            device_type,
            start,
            limit,
            channel_id,
        } => {
            let options = QueryBindListOptions {
                device_type,
                start,
                limit,
                channel_id,
                ..QueryBindListOptions::new(user_id)
            };
            client.query_bind_list(&options).await
        }
        Commands::Push {
            push_type,
            messages,
            msg_keys,
            user_id,
            tag,
            device_type,
            message_type,
            message_expires,
        } => {
            let mut options = PushMsgOptions::from_lists(push_type, &messages, &msg_keys)?;
            options.user_id = user_id;
            options.tag = tag;
            options.device_type = device_type;
            options.message_type = message_type;
            options.message_expires = message_expires;
            client.push_msg(&options).await
        }
    };

    if let Some(request_id) = client.last_request_id().await {
        eprintln!("request id: {request_id}");
    }

    let result = outcome?;
    println!("{}", serde_json::to_string_pretty(&result)?);

    Ok(())
}

fn load_config(path: Option<&std::path::Path>) -> Result<PushConfig> {
    if let Some(path) = path {
        return PushConfig::load_from_file(path).context("Failed to load configuration file");
    }

    let default_path = PushConfig::default_config_path();
    if default_path.exists() {
        let mut config = PushConfig::load_from_file(&default_path)
            .context("Failed to load default configuration")?;
        if let Ok(host) = std::env::var(channel_push::config::ENV_HOST) {
            config.host = host;
        }
        return Ok(config);
    }

    Ok(PushConfig::from_env())
}
