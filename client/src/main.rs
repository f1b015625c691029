//! `crafter`: terminal client for the element sync server

use std::time::Duration;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use shared::{ProcessRole, ServerMessage, logging};

use client::{ClientError, CraftClient, PairReply};

#[derive(Parser, Debug)]
#[command(name = "crafter")]
#[command(about = "Watch and grow the shared element set from a terminal")]
struct Args {
    /// Server WebSocket endpoint
    #[arg(long, env = "CRAFT_URL", default_value = "ws://127.0.0.1:8000/api/connect")]
    url: String,

    /// Seconds to wait for the snapshot or a pair reply
    #[arg(long, env = "CRAFT_TIMEOUT_SECS", default_value = "30")]
    timeout_secs: u64,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, env = "CRAFT_LOG_LEVEL", default_value = "warn")]
    log_level: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print the snapshot and every element discovered afterwards
    Watch,
    /// Combine two elements and print the result
    Pair { first: String, second: String },
}

#[tokio::main]
async fn main() -> Result<()> {
    let _ = dotenvy::dotenv();
    let args = Args::parse();

    ProcessRole::init_client();
    logging::init_tracing(Some(&args.log_level));

    let wait = Duration::from_secs(args.timeout_secs);
    let mut client = CraftClient::connect(&args.url)
        .await
        .with_context(|| format!("connecting to {}", args.url))?;

    let snapshot = client.sync(wait).await.context("waiting for snapshot")?;

    match args.command {
        Command::Watch => {
            println!("{} element(s) known", snapshot.len());
            for element in &snapshot {
                println!("  {element}");
            }
            watch(&mut client).await
        }
        Command::Pair { first, second } => {
            let reply = client.pair(&first, &second, wait).await;
            let _ = client.close().await;
            match reply {
                Ok(PairReply::Discovery { element, scope }) => {
                    println!("✨ New {scope} discovery: {element}");
                    Ok(())
                }
                Ok(PairReply::Existing { element }) => {
                    println!("{element} (already known)");
                    Ok(())
                }
                Err(ClientError::ServerError { message }) => anyhow::bail!("server error: {message}"),
                Err(e) => Err(e).context("waiting for pair reply"),
            }
        }
    }
}

async fn watch(client: &mut CraftClient) -> Result<()> {
    loop {
        tokio::select! {
            message = client.next_message() => match message {
                Ok(ServerMessage::Add { elements }) => {
                    for element in elements {
                        println!("+ {element}");
                    }
                }
                Ok(_) => {}
                Err(ClientError::ConnectionClosed) => {
                    logging::log_shutdown(ProcessRole::current(), "Server closed the connection");
                    return Ok(());
                }
                Err(e) => return Err(e).context("reading from server"),
            },
            _ = tokio::signal::ctrl_c() => {
                logging::log_shutdown(ProcessRole::current(), "Received Ctrl+C signal");
                return Ok(());
            }
        }
    }
}
