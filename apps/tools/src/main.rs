use std::{net::SocketAddr, time::Duration};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use client_core::{BackendClient, MessageBackend};
use shared::protocol::{DEFAULT_IPC_PORT, IPC_HOST};
use tokio::{io::AsyncWriteExt, net::TcpStream};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Pushes an assistant message into a running shell over the loopback bridge.
    SendIpc {
        #[arg(long, default_value_t = DEFAULT_IPC_PORT)]
        port: u16,
        text: String,
    },
    /// Posts a user message to a backend API the way the shell does.
    PostBackend {
        url: String,
        text: String,
        #[arg(long, default_value_t = 30)]
        timeout_secs: u64,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .init();

    let cli = Cli::parse();
    match cli.command {
        Command::SendIpc { port, text } => {
            let mut stream = TcpStream::connect(SocketAddr::from((IPC_HOST, port)))
                .await
                .with_context(|| format!("no shell listening on port {port}"))?;
            stream.write_all(text.as_bytes()).await?;
            stream.shutdown().await?;
            println!("sent {} bytes to 127.0.0.1:{port}", text.len());
        }
        Command::PostBackend {
            url,
            text,
            timeout_secs,
        } => {
            let client = BackendClient::new(Some(url), Duration::from_secs(timeout_secs.max(1)));
            let ack = client.send(&text).await?;
            match ack.reply {
                Some(reply) => println!("status={} reply={reply}", ack.status),
                None => println!("status={} (no reply)", ack.status),
            }
        }
    }

    Ok(())
}
