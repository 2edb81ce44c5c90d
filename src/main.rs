//! sendpack command-line client.
//!
//! Sends one packet (`send`) or a stream of NDJSON packets from stdin
//! (`batch`) and prints each outcome as JSON on stdout. Logs go to stderr.
//! The exit code is non-zero when any packet was not delivered.

use clap::{Parser, Subcommand};
use serde::Deserialize;
use serde_json::{json, Map, Value};
use std::path::PathBuf;
use std::process::ExitCode;
use tokio::io::{AsyncBufReadExt, BufReader};
use uuid::Uuid;

use sendpack::config::loader::load_config;
use sendpack::config::AppConfig;
use sendpack::lifecycle::{signals, Shutdown};
use sendpack::observability::{logging, metrics};
use sendpack::{DispatchResult, Dispatcher, Packet, SendOutcome};

#[derive(Parser)]
#[command(name = "sendpack")]
#[command(about = "Send packets to an HTTP endpoint with bounded retries", long_about = None)]
struct Cli {
    /// TOML configuration file.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Target endpoint (overrides the config file).
    #[arg(short, long)]
    endpoint: Option<String>,

    #[arg(long)]
    retries: Option<u32>,

    #[arg(long)]
    timeout_ms: Option<u64>,

    #[arg(long)]
    retry_delay_ms: Option<u64>,

    #[arg(long)]
    idempotency_key: Option<String>,

    /// Extra header as `Name: value` (repeatable).
    #[arg(short = 'H', long = "header", value_parser = parse_header)]
    headers: Vec<(String, String)>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Send one packet
    Send {
        /// Packet id (random UUID when omitted)
        #[arg(long)]
        id: Option<String>,

        /// Payload as a JSON object
        #[arg(long, default_value = "{}")]
        payload: String,
    },
    /// Send newline-delimited JSON packets read from stdin
    Batch {
        /// Packets in flight at once
        #[arg(long)]
        concurrency: Option<usize>,
    },
}

/// One NDJSON input line: `{"id": "...", "payload": {...}}`.
#[derive(Deserialize)]
struct PacketLine {
    id: Option<String>,
    #[serde(default = "empty_object")]
    payload: Value,
}

fn empty_object() -> Value {
    Value::Object(Map::new())
}

fn parse_header(raw: &str) -> Result<(String, String), String> {
    let (name, value) = raw
        .split_once(':')
        .ok_or_else(|| format!("expected `Name: value`, got '{}'", raw))?;
    Ok((name.trim().to_string(), value.trim().to_string()))
}

fn apply_overrides(config: &mut AppConfig, cli: &Cli) {
    if let Some(endpoint) = &cli.endpoint {
        config.endpoint = Some(endpoint.clone());
    }
    let dispatch = &mut config.dispatch;
    if let Some(retries) = cli.retries {
        dispatch.retries = retries;
    }
    if let Some(timeout_ms) = cli.timeout_ms {
        dispatch.timeout_ms = timeout_ms;
    }
    if let Some(retry_delay_ms) = cli.retry_delay_ms {
        dispatch.retry_delay_ms = retry_delay_ms;
    }
    if let Some(key) = &cli.idempotency_key {
        dispatch.idempotency_key = Some(key.clone());
    }
    for (name, value) in &cli.headers {
        dispatch.headers.insert(name.clone(), value.clone());
    }
}

#[tokio::main]
async fn main() -> Result<ExitCode, Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => load_config(path)?,
        None => AppConfig::default(),
    };
    apply_overrides(&mut config, &cli);

    logging::init_logging(&config.observability);
    tracing::info!("sendpack v{} starting", env!("CARGO_PKG_VERSION"));

    if config.observability.metrics_enabled {
        match config.observability.metrics_address.parse() {
            Ok(addr) => metrics::init_metrics(addr),
            Err(_) => tracing::error!(
                metrics_address = %config.observability.metrics_address,
                "Failed to parse metrics address"
            ),
        }
    }

    let endpoint = config
        .endpoint
        .clone()
        .ok_or("no endpoint configured; pass --endpoint or set `endpoint` in the config file")?;
    let dispatcher = Dispatcher::new(&endpoint, &config.dispatch)?;

    tracing::info!(
        endpoint = %endpoint,
        retries = config.dispatch.retries,
        timeout_ms = config.dispatch.timeout_ms,
        "Configuration loaded"
    );

    let shutdown = Shutdown::new();
    signals::spawn_ctrl_c_listener(shutdown.clone());

    let delivered = match cli.command {
        Commands::Send { id, payload } => {
            let payload: Value = serde_json::from_str(&payload)?;
            let id = id.unwrap_or_else(|| Uuid::new_v4().to_string());

            match dispatcher
                .send_until(Packet::create(id, payload), shutdown.cancelled())
                .await?
            {
                Some(outcome) => {
                    println!("{}", serde_json::to_string_pretty(&outcome)?);
                    outcome.success
                }
                None => false,
            }
        }
        Commands::Batch { concurrency } => {
            let concurrency = concurrency.unwrap_or(config.batch.concurrency);
            let packets = read_packets().await?;
            tracing::info!(packets = packets.len(), concurrency, "Sending batch");

            tokio::select! {
                results = dispatcher.send_batch(packets, concurrency) => report_batch(&results)?,
                () = shutdown.cancelled() => {
                    tracing::warn!("Batch cancelled");
                    false
                }
            }
        }
    };

    Ok(if delivered {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}

async fn read_packets() -> Result<Vec<Packet>, Box<dyn std::error::Error>> {
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut packets = Vec::new();
    let mut line_no = 0;

    while let Some(line) = lines.next_line().await? {
        line_no += 1;
        if line.trim().is_empty() {
            continue;
        }
        let parsed: PacketLine =
            serde_json::from_str(&line).map_err(|e| format!("stdin line {}: {}", line_no, e))?;
        let id = parsed.id.unwrap_or_else(|| Uuid::new_v4().to_string());
        packets.push(Packet::create(id, parsed.payload));
    }

    Ok(packets)
}

/// Print one JSON line per packet; true when every packet was delivered.
fn report_batch(results: &[DispatchResult<SendOutcome>]) -> Result<bool, serde_json::Error> {
    let mut delivered = true;
    for (index, result) in results.iter().enumerate() {
        let line = match result {
            Ok(outcome) => {
                delivered &= outcome.success;
                json!({ "index": index, "outcome": outcome })
            }
            Err(e) => {
                delivered = false;
                json!({ "index": index, "error": e.to_string() })
            }
        };
        println!("{}", serde_json::to_string(&line)?);
    }
    Ok(delivered)
}
