//! Monay CLI - submit payments over any registered rail
//!
//! ```bash
//! export MONAY_API_URL=https://api.monay.com
//! export MONAY_ACCESS_TOKEN=... MONAY_REFRESH_TOKEN=...
//!
//! monay pay --amount 5000 --currency USD --source wallet_1 --destination bank_1 --rail instant
//! monay rails
//! ```
//!
//! Results are printed to stdout as JSON; logs go to stderr.

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use monay_sdk::{
    Config, Credentials, Currency, Monay, PaymentIntent, PaymentStatus, RailKind, TransferDirection,
};

/// Monay CLI - unified payment rail dispatch
#[derive(Parser)]
#[command(name = "monay")]
#[command(author = "Monay Contributors")]
#[command(version)]
#[command(about = "Submit payments through card, stablecoin and instant payment rails", long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// API endpoint (overrides MONAY_API_URL)
    #[arg(long, global = true, env = "MONAY_API_URL")]
    endpoint: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Submit one payment intent
    Pay {
        /// Amount in minor units (cents, micro-USDC)
        #[arg(long)]
        amount: i64,

        /// Currency code
        #[arg(long, default_value = "USD")]
        currency: Currency,

        /// Funding source reference
        #[arg(long)]
        source: String,

        /// Destination reference
        #[arg(long)]
        destination: String,

        /// Preferred rail: card, stablecoin or instant
        #[arg(long)]
        rail: Option<RailKind>,

        /// deposit or withdrawal
        #[arg(long, default_value = "deposit")]
        direction: TransferDirection,

        /// Idempotency key; derived from the other fields and --nonce when absent
        #[arg(long)]
        idempotency_key: Option<String>,

        /// Nonce for key derivation
        #[arg(long)]
        nonce: Option<String>,

        /// Metadata entries forwarded to the rail
        #[arg(long = "meta", value_parser = parse_key_value)]
        metadata: Vec<(String, String)>,
    },

    /// List registered rails
    Rails,
}

fn parse_key_value(s: &str) -> Result<(String, String), String> {
    s.split_once('=')
        .map(|(k, v)| (k.trim().to_string(), v.trim().to_string()))
        .filter(|(k, _)| !k.is_empty())
        .ok_or_else(|| format!("expected KEY=VALUE, got '{}'", s))
}

fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let subscriber = tracing_subscriber::registry().with(env_filter);

    match std::env::var("MONAY_LOG_FORMAT").as_deref() {
        Ok("json") => subscriber
            .with(fmt::layer().json().with_target(true).with_writer(std::io::stderr))
            .init(),
        _ => subscriber
            .with(fmt::layer().with_target(false).with_writer(std::io::stderr))
            .init(),
    }
}

fn credentials_from_env() -> Option<Credentials> {
    let access = std::env::var("MONAY_ACCESS_TOKEN").ok().filter(|t| !t.is_empty())?;
    let refresh = std::env::var("MONAY_REFRESH_TOKEN").ok().filter(|t| !t.is_empty());
    Some(Credentials::new(access, refresh))
}

fn client(endpoint: Option<String>) -> Result<Monay> {
    let mut config = Config::from_env();
    if let Some(endpoint) = endpoint {
        config.endpoint = endpoint;
    }

    let mut builder = Monay::builder().config(config);
    match credentials_from_env() {
        Some(credentials) => builder = builder.credentials(credentials),
        None => tracing::warn!("MONAY_ACCESS_TOKEN not set, sending unauthenticated requests"),
    }

    builder.build().context("failed to build Monay client")
}

#[tokio::main]
async fn main() -> Result<()> {
    // Try to load .env file (ignore errors)
    let _ = dotenvy::dotenv();
    init_tracing();

    let cli = Cli::parse();

    match cli.command {
        Commands::Pay {
            amount,
            currency,
            source,
            destination,
            rail,
            direction,
            idempotency_key,
            nonce,
            metadata,
        } => {
            let monay = client(cli.endpoint)?;

            let mut intent = PaymentIntent::builder(source, destination, amount, currency).direction(direction);
            if let Some(rail) = rail {
                intent = intent.rail(rail);
            }
            if let Some(key) = idempotency_key {
                intent = intent.idempotency_key(key);
            }
            if let Some(nonce) = nonce {
                intent = intent.nonce(nonce);
            }
            for (key, value) in metadata {
                intent = intent.metadata(key, value);
            }

            let result = monay.submit(intent.build()).await?;
            println!("{}", serde_json::to_string_pretty(&result)?);

            if result.status == PaymentStatus::Failed {
                bail!(
                    "payment failed: {}",
                    result.failure_reason.as_deref().unwrap_or("unknown reason")
                );
            }
        }
        Commands::Rails => {
            let monay = client(cli.endpoint)?;
            let rails: Vec<_> = monay
                .rails()
                .iter()
                .map(|adapter| {
                    let limits = adapter.limits();
                    serde_json::json!({
                        "rail": adapter.kind(),
                        "name": adapter.name(),
                        "currencies": adapter.currencies(),
                        "minMinorUnits": limits.min_minor_units,
                        "maxMinorUnits": limits.max_minor_units,
                    })
                })
                .collect();
            println!("{}", serde_json::to_string_pretty(&rails)?);
        }
    }

    Ok(())
}
