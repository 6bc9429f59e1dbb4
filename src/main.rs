//! EVM transfer demo
//!
//! Connects to a JSON-RPC node, prints chain and account state, and optionally
//! sends a native or token transfer.
//!
//! # Flow
//!
//! ```text
//!   config.toml ──▶ validate ──▶ secret source ──▶ Account
//!                                                   │
//!   ChainClient::connect ◀──────────────────────────┘
//!        │
//!        ├─▶ block height, gas price, native balance, token balance
//!        │
//!        └─▶ send-native / send-token
//!              nonce → gas price → call data → chain id → sign → submit
//! ```
//!
//! Every step depends on the one before it; the first error stops the run.

use alloy::primitives::Address;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

use evm_transfer_demo::blockchain::{Account, ChainResult};
use evm_transfer_demo::config::load_config_or_default;
use evm_transfer_demo::{logging, Session};

#[derive(Parser)]
#[command(name = "evm-demo")]
#[command(about = "Query an EVM chain and send native or ERC-20 transfers", long_about = None)]
struct Cli {
    /// Path to the TOML configuration file.
    #[arg(short, long, default_value = "demo.toml")]
    config: PathBuf,

    /// Debug-level logging for this crate.
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print block height, gas price and balances
    Status,
    /// Send native currency (amount in ether)
    SendNative(TransferArgs),
    /// Send tokens (amount in token units)
    SendToken(TransferArgs),
}

#[derive(clap::Args)]
struct TransferArgs {
    /// Decimal amount, e.g. 0.001
    #[arg(short, long)]
    amount: String,

    /// Recipient; defaults to transfer.recipient from the config
    #[arg(short, long)]
    to: Option<Address>,

    /// Sign and print the transaction without broadcasting it
    #[arg(long)]
    dry_run: bool,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    logging::init(cli.verbose);

    if let Err(e) = run(cli).await {
        tracing::error!(error = %e, "Run aborted");
        return Err(e.into());
    }
    Ok(())
}

async fn run(cli: Cli) -> ChainResult<()> {
    let config = load_config_or_default(&cli.config)?;

    tracing::info!(
        rpc_url = %config.chain.rpc_url,
        timeout_secs = config.chain.rpc_timeout_secs,
        "Configuration loaded"
    );

    let account = Account::from_secret(config.account.secret_source().as_ref())?;
    let session = Session::open(&config, account).await?;

    let report = session.status().await?;
    println!("{}", report);

    let outcome = match cli.command {
        Commands::Status => None,
        Commands::SendNative(args) => Some(
            session
                .transfer_native(args.to, &args.amount, args.dry_run)
                .await?,
        ),
        Commands::SendToken(args) => Some(
            session
                .transfer_token(args.to, &args.amount, args.dry_run)
                .await?,
        ),
    };

    if let Some(outcome) = outcome {
        println!("{}", outcome);
    }

    Ok(())
}
