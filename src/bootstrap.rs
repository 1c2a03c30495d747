use std::sync::Arc;

use alloy_chains::NamedChain;
use alloy_primitives::{Address, U256};
use alloy_provider::{DynProvider, Provider};
use alloy_signer_local::PrivateKeySigner;
use anyhow::{anyhow, bail, Context};
use clap::{Parser, Subcommand};
use dotenvy::dotenv;
use serde::Serialize;
use tracing::info;

use crate::{
    constants::CLAWD_TOKEN,
    provider::{connect_http, AlloyChain},
    ApprovalSession, ApprovalSummary, BatchItemOutcome, RevocationRow, RevokeConfig,
    RevokeConfigBuilder, RevokeErrorKind, RowState, ScanWindow,
};

/// Find and revoke ERC-20 approvals granted by a wallet
#[derive(Debug, Parser)]
#[command(name = "revokescan", version)]
pub struct Cli {
    /// JSON-RPC endpoint
    #[arg(long, env = "RPC_URL")]
    pub rpc_url: String,

    /// Wallet whose approvals are scanned; defaults to the signer's address
    #[arg(long, env = "OWNER")]
    pub owner: Option<Address>,

    /// Token contract
    #[arg(long, env = "TOKEN_ADDRESS", default_value_t = CLAWD_TOKEN)]
    pub token: Address,

    /// Chain the token lives on; the provider must report the same id
    #[arg(long, env = "CHAIN_ID", default_value_t = NamedChain::Base as u64)]
    pub chain_id: u64,

    /// Blocks per window when the full-range log query is rejected
    #[arg(long, env = "SCAN_WINDOW", default_value_t = ScanWindow::DEFAULT.as_u64())]
    pub scan_window: u64,

    /// Key used to sign revoke transactions
    #[arg(long, env = "PRIVATE_KEY", hide_env_values = true)]
    pub private_key: Option<String>,

    /// Print machine-readable output
    #[arg(long, global = true)]
    pub json: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Clone, Subcommand)]
pub enum Command {
    /// List the owner's outstanding approvals
    Scan,
    /// Revoke a single spender
    Revoke {
        /// Spender to revoke
        spender: Address,
    },
    /// Revoke every outstanding approval, one transaction at a time
    RevokeAll,
}

/// One row as printed by the CLI
#[derive(Debug, Serialize)]
struct RowView {
    spender: Address,
    allowance: String,
    raw_allowance: Option<U256>,
    state: RowState,
    error: Option<RevokeErrorKind>,
}

impl RowView {
    fn new(row: &RevocationRow, config: &RevokeConfig) -> Self {
        Self {
            spender: row.spender,
            allowance: row.display_allowance(config.decimals),
            raw_allowance: row.allowance.amount,
            state: row.state(),
            error: row.last_error,
        }
    }
}

#[derive(Debug, Serialize)]
struct SessionView {
    owner: Address,
    token: Address,
    summary: ApprovalSummary,
    rows: Vec<RowView>,
}

/// Main entry point for the application.
pub async fn run() -> anyhow::Result<()> {
    // Load environment variables before clap reads them
    dotenv().ok();

    let cli = Cli::parse();

    let chain = NamedChain::try_from(cli.chain_id)
        .map_err(|_| anyhow!("Unsupported chain id {}", cli.chain_id))?;

    let config = RevokeConfigBuilder::with_defaults()
        .token(cli.token)
        .chain(chain)
        .scan_window(cli.scan_window)
        .build();

    let signer = cli
        .private_key
        .as_deref()
        .map(|key| key.parse::<PrivateKeySigner>())
        .transpose()
        .context("Invalid PRIVATE_KEY")?;
    let signer_address = signer.as_ref().map(PrivateKeySigner::address);

    let owner = cli
        .owner
        .or(signer_address)
        .ok_or_else(|| anyhow!("Set OWNER or PRIVATE_KEY to choose a wallet"))?;

    if !matches!(cli.command, Command::Scan) {
        match signer_address {
            None => bail!("PRIVATE_KEY is required to revoke approvals"),
            Some(address) if address != owner => {
                bail!("Signer {address} cannot revoke approvals granted by {owner}")
            }
            Some(_) => {}
        }
    }

    let provider = connect_http(&cli.rpc_url, signer)?;
    ensure_chain(&provider, config.chain).await?;

    let session = ApprovalSession::new(Arc::new(AlloyChain::new(provider)), config);
    session.set_owner(Some(owner));

    let scan = session.wait_for_scan().await;
    if let Some(error) = scan.error {
        bail!("Approval scan failed: {error}");
    }
    info!(owner = %owner, spenders = scan.spenders.len(), "Scan finished");
    session.wait_for_allowances().await;

    match cli.command {
        Command::Scan => {}
        Command::Revoke { spender } => {
            let tx_hash = session.revoke(spender).await?;
            if !cli.json {
                println!("Revoked {spender} in {tx_hash}");
            }
        }
        Command::RevokeAll => {
            let report = session.revoke_all().await?;
            if !cli.json {
                for item in &report.items {
                    match item.outcome {
                        BatchItemOutcome::Revoked(tx_hash) => {
                            println!("Revoked {} in {tx_hash}", item.spender)
                        }
                        BatchItemOutcome::Failed(kind) => println!("{}: {kind}", item.spender),
                        BatchItemOutcome::Skipped(_) => {}
                    }
                }
            }

            let failed = report.failed().count();
            print_session(&session, owner, cli.json)?;
            if failed > 0 {
                bail!("{failed} of {} revocations failed", report.attempted());
            }
            return Ok(());
        }
    }

    print_session(&session, owner, cli.json)
}

/// Refuse to run against a provider on the wrong network
async fn ensure_chain(provider: &DynProvider, expected: NamedChain) -> anyhow::Result<()> {
    let actual = provider
        .get_chain_id()
        .await
        .context("Failed to read chain id")?;

    if actual != expected as u64 {
        bail!("Provider is on chain {actual}, expected {expected} ({})", expected as u64);
    }
    Ok(())
}

fn print_session(
    session: &ApprovalSession<AlloyChain<DynProvider>>,
    owner: Address,
    json: bool,
) -> anyhow::Result<()> {
    let config = session.config();
    let rows: Vec<RowView> = session
        .visible_rows()
        .iter()
        .map(|row| RowView::new(row, config))
        .collect();
    let summary = session.summary();

    if json {
        let view = SessionView {
            owner,
            token: config.token,
            summary,
            rows,
        };
        println!("{}", serde_json::to_string_pretty(&view)?);
        return Ok(());
    }

    println!("{}", summary.headline());
    for row in rows {
        let error = row.error.map(|kind| kind.message()).unwrap_or_default();
        println!(
            "{:<42}  {:>16}  {:<14}  {error}",
            row.spender.to_string(),
            row.allowance,
            row.state.to_string()
        );
    }
    Ok(())
}
