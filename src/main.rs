use clap::{Parser, Subcommand};
use eyre::{bail, WrapErr};
use std::io::{self, BufRead, Write};
use std::time::Duration;

use trx_common::setup_logging_with_level;
use trx_transfer::node::explorer_tx_url;
use trx_transfer::{
    Amount, ClientOptions, CostEstimate, Network, Node, PipelineConfig, PreparedTransfer,
    Secp256k1Signer, TransactionId, TransferOutcome, TransferPipeline, TransferReport,
    TransferRequest, TronGridClient,
};

#[derive(Parser)]
#[command(name = "trx-transfer")]
#[command(about = "Send TRX and inspect accounts on the TRON network")]
#[command(version)]
struct Cli {
    /// TRON network (mainnet, shasta or nile)
    #[arg(long, global = true, default_value = "shasta", env = "TRX_NETWORK")]
    network: Network,
    /// Override the TronGrid base URL, e.g. a local full node
    #[arg(long, global = true)]
    node_url: Option<String>,
    /// TronGrid API key
    #[arg(long, global = true, env = "TRONGRID_API_KEY", hide_env_values = true)]
    api_key: Option<String>,
    /// Upper bound for each network-bound stage, in seconds
    #[arg(long, global = true, default_value_t = 30)]
    timeout_secs: u64,
    /// Log filter, e.g. "info" or "trx_transfer=debug"
    #[arg(long, global = true, default_value = "info")]
    log_level: String,
    /// Print results as JSON
    #[arg(long, global = true)]
    json: bool,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Send TRX
    Send {
        /// Sender address
        #[arg(long)]
        from: String,
        /// Receiver address
        #[arg(long)]
        to: String,
        /// Amount in TRX, up to 6 decimals
        #[arg(long)]
        amount: Amount,
        /// Sender's private key as hex
        #[arg(long, env = "TRX_PRIVATE_KEY", hide_env_values = true)]
        private_key: String,
        /// Skip the confirmation prompt
        #[arg(long)]
        yes: bool,
        /// Build and sign, print the transaction, do not broadcast
        #[arg(long)]
        dry_run: bool,
    },
    /// Show an account balance
    Balance {
        address: String,
    },
    /// Estimate the fee of a transfer
    Estimate {
        #[arg(long)]
        from: String,
        #[arg(long)]
        to: String,
        /// Amount in TRX
        #[arg(long, default_value = "1")]
        amount: Amount,
    },
    /// Look a transaction up by id
    Status {
        tx_id: String,
    },
}

fn print_estimate(estimate: &CostEstimate) {
    println!("💰 Fee estimate:");
    println!(
        "   Bandwidth: {} units × {} sun = {}",
        estimate.bandwidth_used, estimate.bandwidth_price, estimate.bandwidth_cost
    );
    println!(
        "   Energy: {} units × {} sun = {}",
        estimate.energy_used, estimate.energy_price, estimate.energy_cost
    );
    if let Some(probe_fee) = estimate.probe_fee {
        println!("   Node fee limit: {}", probe_fee);
    }
    println!("   Estimated fee: {}", estimate.estimated_fee);
    println!("   Note: {}", estimate.note);
    if let Some(error) = &estimate.error {
        println!("   ⚠️  {}", error);
    }
}

fn print_summary(prepared: &PreparedTransfer, network: Network) {
    println!("💸 Transfer summary ({}):", network);
    if !network.is_testnet() {
        println!("   ⚠️  MAINNET: this moves real TRX");
    }
    println!("   From: {}", prepared.from());
    println!("   To: {}", prepared.to());
    println!("   Amount: {}", prepared.amount());
    println!("   Balance: {}", prepared.balance());
    print_estimate(prepared.estimate());
    println!("   Total cost: {}", prepared.total_cost());
}

fn print_report(report: &TransferReport, json: bool) -> eyre::Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(report)?);
        return Ok(());
    }

    match &report.outcome {
        TransferOutcome::Succeeded {
            tx_id,
            explorer_url,
            ..
        } => {
            println!("✅ Transaction sent successfully!");
            println!("   TXID: {}", tx_id);
            println!("   View on Tronscan: {}", explorer_url);
            if let Some(expires_at) = report.expires_at {
                println!("   Expires: {}", expires_at);
            }
        }
        TransferOutcome::Failed(failure) => {
            println!("❌ Transfer failed at {}: {}", failure.stage, failure.error);
            if let Some(total) = report.total_cost {
                println!("   Total cost was: {}", total);
            }
        }
        TransferOutcome::Unknown {
            tx_id,
            explorer_url,
            reason,
        } => {
            println!("⚠️  Broadcast outcome unknown: {}", reason);
            println!("   TXID: {}", tx_id);
            println!("   Check before resending: trx-transfer status {}", tx_id);
            println!("   {}", explorer_url);
        }
    }
    Ok(())
}

fn confirm(prompt: &str) -> io::Result<bool> {
    print!("{} [y/N] ", prompt);
    io::stdout().flush()?;
    let mut answer = String::new();
    io::stdin().lock().read_line(&mut answer)?;
    Ok(matches!(answer.trim().to_lowercase().as_str(), "y" | "yes"))
}

#[tokio::main]
async fn main() -> eyre::Result<()> {
    let cli = Cli::parse();
    setup_logging_with_level(&cli.log_level)?;

    let node = match &cli.node_url {
        Some(url) => Node::custom(cli.network, url.clone()),
        None => Node::default(cli.network),
    };
    let client = TronGridClient::new(
        node,
        ClientOptions {
            api_key: cli.api_key.clone(),
            ..Default::default()
        },
    )?;
    let config =
        PipelineConfig::new(cli.network).with_stage_timeout(Duration::from_secs(cli.timeout_secs));

    match cli.command {
        Commands::Send {
            from,
            to,
            amount,
            private_key,
            yes,
            dry_run,
        } => {
            let signer = Secp256k1Signer::from_hex(&private_key)?;
            let pipeline = TransferPipeline::new(client, signer, config);
            let request = TransferRequest::new(from, to, amount);

            let prepared = match pipeline.prepare(&request).await {
                Ok(prepared) => prepared,
                Err(report) => {
                    print_report(&report, cli.json)?;
                    bail!("transfer not sent");
                }
            };
            if !cli.json {
                print_summary(&prepared, cli.network);
            }

            if dry_run {
                match pipeline.sign_only(prepared).await {
                    Ok(signed) => println!("{}", serde_json::to_string_pretty(&signed)?),
                    Err(report) => {
                        print_report(&report, cli.json)?;
                        bail!("dry run failed");
                    }
                }
                return Ok(());
            }

            if !yes && !confirm(&format!("Send {} on {}?", amount, cli.network))? {
                println!("Cancelled");
                return Ok(());
            }

            let report = pipeline.submit(prepared).await;
            print_report(&report, cli.json)?;
            if !report.is_success() {
                bail!("transfer did not complete");
            }
        }
        Commands::Balance { address } => {
            let pipeline = TransferPipeline::read_only(client, config);
            let balance = pipeline.balance(&address).await?;
            if cli.json {
                println!(
                    "{}",
                    serde_json::json!({ "address": address, "network": cli.network, "balance_sun": balance })
                );
            } else {
                println!("💰 {}", balance);
                println!("   Address: {}", address);
                println!("   Network: {}", cli.network);
            }
        }
        Commands::Estimate { from, to, amount } => {
            let pipeline = TransferPipeline::read_only(client, config);
            let estimate = pipeline
                .estimate(&TransferRequest::new(from, to, amount))
                .await?;
            if cli.json {
                println!("{}", serde_json::to_string_pretty(&estimate)?);
            } else {
                print_estimate(&estimate);
            }
        }
        Commands::Status { tx_id } => {
            let tx_id = TransactionId::from_hex(&tx_id).wrap_err("invalid transaction id")?;
            let pipeline = TransferPipeline::read_only(client, config);
            let lookup = pipeline.status(&tx_id).await?;
            if cli.json {
                println!("{}", serde_json::to_string_pretty(&lookup.raw_response)?);
            } else if lookup.found {
                println!("✅ Found: {}", tx_id);
                if let Some(result) = &lookup.contract_result {
                    println!("   Result: {}", result);
                }
                println!("   {}", explorer_tx_url(cli.network, &tx_id));
            } else {
                println!("❌ Not found on {}: {}", cli.network, tx_id);
            }
        }
    }

    Ok(())
}
