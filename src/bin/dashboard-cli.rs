use std::collections::BTreeMap;
use std::path::PathBuf;
use std::sync::Arc;

use clap::{Parser, Subcommand};
use rust_decimal::Decimal;
use serde::Serialize;

use reserve_dashboard::config::load_or_default;
use reserve_dashboard::ledger::{
    BurnRequest, CredentialStore, LedgerClient, MintRequest, TransactionMetadata, TransferRequest,
};
use reserve_dashboard::observability::logging;
use reserve_dashboard::Dashboard;

#[derive(Parser)]
#[command(name = "dashboard-cli")]
#[command(about = "One-shot commands against the HKD ledger", long_about = None)]
struct Cli {
    /// Path to a TOML config file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Ledger base URL (overrides the config)
    #[arg(short, long)]
    url: Option<String>,

    /// Bearer token (overrides the configured environment variable)
    #[arg(short, long)]
    token: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show a wallet
    Wallet { address: String },
    /// Show the reserve and its backing status
    Reserve,
    /// List recent transactions of a wallet
    Transactions {
        address: String,
        #[arg(short, long)]
        limit: Option<u32>,
    },
    /// List compliance alerts
    Alerts,
    /// Open a wallet from a KYC JSON document
    CreateWallet {
        /// KYC payload, e.g. '{"address":"corp_abc123","name":"Acme Ltd"}'
        kyc: String,
    },
    /// Transfer HKD between wallets
    Transfer {
        from: String,
        to: String,
        amount: Decimal,
        #[arg(long)]
        reference: Option<String>,
        #[arg(long)]
        purpose: Option<String>,
    },
    /// Mint HKD against reserve assets
    Mint {
        to: String,
        amount: Decimal,
        /// Backing asset as NAME=AMOUNT, repeatable
        #[arg(long = "backing", value_parser = parse_backing)]
        backing: Vec<(String, Decimal)>,
    },
    /// Burn HKD from a wallet
    Burn { from: String, amount: Decimal },
    /// Freeze a wallet
    Freeze { address: String },
    /// Unfreeze a wallet
    Unfreeze { address: String },
}

fn parse_backing(raw: &str) -> Result<(String, Decimal), String> {
    let (asset, amount) = raw
        .split_once('=')
        .ok_or_else(|| format!("expected NAME=AMOUNT, got '{}'", raw))?;
    let amount = amount
        .parse::<Decimal>()
        .map_err(|e| format!("invalid amount '{}': {}", amount, e))?;
    Ok((asset.to_string(), amount))
}

fn print_json<T: Serialize>(value: &T) -> Result<(), Box<dyn std::error::Error>> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let mut config = load_or_default(cli.config.as_deref())?;
    logging::init_logging("warn");
    if let Some(url) = cli.url {
        config.ledger.base_url = url;
    }
    if let Commands::Transactions { limit: Some(limit), .. } = &cli.command {
        config.ledger.transactions_limit = *limit;
    }

    let credentials = match cli.token {
        Some(token) => CredentialStore::with_token(token),
        None => CredentialStore::from_env(&config.ledger.auth_token_env),
    };
    let client = LedgerClient::new(&config.ledger, credentials)?;
    let dashboard = Dashboard::with_api(config, Arc::new(client));

    match cli.command {
        Commands::Wallet { address } => print_json(&dashboard.wallet(&address).await?)?,
        Commands::Reserve => {
            let reserve = dashboard.reserve().await?;
            print_json(&reserve)?;
            let status = if reserve.is_fully_backed() { "Fully Backed" } else { "Under-Backed" };
            println!("Reserve status: {}", status);
        }
        Commands::Transactions { address, .. } => {
            print_json(&dashboard.transactions(&address).await?)?
        }
        Commands::Alerts => print_json(&dashboard.compliance_alerts().await?)?,
        Commands::CreateWallet { kyc } => {
            let kyc: serde_json::Value = serde_json::from_str(&kyc)?;
            print_json(&dashboard.create_wallet(&kyc).await?)?
        }
        Commands::Transfer {
            from,
            to,
            amount,
            reference,
            purpose,
        } => {
            let metadata = (reference.is_some() || purpose.is_some()).then(|| TransactionMetadata {
                reference,
                purpose,
                ..Default::default()
            });
            let tx = dashboard
                .transfer(TransferRequest {
                    from_address: from,
                    to_address: to,
                    amount,
                    metadata,
                })
                .await?;
            print_json(&tx)?
        }
        Commands::Mint { to, amount, backing } => {
            let tx = dashboard
                .mint(MintRequest {
                    to_address: to,
                    amount,
                    asset_backing: backing.into_iter().collect::<BTreeMap<_, _>>(),
                })
                .await?;
            print_json(&tx)?
        }
        Commands::Burn { from, amount } => {
            let tx = dashboard
                .burn(BurnRequest {
                    from_address: from,
                    amount,
                })
                .await?;
            print_json(&tx)?
        }
        Commands::Freeze { address } => {
            dashboard.freeze(&address).await?;
            println!("Wallet {} frozen", address);
        }
        Commands::Unfreeze { address } => {
            dashboard.unfreeze(&address).await?;
            println!("Wallet {} unfrozen", address);
        }
    }

    dashboard.shutdown();
    Ok(())
}
