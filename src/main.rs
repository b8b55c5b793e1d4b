//! Reserve dashboard (v1)
//!
//! Watches one wallet plus the reserve and compliance alerts, and re-renders
//! the text view whenever any of them changes.
//!
//! # Architecture Overview
//!
//! ```text
//!     ┌─────────────────────────────────────────────────┐
//!     │                    DASHBOARD                    │
//!     │                                                 │
//!     │  ┌──────────┐   timers    ┌──────────────┐      │
//!     │  │  poller  │────────────▶│              │      │
//!     │  └──────────┘             │ entity cache │      │
//!     │  ┌──────────┐ invalidate  │              │      │
//!     │  │ mutation │────────────▶│              │      │
//!     │  └────┬─────┘             └──┬────────┬──┘      │
//!     │       │               fetch  │        │ events  │
//!     │       ▼                      ▼        ▼         │
//!     │  ┌─────────────────────────────┐  ┌────────┐    │
//!     │  │        ledger client        │  │  view  │    │
//!     │  └──────────────┬──────────────┘  └────────┘    │
//!     └─────────────────┼───────────────────────────────┘
//!                       ▼
//!              remote ledger (REST)
//! ```

use std::path::PathBuf;

use clap::Parser;
use reserve_dashboard::cache::{CacheEvent, Subscription};
use reserve_dashboard::config::load_or_default;
use reserve_dashboard::observability::{logging, metrics};
use reserve_dashboard::view::render_text;
use reserve_dashboard::Dashboard;

#[derive(Parser)]
#[command(name = "reserve-dashboard")]
#[command(about = "Live dashboard for a custodial HKD stablecoin account", long_about = None)]
struct Args {
    /// Path to a TOML config file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Wallet address to watch (defaults to the configured account)
    #[arg(short, long)]
    address: Option<String>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();
    let config = load_or_default(args.config.as_deref())?;

    logging::init_logging(&config.observability.log_filter);
    tracing::info!("reserve-dashboard v{} starting", env!("CARGO_PKG_VERSION"));

    tracing::info!(
        base_url = %config.ledger.base_url,
        request_timeout_secs = config.ledger.request_timeout_secs,
        "Configuration loaded"
    );

    if config.observability.metrics_enabled {
        if let Ok(addr) = config.observability.metrics_address.parse() {
            metrics::init_metrics(addr);
        } else {
            tracing::error!(
                metrics_address = %config.observability.metrics_address,
                "Failed to parse metrics address"
            );
        }
    }

    let address = args
        .address
        .unwrap_or_else(|| config.account.wallet_address.clone());
    let dashboard = Dashboard::connect(config)?;

    let shutdown = dashboard.shutdown_handle();
    let mut stop = shutdown.subscribe();
    tokio::spawn(async move { shutdown.trigger_on_ctrl_c().await });

    // Without an account only the reserve and alerts panels are live.
    let has_account = !address.trim().is_empty();
    if !has_account {
        tracing::warn!("No wallet address configured, wallet panels stay empty");
    }
    let mut wallet = has_account.then(|| dashboard.watch_wallet(&address));
    let mut transactions = has_account.then(|| dashboard.watch_transactions(&address));
    let mut reserve = dashboard.watch_reserve();
    let mut alerts = dashboard.watch_alerts();

    loop {
        tokio::select! {
            Some(_) = next_event(&mut wallet) => {}
            Some(_) = next_event(&mut transactions) => {}
            Some(_) = reserve.recv() => {}
            Some(_) = alerts.recv() => {}
            _ = stop.recv() => break,
        }
        println!("{}", render_text(&dashboard.snapshot(&address)));
    }

    dashboard.shutdown();
    tracing::info!("Shutdown complete");
    Ok(())
}

async fn next_event(subscription: &mut Option<Subscription>) -> Option<CacheEvent> {
    match subscription {
        Some(subscription) => subscription.recv().await,
        None => std::future::pending().await,
    }
}
