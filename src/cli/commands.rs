//! CLI command implementations

use std::path::Path;
use std::sync::Arc;

use anyhow::Result;
use tracing::{info, warn};

use crate::config::Config;
use crate::error::Error;
use crate::horizon::{HorizonClient, Ledger};
use crate::keys::{strkey, WalletKeypair};
use crate::notify::{short_id, TelegramNotifier};
use crate::submit::{DirectChannel, ProxyChannel, SubmissionChannel, SubmissionRouter};
use crate::sweep::{wallets, SweepOrchestrator, SweepPipeline};
use crate::tx::amount::format_amount;
use crate::tx::TransactionBuilder;

/// Start the sweep loop
pub async fn start(config: &Config, dry_run: bool) -> Result<()> {
    if dry_run {
        warn!("Running in DRY-RUN mode - no transactions will be submitted");
    }

    let wallet_list = wallets::load_wallets(Path::new(&config.sweep.wallets_file))?;
    let destination = config.destination()?;
    let mode = config.sweep_mode()?;

    info!(
        "Sweeping {} wallets into {} ({})",
        wallet_list.len(),
        short_id(&destination.to_string()),
        mode
    );

    let ledger: Arc<dyn Ledger> = Arc::new(HorizonClient::new(
        &config.horizon.endpoint,
        config.horizon.timeout_ms,
    )?);

    let router = build_router(config)?;
    info!("{} submission channels configured", router.channel_count());

    let pipeline = SweepPipeline::new(
        ledger,
        router,
        TransactionBuilder::new(&config.horizon.network_passphrase),
        destination,
        mode,
        config.sweep.tx_expiry_secs,
        dry_run,
    );

    let notifier = if config.telegram_enabled() {
        Some(TelegramNotifier::new(
            &config.telegram.bot_token,
            &config.telegram.chat_id,
            &config.sweep.explorer_base,
        )?)
    } else {
        info!("Telegram notifier not configured, events will only be logged");
        None
    };

    let orchestrator = SweepOrchestrator::new(
        pipeline,
        notifier,
        wallet_list,
        config.inter_wallet_delay(),
    );
    orchestrator.run().await?;

    Ok(())
}

/// One derive+load pass per wallet, balances printed, nothing submitted
pub async fn status(config: &Config) -> Result<()> {
    let wallet_list = wallets::load_wallets(Path::new(&config.sweep.wallets_file))?;
    let ledger = HorizonClient::new(&config.horizon.endpoint, config.horizon.timeout_ms)?;

    println!("{:>4}  {:<16}  {}", "#", "wallet", "balance");
    for (index, phrase) in wallet_list.iter().enumerate() {
        let line = match WalletKeypair::from_phrase(phrase) {
            Err(e) => format!("<unusable entry: {}>", e),
            Ok(keypair) => match ledger.load_account(keypair.public_id()).await {
                Ok(state) => format!(
                    "{:<16}  {}",
                    short_id(keypair.public_id()),
                    format_amount(state.balance)
                ),
                Err(Error::AccountNotFound(_)) => {
                    format!("{:<16}  (not activated)", short_id(keypair.public_id()))
                }
                Err(e) => format!("{:<16}  error: {}", short_id(keypair.public_id()), e),
            },
        };
        println!("{:>4}  {}", index + 1, line);
    }

    Ok(())
}

/// Show current configuration (secrets masked)
pub fn show_config(config: &Config) -> Result<()> {
    println!("{}", config.masked_display());
    Ok(())
}

/// Check Horizon reachability, fee source, destination, notifier
pub async fn health(config: &Config) -> Result<()> {
    let ledger = HorizonClient::new(&config.horizon.endpoint, config.horizon.timeout_ms)?;

    let started = std::time::Instant::now();
    match ledger.base_fee().await {
        Ok(fee) => println!(
            "horizon      OK   base fee {} stroops ({}ms)",
            fee,
            started.elapsed().as_millis()
        ),
        Err(e) => println!("horizon      FAIL {}", e),
    }

    let destination = config.destination()?;
    let base_id = strkey::encode_account_id(destination.base_account());
    match ledger.load_account(&base_id).await {
        Ok(state) => println!(
            "destination  OK   {} holds {}",
            short_id(&base_id),
            format_amount(state.balance)
        ),
        Err(Error::AccountNotFound(_)) => println!(
            "destination  WARN {} not activated yet - sweeps will fail until it is funded",
            short_id(&base_id)
        ),
        Err(e) => println!("destination  FAIL {}", e),
    }

    println!(
        "proxies      {} configured",
        config.submit.proxies.len()
    );
    println!(
        "telegram     {}",
        if config.telegram_enabled() {
            "configured"
        } else {
            "not configured"
        }
    );

    Ok(())
}

fn build_router(config: &Config) -> Result<SubmissionRouter> {
    let timeout_ms = config.submit.per_channel_timeout_ms;
    let mut channels: Vec<Arc<dyn SubmissionChannel>> = vec![Arc::new(DirectChannel::new(
        &config.horizon.endpoint,
        timeout_ms,
    )?)];

    for proxy in &config.submit.proxies {
        channels.push(Arc::new(ProxyChannel::new(
            &config.horizon.endpoint,
            proxy,
            timeout_ms,
        )?));
    }

    Ok(SubmissionRouter::new(
        channels,
        config.per_channel_deadline(),
    )?)
}
