//! The unattended outer loop
//!
//! Visits wallets in fixed order, wrapping to the start after the last,
//! forever, with a constant delay between wallets to respect remote rate
//! limits. The loop index is the only state carried across iterations;
//! everything else is recomputed fresh inside each pass, which makes a
//! crash-restart from wallet zero safe.

use std::time::Duration;

use tokio::time::sleep;
use tracing::{debug, error, info};

use crate::error::Error;
use crate::notify::{short_id, SweepEvent, TelegramNotifier};
use crate::sweep::pipeline::{PassOutcome, PassReport, SweepPipeline};
use crate::tx::amount::format_amount;

pub struct SweepOrchestrator {
    pipeline: SweepPipeline,
    notifier: Option<TelegramNotifier>,
    wallets: Vec<String>,
    delay: Duration,
}

impl SweepOrchestrator {
    pub fn new(
        pipeline: SweepPipeline,
        notifier: Option<TelegramNotifier>,
        wallets: Vec<String>,
        delay: Duration,
    ) -> Self {
        Self {
            pipeline,
            notifier,
            wallets,
            delay,
        }
    }

    /// Run the sweep loop; only process termination stops it
    pub async fn run(&self) -> crate::error::Result<()> {
        info!(
            "Sweeping {} wallets, {}ms between wallets",
            self.wallets.len(),
            self.delay.as_millis()
        );

        let mut index: usize = 0;
        loop {
            info!("Wallet {}/{}", index + 1, self.wallets.len());

            let report = self.pipeline.run_pass(&self.wallets[index]).await;
            self.report(&report).await;

            index = (index + 1) % self.wallets.len();
            if index == 0 {
                info!("All wallets processed, wrapping around");
            }

            sleep(self.delay).await;
        }
    }

    async fn report(&self, report: &PassReport) {
        match &report.outcome {
            PassOutcome::Swept {
                amount,
                hash,
                channel,
            } => {
                info!(
                    "Swept {} from {} via {} ({})",
                    amount
                        .map(format_amount)
                        .unwrap_or_else(|| "full balance".to_string()),
                    short_id(&report.wallet),
                    channel,
                    hash
                );
                self.notify(SweepEvent::Success {
                    wallet: report.wallet.clone(),
                    amount: *amount,
                    hash: hash.clone(),
                })
                .await;
            }
            PassOutcome::DryRun { amount } => {
                info!(
                    "Dry-run complete for {} ({})",
                    short_id(&report.wallet),
                    amount
                        .map(format_amount)
                        .unwrap_or_else(|| "full balance".to_string()),
                );
            }
            PassOutcome::Skipped(reason) => {
                // Routine condition, no notification noise
                info!("Skipped {}: {}", short_id(&report.wallet), reason);
            }
            PassOutcome::Failed(e) => {
                error!("Wallet {} failed: {}", short_id(&report.wallet), e);
                if notify_on_failure(e) {
                    self.notify(SweepEvent::Failure {
                        wallet: report.wallet.clone(),
                        detail: e.to_string(),
                    })
                    .await;
                }
            }
        }
    }

    async fn notify(&self, event: SweepEvent) {
        if let Some(notifier) = &self.notifier {
            notifier.notify(&event).await;
        } else {
            debug!("No notifier configured, event not delivered");
        }
    }
}

/// Failures worth an operator's attention
///
/// A malformed list entry or a never-activated account cannot change on
/// their own; logging them once per pass is enough. Everything else is
/// reported so the operator can act (activate the destination, investigate
/// a signature mismatch, watch a network-wide outage).
fn notify_on_failure(error: &Error) -> bool {
    !matches!(error, Error::InvalidMnemonic(_) | Error::AccountNotFound(_))
}
