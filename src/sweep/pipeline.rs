//! Per-wallet sweep pass
//!
//! Derive → Load → Decide → Build&Sign → Submit → Report. Every stage maps
//! its failure into the error taxonomy and the pass ends at Report either
//! way; the caller moves on to the next wallet regardless.
//!
//! The account snapshot is loaded immediately before building, so the
//! envelope's sequence number is tied to exactly this pass. The keypair is
//! dropped (and its secret zeroized) when the pass returns.

use std::sync::Arc;

use chrono::Utc;
use tracing::{debug, info};

use crate::error::{Error, Result};
use crate::horizon::Ledger;
use crate::keys::WalletKeypair;
use crate::notify::short_id;
use crate::submit::SubmissionRouter;
use crate::sweep::policy::{AmountDecision, SkipReason, SweepMode};
use crate::tx::amount::{format_amount, Stroops};
use crate::tx::{Destination, TransactionBuilder};

/// Terminal outcome of one wallet's pass
#[derive(Debug)]
pub enum PassOutcome {
    /// Envelope accepted by the network
    Swept {
        /// None for account merges
        amount: Option<Stroops>,
        hash: String,
        channel: String,
    },
    /// Dry-run: envelope built but deliberately not submitted
    DryRun { amount: Option<Stroops> },
    /// Policy decided there is nothing to move
    Skipped(SkipReason),
    Failed(Error),
}

/// One wallet's pass result, ready for reporting
#[derive(Debug)]
pub struct PassReport {
    /// Public id when derivation succeeded, placeholder otherwise
    pub wallet: String,
    pub outcome: PassOutcome,
}

/// The per-wallet pipeline; pure function of (wallet, account state, config)
pub struct SweepPipeline {
    ledger: Arc<dyn Ledger>,
    router: SubmissionRouter,
    builder: TransactionBuilder,
    destination: Destination,
    mode: SweepMode,
    expiry_window_secs: u64,
    dry_run: bool,
}

impl SweepPipeline {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        ledger: Arc<dyn Ledger>,
        router: SubmissionRouter,
        builder: TransactionBuilder,
        destination: Destination,
        mode: SweepMode,
        expiry_window_secs: u64,
        dry_run: bool,
    ) -> Self {
        Self {
            ledger,
            router,
            builder,
            destination,
            mode,
            expiry_window_secs,
            dry_run,
        }
    }

    /// Run one full pass for one seed phrase; never propagates an error
    pub async fn run_pass(&self, phrase: &str) -> PassReport {
        let keypair = match WalletKeypair::from_phrase(phrase) {
            Ok(keypair) => keypair,
            Err(e) => {
                return PassReport {
                    wallet: "<invalid mnemonic>".to_string(),
                    outcome: PassOutcome::Failed(e),
                }
            }
        };

        let wallet = keypair.public_id().to_string();
        debug!("Processing wallet {}", short_id(&wallet));

        let outcome = match self.sweep(&keypair).await {
            Ok(outcome) => outcome,
            Err(e) => PassOutcome::Failed(e),
        };

        PassReport { wallet, outcome }
    }

    async fn sweep(&self, keypair: &WalletKeypair) -> Result<PassOutcome> {
        // Fresh snapshot: sequence is only valid for this one envelope
        let state = self.ledger.load_account(keypair.public_id()).await?;
        let fee = self.ledger.base_fee().await?;

        info!(
            "Wallet {} balance {} (fee {})",
            short_id(keypair.public_id()),
            format_amount(state.balance),
            fee
        );

        let valid_until = Utc::now().timestamp() as u64 + self.expiry_window_secs;

        let (unsigned, amount) = match self.mode.decide(state.balance, Stroops::from(fee)) {
            AmountDecision::Skip(reason) => {
                info!("Skipping {}: {}", short_id(keypair.public_id()), reason);
                return Ok(PassOutcome::Skipped(reason));
            }
            AmountDecision::Transfer(amount) => {
                let unsigned = self.builder.build_payment(
                    &state,
                    &self.destination,
                    amount,
                    fee,
                    valid_until,
                )?;
                (unsigned, Some(amount))
            }
            AmountDecision::Merge => {
                if state.subentry_count > 0 {
                    return Err(Error::SubEntriesPresent(format!(
                        "{} subentries open on {}",
                        state.subentry_count,
                        short_id(keypair.public_id())
                    )));
                }
                let unsigned =
                    self.builder
                        .build_merge(&state, &self.destination, fee, valid_until)?;
                (unsigned, None)
            }
        };

        if self.dry_run {
            info!(
                "Dry-run: would sweep {} from {}",
                amount.map(format_amount).unwrap_or_else(|| "full balance".to_string()),
                short_id(keypair.public_id())
            );
            return Ok(PassOutcome::DryRun { amount });
        }

        let envelope = unsigned.sign(keypair);
        let (hash, channel) = self.router.submit(&envelope).await.into_result()?;

        Ok(PassOutcome::Swept {
            amount,
            hash,
            channel,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use base64::engine::general_purpose::STANDARD as BASE64;
    use base64::Engine;
    use std::collections::HashMap;
    use std::sync::Mutex;
    use std::time::Duration;

    use crate::horizon::AccountState;
    use crate::submit::SubmissionChannel;

    // Distinct valid BIP-39 phrases (reference wordlist vectors)
    const PHRASE_1: &str =
        "abandon abandon abandon abandon abandon abandon abandon abandon abandon abandon abandon about";
    const PHRASE_2: &str =
        "legal winner thank year wave sausage worth useful legal winner thank yellow";
    const PHRASE_3: &str = "zoo zoo zoo zoo zoo zoo zoo zoo zoo zoo zoo wrong";

    struct MockLedger {
        accounts: HashMap<String, AccountState>,
        fee: u32,
    }

    #[async_trait]
    impl Ledger for MockLedger {
        async fn load_account(&self, account_id: &str) -> crate::error::Result<AccountState> {
            self.accounts
                .get(account_id)
                .cloned()
                .ok_or_else(|| Error::AccountNotFound(account_id.to_string()))
        }

        async fn base_fee(&self) -> crate::error::Result<u32> {
            Ok(self.fee)
        }
    }

    struct RecordingChannel {
        submitted: Mutex<Vec<String>>,
    }

    #[async_trait]
    impl SubmissionChannel for RecordingChannel {
        fn label(&self) -> &str {
            "recording"
        }

        async fn submit(&self, envelope_base64: &str) -> crate::error::Result<String> {
            let mut submitted = self.submitted.lock().unwrap();
            submitted.push(envelope_base64.to_string());
            Ok(format!("hash-{}", submitted.len()))
        }
    }

    const COIN: i64 = 10_000_000;

    fn account(id: &str, balance: i64, sequence: i64) -> AccountState {
        AccountState {
            account_id: id.to_string(),
            balance,
            sequence,
            subentry_count: 0,
        }
    }

    fn pipeline_with(
        accounts: HashMap<String, AccountState>,
        mode: SweepMode,
        dry_run: bool,
    ) -> (SweepPipeline, Arc<RecordingChannel>) {
        let channel = Arc::new(RecordingChannel {
            submitted: Mutex::new(Vec::new()),
        });
        let router = SubmissionRouter::new(
            vec![channel.clone() as Arc<dyn SubmissionChannel>],
            Duration::from_secs(5),
        )
        .unwrap();

        let pipeline = SweepPipeline::new(
            Arc::new(MockLedger { accounts, fee: 100 }),
            router,
            TransactionBuilder::new("Pi Network"),
            Destination::Plain([7u8; 32]),
            mode,
            30,
            dry_run,
        );
        (pipeline, channel)
    }

    fn envelope_sequence(envelope_base64: &str) -> i64 {
        let raw = BASE64.decode(envelope_base64).unwrap();
        // Envelope: type tag (4), source (4 + 32), fee (4), then seqNum
        let seq: [u8; 8] = raw[44..52].try_into().unwrap();
        i64::from_be_bytes(seq)
    }

    #[tokio::test]
    async fn test_three_wallet_scenario() {
        let k1 = WalletKeypair::from_phrase(PHRASE_1).unwrap();
        let k2 = WalletKeypair::from_phrase(PHRASE_2).unwrap();
        let k3 = WalletKeypair::from_phrase(PHRASE_3).unwrap();

        let mut accounts = HashMap::new();
        accounts.insert(k1.public_id().to_string(), account(k1.public_id(), 5 * COIN, 100));
        // Wallet #2 sits below reserve + fee
        accounts.insert(k2.public_id().to_string(), account(k2.public_id(), COIN, 200));
        accounts.insert(k3.public_id().to_string(), account(k3.public_id(), 3 * COIN, 300));

        let (pipeline, channel) = pipeline_with(
            accounts,
            SweepMode::DrainAbove { reserve: COIN },
            false,
        );

        let r1 = pipeline.run_pass(PHRASE_1).await;
        let r2 = pipeline.run_pass(PHRASE_2).await;
        let r3 = pipeline.run_pass(PHRASE_3).await;

        assert!(matches!(
            r1.outcome,
            PassOutcome::Swept { amount: Some(a), .. } if a == 4 * COIN - 100
        ));
        assert!(matches!(
            r2.outcome,
            PassOutcome::Skipped(SkipReason::BelowReserve)
        ));
        assert!(matches!(
            r3.outcome,
            PassOutcome::Swept { amount: Some(a), .. } if a == 2 * COIN - 100
        ));

        // Exactly one envelope per swept wallet, each bound to the sequence
        // loaded immediately before building
        let submitted = channel.submitted.lock().unwrap();
        assert_eq!(submitted.len(), 2);
        assert_eq!(envelope_sequence(&submitted[0]), 101);
        assert_eq!(envelope_sequence(&submitted[1]), 301);
    }

    #[tokio::test]
    async fn test_invalid_mnemonic_isolated() {
        let (pipeline, channel) = pipeline_with(
            HashMap::new(),
            SweepMode::DrainAbove { reserve: COIN },
            false,
        );

        let report = pipeline.run_pass("not a real mnemonic at all").await;
        assert!(matches!(
            report.outcome,
            PassOutcome::Failed(Error::InvalidMnemonic(_))
        ));
        assert!(channel.submitted.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_unactivated_account() {
        let (pipeline, _) = pipeline_with(
            HashMap::new(),
            SweepMode::DrainAbove { reserve: COIN },
            false,
        );
        let report = pipeline.run_pass(PHRASE_1).await;
        assert!(matches!(
            report.outcome,
            PassOutcome::Failed(Error::AccountNotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_merge_blocked_by_subentries() {
        let keypair = WalletKeypair::from_phrase(PHRASE_1).unwrap();
        let mut state = account(keypair.public_id(), 5 * COIN, 100);
        state.subentry_count = 2;
        let mut accounts = HashMap::new();
        accounts.insert(keypair.public_id().to_string(), state);

        let (pipeline, channel) = pipeline_with(accounts, SweepMode::MergeAll, false);
        let report = pipeline.run_pass(PHRASE_1).await;
        assert!(matches!(
            report.outcome,
            PassOutcome::Failed(Error::SubEntriesPresent(_))
        ));
        assert!(channel.submitted.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_dry_run_submits_nothing() {
        let keypair = WalletKeypair::from_phrase(PHRASE_1).unwrap();
        let mut accounts = HashMap::new();
        accounts.insert(
            keypair.public_id().to_string(),
            account(keypair.public_id(), 5 * COIN, 100),
        );

        let (pipeline, channel) = pipeline_with(
            accounts,
            SweepMode::DrainAbove { reserve: COIN },
            true,
        );
        let report = pipeline.run_pass(PHRASE_1).await;
        assert!(matches!(report.outcome, PassOutcome::DryRun { amount: Some(_) }));
        assert!(channel.submitted.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_already_drained_wallet_skips_again() {
        let keypair = WalletKeypair::from_phrase(PHRASE_1).unwrap();
        let mut accounts = HashMap::new();
        // Balance sits exactly at the reserve after an earlier sweep
        accounts.insert(
            keypair.public_id().to_string(),
            account(keypair.public_id(), COIN, 100),
        );

        let (pipeline, channel) = pipeline_with(
            accounts,
            SweepMode::DrainAbove { reserve: COIN },
            false,
        );

        for _ in 0..2 {
            let report = pipeline.run_pass(PHRASE_1).await;
            assert!(matches!(
                report.outcome,
                PassOutcome::Skipped(SkipReason::BelowReserve)
            ));
        }
        assert!(channel.submitted.lock().unwrap().is_empty());
    }
}
