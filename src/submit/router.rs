//! Fan-out submission racing
//!
//! The same envelope goes to every channel concurrently; each spawned
//! attempt writes at most one result into the fan-in channel. The first
//! acceptance wins and the remaining attempts are abandoned - they are
//! side-effect-free locally and idempotent on the network side. Only when
//! every channel has failed or timed out does the router report failure,
//! carrying one detail per channel.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc;
use tokio::time::timeout;
use tracing::{debug, info, warn};

use crate::error::{Error, Result};
use crate::submit::channel::SubmissionChannel;
use crate::tx::builder::SignedEnvelope;

/// One channel's recorded failure
#[derive(Debug)]
pub struct ChannelFailure {
    pub channel: String,
    pub error: Error,
}

/// Terminal outcome of routing one envelope
#[derive(Debug)]
pub enum SubmissionOutcome {
    /// The network accepted and sequenced the transaction
    Accepted { hash: String, channel: String },
    /// Every channel failed or timed out; one entry per channel
    AllChannelsFailed(Vec<ChannelFailure>),
}

impl SubmissionOutcome {
    /// Collapse a failed outcome into a taxonomy error
    ///
    /// A definitive ledger rejection (the network saw the envelope and said
    /// no) outranks transport noise; pure transport failure aggregates into
    /// `AllChannelsFailed`.
    pub fn into_result(self) -> Result<(String, String)> {
        match self {
            SubmissionOutcome::Accepted { hash, channel } => Ok((hash, channel)),
            SubmissionOutcome::AllChannelsFailed(mut failures) => {
                if let Some(pos) = failures.iter().position(|f| is_definitive(&f.error)) {
                    return Err(failures.remove(pos).error);
                }
                let count = failures.len();
                let detail = failures
                    .iter()
                    .map(|f| format!("{}: {}", f.channel, f.error))
                    .collect::<Vec<_>>()
                    .join("; ");
                Err(Error::AllChannelsFailed { count, detail })
            }
        }
    }
}

/// The network rejected the envelope itself, as opposed to the path to the
/// network failing
fn is_definitive(error: &Error) -> bool {
    !matches!(error, Error::Horizon(_) | Error::HorizonTimeout(_))
}

/// Races one signed envelope across every configured channel
pub struct SubmissionRouter {
    channels: Vec<Arc<dyn SubmissionChannel>>,
    per_channel_deadline: Duration,
}

impl SubmissionRouter {
    pub fn new(
        channels: Vec<Arc<dyn SubmissionChannel>>,
        per_channel_deadline: Duration,
    ) -> Result<Self> {
        if channels.is_empty() {
            return Err(Error::Config(
                "at least one submission channel is required".to_string(),
            ));
        }
        Ok(Self {
            channels,
            per_channel_deadline,
        })
    }

    pub fn channel_count(&self) -> usize {
        self.channels.len()
    }

    /// Submit the envelope, first success wins
    pub async fn submit(&self, envelope: &SignedEnvelope) -> SubmissionOutcome {
        let (result_tx, mut result_rx) = mpsc::channel(self.channels.len());

        for channel in &self.channels {
            let channel = Arc::clone(channel);
            let result_tx = result_tx.clone();
            let envelope_xdr = envelope.xdr_base64.clone();
            let deadline = self.per_channel_deadline;

            tokio::spawn(async move {
                let label = channel.label().to_string();
                debug!("Dispatching envelope via {}", label);
                let result = match timeout(deadline, channel.submit(&envelope_xdr)).await {
                    Ok(result) => result,
                    Err(_) => Err(Error::HorizonTimeout(deadline.as_millis() as u64)),
                };
                // Receiver may be gone if another channel already won
                let _ = result_tx.send((label, result)).await;
            });
        }
        drop(result_tx);

        let mut failures = Vec::with_capacity(self.channels.len());
        while let Some((channel, result)) = result_rx.recv().await {
            match result {
                Ok(hash) => {
                    info!("Envelope accepted via {} ({})", channel, hash);
                    return SubmissionOutcome::Accepted { hash, channel };
                }
                Err(error) => {
                    warn!("Channel {} failed: {}", channel, error);
                    failures.push(ChannelFailure { channel, error });
                }
            }
        }

        SubmissionOutcome::AllChannelsFailed(failures)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::time::Instant;

    enum MockBehavior {
        Accept(&'static str),
        AcceptAfter(Duration, &'static str),
        Fail,
        RejectStaleSeq,
        Hang,
    }

    struct MockChannel {
        name: &'static str,
        behavior: MockBehavior,
    }

    #[async_trait]
    impl SubmissionChannel for MockChannel {
        fn label(&self) -> &str {
            self.name
        }

        async fn submit(&self, _envelope: &str) -> Result<String> {
            match &self.behavior {
                MockBehavior::Accept(hash) => Ok(hash.to_string()),
                MockBehavior::AcceptAfter(delay, hash) => {
                    tokio::time::sleep(*delay).await;
                    Ok(hash.to_string())
                }
                MockBehavior::Fail => Err(Error::Horizon("connection refused".to_string())),
                MockBehavior::RejectStaleSeq => {
                    Err(Error::StaleSequence("tx_bad_seq".to_string()))
                }
                MockBehavior::Hang => {
                    tokio::time::sleep(Duration::from_secs(60)).await;
                    Err(Error::Horizon("unreachable".to_string()))
                }
            }
        }
    }

    fn channels(mocks: Vec<MockChannel>) -> Vec<Arc<dyn SubmissionChannel>> {
        mocks
            .into_iter()
            .map(|m| Arc::new(m) as Arc<dyn SubmissionChannel>)
            .collect()
    }

    fn envelope() -> SignedEnvelope {
        SignedEnvelope {
            xdr_base64: "AAAA".to_string(),
            hash: "cafebabe".to_string(),
        }
    }

    #[tokio::test]
    async fn test_first_success_wins_without_waiting() {
        let router = SubmissionRouter::new(
            channels(vec![
                MockChannel {
                    name: "hanging",
                    behavior: MockBehavior::Hang,
                },
                MockChannel {
                    name: "failing",
                    behavior: MockBehavior::Fail,
                },
                MockChannel {
                    name: "winner",
                    behavior: MockBehavior::AcceptAfter(Duration::from_millis(20), "deadbeef"),
                },
            ]),
            Duration::from_secs(5),
        )
        .unwrap();

        let started = Instant::now();
        let outcome = router.submit(&envelope()).await;
        // Returned as soon as the winner resolved, not after the hang
        assert!(started.elapsed() < Duration::from_secs(1));
        match outcome {
            SubmissionOutcome::Accepted { hash, channel } => {
                assert_eq!(hash, "deadbeef");
                assert_eq!(channel, "winner");
            }
            other => panic!("expected acceptance, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_all_failures_recorded() {
        let router = SubmissionRouter::new(
            channels(vec![
                MockChannel {
                    name: "a",
                    behavior: MockBehavior::Fail,
                },
                MockChannel {
                    name: "b",
                    behavior: MockBehavior::Fail,
                },
                MockChannel {
                    name: "c",
                    behavior: MockBehavior::Fail,
                },
            ]),
            Duration::from_secs(5),
        )
        .unwrap();

        match router.submit(&envelope()).await {
            SubmissionOutcome::AllChannelsFailed(failures) => {
                assert_eq!(failures.len(), 3);
                let mut labels: Vec<_> = failures.iter().map(|f| f.channel.as_str()).collect();
                labels.sort_unstable();
                assert_eq!(labels, ["a", "b", "c"]);
            }
            other => panic!("expected all-failed, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_hung_channel_times_out() {
        let router = SubmissionRouter::new(
            channels(vec![MockChannel {
                name: "hanging",
                behavior: MockBehavior::Hang,
            }]),
            Duration::from_millis(50),
        )
        .unwrap();

        match router.submit(&envelope()).await {
            SubmissionOutcome::AllChannelsFailed(failures) => {
                assert_eq!(failures.len(), 1);
                assert!(matches!(failures[0].error, Error::HorizonTimeout(_)));
            }
            other => panic!("expected timeout failure, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_definitive_rejection_outranks_transport_noise() {
        let router = SubmissionRouter::new(
            channels(vec![
                MockChannel {
                    name: "a",
                    behavior: MockBehavior::Fail,
                },
                MockChannel {
                    name: "b",
                    behavior: MockBehavior::RejectStaleSeq,
                },
            ]),
            Duration::from_secs(5),
        )
        .unwrap();

        let err = router.submit(&envelope()).await.into_result().unwrap_err();
        assert!(matches!(err, Error::StaleSequence(_)));
    }

    #[tokio::test]
    async fn test_pure_transport_failure_aggregates() {
        let router = SubmissionRouter::new(
            channels(vec![
                MockChannel {
                    name: "a",
                    behavior: MockBehavior::Fail,
                },
                MockChannel {
                    name: "b",
                    behavior: MockBehavior::Fail,
                },
            ]),
            Duration::from_secs(5),
        )
        .unwrap();

        let err = router.submit(&envelope()).await.into_result().unwrap_err();
        match err {
            Error::AllChannelsFailed { count, detail } => {
                assert_eq!(count, 2);
                assert!(detail.contains("a:"));
                assert!(detail.contains("b:"));
            }
            other => panic!("expected aggregate, got {}", other),
        }
    }

    #[tokio::test]
    async fn test_single_channel_accept() {
        let router = SubmissionRouter::new(
            channels(vec![MockChannel {
                name: "only",
                behavior: MockBehavior::Accept("abc123"),
            }]),
            Duration::from_secs(5),
        )
        .unwrap();

        let (hash, channel) = router.submit(&envelope()).await.into_result().unwrap();
        assert_eq!(hash, "abc123");
        assert_eq!(channel, "only");
    }

    #[test]
    fn test_empty_channel_set_rejected() {
        assert!(SubmissionRouter::new(vec![], Duration::from_secs(5)).is_err());
    }
}
