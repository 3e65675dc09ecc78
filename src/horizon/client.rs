//! Horizon HTTP client
//!
//! Read-only calls (account load, fee stats) retry briefly on transient
//! failures. Submission never retries here: one call, one outcome - retry
//! policy for submissions lives in the router and the outer sweep loop.

use std::time::Duration;

use async_trait::async_trait;
use backoff::{future::retry, ExponentialBackoff};
use reqwest::StatusCode;
use serde::de::DeserializeOwned;
use tracing::{debug, warn};
use url::Url;

use crate::error::{Error, Result};
use crate::horizon::result_codes;
use crate::horizon::types::{AccountRecord, AccountState, FeeStats, ProblemResponse, SubmitResponse};

/// The ledger network, reduced to the calls the sweep pipeline makes
#[async_trait]
pub trait Ledger: Send + Sync {
    /// Load a fresh account snapshot; `AccountNotFound` if never activated
    async fn load_account(&self, account_id: &str) -> Result<AccountState>;

    /// Current recommended base fee in stroops
    async fn base_fee(&self) -> Result<u32>;
}

/// Horizon client over one HTTP transport
///
/// A separate instance (with its own proxied transport) backs each proxy
/// submission channel; they all point at the same Horizon endpoint.
pub struct HorizonClient {
    base: Url,
    http: reqwest::Client,
    timeout_ms: u64,
}

impl HorizonClient {
    pub fn new(endpoint: &str, timeout_ms: u64) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_millis(timeout_ms))
            .build()
            .map_err(|e| Error::Config(format!("failed to build HTTP client: {}", e)))?;
        Self::with_http(endpoint, http, timeout_ms)
    }

    /// Build against an already-configured transport (proxy channels)
    pub fn with_http(endpoint: &str, http: reqwest::Client, timeout_ms: u64) -> Result<Self> {
        let base = Url::parse(endpoint)
            .map_err(|e| Error::Config(format!("invalid Horizon endpoint {:?}: {}", endpoint, e)))?;
        Ok(Self {
            base,
            http,
            timeout_ms,
        })
    }

    pub fn endpoint(&self) -> &str {
        self.base.as_str()
    }

    fn url(&self, path: &str) -> Result<Url> {
        self.base
            .join(path)
            .map_err(|e| Error::Config(format!("bad Horizon path {:?}: {}", path, e)))
    }

    fn map_transport(&self, e: reqwest::Error) -> Error {
        if e.is_timeout() {
            Error::HorizonTimeout(self.timeout_ms)
        } else {
            Error::Horizon(e.to_string())
        }
    }

    /// GET a JSON resource with a short, capped retry on transient failures
    async fn get_with_retry<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        let url = self.url(path)?;

        let policy = ExponentialBackoff {
            initial_interval: Duration::from_millis(200),
            max_interval: Duration::from_millis(800),
            max_elapsed_time: Some(Duration::from_secs(2)),
            ..Default::default()
        };

        retry(policy, || async {
            match self.get_once(url.clone()).await {
                Ok(value) => Ok(value),
                Err(e) if e.is_retryable() => {
                    warn!("Transient Horizon error on {}: {}", path, e);
                    Err(backoff::Error::transient(e))
                }
                Err(e) => Err(backoff::Error::permanent(e)),
            }
        })
        .await
    }

    async fn get_once<T: DeserializeOwned>(&self, url: Url) -> Result<T> {
        let response = self
            .http
            .get(url)
            .send()
            .await
            .map_err(|e| self.map_transport(e))?;

        match response.status() {
            status if status.is_success() => {
                Ok(response.json::<T>().await.map_err(|e| self.map_transport(e))?)
            }
            StatusCode::NOT_FOUND => Err(Error::AccountNotFound(String::new())),
            status => {
                let body = response.text().await.unwrap_or_default();
                Err(Error::Horizon(format!("HTTP {}: {}", status, body)))
            }
        }
    }

    /// Submit a signed envelope, single attempt
    ///
    /// Success means the network accepted and sequenced the transaction. A
    /// 2xx response whose body reports failure is mapped to a rejection,
    /// never a success.
    pub async fn submit(&self, envelope_base64: &str) -> Result<String> {
        let url = self.url("transactions")?;
        debug!("Submitting envelope to {}", self.base);

        let response = self
            .http
            .post(url)
            .form(&[("tx", envelope_base64)])
            .send()
            .await
            .map_err(|e| self.map_transport(e))?;

        let status = response.status();
        if status.is_success() {
            let accepted: SubmitResponse =
                response.json().await.map_err(|e| self.map_transport(e))?;
            if accepted.successful == Some(false) {
                return Err(Error::SubmitRejected {
                    code: "tx_failed".to_string(),
                    detail: "acknowledged with embedded failure status".to_string(),
                });
            }
            if accepted.hash.is_empty() {
                return Err(Error::Horizon(
                    "submission acknowledged without a transaction hash".to_string(),
                ));
            }
            return Ok(accepted.hash);
        }

        if status == StatusCode::GATEWAY_TIMEOUT {
            return Err(Error::HorizonTimeout(self.timeout_ms));
        }

        let body = response.text().await.unwrap_or_default();
        match serde_json::from_str::<ProblemResponse>(&body) {
            Ok(problem) => {
                let detail = if problem.detail.is_empty() {
                    problem.title.clone()
                } else {
                    problem.detail.clone()
                };
                let codes = problem.extras.as_ref().and_then(|e| e.result_codes.as_ref());
                Err(result_codes::classify(codes, &detail))
            }
            Err(_) => Err(Error::Horizon(format!("HTTP {}: {}", status, body))),
        }
    }
}

#[async_trait]
impl Ledger for HorizonClient {
    async fn load_account(&self, account_id: &str) -> Result<AccountState> {
        let record: AccountRecord = self
            .get_with_retry(&format!("accounts/{}", account_id))
            .await
            .map_err(|e| match e {
                Error::AccountNotFound(_) => Error::AccountNotFound(account_id.to_string()),
                other => other,
            })?;
        record.into_state(account_id)
    }

    async fn base_fee(&self) -> Result<u32> {
        let stats: FeeStats = self.get_with_retry("fee_stats").await?;
        stats
            .last_ledger_base_fee
            .parse()
            .map_err(|_| Error::Horizon(format!("bad base fee: {:?}", stats.last_ledger_base_fee)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rejects_invalid_endpoint() {
        assert!(HorizonClient::new("not a url", 5000).is_err());
    }

    #[test]
    fn test_url_join() {
        let client = HorizonClient::new("https://horizon.example.com/", 5000).unwrap();
        assert_eq!(
            client.url("fee_stats").unwrap().as_str(),
            "https://horizon.example.com/fee_stats"
        );
    }
}
