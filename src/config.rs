//! Configuration loading and validation

use std::path::Path;
use std::time::Duration;

use anyhow::{Context, Result};
use serde::Deserialize;

use crate::sweep::SweepMode;
use crate::tx::{amount, Destination};

/// Main configuration structure
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub horizon: HorizonConfig,
    #[serde(default)]
    pub sweep: SweepConfig,
    #[serde(default)]
    pub submit: SubmitConfig,
    #[serde(default)]
    pub telegram: TelegramConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct HorizonConfig {
    #[serde(default = "default_horizon_endpoint")]
    pub endpoint: String,
    #[serde(default = "default_network_passphrase")]
    pub network_passphrase: String,
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SweepConfig {
    /// Destination account, plain or multiplexed id
    #[serde(default)]
    pub destination: String,
    #[serde(default)]
    pub mode: Mode,
    /// Balance left behind in drain mode, as a decimal coin amount
    #[serde(default = "default_reserve")]
    pub reserve: String,
    #[serde(default = "default_delay_ms")]
    pub delay_between_wallets_ms: u64,
    #[serde(default = "default_wallets_file")]
    pub wallets_file: String,
    /// Envelope expiry window in seconds
    #[serde(default = "default_tx_expiry_secs")]
    pub tx_expiry_secs: u64,
    #[serde(default = "default_explorer_base")]
    pub explorer_base: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Mode {
    /// Bounded payment leaving the reserve behind
    #[default]
    Drain,
    /// Account merge, closes the source account
    Merge,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SubmitConfig {
    #[serde(default = "default_per_channel_timeout_ms")]
    pub per_channel_timeout_ms: u64,
    /// Extra submission paths: proxy URLs applied to the same endpoint
    #[serde(default)]
    pub proxies: Vec<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct TelegramConfig {
    #[serde(default)]
    pub bot_token: String,
    #[serde(default)]
    pub chat_id: String,
}

impl Config {
    /// Load configuration from file and environment variables
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();

        let settings = config::Config::builder()
            // Load from file if exists
            .add_source(config::File::from(path).required(false))
            // Override with environment variables (prefix SWEEPER_)
            .add_source(
                config::Environment::with_prefix("SWEEPER")
                    .separator("__")
                    .try_parsing(true)
                    .list_separator(",")
                    .with_list_parse_key("submit.proxies"),
            )
            .build()
            .context("Failed to build configuration")?;

        let config: Config = settings
            .try_deserialize()
            .context("Failed to deserialize configuration")?;

        config.validate()?;

        Ok(config)
    }

    /// Validate configuration values
    fn validate(&self) -> Result<()> {
        if self.sweep.destination.is_empty() {
            anyhow::bail!(
                "sweep.destination is not set (file key or SWEEPER__SWEEP__DESTINATION)"
            );
        }
        Destination::parse(&self.sweep.destination)
            .with_context(|| format!("Invalid destination: {}", self.sweep.destination))?;

        amount::parse_amount(&self.sweep.reserve)
            .with_context(|| format!("Invalid reserve amount: {}", self.sweep.reserve))?;

        url::Url::parse(&self.horizon.endpoint)
            .with_context(|| format!("Invalid Horizon endpoint: {}", self.horizon.endpoint))?;

        for proxy in &self.submit.proxies {
            url::Url::parse(proxy).with_context(|| format!("Invalid proxy URL: {}", proxy))?;
        }

        if self.sweep.tx_expiry_secs == 0 || self.sweep.tx_expiry_secs > 300 {
            anyhow::bail!(
                "sweep.tx_expiry_secs must be between 1 and 300, got {}",
                self.sweep.tx_expiry_secs
            );
        }

        // One credential without the other is a misconfiguration, not a
        // disabled notifier
        if self.telegram.bot_token.is_empty() != self.telegram.chat_id.is_empty() {
            anyhow::bail!("telegram needs both bot_token and chat_id, or neither");
        }

        Ok(())
    }

    /// The parsed destination (validated at load time)
    pub fn destination(&self) -> crate::error::Result<Destination> {
        Destination::parse(&self.sweep.destination)
    }

    /// The selected amount policy
    pub fn sweep_mode(&self) -> crate::error::Result<SweepMode> {
        Ok(match self.sweep.mode {
            Mode::Drain => SweepMode::DrainAbove {
                reserve: amount::parse_amount(&self.sweep.reserve)?,
            },
            Mode::Merge => SweepMode::MergeAll,
        })
    }

    pub fn inter_wallet_delay(&self) -> Duration {
        Duration::from_millis(self.sweep.delay_between_wallets_ms)
    }

    pub fn per_channel_deadline(&self) -> Duration {
        Duration::from_millis(self.submit.per_channel_timeout_ms)
    }

    pub fn telegram_enabled(&self) -> bool {
        !self.telegram.bot_token.is_empty() && !self.telegram.chat_id.is_empty()
    }

    /// Get masked configuration for display (hide secrets)
    pub fn masked_display(&self) -> String {
        format!(
            r#"Configuration:
  Horizon:
    endpoint: {}
    network: {}
    timeout: {}ms
  Sweep:
    destination: {}
    mode: {:?}
    reserve: {}
    delay: {}ms
    wallets_file: {}
    tx_expiry: {}s
  Submit:
    per_channel_timeout: {}ms
    proxies: {} configured
  Telegram:
    bot_token: {}
    chat_id: {}
"#,
            self.horizon.endpoint,
            self.horizon.network_passphrase,
            self.horizon.timeout_ms,
            self.sweep.destination,
            self.sweep.mode,
            self.sweep.reserve,
            self.sweep.delay_between_wallets_ms,
            self.sweep.wallets_file,
            self.sweep.tx_expiry_secs,
            self.submit.per_channel_timeout_ms,
            self.submit.proxies.len(),
            if self.telegram.bot_token.is_empty() {
                "(not set)"
            } else {
                "***"
            },
            if self.telegram.chat_id.is_empty() {
                "(not set)"
            } else {
                "***"
            },
        )
    }
}

fn default_horizon_endpoint() -> String {
    "https://api.mainnet.minepi.com".to_string()
}

fn default_network_passphrase() -> String {
    "Pi Network".to_string()
}

fn default_timeout_ms() -> u64 {
    10_000
}

fn default_reserve() -> String {
    "1.0".to_string()
}

fn default_delay_ms() -> u64 {
    1_000
}

fn default_wallets_file() -> String {
    "mnemonics.txt".to_string()
}

fn default_tx_expiry_secs() -> u64 {
    30
}

fn default_explorer_base() -> String {
    "https://blockexplorer.minepi.com/mainnet".to_string()
}

fn default_per_channel_timeout_ms() -> u64 {
    5_000
}

impl Default for HorizonConfig {
    fn default() -> Self {
        Self {
            endpoint: default_horizon_endpoint(),
            network_passphrase: default_network_passphrase(),
            timeout_ms: default_timeout_ms(),
        }
    }
}

impl Default for SweepConfig {
    fn default() -> Self {
        Self {
            destination: String::new(),
            mode: Mode::Drain,
            reserve: default_reserve(),
            delay_between_wallets_ms: default_delay_ms(),
            wallets_file: default_wallets_file(),
            tx_expiry_secs: default_tx_expiry_secs(),
            explorer_base: default_explorer_base(),
        }
    }
}

impl Default for SubmitConfig {
    fn default() -> Self {
        Self {
            per_channel_timeout_ms: default_per_channel_timeout_ms(),
            proxies: Vec::new(),
        }
    }
}
