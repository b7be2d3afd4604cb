use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;

use crate::view::ActiveTab;

/// Public RPC endpoints selectable with `--chain`.
const CHAIN_PRESETS: &[(&[&str], &str)] = &[
    (&["ethereum", "eth", "mainnet"], "https://eth.merkle.io"),
    (&["sepolia"], "https://rpc.sepolia.org"),
    (&["arbitrum", "arb"], "https://arb1.arbitrum.io/rpc"),
    (&["optimism", "op"], "https://mainnet.optimism.io"),
    (&["base"], "https://mainnet.base.org"),
    (&["polygon", "matic"], "https://polygon-rpc.com"),
    (&["local", "anvil"], "http://127.0.0.1:8545"),
];

#[derive(Parser, Debug, Clone)]
#[command(
    name = "curve-view",
    about = "Terminal timeline and bonding-curve viewer for a deployed contract"
)]
pub struct Config {
    /// Contract address to connect to
    #[arg(short, long, env = "CONTRACT_ADDRESS")]
    pub address: String,

    /// Path to the compiled contract artifact (Truffle/Hardhat JSON or a bare ABI array)
    #[arg(long)]
    pub artifact: PathBuf,

    /// RPC endpoint URL; overrides --chain
    #[arg(short, long, env = "ETH_RPC_URL")]
    pub rpc_url: Option<String>,

    /// Chain preset (ethereum, sepolia, arbitrum, optimism, base, polygon, local)
    #[arg(long, default_value = "ethereum")]
    pub chain: String,

    /// Tab shown first
    #[arg(long, value_enum, default_value_t = ActiveTab::Timeline)]
    pub default_tab: ActiveTab,

    /// Rows the panel may occupy (clamped to the terminal)
    #[arg(long, default_value = "200")]
    pub height: u16,

    /// Report failures on the status bar instead of the error panel
    #[arg(long)]
    pub delegate_errors: bool,

    /// Timeout for the provider liveness probe, in milliseconds
    #[arg(long, default_value = "5000")]
    pub probe_timeout_ms: u64,

    /// Tick rate in milliseconds for UI refresh
    #[arg(long, default_value = "100", value_parser = clap::value_parser!(u64).range(1..))]
    pub tick_rate_ms: u64,

    /// Number of blocks the timeline looks back from the chain head
    #[arg(long, default_value = "5000")]
    pub timeline_lookback: u64,

    /// View function sampled for the bonding curve (auto-detected when omitted)
    #[arg(long)]
    pub curve_function: Option<String>,

    /// Upper bound of the supply range sampled for the bonding curve
    #[arg(long, default_value = "1000000")]
    pub curve_max_supply: u64,

    /// Number of points sampled along the bonding curve
    #[arg(long, default_value = "40")]
    pub curve_samples: usize,

    /// Log file path (defaults to the local data directory)
    #[arg(long)]
    pub log_file: Option<PathBuf>,
}

impl Config {
    /// Resolve the RPC URL: an explicit `--rpc-url` wins, then the chain preset.
    pub fn resolve_rpc_url(&self) -> Option<String> {
        if let Some(url) = &self.rpc_url {
            return Some(url.clone());
        }
        let chain = self.chain.to_lowercase();
        CHAIN_PRESETS
            .iter()
            .find(|(names, _)| names.contains(&chain.as_str()))
            .map(|(_, url)| (*url).to_string())
    }

    pub fn probe_timeout(&self) -> Duration {
        Duration::from_millis(self.probe_timeout_ms)
    }

    pub fn log_path(&self) -> PathBuf {
        if let Some(path) = &self.log_file {
            return path.clone();
        }
        dirs::data_local_dir()
            .map(|dir| dir.join("curve-view"))
            .unwrap_or_else(std::env::temp_dir)
            .join("curve-view.log")
    }
}
