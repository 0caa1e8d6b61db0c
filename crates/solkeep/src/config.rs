//! Process configuration, sourced from the environment.
//!
//! The manager runs headless inside a bot process, so there is no config
//! file: everything arrives via `SOLKEEP_*` variables. The encryption
//! password is the only required setting and its absence is fatal at
//! startup.

use secrecy::SecretString;
use std::path::PathBuf;

pub const SOLANA_MAINNET_RPC_URL: &str = "https://api.mainnet-beta.solana.com";

/// Jupiter consolidated quote+swap under /swap/v1. This base URL should end in /swap/v1.
pub const JUPITER_SWAP_BASE_URL: &str = "https://api.jup.ag/swap/v1";

pub struct Config {
    /// Master password for wallet envelope encryption. Never logged.
    pub password: SecretString,
    /// Solana RPC endpoint URL.
    pub solana_rpc_url: String,
    /// Jupiter Swap API base URL. Used for quotes.
    pub jupiter_base_url: String,
    /// Optional Jupiter API key (x-api-key). Keyless usage works where
    /// Jupiter permits it, typically with reduced rate limits.
    pub jupiter_api_key: Option<String>,
    /// Override for the data directory; platform default when unset.
    pub data_dir: Option<PathBuf>,
}

impl std::fmt::Debug for Config {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Config")
            .field("solana_rpc_url", &self.solana_rpc_url)
            .field("jupiter_base_url", &self.jupiter_base_url)
            .field("jupiter_api_key", &self.jupiter_api_key.as_ref().map(|_| "***"))
            .field("data_dir", &self.data_dir)
            .finish_non_exhaustive()
    }
}

fn env_nonempty(key: &str) -> Option<String> {
    std::env::var(key)
        .ok()
        .map(|v| v.trim().to_owned())
        .filter(|v| !v.is_empty())
}

impl Config {
    /// Reads configuration from the environment.
    ///
    /// `SOLKEEP_PASSWORD` is required; `SOLKEEP_RPC_URL`,
    /// `SOLKEEP_JUPITER_BASE_URL`, `SOLKEEP_JUPITER_API_KEY` and
    /// `SOLKEEP_DATA_DIR` are optional.
    pub fn from_env() -> eyre::Result<Self> {
        let password = env_nonempty("SOLKEEP_PASSWORD")
            .ok_or_else(|| eyre::eyre!("SOLKEEP_PASSWORD is not set"))?;
        Ok(Self {
            password: SecretString::new(password.into()),
            solana_rpc_url: env_nonempty("SOLKEEP_RPC_URL")
                .unwrap_or_else(|| SOLANA_MAINNET_RPC_URL.to_owned()),
            jupiter_base_url: env_nonempty("SOLKEEP_JUPITER_BASE_URL")
                .unwrap_or_else(|| JUPITER_SWAP_BASE_URL.to_owned()),
            jupiter_api_key: env_nonempty("SOLKEEP_JUPITER_API_KEY"),
            data_dir: env_nonempty("SOLKEEP_DATA_DIR").map(PathBuf::from),
        })
    }
}
