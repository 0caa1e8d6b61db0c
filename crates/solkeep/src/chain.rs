//! Solana chain access: address validation, balance reads, Jupiter quotes.
//!
//! Every call here is a single attempt against the configured endpoint.
//! Transient RPC failures surface to the caller, who owns any retry policy.

use eyre::Context as _;
use reqwest::Client;
use serde_json::Value;
use solana_client::nonblocking::rpc_client::RpcClient;
use solana_commitment_config::CommitmentConfig;
use solana_sdk::{program_pack::Pack as _, pubkey::Pubkey};
use spl_associated_token_account::get_associated_token_address;
use spl_token::state::{Account as SplAccount, Mint};
use std::{str::FromStr as _, time::Duration};

use crate::errors::BalanceError;

const RPC_TIMEOUT: Duration = Duration::from_secs(20);

/// Checks that `address` is a well-formed base58 Solana pubkey. Pure parse;
/// no network involved.
pub fn is_valid_address(address: &str) -> bool {
    Pubkey::from_str(address.trim()).is_ok()
}

fn allow_insecure_http() -> bool {
    std::env::var("SOLKEEP_ALLOW_INSECURE_HTTP")
        .ok()
        .is_some_and(|v| {
            matches!(
                v.as_str(),
                "1" | "true" | "TRUE" | "yes" | "YES" | "on" | "ON"
            )
        })
}

fn is_loopback_http(url: &str) -> bool {
    fn host_prefix_ok(s: &str, prefix: &str) -> bool {
        if !s.starts_with(prefix) {
            return false;
        }
        matches!(s.as_bytes().get(prefix.len()), None | Some(b':' | b'/'))
    }
    let u = url.trim();
    host_prefix_ok(u, "http://127.0.0.1")
        || host_prefix_ok(u, "http://localhost")
        || host_prefix_ok(u, "http://[::1]")
}

#[derive(Debug, Clone)]
pub struct SolanaRpc {
    pub rpc_url: String,
    pub jupiter_base_url: String,
    pub jupiter_api_key: Option<String>,
}

impl SolanaRpc {
    pub fn new(rpc_url: &str, jupiter_base_url: &str, jupiter_api_key: Option<&str>) -> Self {
        Self {
            rpc_url: rpc_url.trim().to_owned(),
            jupiter_base_url: jupiter_base_url.trim().to_owned(),
            jupiter_api_key: jupiter_api_key.map(str::to_owned),
        }
    }

    fn rpc(&self) -> RpcClient {
        RpcClient::new_with_timeout_and_commitment(
            self.rpc_url.clone(),
            RPC_TIMEOUT,
            CommitmentConfig::confirmed(),
        )
    }

    fn parse_address(address: &str) -> Result<Pubkey, BalanceError> {
        Pubkey::from_str(address.trim())
            .map_err(|_| BalanceError::InvalidAddress(address.to_owned()))
    }

    /// SOL balance in lamports at confirmed commitment. A fresh address that
    /// has never received funds reports zero.
    pub async fn get_balance(&self, address: &str) -> Result<u64, BalanceError> {
        let owner = Self::parse_address(address)?;
        self.rpc()
            .get_balance(&owner)
            .await
            .map_err(|e| BalanceError::Rpc(Box::new(e)))
    }

    /// SPL token balance via the owner's associated token account, returned
    /// as (raw amount, mint decimals).
    pub async fn get_spl_balance(&self, owner: &str, mint: &str) -> Result<(u64, u8), BalanceError> {
        let owner = Self::parse_address(owner)?;
        let mint = Self::parse_address(mint)?;
        let rpc = self.rpc();

        let ata = get_associated_token_address(&owner, &mint);
        let acc = rpc
            .get_account(&ata)
            .await
            .map_err(|e| BalanceError::Rpc(Box::new(e)))?;
        let token = SplAccount::unpack(&acc.data).map_err(|e| BalanceError::Rpc(Box::new(e)))?;
        let mint_acc = rpc
            .get_account(&mint)
            .await
            .map_err(|e| BalanceError::Rpc(Box::new(e)))?;
        let m = Mint::unpack(&mint_acc.data).map_err(|e| BalanceError::Rpc(Box::new(e)))?;
        Ok((token.amount, m.decimals))
    }

    /// Fetches a Jupiter ExactIn swap quote.
    pub async fn jupiter_quote(
        &self,
        input_mint: &str,
        output_mint: &str,
        amount: u64,
        slippage_bps: u32,
    ) -> eyre::Result<Value> {
        let base = self.jupiter_base_url.trim();
        if !base.starts_with("https://") && !is_loopback_http(base) && !allow_insecure_http() {
            eyre::bail!(
                "jupiter_base_url must use https (or loopback); set SOLKEEP_ALLOW_INSECURE_HTTP=1 to override"
            );
        }
        let url = format!(
            "{}/quote?inputMint={}&outputMint={}&amount={}&slippageBps={}&swapMode=ExactIn",
            self.jupiter_base_url, input_mint, output_mint, amount, slippage_bps
        );
        let client = Client::builder()
            .timeout(RPC_TIMEOUT)
            .build()
            .context("build http client")?;
        let mut req = client.get(url);
        if let Some(k) = self
            .jupiter_api_key
            .as_ref()
            .map(|s| s.trim())
            .filter(|s| !s.is_empty())
        {
            req = req.header("x-api-key", k);
        }
        let v: Value = req
            .send()
            .await
            .context("jupiter quote request")?
            .error_for_status()
            .context("jupiter quote status")?
            .json()
            .await
            .context("jupiter quote json")?;
        Ok(v)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::keys;

    #[test]
    fn valid_addresses_pass() -> eyre::Result<()> {
        let wallet = keys::generate()?;
        assert!(is_valid_address(&wallet.address()));
        // Whitespace is tolerated.
        assert!(is_valid_address(&format!("  {}  ", wallet.address())));
        Ok(())
    }

    #[test]
    fn invalid_addresses_fail() {
        for bad in ["", "123", "invalid", "0x1111111111111111111111111111111111111111"] {
            assert!(!is_valid_address(bad), "accepted {bad:?}");
        }
    }

    #[tokio::test]
    async fn balance_rejects_invalid_address_without_network() {
        let rpc = SolanaRpc::new("http://127.0.0.1:1", crate::config::JUPITER_SWAP_BASE_URL, None);
        let err = rpc.get_balance("not-an-address").await;
        assert!(matches!(err, Err(BalanceError::InvalidAddress(_))));
    }

    #[test]
    fn loopback_detection() {
        assert!(is_loopback_http("http://127.0.0.1:8080"));
        assert!(is_loopback_http("http://localhost/quote"));
        assert!(is_loopback_http("http://[::1]:9000"));
        assert!(!is_loopback_http("http://127.0.0.1.evil.com"));
        assert!(!is_loopback_http("http://example.com"));
        assert!(!is_loopback_http("https://api.jup.ag/swap/v1"));
    }
}
