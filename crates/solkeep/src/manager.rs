//! The wallet manager ties the layers together: derive or import key
//! material, envelope-encrypt it, persist the record, and keep a hot
//! session per user.

use base64::Engine as _;
use secrecy::SecretString;
use std::sync::Arc;

use crate::chain::SolanaRpc;
use crate::config::Config;
use crate::envelope;
use crate::errors::{CipherError, ManagerError};
use crate::keys::{self, WalletInfo};
use crate::session::WalletCache;
use crate::store::{NewWalletRecord, WalletDb, WalletRecord};

pub struct WalletManager {
    password: SecretString,
    db: WalletDb,
    cache: Arc<dyn WalletCache>,
    rpc: SolanaRpc,
}

impl std::fmt::Debug for WalletManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WalletManager")
            .field("rpc", &self.rpc)
            .finish_non_exhaustive()
    }
}

impl WalletManager {
    pub fn new(config: Config, db: WalletDb, cache: Arc<dyn WalletCache>) -> Self {
        let rpc = SolanaRpc::new(
            &config.solana_rpc_url,
            &config.jupiter_base_url,
            config.jupiter_api_key.as_deref(),
        );
        Self {
            password: config.password,
            db,
            cache,
            rpc,
        }
    }

    pub fn rpc(&self) -> &SolanaRpc {
        &self.rpc
    }

    /// Encrypts, persists and caches a wallet for `user_id`. All creation
    /// and import paths funnel through here so the record shape and cache
    /// state stay consistent.
    async fn persist_and_cache(
        &self,
        user_id: i64,
        wallet: WalletInfo,
    ) -> Result<WalletRecord, ManagerError> {
        let b64 = base64::engine::general_purpose::STANDARD;

        let key_envelope = envelope::encrypt(&wallet.export_base58(), &self.password)?;
        let encrypted_mnemonic = match wallet.mnemonic() {
            Some(phrase) => Some(b64.encode(envelope::encrypt(phrase, &self.password)?)),
            None => None,
        };

        let record = self
            .db
            .create_and_save(NewWalletRecord {
                user_id,
                address: wallet.address(),
                encrypted_private_key: b64.encode(key_envelope),
                encrypted_mnemonic,
            })
            .await?;

        tracing::debug!(user_id, address = %record.address, "wallet stored");
        self.cache.put(user_id, Arc::new(wallet));
        Ok(record)
    }

    /// Generates a brand-new wallet for `user_id`.
    pub async fn create_wallet(&self, user_id: i64) -> Result<WalletRecord, ManagerError> {
        let wallet = keys::generate()?;
        self.persist_and_cache(user_id, wallet).await
    }

    /// Imports a wallet from a 12-word mnemonic phrase.
    pub async fn import_from_mnemonic(
        &self,
        user_id: i64,
        phrase: &str,
    ) -> Result<WalletRecord, ManagerError> {
        let wallet = keys::from_mnemonic(phrase)?;
        self.persist_and_cache(user_id, wallet).await
    }

    /// Imports a wallet from a raw private key (byte array, hex or base58).
    pub async fn import_from_private_key(
        &self,
        user_id: i64,
        raw: &str,
    ) -> Result<WalletRecord, ManagerError> {
        let wallet = keys::from_private_key(raw)?;
        self.persist_and_cache(user_id, wallet).await
    }

    /// Returns the cached session for `user_id` without touching the store.
    pub fn session(&self, user_id: i64) -> Option<Arc<WalletInfo>> {
        self.cache.get(user_id)
    }

    /// Returns the live wallet for `user_id`, decrypting from the store on
    /// a cache miss. `NoWallet` means the user has never created one.
    pub async fn restore_session(&self, user_id: i64) -> Result<Arc<WalletInfo>, ManagerError> {
        if let Some(wallet) = self.cache.get(user_id) {
            return Ok(wallet);
        }

        let Some(record) = self.db.find_by_user_id(user_id).await? else {
            return Err(ManagerError::NoWallet(user_id));
        };

        let b64 = base64::engine::general_purpose::STANDARD;
        let key_envelope = b64
            .decode(&record.encrypted_private_key)
            .map_err(|_| CipherError::Decrypt)?;
        let secret = envelope::decrypt(&key_envelope, &self.password)?;
        let mut wallet = keys::from_private_key(&secret)?;

        if let Some(mnemonic_b64) = &record.encrypted_mnemonic {
            let mnemonic_envelope = b64.decode(mnemonic_b64).map_err(|_| CipherError::Decrypt)?;
            let phrase = envelope::decrypt(&mnemonic_envelope, &self.password)?;
            wallet = wallet.with_mnemonic(phrase);
        }

        tracing::debug!(user_id, address = %wallet.address(), "session restored");
        let wallet = Arc::new(wallet);
        self.cache.put(user_id, Arc::clone(&wallet));
        Ok(wallet)
    }

    /// SOL balance in lamports for an arbitrary address.
    pub async fn sol_balance(&self, address: &str) -> Result<u64, ManagerError> {
        Ok(self.rpc.get_balance(address).await?)
    }
}
