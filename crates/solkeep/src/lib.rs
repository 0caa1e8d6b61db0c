//! Custodial Solana wallet management for bot backends.
//!
//! Each end user (keyed by an integer id, e.g. a chat platform user id)
//! gets at most one wallet. Key material is derived from a 12-word BIP39
//! phrase or imported raw, envelope-encrypted under a process-wide
//! password, and stored in a local embedded database. Live sessions are
//! cached in memory so the KDF only runs on restore.
//!
//! [`WalletManager`] is the front door; the submodules are public for
//! callers that need finer control.

#![expect(
    clippy::multiple_crate_versions,
    reason = "transitive dependency duplication"
)]

pub mod amount;
pub mod chain;
pub mod config;
pub mod envelope;
pub mod errors;
pub mod fsutil;
pub mod keys;
pub mod logging;
pub mod manager;
pub mod paths;
pub mod session;
pub mod store;

pub use chain::SolanaRpc;
pub use config::Config;
pub use errors::{BalanceError, CipherError, KeyError, ManagerError, StoreError};
pub use keys::{KeyFormat, WalletInfo};
pub use manager::WalletManager;
pub use paths::SolkeepPaths;
pub use session::{InMemoryCache, WalletCache};
pub use store::{NewWalletRecord, WalletDb, WalletRecord};
