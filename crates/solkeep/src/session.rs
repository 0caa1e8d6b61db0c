//! In-process session cache keyed by user id.
//!
//! The cache is a hot layer over the wallet store: a hit skips the KDF and
//! decryption entirely. Entries are process-lifetime only and unbounded;
//! a restart empties the cache and sessions are rebuilt from the store on
//! demand.

use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock};

use crate::keys::WalletInfo;

/// Pluggable session storage. Implementations must tolerate concurrent
/// access; a `put` racing a `put` for the same user resolves to whichever
/// write lands last.
pub trait WalletCache: Send + Sync {
    fn put(&self, user_id: i64, wallet: Arc<WalletInfo>);
    fn get(&self, user_id: i64) -> Option<Arc<WalletInfo>>;
}

#[derive(Default)]
pub struct InMemoryCache {
    entries: RwLock<HashMap<i64, Arc<WalletInfo>>>,
}

impl InMemoryCache {
    pub fn new() -> Self {
        Self::default()
    }
}

impl std::fmt::Debug for InMemoryCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let len = self
            .entries
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len();
        f.debug_struct("InMemoryCache").field("len", &len).finish()
    }
}

impl WalletCache for InMemoryCache {
    fn put(&self, user_id: i64, wallet: Arc<WalletInfo>) {
        self.entries
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(user_id, wallet);
    }

    fn get(&self, user_id: i64) -> Option<Arc<WalletInfo>> {
        self.entries
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&user_id)
            .map(Arc::clone)
    }
}
