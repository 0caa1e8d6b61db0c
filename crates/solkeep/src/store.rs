//! Durable wallet records in a local embedded database (Turso, pure Rust).
//!
//! Records are insert-only: one wallet per user, and neither addresses nor
//! ciphertexts may repeat across users. Uniqueness is enforced by the
//! database itself, so concurrent inserts race safely and the loser gets a
//! [`StoreError::DuplicateField`].

use chrono::Utc;
use eyre::Context as _;
use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::errors::StoreError;

pub struct WalletDb {
    // Keep the database handle alive for the lifetime of the connection.
    _db: turso::Database,
    conn: turso::Connection,
}

// `turso::Database` / `turso::Connection` may not implement `Debug`. We only
// need a debuggable handle, not internals.
impl std::fmt::Debug for WalletDb {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WalletDb").finish_non_exhaustive()
    }
}

/// A stored wallet row. Key material is envelope-encrypted and base64-coded
/// before it gets here; this layer never sees plaintext secrets.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WalletRecord {
    pub user_id: i64,
    pub address: String,
    pub encrypted_private_key: String,
    pub encrypted_mnemonic: Option<String>,
    pub created_at: String,
}

/// Input for an insert; `created_at` is stamped by the store.
#[derive(Debug, Clone)]
pub struct NewWalletRecord {
    pub user_id: i64,
    pub address: String,
    pub encrypted_private_key: String,
    pub encrypted_mnemonic: Option<String>,
}

fn validate(record: &NewWalletRecord) -> Result<(), StoreError> {
    if record.user_id <= 0 {
        return Err(StoreError::MissingField { field: "user_id" });
    }
    if record.address.trim().is_empty() {
        return Err(StoreError::MissingField { field: "address" });
    }
    if record.encrypted_private_key.trim().is_empty() {
        return Err(StoreError::MissingField {
            field: "encrypted_private_key",
        });
    }
    Ok(())
}

/// Maps a failed insert onto the uniqueness taxonomy. The embedded engine
/// reports violations as "UNIQUE constraint failed: wallets.<column>".
fn map_insert_err<E>(e: E) -> StoreError
where
    E: std::error::Error + Send + Sync + 'static,
{
    let msg = e.to_string();
    if msg.contains("UNIQUE constraint failed") {
        for field in ["user_id", "address", "encrypted_private_key"] {
            if msg.contains(&format!("wallets.{field}")) {
                return StoreError::DuplicateField { field };
            }
        }
    }
    StoreError::Db(Box::new(e))
}

impl WalletDb {
    /// Opens (or creates) the wallet database under `data_dir`.
    pub async fn open(data_dir: &Path) -> eyre::Result<Self> {
        crate::fsutil::ensure_private_dir(data_dir)?;

        let p = data_dir.join("solkeep.db");
        let p_s = p.to_string_lossy();

        let db = turso::Builder::new_local(p_s.as_ref())
            .build()
            .await
            .context("open turso local db")?;
        let conn = db.connect().context("connect turso db")?;

        let this = Self { _db: db, conn };
        this.init().await?;
        Ok(this)
    }

    async fn init(&self) -> eyre::Result<()> {
        self.conn
            .execute(
                "CREATE TABLE IF NOT EXISTS wallets (\
                  id INTEGER PRIMARY KEY AUTOINCREMENT,\
                  user_id INTEGER NOT NULL UNIQUE,\
                  address TEXT NOT NULL UNIQUE,\
                  encrypted_private_key TEXT NOT NULL UNIQUE,\
                  encrypted_mnemonic TEXT,\
                  created_at TEXT NOT NULL\
                )",
                (),
            )
            .await
            .context("create wallets")?;
        Ok(())
    }

    /// Validates and inserts a new wallet row, returning the stored record.
    pub async fn create_and_save(
        &self,
        record: NewWalletRecord,
    ) -> Result<WalletRecord, StoreError> {
        validate(&record)?;
        let created_at = Utc::now().to_rfc3339();

        // Two statements rather than binding an Option parameter.
        let result = match &record.encrypted_mnemonic {
            Some(mnemonic) => {
                self.conn
                    .execute(
                        "INSERT INTO wallets \
                         (user_id, address, encrypted_private_key, encrypted_mnemonic, created_at) \
                         VALUES (?, ?, ?, ?, ?)",
                        (
                            record.user_id,
                            record.address.as_str(),
                            record.encrypted_private_key.as_str(),
                            mnemonic.as_str(),
                            created_at.as_str(),
                        ),
                    )
                    .await
            }
            None => {
                self.conn
                    .execute(
                        "INSERT INTO wallets \
                         (user_id, address, encrypted_private_key, created_at) \
                         VALUES (?, ?, ?, ?)",
                        (
                            record.user_id,
                            record.address.as_str(),
                            record.encrypted_private_key.as_str(),
                            created_at.as_str(),
                        ),
                    )
                    .await
            }
        };
        result.map_err(map_insert_err)?;

        Ok(WalletRecord {
            user_id: record.user_id,
            address: record.address,
            encrypted_private_key: record.encrypted_private_key,
            encrypted_mnemonic: record.encrypted_mnemonic,
            created_at,
        })
    }

    /// Looks up the wallet for `user_id`, if any.
    pub async fn find_by_user_id(&self, user_id: i64) -> Result<Option<WalletRecord>, StoreError> {
        let mut rows = self
            .conn
            .query(
                "SELECT user_id, address, encrypted_private_key, \
                        COALESCE(encrypted_mnemonic, ''), created_at \
                 FROM wallets WHERE user_id = ?",
                (user_id,),
            )
            .await
            .map_err(|e| StoreError::Db(Box::new(e)))?;

        let Some(row) = rows.next().await.map_err(|e| StoreError::Db(Box::new(e)))? else {
            return Ok(None);
        };

        let mnemonic: String = row.get(3).map_err(|e| StoreError::Db(Box::new(e)))?;
        Ok(Some(WalletRecord {
            user_id: row.get(0).map_err(|e| StoreError::Db(Box::new(e)))?,
            address: row.get(1).map_err(|e| StoreError::Db(Box::new(e)))?,
            encrypted_private_key: row.get(2).map_err(|e| StoreError::Db(Box::new(e)))?,
            encrypted_mnemonic: (!mnemonic.is_empty()).then_some(mnemonic),
            created_at: row.get(4).map_err(|e| StoreError::Db(Box::new(e)))?,
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use eyre::ContextCompat as _;

    fn record(user_id: i64, suffix: &str) -> NewWalletRecord {
        NewWalletRecord {
            user_id,
            address: format!("addr-{suffix}"),
            encrypted_private_key: format!("ciphertext-{suffix}"),
            encrypted_mnemonic: None,
        }
    }

    #[tokio::test]
    async fn save_and_find_round_trips() -> eyre::Result<()> {
        let td = tempfile::tempdir().context("create tempdir")?;
        let db = WalletDb::open(td.path()).await.context("open db")?;

        let saved = db
            .create_and_save(NewWalletRecord {
                encrypted_mnemonic: Some("ciphertext-phrase".into()),
                ..record(7, "a")
            })
            .await?;
        assert!(!saved.created_at.is_empty());

        let found = db
            .find_by_user_id(7)
            .await?
            .context("expected stored wallet")?;
        assert_eq!(found, saved);
        Ok(())
    }

    #[tokio::test]
    async fn missing_mnemonic_reads_back_as_none() -> eyre::Result<()> {
        let td = tempfile::tempdir().context("create tempdir")?;
        let db = WalletDb::open(td.path()).await.context("open db")?;

        db.create_and_save(record(1, "a")).await?;
        let found = db
            .find_by_user_id(1)
            .await?
            .context("expected stored wallet")?;
        assert!(found.encrypted_mnemonic.is_none());
        Ok(())
    }

    #[tokio::test]
    async fn unknown_user_is_none() -> eyre::Result<()> {
        let td = tempfile::tempdir().context("create tempdir")?;
        let db = WalletDb::open(td.path()).await.context("open db")?;
        assert!(db.find_by_user_id(999).await?.is_none());
        Ok(())
    }

    #[tokio::test]
    async fn each_unique_column_is_named_on_conflict() -> eyre::Result<()> {
        let td = tempfile::tempdir().context("create tempdir")?;
        let db = WalletDb::open(td.path()).await.context("open db")?;

        db.create_and_save(record(1, "a")).await?;

        let dup_user = db.create_and_save(record(1, "b")).await;
        assert!(matches!(
            dup_user,
            Err(StoreError::DuplicateField { field: "user_id" })
        ));

        let dup_address = db
            .create_and_save(NewWalletRecord {
                address: "addr-a".into(),
                ..record(2, "c")
            })
            .await;
        assert!(matches!(
            dup_address,
            Err(StoreError::DuplicateField { field: "address" })
        ));

        let dup_cipher = db
            .create_and_save(NewWalletRecord {
                encrypted_private_key: "ciphertext-a".into(),
                ..record(3, "d")
            })
            .await;
        assert!(matches!(
            dup_cipher,
            Err(StoreError::DuplicateField {
                field: "encrypted_private_key"
            })
        ));
        Ok(())
    }

    #[tokio::test]
    async fn incomplete_records_are_rejected() -> eyre::Result<()> {
        let td = tempfile::tempdir().context("create tempdir")?;
        let db = WalletDb::open(td.path()).await.context("open db")?;

        let no_user = db.create_and_save(record(0, "a")).await;
        assert!(matches!(
            no_user,
            Err(StoreError::MissingField { field: "user_id" })
        ));

        let no_address = db
            .create_and_save(NewWalletRecord {
                address: "  ".into(),
                ..record(1, "b")
            })
            .await;
        assert!(matches!(
            no_address,
            Err(StoreError::MissingField { field: "address" })
        ));

        let no_cipher = db
            .create_and_save(NewWalletRecord {
                encrypted_private_key: String::new(),
                ..record(1, "c")
            })
            .await;
        assert!(matches!(
            no_cipher,
            Err(StoreError::MissingField {
                field: "encrypted_private_key"
            })
        ));

        // Nothing was persisted by the failed attempts.
        assert!(db.find_by_user_id(1).await?.is_none());
        Ok(())
    }
}
