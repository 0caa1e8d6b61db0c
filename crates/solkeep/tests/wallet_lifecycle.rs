//! End-to-end lifecycle: create or import a wallet, restart the process
//! (modeled as a fresh manager over the same database), restore the session
//! and prove the same key material comes back.

use std::sync::Arc;

use eyre::Context as _;
use secrecy::SecretString;
use solkeep::{
    Config, InMemoryCache, ManagerError, StoreError, WalletDb, WalletManager,
};

fn test_config() -> Config {
    Config {
        password: SecretString::new("integration-test-password".into()),
        solana_rpc_url: "http://127.0.0.1:1".into(),
        jupiter_base_url: solkeep::config::JUPITER_SWAP_BASE_URL.into(),
        jupiter_api_key: None,
        data_dir: None,
    }
}

async fn manager_over(dir: &std::path::Path) -> eyre::Result<WalletManager> {
    let db = WalletDb::open(dir).await.context("open db")?;
    Ok(WalletManager::new(
        test_config(),
        db,
        Arc::new(InMemoryCache::new()),
    ))
}

#[tokio::test]
async fn create_then_restore_across_restart() -> eyre::Result<()> {
    let td = tempfile::tempdir().context("create tempdir")?;

    let manager = manager_over(td.path()).await?;
    let record = manager.create_wallet(42).await?;
    assert_eq!(record.user_id, 42);
    assert!(record.encrypted_mnemonic.is_some());

    // Creation warms the session cache.
    let session = manager
        .session(42)
        .ok_or_else(|| eyre::eyre!("expected live session"))?;
    assert_eq!(session.address(), record.address);
    let phrase = session
        .mnemonic()
        .ok_or_else(|| eyre::eyre!("generated wallet should carry its phrase"))?
        .to_owned();

    // "Restart": same database, empty cache.
    let restarted = manager_over(td.path()).await?;
    assert!(restarted.session(42).is_none());
    let restored = restarted.restore_session(42).await?;
    assert_eq!(restored.address(), record.address);
    assert_eq!(restored.mnemonic(), Some(phrase.as_str()));
    assert_eq!(restored.export_base58(), session.export_base58());

    // Second restore is a cache hit and agrees with the first.
    let again = restarted.restore_session(42).await?;
    assert_eq!(again.address(), restored.address());
    Ok(())
}

#[tokio::test]
async fn imported_key_restores_without_mnemonic() -> eyre::Result<()> {
    // Two separate databases: the key is exported from one deployment and
    // imported into another.
    let td_source = tempfile::tempdir().context("create tempdir")?;
    let td_import = tempfile::tempdir().context("create tempdir")?;

    let source_manager = manager_over(td_source.path()).await?;
    let source = source_manager.create_wallet(1).await?;
    let exported = source_manager
        .session(1)
        .ok_or_else(|| eyre::eyre!("expected live session"))?
        .export_base58();

    let import_manager = manager_over(td_import.path()).await?;
    let record = import_manager.import_from_private_key(2, &exported).await?;
    assert_eq!(record.address, source.address);
    assert!(record.encrypted_mnemonic.is_none());

    let restarted = manager_over(td_import.path()).await?;
    let restored = restarted.restore_session(2).await?;
    assert_eq!(restored.address(), source.address);
    assert!(restored.mnemonic().is_none());
    Ok(())
}

#[tokio::test]
async fn mnemonic_import_matches_direct_derivation() -> eyre::Result<()> {
    let td = tempfile::tempdir().context("create tempdir")?;
    let phrase =
        "abandon abandon abandon abandon abandon abandon abandon abandon abandon abandon abandon about";

    let manager = manager_over(td.path()).await?;
    let record = manager.import_from_mnemonic(5, phrase).await?;

    let direct = solkeep::keys::from_mnemonic(phrase)?;
    assert_eq!(record.address, direct.address());

    let restarted = manager_over(td.path()).await?;
    let restored = restarted.restore_session(5).await?;
    assert_eq!(restored.mnemonic(), Some(phrase));
    Ok(())
}

#[tokio::test]
async fn duplicate_address_across_users_is_rejected() -> eyre::Result<()> {
    let td = tempfile::tempdir().context("create tempdir")?;

    let manager = manager_over(td.path()).await?;
    manager.create_wallet(1).await?;
    let exported = manager
        .session(1)
        .ok_or_else(|| eyre::eyre!("expected live session"))?
        .export_base58();

    let err = manager.import_from_private_key(2, &exported).await;
    assert!(matches!(
        err,
        Err(ManagerError::Store(StoreError::DuplicateField {
            field: "address"
        }))
    ));
    Ok(())
}

#[tokio::test]
async fn restore_for_unknown_user_reports_no_wallet() -> eyre::Result<()> {
    let td = tempfile::tempdir().context("create tempdir")?;
    let manager = manager_over(td.path()).await?;
    let err = manager.restore_session(404).await;
    assert!(matches!(err, Err(ManagerError::NoWallet(404))));
    Ok(())
}
