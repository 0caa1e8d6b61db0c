use crate::keys::KeyFormat;
use thiserror::Error;

/// Boxed cause for failures originating in external collaborators (RPC, DB).
pub type BoxedSource = Box<dyn std::error::Error + Send + Sync + 'static>;

#[derive(Debug, Error)]
pub enum KeyError {
    /// Entropy failure while creating a fresh wallet.
    #[error("wallet generation failed")]
    Generation(#[source] bip39::Error),

    #[error("invalid mnemonic phrase")]
    Mnemonic(#[source] bip39::Error),

    #[error("private key too short: {got} bytes (need {need})")]
    KeyTooShort { got: usize, need: usize },

    #[error("unparseable {format} private key")]
    InvalidKey {
        format: KeyFormat,
        #[source]
        source: BoxedSource,
    },

    #[error("keypair derivation failed")]
    Derivation(#[source] BoxedSource),
}

#[derive(Debug, Error)]
pub enum CipherError {
    /// Underlying KDF failure (parameters, platform). Propagated as its own kind;
    /// unrelated to the authenticity of any particular envelope.
    #[error("key derivation failed: {0}")]
    Kdf(String),

    #[error("encryption failed: {0}")]
    Encrypt(String),

    /// Deliberately opaque: a truncated envelope, tampered bytes and a wrong
    /// password are indistinguishable to the caller.
    #[error("decryption failed")]
    Decrypt,
}

#[derive(Debug, Error)]
pub enum BalanceError {
    /// The candidate string is not a valid address; no network call was made.
    #[error("invalid address: {0}")]
    InvalidAddress(String),

    #[error("balance query failed")]
    Rpc(#[source] BoxedSource),
}

#[derive(Debug, Error)]
pub enum StoreError {
    /// A uniqueness constraint rejected the write; `field` names the offender.
    #[error("duplicate {field}")]
    DuplicateField { field: &'static str },

    #[error("missing required field: {field}")]
    MissingField { field: &'static str },

    #[error("wallet store failure")]
    Db(#[source] BoxedSource),
}

#[derive(Debug, Error)]
pub enum ManagerError {
    #[error(transparent)]
    Key(#[from] KeyError),

    #[error(transparent)]
    Cipher(#[from] CipherError),

    #[error(transparent)]
    Balance(#[from] BalanceError),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error("no stored wallet for user {0}")]
    NoWallet(i64),
}
