//! Wallet key material: mnemonic derivation, private-key import, format
//! detection.
//!
//! Derivation is fixed to the first Solana account of the standard BIP44
//! path (m/44'/501'/0'/0') with an empty BIP39 passphrase, so a phrase
//! always maps to the same address no matter which entry point produced it.

use bip39::{Language, Mnemonic};
use solana_derivation_path::DerivationPath;
use solana_keypair::seed_derivable::keypair_from_seed_and_derivation_path;
use solana_keypair::Keypair;
use solana_seed_phrase::generate_seed_from_seed_phrase_and_passphrase;
use solana_signer::Signer as _;
use zeroize::Zeroizing;

use crate::errors::KeyError;

/// An ed25519 secret key expansion: 32 seed bytes followed by the public key.
pub const SECRET_KEY_LEN: usize = 64;

const WORD_COUNT: usize = 12;

/// The serialization a raw private-key string was recognized as.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyFormat {
    /// JSON-style byte array, e.g. `[12,34,...]`.
    ByteArray,
    /// 128 hex characters.
    Hex,
    /// Base58, the common wallet-app export encoding.
    Base58,
}

impl std::fmt::Display for KeyFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::ByteArray => f.write_str("byte-array"),
            Self::Hex => f.write_str("hex"),
            Self::Base58 => f.write_str("base58"),
        }
    }
}

/// A live wallet: signing keypair plus the mnemonic it came from, when known.
///
/// Imported raw keys have no recoverable phrase, so `mnemonic` is `None`
/// for those.
pub struct WalletInfo {
    keypair: Keypair,
    mnemonic: Option<String>,
}

impl std::fmt::Debug for WalletInfo {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WalletInfo")
            .field("address", &self.address())
            .finish_non_exhaustive()
    }
}

impl WalletInfo {
    pub fn keypair(&self) -> &Keypair {
        &self.keypair
    }

    pub fn mnemonic(&self) -> Option<&str> {
        self.mnemonic.as_deref()
    }

    /// Re-attaches a recovery phrase to a wallet rebuilt from its raw key.
    #[must_use]
    pub fn with_mnemonic(mut self, phrase: String) -> Self {
        self.mnemonic = Some(phrase);
        self
    }

    /// Base58 public key.
    pub fn address(&self) -> String {
        self.keypair.pubkey().to_string()
    }

    /// Base58 of the full 64-byte secret, the interchange encoding used by
    /// most Solana wallet apps.
    pub fn export_base58(&self) -> String {
        bs58::encode(self.keypair.to_bytes()).into_string()
    }
}

/// Generates a fresh 12-word English mnemonic and derives its wallet.
pub fn generate() -> Result<WalletInfo, KeyError> {
    let mnemonic =
        Mnemonic::generate_in(Language::English, WORD_COUNT).map_err(KeyError::Generation)?;
    let phrase = mnemonic.to_string();
    let keypair = derive_from_phrase(&phrase)?;
    Ok(WalletInfo {
        keypair,
        mnemonic: Some(phrase),
    })
}

/// Recovers a wallet from an existing English mnemonic phrase.
///
/// The phrase is validated (word list, checksum) before derivation; the
/// caller's original string is what gets stored back, normalization aside.
pub fn from_mnemonic(phrase: &str) -> Result<WalletInfo, KeyError> {
    let mnemonic =
        Mnemonic::parse_in_normalized(Language::English, phrase).map_err(KeyError::Mnemonic)?;
    let normalized = mnemonic.to_string();
    let keypair = derive_from_phrase(&normalized)?;
    Ok(WalletInfo {
        keypair,
        mnemonic: Some(normalized),
    })
}

fn derive_from_phrase(phrase: &str) -> Result<Keypair, KeyError> {
    let seed = Zeroizing::new(generate_seed_from_seed_phrase_and_passphrase(phrase, ""));
    let path = DerivationPath::new_bip44(Some(0), Some(0));
    // The upstream error is not Send + Sync; carry it by message.
    keypair_from_seed_and_derivation_path(seed.as_slice(), Some(path))
        .map_err(|e| KeyError::Derivation(e.to_string().into()))
}

/// Classifies a raw private-key string by shape alone.
///
/// Detection never falls through on parse failure: a string that looks like
/// a byte array is only ever treated as a byte array, and so on.
pub fn detect_format(raw: &str) -> KeyFormat {
    if raw.trim_start().starts_with('[') {
        KeyFormat::ByteArray
    } else if raw.len() == SECRET_KEY_LEN * 2 {
        KeyFormat::Hex
    } else {
        KeyFormat::Base58
    }
}

/// Imports a raw private key in any of the recognized formats.
///
/// Byte arrays longer than 64 entries keep their trailing 64 bytes; some
/// wallet exports prepend header bytes. The decoded secret is verified by
/// reconstructing the keypair, which checks the embedded public half.
pub fn from_private_key(raw: &str) -> Result<WalletInfo, KeyError> {
    let raw = raw.trim();
    let format = detect_format(raw);
    let secret: Zeroizing<Vec<u8>> = match format {
        KeyFormat::ByteArray => {
            let bytes: Vec<u8> = serde_json::from_str(raw).map_err(|e| KeyError::InvalidKey {
                format,
                source: Box::new(e),
            })?;
            if bytes.len() < SECRET_KEY_LEN {
                return Err(KeyError::KeyTooShort {
                    got: bytes.len(),
                    need: SECRET_KEY_LEN,
                });
            }
            Zeroizing::new(bytes[bytes.len() - SECRET_KEY_LEN..].to_vec())
        }
        KeyFormat::Hex => Zeroizing::new(hex::decode(raw).map_err(|e| KeyError::InvalidKey {
            format,
            source: Box::new(e),
        })?),
        KeyFormat::Base58 => {
            Zeroizing::new(bs58::decode(raw).into_vec().map_err(|e| {
                KeyError::InvalidKey {
                    format,
                    source: Box::new(e),
                }
            })?)
        }
    };

    let keypair = Keypair::try_from(secret.as_slice()).map_err(|e| KeyError::InvalidKey {
        format,
        source: Box::new(e),
    })?;
    Ok(WalletInfo {
        keypair,
        mnemonic: None,
    })
}
