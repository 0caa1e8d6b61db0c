//! Password-based envelope encryption for wallet secrets.
//!
//! Layout of an envelope, in order: a 16-byte KDF salt, a 12-byte AES-GCM
//! nonce, the 16-byte authentication tag, then the ciphertext. Every envelope
//! is therefore at least 44 bytes; the ciphertext length equals the plaintext
//! length. Salt and nonce are drawn fresh per call, so encrypting the same
//! plaintext twice yields different bytes.

use aes_gcm::{
    aead::{Aead as _, KeyInit as _},
    Aes256Gcm, Nonce,
};
use argon2::{
    password_hash::{PasswordHasher as _, SaltString},
    Algorithm, Argon2, Params, Version,
};
use rand::Rng as _;
use secrecy::{ExposeSecret as _, SecretString};
use zeroize::Zeroizing;

use crate::errors::CipherError;

pub const SALT_LEN: usize = 16;
pub const NONCE_LEN: usize = 12;
pub const TAG_LEN: usize = 16;
/// Minimum envelope size: salt + nonce + tag with empty ciphertext.
pub const HEADER_LEN: usize = SALT_LEN + NONCE_LEN + TAG_LEN;

fn fill_random(buf: &mut [u8]) {
    let mut rng = rand::rng();
    rng.fill_bytes(buf);
}

/// Stretches `password` into a 32-byte AES key with Argon2id.
fn derive_key(password: &SecretString, salt: &[u8]) -> Result<Zeroizing<[u8; 32]>, CipherError> {
    // Freeze Argon2id parameters: changing them would orphan every envelope
    // already at rest. These match `argon2::Params::DEFAULT` in argon2 0.5.x.
    let params = Params::new(19 * 1024, 2, 1, Some(32))
        .map_err(|e| CipherError::Kdf(format!("argon2 params: {e}")))?;
    let argon2 = Argon2::new(Algorithm::Argon2id, Version::V0x13, params);
    let salt_b64 = SaltString::encode_b64(salt)
        .map_err(|e| CipherError::Kdf(format!("encode salt: {e}")))?;

    // We use a PHC hash but only take the raw bytes; this keeps parameters versioned.
    let hash = argon2
        .hash_password(password.expose_secret().as_bytes(), &salt_b64)
        .map_err(|e| CipherError::Kdf(format!("argon2 hash: {e}")))?;
    let bytes = hash
        .hash
        .ok_or_else(|| CipherError::Kdf("argon2 missing hash".into()))?;
    let raw = bytes.as_bytes();
    let Some(prefix) = raw.get(..32) else {
        return Err(CipherError::Kdf("argon2 hash too short".into()));
    };
    let mut key = Zeroizing::new([0_u8; 32]);
    key.copy_from_slice(prefix);
    Ok(key)
}

/// Encrypts `plaintext` under `password`, returning a self-contained envelope.
pub fn encrypt(plaintext: &str, password: &SecretString) -> Result<Vec<u8>, CipherError> {
    let mut salt = [0_u8; SALT_LEN];
    fill_random(&mut salt);
    let mut nonce = [0_u8; NONCE_LEN];
    fill_random(&mut nonce);

    let key = derive_key(password, &salt)?;
    let cipher = Aes256Gcm::new_from_slice(key.as_ref())
        .map_err(|e| CipherError::Encrypt(format!("aes init: {e}")))?;

    // The aead crate appends the tag to the ciphertext; the envelope carries
    // it up front, so split and reorder.
    let ct_and_tag = cipher
        .encrypt(Nonce::from_slice(&nonce), plaintext.as_bytes())
        .map_err(|e| CipherError::Encrypt(format!("aes encrypt: {e}")))?;
    let split = ct_and_tag.len() - TAG_LEN;
    let (ciphertext, tag) = ct_and_tag.split_at(split);

    let mut envelope = Vec::with_capacity(HEADER_LEN + ciphertext.len());
    envelope.extend_from_slice(&salt);
    envelope.extend_from_slice(&nonce);
    envelope.extend_from_slice(tag);
    envelope.extend_from_slice(ciphertext);
    Ok(envelope)
}

/// Opens an envelope produced by [`encrypt`].
///
/// Authenticity failures collapse into [`CipherError::Decrypt`]: short
/// input, flipped bits anywhere in the envelope, a wrong password, or
/// non-UTF-8 plaintext all look the same from the outside. KDF platform
/// failures are not authenticity failures and keep their own kind.
pub fn decrypt(envelope: &[u8], password: &SecretString) -> Result<String, CipherError> {
    if envelope.len() < HEADER_LEN {
        return Err(CipherError::Decrypt);
    }
    let salt = envelope.get(..SALT_LEN).ok_or(CipherError::Decrypt)?;
    let nonce = envelope
        .get(SALT_LEN..SALT_LEN + NONCE_LEN)
        .ok_or(CipherError::Decrypt)?;
    let tag = envelope
        .get(SALT_LEN + NONCE_LEN..HEADER_LEN)
        .ok_or(CipherError::Decrypt)?;
    let ciphertext = envelope.get(HEADER_LEN..).ok_or(CipherError::Decrypt)?;

    let key = derive_key(password, salt)?;
    let cipher = Aes256Gcm::new_from_slice(key.as_ref()).map_err(|_| CipherError::Decrypt)?;

    let mut ct_and_tag = Vec::with_capacity(ciphertext.len() + TAG_LEN);
    ct_and_tag.extend_from_slice(ciphertext);
    ct_and_tag.extend_from_slice(tag);

    let plaintext = cipher
        .decrypt(Nonce::from_slice(nonce), ct_and_tag.as_slice())
        .map_err(|_| CipherError::Decrypt)?;
    String::from_utf8(plaintext).map_err(|_| CipherError::Decrypt)
}
