// Copyright (c) 2026 Christoph Gaffga
// SPDX-License-Identifier: GPL-3.0-only

//! Symmetric cipher unit.
//!
//! Messages are encrypted with AES-256 under one of two kinds of key material:
//!
//! - **Session key**: 32 random bytes, used directly. Its distribution is the
//!   job of an outer key-exchange layer.
//! - **Password**: stretched with PBKDF2-HMAC-SHA256 (100,000 rounds) over a
//!   fresh random 16-byte salt.
//!
//! Every encryption draws a fresh random 16-byte IV. The IV (and the salt, for
//! passwords) travel out of band next to the stego image.
//!
//! The default suite is AES-256-CBC with PKCS#7 padding. It has no integrity
//! tag: a wrong key only shows up as bad padding or non-UTF-8 plaintext.
//! [`CipherSuite::Aes256GcmSiv`] is available at the same boundary for callers
//! that want authenticated decryption; it uses the first 12 IV bytes as nonce.

use core::fmt;

use aes::Aes256;
use aes_gcm_siv::aead::Aead;
use aes_gcm_siv::{Aes256GcmSiv, KeyInit, Nonce};
use cbc::cipher::block_padding::Pkcs7;
use cbc::cipher::{BlockDecryptMut, BlockEncryptMut, KeyIvInit};
use pbkdf2::pbkdf2_hmac;
use rand::rngs::OsRng;
use rand::RngCore;
use serde::{Deserialize, Serialize};
use sha2::Sha256;
use zeroize::Zeroizing;

use crate::stego::error::{DecryptFailure, StegoError};

type Aes256CbcEnc = cbc::Encryptor<Aes256>;
type Aes256CbcDec = cbc::Decryptor<Aes256>;

/// AES-256 key length in bytes.
pub const KEY_LEN: usize = 32;
/// CBC IV length in bytes.
pub const IV_LEN: usize = 16;
/// PBKDF2 salt length in bytes.
pub const SALT_LEN: usize = 16;
/// AES-GCM-SIV nonce length; taken from the front of the IV.
pub const NONCE_LEN: usize = 12;
/// PBKDF2-HMAC-SHA256 iteration count.
pub const PBKDF2_ROUNDS: u32 = 100_000;
/// AES block size; CBC ciphertext is always a multiple of this.
pub const BLOCK_LEN: usize = 16;

/// Block cipher mode used at the cipher boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum CipherSuite {
    /// AES-256-CBC + PKCS#7. No authentication.
    #[default]
    Aes256Cbc,
    /// AES-256-GCM-SIV. Authenticated, nonce-misuse resistant.
    Aes256GcmSiv,
}

/// Symmetric key material for one message.
pub enum KeyMaterial {
    /// A raw AES-256 key.
    SessionKey(Zeroizing<[u8; KEY_LEN]>),
    /// A password, stretched with PBKDF2 over a per-message salt.
    Password(Zeroizing<String>),
}

impl KeyMaterial {
    pub fn session_key(key: [u8; KEY_LEN]) -> Self {
        Self::SessionKey(Zeroizing::new(key))
    }

    pub fn password(password: &str) -> Self {
        Self::Password(Zeroizing::new(password.to_owned()))
    }

    /// Draw a fresh random session key from the OS CSPRNG.
    pub fn generate_session_key() -> Self {
        let mut key = Zeroizing::new([0u8; KEY_LEN]);
        OsRng.fill_bytes(&mut *key);
        Self::SessionKey(key)
    }

    pub fn is_password(&self) -> bool {
        matches!(self, Self::Password(_))
    }

    /// Produce the AES key, deriving it from the password when needed.
    fn resolve(&self, salt: Option<&[u8; SALT_LEN]>) -> Result<Zeroizing<[u8; KEY_LEN]>, StegoError> {
        match self {
            Self::SessionKey(key) => Ok(Zeroizing::new(**key)),
            Self::Password(password) => {
                let salt = salt.ok_or(StegoError::MissingSalt)?;
                Ok(derive_key(password, salt))
            }
        }
    }
}

impl fmt::Debug for KeyMaterial {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::SessionKey(_) => f.write_str("KeyMaterial::SessionKey(..)"),
            Self::Password(_) => f.write_str("KeyMaterial::Password(..)"),
        }
    }
}

/// Ciphertext plus the values the receiver needs to decrypt it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Sealed {
    pub ciphertext: Vec<u8>,
    /// PBKDF2 salt; `None` for session keys.
    pub salt: Option<[u8; SALT_LEN]>,
    pub iv: [u8; IV_LEN],
}

/// Derive an AES-256 key from a password with PBKDF2-HMAC-SHA256.
pub fn derive_key(password: &str, salt: &[u8]) -> Zeroizing<[u8; KEY_LEN]> {
    let mut key = Zeroizing::new([0u8; KEY_LEN]);
    pbkdf2_hmac::<Sha256>(password.as_bytes(), salt, PBKDF2_ROUNDS, &mut *key);
    key
}

/// Encrypt with a fresh random IV (and salt, for passwords).
pub fn encrypt(plaintext: &[u8], key: &KeyMaterial, suite: CipherSuite) -> Sealed {
    let mut rng = rand::thread_rng();

    let mut iv = [0u8; IV_LEN];
    rng.fill_bytes(&mut iv);

    let (aes_key, salt) = match key {
        KeyMaterial::SessionKey(k) => (Zeroizing::new(**k), None),
        KeyMaterial::Password(password) => {
            let mut salt = [0u8; SALT_LEN];
            rng.fill_bytes(&mut salt);
            (derive_key(password, &salt), Some(salt))
        }
    };

    let ciphertext = encrypt_with(plaintext, &aes_key, &iv, suite);
    Sealed { ciphertext, salt, iv }
}

/// Encrypt under a caller-provided raw key and IV.
///
/// Reusing an IV with the same key is forbidden; [`encrypt`] is the normal
/// entry point and never does.
pub fn encrypt_with(plaintext: &[u8], key: &[u8; KEY_LEN], iv: &[u8; IV_LEN], suite: CipherSuite) -> Vec<u8> {
    match suite {
        CipherSuite::Aes256Cbc => {
            Aes256CbcEnc::new(&(*key).into(), &(*iv).into()).encrypt_padded_vec_mut::<Pkcs7>(plaintext)
        }
        CipherSuite::Aes256GcmSiv => {
            let cipher = Aes256GcmSiv::new_from_slice(key).expect("valid key length");
            let nonce = Nonce::from_slice(&iv[..NONCE_LEN]);
            cipher.encrypt(nonce, plaintext).expect("AES-GCM-SIV encrypt should not fail")
        }
    }
}

/// Decrypt to raw bytes.
///
/// # Errors
/// - [`StegoError::MissingSalt`] for a password without salt.
/// - [`StegoError::DecryptionFailed`] with [`DecryptFailure::BadPadding`]
///   (CBC) or [`DecryptFailure::AuthTag`] (GCM-SIV) on a wrong key, salt or IV.
pub fn decrypt(
    ciphertext: &[u8],
    key: &KeyMaterial,
    salt: Option<&[u8; SALT_LEN]>,
    iv: &[u8; IV_LEN],
    suite: CipherSuite,
) -> Result<Vec<u8>, StegoError> {
    let aes_key = key.resolve(salt)?;
    match suite {
        CipherSuite::Aes256Cbc => {
            if ciphertext.is_empty() || ciphertext.len() % BLOCK_LEN != 0 {
                return Err(StegoError::DecryptionFailed(DecryptFailure::BadPadding));
            }
            Aes256CbcDec::new(&(*aes_key).into(), &(*iv).into())
                .decrypt_padded_vec_mut::<Pkcs7>(ciphertext)
                .map_err(|_| StegoError::DecryptionFailed(DecryptFailure::BadPadding))
        }
        CipherSuite::Aes256GcmSiv => {
            let cipher = Aes256GcmSiv::new_from_slice(&*aes_key).expect("valid key length");
            let nonce = Nonce::from_slice(&iv[..NONCE_LEN]);
            cipher
                .decrypt(nonce, ciphertext)
                .map_err(|_| StegoError::DecryptionFailed(DecryptFailure::AuthTag))
        }
    }
}

/// Decrypt and require a UTF-8 plaintext.
pub fn decrypt_text(
    ciphertext: &[u8],
    key: &KeyMaterial,
    salt: Option<&[u8; SALT_LEN]>,
    iv: &[u8; IV_LEN],
    suite: CipherSuite,
) -> Result<String, StegoError> {
    let bytes = decrypt(ciphertext, key, salt, iv, suite)?;
    String::from_utf8(bytes).map_err(|_| StegoError::DecryptionFailed(DecryptFailure::InvalidUtf8))
}
