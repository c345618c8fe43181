//! Bulk payload encryption under the session key.
//!
//! AES-256-CBC with PKCS#7 padding and a fixed all-zero IV. The zero IV
//! is what the server's wire format assumes — no IV is transmitted and
//! none is derived — so encryption here is deterministic: identical
//! plaintexts under the same key always produce identical ciphertexts.
//! That is a documented weakness of the protocol, preserved for
//! interoperability; the session key is single-use backup transport
//! material, not a general-purpose channel key.

use aes::cipher::block_padding::Pkcs7;
use aes::cipher::{BlockEncryptMut, KeyIvInit};
use zeroize::{Zeroize, ZeroizeOnDrop};

use packrat_protocol::types::AES_KEY_SIZE;

use crate::error::CryptoError;

type Aes256CbcEnc = cbc::Encryptor<aes::Aes256>;

/// AES block size; ciphertext length is always the next multiple of this.
pub const AES_BLOCK_SIZE: usize = 16;

/// The protocol's fixed initialization vector.
pub const ZERO_IV: [u8; AES_BLOCK_SIZE] = [0u8; AES_BLOCK_SIZE];

/// The 32-byte AES session key established by the key exchange.
///
/// Either exactly 32 bytes or not constructible; zeroed on drop.
#[derive(Clone, Zeroize, ZeroizeOnDrop)]
pub struct SessionKey([u8; AES_KEY_SIZE]);

impl SessionKey {
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, CryptoError> {
        if bytes.len() != AES_KEY_SIZE {
            return Err(CryptoError::InvalidKeyLength { got: bytes.len() });
        }
        let mut key = [0u8; AES_KEY_SIZE];
        key.copy_from_slice(bytes);
        Ok(Self(key))
    }

    pub fn as_bytes(&self) -> &[u8; AES_KEY_SIZE] {
        &self.0
    }
}

impl std::fmt::Debug for SessionKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("SessionKey(..)")
    }
}

/// Encrypt payload bytes for upload.
///
/// Returns the raw CBC ciphertext with PKCS#7 padding — no chunking, no
/// framing, no transport. Deterministic by protocol requirement (see the
/// module docs).
pub fn encrypt(key: &SessionKey, plaintext: &[u8]) -> Vec<u8> {
    Aes256CbcEnc::new(key.as_bytes().into(), (&ZERO_IV).into())
        .encrypt_padded_vec_mut::<Pkcs7>(plaintext)
}
