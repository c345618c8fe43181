//! RSA identity key ownership and session-key decryption.
//!
//! Each client has a long-term 1024-bit RSA key pair, generated on first
//! run and persisted via [`KeyStore`]. The pair does exactly one job:
//! transporting the server-chosen AES session key.

use rand::rngs::OsRng;
use rsa::pkcs1::EncodeRsaPublicKey;
use rsa::{Oaep, RsaPrivateKey, RsaPublicKey};
use sha1::Sha1;
use tracing::{debug, info};

use crate::bulk::SessionKey;
use crate::error::{CryptoError, KeyStoreError};
use crate::keystore::KeyStore;

/// RSA modulus size. Fixed by the server's expectations: the exported
/// public key must fit the 160-byte wire field.
pub const RSA_MODULUS_BITS: usize = 1024;

/// Owner of the process-lifetime RSA key pair.
///
/// Constructed with key material or not at all, and read-only after
/// startup — callers never observe a keyless manager.
pub struct IdentityKeyManager {
    private_key: RsaPrivateKey,
    public_key: RsaPublicKey,
}

impl IdentityKeyManager {
    /// Generate a fresh key pair. Failure here is fatal for the session:
    /// without an identity there is nothing to exchange.
    pub fn generate() -> Result<Self, CryptoError> {
        let private_key =
            RsaPrivateKey::new(&mut OsRng, RSA_MODULUS_BITS).map_err(CryptoError::KeyGeneration)?;
        Ok(Self::from_private_key(private_key))
    }

    pub fn from_private_key(private_key: RsaPrivateKey) -> Self {
        let public_key = RsaPublicKey::from(&private_key);
        Self {
            private_key,
            public_key,
        }
    }

    /// Startup path: reload the persisted key, or generate and persist a
    /// fresh pair when the store holds nothing at all.
    ///
    /// A store that holds key material but cannot decode it is an error,
    /// not a regeneration trigger.
    pub fn load_or_generate(store: &KeyStore) -> Result<Self, CryptoError> {
        match store.load() {
            Ok(key) => {
                debug!("reusing persisted identity key");
                Ok(Self::from_private_key(key))
            }
            Err(KeyStoreError::NotFound { .. }) => {
                info!("no persisted identity key, generating a fresh pair");
                let manager = Self::generate()?;
                store.save(&manager.private_key)?;
                Ok(manager)
            }
            Err(err) => Err(err.into()),
        }
    }

    pub fn public_key(&self) -> &RsaPublicKey {
        &self.public_key
    }

    /// Export the public key as PKCS#1 DER, the form carried in the wire
    /// payload. Retrievable any number of times without touching the
    /// private half.
    pub fn public_key_der(&self) -> Result<Vec<u8>, CryptoError> {
        let doc = self
            .public_key
            .to_pkcs1_der()
            .map_err(CryptoError::PublicKeyExport)?;
        Ok(doc.into_vec())
    }

    /// Decrypt the server's RSA-encrypted AES session key.
    ///
    /// The resulting plaintext must be exactly 32 bytes. That check is
    /// protocol conformance, not defense: any other length means a
    /// version or corruption mismatch with the server, and the handshake
    /// must abort rather than continue with a short or long key.
    pub fn decrypt_session_key(&self, ciphertext: &[u8]) -> Result<SessionKey, CryptoError> {
        let plaintext = self
            .private_key
            .decrypt(Oaep::new::<Sha1>(), ciphertext)
            .map_err(|_| CryptoError::Decrypt)?;
        SessionKey::from_bytes(&plaintext)
    }
}
