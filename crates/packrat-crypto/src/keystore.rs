//! Two-tier persistence for the client's RSA private key.
//!
//! The key may originate from a one-time enrollment file (base64 text);
//! every later run reloads it from a binary DER cache instead. `load`
//! tries the cache first, falls back to the enrollment file, and rewrites
//! the cache on the way out so the next run takes the fast path.

use std::fs;
use std::io::{ErrorKind, Write};
use std::path::PathBuf;

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;
use rsa::pkcs8::{DecodePrivateKey, EncodePrivateKey};
use rsa::RsaPrivateKey;
use tracing::{debug, warn};

use crate::error::KeyStoreError;

/// Binary DER cache of the private key: raw PKCS#8 bytes, no header, no
/// length prefix.
pub const KEY_CACHE_FILE: &str = "priv.key";

/// Enrollment file written when the client is first registered:
/// username, opaque identifier, base64 private key — one per line.
pub const ENROLLMENT_FILE: &str = "me.info";

/// Identity lines of the enrollment file. The identifier is an opaque
/// pass-through value assigned at enrollment time.
#[derive(Debug, Clone)]
pub struct Enrollment {
    pub username: String,
    pub identifier: String,
}

/// Loads and saves the RSA private key under a fixed directory.
///
/// File handles are scoped to each call and released on every exit path.
pub struct KeyStore {
    dir: PathBuf,
}

impl KeyStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    fn cache_path(&self) -> PathBuf {
        self.dir.join(KEY_CACHE_FILE)
    }

    fn enrollment_path(&self) -> PathBuf {
        self.dir.join(ENROLLMENT_FILE)
    }

    /// Load the private key: binary cache first, enrollment file second.
    ///
    /// A cache that exists but does not parse is discarded with a warning
    /// and the enrollment file is consulted instead — never a
    /// half-initialized key. A successful enrollment load rewrites the
    /// cache; failure to write it is logged and ignored.
    pub fn load(&self) -> Result<RsaPrivateKey, KeyStoreError> {
        match self.load_cache() {
            Ok(Some(key)) => {
                debug!("loaded private key from {}", self.cache_path().display());
                return Ok(key);
            }
            Ok(None) => debug!("no binary key cache at {}", self.cache_path().display()),
            Err(err) => warn!("discarding unreadable key cache: {err}"),
        }

        let (_, key) = self.read_enrollment()?;
        debug!(
            "loaded private key from {}",
            self.enrollment_path().display()
        );
        if let Err(err) = self.save(&key) {
            warn!("could not rewrite binary key cache: {err}");
        }
        Ok(key)
    }

    /// Read the enrollment file in full: identity lines plus private key.
    pub fn load_enrollment(&self) -> Result<(Enrollment, RsaPrivateKey), KeyStoreError> {
        self.read_enrollment()
    }

    /// Serialize the private key to PKCS#8 DER and (over)write the binary
    /// cache. Returns the number of bytes written.
    pub fn save(&self, key: &RsaPrivateKey) -> Result<usize, KeyStoreError> {
        let der = key.to_pkcs8_der()?;
        let bytes = der.as_bytes();
        let mut file = fs::File::create(self.cache_path())?;
        file.write_all(bytes)?;
        file.flush()?;
        file.sync_all()?;
        Ok(bytes.len())
    }

    /// `Ok(None)` = cache absent; `Err` = present but unreadable or
    /// unparseable.
    fn load_cache(&self) -> Result<Option<RsaPrivateKey>, KeyStoreError> {
        let bytes = match fs::read(self.cache_path()) {
            Ok(bytes) => bytes,
            Err(err) if err.kind() == ErrorKind::NotFound => return Ok(None),
            Err(err) => return Err(err.into()),
        };
        Ok(Some(RsaPrivateKey::from_pkcs8_der(&bytes)?))
    }

    fn read_enrollment(&self) -> Result<(Enrollment, RsaPrivateKey), KeyStoreError> {
        let text = match fs::read_to_string(self.enrollment_path()) {
            Ok(text) => text,
            Err(err) if err.kind() == ErrorKind::NotFound => {
                return Err(KeyStoreError::NotFound {
                    dir: self.dir.clone(),
                });
            }
            Err(err) => return Err(err.into()),
        };

        let mut lines = text.lines();
        let username = lines.next().ok_or_else(|| malformed("missing username line"))?;
        let identifier = lines
            .next()
            .ok_or_else(|| malformed("missing identifier line"))?;
        let key_b64 = lines
            .next()
            .ok_or_else(|| malformed("missing private key line"))?;

        let der = BASE64.decode(key_b64.trim())?;
        let key = RsaPrivateKey::from_pkcs8_der(&der)?;

        Ok((
            Enrollment {
                username: username.trim().to_string(),
                identifier: identifier.trim().to_string(),
            },
            key,
        ))
    }
}

fn malformed(reason: &str) -> KeyStoreError {
    KeyStoreError::MalformedEnrollment {
        reason: reason.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use std::sync::OnceLock;

    use rsa::pkcs1::EncodeRsaPublicKey;
    use rsa::RsaPublicKey;

    use super::*;

    // 1024-bit keygen is slow enough that the tests share one pair.
    fn test_key() -> &'static RsaPrivateKey {
        static KEY: OnceLock<RsaPrivateKey> = OnceLock::new();
        KEY.get_or_init(|| {
            RsaPrivateKey::new(&mut rand::rngs::OsRng, 1024).expect("keygen")
        })
    }

    fn public_der(key: &RsaPrivateKey) -> Vec<u8> {
        RsaPublicKey::from(key)
            .to_pkcs1_der()
            .expect("export")
            .into_vec()
    }

    fn write_enrollment(dir: &std::path::Path, username: &str, key: &RsaPrivateKey) {
        let der = key.to_pkcs8_der().expect("serialize");
        let contents = format!(
            "{username}\n64f3f63985f04beb81a0e43321880182\n{}\n",
            BASE64.encode(der.as_bytes())
        );
        fs::write(dir.join(ENROLLMENT_FILE), contents).expect("write enrollment");
    }

    #[test]
    fn save_then_load_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let store = KeyStore::new(dir.path());

        let written = store.save(test_key()).unwrap();
        assert!(written > 0);

        let loaded = store.load().unwrap();
        assert_eq!(public_der(&loaded), public_der(test_key()));
    }

    #[test]
    fn save_reports_der_byte_count() {
        let dir = tempfile::tempdir().unwrap();
        let store = KeyStore::new(dir.path());

        let written = store.save(test_key()).unwrap();
        let on_disk = fs::read(dir.path().join(KEY_CACHE_FILE)).unwrap();
        assert_eq!(written, on_disk.len());
    }

    #[test]
    fn enrollment_fallback_creates_byte_identical_cache() {
        let dir = tempfile::tempdir().unwrap();
        let store = KeyStore::new(dir.path());
        write_enrollment(dir.path(), "alice", test_key());

        let loaded = store.load().unwrap();
        assert_eq!(public_der(&loaded), public_der(test_key()));

        let cache = fs::read(dir.path().join(KEY_CACHE_FILE)).unwrap();
        let der = test_key().to_pkcs8_der().unwrap();
        assert_eq!(cache, der.as_bytes());
    }

    #[test]
    fn cache_survives_enrollment_removal() {
        let dir = tempfile::tempdir().unwrap();
        let store = KeyStore::new(dir.path());
        write_enrollment(dir.path(), "alice", test_key());

        store.load().unwrap();
        fs::remove_file(dir.path().join(ENROLLMENT_FILE)).unwrap();

        let loaded = store.load().unwrap();
        assert_eq!(public_der(&loaded), public_der(test_key()));
    }

    #[test]
    fn corrupt_cache_falls_back_to_enrollment() {
        let dir = tempfile::tempdir().unwrap();
        let store = KeyStore::new(dir.path());
        fs::write(dir.path().join(KEY_CACHE_FILE), b"not a der key").unwrap();
        write_enrollment(dir.path(), "alice", test_key());

        let loaded = store.load().unwrap();
        assert_eq!(public_der(&loaded), public_der(test_key()));

        // The bad cache was replaced with a good one.
        let cache = fs::read(dir.path().join(KEY_CACHE_FILE)).unwrap();
        assert_eq!(cache, test_key().to_pkcs8_der().unwrap().as_bytes());
    }

    #[test]
    fn empty_store_reports_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let store = KeyStore::new(dir.path());
        assert!(matches!(
            store.load(),
            Err(KeyStoreError::NotFound { .. })
        ));
    }

    #[test]
    fn truncated_enrollment_is_malformed() {
        let dir = tempfile::tempdir().unwrap();
        let store = KeyStore::new(dir.path());
        fs::write(dir.path().join(ENROLLMENT_FILE), "alice\nid-only\n").unwrap();
        assert!(matches!(
            store.load(),
            Err(KeyStoreError::MalformedEnrollment { .. })
        ));
    }

    #[test]
    fn garbage_base64_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let store = KeyStore::new(dir.path());
        fs::write(
            dir.path().join(ENROLLMENT_FILE),
            "alice\nsome-id\n!!!not-base64!!!\n",
        )
        .unwrap();
        assert!(matches!(store.load(), Err(KeyStoreError::Base64(_))));
    }

    #[test]
    fn enrollment_exposes_identity_lines() {
        let dir = tempfile::tempdir().unwrap();
        let store = KeyStore::new(dir.path());
        write_enrollment(dir.path(), "alice", test_key());

        let (enrollment, _) = store.load_enrollment().unwrap();
        assert_eq!(enrollment.username, "alice");
        assert_eq!(enrollment.identifier, "64f3f63985f04beb81a0e43321880182");
    }
}
