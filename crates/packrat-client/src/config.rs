use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

/// Client configuration, loaded from a JSON file with CLI overrides.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    /// Backup server address, `host:port`.
    pub server_addr: String,

    /// Username presented during the key exchange. Ignored when an
    /// enrollment file supplies the enrolled name.
    pub username: String,

    /// File to encrypt and upload.
    pub backup_path: PathBuf,

    /// Directory holding the key material (`priv.key` / `me.info`).
    pub data_dir: PathBuf,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            server_addr: "127.0.0.1:1357".into(),
            username: "backup".into(),
            backup_path: PathBuf::from("backup.dat"),
            data_dir: PathBuf::from("."),
        }
    }
}

impl ClientConfig {
    pub fn load_from_file(path: &Path) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&content)?)
    }
}
