use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Parser;
use tracing::{info, warn};

use packrat_crypto::{bulk, session, IdentityKeyManager, KeyStore};
use packrat_protocol::messages::{RequestCode, ResponseCode};
use packrat_protocol::transport::Transport;
use packrat_protocol::types::Identity;

mod config;
mod transport;

use config::ClientConfig;
use transport::TcpTransport;

#[derive(Parser)]
#[command(name = "packrat", about = "Encrypted backup client")]
struct Args {
    /// Path to configuration file (JSON)
    #[arg(short, long)]
    config: Option<String>,

    /// Server address (host:port), overrides config
    #[arg(long)]
    server: Option<String>,

    /// Username, overrides config
    #[arg(long)]
    username: Option<String>,

    /// File to back up, overrides config
    #[arg(long)]
    file: Option<PathBuf>,

    /// Directory holding key material, overrides config
    #[arg(long)]
    data_dir: Option<PathBuf>,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "packrat=info".into()),
        )
        .init();

    let args = Args::parse();

    let mut config = if let Some(config_path) = &args.config {
        ClientConfig::load_from_file(Path::new(config_path))
            .with_context(|| format!("failed to read config file: {}", config_path))?
    } else {
        ClientConfig::default()
    };

    // CLI overrides
    if let Some(server) = args.server {
        config.server_addr = server;
    }
    if let Some(username) = args.username {
        config.username = username;
    }
    if let Some(file) = args.file {
        config.backup_path = file;
    }
    if let Some(data_dir) = args.data_dir {
        config.data_dir = data_dir;
    }

    run_backup(&config)
}

fn run_backup(config: &ClientConfig) -> Result<()> {
    let store = KeyStore::new(&config.data_dir);
    let keys = IdentityKeyManager::load_or_generate(&store)
        .context("could not obtain an identity key pair")?;

    // An enrollment file pins the username the server knows us by.
    let username = match store.load_enrollment() {
        Ok((enrollment, _)) => enrollment.username,
        Err(_) => config.username.clone(),
    };
    let mut identity = Identity::new(username);

    let mut transport = TcpTransport::connect(config.server_addr.as_str())
        .with_context(|| format!("could not connect to {}", config.server_addr))?;
    info!("connected to {}", config.server_addr);

    let session_key =
        session::establish(&mut transport, &keys, &mut identity).context("key exchange failed")?;

    let plaintext = fs::read(&config.backup_path)
        .with_context(|| format!("could not read {}", config.backup_path.display()))?;
    let ciphertext = bulk::encrypt(&session_key, &plaintext);
    info!(
        "encrypted {} plaintext bytes into {} ciphertext bytes",
        plaintext.len(),
        ciphertext.len()
    );

    transport
        .send_request(RequestCode::SendEncryptedData, &ciphertext)
        .context("upload failed")?;
    let (header, _) = transport
        .receive_response()
        .context("no upload acknowledgement")?;
    if header.code != ResponseCode::DataReceived as u16 {
        warn!("server answered upload with code {}", header.code);
        anyhow::bail!("server rejected the upload (code {})", header.code);
    }

    info!("backup of {} complete", config.backup_path.display());
    Ok(())
}
