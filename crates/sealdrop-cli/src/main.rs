//! sealdrop: encrypted file drop client
//!
//! Commands:
//!   upload <FILES>...       - encrypt (zip first, when several) and upload
//!   download <IDENTIFIER>   - fetch a stored blob and decrypt it
//!   config show             - display the active configuration
//!
//! The upload cooldown survives across invocations through a small JSON
//! state file; `--wait` polls the gate instead of failing on an active
//! cooldown.

mod state;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use indicatif::{ProgressBar, ProgressStyle};
use secrecy::SecretString;
use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime};

use sealdrop_client::{CooldownGate, ProgressFn, SealdropClient};
use sealdrop_core::config::SealdropConfig;
use sealdrop_core::FileEntry;
use state::StateFile;

// ── CLI structure ──────────────────────────────────────────────────────────────

#[derive(Parser, Debug)]
#[command(
    name = "sealdrop",
    version,
    about = "Encrypted file drop client",
    long_about = "sealdrop: encrypt files under a passphrase, upload them to a drop server, and retrieve them later with the same passphrase"
)]
struct Cli {
    /// Path to sealdrop.toml configuration file
    #[arg(
        long,
        short = 'c',
        env = "SEALDROP_CONFIG",
        default_value = "~/.config/sealdrop/sealdrop.toml"
    )]
    config: PathBuf,

    /// Log level (trace, debug, info, warn, error); overrides the config
    #[arg(long, env = "SEALDROP_LOG")]
    log: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Encrypt one or more files and upload them as a single blob
    ///
    /// A single file is encrypted under its own name; two or more files are
    /// zipped together first and uploaded as one batch archive.
    Upload {
        /// Files to upload
        files: Vec<PathBuf>,
        /// Read the passphrase from SEALDROP_PASSPHRASE instead of prompting
        #[arg(long)]
        passphrase_env: bool,
        /// Wait out an active cooldown instead of failing immediately
        #[arg(long)]
        wait: bool,
        /// Override the server base URL from the config
        #[arg(long)]
        server: Option<String>,
    },

    /// Download a stored blob and decrypt it
    Download {
        /// Identifier from the download link (its last path segment)
        identifier: String,
        /// Output directory (default: current directory)
        #[arg(long, short = 'o')]
        output: Option<PathBuf>,
        /// Read the passphrase from SEALDROP_PASSPHRASE instead of prompting
        #[arg(long)]
        passphrase_env: bool,
        /// Override the server base URL from the config
        #[arg(long)]
        server: Option<String>,
    },

    /// Configuration management
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand, Debug)]
enum ConfigAction {
    /// Print the active configuration (merged defaults + config file)
    Show,
}

// ── Entry point ───────────────────────────────────────────────────────────────

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let config_path = expand_tilde(&cli.config);
    let config = SealdropConfig::load(&config_path)?;
    init_tracing(cli.log.as_deref().unwrap_or(&config.log.level));

    match cli.command {
        Commands::Upload {
            files,
            passphrase_env,
            wait,
            server,
        } => cmd_upload(&config, &files, passphrase_env, wait, server).await,
        Commands::Download {
            identifier,
            output,
            passphrase_env,
            server,
        } => cmd_download(&config, &identifier, output.as_deref(), passphrase_env, server).await,
        Commands::Config {
            action: ConfigAction::Show,
        } => cmd_config_show(&config, &config_path),
    }
}

fn init_tracing(level: &str) {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

// ── `sealdrop upload` ─────────────────────────────────────────────────────────

async fn cmd_upload(
    config: &SealdropConfig,
    files: &[PathBuf],
    passphrase_env: bool,
    wait: bool,
    server: Option<String>,
) -> Result<()> {
    if files.is_empty() {
        anyhow::bail!("select at least one file to upload");
    }
    let entries = files
        .iter()
        .map(|p| FileEntry::from_path(p))
        .collect::<Result<Vec<_>, _>>()?;

    let passphrase = read_passphrase(passphrase_env, "Encryption passphrase: ")?;

    let config = apply_server_override(config, server);
    let state_file = StateFile::new(resolve_state_path(&config));
    let gate = CooldownGate::restore(
        Duration::from_secs(config.upload.cooldown_secs),
        &state_file.load()?,
    );
    let mut client = SealdropClient::with_gate(&config, gate);

    if wait {
        wait_for_gate(&client, config.upload.poll_interval_ms).await;
    }

    let pb = make_progress_bar("upload");
    let pb_clone = pb.clone();
    let progress: ProgressFn = Box::new(move |done, total| {
        pb_clone.set_length(total);
        pb_clone.set_position(done);
    });

    let result = client.upload(&entries, &passphrase, Some(&progress)).await;
    pb.finish_and_clear();

    // Persist the gate regardless of outcome: success keeps cooling, any
    // failure has already reset it to idle.
    state_file.store(&client.gate().snapshot())?;

    match result {
        Ok(outcome) if outcome.success => {
            match outcome.download_link {
                Some(link) => println!("Download your encrypted file: {link}"),
                None => println!("Upload complete (server returned no download link)"),
            }
            Ok(())
        }
        Ok(outcome) => anyhow::bail!(
            "upload failed: {}",
            outcome.error.unwrap_or_else(|| "unknown error".into())
        ),
        Err(e) => Err(e.into()),
    }
}

/// Poll the gate twice a second (configurable) with a live countdown until
/// it re-opens.
async fn wait_for_gate(client: &SealdropClient, poll_interval_ms: u64) {
    let pb = make_spinner("cooldown");
    while let Some(remaining) = client.gate().remaining(SystemTime::now()) {
        let secs = remaining.as_millis().div_ceil(1000);
        pb.set_message(format!("please wait {secs} second(s) before uploading again"));
        tokio::time::sleep(Duration::from_millis(poll_interval_ms)).await;
    }
    pb.finish_and_clear();
}

// ── `sealdrop download` ───────────────────────────────────────────────────────

async fn cmd_download(
    config: &SealdropConfig,
    identifier: &str,
    output: Option<&Path>,
    passphrase_env: bool,
    server: Option<String>,
) -> Result<()> {
    let passphrase = read_passphrase(passphrase_env, "Decryption passphrase: ")?;
    let config = apply_server_override(config, server);
    let client = SealdropClient::new(&config);

    let pb = make_spinner("download");
    pb.set_message(identifier.to_string());
    let result = client.download(identifier, &passphrase).await;
    pb.finish_and_clear();
    let file = result?;

    // Deliver under the stored name, base name only.
    let safe_name = Path::new(&file.name)
        .file_name()
        .context("stored name has no file name component")?;
    let out_dir = output.unwrap_or(Path::new("."));
    std::fs::create_dir_all(out_dir)
        .with_context(|| format!("creating output dir: {}", out_dir.display()))?;
    let dest = out_dir.join(safe_name);
    if dest.exists() {
        anyhow::bail!("refusing to overwrite existing file: {}", dest.display());
    }
    std::fs::write(&dest, &file.bytes)
        .with_context(|| format!("writing {}", dest.display()))?;

    println!("Recovered {} ({} bytes)", dest.display(), file.bytes.len());
    Ok(())
}

// ── `sealdrop config show` ────────────────────────────────────────────────────

fn cmd_config_show(config: &SealdropConfig, path: &Path) -> Result<()> {
    println!("# config file: {}", path.display());
    print!("{}", toml::to_string_pretty(config)?);
    Ok(())
}

// ── Helpers ───────────────────────────────────────────────────────────────────

fn read_passphrase(from_env: bool, prompt: &str) -> Result<SecretString> {
    let raw = if from_env {
        std::env::var("SEALDROP_PASSPHRASE").context("SEALDROP_PASSPHRASE is not set")?
    } else {
        rpassword::prompt_password(prompt).context("reading passphrase")?
    };
    if raw.is_empty() {
        anyhow::bail!("passphrase must not be empty");
    }
    Ok(SecretString::from(raw))
}

fn apply_server_override(config: &SealdropConfig, server: Option<String>) -> SealdropConfig {
    let mut config = config.clone();
    if let Some(base_url) = server {
        config.server.base_url = base_url;
    }
    config
}

/// Resolve the cooldown state path: config override > default data dir
fn resolve_state_path(config: &SealdropConfig) -> PathBuf {
    match &config.upload.state_file {
        Some(path) => expand_tilde(path),
        None => expand_tilde(Path::new("~/.local/share/sealdrop/state.json")),
    }
}

/// Expand `~` in path to the user's home directory
fn expand_tilde(path: &Path) -> PathBuf {
    let s = path.to_string_lossy();
    if s.starts_with("~/") {
        let home = std::env::var("HOME").unwrap_or_default();
        PathBuf::from(format!("{}/{}", home, &s[2..]))
    } else {
        path.to_path_buf()
    }
}

// ── Progress bar helpers ──────────────────────────────────────────────────────

fn make_progress_bar(prefix: &str) -> ProgressBar {
    let pb = ProgressBar::new(0);
    pb.set_style(
        ProgressStyle::with_template("{prefix:.bold} [{bar:40.cyan/blue}] {bytes}/{total_bytes}")
            .unwrap()
            .progress_chars("=>-"),
    );
    pb.set_prefix(prefix.to_string());
    pb
}

fn make_spinner(prefix: &str) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    pb.set_style(ProgressStyle::with_template("{prefix:.bold} {spinner} {msg}").unwrap());
    pb.set_prefix(prefix.to_string());
    pb.enable_steady_tick(Duration::from_millis(80));
    pb
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_expand_tilde() {
        std::env::set_var("HOME", "/home/tester");
        assert_eq!(
            expand_tilde(Path::new("~/x/y.json")),
            PathBuf::from("/home/tester/x/y.json")
        );
        assert_eq!(
            expand_tilde(Path::new("/abs/path")),
            PathBuf::from("/abs/path")
        );
    }

    #[test]
    fn test_state_path_prefers_config() {
        let mut config = SealdropConfig::default();
        config.upload.state_file = Some(PathBuf::from("/tmp/custom.json"));
        assert_eq!(resolve_state_path(&config), PathBuf::from("/tmp/custom.json"));
    }
}
