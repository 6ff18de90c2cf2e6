//! DCash Configuration
//!
//! Shared configuration for the confidential balance client.
//!
//! Handles loading configuration from:
//! 1. DCASH_CONFIG env var (explicit path)
//! 2. ./config.toml (current directory)
//! 3. ~/.dcash/config.toml (user home)
//!
//! Environment variables take precedence over TOML config.

use anyhow::{Context, Result, bail};
use serde::{Deserialize, Serialize};
use solana_sdk::pubkey::Pubkey;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::sync::OnceLock;
use std::{env, fs};

/// Global config instance for convenience access
static GLOBAL_CONFIG: OnceLock<DcashConfig> = OnceLock::new();

const CONFIG_FILE_NAME: &str = "config.toml";
const CONFIG_DIR_NAME: &str = ".dcash";

// ============================================================================
// Default Constants
// ============================================================================

const DEFAULT_RPC_URL: &str = "http://127.0.0.1:8899";
const DEFAULT_PROGRAM_ID: &str = "955SPKk3hC8cbqmophEAMigzaPDBrtHnVzWWS8JN6tr";

const DEFAULT_POLL_INTERVAL_MS: u64 = 500;
const DEFAULT_POLL_MAX_ATTEMPTS: u32 = 20;
const DEFAULT_POLL_GRACE_MS: u64 = 2500;
const DEFAULT_OPTIMISTIC_AFTER: u32 = 4;

const DEFAULT_MAX_TRANSFER: u64 = 1_000_000_000;
const DEFAULT_DECIMALS: u32 = 6;

// ============================================================================
// Config Structs
// ============================================================================

/// Root configuration structure (matches TOML layout)
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DcashConfig {
    #[serde(default)]
    pub solana: SolanaConfig,
    #[serde(default)]
    pub polling: PollingConfig,
    #[serde(default)]
    pub transfer: TransferConfig,
}

/// Solana connection and program addresses
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SolanaConfig {
    #[serde(default = "default_rpc_url")]
    pub rpc_url: String,
    #[serde(default = "default_program_id")]
    pub program_id: String,
    /// MXE account holding the cluster key (base58). Derived from
    /// `program_id` when unset.
    #[serde(default)]
    pub mxe_account: Option<String>,
    /// Cluster x25519 key (hex). Skips the on-chain lookup when set.
    #[serde(default)]
    pub mxe_public_key: Option<String>,
}

impl Default for SolanaConfig {
    fn default() -> Self {
        Self {
            rpc_url: DEFAULT_RPC_URL.into(),
            program_id: DEFAULT_PROGRAM_ID.into(),
            mxe_account: None,
            mxe_public_key: None,
        }
    }
}

fn default_rpc_url() -> String {
    DEFAULT_RPC_URL.into()
}
fn default_program_id() -> String {
    DEFAULT_PROGRAM_ID.into()
}

/// How a submitted computation is judged complete
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ConfirmationPolicy {
    /// Re-read and decrypt the balance until it reflects the operation.
    #[default]
    Verified,
    /// Assume success once more than `optimistic_after` attempts have read
    /// the balance account without seeing the change.
    Optimistic,
}

impl FromStr for ConfirmationPolicy {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "verified" => Ok(Self::Verified),
            "optimistic" => Ok(Self::Optimistic),
            other => Err(format!("unknown confirmation policy: {other}")),
        }
    }
}

/// Confirmation polling configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PollingConfig {
    #[serde(default = "default_poll_interval")]
    pub interval_ms: u64,
    #[serde(default = "default_poll_max_attempts")]
    pub max_attempts: u32,
    #[serde(default = "default_poll_grace")]
    pub initial_grace_ms: u64,
    #[serde(default)]
    pub policy: ConfirmationPolicy,
    #[serde(default = "default_optimistic_after")]
    pub optimistic_after: u32,
}

impl Default for PollingConfig {
    fn default() -> Self {
        Self {
            interval_ms: DEFAULT_POLL_INTERVAL_MS,
            max_attempts: DEFAULT_POLL_MAX_ATTEMPTS,
            initial_grace_ms: DEFAULT_POLL_GRACE_MS,
            policy: ConfirmationPolicy::Verified,
            optimistic_after: DEFAULT_OPTIMISTIC_AFTER,
        }
    }
}

fn default_poll_interval() -> u64 {
    DEFAULT_POLL_INTERVAL_MS
}
fn default_poll_max_attempts() -> u32 {
    DEFAULT_POLL_MAX_ATTEMPTS
}
fn default_poll_grace() -> u64 {
    DEFAULT_POLL_GRACE_MS
}
fn default_optimistic_after() -> u32 {
    DEFAULT_OPTIMISTIC_AFTER
}

/// Transfer limits
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TransferConfig {
    /// Per-transaction limit in base units
    #[serde(default = "default_max_transfer")]
    pub max_transfer: u64,
    /// Token decimals used to parse and display amounts
    #[serde(default = "default_decimals")]
    pub decimals: u32,
}

impl Default for TransferConfig {
    fn default() -> Self {
        Self {
            max_transfer: DEFAULT_MAX_TRANSFER,
            decimals: DEFAULT_DECIMALS,
        }
    }
}

fn default_max_transfer() -> u64 {
    DEFAULT_MAX_TRANSFER
}
fn default_decimals() -> u32 {
    DEFAULT_DECIMALS
}

// ============================================================================
// Environment Variable Helpers
// ============================================================================

/// Set field from env var if present
fn env_string(key: &str, field: &mut String) {
    if let Ok(v) = env::var(key) {
        *field = v;
    }
}

/// Set Option<String> from env var if present
fn env_option_string(key: &str, field: &mut Option<String>) {
    if let Ok(v) = env::var(key) {
        *field = Some(v);
    }
}

/// Set field from env var if present and parseable
fn env_parse<T: FromStr>(key: &str, field: &mut T) {
    if let Ok(v) = env::var(key) {
        match v.parse() {
            Ok(parsed) => *field = parsed,
            Err(_) => log::warn!("Ignoring unparseable {}={}", key, v),
        }
    }
}

// ============================================================================
// Implementation
// ============================================================================

impl DcashConfig {
    /// Load configuration from config file with env var overrides
    pub fn load() -> Result<Self> {
        let mut config = match Self::find_config_file() {
            Some(path) => {
                log::info!("Loading config from: {}", path.display());
                Self::read_file(&path)?
            }
            None => {
                log::info!("No config file found, using defaults and environment variables");
                Self::default()
            }
        };

        config.apply_env_overrides();
        Ok(config)
    }

    /// Load configuration from a specific file path
    pub fn load_from(path: &Path) -> Result<Self> {
        let mut config = Self::read_file(path)?;
        config.apply_env_overrides();
        Ok(config)
    }

    fn read_file(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        toml::from_str(&contents)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))
    }

    /// Find the config file path
    fn find_config_file() -> Option<PathBuf> {
        // 1. Check DCASH_CONFIG env var
        if let Ok(path) = env::var("DCASH_CONFIG") {
            let path = PathBuf::from(path);
            if path.exists() {
                return Some(path);
            }
        }

        // 2. Check ./config.toml (current directory)
        let local_path = PathBuf::from(CONFIG_FILE_NAME);
        if local_path.exists() {
            return Some(local_path);
        }

        // 3. Check ~/.dcash/config.toml
        Self::default_config_path().filter(|p| p.exists())
    }

    /// Apply environment variable overrides
    fn apply_env_overrides(&mut self) {
        // Solana
        env_string("SOLANA_RPC_URL", &mut self.solana.rpc_url);
        env_string("DCASH_PROGRAM_ID", &mut self.solana.program_id);
        env_option_string("DCASH_MXE_ACCOUNT", &mut self.solana.mxe_account);
        env_option_string("DCASH_MXE_PUBLIC_KEY", &mut self.solana.mxe_public_key);

        // Polling
        env_parse("DCASH_POLL_INTERVAL_MS", &mut self.polling.interval_ms);
        env_parse("DCASH_POLL_MAX_ATTEMPTS", &mut self.polling.max_attempts);
        env_parse("DCASH_POLL_GRACE_MS", &mut self.polling.initial_grace_ms);
        env_parse("DCASH_POLL_POLICY", &mut self.polling.policy);

        // Transfer
        env_parse("DCASH_MAX_TRANSFER", &mut self.transfer.max_transfer);
    }

    /// Get the default config file path
    pub fn default_config_path() -> Option<PathBuf> {
        dirs::home_dir().map(|h| h.join(CONFIG_DIR_NAME).join(CONFIG_FILE_NAME))
    }

    /// Generate a sample config file
    pub fn generate_sample() -> String {
        let mut sample = Self::default();
        sample.solana.mxe_public_key = Some(hex::encode([0u8; 32]));
        toml::to_string_pretty(&sample).unwrap_or_default()
    }

    /// Program id, parsed.
    pub fn program_id(&self) -> Result<Pubkey> {
        Pubkey::from_str(&self.solana.program_id)
            .with_context(|| format!("Invalid program_id in config: {}", self.solana.program_id))
    }

    /// MXE account override, parsed, if configured.
    pub fn mxe_account(&self) -> Result<Option<Pubkey>> {
        self.solana
            .mxe_account
            .as_deref()
            .map(|s| {
                Pubkey::from_str(s).with_context(|| format!("Invalid mxe_account in config: {}", s))
            })
            .transpose()
    }

    /// Pinned cluster x25519 public key, if configured.
    pub fn mxe_public_key(&self) -> Result<Option<[u8; 32]>> {
        let Some(encoded) = self.solana.mxe_public_key.as_deref() else {
            return Ok(None);
        };

        let bytes = hex::decode(encoded.trim_start_matches("0x"))
            .context("mxe_public_key is not valid hex")?;
        match <[u8; 32]>::try_from(bytes.as_slice()) {
            Ok(key) => Ok(Some(key)),
            Err(_) => bail!("mxe_public_key must be 32 bytes, got {}", bytes.len()),
        }
    }

    /// Get the global config instance, initializing it if necessary.
    ///
    /// Falls back to defaults if loading fails.
    pub fn global() -> &'static DcashConfig {
        GLOBAL_CONFIG.get_or_init(|| {
            Self::load().unwrap_or_else(|e| {
                log::warn!("Failed to load config: {}, using defaults", e);
                Self::default()
            })
        })
    }

    /// Returns `None` if config hasn't been initialized yet.
    pub fn try_global() -> Option<&'static DcashConfig> {
        GLOBAL_CONFIG.get()
    }

    /// Returns `Err(config)` if already initialized.
    pub fn set_global(config: DcashConfig) -> Result<(), DcashConfig> {
        GLOBAL_CONFIG.set(config)
    }
}

// ============================================================================
// Tests
// ============================================================================
