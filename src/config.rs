use clap::Parser;
use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};

/// Pastebox paste server
#[derive(Parser, Serialize, Deserialize, Clone, Debug)]
#[command(name = "pastebox-server", version, about = "Pastebox paste server")]
pub struct Config {
    /// Port to listen on
    #[arg(long, env = "PASTEBOX_PORT", default_value = "8080")]
    pub port: u16,

    /// Bind address
    #[arg(long, env = "PASTEBOX_BIND_ADDRESS", default_value = "0.0.0.0")]
    pub bind_address: String,

    /// Path to TOML config file
    #[arg(long, default_value = "./pastebox.toml")]
    pub config: String,

    /// Enable structured JSON logging (for Docker/production)
    #[arg(long, env = "PASTEBOX_JSON_LOGS")]
    pub json_logs: bool,

    /// Output a commented TOML config template and exit
    #[arg(long)]
    pub generate_config: bool,

    /// Data directory for persistent state (paste database)
    #[arg(long, env = "PASTEBOX_DATA_DIR", default_value = "./data")]
    pub data_dir: String,

    /// Transport session token lifetime in seconds
    #[arg(long, env = "PASTEBOX_TOKEN_TTL_SECS", default_value = "300")]
    pub token_ttl_secs: i64,

    /// Interval in seconds between expired-paste purge runs
    #[arg(long, env = "PASTEBOX_EXPIRY_SWEEP_SECS", default_value = "60")]
    pub expiry_sweep_secs: u64,

    /// Maximum paste text size in bytes
    #[arg(long, env = "PASTEBOX_MAX_PASTE_BYTES", default_value = "1048576")]
    pub max_paste_bytes: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            port: 8080,
            bind_address: "0.0.0.0".to_string(),
            config: "./pastebox.toml".to_string(),
            json_logs: false,
            generate_config: false,
            data_dir: "./data".to_string(),
            token_ttl_secs: 300,
            expiry_sweep_secs: 60,
            max_paste_bytes: 1024 * 1024,
        }
    }
}

impl Config {
    /// Load config with layered precedence:
    /// built-in defaults < TOML file < env vars (PASTEBOX_*) < CLI args
    pub fn load() -> Result<Self, figment::Error> {
        let cli = Config::parse();
        let config_path = cli.config.clone();

        Figment::new()
            .merge(Serialized::defaults(Config::default()))
            .merge(Toml::file(&config_path))
            .merge(Env::prefixed("PASTEBOX_"))
            .merge(Serialized::defaults(cli))
            .extract()
    }
}

/// Generate a commented TOML config template
pub fn generate_config_template() -> String {
    r#"# Pastebox Server Configuration
# Place this file at ./pastebox.toml or specify with --config <path>
# All settings can be overridden via environment variables (PASTEBOX_PORT, etc.)
# or CLI flags (--port, etc.)

# Server port (default: 8080)
# port = 8080

# Bind address (default: 0.0.0.0 — all interfaces)
# bind_address = "0.0.0.0"

# Enable structured JSON logging for Docker/production
# json_logs = false

# Data directory for the SQLite paste database
# data_dir = "./data"

# Transport session token lifetime in seconds (default: 300 = 5 minutes)
# Clients re-fetch the token after this window expires.
# token_ttl_secs = 300

# Interval in seconds between expired-paste purge runs (default: 60)
# expiry_sweep_secs = 60

# Maximum paste text size in bytes (default: 1048576 = 1 MiB)
# max_paste_bytes = 1048576
"#
    .to_string()
}
