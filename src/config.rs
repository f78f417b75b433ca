use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    #[serde(default = "default_token_size")]
    pub token_size: usize,
    #[serde(default = "default_seed")]
    pub seed: u64,
    #[serde(default = "default_log_each")]
    pub log_each: u64,
    #[serde(default)]
    pub parallel_scan: bool,
    #[serde(default = "default_scan_chunk_size")]
    pub scan_chunk_size: usize,
}

fn default_token_size() -> usize {
    4
}
fn default_seed() -> u64 {
    123
}
fn default_log_each() -> u64 {
    1_000_000
}
fn default_scan_chunk_size() -> usize {
    64 * 1024 * 1024 // 64MB
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        dotenv::dotenv().ok();

        let config = Self {
            token_size: std::env::var("SUBSAMPLE_TOKEN_SIZE")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or_else(default_token_size),
            seed: std::env::var("SUBSAMPLE_SEED")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or_else(default_seed),
            log_each: std::env::var("SUBSAMPLE_LOG_EACH")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or_else(default_log_each),
            parallel_scan: std::env::var("SUBSAMPLE_PARALLEL_SCAN")
                .ok()
                .and_then(|v| parse_flag(&v))
                .unwrap_or(false),
            scan_chunk_size: std::env::var("SUBSAMPLE_SCAN_CHUNK_SIZE")
                .ok()
                .and_then(|v| v.parse().ok())
                .filter(|&v: &usize| v > 0)
                .unwrap_or_else(default_scan_chunk_size),
        };

        Ok(config)
    }
}

fn parse_flag(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            token_size: default_token_size(),
            seed: default_seed(),
            log_each: default_log_each(),
            parallel_scan: false,
            scan_chunk_size: default_scan_chunk_size(),
        }
    }
}
