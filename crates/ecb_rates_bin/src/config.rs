use dotenvy::dotenv;
use ecb_api::api::{ECB_DAILY_URL, ECB_HISTORY_URL};
use std::env;
use std::path::PathBuf;

const DEFAULT_DATA_DIR: &str = "data";

#[derive(Debug, Clone)]
pub struct Config {
    pub data_dir: PathBuf,
    pub init_url: String,
    pub update_url: String,
}

impl Config {
    /// Reads `ECB_RATES_*` variables, honouring a `.env` file. Unset or blank
    /// values fall back to the ECB endpoints and `./data`.
    pub fn new() -> Config {
        dotenv().ok();
        Config::from_lookup(|name| env::var(name).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Config {
        let value = |name: &str, default: &str| {
            lookup(name)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
                .unwrap_or_else(|| default.to_string())
        };

        Config {
            data_dir: PathBuf::from(value("ECB_RATES_DATA_DIR", DEFAULT_DATA_DIR)),
            init_url: value("ECB_RATES_INIT_URL", ECB_HISTORY_URL),
            update_url: value("ECB_RATES_UPDATE_URL", ECB_DAILY_URL),
        }
    }
}
