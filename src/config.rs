use std::env;
use std::net::SocketAddr;
use std::path::PathBuf;

use anyhow::Context;

const DEFAULT_DATA_PATH: &str = "katakosa.json";
const DEFAULT_BIND_ADDR: &str = "127.0.0.1:3000";

#[derive(Debug, Clone)]
pub struct Config {
    pub data_path: PathBuf,
    pub bind_addr: SocketAddr,
}

impl Config {
    /// Reads `KATAKOSA_DATA_PATH` and `KATAKOSA_BIND_ADDR`, after loading a
    /// `.env` file if one exists.
    pub fn from_env() -> anyhow::Result<Self> {
        let _ = dotenvy::dotenv();

        let data_path = env::var("KATAKOSA_DATA_PATH")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from(DEFAULT_DATA_PATH));

        let bind_raw =
            env::var("KATAKOSA_BIND_ADDR").unwrap_or_else(|_| DEFAULT_BIND_ADDR.to_string());
        let bind_addr = bind_raw
            .parse::<SocketAddr>()
            .with_context(|| format!("invalid KATAKOSA_BIND_ADDR: {}", bind_raw))?;

        Ok(Self {
            data_path,
            bind_addr,
        })
    }
}
