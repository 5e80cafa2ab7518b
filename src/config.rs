use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;
use crate::errors::ConfigError;
use crate::models::{EndpointCandidate, EndpointRole};

const DEFAULT_PRIMARY_URL: &str = "https://tubemetricsbackend.vercel.app";
const DEFAULT_FALLBACK_URL: &str = "http://localhost:5000";
const DEFAULT_MAX_ATTEMPTS: u64 = 3;
const DEFAULT_RETRY_DELAY_MS: u64 = 1000;
const DEFAULT_PROBE_TIMEOUT_MS: u64 = 5000;
const DEFAULT_FETCH_TIMEOUT_MS: u64 = 30000;
const DEFAULT_BIND_ADDR: &str = "0.0.0.0:3000";

#[derive(Debug, Clone)]
pub struct Config {
    pub primary: EndpointCandidate,
    pub fallback: EndpointCandidate,
    pub max_attempts: u32,
    pub retry_delay: Duration,
    pub probe_timeout: Duration,
    pub fetch_timeout: Duration,
    pub bind_addr: SocketAddr,
    pub params_file: Option<PathBuf>,
    pub log_dir: Option<PathBuf>,
}

impl Config {
    /// Reads `.env` (if any) and then the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let primary_url = lookup("TRENDING_PRIMARY_URL")
            .unwrap_or_else(|| DEFAULT_PRIMARY_URL.to_string());
        let fallback_url = lookup("TRENDING_FALLBACK_URL")
            .unwrap_or_else(|| DEFAULT_FALLBACK_URL.to_string());

        let number = |name: &'static str, default: u64| -> Result<u64, ConfigError> {
            match lookup(name) {
                None => Ok(default),
                Some(value) => value.trim().parse::<u64>().map_err(|_| ConfigError::InvalidNumber {
                    name,
                    value,
                }),
            }
        };

        let max_attempts = number("TRENDING_MAX_ATTEMPTS", DEFAULT_MAX_ATTEMPTS)?;
        if max_attempts == 0 {
            return Err(ConfigError::ZeroAttempts);
        }
        let max_attempts = u32::try_from(max_attempts).map_err(|_| ConfigError::InvalidNumber {
            name: "TRENDING_MAX_ATTEMPTS",
            value: max_attempts.to_string(),
        })?;

        let bind_addr = lookup("TRENDING_BIND_ADDR")
            .unwrap_or_else(|| DEFAULT_BIND_ADDR.to_string());
        let bind_addr = bind_addr
            .parse::<SocketAddr>()
            .map_err(|_| ConfigError::InvalidBindAddr(bind_addr))?;

        Ok(Self {
            primary: EndpointCandidate::new(&primary_url, EndpointRole::Primary)?,
            fallback: EndpointCandidate::new(&fallback_url, EndpointRole::Fallback)?,
            max_attempts,
            retry_delay: Duration::from_millis(number("TRENDING_RETRY_DELAY_MS", DEFAULT_RETRY_DELAY_MS)?),
            probe_timeout: Duration::from_millis(number("TRENDING_PROBE_TIMEOUT_MS", DEFAULT_PROBE_TIMEOUT_MS)?),
            fetch_timeout: Duration::from_millis(number("TRENDING_FETCH_TIMEOUT_MS", DEFAULT_FETCH_TIMEOUT_MS)?),
            bind_addr,
            params_file: lookup("TRENDING_PARAMS_FILE").filter(|p| !p.is_empty()).map(PathBuf::from),
            log_dir: lookup("TRENDING_LOG_DIR").filter(|p| !p.is_empty()).map(PathBuf::from),
        })
    }
}
