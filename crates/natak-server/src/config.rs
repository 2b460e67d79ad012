//! Server configuration from the environment.

use anyhow::Context;
use std::net::SocketAddr;
use std::time::Duration;

const DEFAULT_ADDR: &str = "0.0.0.0:8080";
const DEFAULT_TTL_SECS: u64 = 24 * 60 * 60;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    pub addr: SocketAddr,
    /// How long an untouched game is kept
    pub game_ttl: Duration,
}

impl ServerConfig {
    /// Read `SERVER_ADDR` and `GAME_TTL_SECS`
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_vars(
            std::env::var("SERVER_ADDR").ok(),
            std::env::var("GAME_TTL_SECS").ok(),
        )
    }

    fn from_vars(addr: Option<String>, ttl: Option<String>) -> anyhow::Result<Self> {
        let addr = addr.as_deref().unwrap_or(DEFAULT_ADDR);
        let addr = addr
            .parse()
            .with_context(|| format!("invalid SERVER_ADDR {addr:?}"))?;

        let ttl = match ttl {
            Some(secs) => secs
                .parse()
                .with_context(|| format!("invalid GAME_TTL_SECS {secs:?}"))?,
            None => DEFAULT_TTL_SECS,
        };

        Ok(Self {
            addr,
            game_ttl: Duration::from_secs(ttl),
        })
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            addr: SocketAddr::from(([0, 0, 0, 0], 8080)),
            game_ttl: Duration::from_secs(DEFAULT_TTL_SECS),
        }
    }
}
