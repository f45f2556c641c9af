//! Process-wide settings, read once at startup from `.env` and the environment.

use std::{net::SocketAddr, time::Duration};

use anyhow::Context;

/// A participant whose last heartbeat is at least this old gets evicted by the
/// next sweep.
pub const STALE_AFTER: Duration = Duration::from_secs(10);

/// Period of the liveness sweep. With [`STALE_AFTER`] this bounds how long an
/// idle participant can linger to `STALE_AFTER + SWEEP_EVERY`.
pub const SWEEP_EVERY: Duration = Duration::from_secs(15);

const DEFAULT_DATABASE: &str = "chat";
const DEFAULT_PORT: u16 = 5000;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub database_url: String,
    pub port: u16,
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_lookup(|key| dotenv::var(key).ok())
    }

    /// `DATABASE_URL` wins when set; otherwise the store is a SQLite file
    /// named after `DATABASE`.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> anyhow::Result<Self> {
        let database_url = match lookup("DATABASE_URL") {
            Some(url) => url,
            None => {
                let name = lookup("DATABASE").unwrap_or_else(|| DEFAULT_DATABASE.to_owned());
                format!("sqlite://{name}.db?mode=rwc")
            }
        };

        let port = match lookup("PORT") {
            Some(port) => port
                .parse::<u16>()
                .with_context(|| format!("PORT={port} is not a valid port"))?,
            None => DEFAULT_PORT,
        };

        Ok(Config { database_url, port })
    }

    pub fn listen_addr(&self) -> SocketAddr {
        SocketAddr::from(([0, 0, 0, 0], self.port))
    }
}
