//! Settings of the `landed` binary.
//!
//! Read from `config/landed.toml` when present, then overridden by
//! `LANDED_*` environment variables (`LANDED_SERVER__PORT=8080`).

use std::net::SocketAddr;

use config::{Config, ConfigError, Environment, File};
use engine::{Currency, CurrencyPair, EngineError};
use serde::Deserialize;

#[derive(Debug, Deserialize)]
pub struct App {
    pub level: String,
}

#[derive(Debug, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Database {
    Memory,
    Sqlite(String),
}

impl Database {
    pub fn url(&self) -> String {
        match self {
            Database::Memory => String::from("sqlite::memory:"),
            Database::Sqlite(path) => format!("sqlite:{path}?mode=rwc"),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct Server {
    pub bind: String,
    pub port: u16,
    pub database: Database,
}

impl Server {
    pub fn addr(&self) -> Result<SocketAddr, std::net::AddrParseError> {
        format!("{}:{}", self.bind, self.port).parse()
    }
}

/// Currency codes printed on reports, such as `"USD"` or `"RM"`.
#[derive(Debug, Deserialize)]
pub struct Currencies {
    pub foreign: String,
    pub local: String,
}

impl Currencies {
    pub fn pair(&self) -> Result<CurrencyPair, EngineError> {
        Ok(CurrencyPair {
            foreign: Currency::try_from(self.foreign.as_str())?,
            local: Currency::try_from(self.local.as_str())?,
        })
    }
}

#[derive(Debug, Deserialize)]
pub struct Settings {
    pub app: App,
    pub server: Server,
    pub currency: Currencies,
}

impl Settings {
    pub fn new() -> Result<Self, ConfigError> {
        Self::from_builder(
            Config::builder()
                .add_source(File::with_name("config/landed").required(false))
                .add_source(
                    Environment::with_prefix("LANDED")
                        .separator("__")
                        .try_parsing(true),
                ),
        )
    }

    fn from_builder(
        builder: config::ConfigBuilder<config::builder::DefaultState>,
    ) -> Result<Self, ConfigError> {
        builder
            .set_default("app.level", "info")?
            .set_default("server.bind", "127.0.0.1")?
            .set_default("server.port", 3000)?
            .set_default("server.database", "memory")?
            .set_default("currency.foreign", "USD")?
            .set_default("currency.local", "MYR")?
            .build()?
            .try_deserialize()
    }
}
