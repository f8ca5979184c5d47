//! CLI configuration

use std::{path::PathBuf, time::Duration};

use clap::Args;
use jiff::SignedDuration;
use rusty_money::iso::Currency;
use tote::{
    brands::BrandId,
    money::currency_from_code,
    persistence::{FileStorage, PersistedStore},
    session::CartSession,
};

/// Log output format.
#[derive(Clone, Copy, Debug, clap::ValueEnum)]
pub(crate) enum LogFormat {
    /// Compact, human-readable logs.
    Compact,

    /// Structured JSON logs.
    Json,
}

/// Logging settings.
#[derive(Debug, Args)]
pub(crate) struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    #[arg(short, long, global = true, env = "RUST_LOG", default_value = "info")]
    pub(crate) log_level: String,

    /// Log format (compact, json)
    #[arg(long, global = true, env = "LOG_FORMAT", value_enum, default_value_t = LogFormat::Compact)]
    pub(crate) log_format: LogFormat,
}

/// Where and how carts are persisted.
#[derive(Debug, Args)]
pub(crate) struct StoreConfig {
    /// Directory holding persisted carts
    #[arg(long, global = true, env = "TOTE_STORE_DIR", default_value = ".tote")]
    pub(crate) store_dir: PathBuf,

    /// Brand whose cart to use
    #[arg(long, global = true, env = "TOTE_BRAND", default_value = "default")]
    pub(crate) brand: BrandId,

    /// ISO code of the cart currency
    #[arg(
        long,
        global = true,
        env = "TOTE_CURRENCY",
        default_value = "BRL",
        value_parser = currency_from_code
    )]
    pub(crate) currency: &'static Currency,

    /// Hours a persisted cart stays usable after its last change
    #[arg(long, global = true, env = "TOTE_TTL_HOURS", default_value_t = 6)]
    pub(crate) ttl_hours: u16,

    /// Milliseconds to wait for the persisted cart before starting empty
    #[arg(long, global = true, env = "TOTE_HYDRATION_TIMEOUT_MS", default_value_t = 2000)]
    pub(crate) hydration_timeout_ms: u64,
}

impl StoreConfig {
    /// A fresh, still hydrating session over the configured brand's file.
    pub(crate) fn open(&self) -> CartSession<FileStorage> {
        let store = PersistedStore::for_brand(FileStorage::new(&self.store_dir), &self.brand)
            .with_ttl(SignedDuration::from_hours(i64::from(self.ttl_hours)));

        CartSession::new(store, self.currency)
    }

    pub(crate) fn hydration_timeout(&self) -> Duration {
        Duration::from_millis(self.hydration_timeout_ms)
    }
}
