//! Runtime settings loaded via OrthoConfig.
//!
//! Values come from CLI flags, `CAMPUS_TRADE_*` environment variables, and an
//! optional configuration file, in that order of precedence.

use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::path::PathBuf;

use ortho_config::OrthoConfig;
use serde::Deserialize;

use campus_trade::domain::ListingRules;
use campus_trade::outbound::persistence::PoolConfig;

const DEFAULT_PORT: u16 = 5000;
const DEFAULT_UPLOAD_DIR: &str = "uploads";

/// Errors found while interpreting loaded settings.
#[derive(Debug, thiserror::Error)]
pub enum SettingsError {
    #[error("invalid host {value:?}: {source}")]
    Host {
        value: String,
        #[source]
        source: std::net::AddrParseError,
    },
    #[error("jwt_secret_file must be set")]
    MissingJwtSecret,
}

/// Server settings.
#[derive(Debug, Clone, Deserialize, OrthoConfig)]
#[ortho_config(prefix = "CAMPUS_TRADE")]
pub struct AppSettings {
    /// Interface to bind; defaults to all interfaces.
    pub host: Option<String>,
    /// Port to bind.
    pub port: Option<u16>,
    /// PostgreSQL URL. In-memory adapters are used when absent.
    pub database_url: Option<String>,
    /// Upper bound on pooled database connections.
    pub db_max_connections: Option<u32>,
    /// Directory holding uploaded images.
    pub upload_dir: Option<PathBuf>,
    /// File containing the shared JWT signing secret.
    pub jwt_secret_file: Option<PathBuf>,
    /// JSON seller seed for the in-memory directory.
    pub seller_seed_file: Option<PathBuf>,
    /// Comma-separated origins allowed to open the live socket.
    pub allowed_origins: Option<String>,
    /// Accept `http://localhost:<port>` origins; defaults on in debug builds.
    pub allow_localhost_origins: Option<bool>,
    /// Comma-separated category override.
    pub categories: Option<String>,
    /// Comma-separated meetup location override.
    pub meetup_locations: Option<String>,
}

fn split_list(raw: Option<&str>) -> Vec<String> {
    raw.map(|value| {
        value
            .split(',')
            .map(str::trim)
            .filter(|item| !item.is_empty())
            .map(str::to_owned)
            .collect()
    })
    .unwrap_or_default()
}

impl AppSettings {
    /// Socket address to bind.
    pub fn bind_addr(&self) -> Result<SocketAddr, SettingsError> {
        let ip = match self.host.as_deref() {
            None => IpAddr::V4(Ipv4Addr::UNSPECIFIED),
            Some(value) => value.parse().map_err(|source| SettingsError::Host {
                value: value.to_owned(),
                source,
            })?,
        };
        Ok(SocketAddr::new(ip, self.port.unwrap_or(DEFAULT_PORT)))
    }

    /// Pool settings for `database_url`, when one is configured.
    pub fn pool_config(&self) -> Option<PoolConfig> {
        let config = PoolConfig::new(self.database_url.as_deref()?);
        Some(match self.db_max_connections {
            Some(max) => config.with_max_size(max.max(1)),
            None => config,
        })
    }

    pub fn upload_dir(&self) -> PathBuf {
        self.upload_dir
            .clone()
            .unwrap_or_else(|| PathBuf::from(DEFAULT_UPLOAD_DIR))
    }

    pub fn jwt_secret_file(&self) -> Result<&PathBuf, SettingsError> {
        self.jwt_secret_file
            .as_ref()
            .ok_or(SettingsError::MissingJwtSecret)
    }

    pub fn allowed_origins(&self) -> Vec<String> {
        split_list(self.allowed_origins.as_deref())
    }

    pub fn allow_localhost_origins(&self) -> bool {
        self.allow_localhost_origins
            .unwrap_or(cfg!(debug_assertions))
    }

    /// Listing rules with any configured vocabulary overrides applied.
    pub fn listing_rules(&self) -> ListingRules {
        ListingRules::default()
            .with_categories(split_list(self.categories.as_deref()))
            .with_meetup_locations(split_list(self.meetup_locations.as_deref()))
    }
}
