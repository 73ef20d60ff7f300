use serde::{Deserialize, Serialize};
use std::net::{IpAddr, Ipv4Addr};
use std::path::PathBuf;

use crate::catalog::DEFAULT_PAGES;
use crate::tvmaze::TvMazeConfig;

/// Root configuration. Every section is optional.
#[derive(Debug, Clone, Default, Deserialize, Serialize, PartialEq)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub tvmaze: TvMazeConfig,
    #[serde(default)]
    pub catalog: CatalogConfig,
    #[serde(default)]
    pub storage: StorageConfig,
}

/// Server configuration
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: IpAddr,
    #[serde(default = "default_port")]
    pub port: u16,
    /// Built dashboard served for non-API paths.
    #[serde(default = "default_dashboard_dir")]
    pub dashboard_dir: PathBuf,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            dashboard_dir: default_dashboard_dir(),
        }
    }
}

fn default_host() -> IpAddr {
    IpAddr::V4(Ipv4Addr::UNSPECIFIED)
}

fn default_port() -> u16 {
    8080
}

fn default_dashboard_dir() -> PathBuf {
    PathBuf::from("dashboard/dist")
}

/// Catalog engine configuration
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
pub struct CatalogConfig {
    /// Pages loaded when no explicit pages are requested.
    #[serde(default = "default_pages")]
    pub default_pages: Vec<u32>,
    /// Load the default pages at startup.
    #[serde(default = "default_preload")]
    pub preload: bool,
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            default_pages: default_pages(),
            preload: default_preload(),
        }
    }
}

fn default_pages() -> Vec<u32> {
    DEFAULT_PAGES.to_vec()
}

fn default_preload() -> bool {
    true
}

/// Persistent list storage configuration
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
pub struct StorageConfig {
    /// Directory holding one JSON file per collection.
    #[serde(default = "default_storage_dir")]
    pub dir: PathBuf,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            dir: default_storage_dir(),
        }
    }
}

fn default_storage_dir() -> PathBuf {
    PathBuf::from("data")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_config_uses_defaults() {
        let config: Config = toml::from_str("").unwrap();
        assert_eq!(config, Config::default());
        assert_eq!(config.server.port, 8080);
        assert_eq!(config.server.host.to_string(), "0.0.0.0");
        assert_eq!(config.tvmaze.base_url, "https://api.tvmaze.com");
        assert_eq!(config.catalog.default_pages, vec![0, 1, 2, 3, 4]);
        assert!(config.catalog.preload);
        assert_eq!(config.storage.dir, PathBuf::from("data"));
    }

    #[test]
    fn test_partial_section_keeps_other_defaults() {
        let config: Config = toml::from_str(
            r#"
[catalog]
preload = false
"#,
        )
        .unwrap();
        assert!(!config.catalog.preload);
        assert_eq!(config.catalog.default_pages, vec![0, 1, 2, 3, 4]);
    }
}
