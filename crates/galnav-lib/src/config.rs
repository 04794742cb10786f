//! Persisted navigation configuration.
//!
//! The configuration remembers the last user-facing query, the routes that
//! were plotted for it, and the service search preferences. It is read when
//! the [`NavigationService`](crate::service::NavigationService) starts and
//! written after every successful resolution.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{Error, Result};
use crate::query::QueryType;
use crate::route::RouteCollection;

/// Default filename for the persisted configuration.
const CONFIG_FILENAME: &str = "navigation.json";

/// Default bound on station distance from the arrival star.
pub const DEFAULT_MAX_STATION_DISTANCE_LS: f64 = 10_000.0;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NavigationConfig {
    pub last_query: Option<QueryType>,
    pub last_arg0: Option<String>,
    pub last_arg1: Option<String>,
    pub last_carrier_destination: Option<String>,
    pub plotted_route: Option<RouteCollection>,
    /// Query that produced `plotted_route`.
    pub plotted_query: Option<QueryType>,
    pub carrier_route: Option<RouteCollection>,
    pub max_station_distance_ls: f64,
    pub prioritize_orbital_stations: bool,
}

impl Default for NavigationConfig {
    fn default() -> Self {
        Self {
            last_query: None,
            last_arg0: None,
            last_arg1: None,
            last_carrier_destination: None,
            plotted_route: None,
            plotted_query: None,
            carrier_route: None,
            max_station_distance_ls: DEFAULT_MAX_STATION_DISTANCE_LS,
            prioritize_orbital_stations: false,
        }
    }
}

/// Storage backend for [`NavigationConfig`].
pub trait ConfigStore: Send + Sync {
    fn load(&self) -> Result<NavigationConfig>;
    fn save(&self, config: &NavigationConfig) -> Result<()>;
}

/// Configuration stored as a JSON file.
#[derive(Debug, Clone)]
pub struct JsonConfigStore {
    path: PathBuf,
}

impl JsonConfigStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Store under the platform configuration directory.
    pub fn at_default_location() -> Result<Self> {
        Ok(Self::new(default_config_path()?))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl ConfigStore for JsonConfigStore {
    /// A missing file yields the default configuration.
    fn load(&self) -> Result<NavigationConfig> {
        if !self.path.exists() {
            debug!(path = %self.path.display(), "no navigation config yet; using defaults");
            return Ok(NavigationConfig::default());
        }
        let bytes = fs::read(&self.path)?;
        serde_json::from_slice(&bytes).map_err(|source| Error::Json {
            path: Some(self.path.clone()),
            source,
        })
    }

    fn save(&self, config: &NavigationConfig) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_vec_pretty(config)?;
        // Write then rename so readers never observe a half-written file.
        let tmp = self.path.with_extension("json.tmp");
        fs::write(&tmp, json)?;
        fs::rename(&tmp, &self.path)?;
        debug!(path = %self.path.display(), "saved navigation config");
        Ok(())
    }
}

/// In-memory configuration, for tests and embedders without persistence.
#[derive(Debug, Default)]
pub struct MemoryConfigStore {
    config: Mutex<NavigationConfig>,
}

impl MemoryConfigStore {
    pub fn new(config: NavigationConfig) -> Self {
        Self {
            config: Mutex::new(config),
        }
    }

    /// Last configuration saved to the store.
    pub fn snapshot(&self) -> NavigationConfig {
        self.config
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .clone()
    }
}

impl ConfigStore for MemoryConfigStore {
    fn load(&self) -> Result<NavigationConfig> {
        Ok(self.snapshot())
    }

    fn save(&self, config: &NavigationConfig) -> Result<()> {
        *self
            .config
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner) = config.clone();
        Ok(())
    }
}

/// Resolve the default config location using platform-specific project directories.
pub fn default_config_path() -> Result<PathBuf> {
    let dirs = ProjectDirs::from("com", "galnav", "galnav").ok_or(Error::ConfigPathUnavailable)?;
    Ok(dirs.config_dir().join(CONFIG_FILENAME))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::SystemPosition;
    use crate::waypoint::Waypoint;
    use tempfile::tempdir;

    #[test]
    fn missing_file_loads_defaults() {
        let dir = tempdir().unwrap();
        let store = JsonConfigStore::new(dir.path().join("nav.json"));
        let config = store.load().unwrap();
        assert_eq!(config, NavigationConfig::default());
        assert_eq!(config.max_station_distance_ls, DEFAULT_MAX_STATION_DISTANCE_LS);
    }

    #[test]
    fn save_then_load_preserves_route() {
        let dir = tempdir().unwrap();
        let store = JsonConfigStore::new(dir.path().join("nested").join("nav.json"));
        let config = NavigationConfig {
            last_query: Some(QueryType::Neutron),
            last_arg0: Some("Colonia".to_string()),
            plotted_route: Some(RouteCollection::from_waypoints(vec![
                Waypoint::at("Sol", 10477373803, SystemPosition::new(0.0, 0.0, 0.0)).into_visited(),
                Waypoint::at("Colonia", 3238296097059, SystemPosition::new(-9530.5, -910.25, 19808.125)),
            ])),
            ..NavigationConfig::default()
        };
        store.save(&config).unwrap();
        assert_eq!(store.load().unwrap(), config);
    }

    #[test]
    fn corrupt_file_reports_path() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("nav.json");
        fs::write(&path, b"{not json").unwrap();
        let err = JsonConfigStore::new(&path).load().unwrap_err();
        assert!(err.to_string().contains("nav.json"));
    }

    #[test]
    fn partial_file_fills_defaults() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("nav.json");
        fs::write(&path, br#"{"last_query": "raw"}"#).unwrap();
        let config = JsonConfigStore::new(&path).load().unwrap();
        assert_eq!(config.last_query, Some(QueryType::Raw));
        assert!(!config.prioritize_orbital_stations);
    }
}
