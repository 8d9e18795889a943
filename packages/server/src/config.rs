//! Server configuration from environment variables.

use std::path::PathBuf;

/// Default address the HTTP server binds to.
pub const DEFAULT_BIND_ADDR: &str = "127.0.0.1";
/// Default HTTP port.
pub const DEFAULT_PORT: u16 = 8080;
/// Default migration flow CSV location.
pub const DEFAULT_FLOWS_PATH: &str = "data/IND_5yrs_InternalMigFlows_2010.csv";
/// Default state boundary `GeoJSON` location.
pub const DEFAULT_BOUNDARIES_PATH: &str = "data/india_states.geojson";
/// Default feature property holding the state name.
pub const DEFAULT_NAME_PROPERTY: &str = "state";
/// Default directory of frontend static files.
pub const DEFAULT_STATIC_DIR: &str = "static";

/// Everything needed to load data and start serving.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    /// Address to bind (`BIND_ADDR`).
    pub bind_addr: String,
    /// Port to bind (`PORT`).
    pub port: u16,
    /// Migration flow CSV (`MIGRATION_FLOWS_PATH`).
    pub flows_path: PathBuf,
    /// State boundary `GeoJSON` (`STATE_BOUNDARIES_PATH`).
    pub boundaries_path: PathBuf,
    /// Feature property with the state name (`STATE_NAME_PROPERTY`).
    pub name_property: String,
    /// Frontend static files (`STATIC_DIR`).
    pub static_dir: PathBuf,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self::from_lookup(|_| None)
    }
}

impl ServerConfig {
    /// Reads the configuration from the process environment, falling back
    /// to defaults for unset or unparseable values.
    #[must_use]
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the configuration from an arbitrary key lookup.
    #[must_use]
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        Self {
            bind_addr: lookup("BIND_ADDR").unwrap_or_else(|| DEFAULT_BIND_ADDR.to_string()),
            port: lookup("PORT")
                .and_then(|p| p.parse().ok())
                .unwrap_or(DEFAULT_PORT),
            flows_path: lookup("MIGRATION_FLOWS_PATH")
                .map_or_else(|| PathBuf::from(DEFAULT_FLOWS_PATH), PathBuf::from),
            boundaries_path: lookup("STATE_BOUNDARIES_PATH")
                .map_or_else(|| PathBuf::from(DEFAULT_BOUNDARIES_PATH), PathBuf::from),
            name_property: lookup("STATE_NAME_PROPERTY")
                .unwrap_or_else(|| DEFAULT_NAME_PROPERTY.to_string()),
            static_dir: lookup("STATIC_DIR")
                .map_or_else(|| PathBuf::from(DEFAULT_STATIC_DIR), PathBuf::from),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    #[test]
    fn defaults_when_unset() {
        let config = ServerConfig::default();
        assert_eq!(config.bind_addr, DEFAULT_BIND_ADDR);
        assert_eq!(config.port, DEFAULT_PORT);
        assert_eq!(config.flows_path, PathBuf::from(DEFAULT_FLOWS_PATH));
        assert_eq!(config.name_property, "state");
    }

    #[test]
    fn reads_overrides() {
        let env = BTreeMap::from([
            ("BIND_ADDR", "0.0.0.0"),
            ("PORT", "5000"),
            ("STATE_BOUNDARIES_PATH", "/srv/states.geojson"),
            ("STATE_NAME_PROPERTY", "ST_NM"),
        ]);
        let config = ServerConfig::from_lookup(|key| env.get(key).map(ToString::to_string));

        assert_eq!(config.bind_addr, "0.0.0.0");
        assert_eq!(config.port, 5000);
        assert_eq!(config.boundaries_path, PathBuf::from("/srv/states.geojson"));
        assert_eq!(config.name_property, "ST_NM");
    }

    #[test]
    fn invalid_port_falls_back() {
        let config = ServerConfig::from_lookup(|key| (key == "PORT").then(|| "http".to_string()));
        assert_eq!(config.port, DEFAULT_PORT);
    }
}
