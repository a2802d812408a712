use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use crate::defs::{DEFAULT_PORT, NPEBBLES};
use crate::logging::{log_info, log_warning};

pub const DEFAULT_CONFIG_PATH: &str = "conf/server.conf";

#[derive(Debug, Clone, PartialEq)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// Pebbles per pit for the first player to sit down.
    pub pebbles: u32,
    /// Where finished games are archived as JSON; `None` disables it.
    pub dump_dir: Option<PathBuf>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: DEFAULT_PORT,
            pebbles: NPEBBLES,
            dump_dir: None,
        }
    }
}

impl ServerConfig {
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, Box<dyn std::error::Error>> {
        let content = fs::read_to_string(path)?;
        Ok(Self::from_map(&parse_config(&content)?))
    }

    fn from_map(config_map: &HashMap<String, String>) -> Self {
        let defaults = Self::default();

        let host = config_map.get("host")
            .cloned()
            .unwrap_or(defaults.host);

        let port = config_map.get("port")
            .and_then(|p| p.parse::<u16>().ok())
            .unwrap_or(defaults.port);

        let pebbles = config_map.get("pebbles")
            .and_then(|p| p.parse::<u32>().ok())
            .filter(|&p| p > 0)
            .unwrap_or(defaults.pebbles);

        let dump_dir = config_map.get("dump_dir")
            .filter(|d| !d.is_empty())
            .map(PathBuf::from);

        ServerConfig { host, port, pebbles, dump_dir }
    }

    pub fn load_or_default() -> Self {
        Self::load_from_or_default(DEFAULT_CONFIG_PATH)
    }

    pub fn load_from_or_default<P: AsRef<Path>>(path: P) -> Self {
        let path = path.as_ref();
        match Self::from_file(path) {
            Ok(config) => {
                log_info(&format!("Loaded configuration from {}", path.display()));
                config
            }
            Err(e) => {
                log_warning(&format!("Could not load config from {}: {e}. Using defaults.", path.display()));
                Self::default()
            }
        }
    }

    pub fn listen_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

fn parse_config(content: &str) -> Result<HashMap<String, String>, Box<dyn std::error::Error>> {
    let mut config = HashMap::new();

    for line in content.lines() {
        let line = line.trim();

        // Skip empty lines and comments
        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        // Parse key = value pairs
        if let Some((key, value)) = line.split_once('=') {
            config.insert(key.trim().to_string(), value.trim().to_string());
        }
    }

    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_parse_config() {
        let content = r#"
            # This is a comment
            host = 192.168.1.100
            port = 8080
            # Another comment
            pebbles = 3
        "#;

        let config = parse_config(content).unwrap();
        assert_eq!(config.get("host"), Some(&"192.168.1.100".to_string()));
        assert_eq!(config.get("port"), Some(&"8080".to_string()));
        assert_eq!(config.get("pebbles"), Some(&"3".to_string()));
    }

    #[test]
    fn test_server_config_default() {
        let config = ServerConfig::default();
        assert_eq!(config.host, "0.0.0.0");
        assert_eq!(config.port, 30000);
        assert_eq!(config.pebbles, 4);
        assert_eq!(config.dump_dir, None);
        assert_eq!(config.listen_addr(), "0.0.0.0:30000");
    }

    #[test]
    fn test_bad_values_fall_back_to_defaults() {
        let map = parse_config("port = lots\npebbles = 0\ndump_dir =\ncolour = red\n").unwrap();
        let config = ServerConfig::from_map(&map);
        assert_eq!(config, ServerConfig::default());
    }

    #[test]
    fn test_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "host = 127.0.0.1\nport = 4242\ndump_dir = data/games").unwrap();

        let config = ServerConfig::from_file(file.path()).unwrap();
        assert_eq!(config.listen_addr(), "127.0.0.1:4242");
        assert_eq!(config.pebbles, 4);
        assert_eq!(config.dump_dir, Some(PathBuf::from("data/games")));
    }

    #[test]
    fn test_missing_file_uses_defaults() {
        let config = ServerConfig::load_from_or_default("/nonexistent/mancala.conf");
        assert_eq!(config, ServerConfig::default());
    }
}
