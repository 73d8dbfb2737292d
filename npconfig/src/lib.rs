//! # NowPlaying Configuration Module
//!
//! This module provides configuration management for the now-playing
//! pipeline, including:
//! - Loading configuration from YAML files
//! - Merging with embedded default configuration
//! - Environment variable overrides
//! - Type-safe getters for configuration values
//! - Thread-safe singleton access pattern
//!
//! ## Usage
//!
//! ```no_run
//! use npconfig::get_config;
//!
//! // Get the global configuration
//! let config = get_config();
//!
//! // Access configuration values
//! let port = config.get_http_port();
//! let stale_after = config.get_stale_after_ms()?;
//!
//! // Update configuration values
//! config.set_http_port(9000)?;
//! # Ok::<(), anyhow::Error>(())
//! ```

use anyhow::{anyhow, Result};
use dirs::home_dir;
use lazy_static::lazy_static;
use serde_yaml::{Mapping, Number, Value};
use std::{
    env, fs,
    path::Path,
    sync::{Arc, Mutex, MutexGuard},
};
use tracing::info;

// Embedded default configuration
const DEFAULT_CONFIG: &str = include_str!("nowplaying.yaml");

lazy_static! {
    static ref CONFIG: Arc<Config> =
        Arc::new(Config::load_config("").expect("Failed to load NowPlaying configuration"));
}

const ENV_CONFIG_DIR: &str = "NOWPLAYING_CONFIG";
const ENV_PREFIX: &str = "NOWPLAYING_CONFIG__";
const CONFIG_DIR_NAME: &str = ".nowplaying";

// Default values for configuration
const DEFAULT_HTTP_PORT: u16 = 27123;
const DEFAULT_BIND_ADDRESS: &str = "127.0.0.1";
const DEFAULT_LOG_BUFFER_CAPACITY: usize = 1000;
const DEFAULT_LOG_MIN_LEVEL: &str = "INFO";
const DEFAULT_LOG_ENABLE_CONSOLE: bool = true;
const DEFAULT_MAX_BODY_BYTES: usize = 100 * 1024;
const DEFAULT_STALE_AFTER_MS: u64 = 15_000;
const DEFAULT_READER_POLL_MS: u64 = 250;
const DEFAULT_READER_STATE_URL: &str = "http://127.0.0.1:27123/state";
const DEFAULT_OBSERVER_SOURCE: &str = "youtube";
const DEFAULT_MEDIA_SELECTOR: &str = "video";
const DEFAULT_HEARTBEAT_MS: u64 = 750;
const DEFAULT_REHOOK_MS: u64 = 3_000;
const DEFAULT_MIN_SEND_GAP_MS: u64 = 350;
const DEFAULT_PAUSED_REFRESH_MS: u64 = 1_500;
const DEFAULT_RELAY_INGEST_URL: &str = "http://127.0.0.1:27123/update";
const DEFAULT_RELAY_TIMEOUT_MS: u64 = 2_000;

/// Generates a typed getter that falls back to `$default` when the stored
/// value has the wrong shape.
macro_rules! config_getter {
    ($getter:ident: usize, $path:expr, $default:expr) => {
        pub fn $getter(&self) -> Result<usize> {
            Ok(match self.get_value($path)? {
                Value::Number(n) => n.as_u64().map(|v| v as usize).unwrap_or($default),
                _ => $default,
            })
        }
    };
    ($getter:ident: u64, $path:expr, $default:expr) => {
        pub fn $getter(&self) -> Result<u64> {
            Ok(match self.get_value($path)? {
                Value::Number(n) => n.as_u64().unwrap_or($default),
                _ => $default,
            })
        }
    };
    ($getter:ident: bool, $path:expr, $default:expr) => {
        pub fn $getter(&self) -> Result<bool> {
            Ok(match self.get_value($path)? {
                Value::Bool(b) => b,
                _ => $default,
            })
        }
    };
    ($getter:ident: String, $path:expr, $default:expr) => {
        pub fn $getter(&self) -> Result<String> {
            Ok(match self.get_value($path)? {
                Value::String(s) if !s.is_empty() => s,
                _ => $default.to_string(),
            })
        }
    };
}

/// Configuration manager for NowPlaying
///
/// This structure manages the application configuration, including:
/// - Loading configuration from YAML files
/// - Merging with default configuration
/// - Handling environment variable overrides
/// - Providing typed getters for configuration values
#[derive(Debug)]
pub struct Config {
    config_dir: String,
    path: String,
    data: Mutex<Value>,
}

// Manual Clone implementation
impl Clone for Config {
    fn clone(&self) -> Self {
        let data = self
            .data
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone();
        Self {
            config_dir: self.config_dir.clone(),
            path: self.path.clone(),
            data: Mutex::new(data),
        }
    }
}

impl Config {
    /// Finds a config directory by trying different locations in order
    fn find_config_dir(directory: &str) -> String {
        // 1. Try provided directory
        if !directory.is_empty() {
            return directory.to_string();
        }

        // 2. Try environment variable
        if let Ok(env_path) = env::var(ENV_CONFIG_DIR) {
            info!(env_var=ENV_CONFIG_DIR, path=%env_path, "Trying to load config from env");
            return env_path;
        }

        // 3. Try current directory
        if Path::new(CONFIG_DIR_NAME).exists() {
            return CONFIG_DIR_NAME.to_string();
        }

        // 4. Try home directory
        if let Some(home) = home_dir() {
            let home_config = home.join(CONFIG_DIR_NAME);
            if home_config.exists() {
                return home_config.to_string_lossy().to_string();
            }
        }

        // Default fallback
        CONFIG_DIR_NAME.to_string()
    }

    /// Validates and prepares a config directory
    fn validate_config_dir(path: &Path) -> Result<()> {
        // Create if doesn't exist
        if !path.exists() {
            fs::create_dir_all(path)?;
        }

        // Verify it's a directory
        if !path.is_dir() {
            return Err(anyhow!(
                "Config path {} is not a directory",
                path.display()
            ));
        }

        // Test write permission
        let test_file = path.join(".write_test");
        fs::write(&test_file, b"test")?;
        fs::remove_file(&test_file)?;

        // Test read permission
        fs::read_dir(path)?;

        Ok(())
    }

    /// Determines and validates the configuration directory
    ///
    /// The directory is searched in the following order:
    /// 1. The provided `directory` parameter if not empty
    /// 2. The `NOWPLAYING_CONFIG` environment variable
    /// 3. `.nowplaying` in the current directory
    /// 4. `.nowplaying` in the user's home directory
    ///
    /// The directory is created if it doesn't exist, and validated for read/write permissions.
    pub fn config_dir(directory: &str) -> Result<String> {
        let dir_path = Self::find_config_dir(directory);
        Self::validate_config_dir(Path::new(&dir_path))?;
        Ok(dir_path)
    }

    /// Loads the configuration from the specified directory
    ///
    /// This method:
    /// 1. Determines the configuration directory
    /// 2. Loads the default embedded configuration
    /// 3. Merges it with the external config.yaml file if present
    /// 4. Applies environment variable overrides
    /// 5. Saves the merged configuration
    pub fn load_config(directory: &str) -> Result<Self> {
        let config_dir = Self::config_dir(directory)?;
        info!(config_dir=%config_dir, "Using config directory");

        let config_file_path = Path::new(&config_dir).join("config.yaml");
        let path = config_file_path.to_string_lossy().to_string();

        let mut default_value: Value = serde_yaml::from_str(DEFAULT_CONFIG)?;

        let yaml_data = if let Ok(data) = fs::read(&path) {
            info!(config_file=%path, "Loaded config file");
            data
        } else {
            info!(config_file=%path, "Config file not found, using default embedded config");
            DEFAULT_CONFIG.as_bytes().to_vec()
        };

        let external_value: Value = serde_yaml::from_slice(&yaml_data)?;
        merge_yaml(&mut default_value, &external_value);
        let mut config_value = Self::lower_keys_value(default_value);

        Self::apply_overrides(&mut config_value, env::vars());

        let config = Config {
            config_dir,
            path,
            data: Mutex::new(config_value),
        };

        config.save()?;
        Ok(config)
    }

    fn lock(&self) -> Result<MutexGuard<'_, Value>> {
        self.data
            .lock()
            .map_err(|_| anyhow!("Configuration lock poisoned"))
    }

    /// Returns the directory holding `config.yaml`
    pub fn directory(&self) -> &str {
        &self.config_dir
    }

    /// Saves the current configuration to the config.yaml file
    pub fn save(&self) -> Result<()> {
        let yaml = {
            let data = self.lock()?;
            serde_yaml::to_string(&*data)?
        };
        fs::write(&self.path, yaml)?;
        Ok(())
    }

    /// Sets a configuration value at the specified path and saves it
    ///
    /// # Arguments
    ///
    /// * `path` - Array of keys representing the path (e.g., `&["host", "http_port"]`)
    /// * `value` - The YAML value to set
    pub fn set_value(&self, path: &[&str], value: Value) -> Result<()> {
        {
            let mut data = self.lock()?;
            Self::set_value_internal(&mut data, path, value)?;
        }
        self.save()
    }

    fn set_value_internal(data: &mut Value, path: &[&str], value: Value) -> Result<()> {
        if path.is_empty() {
            *data = value;
            return Ok(());
        }
        if let Value::Mapping(map) = data {
            let key_value = Value::String(path[0].to_lowercase());
            if path.len() == 1 {
                map.insert(key_value, value);
            } else {
                let entry = map
                    .entry(key_value)
                    .or_insert(Value::Mapping(Mapping::new()));
                Self::set_value_internal(entry, &path[1..], value)?;
            }
            Ok(())
        } else {
            Err(anyhow!("Current node is not a map"))
        }
    }

    /// Gets a configuration value at the specified path
    ///
    /// Returns an error if the path doesn't exist.
    pub fn get_value(&self, path: &[&str]) -> Result<Value> {
        let data = self.lock()?;
        Self::get_value_internal(&data, path)
    }

    fn get_value_internal(data: &Value, path: &[&str]) -> Result<Value> {
        let mut current = data;
        for (i, key) in path.iter().enumerate() {
            if let Value::Mapping(map) = current {
                if let Some(next) = map.get(&Value::String(key.to_lowercase())) {
                    current = next;
                } else {
                    return Err(anyhow!("Path {} does not exist", path[..=i].join(".")));
                }
            } else {
                return Err(anyhow!("Path {} is not a Config", path[..i].join(".")));
            }
        }
        Ok(current.clone())
    }

    /// Applies `NOWPLAYING_CONFIG__SECTION__KEY=value` overrides
    fn apply_overrides(config: &mut Value, vars: impl IntoIterator<Item = (String, String)>) {
        for (key, value) in vars {
            if let Some(stripped) = key.strip_prefix(ENV_PREFIX) {
                let key_path = stripped.split("__").collect::<Vec<_>>();
                let yaml_value = Self::convert_env_value(&value);
                let _ = Self::set_value_internal(config, &key_path, yaml_value);
            }
        }
    }

    fn convert_env_value(value: &str) -> Value {
        if let Ok(parsed) = serde_yaml::from_str::<Value>(value) {
            return parsed;
        }
        Value::String(value.to_string())
    }

    fn lower_keys_value(value: Value) -> Value {
        match value {
            Value::Mapping(map) => {
                let mut new_map = Mapping::new();
                for (k, v) in map {
                    let new_key = match k {
                        Value::String(s) => Value::String(s.to_lowercase()),
                        other => other,
                    };
                    new_map.insert(new_key, Self::lower_keys_value(v));
                }
                Value::Mapping(new_map)
            }
            Value::Sequence(seq) => {
                Value::Sequence(seq.into_iter().map(Self::lower_keys_value).collect())
            }
            _ => value,
        }
    }

    /// Gets the HTTP port from configuration
    ///
    /// Returns the configured HTTP port, or the default port (27123) if not configured or invalid.
    pub fn get_http_port(&self) -> u16 {
        match self.get_value(&["host", "http_port"]) {
            Ok(Value::Number(n)) => match n.as_u64().and_then(|p| u16::try_from(p).ok()) {
                Some(port) => port,
                None => {
                    tracing::warn!("Invalid HTTP port {}, using default {}", n, DEFAULT_HTTP_PORT);
                    DEFAULT_HTTP_PORT
                }
            },
            Ok(Value::String(s)) => match s.parse::<u16>() {
                Ok(port) => port,
                Err(_) => {
                    tracing::warn!(
                        "Invalid HTTP port '{}', using default {}",
                        s,
                        DEFAULT_HTTP_PORT
                    );
                    DEFAULT_HTTP_PORT
                }
            },
            Ok(_) => {
                tracing::warn!(
                    "HTTP port not a number or string, using default {}",
                    DEFAULT_HTTP_PORT
                );
                DEFAULT_HTTP_PORT
            }
            Err(err) => {
                tracing::warn!(
                    "Failed to get HTTP port: {}, using default {}",
                    err,
                    DEFAULT_HTTP_PORT
                );
                DEFAULT_HTTP_PORT
            }
        }
    }

    /// Sets the HTTP port in configuration
    pub fn set_http_port(&self, port: u16) -> Result<()> {
        let n = Number::from(port);
        self.set_value(&["host", "http_port"], Value::Number(n))
    }

    /// Gets the address the HTTP server binds to (loopback by default)
    pub fn get_bind_address(&self) -> String {
        match self.get_value(&["host", "bind_address"]) {
            Ok(Value::String(s)) if !s.is_empty() => s,
            _ => DEFAULT_BIND_ADDRESS.to_string(),
        }
    }

    /// Gets the base URL advertised for the HTTP server
    ///
    /// Falls back to `http://<bind_address>:<http_port>` when not configured.
    pub fn get_base_url(&self) -> String {
        match self.get_value(&["host", "base_url"]) {
            Ok(Value::String(s)) if !s.is_empty() => s,
            _ => format!("http://{}:{}", self.get_bind_address(), self.get_http_port()),
        }
    }

    config_getter!(get_log_cache_size: usize, &["host", "logger", "buffer_capacity"], DEFAULT_LOG_BUFFER_CAPACITY);

    config_getter!(get_log_enable_console: bool, &["host", "logger", "enable_console"], DEFAULT_LOG_ENABLE_CONSOLE);

    config_getter!(get_log_min_level: String, &["host", "logger", "min_level"], DEFAULT_LOG_MIN_LEVEL);

    config_getter!(get_max_body_bytes: usize, &["store", "max_body_bytes"], DEFAULT_MAX_BODY_BYTES);

    config_getter!(get_stale_after_ms: u64, &["store", "stale_after_ms"], DEFAULT_STALE_AFTER_MS);

    config_getter!(get_reader_poll_ms: u64, &["reader", "poll_interval_ms"], DEFAULT_READER_POLL_MS);

    config_getter!(get_reader_state_url: String, &["reader", "state_url"], DEFAULT_READER_STATE_URL);

    config_getter!(get_observer_source: String, &["observer", "source"], DEFAULT_OBSERVER_SOURCE);

    config_getter!(get_media_selector: String, &["observer", "media_selector"], DEFAULT_MEDIA_SELECTOR);

    config_getter!(get_heartbeat_ms: u64, &["observer", "heartbeat_ms"], DEFAULT_HEARTBEAT_MS);

    config_getter!(get_rehook_ms: u64, &["observer", "rehook_ms"], DEFAULT_REHOOK_MS);

    config_getter!(get_min_send_gap_ms: u64, &["observer", "min_send_gap_ms"], DEFAULT_MIN_SEND_GAP_MS);

    config_getter!(get_paused_refresh_ms: u64, &["observer", "paused_refresh_ms"], DEFAULT_PAUSED_REFRESH_MS);

    config_getter!(get_relay_ingest_url: String, &["relay", "ingest_url"], DEFAULT_RELAY_INGEST_URL);

    config_getter!(get_relay_timeout_ms: u64, &["relay", "request_timeout_ms"], DEFAULT_RELAY_TIMEOUT_MS);
}

/// Returns the global configuration instance
///
/// This function provides access to the singleton configuration instance,
/// which is lazily loaded on first access.
pub fn get_config() -> Arc<Config> {
    CONFIG.clone()
}

/// Merges external YAML configuration into default configuration
///
/// - For mappings (objects), it merges keys from external into default
/// - For scalars and sequences, external values replace default values
fn merge_yaml(default: &mut Value, external: &Value) {
    match (default, external) {
        (Value::Mapping(dmap), Value::Mapping(emap)) => {
            for (k, v) in emap {
                match dmap.get_mut(k) {
                    Some(dv) => merge_yaml(dv, v),
                    None => {
                        dmap.insert(k.clone(), v.clone());
                    }
                }
            }
        }
        (d, e) => *d = e.clone(), // scalars and sequences are replaced
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn load_in_tempdir() -> (tempfile::TempDir, Config) {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::load_config(dir.path().to_str().unwrap()).unwrap();
        (dir, config)
    }

    #[test]
    fn test_defaults() {
        let (_dir, config) = load_in_tempdir();
        assert_eq!(config.get_bind_address(), "127.0.0.1");
        assert_eq!(config.get_max_body_bytes().unwrap(), 102_400);
        assert_eq!(config.get_stale_after_ms().unwrap(), 15_000);
        assert_eq!(config.get_reader_poll_ms().unwrap(), 250);
        assert_eq!(config.get_media_selector().unwrap(), "video");
        assert_eq!(config.get_heartbeat_ms().unwrap(), 750);
        assert_eq!(config.get_rehook_ms().unwrap(), 3_000);
        assert_eq!(config.get_min_send_gap_ms().unwrap(), 350);
        assert_eq!(config.get_paused_refresh_ms().unwrap(), 1_500);
        assert_eq!(
            config.get_relay_ingest_url().unwrap(),
            "http://127.0.0.1:27123/update"
        );
    }

    #[test]
    fn test_merged_config_is_saved() {
        let (dir, config) = load_in_tempdir();
        config.set_http_port(9000).unwrap();

        let reloaded = Config::load_config(dir.path().to_str().unwrap()).unwrap();
        // Env overrides could shadow the port on a developer machine.
        if env::var(format!("{ENV_PREFIX}HOST__HTTP_PORT")).is_err() {
            assert_eq!(reloaded.get_http_port(), 9000);
        }
        assert!(dir.path().join("config.yaml").exists());
    }

    #[test]
    fn test_external_file_merges_over_defaults() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(
            dir.path().join("config.yaml"),
            "Store:\n  Stale_After_Ms: 5000\n",
        )
        .unwrap();

        let config = Config::load_config(dir.path().to_str().unwrap()).unwrap();
        assert_eq!(config.get_stale_after_ms().unwrap(), 5_000);
        assert_eq!(config.get_max_body_bytes().unwrap(), 102_400);
    }

    #[test]
    fn test_overrides_parse_yaml_values() {
        let mut value: Value = serde_yaml::from_str(DEFAULT_CONFIG).unwrap();
        Config::apply_overrides(
            &mut value,
            vec![
                (format!("{ENV_PREFIX}OBSERVER__HEARTBEAT_MS"), "500".to_string()),
                (format!("{ENV_PREFIX}RELAY__INGEST_URL"), "http://x/update".to_string()),
                ("UNRELATED".to_string(), "1".to_string()),
            ],
        );

        let heartbeat = Config::get_value_internal(&value, &["observer", "heartbeat_ms"]).unwrap();
        assert_eq!(heartbeat, Value::Number(Number::from(500)));
        let url = Config::get_value_internal(&value, &["relay", "ingest_url"]).unwrap();
        assert_eq!(url, Value::String("http://x/update".to_string()));
    }

    #[test]
    fn test_invalid_values_fall_back_to_defaults() {
        let (_dir, config) = load_in_tempdir();
        config
            .set_value(&["host", "http_port"], Value::String("not-a-port".into()))
            .unwrap();
        assert_eq!(config.get_http_port(), DEFAULT_HTTP_PORT);

        config
            .set_value(&["observer", "heartbeat_ms"], Value::String("fast".into()))
            .unwrap();
        assert_eq!(config.get_heartbeat_ms().unwrap(), DEFAULT_HEARTBEAT_MS);
    }

    #[test]
    fn test_missing_path_is_an_error() {
        let (_dir, config) = load_in_tempdir();
        assert!(config.get_value(&["nope", "missing"]).is_err());
    }

    #[test]
    fn test_base_url_fallback() {
        let (_dir, config) = load_in_tempdir();
        config.set_http_port(4000).unwrap();
        config.set_value(&["host", "bind_address"], Value::String("127.0.0.1".into())).unwrap();
        assert_eq!(config.get_base_url(), "http://127.0.0.1:4000");
    }
}
