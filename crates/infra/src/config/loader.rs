//! Configuration loader
//!
//! Loads application configuration from files and environment variables.
//!
//! ## Loading Strategy
//! 1. Reads a `.env` file into the process environment if one exists
//! 2. Searches several paths for a config file; defaults apply when none exists
//! 3. Environment variables override individual fields
//! 4. The result is validated before it is returned
//!
//! ## Environment Variables
//! - `ANISTREAM_CACHE_DB_PATH`: SQLite file for persistent domains
//! - `ANISTREAM_CACHE_CLEANUP_INTERVAL`: Expiry sweep period in seconds
//! - `ANISTREAM_CACHE_<DOMAIN>_MAX_SIZE`: Capacity of one domain
//! - `ANISTREAM_CACHE_<DOMAIN>_TTL`: Default lifetime of one domain in seconds
//! - `ANISTREAM_CACHE_<DOMAIN>_BACKEND`: `memory`, `session` or `persistent`
//! - `ANISTREAM_LOG_LEVEL`: Default tracing filter
//! - `ANISTREAM_LOG_JSON`: Whether logs are JSON lines (true/false)
//!
//! `<DOMAIN>` is one of `ANIME`, `EPISODES`, `SEARCH`, `IMAGES`.
//!
//! ## File Locations
//! The loader searches the following paths (in order):
//! 1. `./anistream.toml` or `./anistream.json` (current working directory)
//! 2. `./config.toml` or `./config.json` (current working directory)
//! 3. The same names in the parent and grandparent directories
//! 4. The same names next to the executable

use std::path::{Path, PathBuf};
use std::str::FromStr;

use anistream_domain::{AniStreamError, AppConfig, DomainCacheConfig, Result};

const FILE_NAMES: [&str; 4] = ["anistream.toml", "anistream.json", "config.toml", "config.json"];

/// Load configuration from the first config file found plus environment
/// overrides
///
/// # Errors
/// Returns `AniStreamError::Config` if:
/// - A config file exists but cannot be read or parsed
/// - An environment variable has an invalid value
/// - The merged configuration fails validation
pub fn load() -> Result<AppConfig> {
    if let Ok(path) = dotenvy::dotenv() {
        tracing::debug!(path = %path.display(), "Loaded .env file");
    }

    let mut config = match find_config_file() {
        Some(path) => read_file(&path)?,
        None => {
            tracing::debug!("No config file found, using defaults");
            AppConfig::default()
        }
    };
    apply_env_overrides(&mut config)?;
    config.validate()?;
    tracing::info!("Configuration loaded");
    Ok(config)
}

/// Load configuration from defaults plus environment variables only
///
/// # Environment Variables
/// See module documentation for the complete list.
///
/// # Errors
/// Returns `AniStreamError::Config` if a variable has an invalid value or the
/// result fails validation.
pub fn load_from_env() -> Result<AppConfig> {
    let mut config = AppConfig::default();
    apply_env_overrides(&mut config)?;
    config.validate()?;
    Ok(config)
}

/// Load configuration from a file
///
/// If `path` is `None`, searches several locations for config files.
/// Supports both JSON and TOML formats (detected by file extension).
/// Fields missing from the file take their defaults.
///
/// # Arguments
/// * `path` - Optional path to config file. If `None`, uses
///   [`find_config_file`].
///
/// # Errors
/// Returns `AniStreamError::Config` if:
/// - File not found (when path is specified)
/// - No config file found (when path is `None`)
/// - File format is invalid
/// - The configuration fails validation
pub fn load_from_file(path: Option<PathBuf>) -> Result<AppConfig> {
    let config_path = match path {
        Some(p) => {
            if !p.exists() {
                return Err(AniStreamError::Config(format!(
                    "Config file not found: {}",
                    p.display()
                )));
            }
            p
        }
        None => find_config_file().ok_or_else(|| {
            AniStreamError::Config(
                "No config file found in any of the standard locations".to_string(),
            )
        })?,
    };

    let config = read_file(&config_path)?;
    config.validate()?;
    Ok(config)
}

fn read_file(path: &Path) -> Result<AppConfig> {
    tracing::info!(path = %path.display(), "Loading configuration from file");

    let contents = std::fs::read_to_string(path)
        .map_err(|e| AniStreamError::Config(format!("Failed to read config file: {}", e)))?;

    parse_config(&contents, path)
}

/// Parse configuration from string content
///
/// Format is detected by file extension (`.json` or `.toml`).
///
/// # Errors
/// Returns `AniStreamError::Config` if format is invalid or parsing fails.
fn parse_config(contents: &str, path: &Path) -> Result<AppConfig> {
    let extension = path.extension().and_then(|e| e.to_str()).unwrap_or("json");

    match extension {
        "toml" => toml::from_str(contents)
            .map_err(|e| AniStreamError::Config(format!("Invalid TOML format: {}", e))),
        "json" => serde_json::from_str(contents)
            .map_err(|e| AniStreamError::Config(format!("Invalid JSON format: {}", e))),
        _ => Err(AniStreamError::Config(format!("Unsupported config format: {}", extension))),
    }
}

/// Search several paths for a configuration file
///
/// Searches the current working directory, its parent and grandparent, then
/// the executable's directory and its parents.
///
/// # Returns
/// The first config file found, or `None` if no file exists.
pub fn find_config_file() -> Option<PathBuf> {
    let mut roots = Vec::new();

    if let Ok(cwd) = std::env::current_dir() {
        roots.extend(cwd.ancestors().take(3).map(Path::to_path_buf));
    }

    if let Ok(exe_path) = std::env::current_exe() {
        if let Some(exe_dir) = exe_path.parent() {
            roots.extend(exe_dir.ancestors().take(3).map(Path::to_path_buf));
        }
    }

    roots
        .iter()
        .flat_map(|root| FILE_NAMES.iter().map(move |name| root.join(name)))
        .find(|path| path.exists())
}

fn apply_env_overrides(config: &mut AppConfig) -> Result<()> {
    let cache = &mut config.cache;
    if let Ok(path) = std::env::var("ANISTREAM_CACHE_DB_PATH") {
        cache.db_path = path;
    }
    if let Some(secs) = env_parse("ANISTREAM_CACHE_CLEANUP_INTERVAL")? {
        cache.cleanup_interval_secs = secs;
    }

    for (name, domain) in [
        ("ANIME", &mut cache.anime),
        ("EPISODES", &mut cache.episodes),
        ("SEARCH", &mut cache.search),
        ("IMAGES", &mut cache.images),
    ] {
        apply_domain_overrides(name, domain)?;
    }

    if let Ok(level) = std::env::var("ANISTREAM_LOG_LEVEL") {
        config.logging.level = level;
    }
    config.logging.json = env_bool("ANISTREAM_LOG_JSON", config.logging.json);
    Ok(())
}

fn apply_domain_overrides(name: &str, domain: &mut DomainCacheConfig) -> Result<()> {
    if let Some(max_size) = env_parse(&format!("ANISTREAM_CACHE_{name}_MAX_SIZE"))? {
        domain.max_size = max_size;
    }
    if let Some(ttl) = env_parse(&format!("ANISTREAM_CACHE_{name}_TTL"))? {
        domain.ttl_secs = ttl;
    }
    if let Some(backend) = env_parse(&format!("ANISTREAM_CACHE_{name}_BACKEND"))? {
        domain.backend = backend;
    }
    Ok(())
}

/// Parse an optional environment variable
///
/// # Errors
/// Returns `AniStreamError::Config` if the variable is set but does not parse.
fn env_parse<T>(key: &str) -> Result<Option<T>>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match std::env::var(key) {
        Ok(raw) => raw
            .trim()
            .parse::<T>()
            .map(Some)
            .map_err(|e| AniStreamError::Config(format!("Invalid value for {}: {}", key, e))),
        Err(_) => Ok(None),
    }
}

/// Parse boolean from environment variable
///
/// Accepts: `1`/`0`, `true`/`false`, `yes`/`no`, `on`/`off` (case-insensitive)
///
/// # Arguments
/// * `key` - Environment variable name
/// * `default` - Default value if variable is not set
///
/// # Returns
/// The parsed boolean value, or `default` if not set.
fn env_bool(key: &str, default: bool) -> bool {
    std::env::var(key)
        .ok()
        .map(|s| matches!(s.to_ascii_lowercase().as_str(), "1" | "true" | "yes" | "on"))
        .unwrap_or(default)
}
