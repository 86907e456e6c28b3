//! Configuration resolution and path discovery.
//!
//! Resolution order: CLI argument → environment variables → XDG paths → system → defaults.

use std::path::{Path, PathBuf};

/// Discovered configuration file path.
#[derive(Debug, Clone, Default)]
pub struct ConfigPaths {
    /// Path to the analysis config (or None if not found).
    pub analysis: Option<PathBuf>,

    /// Source of the analysis config (for diagnostics).
    pub source: ConfigSource,
}

/// Where a configuration file was found.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum ConfigSource {
    /// Explicitly provided via CLI argument.
    CliArgument,

    /// Set via environment variable.
    Environment,

    /// Found in XDG config directory.
    XdgConfig,

    /// Found in /etc/sigscan/.
    SystemConfig,

    /// Using built-in defaults.
    #[default]
    BuiltinDefault,
}

impl std::fmt::Display for ConfigSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigSource::CliArgument => write!(f, "CLI argument"),
            ConfigSource::Environment => write!(f, "environment variable"),
            ConfigSource::XdgConfig => write!(f, "XDG config"),
            ConfigSource::SystemConfig => write!(f, "system config"),
            ConfigSource::BuiltinDefault => write!(f, "builtin default"),
        }
    }
}

/// Environment variable names.
pub const ENV_CONFIG_PATH: &str = "SIGSCAN_CONFIG";
pub const ENV_CONFIG_DIR: &str = "SIGSCAN_CONFIG_DIR";

/// Config file names, in lookup order within a directory.
const CONFIG_FILENAMES: [&str; 2] = ["analysis.json", "analysis.toml"];

/// Application name for XDG directories.
const APP_NAME: &str = "sigscan";

/// Resolve the analysis config path using the standard resolution order.
///
/// 1. Explicit CLI path (if it exists)
/// 2. `SIGSCAN_CONFIG` (direct path)
/// 3. `SIGSCAN_CONFIG_DIR` + file name
/// 4. XDG config directory (~/.config/sigscan/)
/// 5. System config (/etc/sigscan/)
/// 6. Built-in defaults (None)
pub fn resolve_config(cli_path: Option<&Path>) -> ConfigPaths {
    let mut paths = ConfigPaths::default();
    paths.analysis = resolve_single_config(cli_path, &mut paths.source);
    paths
}

fn resolve_single_config(cli_path: Option<&Path>, source: &mut ConfigSource) -> Option<PathBuf> {
    // 1. CLI argument
    if let Some(path) = cli_path {
        if path.exists() {
            *source = ConfigSource::CliArgument;
            return Some(path.to_path_buf());
        }
    }

    // 2. Environment variable (direct path)
    if let Ok(env_path) = std::env::var(ENV_CONFIG_PATH) {
        let path = PathBuf::from(env_path);
        if path.exists() {
            *source = ConfigSource::Environment;
            return Some(path);
        }
    }

    // 3. Environment variable (config dir)
    if let Ok(config_dir) = std::env::var(ENV_CONFIG_DIR) {
        if let Some(path) = find_in_dir(Path::new(&config_dir)) {
            *source = ConfigSource::Environment;
            return Some(path);
        }
    }

    // 4. XDG config directory
    if let Some(dir) = xdg_config_dir() {
        if let Some(path) = find_in_dir(&dir) {
            *source = ConfigSource::XdgConfig;
            return Some(path);
        }
    }

    // 5. System config
    if let Some(path) = find_in_dir(&system_config_dir()) {
        *source = ConfigSource::SystemConfig;
        return Some(path);
    }

    // 6. Built-in default (None)
    *source = ConfigSource::BuiltinDefault;
    None
}

fn find_in_dir(dir: &Path) -> Option<PathBuf> {
    CONFIG_FILENAMES
        .iter()
        .map(|name| dir.join(name))
        .find(|path| path.is_file())
}

/// Get the XDG config directory for sigscan.
pub fn xdg_config_dir() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join(APP_NAME))
}

/// Get the system config directory.
pub fn system_config_dir() -> PathBuf {
    PathBuf::from("/etc").join(APP_NAME)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_source_display() {
        assert_eq!(format!("{}", ConfigSource::CliArgument), "CLI argument");
        assert_eq!(
            format!("{}", ConfigSource::Environment),
            "environment variable"
        );
        assert_eq!(format!("{}", ConfigSource::XdgConfig), "XDG config");
        assert_eq!(format!("{}", ConfigSource::SystemConfig), "system config");
        assert_eq!(
            format!("{}", ConfigSource::BuiltinDefault),
            "builtin default"
        );
    }

    #[test]
    fn test_cli_path_wins() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("custom.json");
        std::fs::write(&path, "{}").unwrap();

        let paths = resolve_config(Some(&path));
        assert_eq!(paths.analysis.as_deref(), Some(path.as_path()));
        assert_eq!(paths.source, ConfigSource::CliArgument);
    }

    #[test]
    fn test_find_in_dir_prefers_json() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("analysis.toml"), "").unwrap();
        assert_eq!(
            find_in_dir(dir.path()),
            Some(dir.path().join("analysis.toml"))
        );

        std::fs::write(dir.path().join("analysis.json"), "{}").unwrap();
        assert_eq!(
            find_in_dir(dir.path()),
            Some(dir.path().join("analysis.json"))
        );
    }

    #[test]
    fn test_system_config_dir() {
        assert_eq!(system_config_dir(), PathBuf::from("/etc/sigscan"));
    }
}
