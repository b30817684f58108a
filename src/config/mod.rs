//! Configuration management.

use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Main configuration for kbport.
#[derive(Debug, Clone)]
pub struct KbportConfig {
    /// Root directory under which store folders live.
    pub store_root: PathBuf,
    /// Folder name for the store under the root.
    pub folder: String,
}

/// Configuration file structure (for TOML parsing).
#[derive(Debug, Deserialize, Default)]
pub struct ConfigFile {
    /// Store root directory.
    pub store_root: Option<String>,
    /// Store folder name.
    pub folder: Option<String>,
}

impl Default for KbportConfig {
    fn default() -> Self {
        Self {
            store_root: PathBuf::from("."),
            folder: "kb".to_string(),
        }
    }
}

impl KbportConfig {
    /// Creates a new configuration with default values.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the full store directory (`store_root/folder`).
    #[must_use]
    pub fn store_dir(&self) -> PathBuf {
        self.store_root.join(&self.folder)
    }

    /// Loads configuration from a file path.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn load_from_file(path: &Path) -> crate::Result<Self> {
        let contents =
            std::fs::read_to_string(path).map_err(|e| crate::Error::OperationFailed {
                operation: "read_config_file".to_string(),
                cause: format!("{}: {}", path.display(), e),
            })?;

        let file: ConfigFile =
            toml::from_str(&contents).map_err(|e| crate::Error::OperationFailed {
                operation: "parse_config_file".to_string(),
                cause: e.to_string(),
            })?;

        Ok(Self::from_config_file(&file))
    }

    /// Loads configuration from the default location.
    ///
    /// Checks the following paths in order:
    /// 1. Platform-specific config dir (`~/Library/Application Support/kbport/` on macOS)
    /// 2. XDG config dir (`~/.config/kbport/` for Unix compatibility)
    ///
    /// Returns default configuration if no config file is found.
    #[must_use]
    pub fn load_default() -> Self {
        let Some(base_dirs) = directories::BaseDirs::new() else {
            return Self::default();
        };

        // Check platform-specific config dir first
        let platform_config = base_dirs.config_dir().join("kbport").join("config.toml");
        if platform_config.exists() {
            if let Ok(config) = Self::load_from_file(&platform_config) {
                return config;
            }
        }

        // Fall back to XDG-style ~/.config/kbport/ for Unix compatibility
        let xdg_config = base_dirs
            .home_dir()
            .join(".config")
            .join("kbport")
            .join("config.toml");
        if xdg_config.exists() {
            if let Ok(config) = Self::load_from_file(&xdg_config) {
                return config;
            }
        }

        Self::default()
    }

    /// Converts a `ConfigFile` to `KbportConfig`.
    fn from_config_file(file: &ConfigFile) -> Self {
        let mut config = Self::default();

        if let Some(store_root) = &file.store_root {
            config.store_root = PathBuf::from(store_root);
        }
        if let Some(folder) = &file.folder {
            config.folder.clone_from(folder);
        }

        config
    }

    /// Sets the store root directory.
    #[must_use]
    pub fn with_store_root(mut self, path: impl Into<PathBuf>) -> Self {
        self.store_root = path.into();
        self
    }

    /// Sets the store folder name.
    #[must_use]
    pub fn with_folder(mut self, folder: impl Into<String>) -> Self {
        self.folder = folder.into();
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = KbportConfig::default();
        assert_eq!(config.store_root, PathBuf::from("."));
        assert_eq!(config.folder, "kb");
        assert_eq!(config.store_dir(), PathBuf::from("./kb"));
    }

    #[test]
    fn test_builders() {
        let config = KbportConfig::new()
            .with_store_root("/var/lib")
            .with_folder("entities");
        assert_eq!(config.store_dir(), PathBuf::from("/var/lib/entities"));
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "store_root = \"/data\"\nfolder = \"main\"\n").unwrap();

        let config = KbportConfig::load_from_file(&path).unwrap();
        assert_eq!(config.store_root, PathBuf::from("/data"));
        assert_eq!(config.folder, "main");
    }

    #[test]
    fn test_load_from_file_partial_keeps_defaults() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "store_root = \"/data\"\n").unwrap();

        let config = KbportConfig::load_from_file(&path).unwrap();
        assert_eq!(config.store_root, PathBuf::from("/data"));
        assert_eq!(config.folder, "kb");
    }

    #[test]
    fn test_load_from_file_rejects_bad_toml() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "store_root = [").unwrap();

        assert!(KbportConfig::load_from_file(&path).is_err());
    }
}
