use directories::ProjectDirs;
use std::path::PathBuf;

/// Environment variable that points keystep at an explicit config file
pub const CONFIG_ENV: &str = "KEYSTEP_CONFIG";

/// Centralized application directory resolution
pub struct AppDirs;

impl AppDirs {
    pub fn config_path() -> Option<PathBuf> {
        if let Some(path) = std::env::var_os(CONFIG_ENV) {
            return Some(PathBuf::from(path));
        }
        ProjectDirs::from("", "", "keystep").map(|dirs| dirs.config_dir().join("config.json"))
    }
}
