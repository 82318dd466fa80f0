use std::fs;
use std::path::Path;

use directories::ProjectDirs;
use serde::Deserialize;

use crate::cli::OutputFormat;

#[derive(Debug, Deserialize, Default, PartialEq)]
pub struct Config {
    pub api_url: Option<String>,
    pub timeout_secs: Option<u64>,
    pub format: Option<OutputFormat>,
}

pub fn load_config() -> Config {
    let Some(dirs) = ProjectDirs::from("", "", "smsbill") else {
        return Config::default();
    };
    load_config_from(&dirs.config_dir().join("config.toml"))
}

pub fn load_config_from(path: &Path) -> Config {
    let Ok(data) = fs::read_to_string(path) else {
        return Config::default();
    };

    match toml::from_str(&data) {
        Ok(config) => config,
        Err(e) => {
            log::warn!("invalid config at {}: {}", path.display(), e);
            Config::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_full_config() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(
            &path,
            "api_url = \"http://localhost:8080/usage\"\ntimeout_secs = 5\nformat = \"json\"\n",
        )
        .unwrap();

        let config = load_config_from(&path);
        assert_eq!(config.api_url.as_deref(), Some("http://localhost:8080/usage"));
        assert_eq!(config.timeout_secs, Some(5));
        assert_eq!(config.format, Some(OutputFormat::Json));
    }

    #[test]
    fn test_missing_file_gives_defaults() {
        let dir = tempfile::tempdir().unwrap();
        assert_eq!(load_config_from(&dir.path().join("absent.toml")), Config::default());
    }

    #[test]
    fn test_invalid_file_gives_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "timeout_secs = \"soon\"").unwrap();
        assert_eq!(load_config_from(&path), Config::default());
    }
}
