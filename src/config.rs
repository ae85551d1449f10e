use std::env;
use std::ffi::OsString;
use std::path::PathBuf;

use crate::error::ConfigError;
use crate::view::DEFAULT_PAGE_SIZE;

#[derive(Debug, Clone)]
pub struct Config {
    pub data_file: PathBuf,
    pub log_level: String,
    pub page_size: usize,
}

impl Config {
    /// Resolves settings from an explicit `--data` path and the environment.
    pub fn load(data_override: Option<PathBuf>) -> Result<Self, ConfigError> {
        let data_file = resolve_data_file(data_override, env::var_os("JOBTRACKR_DATA"));

        let log_level = env::var("JOBTRACKR_LOG").unwrap_or_else(|_| "warn".to_string());

        let page_size = match env::var("JOBTRACKR_PAGE_SIZE") {
            Ok(raw) => parse_page_size(&raw)?,
            Err(_) => DEFAULT_PAGE_SIZE,
        };

        Ok(Self {
            data_file,
            log_level,
            page_size,
        })
    }
}

/// `--data` beats `JOBTRACKR_DATA`, which beats the user data directory.
fn resolve_data_file(data_override: Option<PathBuf>, from_env: Option<OsString>) -> PathBuf {
    data_override
        .or_else(|| from_env.map(PathBuf::from))
        .unwrap_or_else(default_data_file)
}

fn default_data_file() -> PathBuf {
    // XDG data directory, or the working directory when there isn't one
    if let Some(proj_dirs) = directories::ProjectDirs::from("", "", "jobtrackr") {
        proj_dirs.data_dir().join("applications.json")
    } else {
        PathBuf::from("applications.json")
    }
}

fn parse_page_size(raw: &str) -> Result<usize, ConfigError> {
    match raw.trim().parse::<usize>() {
        Ok(n) if n > 0 => Ok(n),
        _ => Err(ConfigError::InvalidPageSize(raw.to_string())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn data_path_precedence() {
        let flag = Some(PathBuf::from("/tmp/flag.json"));
        let from_env = Some(OsString::from("/tmp/env.json"));

        assert_eq!(
            resolve_data_file(flag, from_env.clone()),
            PathBuf::from("/tmp/flag.json")
        );
        assert_eq!(resolve_data_file(None, from_env), PathBuf::from("/tmp/env.json"));
        assert!(resolve_data_file(None, None).ends_with("applications.json"));
    }

    #[test]
    fn page_size_must_be_positive() {
        assert_eq!(parse_page_size(" 25 ").unwrap(), 25);
        assert!(parse_page_size("0").is_err());
        assert!(parse_page_size("lots").is_err());
    }
}
