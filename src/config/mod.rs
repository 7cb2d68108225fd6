use std::env;
use std::path::PathBuf;

use serde::Deserialize;
use serde::Serialize;

#[derive(Debug, Default, Deserialize, Serialize, Clone, PartialEq, Eq)]
pub struct ConfigFile {
    pub base_url: Option<String>,
    pub total_records: Option<u32>,
    pub page_size: Option<u32>,
    pub start_page: Option<u32>,
    pub timeout: Option<u64>,
    pub rate: Option<u32>,
    pub proxy: Option<String>,
    pub workers: Option<usize>,
    pub no_color: Option<bool>,
    pub output: Option<String>,
    pub output_format: Option<String>,
}

fn home_dir() -> Option<PathBuf> {
    env::var_os("HOME")
        .map(PathBuf::from)
        .or_else(|| env::var_os("USERPROFILE").map(PathBuf::from))
        .or_else(|| {
            let drive = env::var_os("HOMEDRIVE")?;
            let path = env::var_os("HOMEPATH")?;
            Some(PathBuf::from(drive).join(path))
        })
}

pub fn default_config_path() -> Option<PathBuf> {
    Some(home_dir()?.join(".pokedex").join("config.yml"))
}

pub fn expand_tilde(path: &str) -> PathBuf {
    if let Some(stripped) = path.strip_prefix("~/").or_else(|| path.strip_prefix("~\\")) {
        if let Some(home) = home_dir() {
            return home.join(stripped);
        }
    }
    PathBuf::from(path)
}

pub fn expand_tilde_string(path: &str) -> String {
    expand_tilde(path).to_string_lossy().to_string()
}

pub fn parse_config(contents: &str) -> Result<ConfigFile, String> {
    serde_yaml::from_str::<Option<ConfigFile>>(contents)
        .map(|cfg| cfg.unwrap_or_default())
        .map_err(|e| e.to_string())
}

pub fn load_config(path: &PathBuf, allow_missing: bool) -> Result<ConfigFile, String> {
    match std::fs::read_to_string(path) {
        Ok(contents) => parse_config(&contents)
            .map_err(|e| format!("failed to parse config '{}': {e}", path.display())),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound && allow_missing => {
            Ok(ConfigFile::default())
        }
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            Err(format!("config file not found '{}'", path.display()))
        }
        Err(e) => Err(format!("failed to read config '{}': {e}", path.display())),
    }
}

pub fn default_config_yaml() -> String {
    r#"# Pokedex config
#
# Location (default):
#   ~/.pokedex/config.yml

# Remote API
base_url: https://pokeapi.co/api/v2
timeout: 10
# Requests per second, 0 disables the limit
rate: 0
# proxy: http://127.0.0.1:8080

# Catalog
total_records: 1010
page_size: 10
start_page: 1

# Runtime
workers: 4

# Output (requires --once)
# output: ./page.json
# output_format: json
no_color: false
"#
    .to_string()
}

pub fn ensure_default_config_file(path: &PathBuf) -> Result<bool, String> {
    if path.exists() {
        return Ok(false);
    }
    let parent = path
        .parent()
        .ok_or_else(|| format!("invalid config path '{}'", path.display()))?;
    std::fs::create_dir_all(parent).map_err(|e| {
        format!(
            "failed to create config directory '{}': {e}",
            parent.display()
        )
    })?;
    std::fs::write(path, default_config_yaml())
        .map_err(|e| format!("failed to write config file '{}': {e}", path.display()))?;
    Ok(true)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_yaml_parses() {
        let cfg = parse_config(&default_config_yaml()).unwrap();
        assert_eq!(cfg.base_url.as_deref(), Some("https://pokeapi.co/api/v2"));
        assert_eq!(cfg.total_records, Some(1010));
        assert_eq!(cfg.page_size, Some(10));
        assert_eq!(cfg.rate, Some(0));
        assert_eq!(cfg.proxy, None);
    }

    #[test]
    fn empty_file_is_default() {
        assert_eq!(parse_config("").unwrap(), ConfigFile::default());
        assert_eq!(parse_config("# only comments\n").unwrap(), ConfigFile::default());
    }

    #[test]
    fn unknown_types_are_rejected() {
        assert!(parse_config("page_size: ten\n").is_err());
    }

    #[test]
    fn missing_file_respects_allow_missing() {
        let path = std::env::temp_dir().join("pokedex-missing-config-test.yml");
        assert_eq!(load_config(&path, true).unwrap(), ConfigFile::default());
        assert!(load_config(&path, false).is_err());
    }

    #[test]
    fn default_file_is_written_once() {
        let dir = std::env::temp_dir().join(format!("pokedex-config-{}", std::process::id()));
        let path = dir.join("config.yml");
        let _ = std::fs::remove_dir_all(&dir);

        assert!(ensure_default_config_file(&path).unwrap());
        assert!(!ensure_default_config_file(&path).unwrap());
        assert_eq!(load_config(&path, false).unwrap().page_size, Some(10));

        let _ = std::fs::remove_dir_all(&dir);
    }
}
