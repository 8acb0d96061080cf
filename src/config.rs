use std::path::{Path, PathBuf};

use crate::error::{Error, Result};

/// Resolved configuration, built once at startup and passed by reference.
#[derive(Debug, Clone, Default)]
pub struct AppConfig {
    pub api_url: Option<String>,
    pub api_token: Option<String>,
    pub default_space_id: Option<i64>,
    pub allowed_space_ids: Option<Vec<i64>>,
    pub allowed_board_ids: Option<Vec<i64>>,
}

impl AppConfig {
    pub fn api_url(&self) -> Result<&str> {
        self.api_url
            .as_deref()
            .ok_or_else(|| Error::Config("KAITEN_API_URL is not set".into()))
    }

    pub fn api_token(&self) -> Result<&str> {
        self.api_token
            .as_deref()
            .ok_or_else(|| Error::Config("KAITEN_API_TOKEN is not set".into()))
    }
}

fn home_config_path() -> Option<PathBuf> {
    dirs::home_dir().map(|h| h.join(".kaiten").join("config"))
}

fn project_config_path() -> PathBuf {
    PathBuf::from(".kaiten.env")
}

/// Fallback `.env` shipped next to the binary, only consulted when url or
/// token are still missing after the first two sources.
fn fallback_config_path() -> Option<PathBuf> {
    std::env::current_exe()
        .ok()
        .and_then(|exe| exe.parent().map(|dir| dir.join(".env")))
}

/// Parse `key=value` lines: blank lines and `#` comments are skipped, the
/// split happens on the first `=`, key and value are trimmed. Later calls
/// overwrite earlier keys in `out`.
fn parse_env_into(contents: &str, out: &mut Vec<(String, String)>) {
    for line in contents.lines() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        if let Some((key, value)) = line.split_once('=') {
            let key = key.trim().to_string();
            let value = value.trim().to_string();
            if key.is_empty() {
                continue;
            }
            out.retain(|(k, _)| *k != key);
            out.push((key, value));
        }
    }
}

fn read_into(path: &Path, out: &mut Vec<(String, String)>) {
    if let Ok(contents) = std::fs::read_to_string(path) {
        parse_env_into(&contents, out);
    }
}

fn get<'a>(pairs: &'a [(String, String)], key: &str) -> Option<&'a str> {
    pairs
        .iter()
        .find(|(k, _)| k == key)
        .map(|(_, v)| v.as_str())
}

fn parse_id_list(raw: &str) -> Vec<i64> {
    raw.split(',')
        .filter_map(|part| part.trim().parse::<i64>().ok())
        .collect()
}

fn build(pairs: &[(String, String)]) -> AppConfig {
    AppConfig {
        api_url: get(pairs, "KAITEN_API_URL").map(str::to_string),
        api_token: get(pairs, "KAITEN_API_TOKEN").map(str::to_string),
        default_space_id: get(pairs, "KAITEN_DEFAULT_SPACE_ID").and_then(|v| v.parse().ok()),
        allowed_space_ids: get(pairs, "KAITEN_ALLOWED_SPACE_IDS").map(parse_id_list),
        allowed_board_ids: get(pairs, "KAITEN_ALLOWED_BOARD_IDS").map(parse_id_list),
    }
}

/// Load configuration from home, project-local and fallback sources, in
/// that precedence order (project overrides home; the fallback is only
/// read when url or token are still unset).
pub fn load_config() -> AppConfig {
    let mut paths: Vec<PathBuf> = Vec::new();
    if let Some(home) = home_config_path() {
        paths.push(home);
    }
    paths.push(project_config_path());
    load_from(&paths, fallback_config_path().as_deref())
}

fn load_from(paths: &[PathBuf], fallback: Option<&Path>) -> AppConfig {
    let mut pairs: Vec<(String, String)> = Vec::new();
    for path in paths {
        read_into(path, &mut pairs);
    }

    if get(&pairs, "KAITEN_API_URL").is_none() || get(&pairs, "KAITEN_API_TOKEN").is_none() {
        if let Some(path) = fallback {
            read_into(path, &mut pairs);
        }
    }

    build(&pairs)
}
