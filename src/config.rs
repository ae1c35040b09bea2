use std::collections::HashMap;
use std::fs;
use std::path::Path;

use crate::error::ConfigError;

// Config files are plain KEY=VALUE lines. Lines without '=' and '#' comments are skipped,
// the value keeps everything after the first '='.
pub fn load_config<P: AsRef<Path>>(path: P) -> Result<HashMap<String, String>, ConfigError> {
    let path = path.as_ref();
    let content = fs::read_to_string(path).map_err(|source| ConfigError::Unreadable {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(parse_config(&content))
}

pub fn parse_config(content: &str) -> HashMap<String, String> {
    let mut map = HashMap::new();
    for line in content.lines() {
        if line.trim_start().starts_with('#') {
            continue;
        }
        if let Some(eq_pos) = line.find('=') {
            let key = line[..eq_pos].trim().to_string();
            let value = line[eq_pos + 1..].trim().to_string();
            map.insert(key, value);
        }
    }
    map
}

pub fn require<'a>(config: &'a HashMap<String, String>, key: &str) -> Result<&'a str, ConfigError> {
    config
        .get(key)
        .map(String::as_str)
        .ok_or_else(|| ConfigError::MissingKey(key.to_string()))
}

pub fn flag(config: &HashMap<String, String>, key: &str, default: bool) -> bool {
    config
        .get(key)
        .map(|s| s.eq_ignore_ascii_case("true"))
        .unwrap_or(default)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_pairs_and_skips_comments() {
        let cfg = parse_config("# map settings\nMAP_FILE = /data/genes.tsv\nnot a pair\nLOG_LEVEL=debug\n");
        assert_eq!(cfg.len(), 2);
        assert_eq!(cfg.get("MAP_FILE").map(String::as_str), Some("/data/genes.tsv"));
        assert_eq!(cfg.get("LOG_LEVEL").map(String::as_str), Some("debug"));
    }

    #[test]
    fn value_keeps_later_equals_signs() {
        let cfg = parse_config("HOST_NAME=a=b\n");
        assert_eq!(cfg.get("HOST_NAME").map(String::as_str), Some("a=b"));
    }

    #[test]
    fn require_reports_missing_key() {
        let cfg = parse_config("LOG_CONSOLE=true\n");
        assert!(flag(&cfg, "LOG_CONSOLE", false));
        assert!(!flag(&cfg, "MISSING", false));
        match require(&cfg, "MAP_FILE") {
            Err(ConfigError::MissingKey(key)) => assert_eq!(key, "MAP_FILE"),
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[test]
    fn unreadable_file_is_an_error() {
        let err = load_config("/nonexistent/idmap.conf").unwrap_err();
        assert!(matches!(err, ConfigError::Unreadable { .. }));
    }
}
