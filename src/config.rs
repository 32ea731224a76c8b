//! Configuration file loading.
//!
//! The format is plain `key = value` text: blank lines and lines
//! starting with `#` are ignored, both `=` and `:` work as the
//! separator, and surrounding whitespace and double quotes are
//! trimmed from keys and values. Keys that parse as integers form the
//! strategy mapping `{numeric id -> strategy name}` used by the CLI's
//! `--backtest`/`--trade` arguments.

use std::collections::{BTreeMap, HashMap};
use std::path::Path;
use std::str::FromStr;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file: {0}")]
    Io(#[from] std::io::Error),
}

#[derive(Debug, Default, Clone)]
pub struct Config {
    values: HashMap<String, String>,
}

impl Config {
    /// Load from a file. A missing file is an error; the caller
    /// decides whether to fall back to defaults.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        Ok(Self::from_str_lossy(&contents))
    }

    /// Parse config text, silently skipping malformed lines.
    pub fn from_str_lossy(contents: &str) -> Self {
        let mut values = HashMap::new();
        for line in contents.lines() {
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            let Some(separator) = line.find(['=', ':']) else {
                continue;
            };
            let key = trim_field(&line[..separator]);
            let value = trim_field(&line[separator + 1..]);
            if !key.is_empty() {
                values.insert(key, value);
            }
        }
        Self { values }
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.values.get(key).map(String::as_str)
    }

    /// Typed lookup with a default for missing or unparseable values.
    pub fn get_or<T: FromStr>(&self, key: &str, default: T) -> T {
        self.values
            .get(key)
            .and_then(|v| v.parse().ok())
            .unwrap_or(default)
    }

    /// The `{numeric id -> strategy name}` mapping, ordered by id.
    pub fn strategy_mappings(&self) -> BTreeMap<u32, String> {
        self.values
            .iter()
            .filter_map(|(k, v)| k.parse::<u32>().ok().map(|id| (id, v.clone())))
            .collect()
    }

    /// All key/value pairs, for feeding `Strategy::configure`.
    pub fn values(&self) -> &HashMap<String, String> {
        &self.values
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

fn trim_field(field: &str) -> String {
    field.trim().trim_matches('"').trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_parses_key_value_pairs() {
        let config = Config::from_str_lossy(
            "# engine tuning\n\
             \n\
             initial_balance = 100000\n\
             entry_threshold: 1.5\n\
             name = \"MeanReversion\"\n",
        );
        assert_eq!(config.get("initial_balance"), Some("100000"));
        assert_eq!(config.get("entry_threshold"), Some("1.5"));
        assert_eq!(config.get("name"), Some("MeanReversion"));
    }

    #[test]
    fn test_whitespace_and_quotes_trimmed() {
        let config = Config::from_str_lossy("  key  =  \" padded value \"  \n");
        assert_eq!(config.get("key"), Some("padded value"));
    }

    #[test]
    fn test_comments_and_blank_lines_ignored() {
        let config = Config::from_str_lossy("# only a comment\n\n   \n");
        assert!(config.is_empty());
    }

    #[test]
    fn test_lines_without_separator_skipped() {
        let config = Config::from_str_lossy("no separator here\nkey=value\n");
        assert_eq!(config.values().len(), 1);
    }

    #[test]
    fn test_typed_lookup_with_default() {
        let config = Config::from_str_lossy("window = 30\nbad = abc\n");
        assert_eq!(config.get_or("window", 20usize), 30);
        assert_eq!(config.get_or("bad", 7u32), 7);
        assert_eq!(config.get_or("missing", 1.5f64), 1.5);
    }

    #[test]
    fn test_strategy_mappings_from_numeric_keys() {
        let config = Config::from_str_lossy(
            "1 = MeanReversion\n\
             2 = StatArbitrage\n\
             initial_balance = 50000\n",
        );
        let mappings = config.strategy_mappings();
        assert_eq!(mappings.len(), 2);
        assert_eq!(mappings.get(&1).map(String::as_str), Some("MeanReversion"));
        assert_eq!(mappings.get(&2).map(String::as_str), Some("StatArbitrage"));
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(b"1 = MeanReversion\n").unwrap();
        let config = Config::load(file.path()).unwrap();
        assert_eq!(config.get("1"), Some("MeanReversion"));
    }

    #[test]
    fn test_missing_file_is_error() {
        assert!(Config::load(Path::new("/nonexistent/x.conf")).is_err());
    }
}
