use std::path::Path;
use std::sync::LazyLock;

use regex::Regex;

use crate::error::PersistenceError;

static SEARCH_TERM: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z0-9 ]+$").expect("keyword pattern is valid"));

/// Reads one search term per line, dropping blanks and anything outside
/// letters, digits and spaces.
pub fn load_keywords(path: &Path) -> Result<Vec<String>, PersistenceError> {
    let text = std::fs::read_to_string(path).map_err(|source| PersistenceError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(parse_keywords(&text))
}

pub fn parse_keywords(text: &str) -> Vec<String> {
    text.lines()
        .map(str::trim)
        .filter(|line| SEARCH_TERM.is_match(line))
        .map(String::from)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keeps_valid_terms_in_order() {
        let text = "wireless mouse\n\n  usb c hub  \nrm -rf /\nearbuds;drop\nSSD 1TB\n";
        assert_eq!(parse_keywords(text), vec!["wireless mouse", "usb c hub", "SSD 1TB"]);
    }

    #[test]
    fn missing_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        assert!(load_keywords(&dir.path().join("keywords.txt")).is_err());
    }
}
