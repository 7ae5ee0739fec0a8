// src/config.rs
// Game rule configuration: which prize patterns are active and their
// parameters. Loadable from a simple `key = value` conf file.

use crate::detection::PrizePattern;
use crate::logging::log_warning;

use std::collections::HashMap;
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

/// Minimum called numbers per ticket for the Full Sheet Bonus. A product
/// decision, kept configurable; the strict rule set uses 2.
pub const DEFAULT_SHEET_BONUS_MIN_MARKS: usize = 2;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GameConfig {
    pub active_patterns: Vec<PrizePattern>,
    pub sheet_bonus_min_marks: usize,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            active_patterns: PrizePattern::ALL.to_vec(),
            sheet_bonus_min_marks: DEFAULT_SHEET_BONUS_MIN_MARKS,
        }
    }
}

impl GameConfig {
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, Box<dyn std::error::Error>> {
        let content = fs::read_to_string(path)?;
        let config_map = parse_config(&content)?;

        let active_patterns = match config_map.get("patterns") {
            Some(list) => {
                let mut patterns = Vec::new();
                for key in list.split(',') {
                    let key = key.trim();
                    if key.is_empty() {
                        continue;
                    }
                    match PrizePattern::from_key(key) {
                        Some(pattern) => patterns.push(pattern),
                        None => return Err(format!("unknown pattern '{key}'").into()),
                    }
                }
                patterns
            }
            None => PrizePattern::ALL.to_vec(),
        };

        let sheet_bonus_min_marks = config_map
            .get("sheet_bonus_min_marks")
            .and_then(|v| v.parse::<usize>().ok())
            .unwrap_or(DEFAULT_SHEET_BONUS_MIN_MARKS);

        Ok(GameConfig {
            active_patterns,
            sheet_bonus_min_marks,
        })
    }

    pub fn load_or_default() -> Self {
        let config_path = "conf/game.conf";

        match Self::from_file(config_path) {
            Ok(config) => config,
            Err(e) => {
                log_warning(&format!(
                    "could not load game config from {config_path}: {e}; using defaults"
                ));
                Self::default()
            }
        }
    }

    pub fn is_active(&self, pattern: PrizePattern) -> bool {
        self.active_patterns.contains(&pattern)
    }
}

fn parse_config(content: &str) -> Result<HashMap<String, String>, Box<dyn std::error::Error>> {
    let mut config = HashMap::new();

    for line in content.lines() {
        let line = line.trim();

        // Skip empty lines and comments
        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        if let Some((key, value)) = line.split_once('=') {
            config.insert(key.trim().to_string(), value.trim().to_string());
        }
    }

    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_config() {
        let content = r#"
            # Game rules
            patterns = top_line, four_corners, full_house
            sheet_bonus_min_marks = 2
        "#;

        let config = parse_config(content).unwrap();
        assert_eq!(
            config.get("patterns"),
            Some(&"top_line, four_corners, full_house".to_string())
        );
        assert_eq!(config.get("sheet_bonus_min_marks"), Some(&"2".to_string()));
    }

    #[test]
    fn test_game_config_default() {
        let config = GameConfig::default();
        assert_eq!(config.active_patterns.len(), PrizePattern::ALL.len());
        assert_eq!(config.sheet_bonus_min_marks, 2);
        assert!(config.is_active(PrizePattern::FourCorners));
    }

    #[test]
    fn test_game_config_from_content() {
        let dir = std::env::temp_dir().join("tambola_config_test");
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("game.conf");
        std::fs::write(
            &path,
            "patterns = early_five, full_house\nsheet_bonus_min_marks = 3\n",
        )
        .unwrap();

        let config = GameConfig::from_file(&path).unwrap();
        assert_eq!(
            config.active_patterns,
            vec![PrizePattern::EarlyFive, PrizePattern::FullHouse]
        );
        assert_eq!(config.sheet_bonus_min_marks, 3);
        assert!(!config.is_active(PrizePattern::TopLine));
    }

    #[test]
    fn test_game_config_rejects_unknown_pattern() {
        let dir = std::env::temp_dir().join("tambola_config_test");
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("bad.conf");
        std::fs::write(&path, "patterns = jackpot\n").unwrap();

        assert!(GameConfig::from_file(&path).is_err());
    }
}
