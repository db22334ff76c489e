use crate::app_dirs::AppDirs;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Per-lesson generation settings. Global defaults come from the config file and the
/// command line; a line of the character list may override any of them.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct LessonOptions {
    /// Soft cap on the length of a lesson, in characters
    pub characters_per_lesson: usize,
    pub min_word_length: usize,
    pub max_word_length: usize,
    /// Symbols per word/combination token
    pub symbols_density: f64,
    /// Numbers per word/combination token
    pub numbers_density: f64,
    /// Share of symbols taken from earlier lessons (0 = only this lesson's symbols)
    pub previous_symbols_fraction: f64,
    /// Share of numbers built from earlier lessons' digits
    pub previous_numbers_fraction: f64,
    /// Share of reinforcement-only words in lessons that introduce new letters
    pub previous_words_fraction: f64,
    pub max_number_length: usize,
    pub max_combination_length: usize,
    /// Prioritize words containing the rarest new letters
    pub balance_words: bool,
}

impl Default for LessonOptions {
    fn default() -> Self {
        Self {
            characters_per_lesson: 2000,
            min_word_length: 4,
            max_word_length: 100,
            symbols_density: 1.0,
            numbers_density: 1.0,
            previous_symbols_fraction: 0.4,
            previous_numbers_fraction: 0.4,
            previous_words_fraction: 0.0,
            max_number_length: 3,
            max_combination_length: 4,
            balance_words: false,
        }
    }
}

impl LessonOptions {
    /// Apply a single `key=value` override as found in the character list
    pub fn apply_override(&mut self, key: &str, value: &str) -> Result<(), String> {
        let key = key.trim().replace('-', "_");
        let value = value.trim();
        match key.as_str() {
            "characters_per_lesson" => self.characters_per_lesson = parse_value(&key, value)?,
            "min_word_length" => self.min_word_length = parse_value(&key, value)?,
            "max_word_length" => self.max_word_length = parse_value(&key, value)?,
            "symbols_density" => self.symbols_density = parse_value(&key, value)?,
            "numbers_density" => self.numbers_density = parse_value(&key, value)?,
            "previous_symbols_fraction" => {
                self.previous_symbols_fraction = parse_value(&key, value)?
            }
            "previous_numbers_fraction" => {
                self.previous_numbers_fraction = parse_value(&key, value)?
            }
            "previous_words_fraction" => self.previous_words_fraction = parse_value(&key, value)?,
            "max_number_length" => self.max_number_length = parse_value(&key, value)?,
            "max_combination_length" | "max_letters_combination_length" => {
                self.max_combination_length = parse_value(&key, value)?
            }
            "balance_words" => self.balance_words = parse_value(&key, value)?,
            _ => return Err(format!("unknown option '{key}'")),
        }
        Ok(())
    }

    pub fn validate(&self) -> Result<(), String> {
        if self.min_word_length > self.max_word_length {
            return Err(format!(
                "min_word_length ({}) is larger than max_word_length ({})",
                self.min_word_length, self.max_word_length
            ));
        }
        for (name, value) in [
            ("previous_symbols_fraction", self.previous_symbols_fraction),
            ("previous_numbers_fraction", self.previous_numbers_fraction),
            ("previous_words_fraction", self.previous_words_fraction),
        ] {
            if !(0.0..=1.0).contains(&value) {
                return Err(format!("{name} must be between 0 and 1, got {value}"));
            }
        }
        for (name, value) in [
            ("symbols_density", self.symbols_density),
            ("numbers_density", self.numbers_density),
        ] {
            if !value.is_finite() || value < 0.0 {
                return Err(format!("{name} must be a non-negative number, got {value}"));
            }
        }
        if self.max_number_length == 0 {
            return Err("max_number_length must be at least 1".to_string());
        }
        if self.max_combination_length == 0 {
            return Err("max_combination_length must be at least 1".to_string());
        }
        Ok(())
    }
}

fn parse_value<T: std::str::FromStr>(key: &str, value: &str) -> Result<T, String> {
    value
        .parse()
        .map_err(|_| format!("invalid value '{value}' for option '{key}'"))
}

/// Persisted global defaults
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Config {
    pub lesson: LessonOptions,
    pub word_wrap: usize,
    pub title_prefix: String,
    pub shuffle_dictionary: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            lesson: LessonOptions::default(),
            word_wrap: 60,
            title_prefix: String::new(),
            shuffle_dictionary: true,
        }
    }
}

pub trait ConfigStore {
    fn load(&self) -> Config;
    fn save(&self, cfg: &Config) -> std::io::Result<()>;
}

#[derive(Debug, Clone)]
pub struct FileConfigStore {
    path: PathBuf,
}

impl FileConfigStore {
    pub fn new() -> Self {
        let path = AppDirs::config_path().unwrap_or_else(|| PathBuf::from("keystep_config.json"));
        Self { path }
    }

    pub fn with_path<P: AsRef<Path>>(p: P) -> Self {
        Self {
            path: p.as_ref().to_path_buf(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Default for FileConfigStore {
    fn default() -> Self {
        Self::new()
    }
}

impl ConfigStore for FileConfigStore {
    fn load(&self) -> Config {
        match fs::read(&self.path) {
            Ok(bytes) => match serde_json::from_slice::<Config>(&bytes) {
                Ok(cfg) => cfg,
                Err(err) => {
                    tracing::warn!(
                        "ignoring unreadable config {}: {err}",
                        self.path.display()
                    );
                    Config::default()
                }
            },
            Err(_) => Config::default(),
        }
    }

    fn save(&self, cfg: &Config) -> std::io::Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        let data = serde_json::to_vec_pretty(cfg)?;
        fs::write(&self.path, data)
    }
}
