use crate::error::Result;
use rand::seq::SliceRandom;
use rand::Rng;
use serde::Deserialize;
use std::fs;
use std::path::Path;

/// A JSON word list: `{"name": "english", "size": 200, "words": [...]}`
#[derive(Deserialize, Clone, Debug)]
pub struct WordList {
    pub name: String,
    pub size: u32,
    pub words: Vec<String>,
}

/// Words available for lesson text, in the order they will be offered to the composer
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Dictionary {
    pub words: Vec<String>,
}

impl Dictionary {
    /// Load a dictionary file. `.json` files are read as a [`WordList`]; anything else as a
    /// plain word list.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let contents = fs::read_to_string(path)?;
        let is_json = path
            .extension()
            .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));

        let dictionary = if is_json {
            let list: WordList = serde_json::from_str(&contents)?;
            tracing::debug!("word list '{}' declares {} words", list.name, list.size);
            Self::from_words(list.words.iter().map(String::as_str))
        } else {
            Self::parse(&contents)
        };
        tracing::info!(
            "loaded {} dictionary words from {}",
            dictionary.len(),
            path.display()
        );
        Ok(dictionary)
    }

    /// Plain word list, one entry per line. Only the first column is used and affix flags
    /// after `/` are dropped, so hunspell style `.dic` files work as is.
    pub fn parse(contents: &str) -> Self {
        Self::from_words(contents.lines())
    }

    pub fn from_words<'a, I>(entries: I) -> Self
    where
        I: IntoIterator<Item = &'a str>,
    {
        let words = entries.into_iter().filter_map(normalize).collect();
        Self { words }
    }

    pub fn shuffle<R: Rng + ?Sized>(&mut self, rng: &mut R) {
        self.words.shuffle(rng);
    }

    pub fn len(&self) -> usize {
        self.words.len()
    }

    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }
}

fn normalize(entry: &str) -> Option<String> {
    let word = entry.split_whitespace().next()?;
    let word = word.split('/').next().unwrap_or(word);
    if word.is_empty() {
        None
    } else {
        Some(word.to_lowercase())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::LessonError;
    use assert_matches::assert_matches;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_plain_text_entries_are_normalized() {
        let dict = Dictionary::parse("Jada/SM 12\n\n  fada\r\nKafka po:noun\n/\n");
        assert_eq!(dict.words, vec!["jada", "fada", "kafka"]);
    }

    #[test]
    fn test_json_word_list() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("english.json");
        fs::write(
            &path,
            r#"{"name": "english", "size": 3, "words": ["The", "of", "and"]}"#,
        )
        .unwrap();

        let dict = Dictionary::load(&path).unwrap();
        assert_eq!(dict.words, vec!["the", "of", "and"]);
    }

    #[test]
    fn test_plain_text_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("words.dic");
        fs::write(&path, "jaff\ndada/S\n").unwrap();
        let dict = Dictionary::load(&path).unwrap();
        assert_eq!(dict.len(), 2);
    }

    #[test]
    fn test_bad_json_is_a_dictionary_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("broken.json");
        fs::write(&path, "{\"words\": ").unwrap();
        assert_matches!(Dictionary::load(&path), Err(LessonError::Dictionary(_)));
    }

    #[test]
    fn test_missing_file() {
        assert_matches!(
            Dictionary::load("/nonexistent/words.txt"),
            Err(LessonError::Io(_))
        );
    }

    #[test]
    fn test_shuffle_is_seeded() {
        let words: Vec<String> = (0..50).map(|i| format!("w{i}")).collect();
        let mut a = Dictionary::from_words(words.iter().map(String::as_str));
        let mut b = a.clone();
        a.shuffle(&mut StdRng::seed_from_u64(4));
        b.shuffle(&mut StdRng::seed_from_u64(4));
        assert_eq!(a, b);
        assert_ne!(a.words, words);
    }
}
