use super::charset::{fold, KnownCharSet};
use std::collections::BTreeSet;

/// Whether a qualifying word exercises any of the lesson's new letters
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WordRole {
    IntroducesNew,
    Reinforcement,
}

/// Decides which dictionary words a lesson may use
#[derive(Debug, Clone)]
pub struct WordQualifier {
    known_letters: BTreeSet<char>,
    new_letters: Vec<char>,
    min_len: usize,
    max_len: usize,
}

impl WordQualifier {
    pub fn new(known: &KnownCharSet, min_len: usize, max_len: usize) -> Self {
        Self {
            known_letters: known.folded_letters(),
            new_letters: known
                .new_chars()
                .iter()
                .copied()
                .filter(|c| c.is_alphabetic())
                .collect(),
            min_len,
            max_len,
        }
    }

    /// Length within bounds and every character a known letter, ignoring case
    pub fn qualifies(&self, word: &str) -> bool {
        let len = word.chars().count();
        if len < self.min_len || len > self.max_len {
            return false;
        }
        word.chars()
            .all(|c| c.is_alphabetic() && self.known_letters.contains(&fold(c)))
    }

    pub fn role(&self, word: &str) -> WordRole {
        if self.new_letters.iter().any(|&c| covers(word, c)) {
            WordRole::IntroducesNew
        } else {
            WordRole::Reinforcement
        }
    }
}

/// One-off check; build a [`WordQualifier`] when testing many words
pub fn qualifies(word: &str, known: &KnownCharSet, min_len: usize, max_len: usize) -> bool {
    WordQualifier::new(known, min_len, max_len).qualifies(word)
}

/// Does emitting `word` exercise `letter`? Uppercase letters are exercised by title-casing,
/// so a word covers one when it starts with the lowercase form.
pub fn covers(word: &str, letter: char) -> bool {
    if letter.is_uppercase() {
        word.chars().next().map(fold) == Some(fold(letter))
    } else {
        word.contains(letter)
    }
}
