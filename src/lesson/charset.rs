use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet, HashMap};

/// Where a symbol may be attached to a word
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Affinity {
    /// `LL`: prepended to a word
    LeftOnly,
    /// `RR`: appended to a word
    RightOnly,
    /// `LR` or unannotated: either side
    Either,
}

impl Affinity {
    /// Decode a two-letter annotation marker from the character list
    pub fn from_marker(marker: &str) -> Option<Self> {
        match marker {
            "LL" => Some(Affinity::LeftOnly),
            "RR" => Some(Affinity::RightOnly),
            "LR" => Some(Affinity::Either),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CharacterKind {
    Letter,
    Digit,
    Symbol(Affinity),
}

/// Symbol affinities decoded from the character list, keyed by symbol
pub type AffinityTable = BTreeMap<char, Affinity>;

/// Classify a single character. Symbols without an annotation may go on either side.
pub fn classify(c: char, affinities: &AffinityTable) -> CharacterKind {
    if c.is_alphabetic() {
        CharacterKind::Letter
    } else if c.is_ascii_digit() {
        CharacterKind::Digit
    } else {
        CharacterKind::Symbol(affinities.get(&c).copied().unwrap_or(Affinity::Either))
    }
}

/// Case folding used for all letter membership checks
pub fn fold(c: char) -> char {
    c.to_lowercase().next().unwrap_or(c)
}

/// Cumulative characters available to a lesson, split into this lesson's new characters
/// and everything introduced before it. Built by the course builder; never mutated by
/// lesson composition.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct KnownCharSet {
    new: Vec<char>,
    previous: Vec<char>,
}

impl KnownCharSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot for the next lesson: everything known so far becomes previous, and the
    /// lesson's characters that were not already known become new.
    pub fn advance(&self, new_chars: &[char]) -> Self {
        let mut previous = self.previous.clone();
        previous.extend(self.new.iter().copied());

        let mut new = Vec::new();
        for &c in new_chars {
            if !previous.contains(&c) && !new.contains(&c) {
                new.push(c);
            }
        }
        Self { new, previous }
    }

    pub fn new_chars(&self) -> &[char] {
        &self.new
    }

    pub fn previous_chars(&self) -> &[char] {
        &self.previous
    }

    pub fn contains(&self, c: char) -> bool {
        self.new.contains(&c) || self.previous.contains(&c)
    }

    pub fn all(&self) -> impl Iterator<Item = char> + '_ {
        self.previous.iter().chain(self.new.iter()).copied()
    }

    pub fn is_empty(&self) -> bool {
        self.new.is_empty() && self.previous.is_empty()
    }

    pub fn len(&self) -> usize {
        self.new.len() + self.previous.len()
    }

    /// Folded forms of every known letter
    pub fn folded_letters(&self) -> BTreeSet<char> {
        self.all().filter(|c| c.is_alphabetic()).map(fold).collect()
    }
}

/// Known characters of one lesson classified once and grouped by kind
#[derive(Debug, Clone, Default)]
pub struct CharacterTable {
    kinds: HashMap<char, CharacterKind>,
    pub new_letters: Vec<char>,
    pub new_digits: Vec<char>,
    pub new_symbols: Vec<char>,
    pub previous_letters: Vec<char>,
    pub previous_digits: Vec<char>,
    pub previous_symbols: Vec<char>,
}

impl CharacterTable {
    pub fn build(known: &KnownCharSet, affinities: &AffinityTable) -> Self {
        let mut table = CharacterTable::default();
        for &c in known.new_chars() {
            let kind = classify(c, affinities);
            table.kinds.insert(c, kind);
            match kind {
                CharacterKind::Letter => table.new_letters.push(c),
                CharacterKind::Digit => table.new_digits.push(c),
                CharacterKind::Symbol(_) => table.new_symbols.push(c),
            }
        }
        for &c in known.previous_chars() {
            let kind = classify(c, affinities);
            table.kinds.insert(c, kind);
            match kind {
                CharacterKind::Letter => table.previous_letters.push(c),
                CharacterKind::Digit => table.previous_digits.push(c),
                CharacterKind::Symbol(_) => table.previous_symbols.push(c),
            }
        }
        table
    }

    pub fn kind(&self, c: char) -> Option<CharacterKind> {
        self.kinds.get(&c).copied()
    }

    pub fn affinity(&self, c: char) -> Affinity {
        match self.kind(c) {
            Some(CharacterKind::Symbol(affinity)) => affinity,
            _ => Affinity::Either,
        }
    }

    pub fn has_letters(&self) -> bool {
        !self.new_letters.is_empty() || !self.previous_letters.is_empty()
    }

    pub fn all_letters(&self) -> Vec<char> {
        let mut letters = self.new_letters.clone();
        letters.extend(self.previous_letters.iter().copied());
        letters
    }
}
