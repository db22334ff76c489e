use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenKind {
    /// Dictionary word
    Word,
    /// Generated letter combination
    Combination,
    /// Generated digit string
    Number,
}

/// Whether a token exercises any character introduced by its lesson
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Novelty {
    New,
    Previous,
}

/// One whitespace-delimited unit of lesson text. Symbols live in `prefix`/`suffix` of the
/// word they are attached to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub kind: TokenKind,
    pub text: String,
    pub prefix: String,
    pub suffix: String,
    pub novelty: Novelty,
}

impl Token {
    pub fn new(kind: TokenKind, text: impl Into<String>) -> Self {
        Self {
            kind,
            text: text.into(),
            prefix: String::new(),
            suffix: String::new(),
            novelty: Novelty::Previous,
        }
    }

    /// Words and combinations can carry symbols; numbers stand alone
    pub fn is_wordlike(&self) -> bool {
        matches!(self.kind, TokenKind::Word | TokenKind::Combination)
    }

    pub fn char_len(&self) -> usize {
        self.prefix.chars().count() + self.text.chars().count() + self.suffix.chars().count()
    }

    pub fn chars(&self) -> impl Iterator<Item = char> + '_ {
        self.prefix
            .chars()
            .chain(self.text.chars())
            .chain(self.suffix.chars())
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}{}", self.prefix, self.text, self.suffix)
    }
}

/// Composed content of a single lesson
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LessonText {
    pub tokens: Vec<Token>,
    /// New characters that could not be placed, e.g. symbols in a lesson without any
    /// word to attach them to
    pub uncovered: Vec<char>,
}

impl LessonText {
    /// Tokens joined by single spaces
    pub fn render(&self) -> String {
        let mut out = String::with_capacity(self.char_len());
        for (i, token) in self.tokens.iter().enumerate() {
            if i > 0 {
                out.push(' ');
            }
            out.push_str(&token.prefix);
            out.push_str(&token.text);
            out.push_str(&token.suffix);
        }
        out
    }

    /// Length of the rendered text in characters
    pub fn char_len(&self) -> usize {
        let tokens: usize = self.tokens.iter().map(Token::char_len).sum();
        tokens + self.tokens.len().saturating_sub(1)
    }

    pub fn word_count(&self) -> usize {
        self.tokens.iter().filter(|t| t.is_wordlike()).count()
    }

    pub fn count_of(&self, kind: TokenKind) -> usize {
        self.tokens.iter().filter(|t| t.kind == kind).count()
    }

    pub fn contains_char(&self, c: char) -> bool {
        self.tokens.iter().any(|t| t.chars().any(|x| x == c))
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }
}

impl fmt::Display for LessonText {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.render())
    }
}
