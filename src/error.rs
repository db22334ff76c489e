use thiserror::Error;

/// Errors raised while reading lesson inputs or composing lessons
#[derive(Debug, Error)]
pub enum LessonError {
    /// The lesson has neither new nor previously learned characters
    #[error("lesson {lesson} has no characters to build on")]
    InsufficientCharacters { lesson: usize },

    /// The character list is structurally invalid
    #[error("malformed lesson specification on line {line}: {reason}")]
    MalformedSpec { line: usize, reason: String },

    #[error("lesson {requested} requested but the character list only has {available} lessons")]
    LessonOutOfRange { requested: usize, available: usize },

    #[error("line {line} of the character list holds no lesson")]
    NoLessonOnLine { line: usize },

    #[error("invalid options: {0}")]
    InvalidOptions(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("dictionary error: {0}")]
    Dictionary(#[from] serde_json::Error),
}

impl LessonError {
    pub fn malformed(line: usize, reason: impl Into<String>) -> Self {
        LessonError::MalformedSpec {
            line,
            reason: reason.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, LessonError>;
