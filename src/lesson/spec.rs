use super::charset::AffinityTable;
use crate::config::LessonOptions;

/// One step of a course as read from the character list
#[derive(Debug, Clone, PartialEq)]
pub struct LessonSpec {
    /// 1-based line in the character list
    pub line: usize,
    /// Characters introduced by this step, in order, without duplicates.
    /// Empty for a review lesson.
    pub new_chars: Vec<char>,
    pub options: LessonOptions,
    /// Symbol affinities annotated up to and including this step
    pub affinities: AffinityTable,
}

impl LessonSpec {
    pub fn new(new_chars: Vec<char>, options: LessonOptions) -> Self {
        Self {
            line: 0,
            new_chars,
            options,
            affinities: AffinityTable::new(),
        }
    }

    pub fn is_review(&self) -> bool {
        self.new_chars.is_empty()
    }

    /// Lesson characters as shown in titles
    pub fn title(&self) -> String {
        self.new_chars.iter().collect()
    }
}
