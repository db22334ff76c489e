pub mod charset;
pub mod combinations;
pub mod composer;
pub mod course;
pub mod index;
pub mod interleave;
pub mod qualifier;
pub mod selector;
pub mod spec;
pub mod text;

// Re-export the main types for convenience
pub use charset::{classify, Affinity, AffinityTable, CharacterKind, KnownCharSet};
pub use composer::compose;
pub use course::{CourseBuilder, Lesson};
pub use index::DictionaryIndex;
pub use qualifier::{qualifies, WordQualifier, WordRole};
pub use selector::{BalancedSelector, UnorderedSelector, WordSelector};
pub use spec::LessonSpec;
pub use text::{LessonText, Novelty, Token, TokenKind};

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::LessonOptions;

    #[test]
    fn test_integrated_functionality() {
        let options = LessonOptions {
            characters_per_lesson: 300,
            ..LessonOptions::default()
        };
        let lessons: Vec<LessonSpec> = ["jf", "kd", "a", ";"]
            .iter()
            .map(|l| LessonSpec::new(l.chars().collect(), options.clone()))
            .collect();
        let words = ["jada", "fada", "kafka", "jaff", "dada"];
        let index = DictionaryIndex::build(&words, &lessons, false);

        let course = CourseBuilder::new(&lessons, Some(&index))
            .with_seed(3)
            .build_all();
        assert_eq!(course.len(), 4);

        let third = course[2].as_ref().unwrap();
        assert!(third.text.contains_char('a'));
        assert!(third
            .text
            .tokens
            .iter()
            .any(|t| t.kind == TokenKind::Word));
    }
}
