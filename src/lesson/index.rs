use super::charset::fold;
use super::spec::LessonSpec;
use std::collections::{BTreeMap, HashSet};

/// Dictionary words grouped by the first lesson step at which they become typeable.
/// Built once before composition and shared read-only by every lesson.
#[derive(Debug, Clone, Default)]
pub struct DictionaryIndex {
    by_step: Vec<Vec<String>>,
    frequency_ordered: bool,
}

impl DictionaryIndex {
    /// Index `words` against the lesson progression. Words containing a character that is
    /// not a letter of the course, or never introduced, are left out.
    pub fn build<S: AsRef<str>>(
        words: &[S],
        lessons: &[LessonSpec],
        frequency_ordered: bool,
    ) -> Self {
        let mut introduced_at: BTreeMap<char, usize> = BTreeMap::new();
        for (step, lesson) in lessons.iter().enumerate() {
            for &c in lesson.new_chars.iter().filter(|c| c.is_alphabetic()) {
                introduced_at.entry(fold(c)).or_insert(step);
            }
        }

        let mut by_step: Vec<Vec<String>> = vec![Vec::new(); lessons.len()];
        let mut seen: HashSet<&str> = HashSet::new();
        let mut skipped = 0usize;
        for word in words {
            let word = word.as_ref();
            if word.is_empty() || !seen.insert(word) {
                continue;
            }
            match first_typeable_step(word, &introduced_at) {
                Some(step) => by_step[step].push(word.to_string()),
                None => skipped += 1,
            }
        }

        let indexed: usize = by_step.iter().map(Vec::len).sum();
        tracing::debug!("dictionary index: {indexed} words usable, {skipped} never typeable");

        Self {
            by_step,
            frequency_ordered,
        }
    }

    /// Words usable at `step`, earliest-introduced first, in dictionary order within a step
    pub fn eligible(&self, step: usize) -> impl Iterator<Item = &str> + '_ {
        self.by_step
            .iter()
            .take(step + 1)
            .flatten()
            .map(String::as_str)
    }

    /// Words that first become typeable at exactly `step`
    pub fn introduced_at(&self, step: usize) -> &[String] {
        self.by_step.get(step).map(Vec::as_slice).unwrap_or(&[])
    }

    /// True when the source list was kept in frequency order rather than shuffled
    pub fn frequency_ordered(&self) -> bool {
        self.frequency_ordered
    }

    pub fn len(&self) -> usize {
        self.by_step.iter().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

fn first_typeable_step(word: &str, introduced_at: &BTreeMap<char, usize>) -> Option<usize> {
    let mut step = 0;
    for c in word.chars().filter(|c| !c.is_whitespace()) {
        if !c.is_alphabetic() {
            return None;
        }
        step = step.max(*introduced_at.get(&fold(c))?);
    }
    Some(step)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::LessonOptions;

    fn lessons(lines: &[&str]) -> Vec<LessonSpec> {
        lines
            .iter()
            .map(|l| LessonSpec::new(l.chars().collect(), LessonOptions::default()))
            .collect()
    }

    #[test]
    fn words_land_on_their_first_typeable_step() {
        let specs = lessons(&["jf", "kd", "ls", "a", ":"]);
        let words = ["jaffa", "fjdk", "salad", "flask", "ask:", "desk"];
        let index = DictionaryIndex::build(&words, &specs, false);

        assert_eq!(index.introduced_at(0), &[] as &[String]);
        assert_eq!(index.introduced_at(1), &["fjdk".to_string()]);
        assert_eq!(
            index.introduced_at(3),
            &["jaffa".to_string(), "salad".to_string(), "flask".to_string()]
        );
        assert_eq!(index.len(), 4);
    }

    #[test]
    fn eligibility_is_cumulative() {
        let specs = lessons(&["jf", "kd", "ls", "a"]);
        let index = DictionaryIndex::build(&["fjdk", "salad", "jfj"], &specs, true);

        assert_eq!(index.eligible(0).collect::<Vec<_>>(), vec!["jfj"]);
        assert_eq!(index.eligible(1).collect::<Vec<_>>(), vec!["jfj", "fjdk"]);
        assert_eq!(index.eligible(3).count(), 3);
        assert_eq!(index.eligible(99).count(), 3);
        assert!(index.frequency_ordered());
    }

    #[test]
    fn matching_ignores_case_and_dedupes() {
        let specs = lessons(&["JF", "kd"]);
        let index = DictionaryIndex::build(&["jfk", "JFK", "jfk"], &specs, false);
        assert_eq!(index.len(), 2);
        assert_eq!(index.introduced_at(1).len(), 2);
    }

    #[test]
    fn empty_course_indexes_nothing() {
        let index = DictionaryIndex::build(&["anything"], &[], false);
        assert!(index.is_empty());
        assert_eq!(index.eligible(0).count(), 0);
    }
}
