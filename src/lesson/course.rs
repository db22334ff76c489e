use super::charset::KnownCharSet;
use super::composer::compose;
use super::index::DictionaryIndex;
use super::spec::LessonSpec;
use super::text::LessonText;
use crate::error::{LessonError, Result};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// A composed lesson ready for formatting
#[derive(Debug, Clone, PartialEq)]
pub struct Lesson {
    /// 0-based position in the course
    pub step: usize,
    /// Line of the character list the lesson came from
    pub line: usize,
    pub new_chars: Vec<char>,
    pub text: LessonText,
}

impl Lesson {
    pub fn title(&self) -> String {
        self.new_chars.iter().collect()
    }
}

/// Drives lesson composition across a course, carrying the cumulative character set
pub struct CourseBuilder<'a> {
    lessons: &'a [LessonSpec],
    dictionary: Option<&'a DictionaryIndex>,
    seed: u64,
}

impl<'a> CourseBuilder<'a> {
    /// Builder with a random base seed; see [`CourseBuilder::with_seed`] for reproducible runs
    pub fn new(lessons: &'a [LessonSpec], dictionary: Option<&'a DictionaryIndex>) -> Self {
        Self {
            lessons,
            dictionary,
            seed: rand::thread_rng().gen(),
        }
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }

    /// Known characters at every step. Step k holds exactly the characters introduced by
    /// steps 0..=k, independent of whether any lesson composes successfully.
    pub fn known_sets(&self) -> Vec<KnownCharSet> {
        let mut known = KnownCharSet::new();
        self.lessons
            .iter()
            .map(|lesson| {
                known = known.advance(&lesson.new_chars);
                known.clone()
            })
            .collect()
    }

    /// Compose every lesson. A lesson that fails does not stop the others.
    pub fn build_all(&self) -> Vec<Result<Lesson>> {
        tracing::debug!("composing {} lessons with seed {}", self.lessons.len(), self.seed);
        self.known_sets()
            .iter()
            .enumerate()
            .map(|(step, known)| {
                let outcome = self.compose_step(step, known);
                if let Err(err) = &outcome {
                    tracing::warn!("skipping lesson {}: {err}", step + 1);
                }
                outcome
            })
            .collect()
    }

    /// Compose only the lesson at 0-based `step`, with every earlier step folded into the
    /// known characters
    pub fn build_one(&self, step: usize) -> Result<Lesson> {
        if step >= self.lessons.len() {
            return Err(LessonError::LessonOutOfRange {
                requested: step + 1,
                available: self.lessons.len(),
            });
        }
        tracing::debug!("composing lesson {} with seed {}", step + 1, self.seed);
        let known = self.lessons[..=step]
            .iter()
            .fold(KnownCharSet::new(), |known, lesson| known.advance(&lesson.new_chars));
        self.compose_step(step, &known)
    }

    /// The lesson read from `line` of the character list (1-based, blank lines count)
    pub fn build_line(&self, line: usize) -> Result<Lesson> {
        let step = self
            .lessons
            .iter()
            .position(|lesson| lesson.line == line)
            .ok_or(LessonError::NoLessonOnLine { line })?;
        self.build_one(step)
    }

    fn compose_step(&self, step: usize, known: &KnownCharSet) -> Result<Lesson> {
        let spec = &self.lessons[step];
        tracing::info!("processing: {}", spec.title());
        let mut rng = lesson_rng(self.seed, step);
        let text = compose(spec, known, self.dictionary, step, &mut rng)?;
        Ok(Lesson {
            step,
            line: spec.line,
            new_chars: spec.new_chars.clone(),
            text,
        })
    }
}

/// Independent generator per lesson, so a lesson's text depends only on the base seed and
/// its position
fn lesson_rng(seed: u64, step: usize) -> StdRng {
    StdRng::seed_from_u64(seed ^ (step as u64).wrapping_mul(0x9E37_79B9_7F4A_7C15))
}
