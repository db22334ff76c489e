use super::charset::{CharacterTable, KnownCharSet};
use super::combinations::{self, Combinations};
use super::index::DictionaryIndex;
use super::interleave::{attach_symbols, insert_numbers, Share};
use super::qualifier::{covers, WordQualifier, WordRole};
use super::selector::{selector_for, Quota, WordBag};
use super::spec::LessonSpec;
use super::text::{LessonText, Novelty, Token, TokenKind};
use crate::error::{LessonError, Result};
use crate::util::{mean, title_case};
use rand::seq::SliceRandom;
use rand::Rng;
use std::collections::VecDeque;

/// Compose the text of one lesson.
///
/// `step` is the 0-based position of the lesson in the course and selects the dictionary
/// words eligible so far. Only a lesson without any character to type is an error; a
/// missing dictionary, too few words or an unreachable length degrade to combinations or a
/// shorter lesson.
pub fn compose<R: Rng + ?Sized>(
    spec: &LessonSpec,
    known: &KnownCharSet,
    dictionary: Option<&DictionaryIndex>,
    step: usize,
    rng: &mut R,
) -> Result<LessonText> {
    if known.is_empty() {
        return Err(LessonError::InsufficientCharacters { lesson: step + 1 });
    }
    let composer = Composer::new(spec, known, dictionary, step);
    Ok(composer.run(rng))
}

struct Composer<'a> {
    spec: &'a LessonSpec,
    known: &'a KnownCharSet,
    table: CharacterTable,
    introducing: Vec<&'a str>,
    reinforcing: Vec<&'a str>,
    frequency_ordered: bool,
}

impl<'a> Composer<'a> {
    fn new(
        spec: &'a LessonSpec,
        known: &'a KnownCharSet,
        dictionary: Option<&'a DictionaryIndex>,
        step: usize,
    ) -> Self {
        let opts = &spec.options;
        let table = CharacterTable::build(known, &spec.affinities);
        let qualifier = WordQualifier::new(known, opts.min_word_length, opts.max_word_length);

        let (introducing, reinforcing): (Vec<&str>, Vec<&str>) = match dictionary {
            Some(index) => index
                .eligible(step)
                .filter(|w| qualifier.qualifies(w))
                .partition(|w| qualifier.role(w) == WordRole::IntroducesNew),
            None => (Vec::new(), Vec::new()),
        };

        Self {
            spec,
            known,
            table,
            introducing,
            reinforcing,
            frequency_ordered: dictionary.map(|d| d.frequency_ordered()).unwrap_or(false),
        }
    }

    fn run<R: Rng + ?Sized>(&self, rng: &mut R) -> LessonText {
        let opts = &self.spec.options;
        let target = opts.characters_per_lesson;
        let mut picker = Picker::new(self, rng);

        let overhead = self.overhead_per_word();
        let mut tokens: Vec<Token> = Vec::new();
        let mut letters_len = 0usize;
        if self.table.has_letters() {
            loop {
                let projected = letters_len as f64 + tokens.len() as f64 * overhead - 1.0;
                if !picker.coverage_pending() && projected >= target as f64 {
                    break;
                }
                match picker.next(rng) {
                    Some(token) => {
                        letters_len += token.char_len();
                        tokens.push(token);
                    }
                    None => break,
                }
            }
        }
        tokens.shuffle(rng);

        let word_count = tokens.len();
        let symbols = Share::split(
            opts.symbols_density,
            word_count,
            opts.previous_symbols_fraction,
            self.table.new_symbols.len(),
            self.table.previous_symbols.len(),
        );
        if !attach_symbols(&mut tokens, &self.table, symbols, rng) {
            tracing::debug!(
                "lesson on line {}: no word to attach {} symbols to",
                self.spec.line,
                symbols.total()
            );
        }

        let numbers = Share::split(
            opts.numbers_density,
            word_count,
            opts.previous_numbers_fraction,
            self.table.new_digits.len(),
            self.table.previous_digits.len(),
        );
        insert_numbers(&mut tokens, &self.table, numbers, opts.max_number_length, rng);

        // rounding and random number lengths can leave the text a few characters short
        let mut text = LessonText {
            tokens,
            uncovered: Vec::new(),
        };
        let mut len = text.char_len();
        if self.table.has_letters() && len < target {
            tracing::debug!(
                "lesson on line {}: topping up {len} of {target} characters",
                self.spec.line
            );
            while len < target {
                let Some(token) = picker.next(rng) else {
                    break;
                };
                len += token.char_len() + usize::from(!text.tokens.is_empty());
                let pos = rng.gen_range(0..=text.tokens.len());
                text.tokens.insert(pos, token);
            }
        }

        let new_chars = self.known.new_chars();
        for token in text.tokens.iter_mut() {
            token.novelty = if token.chars().any(|c| new_chars.contains(&c)) {
                Novelty::New
            } else {
                Novelty::Previous
            };
        }
        text.uncovered = new_chars
            .iter()
            .copied()
            .filter(|&c| !text.contains_char(c))
            .collect();
        if !text.uncovered.is_empty() {
            tracing::warn!(
                "lesson on line {}: could not place {:?}",
                self.spec.line,
                text.uncovered
            );
        }
        text
    }

    /// Would emitting `word` exercise `letter`, once capitalization is applied
    fn emits(&self, word: &str, letter: char) -> bool {
        covers(word, letter) && (!letter.is_uppercase() || self.can_title_case(word))
    }

    /// Dictionary word, title-cased where the lesson calls for capitals
    fn word_token<R: Rng + ?Sized>(&self, word: &str, rng: &mut R) -> Token {
        let capitalize = if self.table.new_letters.iter().any(|c| c.is_uppercase()) {
            true
        } else if self.table.previous_letters.iter().any(|c| c.is_uppercase()) {
            rng.gen_bool(0.5)
        } else {
            false
        };

        let text = if capitalize && self.can_title_case(word) {
            title_case(word)
        } else {
            word.to_string()
        };
        Token::new(TokenKind::Word, text)
    }

    /// The capital must be known, and title-casing must not erase the only occurrence of a
    /// lowercase new letter
    fn can_title_case(&self, word: &str) -> bool {
        let mut chars = word.chars();
        let Some(first) = chars.next() else {
            return false;
        };
        let titled = title_case(&first.to_string());
        if !titled.chars().all(|c| self.known.contains(c)) || titled == first.to_string() {
            return false;
        }
        !(self.table.new_letters.contains(&first) && !chars.any(|c| c == first))
    }

    fn average_word_len(&self) -> f64 {
        let lens: Vec<f64> = self
            .introducing
            .iter()
            .chain(self.reinforcing.iter())
            .map(|w| w.chars().count() as f64)
            .collect();
        mean(&lens).unwrap_or_else(|| {
            let max = self.spec.options.max_combination_length.max(1) as f64;
            (max.min(2.0) + max) / 2.0
        })
    }

    /// Expected characters each word brings besides its letters: the separating space plus
    /// the symbols and numbers this lesson will interleave
    fn overhead_per_word(&self) -> f64 {
        let opts = &self.spec.options;
        let table = &self.table;
        let symbols = Share::per_word(
            opts.symbols_density,
            opts.previous_symbols_fraction,
            table.new_symbols.len(),
            table.previous_symbols.len(),
        );
        let numbers = Share::per_word(
            opts.numbers_density,
            opts.previous_numbers_fraction,
            table.new_digits.len(),
            table.previous_digits.len(),
        );
        let avg_number_len = (1.0 + opts.max_number_length as f64) / 2.0;
        1.0 + symbols + numbers * (avg_number_len + 1.0)
    }
}

/// Word and combination tokens for one lesson: coverage quotas first, then reinforcement and
/// introducing words at the configured ratio, combinations where no word fits
struct Picker<'c, 'a> {
    composer: &'c Composer<'a>,
    coverage: VecDeque<Quota>,
    introducing: WordBag<'a>,
    reinforcing: WordBag<'a>,
    combos: Combinations,
    all_letters: Vec<char>,
    slots: usize,
    reinforcements: usize,
}

impl<'c, 'a> Picker<'c, 'a> {
    fn new<R: Rng + ?Sized>(composer: &'c Composer<'a>, rng: &mut R) -> Self {
        let opts = &composer.spec.options;
        let table = &composer.table;

        let budget = (opts.characters_per_lesson as f64
            / (composer.average_word_len() + composer.overhead_per_word()))
        .ceil();
        let new_budget = (budget * (1.0 - opts.previous_words_fraction)) as usize;
        let coverage = selector_for(opts.balance_words)
            .plan(&table.new_letters, &composer.introducing, new_budget)
            .into_iter()
            .collect();

        let introducing = WordBag::new(
            composer.introducing.clone(),
            composer.frequency_ordered,
            rng,
        );
        let reinforcing = WordBag::new(
            composer.reinforcing.clone(),
            composer.frequency_ordered,
            rng,
        );
        let combos = combinations::generate(
            &table.new_letters,
            &table.previous_letters,
            opts.max_combination_length,
            rng,
        );

        Self {
            composer,
            coverage,
            introducing,
            reinforcing,
            combos,
            all_letters: table.all_letters(),
            slots: 0,
            reinforcements: 0,
        }
    }

    fn coverage_pending(&self) -> bool {
        !self.coverage.is_empty()
    }

    fn next<R: Rng + ?Sized>(&mut self, rng: &mut R) -> Option<Token> {
        let composer = self.composer;
        let opts = &composer.spec.options;
        self.slots += 1;

        if let Some(quota) = self.coverage.front_mut() {
            let Quota {
                letter, available, ..
            } = *quota;
            quota.words -= 1;
            if quota.words == 0 {
                self.coverage.pop_front();
            }
            let word = if available > 0 {
                self.introducing
                    .draw_matching(|w| composer.emits(w, letter), rng)
            } else {
                None
            };
            return match word {
                Some(word) => Some(composer.word_token(word, rng)),
                None => {
                    tracing::debug!("no dictionary word covers '{letter}', using combinations");
                    let mut focused = combinations::generate(
                        &[letter],
                        &self.all_letters,
                        opts.max_combination_length,
                        rng,
                    );
                    next_combination(&mut focused)
                }
            };
        }

        let reinforce = composer.table.new_letters.is_empty()
            || (!self.reinforcing.is_empty()
                && (self.reinforcements as f64)
                    < (opts.previous_words_fraction * self.slots as f64).round());
        let word = if reinforce {
            self.reinforcements += 1;
            self.reinforcing.draw(rng)
        } else {
            self.introducing.draw(rng)
        };
        match word {
            Some(word) => Some(composer.word_token(word, rng)),
            None => next_combination(&mut self.combos),
        }
    }
}

fn next_combination(combos: &mut Combinations) -> Option<Token> {
    combos.next().map(|c| Token::new(TokenKind::Combination, c))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::LessonOptions;
    use crate::lesson::charset::{Affinity, AffinityTable};
    use assert_matches::assert_matches;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn opts(len: usize) -> LessonOptions {
        LessonOptions {
            characters_per_lesson: len,
            ..LessonOptions::default()
        }
    }

    fn spec(chars: &str, options: LessonOptions) -> LessonSpec {
        LessonSpec::new(chars.chars().collect(), options)
    }

    fn rng() -> StdRng {
        StdRng::seed_from_u64(2024)
    }

    #[test]
    fn nothing_known_is_an_error() {
        let err = compose(&spec("", opts(100)), &KnownCharSet::new(), None, 4, &mut rng());
        assert_matches!(err, Err(LessonError::InsufficientCharacters { lesson: 5 }));
    }

    #[test]
    fn first_lesson_without_dictionary_is_all_combinations() {
        let known = KnownCharSet::new().advance(&['j', 'f']);
        let options = LessonOptions {
            max_combination_length: 4,
            ..opts(300)
        };
        let text = compose(&spec("jf", options), &known, None, 0, &mut rng()).unwrap();

        assert!(!text.is_empty());
        for token in &text.tokens {
            assert_eq!(token.kind, TokenKind::Combination);
            assert!((2..=4).contains(&token.text.chars().count()));
            assert!(token.text.chars().all(|c| c == 'j' || c == 'f'));
            assert_eq!(token.novelty, Novelty::New);
        }
        assert!(text.contains_char('j'));
        assert!(text.contains_char('f'));
        assert!(text.uncovered.is_empty());
    }

    #[test]
    fn length_is_a_soft_cap() {
        let known = KnownCharSet::new().advance(&['j', 'f']);
        let text = compose(&spec("jf", opts(500)), &known, None, 0, &mut rng()).unwrap();
        let len = text.char_len();
        assert!(len >= 500, "too short: {len}");
        assert!(len <= 500 + 5, "too long: {len}");
    }

    #[test]
    fn dictionary_words_are_preferred() {
        let specs = vec![spec("jfkdls", opts(200)), spec("a", opts(200))];
        let index = DictionaryIndex::build(&["flask", "salad", "falls", "jaffa", "lass"], &specs, false);
        let known = KnownCharSet::new().advance(&specs[0].new_chars).advance(&['a']);
        let text = compose(&specs[1], &known, Some(&index), 1, &mut rng()).unwrap();

        let words: Vec<&Token> = text
            .tokens
            .iter()
            .filter(|t| t.kind == TokenKind::Word)
            .collect();
        assert!(words.len() >= 5);
        assert!(text.tokens.iter().all(|t| t.text.contains('a')));
    }

    #[test]
    fn letters_missing_from_dictionary_fall_back_to_combinations() {
        let specs = vec![spec("asdf", opts(100)), spec("qz", opts(100))];
        let index = DictionaryIndex::build(&["sass", "fads", "quad"], &specs, false);
        let known = KnownCharSet::new().advance(&specs[0].new_chars).advance(&['q', 'z']);
        let text = compose(&specs[1], &known, Some(&index), 1, &mut rng()).unwrap();
        assert!(text.contains_char('q'));
        assert!(text.contains_char('z'));
        assert!(text
            .tokens
            .iter()
            .any(|t| t.kind == TokenKind::Combination && t.text.contains('z')));
    }

    #[test]
    fn right_only_symbols_are_appended() {
        let mut affinities = AffinityTable::new();
        affinities.insert(':', Affinity::RightOnly);
        let mut lesson = spec(":", opts(400));
        lesson.affinities = affinities;
        let known = KnownCharSet::new().advance(&['j', 'f', 'k', 'd']).advance(&[':']);

        let text = compose(&lesson, &known, None, 1, &mut rng()).unwrap();
        assert!(text.contains_char(':'));
        for token in &text.tokens {
            assert!(!token.prefix.contains(':'));
        }
    }

    #[test]
    fn numbers_follow_density() {
        // single-digit numbers keep the projected length exact
        let options = LessonOptions {
            numbers_density: 1.0,
            previous_numbers_fraction: 0.0,
            max_number_length: 1,
            ..opts(300)
        };
        let known = KnownCharSet::new().advance(&['j', 'f']).advance(&['1', '2']);
        let text = compose(&spec("12", options), &known, None, 1, &mut rng()).unwrap();
        assert_eq!(text.count_of(TokenKind::Number), text.word_count());
    }

    #[test]
    fn symbols_without_letters_are_flagged() {
        let known = KnownCharSet::new().advance(&['$']);
        let text = compose(&spec("$", opts(100)), &known, None, 0, &mut rng()).unwrap();
        assert!(text.is_empty());
        assert_eq!(text.uncovered, vec!['$']);
    }

    #[test]
    fn uppercase_lessons_title_case_words() {
        let specs = vec![spec("asdl", opts(200)), spec("SDL", opts(200))];
        let index = DictionaryIndex::build(&["sads", "lads", "dads", "alas"], &specs, false);
        let known = KnownCharSet::new().advance(&specs[0].new_chars).advance(&['S', 'D', 'L']);
        let text = compose(&specs[1], &known, Some(&index), 1, &mut rng()).unwrap();
        assert!(text.contains_char('S'));
        assert!(text.contains_char('D'));
        assert!(text.contains_char('L'));
        for word in text.tokens.iter().filter(|t| t.kind == TokenKind::Word) {
            assert!(word.text.starts_with(char::is_uppercase), "{word}");
        }
    }

    #[test]
    fn same_seed_same_text() {
        let specs = vec![spec("fjdk", opts(300)), spec("a;", opts(300))];
        let index = DictionaryIndex::build(&["jaffa", "fad", "kafka", "dada"], &specs, false);
        let known = KnownCharSet::new().advance(&specs[0].new_chars).advance(&['a', ';']);
        let a = compose(&specs[1], &known, Some(&index), 1, &mut rng()).unwrap();
        let b = compose(&specs[1], &known, Some(&index), 1, &mut rng()).unwrap();
        assert_eq!(a.render(), b.render());
    }

    #[test]
    fn length_reached_with_earlier_symbols_and_digits() {
        let known = KnownCharSet::new()
            .advance(&"jfkdlsa".chars().collect::<Vec<_>>())
            .advance(&[':'])
            .advance(&['1', '2'])
            .advance(&['t']);
        for seed in 0..5 {
            let mut rng = StdRng::seed_from_u64(seed);
            let text = compose(&spec("t", opts(2000)), &known, None, 3, &mut rng).unwrap();
            let len = text.char_len();
            assert!(len >= 2000, "seed {seed}: too short: {len}");
            assert!(len <= 2000 + 60, "seed {seed}: too long: {len}");
            assert!(text.contains_char(':'));
            assert!(text.count_of(TokenKind::Number) > 0);
        }
    }

    #[test]
    fn review_lesson_reaches_length() {
        let known = KnownCharSet::new()
            .advance(&['j', 'f', 'k', 'd'])
            .advance(&[':'])
            .advance(&[]);
        let text = compose(&spec("", opts(2000)), &known, None, 2, &mut rng()).unwrap();
        assert!(text.char_len() >= 2000, "too short: {}", text.char_len());
    }

    fn balance_fixture(balance_words: bool) -> usize {
        let options = LessonOptions {
            balance_words,
            ..opts(600)
        };
        let specs = vec![spec("asdfjkl", options.clone()), spec("tz", options)];
        let words = [
            "salt", "last", "flat", "tall", "stalk", "slat", "daft", "fast", "task", "talk",
            "jazz",
        ];
        let index = DictionaryIndex::build(&words, &specs, false);
        let known = KnownCharSet::new().advance(&specs[0].new_chars).advance(&['t', 'z']);
        let text = compose(&specs[1], &known, Some(&index), 1, &mut rng()).unwrap();
        assert_eq!(text.count_of(TokenKind::Combination), 0);
        text.tokens.iter().filter(|t| t.text == "jazz").count()
    }

    #[test]
    fn balance_words_favours_rare_letters() {
        let balanced = balance_fixture(true);
        let unbalanced = balance_fixture(false);
        assert!(unbalanced >= 1);
        assert!(
            balanced > 2 * unbalanced,
            "balanced {balanced}, unbalanced {unbalanced}"
        );
    }

    #[test]
    fn introducing_words_are_reused_before_combinations() {
        let specs = vec![spec("asdfjkl", opts(1000)), spec("t", opts(1000))];
        let index = DictionaryIndex::build(&["salt", "last", "flat", "tall", "stalk"], &specs, false);
        let known = KnownCharSet::new().advance(&specs[0].new_chars).advance(&['t']);
        let text = compose(&specs[1], &known, Some(&index), 1, &mut rng()).unwrap();

        assert_eq!(text.count_of(TokenKind::Combination), 0);
        assert!(text.count_of(TokenKind::Word) > 100);
        assert!(text.char_len() >= 1000);
    }

    #[test]
    fn capital_falls_back_to_combinations_when_title_case_is_refused() {
        // every word starting with 'l' has no other 'l', so title-casing would hide the
        // lowercase letter
        let specs = vec![spec("asdf", opts(300)), spec("lL", opts(300))];
        let index = DictionaryIndex::build(&["lads", "lass", "salad", "falls"], &specs, false);
        let known = KnownCharSet::new().advance(&specs[0].new_chars).advance(&['l', 'L']);
        let text = compose(&specs[1], &known, Some(&index), 1, &mut rng()).unwrap();

        assert!(text.contains_char('L'));
        assert!(text.contains_char('l'));
        assert!(text.uncovered.is_empty());
    }
}
