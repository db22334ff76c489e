use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};

/// Shortest pseudo-word the generator emits, unless the configured maximum is lower
const MIN_COMBINATION_LENGTH: usize = 2;

/// Infinite stream of pseudo-words built from a lesson's letters.
///
/// Every item contains at least one of the `new` letters and fills its remaining positions
/// from `new` and `previous` alike. With no new letters (review lessons) items are drawn
/// from `previous` only. The stream owns its own random generator, so it can be dropped at
/// any point.
#[derive(Debug, Clone)]
pub struct Combinations {
    anchors: Vec<char>,
    pool: Vec<char>,
    min_len: usize,
    max_len: usize,
    rng: StdRng,
}

impl Iterator for Combinations {
    type Item = String;

    fn next(&mut self) -> Option<String> {
        let Combinations {
            anchors,
            pool,
            min_len,
            max_len,
            rng,
        } = self;
        if anchors.is_empty() {
            return None;
        }
        let len = rng.gen_range(*min_len..=*max_len);
        let anchor_pos = rng.gen_range(0..len);
        let mut word = String::with_capacity(len);
        for i in 0..len {
            let source: &[char] = if i == anchor_pos { anchors } else { pool };
            if let Some(&c) = source.choose(rng) {
                word.push(c);
            }
        }
        Some(word)
    }
}

/// Start a freshly seeded combination stream. The seed is drawn from `rng`, so repeated
/// calls give independent streams while a seeded caller stays reproducible.
pub fn generate<R: Rng + ?Sized>(
    new: &[char],
    previous: &[char],
    max_len: usize,
    rng: &mut R,
) -> Combinations {
    let mut pool: Vec<char> = Vec::with_capacity(new.len() + previous.len());
    for &c in new.iter().chain(previous) {
        if !pool.contains(&c) {
            pool.push(c);
        }
    }
    let anchors = if new.is_empty() {
        pool.clone()
    } else {
        let mut anchors = Vec::with_capacity(new.len());
        for &c in new {
            if !anchors.contains(&c) {
                anchors.push(c);
            }
        }
        anchors
    };
    let max_len = max_len.max(1);

    Combinations {
        anchors,
        pool,
        min_len: MIN_COMBINATION_LENGTH.min(max_len),
        max_len,
        rng: StdRng::seed_from_u64(rng.gen()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn seeded() -> StdRng {
        StdRng::seed_from_u64(7)
    }

    #[test]
    fn first_lesson_uses_only_new_letters() {
        let mut rng = seeded();
        for combo in generate(&['j', 'f'], &[], 4, &mut rng).take(500) {
            let len = combo.chars().count();
            assert!((2..=4).contains(&len), "bad length in {combo}");
            assert!(combo.chars().all(|c| c == 'j' || c == 'f'));
        }
    }

    #[test]
    fn every_combination_contains_a_new_letter() {
        let mut rng = seeded();
        let previous = ['j', 'f', 'k', 'd', 'l', 's'];
        for combo in generate(&['a'], &previous, 5, &mut rng).take(500) {
            assert!(combo.contains('a'), "{combo} misses the new letter");
            assert!(combo.chars().all(|c| c == 'a' || previous.contains(&c)));
        }
    }

    #[test]
    fn previous_letters_are_mixed_in() {
        let mut rng = seeded();
        let mixed = generate(&['a'], &['j', 'f'], 4, &mut rng)
            .take(200)
            .any(|combo| combo.contains('j') || combo.contains('f'));
        assert!(mixed);
    }

    #[test]
    fn review_lessons_draw_from_previous() {
        let mut rng = seeded();
        for combo in generate(&[], &['j', 'f'], 3, &mut rng).take(100) {
            assert!(combo.chars().all(|c| c == 'j' || c == 'f'));
        }
    }

    #[test]
    fn nothing_to_draw_from_yields_nothing() {
        let mut rng = seeded();
        assert_eq!(generate(&[], &[], 4, &mut rng).next(), None);
    }

    #[test]
    fn max_length_below_two_gives_single_letters() {
        let mut rng = seeded();
        for combo in generate(&['q'], &['a'], 1, &mut rng).take(20) {
            assert_eq!(combo, "q");
        }
    }

    #[test]
    fn same_parent_seed_same_stream() {
        let a: Vec<String> = generate(&['j', 'f'], &['k'], 4, &mut seeded())
            .take(50)
            .collect();
        let b: Vec<String> = generate(&['j', 'f'], &['k'], 4, &mut seeded())
            .take(50)
            .collect();
        assert_eq!(a, b);
    }

    #[test]
    fn consecutive_streams_are_independent() {
        let mut rng = seeded();
        let a: Vec<String> = generate(&['j', 'f'], &['k', 'd'], 4, &mut rng)
            .take(50)
            .collect();
        let b: Vec<String> = generate(&['j', 'f'], &['k', 'd'], 4, &mut rng)
            .take(50)
            .collect();
        assert_ne!(a, b);
    }
}
