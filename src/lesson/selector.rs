use super::qualifier::covers;
use rand::seq::SliceRandom;
use rand::Rng;

/// Guaranteed number of words for one new letter
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Quota {
    pub letter: char,
    pub words: usize,
    /// Eligible words covering the letter; zero means combinations must cover it
    pub available: usize,
}

/// Trait for different strategies deciding which new letters get guaranteed words first
pub trait WordSelector {
    /// Coverage plan for `new_letters` given the introducing word pool and an estimate of
    /// how many introducing words the lesson will hold
    fn plan(&self, new_letters: &[char], pool: &[&str], budget: usize) -> Vec<Quota>;
}

/// One word per new letter in lesson order; everything else is drawn unordered
pub struct UnorderedSelector;

impl WordSelector for UnorderedSelector {
    fn plan(&self, new_letters: &[char], pool: &[&str], _budget: usize) -> Vec<Quota> {
        letter_counts(new_letters, pool)
            .into_iter()
            .map(|(letter, available)| Quota {
                letter,
                words: 1,
                available,
            })
            .collect()
    }
}

/// Rarity-first selection: letters with the fewest eligible words are served first and get
/// an even share of half the word budget, so abundant letters cannot starve rare ones
pub struct BalancedSelector;

impl WordSelector for BalancedSelector {
    fn plan(&self, new_letters: &[char], pool: &[&str], budget: usize) -> Vec<Quota> {
        if new_letters.is_empty() {
            return Vec::new();
        }
        let quota = (budget / (2 * new_letters.len())).max(1);

        let mut counts = letter_counts(new_letters, pool);
        // stable: ties keep lesson order
        counts.sort_by_key(|&(_, available)| available);
        counts
            .into_iter()
            .map(|(letter, available)| Quota {
                letter,
                words: quota,
                available,
            })
            .collect()
    }
}

pub fn selector_for(balance_words: bool) -> Box<dyn WordSelector> {
    if balance_words {
        Box::new(BalancedSelector)
    } else {
        Box::new(UnorderedSelector)
    }
}

/// Number of pool words covering each new letter
pub fn letter_counts(new_letters: &[char], pool: &[&str]) -> Vec<(char, usize)> {
    new_letters
        .iter()
        .map(|&letter| (letter, pool.iter().filter(|w| covers(w, letter)).count()))
        .collect()
}

/// Words drawn without replacement until every word was used once, then reshuffled and
/// drawn again. A bag in frequency order hands out its words top-down on the first pass.
#[derive(Debug, Clone)]
pub struct WordBag<'a> {
    words: Vec<&'a str>,
    queue: Vec<&'a str>,
}

impl<'a> WordBag<'a> {
    pub fn new<R: Rng + ?Sized>(words: Vec<&'a str>, frequency_ordered: bool, rng: &mut R) -> Self {
        let mut queue = words.clone();
        if frequency_ordered {
            queue.reverse();
        } else {
            queue.shuffle(rng);
        }
        Self { words, queue }
    }

    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }

    pub fn draw<R: Rng + ?Sized>(&mut self, rng: &mut R) -> Option<&'a str> {
        if self.queue.is_empty() {
            self.refill(rng);
        }
        self.queue.pop()
    }

    /// Next queued word satisfying `pred`. Once none is queued, repeats a random matching
    /// word from the whole bag so a rare letter can still be covered.
    pub fn draw_matching<R, P>(&mut self, pred: P, rng: &mut R) -> Option<&'a str>
    where
        R: Rng + ?Sized,
        P: Fn(&str) -> bool,
    {
        if let Some(pos) = self.queue.iter().rposition(|w| pred(w)) {
            return Some(self.queue.remove(pos));
        }
        let matching: Vec<&'a str> = self.words.iter().copied().filter(|w| pred(w)).collect();
        matching.choose(rng).copied()
    }

    fn refill<R: Rng + ?Sized>(&mut self, rng: &mut R) {
        self.queue = self.words.clone();
        self.queue.shuffle(rng);
    }
}
