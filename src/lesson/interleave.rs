use super::charset::{Affinity, CharacterTable};
use super::text::{Token, TokenKind};
use crate::util::scaled_count;
use rand::seq::SliceRandom;
use rand::Rng;

/// How many symbols or numbers a lesson gets from its own and from earlier characters
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Share {
    pub new: usize,
    pub previous: usize,
}

impl Share {
    /// Split `round(density × word_count)` by `previous_fraction`. Without new characters
    /// only the previous share is used; without previous characters the whole target is new.
    /// Each new character is guaranteed one slot whenever there is at least one word.
    pub fn split(
        density: f64,
        word_count: usize,
        previous_fraction: f64,
        new_available: usize,
        previous_available: usize,
    ) -> Self {
        let total = scaled_count(density, word_count);
        let mut share = match (new_available > 0, previous_available > 0) {
            (false, false) => Share::default(),
            (true, false) => Share {
                new: total,
                previous: 0,
            },
            (false, true) => Share {
                new: 0,
                previous: scaled_count(previous_fraction, total),
            },
            (true, true) => {
                let previous = scaled_count(previous_fraction, total);
                Share {
                    new: total - previous,
                    previous,
                }
            }
        };
        if word_count > 0 {
            share.new = share.new.max(new_available);
        }
        share
    }

    /// Slots per word expected from [`Share::split`], before rounding and the coverage bump
    pub fn per_word(
        density: f64,
        previous_fraction: f64,
        new_available: usize,
        previous_available: usize,
    ) -> f64 {
        match (new_available > 0, previous_available > 0) {
            (false, false) => 0.0,
            (false, true) => density * previous_fraction,
            (true, _) => density,
        }
    }

    pub fn total(&self) -> usize {
        self.new + self.previous
    }
}

/// Attach the lesson's symbols to its word and combination tokens. Returns false when
/// there is nothing to attach to.
pub fn attach_symbols<R: Rng + ?Sized>(
    tokens: &mut [Token],
    table: &CharacterTable,
    share: Share,
    rng: &mut R,
) -> bool {
    let mut hosts: Vec<usize> = tokens
        .iter()
        .enumerate()
        .filter(|(_, t)| t.is_wordlike())
        .map(|(i, _)| i)
        .collect();
    if hosts.is_empty() {
        return share.total() == 0;
    }

    let mut symbols: Vec<char> = cycle_through(&table.new_symbols, share.new, rng);
    for _ in 0..share.previous {
        if let Some(&s) = table.previous_symbols.choose(rng) {
            symbols.push(s);
        }
    }
    symbols.shuffle(rng);

    // spread over distinct words before doubling up
    hosts.shuffle(rng);
    for (n, symbol) in symbols.into_iter().enumerate() {
        let token = &mut tokens[hosts[n % hosts.len()]];
        let prepend = match table.affinity(symbol) {
            Affinity::LeftOnly => true,
            Affinity::RightOnly => false,
            Affinity::Either => rng.gen_bool(0.5),
        };
        if prepend {
            token.prefix.insert(0, symbol);
        } else {
            token.suffix.push(symbol);
        }
    }
    true
}

/// Insert standalone number tokens at random positions
pub fn insert_numbers<R: Rng + ?Sized>(
    tokens: &mut Vec<Token>,
    table: &CharacterTable,
    share: Share,
    max_len: usize,
    rng: &mut R,
) {
    let mut digits: Vec<char> = table.new_digits.clone();
    digits.extend(table.previous_digits.iter().copied());

    let anchors = cycle_through(&table.new_digits, share.new, rng);
    let mut numbers: Vec<String> = anchors
        .into_iter()
        .map(|anchor| random_number(Some(anchor), &digits, max_len, rng))
        .collect();
    for _ in 0..share.previous {
        numbers.push(random_number(None, &table.previous_digits, max_len, rng));
    }

    for number in numbers.into_iter().filter(|n| !n.is_empty()) {
        let pos = rng.gen_range(0..=tokens.len());
        tokens.insert(pos, Token::new(TokenKind::Number, number));
    }
}

/// `count` picks from `chars`, every character at least once when `count` allows,
/// in a shuffled round-robin order
fn cycle_through<R: Rng + ?Sized>(chars: &[char], count: usize, rng: &mut R) -> Vec<char> {
    if chars.is_empty() {
        return Vec::new();
    }
    let mut order = chars.to_vec();
    order.shuffle(rng);
    (0..count).map(|i| order[i % order.len()]).collect()
}

/// Digit string of length `1..=max_len` drawn from `digits`, holding `anchor` at a random
/// position when given
fn random_number<R: Rng + ?Sized>(
    anchor: Option<char>,
    digits: &[char],
    max_len: usize,
    rng: &mut R,
) -> String {
    let len = rng.gen_range(1..=max_len.max(1));
    let anchor_pos = rng.gen_range(0..len);
    (0..len)
        .filter_map(|i| match anchor {
            Some(a) if i == anchor_pos => Some(a),
            _ => digits.choose(rng).copied(),
        })
        .collect()
}
