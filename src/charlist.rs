//! Reader for the character list: one lesson per line, listing the characters the lesson
//! introduces.
//!
//! ```text
//! jf
//! ky
//! ABCDEFGHIJKLMNOPQRSTUVWXYZ
//! LR"$
//! LL(RR)
//! [review]
//! 0123456789<TAB>numbers_density=0.5 max_number_length=4
//! ```
//!
//! `LL`, `RR` and `LR` in front of a symbol bind it to the left side of a word, the right
//! side, or either side. `[review]` is a lesson without new characters. Anything after a tab
//! is a list of `key=value` option overrides for that lesson only.

use crate::config::LessonOptions;
use crate::error::{LessonError, Result};
use crate::lesson::charset::{Affinity, AffinityTable};
use crate::lesson::LessonSpec;
use std::fs;
use std::path::Path;

/// Marks a lesson that only reinforces earlier characters
pub const REVIEW_MARKER: &str = "[review]";

pub fn read_charlist<P: AsRef<Path>>(path: P, defaults: &LessonOptions) -> Result<Vec<LessonSpec>> {
    let contents = fs::read_to_string(path)?;
    parse_charlist(&contents, defaults)
}

pub fn parse_charlist(input: &str, defaults: &LessonOptions) -> Result<Vec<LessonSpec>> {
    let mut affinities = AffinityTable::new();
    let mut lessons = Vec::new();

    for (idx, raw) in input.lines().enumerate() {
        let line = idx + 1;
        let raw = raw.trim_end_matches('\r');
        let (chars_part, options_part) = match raw.split_once('\t') {
            Some((chars, options)) => (chars, Some(options)),
            None => (raw, None),
        };
        if chars_part.trim().is_empty() && options_part.is_none() {
            continue;
        }

        let options = match options_part {
            Some(overrides) => parse_overrides(overrides, defaults, line)?,
            None => defaults.clone(),
        };
        let new_chars = if chars_part.trim() == REVIEW_MARKER {
            Vec::new()
        } else {
            parse_chars(chars_part, line, &mut affinities)?
        };

        lessons.push(LessonSpec {
            line,
            new_chars,
            options,
            affinities: affinities.clone(),
        });
    }

    tracing::debug!("read {} lessons", lessons.len());
    Ok(lessons)
}

fn parse_overrides(overrides: &str, defaults: &LessonOptions, line: usize) -> Result<LessonOptions> {
    let mut options = defaults.clone();
    for item in overrides.split_whitespace() {
        let (key, value) = item
            .split_once('=')
            .ok_or_else(|| LessonError::malformed(line, format!("expected key=value, got '{item}'")))?;
        options
            .apply_override(key, value)
            .map_err(|reason| LessonError::malformed(line, reason))?;
    }
    options
        .validate()
        .map_err(|reason| LessonError::malformed(line, reason))?;
    Ok(options)
}

fn parse_chars(part: &str, line: usize, affinities: &mut AffinityTable) -> Result<Vec<char>> {
    let chars: Vec<char> = part.chars().filter(|c| !c.is_whitespace()).collect();
    let mut out: Vec<char> = Vec::with_capacity(chars.len());

    let mut i = 0;
    while i < chars.len() {
        let marker: String = chars[i..chars.len().min(i + 2)].iter().collect();
        if let Some(affinity) = Affinity::from_marker(&marker) {
            match chars.get(i + 2) {
                None => {
                    return Err(LessonError::malformed(
                        line,
                        format!("dangling {marker} annotation at end of line"),
                    ))
                }
                Some(&symbol) if is_symbol(symbol) => {
                    bind(symbol, affinity, line, affinities)?;
                    push_unique(&mut out, symbol);
                    i += 3;
                    continue;
                }
                // markers only bind symbols; before a letter or digit they are letters
                Some(_) => {}
            }
        }
        push_unique(&mut out, chars[i]);
        i += 1;
    }
    Ok(out)
}

fn push_unique(out: &mut Vec<char>, c: char) {
    if !out.contains(&c) {
        out.push(c);
    }
}

fn is_symbol(c: char) -> bool {
    !c.is_alphabetic() && !c.is_ascii_digit() && !c.is_whitespace()
}

fn bind(symbol: char, affinity: Affinity, line: usize, affinities: &mut AffinityTable) -> Result<()> {
    match affinities.get(&symbol) {
        Some(&existing) if existing != affinity => Err(LessonError::malformed(
            line,
            format!("conflicting annotations for '{symbol}': {existing:?} and {affinity:?}"),
        )),
        _ => {
            affinities.insert(symbol, affinity);
            Ok(())
        }
    }
}
