//! Approximate trigger matching and wake-word handling.

use log::debug;

/// Minimum similarity for an incoming message to count as a known trigger.
pub const MATCH_CUTOFF: f64 = 0.6;

/// Minimum similarity for a newly taught trigger to merge into an existing one.
pub const MERGE_THRESHOLD: f64 = 0.7;

/// Gestalt (Ratcliff/Obershelp) similarity of two strings in `0.0..=1.0`.
///
/// Twice the number of characters in matching blocks divided by the total
/// number of characters. Matching blocks are found by taking the longest
/// common substring and recursing on what lies left and right of it.
/// Case-sensitive; two empty strings are identical.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn similarity(a: &str, b: &str) -> f64 {
    let a: Vec<char> = a.chars().collect();
    let b: Vec<char> = b.chars().collect();
    let total = a.len() + b.len();
    if total == 0 {
        return 1.0;
    }

    2.0 * matching_chars(&a, &b) as f64 / total as f64
}

/// Best matching trigger for `input`, or `None` when nothing reaches
/// [`MATCH_CUTOFF`].
///
/// When several triggers share the top score the earliest one wins, which
/// callers should not rely on.
#[must_use]
pub fn find_best_trigger<'a, I>(input: &str, triggers: I) -> Option<&'a str>
where
    I: IntoIterator<Item = &'a str>,
{
    best_scoring(input, triggers)
        .filter(|best| best.score >= MATCH_CUTOFF)
        .map(|best| {
            debug!(
                "Trigger match: '{input}' -> '{}' (sim={:.3})",
                best.candidate, best.score
            );
            best.candidate
        })
}

/// A candidate together with its position and similarity score.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct Scored<'a> {
    pub index: usize,
    pub candidate: &'a str,
    pub score: f64,
}

/// Highest scoring candidate, without any cutoff. Earliest wins ties.
///
/// Each candidate is scored as `similarity(candidate, input)`; the ratio is
/// not symmetric, and the stored side always goes first.
pub(crate) fn best_scoring<'a, I>(input: &str, candidates: I) -> Option<Scored<'a>>
where
    I: IntoIterator<Item = &'a str>,
{
    let mut best: Option<Scored<'a>> = None;

    for (index, candidate) in candidates.into_iter().enumerate() {
        let score = similarity(candidate, input);
        let is_better = best.as_ref().is_none_or(|best| score > best.score);
        if is_better {
            best = Some(Scored {
                index,
                candidate,
                score,
            });
        }
    }

    best
}

/// Returns true if `text` contains `wake_word`, ignoring case.
#[must_use]
pub fn contains_wake_word(text: &str, wake_word: &str) -> bool {
    find_ignore_case(text, wake_word).is_some()
}

/// Removes every occurrence of `wake_word` and tidies what is left, so that
/// "Blubbert, how r u" becomes "how r u".
#[must_use]
pub fn strip_wake_word(text: &str, wake_word: &str) -> String {
    let mut remaining = text;
    let mut stripped = String::with_capacity(text.len());

    while let Some((start, end)) = find_ignore_case(remaining, wake_word) {
        stripped.push_str(&remaining[..start]);
        stripped.push(' ');
        remaining = &remaining[end..];
    }
    stripped.push_str(remaining);

    stripped
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .trim_start_matches(|c: char| c.is_whitespace() || ",.:;!?".contains(c))
        .trim_end_matches(|c: char| c.is_whitespace() || c == ',')
        .to_string()
}

fn find_ignore_case(haystack: &str, needle: &str) -> Option<(usize, usize)> {
    if needle.is_empty() {
        return None;
    }

    'outer: for (start, _) in haystack.char_indices() {
        let mut rest = haystack[start..].char_indices();
        let mut end = start;
        for wanted in needle.chars() {
            match rest.next() {
                Some((offset, found)) if chars_eq_ignore_case(found, wanted) => {
                    end = start + offset + found.len_utf8();
                }
                _ => continue 'outer,
            }
        }
        return Some((start, end));
    }

    None
}

fn chars_eq_ignore_case(a: char, b: char) -> bool {
    a == b || a.to_lowercase().eq(b.to_lowercase())
}

fn matching_chars(a: &[char], b: &[char]) -> usize {
    let mut total = 0;
    let mut pending = vec![(0, a.len(), 0, b.len())];

    while let Some((alo, ahi, blo, bhi)) = pending.pop() {
        let (i, j, size) = longest_match(&a[alo..ahi], &b[blo..bhi]);
        if size == 0 {
            continue;
        }
        total += size;
        let (i, j) = (alo + i, blo + j);
        if alo < i && blo < j {
            pending.push((alo, i, blo, j));
        }
        if i + size < ahi && j + size < bhi {
            pending.push((i + size, ahi, j + size, bhi));
        }
    }

    total
}

/// Longest common substring as `(start_in_a, start_in_b, len)`, preferring the
/// earliest block in `a`, then in `b`.
fn longest_match(a: &[char], b: &[char]) -> (usize, usize, usize) {
    let mut best = (0, 0, 0);
    let mut prev = vec![0usize; b.len() + 1];
    let mut curr = vec![0usize; b.len() + 1];

    for (i, ca) in a.iter().enumerate() {
        for (j, cb) in b.iter().enumerate() {
            curr[j + 1] = if ca == cb { prev[j] + 1 } else { 0 };
            let len = curr[j + 1];
            if len > best.2 {
                best = (i + 1 - len, j + 1 - len, len);
            }
        }
        std::mem::swap(&mut prev, &mut curr);
    }

    best
}
