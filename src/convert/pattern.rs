//! Replacement helpers for rules that need lookaround.
//!
//! The `regex` crate has no lookbehind or lookahead. Rules that need them
//! match the core pattern and then inspect the neighbouring characters; a
//! rejected match restarts the search one character after its start, which
//! gives the same matches a backtracking engine with lookaround would find.

use regex::{Captures, Regex};

/// Character immediately before byte offset `at`.
pub(crate) fn char_before(text: &str, at: usize) -> Option<char> {
    text[..at].chars().next_back()
}

/// Character starting at byte offset `at`.
pub(crate) fn char_at(text: &str, at: usize) -> Option<char> {
    text[at..].chars().next()
}

/// Replace every match of `re` that `accept` approves.
pub(crate) fn replace_guarded<A, R>(re: &Regex, text: &str, mut accept: A, mut rep: R) -> String
where
    A: FnMut(&str, &Captures<'_>) -> bool,
    R: FnMut(&Captures<'_>) -> String,
{
    let mut out = String::with_capacity(text.len());
    let mut copied = 0;
    let mut pos = 0;

    while pos <= text.len() {
        let Some(caps) = re.captures_at(text, pos) else {
            break;
        };
        let Some(m) = caps.get(0) else {
            break;
        };

        if accept(text, &caps) {
            out.push_str(&text[copied..m.start()]);
            out.push_str(&rep(&caps));
            copied = m.end();
            pos = if m.end() > m.start() {
                m.end()
            } else {
                next_boundary(text, m.end())
            };
        } else {
            pos = next_boundary(text, m.start());
        }
    }

    out.push_str(&text[copied..]);
    out
}

/// Replace matches not preceded by `forbidden_before` and not followed by
/// `forbidden_after`, expanding `template` (`$1`-style groups).
pub(crate) fn replace_isolated(
    re: &Regex,
    text: &str,
    forbidden_before: char,
    forbidden_after: char,
    template: &str,
) -> String {
    replace_guarded(
        re,
        text,
        |text, caps| {
            let Some(m) = caps.get(0) else {
                return false;
            };
            char_before(text, m.start()) != Some(forbidden_before)
                && char_at(text, m.end()) != Some(forbidden_after)
        },
        |caps| {
            let mut expanded = String::new();
            caps.expand(template, &mut expanded);
            expanded
        },
    )
}

fn next_boundary(text: &str, at: usize) -> usize {
    char_at(text, at).map_or(text.len() + 1, |c| at + c.len_utf8())
}
