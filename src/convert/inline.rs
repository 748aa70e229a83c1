//! Inline and line-level formatting rules.
//!
//! Each rule is a pure `&str -> String` rewrite over the whole document.
//! The order of [`RULES`] matters: list markers are rewritten before
//! emphasis so `*` bullets are never read as emphasis, and the emphasis
//! rules reject quote runs that belong to a longer marker.

use super::pattern::replace_isolated;
use log::trace;
use regex::{Captures, Regex};
use std::sync::LazyLock;

const TAB: &str = "  ";

/// A single formatting rewrite.
pub type Rule = fn(&str) -> String;

/// Formatting rules in application order.
pub const RULES: &[(&str, Rule)] = &[
    ("bullet lists", bullet_lists),
    ("ordered lists", ordered_lists),
    ("blockquotes", blockquotes),
    ("headings", headings),
    ("emphasis", emphasis),
    ("monospace", monospace),
    ("enlarged text", enlarged_text),
    ("shrunk text", shrunk_text),
    ("strike and underline", strike_and_underline),
    ("sub and superscript", sub_and_superscript),
    ("line breaks", line_breaks),
];

macro_rules! pattern {
    ($name:ident, $re:expr) => {
        static $name: LazyLock<Regex> =
            LazyLock::new(|| Regex::new($re).expect(concat!(stringify!($name), ": valid regex")));
    };
}

pattern!(BULLET, r"(?m)^([ \t]*)(\*+) ?(.*)$");
pattern!(ORDERED, r"(?m)^[ \t]*(#+) ?(.*)$");
pattern!(BLOCKQUOTE, r"(?m)^->[ \t]*(.*)$");
pattern!(HEADING, r"(?m)^(!{1,6})[ \t]*(.*)$");
pattern!(ITALIC, r"''([^']+)''");
pattern!(BOLD, r"'''([^']+)'''");
pattern!(BOLD_ITALIC, r"''''([^']+)''''");
pattern!(MONO_BRACKET, r"\[@([^\]@]+)@\]");
pattern!(MONO_AT, r"@@([^\]@]+)@@");
pattern!(BIG, r"\[\+([^+]+)\+\]");
pattern!(BIGGER, r"\[\+\+([^+]+)\+\+\]");
pattern!(SMALL, r"\[-([^\]]*)-\]");
pattern!(SMALLER, r"\[--([^\]]*)--\]");
pattern!(STRIKE, r"\{-([^}]*)-\}");
pattern!(UNDERLINE, r"\{\+([^}]*)\+\}");
pattern!(SUBSCRIPT, r"'_([^']*)_'");
pattern!(SUPERSCRIPT, r"'\^([^']*)\^'");
pattern!(BREAK_JOIN, r"(?m)\\$");
pattern!(BREAK_HARD, r"(?m)\\\\$");
pattern!(BREAK_PARAGRAPH, r"(?m)\\\\\\$");

/// Apply every formatting rule in order.
pub fn format_inline(text: &str) -> String {
    RULES.iter().fold(text.to_string(), |acc, (name, rule)| {
        trace!("Applying rule: {}", name);
        rule(&acc)
    })
}

/// `** item` → `  - item`, one indent level per extra marker.
pub fn bullet_lists(text: &str) -> String {
    BULLET
        .replace_all(text, |caps: &Captures| {
            let depth = caps[2].len();
            format!(
                "{}{}- {}",
                " ".repeat(caps[1].len()),
                TAB.repeat(depth - 1),
                &caps[3]
            )
        })
        .into_owned()
}

/// `## item` → `  1. item`. Numbering is left to the Markdown renderer.
pub fn ordered_lists(text: &str) -> String {
    ORDERED
        .replace_all(text, |caps: &Captures| {
            format!("{}1. {}", TAB.repeat(caps[1].len() - 1), &caps[2])
        })
        .into_owned()
}

pub fn blockquotes(text: &str) -> String {
    BLOCKQUOTE.replace_all(text, "> $1").into_owned()
}

/// `!!Title` → `## Title`.
pub fn headings(text: &str) -> String {
    HEADING
        .replace_all(text, |caps: &Captures| {
            format!("{} {}", "#".repeat(caps[1].len()), caps[2].trim())
        })
        .into_owned()
}

/// `''x''` → `*x*`, `'''x'''` → `**x**`, `''''x''''` → `***x***`.
///
/// A match next to another quote belongs to a longer run and is skipped.
pub fn emphasis(text: &str) -> String {
    let text = replace_isolated(&ITALIC, text, '\'', '\'', "*$1*");
    let text = replace_isolated(&BOLD, &text, '\'', '\'', "**$1**");
    replace_isolated(&BOLD_ITALIC, &text, '\'', '\'', "***$1***")
}

/// `[@x@]` and `@@x@@` → `` `x` ``.
pub fn monospace(text: &str) -> String {
    let text = replace_isolated(&MONO_BRACKET, text, '[', ']', "`$1`");
    replace_isolated(&MONO_AT, &text, '[', ']', "`$1`")
}

/// `[+x+]` → `## x`, `[++x++]` → `# x`.
pub fn enlarged_text(text: &str) -> String {
    let text = BIG.replace_all(text, "## $1");
    BIGGER.replace_all(&text, "# $1").into_owned()
}

/// `[--x--]` and `[-x-]` → `x`; Markdown has no smaller text.
pub fn shrunk_text(text: &str) -> String {
    let text = SMALLER.replace_all(text, "$1");
    SMALL.replace_all(&text, "$1").into_owned()
}

/// `{-x-}` → `~~x~~`, `{+x+}` → `_x_`.
pub fn strike_and_underline(text: &str) -> String {
    let text = STRIKE.replace_all(text, "~~$1~~");
    UNDERLINE.replace_all(&text, "_${1}_").into_owned()
}

pub fn sub_and_superscript(text: &str) -> String {
    let text = SUBSCRIPT.replace_all(text, "<sub>$1</sub>");
    SUPERSCRIPT.replace_all(&text, "<sup>$1</sup>").into_owned()
}

/// Trailing backslashes: `\` joins lines, `\\` is a hard break, `\\\` a
/// paragraph break.
pub fn line_breaks(text: &str) -> String {
    let text = replace_isolated(&BREAK_JOIN, text, '\\', '\\', "");
    let text = replace_isolated(&BREAK_HARD, &text, '\\', '\\', "\\");
    replace_isolated(&BREAK_PARAGRAPH, &text, '\\', '\\', "\n\n")
}

/// Turn hard breaks into plain line ends, for renderers that already break
/// on every newline.
///
/// A line holding only `\` becomes empty; when a heading follows it, an
/// extra blank line keeps the heading separated. Any other trailing `\` is
/// dropped.
pub fn soften_line_breaks(lines: &mut Vec<String>) {
    let mut row = 0;
    while row < lines.len() {
        if lines[row] == "\\" {
            lines[row].clear();
            if lines.get(row + 1).is_some_and(|next| next.starts_with('#')) {
                lines.insert(row, String::new());
                row += 1;
            }
        } else if lines[row].ends_with('\\') {
            lines[row].pop();
        }
        row += 1;
    }
}
