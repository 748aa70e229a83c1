//! Comment directives and leftover link decorations.

use super::code_block::CODE_PLACEHOLDER;
use regex::{Captures, Regex};
use std::sync::LazyLock;

static IF_FALSE_BLOCK: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?s)\(:if false:\)(.*?)\(:ifend:\)").expect("IF_FALSE_BLOCK: valid regex")
});

static IF_FALSE_OPEN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?s)\(:if false:\)(.*)").expect("IF_FALSE_OPEN: valid regex")
});

static COMMENT_DIRECTIVE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?s)\(:comment(.*?):\)").expect("COMMENT_DIRECTIVE: valid regex")
});

static BRACE_COMMENT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)\{#(.*?)#\}").expect("BRACE_COMMENT: valid regex"));

/// Wrap a captured body in an HTML comment.
///
/// A body ending in a code placeholder gets the closing marker on its own
/// line, otherwise the placeholder line would no longer be restored.
fn comment(caps: &Captures<'_>) -> String {
    let body = &caps[1];
    if body.rsplit('\n').next() == Some(CODE_PLACEHOLDER) {
        format!("<!--- {}\n--->", body)
    } else {
        format!("<!--- {} --->", body)
    }
}

/// Drop `%newwin%`/`%newin%` and any `mailto:` text left outside links.
pub fn strip_link_decorations(text: &str) -> String {
    text.replace("%newwin%", "")
        .replace("%newin%", "")
        .replace("mailto:", "")
}

/// Turn hidden content into HTML comments.
///
/// Handles `(:if false:)…(:ifend:)`, an unterminated `(:if false:)` running
/// to the end of the text, `(:comment …:)` and `{#…#}`. Bodies are kept
/// verbatim, line breaks included.
pub fn comments_to_html(text: &str) -> String {
    let text = IF_FALSE_BLOCK.replace_all(text, comment);
    let text = IF_FALSE_OPEN.replace_all(&text, comment);
    let text = COMMENT_DIRECTIVE.replace_all(&text, comment);
    BRACE_COMMENT.replace_all(&text, comment).into_owned()
}
