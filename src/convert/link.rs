//! Color spans, anchors and link resolution.
//!
//! A color span such as `%red%text` runs to the next `%` or to the end of
//! its line, so it never crosses a line break or wraps a code placeholder.

use super::comment::{comments_to_html, strip_link_decorations};
use super::ConvertOptions;
use crate::error::Result;
use crate::model::{Diagnostic, Link, PageIndex, PageName, ResolvedLink};
use log::warn;
use regex::{Captures, Regex};
use std::sync::LazyLock;

static ATTACH_PAREN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\(Attach:\)").expect("ATTACH_PAREN: valid regex"));

static ANCHOR: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\[\[\s*#([^|\s]+)\s*\]\]").expect("ANCHOR: valid regex")
});

/// `[[target|display]]`
static LINK_PIPE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\[\[([^\]]*?)\s*\|\s*([^\]]*?)\]\]").expect("LINK_PIPE: valid regex")
});

/// `[[(hidden)display]]`
static LINK_PAREN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\[\[\(([^\]]*?)\s*\)\s*([^\]]*?)\]\]").expect("LINK_PAREN: valid regex")
});

/// `[[display->target]]`
static LINK_ARROW: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\[\[([^\]]*?)\s*->\s*([^\]]*?)\]\]").expect("LINK_ARROW: valid regex")
});

/// `[[target]]`
static LINK_BARE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\[\[([^|\]]*?)\]\]").expect("LINK_BARE: valid regex"));

/// Per-document state threaded through link conversion.
#[derive(Debug)]
pub struct LinkContext<'a> {
    /// Name of the file being converted (`Book.Page`)
    pub filename: &'a str,

    /// Index of every page in the run
    pub index: &'a PageIndex,

    /// Diagnostics collected so far
    pub diagnostics: Vec<Diagnostic>,
}

impl<'a> LinkContext<'a> {
    /// Create a context for one document.
    pub fn new(filename: &'a str, index: &'a PageIndex) -> Self {
        Self {
            filename,
            index,
            diagnostics: Vec::new(),
        }
    }
}

/// Rewrites colors, anchors, links and comments.
///
/// Holds the patterns that depend on [`ConvertOptions`]; everything else is
/// compiled once per process.
#[derive(Debug)]
pub struct LinkResolver {
    colors: Vec<(Regex, String)>,
    upload_prefix: String,
    image_extensions: Vec<String>,
}

impl LinkResolver {
    /// Compile the option-dependent patterns.
    pub fn new(options: &ConvertOptions) -> Result<Self> {
        let named = options.colors.iter().map(|c| (c.as_str(), c.as_str()));
        let aliases = options
            .color_aliases
            .iter()
            .map(|(name, value)| (name.as_str(), value.as_str()));

        let colors = named
            .chain(aliases)
            .map(|(name, value)| {
                let re = Regex::new(&format!(r"%{}%([^%\n]+)(?:%%)?", regex::escape(name)))?;
                Ok((re, value.to_string()))
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(Self {
            colors,
            upload_prefix: options.upload_prefix.trim_end_matches('/').to_string(),
            image_extensions: options
                .image_extensions
                .iter()
                .map(|ext| ext.to_ascii_lowercase())
                .collect(),
        })
    }

    /// Run every rewrite of this stage over the whole text.
    pub fn rewrite(&self, text: &str, ctx: &mut LinkContext<'_>) -> String {
        let mut text = self.colorize(text);

        text = ATTACH_PAREN.replace_all(&text, "Attach:").into_owned();
        text = ANCHOR.replace_all(&text, r#"<a id="$1"></a>"#).into_owned();

        text = LINK_PIPE
            .replace_all(&text, |caps: &Captures| {
                self.convert_link(Link::new(&caps[1], &caps[2]), ctx)
                    .to_string()
            })
            .into_owned();
        text = LINK_PAREN
            .replace_all(&text, |caps: &Captures| {
                let target = format!("{}{}", &caps[1], &caps[2]);
                self.convert_link(Link::new(&target, &caps[2]), ctx)
                    .to_string()
            })
            .into_owned();
        text = LINK_ARROW
            .replace_all(&text, |caps: &Captures| {
                self.convert_link(Link::new(&caps[2], &caps[1]), ctx)
                    .to_string()
            })
            .into_owned();
        text = LINK_BARE
            .replace_all(&text, |caps: &Captures| {
                self.convert_link(Link::bare(&caps[1]), ctx).to_string()
            })
            .into_owned();

        let text = strip_link_decorations(&text);
        comments_to_html(&text)
    }

    /// `%red%text` → `<span style="color: red;">text</span>`.
    pub fn colorize(&self, text: &str) -> String {
        self.colors
            .iter()
            .fold(text.to_string(), |acc, (re, value)| {
                re.replace_all(&acc, |caps: &Captures| {
                    format!(r#"<span style="color: {};">{}</span>"#, value, &caps[1])
                })
                .into_owned()
            })
    }

    /// Resolve one link to its Markdown form.
    pub fn convert_link(&self, link: Link<'_>, ctx: &mut LinkContext<'_>) -> ResolvedLink {
        let target = link.target.trim();
        let mut fallback_text = None;
        let mut fragment = "";

        let segments: Vec<String> = if let Some(rest) = target.strip_prefix("Attach:") {
            self.attachment_segments(rest, ctx.filename)
        } else if let Some(address) = target.strip_prefix("mailto:") {
            vec![address.to_string()]
        } else if target.contains("http") || target.contains("www") || target.starts_with('#') {
            vec![target.to_string()]
        } else {
            let (reference, anchor) = match target.split_once('#') {
                Some((reference, anchor)) => (reference, anchor),
                None => (target, ""),
            };
            fragment = anchor;

            let (book, page) = if let Some((book, page)) = reference.split_once('.') {
                (book.to_string(), page.to_string())
            } else if let Some((book, page)) = reference.split_once('/') {
                (book.to_string(), page.to_string())
            } else {
                let index = ctx.index;
                match index.resolve(reference) {
                    Some((book, page)) if !reference.is_empty() => {
                        (book.to_string(), page.to_string())
                    }
                    _ => {
                        warn!("Unresolved link '{}' in {}", reference, ctx.filename);
                        ctx.diagnostics.push(Diagnostic::UnresolvedLink {
                            file: ctx.filename.to_string(),
                            target: reference.to_string(),
                        });
                        fallback_text = Some(reference.to_string());
                        (String::new(), String::new())
                    }
                }
            };
            vec![format!("/{}", book), format!("{}.md", page)]
        };

        let text = match link.explicit_display() {
            Some(text) => text.to_string(),
            None => fallback_text.unwrap_or_else(|| default_text(&segments)),
        };

        let mut path = segments.join("/");
        if !fragment.is_empty() {
            path.push('#');
            path.push_str(fragment);
        }

        let image = self.is_image(&path);
        ResolvedLink {
            text,
            path: path.replace(' ', "%20"),
            image,
        }
    }

    fn attachment_segments(&self, rest: &str, filename: &str) -> Vec<String> {
        let mut segments = vec![self.upload_prefix.clone()];
        match rest.split_once('/') {
            Some((owner, file)) => {
                segments.push(owner.replace('.', "/"));
                segments.push(file.to_string());
            }
            None => {
                match PageName::parse(filename) {
                    Ok(name) => segments.extend(name.upload_segments().map(String::from)),
                    Err(_) => segments.push(filename.to_string()),
                }
                segments.push(rest.to_string());
            }
        }
        segments
    }

    fn is_image(&self, path: &str) -> bool {
        path.rsplit_once('.').is_some_and(|(_, ext)| {
            let ext = ext.to_ascii_lowercase();
            self.image_extensions.iter().any(|known| *known == ext)
        })
    }
}

/// Last path segment without its `.md` suffix.
fn default_text(segments: &[String]) -> String {
    let last = segments.last().map(String::as_str).unwrap_or_default();
    last.strip_suffix(".md").unwrap_or(last).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn resolver() -> LinkResolver {
        LinkResolver::new(&ConvertOptions::default()).unwrap()
    }

    fn convert(target: &str, display: Option<&str>, index: &PageIndex) -> (String, usize) {
        let mut ctx = LinkContext::new("Main.HomePage", index);
        let link = Link { target, display };
        let out = resolver().convert_link(link, &mut ctx).to_string();
        (out, ctx.diagnostics.len())
    }

    #[test]
    fn test_attachment_with_page() {
        let (out, _) = convert("Attach:Group.Page/file.png", None, &PageIndex::new());
        assert_eq!(out, "![file.png](/uploads/Group/Page/file.png)");
    }

    #[test]
    fn test_attachment_current_page() {
        let (out, _) = convert("Attach:manual.pdf", Some("Manual"), &PageIndex::new());
        assert_eq!(out, "[Manual](/uploads/Main/HomePage/manual.pdf)");
    }

    #[test]
    fn test_mailto() {
        let (out, _) = convert("mailto:me@example.com", Some("Mail me"), &PageIndex::new());
        assert_eq!(out, "[Mail me](me@example.com)");
    }

    #[test]
    fn test_external() {
        let (out, _) = convert("https://example.com/a b", Some("Site"), &PageIndex::new());
        assert_eq!(out, "[Site](https://example.com/a%20b)");

        let (out, _) = convert("https://example.com/logo.JPG", None, &PageIndex::new());
        assert_eq!(
            out,
            "![https://example.com/logo.JPG](https://example.com/logo.JPG)"
        );
    }

    #[test]
    fn test_same_page_anchor() {
        let (out, _) = convert("#intro", Some("Intro"), &PageIndex::new());
        assert_eq!(out, "[Intro](#intro)");
    }

    #[test]
    fn test_dotted_reference() {
        let (out, _) = convert("Docs.Setup", None, &PageIndex::new());
        assert_eq!(out, "[Setup](/Docs/Setup.md)");

        let (out, _) = convert("Docs.Setup.Linux", Some("+"), &PageIndex::new());
        assert_eq!(out, "[Setup.Linux](/Docs/Setup.Linux.md)");
    }

    #[test]
    fn test_slash_reference() {
        let (out, _) = convert("Docs/Setup", Some("Setup guide"), &PageIndex::new());
        assert_eq!(out, "[Setup guide](/Docs/Setup.md)");
    }

    #[test]
    fn test_reference_with_fragment() {
        let (out, _) = convert("Book.Page#sec", None, &PageIndex::new());
        assert_eq!(out, "[Page](/Book/Page.md#sec)");
    }

    #[test]
    fn test_bare_reference_resolved() {
        let mut index = PageIndex::new();
        index.insert("Book1", "MyPage");

        let (out, diags) = convert("MyPage", None, &index);
        assert_eq!(out, "[MyPage](/Book1/MyPage.md)");
        assert_eq!(diags, 0);

        let (out, _) = convert("my page", Some("see here"), &index);
        assert_eq!(out, "[see here](/Book1/MyPage.md)");
    }

    #[test]
    fn test_bare_reference_unresolved() {
        let (out, diags) = convert("MyPage", None, &PageIndex::new());
        assert_eq!(out, "[MyPage](/.md)");
        assert_eq!(diags, 1);
    }

    #[test]
    fn test_rewrite_link_forms() {
        let mut index = PageIndex::new();
        index.insert("Main", "Intro");
        let mut ctx = LinkContext::new("Main.HomePage", &index);

        let text = "[[Docs.Setup | Setup]] [[(Main.)Intro]] [[Go->Docs.Faq]] [[Intro]]";
        let out = resolver().rewrite(text, &mut ctx);
        assert_eq!(
            out,
            "[Setup](/Docs/Setup.md) [Intro](/Main/Intro.md) [Go](/Docs/Faq.md) [Intro](/Main/Intro.md)"
        );
        assert!(ctx.diagnostics.is_empty());
    }

    #[test]
    fn test_rewrite_empty_display_uses_default() {
        let index = PageIndex::new();
        let mut ctx = LinkContext::new("Main.HomePage", &index);
        let out = resolver().rewrite("[[Docs.Setup|]] [[(Main.Intro)]]", &mut ctx);
        assert_eq!(out, "[Setup](/Docs/Setup.md) [Intro](/Main/Intro.md)");
    }

    #[test]
    fn test_rewrite_arrow_does_not_span_links() {
        let index = PageIndex::new();
        let mut ctx = LinkContext::new("Main.HomePage", &index);
        let out = resolver().rewrite("[[Docs.A]] then -> [[Docs.B]]", &mut ctx);
        assert_eq!(out, "[A](/Docs/A.md) then -> [B](/Docs/B.md)");
    }

    #[test]
    fn test_rewrite_anchor_and_attach() {
        let index = PageIndex::new();
        let mut ctx = LinkContext::new("Main.HomePage", &index);
        let out = resolver().rewrite("[[#top]] [[(Attach:)logo.png]]", &mut ctx);
        assert_eq!(
            out,
            r#"<a id="top"></a> ![logo.png](/uploads/Main/HomePage/logo.png)"#
        );
    }

    #[test]
    fn test_colors() {
        let r = resolver();
        assert_eq!(
            r.colorize("%red%alert%% done"),
            r#"<span style="color: red;">alert</span> done"#
        );
        assert_eq!(
            r.colorize("%theosred%brand"),
            r#"<span style="color: #d21f15;">brand</span>"#
        );
        assert_eq!(r.colorize("%purple%x"), "%purple%x");
        assert_eq!(
            r.colorize("%red%a\nb"),
            "<span style=\"color: red;\">a</span>\nb"
        );
    }

    #[test]
    fn test_custom_color_alias() {
        let options = ConvertOptions::default().with_color_alias("warn", "#ffaa00");
        let r = LinkResolver::new(&options).unwrap();
        assert_eq!(
            r.colorize("%warn%careful"),
            r#"<span style="color: #ffaa00;">careful</span>"#
        );
    }

    #[test]
    fn test_rewrite_window_and_comments() {
        let index = PageIndex::new();
        let mut ctx = LinkContext::new("Main.HomePage", &index);
        let out = resolver().rewrite("%newwin%[[https://x.org|X]] {#note#}", &mut ctx);
        assert_eq!(out, "[X](https://x.org) <!--- note --->");
    }
}
