//! Code block extraction and restoration.
//!
//! Preformatted lines (anything indented) must survive the rewrite rules
//! untouched. They are swapped for a placeholder line before formatting and
//! swapped back, wrapped in fences, at the end.

/// Line that stands in for an extracted code line.
pub(crate) const CODE_PLACEHOLDER: &str = "\u{0000}CODEBLOCK\u{0000}";

/// Code lines taken out of a document, in document order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CodeBlocks {
    lines: Vec<String>,
}

impl CodeBlocks {
    /// Number of extracted lines.
    pub fn len(&self) -> usize {
        self.lines.len()
    }

    /// Check if no code was extracted.
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Extracted lines in original order.
    pub fn lines(&self) -> &[String] {
        &self.lines
    }
}

fn is_indented(line: &str) -> bool {
    line.starts_with([' ', '\t'])
}

/// Replace code lines with placeholders and return them.
///
/// A line is code when it starts with a space or tab, or when it is empty
/// and directly follows a code line, so blank lines do not split a block.
pub fn extract_code_blocks(lines: &mut [String]) -> CodeBlocks {
    let mut extracted = Vec::new();
    let mut in_code = false;

    for line in lines.iter_mut() {
        if is_indented(line) || (in_code && line.is_empty()) {
            in_code = true;
            extracted.push(std::mem::replace(line, CODE_PLACEHOLDER.to_string()));
        } else {
            in_code = false;
        }
    }

    CodeBlocks { lines: extracted }
}

/// Put extracted code lines back and fence each consecutive run.
///
/// Placeholders are filled strictly in order. Every maximal run of restored
/// lines gets `fence` on its own line before and after it.
pub fn restore_code_blocks(lines: Vec<String>, codes: &CodeBlocks, fence: &str) -> Vec<String> {
    let mut out = Vec::with_capacity(lines.len() + codes.len());
    let mut cursor = 0;
    let mut in_run = false;

    for line in lines {
        let restored = if line == CODE_PLACEHOLDER {
            codes.lines.get(cursor).inspect(|_| cursor += 1)
        } else {
            None
        };

        match restored {
            Some(code) => {
                if !in_run {
                    out.push(fence.to_string());
                    in_run = true;
                }
                out.push(code.clone());
            }
            None => {
                if in_run {
                    out.push(fence.to_string());
                    in_run = false;
                }
                out.push(line);
            }
        }
    }

    if in_run {
        out.push(fence.to_string());
    }

    out
}
