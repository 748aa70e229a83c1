//! Advisory diagnostics raised during conversion.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A non-fatal problem found while converting a page.
///
/// Conversion always completes; diagnostics point at output that needs a
/// manual look.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Diagnostic {
    /// A bare page reference matched no page in the index.
    ///
    /// The emitted link points at `/.md`.
    UnresolvedLink {
        /// File being converted
        file: String,
        /// Raw link target
        target: String,
    },
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Diagnostic::UnresolvedLink { file, target } => {
                write!(f, "unresolved link '{}' in {}", target, file)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_diagnostic_display() {
        let diag = Diagnostic::UnresolvedLink {
            file: "Main.HomePage".to_string(),
            target: "Missing".to_string(),
        };
        assert_eq!(diag.to_string(), "unresolved link 'Missing' in Main.HomePage");
    }

    #[test]
    fn test_diagnostic_json() {
        let diag = Diagnostic::UnresolvedLink {
            file: "Main.HomePage".to_string(),
            target: "Missing".to_string(),
        };
        let json = serde_json::to_string(&diag).unwrap();
        assert!(json.contains("\"kind\":\"unresolved_link\""));
        assert!(json.contains("\"target\":\"Missing\""));
    }
}
