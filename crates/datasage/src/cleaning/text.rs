//! Text column casing.

use crate::config::TextCase;
use crate::schema::{Column, Value};

/// Rewrites the casing of text columns.
#[derive(Debug, Clone, Copy)]
pub struct TextNormalizer {
    case: TextCase,
}

impl TextNormalizer {
    /// Create a normalizer for `case`.
    pub fn new(case: TextCase) -> Self {
        Self { case }
    }

    /// Whether this normalizer changes anything at all.
    pub fn is_noop(&self) -> bool {
        self.case == TextCase::None
    }

    /// Rewrite every text value of a text column. Returns the number of
    /// values that changed; non-text columns are left alone.
    pub fn apply(&self, column: &mut Column) -> usize {
        if self.is_noop() || !column.dtype.is_text() {
            return 0;
        }

        let mut changed = 0;
        for value in &mut column.values {
            if let Value::Text(s) = value {
                let rewritten = self.convert(s);
                if rewritten != *s {
                    *s = rewritten;
                    changed += 1;
                }
            }
        }
        changed
    }

    /// Apply the casing to a single string.
    pub fn convert(&self, s: &str) -> String {
        match self.case {
            TextCase::Lower => s.to_lowercase(),
            TextCase::Upper => s.to_uppercase(),
            TextCase::Title => title_case(s),
            TextCase::None => s.to_string(),
        }
    }
}

/// Upper-case the first letter of every alphabetic run and lower-case the rest.
///
/// Any non-letter starts a new run, so `"o'neil-smith"` becomes `"O'Neil-Smith"`.
pub fn title_case(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut in_word = false;

    for ch in s.chars() {
        if in_word {
            out.extend(ch.to_lowercase());
        } else {
            out.extend(ch.to_uppercase());
        }
        in_word = ch.is_alphabetic();
    }

    out
}
