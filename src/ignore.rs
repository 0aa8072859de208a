//! Exclusion pattern matching.
//!
//! Patterns use `fnmatch` rules against the whole path string: `*` matches
//! any run of characters (including `/`), `?` a single character and `[...]`
//! a character set. Matching is case-sensitive. A run of stars means the
//! same as one `*`, and a `[` that is never closed matches itself.

use glob::{MatchOptions, Pattern};

const MATCH_OPTIONS: MatchOptions = MatchOptions {
    case_sensitive: true,
    require_literal_separator: false,
    require_literal_leading_dot: false,
};

/// A compiled set of exclusion patterns.
#[derive(Debug, Clone, Default)]
pub struct IgnoreSet {
    patterns: Vec<Pattern>,
}

impl IgnoreSet {
    /// Compiles the given patterns.
    pub fn new<I, S>(patterns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let patterns = patterns
            .into_iter()
            .filter_map(|p| compile(p.as_ref()))
            .collect();
        Self { patterns }
    }

    /// Returns true if `path` matches at least one pattern.
    pub fn is_match(&self, path: &str) -> bool {
        self.patterns
            .iter()
            .any(|p| p.matches_with(path, MATCH_OPTIONS))
    }

    pub(crate) fn len(&self) -> usize {
        self.patterns.len()
    }
}

fn compile(pattern: &str) -> Option<Pattern> {
    Pattern::new(&to_glob(pattern, false))
        .or_else(|e| {
            tracing::warn!("ignore pattern {pattern:?} is not a glob ({e}), matching literally");
            Pattern::new(&Pattern::escape(pattern))
        })
        .ok()
}

/// Rewrites `fnmatch` pattern text into the syntax of the `glob` crate.
///
/// A run of `*` becomes a single `*`, except that a whole `**` path component
/// is kept when `recursive` is set. A `[` without a closing `]` is a literal
/// character.
pub(crate) fn to_glob(pattern: &str, recursive: bool) -> String {
    let chars: Vec<char> = pattern.chars().collect();
    let mut out = String::with_capacity(pattern.len());
    let mut i = 0;
    while i < chars.len() {
        match chars[i] {
            '*' => {
                let start = i;
                while chars.get(i) == Some(&'*') {
                    i += 1;
                }
                let component = (start == 0 || chars[start - 1] == '/')
                    && chars.get(i).is_none_or(|&c| c == '/');
                if recursive && component && i - start == 2 {
                    out.push_str("**");
                } else {
                    out.push('*');
                }
            }
            '[' => match set_end(&chars, i) {
                Some(end) => {
                    out.extend(&chars[i..=end]);
                    i = end + 1;
                }
                None => {
                    out.push_str(&Pattern::escape("["));
                    i += 1;
                }
            },
            c => {
                out.push(c);
                i += 1;
            }
        }
    }
    out
}

/// Index of the `]` closing the set opened at `open`. A `]` right after the
/// opening `[` or `[!` belongs to the set.
fn set_end(chars: &[char], open: usize) -> Option<usize> {
    let mut first = open + 1;
    if chars.get(first) == Some(&'!') {
        first += 1;
    }
    if chars.get(first) == Some(&']') {
        first += 1;
    }
    chars
        .get(first..)?
        .iter()
        .position(|&c| c == ']')
        .map(|k| first + k)
}
