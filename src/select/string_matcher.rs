use fancy_regex::Regex;
use serde::{Serialize, Serializer};

/// A compiled regular-expression predicate, used by the `:matches` family and
/// the `[attr~=regex]` comparator.
///
/// Patterns use `fancy_regex` syntax (PCRE-style, including lookaround) and
/// search unanchored; matching is case-sensitive unless the pattern sets
/// inline flags like `(?i)`.
#[derive(Debug)]
pub struct StringMatcher {
    re: Regex,
}

impl PartialEq for StringMatcher {
    fn eq(&self, other: &Self) -> bool {
        self.re.as_str() == other.re.as_str()
    }
}

impl StringMatcher {
    /// Compiles a pattern, reporting the engine's message on failure.
    pub fn compile(pattern: &str) -> Result<Self, String> {
        match Regex::new(pattern) {
            Ok(re) => Ok(Self { re }),
            Err(e) => Err(e.to_string()),
        }
    }

    pub fn matches(&self, haystack: &str) -> bool {
        match self.re.is_match(haystack) {
            Ok(matched) => matched,
            Err(e) => {
                panic!("failed to evaluate regular expression: {e}");
            }
        }
    }

    pub fn pattern(&self) -> &str {
        self.re.as_str()
    }
}

impl Serialize for StringMatcher {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.re.as_str())
    }
}
