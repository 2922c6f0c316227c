use std::fmt::{Display, Formatter};

/// An error representing an invalid selector query.
///
/// Carries the original query and the unread remainder at the point of
/// failure; for sub-queries (inside `:has(...)`, `:not(...)`, or after a
/// combinator) the query is the sub-query that failed, not the outer one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseError {
    pub query: String,
    pub remainder: String,
    pub reason: ParseErrorReason,
}

impl Display for ParseError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "could not parse query \"{}\": {} at \"{}\"",
            self.query, self.reason, self.remainder
        )
    }
}

impl std::error::Error for ParseError {}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParseErrorReason {
    /// No selector production starts with the text at the cursor.
    UnexpectedToken,
    /// A required character (a closing delimiter) never appeared.
    Expected(char),
    /// A production that requires an argument got none.
    EmptyArgument(&'static str),
    InvalidSyntax(String),
    /// The combinator dispatch is fail-closed; with the documented combinator
    /// set this cannot be reached from `parse`.
    UnknownCombinator(char),
    /// A literal the dispatcher already matched failed to consume.
    SequenceMismatch(String),
}

impl Display for ParseErrorReason {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            ParseErrorReason::UnexpectedToken => write!(f, "unexpected token"),
            ParseErrorReason::Expected(ch) => write!(f, "expected \"{}\"", ch),
            ParseErrorReason::EmptyArgument(what) => write!(f, "{} must not be empty", what),
            ParseErrorReason::InvalidSyntax(message) => write!(f, "{}", message),
            ParseErrorReason::UnknownCombinator(ch) => write!(f, "unknown combinator \"{}\"", ch),
            ParseErrorReason::SequenceMismatch(seq) => write!(f, "queue did not match \"{}\"", seq),
        }
    }
}
