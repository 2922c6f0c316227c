use crate::query::error::ParseErrorReason;

const ESC: char = '\\';

/// A cursor over a selector query string, with the look-ahead and
/// balanced-delimiter consumption the query grammar needs.
///
/// The cursor is a byte offset and only ever advances; `remainder` is always
/// the unread tail of the input.
pub(crate) struct TokenQueue<'a> {
    input: &'a str,
    pos: usize,
}

impl<'a> TokenQueue<'a> {
    pub(crate) fn new(input: &'a str) -> Self {
        Self { input, pos: 0 }
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.pos >= self.input.len()
    }

    pub(crate) fn remainder(&self) -> &'a str {
        &self.input[self.pos..]
    }

    pub(crate) fn peek(&self) -> Option<char> {
        self.remainder().chars().next()
    }

    pub(crate) fn consume(&mut self) -> Option<char> {
        let ch = self.peek()?;
        self.pos += ch.len_utf8();
        Some(ch)
    }

    /// Non-consuming, case-sensitive prefix test.
    pub(crate) fn matches(&self, seq: &str) -> bool {
        self.remainder().starts_with(seq)
    }

    pub(crate) fn matches_any(&self, seqs: &[&str]) -> bool {
        seqs.iter().any(|seq| self.matches(seq))
    }

    /// Consumes `seq` if it is the prefix of the unread input.
    pub(crate) fn match_chomp(&mut self, seq: &str) -> bool {
        if self.matches(seq) {
            self.pos += seq.len();
            true
        } else {
            false
        }
    }

    /// Consumes `seq`, failing if it is not the prefix of the unread input.
    pub(crate) fn consume_seq(&mut self, seq: &str) -> Result<(), ParseErrorReason> {
        if self.match_chomp(seq) {
            Ok(())
        } else {
            Err(ParseErrorReason::SequenceMismatch(seq.to_string()))
        }
    }

    /// Whether the next character can begin an identifier.
    pub(crate) fn matches_word(&self) -> bool {
        matches!(self.peek(), Some(ch) if ch.is_ascii_alphanumeric() || matches!(ch, '-' | '_' | '|'))
    }

    /// Consumes ASCII whitespace; returns whether any was consumed.
    pub(crate) fn consume_whitespace(&mut self) -> bool {
        let mut seen = false;
        while matches!(self.peek(), Some(ch) if ch.is_ascii_whitespace()) {
            self.consume();
            seen = true;
        }
        seen
    }

    fn consume_while<F>(&mut self, keep: F) -> &'a str
    where
        F: Fn(char) -> bool,
    {
        let start = self.pos;
        while matches!(self.peek(), Some(ch) if keep(ch)) {
            self.consume();
        }
        &self.input[start..self.pos]
    }

    /// Consumes a run of CSS identifier characters. May be empty; callers
    /// requiring a non-empty identifier validate the result.
    pub(crate) fn consume_css_identifier(&mut self) -> &'a str {
        self.consume_while(|ch| ch.is_ascii_alphanumeric() || matches!(ch, '-' | '_'))
    }

    /// Like [Self::consume_css_identifier], but also permits the namespace
    /// separator `|` and the wildcard `*`, for tag selectors.
    pub(crate) fn consume_element_selector(&mut self) -> &'a str {
        self.consume_while(|ch| ch.is_ascii_alphanumeric() || matches!(ch, '-' | '_' | '|' | '*'))
    }

    /// Consumes up to (not including) `seq`, or the rest of the input if
    /// `seq` never appears.
    pub(crate) fn consume_to(&mut self, seq: &str) -> &'a str {
        let start = self.pos;
        match self.remainder().find(seq) {
            Some(offset) => self.pos += offset,
            None => self.pos = self.input.len(),
        }
        &self.input[start..self.pos]
    }

    /// Consumes up to the first position where any of `seqs` is a prefix, or
    /// the rest of the input.
    pub(crate) fn consume_to_any(&mut self, seqs: &[&str]) -> &'a str {
        let start = self.pos;
        while !self.is_empty() && !self.matches_any(seqs) {
            self.consume();
        }
        &self.input[start..self.pos]
    }

    /// Consumes up to and including `seq`, returning the text before it.
    pub(crate) fn chomp_to(&mut self, seq: &str) -> &'a str {
        let consumed = self.consume_to(seq);
        self.match_chomp(seq);
        consumed
    }

    /// Consumes a balanced `open`..`close` run, starting with the cursor on
    /// the opening delimiter, and returns the text between the outer pair.
    ///
    /// Nesting depth is tracked; single- and double-quoted stretches are
    /// opaque (delimiters inside them do not count), and a backslash escapes
    /// the character after it. Reaching the end of input before the run
    /// closes is an error.
    pub(crate) fn chomp_balanced(&mut self, open: char, close: char) -> Result<&'a str, ParseErrorReason> {
        let mut depth = 0i32;
        let mut last: Option<char> = None;
        let mut in_single_quote = false;
        let mut in_double_quote = false;
        let mut inner_start = self.pos;
        loop {
            let Some(ch) = self.consume() else {
                return Err(ParseErrorReason::Expected(close));
            };
            if last != Some(ESC) {
                if ch == '\'' && open != '\'' && !in_double_quote {
                    in_single_quote = !in_single_quote;
                } else if ch == '"' && open != '"' && !in_single_quote {
                    in_double_quote = !in_double_quote;
                }
                if !in_single_quote && !in_double_quote {
                    if ch == open {
                        if depth == 0 {
                            inner_start = self.pos;
                        }
                        depth += 1;
                    } else if ch == close {
                        depth -= 1;
                    }
                }
            }
            last = Some(ch);
            if depth <= 0 {
                let inner_end = self.pos.saturating_sub(close.len_utf8()).max(inner_start);
                return Ok(&self.input[inner_start..inner_end]);
            }
        }
    }

    /// Replaces `\X` with `X`, for any `X`.
    pub(crate) fn unescape(input: &str) -> String {
        let mut out = String::with_capacity(input.len());
        let mut last: Option<char> = None;
        for ch in input.chars() {
            if ch == ESC {
                if last == Some(ESC) {
                    out.push(ch);
                }
            } else {
                out.push(ch);
            }
            last = Some(ch);
        }
        out
    }
}
