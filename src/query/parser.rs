use crate::query::error::{ParseError, ParseErrorReason};
use crate::query::token_queue::TokenQueue;
use crate::select::{Evaluator, StringMatcher};
use fancy_regex::Regex;
use std::sync::LazyLock;

const COMBINATORS: [&str; 5] = [",", ">", "+", "~", " "];
const ATTRIBUTE_COMPARATORS: [&str; 6] = ["=", "!=", "^=", "$=", "*=", "~="];

static NTH_AB: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)^((\+|-)?(\d+)?)n(\s*(\+|-)?\s*\d+)?$").expect("internal error"));
static NTH_B: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^(\+|-)?\d+$").expect("internal error"));

/// Parses a selector query into an [Evaluator] tree.
///
/// Sub-queries (inside `:has(...)` and `:not(...)`, and the right-hand side
/// of every combinator) recurse through this same entry point.
pub fn parse(query: &str) -> Result<Evaluator, ParseError> {
    QueryParser::new(query).parse()
}

struct QueryParser<'a> {
    query: &'a str,
    tq: TokenQueue<'a>,
    evals: Vec<Evaluator>,
}

impl<'a> QueryParser<'a> {
    fn new(query: &'a str) -> Self {
        Self {
            query,
            tq: TokenQueue::new(query),
            evals: Vec::new(),
        }
    }

    fn err(&self, reason: ParseErrorReason) -> ParseError {
        ParseError {
            query: self.query.to_string(),
            remainder: self.tq.remainder().to_string(),
            reason,
        }
    }

    fn parse(mut self) -> Result<Evaluator, ParseError> {
        self.tq.consume_whitespace();
        if self.tq.matches_any(&COMBINATORS) {
            // a query that starts with a combinator relates to the root the
            // evaluation will be invoked with
            self.evals.push(Evaluator::Root);
            if let Some(combinator) = self.tq.consume() {
                self.combinator(combinator)?;
            }
        } else {
            self.find_elements()?;
        }

        while !self.tq.is_empty() {
            let seen_whitespace = self.tq.consume_whitespace();
            if self.tq.is_empty() {
                // trailing whitespace is not a descendant combinator
                break;
            }
            if self.tq.matches_any(&COMBINATORS) {
                if let Some(combinator) = self.tq.consume() {
                    self.combinator(combinator)?;
                }
            } else if seen_whitespace {
                self.combinator(' ')?;
            } else {
                // another atomic selector on the same element: and-conjunct
                self.find_elements()?;
            }
        }

        if self.evals.len() == 1 {
            Ok(self.evals.remove(0))
        } else {
            Ok(Evaluator::And(self.evals))
        }
    }

    fn combinator(&mut self, combinator: char) -> Result<(), ParseError> {
        self.tq.consume_whitespace();
        let sub_query = self.consume_sub_query()?;
        let new_eval = parse(&sub_query)?;

        let mut current_eval = if self.evals.len() == 1 {
            self.evals.remove(0)
        } else {
            Evaluator::And(std::mem::take(&mut self.evals))
        };

        // `a, b > c` reads as `a, (b > c)`: when the accumulated evaluator is
        // an Or and the combinator is not `,`, only the right-most disjunct is
        // the left operand; the remaining disjuncts are reassembled around the
        // result below.
        let mut or_siblings: Option<Vec<Evaluator>> = None;
        if combinator != ',' {
            if let Evaluator::Or(mut disjuncts) = current_eval {
                current_eval = match disjuncts.pop() {
                    Some(right_most) => {
                        or_siblings = Some(disjuncts);
                        right_most
                    }
                    None => Evaluator::Or(disjuncts),
                };
            }
        }

        let combined = match combinator {
            '>' => Evaluator::And(vec![new_eval, Evaluator::ImmediateParent(Box::new(current_eval))]),
            ' ' => Evaluator::And(vec![new_eval, Evaluator::Parent(Box::new(current_eval))]),
            '+' => Evaluator::And(vec![
                new_eval,
                Evaluator::ImmediatePreviousSibling(Box::new(current_eval)),
            ]),
            '~' => Evaluator::And(vec![new_eval, Evaluator::PreviousSibling(Box::new(current_eval))]),
            ',' => match current_eval {
                Evaluator::Or(mut disjuncts) => {
                    disjuncts.push(new_eval);
                    Evaluator::Or(disjuncts)
                }
                other => Evaluator::Or(vec![other, new_eval]),
            },
            unknown => return Err(self.err(ParseErrorReason::UnknownCombinator(unknown))),
        };

        self.evals.push(match or_siblings {
            Some(mut disjuncts) => {
                disjuncts.push(combined);
                Evaluator::Or(disjuncts)
            }
            None => combined,
        });
        Ok(())
    }

    /// Reads the right-hand side of a combinator: everything up to the next
    /// top-level combinator (or end of input), with balanced `(...)` and
    /// `[...]` runs kept opaque so their contents never split the sub-query.
    fn consume_sub_query(&mut self) -> Result<String, ParseError> {
        let mut sub_query = String::new();
        while !self.tq.is_empty() {
            if self.tq.matches("(") {
                sub_query.push('(');
                sub_query.push_str(self.tq.chomp_balanced('(', ')').map_err(|reason| self.err(reason))?);
                sub_query.push(')');
            } else if self.tq.matches("[") {
                sub_query.push('[');
                sub_query.push_str(self.tq.chomp_balanced('[', ']').map_err(|reason| self.err(reason))?);
                sub_query.push(']');
            } else if matches!(self.tq.peek(), Some(ch) if is_combinator(ch)) {
                break;
            } else if let Some(ch) = self.tq.consume() {
                sub_query.push(ch);
            }
        }
        Ok(sub_query)
    }

    fn find_elements(&mut self) -> Result<(), ParseError> {
        if self.tq.match_chomp("#") {
            self.by_id()
        } else if self.tq.match_chomp(".") {
            self.by_class()
        } else if self.tq.matches_word() {
            self.by_tag()
        } else if self.tq.matches("[") {
            self.by_attribute()
        } else if self.tq.match_chomp("*") {
            self.evals.push(Evaluator::AllElements);
            Ok(())
        } else if self.tq.match_chomp(":lt(") {
            let index = self.consume_index()?;
            self.evals.push(Evaluator::IndexLt(index));
            Ok(())
        } else if self.tq.match_chomp(":gt(") {
            let index = self.consume_index()?;
            self.evals.push(Evaluator::IndexGt(index));
            Ok(())
        } else if self.tq.match_chomp(":eq(") {
            let index = self.consume_index()?;
            self.evals.push(Evaluator::IndexEq(index));
            Ok(())
        } else if self.tq.matches(":has(") {
            self.has()
        } else if self.tq.matches(":contains(") {
            self.contains(false)
        } else if self.tq.matches(":containsOwn(") {
            self.contains(true)
        } else if self.tq.matches(":matches(") {
            self.matches_text(false)
        } else if self.tq.matches(":matchesOwn(") {
            self.matches_text(true)
        } else if self.tq.matches(":not(") {
            self.not()
        } else if self.tq.match_chomp(":nth-child(") {
            self.css_nth_child(false, false)
        } else if self.tq.match_chomp(":nth-last-child(") {
            self.css_nth_child(true, false)
        } else if self.tq.match_chomp(":nth-of-type(") {
            self.css_nth_child(false, true)
        } else if self.tq.match_chomp(":nth-last-of-type(") {
            self.css_nth_child(true, true)
        } else if self.tq.match_chomp(":first-child") {
            self.evals.push(Evaluator::IsFirstChild);
            Ok(())
        } else if self.tq.match_chomp(":last-child") {
            self.evals.push(Evaluator::IsLastChild);
            Ok(())
        } else if self.tq.match_chomp(":first-of-type") {
            self.evals.push(Evaluator::IsFirstOfType);
            Ok(())
        } else if self.tq.match_chomp(":last-of-type") {
            self.evals.push(Evaluator::IsLastOfType);
            Ok(())
        } else if self.tq.match_chomp(":only-child") {
            self.evals.push(Evaluator::IsOnlyChild);
            Ok(())
        } else if self.tq.match_chomp(":only-of-type") {
            self.evals.push(Evaluator::IsOnlyOfType);
            Ok(())
        } else if self.tq.match_chomp(":empty") {
            self.evals.push(Evaluator::IsEmpty);
            Ok(())
        } else if self.tq.match_chomp(":root") {
            self.evals.push(Evaluator::IsRoot);
            Ok(())
        } else {
            Err(self.err(ParseErrorReason::UnexpectedToken))
        }
    }

    fn by_id(&mut self) -> Result<(), ParseError> {
        let id = self.tq.consume_css_identifier();
        if id.is_empty() {
            return Err(self.err(ParseErrorReason::EmptyArgument("id selector")));
        }
        self.evals.push(Evaluator::Id(id.to_string()));
        Ok(())
    }

    fn by_class(&mut self) -> Result<(), ParseError> {
        let class_name = self.tq.consume_css_identifier();
        if class_name.is_empty() {
            return Err(self.err(ParseErrorReason::EmptyArgument("class selector")));
        }
        self.evals.push(Evaluator::Class(class_name.to_string()));
        Ok(())
    }

    fn by_tag(&mut self) -> Result<(), ParseError> {
        let tag_name = self.tq.consume_element_selector();
        if tag_name.is_empty() {
            return Err(self.err(ParseErrorReason::EmptyArgument("tag selector")));
        }
        // `ns|tag` is the selector spelling of the namespaced name `ns:tag`
        let tag_name = if tag_name.contains('|') {
            tag_name.replace('|', ":")
        } else {
            tag_name.to_string()
        };
        self.evals.push(Evaluator::Tag(tag_name));
        Ok(())
    }

    fn by_attribute(&mut self) -> Result<(), ParseError> {
        let contents = self.tq.chomp_balanced('[', ']').map_err(|reason| self.err(reason))?;
        let mut cq = TokenQueue::new(contents);
        let key = cq.consume_to_any(&ATTRIBUTE_COMPARATORS);
        if key.trim().is_empty() {
            return Err(self.err(ParseErrorReason::EmptyArgument("attribute name")));
        }
        cq.consume_whitespace();

        let eval = if cq.is_empty() {
            if let Some(prefix) = key.strip_prefix('^') {
                Evaluator::AttrStarting(normalize_attr_key(prefix))
            } else {
                Evaluator::HasAttr(normalize_attr_key(key))
            }
        } else if cq.match_chomp("=") {
            Evaluator::AttrEq(normalize_attr_key(key), cq.remainder().trim().to_string())
        } else if cq.match_chomp("!=") {
            Evaluator::AttrNe(normalize_attr_key(key), cq.remainder().trim().to_string())
        } else if cq.match_chomp("^=") {
            Evaluator::AttrStartsWith(normalize_attr_key(key), normalize_attr_value(cq.remainder()))
        } else if cq.match_chomp("$=") {
            Evaluator::AttrEndsWith(normalize_attr_key(key), normalize_attr_value(cq.remainder()))
        } else if cq.match_chomp("*=") {
            Evaluator::AttrContains(normalize_attr_key(key), normalize_attr_value(cq.remainder()))
        } else if cq.match_chomp("~=") {
            let matcher = StringMatcher::compile(cq.remainder())
                .map_err(|message| self.err(ParseErrorReason::InvalidSyntax(message)))?;
            Evaluator::AttrMatches(normalize_attr_key(key), matcher)
        } else {
            return Err(ParseError {
                query: self.query.to_string(),
                remainder: cq.remainder().to_string(),
                reason: ParseErrorReason::UnexpectedToken,
            });
        };
        self.evals.push(eval);
        Ok(())
    }

    fn consume_index(&mut self) -> Result<i32, ParseError> {
        let index_str = self.tq.chomp_to(")").trim();
        let digits = index_str.strip_prefix('+').unwrap_or(index_str);
        digits.parse::<i32>().map_err(|_| {
            self.err(ParseErrorReason::InvalidSyntax(format!(
                "index must be numeric, was \"{index_str}\""
            )))
        })
    }

    fn css_nth_child(&mut self, backwards: bool, of_type: bool) -> Result<(), ParseError> {
        let arg = self.tq.chomp_to(")").trim().to_lowercase();
        let (a, b) = self.parse_nth_argument(&arg)?;
        self.evals.push(match (backwards, of_type) {
            (false, false) => Evaluator::NthChild(a, b),
            (true, false) => Evaluator::NthLastChild(a, b),
            (false, true) => Evaluator::NthOfType(a, b),
            (true, true) => Evaluator::NthLastOfType(a, b),
        });
        Ok(())
    }

    fn parse_nth_argument(&self, arg: &str) -> Result<(i32, i32), ParseError> {
        if arg == "odd" {
            return Ok((2, 1));
        }
        if arg == "even" {
            return Ok((2, 0));
        }
        if let Ok(Some(captures)) = NTH_AB.captures(arg) {
            // `a` defaults to 1 when `n` carries no digits, sign or not, so
            // `-n+3` keeps the original engine's (1, 3) reading
            let a = match captures.get(3) {
                Some(_) => self.parse_nth_group(captures.get(1).map(|m| m.as_str()).unwrap_or(""), arg)?,
                None => 1,
            };
            let b = match captures.get(4) {
                Some(group) => self.parse_nth_group(group.as_str(), arg)?,
                None => 0,
            };
            return Ok((a, b));
        }
        if NTH_B.captures(arg).ok().flatten().is_some() {
            return Ok((0, self.parse_nth_group(arg, arg)?));
        }
        Err(self.err(ParseErrorReason::InvalidSyntax(format!(
            "could not parse nth-index \"{arg}\""
        ))))
    }

    fn parse_nth_group(&self, group: &str, arg: &str) -> Result<i32, ParseError> {
        let compact: String = group.chars().filter(|ch| !ch.is_whitespace()).collect();
        let digits = compact.strip_prefix('+').unwrap_or(&compact);
        digits.parse::<i32>().map_err(|_| {
            self.err(ParseErrorReason::InvalidSyntax(format!(
                "could not parse nth-index \"{arg}\""
            )))
        })
    }

    fn has(&mut self) -> Result<(), ParseError> {
        self.tq.consume_seq(":has").map_err(|reason| self.err(reason))?;
        let sub_query = self.tq.chomp_balanced('(', ')').map_err(|reason| self.err(reason))?;
        if sub_query.is_empty() {
            return Err(self.err(ParseErrorReason::EmptyArgument(":has(el) sub-select")));
        }
        let inner = parse(sub_query)?;
        self.evals.push(Evaluator::Has(Box::new(inner)));
        Ok(())
    }

    fn contains(&mut self, own: bool) -> Result<(), ParseError> {
        let pseudo = if own { ":containsOwn" } else { ":contains" };
        self.tq.consume_seq(pseudo).map_err(|reason| self.err(reason))?;
        let raw = self.tq.chomp_balanced('(', ')').map_err(|reason| self.err(reason))?;
        let search_text = TokenQueue::unescape(raw).to_lowercase();
        if search_text.is_empty() {
            return Err(self.err(ParseErrorReason::EmptyArgument(":contains(text) query")));
        }
        self.evals.push(if own {
            Evaluator::ContainsOwnText(search_text)
        } else {
            Evaluator::ContainsText(search_text)
        });
        Ok(())
    }

    fn matches_text(&mut self, own: bool) -> Result<(), ParseError> {
        let pseudo = if own { ":matchesOwn" } else { ":matches" };
        self.tq.consume_seq(pseudo).map_err(|reason| self.err(reason))?;
        let pattern = self.tq.chomp_balanced('(', ')').map_err(|reason| self.err(reason))?;
        if pattern.is_empty() {
            return Err(self.err(ParseErrorReason::EmptyArgument(":matches(regex) query")));
        }
        let matcher =
            StringMatcher::compile(pattern).map_err(|message| self.err(ParseErrorReason::InvalidSyntax(message)))?;
        self.evals.push(if own {
            Evaluator::MatchesOwnText(matcher)
        } else {
            Evaluator::MatchesText(matcher)
        });
        Ok(())
    }

    fn not(&mut self) -> Result<(), ParseError> {
        self.tq.consume_seq(":not").map_err(|reason| self.err(reason))?;
        let sub_query = self.tq.chomp_balanced('(', ')').map_err(|reason| self.err(reason))?;
        if sub_query.is_empty() {
            return Err(self.err(ParseErrorReason::EmptyArgument(":not(selector) sub-select")));
        }
        let inner = parse(sub_query)?;
        self.evals.push(Evaluator::Not(Box::new(inner)));
        Ok(())
    }
}

fn is_combinator(ch: char) -> bool {
    matches!(ch, ',' | '>' | '+' | '~') || ch.is_ascii_whitespace()
}

fn normalize_attr_key(key: &str) -> String {
    key.trim().to_ascii_lowercase()
}

fn normalize_attr_value(value: &str) -> String {
    value.trim().to_ascii_lowercase()
}
