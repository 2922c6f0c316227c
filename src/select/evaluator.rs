use crate::dom::Element;
use crate::query::{parse, ParseError};
use crate::select::{structural, StringMatcher};
use serde::Serialize;

/// One node of a parsed selector query: a predicate over a candidate element,
/// tested relative to a root element.
///
/// Trees are built bottom-up by the query parser and immutable afterwards.
/// The set is closed; evaluation is a single exhaustive match in
/// [Evaluator::matches].
#[derive(Debug, PartialEq, Serialize)]
pub enum Evaluator {
    Tag(String),
    Id(String),
    Class(String),
    AllElements,
    IsEmpty,
    /// CSS `:root`: the candidate is its document's root element. Not to be
    /// confused with [Evaluator::Root], which compares against the root the
    /// evaluation was invoked with.
    IsRoot,

    HasAttr(String),
    /// Some attribute *name* starts with the prefix (the `[^data-]` form).
    AttrStarting(String),
    AttrEq(String, String),
    AttrNe(String, String),
    AttrStartsWith(String, String),
    AttrEndsWith(String, String),
    AttrContains(String, String),
    AttrMatches(String, StringMatcher),

    /// `:lt` / `:gt` / `:eq` — 0-based sibling index comparisons.
    IndexLt(i32),
    IndexGt(i32),
    IndexEq(i32),
    IsFirstChild,
    IsLastChild,
    IsOnlyChild,
    IsFirstOfType,
    IsLastOfType,
    IsOnlyOfType,
    /// `a*n + b` over the candidate's 1-based sibling position, `n >= 0`.
    NthChild(i32, i32),
    NthLastChild(i32, i32),
    NthOfType(i32, i32),
    NthLastOfType(i32, i32),

    ContainsText(String),
    ContainsOwnText(String),
    MatchesText(StringMatcher),
    MatchesOwnText(StringMatcher),

    /// The candidate is the root the evaluation was invoked with; the
    /// implicit left operand of a query that starts with a combinator.
    Root,
    Parent(Box<Evaluator>),
    ImmediateParent(Box<Evaluator>),
    PreviousSibling(Box<Evaluator>),
    ImmediatePreviousSibling(Box<Evaluator>),
    Has(Box<Evaluator>),
    Not(Box<Evaluator>),

    And(Vec<Evaluator>),
    /// The last child is the right-most disjunct, which later combinators
    /// bind to during parsing.
    Or(Vec<Evaluator>),
}

impl Evaluator {
    /// Decides whether `element` matches this evaluator, relative to `root`.
    pub fn matches<E: Element>(&self, root: &E, element: &E) -> bool {
        match self {
            Evaluator::Tag(name) => element.tag_name() == name,
            Evaluator::Id(id) => element.id() == id,
            Evaluator::Class(name) => element.has_class(name),
            Evaluator::AllElements => true,
            Evaluator::IsEmpty => element.children().is_empty() && element.own_text().is_empty(),
            Evaluator::IsRoot => element.is_root(),

            Evaluator::HasAttr(key) => element.has_attr(key),
            Evaluator::AttrStarting(prefix) => element
                .attr_names()
                .iter()
                .any(|name| name.to_ascii_lowercase().starts_with(prefix.as_str())),
            Evaluator::AttrEq(key, value) => match element.attr(key) {
                Some(actual) => actual.trim().eq_ignore_ascii_case(value),
                None => false,
            },
            Evaluator::AttrNe(key, value) => !element.attr(key).unwrap_or("").eq_ignore_ascii_case(value),
            Evaluator::AttrStartsWith(key, value) => match element.attr(key) {
                Some(actual) => actual.to_ascii_lowercase().starts_with(value.as_str()),
                None => false,
            },
            Evaluator::AttrEndsWith(key, value) => match element.attr(key) {
                Some(actual) => actual.to_ascii_lowercase().ends_with(value.as_str()),
                None => false,
            },
            Evaluator::AttrContains(key, value) => match element.attr(key) {
                Some(actual) => actual.to_ascii_lowercase().contains(value.as_str()),
                None => false,
            },
            Evaluator::AttrMatches(key, matcher) => match element.attr(key) {
                Some(actual) => matcher.matches(actual),
                None => false,
            },

            Evaluator::IndexLt(index) => zero_based_index(element) < i64::from(*index),
            Evaluator::IndexGt(index) => zero_based_index(element) > i64::from(*index),
            Evaluator::IndexEq(index) => zero_based_index(element) == i64::from(*index),
            Evaluator::IsFirstChild => element.parent().is_some() && element.sibling_index() == 1,
            Evaluator::IsLastChild => element.parent().is_some() && element.sibling_index_from_end() == 1,
            Evaluator::IsOnlyChild => {
                element.parent().is_some() && element.sibling_index() == 1 && element.sibling_index_from_end() == 1
            }
            Evaluator::IsFirstOfType => element.parent().is_some() && element.sibling_index_of_type() == 1,
            Evaluator::IsLastOfType => element.parent().is_some() && element.sibling_index_of_type_from_end() == 1,
            Evaluator::IsOnlyOfType => {
                element.parent().is_some()
                    && element.sibling_index_of_type() == 1
                    && element.sibling_index_of_type_from_end() == 1
            }
            Evaluator::NthChild(a, b) => element.parent().is_some() && nth_matches(*a, *b, element.sibling_index()),
            Evaluator::NthLastChild(a, b) => {
                element.parent().is_some() && nth_matches(*a, *b, element.sibling_index_from_end())
            }
            Evaluator::NthOfType(a, b) => {
                element.parent().is_some() && nth_matches(*a, *b, element.sibling_index_of_type())
            }
            Evaluator::NthLastOfType(a, b) => {
                element.parent().is_some() && nth_matches(*a, *b, element.sibling_index_of_type_from_end())
            }

            Evaluator::ContainsText(needle) => element.all_text().to_lowercase().contains(needle.as_str()),
            Evaluator::ContainsOwnText(needle) => element.own_text().to_lowercase().contains(needle.as_str()),
            Evaluator::MatchesText(matcher) => matcher.matches(&element.all_text()),
            Evaluator::MatchesOwnText(matcher) => matcher.matches(&element.own_text()),

            Evaluator::Root => element == root,
            Evaluator::Parent(inner) => structural::matches_ancestor(inner, root, element),
            Evaluator::ImmediateParent(inner) => structural::matches_immediate_parent(inner, root, element),
            Evaluator::PreviousSibling(inner) => structural::matches_previous_sibling(inner, root, element),
            Evaluator::ImmediatePreviousSibling(inner) => {
                structural::matches_immediate_previous_sibling(inner, root, element)
            }
            Evaluator::Has(inner) => structural::matches_descendant(inner, element),
            Evaluator::Not(inner) => !inner.matches(root, element),

            Evaluator::And(children) => children.iter().all(|child| child.matches(root, element)),
            Evaluator::Or(children) => children.iter().any(|child| child.matches(root, element)),
        }
    }
}

fn zero_based_index<E: Element>(element: &E) -> i64 {
    element.sibling_index() as i64 - 1
}

/// Whether 1-based position `pos` is of the form `a*n + b` for some `n >= 0`.
/// `a == 0` degenerates to `pos == b`.
fn nth_matches(a: i32, b: i32, pos: usize) -> bool {
    let (a, b) = (i64::from(a), i64::from(b));
    let pos = pos as i64;
    if a == 0 {
        return pos == b;
    }
    (pos - b) * a >= 0 && (pos - b) % a == 0
}

impl TryFrom<&'_ str> for Evaluator {
    type Error = ParseError;

    fn try_from(value: &'_ str) -> Result<Self, Self::Error> {
        parse(value)
    }
}

impl TryFrom<&'_ String> for Evaluator {
    type Error = ParseError;

    fn try_from(value: &'_ String) -> Result<Self, Self::Error> {
        parse(value)
    }
}
