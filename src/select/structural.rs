//! Tree walks backing the structural evaluator variants.
//!
//! Each function tests the inner evaluator against elements *related to* the
//! candidate (ancestors, preceding siblings, descendants); the candidate's own
//! predicate lives in the sibling `And` branch the parser builds around these.

use crate::dom::Element;
use crate::select::Evaluator;

/// Some strict ancestor of `element` matches. The walk tests ancestors up to
/// and including `root`, and never matches when `element` is `root` itself.
pub(crate) fn matches_ancestor<E: Element>(inner: &Evaluator, root: &E, element: &E) -> bool {
    if element == root {
        return false;
    }
    let mut cursor = element.parent();
    while let Some(ancestor) = cursor {
        if inner.matches(root, &ancestor) {
            return true;
        }
        if ancestor == *root {
            break;
        }
        cursor = ancestor.parent();
    }
    false
}

/// The direct parent of `element` matches.
pub(crate) fn matches_immediate_parent<E: Element>(inner: &Evaluator, root: &E, element: &E) -> bool {
    match element.parent() {
        Some(parent) => inner.matches(root, &parent),
        None => false,
    }
}

/// Some sibling before `element` (in document order) matches.
pub(crate) fn matches_previous_sibling<E: Element>(inner: &Evaluator, root: &E, element: &E) -> bool {
    if element == root {
        return false;
    }
    element
        .siblings_before()
        .iter()
        .any(|sibling| inner.matches(root, sibling))
}

/// The sibling immediately before `element` matches.
pub(crate) fn matches_immediate_previous_sibling<E: Element>(inner: &Evaluator, root: &E, element: &E) -> bool {
    if element == root {
        return false;
    }
    match element.previous_sibling() {
        Some(sibling) => inner.matches(root, &sibling),
        None => false,
    }
}

/// Some strict descendant of `element` matches, with the search re-rooted at
/// `element` (so a leading combinator inside `:has(...)` binds to it).
pub(crate) fn matches_descendant<E: Element>(inner: &Evaluator, element: &E) -> bool {
    element
        .descendants()
        .iter()
        .any(|descendant| inner.matches(element, descendant))
}
