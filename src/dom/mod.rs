//! The seam between the selector engine and a host document model.
//!
//! Evaluators never hold references into a document. They are handed a pair of
//! [Element] handles at match time, so any DOM representation (arena indices,
//! reference-counted nodes, FFI wrappers) can be queried by implementing the
//! trait on a cheap handle type.

#[cfg(test)]
pub(crate) mod test_dom;

/// Read-only view of one element in a host document tree.
///
/// Implementations are handles: `Clone` duplicates the handle, not the
/// subtree, and `PartialEq` is node identity (two handles are equal iff they
/// designate the same node of the same document).
///
/// Only the required methods need implementing; the navigation and position
/// methods below them are derived from `parent` and `children`.
///
/// Tag-name and attribute-name case semantics live here, not in the parser:
/// an HTML-mode document will typically hand out normalized (lowercase) names,
/// an XML-mode document preserves case, and `attr` may or may not ignore case
/// when looking up a name.
pub trait Element: Sized + Clone + PartialEq {
    /// The element's tag name, in the document's normalized form.
    /// Namespaced names use `:` as the separator (`fb:name`).
    fn tag_name(&self) -> &str;

    /// The element's `id` attribute, or `""` when absent.
    fn id(&self) -> &str;

    /// The element's class names.
    fn classes(&self) -> Vec<&str>;

    /// The value of the named attribute, if present.
    fn attr(&self, name: &str) -> Option<&str>;

    /// The names of all attributes present on this element.
    fn attr_names(&self) -> Vec<&str>;

    /// Text directly inside this element, excluding descendants' text.
    fn own_text(&self) -> String;

    /// Text of this element and all of its descendants.
    fn all_text(&self) -> String;

    /// The parent element, or `None` for the document root.
    fn parent(&self) -> Option<Self>;

    /// Child elements, in document order.
    fn children(&self) -> Vec<Self>;

    fn has_attr(&self, name: &str) -> bool {
        self.attr(name).is_some()
    }

    fn has_class(&self, name: &str) -> bool {
        self.classes().iter().any(|class| class.eq_ignore_ascii_case(name))
    }

    /// Whether this element is the root of its document.
    fn is_root(&self) -> bool {
        self.parent().is_none()
    }

    /// The root of this element's document.
    fn root(&self) -> Self {
        let mut current = self.clone();
        while let Some(parent) = current.parent() {
            current = parent;
        }
        current
    }

    /// Siblings appearing before this element, in document order.
    fn siblings_before(&self) -> Vec<Self> {
        let Some(parent) = self.parent() else {
            return Vec::new();
        };
        let siblings = parent.children();
        match siblings.iter().position(|sibling| sibling == self) {
            Some(position) => siblings.into_iter().take(position).collect(),
            None => Vec::new(),
        }
    }

    /// The sibling immediately preceding this element.
    fn previous_sibling(&self) -> Option<Self> {
        self.siblings_before().pop()
    }

    /// All descendants of this element (not including itself), depth-first.
    fn descendants(&self) -> Vec<Self> {
        let mut found = Vec::new();
        let mut pending = self.children();
        pending.reverse();
        while let Some(element) = pending.pop() {
            let mut children = element.children();
            children.reverse();
            found.push(element);
            pending.append(&mut children);
        }
        found
    }

    /// 1-based position among this element's siblings. The root is position 1.
    fn sibling_index(&self) -> usize {
        self.siblings_before().len() + 1
    }

    /// 1-based position among this element's siblings, counted from the end.
    fn sibling_index_from_end(&self) -> usize {
        let Some(parent) = self.parent() else {
            return 1;
        };
        let siblings = parent.children();
        match siblings.iter().position(|sibling| sibling == self) {
            Some(position) => siblings.len() - position,
            None => 1,
        }
    }

    /// 1-based position among siblings that share this element's tag name.
    fn sibling_index_of_type(&self) -> usize {
        1 + self
            .siblings_before()
            .iter()
            .filter(|sibling| sibling.tag_name() == self.tag_name())
            .count()
    }

    /// 1-based position among siblings of this tag name, counted from the end.
    fn sibling_index_of_type_from_end(&self) -> usize {
        let Some(parent) = self.parent() else {
            return 1;
        };
        let siblings = parent.children();
        let Some(position) = siblings.iter().position(|sibling| sibling == self) else {
            return 1;
        };
        1 + siblings[position + 1..]
            .iter()
            .filter(|sibling| sibling.tag_name() == self.tag_name())
            .count()
    }
}
