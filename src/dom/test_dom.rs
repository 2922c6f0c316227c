use crate::dom::Element;

/// Arena-backed document fixture for tests.
///
/// Node 0 is the root; `add_child` returns the new node's id, and `elem` hands
/// out [TestElem] handles implementing [Element].
#[derive(Debug)]
pub(crate) struct TestDoc {
    nodes: Vec<TestNode>,
}

#[derive(Debug)]
struct TestNode {
    tag: String,
    attrs: Vec<(String, String)>,
    text: String,
    parent: Option<usize>,
    children: Vec<usize>,
}

impl TestNode {
    fn new(tag: &str, parent: Option<usize>) -> Self {
        Self {
            tag: tag.to_string(),
            attrs: Vec::new(),
            text: String::new(),
            parent,
            children: Vec::new(),
        }
    }
}

impl TestDoc {
    pub(crate) fn new(root_tag: &str) -> Self {
        Self {
            nodes: vec![TestNode::new(root_tag, None)],
        }
    }

    pub(crate) fn add_child(&mut self, parent: usize, tag: &str) -> usize {
        let id = self.nodes.len();
        self.nodes.push(TestNode::new(tag, Some(parent)));
        self.nodes[parent].children.push(id);
        id
    }

    pub(crate) fn set_attr(&mut self, id: usize, key: &str, value: &str) {
        self.nodes[id].attrs.push((key.to_string(), value.to_string()));
    }

    pub(crate) fn set_text(&mut self, id: usize, text: &str) {
        self.nodes[id].text = text.to_string();
    }

    pub(crate) fn elem(&self, id: usize) -> TestElem<'_> {
        TestElem { doc: self, id }
    }

    pub(crate) fn root(&self) -> TestElem<'_> {
        self.elem(0)
    }
}

#[derive(Debug, Copy, Clone)]
pub(crate) struct TestElem<'a> {
    doc: &'a TestDoc,
    id: usize,
}

impl TestElem<'_> {
    fn node(&self) -> &TestNode {
        &self.doc.nodes[self.id]
    }
}

impl PartialEq for TestElem<'_> {
    fn eq(&self, other: &Self) -> bool {
        std::ptr::eq(self.doc, other.doc) && self.id == other.id
    }
}

impl Element for TestElem<'_> {
    fn tag_name(&self) -> &str {
        &self.node().tag
    }

    fn id(&self) -> &str {
        self.attr("id").unwrap_or("")
    }

    fn classes(&self) -> Vec<&str> {
        self.attr("class")
            .map(|value| value.split_ascii_whitespace().collect())
            .unwrap_or_default()
    }

    fn attr(&self, name: &str) -> Option<&str> {
        self.node()
            .attrs
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }

    fn attr_names(&self) -> Vec<&str> {
        self.node().attrs.iter().map(|(key, _)| key.as_str()).collect()
    }

    fn own_text(&self) -> String {
        self.node().text.clone()
    }

    fn all_text(&self) -> String {
        let mut parts = Vec::new();
        if !self.node().text.is_empty() {
            parts.push(self.node().text.clone());
        }
        for child in self.children() {
            let text = child.all_text();
            if !text.is_empty() {
                parts.push(text);
            }
        }
        parts.join(" ")
    }

    fn parent(&self) -> Option<Self> {
        self.node().parent.map(|id| self.doc.elem(id))
    }

    fn children(&self) -> Vec<Self> {
        self.node().children.iter().map(|id| self.doc.elem(*id)).collect()
    }
}
