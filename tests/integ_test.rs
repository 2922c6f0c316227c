use cssq::dom::Element;
use cssq::query::{parse, ParseError, ParseErrorReason};
use cssq::select::Evaluator;

fn tag(name: &str) -> Evaluator {
    Evaluator::Tag(name.to_string())
}

#[test]
fn parses_the_documented_shapes() {
    assert_eq!(parse("div").unwrap(), tag("div"));
    assert_eq!(parse("#main").unwrap(), Evaluator::Id("main".to_string()));
    assert_eq!(
        parse("div.note").unwrap(),
        Evaluator::And(vec![tag("div"), Evaluator::Class("note".to_string())])
    );
    assert_eq!(
        parse("a > b + c").unwrap(),
        Evaluator::And(vec![
            tag("c"),
            Evaluator::ImmediatePreviousSibling(Box::new(Evaluator::And(vec![
                tag("b"),
                Evaluator::ImmediateParent(Box::new(tag("a"))),
            ]))),
        ])
    );
    assert_eq!(parse("a, b").unwrap(), Evaluator::Or(vec![tag("a"), tag("b")]));
    assert_eq!(
        parse("p:nth-child(2n+1)").unwrap(),
        Evaluator::And(vec![tag("p"), Evaluator::NthChild(2, 1)])
    );
}

#[test]
fn errors_are_reported_with_context() {
    let err: ParseError = parse("div {oops}").expect_err("expected a parse error");
    assert_eq!(err.reason, ParseErrorReason::UnexpectedToken);
    assert_eq!(err.to_string(), "could not parse query \"{oops}\": unexpected token at \"{oops}\"");

    assert!(parse("").is_err());
    assert!(parse(":has()").is_err());
    assert!(parse("[open").is_err());
}

#[test]
fn evaluator_implements_try_from() {
    let eval = Evaluator::try_from("span").expect("expected a valid query");
    assert_eq!(eval, tag("span"));
}

#[test]
fn evaluator_trees_are_shareable_across_threads() {
    let eval = parse("div.note, p:contains(x)").unwrap();
    std::thread::scope(|scope| {
        scope.spawn(|| {
            assert!(matches!(&eval, Evaluator::Or(children) if children.len() == 2));
        });
    });
}

// A host-side document model: a boxed tree with parent back-pointers recovered
// by searching from the root, as an external crate without an arena might do.
mod host_dom {
    use cssq::dom::Element;

    pub struct Node {
        pub tag: String,
        pub attrs: Vec<(String, String)>,
        pub text: String,
        pub children: Vec<Node>,
    }

    impl Node {
        pub fn new(tag: &str) -> Self {
            Self {
                tag: tag.to_string(),
                attrs: Vec::new(),
                text: String::new(),
                children: Vec::new(),
            }
        }

        pub fn attr(mut self, key: &str, value: &str) -> Self {
            self.attrs.push((key.to_string(), value.to_string()));
            self
        }

        pub fn text(mut self, text: &str) -> Self {
            self.text = text.to_string();
            self
        }

        pub fn child(mut self, child: Node) -> Self {
            self.children.push(child);
            self
        }

        pub fn handle(&self) -> Handle<'_> {
            Handle { root: self, node: self }
        }
    }

    #[derive(Copy, Clone)]
    pub struct Handle<'a> {
        root: &'a Node,
        node: &'a Node,
    }

    impl PartialEq for Handle<'_> {
        fn eq(&self, other: &Self) -> bool {
            std::ptr::eq(self.node, other.node)
        }
    }

    impl<'a> Handle<'a> {
        fn find_parent(&self, candidate: &'a Node) -> Option<&'a Node> {
            if candidate.children.iter().any(|child| std::ptr::eq(child, self.node)) {
                return Some(candidate);
            }
            candidate.children.iter().find_map(|child| self.find_parent(child))
        }

        fn handle_of(&self, node: &'a Node) -> Self {
            Self { root: self.root, node }
        }
    }

    impl<'a> Element for Handle<'a> {
        fn tag_name(&self) -> &str {
            &self.node.tag
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
            self.node
                .attrs
                .iter()
                .find(|(key, _)| key.eq_ignore_ascii_case(name))
                .map(|(_, value)| value.as_str())
        }

        fn attr_names(&self) -> Vec<&str> {
            self.node.attrs.iter().map(|(key, _)| key.as_str()).collect()
        }

        fn own_text(&self) -> String {
            self.node.text.clone()
        }

        fn all_text(&self) -> String {
            let mut parts = Vec::new();
            if !self.node.text.is_empty() {
                parts.push(self.node.text.clone());
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
            if std::ptr::eq(self.node, self.root) {
                return None;
            }
            Some(self.handle_of(self.find_parent(self.root)?))
        }

        fn children(&self) -> Vec<Self> {
            self.node.children.iter().map(|child| self.handle_of(child)).collect()
        }
    }
}

fn sample_page() -> host_dom::Node {
    use host_dom::Node;
    Node::new("html").child(
        Node::new("body")
            .child(
                Node::new("div")
                    .attr("id", "main")
                    .child(Node::new("h1").text("Releases"))
                    .child(
                        Node::new("ul")
                            .child(Node::new("li").attr("class", "current").text("v2.0"))
                            .child(Node::new("li").text("v1.9"))
                            .child(Node::new("li").text("v1.8")),
                    ),
            )
            .child(
                Node::new("footer").child(
                    Node::new("a")
                        .attr("href", "https://example.com/feed.xml")
                        .text("Feed"),
                ),
            ),
    )
}

fn select_tags(page: &host_dom::Node, query: &str) -> Vec<String> {
    let eval = parse(query).unwrap_or_else(|err| panic!("{err}"));
    let root = page.handle();
    let mut found = Vec::new();
    if eval.matches(&root, &root) {
        found.push(root.tag_name().to_string());
    }
    for el in root.descendants() {
        if eval.matches(&root, &el) {
            found.push(el.tag_name().to_string());
        }
    }
    found
}

fn select_texts(page: &host_dom::Node, query: &str) -> Vec<String> {
    let eval = parse(query).unwrap_or_else(|err| panic!("{err}"));
    let root = page.handle();
    root.descendants()
        .into_iter()
        .filter(|el| eval.matches(&root, el))
        .map(|el| el.own_text())
        .collect()
}

#[test]
fn matches_against_a_host_document() {
    let page = sample_page();
    assert_eq!(select_tags(&page, "#main"), vec!["div"]);
    assert_eq!(select_tags(&page, "body > div"), vec!["div"]);
    assert_eq!(select_tags(&page, "div a"), Vec::<String>::new());
    assert_eq!(select_tags(&page, "footer a, h1"), vec!["h1", "a"]);
    assert_eq!(select_tags(&page, ":root"), vec!["html"]);
    assert_eq!(select_tags(&page, "[href$=xml]"), vec!["a"]);
}

#[test]
fn positional_queries_against_a_host_document() {
    let page = sample_page();
    assert_eq!(select_texts(&page, "li:first-child"), vec!["v2.0"]);
    assert_eq!(select_texts(&page, "li:nth-child(odd)"), vec!["v2.0", "v1.8"]);
    assert_eq!(select_texts(&page, "li:last-child"), vec!["v1.8"]);
    assert_eq!(select_texts(&page, "li:eq(1)"), vec!["v1.9"]);
    assert_eq!(select_texts(&page, ".current + li"), vec!["v1.9"]);
}

#[test]
fn text_queries_against_a_host_document() {
    let page = sample_page();
    assert_eq!(select_texts(&page, "li:contains(v1)"), vec!["v1.9", "v1.8"]);
    assert_eq!(select_texts(&page, "a:matches(^Feed$)"), vec!["Feed"]);
    assert_eq!(select_tags(&page, "div:has(li)"), vec!["div"]);
    assert_eq!(select_texts(&page, "li:not(.current)"), vec!["v1.9", "v1.8"]);
}
