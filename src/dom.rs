use std::ops::Index;

use crate::error::ParseError;
use crate::sink::{NodeOrText, TreeSink};

/// The namespaces an element or attribute can live in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Namespace {
    /// No namespace (tokenizer-level attributes, unadjusted).
    None,
    /// `http://www.w3.org/1999/xhtml`
    Html,
    /// `http://www.w3.org/1998/Math/MathML`
    MathMl,
    /// `http://www.w3.org/2000/svg`
    Svg,
    /// `http://www.w3.org/1999/xlink`
    XLink,
    /// `http://www.w3.org/XML/1998/namespace`
    Xml,
    /// `http://www.w3.org/2000/xmlns/`
    XmlNs,
}

impl Namespace {
    /// The namespace URI, bit-exact per the standard. The empty string for
    /// [`Namespace::None`].
    pub fn url(self) -> &'static str {
        match self {
            Namespace::None => "",
            Namespace::Html => "http://www.w3.org/1999/xhtml",
            Namespace::MathMl => "http://www.w3.org/1998/Math/MathML",
            Namespace::Svg => "http://www.w3.org/2000/svg",
            Namespace::XLink => "http://www.w3.org/1999/xlink",
            Namespace::Xml => "http://www.w3.org/XML/1998/namespace",
            Namespace::XmlNs => "http://www.w3.org/2000/xmlns/",
        }
    }
}

/// A namespace-qualified name of an element or attribute.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct QualName {
    /// The prefix as written in the source, after attribute adjustment
    /// (`xlink:href` keeps `xlink`). Elements never have one.
    pub prefix: Option<String>,
    /// The namespace.
    pub ns: Namespace,
    /// The local name. Lowercased for HTML elements; case-adjusted per the
    /// SVG table for foreign elements.
    pub local: String,
}

impl QualName {
    /// A name in the given namespace with no prefix.
    pub fn new(ns: Namespace, local: impl Into<String>) -> Self {
        QualName {
            prefix: None,
            ns,
            local: local.into(),
        }
    }

    /// A name in the HTML namespace.
    pub fn html(local: impl Into<String>) -> Self {
        QualName::new(Namespace::Html, local)
    }

    pub(crate) fn is_html(&self, local: &str) -> bool {
        self.ns == Namespace::Html && self.local == local
    }
}

/// An element attribute. `(name.ns, name.local)` pairs are unique within
/// one element.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attribute {
    /// The attribute name.
    pub name: QualName,
    /// The attribute value.
    pub value: String,
}

/// The quirks mode of a document, derived from its doctype.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QuirksMode {
    /// A conforming doctype was seen.
    NoQuirks,
    /// One of the "limited quirks" legacy doctypes was seen.
    LimitedQuirks,
    /// No doctype, or one of the quirky legacy doctypes.
    Quirks,
}

/// Index of a node within its [`Document`] arena.
///
/// All structure lives in the arena: nodes refer to each other by id, so
/// parent links cost nothing and the adoption agency can re-parent without
/// reference counting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId(usize);

/// A node in the document tree.
#[derive(Debug)]
pub struct Node {
    parent: Option<NodeId>,
    children: Vec<NodeId>,
    data: NodeData,
}

impl Node {
    /// The parent, if attached.
    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    /// Child ids in tree order.
    pub fn children(&self) -> &[NodeId] {
        &self.children
    }

    /// What kind of node this is, and its payload.
    pub fn data(&self) -> &NodeData {
        &self.data
    }
}

/// The payload of a [`Node`].
#[derive(Debug)]
pub enum NodeData {
    /// The document root of a full parse.
    Document,
    /// The root of a fragment parse, and the content of `template`.
    Fragment,
    /// `<!DOCTYPE ...>`
    Doctype {
        /// The doctype name, empty when missing.
        name: String,
        /// The public identifier; `None` when absent (distinct from empty).
        public_id: Option<String>,
        /// The system identifier; `None` when absent (distinct from empty).
        system_id: Option<String>,
    },
    /// Character data. Adjacent insertions coalesce, so no node ever has
    /// two neighbouring text children.
    Text {
        /// The character data.
        contents: String,
    },
    /// `<!-- ... -->`
    Comment {
        /// The comment text.
        contents: String,
    },
    /// An element.
    Element {
        /// The namespace-qualified element name.
        name: QualName,
        /// Attributes in source order, unique by `(namespace, local)`.
        attrs: Vec<Attribute>,
        /// For `template` elements in the HTML namespace, the content
        /// fragment children are parsed into.
        template_contents: Option<NodeId>,
    },
}

/// The outcome of a parse: a node arena rooted at a document (or fragment)
/// node, plus the quirks mode and the ordered parse errors.
///
/// `Document` is also the default [`TreeSink`], which is how the tree
/// constructor builds into it.
#[derive(Debug)]
pub struct Document {
    nodes: Vec<Node>,
    root: NodeId,
    /// The quirks mode derived from the doctype.
    pub quirks_mode: QuirksMode,
    /// Every parse error, in non-decreasing position order.
    pub errors: Vec<ParseError>,
    namespace_html_elements: bool,
}

impl Default for Document {
    fn default() -> Self {
        Document {
            nodes: vec![Node {
                parent: None,
                children: Vec::new(),
                data: NodeData::Document,
            }],
            root: NodeId(0),
            quirks_mode: QuirksMode::NoQuirks,
            errors: Vec::new(),
            namespace_html_elements: true,
        }
    }
}

impl Index<NodeId> for Document {
    type Output = Node;

    fn index(&self, id: NodeId) -> &Node {
        &self.nodes[id.0]
    }
}

impl Document {
    /// The root node: [`NodeData::Document`] for document parses,
    /// [`NodeData::Fragment`] for fragment parses.
    pub fn root(&self) -> NodeId {
        self.root
    }

    /// The namespace URI of an element as seen through the
    /// `namespace_html_elements` option: the real URI, except that HTML
    /// elements report the empty string when the option was off.
    pub fn namespace_url(&self, id: NodeId) -> Option<&'static str> {
        match self[id].data {
            NodeData::Element { ref name, .. } => {
                if name.ns == Namespace::Html && !self.namespace_html_elements {
                    Some("")
                } else {
                    Some(name.ns.url())
                }
            }
            _ => None,
        }
    }

    pub(crate) fn set_namespace_html_elements(&mut self, yes: bool) {
        self.namespace_html_elements = yes;
    }

    fn new_node(&mut self, data: NodeData) -> NodeId {
        let id = NodeId(self.nodes.len());
        self.nodes.push(Node {
            parent: None,
            children: Vec::new(),
            data,
        });
        id
    }

    fn detach(&mut self, target: NodeId) {
        if let Some(parent) = self.nodes[target.0].parent.take() {
            let children = &mut self.nodes[parent.0].children;
            let idx = children
                .iter()
                .position(|&c| c == target)
                .expect("detached node not found in its parent");
            children.remove(idx);
        }
    }

    fn attach(&mut self, parent: NodeId, child: NodeId, before: Option<usize>) {
        debug_assert!(self.nodes[child.0].parent.is_none());
        self.nodes[child.0].parent = Some(parent);
        match before {
            Some(idx) => self.nodes[parent.0].children.insert(idx, child),
            None => self.nodes[parent.0].children.push(child),
        }
    }

    fn append_text(&mut self, parent: NodeId, before: Option<usize>, text: String) {
        // coalesce with the text node immediately before the insertion point
        let prev = match before {
            Some(0) => None,
            Some(idx) => Some(self.nodes[parent.0].children[idx - 1]),
            None => self.nodes[parent.0].children.last().copied(),
        };
        if let Some(prev) = prev {
            if let NodeData::Text { ref mut contents } = self.nodes[prev.0].data {
                contents.push_str(&text);
                return;
            }
        }
        let node = self.new_node(NodeData::Text { contents: text });
        self.attach(parent, node, before);
    }

    fn position_of(&self, sibling: NodeId) -> (NodeId, usize) {
        let parent = self.nodes[sibling.0]
            .parent
            .expect("append_before_sibling on a detached node");
        let idx = self.nodes[parent.0]
            .children
            .iter()
            .position(|&c| c == sibling)
            .expect("sibling not found in its parent");
        (parent, idx)
    }

    /// Replace the root with a fragment node holding the children of
    /// `html`, per the fragment parsing algorithm's final step.
    pub(crate) fn reroot_as_fragment(&mut self, html: NodeId) {
        let fragment = self.new_node(NodeData::Fragment);
        let children = std::mem::take(&mut self.nodes[html.0].children);
        for &child in &children {
            self.nodes[child.0].parent = Some(fragment);
        }
        self.nodes[fragment.0].children = children;
        self.root = fragment;
    }
}

impl TreeSink for Document {
    type Handle = NodeId;
    type Output = Document;

    fn finish(self) -> Document {
        self
    }

    fn parse_error(&mut self, error: ParseError) {
        self.errors.push(error);
    }

    fn document(&mut self) -> NodeId {
        self.root
    }

    fn elem_name(&self, target: &NodeId) -> QualName {
        match self[*target].data {
            NodeData::Element { ref name, .. } => name.clone(),
            _ => panic!("elem_name on a non-element node"),
        }
    }

    fn create_element(&mut self, name: QualName, attrs: Vec<Attribute>) -> NodeId {
        let template_contents = if name.is_html("template") {
            Some(self.new_node(NodeData::Fragment))
        } else {
            None
        };
        self.new_node(NodeData::Element {
            name,
            attrs,
            template_contents,
        })
    }

    fn create_comment(&mut self, text: String) -> NodeId {
        self.new_node(NodeData::Comment { contents: text })
    }

    fn append(&mut self, parent: &NodeId, child: NodeOrText<NodeId>) {
        match child {
            NodeOrText::AppendNode(node) => self.attach(*parent, node, None),
            NodeOrText::AppendText(text) => self.append_text(*parent, None, text),
        }
    }

    fn append_before_sibling(&mut self, sibling: &NodeId, child: NodeOrText<NodeId>) {
        let (parent, idx) = self.position_of(*sibling);
        match child {
            NodeOrText::AppendNode(node) => self.attach(parent, node, Some(idx)),
            NodeOrText::AppendText(text) => self.append_text(parent, Some(idx), text),
        }
    }

    fn append_based_on_parent_node(
        &mut self,
        element: &NodeId,
        prev_element: &NodeId,
        child: NodeOrText<NodeId>,
    ) {
        if self[*element].parent.is_some() {
            self.append_before_sibling(element, child);
        } else {
            self.append(prev_element, child);
        }
    }

    fn append_doctype_to_document(
        &mut self,
        name: String,
        public_id: Option<String>,
        system_id: Option<String>,
    ) {
        let node = self.new_node(NodeData::Doctype {
            name,
            public_id,
            system_id,
        });
        let root = self.root;
        self.attach(root, node, None);
    }

    fn add_attrs_if_missing(&mut self, target: &NodeId, new_attrs: Vec<Attribute>) {
        match self.nodes[target.0].data {
            NodeData::Element { ref mut attrs, .. } => {
                for attr in new_attrs {
                    if !attrs.iter().any(|a| a.name == attr.name) {
                        attrs.push(attr);
                    }
                }
            }
            _ => panic!("add_attrs_if_missing on a non-element node"),
        }
    }

    fn remove_from_parent(&mut self, target: &NodeId) {
        self.detach(*target);
    }

    fn reparent_children(&mut self, node: &NodeId, new_parent: &NodeId) {
        debug_assert!(self[*new_parent].children.is_empty());
        let children = std::mem::take(&mut self.nodes[node.0].children);
        for &child in &children {
            self.nodes[child.0].parent = Some(*new_parent);
        }
        self.nodes[new_parent.0].children = children;
    }

    fn template_contents(&mut self, target: &NodeId) -> NodeId {
        match self[*target].data {
            NodeData::Element {
                template_contents: Some(contents),
                ..
            } => contents,
            _ => panic!("template_contents on a non-template node"),
        }
    }

    fn same_node(&self, x: &NodeId, y: &NodeId) -> bool {
        x == y
    }

    fn set_quirks_mode(&mut self, mode: QuirksMode) {
        self.quirks_mode = mode;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn text_coalesces_on_append() {
        let mut doc = Document::default();
        let root = doc.document();
        let p = doc.create_element(QualName::html("p"), Vec::new());
        doc.append(&root, NodeOrText::AppendNode(p));
        doc.append(&p, NodeOrText::AppendText("a".into()));
        doc.append(&p, NodeOrText::AppendText("b".into()));
        assert_eq!(doc[p].children().len(), 1);
        match doc[doc[p].children()[0]].data() {
            NodeData::Text { contents } => assert_eq!(contents, "ab"),
            other => panic!("expected text, got {:?}", other),
        }
    }

    #[test]
    fn text_coalesces_before_sibling() {
        let mut doc = Document::default();
        let root = doc.document();
        let table = doc.create_element(QualName::html("table"), Vec::new());
        doc.append(&root, NodeOrText::AppendNode(table));
        doc.append_before_sibling(&table, NodeOrText::AppendText("a".into()));
        doc.append_before_sibling(&table, NodeOrText::AppendText("b".into()));
        assert_eq!(doc[root].children().len(), 2);
    }

    #[test]
    fn template_gets_contents_fragment() {
        let mut doc = Document::default();
        let t = doc.create_element(QualName::html("template"), Vec::new());
        let contents = doc.template_contents(&t);
        assert!(matches!(doc[contents].data(), NodeData::Fragment));
    }
}
