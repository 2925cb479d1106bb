use crate::dom::{Attribute, QualName, QuirksMode};
use crate::error::ParseError;

/// Something which can be inserted into the tree: an existing node handle,
/// or a run of text that the sink may merge into an adjacent text node.
pub enum NodeOrText<Handle> {
    /// An existing node.
    AppendNode(Handle),
    /// Character data. The sink must append it to the previous sibling if
    /// that sibling is a text node, so no element ever ends up with two
    /// adjacent text children.
    AppendText(String),
}

/// The narrow interface through which the tree constructor builds a tree.
///
/// The bundled arena [`crate::Document`] implements this, but any
/// DOM-like structure can: the constructor never inspects tree structure
/// beyond [`elem_name`](TreeSink::elem_name), so handles can be indices,
/// reference-counted pointers, or ids in someone else's tree.
///
/// A sink never rejects an operation; it is a translator, not a validator.
pub trait TreeSink {
    /// The reference to a node that the constructor passes around.
    type Handle: Clone;

    /// What [`finish`](TreeSink::finish) produces.
    type Output;

    /// Consume the sink and return the finished tree.
    fn finish(self) -> Self::Output;

    /// Record a parse error. Errors arrive in non-decreasing position
    /// order, tokenizer and tree-construction errors interleaved.
    fn parse_error(&mut self, error: ParseError);

    /// The handle of the document node.
    fn document(&mut self) -> Self::Handle;

    /// The name of an element previously created through this sink.
    fn elem_name(&self, target: &Self::Handle) -> QualName;

    /// Create an element. `attrs` are already namespace-adjusted.
    fn create_element(&mut self, name: QualName, attrs: Vec<Attribute>) -> Self::Handle;

    /// Create a comment node.
    fn create_comment(&mut self, text: String) -> Self::Handle;

    /// Append a node or text as the last child of `parent`.
    fn append(&mut self, parent: &Self::Handle, child: NodeOrText<Self::Handle>);

    /// Insert a node or text immediately before `sibling`.
    fn append_before_sibling(&mut self, sibling: &Self::Handle, child: NodeOrText<Self::Handle>);

    /// If `element` has a parent, insert `child` before `element`;
    /// otherwise append `child` to `prev_element`. This is the dynamic
    /// part of foster parenting.
    fn append_based_on_parent_node(
        &mut self,
        element: &Self::Handle,
        prev_element: &Self::Handle,
        child: NodeOrText<Self::Handle>,
    );

    /// Append a doctype node to the document. `None` identifiers are
    /// distinct from empty ones.
    fn append_doctype_to_document(
        &mut self,
        name: String,
        public_id: Option<String>,
        system_id: Option<String>,
    );

    /// Add each attribute `target` does not already have. Used for the
    /// `<html>`/`<body>` attribute merging rules.
    fn add_attrs_if_missing(&mut self, target: &Self::Handle, attrs: Vec<Attribute>);

    /// Detach `target` from its parent, if it has one.
    fn remove_from_parent(&mut self, target: &Self::Handle);

    /// Move all children of `node` to `new_parent`, preserving order.
    fn reparent_children(&mut self, node: &Self::Handle, new_parent: &Self::Handle);

    /// The content document fragment of a `template` element.
    fn template_contents(&mut self, target: &Self::Handle) -> Self::Handle;

    /// Whether two handles refer to the same node.
    fn same_node(&self, x: &Self::Handle, y: &Self::Handle) -> bool;

    /// The quirks mode, as decided by the doctype in `Initial` mode.
    fn set_quirks_mode(&mut self, mode: QuirksMode);
}
