//! Arena-backed element tree.

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

/// Identity of a [`Document`], unique within the process.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct DocumentId(u64);

impl DocumentId {
    fn next() -> Self {
        static COUNTER: AtomicU64 = AtomicU64::new(0);
        Self(COUNTER.fetch_add(1, Ordering::Relaxed))
    }
}

/// Identity of an element inside a [`Document`].
///
/// Ids carry the identity of their document, are stable for its lifetime and
/// are never reused. An id from one document never addresses an element of
/// another.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId {
    document: DocumentId,
    index: usize,
}

impl NodeId {
    /// Document the element belongs to.
    #[must_use]
    pub fn document(self) -> DocumentId {
        self.document
    }

    /// Position of the element in the document arena.
    #[must_use]
    pub fn index(self) -> usize {
        self.index
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}.{}", self.document.0, self.index)
    }
}

/// Markup vocabulary an element belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ElementKind {
    /// HTML element.
    #[default]
    Html,
    /// SVG element.
    Svg,
    /// `MathML` element.
    MathMl,
    /// Element from any other namespace.
    Other,
}

impl ElementKind {
    /// Whether directives may be bound to elements of this kind.
    #[must_use]
    pub fn is_html_or_svg(self) -> bool {
        matches!(self, Self::Html | Self::Svg)
    }

    /// Resolve a kind from an XML namespace URI.
    #[must_use]
    pub fn from_namespace(uri: &str) -> Self {
        match uri {
            "http://www.w3.org/1999/xhtml" => Self::Html,
            "http://www.w3.org/2000/svg" => Self::Svg,
            "http://www.w3.org/1998/Math/MathML" => Self::MathMl,
            _ => Self::Other,
        }
    }
}

/// Capability interface the directive scanner needs from an element.
pub trait Element {
    /// Tag name as written in the document.
    fn tag_name(&self) -> &str;

    /// Markup vocabulary of the element.
    fn kind(&self) -> ElementKind;

    /// Attribute `(name, value)` pairs in document order.
    fn attribute_entries(&self) -> impl Iterator<Item = (&str, &str)>;
}

#[derive(Debug)]
struct Node {
    tag: String,
    kind: ElementKind,
    attributes: Vec<(String, String)>,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
}

impl Node {
    fn new(tag: String, kind: ElementKind, parent: Option<NodeId>) -> Self {
        Self {
            tag,
            kind,
            attributes: Vec::new(),
            parent,
            children: Vec::new(),
        }
    }
}

/// An element tree with a single root element.
#[derive(Debug)]
pub struct Document {
    id: DocumentId,
    nodes: Vec<Node>,
}

impl Document {
    /// Create a document holding only an HTML root element.
    #[must_use]
    pub fn new(root_tag: impl Into<String>) -> Self {
        Self::with_root(root_tag, ElementKind::Html)
    }

    /// Create a document whose root element has the given kind.
    #[must_use]
    pub fn with_root(root_tag: impl Into<String>, kind: ElementKind) -> Self {
        Self {
            id: DocumentId::next(),
            nodes: vec![Node::new(root_tag.into(), kind, None)],
        }
    }

    /// Identity of this document.
    #[must_use]
    pub fn id(&self) -> DocumentId {
        self.id
    }

    /// The root element.
    #[must_use]
    pub fn root(&self) -> NodeId {
        self.node_id(0)
    }

    /// Number of elements ever created, detached ones included.
    #[must_use]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Always false: a document has at least its root.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Whether `node` was created by this document.
    #[must_use]
    pub fn contains(&self, node: NodeId) -> bool {
        node.document == self.id && node.index < self.nodes.len()
    }

    /// Append a new element as the last child of `parent`.
    ///
    /// # Panics
    ///
    /// Panics if `parent` does not belong to this document.
    pub fn append_element(
        &mut self,
        parent: NodeId,
        tag: impl Into<String>,
        kind: ElementKind,
    ) -> NodeId {
        self.assert_contains(parent);
        let id = self.node_id(self.nodes.len());
        self.nodes.push(Node::new(tag.into(), kind, Some(parent)));
        self.nodes[parent.index].children.push(id);
        id
    }

    /// Append a new HTML element as the last child of `parent`.
    pub fn append_html(&mut self, parent: NodeId, tag: impl Into<String>) -> NodeId {
        self.append_element(parent, tag, ElementKind::Html)
    }

    /// Set an attribute, replacing the value of an existing attribute with the same name.
    ///
    /// # Panics
    ///
    /// Panics if `node` does not belong to this document.
    pub fn set_attribute(&mut self, node: NodeId, name: impl Into<String>, value: impl Into<String>) {
        self.assert_contains(node);
        let name = name.into();
        let value = value.into();
        let attributes = &mut self.nodes[node.index].attributes;
        if let Some(slot) = attributes.iter_mut().find(|(n, _)| *n == name) {
            slot.1 = value;
        } else {
            attributes.push((name, value));
        }
    }

    /// Unlink `node` and its subtree from its parent.
    ///
    /// Detaching the root or a node of another document is a no-op.
    pub fn detach(&mut self, node: NodeId) {
        if !self.contains(node) {
            return;
        }
        let Some(parent) = self.nodes[node.index].parent.take() else {
            return;
        };
        self.nodes[parent.index].children.retain(|&child| child != node);
    }

    /// Whether `node` belongs to this document and is reachable from the root.
    #[must_use]
    pub fn is_connected(&self, node: NodeId) -> bool {
        if !self.contains(node) {
            return false;
        }
        let mut current = node;
        loop {
            if current == self.root() {
                return true;
            }
            match self.nodes[current.index].parent {
                Some(parent) => current = parent,
                None => return false,
            }
        }
    }

    /// Borrow an element view.
    ///
    /// # Panics
    ///
    /// Panics if `id` does not belong to this document.
    #[must_use]
    pub fn element(&self, id: NodeId) -> ElementRef<'_> {
        self.assert_contains(id);
        ElementRef { doc: self, id }
    }

    /// Borrow an element view, or `None` for a node of another document.
    #[must_use]
    pub fn get(&self, id: NodeId) -> Option<ElementRef<'_>> {
        self.contains(id).then_some(ElementRef { doc: self, id })
    }

    /// First connected element with the given tag, in document order.
    #[must_use]
    pub fn find_first(&self, tag: &str) -> Option<NodeId> {
        let mut stack = vec![self.root()];
        while let Some(id) = stack.pop() {
            let node = &self.nodes[id.index];
            if node.tag.eq_ignore_ascii_case(tag) {
                return Some(id);
            }
            stack.extend(node.children.iter().rev().copied());
        }
        None
    }

    pub(crate) fn parent_of(&self, id: NodeId) -> Option<NodeId> {
        if self.contains(id) {
            self.nodes[id.index].parent
        } else {
            None
        }
    }

    pub(crate) fn children_of(&self, id: NodeId) -> &[NodeId] {
        if self.contains(id) {
            &self.nodes[id.index].children
        } else {
            &[]
        }
    }

    fn node_id(&self, index: usize) -> NodeId {
        NodeId {
            document: self.id,
            index,
        }
    }

    fn assert_contains(&self, id: NodeId) {
        assert!(self.contains(id), "node {id} is not part of this document");
    }
}

/// Borrowed view of one element.
#[derive(Clone, Copy)]
pub struct ElementRef<'a> {
    doc: &'a Document,
    id: NodeId,
}

impl<'a> ElementRef<'a> {
    /// Identity of the element.
    #[must_use]
    pub fn id(&self) -> NodeId {
        self.id
    }

    /// Document the element belongs to.
    #[must_use]
    pub fn document(&self) -> &'a Document {
        self.doc
    }

    /// Tag name as written in the document.
    #[must_use]
    pub fn tag_name(&self) -> &'a str {
        &self.node().tag
    }

    /// Value of the named attribute.
    #[must_use]
    pub fn attribute(&self, name: &str) -> Option<&'a str> {
        self.node()
            .attributes
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v.as_str())
    }

    /// Attribute `(name, value)` pairs in document order, borrowed from the document.
    pub fn attribute_entries(&self) -> impl Iterator<Item = (&'a str, &'a str)> + use<'a> {
        self.node()
            .attributes
            .iter()
            .map(|(name, value)| (name.as_str(), value.as_str()))
    }

    /// Parent element, if any.
    #[must_use]
    pub fn parent(&self) -> Option<ElementRef<'a>> {
        self.node().parent.map(|id| self.doc.element(id))
    }

    /// Child elements in document order.
    pub fn children(&self) -> impl Iterator<Item = ElementRef<'a>> + use<'a> {
        let doc = self.doc;
        self.node().children.iter().map(move |&id| doc.element(id))
    }

    fn node(&self) -> &'a Node {
        &self.doc.nodes[self.id.index]
    }
}

impl Element for ElementRef<'_> {
    fn tag_name(&self) -> &str {
        &self.node().tag
    }

    fn kind(&self) -> ElementKind {
        self.node().kind
    }

    fn attribute_entries(&self) -> impl Iterator<Item = (&str, &str)> {
        self.node()
            .attributes
            .iter()
            .map(|(name, value)| (name.as_str(), value.as_str()))
    }
}

impl fmt::Debug for ElementRef<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ElementRef")
            .field("id", &self.id)
            .field("tag", &self.node().tag)
            .finish()
    }
}
