//! XML document model.
//!
//! A [`Document`] is an arena of nodes addressed by [`NodeId`] handles. Ids
//! stay valid for the lifetime of the document, since nodes are only ever
//! added, so an id taken before an edit still names the same node after it.

mod element;
mod reader;
mod writer;

pub use element::{Attribute, Element, Node};

use crate::error::SclError;
use crate::scl;

/// Handle to a node of a [`Document`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(usize);

#[derive(Debug, Clone)]
enum NodeData {
    Element {
        name: String,
        attributes: Vec<Attribute>,
    },
    Text(String),
    Comment(String),
}

#[derive(Debug, Clone)]
struct NodeSlot {
    parent: Option<NodeId>,
    children: Vec<NodeId>,
    data: NodeData,
}

/// An XML document with a single root element.
#[derive(Debug, Clone)]
pub struct Document {
    nodes: Vec<NodeSlot>,
    root: NodeId,
    declaration: bool,
}

impl Document {
    /// Parses an XML string.
    ///
    /// # Errors
    /// Returns an error for malformed XML, and [`SclError::ParserError`] when
    /// the root element is a `parsererror` marker.
    pub fn parse(xml: &str) -> Result<Self, SclError> {
        let parsed = reader::read_tree(xml)?;
        if parsed.root.name == scl::PARSER_ERROR {
            return Err(SclError::ParserError);
        }
        let mut doc = Document::new(parsed.root);
        doc.declaration = parsed.declaration;
        Ok(doc)
    }

    /// Creates a document from an owned root element. The XML declaration
    /// is written on serialization.
    pub fn new(root: Element) -> Self {
        let mut doc = Document {
            nodes: Vec::new(),
            root: NodeId(0),
            declaration: true,
        };
        doc.root = doc.alloc(root, None);
        doc
    }

    pub fn root(&self) -> NodeId {
        self.root
    }

    /// Node name, `#text` or `#comment` for non-element nodes.
    pub fn name(&self, id: NodeId) -> &str {
        match &self.slot(id).data {
            NodeData::Element { name, .. } => name,
            NodeData::Text(_) => "#text",
            NodeData::Comment(_) => "#comment",
        }
    }

    /// True if the id names a node of this document.
    pub fn contains(&self, id: NodeId) -> bool {
        id.0 < self.nodes.len()
    }

    pub fn is_element(&self, id: NodeId) -> bool {
        self.nodes
            .get(id.0)
            .is_some_and(|slot| matches!(slot.data, NodeData::Element { .. }))
    }

    pub fn attributes(&self, id: NodeId) -> &[Attribute] {
        match &self.slot(id).data {
            NodeData::Element { attributes, .. } => attributes,
            _ => &[],
        }
    }

    pub fn attribute(&self, id: NodeId, name: &str) -> Option<&str> {
        self.attributes(id)
            .iter()
            .find(|a| a.name == name)
            .map(|a| a.value.as_str())
    }

    /// Sets an attribute on an element node. Non-element nodes are left
    /// untouched.
    pub fn set_attribute(&mut self, id: NodeId, name: &str, value: impl Into<String>) {
        if let NodeData::Element { attributes, .. } = &mut self.slot_mut(id).data {
            let value = value.into();
            match attributes.iter_mut().find(|a| a.name == name) {
                Some(existing) => existing.value = value,
                None => attributes.push(Attribute::new(name, value)),
            }
        }
    }

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.slot(id).parent
    }

    /// All child nodes, including text and comments.
    pub fn children(&self, id: NodeId) -> &[NodeId] {
        &self.slot(id).children
    }

    pub fn child_elements(&self, id: NodeId) -> impl Iterator<Item = NodeId> + '_ {
        self.children(id)
            .iter()
            .copied()
            .filter(|child| self.is_element(*child))
    }

    pub fn children_named<'a>(
        &'a self,
        id: NodeId,
        name: &'a str,
    ) -> impl Iterator<Item = NodeId> + 'a {
        self.child_elements(id)
            .filter(move |child| self.name(*child) == name)
    }

    pub fn child_named(&self, id: NodeId, name: &str) -> Option<NodeId> {
        self.children_named(id, name).next()
    }

    /// Descendant elements with the given name, in document order.
    pub fn descendants_named(&self, id: NodeId, name: &str) -> Vec<NodeId> {
        let mut out = Vec::new();
        let mut pending: Vec<NodeId> = self.child_elements(id).collect();
        pending.reverse();
        while let Some(next) = pending.pop() {
            if self.name(next) == name {
                out.push(next);
            }
            let start = pending.len();
            pending.extend(self.child_elements(next));
            pending[start..].reverse();
        }
        out
    }

    /// The node itself or its nearest ancestor with the given name.
    pub fn closest(&self, id: NodeId, name: &str) -> Option<NodeId> {
        let mut current = Some(id);
        while let Some(node) = current {
            if self.name(node) == name {
                return Some(node);
            }
            current = self.parent(node);
        }
        None
    }

    /// True unless the node sits somewhere inside a `Private` element.
    pub fn is_public(&self, id: NodeId) -> bool {
        self.parent(id)
            .is_none_or(|parent| self.closest(parent, scl::PRIVATE).is_none())
    }

    /// Deep copy of a node as an owned element.
    ///
    /// Non-element nodes yield an element with an empty name.
    pub fn to_element(&self, id: NodeId) -> Element {
        match &self.slot(id).data {
            NodeData::Element { name, attributes } => Element {
                name: name.clone(),
                attributes: attributes.clone(),
                children: self
                    .children(id)
                    .iter()
                    .map(|child| self.to_node(*child))
                    .collect(),
            },
            _ => Element::default(),
        }
    }

    fn to_node(&self, id: NodeId) -> Node {
        match &self.slot(id).data {
            NodeData::Element { .. } => Node::Element(self.to_element(id)),
            NodeData::Text(text) => Node::Text(text.clone()),
            NodeData::Comment(text) => Node::Comment(text.clone()),
        }
    }

    /// Structural equality between a node of this document and an owned
    /// element.
    pub fn matches(&self, id: NodeId, element: &Element) -> bool {
        self.is_element(id) && self.to_element(id).is_equal_node(element)
    }

    /// Inserts `element` as a child of `parent`, immediately before
    /// `reference`, or as the last child when no reference is given.
    ///
    /// # Errors
    /// Returns [`SclError::InvalidEditTarget`] when `parent` is not an element
    /// of this document or `reference` is not one of its children.
    pub fn insert(
        &mut self,
        parent: NodeId,
        element: Element,
        reference: Option<NodeId>,
    ) -> Result<NodeId, SclError> {
        let position = self.insert_position(parent, reference)?;
        let id = self.alloc(element, Some(parent));
        self.slot_mut(parent).children.insert(position, id);
        Ok(id)
    }

    pub(crate) fn insert_position(
        &self,
        parent: NodeId,
        reference: Option<NodeId>,
    ) -> Result<usize, SclError> {
        if !self.is_element(parent) {
            return Err(SclError::InvalidEditTarget("parent is not an element"));
        }
        let children = self.children(parent);
        match reference {
            None => Ok(children.len()),
            Some(reference) => children
                .iter()
                .position(|child| *child == reference)
                .ok_or(SclError::InvalidEditTarget(
                    "reference is not a child of the parent",
                )),
        }
    }

    /// Serializes the document with two-space indentation.
    pub fn to_xml_string(&self) -> Result<String, SclError> {
        writer::write_tree(&self.to_element(self.root), self.declaration)
    }

    fn alloc(&mut self, element: Element, parent: Option<NodeId>) -> NodeId {
        let id = NodeId(self.nodes.len());
        self.nodes.push(NodeSlot {
            parent,
            children: Vec::new(),
            data: NodeData::Element {
                name: element.name,
                attributes: element.attributes,
            },
        });
        for child in element.children {
            let child_id = match child {
                Node::Element(e) => self.alloc(e, Some(id)),
                Node::Text(text) => self.alloc_leaf(NodeData::Text(text), id),
                Node::Comment(text) => self.alloc_leaf(NodeData::Comment(text), id),
            };
            self.slot_mut(id).children.push(child_id);
        }
        id
    }

    fn alloc_leaf(&mut self, data: NodeData, parent: NodeId) -> NodeId {
        let id = NodeId(self.nodes.len());
        self.nodes.push(NodeSlot {
            parent: Some(parent),
            children: Vec::new(),
            data,
        });
        id
    }

    fn slot(&self, id: NodeId) -> &NodeSlot {
        &self.nodes[id.0]
    }

    fn slot_mut(&mut self, id: NodeId) -> &mut NodeSlot {
        &mut self.nodes[id.0]
    }
}
