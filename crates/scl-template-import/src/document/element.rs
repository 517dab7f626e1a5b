//! Owned XML element trees.
//!
//! An `Element` is a detached subtree: it is what the merge works on while it
//! renames identifiers, and what an `Edit` carries into the destination.

/// A single attribute, kept in document order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attribute {
    pub name: String,
    pub value: String,
}

impl Attribute {
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
        }
    }
}

/// A child of an element.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Node {
    Element(Element),
    Text(String),
    Comment(String),
}

/// An owned XML element with its attributes and children.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Element {
    pub name: String,
    pub attributes: Vec<Attribute>,
    pub children: Vec<Node>,
}

impl Element {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    /// Builder-style variant of [`Element::set_attribute`].
    pub fn with_attribute(mut self, name: &str, value: impl Into<String>) -> Self {
        self.set_attribute(name, value);
        self
    }

    /// Appends a child element and returns `self`.
    pub fn with_child(mut self, child: Element) -> Self {
        self.children.push(Node::Element(child));
        self
    }

    /// Appends a text node and returns `self`.
    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.children.push(Node::Text(text.into()));
        self
    }

    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|a| a.name == name)
            .map(|a| a.value.as_str())
    }

    pub fn has_attribute(&self, name: &str) -> bool {
        self.attributes.iter().any(|a| a.name == name)
    }

    /// Sets an attribute, replacing the value in place if it already exists.
    pub fn set_attribute(&mut self, name: &str, value: impl Into<String>) {
        let value = value.into();
        match self.attributes.iter_mut().find(|a| a.name == name) {
            Some(existing) => existing.value = value,
            None => self.attributes.push(Attribute::new(name, value)),
        }
    }

    pub fn child_elements(&self) -> impl Iterator<Item = &Element> {
        self.children.iter().filter_map(|c| match c {
            Node::Element(e) => Some(e),
            _ => None,
        })
    }

    pub fn child_elements_mut(&mut self) -> impl Iterator<Item = &mut Element> {
        self.children.iter_mut().filter_map(|c| match c {
            Node::Element(e) => Some(e),
            _ => None,
        })
    }

    pub fn children_named<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a Element> {
        self.child_elements().filter(move |e| e.name == name)
    }

    pub fn child_named(&self, name: &str) -> Option<&Element> {
        self.child_elements().find(|e| e.name == name)
    }

    /// All descendant elements in document order, excluding `self`.
    pub fn descendants(&self) -> Vec<&Element> {
        let mut out = Vec::new();
        collect_descendants(self, &mut out);
        out
    }

    /// Visits every descendant element mutably in document order.
    ///
    /// When `skip_private` is set, `Private` elements and everything below
    /// them are not visited.
    pub fn for_each_descendant_mut<F>(&mut self, skip_private: bool, f: &mut F)
    where
        F: FnMut(&mut Element),
    {
        for child in self.child_elements_mut() {
            if skip_private && child.name == "Private" {
                continue;
            }
            f(&mut *child);
            child.for_each_descendant_mut(skip_private, f);
        }
    }

    /// Copy of the element with its attributes but without children.
    pub fn shallow_clone(&self) -> Element {
        Element {
            name: self.name.clone(),
            attributes: self.attributes.clone(),
            children: Vec::new(),
        }
    }

    /// Structural equality in the sense of DOM `isEqualNode`: same name, same
    /// attribute set regardless of order, and pairwise equal children.
    pub fn is_equal_node(&self, other: &Element) -> bool {
        self.name == other.name
            && same_attribute_set(&self.attributes, &other.attributes)
            && self.children.len() == other.children.len()
            && self
                .children
                .iter()
                .zip(&other.children)
                .all(|(a, b)| match (a, b) {
                    (Node::Element(a), Node::Element(b)) => a.is_equal_node(b),
                    (Node::Text(a), Node::Text(b)) => a == b,
                    (Node::Comment(a), Node::Comment(b)) => a == b,
                    _ => false,
                })
    }
}

fn collect_descendants<'a>(element: &'a Element, out: &mut Vec<&'a Element>) {
    for child in element.child_elements() {
        out.push(child);
        collect_descendants(child, out);
    }
}

pub(crate) fn same_attribute_set(a: &[Attribute], b: &[Attribute]) -> bool {
    a.len() == b.len()
        && a
            .iter()
            .all(|attr| b.iter().any(|o| o.name == attr.name && o.value == attr.value))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn do_type(id: &str, da_type: &str) -> Element {
        Element::new("DOType")
            .with_attribute("id", id)
            .with_attribute("cdc", "SPS")
            .with_child(
                Element::new("DA")
                    .with_attribute("name", "stVal")
                    .with_attribute("bType", "Enum")
                    .with_attribute("type", da_type),
            )
    }

    #[test]
    fn test_set_attribute_replaces_in_place() {
        let mut e = Element::new("IED")
            .with_attribute("name", "TEMPLATE")
            .with_attribute("type", "Relay");
        e.set_attribute("name", "Relay_01");
        assert_eq!(e.attribute("name"), Some("Relay_01"));
        assert_eq!(e.attributes[0].name, "name");
        assert_eq!(e.attributes.len(), 2);
    }

    #[test]
    fn test_equality_ignores_attribute_order() {
        let a = do_type("X", "E1");
        let mut b = Element::new("DOType")
            .with_attribute("cdc", "SPS")
            .with_attribute("id", "X");
        b.children = a.children.clone();
        assert!(a.is_equal_node(&b));
    }

    #[test]
    fn test_equality_detects_nested_difference() {
        let a = do_type("X", "E1");
        let b = do_type("X", "E2");
        assert!(!a.is_equal_node(&b));
    }

    #[test]
    fn test_equality_respects_child_order_and_text() {
        let a = Element::new("EnumType")
            .with_child(Element::new("EnumVal").with_attribute("ord", "1").with_text("on"))
            .with_child(Element::new("EnumVal").with_attribute("ord", "2").with_text("off"));
        let b = Element::new("EnumType")
            .with_child(Element::new("EnumVal").with_attribute("ord", "2").with_text("off"))
            .with_child(Element::new("EnumVal").with_attribute("ord", "1").with_text("on"));
        assert!(!a.is_equal_node(&b));
        assert!(a.is_equal_node(&a.clone()));
    }

    #[test]
    fn test_shallow_clone_drops_children() {
        let subnet = Element::new("SubNetwork")
            .with_attribute("name", "StationBus")
            .with_child(Element::new("ConnectedAP"));
        let clone = subnet.shallow_clone();
        assert_eq!(clone.attribute("name"), Some("StationBus"));
        assert!(clone.children.is_empty());
    }

    #[test]
    fn test_for_each_descendant_skips_private() {
        let mut ied = Element::new("IED")
            .with_child(Element::new("LN0").with_attribute("lnType", "A"))
            .with_child(
                Element::new("Private")
                    .with_child(Element::new("LN").with_attribute("lnType", "A")),
            );
        let mut visited = 0;
        ied.for_each_descendant_mut(true, &mut |e| {
            if e.attribute("lnType") == Some("A") {
                e.set_attribute("lnType", "B");
                visited += 1;
            }
        });
        assert_eq!(visited, 1);
        let private_ln = ied.child_named("Private").and_then(|p| p.child_named("LN"));
        assert_eq!(private_ln.and_then(|ln| ln.attribute("lnType")), Some("A"));
    }
}
