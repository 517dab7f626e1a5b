//! The four data type collections of `DataTypeTemplates`.
//!
//! A template's collections are held as owned elements so that a merge can
//! rename ids and rewrite references on its own copy.

mod merge;
mod reachability;

pub use merge::merge_data_type_templates;
pub use reachability::Reachability;

use crate::document::Element;
use crate::scl;
use serde::Serialize;
use std::fmt;

/// One of the four data type categories.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum TypeKind {
    #[serde(rename = "LNodeType")]
    LNodeType,
    #[serde(rename = "DOType")]
    DoType,
    #[serde(rename = "DAType")]
    DaType,
    #[serde(rename = "EnumType")]
    EnumType,
}

impl TypeKind {
    /// All kinds in schema order.
    pub const ALL: [TypeKind; 4] = [
        TypeKind::LNodeType,
        TypeKind::DoType,
        TypeKind::DaType,
        TypeKind::EnumType,
    ];

    /// All kinds with referenced types before the types referencing them.
    pub const BOTTOM_UP: [TypeKind; 4] = [
        TypeKind::EnumType,
        TypeKind::DaType,
        TypeKind::DoType,
        TypeKind::LNodeType,
    ];

    /// The element name of a definition of this kind.
    pub fn tag(self) -> &'static str {
        match self {
            TypeKind::LNodeType => scl::LNODE_TYPE,
            TypeKind::DoType => scl::DO_TYPE,
            TypeKind::DaType => scl::DA_TYPE,
            TypeKind::EnumType => scl::ENUM_TYPE,
        }
    }

    pub fn from_tag(tag: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.tag() == tag)
    }

    pub(crate) fn index(self) -> usize {
        self as usize
    }

    /// Whether a `DO`/`SDO`/`DA`/`BDA` child of an `owner` definition points
    /// at a definition of this kind.
    ///
    /// `bType` decides between the two leaf kinds a `DA` or `BDA` can name:
    /// `Enum` for `EnumType`, `Struct` for `DAType`. References without a
    /// `bType` count for both.
    pub(crate) fn is_referenced_by(self, owner: TypeKind, child: &Element) -> bool {
        let btype = child.attribute("bType");
        match (self, owner, child.name.as_str()) {
            (TypeKind::DoType, TypeKind::LNodeType, scl::DO)
            | (TypeKind::DoType, TypeKind::DoType, scl::SDO) => true,
            (TypeKind::DaType, TypeKind::DoType, scl::DA)
            | (TypeKind::DaType, TypeKind::DaType, scl::BDA) => {
                btype.is_none_or(|b| b == "Struct")
            }
            (TypeKind::EnumType, TypeKind::DoType, scl::DA)
            | (TypeKind::EnumType, TypeKind::DaType, scl::BDA) => {
                btype.is_none_or(|b| b == "Enum")
            }
            _ => false,
        }
    }
}

impl fmt::Display for TypeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

/// The definitions of a `DataTypeTemplates` section, grouped by kind.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TypeCollections {
    types: [Vec<Element>; 4],
}

impl TypeCollections {
    /// Collects the definitions of a `DataTypeTemplates` element. Children
    /// of any other name are ignored.
    pub fn from_data_type_templates(templates: &Element) -> Self {
        let mut collections = TypeCollections::default();
        for child in templates.child_elements() {
            if let Some(kind) = TypeKind::from_tag(&child.name) {
                collections.types[kind.index()].push(child.clone());
            }
        }
        collections
    }

    pub fn get(&self, kind: TypeKind) -> &[Element] {
        &self.types[kind.index()]
    }

    pub fn get_mut(&mut self, kind: TypeKind) -> &mut Vec<Element> {
        &mut self.types[kind.index()]
    }

    pub fn is_empty(&self) -> bool {
        self.types.iter().all(Vec::is_empty)
    }

    /// Points every reference to the `kind` definition `old_id` at `new_id`.
    ///
    /// Only references held by the other collections are touched;
    /// `LNodeType` references live in the IED and are rewritten there.
    pub(crate) fn rewrite_references(&mut self, kind: TypeKind, old_id: &str, new_id: &str) {
        for owner in TypeKind::ALL {
            for definition in self.get_mut(owner) {
                for child in definition.child_elements_mut() {
                    if child.attribute("type") == Some(old_id) && kind.is_referenced_by(owner, child)
                    {
                        child.set_attribute("type", new_id);
                    }
                }
            }
        }
    }
}
