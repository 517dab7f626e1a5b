// crates/scl-template-import/src/templates/reachability.rs

use super::{TypeCollections, TypeKind};
use crate::document::Element;
use crate::error::SclError;
use crate::scl;
use log::trace;
use std::collections::{HashMap, HashSet};

/// A `DO`/`SDO`/`DA`/`BDA` child pointing at some type id.
struct Reference<'a> {
    owner: TypeKind,
    owner_index: usize,
    child: &'a Element,
}

/// Which data type definitions an IED uses, directly or through other
/// definitions.
///
/// The analysis runs once over the whole collection set; queries afterwards
/// are lookups.
#[derive(Debug, Clone)]
pub struct Reachability {
    reachable: [Vec<bool>; 4],
    ids: [Vec<Option<String>>; 4],
}

impl Reachability {
    /// Analyzes `types` against the `LN0`/`LN` elements of `ied`.
    ///
    /// # Errors
    /// Returns [`SclError::CyclicTypeReference`] when deciding a definition
    /// requires deciding that same definition again.
    pub fn analyze(types: &TypeCollections, ied: &Element) -> Result<Self, SclError> {
        let mut walk = Walk::new(types, ied);
        let mut reachable: [Vec<bool>; 4] = Default::default();
        let mut ids: [Vec<Option<String>>; 4] = Default::default();

        for kind in TypeKind::ALL {
            for (index, definition) in types.get(kind).iter().enumerate() {
                reachable[kind.index()].push(walk.is_reachable(kind, index)?);
                ids[kind.index()].push(definition.attribute("id").map(str::to_string));
            }
        }
        Ok(Reachability { reachable, ids })
    }

    /// Whether the definition at `index` of the `kind` collection is used.
    pub fn contains(&self, kind: TypeKind, index: usize) -> bool {
        self.reachable[kind.index()]
            .get(index)
            .copied()
            .unwrap_or(false)
    }

    /// Whether any `kind` definition with this id is used.
    pub fn is_reachable(&self, kind: TypeKind, id: &str) -> bool {
        self.ids[kind.index()]
            .iter()
            .zip(&self.reachable[kind.index()])
            .any(|(candidate, reachable)| *reachable && candidate.as_deref() == Some(id))
    }
}

struct Walk<'a> {
    types: &'a TypeCollections,
    ln_types: HashSet<&'a str>,
    /// Referencing children keyed by the id they name.
    index: HashMap<&'a str, Vec<Reference<'a>>>,
    memo: HashMap<(TypeKind, usize), bool>,
    in_progress: HashSet<(TypeKind, usize)>,
}

impl<'a> Walk<'a> {
    fn new(types: &'a TypeCollections, ied: &'a Element) -> Self {
        let ln_types = ied
            .descendants()
            .into_iter()
            .filter(|e| e.name == scl::LN0 || e.name == scl::LN)
            .filter_map(|e| e.attribute("lnType"))
            .collect();

        let mut index: HashMap<&'a str, Vec<Reference<'a>>> = HashMap::new();
        for owner in [TypeKind::LNodeType, TypeKind::DoType, TypeKind::DaType] {
            for (owner_index, definition) in types.get(owner).iter().enumerate() {
                for child in definition.child_elements() {
                    if let Some(target) = child.attribute("type") {
                        index.entry(target).or_default().push(Reference {
                            owner,
                            owner_index,
                            child,
                        });
                    }
                }
            }
        }

        Walk {
            types,
            ln_types,
            index,
            memo: HashMap::new(),
            in_progress: HashSet::new(),
        }
    }

    fn is_reachable(&mut self, kind: TypeKind, index: usize) -> Result<bool, SclError> {
        if let Some(known) = self.memo.get(&(kind, index)) {
            return Ok(*known);
        }

        let types = self.types;
        let definition = &types.get(kind)[index];
        let Some(id) = definition.attribute("id") else {
            self.memo.insert((kind, index), false);
            return Ok(false);
        };

        if !self.in_progress.insert((kind, index)) {
            return Err(SclError::CyclicTypeReference {
                kind,
                id: id.to_string(),
            });
        }

        let result = if kind == TypeKind::LNodeType {
            Ok(self.ln_types.contains(id))
        } else {
            self.any_owner_reachable(kind, id)
        };

        self.in_progress.remove(&(kind, index));
        let reachable = result?;
        trace!("{} id={} reachable={}", kind, id, reachable);
        self.memo.insert((kind, index), reachable);
        Ok(reachable)
    }

    fn any_owner_reachable(&mut self, kind: TypeKind, id: &str) -> Result<bool, SclError> {
        let owners: Vec<(TypeKind, usize)> = self
            .index
            .get(id)
            .into_iter()
            .flatten()
            .filter(|r| kind.is_referenced_by(r.owner, r.child))
            .map(|r| (r.owner, r.owner_index))
            .collect();

        for (owner, owner_index) in owners {
            if self.is_reachable(owner, owner_index)? {
                return Ok(true);
            }
        }
        Ok(false)
    }
}
