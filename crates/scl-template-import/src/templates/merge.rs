// crates/scl-template-import/src/templates/merge.rs

use super::{Reachability, TypeCollections, TypeKind};
use crate::document::{Document, Element, NodeId};
use crate::edit::{Edit, EditBatch, EditTarget, TypeRename};
use crate::error::SclError;
use crate::scl;
use log::{debug, trace};
use std::collections::HashMap;

/// Destination definitions of each kind, keyed by id. The first definition
/// wins when an id is repeated.
struct DestinationIndex<'a> {
    by_id: [HashMap<&'a str, NodeId>; 4],
}

impl<'a> DestinationIndex<'a> {
    fn new(doc: &'a Document, templates: Option<NodeId>) -> Self {
        let mut by_id: [HashMap<&'a str, NodeId>; 4] = Default::default();
        if let Some(templates) = templates {
            for child in doc.child_elements(templates) {
                let (Some(kind), Some(id)) =
                    (TypeKind::from_tag(doc.name(child)), doc.attribute(child, "id"))
                else {
                    continue;
                };
                by_id[kind.index()].entry(id).or_insert(child);
            }
        }
        DestinationIndex { by_id }
    }

    fn lookup(&self, kind: TypeKind, id: &str) -> Option<NodeId> {
        self.by_id[kind.index()].get(id).copied()
    }
}

/// Merges the data types an IED instance uses into the destination.
///
/// Every definition the IED reaches is either reused (an identical
/// definition with the same id exists), inserted as is (the id is free), or
/// renamed to `<iedName><id>` and inserted (the id is taken by a different
/// definition). A renamed id is itself checked against the destination, see
/// `rename_target`. Renames are applied to `types` and `ied` together with all
/// references to the old id, and recorded in `batch.renamed_types`.
///
/// Decisions are taken bottom-up so that a definition is compared with the
/// destination only after the ids it references have been settled. The
/// resulting edits are appended to `batch` in schema order; a
/// `DataTypeTemplates` section is created only when something is inserted.
///
/// # Errors
/// Returns [`SclError::CyclicTypeReference`] if the definitions reference
/// each other in a cycle.
pub fn merge_data_type_templates(
    doc: &Document,
    ied: &mut Element,
    types: &mut TypeCollections,
    batch: &mut EditBatch,
) -> Result<(), SclError> {
    let reachability = Reachability::analyze(types, ied)?;
    let destination = doc.child_named(doc.root(), scl::DATA_TYPE_TEMPLATES);
    let index = DestinationIndex::new(doc, destination);
    let mut inserts: [Vec<usize>; 4] = Default::default();

    for kind in TypeKind::BOTTOM_UP {
        for position in 0..types.get(kind).len() {
            if !reachability.contains(kind, position) {
                continue;
            }
            let definition = &types.get(kind)[position];
            let id = definition
                .attribute("id")
                .ok_or(SclError::MissingAttribute {
                    element: kind.tag(),
                    attribute: "id",
                })?
                .to_string();

            match index.lookup(kind, &id) {
                None => {}
                Some(existing) if doc.matches(existing, definition) => {
                    trace!("Reusing existing {} id={}", kind, id);
                    continue;
                }
                Some(_) => {
                    let (new_id, reusable) =
                        rename_target(doc, &index, kind, definition, &batch.ied_name, &id);
                    debug!("{} id={} collides in destination, renamed to {}", kind, id, new_id);
                    types.get_mut(kind)[position].set_attribute("id", new_id.as_str());
                    rewrite_references(kind, &id, &new_id, types, ied);
                    batch.renamed_types.push(TypeRename {
                        kind,
                        old_id: id,
                        new_id,
                    });
                    if reusable {
                        continue;
                    }
                }
            }
            inserts[kind.index()].push(position);
        }
    }

    if inserts.iter().all(Vec::is_empty) {
        return Ok(());
    }

    let parent = match destination {
        Some(templates) => EditTarget::Existing(templates),
        None => {
            let root = EditTarget::Existing(doc.root());
            let reference =
                batch.reference_for(doc, root, scl::DATA_TYPE_TEMPLATES, scl::ROOT_ORDER);
            batch.push(Edit {
                parent: root,
                node: Element::new(scl::DATA_TYPE_TEMPLATES),
                reference,
            })
        }
    };

    for kind in TypeKind::ALL {
        for &position in &inserts[kind.index()] {
            let reference =
                batch.reference_for(doc, parent, kind.tag(), scl::DATA_TYPE_TEMPLATES_ORDER);
            batch.push(Edit {
                parent,
                node: types.get(kind)[position].clone(),
                reference,
            });
        }
    }
    Ok(())
}

/// Picks the id a colliding definition is renamed to.
///
/// `<iedName><id>` is tried first, then `<iedName><id>_2`, `_3`, ... until
/// the id is free in the destination or names a definition identical to the
/// renamed one. The flag is true in the latter case.
fn rename_target(
    doc: &Document,
    index: &DestinationIndex<'_>,
    kind: TypeKind,
    definition: &Element,
    ied_name: &str,
    id: &str,
) -> (String, bool) {
    let mut renamed = definition.clone();
    let mut attempt = 1;
    loop {
        let candidate = if attempt == 1 {
            format!("{}{}", ied_name, id)
        } else {
            format!("{}{}_{}", ied_name, id, attempt)
        };
        renamed.set_attribute("id", candidate.as_str());
        match index.lookup(kind, &candidate) {
            None => return (candidate, false),
            Some(existing) if doc.matches(existing, &renamed) => {
                trace!("Reusing existing {} id={}", kind, candidate);
                return (candidate, true);
            }
            Some(_) => attempt += 1,
        }
    }
}

fn rewrite_references(
    kind: TypeKind,
    old_id: &str,
    new_id: &str,
    types: &mut TypeCollections,
    ied: &mut Element,
) {
    if kind != TypeKind::LNodeType {
        types.rewrite_references(kind, old_id, new_id);
        return;
    }
    ied.for_each_descendant_mut(true, &mut |e| {
        if (e.name == scl::LN0 || e.name == scl::LN) && e.attribute("lnType") == Some(old_id) {
            e.set_attribute("lnType", new_id);
        }
    });
}
