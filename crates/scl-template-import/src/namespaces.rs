// crates/scl-template-import/src/namespaces.rs

use crate::document::{Attribute, Document};
use log::{debug, warn};

/// Collects the prefixed namespace declarations (`xmlns:*`) of an attribute
/// list.
pub fn namespace_declarations(attributes: &[Attribute]) -> Vec<Attribute> {
    attributes
        .iter()
        .filter(|a| a.name.starts_with("xmlns:"))
        .cloned()
        .collect()
}

/// Copies the `xmlns:*` declarations the destination root lacks.
///
/// This is the one place where the destination is changed directly instead
/// of through an edit batch. Declarations already present are kept, even
/// when the source binds the same prefix to another URI.
///
/// Returns the number of declarations added.
pub fn propagate_namespaces(doc: &mut Document, source_namespaces: &[Attribute]) -> usize {
    let root = doc.root();
    let mut added = 0;
    for declaration in source_namespaces
        .iter()
        .filter(|a| a.name.starts_with("xmlns:"))
    {
        match doc.attribute(root, &declaration.name) {
            None => {
                debug!("Adding namespace {}=\"{}\"", declaration.name, declaration.value);
                doc.set_attribute(root, &declaration.name, declaration.value.as_str());
                added += 1;
            }
            Some(existing) if existing != declaration.value => {
                warn!(
                    "Namespace prefix {} is bound to \"{}\" in the project but to \"{}\" in the template; keeping the project's",
                    declaration.name, existing, declaration.value
                );
            }
            Some(_) => {}
        }
    }
    added
}
