// crates/scl-template-import/src/communication.rs

use crate::document::{Document, Element};
use crate::edit::{Edit, EditBatch, EditTarget};
use crate::scl;

/// A `ConnectedAP` of a template together with the attributes of the
/// `SubNetwork` that holds it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConnectedAccessPoint {
    /// Shallow copy of the owning `SubNetwork`, without children.
    pub sub_network: Element,
    /// Deep copy of the `ConnectedAP`.
    pub connected_ap: Element,
}

impl ConnectedAccessPoint {
    /// Collects every `SubNetwork/ConnectedAP` of a `Communication` element
    /// in document order.
    pub fn collect(communication: &Element) -> Vec<Self> {
        communication
            .children_named(scl::SUB_NETWORK)
            .flat_map(|sub_network| {
                sub_network
                    .children_named(scl::CONNECTED_AP)
                    .map(move |ap| ConnectedAccessPoint {
                        sub_network: sub_network.shallow_clone(),
                        connected_ap: ap.clone(),
                    })
            })
            .collect()
    }

    pub fn ied_name(&self) -> Option<&str> {
        self.connected_ap.attribute("iedName")
    }

    pub fn sub_network_name(&self) -> Option<&str> {
        self.sub_network.attribute("name")
    }
}

/// Adds the `ConnectedAP`s of the IED `ied_name` to the destination's
/// `Communication` section.
///
/// The section itself is created when missing, even if no access point
/// ends up in it. Each access point goes into the destination `SubNetwork`
/// of the same name: an existing one, one created earlier in this call, or
/// a new copy of the template's `SubNetwork` attributes.
///
/// Returns the number of `ConnectedAP`s inserted.
pub fn merge_communication(
    doc: &Document,
    ied_name: &str,
    access_points: &[ConnectedAccessPoint],
    batch: &mut EditBatch,
) -> usize {
    let root = EditTarget::Existing(doc.root());
    let existing = doc.child_named(doc.root(), scl::COMMUNICATION);
    let communication = match existing {
        Some(id) => EditTarget::Existing(id),
        None => {
            let reference = batch.reference_for(doc, root, scl::COMMUNICATION, scl::ROOT_ORDER);
            batch.push(Edit {
                parent: root,
                node: Element::new(scl::COMMUNICATION),
                reference,
            })
        }
    };

    let mut created: Vec<(Option<&str>, EditTarget)> = Vec::new();
    let mut inserted = 0;

    for ap in access_points.iter().filter(|ap| ap.ied_name() == Some(ied_name)) {
        let name = ap.sub_network_name();
        let found = existing.and_then(|comm| {
            doc.children_named(comm, scl::SUB_NETWORK)
                .find(|sn| doc.attribute(*sn, "name") == name)
                .map(EditTarget::Existing)
        });
        let sub_network = match found {
            Some(target) => target,
            None => match created.iter().find(|(n, _)| *n == name) {
                Some((_, target)) => *target,
                None => {
                    let target = batch.push(Edit {
                        parent: communication,
                        node: ap.sub_network.shallow_clone(),
                        reference: None,
                    });
                    created.push((name, target));
                    target
                }
            },
        };

        batch.push(Edit {
            parent: sub_network,
            node: ap.connected_ap.clone(),
            reference: None,
        });
        inserted += 1;
    }
    inserted
}
