// crates/scl-template-import/src/edit.rs

use crate::document::{Document, Element, NodeId};
use crate::error::SclError;
use crate::scl;
use crate::templates::TypeKind;
use serde::Serialize;

/// The parent or reference node of an [`Edit`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditTarget {
    /// A node already present in the destination document.
    Existing(NodeId),
    /// The node created by the edit at this index of the same batch.
    Inserted(usize),
}

/// Insert `node` as a child of `parent`, immediately before `reference`, or
/// as the last child when there is no reference.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Edit {
    pub parent: EditTarget,
    pub node: Element,
    pub reference: Option<EditTarget>,
}

/// A data type that was given a new id because the destination already had
/// a different definition under the old one.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TypeRename {
    pub kind: TypeKind,
    pub old_id: String,
    pub new_id: String,
}

/// The ordered edits that produce one IED instance.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EditBatch {
    pub ied_name: String,
    pub edits: Vec<Edit>,
    pub renamed_types: Vec<TypeRename>,
}

impl EditBatch {
    pub fn new(ied_name: impl Into<String>) -> Self {
        Self {
            ied_name: ied_name.into(),
            ..Default::default()
        }
    }

    /// Appends an edit and returns the target naming the node it creates.
    pub fn push(&mut self, edit: Edit) -> EditTarget {
        self.edits.push(edit);
        EditTarget::Inserted(self.edits.len() - 1)
    }

    pub fn is_empty(&self) -> bool {
        self.edits.is_empty()
    }

    /// Finds the node a new `tag` child of `parent` has to be inserted
    /// before so that the children stay in `order`.
    ///
    /// Candidates are the existing children of `parent` and the nodes this
    /// batch already inserts under it. The one with the lowest rank above
    /// `tag` wins; on equal rank an existing node comes first, then the
    /// earliest pending one. Tags outside `order` are never candidates.
    pub fn reference_for(
        &self,
        doc: &Document,
        parent: EditTarget,
        tag: &str,
        order: &[&str],
    ) -> Option<EditTarget> {
        let own = scl::rank(order, tag)?;
        let mut best: Option<(usize, EditTarget)> = None;
        let mut consider = |rank: Option<usize>, target: EditTarget| {
            if let Some(rank) = rank.filter(|r| *r > own) {
                if best.is_none_or(|(r, _)| rank < r) {
                    best = Some((rank, target));
                }
            }
        };

        if let EditTarget::Existing(parent_id) = parent {
            for child in doc.child_elements(parent_id) {
                consider(scl::rank(order, doc.name(child)), EditTarget::Existing(child));
            }
        }
        for (index, edit) in self.edits.iter().enumerate() {
            if edit.parent == parent {
                consider(scl::rank(order, &edit.node.name), EditTarget::Inserted(index));
            }
        }

        best.map(|(_, target)| target)
    }
}

impl Document {
    /// Applies every edit of a batch, in order.
    ///
    /// The whole batch is validated before the document is touched, so a
    /// rejected batch leaves the document unchanged. Returns the ids of the
    /// created nodes, one per edit.
    ///
    /// # Errors
    /// Returns [`SclError::InvalidEditTarget`] when a parent or reference
    /// does not resolve.
    pub fn apply_batch(&mut self, batch: &EditBatch) -> Result<Vec<NodeId>, SclError> {
        self.validate_batch(batch)?;

        let mut created: Vec<NodeId> = Vec::with_capacity(batch.edits.len());
        for edit in &batch.edits {
            let parent = resolve(edit.parent, &created)?;
            let reference = edit
                .reference
                .map(|r| resolve(r, &created))
                .transpose()?;
            created.push(self.insert(parent, edit.node.clone(), reference)?);
        }
        Ok(created)
    }

    fn validate_batch(&self, batch: &EditBatch) -> Result<(), SclError> {
        for (index, edit) in batch.edits.iter().enumerate() {
            match edit.parent {
                EditTarget::Existing(id) if !self.is_element(id) => {
                    return Err(SclError::InvalidEditTarget("parent is not an element"));
                }
                EditTarget::Inserted(earlier) if earlier >= index => {
                    return Err(SclError::InvalidEditTarget(
                        "parent is not created by an earlier edit",
                    ));
                }
                _ => {}
            }
            match (edit.reference, edit.parent) {
                (None, _) => {}
                (Some(EditTarget::Existing(r)), EditTarget::Existing(p)) => {
                    if !self.contains(r) || self.parent(r) != Some(p) {
                        return Err(SclError::InvalidEditTarget(
                            "reference is not a child of the parent",
                        ));
                    }
                }
                (Some(EditTarget::Inserted(r)), parent) => {
                    if r >= index || batch.edits[r].parent != parent {
                        return Err(SclError::InvalidEditTarget(
                            "reference is not a child of the parent",
                        ));
                    }
                }
                (Some(EditTarget::Existing(_)), EditTarget::Inserted(_)) => {
                    return Err(SclError::InvalidEditTarget(
                        "reference is not a child of the parent",
                    ));
                }
            }
        }
        Ok(())
    }
}

fn resolve(target: EditTarget, created: &[NodeId]) -> Result<NodeId, SclError> {
    match target {
        EditTarget::Existing(id) => Ok(id),
        EditTarget::Inserted(index) => created
            .get(index)
            .copied()
            .ok_or(SclError::InvalidEditTarget("unknown inserted node")),
    }
}
