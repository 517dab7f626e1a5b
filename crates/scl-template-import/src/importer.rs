// crates/scl-template-import/src/importer.rs

use crate::communication::merge_communication;
use crate::config::{ImportOptions, ImportQuantity};
use crate::document::Document;
use crate::edit::{Edit, EditBatch, EditTarget};
use crate::error::SclError;
use crate::loader::Template;
use crate::log::{ImportLogContext, scl_debug, scl_info, scl_trace, scl_warn};
use crate::naming::allocate_name;
use crate::namespaces::propagate_namespaces;
use crate::scl;
use crate::templates::merge_data_type_templates;

/// Progress of a [`TemplateImport`].
///
/// `Start` runs once. Every instance then goes through `Clone` to `Emit`,
/// and the import rests in `Emit` until the batch is reported applied.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ImportState {
    #[default]
    Start,
    Clone,
    Rename,
    MergeTypes,
    MergeComms,
    InsertIed,
    Emit,
    Done,
}

/// Creates `quantity` instances of one template, one edit batch at a time.
///
/// Each batch is computed against the destination as it is when the batch
/// is requested, so the caller must apply a batch and call
/// [`TemplateImport::batch_applied`] before asking for the next one.
pub struct TemplateImport<'t> {
    template: &'t Template,
    quantity: u32,
    options: ImportOptions,
    state: ImportState,
    completed: u32,
}

impl<'t> TemplateImport<'t> {
    pub fn new(template: &'t Template, quantity: ImportQuantity, options: ImportOptions) -> Self {
        Self {
            template,
            quantity: quantity.get(),
            options,
            state: ImportState::default(),
            completed: 0,
        }
    }

    pub fn current_state(&self) -> ImportState {
        self.state
    }

    /// Number of batches reported applied so far.
    pub fn completed(&self) -> u32 {
        self.completed
    }

    /// Produces the edits for the next instance, or `None` once all
    /// instances have been produced.
    ///
    /// The first call also copies the template's namespace declarations onto
    /// the destination root.
    ///
    /// # Errors
    /// Returns [`SclError::BatchNotApplied`] while the previous batch is
    /// still pending. Errors from the merge end the import; batches applied
    /// before stay in place.
    pub fn next_batch(&mut self, doc: &mut Document) -> Result<Option<EditBatch>, SclError> {
        match self.state {
            ImportState::Emit => return Err(SclError::BatchNotApplied),
            ImportState::Done => return Ok(None),
            ImportState::Start => {
                let ctx = self.log_context();
                let added = propagate_namespaces(doc, self.template.namespaces());
                scl_info!(
                    ctx,
                    "Importing {} instance(s), {} namespace declaration(s) added",
                    self.quantity,
                    added
                );
                if self.quantity == 0 {
                    self.transition(ImportState::Done);
                    return Ok(None);
                }
            }
            _ => {}
        }

        match self.build_batch(doc) {
            Ok(batch) => Ok(Some(batch)),
            Err(e) => {
                self.transition(ImportState::Done);
                Err(e)
            }
        }
    }

    /// Reports that the batch returned by the last [`next_batch`] call was
    /// applied to the destination.
    ///
    /// [`next_batch`]: TemplateImport::next_batch
    pub fn batch_applied(&mut self) {
        if self.state != ImportState::Emit {
            scl_warn!(
                self.log_context(),
                "Batch reported applied in state {:?}, ignoring",
                self.state
            );
            return;
        }
        self.completed += 1;
        if self.completed < self.quantity {
            self.transition(ImportState::Clone);
        } else {
            self.transition(ImportState::Done);
        }
    }

    fn build_batch(&mut self, doc: &Document) -> Result<EditBatch, SclError> {
        self.transition(ImportState::Clone);
        let mut instance = self.template.instantiate();

        self.transition(ImportState::Rename);
        let name = allocate_name(doc, &instance.ied);
        instance.rename(&name);
        scl_debug!(self.log_context(), "Allocated IED name {}", name);
        let mut batch = EditBatch::new(name);

        self.transition(ImportState::MergeTypes);
        merge_data_type_templates(doc, &mut instance.ied, &mut instance.types, &mut batch)?;
        if !batch.renamed_types.is_empty() {
            scl_debug!(
                self.log_context(),
                "{} data type(s) renamed to avoid id collisions",
                batch.renamed_types.len()
            );
        }

        if self.options.include_comms_addresses {
            self.transition(ImportState::MergeComms);
            let ied_name = batch.ied_name.clone();
            let inserted =
                merge_communication(doc, &ied_name, &instance.access_points, &mut batch);
            scl_debug!(self.log_context(), "{} ConnectedAP(s) added", inserted);
        }

        self.transition(ImportState::InsertIed);
        let root = EditTarget::Existing(doc.root());
        let reference = batch.reference_for(doc, root, scl::IED, scl::ROOT_ORDER);
        batch.push(Edit {
            parent: root,
            node: instance.ied,
            reference,
        });

        self.transition(ImportState::Emit);
        Ok(batch)
    }

    fn transition(&mut self, next: ImportState) {
        scl_trace!(self.log_context(), "{:?} -> {:?}", self.state, next);
        self.state = next;
    }

    fn log_context(&self) -> ImportLogContext<'t> {
        ImportLogContext {
            template: self.template.source_name(),
            cycle: self.completed + 1,
        }
    }
}
