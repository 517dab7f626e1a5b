// crates/scl-template-import/src/host.rs

use crate::config::{ImportOptions, ImportRequest};
use crate::document::Document;
use crate::edit::{EditBatch, TypeRename};
use crate::error::SclError;
use crate::importer::TemplateImport;
use log::{debug, info};
use serde::Serialize;
use std::future::{Future, ready};

/// The application that owns the destination document.
///
/// The import only reads the document, except for namespace declarations
/// on its root, and hands every change to [`EditHost::apply`]. The next
/// batch is computed once the returned future completes, so the host can
/// apply batches asynchronously (e.g. after a UI update).
pub trait EditHost {
    fn document(&self) -> &Document;

    fn document_mut(&mut self) -> &mut Document;

    /// Applies one batch to the document.
    fn apply(&mut self, batch: EditBatch) -> impl Future<Output = Result<(), SclError>>;
}

/// An [`EditHost`] that keeps the document in memory and applies batches
/// immediately.
#[derive(Debug, Clone)]
pub struct DocumentHost {
    document: Document,
}

impl DocumentHost {
    pub fn new(document: Document) -> Self {
        Self { document }
    }

    pub fn into_document(self) -> Document {
        self.document
    }
}

impl EditHost for DocumentHost {
    fn document(&self) -> &Document {
        &self.document
    }

    fn document_mut(&mut self) -> &mut Document {
        &mut self.document
    }

    fn apply(&mut self, batch: EditBatch) -> impl Future<Output = Result<(), SclError>> {
        ready(self.document.apply_batch(&batch).map(|_| ()))
    }
}

/// One IED created by an import.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ImportedIed {
    /// Source name of the template it was created from.
    pub template: String,
    pub name: String,
    pub renamed_types: Vec<TypeRename>,
}

/// What an import run created, in creation order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ImportReport {
    pub imported: Vec<ImportedIed>,
}

impl ImportReport {
    pub fn ied_names(&self) -> impl Iterator<Item = &str> {
        self.imported.iter().map(|ied| ied.name.as_str())
    }
}

impl ImportedIed {
    fn from_batch(template: &str, batch: &EditBatch) -> Self {
        ImportedIed {
            template: template.to_string(),
            name: batch.ied_name.clone(),
            renamed_types: batch.renamed_types.clone(),
        }
    }
}

/// Imports every request into the host's document, one batch at a time.
///
/// Requests with a quantity of 0 are skipped. Templates are processed in
/// request order, and each batch is awaited before the next one is built.
///
/// # Errors
/// Stops at the first error. IEDs imported before it stay in the document.
pub async fn import_templates<H: EditHost>(
    host: &mut H,
    requests: &[ImportRequest],
    options: ImportOptions,
) -> Result<ImportReport, SclError> {
    let mut report = ImportReport::default();
    for request in requests {
        if request.quantity.get() == 0 {
            debug!("Skipping template {}", request.template.source_name());
            continue;
        }
        let mut import = TemplateImport::new(&request.template, request.quantity, options);
        while let Some(batch) = import.next_batch(host.document_mut())? {
            let imported = ImportedIed::from_batch(request.template.source_name(), &batch);
            host.apply(batch).await?;
            import.batch_applied();
            report.imported.push(imported);
        }
    }
    info!("Imported {} IED(s)", report.imported.len());
    Ok(report)
}

/// Synchronous variant of [`import_templates`] for a plain [`Document`].
pub fn import_into_document(
    document: &mut Document,
    requests: &[ImportRequest],
    options: ImportOptions,
) -> Result<ImportReport, SclError> {
    let mut report = ImportReport::default();
    for request in requests {
        if request.quantity.get() == 0 {
            debug!("Skipping template {}", request.template.source_name());
            continue;
        }
        let mut import = TemplateImport::new(&request.template, request.quantity, options);
        while let Some(batch) = import.next_batch(document)? {
            document.apply_batch(&batch)?;
            import.batch_applied();
            report
                .imported
                .push(ImportedIed::from_batch(request.template.source_name(), &batch));
        }
    }
    info!("Imported {} IED(s)", report.imported.len());
    Ok(report)
}
