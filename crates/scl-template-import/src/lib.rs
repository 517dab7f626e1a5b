// src/lib.rs

#![doc = "Imports template IEDs from SCL (IEC 61850) `.icd` files into a project."]
#![doc = ""]
#![doc = "A template file carries an IED named `TEMPLATE` together with the data"]
#![doc = "types and communication settings it needs. Importing it creates one or"]
#![doc = "more uniquely named copies of that IED in the project, merging data types"]
#![doc = "without breaking identifier uniqueness and reusing identical ones."]
#![doc = ""]
#![doc = "The import never edits the project directly. It produces one `EditBatch`"]
#![doc = "per IED and waits for the host to apply it:"]
#![doc = "- `TemplateImport`: the per-template state machine."]
#![doc = "- `import_templates`: async driver over an `EditHost`."]
#![doc = "- `import_into_document`: synchronous driver over a `Document`."]

// --- Crate Modules ---

mod communication;
mod config;
mod document;
mod edit;
mod error;
mod host;
mod importer;
mod loader;
mod log;
mod naming;
mod namespaces;
pub mod scl;
mod templates;

// --- Public API Re-exports ---

pub use communication::{ConnectedAccessPoint, merge_communication};
pub use config::{ImportOptions, ImportQuantity, ImportRequest, total_ied_count};
pub use document::{Attribute, Document, Element, Node, NodeId};
pub use edit::{Edit, EditBatch, EditTarget, TypeRename};
pub use error::SclError;
pub use host::{DocumentHost, EditHost, ImportReport, ImportedIed, import_into_document, import_templates};
pub use importer::{ImportState, TemplateImport};
pub use loader::{RejectedTemplate, Template, TemplateInstance, TemplateSummary, load_templates};
pub use naming::{DEFAULT_NAME_CORE, allocate_name, name_core};
pub use namespaces::{namespace_declarations, propagate_namespaces};
pub use templates::{Reachability, TypeCollections, TypeKind, merge_data_type_templates};
