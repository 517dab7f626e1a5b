// crates/scl-template-import/src/loader.rs

use crate::communication::ConnectedAccessPoint;
use crate::document::{Attribute, Document, Element};
use crate::error::SclError;
use crate::namespaces::namespace_declarations;
use crate::scl;
use crate::templates::TypeCollections;
use log::{debug, warn};
use serde::Serialize;

/// A validated template: the `TEMPLATE` IED of an `.icd` file with the data
/// types and communication settings that come with it.
///
/// A template is never modified. Each import cycle works on a fresh
/// [`TemplateInstance`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Template {
    source_name: String,
    ied: Element,
    namespaces: Vec<Attribute>,
    types: TypeCollections,
    access_points: Vec<ConnectedAccessPoint>,
}

/// The working copy of a template for one import cycle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TemplateInstance {
    pub ied: Element,
    pub types: TypeCollections,
    pub access_points: Vec<ConnectedAccessPoint>,
}

impl TemplateInstance {
    /// Gives the IED its final name, and moves the template's access points
    /// over to it.
    pub fn rename(&mut self, name: &str) {
        self.ied.set_attribute("name", name);
        for ap in &mut self.access_points {
            if ap.ied_name() == Some(scl::TEMPLATE_IED_NAME) {
                ap.connected_ap.set_attribute("iedName", name);
            }
        }
    }
}

impl Template {
    /// Parses and validates a template file.
    ///
    /// # Errors
    /// - The XML could not be parsed.
    /// - [`SclError::ParserError`]: the document contains a `parsererror`
    ///   element.
    /// - [`SclError::MissingTemplate`]: there is no `IED` named `TEMPLATE`
    ///   directly below the root.
    pub fn parse(xml: &str, source_name: impl Into<String>) -> Result<Self, SclError> {
        let doc = Document::parse(xml)?;
        Self::from_document(&doc, source_name)
    }

    /// Validates an already parsed template document.
    pub fn from_document(doc: &Document, source_name: impl Into<String>) -> Result<Self, SclError> {
        let root = doc.root();
        if !doc.descendants_named(root, scl::PARSER_ERROR).is_empty() {
            return Err(SclError::ParserError);
        }

        let ied = doc
            .children_named(root, scl::IED)
            .find(|ied| doc.attribute(*ied, "name") == Some(scl::TEMPLATE_IED_NAME))
            .ok_or(SclError::MissingTemplate)?;

        let types = doc
            .child_named(root, scl::DATA_TYPE_TEMPLATES)
            .map(|templates| TypeCollections::from_data_type_templates(&doc.to_element(templates)))
            .unwrap_or_default();

        let access_points = doc
            .child_named(root, scl::COMMUNICATION)
            .map(|comm| ConnectedAccessPoint::collect(&doc.to_element(comm)))
            .unwrap_or_default();

        Ok(Template {
            source_name: source_name.into(),
            ied: doc.to_element(ied),
            namespaces: namespace_declarations(doc.attributes(root)),
            types,
            access_points,
        })
    }

    /// File name or other label the template was loaded from.
    pub fn source_name(&self) -> &str {
        &self.source_name
    }

    pub fn ied(&self) -> &Element {
        &self.ied
    }

    /// The `xmlns:*` declarations of the template's root element.
    pub fn namespaces(&self) -> &[Attribute] {
        &self.namespaces
    }

    pub fn types(&self) -> &TypeCollections {
        &self.types
    }

    pub fn access_points(&self) -> &[ConnectedAccessPoint] {
        &self.access_points
    }

    pub fn summary(&self) -> TemplateSummary {
        TemplateSummary::of(&self.ied)
    }

    /// A fresh working copy for one import cycle.
    pub fn instantiate(&self) -> TemplateInstance {
        TemplateInstance {
            ied: self.ied.clone(),
            types: self.types.clone(),
            access_points: self.access_points.clone(),
        }
    }
}

/// Two-line description of a template, as shown when picking templates.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TemplateSummary {
    /// `manufacturer - type`
    pub headline: String,
    /// `desc - configVersion - <originalSclVersion><Revision><Release>`
    pub details: String,
}

impl TemplateSummary {
    /// Builds the summary of a template IED. Attributes that are absent are
    /// left out together with their separator.
    pub fn of(ied: &Element) -> Self {
        let headline = [ied.attribute("manufacturer"), ied.attribute("type")]
            .into_iter()
            .flatten()
            .collect::<Vec<_>>()
            .join(" - ");

        let schema_parts: Vec<&str> = [
            "originalSclVersion",
            "originalSclRevision",
            "originalSclRelease",
        ]
        .into_iter()
        .filter_map(|attr| ied.attribute(attr))
        .collect();
        let schema = (!schema_parts.is_empty()).then(|| schema_parts.concat());

        let details = [
            ied.attribute("desc"),
            ied.attribute("configVersion"),
            schema.as_deref(),
        ]
        .into_iter()
        .flatten()
        .collect::<Vec<_>>()
        .join(" - ");

        TemplateSummary { headline, details }
    }
}

/// A template file that did not pass validation.
#[derive(Debug)]
pub struct RejectedTemplate {
    pub file: String,
    pub reason: SclError,
}

/// Validates a set of template files, given as `(file name, contents)`.
///
/// Valid templates and rejected files are both returned in input order.
/// Each rejection is also logged as a warning.
pub fn load_templates<I, N, C>(files: I) -> (Vec<Template>, Vec<RejectedTemplate>)
where
    I: IntoIterator<Item = (N, C)>,
    N: Into<String>,
    C: AsRef<str>,
{
    let mut templates = Vec::new();
    let mut rejected = Vec::new();

    for (name, contents) in files {
        let name = name.into();
        match Template::parse(contents.as_ref(), name.as_str()) {
            Ok(template) => {
                debug!("Loaded template {}", name);
                templates.push(template);
            }
            Err(reason) => {
                warn!("Rejected template {}: {}", name, reason);
                rejected.push(RejectedTemplate { file: name, reason });
            }
        }
    }
    (templates, rejected)
}
