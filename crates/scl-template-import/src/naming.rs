// crates/scl-template-import/src/naming.rs

use crate::document::{Document, Element};
use crate::scl;

/// Name core used when the template carries neither manufacturer nor type.
pub const DEFAULT_NAME_CORE: &str = "TEMPLATE_IED";

/// Builds the name core `<manufacturer>_<type>` of a template IED.
///
/// Characters outside `[A-Za-z0-9_]` are dropped, the separator is only
/// used when both parts are present, and runs of `_` are collapsed.
pub fn name_core(template_ied: &Element) -> String {
    let sanitize = |attr: &str| {
        template_ied
            .attribute(attr)
            .map(|value| {
                value
                    .chars()
                    .filter(|c| c.is_ascii_alphanumeric() || *c == '_')
                    .collect::<String>()
            })
            .filter(|value| !value.is_empty())
    };

    let joined = match (sanitize("manufacturer"), sanitize("type")) {
        (Some(manufacturer), Some(kind)) => format!("{}_{}", manufacturer, kind),
        (Some(part), None) | (None, Some(part)) => part,
        (None, None) => return DEFAULT_NAME_CORE.to_string(),
    };

    let mut core = String::with_capacity(joined.len());
    for c in joined.chars() {
        if c == '_' && core.ends_with('_') {
            continue;
        }
        core.push(c);
    }
    core
}

/// Picks a name for a new instance of `template_ied` that no public IED of
/// `doc` uses yet.
///
/// Candidates are `<core>_01`, `<core>_02`, ... up to one more than the
/// number of public IEDs. Should all of them be taken, the last candidate is
/// returned anyway.
pub fn allocate_name(doc: &Document, template_ied: &Element) -> String {
    let core = name_core(template_ied);
    let siblings: Vec<&str> = doc
        .descendants_named(doc.root(), scl::IED)
        .into_iter()
        .filter(|ied| doc.is_public(*ied))
        .map(|ied| doc.attribute(ied, "name").unwrap_or(scl::IED))
        .collect();

    let last = siblings.len() + 1;
    (1..=last)
        .map(|i| format!("{}_{:02}", core, i))
        .find(|candidate| !siblings.contains(&candidate.as_str()))
        .unwrap_or_else(|| format!("{}_{:02}", core, last))
}
