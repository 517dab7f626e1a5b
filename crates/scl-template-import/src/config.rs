// crates/scl-template-import/src/config.rs

use crate::loader::Template;
use serde::{Deserialize, Serialize};

/// Settings shared by every template of one import run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ImportOptions {
    /// Copy the template's `ConnectedAP` definitions into the project's
    /// `Communication` section.
    pub include_comms_addresses: bool,
}

impl Default for ImportOptions {
    fn default() -> Self {
        Self {
            include_comms_addresses: true,
        }
    }
}

/// How many instances of a template to create.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "u32", into = "u32")]
pub struct ImportQuantity(u8);

impl ImportQuantity {
    pub const MAX: u32 = 99;

    /// Returns `None` for values above [`ImportQuantity::MAX`].
    pub fn new(value: u32) -> Option<Self> {
        u8::try_from(value)
            .ok()
            .filter(|v| u32::from(*v) <= Self::MAX)
            .map(ImportQuantity)
    }

    /// Interprets user input by its leading integer, so `"3.5"` reads as 3
    /// and `"5abc"` as 5. Input without leading digits, negative numbers and
    /// values above 99 become 1.
    pub fn from_input(input: &str) -> Self {
        let input = input.trim();
        let unsigned = input.strip_prefix('+').unwrap_or(input);
        let end = unsigned
            .find(|c: char| !c.is_ascii_digit())
            .unwrap_or(unsigned.len());
        unsigned[..end]
            .parse::<u32>()
            .ok()
            .and_then(Self::new)
            .unwrap_or_default()
    }

    pub fn get(self) -> u32 {
        u32::from(self.0)
    }
}

impl Default for ImportQuantity {
    fn default() -> Self {
        ImportQuantity(1)
    }
}

impl TryFrom<u32> for ImportQuantity {
    type Error = String;

    fn try_from(value: u32) -> Result<Self, Self::Error> {
        Self::new(value).ok_or_else(|| {
            format!(
                "import quantity {} is out of range 0..={}",
                value,
                Self::MAX
            )
        })
    }
}

impl From<ImportQuantity> for u32 {
    fn from(quantity: ImportQuantity) -> u32 {
        quantity.get()
    }
}

/// One template and the number of instances to create from it.
#[derive(Debug, Clone)]
pub struct ImportRequest {
    pub template: Template,
    pub quantity: ImportQuantity,
}

impl ImportRequest {
    pub fn new(template: Template, quantity: ImportQuantity) -> Self {
        Self { template, quantity }
    }
}

/// Number of IEDs a set of requests will create.
pub fn total_ied_count(requests: &[ImportRequest]) -> u32 {
    requests.iter().map(|r| r.quantity.get()).sum()
}
