//! SCL element names and the child orderings the schema prescribes.

pub const SCL: &str = "SCL";
pub const PRIVATE: &str = "Private";
pub const PARSER_ERROR: &str = "parsererror";

pub const IED: &str = "IED";
pub const LN0: &str = "LN0";
pub const LN: &str = "LN";

pub const COMMUNICATION: &str = "Communication";
pub const SUB_NETWORK: &str = "SubNetwork";
pub const CONNECTED_AP: &str = "ConnectedAP";

pub const DATA_TYPE_TEMPLATES: &str = "DataTypeTemplates";
pub const LNODE_TYPE: &str = "LNodeType";
pub const DO_TYPE: &str = "DOType";
pub const DA_TYPE: &str = "DAType";
pub const ENUM_TYPE: &str = "EnumType";

pub const DO: &str = "DO";
pub const SDO: &str = "SDO";
pub const DA: &str = "DA";
pub const BDA: &str = "BDA";

/// Name of the IED a template document must carry at root level.
pub const TEMPLATE_IED_NAME: &str = "TEMPLATE";

/// Children of the `SCL` root, in schema order.
pub const ROOT_ORDER: &[&str] = &[
    PRIVATE,
    "Text",
    "Header",
    "Substation",
    "Line",
    "Process",
    COMMUNICATION,
    IED,
    DATA_TYPE_TEMPLATES,
];

/// Children of `DataTypeTemplates`, in schema order.
pub const DATA_TYPE_TEMPLATES_ORDER: &[&str] = &[LNODE_TYPE, DO_TYPE, DA_TYPE, ENUM_TYPE];

/// Position of `tag` within a schema ordering.
pub fn rank(order: &[&str], tag: &str) -> Option<usize> {
    order.iter().position(|t| *t == tag)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rank() {
        assert_eq!(rank(ROOT_ORDER, IED), Some(7));
        assert!(rank(ROOT_ORDER, COMMUNICATION) < rank(ROOT_ORDER, IED));
        assert_eq!(rank(DATA_TYPE_TEMPLATES_ORDER, ENUM_TYPE), Some(3));
        assert_eq!(rank(ROOT_ORDER, "Unknown"), None);
    }
}
