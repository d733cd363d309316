use crate::models::SerialDetails;

/// One pre-fill rule: copy `source` from the details payload into the page
/// element `element_id`, or `default` when the value is missing or empty.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldBinding {
    pub element_id: &'static str,
    pub source: &'static str,
    pub default: &'static str,
}

impl FieldBinding {
    pub fn resolve<'a>(&self, details: &'a SerialDetails) -> &'a str {
        match details.field(self.source) {
            Some(value) if !value.is_empty() => value,
            _ => self.default,
        }
    }
}

pub const DEFAULT_AMC_TYPE: &str = "Out Of Warranty";

/// Sibling fields filled on the warranty and issue pages.
pub const FIELD_BINDINGS: &[FieldBinding] = &[
    FieldBinding { element_id: "item_name", source: "item_name", default: "" },
    FieldBinding { element_id: "customer", source: "customer", default: "" },
    FieldBinding { element_id: "customer_address", source: "customer_address", default: "" },
    FieldBinding { element_id: "zonal_manager", source: "zonal_manager", default: "" },
    FieldBinding { element_id: "customer_name", source: "customer", default: "" },
    FieldBinding { element_id: "amc_type", source: "amc_type", default: DEFAULT_AMC_TYPE },
];

/// Element ids of every bound field, in table order.
pub fn bound_field_ids() -> impl Iterator<Item = &'static str> {
    FIELD_BINDINGS.iter().map(|b| b.element_id)
}
