use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Maintenance status reported by the details endpoint.
///
/// The backend emits `"Under Warranty"`, `"Out of Warranty"` or `"Unknown"`;
/// anything else is kept verbatim.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum MaintenanceStatus {
    UnderWarranty,
    OutOfWarranty,
    Unknown,
    Other(String),
}

impl MaintenanceStatus {
    pub fn as_str(&self) -> &str {
        match self {
            Self::UnderWarranty => "Under Warranty",
            Self::OutOfWarranty => "Out of Warranty",
            Self::Unknown => "Unknown",
            Self::Other(s) => s,
        }
    }
}

impl From<String> for MaintenanceStatus {
    fn from(s: String) -> Self {
        match s.as_str() {
            "Under Warranty" => Self::UnderWarranty,
            "Out of Warranty" => Self::OutOfWarranty,
            "Unknown" => Self::Unknown,
            _ => Self::Other(s),
        }
    }
}

impl From<MaintenanceStatus> for String {
    fn from(status: MaintenanceStatus) -> Self {
        status.as_str().to_string()
    }
}

impl fmt::Display for MaintenanceStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Full record for one serial number.
///
/// Every field is optional: the payload is never validated, missing values
/// fall back to defaults at the point of use.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SerialDetails {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub item_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub customer: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub customer_address: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub zonal_manager: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub amc_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub maintenance_status: Option<MaintenanceStatus>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub warranty_expiry_date: Option<String>,
}

impl SerialDetails {
    /// Build from a raw JSON payload. Strings are taken as-is, numbers and
    /// booleans are stringified, anything else counts as absent. A payload
    /// that is not an object yields an empty record.
    pub fn from_json(v: &Value) -> Self {
        let text = |key: &str| v.get(key).and_then(scalar_text);
        Self {
            item_name: text("item_name"),
            customer: text("customer"),
            customer_address: text("customer_address"),
            zonal_manager: text("zonal_manager"),
            amc_type: text("amc_type"),
            maintenance_status: text("maintenance_status").map(MaintenanceStatus::from),
            warranty_expiry_date: text("warranty_expiry_date"),
        }
    }

    /// Look a value up by its payload key.
    pub fn field(&self, key: &str) -> Option<&str> {
        match key {
            "item_name" => self.item_name.as_deref(),
            "customer" => self.customer.as_deref(),
            "customer_address" => self.customer_address.as_deref(),
            "zonal_manager" => self.zonal_manager.as_deref(),
            "amc_type" => self.amc_type.as_deref(),
            "maintenance_status" => self.maintenance_status.as_ref().map(|s| s.as_str()),
            "warranty_expiry_date" => self.warranty_expiry_date.as_deref(),
            _ => None,
        }
    }

    /// A record without a customer is treated the same as an unknown serial.
    pub fn has_customer(&self) -> bool {
        self.customer
            .as_deref()
            .is_some_and(|c| !c.trim().is_empty())
    }

    pub fn is_under_warranty(&self) -> bool {
        self.maintenance_status == Some(MaintenanceStatus::UnderWarranty)
    }
}

/// Classified payload of the details endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum DetailsResponse {
    /// Payload carried a truthy `error` field.
    NotFound { message: String },
    Found(SerialDetails),
}

impl DetailsResponse {
    pub fn from_json(v: &Value) -> Self {
        match v.get("error").filter(|e| is_truthy(e)) {
            Some(Value::String(message)) => Self::NotFound {
                message: message.clone(),
            },
            Some(other) => Self::NotFound {
                message: other.to_string(),
            },
            None => Self::Found(SerialDetails::from_json(v)),
        }
    }
}

fn scalar_text(v: &Value) -> Option<String> {
    match v {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

/// `null`, `false`, `0` and `""` are falsy; everything else is truthy.
fn is_truthy(v: &Value) -> bool {
    match v {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}
