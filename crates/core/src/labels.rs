use serde::{Deserialize, Serialize};

/// The "outside any field" tag of the B-/I-/O scheme.
pub const OUTSIDE: &str = "O";

/// Strip a single leading `B-` or `I-` tag prefix, yielding the field key.
pub fn strip_tag_prefix(label: &str) -> &str {
    label
        .strip_prefix("B-")
        .or_else(|| label.strip_prefix("I-"))
        .unwrap_or(label)
}

/// Ordered source-label preferences for each UI-facing field.
///
/// The recognized label keys are a contract owned by the fine-tuned model
/// artifact. Swapping artifacts means updating this table (it deserializes
/// from the pipeline config), not the projection code.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LabelTable {
    /// Tried in order for the `vendor` field.
    pub vendor: Vec<String>,
    /// Tried in order for the `date` field.
    pub date: Vec<String>,
    /// Tried in order for the `amount` field.
    pub amount: Vec<String>,
}

impl Default for LabelTable {
    fn default() -> Self {
        let keys = |names: &[&str]| names.iter().map(|s| s.to_string()).collect();
        Self {
            vendor: keys(&["COMPANY"]),
            date: keys(&["DATE", "INVOICE_DATE"]),
            amount: keys(&["TOTAL", "AMOUNT"]),
        }
    }
}
