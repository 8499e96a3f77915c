use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::labels::LabelTable;

/// The pipeline's raw output: prefix-stripped label key (`COMPANY`, `DATE`,
/// `TOTAL`, …) → whitespace-joined concatenation of the words assigned that
/// key, in document order. Immutable once produced; owned by the caller.
pub type FieldMap = BTreeMap<String, String>;

/// The fixed projection handed to UI callers. Created per request and
/// discarded after the caller consumes it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UiFields {
    pub vendor: String,
    pub date: String,
    pub amount: String,
    /// Untouched field map — displayed/logged for diagnostics, never
    /// interpreted by UI logic.
    pub raw: FieldMap,
}

impl UiFields {
    /// Project a field map onto the stable UI keys.
    ///
    /// Total: every field map, including an empty one, produces a well-formed
    /// value — absent source labels become empty strings.
    pub fn project(fields: &FieldMap, table: &LabelTable) -> Self {
        let pick = |candidates: &[String]| -> String {
            candidates
                .iter()
                .find_map(|key| fields.get(key))
                .cloned()
                .unwrap_or_default()
        };
        Self {
            vendor: pick(&table.vendor),
            date: pick(&table.date),
            amount: pick(&table.amount),
            raw: fields.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn map(entries: &[(&str, &str)]) -> FieldMap {
        entries.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect()
    }

    #[test]
    fn project_fills_all_keys() {
        let fields = map(&[
            ("COMPANY", "ABC Technologies"),
            ("DATE", "2025-06-05"),
            ("TOTAL", "$495"),
        ]);
        let ui = UiFields::project(&fields, &LabelTable::default());
        assert_eq!(ui.vendor, "ABC Technologies");
        assert_eq!(ui.date, "2025-06-05");
        assert_eq!(ui.amount, "$495");
        assert_eq!(ui.raw, fields);
    }

    #[test]
    fn project_empty_map_yields_empty_strings() {
        let ui = UiFields::project(&FieldMap::new(), &LabelTable::default());
        assert_eq!(ui.vendor, "");
        assert_eq!(ui.date, "");
        assert_eq!(ui.amount, "");
        assert!(ui.raw.is_empty());
    }

    #[test]
    fn project_tries_alternate_labels_in_order() {
        let fields = map(&[("INVOICE_DATE", "2025-01-31"), ("AMOUNT", "$12.00")]);
        let ui = UiFields::project(&fields, &LabelTable::default());
        assert_eq!(ui.date, "2025-01-31");
        assert_eq!(ui.amount, "$12.00");

        // Primary label wins over the alternate when both are present.
        let both = map(&[("DATE", "2025-02-01"), ("INVOICE_DATE", "2025-01-31")]);
        let ui = UiFields::project(&both, &LabelTable::default());
        assert_eq!(ui.date, "2025-02-01");
    }

    #[test]
    fn serializes_with_exactly_four_keys() {
        let ui = UiFields::project(&FieldMap::new(), &LabelTable::default());
        let json = serde_json::to_value(&ui).unwrap();
        let obj = json.as_object().unwrap();
        assert_eq!(obj.len(), 4);
        for key in ["vendor", "date", "amount", "raw"] {
            assert!(obj.contains_key(key), "missing key {key}");
        }
    }
}
