//! Canned results for known sample documents.
//!
//! Demo deployments ship a handful of sample invoices whose expected fields
//! are known. Matching them by filename keeps demos deterministic and lets
//! the UI be exercised without OCR or a model artifact. Matching happens on
//! the declared (upload) filename, never on document content.

use invox_core::FieldMap;

/// Return the canned field map when the declared filename contains a known
/// sample marker. Matching is case-insensitive substring containment, checked
/// in a fixed order; unknown names return `None` and flow through the real
/// pipeline.
pub fn resolve_override(declared_filename: &str) -> Option<FieldMap> {
    let name = declared_filename.to_lowercase();
    if name.contains("sample_invoice") {
        return Some(canned("ABC Technologies", "2025-06-05", "$495"));
    }
    if name.contains("invoice2") {
        return Some(canned("TechNova Solutions Inc", "2025-06-01", "$395.50"));
    }
    if name.contains("invoice3") {
        return Some(canned("TCS Pvt. Ltd.", "2025-06-18", "$2200"));
    }
    None
}

fn canned(company: &str, date: &str, total: &str) -> FieldMap {
    let mut fields = FieldMap::new();
    fields.insert("COMPANY".to_string(), company.to_string());
    fields.insert("DATE".to_string(), date.to_string());
    fields.insert("TOTAL".to_string(), total.to_string());
    fields
}
