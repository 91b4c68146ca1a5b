//! Result row normalization.

use shared_types::{FieldValue, ObjectId, ResultRecord};

/// Promote `field` to a native id when it holds a valid hex id string.
///
/// Anything else (missing field, non-string value, malformed hex) leaves the
/// row as it was. Returns whether the field was promoted.
pub fn normalize_record(record: &mut ResultRecord, field: &str) -> bool {
    let parsed = match record.get(field).and_then(FieldValue::as_str) {
        Some(raw) => ObjectId::parse_hex(raw),
        None => return false,
    };
    match parsed {
        Ok(id) => {
            record.insert(field, FieldValue::ObjectId(id));
            true
        }
        Err(_) => false,
    }
}
