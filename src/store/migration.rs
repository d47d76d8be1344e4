//! Load-time upgrades for persisted test case records.
//!
//! Runs on raw JSON before typed deserialization so the steady-state
//! `TestCase` type carries no legacy fields.

use serde_json::{Map, Value};

use crate::domain::TestStatus;

/// Shape of a persisted test case record
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CaseSchema {
    /// One `status` field shared by everyone
    SingleStatus,
    /// Independent `qaStatus` / `uatStatus` / `batStatus`
    MultiRole,
}

impl CaseSchema {
    pub fn detect(record: &Map<String, Value>) -> Self {
        if record.contains_key("status") && !record.contains_key("qaStatus") {
            CaseSchema::SingleStatus
        } else {
            CaseSchema::MultiRole
        }
    }
}

/// Rewrite a single-status record in place. Returns true if it changed.
///
/// The legacy value moves verbatim into `qaStatus`; the other roles start
/// Untested and the `status` field is dropped.
pub fn upgrade_test_case(record: &mut Map<String, Value>) -> bool {
    if CaseSchema::detect(record) != CaseSchema::SingleStatus {
        return false;
    }

    let legacy = record.remove("status").unwrap_or(Value::Null);
    let untested = Value::String(TestStatus::Untested.as_str().to_string());
    record.insert("qaStatus".to_string(), legacy);
    record.insert("uatStatus".to_string(), untested.clone());
    record.insert("batStatus".to_string(), untested);
    true
}

/// Upgrade every record of a persisted test case array.
///
/// Returns the number of records rewritten. Non-object entries are left for
/// typed deserialization to reject.
pub fn upgrade_test_cases(collection: &mut Value) -> usize {
    let Some(records) = collection.as_array_mut() else {
        return 0;
    };

    records
        .iter_mut()
        .filter_map(Value::as_object_mut)
        .map(upgrade_test_case)
        .filter(|changed| *changed)
        .count()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_detect_schema() {
        let legacy = json!({"id": "1", "status": "Pass"});
        let current = json!({"id": "1", "qaStatus": "Pass"});
        assert_eq!(CaseSchema::detect(legacy.as_object().unwrap()), CaseSchema::SingleStatus);
        assert_eq!(CaseSchema::detect(current.as_object().unwrap()), CaseSchema::MultiRole);
    }

    #[test]
    fn test_upgrade_moves_status_to_qa() {
        let mut record = json!({"id": "1", "status": "Fail", "title": "t"});
        let changed = upgrade_test_case(record.as_object_mut().unwrap());

        assert!(changed);
        assert_eq!(record["qaStatus"], "Fail");
        assert_eq!(record["uatStatus"], "Untested");
        assert_eq!(record["batStatus"], "Untested");
        assert!(record.get("status").is_none());
        assert_eq!(record["title"], "t");
    }

    #[test]
    fn test_upgrade_leaves_multi_role_untouched() {
        let mut record = json!({"id": "1", "qaStatus": "Pass", "uatStatus": "Fail", "batStatus": "Blocked"});
        let before = record.clone();
        assert!(!upgrade_test_case(record.as_object_mut().unwrap()));
        assert_eq!(record, before);
    }

    #[test]
    fn test_upgrade_collection_counts() {
        let mut collection = json!([
            {"id": "1", "status": "Pass"},
            {"id": "2", "qaStatus": "Fail"},
            {"id": "3", "status": "Skipped"},
            42
        ]);
        assert_eq!(upgrade_test_cases(&mut collection), 2);
        assert_eq!(collection[2]["qaStatus"], "Skipped");
        assert_eq!(collection[3], 42);
    }

    #[test]
    fn test_upgrade_non_array_is_noop() {
        let mut collection = json!({"not": "an array"});
        assert_eq!(upgrade_test_cases(&mut collection), 0);
    }
}
