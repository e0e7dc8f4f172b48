//! FILENAME: core/crosstab-format/src/lib.rs
//! Cross table file handling.
//!
//! Reads definitions and records from JSON, and writes computed cross
//! tables back out. A request file bundles both inputs:
//!
//! ```json
//! {
//!   "definition": { "row_keys": ["region"], "statistics": [
//!     { "source_field": "amount", "display_name": "total", "method": "sum" } ] },
//!   "records": [ { "region": "A", "amount": 10 } ]
//! }
//! ```

mod error;

pub use error::FormatError;

use std::fs;
use std::path::Path;

use crosstab_engine::{cross_table, CrossTabDefinition, CrossTable, Record};
use serde::{Deserialize, Serialize};

// ============================================================================
// REQUEST
// ============================================================================

/// A definition plus the records it runs over.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CrossTabRequest {
    pub definition: CrossTabDefinition,

    #[serde(default)]
    pub records: Vec<Record>,
}

impl CrossTabRequest {
    pub fn new(definition: CrossTabDefinition, records: Vec<Record>) -> Self {
        CrossTabRequest {
            definition,
            records,
        }
    }

    pub fn run(&self) -> Result<CrossTable, FormatError> {
        Ok(cross_table(&self.records, &self.definition)?)
    }
}

// ============================================================================
// READING
// ============================================================================

/// Parses a JSON array of objects into records.
pub fn parse_records(json: &str) -> Result<Vec<Record>, FormatError> {
    let raw: serde_json::Value = serde_json::from_str(json)?;
    let rows = match raw {
        serde_json::Value::Array(rows) => rows,
        other => {
            return Err(FormatError::InvalidFormat(format!(
                "records must be a JSON array, found {}",
                json_kind(&other)
            )))
        }
    };

    let mut records = Vec::with_capacity(rows.len());
    for (i, row) in rows.into_iter().enumerate() {
        if !row.is_object() {
            return Err(FormatError::InvalidFormat(format!(
                "record {} must be a JSON object, found {}",
                i,
                json_kind(&row)
            )));
        }
        records.push(serde_json::from_value(row)?);
    }
    Ok(records)
}

pub fn parse_definition(json: &str) -> Result<CrossTabDefinition, FormatError> {
    let definition: CrossTabDefinition = serde_json::from_str(json)?;
    definition.validate()?;
    Ok(definition)
}

pub fn parse_request(json: &str) -> Result<CrossTabRequest, FormatError> {
    let request: CrossTabRequest = serde_json::from_str(json)?;
    request.definition.validate()?;
    Ok(request)
}

pub fn load_records(path: &Path) -> Result<Vec<Record>, FormatError> {
    let records = parse_records(&fs::read_to_string(path)?)?;
    log::info!("loaded {} records from {}", records.len(), path.display());
    Ok(records)
}

pub fn load_definition(path: &Path) -> Result<CrossTabDefinition, FormatError> {
    let definition = parse_definition(&fs::read_to_string(path)?)?;
    log::info!(
        "loaded cross table definition from {} ({} keys, {} statistics)",
        path.display(),
        definition.group_keys().len(),
        definition.statistics.len()
    );
    Ok(definition)
}

pub fn load_request(path: &Path) -> Result<CrossTabRequest, FormatError> {
    let request = parse_request(&fs::read_to_string(path)?)?;
    log::info!(
        "loaded cross table request from {} ({} records)",
        path.display(),
        request.records.len()
    );
    Ok(request)
}

// ============================================================================
// WRITING
// ============================================================================

/// Pretty-printed JSON of a computed cross table. Non-finite statistics
/// (e.g. the average of no records) are written as `null`.
pub fn to_json(table: &CrossTable) -> Result<String, FormatError> {
    Ok(serde_json::to_string_pretty(table)?)
}

pub fn save_crosstab(table: &CrossTable, path: &Path) -> Result<(), FormatError> {
    fs::write(path, to_json(table)?)?;
    log::info!(
        "saved cross table ({} nodes) to {}",
        table.root.node_count(),
        path.display()
    );
    Ok(())
}

fn json_kind(value: &serde_json::Value) -> &'static str {
    match value {
        serde_json::Value::Null => "null",
        serde_json::Value::Bool(_) => "a boolean",
        serde_json::Value::Number(_) => "a number",
        serde_json::Value::String(_) => "a string",
        serde_json::Value::Array(_) => "an array",
        serde_json::Value::Object(_) => "an object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crosstab_engine::{StatValue, Value};

    #[test]
    fn test_parse_records() {
        let records = parse_records(r#"[{"region":"A","amount":10},{"amount":"5"}]"#).unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].get("region"), Some(&Value::from("A")));
        assert_eq!(records[1].get("region"), None);
    }

    #[test]
    fn test_nested_fields_load_and_group() {
        let json = r#"{
            "definition": {
                "row_keys": ["region", "tags"],
                "statistics": [{"source_field":"amount","display_name":"total","method":"sum"}]
            },
            "records": [
                {"region":"A","amount":10,"tags":["x","y"],"meta":{"source":"feed"}},
                {"region":"A","amount":5,"tags":"x,y"},
                {"region":"B","amount":1,"tags":{"k":1}}
            ]
        }"#;
        let table = parse_request(json).unwrap().run().unwrap();

        assert_eq!(table.root.stat("total"), Some(&StatValue::Number(16.0)));
        let a = table.root.child_by("A").unwrap();
        assert_eq!(a.child_labels(), vec!["x,y"]);
        assert_eq!(a.stat("total"), Some(&StatValue::Number(15.0)));
        assert_eq!(
            table.root.child_by("B").unwrap().child_labels(),
            vec!["[object Object]"]
        );
    }

    #[test]
    fn test_parse_records_rejects_non_objects() {
        match parse_records(r#"[{"a":1}, 3]"#) {
            Err(FormatError::InvalidFormat(msg)) => {
                assert_eq!(msg, "record 1 must be a JSON object, found a number")
            }
            other => panic!("unexpected {:?}", other),
        }
        assert!(matches!(
            parse_records(r#"{"a":1}"#),
            Err(FormatError::InvalidFormat(_))
        ));
        assert!(matches!(parse_records("[{"), Err(FormatError::Json(_))));
    }

    #[test]
    fn test_parse_definition_validates() {
        let json = r#"{"statistics":[
            {"source_field":"a","display_name":"x","method":"sum"},
            {"source_field":"b","display_name":"x","method":"count"}]}"#;
        assert!(matches!(
            parse_definition(json),
            Err(FormatError::Engine(_))
        ));
    }

    #[test]
    fn test_request_run() {
        let json = r#"{
            "definition": {
                "row_keys": ["region"],
                "statistics": [{"source_field":"amount","display_name":"total","method":"sum"}]
            },
            "records": [
                {"region":"A","amount":10},
                {"region":"B","amount":5},
                {"region":"A","amount":3}
            ]
        }"#;
        let table = parse_request(json).unwrap().run().unwrap();

        assert_eq!(table.root.stat("total"), Some(&StatValue::Number(18.0)));
        assert_eq!(table.root.child_labels(), vec!["A", "B"]);
    }

    #[test]
    fn test_to_json_shape() {
        let request = parse_request(
            r#"{"definition":{"row_keys":["k"],"statistics":[
                {"source_field":"n","display_name":"mean","method":"avg","format":1}]},
                "records":[{"k":"x","n":4},{"k":"x","n":5}]}"#,
        )
        .unwrap();
        let table = request.run().unwrap();
        let json: serde_json::Value = serde_json::from_str(&to_json(&table).unwrap()).unwrap();

        assert_eq!(json["row_keys"], serde_json::json!(["k"]));
        assert_eq!(json["statistic_names"], serde_json::json!(["mean"]));
        assert_eq!(json["root"]["stats"]["mean"], "4.5");
        let child = &json["root"]["children"][0];
        assert_eq!(child["key"], "k");
        assert_eq!(child["value"], "x");
        assert_eq!(child["path"], serde_json::json!([{"key": "k", "value": "x"}]));
        assert!(child.get("members").is_none());
    }
}
