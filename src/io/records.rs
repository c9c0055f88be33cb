use std::fs;
use std::io::ErrorKind;
use std::path::Path;

use serde_json::Value;

use crate::error::{Result, ToolError};
use crate::model::UserRecord;

/// Loads the JSON array of usager records produced by the application.
pub fn load_records(path: &Path) -> Result<Vec<UserRecord>> {
    let source = fs::read_to_string(path).map_err(|error| match error.kind() {
        ErrorKind::NotFound => ToolError::MissingInput(path.to_path_buf()),
        _ => ToolError::Io(error),
    })?;
    parse_records(&source)
}

/// Parses a JSON payload that must be an array of record mappings.
pub fn parse_records(source: &str) -> Result<Vec<UserRecord>> {
    let payload: Value = serde_json::from_str(source)?;
    let Value::Array(items) = payload else {
        return Err(ToolError::UnexpectedPayload(format!(
            "expected a list of users, found {}",
            describe(&payload)
        )));
    };

    items
        .into_iter()
        .enumerate()
        .map(|(index, item)| {
            serde_json::from_value(item).map_err(|source| ToolError::InvalidRecord { index, source })
        })
        .collect()
}

fn describe(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "a list",
        Value::Object(_) => "an object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_a_list_of_records() {
        let records = parse_records(r#"[{"nom": "Dupont"}, {}]"#).expect("payload parsed");
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].nom.as_deref(), Some("Dupont"));
    }

    #[test]
    fn rejects_non_list_payloads() {
        let error = parse_records(r#"{"nom": "Dupont"}"#).expect_err("object rejected");
        assert!(matches!(error, ToolError::UnexpectedPayload(_)));
        assert!(error.to_string().contains("an object"));
    }

    #[test]
    fn malformed_json_reports_position() {
        let error = parse_records("[{\"nom\": }]").expect_err("syntax error");
        assert!(matches!(error, ToolError::Json(_)));
        assert!(error.to_string().contains("line 1"));
    }

    #[test]
    fn non_mapping_element_names_its_index() {
        let error = parse_records(r#"[{}, "oops"]"#).expect_err("string element rejected");
        assert!(matches!(error, ToolError::InvalidRecord { index: 1, .. }));
    }

    #[test]
    fn missing_file_is_reported_as_missing_input() {
        let error = load_records(Path::new("/definitely/not/here.json")).expect_err("missing");
        assert!(matches!(error, ToolError::MissingInput(_)));
    }
}
