//! Schema validation boundary.
//!
//! Whether a document is schema valid is decided outside the graph engine. The engine only
//! consults a [`SchemaOracle`] before ingestion and treats its answer as pass/fail plus a list of
//! messages. Schema validity says nothing about cross-reference integrity, so a passing
//! document can still produce dangling and self reference diagnostics.

use serde_json::Value;

use crate::properties::EntityKind;

pub trait SchemaOracle {
    /// `Ok(())` when the document is schema valid, otherwise one message per violation.
    fn validate(&self, document: &Value) -> Result<(), Vec<String>>;
}

impl<F> SchemaOracle for F
where
    F: Fn(&Value) -> Result<(), Vec<String>>,
{
    fn validate(&self, document: &Value) -> Result<(), Vec<String>> {
        self(document)
    }
}

/// Accepts every document. Use when validation already happened upstream.
#[derive(Debug, Clone, Copy, Default)]
pub struct AcceptAll;

impl SchemaOracle for AcceptAll {
    fn validate(&self, _document: &Value) -> Result<(), Vec<String>> {
        Ok(())
    }
}

/// Built-in coarse shape check: section and record containers, the `version` tag, individual
/// names and event types. Field level typing is left to deserialization.
#[derive(Debug, Clone, Copy, Default)]
pub struct ShapeOracle;

pub(crate) fn json_type(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

impl SchemaOracle for ShapeOracle {
    fn validate(&self, document: &Value) -> Result<(), Vec<String>> {
        let Some(root) = document.as_object() else {
            return Err(vec![format!(
                "document must be an object, found {}",
                json_type(document)
            )]);
        };

        let mut violations = Vec::new();
        if let Some(version) = root.get("version") {
            if !version.is_string() {
                violations.push(format!(
                    "'version' must be a string, found {}",
                    json_type(version)
                ));
            }
        }

        for kind in EntityKind::all() {
            let Some(section) = root.get(kind.section()) else {
                continue;
            };
            let Some(records) = section.as_object() else {
                violations.push(format!(
                    "'{}' must be an object keyed by ID, found {}",
                    kind.section(),
                    json_type(section)
                ));
                continue;
            };
            for (id, record) in records {
                let Some(body) = record.as_object() else {
                    violations.push(format!(
                        "{}.{id} must be an object, found {}",
                        kind.section(),
                        json_type(record)
                    ));
                    continue;
                };
                match kind {
                    EntityKind::Individual
                        if !body.contains_key("name") && !body.contains_key("full_name") =>
                    {
                        violations.push(format!("individuals.{id} has no 'name' or 'full_name'"));
                    }
                    EntityKind::Event if !body.get("type").is_some_and(Value::is_string) => {
                        violations.push(format!("events.{id} has no string 'type'"));
                    }
                    _ => {}
                }
            }
        }

        if violations.is_empty() {
            Ok(())
        } else {
            Err(violations)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn shape_oracle_reports_every_violation() {
        let document = json!({
            "version": 2,
            "individuals": {
                "I1": {"full_name": "Ok"},
                "I2": {"sex": "M"},
                "I3": "not an object"
            },
            "events": {"E1": {"individual": "I1"}},
            "sources": []
        });
        let violations = ShapeOracle.validate(&document).unwrap_err();
        assert_eq!(violations.len(), 5, "{violations:?}");
        assert!(violations.iter().any(|v| v.contains("individuals.I2")));
        assert!(violations.iter().any(|v| v.contains("'sources'")));
    }

    #[test]
    fn closures_are_oracles() {
        let reject = |_: &Value| -> Result<(), Vec<String>> { Err(vec!["nope".to_string()]) };
        assert_eq!(reject.validate(&json!({})), Err(vec!["nope".to_string()]));
        assert!(AcceptAll.validate(&json!(null)).is_ok());
        assert!(ShapeOracle.validate(&json!({"version": "2.0"})).is_ok());
    }
}
