// src/core/schema.rs
use std::fmt;
use std::sync::Arc;

use jsonschema::{Draft, Validator};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::{json, Value};

/// Typed parameter payload of a tool. The struct's fields are what the
/// handler consumes after validation; `json_schema` is the document
/// advertised to callers and enforced before deserialization.
pub trait ToolParameters: DeserializeOwned + Send + 'static {
    fn json_schema() -> Value;
}

/// Payload for tools that take no arguments.
#[derive(Debug, Deserialize)]
pub struct NoParameters {}

impl ToolParameters for NoParameters {
    fn json_schema() -> Value {
        json!({
            "type": "object",
            "properties": {}
        })
    }
}

/// A JSON Schema document paired with its compiled validator. The raw
/// document is kept verbatim for listing; the compiled form answers
/// call-time checks.
#[derive(Clone)]
pub struct ParameterSchema {
    document: Value,
    validator: Arc<Validator>,
}

impl ParameterSchema {
    pub fn compile(document: Value) -> Result<Self, String> {
        let validator = jsonschema::options()
            .with_draft(Draft::Draft202012)
            .build(&document)
            .map_err(|err| err.to_string())?;
        Ok(Self {
            document,
            validator: Arc::new(validator),
        })
    }

    pub fn document(&self) -> &Value {
        &self.document
    }

    /// Validates raw arguments, collecting every violation into one
    /// message so callers see all problems at once.
    pub fn check(&self, args: &Value) -> Result<(), String> {
        let messages: Vec<String> = self
            .validator
            .iter_errors(args)
            .map(|err| err.to_string())
            .collect();
        if messages.is_empty() {
            Ok(())
        } else {
            Err(messages.join("; "))
        }
    }
}

impl fmt::Debug for ParameterSchema {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ParameterSchema")
            .field("document", &self.document)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Deserialize)]
    struct EchoParameters {
        message: String,
    }

    impl ToolParameters for EchoParameters {
        fn json_schema() -> Value {
            json!({
                "type": "object",
                "properties": {
                    "message": { "type": "string" }
                },
                "required": ["message"]
            })
        }
    }

    #[test]
    fn accepts_conforming_arguments() {
        let schema = ParameterSchema::compile(EchoParameters::json_schema()).unwrap();
        assert!(schema.check(&json!({ "message": "hi" })).is_ok());
    }

    #[test]
    fn rejects_missing_and_mistyped_fields() {
        let schema = ParameterSchema::compile(EchoParameters::json_schema()).unwrap();
        assert!(schema.check(&json!({})).is_err());
        let err = schema.check(&json!({ "message": 42 })).unwrap_err();
        assert!(err.contains("42"), "message should name the bad value: {err}");
    }

    #[test]
    fn unparseable_schema_fails_compilation() {
        let err = ParameterSchema::compile(json!({ "type": "not-a-type" }));
        assert!(err.is_err());
    }
}
