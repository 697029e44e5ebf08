use serde_json::{Map, Value};

use super::PolicyError;

/// JSON object posted by Border0 to a policy endpoint.
#[derive(Debug)]
pub(crate) struct PolicyRequest(Map<String, Value>);

impl PolicyRequest {
    pub(crate) fn parse(body: &[u8]) -> Result<Self, PolicyError> {
        let value: Value = serde_json::from_slice(body)
            .map_err(|e| PolicyError::BadRequest(format!("invalid JSON body: {e}")))?;
        match value {
            Value::Object(map) => Ok(Self(map)),
            _ => Err(PolicyError::BadRequest(
                "request body must be a JSON object".to_string(),
            )),
        }
    }

    pub(crate) fn require(&self, field: &str) -> Result<&str, PolicyError> {
        self.0
            .get(field)
            .and_then(Value::as_str)
            .ok_or_else(|| PolicyError::MissingField(field.to_string()))
    }
}
