//! Raw JSON to [`Action`] validation.

use serde_json::{Map, Value};

use super::types::{Action, ActionKind, ActionParams, MouseButton};
use crate::error::ActionError;

/// Validates raw action objects, filling in a provider-specific default
/// confidence when the model leaves it out.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ActionValidator {
    default_confidence: f64,
}

impl ActionValidator {
    pub const fn new(default_confidence: f64) -> Self {
        Self { default_confidence }
    }

    pub fn default_confidence(&self) -> f64 {
        self.default_confidence
    }

    pub fn validate(&self, raw: &Value) -> Result<Action, ActionError> {
        let obj = raw
            .as_object()
            .ok_or_else(|| ActionError::invalid("action must be a JSON object"))?;

        let name = obj
            .get("action")
            .and_then(Value::as_str)
            .ok_or_else(|| ActionError::invalid("missing action type"))?;
        let kind = ActionKind::parse(name)
            .ok_or_else(|| ActionError::invalid(format!("unknown action type '{}'", name)))?;

        let params = obj
            .get("params")
            .and_then(Value::as_object)
            .ok_or_else(|| ActionError::invalid(format!("{} is missing params", kind)))?;

        let params = match kind {
            ActionKind::Click => ActionParams::Click {
                x: number(params, kind, "x")?,
                y: number(params, kind, "y")?,
                button: match params.get("button") {
                    None | Some(Value::Null) => MouseButton::default(),
                    Some(v) => v.as_str().and_then(MouseButton::parse).ok_or_else(|| {
                        ActionError::invalid(format!("click button {} is not left, right or middle", v))
                    })?,
                },
                double: match params.get("double") {
                    None | Some(Value::Null) => false,
                    Some(v) => v
                        .as_bool()
                        .ok_or_else(|| ActionError::invalid("click double must be a boolean"))?,
                },
            },
            ActionKind::Type => ActionParams::Type {
                text: params
                    .get("text")
                    .and_then(Value::as_str)
                    .ok_or_else(|| ActionError::invalid("type requires a string text"))?
                    .to_string(),
            },
            ActionKind::Scroll => ActionParams::Scroll {
                delta: number(params, kind, "delta")?,
                x: optional_number(params, kind, "x")?,
                y: optional_number(params, kind, "y")?,
            },
            ActionKind::PressKeys => {
                let keys = params
                    .get("keys")
                    .and_then(Value::as_array)
                    .ok_or_else(|| ActionError::invalid("press_keys requires a keys array"))?;
                let keys = keys
                    .iter()
                    .enumerate()
                    .map(|(i, key)| {
                        key.as_str().map(str::to_string).ok_or_else(|| {
                            ActionError::invalid(format!("press_keys key at position {} is not a string", i))
                        })
                    })
                    .collect::<Result<Vec<_>, _>>()?;
                ActionParams::PressKeys { keys }
            }
            ActionKind::Wait => ActionParams::Wait {
                ms: number(params, kind, "ms")?,
            },
        };

        let confidence = obj
            .get("confidence")
            .and_then(Value::as_f64)
            .filter(|c| c.is_finite())
            .unwrap_or(self.default_confidence);

        Action::try_new(params, confidence)
    }

    /// Validate a whole batch. Any invalid entry rejects the batch, and the
    /// error names the entry's index.
    pub fn validate_batch(&self, raw: &[Value]) -> Result<Vec<Action>, ActionError> {
        raw.iter()
            .enumerate()
            .map(|(i, value)| self.validate(value).map_err(|e| e.at_index(i)))
            .collect()
    }
}

fn number(params: &Map<String, Value>, kind: ActionKind, field: &str) -> Result<f64, ActionError> {
    params
        .get(field)
        .and_then(Value::as_f64)
        .ok_or_else(|| ActionError::invalid(format!("{} requires a numeric {}", kind, field)))
}

fn optional_number(
    params: &Map<String, Value>,
    kind: ActionKind,
    field: &str,
) -> Result<Option<f64>, ActionError> {
    match params.get(field) {
        None | Some(Value::Null) => Ok(None),
        Some(_) => number(params, kind, field).map(Some),
    }
}

#[cfg(test)]
#[path = "validator_tests.rs"]
mod tests;
