//! Validated action types.

use serde::ser::SerializeStruct;
use serde::{Deserialize, Serialize, Serializer};
use std::fmt;

use crate::error::ActionError;

/// Largest accepted screen coordinate on either axis.
pub const MAX_COORDINATE: f64 = 10_000.0;

/// Longest accepted `type` text, in characters.
pub const MAX_TEXT_CHARS: usize = 10_000;

/// Longest accepted `wait`, in milliseconds.
pub const MAX_WAIT_MS: f64 = 30_000.0;

/// The closed set of action kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActionKind {
    Click,
    Type,
    Scroll,
    PressKeys,
    Wait,
}

impl ActionKind {
    pub const ALL: [ActionKind; 5] = [
        ActionKind::Click,
        ActionKind::Type,
        ActionKind::Scroll,
        ActionKind::PressKeys,
        ActionKind::Wait,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ActionKind::Click => "click",
            ActionKind::Type => "type",
            ActionKind::Scroll => "scroll",
            ActionKind::PressKeys => "press_keys",
            ActionKind::Wait => "wait",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.as_str() == s)
    }
}

impl fmt::Display for ActionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MouseButton {
    #[default]
    Left,
    Right,
    Middle,
}

impl MouseButton {
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "left" => Some(Self::Left),
            "right" => Some(Self::Right),
            "middle" => Some(Self::Middle),
            _ => None,
        }
    }
}

/// Parameters for each action kind.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ActionParams {
    Click {
        x: f64,
        y: f64,
        button: MouseButton,
        double: bool,
    },
    Type {
        text: String,
    },
    Scroll {
        delta: f64,
        #[serde(skip_serializing_if = "Option::is_none")]
        x: Option<f64>,
        #[serde(skip_serializing_if = "Option::is_none")]
        y: Option<f64>,
    },
    PressKeys {
        keys: Vec<String>,
    },
    Wait {
        ms: f64,
    },
}

impl ActionParams {
    /// Left single click at a point.
    pub fn click(x: f64, y: f64) -> Self {
        Self::Click {
            x,
            y,
            button: MouseButton::Left,
            double: false,
        }
    }

    pub fn kind(&self) -> ActionKind {
        match self {
            Self::Click { .. } => ActionKind::Click,
            Self::Type { .. } => ActionKind::Type,
            Self::Scroll { .. } => ActionKind::Scroll,
            Self::PressKeys { .. } => ActionKind::PressKeys,
            Self::Wait { .. } => ActionKind::Wait,
        }
    }

    /// Check the bounds for this kind.
    pub fn check(&self) -> Result<(), ActionError> {
        match self {
            Self::Click { x, y, .. } => {
                check_coordinate("click", "x", *x)?;
                check_coordinate("click", "y", *y)
            }
            Self::Type { text } => {
                if text.is_empty() {
                    return Err(ActionError::invalid("type text must not be empty"));
                }
                let len = text.chars().count();
                if len > MAX_TEXT_CHARS {
                    return Err(ActionError::invalid(format!(
                        "type text length {} out of range (max {})",
                        len, MAX_TEXT_CHARS
                    )));
                }
                Ok(())
            }
            Self::Scroll { delta, x, y } => {
                if !delta.is_finite() {
                    return Err(ActionError::invalid("scroll delta must be a finite number"));
                }
                if let Some(x) = x {
                    check_coordinate("scroll", "x", *x)?;
                }
                if let Some(y) = y {
                    check_coordinate("scroll", "y", *y)?;
                }
                Ok(())
            }
            Self::PressKeys { keys } => {
                if keys.is_empty() {
                    return Err(ActionError::invalid("press_keys keys must not be empty"));
                }
                if let Some(pos) = keys.iter().position(|k| k.is_empty()) {
                    return Err(ActionError::invalid(format!(
                        "press_keys key at position {} is empty",
                        pos
                    )));
                }
                Ok(())
            }
            Self::Wait { ms } => {
                if !ms.is_finite() || *ms < 0.0 || *ms > MAX_WAIT_MS {
                    return Err(ActionError::invalid(format!(
                        "wait ms={} out of range [0, {}]",
                        ms, MAX_WAIT_MS
                    )));
                }
                Ok(())
            }
        }
    }
}

fn check_coordinate(kind: &str, axis: &str, value: f64) -> Result<(), ActionError> {
    if !value.is_finite() || !(0.0..=MAX_COORDINATE).contains(&value) {
        return Err(ActionError::invalid(format!(
            "{} {}={} out of range [0, {}]",
            kind, axis, value, MAX_COORDINATE
        )));
    }
    Ok(())
}

/// A validated action. Only constructed through [`Action::try_new`], so an
/// `Action` in hand always satisfies its kind's bounds.
#[derive(Debug, Clone, PartialEq)]
pub struct Action {
    params: ActionParams,
    confidence: f64,
}

impl Action {
    /// Build an action, checking bounds and clamping confidence into `[0, 1]`.
    pub fn try_new(params: ActionParams, confidence: f64) -> Result<Self, ActionError> {
        params.check()?;
        if !confidence.is_finite() {
            return Err(ActionError::invalid("confidence must be a finite number"));
        }
        Ok(Self {
            params,
            confidence: confidence.clamp(0.0, 1.0),
        })
    }

    pub fn kind(&self) -> ActionKind {
        self.params.kind()
    }

    pub fn params(&self) -> &ActionParams {
        &self.params
    }

    pub fn confidence(&self) -> f64 {
        self.confidence
    }

    /// Wire form `{"action", "params", "confidence"}`.
    pub fn to_value(&self) -> serde_json::Value {
        serde_json::json!({
            "action": self.kind().as_str(),
            "params": self.params,
            "confidence": self.confidence,
        })
    }
}

impl Serialize for Action {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut state = serializer.serialize_struct("Action", 3)?;
        state.serialize_field("action", self.kind().as_str())?;
        state.serialize_field("params", &self.params)?;
        state.serialize_field("confidence", &self.confidence)?;
        state.end()
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.params {
            ActionParams::Click { x, y, button, double } => {
                let clicks = if *double { "double-click" } else { "click" };
                write!(f, "{} {:?} at ({}, {})", clicks, button, x, y)?;
            }
            ActionParams::Type { text } => write!(f, "type {:?}", text)?,
            ActionParams::Scroll { delta, .. } => write!(f, "scroll {}", delta)?,
            ActionParams::PressKeys { keys } => write!(f, "press {}", keys.join("+"))?,
            ActionParams::Wait { ms } => write!(f, "wait {} ms", ms)?,
        }
        write!(f, " [{:.2}]", self.confidence)
    }
}
