//! Per-endpoint rules turning a raw payload into a sensor reading.
//!
//! Every rule is pure: it consumes the payload and either yields a
//! [`Reading`] or explains why the payload does not have the expected shape.

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Number, Value};
use thiserror::Error;

use crate::readers::find_by_id;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ReshapeError {
    #[error("expected a json {expected} payload")]
    UnexpectedShape { expected: &'static str },
    #[error("missing key `{0}`")]
    MissingKey(String),
    #[error("key `{key}` is not {expected}")]
    TypeMismatch { key: String, expected: &'static str },
    #[error("no entry at offset {offset}, only {len} available")]
    OutOfRange { offset: usize, len: usize },
}

/// Scalar state of a sensor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum StateValue {
    Text(String),
    Number(Number),
}

impl StateValue {
    fn from_json(key: &str, value: &Value) -> Result<Self, ReshapeError> {
        match value {
            Value::String(text) => Ok(Self::Text(text.clone())),
            Value::Number(number) => Ok(Self::Number(number.clone())),
            _ => Err(ReshapeError::TypeMismatch {
                key: key.to_string(),
                expected: "a string or a number",
            }),
        }
    }
}

impl From<usize> for StateValue {
    fn from(count: usize) -> Self {
        Self::Number(Number::from(count))
    }
}

impl fmt::Display for StateValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Text(text) => f.write_str(text),
            Self::Number(number) => write!(f, "{number}"),
        }
    }
}

/// Outcome of a successful reshape. `None` leaves the sensor's current value as is.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Reading {
    pub state: Option<StateValue>,
    pub attributes: Option<Map<String, Value>>,
}

pub(crate) fn into_object(payload: Value) -> Result<Map<String, Value>, ReshapeError> {
    match payload {
        Value::Object(map) => Ok(map),
        _ => Err(ReshapeError::UnexpectedShape { expected: "object" }),
    }
}

fn required_state(data: &Map<String, Value>, key: &str) -> Result<StateValue, ReshapeError> {
    let value = data
        .get(key)
        .ok_or_else(|| ReshapeError::MissingKey(key.to_string()))?;
    StateValue::from_json(key, value)
}

/// Replaces a nested object `key` with top-level copies of some of its fields.
fn flatten(
    data: &mut Map<String, Value>,
    key: &str,
    fields: &[(&str, &str)],
) -> Result<(), ReshapeError> {
    let Some(nested) = data.shift_remove(key) else {
        return Ok(());
    };

    for (field, target) in fields {
        let value = nested
            .get(*field)
            .cloned()
            .ok_or_else(|| ReshapeError::MissingKey(format!("{key}.{field}")))?;
        data.insert((*target).to_string(), value);
    }

    Ok(())
}

pub fn account(payload: Value) -> Result<Reading, ReshapeError> {
    let data = into_object(payload)?;
    let state = required_state(&data, "email")?;

    Ok(Reading {
        state: Some(state),
        attributes: Some(data),
    })
}

/// Locates `device_id` in the device list. A device missing from the list
/// still counts as a successful read with empty attributes.
pub fn device(payload: Value, device_id: &str) -> Result<Reading, ReshapeError> {
    let Value::Array(items) = payload else {
        return Err(ReshapeError::UnexpectedShape { expected: "array" });
    };

    let found = find_by_id(&items, device_id);
    let state = found
        .get("id")
        .map(|id| StateValue::from_json("id", id))
        .transpose()?;

    Ok(Reading {
        state,
        attributes: Some(found),
    })
}

pub fn daily_stats(mut days: Vec<Map<String, Value>>, offset: usize) -> Result<Reading, ReshapeError> {
    let len = days.len();
    if offset >= len {
        return Err(ReshapeError::OutOfRange { offset, len });
    }

    let day = days.swap_remove(offset);
    let state = day
        .get("date")
        .map(|date| StateValue::from_json("date", date))
        .transpose()?;

    Ok(Reading {
        state,
        attributes: Some(day),
    })
}

pub fn stats_today(payload: Value) -> Result<Reading, ReshapeError> {
    let mut data = into_object(payload)?;

    for key in ["total", "winning", "referral", "other"] {
        data.shift_remove(key);
    }
    flatten(
        &mut data,
        "cdn",
        &[("credits", "cdn_credits"), ("seconds", "cdn_seconds")],
    )?;
    flatten(&mut data, "gathering", &[("credits", "gathering_credits")])?;

    let state = required_state(&data, "total_credits")?;
    Ok(Reading {
        state: Some(state),
        attributes: Some(data),
    })
}

pub fn stats_today_breakdown(payload: Value) -> Result<Reading, ReshapeError> {
    let mut data = into_object(payload)?;

    flatten(&mut data, "total", &[("credits", "total_credits")])?;
    flatten(&mut data, "winning", &[("credits", "winning_credits")])?;
    flatten(&mut data, "referral", &[("credits", "referral_credits")])?;
    flatten(&mut data, "other", &[("credits", "other_credits")])?;
    flatten(&mut data, "bonus", &[("credits", "bonus_credits")])?;
    flatten(
        &mut data,
        "cdn",
        &[("credits", "cdn_credits"), ("seconds", "cdn_seconds")],
    )?;
    flatten(
        &mut data,
        "gathering",
        &[("credits", "gathering_credits"), ("bytes", "gathering_bytes")],
    )?;

    let state = required_state(&data, "total_credits")?;
    Ok(Reading {
        state: Some(state),
        attributes: Some(data),
    })
}

pub fn notifications(payload: Value) -> Result<Reading, ReshapeError> {
    let count = match &payload {
        Value::Array(items) => items.len(),
        Value::Object(map) => map.len(),
        _ => return Err(ReshapeError::UnexpectedShape { expected: "array" }),
    };

    Ok(Reading {
        state: Some(StateValue::from(count)),
        attributes: None,
    })
}

pub fn balances(payload: Value) -> Result<Reading, ReshapeError> {
    let data = into_object(payload)?;

    let state = match data.get("payout") {
        Some(payout) => {
            let credits = payout
                .get("credits")
                .ok_or_else(|| ReshapeError::MissingKey("payout.credits".to_string()))?;
            Some(StateValue::from_json("payout.credits", credits)?)
        }
        None => None,
    };

    Ok(Reading {
        state,
        attributes: Some(data),
    })
}
