use serde::Deserialize;
use serde_json::{Map, Value};
use thiserror::Error;

use crate::client::{FetchError, JsonSource};
use crate::config::endpoints;
use crate::reshape::{into_object, ReshapeError};

#[derive(Debug, Error)]
pub enum RefreshError {
    #[error(transparent)]
    Fetch(#[from] FetchError),
    #[error(transparent)]
    Reshape(#[from] ReshapeError),
    #[error("invalid device descriptor: {0}")]
    Descriptor(#[from] serde_json::Error),
}

/// One entry of the device list, as needed to name a device sensor.
#[derive(Debug, Clone, Deserialize)]
pub struct DeviceDescriptor {
    pub id: String,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub model: Option<String>,
}

impl DeviceDescriptor {
    pub fn display_name(&self) -> Option<&str> {
        self.title.as_deref().or(self.model.as_deref())
    }
}

pub async fn read_devices(source: &dyn JsonSource) -> Result<Vec<Value>, RefreshError> {
    let payload = source.fetch_json(endpoints::DEVICES).await?;
    match payload {
        Value::Array(items) => Ok(items),
        _ => Err(ReshapeError::UnexpectedShape { expected: "array" }.into()),
    }
}

pub async fn read_stats(source: &dyn JsonSource) -> Result<Vec<Map<String, Value>>, RefreshError> {
    let payload = source.fetch_json(endpoints::STATS).await?;
    Ok(stats_sequence(payload)?)
}

/// Turns `{date: {..}, ..}` into a list of day objects carrying their `date`,
/// in the order the API sent them.
pub fn stats_sequence(payload: Value) -> Result<Vec<Map<String, Value>>, ReshapeError> {
    into_object(payload)?
        .into_iter()
        .map(|(date, day)| match day {
            Value::Object(mut day) => {
                day.insert("date".to_string(), Value::String(date));
                Ok(day)
            }
            _ => Err(ReshapeError::TypeMismatch {
                key: date,
                expected: "an object",
            }),
        })
        .collect()
}

/// First item whose `id` matches, or an empty object.
pub fn find_by_id(items: &[Value], id: &str) -> Map<String, Value> {
    items
        .iter()
        .find(|item| item.get("id").and_then(Value::as_str) == Some(id))
        .and_then(Value::as_object)
        .cloned()
        .unwrap_or_default()
}
