use std::collections::{HashMap, VecDeque};
use std::sync::Mutex;

use async_trait::async_trait;
use serde_json::Value;

use crate::client::{build_url, FetchError, JsonSource};

#[derive(Debug, Clone)]
enum Scripted {
    Ok(Value),
    Status(u16),
}

/// In-memory API replaying queued responses per path. The last queued
/// response of a path repeats forever; unknown paths answer 404.
pub(crate) struct ScriptedSource {
    base_url: String,
    responses: Mutex<HashMap<String, VecDeque<Scripted>>>,
}

impl ScriptedSource {
    pub(crate) fn new(base_url: &str) -> Self {
        Self {
            base_url: base_url.to_string(),
            responses: Mutex::new(HashMap::new()),
        }
    }

    pub(crate) fn respond(self, path: &str, value: Value) -> Self {
        self.push(path, Scripted::Ok(value))
    }

    pub(crate) fn fail(self, path: &str, status: u16) -> Self {
        self.push(path, Scripted::Status(status))
    }

    fn push(self, path: &str, response: Scripted) -> Self {
        self.responses
            .lock()
            .expect("responses lock")
            .entry(path.to_string())
            .or_default()
            .push_back(response);
        self
    }
}

#[async_trait]
impl JsonSource for ScriptedSource {
    fn base_url(&self) -> &str {
        &self.base_url
    }

    async fn fetch_json(&self, path: &str) -> Result<Value, FetchError> {
        let url = build_url(&self.base_url, path);
        let next = {
            let mut responses = self.responses.lock().expect("responses lock");
            match responses.get_mut(path) {
                Some(queue) if queue.len() > 1 => queue.pop_front(),
                Some(queue) => queue.front().cloned(),
                None => None,
            }
        };

        match next {
            Some(Scripted::Ok(value)) => Ok(value),
            Some(Scripted::Status(404)) | None => Err(FetchError::NotFound { url }),
            Some(Scripted::Status(status)) => Err(FetchError::Status { url, status }),
        }
    }
}
