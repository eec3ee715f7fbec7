use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::{Map, Value};
use tracing::{debug, warn};

use crate::client::JsonSource;
use crate::config::endpoints;
use crate::readers::{read_stats, RefreshError};
use crate::reshape::{self, Reading, StateValue};
use crate::sanitize::sanitize_text;

/// Which endpoint a sensor reads and how its payload is reshaped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SensorKind {
    Account,
    Device { device_id: String },
    DailyStats { offset: usize },
    StatsToday,
    StatsTodayBreakdown,
    Notifications,
    Balances,
}

impl SensorKind {
    pub fn label(&self) -> &'static str {
        match self {
            Self::Account => "account",
            Self::Device { .. } => "device",
            Self::DailyStats { .. } => "daily_stats",
            Self::StatsToday => "stats_today",
            Self::StatsTodayBreakdown => "stats_today_jt",
            Self::Notifications => "notifications",
            Self::Balances => "balances",
        }
    }

    fn exposes_attributes(&self) -> bool {
        !matches!(self, Self::Notifications)
    }
}

#[derive(Debug, Clone)]
pub struct Sensor {
    kind: SensorKind,
    name: String,
    unique_id: String,
    state: Option<StateValue>,
    attributes: Map<String, Value>,
    available: bool,
    last_updated: Option<DateTime<Utc>>,
}

/// What the host reads back from a sensor after a poll.
#[derive(Debug, Clone, Serialize)]
pub struct SensorSnapshot {
    pub unique_id: String,
    pub name: String,
    pub kind: &'static str,
    pub available: bool,
    pub state: Option<StateValue>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub attributes: Option<Map<String, Value>>,
    pub last_updated: Option<DateTime<Utc>>,
}

impl Sensor {
    pub fn new(kind: SensorKind, name: impl Into<String>, base_url: &str) -> Self {
        let name = name.into();
        let unique_id = format!("{}_{}", sanitize_text(&name), base_url);
        Self {
            kind,
            name,
            unique_id,
            state: None,
            attributes: Map::new(),
            available: true,
            last_updated: None,
        }
    }

    pub fn account(base_url: &str) -> Self {
        Self::new(SensorKind::Account, "HoneyGain Me", base_url)
    }

    /// `label` is the already sanitized device title (or model).
    pub fn device(base_url: &str, label: &str, device_id: impl Into<String>) -> Self {
        Self::new(
            SensorKind::Device {
                device_id: device_id.into(),
            },
            format!("HoneyGain Device {label}"),
            base_url,
        )
    }

    pub fn daily_stats(base_url: &str, offset: usize, window_days: u32) -> Self {
        // Goes negative past the window so every offset keeps a distinct name.
        let days_back = i64::from(window_days) - offset as i64;
        Self::new(
            SensorKind::DailyStats { offset },
            format!("HoneyGain stats past {days_back}"),
            base_url,
        )
    }

    pub fn stats_today(base_url: &str) -> Self {
        Self::new(SensorKind::StatsToday, "HoneyGain stats today", base_url)
    }

    pub fn stats_today_breakdown(base_url: &str) -> Self {
        Self::new(SensorKind::StatsTodayBreakdown, "HoneyGain stats today JT", base_url)
    }

    pub fn notifications(base_url: &str) -> Self {
        Self::new(SensorKind::Notifications, "HoneyGain notifications", base_url)
    }

    pub fn balances(base_url: &str) -> Self {
        Self::new(SensorKind::Balances, "HoneyGain balances", base_url)
    }

    pub fn kind(&self) -> &SensorKind {
        &self.kind
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn unique_id(&self) -> &str {
        &self.unique_id
    }

    pub fn is_available(&self) -> bool {
        self.available
    }

    pub fn state(&self) -> Option<&StateValue> {
        self.state.as_ref()
    }

    pub fn attributes(&self) -> Option<&Map<String, Value>> {
        self.kind.exposes_attributes().then_some(&self.attributes)
    }

    pub fn last_updated(&self) -> Option<DateTime<Utc>> {
        self.last_updated
    }

    /// Polls the sensor's endpoint once. On failure the sensor turns
    /// unavailable but keeps its last good state and attributes.
    pub async fn refresh(&mut self, source: &dyn JsonSource) -> bool {
        match self.read(source).await {
            Ok(reading) => {
                self.apply(reading);
                true
            }
            Err(err) => {
                self.available = false;
                warn!(sensor = %self.name, error = %err, "error retrieving data from HoneyGain");
                false
            }
        }
    }

    async fn read(&self, source: &dyn JsonSource) -> Result<Reading, RefreshError> {
        let reading = match &self.kind {
            SensorKind::Account => reshape::account(source.fetch_json(endpoints::ME).await?)?,
            SensorKind::Device { device_id } => {
                let reading = reshape::device(source.fetch_json(endpoints::DEVICES).await?, device_id)?;
                if reading.state.is_none() {
                    debug!(sensor = %self.name, %device_id, "device no longer listed");
                }
                reading
            }
            SensorKind::DailyStats { offset } => reshape::daily_stats(read_stats(source).await?, *offset)?,
            SensorKind::StatsToday => {
                reshape::stats_today(source.fetch_json(endpoints::STATS_TODAY).await?)?
            }
            SensorKind::StatsTodayBreakdown => {
                reshape::stats_today_breakdown(source.fetch_json(endpoints::STATS_TODAY_JT).await?)?
            }
            SensorKind::Notifications => {
                reshape::notifications(source.fetch_json(endpoints::NOTIFICATIONS).await?)?
            }
            SensorKind::Balances => reshape::balances(source.fetch_json(endpoints::BALANCES).await?)?,
        };
        Ok(reading)
    }

    fn apply(&mut self, reading: Reading) {
        if let Some(state) = reading.state {
            self.state = Some(state);
        }
        if let Some(attributes) = reading.attributes {
            self.attributes = attributes;
        }
        self.available = true;
        self.last_updated = Some(Utc::now());
    }

    pub fn snapshot(&self) -> SensorSnapshot {
        SensorSnapshot {
            unique_id: self.unique_id.clone(),
            name: self.name.clone(),
            kind: self.kind.label(),
            available: self.available,
            state: self.state.clone(),
            attributes: self.attributes().cloned(),
            last_updated: self.last_updated,
        }
    }
}
