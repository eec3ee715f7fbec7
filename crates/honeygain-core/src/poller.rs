use std::time::{Duration, Instant};

use chrono::{DateTime, Utc};
use futures_util::future::join_all;
use serde::Serialize;
use tracing::info;

use crate::client::JsonSource;
use crate::config::ScraperConfig;
use crate::registry::discover;
use crate::sensor::{Sensor, SensorSnapshot};

#[derive(Debug, Clone, Serialize)]
pub struct PollReport {
    pub ts: DateTime<Utc>,
    pub cycle: u64,
    pub poll_ms: u128,
    pub available: usize,
    pub unavailable: usize,
    pub sensors: Vec<SensorSnapshot>,
}

/// Owns the sensors of one scraper instance and refreshes them on demand.
pub struct Poller<S: JsonSource> {
    source: S,
    config: ScraperConfig,
    sensors: Vec<Sensor>,
    cycles: u64,
}

impl<S: JsonSource> Poller<S> {
    pub async fn bootstrap(source: S, config: ScraperConfig) -> Self {
        let sensors = discover(&source, &config).await;
        Self::with_sensors(source, config, sensors)
    }

    pub fn with_sensors(source: S, config: ScraperConfig, sensors: Vec<Sensor>) -> Self {
        Self {
            source,
            config,
            sensors,
            cycles: 0,
        }
    }

    pub fn interval(&self) -> Duration {
        self.config.scan_interval
    }

    pub fn snapshots(&self) -> Vec<SensorSnapshot> {
        self.sensors.iter().map(Sensor::snapshot).collect()
    }

    /// Refreshes every sensor once. Sensors share nothing, so they run concurrently.
    pub async fn tick(&mut self) -> PollReport {
        let started = Instant::now();
        let source: &dyn JsonSource = &self.source;

        let outcomes = join_all(self.sensors.iter_mut().map(|sensor| sensor.refresh(source))).await;
        self.cycles += 1;

        let available = self.sensors.iter().filter(|s| s.is_available()).count();
        let refreshed = outcomes.iter().filter(|ok| **ok).count();
        let poll = started.elapsed();
        info!(
            cycle = self.cycles,
            refreshed,
            failed = outcomes.len() - refreshed,
            poll_ms = %poll.as_millis(),
            "poll complete"
        );

        PollReport {
            ts: Utc::now(),
            cycle: self.cycles,
            poll_ms: poll.as_millis(),
            available,
            unavailable: self.sensors.len() - available,
            sensors: self.snapshots(),
        }
    }
}
