use tracing::{error, info};

use crate::client::JsonSource;
use crate::config::ScraperConfig;
use crate::readers::{read_devices, read_stats, DeviceDescriptor, RefreshError};
use crate::reshape::ReshapeError;
use crate::sanitize::sanitize_text;
use crate::sensor::Sensor;

/// Builds every sensor for one scraper instance.
///
/// The single-instance sensors are always present. Device and daily stats
/// sensors depend on what the API reports right now; if either lookup fails
/// that group is simply left out.
pub async fn discover(source: &dyn JsonSource, config: &ScraperConfig) -> Vec<Sensor> {
    let base_url = source.base_url();
    let mut sensors = static_sensors(base_url);

    match device_sensors(source).await {
        Ok(devices) => sensors.extend(devices),
        Err(err) => error!(error = %err, "error retrieving devices from HoneyGain"),
    }

    match daily_stats_sensors(source, config.stats_window_days).await {
        Ok(days) => sensors.extend(days),
        Err(err) => error!(error = %err, "error retrieving stats from HoneyGain"),
    }

    info!(count = sensors.len(), %base_url, "sensors discovered");
    sensors
}

pub fn static_sensors(base_url: &str) -> Vec<Sensor> {
    vec![
        Sensor::account(base_url),
        Sensor::stats_today(base_url),
        Sensor::stats_today_breakdown(base_url),
        Sensor::notifications(base_url),
        Sensor::balances(base_url),
    ]
}

async fn device_sensors(source: &dyn JsonSource) -> Result<Vec<Sensor>, RefreshError> {
    let base_url = source.base_url();

    read_devices(source)
        .await?
        .into_iter()
        .map(|item| -> Result<Sensor, RefreshError> {
            let descriptor: DeviceDescriptor = serde_json::from_value(item)?;
            let label = descriptor
                .display_name()
                .map(sanitize_text)
                .ok_or_else(|| ReshapeError::MissingKey("model".to_string()))?;
            Ok(Sensor::device(base_url, &label, descriptor.id))
        })
        .collect()
}

async fn daily_stats_sensors(source: &dyn JsonSource, window_days: u32) -> Result<Vec<Sensor>, RefreshError> {
    let base_url = source.base_url();
    let days = read_stats(source).await?;

    Ok((0..days.len())
        .map(|offset| Sensor::daily_stats(base_url, offset, window_days))
        .collect())
}
