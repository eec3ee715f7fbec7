use std::time::Duration;

use serde_json::json;

use crate::config::{endpoints, ScraperConfig};
use crate::poller::Poller;
use crate::registry::discover;
use crate::sensor::SensorKind;
use crate::testing::ScriptedSource;

const BASE: &str = "http://scraper.local:8080";

fn config() -> ScraperConfig {
    ScraperConfig::new(BASE)
}

fn stats_payload() -> serde_json::Value {
    json!({
        "2024-05-03": {"credits": 3},
        "2024-05-02": {"credits": 2},
        "2024-05-01": {"credits": 1}
    })
}

#[tokio::test]
async fn discover_builds_static_device_and_daily_sensors() {
    // Arrange
    let source = ScriptedSource::new(BASE)
        .respond(
            endpoints::DEVICES,
            json!([
                {"id": "d1", "title": "Salon TV", "model": "Android"},
                {"id": "d2", "title": null, "model": "Raspberry Pi 4"}
            ]),
        )
        .respond(endpoints::STATS, stats_payload());

    // Act
    let sensors = discover(&source, &config()).await;

    // Assert
    let names: Vec<_> = sensors.iter().map(|s| s.name()).collect();
    assert_eq!(
        names,
        [
            "HoneyGain Me",
            "HoneyGain stats today",
            "HoneyGain stats today JT",
            "HoneyGain notifications",
            "HoneyGain balances",
            "HoneyGain Device salon_tv",
            "HoneyGain Device raspberry_pi_4",
            "HoneyGain stats past 30",
            "HoneyGain stats past 29",
            "HoneyGain stats past 28",
        ]
    );
    assert_eq!(sensors[6].kind(), &SensorKind::Device { device_id: "d2".into() });
    assert_eq!(sensors[9].kind(), &SensorKind::DailyStats { offset: 2 });
}

#[tokio::test]
async fn failed_device_lookup_keeps_other_groups() {
    // Arrange
    let source = ScriptedSource::new(BASE)
        .fail(endpoints::DEVICES, 500)
        .respond(endpoints::STATS, stats_payload());

    // Act
    let sensors = discover(&source, &config()).await;

    // Assert
    assert_eq!(sensors.len(), 5 + 3);
    assert!(sensors
        .iter()
        .all(|s| !matches!(s.kind(), SensorKind::Device { .. })));
}

#[tokio::test]
async fn failed_stats_lookup_keeps_other_groups() {
    let source = ScriptedSource::new(BASE)
        .respond(endpoints::DEVICES, json!([{"id": "d1", "title": "Box", "model": "x"}]))
        .respond(endpoints::STATS, json!(["not", "a", "map"]));

    let sensors = discover(&source, &config()).await;

    assert_eq!(sensors.len(), 5 + 1);
}

#[tokio::test]
async fn one_bad_descriptor_drops_all_device_sensors() {
    let source = ScriptedSource::new(BASE)
        .respond(
            endpoints::DEVICES,
            json!([{"id": "d1", "title": "Box", "model": "x"}, {"title": "no id"}]),
        )
        .respond(endpoints::STATS, json!({}));

    let sensors = discover(&source, &config()).await;

    assert_eq!(sensors.len(), 5);
}

#[tokio::test]
async fn api_down_still_yields_static_sensors() {
    let source = ScriptedSource::new(BASE);

    let sensors = discover(&source, &config()).await;

    assert_eq!(sensors.len(), 5);
    assert!(sensors.iter().all(|s| s.unique_id().ends_with(BASE)));
}

#[tokio::test]
async fn poller_tick_reports_every_sensor() {
    // Arrange
    let source = ScriptedSource::new(BASE)
        .respond(endpoints::ME, json!({"email": "me@example.com"}))
        .respond(endpoints::DEVICES, json!([{"id": "d1", "title": "Box", "model": "x"}]))
        .respond(endpoints::STATS, stats_payload())
        .respond(endpoints::STATS_TODAY, json!({"total_credits": 5}))
        .respond(endpoints::NOTIFICATIONS, json!([]))
        .respond(endpoints::BALANCES, json!({"payout": {"credits": 1}}));
    let fast = ScraperConfig {
        scan_interval: Duration::from_secs(60),
        ..config()
    };
    let mut poller = Poller::bootstrap(source, fast).await;

    // Act
    let report = poller.tick().await;

    // Assert
    assert_eq!(poller.interval(), Duration::from_secs(60));
    assert_eq!(report.cycle, 1);
    assert_eq!(report.sensors.len(), 5 + 1 + 3);
    // Only the breakdown endpoint is missing.
    assert_eq!(report.unavailable, 1);
    assert_eq!(report.available, 8);
    let breakdown = report
        .sensors
        .iter()
        .find(|s| s.kind == "stats_today_jt")
        .unwrap();
    assert!(!breakdown.available);
    assert_eq!(poller.tick().await.cycle, 2);
}
