use chrono::{TimeZone, Utc};
use honeygain_core::{PollReport, SensorSnapshot, StateValue};
use serde_json::{Map, Number};

use crate::{render_human, state_label};

fn snapshot(name: &str, available: bool, state: Option<StateValue>) -> SensorSnapshot {
    SensorSnapshot {
        unique_id: format!("{}_http://scraper", name.to_lowercase().replace(' ', "_")),
        name: name.to_string(),
        kind: "account",
        available,
        state,
        attributes: Some(Map::new()),
        last_updated: None,
    }
}

fn report(sensors: Vec<SensorSnapshot>) -> PollReport {
    PollReport {
        ts: Utc
            .with_ymd_and_hms(2026, 2, 15, 8, 30, 0)
            .single()
            .expect("valid date"),
        cycle: 4,
        poll_ms: 120,
        available: sensors.iter().filter(|s| s.available).count(),
        unavailable: sensors.iter().filter(|s| !s.available).count(),
        sensors,
    }
}

#[test]
fn human_report_lists_every_sensor_with_status() {
    // Arrange
    let report = report(vec![
        snapshot("HoneyGain Me", true, Some(StateValue::Text("me@example.com".into()))),
        snapshot("HoneyGain balances", false, Some(StateValue::Number(Number::from(150)))),
        snapshot("HoneyGain stats today", true, None),
    ]);

    // Act
    let text = render_human(&report);

    // Assert
    let lines: Vec<_> = text.lines().collect();
    assert_eq!(lines[0], "=== HoneyGain Poll #4 ===");
    assert_eq!(lines[1], "Time:       2026-02-15T08:30:00+00:00");
    assert_eq!(lines[2], "Sensors:    2 available, 1 unavailable (120 ms)");
    assert_eq!(lines[3], "  [ok] HoneyGain Me           me@example.com");
    assert_eq!(lines[4], "  [--] HoneyGain balances     150");
    assert_eq!(lines[5], "  [ok] HoneyGain stats today  n/a");
    assert_eq!(lines.len(), 6);
}

#[test]
fn state_label_formats_numbers_plainly() {
    let float = Number::from_f64(3100.5).expect("finite");
    let sensor = snapshot("HoneyGain balances", true, Some(StateValue::Number(float)));

    assert_eq!(state_label(&sensor), "3100.5");
}
