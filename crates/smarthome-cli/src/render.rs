//! Human-readable rendering of events and API responses

use serde_json::Value;
use smarthome_client::{Device, Event, Metrics, TopicKind};

/// Indentation of detail lines under an event header
const DETAIL_INDENT: &str = "           ";

/// Shown for payload fields that are absent
const MISSING: &str = "-";

/// Render an event as text lines
///
/// Multi-line renderings end with an empty separator line; keepalive and
/// unknown events are a single line.
pub fn render_event(event: &Event) -> Vec<String> {
    let ts = event.display_time();

    match event.kind() {
        TopicKind::InitialState => {
            let mut lines = vec![format!("[{}] 📋 Initial State:", ts)];
            if let Some(devices) = event.get("devices").and_then(Value::as_array) {
                for device in devices {
                    lines.push(format!(
                        "{}- {} ({}): {}",
                        DETAIL_INDENT,
                        field(device, "name"),
                        field(device, "id"),
                        on_off(is_on(device))
                    ));
                }
            }
            lines.push(String::new());
            lines
        }
        TopicKind::Keepalive => {
            let mqtt = if event.get_bool("mqtt_available").unwrap_or(false) {
                "✅"
            } else {
                "❌"
            };
            vec![format!("[{}] 💓 Keepalive: MQTT {}", ts, mqtt)]
        }
        TopicKind::Metrics => vec![
            format!("[{}] 📊 Metrics:", ts),
            format!("{}- Temp: {}°C", DETAIL_INDENT, field(&event.payload, "temp")),
            format!(
                "{}- Humidity: {}%",
                DETAIL_INDENT,
                field(&event.payload, "humidity")
            ),
            format!("{}- Power: {}W", DETAIL_INDENT, field(&event.payload, "power")),
            String::new(),
        ],
        TopicKind::DeviceState => {
            let name = event.get_str("name").unwrap_or("Unknown");
            vec![
                format!("[{}] 💡 Device State:", ts),
                format!(
                    "{}- {} is now {}",
                    DETAIL_INDENT,
                    name,
                    on_off(is_on(&event.payload))
                ),
                String::new(),
            ]
        }
        TopicKind::Other => vec![format!("[{}] 📨 Event: {}", ts, event.topic)],
    }
}

/// One-line metrics summary
pub fn format_metrics(metrics: &Metrics) -> String {
    format!(
        "Temp: {}°C, Humidity: {}%, Power: {}W",
        metrics.temp, metrics.humidity, metrics.power
    )
}

/// One-line device summary
pub fn format_device(device: &Device) -> String {
    format!(
        "{} {} ({})",
        if device.is_on { "🟢" } else { "⚫" },
        device.name,
        device.id
    )
}

/// On/off label with indicator
pub fn on_off(on: bool) -> &'static str {
    if on {
        "🟢 ON"
    } else {
        "⚫ OFF"
    }
}

fn is_on(value: &Value) -> bool {
    value.get("isOn").and_then(Value::as_bool).unwrap_or(false)
}

fn field(value: &Value, key: &str) -> String {
    value
        .get(key)
        .map(format_json_value)
        .unwrap_or_else(|| MISSING.to_string())
}

fn format_json_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Null => "null".to_string(),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn event(topic: &str, payload: Value) -> Event {
        Event::new(topic, payload, Some("2024-01-01T10:00:00".to_string()))
    }

    #[test]
    fn test_keepalive_is_one_line() {
        let up = render_event(&event("system/keepalive", json!({"mqtt_available": true})));
        assert_eq!(up, vec!["[10:00:00] 💓 Keepalive: MQTT ✅"]);

        let down = render_event(&event("system/keepalive", json!({"mqtt_available": false})));
        assert_eq!(down, vec!["[10:00:00] 💓 Keepalive: MQTT ❌"]);

        let missing = render_event(&event("system/keepalive", json!({})));
        assert_eq!(missing.len(), 1);
        assert!(missing[0].ends_with('❌'));
    }

    #[test]
    fn test_metrics_values_verbatim() {
        let lines = render_event(&event(
            "home/livingroom/metrics",
            json!({"temp": 22.75, "humidity": 41, "power": 1500}),
        ));
        assert_eq!(
            lines,
            vec![
                "[10:00:00] 📊 Metrics:",
                "           - Temp: 22.75°C",
                "           - Humidity: 41%",
                "           - Power: 1500W",
                "",
            ]
        );
    }

    #[test]
    fn test_metrics_beats_state() {
        let lines = render_event(&event(
            "home/state/metrics",
            json!({"temp": 20, "name": "Lamp", "isOn": true}),
        ));
        assert_eq!(lines[0], "[10:00:00] 📊 Metrics:");
    }

    #[test]
    fn test_device_state() {
        let lines = render_event(&event(
            "home/lamp/state",
            json!({"name": "Lamp", "isOn": true}),
        ));
        assert_eq!(
            lines,
            vec![
                "[10:00:00] 💡 Device State:",
                "           - Lamp is now 🟢 ON",
                "",
            ]
        );

        let unnamed = render_event(&event("home/x/state", json!({})));
        assert_eq!(unnamed[1], "           - Unknown is now ⚫ OFF");
    }

    #[test]
    fn test_initial_state_lists_devices() {
        let lines = render_event(&event(
            "system/initial-state",
            json!({"devices": [
                {"id": "lamp", "name": "Lamp", "isOn": true},
                {"id": "fan", "name": "Fan", "isOn": false}
            ]}),
        ));
        assert_eq!(
            lines,
            vec![
                "[10:00:00] 📋 Initial State:",
                "           - Lamp (lamp): 🟢 ON",
                "           - Fan (fan): ⚫ OFF",
                "",
            ]
        );
    }

    #[test]
    fn test_unknown_topic() {
        let mut e = event("system/connection", json!({}));
        e.timestamp = None;
        assert_eq!(render_event(&e), vec!["[?] 📨 Event: system/connection"]);
    }

    #[test]
    fn test_format_helpers() {
        let metrics = Metrics {
            temp: 21.5,
            humidity: 40.0,
            power: 120.0,
            ts: None,
        };
        assert_eq!(
            format_metrics(&metrics),
            "Temp: 21.5°C, Humidity: 40%, Power: 120W"
        );
        assert_eq!(
            format_device(&Device::new("lamp", "Lamp", false)),
            "⚫ Lamp (lamp)"
        );
    }
}
