//! Topic classification
//!
//! Maps an event topic onto the closed set of categories the client knows how
//! to display. Rules are checked in order and the first match wins, so exact
//! system topics beat substring rules and `metrics` beats `state`.

/// Topic of the snapshot sent right after connecting
pub const INITIAL_STATE_TOPIC: &str = "system/initial-state";
/// Topic of the periodic heartbeat
pub const KEEPALIVE_TOPIC: &str = "system/keepalive";

/// Display category of an event
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TopicKind {
    /// Snapshot of all devices
    InitialState,
    /// Heartbeat carrying MQTT availability
    Keepalive,
    /// Temperature / humidity / power readings
    Metrics,
    /// A single device changed state
    DeviceState,
    /// Anything else
    Other,
}

#[derive(Debug, Clone, Copy)]
enum TopicPattern {
    Exact(&'static str),
    Contains(&'static str),
}

impl TopicPattern {
    fn matches(self, topic: &str) -> bool {
        match self {
            Self::Exact(expected) => topic == expected,
            Self::Contains(needle) => topic.contains(needle),
        }
    }
}

const TOPIC_RULES: [(TopicPattern, TopicKind); 4] = [
    (TopicPattern::Exact(INITIAL_STATE_TOPIC), TopicKind::InitialState),
    (TopicPattern::Exact(KEEPALIVE_TOPIC), TopicKind::Keepalive),
    (TopicPattern::Contains("metrics"), TopicKind::Metrics),
    (TopicPattern::Contains("state"), TopicKind::DeviceState),
];

impl TopicKind {
    /// Classify a topic
    pub fn classify(topic: &str) -> Self {
        TOPIC_RULES
            .iter()
            .find(|(pattern, _)| pattern.matches(topic))
            .map(|(_, kind)| *kind)
            .unwrap_or(Self::Other)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exact_system_topics() {
        assert_eq!(
            TopicKind::classify("system/initial-state"),
            TopicKind::InitialState
        );
        assert_eq!(TopicKind::classify("system/keepalive"), TopicKind::Keepalive);
    }

    #[test]
    fn test_substring_topics() {
        assert_eq!(
            TopicKind::classify("home/livingroom/metrics"),
            TopicKind::Metrics
        );
        assert_eq!(TopicKind::classify("home/lamp/state"), TopicKind::DeviceState);
    }

    #[test]
    fn test_metrics_wins_over_state() {
        assert_eq!(TopicKind::classify("home/state/metrics"), TopicKind::Metrics);
        assert_eq!(TopicKind::classify("statemetrics"), TopicKind::Metrics);
    }

    #[test]
    fn test_initial_state_is_exact_only() {
        // Contains "state" but is not the exact snapshot topic
        assert_eq!(
            TopicKind::classify("system/initial-state/extra"),
            TopicKind::DeviceState
        );
    }

    #[test]
    fn test_fallback() {
        assert_eq!(TopicKind::classify("system/connection"), TopicKind::Other);
        assert_eq!(TopicKind::classify(""), TopicKind::Other);
    }
}
