//! Activity timeline: the most recent notable events, newest first.

use std::collections::VecDeque;

use chrono::{DateTime, Utc};
use serde::Serialize;

use super::events::{DashboardEvent, Topic};
use super::model::Category;

pub const DEFAULT_TIMELINE_CAPACITY: usize = 10;

pub const TIMELINE_TOPICS: &[Topic] = &[
    Topic::DangerDetected,
    Topic::SuspiciousSound,
    Topic::ThreatDetected,
];

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TimelineEntry {
    pub time: DateTime<Utc>,
    pub title: String,
    pub description: String,
    pub category: Category,
}

pub struct Timeline {
    entries: VecDeque<TimelineEntry>,
    capacity: usize,
}

impl Timeline {
    pub fn new(capacity: usize) -> Self {
        Self {
            entries: VecDeque::new(),
            capacity: capacity.max(1),
        }
    }

    pub fn push(&mut self, title: impl Into<String>, description: impl Into<String>, category: Category) {
        self.entries.push_front(TimelineEntry {
            time: Utc::now(),
            title: title.into(),
            description: description.into(),
            category,
        });
        self.entries.truncate(self.capacity);
    }

    /// Add an entry for `event` if it belongs on the timeline.
    pub fn record(&mut self, event: &DashboardEvent) -> bool {
        match event {
            DashboardEvent::DangerDetected(detection) => self.push(
                "Warning: hazardous material",
                format!("{} detected", detection.material.name),
                Category::Critical,
            ),
            DashboardEvent::SuspiciousSound(sound) => self.push(
                "Suspicious sound",
                format!("{} sound detected", sound.kind.label()),
                Category::Warning,
            ),
            DashboardEvent::ThreatDetected(threat) => self.push(
                "Threat detected",
                format!("Simulation: tactic \"{}\" detected", threat.tactic.name),
                Category::Success,
            ),
            _ => return false,
        }
        true
    }

    pub fn entries(&self) -> impl Iterator<Item = &TimelineEntry> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Default for Timeline {
    fn default() -> Self {
        Self::new(DEFAULT_TIMELINE_CAPACITY)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::events::{Location, SoundEvent, SoundKind};

    fn sound(kind: SoundKind) -> DashboardEvent {
        DashboardEvent::SuspiciousSound(SoundEvent {
            id: 1,
            kind,
            location: Location::new(5.0, 5.0),
            duration: 1.0,
            intensity: 0.4,
            confidence: 90.0,
            timestamp: Utc::now(),
        })
    }

    #[test]
    fn test_keeps_only_latest_entries() {
        let mut timeline = Timeline::default();
        for n in 0..15 {
            timeline.push(format!("event {n}"), "", Category::Info);
        }
        assert_eq!(timeline.len(), DEFAULT_TIMELINE_CAPACITY);
        let first = timeline.entries().next().unwrap();
        assert_eq!(first.title, "event 14");
        assert_eq!(timeline.entries().last().unwrap().title, "event 5");
    }

    #[test]
    fn test_records_suspicious_sound() {
        let mut timeline = Timeline::default();
        assert!(timeline.record(&sound(SoundKind::Glass)));
        let entry = timeline.entries().next().unwrap();
        assert_eq!(entry.category, Category::Warning);
        assert_eq!(entry.description, "glass sound detected");
    }

    #[test]
    fn test_ignores_other_events() {
        let mut timeline = Timeline::default();
        assert!(!timeline.record(&DashboardEvent::ScanStarted));
        assert!(timeline.is_empty());
    }
}
