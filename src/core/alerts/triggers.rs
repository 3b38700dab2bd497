// Trigger evaluation: which bus events raise an alert, and with what text.
//
// Each trigger inspects one event and returns the alert to raise, if any.

use crate::core::events::{DashboardEvent, Detection, LightAdjustment, SoundEvent, Threat, Topic};
use crate::core::model::{Category, NewAlert, Source};

/// Topics the alert subscriber listens on.
pub const ALERT_TOPICS: &[Topic] = &[
    Topic::DangerDetected,
    Topic::SuspiciousDetected,
    Topic::SuspiciousSound,
    Topic::ThreatDetected,
    Topic::LightAdjusted,
];

/// Evaluate the trigger for `event`.
/// Returns Some(alert) if the event warrants one, None otherwise.
pub fn evaluate_trigger(event: &DashboardEvent) -> Option<NewAlert> {
    let alert = match event {
        DashboardEvent::DangerDetected(detection) => danger_detected(detection),
        DashboardEvent::SuspiciousDetected(detection) => suspicious_material(detection),
        DashboardEvent::SuspiciousSound(sound) => suspicious_sound(sound),
        DashboardEvent::ThreatDetected(threat) => threat_detected(threat),
        DashboardEvent::LightAdjusted(adjustment) => adaptive_lighting(adjustment)?,
        _ => return None,
    };
    Some(alert.with_payload(event.clone()))
}

fn danger_detected(detection: &Detection) -> NewAlert {
    NewAlert::new(
        Category::Critical,
        Source::Hyperspectral,
        "Hazardous material detected!",
        format!(
            "{} detected at ({:.0}, {:.0})",
            detection.material.name, detection.location.x, detection.location.y
        ),
    )
}

fn suspicious_material(detection: &Detection) -> NewAlert {
    NewAlert::new(
        Category::Warning,
        Source::Hyperspectral,
        "Suspicious material",
        format!(
            "{} detected - confidence {:.1}%",
            detection.material.name, detection.confidence
        ),
    )
}

fn suspicious_sound(sound: &SoundEvent) -> NewAlert {
    NewAlert::new(
        Category::Warning,
        Source::Audio,
        "Suspicious sound",
        format!(
            "{} sound detected - duration {:.1} s",
            sound.kind.label(),
            sound.duration
        ),
    )
}

fn threat_detected(threat: &Threat) -> NewAlert {
    NewAlert::new(
        Category::Info,
        Source::Wargaming,
        "Threat detected in simulation",
        format!(
            "Blue-AI detected a threat using tactic \"{}\"",
            threat.tactic.name
        ),
    )
}

/// Only adaptive adjustments are worth an alert; resets and manual tweaks are not.
fn adaptive_lighting(adjustment: &LightAdjustment) -> Option<NewAlert> {
    if !adjustment.reason.is_adaptive() {
        return None;
    }
    Some(NewAlert::new(
        Category::Info,
        Source::Illuminance,
        "Adaptive lighting adjustment",
        format!(
            "{} adjusted from {:.0}% to {:.0}%",
            adjustment.pole_id, adjustment.old_intensity, adjustment.new_intensity
        ),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::events::{
        AdjustReason, Location, Material, MaterialStatus, SoundKind, Tactic, ThreatLevel,
    };
    use chrono::Utc;

    fn detection(status: MaterialStatus) -> Detection {
        Detection {
            id: 1,
            material: Material {
                name: "Explosive",
                signature: "explosive",
                status,
            },
            confidence: 91.23,
            location: Location::new(120.4, 80.6),
            timestamp: Utc::now(),
        }
    }

    fn adjustment(reason: AdjustReason) -> LightAdjustment {
        LightAdjustment {
            pole_id: "pole_1_2".to_string(),
            old_intensity: 70.2,
            new_intensity: 82.7,
            reason,
        }
    }

    #[test]
    fn test_danger_is_critical_with_location() {
        let event = DashboardEvent::DangerDetected(detection(MaterialStatus::Danger));
        let alert = evaluate_trigger(&event).unwrap();
        assert_eq!(alert.category, Category::Critical);
        assert_eq!(alert.source, Source::Hyperspectral);
        assert_eq!(alert.description, "Explosive detected at (120, 81)");
        assert_eq!(alert.payload, Some(event));
    }

    #[test]
    fn test_suspicious_material_reports_confidence() {
        let event = DashboardEvent::SuspiciousDetected(detection(MaterialStatus::Suspicious));
        let alert = evaluate_trigger(&event).unwrap();
        assert_eq!(alert.category, Category::Warning);
        assert!(alert.description.contains("91.2"));
    }

    #[test]
    fn test_suspicious_sound_is_audio_warning() {
        let event = DashboardEvent::SuspiciousSound(SoundEvent {
            id: 3,
            kind: SoundKind::Drilling,
            location: Location::new(0.0, 0.0),
            duration: 2.34,
            intensity: 0.5,
            confidence: 80.0,
            timestamp: Utc::now(),
        });
        let alert = evaluate_trigger(&event).unwrap();
        assert_eq!(alert.source, Source::Audio);
        assert_eq!(alert.description, "drilling sound detected - duration 2.3 s");
    }

    #[test]
    fn test_threat_is_info() {
        let event = DashboardEvent::ThreatDetected(Threat {
            id: 1,
            round: 4,
            tactic: Tactic {
                name: "Hidden Path",
                difficulty: 2.0,
            },
            location: Location::new(1.0, 1.0),
            concealment: 0.5,
            detected: true,
        });
        let alert = evaluate_trigger(&event).unwrap();
        assert_eq!(alert.category, Category::Info);
        assert!(alert.description.contains("\"Hidden Path\""));
    }

    #[test]
    fn test_only_adaptive_lighting_alerts() {
        let adaptive = DashboardEvent::LightAdjusted(adjustment(AdjustReason::Adaptive(ThreatLevel::High)));
        let alert = evaluate_trigger(&adaptive).unwrap();
        assert_eq!(alert.description, "pole_1_2 adjusted from 70% to 83%");

        let reset = DashboardEvent::LightAdjusted(adjustment(AdjustReason::Reset));
        assert!(evaluate_trigger(&reset).is_none());
        let silent = DashboardEvent::LightAdjusted(adjustment(AdjustReason::Silent));
        assert!(evaluate_trigger(&silent).is_none());
    }

    #[test]
    fn test_untracked_topics_raise_nothing() {
        assert!(evaluate_trigger(&DashboardEvent::ScanStarted).is_none());
        assert!(evaluate_trigger(&DashboardEvent::WargameReset).is_none());
        for topic in ALERT_TOPICS {
            assert_ne!(*topic, Topic::ScanComplete);
        }
    }
}
