//! Typed event payloads carried on the dashboard bus.
//!
//! Every topic has exactly one `DashboardEvent` variant, so subscribers match
//! on the payload instead of trusting a loosely shaped object.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::Serialize;

/// A point on a sensor frame, in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Location {
    pub x: f64,
    pub y: f64,
}

impl Location {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn distance_to(&self, other: Location) -> f64 {
        ((other.x - self.x).powi(2) + (other.y - self.y).powi(2)).sqrt()
    }
}

/// Hazard classification of a scanned material.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum MaterialStatus {
    Safe,
    Suspicious,
    Danger,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Material {
    pub name: &'static str,
    pub signature: &'static str,
    pub status: MaterialStatus,
}

/// One material identified by the hyperspectral scanner.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Detection {
    pub id: u64,
    pub material: Material,
    /// Percentage in 85..99
    pub confidence: f64,
    pub location: Location,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScanReport {
    pub detections: Vec<Detection>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ThreatLevel {
    Low,
    Medium,
    High,
}

impl ThreatLevel {
    /// Intensity boost (in percent) applied to poles right next to the activity.
    pub fn boost(&self) -> f64 {
        match self {
            Self::Low => 10.0,
            Self::Medium => 15.0,
            Self::High => 20.0,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
        }
    }
}

/// Why a light pole changed intensity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum AdjustReason {
    Adaptive(ThreatLevel),
    Reset,
    Manual,
    /// Small operator nudge; never raises an alert.
    Silent,
}

impl AdjustReason {
    pub fn is_adaptive(&self) -> bool {
        matches!(self, Self::Adaptive(_))
    }
}

impl fmt::Display for AdjustReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Adaptive(level) => write!(f, "adaptive_{}", level.as_str()),
            Self::Reset => f.write_str("reset"),
            Self::Manual => f.write_str("manual"),
            Self::Silent => f.write_str("silent"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LightAdjustment {
    pub pole_id: String,
    pub old_intensity: f64,
    pub new_intensity: f64,
    pub reason: AdjustReason,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SoundKind {
    Drilling,
    Dragging,
    Footsteps,
    Vehicle,
    Voices,
    Glass,
    Metal,
    Unknown,
}

impl SoundKind {
    pub fn all() -> &'static [SoundKind] {
        &[
            Self::Drilling,
            Self::Dragging,
            Self::Footsteps,
            Self::Vehicle,
            Self::Voices,
            Self::Glass,
            Self::Metal,
            Self::Unknown,
        ]
    }

    /// Drilling and breaking glass get their own alert.
    pub fn is_suspicious(&self) -> bool {
        matches!(self, Self::Drilling | Self::Glass)
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Drilling => "drilling",
            Self::Dragging => "dragging",
            Self::Footsteps => "footsteps",
            Self::Vehicle => "vehicle",
            Self::Voices => "voices",
            Self::Glass => "glass",
            Self::Metal => "metal",
            Self::Unknown => "unknown",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SoundEvent {
    pub id: u64,
    pub kind: SoundKind,
    pub location: Location,
    /// Seconds
    pub duration: f64,
    pub intensity: f64,
    pub confidence: f64,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Tactic {
    pub name: &'static str,
    pub difficulty: f64,
}

/// A concealment attempt by the red team.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Threat {
    pub id: u64,
    pub round: u32,
    pub tactic: Tactic,
    pub location: Location,
    pub concealment: f64,
    pub detected: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Side {
    #[serde(rename = "Red-AI")]
    Red,
    #[serde(rename = "Blue-AI")]
    Blue,
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Red => f.write_str("Red-AI"),
            Self::Blue => f.write_str("Blue-AI"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct RedStats {
    pub success_rate: f64,
    pub attempts: u32,
    pub successes: u32,
    pub tactics_discovered: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct BlueStats {
    pub detection_rate: f64,
    pub detections: u32,
    pub missed_threats: u32,
    pub defenses_evolved: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WargameSummary {
    pub winner: Side,
    pub rounds: u32,
    pub red: RedStats,
    pub blue: BlueStats,
}

/// Named channel on the bus.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Topic {
    DangerDetected,
    SuspiciousDetected,
    ScanStarted,
    ScanComplete,
    LightAdjusted,
    SuspiciousActivity,
    AudioEventDetected,
    SuspiciousSound,
    WargameStarted,
    ThreatDetected,
    WargameEnded,
    WargameReset,
}

impl Topic {
    pub fn all() -> &'static [Topic] {
        &[
            Self::DangerDetected,
            Self::SuspiciousDetected,
            Self::ScanStarted,
            Self::ScanComplete,
            Self::LightAdjusted,
            Self::SuspiciousActivity,
            Self::AudioEventDetected,
            Self::SuspiciousSound,
            Self::WargameStarted,
            Self::ThreatDetected,
            Self::WargameEnded,
            Self::WargameReset,
        ]
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::DangerDetected => "dangerDetected",
            Self::SuspiciousDetected => "suspiciousDetected",
            Self::ScanStarted => "scanStarted",
            Self::ScanComplete => "scanComplete",
            Self::LightAdjusted => "lightAdjusted",
            Self::SuspiciousActivity => "suspiciousActivity",
            Self::AudioEventDetected => "audioEventDetected",
            Self::SuspiciousSound => "suspiciousSound",
            Self::WargameStarted => "wargameStarted",
            Self::ThreatDetected => "threatDetected",
            Self::WargameEnded => "wargameEnded",
            Self::WargameReset => "wargameReset",
        }
    }
}

impl fmt::Display for Topic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "topic", content = "data", rename_all = "camelCase")]
pub enum DashboardEvent {
    DangerDetected(Detection),
    SuspiciousDetected(Detection),
    ScanStarted,
    ScanComplete(ScanReport),
    LightAdjusted(LightAdjustment),
    SuspiciousActivity(Location),
    AudioEventDetected(SoundEvent),
    SuspiciousSound(SoundEvent),
    WargameStarted,
    ThreatDetected(Threat),
    WargameEnded(WargameSummary),
    WargameReset,
}

impl DashboardEvent {
    pub fn topic(&self) -> Topic {
        match self {
            Self::DangerDetected(_) => Topic::DangerDetected,
            Self::SuspiciousDetected(_) => Topic::SuspiciousDetected,
            Self::ScanStarted => Topic::ScanStarted,
            Self::ScanComplete(_) => Topic::ScanComplete,
            Self::LightAdjusted(_) => Topic::LightAdjusted,
            Self::SuspiciousActivity(_) => Topic::SuspiciousActivity,
            Self::AudioEventDetected(_) => Topic::AudioEventDetected,
            Self::SuspiciousSound(_) => Topic::SuspiciousSound,
            Self::WargameStarted => Topic::WargameStarted,
            Self::ThreatDetected(_) => Topic::ThreatDetected,
            Self::WargameEnded(_) => Topic::WargameEnded,
            Self::WargameReset => Topic::WargameReset,
        }
    }
}
