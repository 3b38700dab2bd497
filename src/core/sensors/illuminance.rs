use std::collections::VecDeque;
use std::time::{Duration, Instant};

use rand::Rng;

use super::{random_location, FRAME_HEIGHT, FRAME_WIDTH};
use crate::core::bus::EventBus;
use crate::core::events::{AdjustReason, DashboardEvent, LightAdjustment, Location, ThreatLevel};

const GRID_X: usize = 4;
const GRID_Y: usize = 3;
/// Poles farther than this from the activity are left alone.
pub const RESPONSE_RADIUS: f64 = 200.0;
/// How long adaptive boosts last before poles return to base intensity.
pub const RESTORE_AFTER: Duration = Duration::from_secs(10);
const ADJUSTMENT_LOG_LIMIT: usize = 50;

#[derive(Debug, Clone)]
pub struct LightPole {
    pub id: String,
    pub location: Location,
    pub base_intensity: f64,
    pub intensity: f64,
}

struct PendingRestore {
    due: Instant,
    pole_ids: Vec<String>,
}

pub struct IlluminanceController {
    poles: Vec<LightPole>,
    pending: Vec<PendingRestore>,
    /// Newest first
    adjustments: VecDeque<LightAdjustment>,
}

impl IlluminanceController {
    /// Lay out a 4x3 grid of poles with a little positional jitter.
    pub fn new<R: Rng>(rng: &mut R) -> Self {
        let mut poles = Vec::with_capacity(GRID_X * GRID_Y);
        for i in 0..GRID_X {
            for j in 0..GRID_Y {
                let x = FRAME_WIDTH / (GRID_X + 1) as f64 * (i + 1) as f64;
                let y = FRAME_HEIGHT / (GRID_Y + 1) as f64 * (j + 1) as f64;
                let base = rng.gen_range(60.0..80.0);
                poles.push(LightPole {
                    id: format!("pole_{i}_{j}"),
                    location: Location::new(x + rng.gen_range(-20.0..20.0), y + rng.gen_range(-20.0..20.0)),
                    base_intensity: base,
                    intensity: base,
                });
            }
        }
        Self::with_poles(poles)
    }

    pub fn with_poles(poles: Vec<LightPole>) -> Self {
        Self {
            poles,
            pending: Vec::new(),
            adjustments: VecDeque::new(),
        }
    }

    /// Set a pole's intensity and publish the change. Unknown poles are ignored.
    pub fn adjust_pole(&mut self, bus: &EventBus, pole_id: &str, intensity: f64, reason: AdjustReason) -> bool {
        let Some(pole) = self.poles.iter_mut().find(|p| p.id == pole_id) else {
            return false;
        };
        let adjustment = LightAdjustment {
            pole_id: pole.id.clone(),
            old_intensity: pole.intensity,
            new_intensity: intensity,
            reason,
        };
        pole.intensity = intensity;
        log::debug!(
            "{}: {:.0}% -> {:.0}% ({})",
            adjustment.pole_id,
            adjustment.old_intensity,
            adjustment.new_intensity,
            reason
        );

        self.adjustments.push_front(adjustment.clone());
        self.adjustments.truncate(ADJUSTMENT_LOG_LIMIT);
        bus.emit(DashboardEvent::LightAdjusted(adjustment));
        true
    }

    /// Nudge a pole by `amount` percent, clamped to 0..=100, without alerting anyone.
    pub fn silent_adjust(&mut self, bus: &EventBus, pole_id: &str, amount: f64) -> bool {
        let Some(current) = self.poles.iter().find(|p| p.id == pole_id).map(|p| p.intensity) else {
            return false;
        };
        let target = (current + amount).clamp(0.0, 100.0);
        self.adjust_pole(bus, pole_id, target, AdjustReason::Silent)
    }

    /// Brighten every pole near `location`, scaled by distance, and schedule
    /// the return to base intensity. Returns how many poles were adjusted.
    pub fn adaptive_response(&mut self, bus: &EventBus, location: Location, level: ThreatLevel, now: Instant) -> usize {
        let targets: Vec<(String, f64)> = self
            .poles
            .iter()
            .filter_map(|pole| {
                let distance = location.distance_to(pole.location);
                if distance >= RESPONSE_RADIUS {
                    return None;
                }
                let factor = 1.0 - distance / RESPONSE_RADIUS;
                let target = (pole.base_intensity + level.boost() * factor).min(100.0);
                Some((pole.id.clone(), target))
            })
            .collect();

        for (pole_id, target) in &targets {
            self.adjust_pole(bus, pole_id, *target, AdjustReason::Adaptive(level));
        }
        if !targets.is_empty() {
            self.pending.push(PendingRestore {
                due: now + RESTORE_AFTER,
                pole_ids: targets.iter().map(|(id, _)| id.clone()).collect(),
            });
        }
        targets.len()
    }

    /// Return poles whose adaptive boost has run out to base intensity.
    pub fn restore_due(&mut self, bus: &EventBus, now: Instant) -> usize {
        let (due, waiting): (Vec<PendingRestore>, Vec<PendingRestore>) =
            self.pending.drain(..).partition(|p| p.due <= now);
        self.pending = waiting;

        let mut restored = 0;
        for restore in due {
            for pole_id in restore.pole_ids {
                let base = self
                    .poles
                    .iter()
                    .find(|p| p.id == pole_id)
                    .map(|p| p.base_intensity);
                if let Some(base) = base {
                    self.adjust_pole(bus, &pole_id, base, AdjustReason::Reset);
                    restored += 1;
                }
            }
        }
        restored
    }

    /// Demo hook: fabricate suspicious activity somewhere in the frame and respond to it.
    pub fn simulate_suspicious_activity<R: Rng>(&mut self, bus: &EventBus, rng: &mut R, now: Instant) -> usize {
        let location = random_location(rng, 100.0);
        bus.emit(DashboardEvent::SuspiciousActivity(location));
        self.adaptive_response(bus, location, ThreatLevel::Medium, now)
    }

    pub fn poles(&self) -> &[LightPole] {
        &self.poles
    }

    pub fn adjustments(&self) -> impl Iterator<Item = &LightAdjustment> {
        self.adjustments.iter()
    }

    pub fn average_intensity(&self) -> f64 {
        if self.poles.is_empty() {
            return 0.0;
        }
        self.poles.iter().map(|p| p.intensity).sum::<f64>() / self.poles.len() as f64
    }
}
