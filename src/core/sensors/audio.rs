//! Microphone array and sound-event correlation.
//!
//! Eight microphones sit at fixed points of the frame. Each simulated sound
//! raises the level of every microphone within range, and `triangulate`
//! estimates where the sound came from using the current levels.

use std::collections::{HashMap, VecDeque};
use std::time::Duration;

use chrono::Utc;
use rand::Rng;
use serde::Serialize;

use super::{random_location, FRAME_HEIGHT, FRAME_WIDTH};
use crate::core::bus::EventBus;
use crate::core::events::{DashboardEvent, Location, SoundEvent, SoundKind};

const RECENT_LIMIT: usize = 50;
/// Share of listening intervals that produce a sound event.
pub const EVENT_PROBABILITY: f64 = 0.3;
/// Microphones farther than this from a sound do not hear it.
pub const MIC_RANGE: f64 = 200.0;
/// Level above which a microphone counts as detecting.
const DETECT_THRESHOLD: f64 = 0.3;
/// Level below which a decaying microphone stops detecting.
const SILENCE_THRESHOLD: f64 = 0.1;
/// Per-frame level decay at 60 frames per second.
const DECAY_PER_FRAME: f64 = 0.95;
const FRAMES_PER_SEC: f64 = 60.0;

/// Mic placement as fractions of the frame.
const MIC_LAYOUT: [(f64, f64); 8] = [
    (0.15, 0.2),
    (0.85, 0.2),
    (0.15, 0.8),
    (0.85, 0.8),
    (0.5, 0.15),
    (0.5, 0.85),
    (0.25, 0.5),
    (0.75, 0.5),
];

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Microphone {
    pub id: String,
    pub location: Location,
    /// 0.7..1.0
    pub sensitivity: f64,
    pub level: f64,
    pub detecting: bool,
}

impl Microphone {
    pub fn new(id: impl Into<String>, location: Location, sensitivity: f64) -> Self {
        Self {
            id: id.into(),
            location,
            sensitivity,
            level: 0.0,
            detecting: false,
        }
    }

    /// Register a sound of `intensity` at `source`. Levels only ever rise here.
    fn hear(&mut self, source: Location, intensity: f64) {
        let distance = source.distance_to(self.location);
        if distance >= MIC_RANGE {
            return;
        }
        let strength = (1.0 - distance / MIC_RANGE) * intensity * self.sensitivity;
        self.level = self.level.max(strength);
        self.detecting = strength > DETECT_THRESHOLD;
    }
}

/// Estimated sound origin from the microphone levels.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SourceEstimate {
    pub location: Location,
    /// Percentage, capped at 99
    pub confidence: f64,
}

pub struct AudioCorrelator {
    microphones: Vec<Microphone>,
    listening: bool,
    /// Newest first
    recent: VecDeque<SoundEvent>,
    counts: HashMap<SoundKind, u32>,
    next_id: u64,
}

impl AudioCorrelator {
    /// Build the standard eight-microphone array with random sensitivities.
    pub fn new<R: Rng>(rng: &mut R) -> Self {
        let microphones = MIC_LAYOUT
            .iter()
            .enumerate()
            .map(|(i, (fx, fy))| {
                Microphone::new(
                    format!("mic_{}", i + 1),
                    Location::new(fx * FRAME_WIDTH, fy * FRAME_HEIGHT),
                    rng.gen_range(0.7..1.0),
                )
            })
            .collect();
        Self::with_microphones(microphones)
    }

    pub fn with_microphones(microphones: Vec<Microphone>) -> Self {
        Self {
            microphones,
            listening: true,
            recent: VecDeque::new(),
            counts: HashMap::new(),
            next_id: 0,
        }
    }

    /// Called on every listening interval; produces an event some of the time.
    pub fn listen<R: Rng>(&mut self, bus: &EventBus, rng: &mut R) -> Option<SoundEvent> {
        if !self.listening || rng.gen::<f64>() >= EVENT_PROBABILITY {
            return None;
        }
        Some(self.simulate_event(bus, rng))
    }

    /// Fabricate one sound event and publish it. Drilling and glass are also
    /// published as suspicious sounds.
    pub fn simulate_event<R: Rng>(&mut self, bus: &EventBus, rng: &mut R) -> SoundEvent {
        let kinds = SoundKind::all();
        self.next_id += 1;
        let event = SoundEvent {
            id: self.next_id,
            kind: kinds[rng.gen_range(0..kinds.len())],
            location: random_location(rng, 50.0),
            duration: rng.gen_range(0.5..5.0),
            intensity: rng.gen_range(0.3..1.0),
            confidence: rng.gen_range(70.0..99.0),
            timestamp: Utc::now(),
        };
        self.record(event.clone());

        bus.emit(DashboardEvent::AudioEventDetected(event.clone()));
        if event.kind.is_suspicious() {
            bus.emit(DashboardEvent::SuspiciousSound(event.clone()));
        }
        event
    }

    fn record(&mut self, event: SoundEvent) {
        for mic in &mut self.microphones {
            mic.hear(event.location, event.intensity);
        }
        *self.counts.entry(event.kind).or_insert(0) += 1;
        self.recent.push_front(event);
        self.recent.truncate(RECENT_LIMIT);
    }

    /// Let microphone levels fall off over `elapsed`.
    pub fn decay(&mut self, elapsed: Duration) {
        let factor = DECAY_PER_FRAME.powf(elapsed.as_secs_f64() * FRAMES_PER_SEC);
        for mic in &mut self.microphones {
            mic.level *= factor;
            if mic.level < SILENCE_THRESHOLD {
                mic.detecting = false;
            }
        }
    }

    /// Level-squared weighted centroid of the microphone positions. None while
    /// every microphone is silent.
    pub fn triangulate(&self) -> Option<SourceEstimate> {
        let (mut x, mut y, mut total) = (0.0, 0.0, 0.0);
        for mic in &self.microphones {
            let weight = mic.level * mic.level;
            x += mic.location.x * weight;
            y += mic.location.y * weight;
            total += weight;
        }
        if total <= 0.0 {
            return None;
        }
        Some(SourceEstimate {
            location: Location::new(x / total, y / total),
            confidence: (total * 100.0).min(99.0),
        })
    }

    pub fn microphones(&self) -> &[Microphone] {
        &self.microphones
    }

    pub fn set_listening(&mut self, listening: bool) {
        self.listening = listening;
    }

    pub fn is_listening(&self) -> bool {
        self.listening
    }

    pub fn count(&self, kind: SoundKind) -> u32 {
        self.counts.get(&kind).copied().unwrap_or(0)
    }

    pub fn recent(&self) -> impl Iterator<Item = &SoundEvent> {
        self.recent.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::events::Topic;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use std::cell::RefCell;
    use std::rc::Rc;

    fn counter(bus: &EventBus, topic: Topic) -> Rc<RefCell<u32>> {
        let hits = Rc::new(RefCell::new(0));
        let sink = Rc::clone(&hits);
        bus.subscribe(topic, move |_| {
            *sink.borrow_mut() += 1;
            Ok(())
        });
        hits
    }

    fn pair() -> AudioCorrelator {
        AudioCorrelator::with_microphones(vec![
            Microphone::new("left", Location::new(100.0, 300.0), 1.0),
            Microphone::new("right", Location::new(300.0, 300.0), 1.0),
        ])
    }

    fn sound(x: f64, y: f64, intensity: f64) -> SoundEvent {
        SoundEvent {
            id: 1,
            kind: SoundKind::Footsteps,
            location: Location::new(x, y),
            duration: 1.0,
            intensity,
            confidence: 80.0,
            timestamp: Utc::now(),
        }
    }

    #[test]
    fn test_standard_array_layout() {
        let mut rng = StdRng::seed_from_u64(4);
        let audio = AudioCorrelator::new(&mut rng);
        let mics = audio.microphones();
        assert_eq!(mics.len(), 8);
        assert_eq!(mics[0].id, "mic_1");
        assert!(mics[0].location.distance_to(Location::new(120.0, 120.0)) < 1e-9);
        assert!(mics.iter().all(|m| (0.7..1.0).contains(&m.sensitivity)));
        assert!(mics.iter().all(|m| m.level == 0.0 && !m.detecting));
        assert!(audio.triangulate().is_none());
    }

    #[test]
    fn test_nearby_mics_pick_up_sound() {
        let mut audio = pair();
        audio.record(sound(150.0, 300.0, 1.0));

        let [left, right] = audio.microphones() else {
            panic!("expected two microphones");
        };
        // 50 px away: (1 - 50/200) * 1.0 * 1.0
        assert!((left.level - 0.75).abs() < 1e-9);
        assert!(left.detecting);
        // 150 px away: 0.25, below the detection threshold
        assert!((right.level - 0.25).abs() < 1e-9);
        assert!(!right.detecting);
    }

    #[test]
    fn test_out_of_range_sound_is_ignored() {
        let mut audio = pair();
        audio.record(sound(700.0, 300.0, 1.0));
        assert!(audio.microphones().iter().all(|m| m.level == 0.0));
        assert!(audio.triangulate().is_none());
    }

    #[test]
    fn test_triangulate_weights_by_level_squared() {
        let mut audio = pair();
        audio.record(sound(150.0, 300.0, 1.0));

        let estimate = audio.triangulate().unwrap();
        // weights 0.5625 and 0.0625
        let expected_x = (100.0 * 0.5625 + 300.0 * 0.0625) / 0.625;
        assert!((estimate.location.x - expected_x).abs() < 1e-9);
        assert!((estimate.location.y - 300.0).abs() < 1e-9);
        assert!((estimate.confidence - 62.5).abs() < 1e-9);
    }

    #[test]
    fn test_confidence_is_capped() {
        let mut audio = pair();
        audio.record(sound(100.0, 300.0, 1.0));
        audio.record(sound(300.0, 300.0, 1.0));
        assert_eq!(audio.triangulate().unwrap().confidence, 99.0);
    }

    #[test]
    fn test_decay_silences_mics() {
        let mut audio = pair();
        audio.record(sound(150.0, 300.0, 1.0));
        let before = audio.microphones()[0].level;

        audio.decay(Duration::from_millis(100));
        let after = audio.microphones()[0].level;
        assert!(after < before);
        assert!(audio.microphones()[0].detecting);

        audio.decay(Duration::from_secs(2));
        assert!(audio.microphones().iter().all(|m| !m.detecting));
    }

    #[test]
    fn test_suspicious_kinds_are_escalated() {
        let bus = EventBus::new();
        let detected = counter(&bus, Topic::AudioEventDetected);
        let suspicious = counter(&bus, Topic::SuspiciousSound);
        let mut rng = StdRng::seed_from_u64(21);
        let mut audio = AudioCorrelator::new(&mut rng);

        let mut expected_suspicious = 0;
        for _ in 0..200 {
            let event = audio.simulate_event(&bus, &mut rng);
            if event.kind.is_suspicious() {
                expected_suspicious += 1;
            }
            assert!((0.5..5.0).contains(&event.duration));
        }

        assert_eq!(*detected.borrow(), 200);
        assert_eq!(*suspicious.borrow(), expected_suspicious);
        assert!(expected_suspicious > 0);
        let total: u32 = SoundKind::all().iter().map(|k| audio.count(*k)).sum();
        assert_eq!(total, 200);
        assert_eq!(audio.recent().count(), RECENT_LIMIT);
        assert!(audio.triangulate().is_some());
    }

    #[test]
    fn test_muted_correlator_stays_quiet() {
        let bus = EventBus::new();
        let detected = counter(&bus, Topic::AudioEventDetected);
        let mut rng = StdRng::seed_from_u64(5);
        let mut audio = AudioCorrelator::new(&mut rng);
        audio.set_listening(false);
        assert!(!audio.is_listening());

        for _ in 0..50 {
            assert!(audio.listen(&bus, &mut rng).is_none());
        }
        assert_eq!(*detected.borrow(), 0);
    }

    #[test]
    fn test_listen_fires_some_of_the_time() {
        let bus = EventBus::new();
        let mut rng = StdRng::seed_from_u64(99);
        let mut audio = AudioCorrelator::new(&mut rng);
        let fired = (0..500).filter(|_| audio.listen(&bus, &mut rng).is_some()).count();
        assert!(fired > 50 && fired < 300, "fired {fired} times");
    }
}
