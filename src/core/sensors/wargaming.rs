//! Red/blue adversarial simulation.
//!
//! Each round the red team hides a threat using a random tactic and the blue
//! team tries to find it. Blue learns from every detection; red learns from
//! every miss. Detected threats are published on the bus.

use std::collections::VecDeque;

use rand::Rng;
use serde::Serialize;

use super::random_location;
use crate::core::bus::EventBus;
use crate::core::events::{BlueStats, DashboardEvent, RedStats, Side, Tactic, Threat, WargameSummary};

pub const DEFAULT_MAX_ROUNDS: u32 = 100;
const BATTLE_LOG_LIMIT: usize = 50;
const MAX_DETECTION_CHANCE: f64 = 0.95;

pub const TACTICS: [Tactic; 8] = [
    Tactic { name: "Visual Camouflage", difficulty: 1.0 },
    Tactic { name: "Spectral Camouflage", difficulty: 2.0 },
    Tactic { name: "Shadow Exploitation", difficulty: 1.5 },
    Tactic { name: "Distraction", difficulty: 1.2 },
    Tactic { name: "Material Disguise", difficulty: 2.5 },
    Tactic { name: "Precise Timing", difficulty: 1.8 },
    Tactic { name: "Hidden Path", difficulty: 2.0 },
    Tactic { name: "Multi-layer Concealment", difficulty: 3.0 },
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum WargameState {
    Idle,
    Running,
    Paused,
    Finished,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BattleEvent {
    pub side: Side,
    pub round: u32,
    pub message: String,
}

pub struct WargameSimulator {
    state: WargameState,
    round_number: u32,
    max_rounds: u32,
    red: RedStats,
    blue: BlueStats,
    /// Newest first
    battle_log: VecDeque<BattleEvent>,
    next_threat_id: u64,
}

fn initial_red() -> RedStats {
    RedStats {
        success_rate: 45.0,
        ..RedStats::default()
    }
}

fn initial_blue() -> BlueStats {
    BlueStats {
        detection_rate: 55.0,
        ..BlueStats::default()
    }
}

impl WargameSimulator {
    pub fn new(max_rounds: u32) -> Self {
        Self {
            state: WargameState::Idle,
            round_number: 0,
            max_rounds: max_rounds.max(1),
            red: initial_red(),
            blue: initial_blue(),
            battle_log: VecDeque::new(),
            next_threat_id: 0,
        }
    }

    /// Start or restart after a finished run. No-op while already running or paused.
    pub fn start(&mut self, bus: &EventBus) -> bool {
        match self.state {
            WargameState::Running | WargameState::Paused => return false,
            WargameState::Finished => self.clear(),
            WargameState::Idle => {}
        }
        self.state = WargameState::Running;
        log::info!("wargame started ({} rounds)", self.max_rounds);
        bus.emit(DashboardEvent::WargameStarted);
        true
    }

    pub fn toggle_pause(&mut self) -> WargameState {
        self.state = match self.state {
            WargameState::Running => WargameState::Paused,
            WargameState::Paused => WargameState::Running,
            other => other,
        };
        self.state
    }

    pub fn reset(&mut self, bus: &EventBus) {
        self.clear();
        self.state = WargameState::Idle;
        bus.emit(DashboardEvent::WargameReset);
    }

    fn clear(&mut self) {
        self.round_number = 0;
        self.red = initial_red();
        self.blue = initial_blue();
        self.battle_log.clear();
    }

    /// Play one round if the simulation is running. Returns the threat of
    /// that round; the simulation finishes itself after the last round.
    pub fn step<R: Rng>(&mut self, bus: &EventBus, rng: &mut R) -> Option<Threat> {
        if self.state != WargameState::Running {
            return None;
        }
        let threat = self.execute_round(bus, rng);
        self.round_number += 1;
        if self.round_number >= self.max_rounds {
            self.finish(bus);
        }
        Some(threat)
    }

    fn execute_round<R: Rng>(&mut self, bus: &EventBus, rng: &mut R) -> Threat {
        let tactic = TACTICS[rng.gen_range(0..TACTICS.len())];
        self.red.attempts += 1;
        self.next_threat_id += 1;
        let mut threat = Threat {
            id: self.next_threat_id,
            round: self.round_number,
            tactic,
            location: random_location(rng, 100.0),
            concealment: rng.gen_range(0.3..0.9) * tactic.difficulty,
            detected: false,
        };
        self.log_battle(Side::Red, format!("using tactic: {}", tactic.name));

        let chance = self.detection_chance(&tactic);
        if rng.gen::<f64>() < chance {
            threat.detected = true;
            self.blue.detections += 1;
            self.blue.detection_rate = (self.blue.detection_rate + 0.5).min(95.0);
            self.blue.defenses_evolved += 1;
            self.log_battle(Side::Blue, format!("detected! ({:.1}%)", chance * 100.0));
            bus.emit(DashboardEvent::ThreatDetected(threat.clone()));
        } else {
            self.red.successes += 1;
            self.blue.missed_threats += 1;
            self.red.tactics_discovered += 1;
            self.red.success_rate = (self.red.success_rate + 0.3).min(80.0);
            self.blue.detection_rate = (self.blue.detection_rate + 0.2).min(95.0);
            self.log_battle(Side::Red, "concealment succeeded".to_string());
        }

        // The learning nudges above only matter inside the round; the
        // published rates are plain ratios over all attempts.
        let attempts = f64::from(self.red.attempts.max(1));
        self.red.success_rate = f64::from(self.red.successes) / attempts * 100.0;
        self.blue.detection_rate = f64::from(self.blue.detections) / attempts * 100.0;
        threat
    }

    /// Probability that blue finds a threat hidden with `tactic`, capped at 0.95.
    pub fn detection_chance(&self, tactic: &Tactic) -> f64 {
        let base = self.blue.detection_rate / 100.0;
        let penalty = tactic.difficulty * 0.1;
        let bonus = f64::from(self.blue.defenses_evolved) * 0.02;
        (base - penalty + bonus).min(MAX_DETECTION_CHANCE)
    }

    fn finish(&mut self, bus: &EventBus) {
        self.state = WargameState::Finished;
        let winner = if self.blue.detections > self.red.successes {
            Side::Blue
        } else {
            Side::Red
        };
        self.log_battle(winner, format!("simulation over - winner: {winner}"));
        log::info!(
            "wargame finished after {} rounds: {} wins ({} detections / {} concealed)",
            self.round_number,
            winner,
            self.blue.detections,
            self.red.successes
        );
        bus.emit(DashboardEvent::WargameEnded(WargameSummary {
            winner,
            rounds: self.round_number,
            red: self.red,
            blue: self.blue,
        }));
    }

    fn log_battle(&mut self, side: Side, message: String) {
        self.battle_log.push_front(BattleEvent {
            side,
            round: self.round_number,
            message,
        });
        self.battle_log.truncate(BATTLE_LOG_LIMIT);
    }

    pub fn state(&self) -> WargameState {
        self.state
    }

    /// True while a run is in progress, paused or not.
    pub fn is_running(&self) -> bool {
        matches!(self.state, WargameState::Running | WargameState::Paused)
    }

    pub fn round_number(&self) -> u32 {
        self.round_number
    }

    pub fn red(&self) -> RedStats {
        self.red
    }

    pub fn blue(&self) -> BlueStats {
        self.blue
    }

    pub fn battle_log(&self) -> impl Iterator<Item = &BattleEvent> {
        self.battle_log.iter()
    }
}

impl Default for WargameSimulator {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_ROUNDS)
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

    fn capture(bus: &EventBus, topic: Topic) -> Rc<RefCell<Vec<DashboardEvent>>> {
        let seen = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&seen);
        bus.subscribe(topic, move |event| {
            sink.borrow_mut().push(event.clone());
            Ok(())
        });
        seen
    }

    #[test]
    fn test_step_requires_running_state() {
        let bus = EventBus::new();
        let mut rng = StdRng::seed_from_u64(1);
        let mut sim = WargameSimulator::new(10);
        assert!(sim.step(&bus, &mut rng).is_none());

        sim.start(&bus);
        assert!(sim.step(&bus, &mut rng).is_some());
        assert_eq!(sim.toggle_pause(), WargameState::Paused);
        assert!(sim.is_running());
        assert!(sim.step(&bus, &mut rng).is_none());
        assert_eq!(sim.round_number(), 1);
    }

    #[test]
    fn test_run_ends_after_max_rounds() {
        let bus = EventBus::new();
        let ended = capture(&bus, Topic::WargameEnded);
        let detected = capture(&bus, Topic::ThreatDetected);
        let mut rng = StdRng::seed_from_u64(42);
        let mut sim = WargameSimulator::new(20);

        sim.start(&bus);
        let mut rounds = 0;
        while sim.step(&bus, &mut rng).is_some() {
            rounds += 1;
        }

        assert_eq!(rounds, 20);
        assert_eq!(sim.state(), WargameState::Finished);
        let ended = ended.borrow();
        assert_eq!(ended.len(), 1);
        let DashboardEvent::WargameEnded(summary) = &ended[0] else {
            panic!("expected wargameEnded");
        };
        assert_eq!(summary.rounds, 20);
        assert_eq!(summary.red.attempts, 20);
        assert_eq!(summary.blue.detections + summary.red.successes, 20);
        assert_eq!(detected.borrow().len() as u32, summary.blue.detections);
        let expected_winner = if summary.blue.detections > summary.red.successes {
            Side::Blue
        } else {
            Side::Red
        };
        assert_eq!(summary.winner, expected_winner);
    }

    #[test]
    fn test_detection_chance_is_capped() {
        let mut sim = WargameSimulator::default();
        sim.blue.detection_rate = 100.0;
        sim.blue.defenses_evolved = 50;
        assert_eq!(sim.detection_chance(&TACTICS[0]), MAX_DETECTION_CHANCE);
    }

    #[test]
    fn test_harder_tactics_are_harder_to_detect() {
        let sim = WargameSimulator::default();
        let easy = sim.detection_chance(&TACTICS[0]);
        let hard = sim.detection_chance(&TACTICS[7]);
        assert!(hard < easy);
        assert!((easy - 0.45).abs() < 1e-9);
    }

    #[test]
    fn test_reset_clears_progress() {
        let bus = EventBus::new();
        let resets = capture(&bus, Topic::WargameReset);
        let mut rng = StdRng::seed_from_u64(7);
        let mut sim = WargameSimulator::new(5);
        sim.start(&bus);
        sim.step(&bus, &mut rng);
        sim.reset(&bus);

        assert_eq!(sim.state(), WargameState::Idle);
        assert_eq!(sim.round_number(), 0);
        assert_eq!(sim.red().attempts, 0);
        assert_eq!(sim.battle_log().count(), 0);
        assert_eq!(resets.borrow().len(), 1);
    }

    #[test]
    fn test_restart_after_finish() {
        let bus = EventBus::new();
        let mut rng = StdRng::seed_from_u64(3);
        let mut sim = WargameSimulator::new(1);
        sim.start(&bus);
        sim.step(&bus, &mut rng);
        assert_eq!(sim.state(), WargameState::Finished);

        assert!(sim.start(&bus));
        assert_eq!(sim.round_number(), 0);
        assert!(!sim.start(&bus));
    }
}
