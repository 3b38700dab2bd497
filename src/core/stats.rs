use rand::Rng;
use serde::Serialize;

use super::events::{DashboardEvent, Topic};

/// Topics that move a counter.
pub const STATS_TOPICS: &[Topic] = &[
    Topic::ScanComplete,
    Topic::LightAdjusted,
    Topic::WargameEnded,
    Topic::AudioEventDetected,
];

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct Stats {
    pub spectral_scans: u64,
    pub light_adjustments: u64,
    pub wargame_rounds: u64,
    pub audio_events: u64,
}

#[derive(Debug, Default)]
pub struct StatsAggregator {
    stats: Stats,
}

impl StatsAggregator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Apply a bus event. Returns true if a counter moved.
    pub fn record(&mut self, event: &DashboardEvent) -> bool {
        match event {
            DashboardEvent::ScanComplete(_) => self.stats.spectral_scans += 1,
            DashboardEvent::LightAdjusted(_) => self.stats.light_adjustments += 1,
            DashboardEvent::WargameEnded(summary) => {
                self.stats.wargame_rounds += u64::from(summary.rounds)
            }
            DashboardEvent::AudioEventDetected(_) => self.stats.audio_events += 1,
            _ => return false,
        }
        true
    }

    /// Periodic drift that keeps the counters moving between real events.
    ///
    /// While a wargame is running its round counter is copied in as-is, which
    /// is the one case where a counter may go down.
    pub fn simulate_activity<R: Rng>(&mut self, rng: &mut R, running_round: Option<u32>) {
        self.stats.spectral_scans += rng.gen_range(0..2u64);
        // The light and audio drift draw from 0..1, i.e. always zero.
        self.stats.light_adjustments += rng.gen_range(0..1u64);
        self.stats.audio_events += rng.gen_range(0..1u64);

        if let Some(round) = running_round {
            self.stats.wargame_rounds = u64::from(round);
        }
    }

    pub fn snapshot(&self) -> Stats {
        self.stats
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::events::{BlueStats, RedStats, ScanReport, Side, WargameSummary};
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn ended(rounds: u32) -> DashboardEvent {
        DashboardEvent::WargameEnded(WargameSummary {
            winner: Side::Blue,
            rounds,
            red: RedStats::default(),
            blue: BlueStats::default(),
        })
    }

    #[test]
    fn test_topics_increment_their_counter() {
        let mut stats = StatsAggregator::new();
        assert!(stats.record(&DashboardEvent::ScanComplete(ScanReport { detections: vec![] })));
        assert!(stats.record(&ended(7)));
        assert!(stats.record(&ended(3)));
        assert!(!stats.record(&DashboardEvent::ScanStarted));

        let snap = stats.snapshot();
        assert_eq!(snap.spectral_scans, 1);
        assert_eq!(snap.wargame_rounds, 10);
        assert_eq!(snap.light_adjustments, 0);
        assert_eq!(snap.audio_events, 0);
    }

    #[test]
    fn test_simulated_activity_never_decreases_without_wargame() {
        let mut stats = StatsAggregator::new();
        let mut rng = StdRng::seed_from_u64(11);
        let mut previous = stats.snapshot();
        for _ in 0..50 {
            stats.simulate_activity(&mut rng, None);
            let now = stats.snapshot();
            assert!(now.spectral_scans >= previous.spectral_scans);
            assert!(now.spectral_scans <= previous.spectral_scans + 1);
            assert_eq!(now.light_adjustments, 0);
            assert_eq!(now.audio_events, 0);
            previous = now;
        }
    }

    #[test]
    fn test_running_wargame_assigns_round_counter() {
        let mut stats = StatsAggregator::new();
        let mut rng = StdRng::seed_from_u64(1);
        stats.record(&ended(40));
        stats.simulate_activity(&mut rng, Some(12));
        assert_eq!(stats.snapshot().wargame_rounds, 12);
    }
}
