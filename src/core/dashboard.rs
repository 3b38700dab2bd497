//! The dashboard context: owns the bus, the alert pipeline and the simulated
//! producers, and wires them together.
//!
//! There is no global state. A `Dashboard` is built explicitly, driven by
//! `tick` and the interval callbacks, and unsubscribes everything it
//! registered when shut down or dropped.

use std::cell::{Ref, RefCell, RefMut};
use std::rc::Rc;
use std::time::Instant;

use rand::Rng;

use super::alerts::store::{AlertStore, AlertView};
use super::alerts::toast::{Toast, ToastId, ToastPresenter};
use super::alerts::triggers::{evaluate_trigger, ALERT_TOPICS};
use super::bus::{EventBus, SubscriptionId};
use super::config::Settings;
use super::error::HandlerError;
use super::events::{DashboardEvent, SoundEvent, Threat, Topic};
use super::model::{Alert, Category, NewAlert, Source};
use super::sensors::audio::AudioCorrelator;
use super::sensors::hyperspectral::HyperspectralScanner;
use super::sensors::illuminance::IlluminanceController;
use super::sensors::wargaming::{WargameSimulator, WargameState};
use super::stats::{Stats, StatsAggregator, STATS_TOPICS};
use super::timeline::{Timeline, TIMELINE_TOPICS};

/// Scan line speed, in percent of the frame per second.
pub const SCAN_PERCENT_PER_SEC: f64 = 30.0;
/// Chance that a producer interval starts a hyperspectral scan.
const SCAN_PROBABILITY: f64 = 0.3;
/// Chance that a producer interval fabricates suspicious activity for the lights.
const ACTIVITY_PROBABILITY: f64 = 0.2;

/// What happened during one tick.
#[derive(Debug, Default)]
pub struct DashboardOutput {
    pub expired_toasts: Vec<Toast>,
    pub threats: Vec<Threat>,
    pub restored_poles: usize,
    pub logs: Vec<String>,
}

pub struct Dashboard {
    settings: Settings,
    bus: EventBus,
    alerts: Rc<RefCell<AlertStore>>,
    toasts: Rc<RefCell<ToastPresenter>>,
    stats: Rc<RefCell<StatsAggregator>>,
    timeline: Rc<RefCell<Timeline>>,
    scanner: HyperspectralScanner,
    lighting: IlluminanceController,
    wargame: WargameSimulator,
    audio: AudioCorrelator,
    subscriptions: Vec<(Topic, SubscriptionId)>,
    last_tick: Instant,
    next_round_at: Instant,
}

impl Dashboard {
    pub fn new<R: Rng>(settings: Settings, view: Box<dyn AlertView>, rng: &mut R, now: Instant) -> Self {
        let settings = settings.normalized();
        let mut dashboard = Self {
            bus: EventBus::new(),
            alerts: Rc::new(RefCell::new(AlertStore::new(settings.max_alerts, view))),
            toasts: Rc::new(RefCell::new(ToastPresenter::new(settings.toast_duration()))),
            stats: Rc::new(RefCell::new(StatsAggregator::new())),
            timeline: Rc::new(RefCell::new(Timeline::new(settings.timeline_capacity))),
            scanner: HyperspectralScanner::new(rng),
            lighting: IlluminanceController::new(rng),
            wargame: WargameSimulator::new(settings.wargame_max_rounds),
            audio: AudioCorrelator::new(rng),
            subscriptions: Vec::new(),
            last_tick: now,
            next_round_at: now,
            settings,
        };
        dashboard.wire();
        dashboard.seed();
        dashboard
    }

    fn wire(&mut self) {
        for topic in ALERT_TOPICS {
            let alerts = Rc::clone(&self.alerts);
            let toasts = Rc::clone(&self.toasts);
            let id = self
                .bus
                .subscribe(*topic, move |event| raise_alert(&alerts, &toasts, event));
            self.subscriptions.push((*topic, id));
        }

        for topic in STATS_TOPICS {
            let stats = Rc::clone(&self.stats);
            let id = self.bus.subscribe(*topic, move |event| {
                stats
                    .try_borrow_mut()
                    .map_err(|_| HandlerError::Busy("stats aggregator"))?
                    .record(event);
                Ok(())
            });
            self.subscriptions.push((*topic, id));
        }

        for topic in TIMELINE_TOPICS {
            let timeline = Rc::clone(&self.timeline);
            let id = self.bus.subscribe(*topic, move |event| {
                timeline
                    .try_borrow_mut()
                    .map_err(|_| HandlerError::Busy("timeline"))?
                    .record(event);
                Ok(())
            });
            self.subscriptions.push((*topic, id));
        }
        log::debug!("dashboard wired {} subscriptions", self.subscriptions.len());
    }

    /// Boot entries shown before any producer has fired. No toasts for these.
    fn seed(&mut self) {
        let boot = [
            NewAlert::new(Category::Info, Source::System, "System started", "All modules initialised successfully"),
            NewAlert::new(Category::Info, Source::Cameras, "Cameras connected", "All cameras are online and operating normally"),
            NewAlert::new(Category::Info, Source::Hyperspectral, "Spectral calibration", "The spectral analysis unit has been calibrated"),
        ];
        {
            let mut alerts = self.alerts.borrow_mut();
            for spec in boot {
                alerts.add_alert(spec);
            }
        }

        let mut timeline = self.timeline.borrow_mut();
        timeline.push("System start", "All modules initialised successfully", Category::Success);
        timeline.push("Cameras connected", "6 cameras connected and running", Category::Info);
        timeline.push("Spectral calibration", "Material database calibrated", Category::Info);
    }

    /// Raise an alert directly, outside of any bus event.
    pub fn raise_alert(&self, spec: NewAlert, show_toast: bool) -> Alert {
        let alert = self.alerts.borrow_mut().add_alert(spec);
        if show_toast {
            self.toasts.borrow_mut().present(&alert, Instant::now());
        }
        alert
    }

    /// Advance time-driven state: scan line, wargame rounds, light restores and toast expiry.
    pub fn tick<R: Rng>(&mut self, now: Instant, rng: &mut R) -> DashboardOutput {
        let mut output = DashboardOutput::default();
        let elapsed = now.saturating_duration_since(self.last_tick);
        self.last_tick = now;

        // 1. Scan line
        if self.scanner.is_scanning() {
            let step = elapsed.as_secs_f64() * SCAN_PERCENT_PER_SEC;
            self.scanner.advance(&self.bus, rng, step);
            if !self.scanner.is_scanning() {
                output.logs.push(format!(
                    "Scan complete: {} materials analysed",
                    self.scanner.detections().len()
                ));
            }
        }

        // 2. Wargame rounds
        if self.wargame.state() == WargameState::Running && now >= self.next_round_at {
            self.next_round_at = now + self.settings.wargame_round_interval();
            if let Some(threat) = self.wargame.step(&self.bus, rng) {
                output.threats.push(threat);
            }
            if self.wargame.state() == WargameState::Finished {
                output.logs.push(format!(
                    "Wargame finished after {} rounds",
                    self.wargame.round_number()
                ));
            }
        }

        // 3. Lights back to base, microphones settle
        output.restored_poles = self.lighting.restore_due(&self.bus, now);
        self.audio.decay(elapsed);

        // 4. Toasts
        output.expired_toasts = self.toasts.borrow_mut().expire(now);
        for toast in &output.expired_toasts {
            output.logs.push(format!("Toast closed: {}", toast.title));
        }

        output
    }

    /// Demo cadence for the scanner and the lighting controller.
    pub fn on_producer_interval<R: Rng>(&mut self, rng: &mut R, now: Instant) {
        if rng.gen::<f64>() < SCAN_PROBABILITY {
            self.scanner.start_scan(&self.bus);
        }
        if rng.gen::<f64>() < ACTIVITY_PROBABILITY {
            self.lighting.simulate_suspicious_activity(&self.bus, rng, now);
        }
    }

    pub fn on_stats_interval<R: Rng>(&mut self, rng: &mut R) -> Stats {
        let running_round = self
            .wargame
            .is_running()
            .then(|| self.wargame.round_number());
        let mut stats = self.stats.borrow_mut();
        stats.simulate_activity(rng, running_round);
        stats.snapshot()
    }

    pub fn on_audio_interval<R: Rng>(&mut self, rng: &mut R) -> Option<SoundEvent> {
        self.audio.listen(&self.bus, rng)
    }

    pub fn start_scan(&mut self) -> bool {
        self.scanner.start_scan(&self.bus)
    }

    pub fn start_wargame(&mut self, now: Instant) -> bool {
        let started = self.wargame.start(&self.bus);
        if started {
            self.next_round_at = now;
        }
        started
    }

    pub fn toggle_wargame_pause(&mut self) -> WargameState {
        self.wargame.toggle_pause()
    }

    pub fn reset_wargame(&mut self) {
        self.wargame.reset(&self.bus);
    }

    pub fn dismiss_toast(&self, id: ToastId) -> bool {
        self.toasts.borrow_mut().dismiss(id)
    }

    pub fn bus(&self) -> &EventBus {
        &self.bus
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn alerts(&self) -> Ref<'_, AlertStore> {
        self.alerts.borrow()
    }

    /// Operator actions (mark as read, dismiss, filter) go through here.
    pub fn alerts_mut(&self) -> RefMut<'_, AlertStore> {
        self.alerts.borrow_mut()
    }

    pub fn toasts(&self) -> Ref<'_, ToastPresenter> {
        self.toasts.borrow()
    }

    pub fn stats(&self) -> Stats {
        self.stats.borrow().snapshot()
    }

    pub fn timeline(&self) -> Ref<'_, Timeline> {
        self.timeline.borrow()
    }

    pub fn scanner(&self) -> &HyperspectralScanner {
        &self.scanner
    }

    pub fn lighting(&self) -> &IlluminanceController {
        &self.lighting
    }

    pub fn wargame(&self) -> &WargameSimulator {
        &self.wargame
    }

    pub fn audio(&self) -> &AudioCorrelator {
        &self.audio
    }

    /// Remove every subscription this dashboard registered. Safe to call twice.
    pub fn shutdown(&mut self) {
        if self.subscriptions.is_empty() {
            return;
        }
        for (topic, id) in self.subscriptions.drain(..) {
            self.bus.unsubscribe(topic, id);
        }
        log::debug!("dashboard subscriptions released");
    }
}

impl Drop for Dashboard {
    fn drop(&mut self) {
        self.shutdown();
    }
}

fn raise_alert(
    alerts: &RefCell<AlertStore>,
    toasts: &RefCell<ToastPresenter>,
    event: &DashboardEvent,
) -> Result<(), HandlerError> {
    let Some(spec) = evaluate_trigger(event) else {
        return Ok(());
    };
    // Both guards first: an alert is only stored if its toast can be shown.
    let mut alerts = alerts
        .try_borrow_mut()
        .map_err(|_| HandlerError::Busy("alert store"))?;
    let mut toasts = toasts
        .try_borrow_mut()
        .map_err(|_| HandlerError::Busy("toast presenter"))?;
    let alert = alerts.add_alert(spec);
    toasts.present(&alert, Instant::now());
    Ok(())
}
