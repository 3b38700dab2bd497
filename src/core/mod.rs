// Core of the dashboard: typed events, the bus that carries them, and the
// stores and producers hanging off it.
//
// Architecture:
// - events.rs / bus.rs: Typed event union and the single-threaded pub/sub
// - alerts/: Event-triggered alerts, the capped store and toasts
// - stats.rs / timeline.rs: Counters and recent-activity feed
// - sensors/: Simulated producers (spectral, lighting, wargame, audio)
// - dashboard.rs: Wires everything above into one explicit context

pub mod alerts;
pub mod bus;
pub mod config;
pub mod dashboard;
pub mod error;
pub mod events;
pub mod model;
pub mod quiz;
pub mod sensors;
pub mod stats;
pub mod timeline;
