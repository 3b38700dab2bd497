// Simulated sensor producers.
//
// Architecture:
// - hyperspectral.rs: material scanner sweeping a scan line over a scene
// - illuminance.rs: light pole grid with adaptive response to activity
// - wargaming.rs: red/blue adversarial rounds
// - audio.rs: random sound events with suspicious-sound escalation
//
// Producers never hold the bus; callers pass it in so the dashboard keeps
// ownership of every component.

pub mod audio;
pub mod hyperspectral;
pub mod illuminance;
pub mod wargaming;

use rand::Rng;

use super::events::Location;

/// Width of the simulated sensor frame, in pixels
pub const FRAME_WIDTH: f64 = 800.0;
/// Height of the simulated sensor frame, in pixels
pub const FRAME_HEIGHT: f64 = 600.0;

/// Uniform random point at least `margin` pixels away from the frame edges.
pub fn random_location<R: Rng>(rng: &mut R, margin: f64) -> Location {
    Location::new(
        rng.gen_range(margin..FRAME_WIDTH - margin),
        rng.gen_range(margin..FRAME_HEIGHT - margin),
    )
}
