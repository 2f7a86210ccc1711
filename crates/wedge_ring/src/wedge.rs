//! Random wedge generation.
//!
//! Random wedges may overlap wedges already on the ring; placement is not
//! constrained against existing spans.

use rand::Rng;
use shared::{
    domain::{Color, Wedge},
    error::RingError,
};

/// Narrowest span a random wedge may have, in turns.
pub const MIN_SPAN: f64 = 0.02;
/// Widest span a random wedge may have on an empty ring, in turns.
pub const MAX_SPAN: f64 = 0.25;
pub const RANDOM_INNER_RADIUS: f64 = 0.5;
pub const RANDOM_OUTER_RADIUS: f64 = 1.0;
pub const RANDOM_SATURATION: f64 = 0.75;
pub const RANDOM_BRIGHTNESS: f64 = 0.9;

/// Builds a wedge with a random hue and a random angular span.
///
/// `occupancy` is the fraction of the turn already covered by wedges. The
/// widest allowed span shrinks linearly with it, bottoming out at
/// [`MIN_SPAN`].
pub fn random_wedge<R: Rng>(rng: &mut R, occupancy: f64) -> Result<Wedge, RingError> {
    let occupancy = if occupancy.is_finite() {
        occupancy.clamp(0.0, 1.0)
    } else {
        1.0
    };

    let widest = (MAX_SPAN * (1.0 - occupancy)).max(MIN_SPAN);
    let span = if widest > MIN_SPAN {
        rng.random_range(MIN_SPAN..=widest)
    } else {
        MIN_SPAN
    };
    let start = rng.random_range(0.0..(1.0 - span));

    let color = Color::hsb(rng.random::<f64>(), RANDOM_SATURATION, RANDOM_BRIGHTNESS);
    Wedge::new(
        color,
        start,
        start + span,
        RANDOM_INNER_RADIUS,
        RANDOM_OUTER_RADIUS,
    )
}
