use std::{
    fmt,
    sync::atomic::{AtomicU64, Ordering},
};

use serde::{Deserialize, Serialize};

use crate::error::RingError;

static NEXT_WEDGE_ID: AtomicU64 = AtomicU64::new(1);

macro_rules! id_newtype {
    ($name:ident) => {
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        pub struct $name(pub u64);

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }
    };
}

id_newtype!(WedgeId);

impl WedgeId {
    /// Allocates a process-unique id. Ids are handed out monotonically and
    /// are never reused.
    pub fn next() -> Self {
        Self(NEXT_WEDGE_ID.fetch_add(1, Ordering::Relaxed))
    }
}

/// Hue/saturation/brightness color with opacity, every channel in `[0, 1]`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Color {
    pub hue: f64,
    pub saturation: f64,
    pub brightness: f64,
    pub opacity: f64,
}

impl Color {
    pub fn hsb(hue: f64, saturation: f64, brightness: f64) -> Self {
        Self {
            hue,
            saturation,
            brightness,
            opacity: 1.0,
        }
    }

    fn validate(&self) -> Result<(), RingError> {
        for (channel, value) in [
            ("hue", self.hue),
            ("saturation", self.saturation),
            ("brightness", self.brightness),
            ("opacity", self.opacity),
        ] {
            if !value.is_finite() || !(0.0..=1.0).contains(&value) {
                return Err(RingError::invalid_geometry(format!(
                    "color {channel} {value} outside [0, 1]"
                )));
            }
        }
        Ok(())
    }
}

/// One angular/radial segment of the ring.
///
/// Angles are measured in turns and radii are normalized to the ring's outer
/// edge. Fields are private so a `Wedge` only exists after validation.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Wedge {
    id: WedgeId,
    color: Color,
    start_angle: f64,
    end_angle: f64,
    inner_radius: f64,
    outer_radius: f64,
}

impl Wedge {
    pub fn new(
        color: Color,
        start_angle: f64,
        end_angle: f64,
        inner_radius: f64,
        outer_radius: f64,
    ) -> Result<Self, RingError> {
        if !start_angle.is_finite() || !end_angle.is_finite() {
            return Err(RingError::invalid_geometry("angles must be finite"));
        }
        if start_angle < 0.0 || end_angle > 1.0 {
            return Err(RingError::invalid_geometry(format!(
                "angular span [{start_angle}, {end_angle}] outside one turn"
            )));
        }
        if end_angle <= start_angle {
            return Err(RingError::invalid_geometry(format!(
                "end angle {end_angle} must exceed start angle {start_angle}"
            )));
        }

        if !inner_radius.is_finite() || !outer_radius.is_finite() {
            return Err(RingError::invalid_geometry("radii must be finite"));
        }
        if inner_radius < 0.0 || outer_radius > 1.0 {
            return Err(RingError::invalid_geometry(format!(
                "radial extent [{inner_radius}, {outer_radius}] outside [0, 1]"
            )));
        }
        if outer_radius <= inner_radius {
            return Err(RingError::invalid_geometry(format!(
                "outer radius {outer_radius} must exceed inner radius {inner_radius}"
            )));
        }

        color.validate()?;

        Ok(Self {
            id: WedgeId::next(),
            color,
            start_angle,
            end_angle,
            inner_radius,
            outer_radius,
        })
    }

    pub fn id(&self) -> WedgeId {
        self.id
    }

    pub fn color(&self) -> Color {
        self.color
    }

    pub fn start_angle(&self) -> f64 {
        self.start_angle
    }

    pub fn end_angle(&self) -> f64 {
        self.end_angle
    }

    pub fn inner_radius(&self) -> f64 {
        self.inner_radius
    }

    pub fn outer_radius(&self) -> f64 {
        self.outer_radius
    }

    /// Angular span in turns.
    pub fn span(&self) -> f64 {
        self.end_angle - self.start_angle
    }
}
