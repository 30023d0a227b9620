use crate::FlockError;
use nalgebra::Vector3;
use serde::{Deserialize, Serialize};

pub const DEFAULT_MAX_SPEED: f64 = 145.0;
pub const DEFAULT_DETECTION_RANGE: f64 = 400.0;
pub const DEFAULT_COHESION_WEIGHT: f64 = 0.5;
pub const DEFAULT_ALIGNMENT_WEIGHT: f64 = 1.2;
pub const DEFAULT_SEPARATION_DISTANCE_MULT: f64 = 0.1;
pub const DEFAULT_SEPARATION_WEIGHT: f64 = 0.0003;
pub const DEFAULT_BOUNDARY_DISTANCE_MULT: f64 = 0.3;
pub const DEFAULT_BOUNDARY_STEERING_WEIGHT: f64 = 2.5;
pub const DEFAULT_UNDERSPEED_WEIGHT: f64 = 5.0;

/// Alignment compares unit headings, so its "distance" is the length of the heading
/// difference and the force fades out at 1.
pub const ALIGNMENT_RANGE: f64 = 1.0;

/// Vectors shorter than this are treated as zero when normalizing.
pub const NORMALIZE_EPS: f64 = 1.0e-12;

/// Per-agent tunables. Fixed once the agent is created.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AgentParams {
    /// Speed cap (units/s).
    pub max_speed: f64,
    /// Neighbor radius; also scales the separation and boundary probe distances.
    pub detection_range: f64,

    pub cohesion_weight: f64,
    pub alignment_weight: f64,

    /// Separation range as a fraction of `detection_range`.
    pub separation_distance_mult: f64,
    pub separation_weight: f64,

    /// Boundary probe distance as a fraction of `detection_range`.
    pub boundary_distance_mult: f64,
    /// Shared by the inside-the-box repulsion and the outside-the-box recall.
    pub boundary_steering_weight: f64,

    /// Acceleration along the heading while slower than `max_speed`.
    pub underspeed_weight: f64,
}

impl Default for AgentParams {
    fn default() -> Self {
        Self {
            max_speed: DEFAULT_MAX_SPEED,
            detection_range: DEFAULT_DETECTION_RANGE,
            cohesion_weight: DEFAULT_COHESION_WEIGHT,
            alignment_weight: DEFAULT_ALIGNMENT_WEIGHT,
            separation_distance_mult: DEFAULT_SEPARATION_DISTANCE_MULT,
            separation_weight: DEFAULT_SEPARATION_WEIGHT,
            boundary_distance_mult: DEFAULT_BOUNDARY_DISTANCE_MULT,
            boundary_steering_weight: DEFAULT_BOUNDARY_STEERING_WEIGHT,
            underspeed_weight: DEFAULT_UNDERSPEED_WEIGHT,
        }
    }
}

impl AgentParams {
    pub fn validate(&self) -> Result<(), FlockError> {
        let fields = [
            ("max_speed", self.max_speed),
            ("detection_range", self.detection_range),
            ("cohesion_weight", self.cohesion_weight),
            ("alignment_weight", self.alignment_weight),
            ("separation_distance_mult", self.separation_distance_mult),
            ("separation_weight", self.separation_weight),
            ("boundary_distance_mult", self.boundary_distance_mult),
            ("boundary_steering_weight", self.boundary_steering_weight),
            ("underspeed_weight", self.underspeed_weight),
        ];
        for (name, value) in fields {
            if !value.is_finite() || value < 0.0 {
                return Err(FlockError::InvalidParam { name, value });
            }
        }
        if self.max_speed <= 0.0 {
            return Err(FlockError::InvalidParam { name: "max_speed", value: self.max_speed });
        }
        if self.detection_range <= 0.0 {
            return Err(FlockError::InvalidParam {
                name: "detection_range",
                value: self.detection_range,
            });
        }
        Ok(())
    }

    pub fn separation_range(&self) -> f64 { self.detection_range * self.separation_distance_mult }

    pub fn boundary_probe_distance(&self) -> f64 { self.detection_range * self.boundary_distance_mult }
}

/// Unit vector along `v`, or zero for a (near) zero-length `v`.
pub fn normalize_or_zero(v: &Vector3<f64>) -> Vector3<f64> {
    v.try_normalize(NORMALIZE_EPS).unwrap_or_else(Vector3::zeros)
}

/// Falloff for a steering force: 1 at zero distance, 0 at `range` and beyond.
pub fn steering_falloff(distance: f64, range: f64) -> f64 {
    if !(range > 0.0) {
        return 0.0;
    }
    let ratio = distance / range;
    (1.0 - ratio * ratio).clamp(0.0, 1.0)
}

/// Acceleration along `displacement` that fades out at `range`.
///
/// The magnitude scales with the agent's own `speed`, so fast agents correct harder
/// than slow ones.
pub fn steering_accel(
    displacement: &Vector3<f64>,
    range: f64,
    weight: f64,
    speed: f64,
) -> Vector3<f64> {
    let factor = steering_falloff(displacement.norm(), range);
    normalize_or_zero(displacement) * (speed * factor * weight)
}
