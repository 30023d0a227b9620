use crate::FlockError;
use nalgebra::Vector3;
use serde::{Deserialize, Serialize};

/// Serializable form of a [`Boundary`]: min and max corners as `[x, y, z]`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundaryConfig {
    pub min: [f64; 3],
    pub max: [f64; 3],
}

impl BoundaryConfig {
    pub fn build(&self) -> Result<Boundary, FlockError> {
        Boundary::new(
            Vector3::new(self.min[0], self.min[1], self.min[2]),
            Vector3::new(self.max[0], self.max[1], self.max[2]),
        )
    }
}

/// Axis-aligned box the flock is kept inside.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Boundary {
    min: Vector3<f64>,
    max: Vector3<f64>,
}

impl Boundary {
    pub fn new(min: Vector3<f64>, max: Vector3<f64>) -> Result<Self, FlockError> {
        if !min.iter().chain(max.iter()).all(|c| c.is_finite()) {
            return Err(FlockError::NonFiniteBoundary);
        }
        for axis in 0..3 {
            if min[axis] > max[axis] {
                return Err(FlockError::InvertedBoundary {
                    axis: AXIS_NAMES[axis],
                    min: min[axis],
                    max: max[axis],
                });
            }
        }
        let boundary = Self { min, max };
        if !boundary.size().iter().chain(boundary.center().iter()).all(|c| c.is_finite()) {
            return Err(FlockError::NonFiniteBoundary);
        }
        Ok(boundary)
    }

    pub fn min(&self) -> &Vector3<f64> { &self.min }

    pub fn max(&self) -> &Vector3<f64> { &self.max }

    pub fn center(&self) -> Vector3<f64> { (self.min + self.max) * 0.5 }

    pub fn size(&self) -> Vector3<f64> { self.max - self.min }

    /// Closed-box containment: points on a face count as inside.
    pub fn contains(&self, point: &Vector3<f64>) -> bool {
        (0..3).all(|i| point[i] >= self.min[i] && point[i] <= self.max[i])
    }

    /// Shortest vector from the nearest face within `max_distance` to `point`.
    ///
    /// Assumes `point` lies inside the box. Only faces strictly closer than
    /// `max_distance` (and strictly in front of the point) are considered; ties go to
    /// the first face in x, y, z order with the min face checked before the max face.
    /// The result points away from the face, toward the interior, and its length is
    /// the distance to that face. Returns `None` when no face is close enough.
    pub fn face_offset(&self, point: &Vector3<f64>, max_distance: f64) -> Option<Vector3<f64>> {
        let mut nearest: Option<(usize, f64, f64)> = None;

        for axis in 0..3 {
            let faces = [
                (point[axis] - self.min[axis], 1.0),
                (self.max[axis] - point[axis], -1.0),
            ];
            for (distance, sign) in faces {
                if !(distance > 0.0 && distance < max_distance) {
                    continue;
                }
                if nearest.map_or(true, |(_, _, best)| distance < best) {
                    nearest = Some((axis, sign, distance));
                }
            }
        }

        nearest.map(|(axis, sign, distance)| {
            let mut offset = Vector3::zeros();
            offset[axis] = sign * distance;
            offset
        })
    }

    pub fn to_config(&self) -> BoundaryConfig {
        BoundaryConfig {
            min: [self.min.x, self.min.y, self.min.z],
            max: [self.max.x, self.max.y, self.max.z],
        }
    }

    /// `[min.x, min.y, min.z, max.x, max.y, max.z]`
    pub fn to_array(&self) -> [f64; 6] {
        [self.min.x, self.min.y, self.min.z, self.max.x, self.max.y, self.max.z]
    }
}

const AXIS_NAMES: [&str; 3] = ["x", "y", "z"];
