use crate::Boundary;
use crate::algorithms::flocking::{
    ALIGNMENT_RANGE, AgentParams, NORMALIZE_EPS, normalize_or_zero, steering_accel,
};
use nalgebra::{UnitQuaternion, Vector3};
use rand::Rng;
use std::f64::consts::PI;

/// What an agent sees of a neighbor during one update.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Neighbor {
    pub position: Vector3<f64>,
    pub velocity: Vector3<f64>,
}

/// One bird. Steering is a function of the current state, the boundary and the
/// neighbor sample handed in for this tick; nothing else carries over between ticks.
#[derive(Debug, Clone)]
pub struct Agent {
    position: Vector3<f64>,
    velocity: Vector3<f64>,
    /// Local +Z maps onto the last non-zero velocity direction.
    orientation: UnitQuaternion<f64>,
    params: AgentParams,
}

impl Agent {
    pub fn new(params: AgentParams, position: Vector3<f64>, velocity: Vector3<f64>) -> Self {
        let mut agent = Self {
            position,
            velocity,
            orientation: UnitQuaternion::identity(),
            params,
        };
        agent.reorient();
        agent
    }

    /// Uniformly random position inside `boundary`, random heading at full speed.
    pub fn spawn<R: Rng>(params: AgentParams, boundary: &Boundary, rng: &mut R) -> Self {
        let (min, max) = (boundary.min(), boundary.max());
        let position = Vector3::new(
            rng.random_range(min.x..=max.x),
            rng.random_range(min.y..=max.y),
            rng.random_range(min.z..=max.z),
        );
        let velocity = random_direction(rng) * params.max_speed;
        Self::new(params, position, velocity)
    }

    pub fn position(&self) -> &Vector3<f64> { &self.position }

    pub fn velocity(&self) -> &Vector3<f64> { &self.velocity }

    pub fn speed(&self) -> f64 { self.velocity.norm() }

    pub fn params(&self) -> &AgentParams { &self.params }

    pub fn orientation(&self) -> &UnitQuaternion<f64> { &self.orientation }

    /// Point the renderer should make the model look at.
    pub fn look_target(&self) -> Vector3<f64> { self.position + self.velocity }

    /// Unit forward direction of the current orientation.
    pub fn heading(&self) -> Vector3<f64> { self.orientation * Vector3::z() }

    pub fn as_neighbor(&self) -> Neighbor {
        Neighbor { position: self.position, velocity: self.velocity }
    }

    /// Advance one frame: steer, clamp speed, integrate, reorient.
    pub fn update(&mut self, dt: f64, boundary: &Boundary, neighbors: &[Neighbor]) {
        if !neighbors.is_empty() {
            self.steer_with_neighbors(dt, neighbors);
        }
        self.steer_from_boundary(dt, boundary);

        let max_speed = self.params.max_speed;
        if self.speed() < max_speed {
            let heading = match self.velocity.try_normalize(NORMALIZE_EPS) {
                Some(dir) => dir,
                None => self.heading(),
            };
            self.velocity += heading * (self.params.underspeed_weight * dt);
        }

        self.velocity = self.velocity.cap_magnitude(max_speed);
        self.position += self.velocity * dt;
        self.reorient();
    }

    // Cohesion, alignment, then separation. Each reads the velocity left by the one
    // before it.
    fn steer_with_neighbors(&mut self, dt: f64, neighbors: &[Neighbor]) {
        let inv = 1.0 / neighbors.len() as f64;
        let mut avg_position = Vector3::zeros();
        let mut avg_heading = Vector3::zeros();
        for n in neighbors {
            avg_position += n.position;
            avg_heading += normalize_or_zero(&n.velocity);
        }
        avg_position *= inv;
        let avg_heading = normalize_or_zero(&(avg_heading * inv));

        let p = &self.params;

        let cohesion = avg_position - self.position;
        let accel = steering_accel(&cohesion, p.detection_range, p.cohesion_weight, self.speed());
        self.velocity += accel * dt;

        let heading_diff = avg_heading - normalize_or_zero(&self.velocity);
        let accel = steering_accel(&heading_diff, ALIGNMENT_RANGE, p.alignment_weight, self.speed());
        self.velocity += accel * dt;

        // same sample as cohesion, even though separation_range is much shorter
        let separation = self.position - avg_position;
        let accel =
            steering_accel(&separation, p.separation_range(), p.separation_weight, self.speed());
        self.velocity += accel * dt;
    }

    fn steer_from_boundary(&mut self, dt: f64, boundary: &Boundary) {
        let weight = self.params.boundary_steering_weight;
        if !boundary.contains(&self.position) {
            let to_center = boundary.center() - self.position;
            let range = to_center.norm() * 2.0;
            let accel = steering_accel(&to_center, range, weight, self.speed());
            self.velocity += accel * dt;
        } else {
            let probe = self.params.boundary_probe_distance();
            if let Some(offset) = boundary.face_offset(&self.position, probe) {
                let accel = steering_accel(&offset, probe, weight, self.speed());
                self.velocity += accel * dt;
            }
        }
    }

    fn reorient(&mut self) {
        let Some(dir) = self.velocity.try_normalize(NORMALIZE_EPS) else {
            return;
        };
        // face_towards degenerates when looking straight along the up vector
        let up = if dir.y.abs() > 0.999 { Vector3::z() } else { Vector3::y() };
        self.orientation = UnitQuaternion::face_towards(&dir, &up);
    }
}

/// Uniform direction on the unit sphere.
pub fn random_direction<R: Rng>(rng: &mut R) -> Vector3<f64> {
    let u: f64 = rng.random_range(-1.0..=1.0);
    let t: f64 = rng.random_range(0.0..2.0 * PI);
    let f = (1.0 - u * u).max(0.0).sqrt();
    Vector3::new(f * t.cos(), u, f * t.sin())
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    fn big_box() -> Boundary {
        Boundary::new(Vector3::new(-10.0, -10.0, -10.0), Vector3::new(10.0, 10.0, 10.0)).unwrap()
    }

    fn small_params() -> AgentParams {
        AgentParams {
            max_speed: 2.0,
            detection_range: 5.0,
            boundary_distance_mult: 0.2,
            ..AgentParams::default()
        }
    }

    #[test]
    fn free_flight_moves_straight() {
        let params = small_params();
        let velocity = Vector3::new(params.max_speed, 0.0, 0.0);
        let mut agent = Agent::new(params, Vector3::zeros(), velocity);
        let dt = 0.1;

        agent.update(dt, &big_box(), &[]);

        assert_relative_eq!(*agent.velocity(), velocity);
        assert_relative_eq!(*agent.position(), velocity * dt);
        assert_relative_eq!(agent.heading(), Vector3::x(), epsilon = 1e-12);
    }

    #[test]
    fn zero_dt_leaves_position_unchanged() {
        let neighbor = Neighbor {
            position: Vector3::new(1.0, 1.0, 0.0),
            velocity: Vector3::new(0.0, 1.0, 0.0),
        };
        let start = Vector3::new(9.5, 0.0, 0.0);
        let mut agent = Agent::new(small_params(), start, Vector3::new(1.0, 0.0, 0.0));

        agent.update(0.0, &big_box(), &[neighbor]);

        assert_eq!(*agent.position(), start);
    }

    #[test]
    fn stalled_agent_restarts_along_heading() {
        let mut agent = Agent::new(small_params(), Vector3::zeros(), Vector3::zeros());
        assert_eq!(agent.speed(), 0.0);

        agent.update(0.1, &big_box(), &[]);

        assert!(agent.speed() > 0.0);
        assert!(agent.position().iter().all(|c| c.is_finite()));
        // identity orientation faces +Z
        assert!(agent.velocity().z > 0.0);
    }

    #[test]
    fn underspeed_accelerates_along_velocity() {
        let params = small_params();
        let mut agent = Agent::new(params.clone(), Vector3::zeros(), Vector3::new(0.0, 1.0, 0.0));

        agent.update(0.1, &big_box(), &[]);

        let expected = 1.0 + params.underspeed_weight * 0.1;
        assert_relative_eq!(agent.velocity().y, expected.min(params.max_speed), epsilon = 1e-12);
        assert_relative_eq!(agent.velocity().x, 0.0);
    }

    #[test]
    fn speed_is_clamped() {
        let params = small_params();
        let mut agent = Agent::new(params.clone(), Vector3::zeros(), Vector3::new(50.0, 0.0, 0.0));

        agent.update(0.01, &big_box(), &[]);

        assert!(agent.speed() <= params.max_speed + 1e-9);
    }

    #[test]
    fn near_face_steers_inward() {
        let params = small_params();
        // 0.5 from the x = 10 face, probe distance is 1
        let velocity = Vector3::new(0.0, params.max_speed, 0.0);
        let mut agent = Agent::new(params, Vector3::new(9.5, 0.0, 0.0), velocity);

        agent.update(0.1, &big_box(), &[]);

        assert!(agent.velocity().x < 0.0);
    }

    #[test]
    fn outside_agent_steers_toward_center() {
        let params = small_params();
        let velocity = Vector3::new(0.0, params.max_speed, 0.0);
        let mut agent = Agent::new(params, Vector3::new(50.0, 0.0, 0.0), velocity);

        agent.update(0.1, &big_box(), &[]);

        assert!(agent.velocity().x < 0.0);
    }

    #[test]
    fn cohesion_pulls_toward_neighbors() {
        let params = AgentParams {
            alignment_weight: 0.0,
            separation_weight: 0.0,
            ..small_params()
        };
        let velocity = Vector3::new(params.max_speed, 0.0, 0.0);
        let mut agent = Agent::new(params, Vector3::zeros(), velocity);
        let neighbor = Neighbor {
            position: Vector3::new(0.0, 2.0, 0.0),
            velocity: Vector3::new(1.0, 0.0, 0.0),
        };

        agent.update(0.1, &big_box(), &[neighbor]);

        assert!(agent.velocity().y > 0.0);
    }

    #[test]
    fn alignment_turns_toward_neighbor_heading() {
        let params = AgentParams {
            cohesion_weight: 0.0,
            separation_weight: 0.0,
            ..small_params()
        };
        let velocity = Vector3::new(params.max_speed, 0.0, 0.0);
        let mut agent = Agent::new(params, Vector3::zeros(), velocity);
        // heading difference (-0.2, 0.6, 0) is shorter than the alignment range
        let neighbor_heading = Vector3::new(0.8, 0.6, 0.0);
        let neighbor = Neighbor { position: Vector3::zeros(), velocity: neighbor_heading };

        agent.update(0.1, &big_box(), &[neighbor]);

        assert!(agent.velocity().y > 0.0);
    }

    #[test]
    fn separation_pushes_away_from_close_neighbors() {
        let params = AgentParams {
            cohesion_weight: 0.0,
            alignment_weight: 0.0,
            separation_weight: 1.0,
            separation_distance_mult: 1.0,
            ..small_params()
        };
        let velocity = Vector3::new(params.max_speed, 0.0, 0.0);
        let mut agent = Agent::new(params, Vector3::zeros(), velocity);
        let neighbor = Neighbor {
            position: Vector3::new(0.0, 1.0, 0.0),
            velocity: Vector3::new(1.0, 0.0, 0.0),
        };

        agent.update(0.1, &big_box(), &[neighbor]);

        assert!(agent.velocity().y < 0.0);
    }

    #[test]
    fn zero_velocity_neighbors_do_not_produce_nan() {
        let mut agent = Agent::new(small_params(), Vector3::zeros(), Vector3::zeros());
        let neighbor = Neighbor { position: Vector3::zeros(), velocity: Vector3::zeros() };

        for _ in 0..10 {
            agent.update(0.1, &big_box(), &[neighbor, neighbor]);
        }

        assert!(agent.position().iter().all(|c| c.is_finite()));
        assert!(agent.velocity().iter().all(|c| c.is_finite()));
    }

    #[test]
    fn zero_velocity_keeps_previous_orientation() {
        let mut agent = Agent::new(small_params(), Vector3::zeros(), Vector3::new(1.0, 0.0, 0.0));
        let before = *agent.orientation();
        agent.velocity = Vector3::zeros();
        agent.reorient();
        assert_eq!(*agent.orientation(), before);
    }

    #[test]
    fn looking_straight_up_stays_finite() {
        let agent = Agent::new(small_params(), Vector3::zeros(), Vector3::new(0.0, 1.0, 0.0));
        assert_relative_eq!(agent.heading(), Vector3::y(), epsilon = 1e-9);
    }

    #[test]
    fn spawn_places_agents_inside_at_full_speed() {
        let mut rng = StdRng::seed_from_u64(7);
        let boundary = big_box();
        let params = small_params();
        for _ in 0..100 {
            let agent = Agent::spawn(params.clone(), &boundary, &mut rng);
            assert!(boundary.contains(agent.position()));
            assert_relative_eq!(agent.speed(), params.max_speed, epsilon = 1e-9);
        }
    }

    #[test]
    fn random_direction_is_unit_length() {
        let mut rng = StdRng::seed_from_u64(3);
        for _ in 0..100 {
            assert_relative_eq!(random_direction(&mut rng).norm(), 1.0, epsilon = 1e-9);
        }
    }
}
