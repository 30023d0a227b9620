use crate::FlockError;
use crate::algorithms::flocking::AgentParams;
use crate::boundary::BoundaryConfig;
use crate::flock::{Flock, FlockConfig};

pub const PRESET_SKY_WIDGET: &str = "sky-widget";
pub const PRESET_PAGE: &str = "page";
pub const PRESET_BANNER: &str = "banner";
pub const PRESET_CUSTOM: &str = "custom";

pub struct PresetInfo {
    pub id: &'static str,
    pub name: &'static str,
    pub description: &'static str,
}

pub fn preset_catalog() -> &'static [PresetInfo] {
    &[
        PresetInfo {
            id: PRESET_SKY_WIDGET,
            name: "Sky widget",
            description: "50 birds with cohesion, alignment and separation in a wide sky box.",
        },
        PresetInfo {
            id: PRESET_PAGE,
            name: "Full page",
            description: "200 birds with the sky widget's rules and box, for a dedicated page.",
        },
        PresetInfo {
            id: PRESET_BANNER,
            name: "Banner",
            description: "30 birds in a shallow box, no flocking. Wall avoidance only; \
                          birds that leave the box are still steered back.",
        },
        PresetInfo {
            id: PRESET_CUSTOM,
            name: "Custom",
            description: "Flock built from a caller-supplied config.",
        },
    ]
}

/// Config behind a built-in preset.
pub fn preset_config(id: &str) -> Result<FlockConfig, FlockError> {
    match id {
        PRESET_SKY_WIDGET => Ok(FlockConfig::default()),
        PRESET_PAGE => Ok(FlockConfig { count: 200, ..FlockConfig::default() }),
        PRESET_BANNER => Ok(FlockConfig {
            count: 30,
            boundary: BoundaryConfig {
                min: [-500.0, -150.0, -200.0],
                max: [500.0, 300.0, 50.0],
            },
            agent: AgentParams {
                max_speed: 100.0,
                detection_range: 150.0,
                cohesion_weight: 0.0,
                alignment_weight: 0.0,
                separation_weight: 0.0,
                boundary_distance_mult: 1.0,
                boundary_steering_weight: 1.5,
                underspeed_weight: 0.0,
                ..AgentParams::default()
            },
            ..FlockConfig::default()
        }),
        other => Err(FlockError::UnknownPreset(other.to_string())),
    }
}

/// Host-facing wrapper: one flock plus flat `f32` buffers a renderer can upload.
pub struct Engine {
    preset_id: &'static str,
    flock: Flock,
}

impl Engine {
    pub fn new_builtin(preset_id: &str) -> Result<Self, FlockError> {
        let preset_id = normalize_preset_id(preset_id)
            .ok_or_else(|| FlockError::UnknownPreset(preset_id.to_string()))?;
        let config = preset_config(preset_id)?;
        Ok(Self { preset_id, flock: Flock::new(&config)? })
    }

    pub fn new_custom(config: &FlockConfig) -> Result<Self, FlockError> {
        Ok(Self { preset_id: PRESET_CUSTOM, flock: Flock::new(config)? })
    }

    pub fn from_flock(flock: Flock) -> Self {
        Self { preset_id: PRESET_CUSTOM, flock }
    }

    pub fn preset_id(&self) -> &'static str { self.preset_id }

    pub fn flock(&self) -> &Flock { &self.flock }

    pub fn len(&self) -> usize { self.flock.len() }

    pub fn is_empty(&self) -> bool { self.flock.is_empty() }

    pub fn tick(&mut self, dt: f64) { self.flock.tick(dt); }

    pub fn outside_count(&self) -> usize { self.flock.count_outside() }

    /// `[x, y, z]` per agent.
    pub fn positions_flat(&self) -> Vec<f32> {
        let mut out = Vec::with_capacity(self.len() * 3);
        for p in self.flock.positions() {
            out.extend_from_slice(&[p.x as f32, p.y as f32, p.z as f32]);
        }
        out
    }

    /// `[x, y, z]` per agent: the point each model should look at.
    pub fn look_targets_flat(&self) -> Vec<f32> {
        let mut out = Vec::with_capacity(self.len() * 3);
        for t in self.flock.look_targets() {
            out.extend_from_slice(&[t.x as f32, t.y as f32, t.z as f32]);
        }
        out
    }

    /// `[x, y, z, w]` quaternion per agent, three.js component order.
    pub fn orientations_flat(&self) -> Vec<f32> {
        let mut out = Vec::with_capacity(self.len() * 4);
        for q in self.flock.orientations() {
            let q = q.quaternion();
            out.extend_from_slice(&[q.i as f32, q.j as f32, q.k as f32, q.w as f32]);
        }
        out
    }

    /// `[min.x, min.y, min.z, max.x, max.y, max.z]`
    pub fn boundary_flat(&self) -> Vec<f32> {
        self.flock.boundary().to_array().iter().map(|c| *c as f32).collect()
    }
}

fn normalize_preset_id(id: &str) -> Option<&'static str> {
    match id {
        PRESET_SKY_WIDGET => Some(PRESET_SKY_WIDGET),
        PRESET_PAGE => Some(PRESET_PAGE),
        PRESET_BANNER => Some(PRESET_BANNER),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_builtin_preset_builds() {
        for info in preset_catalog().iter().filter(|p| p.id != PRESET_CUSTOM) {
            let engine = Engine::new_builtin(info.id).unwrap();
            assert_eq!(engine.preset_id(), info.id);
            assert!(!engine.is_empty());
        }
    }

    #[test]
    fn unknown_preset_is_an_error() {
        assert!(matches!(
            Engine::new_builtin("murmuration"),
            Err(FlockError::UnknownPreset(id)) if id == "murmuration"
        ));
        assert!(Engine::new_builtin(PRESET_CUSTOM).is_err());
    }

    #[test]
    fn flat_buffers_have_per_agent_strides() {
        let mut engine = Engine::new_builtin(PRESET_BANNER).unwrap();
        engine.tick(1.0 / 60.0);
        let n = engine.len();
        assert_eq!(n, 30);
        assert_eq!(engine.positions_flat().len(), n * 3);
        assert_eq!(engine.look_targets_flat().len(), n * 3);
        assert_eq!(engine.orientations_flat().len(), n * 4);
        assert_eq!(engine.boundary_flat(), vec![-500.0, -150.0, -200.0, 500.0, 300.0, 50.0]);
    }

    #[test]
    fn orientations_are_unit_quaternions() {
        let engine = Engine::new_builtin(PRESET_SKY_WIDGET).unwrap();
        for q in engine.orientations_flat().chunks(4) {
            let norm2: f32 = q.iter().map(|c| c * c).sum();
            assert!((norm2 - 1.0).abs() < 1e-4);
        }
    }

    #[test]
    fn page_preset_shares_the_sky_widget_setup() {
        let page = preset_config(PRESET_PAGE).unwrap();
        let widget = preset_config(PRESET_SKY_WIDGET).unwrap();
        assert_eq!(page.count, 200);
        assert_eq!(page.boundary, widget.boundary);
        assert_eq!(page.agent, widget.agent);

        let engine = Engine::new_builtin(PRESET_PAGE).unwrap();
        assert_eq!(engine.len(), 200);
        assert_eq!(engine.flock().sample_size(), 20);
    }

    #[test]
    fn custom_engine_uses_given_config() {
        let config = FlockConfig { count: 12, ..FlockConfig::default() };
        let engine = Engine::new_custom(&config).unwrap();
        assert_eq!(engine.len(), 12);
        assert_eq!(engine.preset_id(), PRESET_CUSTOM);
        assert_eq!(engine.outside_count(), 0);
    }
}
