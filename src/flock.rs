use crate::FlockError;
use crate::algorithms::flocking::AgentParams;
use crate::boundary::{Boundary, BoundaryConfig};
use crate::models::agent::{Agent, Neighbor};
use nalgebra::{UnitQuaternion, Vector3};
use rand::Rng;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

pub const DEFAULT_AGENT_COUNT: usize = 50;
pub const DEFAULT_NEIGHBOR_SAMPLE_DIVISOR: usize = 10;
pub const DEFAULT_DIAGNOSTICS_INTERVAL: u64 = 600;
pub const DEFAULT_BOUNDARY: BoundaryConfig = BoundaryConfig {
    min: [-400.0, 0.0, -500.0],
    max: [1000.0, 800.0, 150.0],
};

/// Which state an agent's neighbors expose while a tick is in progress.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UpdateOrder {
    /// Agents move one after another; later agents see earlier agents' new state.
    #[default]
    Sequential,
    /// Every agent sees the state from the start of the tick.
    Snapshot,
}

/// Everything needed to build a [`Flock`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FlockConfig {
    pub count: usize,
    pub boundary: BoundaryConfig,
    pub agent: AgentParams,
    /// Neighbor samples hold at most `count / neighbor_sample_divisor` agents.
    pub neighbor_sample_divisor: usize,
    pub update_order: UpdateOrder,
    /// Ticks between "agents outside the boundary" debug reports; 0 disables them.
    pub diagnostics_interval: u64,
}

impl Default for FlockConfig {
    fn default() -> Self {
        Self {
            count: DEFAULT_AGENT_COUNT,
            boundary: DEFAULT_BOUNDARY,
            agent: AgentParams::default(),
            neighbor_sample_divisor: DEFAULT_NEIGHBOR_SAMPLE_DIVISOR,
            update_order: UpdateOrder::default(),
            diagnostics_interval: DEFAULT_DIAGNOSTICS_INTERVAL,
        }
    }
}

impl FlockConfig {
    pub fn validate(&self) -> Result<Boundary, FlockError> {
        if self.neighbor_sample_divisor == 0 {
            return Err(FlockError::ZeroSampleDivisor);
        }
        self.agent.validate()?;
        self.boundary.build()
    }
}

/// Read-only view of one agent for hosts and debug output.
#[derive(Debug, Clone, Serialize)]
pub struct AgentSnapshot {
    pub position: [f64; 3],
    pub velocity: [f64; 3],
    pub look_target: [f64; 3],
    /// `[x, y, z, w]`
    pub orientation: [f64; 4],
}

/// Fixed-size set of agents sharing one boundary.
#[derive(Debug)]
pub struct Flock {
    agents: Vec<Agent>,
    boundary: Boundary,
    sample_size: usize,
    update_order: UpdateOrder,
    diagnostics_interval: u64,
    ticks: u64,
    time: f64,

    // reused every tick to avoid allocating
    snapshot: Vec<Neighbor>,
    sample: Vec<Neighbor>,
}

impl Flock {
    pub fn new(config: &FlockConfig) -> Result<Self, FlockError> {
        Self::with_rng(config, &mut rand::rng())
    }

    /// Like [`Flock::new`], drawing spawn positions and headings from `rng`.
    pub fn with_rng<R: Rng>(config: &FlockConfig, rng: &mut R) -> Result<Self, FlockError> {
        let boundary = config.validate()?;
        let agents = (0..config.count)
            .map(|_| Agent::spawn(config.agent.clone(), &boundary, rng))
            .collect();
        Self::assemble(config, boundary, agents)
    }

    /// Flock from explicitly placed agents. `config.count` is ignored.
    pub fn from_agents(config: &FlockConfig, agents: Vec<Agent>) -> Result<Self, FlockError> {
        let boundary = config.validate()?;
        for agent in &agents {
            agent.params().validate()?;
        }
        Self::assemble(config, boundary, agents)
    }

    fn assemble(
        config: &FlockConfig,
        boundary: Boundary,
        agents: Vec<Agent>,
    ) -> Result<Self, FlockError> {
        let n = agents.len();
        let sample_size = n / config.neighbor_sample_divisor;
        info!(
            agents = n,
            sample_size,
            order = ?config.update_order,
            "flock created"
        );
        Ok(Self {
            agents,
            boundary,
            sample_size,
            update_order: config.update_order,
            diagnostics_interval: config.diagnostics_interval,
            ticks: 0,
            time: 0.0,
            snapshot: Vec::with_capacity(n),
            sample: Vec::with_capacity(sample_size),
        })
    }

    pub fn len(&self) -> usize { self.agents.len() }

    pub fn is_empty(&self) -> bool { self.agents.is_empty() }

    pub fn boundary(&self) -> &Boundary { &self.boundary }

    pub fn agents(&self) -> &[Agent] { &self.agents }

    pub fn sample_size(&self) -> usize { self.sample_size }

    pub fn update_order(&self) -> UpdateOrder { self.update_order }

    pub fn ticks(&self) -> u64 { self.ticks }

    /// Simulated seconds accumulated over all applied ticks.
    pub fn time(&self) -> f64 { self.time }

    /// Advance every agent by `dt` seconds. Negative or non-finite deltas are skipped.
    pub fn tick(&mut self, dt: f64) {
        if !dt.is_finite() || dt < 0.0 {
            warn!(dt, "ignoring invalid frame delta");
            return;
        }
        if self.agents.is_empty() {
            return;
        }

        match self.update_order {
            UpdateOrder::Sequential => self.tick_sequential(dt),
            UpdateOrder::Snapshot => self.tick_snapshot(dt),
        }

        self.ticks += 1;
        self.time += dt;

        if self.diagnostics_interval > 0 && self.ticks % self.diagnostics_interval == 0 {
            debug!(
                ticks = self.ticks,
                outside = self.count_outside(),
                "agents outside boundary"
            );
        }
    }

    fn tick_sequential(&mut self, dt: f64) {
        for i in 0..self.agents.len() {
            let range = self.agents[i].params().detection_range;
            let candidates = self.agents.iter().map(Agent::as_neighbor);
            fill_sample(candidates, i, range, self.sample_size, &mut self.sample);
            self.agents[i].update(dt, &self.boundary, &self.sample);
        }
    }

    #[cfg(not(feature = "parallel"))]
    fn tick_snapshot(&mut self, dt: f64) {
        self.take_snapshot();
        for (i, agent) in self.agents.iter_mut().enumerate() {
            let range = agent.params().detection_range;
            fill_sample(self.snapshot.iter().copied(), i, range, self.sample_size, &mut self.sample);
            agent.update(dt, &self.boundary, &self.sample);
        }
    }

    #[cfg(feature = "parallel")]
    fn tick_snapshot(&mut self, dt: f64) {
        use rayon::prelude::*;
        self.take_snapshot();
        let snapshot = &self.snapshot;
        let boundary = &self.boundary;
        let sample_size = self.sample_size;
        self.agents.par_iter_mut().enumerate().for_each_init(
            || Vec::with_capacity(sample_size),
            |sample, (i, agent)| {
                let range = agent.params().detection_range;
                fill_sample(snapshot.iter().copied(), i, range, sample_size, sample);
                agent.update(dt, boundary, sample);
            },
        );
    }

    fn take_snapshot(&mut self) {
        self.snapshot.clear();
        self.snapshot.extend(self.agents.iter().map(Agent::as_neighbor));
    }

    /// Neighbor sample agent `index` would receive right now.
    pub fn neighbors_of(&self, index: usize) -> Vec<Neighbor> {
        let mut out = Vec::with_capacity(self.sample_size);
        if let Some(agent) = self.agents.get(index) {
            let range = agent.params().detection_range;
            let candidates = self.agents.iter().map(Agent::as_neighbor);
            fill_sample(candidates, index, range, self.sample_size, &mut out);
        }
        out
    }

    pub fn count_outside(&self) -> usize {
        self.agents
            .iter()
            .filter(|a| !self.boundary.contains(a.position()))
            .count()
    }

    pub fn positions(&self) -> impl Iterator<Item = Vector3<f64>> + '_ {
        self.agents.iter().map(|a| *a.position())
    }

    pub fn look_targets(&self) -> impl Iterator<Item = Vector3<f64>> + '_ {
        self.agents.iter().map(Agent::look_target)
    }

    pub fn orientations(&self) -> impl Iterator<Item = UnitQuaternion<f64>> + '_ {
        self.agents.iter().map(|a| *a.orientation())
    }

    /// Mean agent position, or `None` for an empty flock.
    pub fn centroid(&self) -> Option<Vector3<f64>> {
        if self.agents.is_empty() {
            return None;
        }
        let sum = self.positions().fold(Vector3::zeros(), |acc, p| acc + p);
        Some(sum / self.agents.len() as f64)
    }

    pub fn mean_speed(&self) -> f64 {
        if self.agents.is_empty() {
            return 0.0;
        }
        self.agents.iter().map(Agent::speed).sum::<f64>() / self.agents.len() as f64
    }

    pub fn agent_snapshots(&self) -> Vec<AgentSnapshot> {
        self.agents
            .iter()
            .map(|a| {
                let p = a.position();
                let v = a.velocity();
                let t = a.look_target();
                let q = a.orientation().quaternion();
                AgentSnapshot {
                    position: [p.x, p.y, p.z],
                    velocity: [v.x, v.y, v.z],
                    look_target: [t.x, t.y, t.z],
                    orientation: [q.i, q.j, q.k, q.w],
                }
            })
            .collect()
    }
}

/// First `limit` candidates (in iteration order, skipping `index` itself) closer than
/// `range` to the candidate at `index`. Not the closest `limit`: whichever come first.
pub fn fill_sample<I>(candidates: I, index: usize, range: f64, limit: usize, out: &mut Vec<Neighbor>)
where
    I: Iterator<Item = Neighbor> + Clone,
{
    out.clear();
    if limit == 0 {
        return;
    }
    let Some(origin) = candidates.clone().nth(index).map(|n| n.position) else {
        return;
    };
    let range2 = range * range;
    out.extend(
        candidates
            .enumerate()
            .filter(|(j, n)| *j != index && (n.position - origin).norm_squared() < range2)
            .map(|(_, n)| n)
            .take(limit),
    );
}
