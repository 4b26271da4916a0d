//! Fixed-step swarm simulator.
//!
//! Each step runs the phases in order: geometry refresh, event detection and
//! removal, termination check, propulsion/drag integration, frame recording.

mod phases;

use crate::config::{SimConfig, SimConfigError};
use crate::entity::{Drone, Scenario, Target};
use crate::events::{EventRules, StepEvents};
use crate::field::Geometry;
use crate::metrics::{CostRecord, Trajectory};
use crate::params::ParameterVector;
use crate::vec3::Vec3;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TerminationReason {
    /// Every target was captured.
    TargetsCleared,
    /// Every drone was lost.
    SwarmLost,
    /// The step budget ran out.
    TimeExhausted,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StepOutcome {
    Running,
    Terminated(TerminationReason),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
struct Termination {
    reason: TerminationReason,
    /// Index of the last executed step.
    steps_used: usize,
}

/// Everything a finished run produces.
#[derive(Clone, Debug, PartialEq)]
pub struct SimulationOutcome {
    pub cost: CostRecord,
    /// Index of the last executed step (0 when the run ends on its first step).
    pub steps_used: usize,
    pub termination: TerminationReason,
    /// Empty unless recording was enabled with [`Simulation::with_trajectory`].
    pub trajectory: Trajectory,
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum SimulationError {
    #[error(transparent)]
    Config(#[from] SimConfigError),
    #[error("{set}[{index}] has a non-finite coordinate")]
    NonFiniteCoordinate { set: &'static str, index: usize },
}

pub struct Simulation {
    config: SimConfig,
    params: ParameterVector,
    rules: EventRules,
    drones: Vec<Drone>,
    targets: Vec<Target>,
    obstacles: Vec<Vec3>,
    geometry: Geometry,
    step_budget: usize,
    step_index: usize,
    initial_drones: usize,
    initial_targets: usize,
    active_drones: usize,
    active_targets: usize,
    last_events: StepEvents,
    termination: Option<Termination>,
    trajectory: Option<Trajectory>,

    // Reused every step to avoid allocation
    force_buffer: Vec<Vec3>,
}

impl Simulation {
    /// Set up a run from its own copy of the scenario. Drones start at rest.
    pub fn new(
        scenario: &Scenario,
        params: ParameterVector,
        config: SimConfig,
    ) -> Result<Self, SimulationError> {
        config.validate()?;
        if let Some((set, index)) = scenario.first_non_finite() {
            return Err(SimulationError::NonFiniteCoordinate { set, index });
        }

        let drones = scenario.spawn_drones();
        let targets = scenario.spawn_targets();
        let obstacles = scenario.obstacles.clone();
        let geometry = Geometry::new(drones.len(), targets.len(), obstacles.len());
        let force_buffer = vec![[0.0; 3]; drones.len()];

        Ok(Self {
            rules: EventRules::from_config(&config),
            step_budget: config.step_budget(),
            config,
            params,
            initial_drones: drones.len(),
            initial_targets: targets.len(),
            active_drones: drones.len(),
            active_targets: targets.len(),
            drones,
            targets,
            obstacles,
            geometry,
            step_index: 0,
            last_events: StepEvents::default(),
            termination: None,
            trajectory: None,
            force_buffer,
        })
    }

    /// Record a frame before the first step and after every integration.
    pub fn with_trajectory(mut self) -> Self {
        if self.trajectory.is_none() && self.step_index == 0 && self.termination.is_none() {
            self.trajectory = Some(Trajectory::default());
            self.record_frame(0);
        }
        self
    }

    pub fn config(&self) -> &SimConfig {
        &self.config
    }

    pub fn params(&self) -> &ParameterVector {
        &self.params
    }

    pub fn drones(&self) -> &[Drone] {
        &self.drones
    }

    pub fn targets(&self) -> &[Target] {
        &self.targets
    }

    pub fn obstacles(&self) -> &[Vec3] {
        &self.obstacles
    }

    pub fn active_drones(&self) -> usize {
        self.active_drones
    }

    pub fn active_targets(&self) -> usize {
        self.active_targets
    }

    pub fn step_index(&self) -> usize {
        self.step_index
    }

    pub fn step_budget(&self) -> usize {
        self.step_budget
    }

    /// Removals decided during the most recent step.
    pub fn last_events(&self) -> &StepEvents {
        &self.last_events
    }

    pub fn is_terminated(&self) -> bool {
        self.termination.is_some()
    }

    pub fn step(&mut self) -> StepOutcome {
        if let Some(t) = self.termination {
            return StepOutcome::Terminated(t.reason);
        }

        self.step_geometry_phase();
        self.step_event_phase();

        if let Some(reason) = self.depletion() {
            return self.terminate(reason);
        }

        self.step_motion_phase();
        self.record_frame(self.step_index + 1);

        if self.step_index + 1 >= self.step_budget {
            return self.terminate(TerminationReason::TimeExhausted);
        }
        self.step_index += 1;
        StepOutcome::Running
    }

    /// Step until termination and return the outcome.
    pub fn run(mut self) -> SimulationOutcome {
        while self.step() == StepOutcome::Running {}
        self.into_outcome()
    }

    /// Cost of the run so far, treating the current step as the last one.
    pub fn cost(&self) -> CostRecord {
        let steps_used = self.termination.map_or(self.step_index, |t| t.steps_used);
        CostRecord::compute(
            self.active_targets,
            self.initial_targets,
            steps_used as f64 * self.config.dt / self.config.max_flight_time,
            self.initial_drones - self.active_drones,
            self.initial_drones,
            &self.config.cost_weights,
        )
    }

    fn into_outcome(self) -> SimulationOutcome {
        let cost = self.cost();
        let termination = self.termination.unwrap_or(Termination {
            reason: TerminationReason::TimeExhausted,
            steps_used: self.step_index,
        });
        debug!(
            reason = ?termination.reason,
            steps_used = termination.steps_used,
            cost = cost.total,
            "simulation finished"
        );
        SimulationOutcome {
            cost,
            steps_used: termination.steps_used,
            termination: termination.reason,
            trajectory: self.trajectory.unwrap_or_default(),
        }
    }

    fn depletion(&self) -> Option<TerminationReason> {
        if self.active_targets == 0 {
            Some(TerminationReason::TargetsCleared)
        } else if self.active_drones == 0 {
            Some(TerminationReason::SwarmLost)
        } else {
            None
        }
    }

    fn terminate(&mut self, reason: TerminationReason) -> StepOutcome {
        self.termination = Some(Termination {
            reason,
            steps_used: self.step_index,
        });
        StepOutcome::Terminated(reason)
    }
}
