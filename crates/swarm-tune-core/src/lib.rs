pub mod config;
pub mod constants;
pub mod entity;
pub mod events;
pub mod field;
pub mod metrics;
pub mod optimizer;
pub mod params;
pub mod rng;
pub mod sim;
pub mod vec3;

pub use config::{CostWeights, OptimizerConfig, OptimizerConfigError, SimConfig, SimConfigError};
pub use entity::{Drone, Scenario, Target};
pub use metrics::{
    CostRecord, Frame, GenerationStats, OptimizationReport, Quantity, SummaryTriple, Trajectory,
};
pub use optimizer::{GeneticOptimizer, OptimizerError, Population};
pub use params::{InteractionKernel, ParameterBounds, ParameterVector};
pub use sim::{Simulation, SimulationError, SimulationOutcome, StepOutcome, TerminationReason};
