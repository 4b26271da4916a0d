//! Genetic search over the 15 force-field coefficients.
//!
//! Each generation evaluates the slots without a known cost, ranks the
//! population, records statistics and then breeds the next generation:
//! parents are carried over, children are blended from consecutive parent
//! pairs and the remaining slots are filled with fresh random immigrants.

mod population;

pub use population::Population;

use crate::config::{OptimizerConfig, OptimizerConfigError, SimConfig};
use crate::entity::Scenario;
use crate::metrics::{CostRecord, GenerationStats, OptimizationReport};
use crate::params::ParameterVector;
use crate::rng::create_rng;
use crate::sim::{Simulation, SimulationError};
use thiserror::Error;
use tracing::info;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum OptimizerError {
    #[error(transparent)]
    Config(#[from] OptimizerConfigError),
    #[error(transparent)]
    Simulation(#[from] SimulationError),
}

pub struct GeneticOptimizer {
    scenario: Scenario,
    sim_config: SimConfig,
    config: OptimizerConfig,
}

impl GeneticOptimizer {
    /// Validates both configurations and the scenario before any search.
    pub fn new(
        scenario: Scenario,
        sim_config: SimConfig,
        config: OptimizerConfig,
    ) -> Result<Self, OptimizerError> {
        config.validate()?;
        Simulation::new(&scenario, config.bounds.lower, sim_config.clone())?;
        Ok(Self {
            scenario,
            sim_config,
            config,
        })
    }

    pub fn scenario(&self) -> &Scenario {
        &self.scenario
    }

    pub fn sim_config(&self) -> &SimConfig {
        &self.sim_config
    }

    pub fn config(&self) -> &OptimizerConfig {
        &self.config
    }

    /// Cost of one full simulation run for `params`.
    pub fn evaluate(&self, params: &ParameterVector) -> Result<CostRecord, SimulationError> {
        let sim = Simulation::new(&self.scenario, *params, self.sim_config.clone())?;
        Ok(sim.run().cost)
    }

    /// Evaluate every slot of `population` that has no cost yet.
    pub fn evaluate_pending(&self, population: &mut Population) -> Result<usize, SimulationError> {
        let records = self.evaluate_all(population.unevaluated())?;
        let count = records.len();
        population.extend_records(records);
        Ok(count)
    }

    #[cfg(not(feature = "parallel"))]
    fn evaluate_all(
        &self,
        members: &[ParameterVector],
    ) -> Result<Vec<CostRecord>, SimulationError> {
        members.iter().map(|p| self.evaluate(p)).collect()
    }

    #[cfg(feature = "parallel")]
    fn evaluate_all(
        &self,
        members: &[ParameterVector],
    ) -> Result<Vec<CostRecord>, SimulationError> {
        use rayon::prelude::*;
        members.par_iter().map(|p| self.evaluate(p)).collect()
    }

    pub fn run(&self) -> Result<OptimizationReport, OptimizerError> {
        let cfg = &self.config;
        info!(
            population = cfg.population_size,
            generations = cfg.generations,
            parents = cfg.parents,
            children = cfg.children,
            immigrants = cfg.immigrants(),
            seed = cfg.seed,
            "starting genetic search"
        );

        let mut rng = create_rng(cfg.seed);
        let mut population = Population::sample(cfg.population_size, &cfg.bounds, &mut rng);
        let mut best_history = Vec::with_capacity(cfg.generations);
        let mut generations = Vec::with_capacity(cfg.generations);
        let mut evaluations = 0;

        for generation in 0..cfg.generations {
            evaluations += self.evaluate_pending(&mut population)?;
            population.rank();

            let stats = GenerationStats::from_ranked(generation, population.records(), cfg.parents);
            info!(
                generation,
                best = stats.cost.best,
                parent_mean = stats.cost.parent_mean,
                mean = stats.cost.mean,
                "generation ranked"
            );
            generations.push(stats);
            best_history.push(population.members()[0]);

            if generation + 1 < cfg.generations {
                population.breed(cfg.parents, cfg.children, &cfg.bounds, &mut rng);
            }
        }

        // Slot 0 of the last ranking; the population is never empty after validation.
        let best = population.members()[0];
        let best_cost = population.records()[0];
        info!(cost = best_cost.total, evaluations, "genetic search finished");

        Ok(OptimizationReport {
            best,
            best_cost,
            best_history,
            generations,
            evaluations,
        })
    }
}
