use crate::constants::{MAX_STEP_BUDGET, STEP_BUDGET_TOLERANCE};
use crate::params::ParameterBounds;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Weights applied to the three cost ratios when forming the scalar PI.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct CostWeights {
    /// Weight on the fraction of targets left uncollected.
    pub targets: f64,
    /// Weight on the fraction of the flight time consumed.
    pub time: f64,
    /// Weight on the fraction of drones lost.
    pub losses: f64,
}

impl CostWeights {
    /// Upper bound of PI for these weights (all ratios lie in [0, 1]).
    pub fn total(&self) -> f64 {
        self.targets + self.time + self.losses
    }
}

impl Default for CostWeights {
    fn default() -> Self {
        Self {
            targets: 70.0,
            time: 10.0,
            losses: 20.0,
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct SimConfig {
    /// Fixed explicit-Euler timestep (seconds).
    pub dt: f64,
    /// Flight horizon (seconds). The step budget is `ceil(max_flight_time / dt)`.
    pub max_flight_time: f64,
    /// Drone mass used in `v += dt * F / m`.
    pub drone_mass: f64,
    /// Frontal area used by the quadratic drag law.
    pub frontal_area: f64,
    /// Dimensionless drag coefficient.
    pub drag_coefficient: f64,
    /// Ambient air density.
    pub air_density: f64,
    /// Ambient air velocity; drag opposes velocity relative to it.
    pub air_velocity: [f64; 3],
    /// Magnitude of the propulsion force applied along the steering direction.
    pub propulsion_force: f64,
    /// Drone-target distance at or below which a target is captured.
    pub sight_range: f64,
    /// Drone-drone and drone-obstacle distance at or below which drones crash.
    pub crash_range: f64,
    /// Per-axis bound on |coordinate|; a drone beyond any bound is lost.
    pub domain_bounds: [f64; 3],
    pub cost_weights: CostWeights,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            dt: 0.2,
            max_flight_time: 60.0,
            drone_mass: 10.0,
            frontal_area: 1.0,
            drag_coefficient: 0.25,
            air_density: 1.225,
            air_velocity: [0.0; 3],
            propulsion_force: 200.0,
            sight_range: 5.0,
            crash_range: 2.0,
            domain_bounds: [150.0, 150.0, 60.0],
            cost_weights: CostWeights::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum SimConfigError {
    #[error("dt must be positive and finite")]
    InvalidDt,
    #[error("max_flight_time must be positive and finite")]
    InvalidMaxFlightTime,
    #[error("drone_mass must be positive and finite")]
    InvalidDroneMass,
    #[error("frontal_area must be finite and non-negative")]
    InvalidFrontalArea,
    #[error("drag_coefficient must be finite and non-negative")]
    InvalidDragCoefficient,
    #[error("air_density must be finite and non-negative")]
    InvalidAirDensity,
    #[error("air_velocity components must be finite")]
    InvalidAirVelocity,
    #[error("propulsion_force must be positive and finite")]
    InvalidPropulsionForce,
    #[error("sight_range must be positive and finite")]
    InvalidSightRange,
    #[error("crash_range must be positive and finite")]
    InvalidCrashRange,
    #[error("domain_bounds must be positive and finite on every axis")]
    InvalidDomainBounds,
    #[error("cost weights must be finite and non-negative")]
    InvalidCostWeights,
    #[error("step budget ({actual}) must be between 1 and {max}")]
    StepBudgetOutOfRange { max: usize, actual: f64 },
}

fn positive(v: f64) -> bool {
    v.is_finite() && v > 0.0
}

fn non_negative(v: f64) -> bool {
    v.is_finite() && v >= 0.0
}

impl SimConfig {
    pub const MAX_STEP_BUDGET: usize = MAX_STEP_BUDGET;

    pub fn validate(&self) -> Result<(), SimConfigError> {
        self.validate_timing()?;
        self.validate_physics()?;
        self.validate_events()?;
        self.validate_cost()?;
        Ok(())
    }

    fn validate_timing(&self) -> Result<(), SimConfigError> {
        if !positive(self.dt) {
            return Err(SimConfigError::InvalidDt);
        }
        if !positive(self.max_flight_time) {
            return Err(SimConfigError::InvalidMaxFlightTime);
        }
        let raw = self.raw_step_budget();
        if !(raw.is_finite() && raw <= Self::MAX_STEP_BUDGET as f64) || self.step_budget() == 0 {
            return Err(SimConfigError::StepBudgetOutOfRange {
                max: Self::MAX_STEP_BUDGET,
                actual: raw,
            });
        }
        Ok(())
    }

    fn validate_physics(&self) -> Result<(), SimConfigError> {
        if !positive(self.drone_mass) {
            return Err(SimConfigError::InvalidDroneMass);
        }
        if !non_negative(self.frontal_area) {
            return Err(SimConfigError::InvalidFrontalArea);
        }
        if !non_negative(self.drag_coefficient) {
            return Err(SimConfigError::InvalidDragCoefficient);
        }
        if !non_negative(self.air_density) {
            return Err(SimConfigError::InvalidAirDensity);
        }
        if !self.air_velocity.iter().all(|v| v.is_finite()) {
            return Err(SimConfigError::InvalidAirVelocity);
        }
        if !positive(self.propulsion_force) {
            return Err(SimConfigError::InvalidPropulsionForce);
        }
        Ok(())
    }

    fn validate_events(&self) -> Result<(), SimConfigError> {
        if !positive(self.sight_range) {
            return Err(SimConfigError::InvalidSightRange);
        }
        if !positive(self.crash_range) {
            return Err(SimConfigError::InvalidCrashRange);
        }
        if !self.domain_bounds.iter().all(|&b| positive(b)) {
            return Err(SimConfigError::InvalidDomainBounds);
        }
        Ok(())
    }

    fn validate_cost(&self) -> Result<(), SimConfigError> {
        let w = &self.cost_weights;
        if ![w.targets, w.time, w.losses].into_iter().all(non_negative) {
            return Err(SimConfigError::InvalidCostWeights);
        }
        Ok(())
    }

    fn raw_step_budget(&self) -> f64 {
        self.max_flight_time / self.dt
    }

    /// Number of steps the simulator may execute: `ceil(max_flight_time / dt)`,
    /// snapping ratios within rounding noise of an integer onto that integer.
    pub fn step_budget(&self) -> usize {
        let raw = self.raw_step_budget();
        let nearest = raw.round();
        let steps = if (raw - nearest).abs() <= STEP_BUDGET_TOLERANCE * nearest.max(1.0) {
            nearest
        } else {
            raw.ceil()
        };
        steps.max(0.0) as usize
    }

    /// Lumped quadratic drag factor `0.5 * rho * C_d * A`.
    pub fn drag_factor(&self) -> f64 {
        0.5 * self.air_density * self.drag_coefficient * self.frontal_area
    }
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct OptimizerConfig {
    /// Deterministic seed for population sampling and crossover blend factors.
    pub seed: u64,
    /// Number of parameter vectors per generation (S).
    pub population_size: usize,
    /// Number of evaluate-rank-breed cycles (G).
    pub generations: usize,
    /// Top-ranked vectors kept unchanged each generation (P).
    pub parents: usize,
    /// Offspring bred from consecutive parent pairs each generation (C).
    pub children: usize,
    /// Per-coefficient sampling interval.
    pub bounds: ParameterBounds,
}

impl Default for OptimizerConfig {
    fn default() -> Self {
        Self {
            seed: 42,
            population_size: 20,
            generations: 100,
            parents: 6,
            children: 6,
            bounds: ParameterBounds::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum OptimizerConfigError {
    #[error("population_size must be greater than 0")]
    InvalidPopulationSize,
    #[error("generations must be greater than 0")]
    InvalidGenerations,
    #[error("parents must be greater than 0")]
    InvalidParentCount,
    #[error("children ({children}) must be even so parents pair up")]
    OddChildCount { children: usize },
    #[error("children ({children}) must not exceed parents ({parents})")]
    TooManyChildren { parents: usize, children: usize },
    #[error("parents ({parents}) + children ({children}) exceed population_size ({population})")]
    PopulationTooSmall {
        population: usize,
        parents: usize,
        children: usize,
    },
    #[error("coefficient {index} bounds must be finite with lower <= upper")]
    InvalidBounds { index: usize },
}

impl OptimizerConfig {
    pub fn validate(&self) -> Result<(), OptimizerConfigError> {
        self.validate_shape()?;
        if let Some(index) = self.bounds.first_invalid() {
            return Err(OptimizerConfigError::InvalidBounds { index });
        }
        Ok(())
    }

    fn validate_shape(&self) -> Result<(), OptimizerConfigError> {
        if self.population_size == 0 {
            return Err(OptimizerConfigError::InvalidPopulationSize);
        }
        if self.generations == 0 {
            return Err(OptimizerConfigError::InvalidGenerations);
        }
        if self.parents == 0 {
            return Err(OptimizerConfigError::InvalidParentCount);
        }
        if self.children % 2 != 0 {
            return Err(OptimizerConfigError::OddChildCount {
                children: self.children,
            });
        }
        if self.children > self.parents {
            return Err(OptimizerConfigError::TooManyChildren {
                parents: self.parents,
                children: self.children,
            });
        }
        let bred = self.parents + self.children;
        if bred > self.population_size {
            return Err(OptimizerConfigError::PopulationTooSmall {
                population: self.population_size,
                parents: self.parents,
                children: self.children,
            });
        }
        Ok(())
    }

    /// Slots refilled with fresh uniform samples each generation (S - P - C).
    pub fn immigrants(&self) -> usize {
        self.population_size
            .saturating_sub(self.parents + self.children)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validate_accepts_defaults() {
        assert!(SimConfig::default().validate().is_ok());
        assert!(OptimizerConfig::default().validate().is_ok());
    }

    #[test]
    fn default_step_budget_snaps_to_integer_ratio() {
        let config = SimConfig::default();
        assert_eq!(config.step_budget(), 300);

        let config = SimConfig {
            dt: 0.1,
            max_flight_time: 0.7,
            ..SimConfig::default()
        };
        assert_eq!(config.step_budget(), 7);
    }

    #[test]
    fn step_budget_rounds_partial_steps_up() {
        let config = SimConfig {
            dt: 0.25,
            max_flight_time: 1.1,
            ..SimConfig::default()
        };
        assert_eq!(config.step_budget(), 5);
    }

    #[test]
    fn validate_rejects_bad_timing() {
        let config = SimConfig {
            dt: 0.0,
            ..SimConfig::default()
        };
        assert_eq!(config.validate(), Err(SimConfigError::InvalidDt));

        let config = SimConfig {
            max_flight_time: f64::NAN,
            ..SimConfig::default()
        };
        assert_eq!(config.validate(), Err(SimConfigError::InvalidMaxFlightTime));

        let config = SimConfig {
            dt: 1e-9,
            max_flight_time: 1e3,
            ..SimConfig::default()
        };
        assert!(matches!(
            config.validate(),
            Err(SimConfigError::StepBudgetOutOfRange { .. })
        ));
    }

    #[test]
    fn validate_rejects_bad_physics_and_events() {
        let config = SimConfig {
            drone_mass: -1.0,
            ..SimConfig::default()
        };
        assert_eq!(config.validate(), Err(SimConfigError::InvalidDroneMass));

        let config = SimConfig {
            air_velocity: [0.0, f64::INFINITY, 0.0],
            ..SimConfig::default()
        };
        assert_eq!(config.validate(), Err(SimConfigError::InvalidAirVelocity));

        let config = SimConfig {
            crash_range: 0.0,
            ..SimConfig::default()
        };
        assert_eq!(config.validate(), Err(SimConfigError::InvalidCrashRange));

        let config = SimConfig {
            domain_bounds: [150.0, 0.0, 60.0],
            ..SimConfig::default()
        };
        assert_eq!(config.validate(), Err(SimConfigError::InvalidDomainBounds));

        let config = SimConfig {
            cost_weights: CostWeights {
                time: -0.5,
                ..CostWeights::default()
            },
            ..SimConfig::default()
        };
        assert_eq!(config.validate(), Err(SimConfigError::InvalidCostWeights));
    }

    #[test]
    fn drag_factor_matches_default_constants() {
        let config = SimConfig::default();
        assert!((config.drag_factor() - 0.153125).abs() < 1e-12);
    }

    #[test]
    fn partial_config_json_deserializes_with_defaults() {
        let json = r#"{
            "dt": 0.5,
            "sight_range": 3.0,
            "cost_weights": { "targets": 1.0 }
        }"#;
        let cfg: SimConfig = serde_json::from_str(json).expect("partial config should parse");
        assert_eq!(cfg.dt, 0.5);
        assert_eq!(cfg.sight_range, 3.0);
        assert_eq!(cfg.crash_range, 2.0);
        assert_eq!(cfg.domain_bounds, [150.0, 150.0, 60.0]);
        assert_eq!(cfg.cost_weights.targets, 1.0);
        assert_eq!(cfg.cost_weights.time, 10.0);
        assert_eq!(cfg.cost_weights.losses, 20.0);

        let opt: OptimizerConfig =
            serde_json::from_str(r#"{ "generations": 3 }"#).expect("partial config should parse");
        assert_eq!(opt.generations, 3);
        assert_eq!(opt.population_size, 20);
        assert_eq!(opt.immigrants(), 8);
    }

    #[test]
    fn optimizer_validate_rejects_inconsistent_shapes() {
        let config = OptimizerConfig {
            children: 5,
            ..OptimizerConfig::default()
        };
        assert_eq!(
            config.validate(),
            Err(OptimizerConfigError::OddChildCount { children: 5 })
        );

        let config = OptimizerConfig {
            parents: 4,
            children: 6,
            ..OptimizerConfig::default()
        };
        assert_eq!(
            config.validate(),
            Err(OptimizerConfigError::TooManyChildren {
                parents: 4,
                children: 6
            })
        );

        let config = OptimizerConfig {
            population_size: 10,
            ..OptimizerConfig::default()
        };
        assert!(matches!(
            config.validate(),
            Err(OptimizerConfigError::PopulationTooSmall { .. })
        ));

        let config = OptimizerConfig {
            generations: 0,
            ..OptimizerConfig::default()
        };
        assert_eq!(
            config.validate(),
            Err(OptimizerConfigError::InvalidGenerations)
        );
    }

    #[test]
    fn optimizer_validate_rejects_inverted_bounds() {
        let mut config = OptimizerConfig::default();
        config.bounds.lower.0[3] = 5.0;
        assert_eq!(
            config.validate(),
            Err(OptimizerConfigError::InvalidBounds { index: 3 })
        );
    }

    #[test]
    fn error_display_messages_are_stable() {
        let cases = vec![
            (
                SimConfigError::InvalidDt.to_string(),
                "dt must be positive and finite",
            ),
            (
                SimConfigError::StepBudgetOutOfRange {
                    max: 10,
                    actual: 20.0,
                }
                .to_string(),
                "step budget (20) must be between 1 and 10",
            ),
            (
                OptimizerConfigError::PopulationTooSmall {
                    population: 10,
                    parents: 6,
                    children: 6,
                }
                .to_string(),
                "parents (6) + children (6) exceed population_size (10)",
            ),
            (
                OptimizerConfigError::InvalidBounds { index: 2 }.to_string(),
                "coefficient 2 bounds must be finite with lower <= upper",
            ),
        ];
        for (actual, expected) in cases {
            assert_eq!(actual, expected);
        }
    }
}
