use crate::config::CostWeights;
use crate::params::ParameterVector;
use crate::vec3::Vec3;
use serde::{Deserialize, Serialize};

/// Cost of one simulation run: three ratios in [0, 1] and their weighted sum.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct CostRecord {
    /// Fraction of targets left uncollected.
    pub targets_remaining: f64,
    /// Fraction of the flight horizon consumed.
    pub time_used: f64,
    /// Fraction of drones lost.
    pub drones_lost: f64,
    /// Weighted sum (PI). Lower is better.
    pub total: f64,
}

fn ratio(part: usize, whole: usize, empty: f64) -> f64 {
    if whole == 0 {
        empty
    } else {
        part as f64 / whole as f64
    }
}

impl CostRecord {
    /// An empty target set counts as fully collected; an empty swarm counts
    /// as fully lost.
    pub fn compute(
        remaining_targets: usize,
        initial_targets: usize,
        time_used: f64,
        lost_drones: usize,
        initial_drones: usize,
        weights: &CostWeights,
    ) -> Self {
        let targets_remaining = ratio(remaining_targets, initial_targets, 0.0);
        let drones_lost = ratio(lost_drones, initial_drones, 1.0);
        let time_used = time_used.clamp(0.0, 1.0);
        Self {
            targets_remaining,
            time_used,
            drones_lost,
            total: weights.targets * targets_remaining
                + weights.time * time_used
                + weights.losses * drones_lost,
        }
    }

    pub fn components(&self) -> [f64; 3] {
        [self.targets_remaining, self.time_used, self.drones_lost]
    }
}

/// Positions of every slot at one instant; removed entities are `None`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Frame {
    pub step: usize,
    pub drones: Vec<Option<Vec3>>,
    pub targets: Vec<Option<Vec3>>,
    pub active_drones: usize,
    pub active_targets: usize,
}

/// Append-only frame history of a single run.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Trajectory {
    frames: Vec<Frame>,
}

impl Trajectory {
    pub fn push(&mut self, frame: Frame) {
        self.frames.push(frame);
    }

    pub fn frames(&self) -> &[Frame] {
        &self.frames
    }

    pub fn len(&self) -> usize {
        self.frames.len()
    }

    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    /// Path of one drone across all frames.
    pub fn drone_path(&self, drone: usize) -> Vec<Option<Vec3>> {
        self.frames
            .iter()
            .map(|f| f.drones.get(drone).copied().flatten())
            .collect()
    }
}

/// Best / top-P mean / population mean of one quantity within a generation.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct SummaryTriple {
    pub best: f64,
    pub parent_mean: f64,
    pub mean: f64,
}

fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        0.0
    } else {
        values.iter().sum::<f64>() / values.len() as f64
    }
}

impl SummaryTriple {
    /// `ranked` must already be in population rank order (best first).
    pub fn from_ranked(ranked: &[f64], parents: usize) -> Self {
        Self {
            best: ranked.first().copied().unwrap_or(0.0),
            parent_mean: mean(&ranked[..parents.min(ranked.len())]),
            mean: mean(ranked),
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct GenerationStats {
    pub generation: usize,
    /// Aggregate cost (PI).
    pub cost: SummaryTriple,
    pub targets_remaining: SummaryTriple,
    pub time_used: SummaryTriple,
    pub drones_lost: SummaryTriple,
}

/// Tracked quantity of a generation: the aggregate cost or one of its ratios.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Quantity {
    Cost,
    TargetsRemaining,
    TimeUsed,
    DronesLost,
}

impl Quantity {
    pub const ALL: [Quantity; 4] = [
        Quantity::Cost,
        Quantity::TargetsRemaining,
        Quantity::TimeUsed,
        Quantity::DronesLost,
    ];
}

impl GenerationStats {
    pub fn summary(&self, quantity: Quantity) -> SummaryTriple {
        match quantity {
            Quantity::Cost => self.cost,
            Quantity::TargetsRemaining => self.targets_remaining,
            Quantity::TimeUsed => self.time_used,
            Quantity::DronesLost => self.drones_lost,
        }
    }

    /// `records` must be in rank order, best first.
    pub fn from_ranked(generation: usize, records: &[CostRecord], parents: usize) -> Self {
        let column = |f: fn(&CostRecord) -> f64| -> SummaryTriple {
            let values: Vec<f64> = records.iter().map(f).collect();
            SummaryTriple::from_ranked(&values, parents)
        };
        Self {
            generation,
            cost: column(|r| r.total),
            targets_remaining: column(|r| r.targets_remaining),
            time_used: column(|r| r.time_used),
            drones_lost: column(|r| r.drones_lost),
        }
    }
}

/// Final result of a genetic search.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct OptimizationReport {
    /// Best vector of the final generation.
    pub best: ParameterVector,
    pub best_cost: CostRecord,
    /// Slot-0 vector after ranking, one per generation.
    pub best_history: Vec<ParameterVector>,
    pub generations: Vec<GenerationStats>,
    /// Total simulation runs performed.
    pub evaluations: usize,
}

impl OptimizationReport {
    /// One value per generation, selected by `f`.
    pub fn series<F>(&self, f: F) -> Vec<f64>
    where
        F: Fn(&GenerationStats) -> f64,
    {
        self.generations.iter().map(f).collect()
    }

    pub fn best_series(&self, quantity: Quantity) -> Vec<f64> {
        self.series(|g| g.summary(quantity).best)
    }

    pub fn parent_mean_series(&self, quantity: Quantity) -> Vec<f64> {
        self.series(|g| g.summary(quantity).parent_mean)
    }

    pub fn mean_series(&self, quantity: Quantity) -> Vec<f64> {
        self.series(|g| g.summary(quantity).mean)
    }
}
