//! Force field model: pairwise drone separations, the exponential
//! attraction/repulsion kernel, global-norm steering and quadratic drag.

use crate::entity::{Drone, Target};
use crate::params::{InteractionKernel, ParameterVector};
use crate::vec3::{self, Vec3};

/// Displacement from a drone to another entity and its Euclidean length.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Separation {
    /// `other - drone`.
    pub offset: Vec3,
    pub distance: f64,
}

impl Separation {
    fn between(from: Vec3, to: Vec3) -> Self {
        let offset = vec3::sub(to, from);
        Self {
            offset,
            distance: vec3::norm(offset),
        }
    }
}

/// Dense drones x entities separation table, recomputed every step.
/// A cell is `None` when either side is inactive (or on the drone-drone diagonal).
#[derive(Clone, Debug, Default)]
pub struct PairTensor {
    rows: usize,
    cols: usize,
    cells: Vec<Option<Separation>>,
}

impl PairTensor {
    pub fn new(rows: usize, cols: usize) -> Self {
        Self {
            rows,
            cols,
            cells: vec![None; rows * cols],
        }
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    pub fn get(&self, row: usize, col: usize) -> Option<Separation> {
        self.cells[row * self.cols + col]
    }

    pub fn row(&self, row: usize) -> &[Option<Separation>] {
        &self.cells[row * self.cols..(row + 1) * self.cols]
    }

    pub fn invalidate_row(&mut self, row: usize) {
        let cols = self.cols;
        self.cells[row * cols..(row + 1) * cols].fill(None);
    }

    pub fn invalidate_col(&mut self, col: usize) {
        for row in 0..self.rows {
            self.cells[row * self.cols + col] = None;
        }
    }

    /// Recompute every cell. `other(j)` yields the position of column `j`
    /// when that entity is active.
    fn refresh_with<F>(&mut self, drones: &[Drone], skip_diagonal: bool, other: F)
    where
        F: Fn(usize) -> Option<Vec3>,
    {
        debug_assert_eq!(drones.len(), self.rows);
        for (i, drone) in drones.iter().enumerate() {
            let row = &mut self.cells[i * self.cols..(i + 1) * self.cols];
            for (j, cell) in row.iter_mut().enumerate() {
                *cell = match other(j) {
                    Some(p) if drone.active && !(skip_diagonal && i == j) => {
                        Some(Separation::between(drone.position, p))
                    }
                    _ => None,
                };
            }
        }
    }
}

/// The three separation tables consumed by event detection and steering.
#[derive(Clone, Debug, Default)]
pub struct Geometry {
    pub drone_target: PairTensor,
    pub drone_drone: PairTensor,
    pub drone_obstacle: PairTensor,
}

impl Geometry {
    pub fn new(drones: usize, targets: usize, obstacles: usize) -> Self {
        Self {
            drone_target: PairTensor::new(drones, targets),
            drone_drone: PairTensor::new(drones, drones),
            drone_obstacle: PairTensor::new(drones, obstacles),
        }
    }

    pub fn refresh(&mut self, drones: &[Drone], targets: &[Target], obstacles: &[Vec3]) {
        self.drone_target.refresh_with(drones, false, |j| {
            targets[j].active.then_some(targets[j].position)
        });
        self.drone_drone.refresh_with(drones, true, |j| {
            drones[j].active.then_some(drones[j].position)
        });
        self.drone_obstacle
            .refresh_with(drones, false, |j| Some(obstacles[j]));
    }

    /// Drop a removed drone from every table (its row, and its column in drone-drone).
    pub fn invalidate_drone(&mut self, drone: usize) {
        self.drone_target.invalidate_row(drone);
        self.drone_obstacle.invalidate_row(drone);
        self.drone_drone.invalidate_row(drone);
        self.drone_drone.invalidate_col(drone);
    }

    pub fn invalidate_target(&mut self, target: usize) {
        self.drone_target.invalidate_col(target);
    }
}

/// Sum of kernel-scaled unit vectors over the valid cells of one row.
pub fn interaction_sum(row: &[Option<Separation>], kernel: &InteractionKernel) -> Vec3 {
    let mut acc = vec3::ZERO;
    for sep in row.iter().flatten() {
        if sep.distance > 0.0 {
            add_kernel_term(&mut acc, sep, kernel);
        }
    }
    acc
}

#[inline]
fn add_kernel_term(acc: &mut Vec3, sep: &Separation, kernel: &InteractionKernel) {
    vec3::add_scaled(
        acc,
        sep.offset,
        kernel.magnitude(sep.distance) / sep.distance,
    );
}

/// Combined, weighted steering vector for one active drone.
pub fn steering_vector(geometry: &Geometry, drone: usize, params: &ParameterVector) -> Vec3 {
    let to_targets = interaction_sum(geometry.drone_target.row(drone), &params.target_kernel());
    let to_obstacles = interaction_sum(
        geometry.drone_obstacle.row(drone),
        &params.obstacle_kernel(),
    );
    let to_swarm = interaction_sum(geometry.drone_drone.row(drone), &params.swarm_kernel());

    let mut combined = vec3::scale(to_targets, params.target_weight());
    vec3::add_scaled(&mut combined, to_obstacles, params.obstacle_weight());
    vec3::add_scaled(&mut combined, to_swarm, params.swarm_weight());
    combined
}

/// Fill `out` with the propulsion force of every drone.
///
/// Steering vectors are stacked and divided by the norm of the whole stack
/// (not per drone), then scaled to `propulsion_force`. Inactive drones get
/// zero. If the stacked norm is zero or not finite every force is zero.
/// Returns the stacked norm.
pub fn propulsion_forces(
    geometry: &Geometry,
    drones: &[Drone],
    params: &ParameterVector,
    propulsion_force: f64,
    out: &mut [Vec3],
) -> f64 {
    debug_assert_eq!(drones.len(), out.len());
    let mut norm_sq = 0.0;
    for (i, (drone, slot)) in drones.iter().zip(out.iter_mut()).enumerate() {
        *slot = if drone.active {
            let v = steering_vector(geometry, i, params);
            norm_sq += vec3::norm_sq(v);
            v
        } else {
            vec3::ZERO
        };
    }

    let global_norm = norm_sq.sqrt();
    if !(global_norm.is_finite() && global_norm > 0.0) {
        out.fill(vec3::ZERO);
        return global_norm;
    }
    let factor = propulsion_force / global_norm;
    for slot in out.iter_mut() {
        *slot = vec3::scale(*slot, factor);
    }
    global_norm
}

/// Quadratic drag `k * |v_air - v| * (v_air - v)` with `k = 0.5 * rho * C_d * A`.
pub fn drag_force(velocity: Vec3, air_velocity: Vec3, drag_factor: f64) -> Vec3 {
    let relative = vec3::sub(air_velocity, velocity);
    vec3::scale(relative, drag_factor * vec3::norm(relative))
}
