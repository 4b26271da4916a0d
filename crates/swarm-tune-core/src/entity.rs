use crate::vec3::{self, Vec3};
use serde::{Deserialize, Serialize};

/// A mobile agent. Slots are never reallocated: a removed drone keeps its
/// index with `active == false` for the rest of the run.
#[derive(Clone, Debug, PartialEq)]
pub struct Drone {
    pub position: Vec3,
    pub velocity: Vec3,
    pub active: bool,
}

impl Drone {
    pub fn new(position: Vec3) -> Self {
        Self {
            position,
            velocity: vec3::ZERO,
            active: true,
        }
    }

    /// Remove the drone from every further distance and force computation.
    pub fn deactivate(&mut self) {
        self.active = false;
        self.velocity = vec3::ZERO;
    }
}

/// A stationary point collected when any active drone comes within sight range.
#[derive(Clone, Debug, PartialEq)]
pub struct Target {
    pub position: Vec3,
    pub active: bool,
}

impl Target {
    pub fn new(position: Vec3) -> Self {
        Self {
            position,
            active: true,
        }
    }
}

/// Initial coordinate sets for one simulation run. Shared read-only across
/// every population member; each run copies it into its own state.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Scenario {
    pub drones: Vec<Vec3>,
    pub obstacles: Vec<Vec3>,
    pub targets: Vec<Vec3>,
}

impl Scenario {
    pub fn new(drones: Vec<Vec3>, obstacles: Vec<Vec3>, targets: Vec<Vec3>) -> Self {
        Self {
            drones,
            obstacles,
            targets,
        }
    }

    /// First coordinate that is NaN or infinite, as (set name, index).
    pub fn first_non_finite(&self) -> Option<(&'static str, usize)> {
        let sets: [(&'static str, &[Vec3]); 3] = [
            ("drones", self.drones.as_slice()),
            ("obstacles", self.obstacles.as_slice()),
            ("targets", self.targets.as_slice()),
        ];
        sets.into_iter().find_map(|(name, points)| {
            points
                .iter()
                .position(|p| !vec3::is_finite(*p))
                .map(|index| (name, index))
        })
    }

    pub(crate) fn spawn_drones(&self) -> Vec<Drone> {
        self.drones.iter().copied().map(Drone::new).collect()
    }

    pub(crate) fn spawn_targets(&self) -> Vec<Target> {
        self.targets.iter().copied().map(Target::new).collect()
    }
}
