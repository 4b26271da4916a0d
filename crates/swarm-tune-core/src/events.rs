//! Event detection: target capture, drone collisions and domain exits.
//!
//! Detection reads the separation tables of the current step; removal then
//! deactivates every affected entity at once, so nothing removed this step
//! influences (or is influenced by) the following force computation.

use crate::config::SimConfig;
use crate::entity::{Drone, Target};
use crate::field::{Geometry, PairTensor};
use crate::vec3::Vec3;

/// Proximity thresholds and domain bounds used each step.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct EventRules {
    pub sight_range: f64,
    pub crash_range: f64,
    pub domain_bounds: Vec3,
}

impl EventRules {
    pub fn from_config(config: &SimConfig) -> Self {
        Self {
            sight_range: config.sight_range,
            crash_range: config.crash_range,
            domain_bounds: config.domain_bounds,
        }
    }
}

/// Removals decided for one step. All index lists are sorted and unique.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct StepEvents {
    pub captured_targets: Vec<usize>,
    /// Drones within crash range of another active drone (both sides listed).
    pub drone_collisions: Vec<usize>,
    pub obstacle_collisions: Vec<usize>,
    pub domain_exits: Vec<usize>,
    /// Union of the three loss causes.
    pub lost_drones: Vec<usize>,
}

impl StepEvents {
    pub fn is_empty(&self) -> bool {
        self.captured_targets.is_empty() && self.lost_drones.is_empty()
    }
}

fn rows_within(tensor: &PairTensor, range: f64) -> Vec<usize> {
    (0..tensor.rows())
        .filter(|&i| {
            tensor
                .row(i)
                .iter()
                .flatten()
                .any(|sep| sep.distance <= range)
        })
        .collect()
}

fn cols_within(tensor: &PairTensor, range: f64) -> Vec<usize> {
    (0..tensor.cols())
        .filter(|&j| {
            (0..tensor.rows()).any(|i| tensor.get(i, j).is_some_and(|sep| sep.distance <= range))
        })
        .collect()
}

fn outside_domain(position: Vec3, bounds: Vec3) -> bool {
    position
        .iter()
        .zip(bounds.iter())
        .any(|(p, b)| p.abs() > *b)
}

/// Decide which targets are captured and which drones are lost this step.
pub fn detect(geometry: &Geometry, drones: &[Drone], rules: &EventRules) -> StepEvents {
    let captured_targets = cols_within(&geometry.drone_target, rules.sight_range);
    let drone_collisions = rows_within(&geometry.drone_drone, rules.crash_range);
    let obstacle_collisions = rows_within(&geometry.drone_obstacle, rules.crash_range);
    let domain_exits: Vec<usize> = drones
        .iter()
        .enumerate()
        .filter(|(_, d)| d.active && outside_domain(d.position, rules.domain_bounds))
        .map(|(i, _)| i)
        .collect();

    let mut lost = vec![false; drones.len()];
    for &i in drone_collisions
        .iter()
        .chain(&obstacle_collisions)
        .chain(&domain_exits)
    {
        lost[i] = true;
    }
    let lost_drones = lost
        .iter()
        .enumerate()
        .filter_map(|(i, &l)| l.then_some(i))
        .collect();

    StepEvents {
        captured_targets,
        drone_collisions,
        obstacle_collisions,
        domain_exits,
        lost_drones,
    }
}

/// Deactivate every entity named in `events` and scrub it from the tables.
pub fn apply(
    events: &StepEvents,
    drones: &mut [Drone],
    targets: &mut [Target],
    geometry: &mut Geometry,
) {
    for &j in &events.captured_targets {
        targets[j].active = false;
        geometry.invalidate_target(j);
    }
    for &i in &events.lost_drones {
        drones[i].deactivate();
        geometry.invalidate_drone(i);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rules() -> EventRules {
        EventRules {
            sight_range: 5.0,
            crash_range: 2.0,
            domain_bounds: [10.0, 10.0, 10.0],
        }
    }

    fn detect_for(drones: &[Drone], targets: &[Target], obstacles: &[Vec3]) -> StepEvents {
        let mut g = Geometry::new(drones.len(), targets.len(), obstacles.len());
        g.refresh(drones, targets, obstacles);
        detect(&g, drones, &rules())
    }

    #[test]
    fn target_within_sight_of_any_drone_is_captured() {
        let drones = vec![Drone::new([0.0; 3]), Drone::new([8.0, 0.0, 0.0])];
        let targets = vec![
            Target::new([9.0, 0.0, 0.0]),
            Target::new([0.0, 5.0, 0.0]),
            Target::new([0.0, -9.0, 0.0]),
        ];
        let events = detect_for(&drones, &targets, &[]);
        assert_eq!(events.captured_targets, vec![0, 1]);
        assert!(events.lost_drones.is_empty());
    }

    #[test]
    fn drone_pair_within_crash_range_loses_both() {
        let drones = vec![
            Drone::new([0.0; 3]),
            Drone::new([1.5, 0.0, 0.0]),
            Drone::new([0.0, 6.0, 0.0]),
        ];
        let events = detect_for(&drones, &[], &[]);
        assert_eq!(events.drone_collisions, vec![0, 1]);
        assert_eq!(events.lost_drones, vec![0, 1]);
    }

    #[test]
    fn obstacle_contact_and_domain_exit_are_losses() {
        let drones = vec![
            Drone::new([0.0; 3]),
            Drone::new([0.0, 0.0, -10.5]),
            Drone::new([5.0, 5.0, 5.0]),
        ];
        let events = detect_for(&drones, &[], &[[0.0, 2.0, 0.0]]);
        assert_eq!(events.obstacle_collisions, vec![0]);
        assert_eq!(events.domain_exits, vec![1]);
        assert_eq!(events.lost_drones, vec![0, 1]);
    }

    #[test]
    fn inactive_drones_trigger_nothing() {
        let mut drones = vec![Drone::new([0.0; 3]), Drone::new([0.5, 0.0, 0.0])];
        drones[1].deactivate();
        drones[1].position = [100.0; 3];
        let targets = vec![Target::new([100.0; 3])];
        let events = detect_for(&drones, &targets, &[]);
        assert!(events.is_empty());
    }

    #[test]
    fn apply_deactivates_and_scrubs_tables() {
        let mut drones = vec![Drone::new([0.0; 3]), Drone::new([1.0, 0.0, 0.0])];
        let mut targets = vec![Target::new([0.0, 3.0, 0.0])];
        let mut g = Geometry::new(2, 1, 0);
        g.refresh(&drones, &targets, &[]);
        let events = detect(&g, &drones, &rules());
        apply(&events, &mut drones, &mut targets, &mut g);

        assert!(drones.iter().all(|d| !d.active));
        assert!(!targets[0].active);
        assert!(g.drone_target.row(0).iter().all(Option::is_none));
        assert!(g.drone_drone.row(1).iter().all(Option::is_none));
    }
}
