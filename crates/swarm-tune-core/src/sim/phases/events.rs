use super::super::Simulation;
use crate::events;
use tracing::trace;

impl Simulation {
    /// Detect captures and losses on the fresh geometry, then remove every
    /// affected entity before any force is computed.
    pub(in crate::sim) fn step_event_phase(&mut self) {
        let detected = events::detect(&self.geometry, &self.drones, &self.rules);
        events::apply(
            &detected,
            &mut self.drones,
            &mut self.targets,
            &mut self.geometry,
        );

        self.active_targets -= detected.captured_targets.len();
        self.active_drones -= detected.lost_drones.len();

        if !detected.is_empty() {
            trace!(
                step = self.step_index,
                captured = detected.captured_targets.len(),
                collisions = detected.drone_collisions.len(),
                obstacle_hits = detected.obstacle_collisions.len(),
                exits = detected.domain_exits.len(),
                "removals"
            );
        }
        self.last_events = detected;
    }
}
