use super::super::Simulation;
use crate::metrics::Frame;

impl Simulation {
    /// Append a snapshot when trajectory recording is enabled.
    pub(in crate::sim) fn record_frame(&mut self, step: usize) {
        let Some(trajectory) = self.trajectory.as_mut() else {
            return;
        };
        trajectory.push(Frame {
            step,
            drones: self
                .drones
                .iter()
                .map(|d| d.active.then_some(d.position))
                .collect(),
            targets: self
                .targets
                .iter()
                .map(|t| t.active.then_some(t.position))
                .collect(),
            active_drones: self.active_drones,
            active_targets: self.active_targets,
        });
    }
}
