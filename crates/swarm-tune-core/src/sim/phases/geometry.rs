use super::super::Simulation;

impl Simulation {
    /// Recompute every drone-target, drone-drone and drone-obstacle separation.
    pub(in crate::sim) fn step_geometry_phase(&mut self) {
        self.geometry
            .refresh(&self.drones, &self.targets, &self.obstacles);
    }
}
