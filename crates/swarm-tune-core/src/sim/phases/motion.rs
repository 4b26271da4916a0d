use super::super::Simulation;
use crate::field;
use crate::vec3;

impl Simulation {
    /// Propulsion along the globally normalized steering field plus quadratic
    /// drag, integrated with one explicit Euler step.
    pub(in crate::sim) fn step_motion_phase(&mut self) {
        field::propulsion_forces(
            &self.geometry,
            &self.drones,
            &self.params,
            self.config.propulsion_force,
            &mut self.force_buffer,
        );

        let dt = self.config.dt;
        let inv_mass = 1.0 / self.config.drone_mass;
        let drag_factor = self.config.drag_factor();
        let air_velocity = self.config.air_velocity;

        for (drone, propulsion) in self.drones.iter_mut().zip(self.force_buffer.iter()) {
            if !drone.active {
                continue;
            }
            let drag = field::drag_force(drone.velocity, air_velocity, drag_factor);
            let total = vec3::add(*propulsion, drag);
            vec3::add_scaled(&mut drone.velocity, total, dt * inv_mass);
            vec3::add_scaled(&mut drone.position, drone.velocity, dt);
        }
    }
}
