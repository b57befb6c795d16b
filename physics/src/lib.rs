//! Rigid-body simulation of convex polyhedra under gravity: separating-axis
//! collision detection, contact-manifold derivation, impulse-based collision
//! resolution, an LCP solve for resting contact forces and fourth-order
//! Runge-Kutta integration driven by a fixed time step.
use thiserror::Error;
use tracing::{instrument, warn};

pub mod body;
pub mod collision;
pub mod contact;
pub mod derivation;
pub mod detection;
pub mod draw;
pub mod force;
pub mod integrator;
pub mod math;
pub mod scenarios;
pub mod shape;
pub mod solver;

pub use body::{BodySystem, RigidBody, ShapeWithMass};
pub use contact::{Contact, ContactKind};
pub use shape::ShapeKind;

use detection::CollisionState;
use scenarios::{RandomDrop, Scene};

/// Tolerance in velocity units deciding whether a pair of touching bodies is:
///  - resting, relative velocity within `COLLISION_THRESHOLD` of zero,
///  - colliding, relative velocity below `-COLLISION_THRESHOLD`,
///  - moving away, relative velocity above `COLLISION_THRESHOLD`.
pub const COLLISION_THRESHOLD: f64 = 0.001;

/// NB: notice the difference with `COLLISION_THRESHOLD`.
/// Tolerance in distance units deciding whether a pair of bodies is:
///  - in contact, distance within `DISTANCE_THRESHOLD` of zero,
///  - penetrating, distance below `-DISTANCE_THRESHOLD`,
///  - separate, distance above `DISTANCE_THRESHOLD`.
pub const DISTANCE_THRESHOLD: f64 = 0.02;

/// Sinkage past this fraction of the contact tolerance makes the (optional)
/// state correction kick in.
pub const WARNING_DISTANCE_THRESHOLD: f64 = 0.75 * DISTANCE_THRESHOLD;

#[derive(Debug, Error)]
pub enum StepError {
    #[error("contact-force solve failed: {0}")]
    ContactForces(#[from] math::LcpError),
}

/// The simulation driver: owns the body system, advances it by fixed steps
/// and retains the contacts of the previous step for inspection.
#[derive(Debug)]
pub struct Engine {
    /// Time delta for [`Engine::update`].
    pub dt: f64,
    /// If true, every invocation of `update` advances the simulation.
    pub run: bool,
    /// See [`Engine::ask_to_step_once`].
    pub step_once: bool,
    pub scene: Box<dyn Scene>,
    pub body_system: BodySystem,
    /// The contacts of the previous step, retained for visualization.
    pub prev_contacts: Vec<Contact>,
}

impl Default for Engine {
    fn default() -> Self {
        Engine::new(Box::new(RandomDrop::default()))
    }
}

impl Engine {
    pub fn new(scene: Box<dyn Scene>) -> Engine {
        Engine {
            dt: 1. / 60.,
            run: false,
            step_once: false,
            scene,
            body_system: BodySystem::default(),
            prev_contacts: vec![],
        }
    }

    /// Builds the body system from the current scene.
    pub fn init(&mut self) {
        self.body_system = self.scene.create();
    }

    /// Advances the simulation by one step, if running (or asked to step
    /// once).
    pub fn update(&mut self) -> Result<(), StepError> {
        if !self.run && !self.step_once {
            return Ok(());
        }

        self.step()?;

        self.step_once = false;
        Ok(())
    }

    /// Pauses or resumes the simulation.
    pub fn toggle_run(&mut self) {
        self.run = !self.run;
    }

    /// If called while paused, the next `update` completes exactly one step.
    pub fn ask_to_step_once(&mut self) {
        self.step_once = true;
    }

    /// Rebuilds the body system from the scene.
    pub fn reset(&mut self) {
        self.prev_contacts.clear();
        self.init();
    }

    pub fn change_scene(&mut self, scene: Box<dyn Scene>) {
        self.scene = scene;
        self.reset();
    }

    /// Progresses the body system by a single time step.
    ///
    /// Repeatedly: resolve collisions at the current time, stamp forces,
    /// solve resting contact forces, then tentatively integrate to the step
    /// target. If the tentative state interpenetrates, bisect back to the
    /// time of impact and continue from there.
    #[instrument(level = "trace", skip_all)]
    fn step(&mut self) -> Result<(), StepError> {
        self.prev_contacts.clear();

        let mut t_current = 0.;
        while t_current < self.dt {
            let t_target = self.dt - t_current;
            let contacts = detection::find_all_contacts(&self.body_system);

            while solver::find_all_collisions(&mut self.body_system.bodies, &contacts) {}

            integrator::clear_forces(&mut self.body_system);
            integrator::apply_forces(&mut self.body_system);
            solver::compute_contact_forces(&mut self.body_system.bodies, &contacts)?;

            let bodies_t0 = self.body_system.bodies.clone();
            integrator::runge_kutta_4(&mut self.body_system, t_target);
            if !detection::interpenetrating(&self.body_system) {
                self.prev_contacts.extend(contacts);
                return Ok(());
            }

            // the target state interpenetrates: bisect between the known-good
            // state at t0 and the target for the time of impact
            let mut t = t_target * 0.5;
            let mut t_step = t_target * 0.5;
            loop {
                self.body_system.bodies = bodies_t0.clone();
                integrator::runge_kutta_4(&mut self.body_system, t);

                match detection::collision_state(&self.body_system) {
                    CollisionState::Penetrating => {
                        // too deep, step back
                        t_step *= 0.5;
                        t -= t_step;
                    }
                    CollisionState::ContactRestingOrColliding => {
                        // time of impact found
                        break;
                    }
                    CollisionState::ContactSeparating | CollisionState::NotPenetrating => {
                        // too far out, step forward
                        t_step *= 0.5;
                        t += t_step;
                    }
                }

                if t_step == 0. {
                    warn!("cannot find time of collision, committing the current state");
                    break;
                }
            }

            t_current += t;
            self.prev_contacts.extend(contacts);

            if self.body_system.bodies == bodies_t0 {
                warn!(t_current, "step makes no progress");
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use glam::dvec3;

    use super::*;
    use crate::body::{RigidBody, ShapeWithMass};

    /// Two unit cubes, one immovable, not touching, no forces.
    #[derive(Clone, Debug, Default)]
    struct StandOff {}

    impl Scene for StandOff {
        fn name(&self) -> &str {
            "Stand-off"
        }

        fn create(&self) -> BodySystem {
            BodySystem {
                bodies: vec![
                    RigidBody::new(dvec3(2., 1., 0.), ShapeWithMass::cuboid(0., 1., 1., 1.)),
                    RigidBody::new(dvec3(0., 1., 0.), ShapeWithMass::cuboid(1., 1., 1., 1.)),
                ],
                forces: vec![],
            }
        }
    }

    #[test]
    fn update_only_advances_when_running() {
        let mut engine = Engine::new(Box::new(StandOff::default()));
        engine.init();
        let before = engine.body_system.bodies.clone();

        engine.update().unwrap();
        assert_eq!(engine.body_system.bodies, before);

        engine.ask_to_step_once();
        engine.update().unwrap();
        assert!(!engine.step_once);
    }

    #[test]
    fn separated_bodies_stay_put_without_forces() {
        let mut engine = Engine::new(Box::new(StandOff::default()));
        engine.init();
        engine.run = true;

        let before = engine.body_system.bodies.clone();
        for _ in 0..30 {
            engine.update().unwrap();
        }

        assert!(engine.prev_contacts.is_empty());
        assert_eq!(engine.body_system.bodies[0], before[0]);
        assert_eq!(engine.body_system.bodies[1], before[1]);
    }

    #[test]
    fn reset_rebuilds_the_scene() {
        let mut engine = Engine::new(Box::new(StandOff::default()));
        engine.init();
        engine.body_system.bodies[1].x = dvec3(5., 5., 5.);

        engine.reset();
        assert_eq!(engine.body_system.bodies[1].x, dvec3(0., 1., 0.));
    }
}
