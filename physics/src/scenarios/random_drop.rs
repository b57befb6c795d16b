use std::f64::consts::PI;

use glam::{dvec3, DMat3, DVec3};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::body::{BodySystem, RigidBody, ShapeWithMass};
use crate::force::{ForceEnum, Gravity};

use super::Scene;

/// Three cubes with random orientations dropped in a column. The seed keeps
/// rebuilt scenes (and their trajectories) reproducible.
#[derive(Clone, Debug, Default)]
pub struct RandomDrop {
    pub seed: u64,
}

impl Scene for RandomDrop {
    fn name(&self) -> &str {
        "Random Drop"
    }

    fn create(&self) -> BodySystem {
        let mut rng = StdRng::seed_from_u64(self.seed);
        let mut tilted = |axis: DVec3| DMat3::from_axis_angle(axis, rng.gen_range(0.0..PI));

        let height = 0.4;
        let surface = ShapeWithMass::cuboid(0., 20., height, 35.);

        let mass = 3.;
        let size = 1.;
        let cube = ShapeWithMass::cuboid(1. / mass, size, size, size);

        BodySystem {
            bodies: vec![
                RigidBody::new(dvec3(0., -height / 2., 0.), surface),
                RigidBody::new(dvec3(0., 1., 0.), cube).oriented(tilted(dvec3(0., 0., 1.))),
                RigidBody::new(dvec3(0., 6., 0.), cube).oriented(tilted(dvec3(0., 1., 0.))),
                RigidBody::new(dvec3(0., 12., 0.), cube).oriented(tilted(dvec3(1., 0., 0.))),
            ],
            forces: vec![ForceEnum::Gravity(Gravity::default())],
        }
    }
}
