use glam::dvec3;

use crate::body::{BodySystem, RigidBody, ShapeWithMass};
use crate::force::{ForceEnum, Gravity};

use super::Scene;

/// Scene to exercise collisions of exactly parallel faces: a cube dropped
/// straight onto a static one.
#[derive(Clone, Debug, Default)]
pub struct ParallelDrop {}

impl Scene for ParallelDrop {
    fn name(&self) -> &str {
        "Parallel Drop"
    }

    fn create(&self) -> BodySystem {
        let mass = 3.;
        let size = 1.;
        let static_cube = ShapeWithMass::cuboid(0., size, size, size);
        let falling_cube = ShapeWithMass::cuboid(1. / mass, size, size, size);

        BodySystem {
            bodies: vec![
                RigidBody::new(dvec3(0., size / 2., 0.), static_cube),
                RigidBody::new(dvec3(0., size / 2. + 5., 0.), falling_cube),
            ],
            forces: vec![ForceEnum::Gravity(Gravity::default())],
        }
    }
}
