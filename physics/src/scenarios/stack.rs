use glam::dvec3;

use crate::body::{BodySystem, RigidBody, ShapeWithMass};
use crate::force::{ForceEnum, Gravity};

use super::Scene;

/// Two light cubes stacked directly on the surface.
// TODO stacked coplanar faces can trip the multi-face classification in
// contact derivation; needs a policy for ties before this is robust
#[derive(Clone, Debug, Default)]
pub struct Stack {}

impl Scene for Stack {
    fn name(&self) -> &str {
        "Stack"
    }

    fn create(&self) -> BodySystem {
        let height = 0.4;
        let surface = ShapeWithMass::cuboid(0., 20., height, 35.);

        let mass = 0.1;
        let size = 1.;
        let cube = ShapeWithMass::cuboid(1. / mass, size, size, size);

        BodySystem {
            bodies: vec![
                RigidBody::new(dvec3(0., -height / 2., 0.), surface),
                RigidBody::new(dvec3(0., 0.5 * size, 0.), cube),
                RigidBody::new(dvec3(0., 1.5 * size, 0.), cube),
            ],
            forces: vec![ForceEnum::Gravity(Gravity::default())],
        }
    }
}
