use glam::dvec3;

use crate::body::{BodySystem, RigidBody, ShapeWithMass};
use crate::force::{ForceEnum, Gravity};

use super::Scene;

/// A 3x3 grid of light cubes resting on the surface.
#[derive(Clone, Debug, Default)]
pub struct RestingGrid {}

impl Scene for RestingGrid {
    fn name(&self) -> &str {
        "Resting Grid"
    }

    fn create(&self) -> BodySystem {
        let height = 0.4;
        let surface = ShapeWithMass::cuboid(0., 20., height, 35.);

        let mass = 0.1;
        let size = 1.;
        let cube = ShapeWithMass::cuboid(1. / mass, size, size, size);

        let mut bodies = vec![RigidBody::new(dvec3(0., -height / 2., 0.), surface)];
        for ix in [-1., 0., 1.] {
            for iz in [-1., 0., 1.] {
                bodies.push(RigidBody::new(
                    dvec3(ix * size * 2., size / 2., iz * size * 2.),
                    cube,
                ));
            }
        }

        BodySystem {
            bodies,
            forces: vec![ForceEnum::Gravity(Gravity::default())],
        }
    }
}
