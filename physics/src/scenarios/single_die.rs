use glam::dvec3;

use crate::body::{BodySystem, RigidBody, ShapeWithMass};
use crate::force::{ForceEnum, Gravity};

use super::Scene;

/// An icosahedron die dropped onto an immovable surface.
#[derive(Clone, Debug, Default)]
pub struct SingleDie {}

impl Scene for SingleDie {
    fn name(&self) -> &str {
        "Single Die"
    }

    fn create(&self) -> BodySystem {
        let height = 0.4;
        let surface = ShapeWithMass::cuboid(0., 16., height, 10.);

        let mass = 3.;
        let size = 1.;
        let die = ShapeWithMass::icosahedron(1. / mass, size, size, size);

        BodySystem {
            bodies: vec![
                RigidBody::new(dvec3(0., -height / 2., 0.), surface),
                RigidBody::new(dvec3(0., 1. + size / 2., 0.), die),
            ],
            forces: vec![ForceEnum::Gravity(Gravity::default())],
        }
    }
}
