use glam::dvec3;

use crate::body::{BodySystem, RigidBody, ShapeWithMass};

use super::Scene;

/// Two immovable bodies and no forces; nothing should ever move.
#[derive(Clone, Debug, Default)]
pub struct StaticPair {}

impl Scene for StaticPair {
    fn name(&self) -> &str {
        "Static Pair"
    }

    fn create(&self) -> BodySystem {
        let size = 1.;
        BodySystem {
            bodies: vec![
                RigidBody::new(
                    dvec3(2., 1., 0.),
                    ShapeWithMass::cuboid(0., size, size, size),
                ),
                RigidBody::new(
                    dvec3(0., 1., 0.),
                    ShapeWithMass::icosahedron(0., size, size, size),
                ),
            ],
            forces: vec![],
        }
    }
}
