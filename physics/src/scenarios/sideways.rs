use std::f64::consts::FRAC_PI_4;

use glam::{dvec3, DMat3};

use crate::body::{BodySystem, RigidBody, ShapeWithMass};
use crate::force::{ForceEnum, Gravity};

use super::Scene;

/// Scene to exercise collisions that are not vertex-face based: two cubes
/// with their closest edges perpendicular in the x,z-plane.
#[derive(Clone, Debug, Default)]
pub struct SidewaysCollision {}

impl Scene for SidewaysCollision {
    fn name(&self) -> &str {
        "Sideways Collision"
    }

    fn create(&self) -> BodySystem {
        let mass = 3.;
        let size = 1.;
        let static_cube = ShapeWithMass::cuboid(0., size, size, size);
        let falling_cube = ShapeWithMass::cuboid(1. / mass, size, size, size);

        BodySystem {
            bodies: vec![
                RigidBody::new(dvec3(0., size / 2., 0.), static_cube)
                    .oriented(DMat3::from_axis_angle(dvec3(0., 0., 1.), FRAC_PI_4)),
                RigidBody::new(dvec3(0., size / 2. + 2., 0.), falling_cube)
                    .oriented(DMat3::from_axis_angle(dvec3(1., 0., 0.), FRAC_PI_4)),
            ],
            forces: vec![ForceEnum::Gravity(Gravity::default())],
        }
    }
}
