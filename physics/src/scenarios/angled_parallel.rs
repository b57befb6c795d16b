use std::f64::consts::FRAC_PI_4;

use glam::{dvec3, DMat3};

use crate::body::{BodySystem, RigidBody, ShapeWithMass};
use crate::force::{ForceEnum, Gravity};

use super::Scene;

/// [`super::ParallelDrop`] with the falling cube turned in the x,z-plane so
/// the impact produces multiple edge-edge contacts.
#[derive(Clone, Debug, Default)]
pub struct AngledParallelDrop {}

impl Scene for AngledParallelDrop {
    fn name(&self) -> &str {
        "Angled Parallel Drop"
    }

    fn create(&self) -> BodySystem {
        let mass = 3.;
        let size = 1.;
        let falling_cube = ShapeWithMass::cuboid(1. / mass, size, size, size);
        let static_cube = ShapeWithMass::cuboid(0., size, size, size);

        BodySystem {
            bodies: vec![
                RigidBody::new(dvec3(0., size / 2. + 6., 0.), falling_cube)
                    .oriented(DMat3::from_axis_angle(dvec3(0., 1., 0.), FRAC_PI_4)),
                RigidBody::new(dvec3(0., size / 2. + 1., 0.), static_cube),
            ],
            forces: vec![ForceEnum::Gravity(Gravity::default())],
        }
    }
}
