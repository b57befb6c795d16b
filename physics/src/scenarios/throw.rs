use std::f64::consts::FRAC_PI_4;

use glam::{dvec3, DMat3};

use crate::body::{BodySystem, RigidBody, ShapeWithMass};
use crate::force::{ForceEnum, Gravity};

use super::Scene;

/// A spinning cube thrown across the surface from negative x.
#[derive(Clone, Debug, Default)]
pub struct Throw {}

impl Scene for Throw {
    fn name(&self) -> &str {
        "Throw"
    }

    fn create(&self) -> BodySystem {
        let height = 0.4;
        let surface = ShapeWithMass::cuboid(0., 16., height, 10.);

        let mass = 3.;
        let size = 1.;
        let cube = ShapeWithMass::cuboid(1. / mass, size, size, size);

        BodySystem {
            bodies: vec![
                RigidBody::new(dvec3(0., -height / 2., 0.), surface),
                RigidBody::new(dvec3(-10., 6., 0.), cube)
                    .oriented(DMat3::from_axis_angle(
                        dvec3(1., 0., 1.).normalize(),
                        FRAC_PI_4,
                    ))
                    .with_momentum(dvec3(6., 6., 0.))
                    .with_angular_momentum(dvec3(1., 1., 0.)),
            ],
            forces: vec![ForceEnum::Gravity(Gravity::default())],
        }
    }
}
