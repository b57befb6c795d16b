use std::f64::consts::FRAC_PI_4;

use glam::{dvec3, DMat3, DVec3};

use crate::body::{BodySystem, RigidBody, ShapeWithMass};
use crate::force::{ForceEnum, Gravity};

use super::Scene;

/// A grid of cube pairs covering the contact configurations: parallel,
/// rotated, differently sized, laterally shifted, and with the static body
/// above as well as below.
#[derive(Clone, Debug, Default)]
pub struct ContactGrid {}

impl Scene for ContactGrid {
    fn name(&self) -> &str {
        "Contact Grid"
    }

    fn create(&self) -> BodySystem {
        let mass = 0.1;
        let size = 1.;
        let static_cube = ShapeWithMass::cuboid(0., size, size, size);
        let falling_cube = ShapeWithMass::cuboid(1. / mass, size, size, size);
        let static_cube_small = ShapeWithMass::cuboid(0., size / 2., size / 2., size / 2.);
        let falling_cube_small = ShapeWithMass::cuboid(1. / mass, size / 2., size / 2., size / 2.);

        let turned = DMat3::from_axis_angle(dvec3(0., 1., 0.), FRAC_PI_4);
        let pair = |top: DVec3, top_shape, top_turned: bool, bottom: DVec3, bottom_shape| {
            let mut upper = RigidBody::new(top, top_shape);
            if top_turned {
                upper = upper.oriented(turned);
            }
            [upper, RigidBody::new(bottom, bottom_shape)]
        };

        let mut bodies = vec![];

        // first row: parallel, rotated, and rotated with mismatched sizes
        bodies.extend(pair(
            dvec3(0., 1.5 * size, 0.),
            falling_cube,
            false,
            dvec3(0., 0.5 * size, 0.),
            static_cube,
        ));
        bodies.extend(pair(
            dvec3(3., 1.5 * size, 0.),
            falling_cube,
            true,
            dvec3(3., 0.5 * size, 0.),
            static_cube,
        ));
        bodies.extend(pair(
            dvec3(6., 1.25 * size, 0.),
            falling_cube_small,
            true,
            dvec3(6., 0.5 * size, 0.),
            static_cube,
        ));
        bodies.extend(pair(
            dvec3(9., 1. * size, 0.),
            falling_cube,
            true,
            dvec3(9., 0.25 * size, 0.),
            static_cube_small,
        ));

        // second row: rotated with small shifts towards each corner
        for (dx, dz) in [(-0.3, -0.3), (-0.3, 0.3), (0.3, -0.3), (0.3, 0.3)] {
            let x = match (dx > 0., dz > 0.) {
                (false, false) => 0.,
                (false, true) => 3.,
                (true, false) => 6.,
                (true, true) => 9.,
            };
            bodies.extend(pair(
                dvec3(x + dx, 1.5 * size, 3. + dz),
                falling_cube,
                true,
                dvec3(x, 0.5 * size, 3.),
                static_cube,
            ));
        }

        // third row: the rotated static body hangs above the dynamic one
        for (dx, dz) in [(-0.3, -0.3), (-0.3, 0.3), (0.3, -0.3), (0.3, 0.3)] {
            let x = match (dx > 0., dz > 0.) {
                (false, false) => 0.,
                (false, true) => 3.,
                (true, false) => 6.,
                (true, true) => 9.,
            };
            bodies.push(RigidBody::new(dvec3(x, 0.5 * size, 6.), falling_cube));
            bodies.push(
                RigidBody::new(dvec3(x + dx, 1.5 * size, 6. + dz), static_cube).oriented(turned),
            );
        }

        BodySystem {
            bodies,
            forces: vec![ForceEnum::Gravity(Gravity::default())],
        }
    }
}
