//! Fixed-step integration of the twelve-dimensional body state
//! (position, orientation, linear and angular momentum).
//!
//! Forces and torques are held constant over a step; the step controller
//! re-stamps them before every integration.
use glam::{DMat3, DVec3};

use crate::body::{BodySystem, RigidBody};
use crate::force::Force;
use crate::math::orthonormalize;

pub fn clear_forces(body_system: &mut BodySystem) {
    for body in &mut body_system.bodies {
        body.clear_force_and_torque();
    }
}

pub fn apply_forces(body_system: &mut BodySystem) {
    for force in &body_system.forces {
        force.apply(&mut body_system.bodies);
    }
}

/// The skew-symmetric cross-product matrix: `star(a) * v == a.cross(v)`.
pub fn star(a: DVec3) -> DMat3 {
    DMat3::from_cols(
        DVec3::new(0., a.z, -a.y),
        DVec3::new(-a.z, 0., a.x),
        DVec3::new(a.y, -a.x, 0.),
    )
}

/// Change of one body's state over `dt`, already scaled by `dt`.
struct Derivative {
    x: DVec3,
    p: DVec3,
    a: DMat3,
    l: DVec3,
}

fn derivative(bodies: &[RigidBody], dt: f64) -> Vec<Derivative> {
    bodies
        .iter()
        .map(|body| Derivative {
            x: dt * body.v,
            p: dt * body.force,
            a: dt * star(body.omega) * body.a,
            l: dt * body.torque,
        })
        .collect()
}

/// Puts every body at `initial + factor * k`, re-orthonormalizes the
/// orientation and refreshes the auxiliaries.
fn set_state(bodies: &mut [RigidBody], initial: &[RigidBody], k: &[Derivative], factor: f64) {
    for (i, body) in bodies.iter_mut().enumerate() {
        body.x = initial[i].x + factor * k[i].x;
        body.p = initial[i].p + factor * k[i].p;
        body.a = initial[i].a + factor * k[i].a;
        body.l = initial[i].l + factor * k[i].l;

        body.a = orthonormalize(body.a);
        body.refresh_auxiliary();
    }
}

/// Explicit Euler step.
pub fn euler(body_system: &mut BodySystem, dt: f64) {
    for body in &mut body_system.bodies {
        body.x += dt * body.v;
        body.p += dt * body.force;

        body.a = body.a + dt * star(body.omega) * body.a;
        body.l += dt * body.torque;

        body.a = orthonormalize(body.a);
        body.refresh_auxiliary();
    }
}

/// Midpoint step: evaluate the derivative after half an Euler step.
pub fn midpoint(body_system: &mut BodySystem, dt: f64) {
    let initial = body_system.bodies.clone();

    euler(body_system, 0.5 * dt);

    for (i, body) in body_system.bodies.iter_mut().enumerate() {
        body.x = initial[i].x + dt * body.v;
        body.p = initial[i].p + dt * body.force;

        body.a = initial[i].a + dt * star(body.omega) * body.a;
        body.l = initial[i].l + dt * body.torque;

        body.a = orthonormalize(body.a);
        body.refresh_auxiliary();
    }
}

/// Classical fourth-order Runge-Kutta step over all bodies.
pub fn runge_kutta_4(body_system: &mut BodySystem, dt: f64) {
    let initial = body_system.bodies.clone();

    let k1 = derivative(&body_system.bodies, dt);
    set_state(&mut body_system.bodies, &initial, &k1, 0.5);

    let k2 = derivative(&body_system.bodies, dt);
    set_state(&mut body_system.bodies, &initial, &k2, 0.5);

    let k3 = derivative(&body_system.bodies, dt);
    set_state(&mut body_system.bodies, &initial, &k3, 1.);

    let k4 = derivative(&body_system.bodies, dt);

    const F16: f64 = 1. / 6.;
    const F13: f64 = 1. / 3.;
    for (i, body) in body_system.bodies.iter_mut().enumerate() {
        body.x = initial[i].x + F16 * k1[i].x + F13 * k2[i].x + F13 * k3[i].x + F16 * k4[i].x;
        body.p = initial[i].p + F16 * k1[i].p + F13 * k2[i].p + F13 * k3[i].p + F16 * k4[i].p;

        body.a = initial[i].a + F16 * k1[i].a + F13 * k2[i].a + F13 * k3[i].a + F16 * k4[i].a;
        body.l = initial[i].l + F16 * k1[i].l + F13 * k2[i].l + F13 * k3[i].l + F16 * k4[i].l;

        body.a = orthonormalize(body.a);
        body.refresh_auxiliary();
    }
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;
    use glam::dvec3;

    use super::*;
    use crate::body::ShapeWithMass;
    use crate::force::{ForceEnum, Gravity};

    const DT: f64 = 1. / 60.;

    fn falling_cube() -> BodySystem {
        BodySystem {
            bodies: vec![RigidBody::new(
                dvec3(0., 10., 0.),
                ShapeWithMass::cuboid(1. / 3., 1., 1., 1.),
            )],
            forces: vec![ForceEnum::Gravity(Gravity::default())],
        }
    }

    #[test]
    fn free_fall_follows_the_parabola() {
        let mut bs = falling_cube();
        clear_forces(&mut bs);
        apply_forces(&mut bs);
        runge_kutta_4(&mut bs, DT);

        // constant force: RK4 reproduces the parabola exactly
        let body = &bs.bodies[0];
        assert_relative_eq!(body.x.y, 10. - 0.5 * 9.81 * DT * DT, epsilon = 1e-12);
        assert_relative_eq!(body.p.y, -3. * 9.81 * DT, epsilon = 1e-12);
    }

    #[test]
    fn orientation_stays_orthonormal_under_spin() {
        let mut bs = falling_cube();
        bs.bodies[0] = bs.bodies[0].clone().with_angular_momentum(dvec3(1., 2., 3.));
        for _ in 0..300 {
            clear_forces(&mut bs);
            apply_forces(&mut bs);
            runge_kutta_4(&mut bs, DT);
        }

        let a = bs.bodies[0].a;
        let ata = a.transpose() * a;
        for i in 0..3 {
            for j in 0..3 {
                let expected = if i == j { 1. } else { 0. };
                assert_relative_eq!(ata.col(i)[j], expected, epsilon = 1e-8);
            }
        }
        // the auxiliaries must match the committed state
        let expected = a * bs.bodies[0].shape.inv_inertia * a.transpose();
        assert!((bs.bodies[0].i_inv.x_axis - expected.x_axis).length() < 1e-12);
        assert!((bs.bodies[0].i_inv.y_axis - expected.y_axis).length() < 1e-12);
        assert!((bs.bodies[0].i_inv.z_axis - expected.z_axis).length() < 1e-12);
    }

    #[test]
    fn energy_drift_per_step_is_bounded_in_free_fall() {
        let mut bs = falling_cube();
        bs.bodies[0] = bs.bodies[0]
            .clone()
            .with_momentum(dvec3(6., 6., 0.))
            .with_angular_momentum(dvec3(1., 1., 0.));

        let energy = |body: &RigidBody| {
            let mass = 1. / body.shape.inv_mass;
            0.5 * body.p.dot(body.v) + mass * 9.81 * body.x.y + 0.5 * body.l.dot(body.omega)
        };

        for _ in 0..60 {
            let before = energy(&bs.bodies[0]);
            clear_forces(&mut bs);
            apply_forces(&mut bs);
            runge_kutta_4(&mut bs, DT);
            let after = energy(&bs.bodies[0]);
            assert!(
                (after - before).abs() <= 1e-4,
                "energy drifted by {}",
                after - before
            );
        }
    }

    #[test]
    fn integrators_agree_on_constant_force_motion() {
        let mut rk4 = falling_cube();
        let mut mid = falling_cube();
        clear_forces(&mut rk4);
        apply_forces(&mut rk4);
        clear_forces(&mut mid);
        apply_forces(&mut mid);

        runge_kutta_4(&mut rk4, DT);
        midpoint(&mut mid, DT);

        // both are exact for a constant force on a non-rotating body
        assert_relative_eq!(rk4.bodies[0].x.y, mid.bodies[0].x.y, epsilon = 1e-12);
        assert_relative_eq!(rk4.bodies[0].p.y, mid.bodies[0].p.y, epsilon = 1e-12);
    }
}
