//! Collision response: impulses for colliding contacts and the constrained
//! normal-force solve for resting contacts.
use glam::DVec3;
use tracing::{instrument, trace};

use crate::body::{BodySystem, RigidBody};
use crate::contact::{Contact, ContactKind};
use crate::detection::find_all_contacts;
use crate::integrator::{clear_forces, star};
use crate::math::{self, LcpError};
use crate::{COLLISION_THRESHOLD, DISTANCE_THRESHOLD, WARNING_DISTANCE_THRESHOLD};

/// Coefficient of restitution for colliding contacts.
const RESTITUTION: f64 = 0.6;

/// Applies the correcting impulse for a single colliding contact and
/// refreshes the auxiliaries of both bodies.
fn collision(bodies: &mut [RigidBody], contact: &Contact, epsilon: f64) {
    let a = &bodies[contact.a];
    let b = &bodies[contact.b];
    let n = contact.n;
    let ra = contact.p - a.x;
    let rb = contact.p - b.x;

    let vrel = n.dot(a.point_velocity(contact.p) - b.point_velocity(contact.p));
    let numerator = -(1. + epsilon) * vrel;

    let term1 = a.shape.inv_mass;
    let term2 = b.shape.inv_mass;
    let term3 = n.dot((a.i_inv * ra.cross(n)).cross(ra));
    let term4 = n.dot((b.i_inv * rb.cross(n)).cross(rb));

    let impulse_magnitude = numerator / (term1 + term2 + term3 + term4);
    let impulse = impulse_magnitude * n;
    trace!(
        pair = ?(contact.a, contact.b),
        magnitude = impulse_magnitude,
        "applying collision impulse"
    );

    bodies[contact.a].p += impulse;
    bodies[contact.b].p -= impulse;
    bodies[contact.a].l += ra.cross(impulse);
    bodies[contact.b].l -= rb.cross(impulse);

    bodies[contact.a].refresh_auxiliary();
    bodies[contact.b].refresh_auxiliary();
}

/// Applies an impulse for the first colliding contact found and reports
/// whether one was applied; the caller sweeps again until none remain.
pub fn find_all_collisions(bodies: &mut [RigidBody], contacts: &[Contact]) -> bool {
    for contact in contacts {
        let vrel = contact.relative_normal_velocity(bodies);

        if vrel > COLLISION_THRESHOLD {
            // moving away: nothing to do
        } else if vrel < -COLLISION_THRESHOLD {
            // colliding: resolve and restart the sweep
            collision(bodies, contact, RESTITUTION);
            return true;
        } else {
            // resting contact: left to the contact-force stage
        }
    }

    false
}

/// Time derivative of the contact normal.
fn compute_ndot(bodies: &[RigidBody], c: &Contact) -> DVec3 {
    match c.kind {
        ContactKind::VertexFace => bodies[c.b].omega.cross(c.n),
        ContactKind::EdgeEdge { ea, eb } => {
            // derivative of (ea x eb) / |ea x eb| by the quotient rule
            let eadot = bodies[c.a].omega.cross(ea);
            let ebdot = bodies[c.b].omega.cross(eb);
            let n1 = ea.cross(eb);
            let z = eadot.cross(eb) + ea.cross(ebdot);
            let l = n1.length();
            let n1 = n1 / l;
            (z - z.dot(n1) * n1) / l
        }
    }
}

/// Normal acceleration at each contact from the external forces and torques
/// plus the centripetal and gyroscopic terms.
fn compute_b_vector(bodies: &[RigidBody], contacts: &[Contact]) -> Vec<f64> {
    contacts
        .iter()
        .map(|c| {
            let a = &bodies[c.a];
            let b = &bodies[c.b];
            let n = c.n;
            let ra = c.p - a.x;
            let rb = c.p - b.x;

            // part due to the external force and torque
            let a_ext_part = a.force * a.shape.inv_mass + (a.i_inv * a.torque).cross(ra);
            let b_ext_part = b.force * b.shape.inv_mass + (b.i_inv * b.torque).cross(rb);

            // part due to the velocities
            let a_vel_part =
                a.omega.cross(a.omega.cross(ra)) + (a.i_inv * a.l.cross(a.omega)).cross(ra);
            let b_vel_part =
                b.omega.cross(b.omega.cross(rb)) + (b.i_inv * b.l.cross(b.omega)).cross(rb);

            let k1 = n.dot((a_ext_part + a_vel_part) - (b_ext_part + b_vel_part));

            let ndot = compute_ndot(bodies, c);
            let k2 = 2. * ndot.dot(a.point_velocity(c.p) - b.point_velocity(c.p));

            k1 + k2
        })
        .collect()
}

/// Rate at which a unit normal force at contact `cj` changes the normal
/// acceleration at contact `ci`.
fn compute_aij(bodies: &[RigidBody], ci: &Contact, cj: &Contact) -> f64 {
    // contacts on entirely distinct body pairs do not couple
    if ci.a != cj.a && ci.b != cj.b && ci.a != cj.b && ci.b != cj.a {
        return 0.;
    }

    let a = &bodies[ci.a];
    let b = &bodies[ci.b];
    let ni = ci.n;
    let nj = cj.n;
    let pi = ci.p;
    let pj = cj.p;
    let ra = pi - a.x;
    let rb = pi - b.x;

    // force and torque direction contact j exerts on body a of contact i
    let mut force_on_a = DVec3::ZERO;
    let mut torque_on_a = DVec3::ZERO;
    if cj.a == ci.a {
        force_on_a = nj;
        torque_on_a = (pj - a.x).cross(force_on_a);
    } else if cj.b == ci.a {
        force_on_a = -nj;
        torque_on_a = (pj - a.x).cross(force_on_a);
    }

    // force and torque direction contact j exerts on body b of contact i
    let mut force_on_b = DVec3::ZERO;
    let mut torque_on_b = DVec3::ZERO;
    if cj.a == ci.b {
        force_on_b = nj;
        torque_on_b = (pj - b.x).cross(force_on_b);
    } else if cj.b == ci.b {
        force_on_b = -nj;
        torque_on_b = (pj - b.x).cross(force_on_b);
    }

    // how that force changes the acceleration of the contact point of i
    let a_linear = force_on_a * a.shape.inv_mass;
    let a_angular = (a.i_inv * torque_on_a).cross(ra);

    let b_linear = force_on_b * b.shape.inv_mass;
    let b_angular = (b.i_inv * torque_on_b).cross(rb);

    ni.dot((a_linear + a_angular) - (b_linear + b_angular))
}

fn compute_a_matrix(bodies: &[RigidBody], contacts: &[Contact]) -> Vec<f64> {
    let n = contacts.len();
    let mut amat = vec![0.; n * n];
    for i in 0..n {
        // fill per pair, the matrix is symmetric
        for j in (i + 1)..n {
            let val = compute_aij(bodies, &contacts[i], &contacts[j]);
            amat[i * n + j] = val;
            amat[j * n + i] = val;
        }
        amat[i * n + i] = compute_aij(bodies, &contacts[i], &contacts[i]);
    }
    amat
}

/// Solves for the non-negative normal forces of all resting contacts and
/// accumulates them into the bodies' force and torque accumulators.
#[instrument(level = "trace", skip_all)]
pub fn compute_contact_forces(
    bodies: &mut [RigidBody],
    contacts: &[Contact],
) -> Result<(), LcpError> {
    let resting: Vec<Contact> = contacts
        .iter()
        .filter(|c| {
            let vrel = c.relative_normal_velocity(bodies);
            if vrel < -COLLISION_THRESHOLD {
                // the impulse stage has already run
                panic!(
                    "bodies {}/{} still collide in the contact-force stage (vrel = {vrel})",
                    c.a, c.b
                );
            }
            vrel <= COLLISION_THRESHOLD
        })
        .copied()
        .collect();

    if resting.is_empty() {
        return Ok(());
    }
    trace!(count = resting.len(), "solving resting contact forces");

    let bvec = compute_b_vector(bodies, &resting);
    let amat = compute_a_matrix(bodies, &resting);

    let mut fvec = vec![0.; resting.len()];
    math::qp_solve(&amat, &bvec, &mut fvec, resting.len())?;

    for (i, c) in resting.iter().enumerate() {
        // the solver slack can leave a force very slightly negative
        let force = fvec[i].max(0.) * c.n;

        bodies[c.a].force += force;
        bodies[c.b].force -= force;

        let ta = (c.p - bodies[c.a].x).cross(force);
        let tb = (c.p - bodies[c.b].x).cross(force);
        bodies[c.a].torque += ta;
        bodies[c.b].torque -= tb;
    }

    Ok(())
}

/// Open-loop penetration recovery: displaces bodies along the contact
/// normals when any contact sinks past the warning tolerance.
///
/// Not wired into the default pipeline; kept as an explicit entry point.
pub fn correct_state(body_system: &mut BodySystem) {
    let contacts = find_all_contacts(body_system);

    let mut needs_correction = false;
    let mut deltas = Vec::with_capacity(contacts.len());
    for contact in &contacts {
        let delta = contact.distance();
        assert!(
            delta >= -DISTANCE_THRESHOLD,
            "bodies {}/{} sank past the contact tolerance ({delta})",
            contact.a,
            contact.b
        );
        needs_correction |= delta <= -WARNING_DISTANCE_THRESHOLD;
        deltas.push(delta);
    }

    if !needs_correction {
        return;
    }

    // solve for displacements undoing the measured sinkage; no sign
    // constraint here, sunken pairs may push neighbours from either side
    let bvec: Vec<f64> = deltas.iter().map(|d| -d).collect();
    let amat = compute_a_matrix(&body_system.bodies, &contacts);
    let mut fvec = vec![0.; contacts.len()];
    math::lp_solve(&amat, &mut fvec, &bvec, contacts.len());

    clear_forces(body_system);

    let bodies = &mut body_system.bodies;
    for (i, c) in contacts.iter().enumerate() {
        let force = fvec[i] * c.n;

        bodies[c.a].force += force;
        bodies[c.b].force -= force;

        let ta = (c.p - bodies[c.a].x).cross(force);
        let tb = (c.p - bodies[c.b].x).cross(force);
        bodies[c.a].torque += ta;
        bodies[c.b].torque -= tb;
    }

    for body in bodies {
        body.x += body.force * body.shape.inv_mass;
        body.a = body.a + star(body.i_inv * body.torque) * body.a;

        body.a = math::orthonormalize(body.a);
        body.i_inv = body.a * body.shape.inv_inertia * body.a.transpose();
        body.omega = body.i_inv * body.l;
    }
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;
    use glam::dvec3;

    use super::*;
    use crate::body::ShapeWithMass;
    use crate::force::{ForceEnum, Gravity};
    use crate::integrator::apply_forces;

    fn floor() -> RigidBody {
        RigidBody::new(dvec3(0., -0.2, 0.), ShapeWithMass::cuboid(0., 16., 0.4, 10.))
    }

    #[test]
    fn impulse_sweep_resolves_an_impact() {
        let mut bodies = vec![
            floor(),
            RigidBody::new(dvec3(0., 0.5, 0.), ShapeWithMass::cuboid(1., 1., 1., 1.))
                .with_momentum(dvec3(0., -2., 0.)),
        ];
        let bs = BodySystem {
            bodies: bodies.clone(),
            forces: vec![],
        };
        let contacts = find_all_contacts(&bs);
        assert!(!contacts.is_empty());

        assert!(find_all_collisions(&mut bodies, &contacts));
        while find_all_collisions(&mut bodies, &contacts) {}

        // no contact is left closing, and the body bounces back up
        for c in &contacts {
            assert!(c.relative_normal_velocity(&bodies) >= -COLLISION_THRESHOLD);
        }
        assert!(bodies[1].v.y > 0.);
        // the auxiliaries were refreshed along with the momenta
        assert_relative_eq!(bodies[1].v.y, bodies[1].p.y, epsilon = 1e-12);
    }

    #[test]
    fn impulses_conserve_momentum_between_dynamic_bodies() {
        let shape = ShapeWithMass::cuboid(1., 1., 1., 1.);
        let mut bodies = vec![
            RigidBody::new(dvec3(0., 0., 0.), shape).with_momentum(dvec3(2., 0., 0.)),
            RigidBody::new(dvec3(1.01, 0., 0.), shape),
        ];
        let bs = BodySystem {
            bodies: bodies.clone(),
            forces: vec![],
        };
        let contacts = find_all_contacts(&bs);
        assert!(!contacts.is_empty());

        while find_all_collisions(&mut bodies, &contacts) {}

        let total = bodies[0].p + bodies[1].p;
        assert_relative_eq!(total.x, 2., epsilon = 1e-9);
        assert_relative_eq!(total.y, 0., epsilon = 1e-9);
        // the struck body carries momentum away
        assert!(bodies[1].p.x > 0.);
    }

    #[test]
    fn resting_cube_is_fully_supported() {
        let mut bs = BodySystem {
            bodies: vec![
                floor(),
                RigidBody::new(dvec3(0., 0.5, 0.), ShapeWithMass::cuboid(1., 1., 1., 1.)),
            ],
            forces: vec![ForceEnum::Gravity(Gravity::default())],
        };
        clear_forces(&mut bs);
        apply_forces(&mut bs);

        let contacts = find_all_contacts(&bs);
        assert_eq!(contacts.len(), 4);
        assert!(!find_all_collisions(&mut bs.bodies, &contacts));

        compute_contact_forces(&mut bs.bodies, &contacts).unwrap();

        // the contact forces exactly cancel gravity, with no residual torque
        assert!(bs.bodies[1].force.length() < 1e-9);
        assert!(bs.bodies[1].torque.length() < 1e-9);
    }

    #[test]
    fn separating_contacts_receive_no_force() {
        let mut bodies = vec![
            floor(),
            RigidBody::new(dvec3(0., 0.5, 0.), ShapeWithMass::cuboid(1., 1., 1., 1.))
                .with_momentum(dvec3(0., 2., 0.)),
        ];
        let bs = BodySystem {
            bodies: bodies.clone(),
            forces: vec![],
        };
        let contacts = find_all_contacts(&bs);
        compute_contact_forces(&mut bodies, &contacts).unwrap();
        assert_eq!(bodies[1].force, DVec3::ZERO);
    }

    #[test]
    fn clean_state_needs_no_correction() {
        let mut bs = BodySystem {
            bodies: vec![
                floor(),
                RigidBody::new(dvec3(0., 0.5, 0.), ShapeWithMass::cuboid(1., 1., 1., 1.)),
            ],
            forces: vec![],
        };
        let before = bs.bodies.clone();
        correct_state(&mut bs);
        assert_eq!(bs.bodies, before);
    }
}
