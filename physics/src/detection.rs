//! High-level routines that drive the separating-axis test over all body
//! pairs to classify the simulation state and collect contacts.
use itertools::Itertools;

use crate::body::BodySystem;
use crate::collision::{intersect, IntersectResult};
use crate::contact::Contact;
use crate::derivation::get_contacts;
use crate::{COLLISION_THRESHOLD, DISTANCE_THRESHOLD};

/// Contact state of the body system as a whole.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CollisionState {
    /// At least one pair of bodies overlaps by more than the contact
    /// tolerance.
    Penetrating,
    /// No pair penetrates, and some pair in contact has a relative normal
    /// velocity below the collision tolerance (about to collide, or at rest).
    ContactRestingOrColliding,
    /// No pair penetrates, and every pair in contact is moving apart.
    ContactSeparating,
    /// All pairs are further apart than the contact tolerance.
    NotPenetrating,
}

/// True if any pair of bodies interpenetrates beyond the contact tolerance.
pub fn interpenetrating(body_system: &BodySystem) -> bool {
    let bodies = &body_system.bodies;
    (0..bodies.len()).tuple_combinations().any(|(i, j)| {
        // a pair that still overlaps after being pulled apart by the
        // tolerance has truly interpenetrated
        intersect(&bodies[i], &bodies[j], i, j, -DISTANCE_THRESHOLD).is_intersecting()
    })
}

/// Classifies the state of the whole system, worst pair first.
pub fn collision_state(body_system: &BodySystem) -> CollisionState {
    let bodies = &body_system.bodies;
    let mut state = CollisionState::NotPenetrating;

    for (i, j) in (0..bodies.len()).tuple_combinations() {
        let inner = intersect(&bodies[i], &bodies[j], i, j, -DISTANCE_THRESHOLD);
        let plane = match inner {
            // overlapping beyond the tolerance trumps everything
            IntersectResult::Intersecting => return CollisionState::Penetrating,
            IntersectResult::Separated(plane) => plane,
        };

        // pushed together by the tolerance and still separated: no contact
        let outer = intersect(&bodies[i], &bodies[j], i, j, DISTANCE_THRESHOLD);
        if !outer.is_intersecting() {
            continue;
        }

        for contact in get_contacts(&plane, bodies) {
            if contact.relative_normal_velocity(bodies) < COLLISION_THRESHOLD {
                state = CollisionState::ContactRestingOrColliding;
            } else if state != CollisionState::ContactRestingOrColliding {
                state = CollisionState::ContactSeparating;
            }
        }
    }

    state
}

/// Collects the contacts of every pair of bodies in proximity.
///
/// Panics if a pair interpenetrates; the step controller only calls this on
/// states it has verified (or bisected) to be penetration-free.
pub fn find_all_contacts(body_system: &BodySystem) -> Vec<Contact> {
    let bodies = &body_system.bodies;
    let mut all_contacts = vec![];

    for (i, j) in (0..bodies.len()).tuple_combinations() {
        let inner = intersect(&bodies[i], &bodies[j], i, j, -DISTANCE_THRESHOLD);
        let plane = match inner {
            IntersectResult::Intersecting => {
                panic!("bodies {i}/{j} interpenetrate while collecting contacts")
            }
            IntersectResult::Separated(plane) => plane,
        };

        let outer = intersect(&bodies[i], &bodies[j], i, j, DISTANCE_THRESHOLD);
        if !outer.is_intersecting() {
            // not in contact
            continue;
        }

        all_contacts.extend(get_contacts(&plane, bodies));
    }

    all_contacts
}

#[cfg(test)]
mod tests {
    use glam::dvec3;

    use super::*;
    use crate::body::{RigidBody, ShapeWithMass};

    fn system(bodies: Vec<RigidBody>) -> BodySystem {
        BodySystem {
            bodies,
            forces: vec![],
        }
    }

    #[test]
    fn distant_bodies_are_not_penetrating() {
        let bs = system(vec![
            RigidBody::new(dvec3(0., 1., 0.), ShapeWithMass::cuboid(0., 1., 1., 1.)),
            RigidBody::new(dvec3(2., 1., 0.), ShapeWithMass::cuboid(1., 1., 1., 1.)),
        ]);
        assert!(!interpenetrating(&bs));
        assert_eq!(collision_state(&bs), CollisionState::NotPenetrating);
        assert!(find_all_contacts(&bs).is_empty());
    }

    #[test]
    fn overlapping_bodies_are_penetrating() {
        let bs = system(vec![
            RigidBody::new(dvec3(0., 1., 0.), ShapeWithMass::cuboid(0., 1., 1., 1.)),
            RigidBody::new(dvec3(0.5, 1., 0.), ShapeWithMass::cuboid(1., 1., 1., 1.)),
        ]);
        assert!(interpenetrating(&bs));
        assert_eq!(collision_state(&bs), CollisionState::Penetrating);
    }

    #[test]
    fn approaching_contact_is_resting_or_colliding() {
        let floor = RigidBody::new(dvec3(0., -0.2, 0.), ShapeWithMass::cuboid(0., 16., 0.4, 10.));
        let falling = RigidBody::new(dvec3(0., 0.51, 0.), ShapeWithMass::cuboid(1., 1., 1., 1.))
            .with_momentum(dvec3(0., -1., 0.));
        let bs = system(vec![floor.clone(), falling.clone()]);
        assert_eq!(
            collision_state(&bs),
            CollisionState::ContactRestingOrColliding
        );

        let rising = falling.with_momentum(dvec3(0., 1., 0.));
        let bs = system(vec![floor, rising]);
        assert_eq!(collision_state(&bs), CollisionState::ContactSeparating);
    }

    #[test]
    fn contacts_are_collected_per_touching_pair() {
        let bs = system(vec![
            RigidBody::new(dvec3(0., -0.2, 0.), ShapeWithMass::cuboid(0., 16., 0.4, 10.)),
            RigidBody::new(dvec3(0., 0.5, 0.), ShapeWithMass::cuboid(1., 1., 1., 1.)),
            RigidBody::new(dvec3(3., 5., 0.), ShapeWithMass::cuboid(1., 1., 1., 1.)),
        ]);
        let contacts = find_all_contacts(&bs);
        assert_eq!(contacts.len(), 4);
        assert!(contacts.iter().all(|c| c.a == 1 && c.b == 0));
    }
}
