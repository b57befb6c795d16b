//! Contact points produced by manifold derivation.
use glam::DVec3;

use crate::body::RigidBody;

/// Feature pairing behind a contact point.
#[derive(Clone, Copy, Debug)]
pub enum ContactKind {
    /// `p` is a vertex of body `a` lying on a face of body `b`; the normal is
    /// the face normal.
    VertexFace,
    /// `p` lies on an edge of both bodies; `ea` and `eb` are the unitized
    /// edge directions on `a` and `b`.
    EdgeEdge { ea: DVec3, eb: DVec3 },
}

/// A single point of contact between an ordered pair of bodies.
#[derive(Clone, Copy, Debug)]
pub struct Contact {
    /// Point of contact, always attached to body `a`.
    pub p: DVec3,
    /// Unit normal pointing outwards from body `b`.
    pub n: DVec3,
    /// Index of the body `p` is attached to.
    pub a: usize,
    /// Index of the body owning the face (or second edge).
    pub b: usize,
    /// Reference point on body `b`, used for the signed distance.
    pub pb: DVec3,
    pub kind: ContactKind,
}

impl Contact {
    pub fn vertex_face(
        p: DVec3,
        n: DVec3,
        a: usize,
        b: usize,
        pb: DVec3,
        body_b: &RigidBody,
    ) -> Contact {
        assert!(
            n.dot(p - body_b.x) >= 0.,
            "contact normal points into body {b} (pair {a}/{b} at {p})"
        );
        Contact {
            p,
            n,
            a,
            b,
            pb,
            kind: ContactKind::VertexFace,
        }
    }

    #[allow(clippy::too_many_arguments)]
    pub fn edge_edge(
        p: DVec3,
        n: DVec3,
        a: usize,
        b: usize,
        pb: DVec3,
        ea: DVec3,
        eb: DVec3,
        body_b: &RigidBody,
    ) -> Contact {
        assert!(
            n.dot(p - body_b.x) >= 0.,
            "contact normal points into body {b} (pair {a}/{b} at {p})"
        );
        Contact {
            p,
            n,
            a,
            b,
            pb,
            kind: ContactKind::EdgeEdge { ea, eb },
        }
    }

    pub fn is_vertex_face(&self) -> bool {
        matches!(self.kind, ContactKind::VertexFace)
    }

    /// Signed distance from `p` to the contact feature on body `b`.
    pub fn distance(&self) -> f64 {
        self.n.dot(self.p - self.pb)
    }

    /// Relative velocity of the contact point along the normal; negative
    /// means the bodies approach each other.
    pub fn relative_normal_velocity(&self, bodies: &[RigidBody]) -> f64 {
        let padot = bodies[self.a].point_velocity(self.p);
        let pbdot = bodies[self.b].point_velocity(self.p);
        self.n.dot(padot - pbdot)
    }
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;
    use glam::dvec3;

    use super::*;
    use crate::body::ShapeWithMass;

    fn unit_cube(inv_mass: f64, at: DVec3) -> RigidBody {
        RigidBody::new(at, ShapeWithMass::cuboid(inv_mass, 1., 1., 1.))
    }

    #[test]
    fn distance_is_signed_along_the_normal() {
        let floor = unit_cube(0., dvec3(0., -0.5, 0.));
        let c = Contact::vertex_face(
            dvec3(0.2, 0.01, 0.),
            dvec3(0., 1., 0.),
            1,
            0,
            dvec3(0., 0., 0.),
            &floor,
        );
        assert_relative_eq!(c.distance(), 0.01);
    }

    #[test]
    #[should_panic(expected = "contact normal points into body")]
    fn inward_normal_is_rejected() {
        let floor = unit_cube(0., dvec3(0., -0.5, 0.));
        let _ = Contact::vertex_face(
            dvec3(0., 0., 0.),
            dvec3(0., -1., 0.),
            1,
            0,
            dvec3(0., 0., 0.),
            &floor,
        );
    }

    #[test]
    fn relative_velocity_uses_both_point_velocities() {
        let bodies = vec![
            unit_cube(0., dvec3(0., -0.5, 0.)),
            unit_cube(1., dvec3(0., 0.5, 0.)).with_momentum(dvec3(0., -2., 0.)),
        ];
        let c = Contact::vertex_face(
            dvec3(0., 0., 0.),
            dvec3(0., 1., 0.),
            1,
            0,
            dvec3(0., 0., 0.),
            &bodies[0],
        );
        assert_relative_eq!(c.relative_normal_velocity(&bodies), -2.);
    }
}
