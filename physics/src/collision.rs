//! Separating-axis test for pairs of convex polyhedra.
use glam::DVec3;

use crate::body::RigidBody;

/// Outcome of a separating-axis test on an ordered pair of bodies.
///
/// Only one instance should exist per pair per query, to prevent deriving
/// duplicate contact points from it.
#[derive(Clone, Copy, Debug)]
pub enum IntersectResult {
    /// No separating plane exists; the (offset) bodies overlap.
    Intersecting,
    Separated(SeparatingPlane),
}

impl IntersectResult {
    pub fn is_intersecting(&self) -> bool {
        matches!(self, IntersectResult::Intersecting)
    }
}

/// A plane through `p` with unit normal `n`, pointing away from body `b`,
/// with all vertices of `b` on its non-positive side.
#[derive(Clone, Copy, Debug)]
pub struct SeparatingPlane {
    /// Point on `b`: a vertex of the separating face, or an edge endpoint.
    pub p: DVec3,
    /// Unit normal pointing outwards from `b`.
    pub n: DVec3,
    pub a: usize,
    /// Index of the body on which the separating plane is contained.
    pub b: usize,
    pub kind: PlaneKind,
}

#[derive(Clone, Copy, Debug)]
pub enum PlaneKind {
    /// The plane is face `fbi` of body `b`.
    Face { fbi: usize },
    /// The plane is spanned by an edge of each body; `ea` and `eb` are the
    /// unitized edge directions on `a` and `b`, `eai` and `ebi` the edge
    /// indices.
    Edge {
        ea: DVec3,
        eb: DVec3,
        eai: usize,
        ebi: usize,
    },
}

impl SeparatingPlane {
    /// Signed distance from the plane to `v`.
    pub fn dist(&self, v: DVec3) -> f64 {
        self.n.dot(v - self.p)
    }
}

/// Side of the plane `(p, n)` the vertices of `e` lie on: +1 all positive,
/// -1 all negative, 0 mixed.
///
/// The case where every vertex lies exactly on the plane is not reported
/// separately; it comes out as -1. Co-planar configurations therefore cannot
/// be told apart from containment on the negative side.
fn which_side(e: &RigidBody, p: DVec3, n: DVec3) -> i32 {
    let mut positive = 0;
    let mut negative = 0;
    for i in 0..e.topology().vertices.len() {
        let v = e.world_vertex(i);
        let t = n.dot(v - p);
        if t > 0. {
            positive += 1;
        } else if t < 0. {
            negative += 1;
        }
        if positive > 0 && negative > 0 {
            return 0;
        }
    }

    if positive > 0 {
        1
    } else {
        -1
    }
}

/// Same as [`which_side`], with the vertices of `c` translated `offset` units
/// towards the plane owner `d` first. The same unreported degeneracy applies.
fn which_side_offset(c: &RigidBody, d: &RigidBody, p: DVec3, n: DVec3, offset: f64) -> i32 {
    let dir = d.x - c.x;
    let mut positive = 0;
    let mut negative = 0;
    for i in 0..c.topology().vertices.len() {
        let v = c.world_vertex_offset(i, offset, dir);
        let t = n.dot(v - p);
        if t > 0. {
            positive += 1;
        } else if t < 0. {
            negative += 1;
        }
        if positive > 0 && negative > 0 {
            return 0;
        }
    }

    if positive > 0 {
        1
    } else {
        -1
    }
}

/// Searches for a plane separating `x` and `y`, either containing a face of
/// one of them or spanned by the cross product of one edge of each.
///
/// `offset` inflates or deflates the test: the vertices of the body being
/// tested against a plane are translated by `offset` along the unit vector
/// towards the plane owner. A positive offset moves the bodies together
/// (proximity query), a negative one moves them apart (penetration query).
///
/// `xi` and `yi` are the indices the bodies have in their system, recorded in
/// the result for later contact derivation.
pub fn intersect(
    x: &RigidBody,
    y: &RigidBody,
    xi: usize,
    yi: usize,
    offset: f64,
) -> IntersectResult {
    // take x as b and test planes formed by faces of x against the (offset)
    // vertices of y (the vertices of x all lie on the negative side already)
    for i in 0..x.topology().faces.len() {
        let p = x.world_vertex(x.topology().faces[i][0].0);
        let n = x.non_unit_normal(i).normalize();
        if which_side_offset(y, x, p, n, offset) > 0 {
            return IntersectResult::Separated(SeparatingPlane {
                p,
                n,
                a: yi,
                b: xi,
                kind: PlaneKind::Face { fbi: i },
            });
        }
    }

    // symmetrically, take y as b
    for i in 0..y.topology().faces.len() {
        let p = y.world_vertex(y.topology().faces[i][0].0);
        let n = y.non_unit_normal(i).normalize();
        if which_side_offset(x, y, p, n, offset) > 0 {
            return IntersectResult::Separated(SeparatingPlane {
                p,
                n,
                a: xi,
                b: yi,
                kind: PlaneKind::Face { fbi: i },
            });
        }
    }

    for (i, &(i0, i1)) in x.topology().edges.iter().enumerate() {
        let ex0 = x.world_vertex(i0);
        let ex1 = x.world_vertex(i1);
        let ex = (ex0 - ex1).normalize();
        for (j, &(j0, j1)) in y.topology().edges.iter().enumerate() {
            let ey0 = y.world_vertex(j0);
            let ey1 = y.world_vertex(j1);
            let ey = (ey0 - ey1).normalize();

            let n = ex.cross(ey).normalize();

            // take x as b: the plane runs through the edge of x
            'x_as_b: {
                let side_y = which_side_offset(y, x, ex0, n, offset);
                if side_y == 0 {
                    break 'x_as_b;
                }
                let side_x = which_side(x, ex0, n);
                if side_x == 0 {
                    break 'x_as_b;
                }

                if side_x * side_y < 0 {
                    // the normal must point outwards from b, flip the edge of
                    // b if the vertices of x ended up on the positive side
                    let (ex, n) = if side_x == 1 {
                        let ex = -ex;
                        (ex, ex.cross(ey).normalize())
                    } else {
                        (ex, n)
                    };
                    return IntersectResult::Separated(SeparatingPlane {
                        p: ex0,
                        n,
                        a: yi,
                        b: xi,
                        kind: PlaneKind::Edge {
                            ea: ey,
                            eb: ex,
                            eai: j,
                            ebi: i,
                        },
                    });
                }
            }

            // take y as b: the plane runs through the edge of y
            let side_x = which_side_offset(x, y, ey0, n, offset);
            if side_x == 0 {
                continue;
            }
            let side_y = which_side(y, ey0, n);
            if side_y == 0 {
                continue;
            }

            if side_x * side_y < 0 {
                let (ex, n) = if side_y == 1 {
                    let ex = -ex;
                    (ex, ex.cross(ey).normalize())
                } else {
                    (ex, n)
                };
                return IntersectResult::Separated(SeparatingPlane {
                    p: ey0,
                    n,
                    a: xi,
                    b: yi,
                    kind: PlaneKind::Edge {
                        ea: ex,
                        eb: ey,
                        eai: i,
                        ebi: j,
                    },
                });
            }
        }
    }

    IntersectResult::Intersecting
}

#[cfg(test)]
mod tests {
    use std::f64::consts::FRAC_PI_4;

    use glam::{dvec3, DMat3, DVec3};

    use super::*;
    use crate::body::ShapeWithMass;

    fn unit_cube(at: DVec3) -> RigidBody {
        RigidBody::new(at, ShapeWithMass::cuboid(1., 1., 1., 1.))
    }

    fn assert_sound(plane: &SeparatingPlane, bodies: [&RigidBody; 2]) {
        assert!((plane.n.length() - 1.).abs() <= 1e-9);
        let b = bodies[plane.b];
        for i in 0..b.topology().vertices.len() {
            assert!(plane.dist(b.world_vertex(i)) <= 1e-9);
        }
    }

    #[test]
    fn separated_cubes_yield_a_face_plane() {
        let x = unit_cube(DVec3::ZERO);
        let y = unit_cube(dvec3(2., 0., 0.));
        match intersect(&x, &y, 0, 1, 0.) {
            IntersectResult::Separated(plane) => {
                assert!(matches!(plane.kind, PlaneKind::Face { .. }));
                assert_sound(&plane, [&x, &y]);
            }
            IntersectResult::Intersecting => panic!("expected a separating plane"),
        }
    }

    #[test]
    fn overlapping_cubes_intersect() {
        let x = unit_cube(DVec3::ZERO);
        let y = unit_cube(dvec3(0.5, 0.5, 0.));
        assert!(intersect(&x, &y, 0, 1, 0.).is_intersecting());
    }

    #[test]
    fn positive_offset_detects_proximity() {
        let x = unit_cube(DVec3::ZERO);
        let y = unit_cube(dvec3(1.01, 0., 0.));
        assert!(!intersect(&x, &y, 0, 1, 0.).is_intersecting());
        // moved 0.02 towards each other the gap of 0.01 closes
        assert!(intersect(&x, &y, 0, 1, 0.02).is_intersecting());
        // moved apart the gap only widens
        assert!(!intersect(&x, &y, 0, 1, -0.02).is_intersecting());
    }

    #[test]
    fn crossed_edges_yield_an_edge_plane() {
        // bottom cube presents an edge along z, top cube an edge along x;
        // no face of either is parallel to the horizontal gap between them
        let bottom = unit_cube(DVec3::ZERO).oriented(DMat3::from_axis_angle(
            dvec3(0., 0., 1.),
            FRAC_PI_4,
        ));
        let sqrt2 = 2.0_f64.sqrt();
        let top = unit_cube(dvec3(0., sqrt2 + 0.05, 0.)).oriented(DMat3::from_axis_angle(
            dvec3(1., 0., 0.),
            FRAC_PI_4,
        ));
        match intersect(&bottom, &top, 0, 1, 0.) {
            IntersectResult::Separated(plane) => {
                assert!(matches!(plane.kind, PlaneKind::Edge { .. }));
                assert_sound(&plane, [&bottom, &top]);
            }
            IntersectResult::Intersecting => panic!("expected a separating plane"),
        }
    }
}
