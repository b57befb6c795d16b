//! Polyhedron templates the simulation bodies are instanced from.
//!
//! Every template is a closed convex polyhedron that fits in a unit cube
//! centered at the origin. Faces are wound counter-clockwise when viewed
//! from outside the shape, so `cross(v3 - v2, v1 - v2)` points outwards.
use std::sync::LazyLock;

use glam::{dvec3, vec2, DVec3, Vec2};

/// The polyhedron templates known to the simulation.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ShapeKind {
    Cube,
    Icosahedron,
}

impl ShapeKind {
    pub fn topology(self) -> &'static Topology {
        match self {
            ShapeKind::Cube => &CUBE,
            ShapeKind::Icosahedron => &ICOSAHEDRON,
        }
    }
}

/// Vertex, edge and face tables of one polyhedron template.
///
/// Vertices and edges are in no particular order. Each face is an ordered
/// list of `(vertex index, texture coordinate)` pairs.
#[derive(Clone, Debug)]
pub struct Topology {
    pub vertices: Vec<DVec3>,
    pub edges: Vec<(usize, usize)>,
    pub faces: Vec<Vec<(usize, Vec2)>>,
}

impl Topology {
    /// Outward, non-unit normal of face `face_i`, derived from the winding.
    pub fn non_unit_normal(&self, face_i: usize) -> DVec3 {
        let v1 = self.vertices[self.faces[face_i][0].0];
        let v2 = self.vertices[self.faces[face_i][1].0];
        let v3 = self.vertices[self.faces[face_i][2].0];
        //    v1
        //     `v2-v3
        (v3 - v2).cross(v1 - v2)
    }
}

static CUBE: LazyLock<Topology> = LazyLock::new(|| {
    // +         (4) top            -
    // y       3-------5           z
    // ^      /|  (2) /|          ^
    // |     2-------6 | (1)     /
    // o (3) | 0-----|-4        o
    // |     |/ (0)  |/        /
    // v     1-------7        v
    // y        (5) bottom   z
    // - - x < - o - > x +  +
    Topology {
        vertices: vec![
            dvec3(-0.5, -0.5, -0.5), // 0
            dvec3(-0.5, -0.5, 0.5),  // 1
            dvec3(-0.5, 0.5, 0.5),   // 2
            dvec3(-0.5, 0.5, -0.5),  // 3
            dvec3(0.5, -0.5, -0.5),  // 4
            dvec3(0.5, 0.5, -0.5),   // 5
            dvec3(0.5, 0.5, 0.5),    // 6
            dvec3(0.5, -0.5, 0.5),   // 7
        ],
        edges: vec![
            (0, 1),
            (1, 2),
            (2, 3),
            (3, 0),
            (4, 5),
            (5, 6),
            (6, 7),
            (7, 4),
            (0, 4),
            (1, 7),
            (2, 6),
            (3, 5),
        ],
        faces: vec![
            // -z (2)
            vec![
                (0, vec2(0.2 * 2., 0.25 * 3.)),
                (3, vec2(0.2 * 2., 0.25 * 4.)),
                (5, vec2(0.2 * 1., 0.25 * 4.)),
                (4, vec2(0.2 * 1., 0.25 * 3.)),
            ],
            // +x (1)
            vec![
                (4, vec2(0.2 * 4., 0.25 * 3.)),
                (5, vec2(0.2 * 4., 0.25 * 4.)),
                (6, vec2(0.2 * 3., 0.25 * 4.)),
                (7, vec2(0.2 * 3., 0.25 * 3.)),
            ],
            // +z (0)
            vec![
                (7, vec2(0.2 * 5., 0.25 * 3.)),
                (6, vec2(0.2 * 5., 0.25 * 4.)),
                (2, vec2(0.2 * 4., 0.25 * 4.)),
                (1, vec2(0.2 * 4., 0.25 * 3.)),
            ],
            // -x (3)
            vec![
                (1, vec2(0.2 * 3., 0.25 * 3.)),
                (2, vec2(0.2 * 3., 0.25 * 4.)),
                (3, vec2(0.2 * 2., 0.25 * 4.)),
                (0, vec2(0.2 * 2., 0.25 * 3.)),
            ],
            // +y (4)
            vec![
                (3, vec2(0.2 * 1., 0.25 * 3.)),
                (2, vec2(0.2 * 1., 0.25 * 4.)),
                (6, vec2(0.2 * 0., 0.25 * 4.)),
                (5, vec2(0.2 * 0., 0.25 * 3.)),
            ],
            // -y (5)
            vec![
                (1, vec2(0.2 * 1., 0.25 * 2.)),
                (0, vec2(0.2 * 1., 0.25 * 3.)),
                (4, vec2(0.2 * 0., 0.25 * 3.)),
                (7, vec2(0.2 * 0., 0.25 * 2.)),
            ],
        ],
    }
});

static ICOSAHEDRON: LazyLock<Topology> = LazyLock::new(|| {
    // +            2                -
    // y       5 ----- 7            z
    // ^     8 (19) |  (1) 10      ^
    // |    /   3   0     /       /
    // o   9    |       11       o
    // |     4 -|--- 6          /
    // v        1              v
    // y                     z
    // - - x < - o - > x +  +
    let a = (1. / ((1. + 5.0_f64.sqrt()) / 2.)) / 2.;
    let b = 0.5;
    // vertical offset into the texture atlas rows
    let d = ((1. - 3.0_f32.sqrt() / 2.) / 4.) as f32;
    Topology {
        vertices: vec![
            dvec3(0., -a, -b), // 0
            dvec3(0., -a, b),  // 1
            dvec3(0., a, -b),  // 2
            dvec3(0., a, b),   // 3
            dvec3(-a, -b, 0.), // 4
            dvec3(-a, b, 0.),  // 5
            dvec3(a, -b, 0.),  // 6
            dvec3(a, b, 0.),   // 7
            dvec3(-b, 0., -a), // 8
            dvec3(-b, 0., a),  // 9
            dvec3(b, 0., -a),  // 10
            dvec3(b, 0., a),   // 11
        ],
        edges: vec![
            (1, 3),
            (4, 6),
            (11, 10),
            (8, 9),
            (2, 0),
            (5, 7),
            (9, 3),
            (9, 1),
            (11, 3),
            (11, 1),
            (10, 2),
            (10, 0),
            (8, 2),
            (8, 0),
            (5, 8),
            (5, 9),
            (4, 8),
            (4, 9),
            (7, 10),
            (7, 11),
            (6, 10),
            (6, 11),
            (3, 5),
            (3, 7),
            (2, 5),
            (2, 7),
            (1, 4),
            (1, 6),
            (0, 4),
            (0, 6),
        ],
        //      2
        //    number
        //  1       0
        faces: vec![
            // (1)
            vec![
                (10, vec2(0.2 * 0., 0.25 * 3. + d)),
                (0, vec2(0.2 * 1., 0.25 * 3. + d)),
                (2, vec2(0.1 + 0.2 * 0., 0.25 * 4.)),
            ],
            // (2)
            vec![
                (3, vec2(0.2 * 1., 0.25 * 3. + d)),
                (1, vec2(0.2 * 2., 0.25 * 3. + d)),
                (11, vec2(0.1 + 0.2 * 1., 0.25 * 4.)),
            ],
            // (3)
            vec![
                (2, vec2(0.2 * 2., 0.25 * 3. + d)),
                (8, vec2(0.2 * 3., 0.25 * 3. + d)),
                (5, vec2(0.1 + 0.2 * 2., 0.25 * 4.)),
            ],
            // (4)
            vec![
                (1, vec2(0.2 * 3., 0.25 * 3. + d)),
                (4, vec2(0.2 * 4., 0.25 * 3. + d)),
                (6, vec2(0.1 + 0.2 * 3., 0.25 * 4.)),
            ],
            // (5)
            vec![
                (6, vec2(0.2 * 4., 0.25 * 3. + d)),
                (10, vec2(0.2 * 5., 0.25 * 3. + d)),
                (11, vec2(0.1 + 0.2 * 4., 0.25 * 4.)),
            ],
            // (6)
            vec![
                (4, vec2(0.2 * 0., 0.25 * 2. + d)),
                (9, vec2(0.2 * 1., 0.25 * 2. + d)),
                (8, vec2(0.1 + 0.2 * 0., 0.25 * 3.)),
            ],
            // (7)
            vec![
                (10, vec2(0.2 * 1., 0.25 * 2. + d)),
                (2, vec2(0.2 * 2., 0.25 * 2. + d)),
                (7, vec2(0.1 + 0.2 * 1., 0.25 * 3.)),
            ],
            // (8)
            vec![
                (9, vec2(0.2 * 2., 0.25 * 2. + d)),
                (3, vec2(0.2 * 3., 0.25 * 2. + d)),
                (5, vec2(0.1 + 0.2 * 2., 0.25 * 3.)),
            ],
            // (9)
            vec![
                (8, vec2(0.2 * 3., 0.25 * 2. + d)),
                (0, vec2(0.2 * 4., 0.25 * 2. + d)),
                (4, vec2(0.1 + 0.2 * 3., 0.25 * 3.)),
            ],
            // (10)
            vec![
                (5, vec2(0.2 * 4., 0.25 * 2. + d)),
                (3, vec2(0.2 * 5., 0.25 * 2. + d)),
                (7, vec2(0.1 + 0.2 * 4., 0.25 * 3.)),
            ],
            // (11)
            vec![
                (0, vec2(0.2 * 0., 0.25 * 1. + d)),
                (6, vec2(0.2 * 1., 0.25 * 1. + d)),
                (4, vec2(0.1 + 0.2 * 0., 0.25 * 2.)),
            ],
            // (12)
            vec![
                (3, vec2(0.2 * 1., 0.25 * 1. + d)),
                (11, vec2(0.2 * 2., 0.25 * 1. + d)),
                (7, vec2(0.1 + 0.2 * 1., 0.25 * 2.)),
            ],
            // (13)
            vec![
                (0, vec2(0.2 * 2., 0.25 * 1. + d)),
                (10, vec2(0.2 * 3., 0.25 * 1. + d)),
                (6, vec2(0.1 + 0.2 * 2., 0.25 * 2.)),
            ],
            // (14)
            vec![
                (1, vec2(0.2 * 3., 0.25 * 1. + d)),
                (9, vec2(0.2 * 4., 0.25 * 1. + d)),
                (4, vec2(0.1 + 0.2 * 3., 0.25 * 2.)),
            ],
            // (15)
            vec![
                (10, vec2(0.2 * 4., 0.25 * 1. + d)),
                (7, vec2(0.2 * 5., 0.25 * 1. + d)),
                (11, vec2(0.1 + 0.2 * 4., 0.25 * 2.)),
            ],
            // (16)
            vec![
                (9, vec2(0.2 * 0., 0.25 * 0. + d)),
                (5, vec2(0.2 * 1., 0.25 * 0. + d)),
                (8, vec2(0.1 + 0.2 * 0., 0.25 * 1.)),
            ],
            // (17)
            vec![
                (7, vec2(0.2 * 1., 0.25 * 0. + d)),
                (2, vec2(0.2 * 2., 0.25 * 0. + d)),
                (5, vec2(0.1 + 0.2 * 1., 0.25 * 1.)),
            ],
            // (18)
            vec![
                (11, vec2(0.2 * 2., 0.25 * 0. + d)),
                (1, vec2(0.2 * 3., 0.25 * 0. + d)),
                (6, vec2(0.1 + 0.2 * 2., 0.25 * 1.)),
            ],
            // (19)
            vec![
                (2, vec2(0.2 * 3., 0.25 * 0. + d)),
                (0, vec2(0.2 * 4., 0.25 * 0. + d)),
                (8, vec2(0.1 + 0.2 * 3., 0.25 * 1.)),
            ],
            // (20)
            vec![
                (3, vec2(0.2 * 4., 0.25 * 0. + d)),
                (9, vec2(0.2 * 5., 0.25 * 0. + d)),
                (1, vec2(0.1 + 0.2 * 4., 0.25 * 1.)),
            ],
        ],
    }
});

#[cfg(test)]
mod tests {
    use super::*;

    fn check_template(kind: ShapeKind) {
        let topo = kind.topology();

        for &(e1, e2) in &topo.edges {
            assert!(e1 < topo.vertices.len());
            assert!(e2 < topo.vertices.len());
            assert_ne!(e1, e2);
        }

        for v in &topo.vertices {
            assert!(v.x.abs() <= 0.5 + 1e-12);
            assert!(v.y.abs() <= 0.5 + 1e-12);
            assert!(v.z.abs() <= 0.5 + 1e-12);
        }

        for (i, face) in topo.faces.iter().enumerate() {
            assert!(face.len() >= 3);
            let n = topo.non_unit_normal(i);
            assert!(n.length() > 0.);
            // winding must put the origin on the inner side of each face plane
            let p = topo.vertices[face[0].0];
            assert!(n.dot(p) > 0.);
            // and every face vertex must lie in that plane
            for &(vi, _) in face {
                let v = topo.vertices[vi];
                assert!(n.normalize().dot(v - p).abs() < 1e-9);
            }
        }
    }

    #[test]
    fn cube_template_is_consistent() {
        check_template(ShapeKind::Cube);
        let topo = ShapeKind::Cube.topology();
        assert_eq!(topo.vertices.len(), 8);
        assert_eq!(topo.edges.len(), 12);
        assert_eq!(topo.faces.len(), 6);
    }

    #[test]
    fn icosahedron_template_is_consistent() {
        check_template(ShapeKind::Icosahedron);
        let topo = ShapeKind::Icosahedron.topology();
        assert_eq!(topo.vertices.len(), 12);
        assert_eq!(topo.edges.len(), 30);
        assert_eq!(topo.faces.len(), 20);
    }
}
