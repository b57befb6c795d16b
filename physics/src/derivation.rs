//! Derives contact points from a separating plane found at the contact
//! tolerance.
use glam::DVec3;

use crate::body::RigidBody;
use crate::collision::{PlaneKind, SeparatingPlane};
use crate::contact::Contact;
use crate::DISTANCE_THRESHOLD;

/// The largest topological feature of a body lying in the separating plane.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Feature {
    Face(usize),
    /// A face touching the plane with more than one of its edges but not all
    /// of its vertices.
    SpecialFace(usize),
    Edge(usize),
    Vertex(usize),
}

/// Derives the contact points implied by a separating plane between a pair of
/// bodies that are in contact (or near contact).
///
/// May well produce no contacts, for example when a vertex of `a` is close to
/// the separating plane but nowhere near the face of `b`.
pub fn get_contacts(plane: &SeparatingPlane, bodies: &[RigidBody]) -> Vec<Contact> {
    match find_feature(plane, bodies) {
        Feature::Face(fai) => contacts_face(plane, bodies, fai, false),
        Feature::SpecialFace(fai) => contacts_face(plane, bodies, fai, true),
        Feature::Edge(eai) => contacts_edge(plane, bodies, eai),
        Feature::Vertex(vai) => contacts_vertex(plane, bodies, vai),
    }
}

/// Classifies the feature of body `a` lying in the plane, largest class
/// first: face, then partially-touching face, then edge, then vertex.
fn find_feature(plane: &SeparatingPlane, bodies: &[RigidBody]) -> Feature {
    let a = &bodies[plane.a];
    let topo = a.topology();
    let in_plane = |v: DVec3| plane.dist(v).abs() <= DISTANCE_THRESHOLD;

    // 1. a face with every vertex in the plane
    let mut face_i = None;
    for (i, face) in topo.faces.iter().enumerate() {
        if face.iter().all(|&(vi, _)| in_plane(a.world_vertex(vi))) {
            if let Some(prev) = face_i {
                // TODO two faces of one body in the plane: pick a policy
                panic!(
                    "bodies {}/{}: faces {prev} and {i} both lie in the separating plane",
                    plane.a, plane.b
                );
            }
            face_i = Some(i);
        }
    }
    if let Some(i) = face_i {
        return Feature::Face(i);
    }

    // 2. a face with more than one (but, given step 1, not all) of its edges
    // in the plane
    let mut special_face_i = None;
    for (i, face) in topo.faces.iter().enumerate() {
        let mut edges_contained = 0;
        let mut e1 = a.world_vertex(face.last().unwrap().0);
        for &(vi, _) in face {
            let e2 = a.world_vertex(vi);
            if in_plane(e1) && in_plane(e2) {
                edges_contained += 1;
            }
            e1 = e2;
        }
        if edges_contained > 1 {
            if let Some(prev) = special_face_i {
                // TODO two faces of one body in the plane: pick a policy
                panic!(
                    "bodies {}/{}: faces {prev} and {i} both touch the separating plane",
                    plane.a, plane.b
                );
            }
            special_face_i = Some(i);
        }
    }
    if let Some(i) = special_face_i {
        return Feature::SpecialFace(i);
    }

    // 3. an edge
    let mut edge_i = None;
    for (i, &(v1, v2)) in topo.edges.iter().enumerate() {
        if in_plane(a.world_vertex(v1)) && in_plane(a.world_vertex(v2)) {
            if let Some(prev) = edge_i {
                panic!(
                    "bodies {}/{}: edges {prev} and {i} both lie in the separating plane",
                    plane.a, plane.b
                );
            }
            edge_i = Some(i);
        }
    }
    if let Some(i) = edge_i {
        return Feature::Edge(i);
    }

    // 4. a vertex
    let mut vertex_i = None;
    for i in 0..topo.vertices.len() {
        if in_plane(a.world_vertex(i)) {
            if let Some(prev) = vertex_i {
                panic!(
                    "bodies {}/{}: vertices {prev} and {i} both lie in the separating plane",
                    plane.a, plane.b
                );
            }
            vertex_i = Some(i);
        }
    }
    if let Some(i) = vertex_i {
        return Feature::Vertex(i);
    }

    panic!(
        "bodies {}/{}: no topological feature lies in the separating plane",
        plane.a, plane.b
    );
}

/// Intersection of the segment `e1`-`e2` with the face border edge `f1`-`f2`
/// (endpoints ordered as in the face definition) of a face with normal `fn_`,
/// assuming all points lie in the face plane.
fn segment_intersection(f1: DVec3, f2: DVec3, fn_: DVec3, e1: DVec3, e2: DVec3) -> Option<DVec3> {
    // points outwards: the face normal points out of the body and the face
    // edges are counter-clockwise ordered from the outside
    let fm = (f2 - f1).cross(fn_).normalize();
    let dist_e1 = fm.dot(e1 - f1);
    let dist_e2 = fm.dot(e2 - f1);

    // does not necessarily point in or out
    let em = (e2 - e1).cross(fn_).normalize();
    let dist_f1 = em.dot(f1 - e1);
    let dist_f2 = em.dot(f2 - e1);

    // the segments cross iff either's endpoints straddle the other's line
    if dist_e1 * dist_e2 <= 0. && dist_f1 * dist_f2 <= 0. {
        let x = (e2 - e1).normalize();
        let p = e2 - x * (dist_e2 / x.dot(fm));
        // the crossing must lie between the endpoints
        if (e2 - e1).dot(p - e1) >= 0. && (e1 - e2).dot(p - e2) >= 0. {
            return Some(p);
        }
    }

    None
}

/// True if the world-space point `vy` lies inside the infinite column swept
/// by face `face_x` of `x` along its normal. Assumes `vy` lies (near) the
/// face plane.
fn inside(x: &RigidBody, face_x: usize, vy: DVec3) -> bool {
    let face = &x.topology().faces[face_x];
    let mut ex1 = x.world_vertex(face.last().unwrap().0);
    for &(vi, _) in face {
        let ex2 = x.world_vertex(vi);
        // points outwards: the normal of the face of x points out of x and
        // the face is counter-clockwise ordered from the outside
        let m = (ex2 - ex1).cross(x.non_unit_normal(face_x)).normalize();
        if (vy - ex1).dot(m) > 0. {
            return false;
        }
        ex1 = ex2;
    }

    true
}

/// [`inside`], but walking only the vertices of `face_x` that lie within the
/// contact tolerance of the plane through `vy` with normal `normal_y`.
fn inside_checked(x: &RigidBody, face_x: usize, vy: DVec3, normal_y: DVec3) -> bool {
    let face = &x.topology().faces[face_x];

    // the last point of the walk that is within tolerance
    let mut ex1 = face
        .iter()
        .rev()
        .map(|&(vi, _)| x.world_vertex(vi))
        .find(|&vx| normal_y.dot(vx - vy).abs() <= DISTANCE_THRESHOLD)
        .unwrap_or(DVec3::ZERO);
    for &(vi, _) in face {
        let ex2 = x.world_vertex(vi);
        // out-of-tolerance vertices do not advance the walk
        if normal_y.dot(ex2 - vy).abs() > DISTANCE_THRESHOLD {
            continue;
        }
        let m = (ex2 - ex1).cross(x.non_unit_normal(face_x)).normalize();
        if (vy - ex1).dot(m) > 0. {
            return false;
        }
        ex1 = ex2;
    }

    true
}

/// Unit normal of an edge-edge pairing, re-signed to point away from the
/// center of body `b` at `b_x`. When the sign flips, `flip_a` selects which
/// of the two edge directions is negated along with it.
fn corrected_edge_normal(
    p: DVec3,
    b_x: DVec3,
    ea: DVec3,
    eb: DVec3,
    flip_a: bool,
) -> (DVec3, DVec3, DVec3) {
    let n = ea.cross(eb).normalize();
    if n.dot(p - b_x) >= 0. {
        (n, ea, eb)
    } else if flip_a {
        let ea = -ea;
        (ea.cross(eb).normalize(), ea, eb)
    } else {
        let eb = -eb;
        (ea.cross(eb).normalize(), ea, eb)
    }
}

/// Contacts for a single vertex of `a` lying in the plane.
fn contacts_vertex(plane: &SeparatingPlane, bodies: &[RigidBody], vai: usize) -> Vec<Contact> {
    let a = &bodies[plane.a];
    let b = &bodies[plane.b];
    let mut contacts = vec![];

    match plane.kind {
        PlaneKind::Edge { .. } => {
            // if a separating plane is spanned by two edges, an edge must be
            // the largest feature of a lying in it
            panic!(
                "bodies {}/{}: vertex feature against an edge-edge plane",
                plane.a, plane.b
            );
        }
        PlaneKind::Face { fbi } => {
            let p = a.world_vertex(vai);
            // the vertex only makes contact if it projects into b's face
            if inside(b, fbi, p) {
                contacts.push(Contact::vertex_face(
                    p, plane.n, plane.a, plane.b, plane.p, b,
                ));
            }
        }
    }

    contacts
}

/// Contacts for a single edge of `a` lying in the plane.
fn contacts_edge(plane: &SeparatingPlane, bodies: &[RigidBody], eai: usize) -> Vec<Contact> {
    let a = &bodies[plane.a];
    let b = &bodies[plane.b];
    let mut contacts = vec![];

    match plane.kind {
        PlaneKind::Edge { ea, eb, ebi, .. } => {
            // TODO could test whether more than just the edge of b lies in
            // the plane; if a face of b were involved, a plane spanned by
            // that face would most likely have been found instead
            let (a1, a2) = a.topology().edges[eai];
            let ea1 = a.world_vertex(a1);
            let ea2 = a.world_vertex(a2);

            let (b1, b2) = b.topology().edges[ebi];
            let eb1 = b.world_vertex(b1);
            let eb2 = b.world_vertex(b2);

            // direction of the plane coming out of the edge of b
            let m = plane.n.cross(eb).normalize();
            let dist_ea1 = m.dot(ea1 - eb1);
            let dist_ea2 = m.dot(ea2 - eb1);

            // direction of the plane coming out of the edge of a
            let k = plane.n.cross(ea).normalize();
            let dist_eb1 = k.dot(eb1 - ea1);
            let dist_eb2 = k.dot(eb2 - ea1);

            // the two in-plane edges must cross for a contact to exist
            if dist_ea1 * dist_ea2 <= 0. && dist_eb1 * dist_eb2 <= 0. {
                let x = (ea2 - ea1).normalize();
                let v = ea2 - x * (dist_ea2 / x.dot(m));
                contacts.push(Contact::edge_edge(
                    v, plane.n, plane.a, plane.b, eb1, ea, eb, b,
                ));
            }
        }
        PlaneKind::Face { fbi } => {
            // clip the edge of a against the face polygon of b
            let (a1, a2) = a.topology().edges[eai];
            let ea1 = a.world_vertex(a1);
            let ea2 = a.world_vertex(a2);
            let ea = (ea1 - ea2).normalize();

            let ea1_inside = inside(b, fbi, ea1);
            let ea2_inside = inside(b, fbi, ea2);

            let face_b = &b.topology().faces[fbi];
            let pb = b.world_vertex(face_b.last().unwrap().0);

            // crossing point and unitized direction of the crossed border edge
            let mut hits: Vec<(DVec3, DVec3)> = vec![];
            let mut eb1 = pb;
            for &(vi, _) in face_b {
                let eb2 = b.world_vertex(vi);
                if let Some(p) = segment_intersection(eb1, eb2, plane.n, ea1, ea2) {
                    if hits.len() == 2 {
                        panic!(
                            "bodies {}/{}: an edge crossed a convex face more than twice",
                            plane.a, plane.b
                        );
                    }
                    hits.push((p, (eb2 - eb1).normalize()));
                }
                eb1 = eb2;
            }

            match (ea1_inside, ea2_inside, hits.as_slice()) {
                // edge fully contained by the face
                (true, true, []) => {
                    contacts.push(Contact::vertex_face(ea1, plane.n, plane.a, plane.b, pb, b));
                    contacts.push(Contact::vertex_face(ea2, plane.n, plane.a, plane.b, pb, b));
                }
                // one endpoint inside, one crossing
                (true, false, &[(p1, eb_one)]) | (false, true, &[(p1, eb_one)]) => {
                    let endpoint = if ea1_inside { ea1 } else { ea2 };
                    contacts.push(Contact::vertex_face(
                        endpoint, plane.n, plane.a, plane.b, pb, b,
                    ));
                    let (n1, ea, eb_one) = corrected_edge_normal(p1, b.x, ea, eb_one, false);
                    contacts.push(Contact::edge_edge(
                        p1, n1, plane.a, plane.b, pb, ea, eb_one, b,
                    ));
                }
                // both endpoints outside, the edge crosses the face twice
                (false, false, &[(p1, eb_one), (p2, eb_two)]) => {
                    let (n1, ea_1, eb_one) = corrected_edge_normal(p1, b.x, ea, eb_one, false);
                    contacts.push(Contact::edge_edge(
                        p1, n1, plane.a, plane.b, pb, ea_1, eb_one, b,
                    ));
                    let (n2, ea_2, eb_two) = corrected_edge_normal(p2, b.x, ea, eb_two, false);
                    contacts.push(Contact::edge_edge(
                        p2, n2, plane.a, plane.b, pb, ea_2, eb_two, b,
                    ));
                }
                // edge passes by the face entirely
                (false, false, []) => {}
                _ => panic!(
                    "bodies {}/{}: inconsistent edge-face clip ({} crossings)",
                    plane.a,
                    plane.b,
                    hits.len()
                ),
            }
        }
    }

    contacts
}

/// Contacts for a face of `a` lying in the plane. With `check_distance` the
/// perimeter walks skip face vertices out of tolerance of the plane, which
/// handles the partially-touching face.
fn contacts_face(
    plane: &SeparatingPlane,
    bodies: &[RigidBody],
    fai: usize,
    check_distance: bool,
) -> Vec<Contact> {
    let a = &bodies[plane.a];
    let b = &bodies[plane.b];
    let face_a = &a.topology().faces[fai];
    let mut contacts = vec![];

    match plane.kind {
        PlaneKind::Edge { eai, ebi, .. } => {
            // TODO could test whether more than just the edge of b lies in
            // the plane; if a face of b were involved, a plane spanned by
            // that face would most likely have been found instead

            // the edge of a spanning the plane must bound the matched face
            let edge = a.topology().edges[eai];
            let contained = face_a
                .iter()
                .filter(|&&(vi, _)| vi == edge.0 || vi == edge.1)
                .count();
            if contained != 2 {
                panic!(
                    "bodies {}/{}: edge {eai} of the separating plane does not bound face {fai}",
                    plane.a, plane.b
                );
            }

            // face of a against edge of b
            let (b1, b2) = b.topology().edges[ebi];
            let eb1 = b.world_vertex(b1);
            let eb2 = b.world_vertex(b2);
            let eb = (eb1 - eb2).normalize();

            let eb1_inside = inside(a, fai, eb1);
            let eb2_inside = inside(a, fai, eb2);

            // walk the face perimeter of a, starting from its last in-plane
            // vertex when the face only partially touches
            let mut ea1 = if check_distance {
                face_a
                    .iter()
                    .rev()
                    .map(|&(vi, _)| a.world_vertex(vi))
                    .find(|&v| plane.dist(v).abs() <= DISTANCE_THRESHOLD)
                    .unwrap_or(DVec3::ZERO)
            } else {
                a.world_vertex(face_a.last().unwrap().0)
            };

            // crossing point and unitized direction of the crossed face edge
            let mut hits: Vec<(DVec3, DVec3)> = vec![];
            for &(vi, _) in face_a {
                let ea2 = a.world_vertex(vi);
                // out-of-tolerance vertices do not advance the walk
                if check_distance && plane.dist(ea2).abs() > DISTANCE_THRESHOLD {
                    continue;
                }
                if let Some(p) = segment_intersection(ea1, ea2, a.non_unit_normal(fai), eb1, eb2) {
                    if hits.len() == 2 {
                        panic!(
                            "bodies {}/{}: an edge crossed a convex face more than twice",
                            plane.a, plane.b
                        );
                    }
                    hits.push((p, (ea2 - ea1).normalize()));
                }
                ea1 = ea2;
            }
            let pb = ea1;

            match (eb1_inside, eb2_inside, hits.as_slice()) {
                // edge of b fully contained by the face of a; the contact
                // points belong to b, so the roles swap
                (true, true, []) => {
                    contacts.push(Contact::vertex_face(eb1, -plane.n, plane.b, plane.a, pb, a));
                    contacts.push(Contact::vertex_face(eb2, -plane.n, plane.b, plane.a, pb, a));
                }
                // one endpoint inside, one crossing
                (true, false, &[(p1, ea_one)]) | (false, true, &[(p1, ea_one)]) => {
                    let endpoint = if eb1_inside { eb1 } else { eb2 };
                    contacts.push(Contact::vertex_face(
                        endpoint, -plane.n, plane.b, plane.a, pb, a,
                    ));
                    let (n1, ea_one, eb) = corrected_edge_normal(p1, b.x, ea_one, eb, true);
                    contacts.push(Contact::edge_edge(
                        p1, n1, plane.a, plane.b, pb, ea_one, eb, b,
                    ));
                }
                // both endpoints outside, the edge crosses the face twice
                (false, false, &[(p1, ea_one), (p2, ea_two)]) => {
                    let (n1, ea_one, eb_1) = corrected_edge_normal(p1, b.x, ea_one, eb, true);
                    contacts.push(Contact::edge_edge(
                        p1, n1, plane.a, plane.b, pb, ea_one, eb_1, b,
                    ));
                    let (n2, ea_two, eb_2) = corrected_edge_normal(p2, b.x, ea_two, eb, true);
                    contacts.push(Contact::edge_edge(
                        p2, n2, plane.a, plane.b, pb, ea_two, eb_2, b,
                    ));
                }
                // edge passes by the face entirely
                (false, false, []) => {}
                _ => panic!(
                    "bodies {}/{}: inconsistent edge-face clip ({} crossings)",
                    plane.a,
                    plane.b,
                    hits.len()
                ),
            }
        }
        PlaneKind::Face { fbi } => {
            // face-face: walk the perimeter of a's face, deciding per
            // endpoint (and per border crossing) whether to add a contact, so
            // no duplicates are produced
            let face_b = &b.topology().faces[fbi];
            let pb = b.world_vertex(face_b.last().unwrap().0);

            // start from the last in-plane vertex when the face only
            // partially touches (at least three are available, fewer would
            // have classified as an edge)
            let mut prev_va = if check_distance {
                face_a
                    .iter()
                    .rev()
                    .map(|&(vi, _)| vi)
                    .find(|&vi| plane.dist(a.world_vertex(vi)).abs() <= DISTANCE_THRESHOLD)
                    .expect("partially touching face with no vertex in the plane")
            } else {
                face_a.last().unwrap().0
            };
            let mut prev_inside = inside(b, fbi, a.world_vertex(prev_va));

            for &(this_va, _) in face_a {
                let this_inside = inside(b, fbi, a.world_vertex(this_va));

                let ea1 = a.world_vertex(prev_va);
                let ea2 = a.world_vertex(this_va);

                // out-of-tolerance vertices do not advance the walk
                if check_distance && plane.dist(ea2).abs() > DISTANCE_THRESHOLD {
                    continue;
                }

                // clip the walked edge against the face border of b; each hit
                // carries the crossing point, the corrected outward normal
                // and the re-signed edge directions
                let mut hits: Vec<(DVec3, DVec3, DVec3, DVec3)> = vec![];
                let mut eb1 = pb;
                for &(vi, _) in face_b {
                    let eb2 = b.world_vertex(vi);
                    // NB: the order of eb1 and eb2 matters
                    if let Some(p) =
                        segment_intersection(eb1, eb2, b.non_unit_normal(fbi), ea1, ea2)
                    {
                        if hits.len() == 2 {
                            panic!(
                                "bodies {}/{}: an edge crossed a convex face more than twice",
                                plane.a, plane.b
                            );
                        }
                        let ea_dir = (ea1 - ea2).normalize();
                        let eb_dir = (eb1 - eb2).normalize();
                        let (n, ea_dir, eb_dir) =
                            corrected_edge_normal(p, b.x, ea_dir, eb_dir, true);
                        hits.push((p, n, ea_dir, eb_dir));
                    }
                    eb1 = eb2;
                }

                match (prev_inside, this_inside) {
                    (false, false) => {
                        // no endpoint to add; add the two crossings if the
                        // edge cuts across the face of b
                        // TODO edges can be collinear, which can make the
                        // crossing count come out odd; currently unchecked
                        if !hits.is_empty() {
                            assert!(
                                hits.len() == 2,
                                "bodies {}/{}: single crossing with both endpoints outside",
                                plane.a,
                                plane.b
                            );
                        }
                        for &(p, n, ea_dir, eb_dir) in &hits {
                            contacts.push(Contact::edge_edge(
                                p, n, plane.a, plane.b, pb, ea_dir, eb_dir, b,
                            ));
                        }
                    }
                    (false, true) => {
                        // add the crossing, then the entering endpoint
                        // TODO collinear edges: crossing count unchecked
                        let &(p, n, ea_dir, eb_dir) = hits.first().unwrap_or_else(|| {
                            panic!(
                                "bodies {}/{}: walk entered the clip face without a crossing",
                                plane.a, plane.b
                            )
                        });
                        contacts.push(Contact::edge_edge(
                            p, n, plane.a, plane.b, pb, ea_dir, eb_dir, b,
                        ));
                        contacts.push(Contact::vertex_face(
                            a.world_vertex(this_va),
                            plane.n,
                            plane.a,
                            plane.b,
                            pb,
                            b,
                        ));
                    }
                    (true, false) => {
                        // only add the crossing
                        assert!(
                            hits.len() == 1,
                            "bodies {}/{}: walk left the clip face without a crossing",
                            plane.a,
                            plane.b
                        );
                        let (p, n, ea_dir, eb_dir) = hits[0];
                        contacts.push(Contact::edge_edge(
                            p, n, plane.a, plane.b, pb, ea_dir, eb_dir, b,
                        ));
                    }
                    (true, true) => {
                        // only add the current endpoint
                        // TODO collinear edges: crossing count unchecked
                        contacts.push(Contact::vertex_face(
                            a.world_vertex(this_va),
                            plane.n,
                            plane.a,
                            plane.b,
                            pb,
                            b,
                        ));
                    }
                }

                prev_inside = this_inside;
                prev_va = this_va;
            }

            // now the same from b's point of view, adding only endpoints (the
            // crossings were all emitted above)
            let fan = a.non_unit_normal(fai).normalize();
            let fbn = b.non_unit_normal(fbi).normalize();
            let pa = a.world_vertex(face_a[0].0);
            for &(this_vb, _) in face_b {
                let this_inside = if check_distance {
                    inside_checked(a, fai, b.world_vertex(this_vb), fbn)
                } else {
                    inside(a, fai, b.world_vertex(this_vb))
                };
                if this_inside {
                    contacts.push(Contact::vertex_face(
                        b.world_vertex(this_vb),
                        fan,
                        plane.b,
                        plane.a,
                        pa,
                        a,
                    ));
                }
            }
        }
    }

    contacts
}
