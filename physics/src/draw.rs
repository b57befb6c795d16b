//! Read-only views over the engine state for render collaborators.
//!
//! Renderers observe the simulation only between steps, through these value
//! snapshots; nothing here can mutate the body system.
use glam::{DMat3, DVec3};

use crate::contact::ContactKind;
use crate::shape::ShapeKind;
use crate::Engine;

/// Pose and template of one body, enough to instance its mesh.
#[derive(Clone, Copy, Debug)]
pub struct BodyView {
    pub position: DVec3,
    pub orientation: DMat3,
    pub scale: DMat3,
    pub kind: ShapeKind,
    pub inv_mass: f64,
}

impl BodyView {
    pub fn world_vertex(&self, vertex_i: usize) -> DVec3 {
        self.orientation * (self.scale * self.kind.topology().vertices[vertex_i]) + self.position
    }

    /// World-space endpoints of every edge, for wireframe rendering.
    pub fn world_edges(&self) -> impl Iterator<Item = (DVec3, DVec3)> + '_ {
        self.kind
            .topology()
            .edges
            .iter()
            .map(|&(v1, v2)| (self.world_vertex(v1), self.world_vertex(v2)))
    }
}

/// One contact of the previous step.
#[derive(Clone, Copy, Debug)]
pub struct ContactView {
    pub p: DVec3,
    pub n: DVec3,
    pub vertex_face: bool,
    /// Edge direction on the first body, for edge-edge contacts.
    pub ea: Option<DVec3>,
    /// Edge direction on the second body, for edge-edge contacts.
    pub eb: Option<DVec3>,
}

impl Engine {
    pub fn body_views(&self) -> impl Iterator<Item = BodyView> + '_ {
        self.body_system.bodies.iter().map(|body| BodyView {
            position: body.x,
            orientation: body.a,
            scale: body.shape.scale,
            kind: body.shape.kind,
            inv_mass: body.shape.inv_mass,
        })
    }

    pub fn contact_views(&self) -> impl Iterator<Item = ContactView> + '_ {
        self.prev_contacts.iter().map(|contact| {
            let (ea, eb) = match contact.kind {
                ContactKind::VertexFace => (None, None),
                ContactKind::EdgeEdge { ea, eb } => (Some(ea), Some(eb)),
            };
            ContactView {
                p: contact.p,
                n: contact.n,
                vertex_face: contact.is_vertex_face(),
                ea,
                eb,
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use glam::dvec3;

    use super::*;
    use crate::body::{BodySystem, RigidBody, ShapeWithMass};

    #[test]
    fn body_views_mirror_the_system() {
        let mut engine = Engine::default();
        engine.body_system = BodySystem {
            bodies: vec![RigidBody::new(
                dvec3(1., 2., 3.),
                ShapeWithMass::icosahedron(0.5, 1., 1., 1.),
            )],
            forces: vec![],
        };

        let views: Vec<BodyView> = engine.body_views().collect();
        assert_eq!(views.len(), 1);
        assert_eq!(views[0].position, dvec3(1., 2., 3.));
        assert_eq!(views[0].kind, ShapeKind::Icosahedron);
        assert_eq!(views[0].inv_mass, 0.5);
        assert_eq!(views[0].world_edges().count(), 30);
    }
}
