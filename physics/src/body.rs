//! Rigid-body state and the systems that own it.
use glam::{DMat3, DVec3};

use crate::force::ForceEnum;
use crate::shape::{ShapeKind, Topology};

/// Constant quantities of a body: template, per-instance scale and mass
/// distribution. Inverse mass of zero denotes an immovable body; its inverse
/// inertia tensor is the zero tensor.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ShapeWithMass {
    pub kind: ShapeKind,
    /// Diagonal scale applied to the template's model-space vertices.
    pub scale: DMat3,
    pub inv_mass: f64,
    /// Inverse inertia tensor in the body frame.
    pub inv_inertia: DMat3,
}

impl ShapeWithMass {
    /// A box of extent `size_x` x `size_y` x `size_z`.
    pub fn cuboid(inv_mass: f64, size_x: f64, size_y: f64, size_z: f64) -> ShapeWithMass {
        // NB: this will be the zero tensor if inv_mass is 0, as intended
        let inv_inertia = DMat3::from_diagonal(DVec3::new(
            (12. * inv_mass) / (size_y * size_y + size_z * size_z),
            (12. * inv_mass) / (size_x * size_x + size_z * size_z),
            (12. * inv_mass) / (size_x * size_x + size_y * size_y),
        ));
        ShapeWithMass {
            kind: ShapeKind::Cube,
            scale: DMat3::from_diagonal(DVec3::new(size_x, size_y, size_z)),
            inv_mass,
            inv_inertia,
        }
    }

    /// An icosahedron fitting a box of extent `size_x` x `size_y` x `size_z`.
    pub fn icosahedron(inv_mass: f64, size_x: f64, size_y: f64, size_z: f64) -> ShapeWithMass {
        let phi = (1. + 5.0_f64.sqrt()) / 2.;
        // NB: this will be the zero tensor if inv_mass is 0, as intended
        let inv_inertia = DMat3::from_diagonal(DVec3::new(
            (10. * inv_mass) / (size_x * size_x * phi),
            (10. * inv_mass) / (size_y * size_y * phi),
            (10. * inv_mass) / (size_z * size_z * phi),
        ));
        ShapeWithMass {
            kind: ShapeKind::Icosahedron,
            scale: DMat3::from_diagonal(DVec3::new(size_x, size_y, size_z)),
            inv_mass,
            inv_inertia,
        }
    }

    pub fn topology(&self) -> &'static Topology {
        self.kind.topology()
    }
}

/// Mutable state of one body.
///
/// `v`, `i_inv` and `omega` are auxiliaries derived from `(p, l, a)`; every
/// mutation of the primary state must re-derive them through
/// [`RigidBody::refresh_auxiliary`].
#[derive(Clone, Debug, PartialEq)]
pub struct RigidBody {
    pub shape: ShapeWithMass,

    /// Position.
    pub x: DVec3,
    /// Linear momentum.
    pub p: DVec3,
    /// Orientation, kept orthonormal.
    pub a: DMat3,
    /// Angular momentum.
    pub l: DVec3,

    /// Linear velocity, `p * inv_mass`.
    pub v: DVec3,
    /// World-space inverse inertia tensor, `a * inv_inertia * a^T`.
    pub i_inv: DMat3,
    /// Angular velocity, `i_inv * l`.
    pub omega: DVec3,

    /// Force accumulator, cleared before each force stage.
    pub force: DVec3,
    /// Torque accumulator, cleared before each force stage.
    pub torque: DVec3,
}

impl RigidBody {
    pub fn new(x: DVec3, shape: ShapeWithMass) -> RigidBody {
        let mut body = RigidBody {
            shape,
            x,
            p: DVec3::ZERO,
            a: DMat3::IDENTITY,
            l: DVec3::ZERO,
            v: DVec3::ZERO,
            i_inv: DMat3::ZERO,
            omega: DVec3::ZERO,
            force: DVec3::ZERO,
            torque: DVec3::ZERO,
        };
        body.refresh_auxiliary();
        body
    }

    pub fn oriented(mut self, a: DMat3) -> RigidBody {
        self.a = a;
        self.refresh_auxiliary();
        self
    }

    pub fn with_momentum(mut self, p: DVec3) -> RigidBody {
        self.p = p;
        self.refresh_auxiliary();
        self
    }

    pub fn with_angular_momentum(mut self, l: DVec3) -> RigidBody {
        self.l = l;
        self.refresh_auxiliary();
        self
    }

    /// Re-derives `v`, `i_inv` and `omega` from the primary state.
    pub fn refresh_auxiliary(&mut self) {
        self.v = self.p * self.shape.inv_mass;
        self.i_inv = self.a * self.shape.inv_inertia * self.a.transpose();
        self.omega = self.i_inv * self.l;
    }

    pub fn topology(&self) -> &'static Topology {
        self.shape.topology()
    }

    /// Outward non-unit normal of face `face_i`, rotated into world space.
    pub fn non_unit_normal(&self, face_i: usize) -> DVec3 {
        self.a * self.topology().non_unit_normal(face_i)
    }

    pub fn to_world(&self, point: DVec3) -> DVec3 {
        self.a * (self.shape.scale * point) + self.x
    }

    pub fn world_vertex(&self, vertex_i: usize) -> DVec3 {
        self.to_world(self.topology().vertices[vertex_i])
    }

    /// World-space vertex translated `offset` units along `dir`.
    pub fn world_vertex_offset(&self, vertex_i: usize, offset: f64, dir: DVec3) -> DVec3 {
        self.world_vertex(vertex_i) + offset * dir.normalize()
    }

    pub fn clear_force_and_torque(&mut self) {
        self.force = DVec3::ZERO;
        self.torque = DVec3::ZERO;
    }

    /// Velocity of a world-space point rigidly attached to this body.
    pub fn point_velocity(&self, point: DVec3) -> DVec3 {
        self.v + self.omega.cross(point - self.x)
    }

    /// Acceleration of a world-space point rigidly attached to this body,
    /// under the currently accumulated force and torque.
    pub fn point_acceleration(&self, point: DVec3) -> DVec3 {
        let r = point - self.x;
        let l_dot = self.torque;
        let omega_dot = self.i_inv * (self.l.cross(self.omega) + l_dot);
        let v_dot = self.force * self.shape.inv_mass;

        omega_dot.cross(r) + self.omega.cross(self.omega.cross(r)) + v_dot
    }
}

/// The population of one scene: value-owned bodies plus the force generators
/// acting on them. Reset destroys and rebuilds the whole system.
#[derive(Clone, Debug, Default)]
pub struct BodySystem {
    pub bodies: Vec<RigidBody>,
    pub forces: Vec<ForceEnum>,
}
