//! Force generators that stamp the per-step force and torque accumulators.
use core::fmt;

use dyn_clone::DynClone;
use glam::{dvec3, DVec3};

use crate::body::RigidBody;

#[derive(Clone, Debug)]
pub enum ForceEnum {
    Gravity(Gravity),
    Drag(Drag),
    Custom(Box<dyn Force>),
}

impl Force for ForceEnum {
    fn apply(&self, bodies: &mut [RigidBody]) {
        match self {
            ForceEnum::Gravity(f) => f.apply(bodies),
            ForceEnum::Drag(f) => f.apply(bodies),
            ForceEnum::Custom(f) => f.apply(bodies),
        }
    }
}

/// A generator accumulates into the `force` and `torque` fields of the bodies
/// it acts on. Accumulators are cleared by the step controller before the
/// force stage, never by the generators themselves.
pub trait Force: fmt::Debug + DynClone {
    fn apply(&self, bodies: &mut [RigidBody]);
}

dyn_clone::clone_trait_object!(Force);

/// Constant downward acceleration on the center of mass.
#[derive(Clone, Debug, Default)]
pub struct Gravity {}

impl Gravity {
    pub const G: DVec3 = dvec3(0., -9.81, 0.);

    fn force_on(&self, body: &RigidBody) -> DVec3 {
        // no gravity is applied if mass is infinite
        if body.shape.inv_mass == 0. {
            return DVec3::ZERO;
        }

        Self::G / body.shape.inv_mass
    }
}

impl Force for Gravity {
    fn apply(&self, bodies: &mut [RigidBody]) {
        for body in bodies {
            // NB: no torque, gravity acts on the center of mass
            body.force += self.force_on(body);
        }
    }
}

/// Linear and angular drag, proportional to the momenta.
#[derive(Clone, Debug)]
pub struct Drag {
    pub linear: f64,
    pub angular: f64,
}

impl Default for Drag {
    fn default() -> Self {
        Drag {
            linear: 0.6,
            angular: 0.6,
        }
    }
}

impl Force for Drag {
    fn apply(&self, bodies: &mut [RigidBody]) {
        for body in bodies {
            body.force -= self.linear * body.p;
            body.torque -= self.angular * body.l;
        }
    }
}
