//! End-to-end simulation runs: dropped, stacked, and thrown bodies must end
//! up where the contact model says they should.
use glam::dvec3;
use physics::force::{ForceEnum, Gravity};
use physics::scenarios::{ParallelDrop, RandomDrop, Scene, SidewaysCollision, Throw};
use physics::{BodySystem, Engine, RigidBody, ShapeWithMass, COLLISION_THRESHOLD};

fn run(engine: &mut Engine, steps: u32) {
    for _ in 0..steps {
        engine.update().unwrap();
    }
}

/// Floor of the drop scenes: an immovable 16 x 0.4 x 10 box whose top face
/// is the plane y = 0.
fn floor() -> RigidBody {
    RigidBody::new(dvec3(0., -0.2, 0.), ShapeWithMass::cuboid(0., 16., 0.4, 10.))
}

#[derive(Clone, Debug)]
struct DropScene {
    bodies: Vec<RigidBody>,
}

impl Scene for DropScene {
    fn name(&self) -> &str {
        "Drop"
    }

    fn create(&self) -> BodySystem {
        BodySystem {
            bodies: self.bodies.clone(),
            forces: vec![ForceEnum::Gravity(Gravity::default())],
        }
    }
}

#[test]
fn dropped_cube_settles_on_the_floor() {
    let cube = ShapeWithMass::cuboid(1. / 3., 1., 1., 1.);
    let mut engine = Engine::new(Box::new(DropScene {
        bodies: vec![floor(), RigidBody::new(dvec3(0., 1.5, 0.), cube)],
    }));
    engine.init();
    engine.run = true;

    run(&mut engine, 120);

    let body = &engine.body_system.bodies[1];
    assert!(
        (0.48..=0.52).contains(&body.x.y),
        "cube rests at y = {}",
        body.x.y
    );
    assert!(body.v.length() <= 0.05, "cube still moves at {}", body.v);
}

#[test]
fn stacked_drop_lands_on_the_resting_cube() {
    let cube = ShapeWithMass::cuboid(1. / 3., 1., 1., 1.);
    let mut engine = Engine::new(Box::new(DropScene {
        bodies: vec![
            floor(),
            RigidBody::new(dvec3(0., 0.5, 0.), cube),
            RigidBody::new(dvec3(0., 5.5, 0.), cube),
        ],
    }));
    engine.init();
    engine.run = true;

    run(&mut engine, 180);

    let lower = &engine.body_system.bodies[1];
    assert!((lower.x - dvec3(0., 0.5, 0.)).length() <= 0.05);

    let upper = &engine.body_system.bodies[2];
    assert!(
        (1.48..=1.56).contains(&upper.x.y),
        "upper cube rests at y = {}",
        upper.x.y
    );
}

#[test]
fn rotated_impact_is_edge_edge() {
    let mut engine = Engine::new(Box::new(SidewaysCollision::default()));
    engine.init();
    engine.run = true;

    let mut impact = false;
    for _ in 0..60 {
        engine.update().unwrap();
        if !engine.prev_contacts.is_empty() {
            impact = true;
            // perpendicular edges meet in a single point contact
            for contact in &engine.prev_contacts {
                assert!(!contact.is_vertex_face());
            }
            break;
        }
    }
    assert!(impact, "no contact within 60 steps");

    // the impulse acts through the center: the falling body bounces straight
    assert!(engine.body_system.bodies[1].v.y >= 0.);
}

#[test]
fn thrown_cube_bounces_then_rests() {
    let mut engine = Engine::new(Box::new(Throw::default()));
    engine.init();
    engine.run = true;

    let mut had_contact = false;
    let mut bounced = false;
    let mut resting_streak = 0;
    let mut rested = false;

    for _ in 0..600 {
        engine.update().unwrap();
        let body = &engine.body_system.bodies[1];

        had_contact |= !engine.prev_contacts.is_empty();
        if had_contact && body.v.y > 0.1 {
            bounced = true;
        }

        if (0.4..=0.7).contains(&body.x.y) && body.v.y.abs() <= 0.05 {
            resting_streak += 1;
            rested |= resting_streak >= 30;
        } else {
            resting_streak = 0;
        }

        if bounced && rested {
            break;
        }
    }

    assert!(bounced, "the cube never bounced");
    assert!(rested, "the cube never settled onto the floor");
}

#[test]
fn resting_contact_forces_cancel_gravity_exactly() {
    let cube = ShapeWithMass::cuboid(1., 1., 1., 1.);
    let mut engine = Engine::new(Box::new(DropScene {
        bodies: vec![floor(), RigidBody::new(dvec3(0., 0.5, 0.), cube)],
    }));
    engine.init();
    engine.run = true;

    engine.update().unwrap();

    let body = &engine.body_system.bodies[1];
    assert!(
        body.p.y.abs() < 1e-6,
        "supported cube changed momentum by {}",
        body.p.y
    );
    assert_eq!(engine.prev_contacts.len(), 4);
    for contact in &engine.prev_contacts {
        assert!(contact.relative_normal_velocity(&engine.body_system.bodies).abs() <= COLLISION_THRESHOLD);
    }
}

#[test]
fn equal_seeds_give_identical_trajectories() {
    let mut first = Engine::new(Box::new(RandomDrop { seed: 42 }));
    let mut second = Engine::new(Box::new(RandomDrop { seed: 42 }));
    first.init();
    second.init();
    first.run = true;
    second.run = true;

    run(&mut first, 100);
    run(&mut second, 100);

    assert_eq!(first.body_system.bodies, second.body_system.bodies);
}

#[test]
fn parallel_drop_does_not_drift_sideways() {
    let mut engine = Engine::new(Box::new(ParallelDrop::default()));
    engine.init();
    engine.run = true;

    run(&mut engine, 180);

    let upper = &engine.body_system.bodies[1];
    assert!(upper.x.x.abs() < 1e-6);
    assert!(upper.x.z.abs() < 1e-6);
}
