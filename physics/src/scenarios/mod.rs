use core::fmt;

use crate::body::BodySystem;

pub mod angled_parallel;
pub mod contact_grid;
pub mod parallel;
pub mod random_drop;
pub mod resting_grid;
pub mod sideways;
pub mod single_die;
pub mod stack;
pub mod static_pair;
pub mod throw;

pub use angled_parallel::*;
pub use contact_grid::*;
pub use parallel::*;
pub use random_drop::*;
pub use resting_grid::*;
pub use sideways::*;
pub use single_die::*;
pub use stack::*;
pub use static_pair::*;
pub use throw::*;

/// A scene builds a fresh population of bodies and force generators.
pub trait Scene: fmt::Debug {
    fn name(&self) -> &str;

    /// NB: the initial state has to be collision-free.
    fn create(&self) -> BodySystem;
}

/// Every built-in scene, for pickers and drivers.
pub fn catalog() -> Vec<Box<dyn Scene>> {
    vec![
        Box::new(SingleDie::default()),
        Box::new(RandomDrop::default()),
        Box::new(Throw::default()),
        Box::new(SidewaysCollision::default()),
        Box::new(ParallelDrop::default()),
        Box::new(AngledParallelDrop::default()),
        Box::new(RestingGrid::default()),
        Box::new(Stack::default()),
        Box::new(ContactGrid::default()),
        Box::new(StaticPair::default()),
    ]
}

#[cfg(test)]
mod tests {
    use itertools::Itertools;

    use super::*;
    use crate::collision::intersect;

    #[test]
    fn catalog_names_are_unique() {
        let names: Vec<String> = catalog().iter().map(|s| s.name().to_owned()).collect();
        assert_eq!(names.iter().unique().count(), names.len());
    }

    #[test]
    fn every_scene_starts_collision_free() {
        for scene in catalog() {
            let bs = scene.create();
            assert!(!bs.bodies.is_empty(), "{} is empty", scene.name());
            for (i, j) in (0..bs.bodies.len()).tuple_combinations() {
                assert!(
                    !intersect(&bs.bodies[i], &bs.bodies[j], i, j, 0.).is_intersecting(),
                    "{}: bodies {i}/{j} start overlapping",
                    scene.name()
                );
            }
        }
    }
}
