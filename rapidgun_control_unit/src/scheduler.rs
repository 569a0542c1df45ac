//! Nearest available effector search.
//!
//! Levels are visited by distance from the current level (ties to the lower
//! index), quadrants by offset from the current rotor quadrant: straight on,
//! then the two perpendicular quadrants, then the opposite one. The first
//! available effector wins.

use heapless::Vec as HVec;
use rapidgun_common::consts::{MAX_LEVELS, QUADRANT_COUNT};
use rapidgun_common::geometry::Quadrant;
use rapidgun_common::hal::types::{BarrelStatus, EffectorId};

use crate::grid::Grid;

/// Quarter-turn offsets in search order. `1` and `3` share a priority.
pub const QUADRANT_PRIORITY: [usize; QUADRANT_COUNT] = [0, 1, 3, 2];

/// Where to go next.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Target {
    pub level: usize,
    pub quadrant: Quadrant,
    pub effector: EffectorId,
}

/// Quadrants in search order relative to `current`.
#[inline]
pub fn quadrant_order(current: Quadrant) -> [Quadrant; QUADRANT_COUNT] {
    QUADRANT_PRIORITY.map(|offset| current.offset(offset))
}

/// Level indices `0..count` by distance from `current`, ties to the lower index.
pub fn level_order(current: usize, count: usize) -> HVec<usize, MAX_LEVELS> {
    let mut order = HVec::new();
    for level in 0..count.min(MAX_LEVELS) {
        if order.push(level).is_err() {
            break;
        }
    }
    order.sort_unstable_by_key(|&level: &usize| (level.abs_diff(current), level));
    order
}

/// First available effector in priority order, or `None` when every
/// effector is busy or broken.
pub fn find_target(
    grid: &Grid,
    status: &BarrelStatus,
    current_level: usize,
    current_quadrant: Quadrant,
) -> Option<Target> {
    let quadrants = quadrant_order(current_quadrant);
    level_order(current_level, grid.len())
        .into_iter()
        .filter_map(|level| grid.level(level).map(|l| (level, l)))
        .find_map(|(level, l)| {
            quadrants.iter().find_map(|&quadrant| {
                let effector = l.effector(quadrant);
                status
                    .effector(effector)
                    .is_available()
                    .then_some(Target {
                        level,
                        quadrant,
                        effector,
                    })
            })
        })
}
