//! Simulated barrel layout.
//!
//! The rotor axis is +Z and the base fires along +X. Effectors sit on the
//! four orthogonal neighbours of the axis at each step and point outward,
//! turning with the rotor.

use rapidgun_common::consts::QUADRANT_COUNT;
use rapidgun_common::geometry::Direction;
use rapidgun_common::hal::types::{EffectorId, EffectorInfo};

use super::config::SimulationConfig;

/// Rotor axis of the simulated barrel.
pub const ROTOR_AXIS: Direction = Direction::UNIT_Z;

/// Fixed firing direction of the simulated base.
pub const FIRE_DIRECTION: Direction = Direction::UNIT_X;

/// Neighbour position around the rotor axis, at rotor angle zero.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Neighbour {
    /// Along the firing direction.
    Forward,
    /// A quarter turn clockwise seen from above.
    Right,
    /// Opposite the firing direction.
    Backward,
    /// A quarter turn counter-clockwise seen from above.
    Left,
}

impl Neighbour {
    /// Scan order within one step.
    pub const ALL: [Self; QUADRANT_COUNT] = [Self::Forward, Self::Right, Self::Backward, Self::Left];

    /// Outward direction at rotor angle zero.
    pub const fn base_direction(self) -> Direction {
        match self {
            Self::Forward => Direction::new(1.0, 0.0, 0.0),
            Self::Right => Direction::new(0.0, -1.0, 0.0),
            Self::Backward => Direction::new(-1.0, 0.0, 0.0),
            Self::Left => Direction::new(0.0, 1.0, 0.0),
        }
    }

    /// Outward direction once the rotor has turned to `rotor_angle`.
    pub fn direction_at(self, rotor_angle: f64) -> Direction {
        self.base_direction().rotated(&ROTOR_AXIS, rotor_angle)
    }
}

/// Effector placement per scan step.
#[derive(Debug, Clone)]
pub struct BarrelTopology {
    /// Index 0 is scan step 1, next to the rotor.
    steps: Vec<[Option<EffectorId>; QUADRANT_COUNT]>,
    effector_count: usize,
}

impl BarrelTopology {
    /// Lay out `levels` complete steps, plus a three-effector step when
    /// `incomplete_level` is set. Ids are assigned in scan order.
    pub fn from_config(config: &SimulationConfig) -> Self {
        let mut steps = Vec::with_capacity(config.levels + 1);
        let mut next_id: u16 = 0;
        let mut take_id = || {
            let id = EffectorId(next_id);
            next_id += 1;
            id
        };

        for _ in 0..config.levels {
            steps.push(std::array::from_fn(|_| Some(take_id())));
        }
        if config.incomplete_level {
            steps.push(std::array::from_fn(|k| {
                (Neighbour::ALL[k] != Neighbour::Left).then(&mut take_id)
            }));
        }

        let effector_count = steps.iter().flatten().flatten().count();
        Self {
            steps,
            effector_count,
        }
    }

    /// Total number of simulated effectors.
    pub fn effector_count(&self) -> usize {
        self.effector_count
    }

    /// Effector ids at scan `step` (1-based), in [`Neighbour::ALL`] order.
    pub fn step(&self, step: usize) -> [Option<EffectorId>; QUADRANT_COUNT] {
        step.checked_sub(1)
            .and_then(|idx| self.steps.get(idx))
            .copied()
            .unwrap_or([None; QUADRANT_COUNT])
    }

    /// Placement of every effector as `(id, neighbour)`.
    pub fn placements(&self) -> impl Iterator<Item = (EffectorId, Neighbour)> + '_ {
        self.steps.iter().flat_map(|slots| {
            slots
                .iter()
                .zip(Neighbour::ALL)
                .filter_map(|(id, neighbour)| id.map(|id| (id, neighbour)))
        })
    }

    /// Discovery view of scan `step` with the rotor at `rotor_angle`.
    pub fn scan(&self, step: usize, rotor_angle: f64) -> [Option<EffectorInfo>; QUADRANT_COUNT] {
        let ids = self.step(step);
        std::array::from_fn(|k| {
            ids[k].map(|id| EffectorInfo {
                id,
                forward: Neighbour::ALL[k].direction_at(rotor_angle),
            })
        })
    }
}
