//! Effector grid model and topology discovery.
//!
//! A [`Grid`] is an ordered stack of [`Level`]s along the linear axis. Each
//! level holds exactly one effector per calibrated [`Quadrant`]. The grid is
//! built once by [`discover`] and never resized.

use heapless::Vec as HVec;
use rapidgun_common::consts::{MAX_EFFECTORS, MAX_LEVELS, PERPENDICULAR_TOLERANCE, QUADRANT_COUNT};
use rapidgun_common::control_unit::error::ConfigurationError;
use rapidgun_common::geometry::{
    Direction, Quadrant, direction_angle, planar_angle, reduce_to_full_turn,
};
use rapidgun_common::hal::driver::BarrelDriver;
use rapidgun_common::hal::types::{
    Capability, EffectorId, EffectorInfo, LinearActuatorInfo, RotaryActuatorInfo,
};
use std::f64::consts::FRAC_PI_2;
use tracing::{debug, info, warn};

/// One effector as placed in the grid.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EffectorSlot {
    pub id: EffectorId,
    /// Forward direction at discovery.
    pub forward: Direction,
}

/// A complete grid cross-section: one effector per quadrant.
#[derive(Debug, Clone, PartialEq)]
pub struct Level {
    slots: [EffectorSlot; QUADRANT_COUNT],
}

impl Level {
    /// Slots indexed by [`Quadrant::index`].
    pub const fn new(slots: [EffectorSlot; QUADRANT_COUNT]) -> Self {
        Self { slots }
    }

    #[inline]
    pub fn slot(&self, quadrant: Quadrant) -> &EffectorSlot {
        &self.slots[quadrant.index()]
    }

    #[inline]
    pub fn effector(&self, quadrant: Quadrant) -> EffectorId {
        self.slot(quadrant).id
    }

    pub fn slots(&self) -> impl Iterator<Item = (Quadrant, &EffectorSlot)> {
        Quadrant::ALL.into_iter().zip(self.slots.iter())
    }
}

/// Static stack of levels in linear-travel order.
#[derive(Debug, Clone)]
pub struct Grid {
    levels: HVec<Level, MAX_LEVELS>,
    level_pitch: f64,
}

impl Grid {
    /// Grid from levels already in travel order. Levels past
    /// [`MAX_LEVELS`] are dropped.
    pub fn from_levels(levels: impl IntoIterator<Item = Level>, level_pitch: f64) -> Self {
        let mut stored = HVec::new();
        for level in levels {
            if stored.push(level).is_err() {
                break;
            }
        }
        Self {
            levels: stored,
            level_pitch,
        }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.levels.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.levels.is_empty()
    }

    #[inline]
    pub fn level(&self, index: usize) -> Option<&Level> {
        self.levels.get(index)
    }

    /// Effector at (`level`, `quadrant`), if the level exists.
    #[inline]
    pub fn effector(&self, level: usize, quadrant: Quadrant) -> Option<EffectorId> {
        self.level(level).map(|l| l.effector(quadrant))
    }

    /// Linear actuator offset of `level` [m].
    #[inline]
    pub fn offset(&self, level: usize) -> f64 {
        level as f64 * self.level_pitch
    }

    /// Every effector id, level by level.
    pub fn effector_ids(&self) -> impl Iterator<Item = EffectorId> + '_ {
        self.levels
            .iter()
            .flat_map(|level| level.slots().map(|(_, slot)| slot.id))
    }

    pub fn effector_count(&self) -> usize {
        self.len() * QUADRANT_COUNT
    }
}

/// Everything resolved at start-up.
#[derive(Debug, Clone)]
pub struct Discovery {
    pub linear: LinearActuatorInfo,
    pub rotary: RotaryActuatorInfo,
    pub grid: Grid,
}

/// Resolve actuators and scan the effector grid.
///
/// Scanning walks outward from the rotor, one step per level, and stops at
/// the first incomplete level or at [`MAX_LEVELS`]. The result is reversed so
/// level 0 is the outermost scanned level.
///
/// # Errors
/// - `MissingLinearActuator` / `MissingRotaryActuator` when `probe()` lacks one
/// - `EffectorIdOutOfRange` for an id that does not fit the buffers
/// - `EmptyGrid` when not even the first level is complete
pub fn discover<D: BarrelDriver + ?Sized>(
    driver: &D,
    level_pitch: f64,
) -> Result<Discovery, ConfigurationError> {
    let caps = driver.probe();

    let linear = caps
        .iter()
        .find_map(|cap| match cap {
            Capability::LinearActuator(info) => Some(*info),
            _ => None,
        })
        .ok_or(ConfigurationError::MissingLinearActuator)?;
    let rotary = caps
        .iter()
        .find_map(|cap| match cap {
            Capability::RotaryActuator(info) => Some(*info),
            _ => None,
        })
        .ok_or(ConfigurationError::MissingRotaryActuator)?;

    for cap in &caps {
        if let Capability::Effector(info) = cap {
            check_id(info.id)?;
        }
    }

    let mut levels: HVec<Level, MAX_LEVELS> = HVec::new();
    for step in 1..=MAX_LEVELS {
        match build_level(&driver.scan_level(step), &rotary)? {
            Some(level) => {
                if levels.push(level).is_err() {
                    break;
                }
            }
            None => {
                debug!(step, "scan stopped at incomplete level");
                break;
            }
        }
    }

    if levels.is_full() && driver.scan_level(MAX_LEVELS + 1).iter().any(Option::is_some) {
        warn!(capacity = MAX_LEVELS, "grid capacity reached, outer effectors ignored");
    }
    if levels.is_empty() {
        return Err(ConfigurationError::EmptyGrid);
    }

    levels.reverse();
    let grid = Grid::from_levels(levels, level_pitch);
    info!(
        levels = grid.len(),
        effectors = grid.effector_count(),
        "effector grid discovered"
    );

    Ok(Discovery {
        linear,
        rotary,
        grid,
    })
}

fn check_id(id: EffectorId) -> Result<(), ConfigurationError> {
    if id.in_range() {
        Ok(())
    } else {
        Err(ConfigurationError::EffectorIdOutOfRange {
            id: id.0,
            capacity: MAX_EFFECTORS,
        })
    }
}

/// Quadrant at which `effector` faces the fire direction, or `None` when it
/// does not lie in the rotation plane.
pub fn effector_quadrant(effector: &EffectorInfo, rotary: &RotaryActuatorInfo) -> Option<Quadrant> {
    let to_axis = direction_angle(&effector.forward, &rotary.axis).abs();
    if (to_axis - FRAC_PI_2).abs() > PERPENDICULAR_TOLERANCE {
        return None;
    }
    let to_fire = planar_angle(&effector.forward, &rotary.fire_direction, &rotary.axis);
    Some(Quadrant::from_angle(reduce_to_full_turn(rotary.angle + to_fire)))
}

fn build_level(
    scanned: &[Option<EffectorInfo>; QUADRANT_COUNT],
    rotary: &RotaryActuatorInfo,
) -> Result<Option<Level>, ConfigurationError> {
    let mut slots: [Option<EffectorSlot>; QUADRANT_COUNT] = [None; QUADRANT_COUNT];

    for info in scanned.iter().flatten() {
        check_id(info.id)?;
        let Some(quadrant) = effector_quadrant(info, rotary) else {
            debug!(id = info.id.0, "effector not perpendicular to rotor axis");
            continue;
        };
        let slot = &mut slots[quadrant.index()];
        if slot.is_some() {
            debug!(id = info.id.0, ?quadrant, "quadrant already taken");
            return Ok(None);
        }
        *slot = Some(EffectorSlot {
            id: info.id,
            forward: info.forward,
        });
    }

    let [Some(a), Some(b), Some(c), Some(d)] = slots else {
        return Ok(None);
    };
    Ok(Some(Level::new([a, b, c, d])))
}
