//! Lattice direction table and integer vector math.
//!
//! The four cardinal directions form a fixed cyclic table addressed modulo 4,
//! so `direction(d + 1)` and `direction(d - 1)` are always the two
//! perpendiculars of `direction(d)` and `direction(d + 2)` is its opposite.

use std::ops::{Add, AddAssign, Mul, Neg, Sub};
use std::str::FromStr;

use crate::error::{MapError, Result};

/// Integer 2-vector used for grid positions and direction steps.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Vec2 {
    pub x: i32,
    pub y: i32,
}

impl Vec2 {
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Same value on both axes.
    pub const fn splat(v: i32) -> Self {
        Self { x: v, y: v }
    }

    /// Squared Euclidean length, kept in i64 so large offsets cannot overflow.
    pub fn length_squared(self) -> i64 {
        let x = self.x as i64;
        let y = self.y as i64;
        x * x + y * y
    }
}

impl Add for Vec2 {
    type Output = Vec2;
    fn add(self, rhs: Vec2) -> Vec2 {
        Vec2::new(self.x + rhs.x, self.y + rhs.y)
    }
}

impl AddAssign for Vec2 {
    fn add_assign(&mut self, rhs: Vec2) {
        self.x += rhs.x;
        self.y += rhs.y;
    }
}

impl Sub for Vec2 {
    type Output = Vec2;
    fn sub(self, rhs: Vec2) -> Vec2 {
        Vec2::new(self.x - rhs.x, self.y - rhs.y)
    }
}

impl Mul<i32> for Vec2 {
    type Output = Vec2;
    fn mul(self, rhs: i32) -> Vec2 {
        Vec2::new(self.x * rhs, self.y * rhs)
    }
}

impl Neg for Vec2 {
    type Output = Vec2;
    fn neg(self) -> Vec2 {
        Vec2::new(-self.x, -self.y)
    }
}

/// Unit vectors for the direction indices 0:left, 1:up, 2:right, 3:down.
pub const DIRECTIONS: [Vec2; 4] = [
    Vec2::new(-1, 0),
    Vec2::new(0, -1),
    Vec2::new(1, 0),
    Vec2::new(0, 1),
];

/// Look up a direction by index, wrapping modulo 4 (negative indices included).
pub fn direction(index: i32) -> Vec2 {
    DIRECTIONS[index.rem_euclid(4) as usize]
}

/// Ordered, cyclically indexable sequence of direction indices (0..=3).
///
/// The generator indexes it relative to the current step, including `step - 1`
/// at step 0, so lookup wraps around in both directions.
#[derive(Clone, Debug)]
pub struct DirectionSequence {
    steps: Vec<u8>,
}

impl DirectionSequence {
    pub fn new(steps: Vec<u8>) -> Result<Self> {
        if steps.is_empty() {
            return Err(MapError::InvalidParameter(
                "direction sequence must not be empty".to_string(),
            ));
        }
        if let Some(bad) = steps.iter().find(|&&d| d > 3) {
            return Err(MapError::InvalidParameter(format!(
                "direction index {} out of range 0..=3",
                bad
            )));
        }
        Ok(Self { steps })
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    /// Cyclic lookup; negative indices wrap to the end of the sequence.
    pub fn get(&self, index: i32) -> i32 {
        let len = self.steps.len() as i32;
        self.steps[index.rem_euclid(len) as usize] as i32
    }
}

impl FromStr for DirectionSequence {
    type Err = MapError;

    /// Parse a comma separated list like `2,2,3,1`.
    fn from_str(s: &str) -> Result<Self> {
        let steps = s
            .split(',')
            .map(|part| {
                part.trim().parse::<u8>().map_err(|_| {
                    MapError::InvalidParameter(format!("bad direction entry '{}'", part.trim()))
                })
            })
            .collect::<Result<Vec<u8>>>()?;
        DirectionSequence::new(steps)
    }
}
