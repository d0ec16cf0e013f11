//! Fixed-point math utilities for deterministic simulation.
//!
//! All world-space coordinates and missile motion use fixed-point
//! arithmetic. Floating-point operations can produce different results
//! on different CPUs, which would break save/replay reproducibility.

use fixed::types::I32F32;
use serde::{Deserialize, Serialize};

/// Fixed-point number type for all simulation math.
///
/// Uses 32 bits for integer part and 32 bits for fractional part.
pub type Fixed = I32F32;

/// Fixed-point 2D point/vector in world space.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Vec2Fixed {
    /// X coordinate.
    #[serde(with = "fixed_serde")]
    pub x: Fixed,
    /// Y coordinate.
    #[serde(with = "fixed_serde")]
    pub y: Fixed,
}

/// Serde support for fixed-point numbers.
///
/// Serializes fixed-point numbers as their raw bit representation (i64)
/// to preserve exact precision across serialization boundaries.
pub mod fixed_serde {
    use super::Fixed;
    use serde::{Deserialize, Deserializer, Serialize, Serializer};

    /// Serialize a fixed-point number as its raw bit representation.
    pub fn serialize<S>(value: &Fixed, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        value.to_bits().serialize(serializer)
    }

    /// Deserialize a fixed-point number from its raw bit representation.
    pub fn deserialize<'de, D>(deserializer: D) -> Result<Fixed, D::Error>
    where
        D: Deserializer<'de>,
    {
        let bits = i64::deserialize(deserializer)?;
        Ok(Fixed::from_bits(bits))
    }
}

impl Vec2Fixed {
    /// Create a new fixed-point vector.
    #[must_use]
    pub const fn new(x: Fixed, y: Fixed) -> Self {
        Self { x, y }
    }

    /// Zero vector.
    pub const ZERO: Self = Self {
        x: Fixed::ZERO,
        y: Fixed::ZERO,
    };

    /// Calculate squared distance (avoids sqrt for comparisons).
    #[must_use]
    pub fn distance_squared(self, other: Self) -> Fixed {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        dx * dx + dy * dy
    }

    /// Dot product of two vectors.
    #[must_use]
    pub fn dot(self, other: Self) -> Fixed {
        self.x * other.x + self.y * other.y
    }

    /// Scale both components by a fixed-point factor.
    #[must_use]
    pub fn scaled(self, factor: Fixed) -> Self {
        Self {
            x: self.x * factor,
            y: self.y * factor,
        }
    }

    /// Normalize vector using fixed-point math.
    #[must_use]
    pub fn normalize(self) -> Self {
        let len_sq = self.dot(self);

        if len_sq == Fixed::ZERO {
            return Self::ZERO;
        }

        let len = fixed_sqrt(len_sq);
        if len == Fixed::ZERO {
            return Self::ZERO;
        }

        Self::new(self.x / len, self.y / len)
    }
}

/// Computes the square root of a fixed-point number using binary search.
fn fixed_sqrt(value: Fixed) -> Fixed {
    if value <= Fixed::ZERO {
        return Fixed::ZERO;
    }

    let mut low = Fixed::ZERO;
    let mut high = if value > Fixed::from_num(1) {
        value
    } else {
        Fixed::from_num(1)
    };

    for _ in 0..32 {
        let mid = (low + high) / Fixed::from_num(2);
        let mid_sq = mid.saturating_mul(mid);

        if mid_sq <= value {
            low = mid;
        } else {
            high = mid;
        }
    }

    low
}

impl std::ops::Add for Vec2Fixed {
    type Output = Self;

    fn add(self, rhs: Self) -> Self::Output {
        Self {
            x: self.x + rhs.x,
            y: self.y + rhs.y,
        }
    }
}

impl std::ops::Sub for Vec2Fixed {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self::Output {
        Self {
            x: self.x - rhs.x,
            y: self.y - rhs.y,
        }
    }
}

/// One of the 16 compass directions used to pick directional missile
/// visuals.
///
/// Index 0 points along +X; indices increase counterclockwise in steps
/// of 22.5 degrees. Quantization is deterministic: the nearest direction
/// is chosen by dot-product argmax, with ties resolved to the lowest
/// index.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Direction16(u8);

impl Direction16 {
    /// Number of compass directions.
    pub const COUNT: u8 = 16;

    /// Construct from a raw index, wrapping modulo 16.
    #[must_use]
    pub const fn from_index(index: u8) -> Self {
        Self(index % Self::COUNT)
    }

    /// Raw index in `0..16`.
    #[must_use]
    pub const fn index(self) -> u8 {
        self.0
    }

    /// The compass direction nearest to the given vector.
    ///
    /// A zero vector maps to direction 0 (+X).
    #[must_use]
    pub fn from_vector(v: Vec2Fixed) -> Self {
        if v == Vec2Fixed::ZERO {
            return Self(0);
        }

        let candidates = unit_vectors();
        let mut best = 0usize;
        let mut best_dot = v.dot(candidates[0]);
        for (i, candidate) in candidates.iter().enumerate().skip(1) {
            let d = v.dot(*candidate);
            if d > best_dot {
                best = i;
                best_dot = d;
            }
        }

        Self(best as u8)
    }

    /// Unit vector for this direction.
    #[must_use]
    pub fn unit_vector(self) -> Vec2Fixed {
        unit_vectors()[self.0 as usize]
    }
}

/// Unit vectors for the 16 compass directions, index 0 = +X,
/// counterclockwise.
fn unit_vectors() -> [Vec2Fixed; 16] {
    // cos/sin of 22.5, 45 and 67.5 degrees.
    let c1 = Fixed::from_num(0.923_879_532_5);
    let c2 = Fixed::from_num(0.707_106_781_2);
    let c3 = Fixed::from_num(0.382_683_432_4);
    let one = Fixed::ONE;
    let zero = Fixed::ZERO;

    [
        (one, zero),
        (c1, c3),
        (c2, c2),
        (c3, c1),
        (zero, one),
        (-c3, c1),
        (-c2, c2),
        (-c1, c3),
        (-one, zero),
        (-c1, -c3),
        (-c2, -c2),
        (-c3, -c1),
        (zero, -one),
        (c3, -c1),
        (c2, -c2),
        (c1, -c3),
    ]
    .map(|(x, y)| Vec2Fixed::new(x, y))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_vec2_distance_squared() {
        let a = Vec2Fixed::new(Fixed::from_num(3), Fixed::from_num(0));
        let b = Vec2Fixed::new(Fixed::from_num(0), Fixed::from_num(4));
        let dist_sq = a.distance_squared(b);
        // 3² + 4² = 25
        assert_eq!(dist_sq, Fixed::from_num(25));
    }

    #[test]
    fn test_fixed_determinism() {
        // Same operations must produce identical results
        let a = Fixed::from_num(1) / Fixed::from_num(3);
        let b = Fixed::from_num(1) / Fixed::from_num(3);
        assert_eq!(a, b);

        let result1 = a * Fixed::from_num(7);
        let result2 = b * Fixed::from_num(7);
        assert_eq!(result1, result2);
    }

    #[test]
    fn test_vec2_normalize() {
        let v = Vec2Fixed::new(Fixed::from_num(3), Fixed::from_num(4));
        let norm = v.normalize();

        // Length squared should be very close to 1
        let len_sq = norm.dot(norm);
        let one = Fixed::from_num(1);
        // Allow tiny epsilon: 1/10000 in fixed-point (no floats!)
        let epsilon = one / Fixed::from_num(10000);
        assert!(
            (len_sq - one).abs() < epsilon,
            "normalized vector length² should be ~1, got {:?}",
            len_sq
        );
    }

    #[test]
    fn test_direction16_cardinals() {
        let east = Direction16::from_vector(Vec2Fixed::new(Fixed::from_num(5), Fixed::ZERO));
        assert_eq!(east.index(), 0);

        let north = Direction16::from_vector(Vec2Fixed::new(Fixed::ZERO, Fixed::from_num(2)));
        assert_eq!(north.index(), 4);

        let west = Direction16::from_vector(Vec2Fixed::new(Fixed::from_num(-1), Fixed::ZERO));
        assert_eq!(west.index(), 8);

        let south = Direction16::from_vector(Vec2Fixed::new(Fixed::ZERO, Fixed::from_num(-3)));
        assert_eq!(south.index(), 12);
    }

    #[test]
    fn test_direction16_diagonal() {
        let ne = Direction16::from_vector(Vec2Fixed::new(Fixed::from_num(7), Fixed::from_num(7)));
        assert_eq!(ne.index(), 2);
    }

    #[test]
    fn test_direction16_zero_vector_defaults_east() {
        assert_eq!(Direction16::from_vector(Vec2Fixed::ZERO).index(), 0);
    }

    #[test]
    fn test_direction16_quantization_is_deterministic() {
        let v = Vec2Fixed::new(Fixed::from_num(13), Fixed::from_num(-4));
        let a = Direction16::from_vector(v);
        let b = Direction16::from_vector(v);
        assert_eq!(a, b);
    }

    #[test]
    fn test_direction16_roundtrips_through_unit_vector() {
        for i in 0..16 {
            let dir = Direction16::from_index(i);
            assert_eq!(Direction16::from_vector(dir.unit_vector()), dir);
        }
    }
}
