use serde::{Deserialize, Serialize};
use std::ops::{AddAssign, Mul};

/// 2D vector for positions and velocities (screen space, +y is down)
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq)]
pub struct Vec2 {
    pub x: f32,
    pub y: f32,
}

impl Vec2 {
    pub const ZERO: Vec2 = Vec2 { x: 0.0, y: 0.0 };

    #[inline]
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    #[inline]
    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }
}

impl Mul<f32> for Vec2 {
    type Output = Self;
    #[inline]
    fn mul(self, rhs: f32) -> Self {
        Self {
            x: self.x * rhs,
            y: self.y * rhs,
        }
    }
}

impl AddAssign for Vec2 {
    fn add_assign(&mut self, rhs: Self) {
        self.x += rhs.x;
        self.y += rhs.y;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_integration_step() {
        let mut pos = Vec2::new(100.0, 450.0);
        let vel = Vec2::new(-100.0, 0.0);
        pos += vel * 0.25;
        assert_eq!(pos, Vec2::new(75.0, 450.0));
    }

    #[test]
    fn test_scale() {
        assert_eq!(Vec2::new(3.0, -4.0) * 2.0, Vec2::new(6.0, -8.0));
    }

    #[test]
    fn test_is_finite() {
        assert!(Vec2::ZERO.is_finite());
        assert!(!Vec2::new(f32::NAN, 0.0).is_finite());
    }

    #[test]
    fn test_serde() {
        let v = Vec2::new(1.5, -2.0);
        let json = serde_json::to_string(&v).unwrap();
        let back: Vec2 = serde_json::from_str(&json).unwrap();
        assert_eq!(v, back);
    }
}
