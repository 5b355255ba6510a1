//! Math utilities and types
//!
//! Small value types used by rendering, audio and GUI code. Vectors are
//! plain nalgebra vectors; everything is ordinary IEEE-754 arithmetic.

use std::f64::consts::PI;

pub use nalgebra::{Vector2, Vector3, Vector4};

/// 2D float vector (positions and sizes in normalized device coordinates)
pub type Vec2f = Vector2<f32>;

/// 2D integer vector (pixel sizes, bitmap boxes)
pub type Vec2i = Vector2<i32>;

/// 3D float vector (audio source position, velocity, direction)
pub type Vec3f = Vector3<f32>;

/// 3D double vector
pub type Vec3d = Vector3<f64>;

/// 4D float vector
pub type Vec4f = Vector4<f32>;

/// RGBA color with components in `0.0..=1.0`
pub type Color = Vec4f;

/// Quaternion with double precision components (`w + xi + yj + zk`)
pub type Quaternion = nalgebra::Quaternion<f64>;

/// Color helpers
pub mod color {
    use super::Color;

    /// Opaque white
    pub fn white() -> Color {
        Color::new(1.0, 1.0, 1.0, 1.0)
    }

    /// Opaque black
    pub fn black() -> Color {
        Color::new(0.0, 0.0, 0.0, 1.0)
    }

    /// Opaque gray with every channel set to `value`
    pub fn grayscale(value: f32) -> Color {
        Color::new(value, value, value, 1.0)
    }

    /// Same color with a different alpha
    pub fn with_alpha(color: Color, alpha: f32) -> Color {
        Color::new(color.x, color.y, color.z, alpha)
    }

    /// Convert 8-bit channels to a float color
    pub fn from_rgba8(r: u8, g: u8, b: u8, a: u8) -> Color {
        Color::new(
            f32::from(r) / 255.0,
            f32::from(g) / 255.0,
            f32::from(b) / 255.0,
            f32::from(a) / 255.0,
        )
    }
}

/// Quaternion helpers on top of nalgebra
pub mod quaternion {
    use super::{Quaternion, Vec3d};

    /// Pure quaternion `0 + v.x i + v.y j + v.z k`
    pub fn from_vector(v: Vec3d) -> Quaternion {
        Quaternion::new(0.0, v.x, v.y, v.z)
    }

    /// Vector part `(i, j, k)`
    pub fn vector(q: &Quaternion) -> Vec3d {
        Vec3d::new(q.i, q.j, q.k)
    }

    /// Multiplicative inverse `conj(q) / |q|^2`
    ///
    /// A zero quaternion yields non-finite components, same as the raw division.
    pub fn reciprocal(q: &Quaternion) -> Quaternion {
        q.conjugate() / q.norm_squared()
    }
}

/// Angle in degrees, normalized with `% 180`
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd)]
pub struct Degree(f64);

impl Degree {
    /// Wrap a degree value
    pub fn of(degree: f64) -> Self {
        Self(degree % 180.0)
    }

    /// Raw value
    pub fn value(self) -> f64 {
        self.0
    }
}

impl From<Radian> for Degree {
    fn from(radian: Radian) -> Self {
        Self::of(radian.value() / PI * 180.0)
    }
}

/// Angle in radians, normalized with `% PI`
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd)]
pub struct Radian(f64);

impl Radian {
    /// Wrap a radian value
    pub fn of(radian: f64) -> Self {
        Self(radian % PI)
    }

    /// Raw value
    pub fn value(self) -> f64 {
        self.0
    }
}

impl From<Degree> for Radian {
    fn from(degree: Degree) -> Self {
        Self::of(degree.value() / 180.0 * PI)
    }
}

/// Axis-aligned rectangle anchored at its bottom-left corner
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundingRectangle {
    /// Bottom-left corner
    pub pos: Vec2f,
    /// Width and height
    pub size: Vec2f,
}

impl BoundingRectangle {
    /// Create a new rectangle
    pub fn new(pos: Vec2f, size: Vec2f) -> Self {
        Self { pos, size }
    }

    /// Whether `p` lies inside the rectangle, edges included
    pub fn contains(&self, p: Vec2f) -> bool {
        self.pos.x <= p.x
            && self.pos.y <= p.y
            && p.x <= self.pos.x + self.size.x
            && p.y <= self.pos.y + self.size.y
    }

    /// Overlap test on the centre distance.
    ///
    /// Both centres are computed with `self.size`, so the result is only
    /// exact for rectangles of equal size.
    pub fn intersects(&self, other: &Self) -> bool {
        let c0 = self.pos + self.size / 2.0;
        let c1 = other.pos + self.size / 2.0;
        let d = (c0 - c1).abs();
        let s = (self.size + self.size) / 2.0;

        d.x < s.x && d.y < s.y
    }
}
