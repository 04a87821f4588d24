//! Affine 2x3 matrix used for all path and paint transforms.

use super::aabb::Aabb;
use super::vec2::Vec2;

/// A 2D affine transform, stored as the top two rows of a 3x3 matrix:
///
/// ```text
/// | xx xy tx |
/// | yx yy ty |
/// | 0  0  1  |
/// ```
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Mat2D {
    pub xx: f32,
    pub xy: f32,
    pub yx: f32,
    pub yy: f32,
    pub tx: f32,
    pub ty: f32,
}

impl Default for Mat2D {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl Mat2D {
    pub const IDENTITY: Self = Self {
        xx: 1.0,
        xy: 0.0,
        yx: 0.0,
        yy: 1.0,
        tx: 0.0,
        ty: 0.0,
    };

    #[inline]
    pub fn new(xx: f32, xy: f32, yx: f32, yy: f32, tx: f32, ty: f32) -> Self {
        Self { xx, xy, yx, yy, tx, ty }
    }

    #[inline]
    pub fn from_translation(t: Vec2) -> Self {
        Self { tx: t.x, ty: t.y, ..Self::IDENTITY }
    }

    #[inline]
    pub fn from_scale(sx: f32, sy: f32) -> Self {
        Self { xx: sx, yy: sy, ..Self::IDENTITY }
    }

    pub fn from_rotation(radians: f32) -> Self {
        let (s, c) = radians.sin_cos();
        Self { xx: c, xy: -s, yx: s, yy: c, tx: 0.0, ty: 0.0 }
    }

    /// Applies this transform to a point.
    #[inline]
    pub fn apply(&self, p: Vec2) -> Vec2 {
        Vec2::new(
            self.xx * p.x + self.xy * p.y + self.tx,
            self.yx * p.x + self.yy * p.y + self.ty,
        )
    }

    /// Applies the linear part only (no translation) — used for transforming
    /// direction/tangent vectors.
    #[inline]
    pub fn apply_vector(&self, v: Vec2) -> Vec2 {
        Vec2::new(self.xx * v.x + self.xy * v.y, self.yx * v.x + self.yy * v.y)
    }

    /// `self * other`: applying the result to a point is equivalent to
    /// applying `other` first, then `self`.
    pub fn mul(&self, other: &Mat2D) -> Mat2D {
        Mat2D {
            xx: self.xx * other.xx + self.xy * other.yx,
            xy: self.xx * other.xy + self.xy * other.yy,
            yx: self.yx * other.xx + self.yy * other.yx,
            yy: self.yx * other.xy + self.yy * other.yy,
            tx: self.xx * other.tx + self.xy * other.ty + self.tx,
            ty: self.yx * other.tx + self.yy * other.ty + self.ty,
        }
    }

    pub fn invert(&self) -> Option<Mat2D> {
        let det = self.xx * self.yy - self.xy * self.yx;
        if det.abs() < f32::EPSILON {
            return None;
        }
        let inv_det = 1.0 / det;
        let xx = self.yy * inv_det;
        let xy = -self.xy * inv_det;
        let yx = -self.yx * inv_det;
        let yy = self.xx * inv_det;
        let tx = -(xx * self.tx + xy * self.ty);
        let ty = -(yx * self.tx + yy * self.ty);
        Some(Mat2D { xx, xy, yx, yy, tx, ty })
    }

    /// The worst-case scale factor this matrix can apply to any unit vector.
    /// Used to scale flattening tolerances so on-screen flatness is preserved
    /// regardless of zoom.
    pub fn max_scale_factor(&self) -> f32 {
        // Largest singular value of the linear part, via the standard closed form
        // for a 2x2 matrix rather than a full SVD.
        let a = self.xx;
        let b = self.xy;
        let c = self.yx;
        let d = self.yy;
        let s1 = a * a + b * b + c * c + d * d;
        let s2 = ((a * a + b * b - c * c - d * d).powi(2) + 4.0 * (a * c + b * d).powi(2)).sqrt();
        (((s1 + s2) / 2.0).max(0.0)).sqrt()
    }

    pub fn map_aabb(&self, aabb: &Aabb) -> Aabb {
        let corners = [
            Vec2::new(aabb.min.x, aabb.min.y),
            Vec2::new(aabb.max.x, aabb.min.y),
            Vec2::new(aabb.min.x, aabb.max.y),
            Vec2::new(aabb.max.x, aabb.max.y),
        ];
        let mut result = Aabb::EMPTY;
        for c in corners {
            result.add_point(self.apply(c));
        }
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn identity_is_noop() {
        let p = Vec2::new(3.0, 4.0);
        assert_eq!(Mat2D::IDENTITY.apply(p), p);
    }

    #[test]
    fn translation_moves_point() {
        let m = Mat2D::from_translation(Vec2::new(10.0, -5.0));
        assert_eq!(m.apply(Vec2::ZERO), Vec2::new(10.0, -5.0));
    }

    #[test]
    fn invert_round_trips() {
        let m = Mat2D::new(2.0, 0.3, -0.1, 1.5, 7.0, -2.0);
        let inv = m.invert().unwrap();
        let p = Vec2::new(11.0, -3.0);
        let round_tripped = inv.apply(m.apply(p));
        assert!((round_tripped.x - p.x).abs() < 1e-4);
        assert!((round_tripped.y - p.y).abs() < 1e-4);
    }

    #[test]
    fn uniform_scale_max_factor_matches_scale() {
        let m = Mat2D::from_scale(3.0, 3.0);
        assert!((m.max_scale_factor() - 3.0).abs() < 1e-5);
    }
}
