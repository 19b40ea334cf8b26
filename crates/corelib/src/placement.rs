use crate::{Mat4, Vec3};

/// Where a model sits in the world: translation plus non-uniform scale.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Placement {
    pub position: Vec3,
    pub scale: Vec3,
}

impl Placement {
    #[inline]
    pub const fn identity() -> Self {
        Self {
            position: Vec3::ZERO,
            scale: Vec3::ONE,
        }
    }

    #[inline]
    pub const fn new(position: Vec3, scale: Vec3) -> Self {
        Self { position, scale }
    }

    /// Build matrix = T * S (column-major Mat4 per glam).
    #[inline]
    pub fn matrix(&self) -> Mat4 {
        Mat4::from_translation(self.position) * Mat4::from_scale(self.scale)
    }

    pub fn is_finite(&self) -> bool {
        self.position.is_finite() && self.scale.is_finite()
    }
}

impl Default for Placement {
    fn default() -> Self {
        Self::identity()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::vec3;

    #[test]
    fn translate_then_scale_matrix() {
        let p = Placement::new(vec3(1.0, 2.0, 3.0), vec3(10.0, 1.0, 10.0));
        // last column = translation, diagonal = scale
        let m = p.matrix().to_cols_array();
        assert!((m[12] - 1.0).abs() < 1e-6);
        assert!((m[13] - 2.0).abs() < 1e-6);
        assert!((m[14] - 3.0).abs() < 1e-6);
        assert!((m[0] - 10.0).abs() < 1e-6);
        assert!((m[5] - 1.0).abs() < 1e-6);
        assert!((m[10] - 10.0).abs() < 1e-6);
    }

    #[test]
    fn scale_applies_before_translation() {
        let p = Placement::new(vec3(0.0, 0.0, -2.0), vec3(2.0, 2.0, 2.0));
        let moved = p.matrix().transform_point3(vec3(1.0, 0.0, 0.0));
        assert!((moved - vec3(2.0, 0.0, -2.0)).length() < 1e-6);
    }
}
