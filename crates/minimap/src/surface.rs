use crate::math::Vec2;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MapSurface {
    pub size: Vec2,
    pub scale: f32,
    pub anchored_position: Vec2,
}

impl MapSurface {
    pub fn new(size: Vec2, scale: f32) -> Self {
        Self {
            size,
            scale,
            anchored_position: Vec2::ZERO,
        }
    }

    /// Scale applied to icons so they stay the same on-screen size under zoom.
    pub fn icon_scale(&self) -> f32 {
        1.0 / self.scale
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FocalMarker {
    pub anchored_position: Vec2,
    /// Rotation about the surface normal, in degrees.
    pub rotation_degrees: f32,
    pub scale: f32,
}

impl Default for FocalMarker {
    fn default() -> Self {
        Self {
            anchored_position: Vec2::ZERO,
            rotation_degrees: 0.0,
            scale: 1.0,
        }
    }
}

/// Moves the surface opposite to the focal marker so the focal entity stays
/// at the visual center for the surface's current zoom.
pub fn pan_to_focal(surface: &mut MapSurface, focal: &FocalMarker) {
    surface.anchored_position = -focal.anchored_position * surface.scale;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pan_offsets_surface_by_scaled_focal_position() {
        let mut surface = MapSurface::new(Vec2::new(200.0, 200.0), 1.5);
        let focal = FocalMarker {
            anchored_position: Vec2::new(10.0, -4.0),
            ..FocalMarker::default()
        };
        pan_to_focal(&mut surface, &focal);
        assert_eq!(surface.anchored_position, Vec2::new(-15.0, 6.0));
    }

    #[test]
    fn pan_is_recomputed_without_accumulation() {
        let mut surface = MapSurface::new(Vec2::new(200.0, 200.0), 2.0);
        let focal = FocalMarker {
            anchored_position: Vec2::new(3.0, 7.0),
            ..FocalMarker::default()
        };
        for _ in 0..5 {
            pan_to_focal(&mut surface, &focal);
        }
        assert_eq!(surface.anchored_position, Vec2::new(-6.0, -14.0));
    }

    #[test]
    fn icon_scale_is_inverse_of_surface_scale() {
        let surface = MapSurface::new(Vec2::new(1.0, 1.0), 4.0);
        assert!((surface.icon_scale() - 0.25).abs() < 0.0001);
    }
}
