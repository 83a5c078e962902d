use crate::config::InvalidConfiguration;
use crate::math::{Vec2, Vec3};

/// Fixed world-plane to map-surface affine mapping: per-axis scale followed by
/// a translation that moves the surface origin to its center.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MapTransform {
    scale: Vec2,
    translation: Vec2,
}

impl MapTransform {
    pub fn new(
        map_surface_size: Vec2,
        world_plane_size: Vec2,
    ) -> Result<Self, InvalidConfiguration> {
        let world_ok = world_plane_size.is_finite()
            && world_plane_size.x > 0.0
            && world_plane_size.y > 0.0;
        if !world_ok {
            return Err(InvalidConfiguration::WorldPlaneSize {
                width: world_plane_size.x,
                height: world_plane_size.y,
            });
        }
        let map_ok = map_surface_size.is_finite()
            && map_surface_size.x >= 0.0
            && map_surface_size.y >= 0.0;
        if !map_ok {
            return Err(InvalidConfiguration::MapSurfaceSize {
                width: map_surface_size.x,
                height: map_surface_size.y,
            });
        }

        Ok(Self {
            scale: map_surface_size.component_div(world_plane_size),
            translation: -(map_surface_size * 0.5),
        })
    }

    pub fn scale(&self) -> Vec2 {
        self.scale
    }

    pub fn translation(&self) -> Vec2 {
        self.translation
    }

    /// Maps a world-plane point `(x, z)` into map-surface space.
    pub fn apply(&self, plane: Vec2) -> Vec2 {
        plane.component_mul(self.scale) + self.translation
    }

    /// Maps a world position, measured from `map_center`, into map-surface space.
    pub fn world_to_map(&self, world: Vec3, map_center: Vec3) -> Vec2 {
        self.apply((world - map_center).plane())
    }
}
