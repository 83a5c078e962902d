use tracing::{debug, info};

use crate::config::{InvalidConfiguration, MinimapConfig};
use crate::markers::{
    focal_rotation_degrees, EntityId, EntitySource, MarkerData, MarkerOutput, MarkerSink,
    MarkerTracker, TrackingFrame, VisualHandle,
};
use crate::math::Vec3;
use crate::surface::{pan_to_focal, FocalMarker, MapSurface};
use crate::transform::MapTransform;
use crate::zoom::{ZoomConfig, ZoomController};

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct FrameReport {
    pub frame_index: u64,
    pub scale: f32,
    pub markers_written: u32,
    pub markers_clamped: u32,
    pub entities_skipped: u32,
    pub focal_missing: bool,
}

/// Minimap state for one focal entity. The host owns it and drives it with
/// [`Minimap::advance_frame`] once per tick.
#[derive(Debug)]
pub struct Minimap {
    transform: MapTransform,
    map_center: Vec3,
    surface: MapSurface,
    focal: FocalMarker,
    focal_entity: EntityId,
    zoom: ZoomController,
    tracker: MarkerTracker,
    frame_index: u64,
}

impl Minimap {
    pub fn new(
        config: &MinimapConfig,
        focal_entity: EntityId,
    ) -> Result<Self, InvalidConfiguration> {
        config.validate()?;
        let transform = MapTransform::new(config.map_surface_size, config.world_plane_size)?;
        let zoom = ZoomController::new(config.zoom, config.initial_scale);
        let surface = MapSurface::new(config.map_surface_size, zoom.scale());
        let focal = FocalMarker {
            scale: surface.icon_scale(),
            ..FocalMarker::default()
        };

        info!(
            focal_entity = focal_entity.0,
            map_width = config.map_surface_size.x,
            map_height = config.map_surface_size.y,
            world_width = config.world_plane_size.x,
            world_height = config.world_plane_size.y,
            scale = zoom.scale(),
            "minimap_initialized"
        );

        Ok(Self {
            transform,
            map_center: config.map_center,
            surface,
            focal,
            focal_entity,
            zoom,
            tracker: MarkerTracker::new(),
            frame_index: 0,
        })
    }

    /// Runs zoom, pan, focal update and marker tracking in that order.
    /// Pan reads the focal position from the previous frame.
    pub fn advance_frame(
        &mut self,
        delta_seconds: f32,
        clamp_offset: f32,
        source: &dyn EntitySource,
        sink: &mut dyn MarkerSink,
    ) -> FrameReport {
        self.surface.scale = self.zoom.advance(delta_seconds);
        pan_to_focal(&mut self.surface, &self.focal);

        let icon_scale = self.surface.icon_scale();
        let focal_missing = !self.update_focal(source, icon_scale);

        let counts = self.tracker.update(
            TrackingFrame {
                transform: &self.transform,
                map_center: self.map_center,
                focal: &self.focal,
                focal_entity: self.focal_entity,
                icon_scale,
                clamp_offset,
            },
            source,
            sink,
        );

        let report = FrameReport {
            frame_index: self.frame_index,
            scale: self.surface.scale,
            markers_written: counts.written,
            markers_clamped: counts.clamped,
            entities_skipped: counts.skipped,
            focal_missing,
        };
        self.frame_index = self.frame_index.saturating_add(1);
        report
    }

    fn update_focal(&mut self, source: &dyn EntitySource, icon_scale: f32) -> bool {
        self.focal.scale = icon_scale;
        let position = match source.world_position(self.focal_entity) {
            Some(position) if position.is_finite() => position,
            _ => {
                debug!(entity = self.focal_entity.0, "focal_entity_unavailable");
                return false;
            }
        };

        self.focal.anchored_position = self.transform.world_to_map(position, self.map_center);
        if let Some(yaw) = source
            .world_yaw_degrees(self.focal_entity)
            .filter(|yaw| yaw.is_finite())
        {
            self.focal.rotation_degrees = focal_rotation_degrees(yaw);
        }
        true
    }

    pub fn switch_zoom_direction(&mut self) {
        self.zoom.toggle_direction();
        debug!(zoom_in = self.zoom.zoom_in(), "zoom_direction_switched");
    }

    pub fn zoom_in(&self) -> bool {
        self.zoom.zoom_in()
    }

    pub fn set_zoom_in(&mut self, zoom_in: bool) {
        self.zoom.set_zoom_in(zoom_in);
    }

    pub fn zoom_config(&self) -> &ZoomConfig {
        self.zoom.config()
    }

    pub fn track(&mut self, entity: EntityId, visual: Option<VisualHandle>) {
        self.tracker.track(entity, visual);
    }

    pub fn untrack(&mut self, entity: EntityId) -> bool {
        self.tracker.untrack(entity)
    }

    pub fn set_visual(&mut self, entity: EntityId, visual: Option<VisualHandle>) -> bool {
        self.tracker.set_visual(entity, visual)
    }

    pub fn tracked(&self) -> &[MarkerData] {
        self.tracker.markers()
    }

    pub fn surface(&self) -> &MapSurface {
        &self.surface
    }

    pub fn focal_marker(&self) -> &FocalMarker {
        &self.focal
    }

    pub fn focal_entity(&self) -> EntityId {
        self.focal_entity
    }

    /// Per-entity results of the most recent frame, in tracking order.
    pub fn marker_outputs(&self) -> &[MarkerOutput] {
        self.tracker.outputs()
    }

    pub fn marker_output(&self, entity: EntityId) -> Option<&MarkerOutput> {
        self.tracker
            .outputs()
            .iter()
            .find(|output| output.entity == entity)
    }

    pub fn transform(&self) -> &MapTransform {
        &self.transform
    }

    pub fn map_center(&self) -> Vec3 {
        self.map_center
    }

    pub fn frame_index(&self) -> u64 {
        self.frame_index
    }
}
