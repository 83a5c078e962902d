mod config;
mod markers;
mod math;
mod minimap;
mod stats;
mod surface;
mod transform;
mod zoom;

pub use config::{
    ConfigLoadError, InvalidConfiguration, MinimapConfig, DEFAULT_INITIAL_SCALE,
    DEFAULT_MAP_SURFACE_SIZE, DEFAULT_WORLD_PLANE_SIZE,
};
pub use markers::{
    bearing_degrees, clamp_to_radius, focal_rotation_degrees, ClampResult, DiscardMarkers,
    EntityId, EntitySource, MarkerData, MarkerOutput, MarkerPlacement, MarkerSink, MarkerTracker,
    TrackingCounts, TrackingFrame, VisualHandle, WorldPose,
};
pub use math::{atan2_degrees, wrap_degrees, Vec2, Vec3, DEGENERATE_LENGTH};
pub use minimap::{FrameReport, Minimap};
pub use stats::{TrackingStatsAccumulator, TrackingStatsSnapshot};
pub use surface::{pan_to_focal, FocalMarker, MapSurface};
pub use transform::MapTransform;
pub use zoom::{
    ZoomConfig, ZoomController, ZOOM_MAX_SCALE_DEFAULT, ZOOM_MIN_SCALE_DEFAULT,
    ZOOM_SPEED_DEFAULT,
};
