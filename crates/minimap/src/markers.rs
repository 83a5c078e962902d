use std::collections::HashMap;
use std::hash::BuildHasher;

use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

use crate::math::{atan2_degrees, wrap_degrees, Vec2, Vec3, DEGENERATE_LENGTH};
use crate::surface::FocalMarker;
use crate::transform::MapTransform;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct EntityId(pub u64);

/// Host-side identifier for an on-surface marker widget.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct VisualHandle(pub u64);

/// A tracked entity. Without a visual it still takes part in clamp math but
/// nothing is written to the host.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MarkerData {
    pub entity: EntityId,
    pub visual: Option<VisualHandle>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct WorldPose {
    pub position: Vec3,
    /// Rotation about the world vertical axis, in degrees.
    pub yaw_degrees: f32,
}

/// Read access to the world transforms owned by the host scene.
pub trait EntitySource {
    fn world_position(&self, entity: EntityId) -> Option<Vec3>;
    fn world_yaw_degrees(&self, entity: EntityId) -> Option<f32>;
}

impl<S: BuildHasher> EntitySource for HashMap<EntityId, WorldPose, S> {
    fn world_position(&self, entity: EntityId) -> Option<Vec3> {
        self.get(&entity).map(|pose| pose.position)
    }

    fn world_yaw_degrees(&self, entity: EntityId) -> Option<f32> {
        self.get(&entity).map(|pose| pose.yaw_degrees)
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MarkerPlacement {
    pub position: Vec2,
    /// `None` when the marker sits exactly on the focal marker and has no bearing.
    pub rotation_degrees: Option<f32>,
    pub scale: f32,
}

/// Receives computed marker transforms for the host to apply to its widgets.
pub trait MarkerSink {
    fn place_marker(&mut self, visual: VisualHandle, placement: MarkerPlacement);
}

impl<F> MarkerSink for F
where
    F: FnMut(VisualHandle, MarkerPlacement),
{
    fn place_marker(&mut self, visual: VisualHandle, placement: MarkerPlacement) {
        self(visual, placement)
    }
}

/// Sink for hosts that only read [`MarkerTracker::outputs`].
#[derive(Debug, Clone, Copy, Default)]
pub struct DiscardMarkers;

impl MarkerSink for DiscardMarkers {
    fn place_marker(&mut self, _visual: VisualHandle, _placement: MarkerPlacement) {}
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ClampResult {
    pub position: Vec2,
    /// Distance from the focal marker before clamping.
    pub distance: f32,
    pub clamped: bool,
}

/// Pins `mapped` onto the circle of `radius` around `focal` when it lies
/// outside it. A marker coinciding with the focal marker is left in place.
pub fn clamp_to_radius(focal: Vec2, mapped: Vec2, radius: f32) -> ClampResult {
    let direction = mapped - focal;
    let distance = direction.length();
    if distance <= radius {
        return ClampResult {
            position: mapped,
            distance,
            clamped: false,
        };
    }
    match direction.try_normalize() {
        Some(unit) => ClampResult {
            position: focal + unit * radius,
            distance,
            clamped: true,
        },
        None => ClampResult {
            position: focal,
            distance,
            clamped: false,
        },
    }
}

/// Angle from `marker` toward `focal`, in degrees. `None` when they coincide.
pub fn bearing_degrees(marker: Vec2, focal: Vec2) -> Option<f32> {
    let to_focal = focal - marker;
    if to_focal.length() <= DEGENERATE_LENGTH {
        return None;
    }
    Some(atan2_degrees(to_focal))
}

/// Focal marker rotation on the surface: yaw sign-inverted so that turning
/// right in the world rotates the icon clockwise on screen.
pub fn focal_rotation_degrees(yaw_degrees: f32) -> f32 {
    -wrap_degrees(yaw_degrees)
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MarkerOutput {
    pub entity: EntityId,
    pub visual: Option<VisualHandle>,
    pub position: Vec2,
    pub distance: f32,
    pub clamped: bool,
    pub rotation_degrees: Option<f32>,
    pub scale: f32,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TrackingCounts {
    pub written: u32,
    pub clamped: u32,
    pub skipped: u32,
}

/// Inputs shared by every marker for one frame.
#[derive(Debug, Clone, Copy)]
pub struct TrackingFrame<'a> {
    pub transform: &'a MapTransform,
    pub map_center: Vec3,
    pub focal: &'a FocalMarker,
    pub focal_entity: EntityId,
    pub icon_scale: f32,
    pub clamp_offset: f32,
}

#[derive(Debug, Default)]
pub struct MarkerTracker {
    markers: Vec<MarkerData>,
    outputs: Vec<MarkerOutput>,
}

impl MarkerTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Starts tracking `entity`, or replaces its visual if already tracked.
    pub fn track(&mut self, entity: EntityId, visual: Option<VisualHandle>) {
        if let Some(existing) = self.markers.iter_mut().find(|m| m.entity == entity) {
            existing.visual = visual;
            return;
        }
        self.markers.push(MarkerData { entity, visual });
    }

    pub fn untrack(&mut self, entity: EntityId) -> bool {
        let before = self.markers.len();
        self.markers.retain(|m| m.entity != entity);
        self.markers.len() != before
    }

    pub fn set_visual(&mut self, entity: EntityId, visual: Option<VisualHandle>) -> bool {
        match self.markers.iter_mut().find(|m| m.entity == entity) {
            Some(marker) => {
                marker.visual = visual;
                true
            }
            None => false,
        }
    }

    pub fn markers(&self) -> &[MarkerData] {
        &self.markers
    }

    pub fn outputs(&self) -> &[MarkerOutput] {
        &self.outputs
    }

    pub fn len(&self) -> usize {
        self.markers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.markers.is_empty()
    }

    pub fn update(
        &mut self,
        frame: TrackingFrame<'_>,
        source: &dyn EntitySource,
        sink: &mut dyn MarkerSink,
    ) -> TrackingCounts {
        let mut counts = TrackingCounts::default();
        self.outputs.clear();
        let radius = sanitize_offset(frame.clamp_offset) * frame.icon_scale;
        let focal = frame.focal.anchored_position;

        for marker in &self.markers {
            if marker.entity == frame.focal_entity {
                continue;
            }
            let world = match source.world_position(marker.entity) {
                Some(position) if position.is_finite() => position,
                _ => {
                    debug!(entity = marker.entity.0, "marker_entity_unavailable");
                    counts.skipped += 1;
                    continue;
                }
            };

            let mapped = frame.transform.world_to_map(world, frame.map_center);
            let clamp = clamp_to_radius(focal, mapped, radius);
            if clamp.clamped {
                counts.clamped += 1;
                trace!(
                    entity = marker.entity.0,
                    distance = clamp.distance,
                    radius,
                    "marker_clamped"
                );
            }

            let rotation_degrees = bearing_degrees(clamp.position, focal);
            self.outputs.push(MarkerOutput {
                entity: marker.entity,
                visual: marker.visual,
                position: clamp.position,
                distance: clamp.distance,
                clamped: clamp.clamped,
                rotation_degrees,
                scale: frame.icon_scale,
            });

            let Some(visual) = marker.visual else {
                continue;
            };
            sink.place_marker(
                visual,
                MarkerPlacement {
                    position: clamp.position,
                    rotation_degrees,
                    scale: frame.icon_scale,
                },
            );
            counts.written += 1;
        }

        counts
    }
}

/// NaN and negative offsets clamp everything onto the focal marker; `+inf`
/// disables clamping.
fn sanitize_offset(offset: f32) -> f32 {
    if offset.is_nan() {
        0.0
    } else {
        offset.max(0.0)
    }
}
