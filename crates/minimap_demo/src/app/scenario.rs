use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use minimap::{EntityId, Vec3, VisualHandle, WorldPose};
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub(crate) const FOCAL_ENTITY: EntityId = EntityId(0);

#[derive(Debug, Error)]
pub(crate) enum ScenarioError {
    #[error("failed to read scenario {path}: {source}")]
    ReadFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse scenario {path} at '{field_path}': {source}")]
    Parse {
        path: PathBuf,
        field_path: String,
        #[source]
        source: serde_json::Error,
    },
    #[error("scenario entity id {id} is reserved for the focal entity")]
    ReservedEntityId { id: u64 },
    #[error("scenario delta_seconds must be a positive duration, got {delta_seconds}")]
    InvalidDelta { delta_seconds: f32 },
    #[error("scenario stats_interval_seconds must be a non-negative duration, got {seconds}")]
    InvalidStatsInterval { seconds: f32 },
}

/// Focal entity walks a circle around `center`, facing along its heading.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub(crate) struct FocalPath {
    pub center: Vec3,
    pub radius: f32,
    pub angular_speed_degrees: f32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub(crate) struct ScenarioEntity {
    pub id: u64,
    pub start: Vec3,
    #[serde(default)]
    pub velocity: Vec3,
    #[serde(default)]
    pub visual: Option<u64>,
    #[serde(default)]
    pub despawn_at_frame: Option<u32>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub(crate) struct Scenario {
    pub frames: u32,
    pub delta_seconds: f32,
    pub clamp_offset: f32,
    /// Zero disables toggling.
    pub zoom_toggle_every_frames: u32,
    pub stats_interval_seconds: f32,
    pub focal: FocalPath,
    pub entities: Vec<ScenarioEntity>,
}

impl Default for Scenario {
    fn default() -> Self {
        Self {
            frames: 600,
            delta_seconds: 1.0 / 60.0,
            clamp_offset: 90.0,
            zoom_toggle_every_frames: 180,
            stats_interval_seconds: 1.0,
            focal: FocalPath {
                center: Vec3::new(50.0, 0.0, 50.0),
                radius: 20.0,
                angular_speed_degrees: 30.0,
            },
            entities: vec![
                ScenarioEntity {
                    id: 1,
                    start: Vec3::new(80.0, 0.0, 50.0),
                    velocity: Vec3::ZERO,
                    visual: Some(1),
                    despawn_at_frame: None,
                },
                ScenarioEntity {
                    id: 2,
                    start: Vec3::new(150.0, 0.0, -40.0),
                    velocity: Vec3::new(-2.0, 0.0, 1.0),
                    visual: Some(2),
                    despawn_at_frame: None,
                },
                ScenarioEntity {
                    id: 3,
                    start: Vec3::new(10.0, 0.0, 90.0),
                    velocity: Vec3::ZERO,
                    visual: None,
                    despawn_at_frame: None,
                },
                ScenarioEntity {
                    id: 4,
                    start: Vec3::new(50.0, 4.0, 95.0),
                    velocity: Vec3::new(0.5, 0.0, -1.5),
                    visual: Some(4),
                    despawn_at_frame: Some(300),
                },
            ],
        }
    }
}

impl Scenario {
    pub(crate) fn load(path: &Path) -> Result<Self, ScenarioError> {
        let raw = fs::read_to_string(path).map_err(|source| ScenarioError::ReadFile {
            path: path.to_path_buf(),
            source,
        })?;
        let mut deserializer = serde_json::Deserializer::from_str(&raw);
        let scenario: Scenario = serde_path_to_error::deserialize(&mut deserializer).map_err(
            |error| ScenarioError::Parse {
                path: path.to_path_buf(),
                field_path: error.path().to_string(),
                source: error.into_inner(),
            },
        )?;
        scenario.validate()?;
        Ok(scenario)
    }

    pub(crate) fn validate(&self) -> Result<(), ScenarioError> {
        self.frame_duration()?;
        self.stats_interval()?;
        if let Some(entity) = self.entities.iter().find(|e| EntityId(e.id) == FOCAL_ENTITY) {
            return Err(ScenarioError::ReservedEntityId { id: entity.id });
        }
        Ok(())
    }

    pub(crate) fn frame_duration(&self) -> Result<Duration, ScenarioError> {
        Duration::try_from_secs_f32(self.delta_seconds)
            .ok()
            .filter(|duration| !duration.is_zero())
            .ok_or(ScenarioError::InvalidDelta {
                delta_seconds: self.delta_seconds,
            })
    }

    pub(crate) fn stats_interval(&self) -> Result<Duration, ScenarioError> {
        Duration::try_from_secs_f32(self.stats_interval_seconds).map_err(|_| {
            ScenarioError::InvalidStatsInterval {
                seconds: self.stats_interval_seconds,
            }
        })
    }

    pub(crate) fn visual_for(entity: &ScenarioEntity) -> Option<VisualHandle> {
        entity.visual.map(VisualHandle)
    }
}

/// Host-side world the minimap reads from.
#[derive(Debug, Default)]
pub(crate) struct ScenarioWorld {
    poses: HashMap<EntityId, WorldPose>,
}

impl ScenarioWorld {
    pub(crate) fn poses(&self) -> &HashMap<EntityId, WorldPose> {
        &self.poses
    }

    /// Places every live entity for `frame`. Despawned entities are removed.
    pub(crate) fn step(&mut self, scenario: &Scenario, frame: u32) {
        let elapsed = frame as f32 * scenario.delta_seconds;
        self.poses.insert(FOCAL_ENTITY, focal_pose(&scenario.focal, elapsed));

        for entity in &scenario.entities {
            let id = EntityId(entity.id);
            if entity.despawn_at_frame.is_some_and(|at| frame >= at) {
                self.poses.remove(&id);
                continue;
            }
            self.poses.insert(
                id,
                WorldPose {
                    position: entity.start + entity.velocity * elapsed,
                    yaw_degrees: 0.0,
                },
            );
        }
    }
}

fn focal_pose(path: &FocalPath, elapsed: f32) -> WorldPose {
    let theta = (path.angular_speed_degrees * elapsed).to_radians();
    let offset = Vec3::new(path.radius * theta.cos(), 0.0, path.radius * theta.sin());
    // Tangent of the circle; yaw 0 faces +z, 90 faces +x.
    let heading_x = -theta.sin() * path.angular_speed_degrees.signum();
    let heading_z = theta.cos() * path.angular_speed_degrees.signum();
    WorldPose {
        position: path.center + offset,
        yaw_degrees: heading_x.atan2(heading_z).to_degrees(),
    }
}
