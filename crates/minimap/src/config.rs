use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::math::{Vec2, Vec3};
use crate::zoom::ZoomConfig;

pub const DEFAULT_MAP_SURFACE_SIZE: Vec2 = Vec2::new(200.0, 200.0);
pub const DEFAULT_WORLD_PLANE_SIZE: Vec2 = Vec2::new(100.0, 100.0);
pub const DEFAULT_INITIAL_SCALE: f32 = 1.0;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum InvalidConfiguration {
    #[error("world plane size must be positive and finite, got ({width}, {height})")]
    WorldPlaneSize { width: f32, height: f32 },
    #[error("map surface size must be non-negative and finite, got ({width}, {height})")]
    MapSurfaceSize { width: f32, height: f32 },
    #[error("map center must be finite, got ({x}, {y}, {z})")]
    MapCenter { x: f32, y: f32, z: f32 },
    #[error("zoom bounds must satisfy 0 < min <= max, got [{min}, {max}]")]
    ZoomBounds { min: f32, max: f32 },
    #[error("zoom speed must be non-negative and finite, got {speed}")]
    ZoomSpeed { speed: f32 },
    #[error("initial scale must be finite, got {scale}")]
    InitialScale { scale: f32 },
}

#[derive(Debug, Error)]
pub enum ConfigLoadError {
    #[error("failed to read minimap config {path}: {source}")]
    ReadFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse minimap config {path} at '{field_path}': {source}")]
    Parse {
        path: PathBuf,
        field_path: String,
        #[source]
        source: serde_json::Error,
    },
    #[error("minimap config {path} is invalid: {source}")]
    Invalid {
        path: PathBuf,
        #[source]
        source: InvalidConfiguration,
    },
}

/// Setup inputs for a [`crate::Minimap`]. Everything here is fixed for the
/// session except the zoom direction flag.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct MinimapConfig {
    pub map_surface_size: Vec2,
    pub world_plane_size: Vec2,
    /// World-space anchor the world plane is measured from.
    pub map_center: Vec3,
    pub initial_scale: f32,
    pub zoom: ZoomConfig,
}

impl Default for MinimapConfig {
    fn default() -> Self {
        Self {
            map_surface_size: DEFAULT_MAP_SURFACE_SIZE,
            world_plane_size: DEFAULT_WORLD_PLANE_SIZE,
            map_center: Vec3::ZERO,
            initial_scale: DEFAULT_INITIAL_SCALE,
            zoom: ZoomConfig::default(),
        }
    }
}

impl MinimapConfig {
    pub fn load(path: &Path) -> Result<Self, ConfigLoadError> {
        let raw = fs::read_to_string(path).map_err(|source| ConfigLoadError::ReadFile {
            path: path.to_path_buf(),
            source,
        })?;
        let config = Self::from_json_str(&raw).map_err(|error| ConfigLoadError::Parse {
            path: path.to_path_buf(),
            field_path: error.path().to_string(),
            source: error.into_inner(),
        })?;
        config
            .validate()
            .map_err(|source| ConfigLoadError::Invalid {
                path: path.to_path_buf(),
                source,
            })?;
        Ok(config)
    }

    pub fn from_json_str(
        raw: &str,
    ) -> Result<Self, serde_path_to_error::Error<serde_json::Error>> {
        let mut deserializer = serde_json::Deserializer::from_str(raw);
        serde_path_to_error::deserialize(&mut deserializer)
    }

    pub fn validate(&self) -> Result<(), InvalidConfiguration> {
        let world = self.world_plane_size;
        if !(world.x.is_finite() && world.y.is_finite() && world.x > 0.0 && world.y > 0.0) {
            return Err(InvalidConfiguration::WorldPlaneSize {
                width: world.x,
                height: world.y,
            });
        }

        let map = self.map_surface_size;
        if !(map.is_finite() && map.x >= 0.0 && map.y >= 0.0) {
            return Err(InvalidConfiguration::MapSurfaceSize {
                width: map.x,
                height: map.y,
            });
        }

        if !self.map_center.is_finite() {
            return Err(InvalidConfiguration::MapCenter {
                x: self.map_center.x,
                y: self.map_center.y,
                z: self.map_center.z,
            });
        }

        if !self.initial_scale.is_finite() {
            return Err(InvalidConfiguration::InitialScale {
                scale: self.initial_scale,
            });
        }

        self.zoom.validate()
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;

    #[test]
    fn default_config_is_valid() {
        assert!(MinimapConfig::default().validate().is_ok());
    }

    #[test]
    fn rejects_zero_world_plane_component() {
        let config = MinimapConfig {
            world_plane_size: Vec2::new(100.0, 0.0),
            ..MinimapConfig::default()
        };
        assert_eq!(
            config.validate(),
            Err(InvalidConfiguration::WorldPlaneSize {
                width: 100.0,
                height: 0.0
            })
        );
    }

    #[test]
    fn rejects_negative_or_nan_world_plane() {
        for size in [Vec2::new(-1.0, 10.0), Vec2::new(10.0, f32::NAN)] {
            let config = MinimapConfig {
                world_plane_size: size,
                ..MinimapConfig::default()
            };
            assert!(
                matches!(
                    config.validate(),
                    Err(InvalidConfiguration::WorldPlaneSize { .. })
                ),
                "size={size:?}"
            );
        }
    }

    #[test]
    fn partial_json_falls_back_to_defaults() {
        let raw = r#"{ "world_plane_size": { "x": 50.0, "y": 80.0 } }"#;
        let config = MinimapConfig::from_json_str(raw).expect("parse");
        assert_eq!(config.world_plane_size, Vec2::new(50.0, 80.0));
        assert_eq!(config.map_surface_size, DEFAULT_MAP_SURFACE_SIZE);
        assert_eq!(config.zoom, ZoomConfig::default());
    }

    #[test]
    fn parse_error_reports_field_path() {
        let error = MinimapConfig::from_json_str(r#"{ "zoom": { "speed": "fast" } }"#)
            .expect_err("speed must be a number");
        assert_eq!(error.path().to_string(), "zoom.speed");
    }

    #[test]
    fn load_reads_and_validates_file() {
        let mut file = tempfile::NamedTempFile::new().expect("temp file");
        write!(
            file,
            r#"{{ "map_surface_size": {{ "x": 300.0, "y": 150.0 }}, "zoom": {{ "min_scale": 0.5 }} }}"#
        )
        .expect("write config");

        let config = MinimapConfig::load(file.path()).expect("load");
        assert_eq!(config.map_surface_size, Vec2::new(300.0, 150.0));
        assert!((config.zoom.min_scale - 0.5).abs() < 0.0001);
    }

    #[test]
    fn load_surfaces_validation_failure() {
        let mut file = tempfile::NamedTempFile::new().expect("temp file");
        write!(file, r#"{{ "world_plane_size": {{ "x": 0.0, "y": 10.0 }} }}"#)
            .expect("write config");

        let error = MinimapConfig::load(file.path()).expect_err("zero width");
        assert!(matches!(
            error,
            ConfigLoadError::Invalid {
                source: InvalidConfiguration::WorldPlaneSize { .. },
                ..
            }
        ));
    }

    #[test]
    fn load_missing_file_is_read_error() {
        let dir = tempfile::tempdir().expect("temp dir");
        let error = MinimapConfig::load(&dir.path().join("missing.json")).expect_err("missing");
        assert!(matches!(error, ConfigLoadError::ReadFile { .. }));
    }
}
