use serde::{Deserialize, Serialize};

use crate::config::InvalidConfiguration;

pub const ZOOM_SPEED_DEFAULT: f32 = 1.0;
pub const ZOOM_MIN_SCALE_DEFAULT: f32 = 1.0;
pub const ZOOM_MAX_SCALE_DEFAULT: f32 = 2.0;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ZoomConfig {
    /// Proportional scale change per second.
    pub speed: f32,
    pub min_scale: f32,
    pub max_scale: f32,
    /// Starting direction; flipped at runtime by the host.
    pub zoom_in: bool,
}

impl Default for ZoomConfig {
    fn default() -> Self {
        Self {
            speed: ZOOM_SPEED_DEFAULT,
            min_scale: ZOOM_MIN_SCALE_DEFAULT,
            max_scale: ZOOM_MAX_SCALE_DEFAULT,
            zoom_in: true,
        }
    }
}

impl ZoomConfig {
    pub fn validate(&self) -> Result<(), InvalidConfiguration> {
        if !(self.speed.is_finite() && self.speed >= 0.0) {
            return Err(InvalidConfiguration::ZoomSpeed { speed: self.speed });
        }
        let bounds_ok = self.min_scale.is_finite()
            && self.max_scale.is_finite()
            && self.min_scale > 0.0
            && self.min_scale <= self.max_scale;
        if !bounds_ok {
            return Err(InvalidConfiguration::ZoomBounds {
                min: self.min_scale,
                max: self.max_scale,
            });
        }
        Ok(())
    }

    pub fn clamp_scale(&self, scale: f32) -> f32 {
        scale.clamp(self.min_scale, self.max_scale)
    }
}

/// Smooth exponential zoom between fixed bounds.
#[derive(Debug, Clone)]
pub struct ZoomController {
    config: ZoomConfig,
    zoom_in: bool,
    scale: f32,
}

impl ZoomController {
    /// `config` must already be validated.
    pub fn new(config: ZoomConfig, initial_scale: f32) -> Self {
        Self {
            config,
            zoom_in: config.zoom_in,
            scale: config.clamp_scale(initial_scale),
        }
    }

    pub fn scale(&self) -> f32 {
        self.scale
    }

    pub fn config(&self) -> &ZoomConfig {
        &self.config
    }

    pub fn zoom_in(&self) -> bool {
        self.zoom_in
    }

    pub fn set_zoom_in(&mut self, zoom_in: bool) {
        self.zoom_in = zoom_in;
    }

    pub fn toggle_direction(&mut self) {
        self.zoom_in = !self.zoom_in;
    }

    /// Steps the scale by `speed * scale * dt` toward the current direction and
    /// clamps into bounds. Returns the new scale.
    pub fn advance(&mut self, delta_seconds: f32) -> f32 {
        let dt = if delta_seconds.is_finite() {
            delta_seconds.max(0.0)
        } else {
            0.0
        };
        let signed_speed = if self.zoom_in {
            self.config.speed
        } else {
            -self.config.speed
        };
        let next = self.scale + signed_speed * self.scale * dt;
        if next.is_finite() {
            self.scale = self.config.clamp_scale(next);
        }
        self.scale
    }
}
