use std::collections::HashMap;
use std::process::ExitCode;
use std::time::Duration;

use minimap::{
    EntityId, MarkerPlacement, MarkerSink, Minimap, MinimapConfig, TrackingStatsAccumulator,
    VisualHandle,
};
use tracing::{error, info};

use super::bootstrap::{AppError, AppWiring};
use super::scenario::{Scenario, ScenarioWorld, FOCAL_ENTITY};

/// Stands in for the host UI: keeps the latest placement per widget.
#[derive(Debug, Default)]
pub(crate) struct RecordingSink {
    latest: HashMap<VisualHandle, MarkerPlacement>,
    writes: u64,
}

impl RecordingSink {
    pub(crate) fn latest(&self, visual: VisualHandle) -> Option<&MarkerPlacement> {
        self.latest.get(&visual)
    }

    pub(crate) fn writes(&self) -> u64 {
        self.writes
    }
}

impl MarkerSink for RecordingSink {
    fn place_marker(&mut self, visual: VisualHandle, placement: MarkerPlacement) {
        self.latest.insert(visual, placement);
        self.writes += 1;
    }
}

#[derive(Debug)]
pub(crate) struct SimulationSummary {
    pub frames: u32,
    pub final_scale: f32,
    pub zoom_toggles: u32,
    pub sink: RecordingSink,
}

pub(crate) fn run(app: AppWiring) -> ExitCode {
    match simulate(&app.config, &app.scenario) {
        Ok(summary) => {
            info!(
                frames = summary.frames,
                final_scale = summary.final_scale,
                zoom_toggles = summary.zoom_toggles,
                marker_writes = summary.sink.writes(),
                "simulation_finished"
            );
            for entity in &app.scenario.entities {
                let Some(visual) = Scenario::visual_for(entity) else {
                    continue;
                };
                if let Some(placement) = summary.sink.latest(visual) {
                    info!(
                        entity = entity.id,
                        x = placement.position.x,
                        y = placement.position.y,
                        rotation = placement.rotation_degrees,
                        scale = placement.scale,
                        "marker_final_placement"
                    );
                }
            }
            ExitCode::SUCCESS
        }
        Err(err) => {
            error!(error = %err, "simulation_failed");
            ExitCode::FAILURE
        }
    }
}

pub(crate) fn simulate(
    config: &MinimapConfig,
    scenario: &Scenario,
) -> Result<SimulationSummary, AppError> {
    scenario.validate()?;
    let mut minimap = Minimap::new(config, FOCAL_ENTITY)?;
    for entity in &scenario.entities {
        minimap.track(EntityId(entity.id), Scenario::visual_for(entity));
    }

    let mut world = ScenarioWorld::default();
    let mut sink = RecordingSink::default();
    let frame_dt = scenario.frame_duration()?;
    let mut stats = TrackingStatsAccumulator::new(scenario.stats_interval()?);
    let mut zoom_toggles = 0;

    for frame in 0..scenario.frames {
        world.step(scenario, frame);
        if scenario.zoom_toggle_every_frames > 0
            && frame > 0
            && frame % scenario.zoom_toggle_every_frames == 0
        {
            minimap.switch_zoom_direction();
            zoom_toggles += 1;
        }

        let report = minimap.advance_frame(
            scenario.delta_seconds,
            scenario.clamp_offset,
            world.poses(),
            &mut sink,
        );
        stats.record_frame(frame_dt, &report);
        if let Some(snapshot) = stats.maybe_snapshot() {
            info!(
                fps = snapshot.frames_per_second,
                avg_written = snapshot.avg_markers_written,
                avg_clamped = snapshot.avg_markers_clamped,
                skipped = snapshot.entities_skipped,
                focal_missing = snapshot.focal_missing_frames,
                scale = snapshot.scale,
                "minimap_stats"
            );
        }
    }

    Ok(SimulationSummary {
        frames: scenario.frames,
        final_scale: minimap.surface().scale,
        zoom_toggles,
        sink,
    })
}

#[cfg(test)]
mod tests {
    use minimap::{Vec2, Vec3};

    use super::*;
    use crate::app::scenario::{FocalPath, ScenarioEntity, ScenarioError};

    fn still_scenario(frames: u32) -> Scenario {
        Scenario {
            frames,
            delta_seconds: 0.1,
            clamp_offset: 50.0,
            zoom_toggle_every_frames: 0,
            stats_interval_seconds: 1.0,
            focal: FocalPath {
                center: Vec3::new(50.0, 0.0, 50.0),
                radius: 0.0,
                angular_speed_degrees: 0.0,
            },
            entities: vec![
                ScenarioEntity {
                    id: 1,
                    start: Vec3::new(200.0, 0.0, 50.0),
                    velocity: Vec3::ZERO,
                    visual: Some(11),
                    despawn_at_frame: None,
                },
                ScenarioEntity {
                    id: 2,
                    start: Vec3::new(50.0, 0.0, 0.0),
                    velocity: Vec3::ZERO,
                    visual: None,
                    despawn_at_frame: None,
                },
            ],
        }
    }

    #[test]
    fn default_simulation_runs_to_completion() {
        let summary =
            simulate(&MinimapConfig::default(), &Scenario::default()).expect("simulation");
        assert_eq!(summary.frames, 600);
        assert_eq!(summary.zoom_toggles, 3);
        let zoom = MinimapConfig::default().zoom;
        assert!(summary.final_scale >= zoom.min_scale && summary.final_scale <= zoom.max_scale);
        assert!(summary.sink.latest(VisualHandle(1)).is_some());
        assert!(summary.sink.latest(VisualHandle(4)).is_some());
    }

    #[test]
    fn far_marker_is_pinned_to_scaled_radius() {
        let summary = simulate(&MinimapConfig::default(), &still_scenario(20)).expect("simulation");

        // Zoom saturates at the max scale well before frame 20.
        assert!((summary.final_scale - 2.0).abs() < 0.0001);
        let placement = summary.sink.latest(VisualHandle(11)).expect("placement");
        assert!((placement.position.x - 25.0).abs() < 0.001);
        assert!((placement.rotation_degrees.expect("bearing") - 180.0).abs() < 0.001);
        assert!((placement.scale - 0.5).abs() < 0.0001);
        assert_eq!(summary.sink.writes(), 20);
    }

    #[test]
    fn oversized_delta_is_an_error_not_a_panic() {
        let scenario = Scenario {
            delta_seconds: 1.0e30,
            frames: 1,
            ..Scenario::default()
        };
        let error = simulate(&MinimapConfig::default(), &scenario).expect_err("oversized delta");
        assert!(matches!(
            error,
            AppError::Scenario(ScenarioError::InvalidDelta { .. })
        ));
    }

    #[test]
    fn invalid_config_fails_before_simulating() {
        let config = MinimapConfig {
            world_plane_size: Vec2::new(-5.0, 10.0),
            ..MinimapConfig::default()
        };
        let error = simulate(&config, &still_scenario(1)).expect_err("invalid");
        assert!(matches!(error, AppError::Minimap(_)));
    }
}
