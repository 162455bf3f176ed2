use anyhow::Result;
use nalgebra::Vector3;
use std::time::{Duration, Instant};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use face_fusion::config::Config;
use face_fusion::device::{SensorDevice, SyntheticDevice};
use face_fusion::engine::{FaceEngine, ProjectionEngine};
use face_fusion::Session;

const CONFIG_PATH: &str = "config.toml";

fn main() -> Result<()> {
    let config_path = std::env::args().nth(1).unwrap_or_else(|| CONFIG_PATH.to_string());
    let config = Config::load_or_default(&config_path);

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.log.level)),
        )
        .with_target(false)
        .init();

    info!(version = env!("GIT_VERSION"), config = %config_path, "face_fusion");
    info!(
        color = ?config.session.color_resolution(),
        depth = ?config.session.depth_resolution(),
        selection = ?config.session.selection,
        device = %config.app.device,
        "settings"
    );

    let (device, engine): (Option<Box<dyn SensorDevice>>, Option<Box<dyn FaceEngine>>) =
        match config.app.device.as_str() {
            "synthetic" => {
                let device = SyntheticDevice::new(
                    config.session.color_resolution(),
                    config.session.depth_resolution(),
                )
                .with_frame_interval(2)
                .with_subject(0, Vector3::new(0.0, 0.35, 2.2), 0.3)
                .with_subject(3, Vector3::new(0.6, 0.3, 1.6), 0.1);
                (
                    Some(Box::new(device) as Box<dyn SensorDevice>),
                    Some(Box::new(ProjectionEngine::new()) as Box<dyn FaceEngine>),
                )
            }
            "none" => (None, None),
            other => {
                warn!(device = other, "unknown device, running without device");
                (None, None)
            }
        };

    let mut session = Session::new(&config, device, engine)?;
    match session.start_recording() {
        Ok(true) => info!("recording enabled"),
        Ok(false) => {}
        Err(e) => warn!(error = %e, "failed to start recording, continuing without it"),
    }

    let target_fps = config.app.target_fps.max(1);
    let frame_duration = Duration::from_secs_f64(1.0 / target_fps as f64);
    let deadline = Instant::now() + Duration::from_secs(config.app.duration_secs);

    let mut frame_count = 0u32;
    let mut tracked_count = 0u32;
    let mut fps_timer = Instant::now();

    while Instant::now() < deadline {
        let loop_start = Instant::now();

        let report = session.tick();
        frame_count += 1;
        if report.state.is_tracking() {
            tracked_count += 1;
        }

        // 1秒に1回
        let elapsed = fps_timer.elapsed().as_secs_f32();
        if elapsed >= 1.0 {
            let pose = &session.face().pose;
            info!(
                fps = %format!("{:.1}", frame_count as f32 / elapsed),
                tracked = %format!("{}/{}", tracked_count, frame_count),
                state = ?report.state,
                roi = %format!("({:.1}, {:.1})", report.roi.0, report.roi.1),
                translation = ?pose.translation,
                "status"
            );
            frame_count = 0;
            tracked_count = 0;
            fps_timer = Instant::now();
        }

        if let Some(rest) = frame_duration.checked_sub(loop_start.elapsed()) {
            std::thread::sleep(rest);
        }
    }

    if let Err(e) = session.stop_recording() {
        warn!(error = %e, "failed to stop recording");
    }
    info!("Shutting down...");
    Ok(())
}
