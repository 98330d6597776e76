//! Application setup and the fixed-step frame loop.

use crate::capture::ThreadedCapturer;
use crate::input::{InputScript, WheelAdaptor};
use std::error::Error;
use std::path::PathBuf;
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};
use vignette_data::{builtin_scene_table, load_model, load_scene_table, primitives};
use vignette_stage::{EffectKind, FrameSnapshot, Stage, StageConfig};

/// Seconds the loop keeps running after the last scripted event.
const SETTLE_SECONDS: f32 = 1.0;

pub struct RunOptions {
    pub scenes: Option<PathBuf>,
    pub model: Option<PathBuf>,
    pub script: Option<PathBuf>,
    pub config: Option<PathBuf>,
    pub frames: Option<u64>,
    pub fps: u32,
    pub capture_latency_ms: u64,
    pub fail_captures: bool,
}

pub fn run(options: RunOptions) -> Result<(), Box<dyn Error>> {
    init_logging();

    let config = match &options.config {
        Some(path) => StageConfig::load(path)?,
        None => StageConfig::default(),
    };
    let scenes = match &options.scenes {
        Some(path) => load_scene_table(path)?,
        None => builtin_scene_table()?,
    };
    let model = match &options.model {
        Some(path) => load_model(path)?,
        None => {
            info!("No model given; using placeholder geometry");
            primitives::placeholder_model()
        }
    };
    let mut script = match &options.script {
        Some(path) => InputScript::load(path)?,
        None => InputScript::demo()?,
    };

    let fps = options.fps.max(1);
    let dt = 1.0 / fps as f32;
    let frames = options
        .frames
        .unwrap_or_else(|| default_frame_count(&script, &config, fps));

    info!(
        "Starting: {} scenes, {} meshes ({} vertices), {} scripted events, {} frames at {} fps",
        scenes.len(),
        model.meshes.len(),
        model.vertex_count(),
        script.len(),
        frames,
        fps
    );

    let mut wheel = WheelAdaptor::new(config.wheel_threshold);
    let mut capturer = ThreadedCapturer::new(
        Duration::from_millis(options.capture_latency_ms),
        options.fail_captures,
    );
    let mut stage = Stage::new(scenes, config)?;
    stage.begin(&mut capturer);
    stage.attach_model(&model);

    let frame_time = Duration::from_secs_f32(dt);
    let started = Instant::now();
    for frame in 0..frames {
        let frame_start = Instant::now();
        let time = frame as f32 * dt;

        for event in script.due(time) {
            debug!("t={:.2}s input {:?}", time, event);
            if let Some(input) = event.into_input(&mut wheel) {
                stage.handle(input, &mut capturer);
            }
        }
        stage.tick(dt, &mut capturer);

        let snapshot = stage.snapshot();
        if frame % fps as u64 == 0 {
            log_snapshot(&snapshot);
        } else {
            debug!(
                "frame {} camera {:?} flash {:.2}",
                snapshot.frame, snapshot.camera.position, snapshot.flash
            );
        }

        // Pace to wall clock so capture latency is felt like in a live app.
        if let Some(rest) = frame_time.checked_sub(frame_start.elapsed()) {
            std::thread::sleep(rest);
        }
    }

    let snapshot = stage.snapshot();
    log_snapshot(&snapshot);
    if snapshot.environment.is_none() {
        warn!("No environment was applied during the run");
    }
    info!(
        "Finished {} frames in {:.2}s, {} captures requested",
        frames,
        started.elapsed().as_secs_f32(),
        capturer.issued()
    );
    Ok(())
}

fn default_frame_count(script: &InputScript, config: &StageConfig, fps: u32) -> u64 {
    let transition = &config.transition;
    let span = match transition.flourish {
        Some(f) => f.rise + transition.duration.max(f.fall),
        None => transition.duration,
    };
    let seconds = script.duration() + span + SETTLE_SECONDS;
    (seconds * fps as f32).ceil() as u64
}

fn log_snapshot(snapshot: &FrameSnapshot<'_>) {
    let effects: Vec<&str> = snapshot
        .effects
        .iter()
        .filter(|(_, state)| state.enabled)
        .map(|(kind, _)| kind.name())
        .collect();
    let vertices: usize = snapshot.meshes.iter().map(|m| m.len()).sum();
    info!(
        "frame {} t={:.2}s scene '{}'{} rep {} ({} vertices) effects [{}] bloom {:.2} env {}",
        snapshot.frame,
        snapshot.elapsed,
        snapshot.scene_id,
        if snapshot.transitioning { " (moving)" } else { "" },
        snapshot.representation.map_or("none", |r| r.name()),
        vertices,
        effects.join(", "),
        snapshot
            .effects
            .param(EffectKind::Bloom, "strength")
            .unwrap_or(0.0),
        snapshot.environment.map_or("pending", |e| e.texture.as_str()),
    );
}

fn init_logging() {
    #[cfg(feature = "tracy")]
    {
        use tracing_subscriber::layer::SubscriberExt;
        use tracing_subscriber::util::SubscriberInitExt;
        use tracing_subscriber::Layer;
        tracing_subscriber::registry()
            .with(tracing_tracy::TracyLayer::default())
            .with(
                tracing_subscriber::fmt::layer().with_filter(
                    tracing_subscriber::EnvFilter::try_from_default_env()
                        .unwrap_or_else(|_| "info".into()),
                ),
            )
            .init();
    }

    #[cfg(not(feature = "tracy"))]
    {
        tracing_subscriber::fmt()
            .with_env_filter(
                tracing_subscriber::EnvFilter::try_from_default_env()
                    .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
            )
            .with_target(false)
            .init();
    }
}
