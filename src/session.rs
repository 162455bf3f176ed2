//! 1サイクル分の更新処理と、サイクルをまたいで保持するセッション状態。
//!
//! 各段は自分の失敗を自分で吸収するため、途中の段が失敗しても後続の段は必ず実行される。
//! 初期化時の解像度エラーだけが呼び出し元に返る。

use image::imageops::FilterType;
use std::path::Path;
use tracing::{debug, info, warn};

use crate::config::Config;
use crate::device::SensorDevice;
use crate::engine::{CameraConfig, FaceEngine, HeadPose, SensorInput};
use crate::error::{FusionError, Result};
use crate::frame::{FrameBuffer, FrameBuffers, Modality};
use crate::recorder::Recorder;
use crate::skeleton::SkeletonCache;
use crate::tracker::{
    select_hint, FitRequest, Hint, RoiSmoother, SelectionMode, TrackingState, TrackingStateMachine,
};

/// 追跡成功時にエンジンから取り出す値。取得に失敗した項目は前回値のまま
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FaceOutputs {
    pub pose: HeadPose,
    pub animation_units: Vec<f32>,
    pub shape_units: Vec<f32>,
}

impl FaceOutputs {
    fn refresh(&mut self, engine: &dyn FaceEngine) {
        match engine.shape_units() {
            Ok(su) => self.shape_units = su,
            Err(e) => warn!(error = %e, "Couldn't get the shape units of the face model"),
        }
        match engine.pose() {
            Ok(pose) => self.pose = pose,
            Err(e) => warn!(error = %e, "Couldn't get the 3D pose of the face model"),
        }
        match engine.animation_units() {
            Ok(au) => self.animation_units = au,
            Err(e) => warn!(error = %e, "Couldn't get the animation units of the face model"),
        }
    }
}

/// サイクルをまたいで持ち越す状態
#[derive(Debug, Clone)]
pub struct SessionContext {
    pub tracking: TrackingStateMachine,
    /// 前回選択したヒント。選択に失敗したサイクルでは更新しない
    pub hint: Hint,
    pub roi: RoiSmoother,
    pub face: FaceOutputs,
    pub selection: SelectionMode,
}

impl SessionContext {
    pub fn new(color_frame: &FrameBuffer, roi_gain: f32, selection: SelectionMode) -> Self {
        Self {
            tracking: TrackingStateMachine::new(),
            hint: Hint::none(),
            roi: RoiSmoother::for_frame(color_frame, roi_gain),
            face: FaceOutputs::default(),
            selection,
        }
    }
}

/// 1サイクルの結果
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CycleReport {
    /// デバイスなしモードでは None
    pub request: Option<FitRequest>,
    pub state: TrackingState,
    /// このサイクルでエンジンに渡したヒント
    pub hint: Option<Hint>,
    pub roi: (f32, f32),
}

struct Hardware {
    device: Box<dyn SensorDevice>,
    engine: Box<dyn FaceEngine>,
}

/// 追跡セッション
pub struct Session {
    frames: FrameBuffers,
    skeletons: SkeletonCache,
    hardware: Option<Hardware>,
    /// デバイスなしモードで起動した理由
    unavailable: Option<FusionError>,
    context: SessionContext,
    recorder: Option<Recorder>,
}

impl Session {
    /// セッションを初期化する。
    ///
    /// 解像度がテーブルにない場合はエラー。デバイスかエンジンがない、またはエンジンの
    /// 初期化に失敗した場合はデバイスなしモードで起動し、エラーにはしない。
    pub fn new(
        config: &Config,
        device: Option<Box<dyn SensorDevice>>,
        engine: Option<Box<dyn FaceEngine>>,
    ) -> Result<Self> {
        let s = &config.session;
        let mut frames = FrameBuffers::new(s.color_resolution(), s.depth_resolution());
        let color_config =
            CameraConfig::for_frame(Modality::Color, frames.working(Modality::Color))?;
        let depth_config =
            CameraConfig::for_frame(Modality::Depth, frames.working(Modality::Depth))?;

        let (hardware, unavailable) = match (device, engine) {
            (Some(device), Some(mut engine)) => match engine.configure(&color_config, &depth_config) {
                Ok(()) => (Some(Hardware { device, engine }), None),
                Err(e) => {
                    let reason = format!("face engine initialization failed: {e}");
                    (None, Some(device_unavailable(reason)))
                }
            },
            (None, _) => (None, Some(device_unavailable("no sensor device"))),
            (Some(_), None) => (None, Some(device_unavailable("no face engine"))),
        };

        if let Some(e) = &unavailable {
            warn!(error = %e, "running without device");
            if let Some(path) = &s.fallback_image {
                if let Err(e) = load_fallback_image(&mut frames, path) {
                    warn!(path = %path.display(), error = %e, "failed to load fallback image");
                }
            }
        }

        let recorder = (hardware.is_some() && config.recorder.enabled)
            .then(|| Recorder::new(&config.recorder.path));

        let context = SessionContext::new(frames.working(Modality::Color), s.roi_gain, s.selection);

        info!(
            color = ?s.color_resolution(),
            depth = ?s.depth_resolution(),
            device = hardware.is_some(),
            "session initialized"
        );

        Ok(Self {
            frames,
            skeletons: SkeletonCache::new(),
            hardware,
            unavailable,
            context,
            recorder,
        })
    }

    /// デバイスなしのセッション
    pub fn offline(config: &Config) -> Result<Self> {
        Self::new(config, None, None)
    }

    /// 1サイクル分の更新
    pub fn tick(&mut self) -> CycleReport {
        let Self {
            frames,
            skeletons,
            hardware,
            context,
            ..
        } = self;

        let Some(hw) = hardware.as_mut() else {
            let roi = context.roi.update(false, None);
            return CycleReport {
                request: None,
                state: context.tracking.state(),
                hint: None,
                roi,
            };
        };

        for modality in Modality::ALL {
            if let Err(e) = frames.acquire(modality, hw.device.as_mut()) {
                log_cycle_error("acquire", &e);
            }
        }

        if let Err(e) = skeletons.refresh(hw.device.as_mut()) {
            log_cycle_error("skeleton", &e);
        }

        let mut published = true;
        for modality in Modality::ALL {
            if let Err(e) = frames.publish(modality) {
                log_cycle_error("publish", &e);
                published = false;
            }
        }

        let hint = match select_hint(skeletons.records(), &context.hint, context.selection) {
            Ok(hint) => {
                context.hint = hint;
                Some(hint)
            }
            Err(e) => {
                log_cycle_error("hint", &e);
                None
            }
        };

        let prev_state = context.tracking.state();
        let request = context.tracking.advance(hint.is_some());
        let input = SensorInput {
            color: frames.working(Modality::Color),
            depth: frames.working(Modality::Depth),
        };
        let call = if published {
            match request {
                FitRequest::ColdStart => hw.engine.start_tracking(&input, hint.as_ref()),
                FitRequest::Continue => hw.engine.continue_tracking(&input, hint.as_ref()),
            }
        } else {
            Err(FusionError::engine("working buffers unavailable"))
        };
        if let Err(e) = &call {
            log_cycle_error("fit", e);
        }
        let status_ok = call.is_ok() && hw.engine.status().is_success();
        let state = context.tracking.complete(call.is_ok(), status_ok);

        if state != prev_state {
            info!(from = ?prev_state, to = ?state, "tracking state changed");
        }

        let tracking = state.is_tracking();
        let rect = if tracking { hw.engine.face_rect() } else { None };
        let roi = context.roi.update(tracking, rect.as_ref());

        if tracking {
            context.face.refresh(hw.engine.as_ref());
        }

        CycleReport {
            request: Some(request),
            state,
            hint,
            roi,
        }
    }

    /// 記録を開始する。デバイスなし、または記録が無効なら false
    pub fn start_recording(&mut self) -> Result<bool> {
        match (&self.hardware, self.recorder.as_mut()) {
            (Some(_), Some(recorder)) => {
                recorder.start()?;
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    pub fn stop_recording(&mut self) -> Result<()> {
        if let Some(recorder) = self.recorder.as_mut() {
            recorder.stop()?;
        }
        Ok(())
    }

    pub fn is_recording(&self) -> bool {
        self.recorder.as_ref().is_some_and(Recorder::is_recording)
    }

    pub fn is_device_active(&self) -> bool {
        self.hardware.is_some()
    }

    /// デバイスなしモードの理由。デバイスが有効なら None
    pub fn unavailable_reason(&self) -> Option<&FusionError> {
        self.unavailable.as_ref()
    }

    pub fn context(&self) -> &SessionContext {
        &self.context
    }

    pub fn state(&self) -> TrackingState {
        self.context.tracking.state()
    }

    pub fn hint(&self) -> &Hint {
        &self.context.hint
    }

    /// 平滑化済みの顔中心
    pub fn roi(&self) -> (f32, f32) {
        self.context.roi.center()
    }

    pub fn face(&self) -> &FaceOutputs {
        &self.context.face
    }

    /// 描画側が読む working バッファ
    pub fn working(&self, modality: Modality) -> &FrameBuffer {
        self.frames.working(modality)
    }

    pub fn skeletons(&self) -> &SkeletonCache {
        &self.skeletons
    }
}

fn device_unavailable(reason: impl Into<String>) -> FusionError {
    FusionError::DeviceUnavailable {
        reason: reason.into(),
    }
}

/// サイクル内のエラーを記録する。回復できないものは warn
fn log_cycle_error(stage: &str, e: &FusionError) {
    if e.is_transient() {
        debug!(stage, error = %e, "cycle stage skipped");
    } else {
        warn!(stage, error = %e, "cycle stage failed");
    }
}

/// 静止画を読み込み、カラー解像度に合わせて BGRX で working バッファへ書き込む
fn load_fallback_image(frames: &mut FrameBuffers, path: &Path) -> Result<usize> {
    let target = frames.working(Modality::Color);
    let (w, h) = (target.width(), target.height());
    let rgba = image::open(path)?
        .resize_exact(w, h, FilterType::Triangle)
        .to_rgba8();

    let mut bgrx = Vec::with_capacity(rgba.as_raw().len());
    for px in rgba.pixels() {
        let [r, g, b, _] = px.0;
        bgrx.extend_from_slice(&[b, g, r, 0xff]);
    }
    let copied = frames.load_working(Modality::Color, &bgrx);
    info!(path = %path.display(), bytes = copied, "fallback image loaded");
    Ok(copied)
}
