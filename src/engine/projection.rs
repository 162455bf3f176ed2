use nalgebra::Vector3;

use super::{CameraConfig, FaceEngine, FaceRect, FitStatus, HeadPose, SensorInput};
use crate::error::{FusionError, Result};
use crate::tracker::Hint;

/// 顔の横幅の目安 (メートル)
const FACE_WIDTH_M: f32 = 0.2;
const ANIMATION_UNIT_COUNT: usize = 6;
const SHAPE_UNIT_COUNT: usize = 11;

struct Fit {
    rect: FaceRect,
    head: Vector3<f32>,
    neck: Vector3<f32>,
}

/// ヒントの頭位置をカラーカメラに投影するだけの最小エンジン
///
/// ヒントがあり、投影した顔中心が画像内に収まるときだけフィット成功とする。
/// 継続要求は直前のフィットが成功しているときのみ受け付ける。
pub struct ProjectionEngine {
    color: Option<CameraConfig>,
    last: Option<Fit>,
}

impl ProjectionEngine {
    pub fn new() -> Self {
        Self {
            color: None,
            last: None,
        }
    }

    fn fit(&mut self, input: &SensorInput<'_>, hint: Option<&Hint>) -> Result<()> {
        self.last = None;
        let camera = self
            .color
            .ok_or_else(|| FusionError::engine("engine not configured"))?;
        if !input.color.has_data() {
            return Err(FusionError::engine("no color frame available"));
        }

        let Some(hint) = hint else {
            return Ok(());
        };
        let Some((u, v)) = camera.project(&hint.head) else {
            return Ok(());
        };
        if !camera.contains(u, v) {
            return Ok(());
        }

        let half = 0.5 * camera.focal_length * FACE_WIDTH_M / hint.head.z;
        let rect = FaceRect::new(
            (u - half).round() as i32,
            (v - half).round() as i32,
            (u + half).round() as i32,
            (v + half).round() as i32,
        );
        self.last = Some(Fit {
            rect,
            head: hint.head,
            neck: hint.neck,
        });
        Ok(())
    }
}

impl Default for ProjectionEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl FaceEngine for ProjectionEngine {
    fn configure(&mut self, color: &CameraConfig, _depth: &CameraConfig) -> Result<()> {
        self.color = Some(*color);
        self.last = None;
        Ok(())
    }

    fn start_tracking(&mut self, input: &SensorInput<'_>, hint: Option<&Hint>) -> Result<()> {
        self.fit(input, hint)
    }

    fn continue_tracking(&mut self, input: &SensorInput<'_>, hint: Option<&Hint>) -> Result<()> {
        if self.last.is_none() {
            return Err(FusionError::engine("continue requested without a previous fit"));
        }
        self.fit(input, hint)
    }

    fn status(&self) -> FitStatus {
        if self.last.is_some() {
            FitStatus::Success
        } else {
            FitStatus::Failed
        }
    }

    fn face_rect(&self) -> Option<FaceRect> {
        self.last.as_ref().map(|f| f.rect)
    }

    fn pose(&self) -> Result<HeadPose> {
        let fit = self
            .last
            .as_ref()
            .ok_or_else(|| FusionError::engine("no fit result"))?;

        // 首→頭ベクトルの傾きから pitch / roll
        let up = fit.head - fit.neck;
        let pitch = f32::atan2(-up.z, up.y).to_degrees();
        let roll = f32::atan2(-up.x, up.y).to_degrees();
        Ok(HeadPose {
            scale: 1.0,
            rotation: [pitch, 0.0, roll],
            translation: [fit.head.x, fit.head.y, fit.head.z],
        })
    }

    fn animation_units(&self) -> Result<Vec<f32>> {
        match self.last {
            Some(_) => Ok(vec![0.0; ANIMATION_UNIT_COUNT]),
            None => Err(FusionError::engine("no fit result")),
        }
    }

    fn shape_units(&self) -> Result<Vec<f32>> {
        match self.last {
            Some(_) => Ok(vec![0.0; SHAPE_UNIT_COUNT]),
            None => Err(FusionError::engine("no fit result")),
        }
    }
}
