//! 顔モデルのフィッティングエンジンとの境界。
//!
//! エンジン本体はこのクレートの外にあり、[`FaceEngine`] を実装して差し込む。
//! ハードウェアなしで動かすための最小実装として [`ProjectionEngine`] を同梱する。

pub mod camera;
pub mod projection;

pub use camera::{CameraConfig, COLOR_NOMINAL_FOCAL_LENGTH, DEPTH_NOMINAL_FOCAL_LENGTH};
pub use projection::ProjectionEngine;

use crate::error::Result;
use crate::frame::FrameBuffer;
use crate::tracker::Hint;

/// エンジンに渡す working バッファの組
#[derive(Debug, Clone, Copy)]
pub struct SensorInput<'a> {
    pub color: &'a FrameBuffer,
    pub depth: &'a FrameBuffer,
}

/// カラー画像上の顔矩形 (ピクセル)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FaceRect {
    pub left: i32,
    pub top: i32,
    pub right: i32,
    pub bottom: i32,
}

impl FaceRect {
    pub fn new(left: i32, top: i32, right: i32, bottom: i32) -> Self {
        Self {
            left,
            top,
            right,
            bottom,
        }
    }

    pub fn center(&self) -> (f32, f32) {
        (
            (self.left + self.right) as f32 / 2.0,
            (self.top + self.bottom) as f32 / 2.0,
        )
    }
}

/// 頭部の3D姿勢
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct HeadPose {
    pub scale: f32,
    /// pitch, yaw, roll (度)
    pub rotation: [f32; 3],
    /// センサー座標 (メートル)
    pub translation: [f32; 3],
}

/// 直近のフィット結果のステータス
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FitStatus {
    Success,
    Failed,
}

impl FitStatus {
    pub fn is_success(self) -> bool {
        self == FitStatus::Success
    }
}

/// フィッティングエンジン
///
/// `start_tracking` / `continue_tracking` の戻り値は呼び出し自体の成否で、
/// フィットが成立したかは `status` で別に問い合わせる。
pub trait FaceEngine {
    fn configure(&mut self, color: &CameraConfig, depth: &CameraConfig) -> Result<()>;

    /// 前フレームを仮定せずにフィット
    fn start_tracking(&mut self, input: &SensorInput<'_>, hint: Option<&Hint>) -> Result<()>;

    /// 前フレームのフィットを引き継いで更新
    fn continue_tracking(&mut self, input: &SensorInput<'_>, hint: Option<&Hint>) -> Result<()>;

    fn status(&self) -> FitStatus;

    fn face_rect(&self) -> Option<FaceRect>;

    fn pose(&self) -> Result<HeadPose>;

    fn animation_units(&self) -> Result<Vec<f32>>;

    fn shape_units(&self) -> Result<Vec<f32>>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_face_rect_center() {
        let r = FaceRect::new(100, 50, 201, 150);
        assert_eq!(r.center(), (150.5, 100.0));
    }
}
