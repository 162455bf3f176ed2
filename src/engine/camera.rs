use nalgebra::Vector3;

use crate::error::{FusionError, Result};
use crate::frame::{FrameBuffer, Modality};

/// カラーカメラ 640x480 の公称焦点距離 (ピクセル)
pub const COLOR_NOMINAL_FOCAL_LENGTH: f32 = 531.15;
/// 深度カメラ 320x240 の公称焦点距離 (ピクセル)
pub const DEPTH_NOMINAL_FOCAL_LENGTH: f32 = 285.63;

/// エンジンに渡すカメラ設定
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CameraConfig {
    pub width: u32,
    pub height: u32,
    pub focal_length: f32,
}

impl CameraConfig {
    /// 解像度→焦点距離テーブルから作成。テーブル外は `UnsupportedResolution`
    pub fn lookup(modality: Modality, width: u32, height: u32) -> Result<Self> {
        let focal_length = match (modality, width, height) {
            (Modality::Color, 640, 480) => COLOR_NOMINAL_FOCAL_LENGTH,
            (Modality::Color, 1280, 960) => COLOR_NOMINAL_FOCAL_LENGTH * 2.0,
            (Modality::Depth, 80, 60) => DEPTH_NOMINAL_FOCAL_LENGTH / 4.0,
            (Modality::Depth, 320, 240) => DEPTH_NOMINAL_FOCAL_LENGTH,
            (Modality::Depth, 640, 480) => DEPTH_NOMINAL_FOCAL_LENGTH * 2.0,
            _ => {
                return Err(FusionError::UnsupportedResolution {
                    modality,
                    width,
                    height,
                })
            }
        };
        Ok(Self {
            width,
            height,
            focal_length,
        })
    }

    pub fn for_frame(modality: Modality, frame: &FrameBuffer) -> Result<Self> {
        Self::lookup(modality, frame.width(), frame.height())
    }

    /// センサー座標 (x右, y上, z前方, メートル) をピクセル座標へ投影。
    /// z <= 0 なら None
    pub fn project(&self, point: &Vector3<f32>) -> Option<(f32, f32)> {
        if point.z <= 0.0 {
            return None;
        }
        let u = self.width as f32 / 2.0 + self.focal_length * point.x / point.z;
        let v = self.height as f32 / 2.0 - self.focal_length * point.y / point.z;
        Some((u, v))
    }

    pub fn contains(&self, u: f32, v: f32) -> bool {
        u >= 0.0 && v >= 0.0 && u < self.width as f32 && v < self.height as f32
    }
}
