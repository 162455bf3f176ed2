//! センサーデバイスとの境界。
//!
//! 読み出しはすべてノンブロッキングで、新しいデータがないときは `None` を返す。
//! これは頻繁に起こる正常な結果でありエラーではない。

pub mod synthetic;

pub use synthetic::SyntheticDevice;

use crate::skeleton::SkeletonFrame;

/// デバイスから受け取った1フレーム分のバイト列
#[derive(Debug, Clone, PartialEq)]
pub struct DeviceFrame {
    /// デバイスが報告したバッファ。長さが確保済みバッファと一致する保証はない
    pub data: Vec<u8>,
    /// 1行あたりのバイト数。0 は破損フレーム
    pub pitch: u32,
}

impl DeviceFrame {
    pub fn new(data: Vec<u8>, pitch: u32) -> Self {
        Self { data, pitch }
    }
}

pub trait SensorDevice {
    fn try_read_color_frame(&mut self) -> Option<DeviceFrame>;

    fn try_read_depth_frame(&mut self) -> Option<DeviceFrame>;

    fn try_read_skeleton_frame(&mut self) -> Option<SkeletonFrame>;
}
