pub mod buffer;

pub use buffer::{FrameBuffer, FrameBuffers, FramePair};

use std::fmt;

/// 画像ストリームの種別
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Modality {
    Color,
    Depth,
}

impl Modality {
    pub const ALL: [Modality; 2] = [Modality::Color, Modality::Depth];
}

impl fmt::Display for Modality {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Modality::Color => f.write_str("color"),
            Modality::Depth => f.write_str("depth"),
        }
    }
}

/// ピクセルフォーマット
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PixelFormat {
    /// 8bit B,G,R,X
    Bgrx8,
    /// 13bit 深度 + 3bit プレイヤーインデックス
    Depth13P3,
}

impl PixelFormat {
    pub fn bytes_per_pixel(self) -> usize {
        match self {
            PixelFormat::Bgrx8 => 4,
            PixelFormat::Depth13P3 => 2,
        }
    }

    pub fn for_modality(modality: Modality) -> Self {
        match modality {
            Modality::Color => PixelFormat::Bgrx8,
            Modality::Depth => PixelFormat::Depth13P3,
        }
    }
}
