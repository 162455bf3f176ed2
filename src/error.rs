use thiserror::Error;

use crate::frame::Modality;

pub type Result<T> = std::result::Result<T, FusionError>;

/// フュージョンコアのエラー
///
/// 毎サイクルの処理で発生するもの（データなし、破損フレーム、候補なし、エンジン失敗）は
/// 呼び出し側で握りつぶしてよい。初期化時の設定エラーのみ呼び出し元まで伝播させる。
#[derive(Error, Debug)]
pub enum FusionError {
    /// デバイスに新しいデータがない
    #[error("no new {modality} data from device")]
    NoData { modality: Modality },

    /// pitch=0 のフレーム
    #[error("corrupt {modality} frame: zero pitch reported by device")]
    CorruptFrame { modality: Modality },

    #[error("no new skeleton frame from device")]
    NoSkeletonFrame,

    #[error("no tracked skeleton candidate")]
    NoCandidate,

    #[error("face engine failure: {message}")]
    Engine { message: String },

    /// 焦点距離テーブルにない解像度
    #[error("unsupported {modality} resolution {width}x{height}")]
    UnsupportedResolution {
        modality: Modality,
        width: u32,
        height: u32,
    },

    #[error("sensor device unavailable: {reason}")]
    DeviceUnavailable { reason: String },

    #[error("frame size mismatch: {src_width}x{src_height} -> {dst_width}x{dst_height}")]
    SizeMismatch {
        src_width: u32,
        src_height: u32,
        dst_width: u32,
        dst_height: u32,
    },

    #[error("invalid configuration: {0}")]
    Config(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Image(#[from] image::ImageError),
}

impl FusionError {
    pub fn engine(message: impl Into<String>) -> Self {
        Self::Engine {
            message: message.into(),
        }
    }

    /// サイクル内で回復可能なエラーか
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            Self::NoData { .. }
                | Self::CorruptFrame { .. }
                | Self::NoSkeletonFrame
                | Self::NoCandidate
                | Self::Engine { .. }
        )
    }
}
