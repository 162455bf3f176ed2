use tracing::{debug, warn};

use super::{Modality, PixelFormat};
use crate::device::SensorDevice;
use crate::error::{FusionError, Result};

/// 固定解像度のピクセルバッファ
#[derive(Debug, Clone, PartialEq)]
pub struct FrameBuffer {
    width: u32,
    height: u32,
    format: PixelFormat,
    data: Vec<u8>,
    /// 書き込みのたびにインクリメント。0 なら未受信
    generation: u64,
}

impl FrameBuffer {
    /// ゼロ埋めで確保
    pub fn allocate(width: u32, height: u32, format: PixelFormat) -> Self {
        let len = width as usize * height as usize * format.bytes_per_pixel();
        Self {
            width,
            height,
            format,
            data: vec![0; len],
            generation: 0,
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn format(&self) -> PixelFormat {
        self.format
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.data
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// 一度でも書き込まれたか
    pub fn has_data(&self) -> bool {
        self.generation > 0
    }

    /// 画像の幾何中心 (ピクセル座標)
    pub fn center(&self) -> (f32, f32) {
        (self.width as f32 / 2.0, self.height as f32 / 2.0)
    }

    /// 先頭から min(自バッファ長, src長) バイトをコピーし、コピーしたバイト数を返す。
    /// 残りの領域は変更しない。
    pub fn fill_from(&mut self, src: &[u8]) -> usize {
        let n = self.data.len().min(src.len());
        self.data[..n].copy_from_slice(&src[..n]);
        self.generation += 1;
        n
    }

    /// 同一解像度・フォーマットのバッファへ全体をコピー
    pub fn copy_to(&self, dst: &mut FrameBuffer) -> Result<()> {
        if self.width != dst.width || self.height != dst.height || self.format != dst.format {
            return Err(FusionError::SizeMismatch {
                src_width: self.width,
                src_height: self.height,
                dst_width: dst.width,
                dst_height: dst.height,
            });
        }
        dst.data.copy_from_slice(&self.data);
        dst.generation = self.generation;
        Ok(())
    }
}

/// デバイスが書き込む live と、フィッティングエンジンが読む working の組
#[derive(Debug, Clone)]
pub struct FramePair {
    pub live: FrameBuffer,
    pub working: FrameBuffer,
}

impl FramePair {
    pub fn new(width: u32, height: u32, format: PixelFormat) -> Self {
        Self {
            live: FrameBuffer::allocate(width, height, format),
            working: FrameBuffer::allocate(width, height, format),
        }
    }
}

/// カラー・深度それぞれのダブルバッファ。
/// 2つの組は別フィールドで保持し、互いにエイリアスしない。
#[derive(Debug, Clone)]
pub struct FrameBuffers {
    color: FramePair,
    depth: FramePair,
}

impl FrameBuffers {
    pub fn new(color: (u32, u32), depth: (u32, u32)) -> Self {
        Self {
            color: FramePair::new(color.0, color.1, PixelFormat::for_modality(Modality::Color)),
            depth: FramePair::new(depth.0, depth.1, PixelFormat::for_modality(Modality::Depth)),
        }
    }

    pub fn pair(&self, modality: Modality) -> &FramePair {
        match modality {
            Modality::Color => &self.color,
            Modality::Depth => &self.depth,
        }
    }

    pub fn pair_mut(&mut self, modality: Modality) -> &mut FramePair {
        match modality {
            Modality::Color => &mut self.color,
            Modality::Depth => &mut self.depth,
        }
    }

    pub fn working(&self, modality: Modality) -> &FrameBuffer {
        &self.pair(modality).working
    }

    pub fn live(&self, modality: Modality) -> &FrameBuffer {
        &self.pair(modality).live
    }

    /// デバイスから最新フレームを live バッファに取り込む。
    ///
    /// 新しいデータがなければ `NoData`、pitch が 0 なら `CorruptFrame` を返し、
    /// どちらの場合も live バッファは前回のまま残る。
    pub fn acquire(&mut self, modality: Modality, device: &mut dyn SensorDevice) -> Result<usize> {
        let frame = match modality {
            Modality::Color => device.try_read_color_frame(),
            Modality::Depth => device.try_read_depth_frame(),
        }
        .ok_or(FusionError::NoData { modality })?;

        if frame.pitch == 0 {
            warn!(%modality, "Buffer length of received texture is bogus, frame skipped");
            return Err(FusionError::CorruptFrame { modality });
        }

        let live = &mut self.pair_mut(modality).live;
        if frame.data.len() > live.len() {
            debug!(
                %modality,
                reported = frame.data.len(),
                allocated = live.len(),
                "device frame larger than buffer, clipping"
            );
        }
        Ok(live.fill_from(&frame.data))
    }

    /// live → working へコピー
    pub fn publish(&mut self, modality: Modality) -> Result<()> {
        let pair = self.pair_mut(modality);
        pair.live.copy_to(&mut pair.working)
    }

    /// 静的画像を working バッファに直接書き込む（デバイスなしモード用）
    pub fn load_working(&mut self, modality: Modality, bytes: &[u8]) -> usize {
        self.pair_mut(modality).working.fill_from(bytes)
    }
}
