use nalgebra::Vector3;

use super::{DeviceFrame, SensorDevice};
use crate::frame::{Modality, PixelFormat};
use crate::skeleton::{SkeletonData, SkeletonFrame};

/// 合成被写体。頭は x 方向に正弦波で揺れる
#[derive(Debug, Clone, Copy)]
pub struct SyntheticSubject {
    pub slot: usize,
    pub head: Vector3<f32>,
    /// 揺れ幅 (メートル)
    pub sway: f32,
}

/// 決定的に動く合成センサー
///
/// 各ストリームは `frame_interval` 回の読み出しにつき1回だけデータを返す。
pub struct SyntheticDevice {
    color: (u32, u32),
    depth: (u32, u32),
    frame_interval: u32,
    subjects: Vec<SyntheticSubject>,
    color_polls: u64,
    depth_polls: u64,
    skeleton_polls: u64,
}

impl SyntheticDevice {
    pub fn new(color: (u32, u32), depth: (u32, u32)) -> Self {
        Self {
            color,
            depth,
            frame_interval: 1,
            subjects: Vec::new(),
            color_polls: 0,
            depth_polls: 0,
            skeleton_polls: 0,
        }
    }

    pub fn with_frame_interval(mut self, interval: u32) -> Self {
        self.frame_interval = interval.max(1);
        self
    }

    pub fn with_subject(mut self, slot: usize, head: Vector3<f32>, sway: f32) -> Self {
        self.subjects.push(SyntheticSubject { slot, head, sway });
        self
    }

    fn due(polls: &mut u64, interval: u32) -> Option<u64> {
        let n = *polls;
        *polls += 1;
        (n % interval as u64 == 0).then_some(n / interval as u64)
    }

    fn head_at(subject: &SyntheticSubject, t: u64) -> Vector3<f32> {
        let phase = t as f32 * 0.05;
        subject.head + Vector3::new(subject.sway * phase.sin(), 0.0, 0.0)
    }
}

impl SensorDevice for SyntheticDevice {
    fn try_read_color_frame(&mut self) -> Option<DeviceFrame> {
        let t = Self::due(&mut self.color_polls, self.frame_interval)?;
        let (w, h) = self.color;
        let bpp = PixelFormat::for_modality(Modality::Color).bytes_per_pixel();
        let mut data = vec![0u8; w as usize * h as usize * bpp];
        for (i, px) in data.chunks_exact_mut(bpp).enumerate() {
            let x = (i % w as usize) as u64;
            let y = (i / w as usize) as u64;
            px[0] = ((x + t) & 0xff) as u8;
            px[1] = (y & 0xff) as u8;
            px[2] = (t & 0xff) as u8;
            px[3] = 0xff;
        }
        Some(DeviceFrame::new(data, w * bpp as u32))
    }

    fn try_read_depth_frame(&mut self) -> Option<DeviceFrame> {
        Self::due(&mut self.depth_polls, self.frame_interval)?;
        let (w, h) = self.depth;
        // 2m、プレイヤーインデックス 0
        let raw = (2000u16 << 3).to_le_bytes();
        let data = raw.repeat(w as usize * h as usize);
        Some(DeviceFrame::new(data, w * 2))
    }

    fn try_read_skeleton_frame(&mut self) -> Option<SkeletonFrame> {
        let t = Self::due(&mut self.skeleton_polls, self.frame_interval)?;
        let slots: Vec<(usize, SkeletonData)> = self
            .subjects
            .iter()
            .map(|s| {
                let head = Self::head_at(s, t);
                let neck = head - Vector3::new(0.0, 0.25, 0.0);
                (s.slot, SkeletonData::with_head_and_neck(head, neck))
            })
            .collect();
        Some(SkeletonFrame::with_slots(&slots))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_frame_sizes() {
        let mut dev = SyntheticDevice::new((8, 4), (4, 2));
        let color = dev.try_read_color_frame().unwrap();
        assert_eq!(color.data.len(), 8 * 4 * 4);
        assert_eq!(color.pitch, 32);
        let depth = dev.try_read_depth_frame().unwrap();
        assert_eq!(depth.data.len(), 4 * 2 * 2);
        assert_eq!(u16::from_le_bytes([depth.data[0], depth.data[1]]) >> 3, 2000);
    }

    #[test]
    fn test_frame_interval_yields_gaps() {
        let mut dev = SyntheticDevice::new((2, 2), (2, 2)).with_frame_interval(3);
        let got: Vec<bool> = (0..6).map(|_| dev.try_read_color_frame().is_some()).collect();
        assert_eq!(got, vec![true, false, false, true, false, false]);
    }

    #[test]
    fn test_subjects_in_slots() {
        let mut dev = SyntheticDevice::new((2, 2), (2, 2))
            .with_subject(1, Vector3::new(0.0, 0.5, 1.5), 0.0)
            .with_subject(4, Vector3::new(0.3, 0.5, 2.5), 0.2);
        let frame = dev.try_read_skeleton_frame().unwrap();
        assert!(frame.skeletons[1].is_head_reliable());
        assert!(frame.skeletons[4].is_head_reliable());
        assert!(!frame.skeletons[0].is_head_reliable());
    }
}
