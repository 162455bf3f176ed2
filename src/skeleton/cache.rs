use nalgebra::Vector3;
use tracing::debug;

use super::joint::{JointIndex, SkeletonFrame, SKELETON_COUNT};
use crate::device::SensorDevice;
use crate::error::{FusionError, Result};

/// スロットごとの頭・首位置
///
/// 未追跡スロットの位置は常にゼロベクトル。前フレームの値は残さない。
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SkeletonRecord {
    head: Vector3<f32>,
    neck: Vector3<f32>,
    tracked: bool,
}

impl SkeletonRecord {
    pub fn tracked(head: Vector3<f32>, neck: Vector3<f32>) -> Self {
        Self {
            head,
            neck,
            tracked: true,
        }
    }

    pub fn untracked() -> Self {
        Self {
            head: Vector3::zeros(),
            neck: Vector3::zeros(),
            tracked: false,
        }
    }

    pub fn is_tracked(&self) -> bool {
        self.tracked
    }

    pub fn head(&self) -> Vector3<f32> {
        self.head
    }

    pub fn neck(&self) -> Vector3<f32> {
        self.neck
    }

    /// 追跡中なら (neck, head)
    pub fn positions(&self) -> Option<(Vector3<f32>, Vector3<f32>)> {
        self.tracked.then_some((self.neck, self.head))
    }
}

impl Default for SkeletonRecord {
    fn default() -> Self {
        Self::untracked()
    }
}

/// スロット単位のスケルトンキャッシュ。
///
/// インデックスはデバイスのスロット番号であり、サイクルをまたいで同じ人物を指す保証はない。
/// 人物の継続性は [`crate::tracker::select_hint`] が前回ヒントとの距離で扱う。
#[derive(Debug, Clone)]
pub struct SkeletonCache {
    records: [SkeletonRecord; SKELETON_COUNT],
    refreshed: u64,
}

impl SkeletonCache {
    pub fn new() -> Self {
        Self {
            records: [SkeletonRecord::untracked(); SKELETON_COUNT],
            refreshed: 0,
        }
    }

    /// デバイスからスケルトンフレームを1つ読み出して更新する。
    /// 読み出しに失敗した場合は前回のレコードをそのまま残す。
    pub fn refresh(&mut self, device: &mut dyn SensorDevice) -> Result<()> {
        let frame = device
            .try_read_skeleton_frame()
            .ok_or(FusionError::NoSkeletonFrame)?;
        self.apply(&frame);
        Ok(())
    }

    /// フレームを反映する。各スロットは独立に判定する。
    pub fn apply(&mut self, frame: &SkeletonFrame) {
        for (record, skeleton) in self.records.iter_mut().zip(frame.skeletons.iter()) {
            *record = if skeleton.is_head_reliable() {
                SkeletonRecord::tracked(
                    skeleton.get(JointIndex::Head).position,
                    skeleton.get(JointIndex::ShoulderCenter).position,
                )
            } else {
                SkeletonRecord::untracked()
            };
        }
        self.refreshed += 1;
        debug!(tracked = self.tracked_count(), "skeleton cache refreshed");
    }

    pub fn records(&self) -> &[SkeletonRecord; SKELETON_COUNT] {
        &self.records
    }

    pub fn get(&self, slot: usize) -> Option<&SkeletonRecord> {
        self.records.get(slot)
    }

    pub fn tracked_count(&self) -> usize {
        self.records.iter().filter(|r| r.is_tracked()).count()
    }

    /// 成功した refresh の回数
    pub fn refresh_count(&self) -> u64 {
        self.refreshed
    }
}

impl Default for SkeletonCache {
    fn default() -> Self {
        Self::new()
    }
}
