use nalgebra::Vector3;
use serde::Deserialize;
use tracing::debug;

use crate::error::{FusionError, Result};
use crate::skeleton::SkeletonRecord;

/// フィッティングエンジンに渡す (首, 頭) の位置ヒント。
///
/// 頭がちょうどゼロベクトルのヒントは「前回の選択なし」を意味する。
/// 原点に実在する人物とは区別できないが、その曖昧さはそのまま残している。
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Hint {
    pub neck: Vector3<f32>,
    pub head: Vector3<f32>,
}

impl Hint {
    pub fn new(neck: Vector3<f32>, head: Vector3<f32>) -> Self {
        Self { neck, head }
    }

    /// 前回選択なし (0,0,0)/(0,0,0)
    pub fn none() -> Self {
        Self::new(Vector3::zeros(), Vector3::zeros())
    }

    pub fn is_none(&self) -> bool {
        self.head == Vector3::zeros()
    }
}

impl Default for Hint {
    fn default() -> Self {
        Self::none()
    }
}

/// 候補選択のヒューリスティック
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SelectionMode {
    /// 前回ヒントがなければ最もセンサーに近い人物、あれば前回位置に最も近い人物
    #[default]
    Auto,
    /// 常に最もセンサーに近い人物。
    ///
    /// 設定で明示したときだけ使う。前回ヒントによる cold / warm の切り替えを無効にし、
    /// 追跡中でも毎サイクル cold 選択を行うため、人物の継続性は保たれない。
    Nearest,
}

/// 追跡中スロットから1人を選ぶ。
///
/// - cold (前回の頭がゼロ): 頭の z が最小のスロット
/// - warm: 前回の頭とのL1距離が最小のスロット
///
/// 同値の場合はスロット番号の小さい方。追跡中のスロットがなければ `NoCandidate`。
pub fn select_hint(records: &[SkeletonRecord], previous: &Hint, mode: SelectionMode) -> Result<Hint> {
    let cold = mode == SelectionMode::Nearest || previous.is_none();

    let slot = if cold {
        argmin_tracked(records, |r| r.head().z)
    } else {
        argmin_tracked(records, |r| (r.head() - previous.head).lp_norm(1))
    }
    .ok_or(FusionError::NoCandidate)?;

    let record = &records[slot];
    debug!(slot, cold, "hint candidate selected");
    Ok(Hint::new(record.neck(), record.head()))
}

/// 追跡中レコードのうち key 最小のスロット。先に見つかった方を優先する
fn argmin_tracked<F>(records: &[SkeletonRecord], key: F) -> Option<usize>
where
    F: Fn(&SkeletonRecord) -> f32,
{
    let mut best: Option<(usize, f32)> = None;
    for (slot, record) in records.iter().enumerate() {
        if !record.is_tracked() {
            continue;
        }
        let value = key(record);
        match best {
            Some((_, smallest)) if value >= smallest => {}
            _ => best = Some((slot, value)),
        }
    }
    best.map(|(slot, _)| slot)
}
