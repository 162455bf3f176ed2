use nalgebra::Vector3;

/// スケルトンスロット数。スロットはデバイスが毎フレーム使い回すもので、人物IDではない
pub const SKELETON_COUNT: usize = 6;

/// 20 関節のインデックス
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(usize)]
pub enum JointIndex {
    HipCenter = 0,
    Spine = 1,
    ShoulderCenter = 2,
    Head = 3,
    ShoulderLeft = 4,
    ElbowLeft = 5,
    WristLeft = 6,
    HandLeft = 7,
    ShoulderRight = 8,
    ElbowRight = 9,
    WristRight = 10,
    HandRight = 11,
    HipLeft = 12,
    KneeLeft = 13,
    AnkleLeft = 14,
    FootLeft = 15,
    HipRight = 16,
    KneeRight = 17,
    AnkleRight = 18,
    FootRight = 19,
}

impl JointIndex {
    pub const COUNT: usize = 20;

    pub fn from_index(index: usize) -> Option<Self> {
        use JointIndex::*;
        #[rustfmt::skip]
        const ALL: [JointIndex; JointIndex::COUNT] = [
            HipCenter, Spine, ShoulderCenter, Head,
            ShoulderLeft, ElbowLeft, WristLeft, HandLeft,
            ShoulderRight, ElbowRight, WristRight, HandRight,
            HipLeft, KneeLeft, AnkleLeft, FootLeft,
            HipRight, KneeRight, AnkleRight, FootRight,
        ];
        ALL.get(index).copied()
    }
}

/// 関節単位の追跡状態
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum JointTrackingState {
    #[default]
    NotTracked,
    /// 他の関節から推定された位置
    Inferred,
    Tracked,
}

/// 人物単位の追跡状態
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SkeletonTrackingState {
    #[default]
    NotTracked,
    /// 重心位置のみ
    PositionOnly,
    Tracked,
}

/// 単一関節 (センサー座標系、メートル)
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Joint {
    pub position: Vector3<f32>,
    pub state: JointTrackingState,
}

impl Joint {
    pub fn new(position: Vector3<f32>, state: JointTrackingState) -> Self {
        Self { position, state }
    }

    pub fn is_tracked(&self) -> bool {
        self.state == JointTrackingState::Tracked
    }
}

impl Default for Joint {
    fn default() -> Self {
        Self {
            position: Vector3::zeros(),
            state: JointTrackingState::NotTracked,
        }
    }
}

/// デバイスが報告する1スロット分のスケルトン
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct SkeletonData {
    pub tracking_state: SkeletonTrackingState,
    pub joints: [Joint; JointIndex::COUNT],
}

impl SkeletonData {
    /// 頭と首（肩中央）だけが追跡済みのスケルトン
    pub fn with_head_and_neck(head: Vector3<f32>, neck: Vector3<f32>) -> Self {
        let mut skeleton = Self {
            tracking_state: SkeletonTrackingState::Tracked,
            ..Self::default()
        };
        skeleton.joints[JointIndex::Head as usize] = Joint::new(head, JointTrackingState::Tracked);
        skeleton.joints[JointIndex::ShoulderCenter as usize] =
            Joint::new(neck, JointTrackingState::Tracked);
        skeleton
    }

    pub fn get(&self, index: JointIndex) -> &Joint {
        &self.joints[index as usize]
    }

    /// 人物レベルと、頭・肩中央の両関節レベルがすべて Tracked のときのみ true
    pub fn is_head_reliable(&self) -> bool {
        self.tracking_state == SkeletonTrackingState::Tracked
            && self.get(JointIndex::Head).is_tracked()
            && self.get(JointIndex::ShoulderCenter).is_tracked()
    }
}

/// 1回の読み出しで得られる全スロット
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct SkeletonFrame {
    pub skeletons: [SkeletonData; SKELETON_COUNT],
}

impl SkeletonFrame {
    /// 指定スロットにだけスケルトンを置いたフレーム
    pub fn with_slots(slots: &[(usize, SkeletonData)]) -> Self {
        let mut frame = Self::default();
        for &(slot, skeleton) in slots {
            if let Some(s) = frame.skeletons.get_mut(slot) {
                *s = skeleton;
            }
        }
        frame
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_joint_index_count() {
        assert_eq!(JointIndex::COUNT, 20);
    }

    #[test]
    fn test_joint_index_from_index() {
        assert_eq!(JointIndex::from_index(2), Some(JointIndex::ShoulderCenter));
        assert_eq!(JointIndex::from_index(3), Some(JointIndex::Head));
        assert_eq!(JointIndex::from_index(19), Some(JointIndex::FootRight));
        assert_eq!(JointIndex::from_index(20), None);
    }

    #[test]
    fn test_head_reliable_requires_all_three_flags() {
        let head = Vector3::new(0.0, 0.5, 1.5);
        let neck = Vector3::new(0.0, 0.3, 1.5);
        let s = SkeletonData::with_head_and_neck(head, neck);
        assert!(s.is_head_reliable());

        let mut position_only = s;
        position_only.tracking_state = SkeletonTrackingState::PositionOnly;
        assert!(!position_only.is_head_reliable());

        let mut inferred_head = s;
        inferred_head.joints[JointIndex::Head as usize].state = JointTrackingState::Inferred;
        assert!(!inferred_head.is_head_reliable());

        let mut lost_neck = s;
        lost_neck.joints[JointIndex::ShoulderCenter as usize].state = JointTrackingState::NotTracked;
        assert!(!lost_neck.is_head_reliable());
    }

    #[test]
    fn test_with_slots_ignores_out_of_range() {
        let s = SkeletonData::with_head_and_neck(Vector3::new(0.0, 0.0, 1.0), Vector3::zeros());
        let frame = SkeletonFrame::with_slots(&[(1, s), (SKELETON_COUNT, s)]);
        assert!(frame.skeletons[1].is_head_reliable());
        assert!(!frame.skeletons[0].is_head_reliable());
    }
}
