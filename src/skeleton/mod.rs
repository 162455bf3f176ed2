pub mod cache;
pub mod joint;

pub use cache::{SkeletonCache, SkeletonRecord};
pub use joint::{
    Joint, JointIndex, JointTrackingState, SkeletonData, SkeletonFrame, SkeletonTrackingState,
    SKELETON_COUNT,
};
