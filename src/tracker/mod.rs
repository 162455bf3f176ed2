pub mod hint;
pub mod roi;
pub mod state;

pub use hint::{select_hint, Hint, SelectionMode};
pub use roi::{RoiSmoother, DEFAULT_ROI_GAIN};
pub use state::{FitRequest, TrackingState, TrackingStateMachine};
