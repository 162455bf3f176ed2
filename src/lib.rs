pub mod config;
pub mod device;
pub mod engine;
pub mod error;
pub mod frame;
pub mod recorder;
pub mod session;
pub mod skeleton;
pub mod tracker;

pub use error::{FusionError, Result};
pub use session::{CycleReport, FaceOutputs, Session, SessionContext};
