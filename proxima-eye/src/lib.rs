//! proxima-eye: perception side of the proxima feedback loop
//!
//! Camera frames land in a single-slot [`FrameHandoff`]; the
//! [`InferenceScheduler`] drains it at a bounded rate, runs the depth model
//! and forwards each [`DepthMap`] to a sink. [`DepthReducer`] turns a map
//! into the central reading used for proximity feedback.

pub mod camera;
pub mod depth;
pub mod error;
pub mod frame;
pub mod handoff;
pub mod model;
pub mod scheduler;

pub use camera::{CameraFeed, CameraStatus, FrameSource};
pub use depth::{CentralReading, DepthEncoding, DepthMap, DepthReducer};
pub use error::VisionError;
pub use frame::Frame;
pub use handoff::FrameHandoff;
pub use model::{DepthModel, ModelSlot};
pub use scheduler::{DepthSink, InferenceScheduler, SchedulerStats};
