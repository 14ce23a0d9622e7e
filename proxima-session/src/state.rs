//! State published to the presentation layer

use image::GrayImage;
use proxima_core::{DangerLevel, FeedbackCategory};
use std::sync::Arc;
use tokio::sync::watch;

pub const PROMPT_TEXT: &str = "Point the camera straight ahead";
pub const MODEL_READY_TEXT: &str = "Depth model loaded";
pub const CAMERA_UNAVAILABLE_TEXT: &str = "Camera unavailable";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionStatus {
    Idle,
    /// Running, but the depth model has not finished loading
    LoadingModel,
    Running,
    /// The depth model failed to load; no readings will arrive
    ModelUnavailable(String),
    /// Terminal: the camera could not be opened or stopped delivering
    Unavailable(String),
    Stopped,
}

/// Snapshot observed by the presentation layer
#[derive(Debug, Clone)]
pub struct ProximityState {
    pub status: SessionStatus,
    pub model_ready: bool,
    /// Raw central reading of the last successful inference
    pub depth_value: f32,
    pub danger_level: DangerLevel,
    pub category: FeedbackCategory,
    pub feedback_text: String,
    /// Only filled while debug mode is on
    pub depth_preview: Option<Arc<GrayImage>>,
    /// Successful readings published so far
    pub readings: u64,
}

impl Default for ProximityState {
    fn default() -> Self {
        Self {
            status: SessionStatus::Idle,
            model_ready: false,
            depth_value: 0.0,
            danger_level: DangerLevel::CLEAR,
            category: FeedbackCategory::Clear,
            feedback_text: PROMPT_TEXT.to_string(),
            depth_preview: None,
            readings: 0,
        }
    }
}

/// Single writer, many observers. Observers only ever read.
#[derive(Debug)]
pub struct StatePublisher {
    sender: watch::Sender<ProximityState>,
}

impl Default for StatePublisher {
    fn default() -> Self {
        Self::new()
    }
}

impl StatePublisher {
    pub fn new() -> Self {
        let (sender, _) = watch::channel(ProximityState::default());
        Self { sender }
    }

    pub fn subscribe(&self) -> watch::Receiver<ProximityState> {
        self.sender.subscribe()
    }

    pub fn current(&self) -> ProximityState {
        self.sender.borrow().clone()
    }

    pub fn update(&self, modify: impl FnOnce(&mut ProximityState)) {
        self.sender.send_modify(modify);
    }
}
