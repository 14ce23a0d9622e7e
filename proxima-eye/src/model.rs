//! Depth model boundary and readiness slot

use crate::depth::DepthMap;
use crate::error::VisionError;
use crate::frame::Frame;
use async_trait::async_trait;
use parking_lot::RwLock;
use std::sync::Arc;
use tracing::info;

/// Monocular depth estimator: one frame in, one per-pixel map out.
///
/// Implementations backed by heavy CPU inference should move the work onto
/// `tokio::task::spawn_blocking` so the scheduler's runtime stays responsive.
#[async_trait]
pub trait DepthModel: Send + Sync {
    /// Estimate depth for `frame`
    async fn estimate(&self, frame: &Frame) -> Result<DepthMap, VisionError>;

    /// Model name, for logs
    fn name(&self) -> &str;
}

/// Holds the depth model once it has finished loading.
///
/// Empty while the model is still loading; the scheduler skips inference
/// until a model is installed.
#[derive(Default)]
pub struct ModelSlot {
    model: RwLock<Option<Arc<dyn DepthModel>>>,
}

impl ModelSlot {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_model(model: Arc<dyn DepthModel>) -> Self {
        Self {
            model: RwLock::new(Some(model)),
        }
    }

    pub fn install(&self, model: Arc<dyn DepthModel>) {
        info!("Depth model '{}' ready", model.name());
        *self.model.write() = Some(model);
    }

    pub fn clear(&self) {
        *self.model.write() = None;
    }

    pub fn get(&self) -> Option<Arc<dyn DepthModel>> {
        self.model.read().clone()
    }

    pub fn is_ready(&self) -> bool {
        self.model.read().is_some()
    }
}
