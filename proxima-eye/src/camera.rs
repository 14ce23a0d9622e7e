//! Camera producer feeding the frame handoff

use crate::error::VisionError;
use crate::frame::Frame;
use crate::handoff::FrameHandoff;
use async_trait::async_trait;
use parking_lot::RwLock;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{mpsc, watch};
use tracing::{error, info, warn};

/// A camera or any other continuous frame producer.
///
/// `start` opens the device (checking permissions as needed) and returns a
/// stream of frames in delivery order.
#[async_trait]
pub trait FrameSource: Send + Sync {
    async fn start(&self) -> Result<mpsc::Receiver<Frame>, VisionError>;

    fn stop(&self);

    fn name(&self) -> &str;
}

/// Producer lifecycle as seen by the presentation layer
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CameraStatus {
    Idle,
    Streaming,
    /// Terminal: the device could not be opened or its stream died
    Unavailable(String),
    Stopped,
}

/// Forwards every frame from a [`FrameSource`] into the handoff.
///
/// Runs independently of the inference loop; a slow model never backs up
/// into the producer because the handoff overwrites instead of blocking.
pub struct CameraFeed {
    source: Arc<dyn FrameSource>,
    handoff: Arc<FrameHandoff>,
    status: watch::Sender<CameraStatus>,
}

impl CameraFeed {
    pub fn new(source: Arc<dyn FrameSource>, handoff: Arc<FrameHandoff>) -> Self {
        let (status, _) = watch::channel(CameraStatus::Idle);
        Self {
            source,
            handoff,
            status,
        }
    }

    pub fn status(&self) -> CameraStatus {
        self.status.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<CameraStatus> {
        self.status.subscribe()
    }

    pub fn spawn(self: Arc<Self>, is_running: Arc<RwLock<bool>>) -> tokio::task::JoinHandle<()> {
        tokio::spawn(async move { self.run(is_running).await })
    }

    /// Pump frames until `is_running` turns false or the source fails.
    pub async fn run(&self, is_running: Arc<RwLock<bool>>) {
        let mut frames = match self.source.start().await {
            Ok(rx) => rx,
            Err(e) => {
                error!("Camera '{}' unavailable: {}", self.source.name(), e);
                self.status.send_replace(CameraStatus::Unavailable(e.to_string()));
                return;
            }
        };

        self.status.send_replace(CameraStatus::Streaming);
        info!("Camera '{}' streaming", self.source.name());

        loop {
            let running = *is_running.read();
            if !running {
                break;
            }

            // Bounded wait so a silent camera still observes stop.
            match tokio::time::timeout(Duration::from_millis(100), frames.recv()).await {
                Ok(Some(frame)) => {
                    self.handoff.put(frame);
                }
                Ok(None) => {
                    let running = *is_running.read();
                    if running {
                        warn!("Camera '{}' stream ended unexpectedly", self.source.name());
                        self.status.send_replace(CameraStatus::Unavailable(
                            "Camera stream ended".to_string(),
                        ));
                        self.source.stop();
                        return;
                    }
                    break;
                }
                Err(_) => continue,
            }
        }

        self.source.stop();
        self.status.send_replace(CameraStatus::Stopped);
        info!("Camera '{}' stopped", self.source.name());
    }
}
