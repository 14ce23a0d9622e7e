// Stand-in camera and depth model for running the loop without hardware

use async_trait::async_trait;
use bytes::Bytes;
use proxima_core::Calibration;
use proxima_eye::{DepthMap, DepthModel, Frame, FrameSource, VisionError};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::mpsc;
use tracing::{debug, info};

const FRAME_WIDTH: u32 = 64;
const FRAME_HEIGHT: u32 = 48;

/// Emits blank frames at a fixed rate
pub struct SyntheticCamera {
    fps: u32,
    stopped: Arc<AtomicBool>,
}

impl SyntheticCamera {
    pub fn new(fps: u32) -> Self {
        Self {
            fps: fps.max(1),
            stopped: Arc::new(AtomicBool::new(false)),
        }
    }
}

#[async_trait]
impl FrameSource for SyntheticCamera {
    async fn start(&self) -> Result<mpsc::Receiver<Frame>, VisionError> {
        let (tx, rx) = mpsc::channel(2);
        let period = Duration::from_secs(1) / self.fps;
        let stopped = self.stopped.clone();
        stopped.store(false, Ordering::SeqCst);
        info!("Synthetic camera running at {} fps", self.fps);

        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(period);
            let pixels = Bytes::from(vec![0u8; (FRAME_WIDTH * FRAME_HEIGHT * 4) as usize]);
            let mut sequence = 0u64;
            while !stopped.load(Ordering::SeqCst) {
                ticker.tick().await;
                sequence += 1;
                let frame = Frame::new(sequence, FRAME_WIDTH, FRAME_HEIGHT, pixels.clone());
                if tx.send(frame).await.is_err() {
                    break;
                }
            }
            debug!("Synthetic camera produced {} frames", sequence);
        });

        Ok(rx)
    }

    fn stop(&self) {
        self.stopped.store(true, Ordering::SeqCst);
    }

    fn name(&self) -> &str {
        "synthetic"
    }
}

/// Produces maps whose centre sweeps back and forth across the calibration
/// band, a little past both thresholds, over `period`.
pub struct SyntheticDepthModel {
    calibration: Calibration,
    period: Duration,
    width: usize,
    height: usize,
    started: Instant,
}

impl SyntheticDepthModel {
    pub fn new(calibration: Calibration, period: Duration) -> Self {
        Self {
            calibration,
            period,
            width: 160,
            height: 120,
            started: Instant::now(),
        }
    }

    /// Triangle wave over `[far - margin, near + margin]`
    pub fn central_value_at(&self, elapsed: Duration) -> f32 {
        let period = self.period.as_secs_f32().max(f32::EPSILON);
        let phase = (elapsed.as_secs_f32() % period) / period;
        let t = if phase < 0.5 { phase * 2.0 } else { 2.0 - phase * 2.0 };

        let low = self.calibration.far.min(self.calibration.near);
        let high = self.calibration.far.max(self.calibration.near);
        let margin = (high - low) * 0.25;
        (low - margin) + t * (high - low + 2.0 * margin)
    }

    fn render(&self, centre: f32) -> Result<DepthMap, VisionError> {
        let background = self.calibration.far.min(self.calibration.near) * 0.5;
        let (cx, cy) = (self.width / 2, self.height / 2);
        let mut samples = vec![background; self.width * self.height];
        for y in cy.saturating_sub(30)..(cy + 30).min(self.height) {
            for x in cx.saturating_sub(30)..(cx + 30).min(self.width) {
                samples[y * self.width + x] = centre;
            }
        }
        DepthMap::from_samples(self.width, self.height, &samples)
    }
}

#[async_trait]
impl DepthModel for SyntheticDepthModel {
    async fn estimate(&self, frame: &Frame) -> Result<DepthMap, VisionError> {
        let centre = self.central_value_at(self.started.elapsed());
        debug!("Synthetic depth for frame {}: {:.3}", frame.sequence(), centre);
        self.render(centre)
    }

    fn name(&self) -> &str {
        "synthetic"
    }
}
