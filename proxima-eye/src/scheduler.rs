//! Rate-limited inference loop

use crate::depth::DepthMap;
use crate::handoff::FrameHandoff;
use crate::model::ModelSlot;
use parking_lot::RwLock;
use proxima_core::SchedulerConfig;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio::time::{sleep, Instant};
use tracing::{debug, info, trace, warn};

/// Receives every depth map the scheduler produces
pub trait DepthSink: Send + Sync {
    fn deliver(&self, map: DepthMap);
}

impl<F> DepthSink for F
where
    F: Fn(DepthMap) + Send + Sync,
{
    fn deliver(&self, map: DepthMap) {
        self(map)
    }
}

/// Point-in-time scheduler counters
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SchedulerStats {
    /// Frames pulled out of the handoff
    pub frames_taken: u64,
    /// Frames discarded because the previous inference was too recent
    pub frames_rate_limited: u64,
    /// Frames discarded because no model was loaded yet
    pub frames_model_not_ready: u64,
    /// Model invocations
    pub inferences: u64,
    /// Model invocations that returned an error
    pub inference_failures: u64,
    /// Results discarded because the loop was stopped mid-inference
    pub results_discarded: u64,
}

#[derive(Debug, Default)]
struct Counters {
    frames_taken: AtomicU64,
    frames_rate_limited: AtomicU64,
    frames_model_not_ready: AtomicU64,
    inferences: AtomicU64,
    inference_failures: AtomicU64,
    results_discarded: AtomicU64,
}

impl Counters {
    fn bump(counter: &AtomicU64) {
        counter.fetch_add(1, Ordering::Relaxed);
    }

    fn snapshot(&self) -> SchedulerStats {
        SchedulerStats {
            frames_taken: self.frames_taken.load(Ordering::Relaxed),
            frames_rate_limited: self.frames_rate_limited.load(Ordering::Relaxed),
            frames_model_not_ready: self.frames_model_not_ready.load(Ordering::Relaxed),
            inferences: self.inferences.load(Ordering::Relaxed),
            inference_failures: self.inference_failures.load(Ordering::Relaxed),
            results_discarded: self.results_discarded.load(Ordering::Relaxed),
        }
    }
}

/// Pulls the newest frame at a bounded rate and runs the depth model on it.
///
/// Camera rate and inference cost are decoupled: frames that arrive while
/// the previous inference is too recent are dropped, never queued. Only an
/// actual model invocation advances the rate-limit timer.
pub struct InferenceScheduler {
    config: SchedulerConfig,
    handoff: Arc<FrameHandoff>,
    model: Arc<ModelSlot>,
    sink: Arc<dyn DepthSink>,
    counters: Counters,
}

impl InferenceScheduler {
    pub fn new(
        config: SchedulerConfig,
        handoff: Arc<FrameHandoff>,
        model: Arc<ModelSlot>,
        sink: Arc<dyn DepthSink>,
    ) -> Self {
        Self {
            config,
            handoff,
            model,
            sink,
            counters: Counters::default(),
        }
    }

    pub fn stats(&self) -> SchedulerStats {
        self.counters.snapshot()
    }

    /// Spawn [`run`](Self::run) on the current tokio runtime
    pub fn spawn(self: Arc<Self>, is_running: Arc<RwLock<bool>>) -> tokio::task::JoinHandle<()> {
        tokio::spawn(async move { self.run(is_running).await })
    }

    /// Run until `is_running` turns false.
    ///
    /// The flag is checked at the top of every iteration and again after
    /// each model call; a result that completes after stop is dropped.
    pub async fn run(&self, is_running: Arc<RwLock<bool>>) {
        let poll_interval = self.config.poll_interval();
        let min_interval = self.config.min_inference_interval();
        let mut last_inference: Option<Instant> = None;

        info!(
            "Inference loop started (poll {:?}, min interval {:?})",
            poll_interval, min_interval
        );

        loop {
            let running = *is_running.read();
            if !running {
                break;
            }

            let Some(frame) = self.handoff.take() else {
                sleep(poll_interval).await;
                continue;
            };
            Counters::bump(&self.counters.frames_taken);

            let Some(model) = self.model.get() else {
                Counters::bump(&self.counters.frames_model_not_ready);
                trace!("Model not ready, dropping frame {}", frame.sequence());
                continue;
            };

            let now = Instant::now();
            if let Some(last) = last_inference {
                if now.duration_since(last) < min_interval {
                    Counters::bump(&self.counters.frames_rate_limited);
                    trace!("Rate limited, dropping frame {}", frame.sequence());
                    continue;
                }
            }

            last_inference = Some(now);
            Counters::bump(&self.counters.inferences);
            let result = model.estimate(&frame).await;
            let sequence = frame.sequence();
            drop(frame);

            let running = *is_running.read();
            if !running {
                Counters::bump(&self.counters.results_discarded);
                debug!("Discarding result for frame {} after stop", sequence);
                break;
            }

            match result {
                Ok(map) => self.sink.deliver(map),
                Err(e) => {
                    Counters::bump(&self.counters.inference_failures);
                    warn!("Depth inference failed for frame {}: {}", sequence, e);
                }
            }
        }

        info!("Inference loop stopped");
    }
}
