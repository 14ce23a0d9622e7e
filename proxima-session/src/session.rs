//! Session lifecycle and per-reading feedback

use crate::error::SessionError;
use crate::state::{
    ProximityState, SessionStatus, StatePublisher, CAMERA_UNAVAILABLE_TEXT, MODEL_READY_TEXT,
};
use parking_lot::{Mutex, RwLock};
use proxima_core::{ProximityClassifier, ProximityConfig};
use proxima_eye::{
    CameraFeed, CameraStatus, DepthMap, DepthModel, DepthReducer, DepthSink, FrameHandoff,
    FrameSource, InferenceScheduler, ModelSlot, SchedulerStats, VisionError,
};
use proxima_hpt::{HapticDevice, HapticDriver};
use std::future::Future;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};

/// Turns each depth map into a published reading and a haptic update.
struct FeedbackSink {
    reducer: DepthReducer,
    classifier: ProximityClassifier,
    publisher: Arc<StatePublisher>,
    haptics: Arc<HapticDriver>,
    debug_mode: Arc<AtomicBool>,
    is_running: Arc<RwLock<bool>>,
    skipped: AtomicU64,
}

impl DepthSink for FeedbackSink {
    fn deliver(&self, map: DepthMap) {
        let running = *self.is_running.read();
        if !running {
            return;
        }

        let preview = if self.debug_mode.load(Ordering::Relaxed) {
            map.render_preview().map(Arc::new)
        } else {
            None
        };

        let Some(reading) = self.reducer.central_depth(&map) else {
            self.skipped.fetch_add(1, Ordering::Relaxed);
            debug!(
                "No central reading ({}x{}, {:?}), skipping cycle",
                map.width(),
                map.height(),
                map.encoding()
            );
            if preview.is_some() {
                self.publisher.update(|state| state.depth_preview = preview);
            }
            return;
        };

        let (level, category) = self.classifier.classify(reading.value);
        debug!(
            "Central depth {:.3} over {} samples -> level {} ({})",
            reading.value, reading.samples, level, category
        );

        self.publisher.update(|state| {
            state.depth_value = reading.value;
            state.danger_level = level;
            state.category = category;
            state.feedback_text = category.message().to_string();
            state.readings += 1;
            if preview.is_some() {
                state.depth_preview = preview;
            }
        });

        self.haptics.update(level);
    }
}

/// One camera-to-haptics feedback session.
///
/// `start` spawns the camera feed and the inference loop on the current
/// tokio runtime; `stop` halts both and silences the haptics. Results of
/// inferences still in flight at stop are discarded.
pub struct ProximitySession {
    config: ProximityConfig,
    handoff: Arc<FrameHandoff>,
    model: Arc<ModelSlot>,
    camera: Arc<CameraFeed>,
    scheduler: Arc<InferenceScheduler>,
    haptics: Arc<HapticDriver>,
    publisher: Arc<StatePublisher>,
    sink: Arc<FeedbackSink>,
    debug_mode: Arc<AtomicBool>,
    is_running: Arc<RwLock<bool>>,
    /// Reason of the last failed model load, until a model is installed
    model_failure: Mutex<Option<String>>,
    tasks: Mutex<Vec<JoinHandle<()>>>,
}

impl ProximitySession {
    pub fn new(
        config: ProximityConfig,
        source: Arc<dyn FrameSource>,
        device: Arc<dyn HapticDevice>,
    ) -> Result<Self, SessionError> {
        config.validate()?;

        let handoff = Arc::new(FrameHandoff::new());
        let model = Arc::new(ModelSlot::new());
        let publisher = Arc::new(StatePublisher::new());
        let haptics = Arc::new(HapticDriver::new(&config.haptics, device));
        let debug_mode = Arc::new(AtomicBool::new(config.debug_mode));
        let is_running = Arc::new(RwLock::new(false));

        let sink = Arc::new(FeedbackSink {
            reducer: DepthReducer::new(config.region_size),
            classifier: ProximityClassifier::new(config.calibration),
            publisher: publisher.clone(),
            haptics: haptics.clone(),
            debug_mode: debug_mode.clone(),
            is_running: is_running.clone(),
            skipped: AtomicU64::new(0),
        });

        let scheduler = Arc::new(InferenceScheduler::new(
            config.scheduler.clone(),
            handoff.clone(),
            model.clone(),
            sink.clone(),
        ));
        let camera = Arc::new(CameraFeed::new(source, handoff.clone()));

        Ok(Self {
            config,
            handoff,
            model,
            camera,
            scheduler,
            haptics,
            publisher,
            sink,
            debug_mode,
            is_running,
            model_failure: Mutex::new(None),
            tasks: Mutex::new(Vec::new()),
        })
    }

    pub fn config(&self) -> &ProximityConfig {
        &self.config
    }

    /// Make `model` available to the inference loop right away
    pub fn install_model(&self, model: Arc<dyn DepthModel>) {
        self.model.install(model);
        self.model_failure.lock().take();
        self.publisher.update(|state| {
            state.model_ready = true;
            match state.status {
                SessionStatus::Unavailable(_) | SessionStatus::Stopped => return,
                SessionStatus::LoadingModel | SessionStatus::ModelUnavailable(_) => {
                    let running = *self.is_running.read();
                    state.status = if running {
                        SessionStatus::Running
                    } else {
                        SessionStatus::Idle
                    };
                }
                SessionStatus::Idle | SessionStatus::Running => {}
            }
            state.feedback_text = MODEL_READY_TEXT.to_string();
        });
    }

    /// Load the depth model in the background. Inference is skipped until
    /// `loader` resolves.
    pub fn load_model<F>(self: &Arc<Self>, loader: F) -> JoinHandle<()>
    where
        F: Future<Output = Result<Arc<dyn DepthModel>, VisionError>> + Send + 'static,
    {
        let session = Arc::clone(self);
        tokio::spawn(async move {
            match loader.await {
                Ok(model) => session.install_model(model),
                Err(e) => {
                    error!("Depth model failed to load: {}", e);
                    let reason = e.to_string();
                    *session.model_failure.lock() = Some(reason.clone());
                    session.publisher.update(|state| {
                        if matches!(
                            state.status,
                            SessionStatus::Idle | SessionStatus::LoadingModel
                        ) {
                            state.status = SessionStatus::ModelUnavailable(reason);
                        }
                    });
                }
            }
        })
    }

    pub fn start(&self) -> Result<(), SessionError> {
        {
            let mut is_running = self.is_running.write();
            if *is_running {
                return Err(SessionError::AlreadyRunning);
            }
            *is_running = true;
        }

        info!("Starting proximity session");
        let status = if self.model.is_ready() {
            SessionStatus::Running
        } else if let Some(reason) = self.model_failure.lock().clone() {
            SessionStatus::ModelUnavailable(reason)
        } else {
            SessionStatus::LoadingModel
        };
        self.publisher.update(|state| state.status = status);

        let mut tasks = self.tasks.lock();
        tasks.push(self.spawn_camera_watch());
        tasks.push(self.camera.clone().spawn(self.is_running.clone()));
        tasks.push(self.scheduler.clone().spawn(self.is_running.clone()));
        Ok(())
    }

    /// Mirror camera failures into the published status
    fn spawn_camera_watch(&self) -> JoinHandle<()> {
        let mut camera_status = self.camera.subscribe();
        let publisher = self.publisher.clone();
        tokio::spawn(async move {
            while camera_status.changed().await.is_ok() {
                let status = camera_status.borrow_and_update().clone();
                match status {
                    CameraStatus::Unavailable(reason) => {
                        warn!("Session unavailable: {}", reason);
                        publisher.update(|state| {
                            state.status = SessionStatus::Unavailable(reason);
                            state.feedback_text = CAMERA_UNAVAILABLE_TEXT.to_string();
                        });
                        break;
                    }
                    CameraStatus::Stopped => break,
                    CameraStatus::Idle | CameraStatus::Streaming => {}
                }
            }
        })
    }

    /// Halt both loops and silence the haptics.
    pub async fn stop(&self) {
        {
            let mut is_running = self.is_running.write();
            if !*is_running {
                return;
            }
            *is_running = false;
        }

        let tasks: Vec<_> = self.tasks.lock().drain(..).collect();
        for mut handle in tasks {
            if tokio::time::timeout(Duration::from_secs(1), &mut handle)
                .await
                .is_err()
            {
                warn!("Session task did not stop in time, aborting");
                handle.abort();
            }
        }

        self.haptics.stop();
        self.handoff.clear();
        self.publisher.update(|state| {
            if !matches!(state.status, SessionStatus::Unavailable(_)) {
                state.status = SessionStatus::Stopped;
            }
        });
        info!("Proximity session stopped");
    }

    pub fn is_running(&self) -> bool {
        *self.is_running.read()
    }

    pub fn subscribe(&self) -> tokio::sync::watch::Receiver<ProximityState> {
        self.publisher.subscribe()
    }

    pub fn state(&self) -> ProximityState {
        self.publisher.current()
    }

    /// Toggle the depth preview. Turning it off drops the last preview.
    pub fn set_debug_mode(&self, enabled: bool) {
        self.debug_mode.store(enabled, Ordering::Relaxed);
        if !enabled {
            self.publisher.update(|state| state.depth_preview = None);
        }
    }

    pub fn debug_mode(&self) -> bool {
        self.debug_mode.load(Ordering::Relaxed)
    }

    pub fn scheduler_stats(&self) -> SchedulerStats {
        self.scheduler.stats()
    }

    /// Frames superseded in the handoff before inference could take them
    pub fn frames_overwritten(&self) -> u64 {
        self.handoff.overwritten()
    }

    /// Depth maps that yielded no central reading
    pub fn readings_skipped(&self) -> u64 {
        self.sink.skipped.load(Ordering::Relaxed)
    }
}
