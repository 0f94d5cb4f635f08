//! Adaptive option layout for one question.
//!
//! A mounted layout goes through `Unmeasured → Measuring → Settled`. It first
//! polls the rendered content for per-option markers (the typesetter gives
//! no completion signal), a bounded number of times at a fixed interval. Once
//! the markers are present it measures, settles on a mode, and re-measures on
//! every viewport resize until it is unmounted.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;
use tokio::task::JoinHandle;

use crate::layout::{
    choose_mode, measure, LayoutMetrics, Measurement, MonospaceMeasurer, TextMeasurer,
};
use crate::model::{AnswerOption, LayoutMode};
use crate::surface::RenderedContent;

/// Delay between two marker probes.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(100);

/// Number of marker probes before giving up.
pub const DEFAULT_MAX_POLL_ATTEMPTS: u32 = 10;

/// Tuning for one adaptive layout instance.
#[derive(Debug, Clone, PartialEq)]
pub struct AdaptiveConfig {
    /// Delay between marker probes.
    pub poll_interval: Duration,
    /// Probes before giving up.
    pub max_poll_attempts: u32,
    /// Fixed spacing used when measuring.
    pub metrics: LayoutMetrics,
}

impl Default for AdaptiveConfig {
    fn default() -> Self {
        Self {
            poll_interval: DEFAULT_POLL_INTERVAL,
            max_poll_attempts: DEFAULT_MAX_POLL_ATTEMPTS,
            metrics: LayoutMetrics::default(),
        }
    }
}

/// Where a layout is in its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum LayoutState {
    /// Markers not seen yet (or never will be).
    Unmeasured,
    /// A measurement pass is running.
    Measuring { previous: Option<LayoutMode> },
    /// The last measurement picked `mode` for `container_width`.
    Settled {
        mode: LayoutMode,
        container_width: f32,
        measurement: Measurement,
    },
}

impl LayoutState {
    /// The mode to render right now.
    ///
    /// Single until the first measurement, then the last settled mode.
    pub fn displayed_mode(&self) -> LayoutMode {
        match self {
            LayoutState::Unmeasured => LayoutMode::default(),
            LayoutState::Measuring { previous } => previous.unwrap_or_default(),
            LayoutState::Settled { mode, .. } => *mode,
        }
    }

    pub fn is_settled(&self) -> bool {
        matches!(self, LayoutState::Settled { .. })
    }

    pub fn measurement(&self) -> Option<Measurement> {
        match self {
            LayoutState::Settled { measurement, .. } => Some(*measurement),
            _ => None,
        }
    }
}

/// The container width and its resize events.
///
/// Cloning shares the same viewport.
#[derive(Debug, Clone)]
pub struct Viewport {
    width: Arc<watch::Sender<f32>>,
}

impl Viewport {
    pub fn new(width: f32) -> Self {
        let (tx, _rx) = watch::channel(width);
        Self { width: Arc::new(tx) }
    }

    /// Current container width.
    pub fn width(&self) -> f32 {
        *self.width.borrow()
    }

    /// Change the width and notify every mounted layout.
    pub fn resize(&self, width: f32) {
        self.width.send_replace(width);
    }

    fn subscribe(&self) -> watch::Receiver<f32> {
        self.width.subscribe()
    }
}

/// Builder for one question's adaptive layout.
pub struct AdaptiveOptionLayout {
    options: Vec<AnswerOption>,
    content: Arc<dyn RenderedContent>,
    measurer: Arc<dyn TextMeasurer>,
    config: AdaptiveConfig,
}

impl AdaptiveOptionLayout {
    pub fn new(options: Vec<AnswerOption>, content: Arc<dyn RenderedContent>) -> Self {
        Self {
            options,
            content,
            measurer: Arc::new(MonospaceMeasurer::default()),
            config: AdaptiveConfig::default(),
        }
    }

    pub fn with_measurer(mut self, measurer: Arc<dyn TextMeasurer>) -> Self {
        self.measurer = measurer;
        self
    }

    pub fn with_config(mut self, config: AdaptiveConfig) -> Self {
        self.config = config;
        self
    }

    /// Start polling for markers and, once found, tracking `viewport`.
    ///
    /// Must be called from within a tokio runtime.
    pub fn mount(self, viewport: &Viewport) -> MountedLayout {
        let (state_tx, state_rx) = watch::channel(LayoutState::Unmeasured);
        let task = LayoutTask {
            option_ids: self.options.iter().map(|o| o.id.clone()).collect(),
            options: self.options,
            content: self.content,
            measurer: self.measurer,
            config: self.config,
            container: viewport.subscribe(),
            state: state_tx,
        };
        MountedLayout {
            state: state_rx,
            handle: tokio::spawn(task.run()),
        }
    }
}

struct LayoutTask {
    options: Vec<AnswerOption>,
    option_ids: Vec<String>,
    content: Arc<dyn RenderedContent>,
    measurer: Arc<dyn TextMeasurer>,
    config: AdaptiveConfig,
    container: watch::Receiver<f32>,
    state: watch::Sender<LayoutState>,
}

impl LayoutTask {
    async fn run(mut self) {
        if !self.wait_for_markers().await {
            tracing::warn!(
                "typeset markers for options {:?} not found after {} attempts",
                self.option_ids,
                self.config.max_poll_attempts
            );
            return;
        }

        loop {
            let width = *self.container.borrow_and_update();
            self.remeasure(width);
            if self.container.changed().await.is_err() {
                tracing::debug!("viewport dropped, layout stops tracking resizes");
                return;
            }
        }
    }

    async fn wait_for_markers(&self) -> bool {
        for attempt in 1..=self.config.max_poll_attempts {
            if self.content.has_markers(&self.option_ids) {
                tracing::debug!(attempt, "typeset markers found");
                return true;
            }
            if attempt < self.config.max_poll_attempts {
                tokio::time::sleep(self.config.poll_interval).await;
            }
        }
        false
    }

    fn remeasure(&self, container_width: f32) {
        let previous = match *self.state.borrow() {
            LayoutState::Settled { mode, .. } => Some(mode),
            _ => None,
        };
        self.state.send_replace(LayoutState::Measuring { previous });

        let measurement = measure(
            &self.options,
            self.content.as_ref(),
            self.measurer.as_ref(),
            &self.config.metrics,
        );
        let mode = choose_mode(&measurement, container_width);
        tracing::debug!(
            container_width,
            single = measurement.single_line_width,
            double = measurement.max_double_width,
            %mode,
            "measured options"
        );

        self.state.send_replace(LayoutState::Settled {
            mode,
            container_width,
            measurement,
        });
    }
}

/// A running layout. Dropping it unmounts.
#[derive(Debug)]
pub struct MountedLayout {
    state: watch::Receiver<LayoutState>,
    handle: JoinHandle<()>,
}

impl MountedLayout {
    /// Current state.
    pub fn state(&self) -> LayoutState {
        *self.state.borrow()
    }

    /// The mode to render right now.
    pub fn displayed_mode(&self) -> LayoutMode {
        self.state().displayed_mode()
    }

    /// Returns `true` while polling or tracking resizes.
    pub fn is_active(&self) -> bool {
        !self.handle.is_finished()
    }

    /// Wait until a measurement has settled, or until the layout stops
    /// (markers never appeared, or it was torn down).
    pub async fn settled(&mut self) -> LayoutState {
        self.wait_until(LayoutState::is_settled).await
    }

    /// Wait until the layout has settled for `width`.
    pub async fn wait_for_width(&mut self, width: f32) -> LayoutState {
        self.wait_until(|state| {
            matches!(
                state,
                LayoutState::Settled { container_width, .. } if *container_width == width
            )
        })
        .await
    }

    async fn wait_until(&mut self, done: impl Fn(&LayoutState) -> bool) -> LayoutState {
        loop {
            let current = *self.state.borrow_and_update();
            if done(&current) {
                return current;
            }
            if self.state.changed().await.is_err() {
                return *self.state.borrow();
            }
        }
    }

    /// Stop polling and detach from the viewport.
    pub fn unmount(self) {
        self.handle.abort();
    }
}

impl Drop for MountedLayout {
    fn drop(&mut self) {
        self.handle.abort();
    }
}
