//! The question sheet container.
//!
//! Mounts one independent adaptive layout per question, drives the
//! typesetter for each, and collects what the page renderers need.

use std::sync::Arc;

use futures::future::join_all;
use tokio::task::JoinHandle;

use crate::adaptive::{
    AdaptiveConfig, AdaptiveOptionLayout, LayoutState, MountedLayout, Viewport,
};
use crate::layout::TextMeasurer;
use crate::model::{LayoutMode, Question, QuestionSheet};
use crate::surface::{Fragment, RenderedContent, TypesetSurface};
use crate::typeset::{spawn_typesetting, Typesetter};

/// One question after layout.
#[derive(Debug, Clone)]
pub struct ResolvedQuestion {
    /// 1-based question number.
    pub number: usize,
    pub question: Question,
    pub state: LayoutState,
    /// Typeset fragments in display order.
    pub fragments: Vec<Fragment>,
}

impl ResolvedQuestion {
    /// The mode to render this question in.
    pub fn mode(&self) -> LayoutMode {
        self.state.displayed_mode()
    }

    /// Heading shown above the options, e.g. "Question 2".
    pub fn heading(&self) -> String {
        format!("Question {}", self.number)
    }

    pub fn fragment(&self, option_id: &str) -> Option<&Fragment> {
        self.fragments.iter().find(|f| f.option_id == option_id)
    }
}

/// A whole sheet after layout.
#[derive(Debug, Clone)]
pub struct ResolvedSheet {
    pub title: String,
    /// Width of the option container the layouts were measured against.
    pub container_width: f32,
    pub questions: Vec<ResolvedQuestion>,
}

/// Lays out every question of a sheet.
pub struct SheetLayout {
    typesetter: Arc<dyn Typesetter>,
    measurer: Arc<dyn TextMeasurer>,
    config: AdaptiveConfig,
}

impl SheetLayout {
    pub fn new(
        typesetter: Arc<dyn Typesetter>,
        measurer: Arc<dyn TextMeasurer>,
        config: AdaptiveConfig,
    ) -> Self {
        Self {
            typesetter,
            measurer,
            config,
        }
    }

    /// Mount every question against `viewport` and start typesetting.
    pub fn mount(&self, sheet: &QuestionSheet, viewport: &Viewport) -> MountedSheet {
        let questions = sheet
            .questions
            .iter()
            .map(|question| {
                let surface = Arc::new(TypesetSurface::new());
                let typesetting = spawn_typesetting(
                    Arc::clone(&self.typesetter),
                    question.options.clone(),
                    Arc::clone(&surface),
                );
                let layout =
                    AdaptiveOptionLayout::new(question.options.clone(), surface.clone())
                        .with_measurer(Arc::clone(&self.measurer))
                        .with_config(self.config.clone())
                        .mount(viewport);
                MountedQuestion {
                    question: question.clone(),
                    surface,
                    typesetting,
                    layout,
                }
            })
            .collect();

        MountedSheet {
            title: sheet.title.clone(),
            viewport: viewport.clone(),
            questions,
        }
    }

    /// Mount, wait for every layout to settle at `container_width`, unmount.
    pub async fn resolve(&self, sheet: &QuestionSheet, container_width: f32) -> ResolvedSheet {
        let viewport = Viewport::new(container_width);
        let mut mounted = self.mount(sheet, &viewport);
        mounted.settled().await;
        let resolved = mounted.snapshot();
        mounted.unmount();
        resolved
    }
}

struct MountedQuestion {
    question: Question,
    surface: Arc<TypesetSurface>,
    typesetting: JoinHandle<()>,
    layout: MountedLayout,
}

/// Every question of a sheet, mounted and tracking one viewport.
pub struct MountedSheet {
    title: String,
    viewport: Viewport,
    questions: Vec<MountedQuestion>,
}

impl MountedSheet {
    /// Wait until every layout has settled or given up.
    pub async fn settled(&mut self) -> Vec<LayoutState> {
        join_all(self.questions.iter_mut().map(|q| q.layout.settled())).await
    }

    /// Resize the shared viewport and wait for every layout to re-measure.
    pub async fn resize(&mut self, width: f32) -> Vec<LayoutState> {
        self.viewport.resize(width);
        join_all(
            self.questions
                .iter_mut()
                .map(|q| q.layout.wait_for_width(width)),
        )
        .await
    }

    /// Current layouts and fragments.
    ///
    /// An option still being typeset shows its source text.
    pub fn snapshot(&self) -> ResolvedSheet {
        let questions = self
            .questions
            .iter()
            .enumerate()
            .map(|(index, q)| ResolvedQuestion {
                number: index + 1,
                question: q.question.clone(),
                state: q.layout.state(),
                fragments: q
                    .question
                    .options
                    .iter()
                    .map(|option| {
                        q.surface.fragment(&option.id).unwrap_or_else(|| {
                            Fragment::new(&option.id, option.label(), &option.text)
                        })
                    })
                    .collect(),
            })
            .collect();

        ResolvedSheet {
            title: self.title.clone(),
            container_width: self.viewport.width(),
            questions,
        }
    }

    /// Tear down every layout and any typesetting still in flight.
    pub fn unmount(self) {
        for q in self.questions {
            q.typesetting.abort();
            q.layout.unmount();
        }
    }
}
