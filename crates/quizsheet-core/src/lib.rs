//! quizsheet-core: Question model, typesetting seam, and adaptive layout.
//!
//! This crate defines the data model for question sheets, the trait through
//! which math typesetting is delegated, and the measurement-driven layout
//! that picks how each question's options are arranged.

pub mod adaptive;
pub mod arrange;
pub mod config;
pub mod error;
pub mod layout;
pub mod model;
pub mod parser;
pub mod sheet;
pub mod surface;
pub mod tex;
pub mod typeset;

pub use adaptive::{AdaptiveConfig, AdaptiveOptionLayout, LayoutState, MountedLayout, Viewport};
pub use config::{load_config_from, QuizsheetConfig};
pub use error::TypesetError;
pub use model::{AnswerOption, LayoutMode, Question, QuestionSheet};
pub use sheet::{ResolvedQuestion, ResolvedSheet, SheetLayout};
