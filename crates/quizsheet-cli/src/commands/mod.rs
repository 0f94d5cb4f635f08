pub mod init;
pub mod layout;
pub mod render;
pub mod validate;

use std::sync::Arc;

use quizsheet_core::config::QuizsheetConfig;
use quizsheet_core::layout::MonospaceMeasurer;
use quizsheet_core::tex::UnicodeTypesetter;
use quizsheet_core::SheetLayout;

/// Sheet layout driven by the built-in typesetter and terminal columns.
pub(crate) fn sheet_layout(config: &QuizsheetConfig) -> SheetLayout {
    SheetLayout::new(
        Arc::new(UnicodeTypesetter::new(config.typeset.clone())),
        Arc::new(MonospaceMeasurer::default()),
        config.adaptive(),
    )
}
