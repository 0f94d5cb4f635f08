//! quizsheet-render: Page renderers for resolved question sheets.
//!
//! Both renderers produce the two-pane page frame: questions on the left,
//! a blank answer space on the right.

pub mod html;
pub mod text;

pub use html::{render_html, write_html, HtmlPageOptions};
pub use text::{render_text, TextPageOptions};
