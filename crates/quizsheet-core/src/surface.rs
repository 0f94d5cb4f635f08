//! The host surface a typesetter writes into.
//!
//! Each option gets one [`Fragment`] keyed by its id. The presence of these
//! per-option markers is how the adaptive layout learns that typesetting has
//! finished, and the measurement step clones fragments from here rather than
//! invoking the typesetter again.

use std::collections::HashMap;
use std::sync::RwLock;

/// Typeset output for one option.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Fragment {
    /// Marker: the id of the option this fragment renders.
    pub option_id: String,
    /// Rendered label, e.g. `"A."`.
    pub label: String,
    /// Typeset body text.
    pub body: String,
    /// Whether `body` is a failure render (the raw source).
    pub failed: bool,
}

impl Fragment {
    pub fn new(
        option_id: impl Into<String>,
        label: impl Into<String>,
        body: impl Into<String>,
    ) -> Self {
        Self {
            option_id: option_id.into(),
            label: label.into(),
            body: body.into(),
            failed: false,
        }
    }

    /// A fragment showing the raw source after the typesetter failed.
    pub fn failure(
        option_id: impl Into<String>,
        label: impl Into<String>,
        source: impl Into<String>,
    ) -> Self {
        Self {
            failed: true,
            ..Self::new(option_id, label, source)
        }
    }
}

/// Read access to rendered option content.
///
/// Implemented by [`TypesetSurface`]; tests wrap it to observe probing.
pub trait RenderedContent: Send + Sync {
    /// The rendered fragment for an option, if its marker exists yet.
    fn fragment(&self, option_id: &str) -> Option<Fragment>;

    /// Returns `true` once every listed option has a marker.
    fn has_markers(&self, option_ids: &[String]) -> bool {
        option_ids.iter().all(|id| self.fragment(id).is_some())
    }
}

/// In-memory surface owned by one question's layout.
#[derive(Debug, Default)]
pub struct TypesetSurface {
    fragments: RwLock<HashMap<String, Fragment>>,
}

impl TypesetSurface {
    pub fn new() -> Self {
        Self::default()
    }

    /// Write (or replace) the fragment for an option.
    pub fn insert(&self, fragment: Fragment) {
        let mut fragments = self.fragments.write().unwrap_or_else(|e| e.into_inner());
        fragments.insert(fragment.option_id.clone(), fragment);
    }
}

impl RenderedContent for TypesetSurface {
    fn fragment(&self, option_id: &str) -> Option<Fragment> {
        self.fragments
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .get(option_id)
            .cloned()
    }
}
