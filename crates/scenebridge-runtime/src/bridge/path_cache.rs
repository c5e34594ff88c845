//! Parsed path cache.
//!
//! Interest queries run the same handful of paths on every emission, so
//! parsed expressions are kept by source text.

use scenebridge_object::{PathError, PathExpression};
use std::collections::HashMap;
use std::sync::Arc;

/// Entries kept before the cache starts over.
const MAX_CACHED_PATHS: usize = 1024;

#[derive(Debug, Default)]
pub(crate) struct PathCache {
    parsed: HashMap<String, Arc<PathExpression>>,
}

impl PathCache {
    /// Returns the parsed form of `text`, parsing it on first use.
    ///
    /// Parse failures are not cached.
    pub(crate) fn get(&mut self, text: &str) -> Result<Arc<PathExpression>, PathError> {
        if let Some(expr) = self.parsed.get(text) {
            return Ok(Arc::clone(expr));
        }
        let expr = Arc::new(PathExpression::parse(text)?);
        if self.parsed.len() >= MAX_CACHED_PATHS {
            self.parsed.clear();
        }
        self.parsed.insert(text.to_string(), Arc::clone(&expr));
        Ok(expr)
    }

    pub(crate) fn len(&self) -> usize {
        self.parsed.len()
    }
}

/// Joins a subject path and a member path.
pub(crate) fn join_path(subject: &str, path: &str) -> String {
    match (subject.is_empty(), path.is_empty()) {
        (true, _) => path.to_string(),
        (false, true) => subject.to_string(),
        (false, false) => format!("{subject}/{path}"),
    }
}
