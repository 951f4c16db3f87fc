//! Tag-set and free-text filtering over an in-memory mistake list.
//!
//! Shared by the client `MistakeStore` and `GET /api/mistakes`.

use crate::models::mistake::Mistake;

/// Selection criteria. Empty criteria match everything.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MistakeFilter {
    pub tag_ids: Vec<String>,
    pub query: String,
}

impl MistakeFilter {
    pub fn new(tag_ids: Vec<String>, query: impl Into<String>) -> Self {
        Self {
            tag_ids,
            query: query.into(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.tag_ids.is_empty() && self.query.is_empty()
    }

    /// A mistake passes when it carries any selected tag (if tags are
    /// selected) and the query occurs in any text field or tag name (if a
    /// query is set). Matching ignores case.
    pub fn matches(&self, mistake: &Mistake) -> bool {
        if !self.tag_ids.is_empty() && !mistake.has_any_tag(&self.tag_ids) {
            return false;
        }

        if self.query.is_empty() {
            return true;
        }

        let needle = self.query.to_lowercase();
        let contains = |text: &str| text.to_lowercase().contains(&needle);

        contains(&mistake.content)
            || contains(&mistake.correct_answer)
            || mistake.error_reason.as_deref().is_some_and(contains)
            || mistake.explanation.as_deref().is_some_and(contains)
            || mistake.tags.iter().any(|tag| contains(&tag.name))
    }

    /// Full rescan; keeps input order.
    pub fn apply(&self, mistakes: &[Mistake]) -> Vec<Mistake> {
        mistakes
            .iter()
            .filter(|mistake| self.matches(mistake))
            .cloned()
            .collect()
    }
}
