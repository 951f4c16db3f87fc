use chrono::{DateTime, Utc};

use crate::models::mistake::Mistake;
use crate::models::tag::Tag;
use crate::services::filter::MistakeFilter;

/// Field-wise update applied by `MistakeStore::update_mistake`.
#[derive(Debug, Clone, Default)]
pub struct MistakePatch {
    pub content: Option<String>,
    pub correct_answer: Option<String>,
    pub explanation: Option<Option<String>>,
    pub error_reason: Option<Option<String>>,
    pub image_url: Option<Option<String>>,
    pub mastery_level: Option<i32>,
    pub reviewed_at: Option<Option<DateTime<Utc>>>,
    pub tags: Option<Vec<Tag>>,
}

impl MistakePatch {
    fn apply_to(self, mistake: &mut Mistake) {
        if let Some(content) = self.content {
            mistake.content = content;
        }
        if let Some(correct_answer) = self.correct_answer {
            mistake.correct_answer = correct_answer;
        }
        if let Some(explanation) = self.explanation {
            mistake.explanation = explanation;
        }
        if let Some(error_reason) = self.error_reason {
            mistake.error_reason = error_reason;
        }
        if let Some(image_url) = self.image_url {
            mistake.image_url = image_url;
        }
        if let Some(mastery_level) = self.mastery_level {
            mistake.mastery_level = mastery_level;
        }
        if let Some(reviewed_at) = self.reviewed_at {
            mistake.reviewed_at = reviewed_at;
        }
        if let Some(tags) = self.tags {
            mistake.tags = tags;
        }
    }
}

/// Cached mistakes plus the current filter criteria. `filtered` is rebuilt
/// from scratch after every change to either.
#[derive(Debug, Clone, Default)]
pub struct MistakeStore {
    mistakes: Vec<Mistake>,
    filtered: Vec<Mistake>,
    filter: MistakeFilter,
    is_loading: bool,
    error: Option<String>,
}

impl MistakeStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn mistakes(&self) -> &[Mistake] {
        &self.mistakes
    }

    pub fn filtered(&self) -> &[Mistake] {
        &self.filtered
    }

    pub fn selected_tags(&self) -> &[String] {
        &self.filter.tag_ids
    }

    pub fn search_query(&self) -> &str {
        &self.filter.query
    }

    pub fn is_loading(&self) -> bool {
        self.is_loading
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn set_mistakes(&mut self, mistakes: Vec<Mistake>) {
        self.mistakes = mistakes;
        self.refilter();
    }

    pub fn add_mistake(&mut self, mistake: Mistake) {
        self.mistakes.push(mistake);
        self.refilter();
    }

    /// Unknown ids are ignored.
    pub fn update_mistake(&mut self, id: &str, patch: MistakePatch) {
        if let Some(mistake) = self.mistakes.iter_mut().find(|m| m.id == id) {
            patch.apply_to(mistake);
        }
        self.refilter();
    }

    pub fn delete_mistake(&mut self, id: &str) {
        self.mistakes.retain(|m| m.id != id);
        self.refilter();
    }

    pub fn set_selected_tags(&mut self, tag_ids: Vec<String>) {
        self.filter.tag_ids = tag_ids;
        self.refilter();
    }

    pub fn set_search_query(&mut self, query: impl Into<String>) {
        self.filter.query = query.into();
        self.refilter();
    }

    pub fn set_loading(&mut self, is_loading: bool) {
        self.is_loading = is_loading;
    }

    pub fn set_error(&mut self, error: Option<String>) {
        self.error = error;
    }

    fn refilter(&mut self) {
        self.filtered = self.filter.apply(&self.mistakes);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::filter::tests::{mistake, tag};

    fn ids(mistakes: &[Mistake]) -> Vec<&str> {
        mistakes.iter().map(|m| m.id.as_str()).collect()
    }

    fn store() -> MistakeStore {
        let mut store = MistakeStore::new();
        store.set_mistakes(vec![
            mistake("m1", "Quadratic formula", 0, vec![tag("t1", "math")]),
            mistake("m2", "Irregular verbs", 3, vec![tag("t2", "english")]),
        ]);
        store
    }

    #[test]
    fn set_mistakes_shows_everything_without_criteria() {
        let store = store();
        assert_eq!(ids(store.filtered()), vec!["m1", "m2"]);
    }

    #[test]
    fn changing_criteria_recomputes_view() {
        let mut store = store();

        store.set_selected_tags(vec!["t2".to_string()]);
        assert_eq!(ids(store.filtered()), vec!["m2"]);

        store.set_search_query("quadratic");
        assert!(store.filtered().is_empty());

        store.set_selected_tags(vec![]);
        assert_eq!(ids(store.filtered()), vec!["m1"]);
        assert_eq!(store.search_query(), "quadratic");
    }

    #[test]
    fn mutations_respect_active_filter() {
        let mut store = store();
        store.set_selected_tags(vec!["t1".to_string()]);

        store.add_mistake(mistake("m3", "Derivatives", 1, vec![tag("t1", "math")]));
        assert_eq!(ids(store.filtered()), vec!["m1", "m3"]);

        store.update_mistake(
            "m2",
            MistakePatch {
                tags: Some(vec![tag("t1", "math")]),
                ..Default::default()
            },
        );
        assert_eq!(ids(store.filtered()), vec!["m1", "m2", "m3"]);

        store.delete_mistake("m1");
        assert_eq!(ids(store.filtered()), vec!["m2", "m3"]);
        assert_eq!(store.mistakes().len(), 2);
    }

    #[test]
    fn patch_can_clear_optional_fields() {
        let mut store = store();
        store.update_mistake(
            "m1",
            MistakePatch {
                explanation: Some(Some("use the discriminant".to_string())),
                mastery_level: Some(4),
                ..Default::default()
            },
        );
        store.update_mistake(
            "m1",
            MistakePatch {
                explanation: Some(None),
                ..Default::default()
            },
        );

        let m1 = &store.mistakes()[0];
        assert_eq!(m1.explanation, None);
        assert_eq!(m1.mastery_level, 4);
    }

    #[test]
    fn loading_and_error_flags_are_plain_state() {
        let mut store = MistakeStore::new();
        store.set_loading(true);
        store.set_error(Some("Failed to load mistakes".to_string()));
        assert!(store.is_loading());
        assert_eq!(store.error(), Some("Failed to load mistakes"));
    }
}
