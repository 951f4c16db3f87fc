use crate::models::tag::Tag;

#[derive(Debug, Clone, Default)]
pub struct TagPatch {
    pub name: Option<String>,
}

/// Cached tag list of the current user.
#[derive(Debug, Clone, Default)]
pub struct TagStore {
    tags: Vec<Tag>,
    is_loading: bool,
    error: Option<String>,
}

impl TagStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn tags(&self) -> &[Tag] {
        &self.tags
    }

    pub fn is_loading(&self) -> bool {
        self.is_loading
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn set_tags(&mut self, tags: Vec<Tag>) {
        self.tags = tags;
    }

    pub fn add_tag(&mut self, tag: Tag) {
        self.tags.push(tag);
    }

    pub fn update_tag(&mut self, id: &str, patch: TagPatch) {
        if let Some(tag) = self.tags.iter_mut().find(|t| t.id == id) {
            if let Some(name) = patch.name {
                tag.name = name;
            }
        }
    }

    pub fn delete_tag(&mut self, id: &str) {
        self.tags.retain(|t| t.id != id);
    }

    pub fn set_loading(&mut self, is_loading: bool) {
        self.is_loading = is_loading;
    }

    pub fn set_error(&mut self, error: Option<String>) {
        self.error = error;
    }
}
