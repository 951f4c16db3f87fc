use crate::models::user::User;

#[derive(Debug, Clone, Default)]
pub struct UserPatch {
    pub name: Option<Option<String>>,
    pub email: Option<String>,
}

/// The user the UI is acting as.
#[derive(Debug, Clone, Default)]
pub struct UserStore {
    current_user: Option<User>,
    is_loading: bool,
    error: Option<String>,
}

impl UserStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn current_user(&self) -> Option<&User> {
        self.current_user.as_ref()
    }

    pub fn is_loading(&self) -> bool {
        self.is_loading
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn set_current_user(&mut self, user: Option<User>) {
        self.current_user = user;
    }

    /// No-op while no user is set.
    pub fn update_user(&mut self, patch: UserPatch) {
        let Some(user) = self.current_user.as_mut() else {
            return;
        };
        if let Some(name) = patch.name {
            user.name = name;
        }
        if let Some(email) = patch.email {
            user.email = email;
        }
    }

    pub fn set_loading(&mut self, is_loading: bool) {
        self.is_loading = is_loading;
    }

    pub fn set_error(&mut self, error: Option<String>) {
        self.error = error;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn user() -> User {
        let now = Utc::now();
        User {
            id: "u1".to_string(),
            name: None,
            email: "a@x.com".to_string(),
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn update_without_user_is_ignored() {
        let mut store = UserStore::new();
        store.update_user(UserPatch {
            name: Some(Some("Ann".to_string())),
            ..Default::default()
        });
        assert!(store.current_user().is_none());
    }

    #[test]
    fn update_merges_into_current_user() {
        let mut store = UserStore::new();
        store.set_current_user(Some(user()));
        store.update_user(UserPatch {
            name: Some(Some("Ann".to_string())),
            ..Default::default()
        });

        let current = store.current_user().unwrap();
        assert_eq!(current.name.as_deref(), Some("Ann"));
        assert_eq!(current.email, "a@x.com");
    }
}
