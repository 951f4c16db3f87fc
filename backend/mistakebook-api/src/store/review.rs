use crate::models::mistake::Mistake;

/// Lowest mastery first. The sort is stable, so equal levels keep the
/// incoming (newest-first) order.
pub fn review_order(mut mistakes: Vec<Mistake>) -> Vec<Mistake> {
    mistakes.sort_by_key(|m| m.mastery_level);
    mistakes
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReviewProgress {
    /// 1-based position of the cursor
    pub current: usize,
    pub total: usize,
}

impl ReviewProgress {
    /// The cursor is clamped to the last item, so this only holds for an empty
    /// run. It does not signal that a non-empty run is finished; screens must
    /// offer an explicit finish instead.
    pub fn is_past_end(&self) -> bool {
        self.current > self.total
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
enum CursorState {
    #[default]
    Idle,
    Reviewing {
        session_id: String,
        mistakes: Vec<Mistake>,
        index: usize,
    },
}

/// Position within a review run. `Idle -> Reviewing -> Idle`.
#[derive(Debug, Clone, Default)]
pub struct ReviewCursor {
    state: CursorState,
}

impl ReviewCursor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_reviewing(&self) -> bool {
        matches!(self.state, CursorState::Reviewing { .. })
    }

    pub fn session_id(&self) -> Option<&str> {
        match &self.state {
            CursorState::Reviewing { session_id, .. } => Some(session_id.as_str()),
            CursorState::Idle => None,
        }
    }

    pub fn mistakes(&self) -> &[Mistake] {
        match &self.state {
            CursorState::Reviewing { mistakes, .. } => mistakes.as_slice(),
            CursorState::Idle => &[],
        }
    }

    /// Takes the list as given; callers sort with `review_order` first.
    pub fn start_review(&mut self, mistakes: Vec<Mistake>, session_id: impl Into<String>) {
        self.state = CursorState::Reviewing {
            session_id: session_id.into(),
            mistakes,
            index: 0,
        };
    }

    pub fn end_review(&mut self) {
        self.state = CursorState::Idle;
    }

    /// Stays on the last item when already there.
    pub fn next_mistake(&mut self) {
        if let CursorState::Reviewing { mistakes, index, .. } = &mut self.state {
            *index = (*index + 1).min(mistakes.len().saturating_sub(1));
        }
    }

    pub fn prev_mistake(&mut self) {
        if let CursorState::Reviewing { index, .. } = &mut self.state {
            *index = index.saturating_sub(1);
        }
    }

    /// Changes the in-memory copy only; persisting is a separate call.
    pub fn update_mistake_mastery(&mut self, mistake_id: &str, level: i32) {
        if let CursorState::Reviewing { mistakes, .. } = &mut self.state {
            if let Some(mistake) = mistakes.iter_mut().find(|m| m.id == mistake_id) {
                mistake.mastery_level = level;
            }
        }
    }

    pub fn current_mistake(&self) -> Option<&Mistake> {
        match &self.state {
            CursorState::Reviewing { mistakes, index, .. } => mistakes.get(*index),
            CursorState::Idle => None,
        }
    }

    pub fn progress(&self) -> ReviewProgress {
        match &self.state {
            CursorState::Reviewing { mistakes, index, .. } => ReviewProgress {
                current: index + 1,
                total: mistakes.len(),
            },
            CursorState::Idle => ReviewProgress {
                current: 1,
                total: 0,
            },
        }
    }
}
