//! Dismissible user feedback.
//!
//! Successful mutations and every [`SyncFailure`] surface as a [`Notice`].
//! Notices never block anything and stay until dismissed, or until enough
//! newer ones push them out.

use crate::domain::SyncFailure;
use chrono::{DateTime, Utc};
use std::collections::VecDeque;

/// Shown after a create succeeds.
pub const CREATED_MESSAGE: &str = "Restaurant added successfully!";

/// Shown after a delete succeeds.
pub const DELETED_MESSAGE: &str = "Restaurant deleted successfully!";

/// Notices kept before the oldest is dropped.
const MAX_NOTICES: usize = 8;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeLevel {
    Success,
    Error,
}

/// One piece of feedback.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    /// Handle for dismissing the notice.
    pub id: u64,
    pub level: NoticeLevel,
    /// Human-readable text.
    pub message: String,
    /// The failure behind an error notice.
    pub failure: Option<SyncFailure>,
    pub raised_at: DateTime<Utc>,
}

/// The notices currently on screen, oldest first.
#[derive(Debug, Clone)]
pub struct Notices {
    next_id: u64,
    active: VecDeque<Notice>,
}

impl Default for Notices {
    fn default() -> Self {
        Self {
            next_id: 1,
            active: VecDeque::new(),
        }
    }
}

impl Notices {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn push(&mut self, level: NoticeLevel, message: String, failure: Option<SyncFailure>) -> u64 {
        let id = self.next_id;
        self.next_id += 1;

        if self.active.len() == MAX_NOTICES {
            if let Some(dropped) = self.active.pop_front() {
                tracing::trace!(id = dropped.id, "oldest notice dropped");
            }
        }

        self.active.push_back(Notice {
            id,
            level,
            message,
            failure,
            raised_at: Utc::now(),
        });
        id
    }

    /// Raises a success notice and returns its id.
    pub fn success(&mut self, message: impl Into<String>) -> u64 {
        let message = message.into();
        tracing::info!(%message, "success notice");
        self.push(NoticeLevel::Success, message, None)
    }

    /// Raises an error notice for a failure and returns its id.
    pub fn failure(&mut self, failure: SyncFailure) -> u64 {
        let message = failure.to_string();
        tracing::warn!(%message, "error notice");
        self.push(NoticeLevel::Error, message, Some(failure))
    }

    /// Removes a notice; returns whether it was present.
    pub fn dismiss(&mut self, id: u64) -> bool {
        let before = self.active.len();
        self.active.retain(|notice| notice.id != id);
        before != self.active.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Notice> {
        self.active.iter()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.active.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.active.is_empty()
    }

    /// The most recent failure still on screen.
    #[must_use]
    pub fn latest_failure(&self) -> Option<&SyncFailure> {
        self.active
            .iter()
            .rev()
            .find_map(|notice| notice.failure.as_ref())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dismiss_removes_only_the_named_notice() {
        let mut notices = Notices::new();
        let first = notices.success(CREATED_MESSAGE);
        let second = notices.failure(SyncFailure::NoPendingMutation);

        assert!(notices.dismiss(first));
        assert!(!notices.dismiss(first));

        let remaining: Vec<u64> = notices.iter().map(|n| n.id).collect();
        assert_eq!(remaining, vec![second]);
    }

    #[test]
    fn error_notice_keeps_its_failure() {
        let mut notices = Notices::new();
        notices.failure(SyncFailure::QueryFailed {
            cause: "503".to_string(),
        });

        let notice = notices.iter().next().unwrap();
        assert_eq!(notice.level, NoticeLevel::Error);
        assert_eq!(notice.message, "Error loading restaurants: 503");
        assert!(matches!(
            notices.latest_failure(),
            Some(SyncFailure::QueryFailed { .. })
        ));
    }

    #[test]
    fn oldest_notices_make_room() {
        let mut notices = Notices::new();
        for n in 0..MAX_NOTICES + 2 {
            notices.success(format!("notice {n}"));
        }

        assert_eq!(notices.len(), MAX_NOTICES);
        assert_eq!(notices.iter().next().unwrap().message, "notice 2");
    }
}
