//! View model types representing the renderable admin page.
//!
//! View models are computed by [`AppState::compute_viewmodel`](crate::app::AppState::compute_viewmodel)
//! and hold only display-ready data: no coordinator state, no decisions left
//! to the renderer.
//!
//! # Example
//!
//! ```rust
//! use restaurant_admin::ui::viewmodel::PaginationInfo;
//!
//! let pagination = PaginationInfo::new(0, 5, &[5, 10, 25], 42, false);
//! assert_eq!(pagination.label, "1–5 of 42");
//! assert!(pagination.has_next);
//! ```

/// Prompt shown while a deletion awaits confirmation.
pub const CONFIRM_DELETE_MESSAGE: &str = "Are you sure you want to delete this restaurant?";

/// The whole admin page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableView {
    /// Page heading.
    pub title: String,

    /// Current contents of the search box.
    pub search_term: String,

    /// Current contents of the food type filter box.
    pub food_type_filter: String,

    /// Rows of the current page that pass the local filter.
    pub rows: Vec<RowView>,

    pub pagination: PaginationInfo,

    /// Open confirmation dialog, if a deletion is underway.
    pub dialog: Option<DialogView>,

    /// Feedback notices, oldest first.
    pub notices: Vec<NoticeView>,

    /// Shown instead of rows when there are none.
    pub empty_state: Option<EmptyState>,

    /// Whether the latest search is still running.
    pub is_loading: bool,

    /// Whether a create is waiting for the index.
    pub is_saving: bool,
}

/// One restaurant row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RowView {
    pub id: String,
    pub name: String,
    pub food_type: String,
    pub city: String,
    pub address: String,
    pub phone_number: String,

    /// Character ranges of `name` matching the search term.
    ///
    /// Each tuple is `(start, end)` in character indices, end exclusive.
    pub highlight_ranges: Vec<(usize, usize)>,

    /// Whether this row is the target of the deletion flow.
    pub is_pending_delete: bool,
}

/// Pagination footer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PaginationInfo {
    /// Zero-based page index.
    pub page: usize,
    pub page_size: usize,
    pub page_size_options: Vec<usize>,
    /// Remote match count for the search term.
    pub total_count: usize,
    /// Rendered range, such as `"6–10 of 42"`.
    pub label: String,
    /// Whether `total_count` ignores a local filter.
    pub approximate: bool,
    /// Explanation shown next to an approximate label.
    pub note: Option<String>,
    pub has_previous: bool,
    pub has_next: bool,
}

impl PaginationInfo {
    /// Lays out the footer for a page of `page_size` rows out of `total_count`.
    #[must_use]
    pub fn new(
        page: usize,
        page_size: usize,
        page_size_options: &[usize],
        total_count: usize,
        approximate: bool,
    ) -> Self {
        let start = page.saturating_mul(page_size);
        // A page past the last match shows nothing.
        let (from, to) = if start >= total_count {
            (0, 0)
        } else {
            (start + 1, total_count.min(start.saturating_add(page_size)))
        };
        let count = if approximate {
            format!("≈{total_count}")
        } else {
            total_count.to_string()
        };

        Self {
            page,
            page_size,
            page_size_options: page_size_options.to_vec(),
            total_count,
            label: format!("{from}–{to} of {count}"),
            approximate,
            note: approximate.then(|| {
                "Total counts every match for the search; the food type filter only narrows this page."
                    .to_string()
            }),
            has_previous: page > 0,
            has_next: start.saturating_add(page_size) < total_count,
        }
    }
}

/// The delete confirmation dialog.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DialogView {
    pub message: String,
    pub confirm_label: String,
    pub cancel_label: String,
    /// Set while the deletion runs; both buttons are disabled.
    pub busy: bool,
}

impl DialogView {
    #[must_use]
    pub fn confirm_delete(busy: bool) -> Self {
        Self {
            message: CONFIRM_DELETE_MESSAGE.to_string(),
            confirm_label: "Yes, Delete".to_string(),
            cancel_label: "Cancel".to_string(),
            busy,
        }
    }
}

/// One notice, ready to show.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NoticeView {
    /// Id to pass back when dismissing.
    pub id: u64,
    pub message: String,
    pub is_error: bool,
    /// Local time the notice was raised, as `HH:MM:SS`.
    pub raised_at: String,
}

/// Placeholder for an empty table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmptyState {
    pub message: String,
    pub subtitle: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn label_covers_partial_last_page() {
        let pagination = PaginationInfo::new(8, 5, &[5], 42, false);

        assert_eq!(pagination.label, "41–42 of 42");
        assert!(pagination.has_previous);
        assert!(!pagination.has_next);
    }

    #[test]
    fn empty_result_reads_zero() {
        let pagination = PaginationInfo::new(0, 5, &[5], 0, false);
        assert_eq!(pagination.label, "0–0 of 0");
    }

    #[test]
    fn page_past_last_match_reads_zero() {
        let pagination = PaginationInfo::new(9, 5, &[5], 5, false);

        assert_eq!(pagination.label, "0–0 of 5");
        assert!(pagination.has_previous);
        assert!(!pagination.has_next);
    }

    #[test]
    fn approximate_total_is_marked() {
        let pagination = PaginationInfo::new(0, 10, &[5, 10], 42, true);

        assert_eq!(pagination.label, "1–10 of ≈42");
        assert!(pagination.note.is_some());
    }
}
