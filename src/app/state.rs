//! Application state and view model computation.
//!
//! [`AppState`] aggregates the two coordinators and the notice list. It is
//! the single source of truth for everything the admin page shows; the
//! index is only reached through the actions the coordinators return.
//!
//! # Example
//!
//! ```rust
//! use restaurant_admin::app::AppState;
//!
//! let state = AppState::default();
//! let view = state.compute_viewmodel();
//! assert!(view.rows.is_empty());
//! assert_eq!(view.pagination.label, "0–0 of 0");
//! ```

use crate::app::modes::DeleteFlow;
use crate::app::mutation::MutationCoordinator;
use crate::app::notice::{NoticeLevel, Notices};
use crate::app::query::QueryCoordinator;
use crate::domain::{Field, PageSizeOptions, RestaurantRecord, ValidationProfile};
use crate::ui::viewmodel::{
    DialogView, EmptyState, NoticeView, PaginationInfo, RowView, TableView,
};
use fuzzy_matcher::skim::SkimMatcherV2;
use fuzzy_matcher::FuzzyMatcher;

const TITLE: &str = "Restaurant Management";

/// Central application state container.
#[derive(Debug, Clone)]
pub struct AppState {
    /// Search, pagination and the cached result page.
    pub query: QueryCoordinator,

    /// Creates and the deletion flow.
    pub mutations: MutationCoordinator,

    /// Feedback shown to the user.
    pub notices: Notices,

    /// Whether the initial search has been issued.
    pub mounted: bool,
}

impl AppState {
    #[must_use]
    pub fn new(query: QueryCoordinator, mutations: MutationCoordinator) -> Self {
        Self {
            query,
            mutations,
            notices: Notices::new(),
            mounted: false,
        }
    }

    /// Computes the renderable page from the current state.
    ///
    /// Rows are the cached page after local filtering. When a search term is
    /// set, each row carries the character ranges of its name that match it.
    #[must_use]
    pub fn compute_viewmodel(&self) -> TableView {
        let _span = tracing::trace_span!("compute_viewmodel").entered();
        let state = self.query.state();

        let matcher = (!state.search_term.trim().is_empty()).then(SkimMatcherV2::default);
        let pending = self.mutations.delete_flow().target();

        let rows: Vec<RowView> = self
            .query
            .displayed()
            .into_iter()
            .map(|record| {
                let highlight_ranges = matcher.as_ref().map_or_else(Vec::new, |m| {
                    highlight_ranges(record.field(Field::Name).unwrap_or_default(), &state.search_term, m)
                });
                row_view(record, highlight_ranges, pending == Some(&record.id))
            })
            .collect();

        let empty_state = rows.is_empty().then(|| self.empty_state());

        TableView {
            title: TITLE.to_string(),
            search_term: state.search_term.clone(),
            food_type_filter: state.food_type_filter.clone(),
            rows,
            pagination: PaginationInfo::new(
                state.page,
                state.page_size,
                self.query.page_size_options().as_slice(),
                self.query.total_count(),
                self.query.is_approximate(),
            ),
            dialog: match self.mutations.delete_flow() {
                DeleteFlow::Idle => None,
                DeleteFlow::AwaitingConfirmation { .. } => Some(DialogView::confirm_delete(false)),
                DeleteFlow::Deleting { .. } => Some(DialogView::confirm_delete(true)),
            },
            notices: self
                .notices
                .iter()
                .map(|notice| NoticeView {
                    id: notice.id,
                    message: notice.message.clone(),
                    is_error: notice.level == NoticeLevel::Error,
                    raised_at: notice
                        .raised_at
                        .with_timezone(&chrono::Local)
                        .format("%H:%M:%S")
                        .to_string(),
                })
                .collect(),
            empty_state,
            is_loading: self.query.is_loading(),
            is_saving: self.mutations.pending_saves() > 0,
        }
    }

    fn empty_state(&self) -> EmptyState {
        let state = self.query.state();
        if self.query.is_loading() && self.query.page().items().is_empty() {
            EmptyState {
                message: "Loading restaurants...".to_string(),
                subtitle: String::new(),
            }
        } else if !self.query.page().items().is_empty() {
            EmptyState {
                message: "No restaurants on this page match the filter".to_string(),
                subtitle: format!("Food type filter: \"{}\"", state.food_type_filter),
            }
        } else if state.search_term.is_empty() {
            EmptyState {
                message: "No restaurants yet".to_string(),
                subtitle: "Add a restaurant to get started".to_string(),
            }
        } else {
            EmptyState {
                message: "No restaurants found".to_string(),
                subtitle: format!("Nothing matches \"{}\"", state.search_term),
            }
        }
    }
}

impl Default for AppState {
    fn default() -> Self {
        Self::new(
            QueryCoordinator::new(PageSizeOptions::default(), false),
            MutationCoordinator::new(ValidationProfile::default()),
        )
    }
}

fn row_view(record: &RestaurantRecord, highlight_ranges: Vec<(usize, usize)>, is_pending_delete: bool) -> RowView {
    let text = |field| record.field(field).unwrap_or_default().to_string();
    RowView {
        id: record.id.to_string(),
        name: text(Field::Name),
        food_type: text(Field::FoodType),
        city: text(Field::City),
        address: text(Field::Address),
        phone_number: text(Field::PhoneNumber),
        highlight_ranges,
        is_pending_delete,
    }
}

/// Coalesces fuzzy match positions into contiguous `(start, end)` ranges.
fn highlight_ranges(text: &str, term: &str, matcher: &SkimMatcherV2) -> Vec<(usize, usize)> {
    let Some((_score, indices)) = matcher.fuzzy_indices(text, term.trim()) else {
        return Vec::new();
    };

    let mut ranges: Vec<(usize, usize)> = Vec::new();
    for idx in indices {
        match ranges.last_mut() {
            Some((_, end)) if *end == idx => *end = idx + 1,
            _ => ranges.push((idx, idx + 1)),
        }
    }
    ranges
}
