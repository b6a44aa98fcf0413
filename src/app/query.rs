//! The query coordinator.
//!
//! Owns what the user asked to see ([`QueryState`]), issues tagged searches
//! when that changes, and decides which completions may replace the cached
//! [`ResultPage`].
//!
//! # Staleness
//!
//! Every search carries a [`QueryTicket`] holding a sequence number and the
//! [`SearchParams`] it was issued for. A completion is applied only if its
//! params equal those of the latest issued search and its sequence number is
//! newer than the last one applied. The last *request* wins, not the last
//! response.
//!
//! # Failures
//!
//! A failed search leaves the cached page in place and is reported as
//! [`SyncFailure::QueryFailed`]. The table goes stale, never blank.

use crate::app::local_filter::{self, LocalFilter};
use crate::app::Action;
use crate::domain::error::Result;
use crate::domain::{
    PageSizeOptions, QueryState, RecordId, RestaurantRecord, ResultPage, SearchHits, SearchParams,
    SyncFailure,
};
use crate::worker::{Outcome, QueryTicket};

/// What became of a search completion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QueryUpdate {
    /// The page was replaced.
    Applied,
    /// The completion was superseded and dropped.
    Stale,
    /// The current search failed; the previous page is still shown.
    Failed(SyncFailure),
}

/// Coordinates searches against the index and the cached result page.
#[derive(Debug, Clone)]
pub struct QueryCoordinator {
    state: QueryState,
    options: PageSizeOptions,
    local_term_filter: bool,
    page: ResultPage,
    next_seq: u64,
    latest_issued: Option<QueryTicket>,
    last_applied_seq: u64,
    last_settled_seq: u64,
    /// Records removed locally, with the first sequence number issued after
    /// the removal. Older completions must not bring them back.
    removed: Vec<(RecordId, u64)>,
}

impl QueryCoordinator {
    /// Creates a coordinator with the smallest page size on offer.
    #[must_use]
    pub fn new(options: PageSizeOptions, local_term_filter: bool) -> Self {
        let page_size = options.as_slice().first().copied().unwrap_or(1);
        Self {
            state: QueryState::new(page_size),
            options,
            local_term_filter,
            page: ResultPage::default(),
            next_seq: 1,
            latest_issued: None,
            last_applied_seq: 0,
            last_settled_seq: 0,
            removed: Vec::new(),
        }
    }

    /// Creates a coordinator starting at `page_size`.
    ///
    /// # Errors
    ///
    /// Returns [`AdminError::InvalidPageSize`](crate::AdminError::InvalidPageSize)
    /// if `page_size` is not one of `options`.
    pub fn with_page_size(
        options: PageSizeOptions,
        page_size: usize,
        local_term_filter: bool,
    ) -> Result<Self> {
        let page_size = options.check(page_size)?;
        let mut coordinator = Self::new(options, local_term_filter);
        coordinator.state.page_size = page_size;
        Ok(coordinator)
    }

    #[must_use]
    pub const fn state(&self) -> &QueryState {
        &self.state
    }

    #[must_use]
    pub const fn page_size_options(&self) -> &PageSizeOptions {
        &self.options
    }

    /// Updates the search term; a changed term starts over at page 0.
    ///
    /// Returns the search to issue, or `None` if nothing changed.
    pub fn set_search_term(&mut self, text: impl Into<String>) -> Option<Action> {
        let text = text.into();
        if text == self.state.search_term {
            return None;
        }
        let _span = tracing::debug_span!("set_search_term", term = %text).entered();

        self.state.search_term = text;
        self.state.page = 0;
        Some(self.refresh())
    }

    /// Updates the food-type filter.
    ///
    /// The filter is applied to the fetched page only, so no search is
    /// issued; [`displayed`](Self::displayed) reflects it immediately.
    pub fn set_food_type_filter(&mut self, text: impl Into<String>) {
        self.state.food_type_filter = text.into();
        tracing::debug!(
            filter = %self.state.food_type_filter,
            visible = self.displayed().len(),
            "food type filter updated"
        );
    }

    /// Moves to another page.
    pub fn set_page(&mut self, page: usize) -> Option<Action> {
        if page == self.state.page {
            return None;
        }
        tracing::debug!(from = self.state.page, to = page, "page changed");
        self.state.page = page;
        Some(self.refresh())
    }

    /// Changes the page size and returns to the first page.
    ///
    /// # Errors
    ///
    /// Returns [`AdminError::InvalidPageSize`](crate::AdminError::InvalidPageSize)
    /// for sizes not on offer; the state is left untouched.
    pub fn set_page_size(&mut self, page_size: usize) -> Result<Option<Action>> {
        let page_size = self.options.check(page_size)?;
        let changed = page_size != self.state.page_size || self.state.page != 0;

        self.state.page_size = page_size;
        self.state.page = 0;

        if changed {
            tracing::debug!(page_size, "page size changed");
            Ok(Some(self.refresh()))
        } else {
            Ok(None)
        }
    }

    /// Issues a search for the current state.
    pub fn refresh(&mut self) -> Action {
        let ticket = QueryTicket {
            seq: self.next_seq,
            params: self.state.search_params(),
        };
        self.next_seq += 1;

        tracing::debug!(
            seq = ticket.seq,
            term = %ticket.params.term,
            page = ticket.params.page,
            hits_per_page = ticket.params.hits_per_page,
            "search issued"
        );

        self.latest_issued = Some(ticket.clone());
        Action::Search(ticket)
    }

    fn is_current(&self, ticket: &QueryTicket) -> bool {
        self.latest_issued
            .as_ref()
            .is_some_and(|latest| latest.params == ticket.params)
            && ticket.seq > self.last_applied_seq
    }

    /// Reconciles a search completion with the cached page.
    pub fn apply_response(
        &mut self,
        ticket: &QueryTicket,
        outcome: Outcome<SearchHits>,
    ) -> QueryUpdate {
        let _span = tracing::debug_span!("apply_response", seq = ticket.seq).entered();

        if !self.is_current(ticket) {
            tracing::debug!(
                latest_seq = self.latest_issued.as_ref().map(|t| t.seq),
                last_applied_seq = self.last_applied_seq,
                "dropping stale search response"
            );
            return QueryUpdate::Stale;
        }
        self.last_settled_seq = self.last_settled_seq.max(ticket.seq);

        match outcome {
            Ok(mut hits) => {
                hits.hits.retain(|record| {
                    !self
                        .removed
                        .iter()
                        .any(|(id, issued_after)| &record.id == id && ticket.seq < *issued_after)
                });
                self.removed.retain(|(_, issued_after)| ticket.seq < *issued_after);

                self.page = ResultPage::from_hits(hits, ticket.params.hits_per_page);
                self.last_applied_seq = ticket.seq;

                tracing::debug!(
                    items = self.page.items().len(),
                    total_count = self.page.total_count(),
                    "search response applied"
                );
                QueryUpdate::Applied
            }
            Err(cause) => {
                tracing::warn!(error = %cause, "search failed, keeping previous page");
                QueryUpdate::Failed(SyncFailure::QueryFailed { cause })
            }
        }
    }

    /// Drops a record from the cached page after the index deleted it.
    ///
    /// The total count is left alone until the next search corrects it.
    pub fn remove_local(&mut self, id: &RecordId) -> bool {
        self.removed.push((id.clone(), self.next_seq));
        let removed = self.page.remove(id);
        tracing::debug!(%id, removed, "record removed locally");
        removed
    }

    /// The filter currently narrowing the fetched page.
    #[must_use]
    pub fn local_filter(&self) -> LocalFilter {
        LocalFilter {
            food_type: self.state.food_type_filter.clone(),
            term: self
                .local_term_filter
                .then(|| self.state.search_term.clone()),
        }
    }

    /// The cached page rows that pass the local filter.
    #[must_use]
    pub fn displayed(&self) -> Vec<&RestaurantRecord> {
        local_filter::apply(self.page.items(), &self.local_filter())
    }

    /// The last applied page, before local filtering.
    #[must_use]
    pub const fn page(&self) -> &ResultPage {
        &self.page
    }

    /// Matches for the search term in the whole index.
    ///
    /// Never narrowed by the local filter.
    #[must_use]
    pub const fn total_count(&self) -> usize {
        self.page.total_count()
    }

    /// Whether the displayed count is only an approximation of the total.
    #[must_use]
    pub fn is_approximate(&self) -> bool {
        self.local_filter().is_active()
    }

    /// Whether the latest search has not completed yet.
    #[must_use]
    pub fn is_loading(&self) -> bool {
        self.latest_issued
            .as_ref()
            .is_some_and(|latest| latest.seq > self.last_settled_seq)
    }

    /// Params of the latest issued search, if any.
    #[must_use]
    pub fn latest_params(&self) -> Option<&SearchParams> {
        self.latest_issued.as_ref().map(|ticket| &ticket.params)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{AdminError, Restaurant};
    use proptest::prelude::*;

    fn coordinator() -> QueryCoordinator {
        QueryCoordinator::new(PageSizeOptions::default(), false)
    }

    fn ticket(action: Option<Action>) -> QueryTicket {
        match action {
            Some(Action::Search(ticket)) => ticket,
            other => panic!("expected a search, got {other:?}"),
        }
    }

    fn hits(ids: &[&str], nb_hits: usize) -> SearchHits {
        SearchHits {
            hits: ids
                .iter()
                .map(|id| RestaurantRecord::new(*id, Restaurant::new(format!("R{id}"), "Thai")))
                .collect(),
            nb_hits,
        }
    }

    fn ids(query: &QueryCoordinator) -> Vec<String> {
        query
            .displayed()
            .iter()
            .map(|r| r.id.as_str().to_string())
            .collect()
    }

    #[test]
    fn starts_empty_with_default_page_size() {
        let query = coordinator();

        assert_eq!(query.state().page_size, 5);
        assert_eq!(query.state().page, 0);
        assert!(query.displayed().is_empty());
        assert!(!query.is_loading());
    }

    #[test]
    fn unchanged_values_issue_nothing() {
        let mut query = coordinator();

        assert!(query.set_search_term("").is_none());
        assert!(query.set_page(0).is_none());
        assert!(query.set_page_size(5).unwrap().is_none());
    }

    #[test]
    fn food_type_filter_never_issues_a_search() {
        let mut query = coordinator();
        let first = query.refresh();
        let Action::Search(t) = first else {
            panic!("expected search")
        };
        query.apply_response(&t, Ok(hits(&["1"], 1)));

        query.set_food_type_filter("thai");

        assert_eq!(query.latest_params(), Some(&t.params));
        assert!(query.is_approximate());
    }

    #[test]
    fn page_size_change_returns_to_first_page() {
        let mut query = coordinator();
        query.set_page(3);

        let t = ticket(query.set_page_size(10).unwrap());

        assert_eq!(query.state().page, 0);
        assert_eq!(t.params.page, 0);
        assert_eq!(t.params.hits_per_page, 10);
    }

    #[test]
    fn page_size_outside_options_is_rejected() {
        let mut query = coordinator();
        query.set_page(2);

        let result = query.set_page_size(7);

        assert!(matches!(result, Err(AdminError::InvalidPageSize { .. })));
        assert_eq!(query.state().page, 2);
        assert_eq!(query.state().page_size, 5);
    }

    #[test]
    fn new_search_term_starts_at_first_page() {
        let mut query = coordinator();
        query.set_page(4);

        let t = ticket(query.set_search_term("pho"));

        assert_eq!(t.params.page, 0);
        assert_eq!(t.params.term, "pho");
    }

    #[test]
    fn late_response_for_superseded_term_is_dropped() {
        let mut query = coordinator();
        let first = ticket(query.set_search_term("pi"));
        let second = ticket(query.set_search_term("pizza"));

        assert_eq!(query.apply_response(&second, Ok(hits(&["z"], 1))), QueryUpdate::Applied);
        assert_eq!(query.apply_response(&first, Ok(hits(&["p", "q"], 2))), QueryUpdate::Stale);

        assert_eq!(ids(&query), vec!["z"]);
        assert_eq!(query.total_count(), 1);
    }

    #[test]
    fn early_response_for_superseded_term_is_dropped_too() {
        let mut query = coordinator();
        let first = ticket(query.set_search_term("pi"));
        let second = ticket(query.set_search_term("pizza"));

        assert_eq!(query.apply_response(&first, Ok(hits(&["p"], 1))), QueryUpdate::Stale);
        assert!(query.is_loading());
        assert_eq!(query.apply_response(&second, Ok(hits(&["z"], 1))), QueryUpdate::Applied);
        assert!(!query.is_loading());
    }

    #[test]
    fn older_response_with_same_params_never_overwrites_newer() {
        let mut query = coordinator();
        let older = ticket(Some(query.refresh()));
        let newer = ticket(Some(query.refresh()));

        query.apply_response(&newer, Ok(hits(&["new"], 1)));
        let update = query.apply_response(&older, Ok(hits(&["old"], 1)));

        assert_eq!(update, QueryUpdate::Stale);
        assert_eq!(ids(&query), vec!["new"]);
    }

    #[test]
    fn failure_keeps_previous_page() {
        let mut query = coordinator();
        let first = ticket(Some(query.refresh()));
        query.apply_response(&first, Ok(hits(&["1", "2"], 9)));

        let second = ticket(query.set_page(1));
        let update = query.apply_response(&second, Err("timeout".to_string()));

        assert_eq!(
            update,
            QueryUpdate::Failed(SyncFailure::QueryFailed {
                cause: "timeout".to_string()
            })
        );
        assert_eq!(ids(&query), vec!["1", "2"]);
        assert_eq!(query.total_count(), 9);
        assert!(!query.is_loading());
    }

    #[test]
    fn local_removal_survives_older_responses() {
        let mut query = coordinator();
        let before = ticket(Some(query.refresh()));
        let during = ticket(Some(query.refresh()));
        query.apply_response(&before, Ok(hits(&["1", "2"], 2)));

        assert!(query.remove_local(&RecordId::from("1")));
        assert_eq!(query.total_count(), 2);

        query.apply_response(&during, Ok(hits(&["1", "2"], 2)));
        assert_eq!(ids(&query), vec!["2"]);

        let after = ticket(Some(query.refresh()));
        query.apply_response(&after, Ok(hits(&["1", "2"], 2)));
        assert_eq!(ids(&query), vec!["1", "2"]);
    }

    #[test]
    fn local_term_filter_checks_named_fields() {
        let mut query = QueryCoordinator::new(PageSizeOptions::default(), true);
        let t = ticket(query.set_search_term("r1"));
        query.apply_response(&t, Ok(hits(&["1", "2"], 2)));

        assert_eq!(ids(&query), vec!["1"]);
        assert_eq!(query.total_count(), 2);
    }

    proptest! {
        #[test]
        fn page_size_change_always_resets_page(
            start_page in 0usize..50,
            size in prop::sample::select(vec![5usize, 10, 25]),
        ) {
            let mut query = coordinator();
            query.set_page(start_page);

            query.set_page_size(size).unwrap();

            prop_assert_eq!(query.state().page, 0);
            prop_assert_eq!(query.latest_params().map_or(0, |p| p.page), 0);
        }
    }
}
