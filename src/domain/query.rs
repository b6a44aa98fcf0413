//! View intent and result pages.
//!
//! [`QueryState`] is what the user asked to see; [`SearchParams`] is the part
//! of it the index is queried with and doubles as the staleness tag for
//! in-flight searches. [`ResultPage`] is what came back.

use crate::domain::error::{AdminError, Result};
use crate::domain::restaurant::{RecordId, RestaurantRecord};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Page size a freshly mounted table starts with.
pub const DEFAULT_PAGE_SIZE: usize = 5;

/// The page sizes the table offers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Vec<usize>", into = "Vec<usize>")]
pub struct PageSizeOptions(Vec<usize>);

impl PageSizeOptions {
    /// Builds the option set, sorted and de-duplicated.
    ///
    /// # Errors
    ///
    /// Returns [`AdminError::Config`] if the set is empty or contains zero.
    pub fn new(mut sizes: Vec<usize>) -> Result<Self> {
        sizes.sort_unstable();
        sizes.dedup();
        if sizes.is_empty() {
            return Err(AdminError::Config("page_size_options must not be empty".to_string()));
        }
        if sizes.contains(&0) {
            return Err(AdminError::Config("page sizes must be positive".to_string()));
        }
        Ok(Self(sizes))
    }

    #[must_use]
    pub fn contains(&self, size: usize) -> bool {
        self.0.contains(&size)
    }

    #[must_use]
    pub fn as_slice(&self) -> &[usize] {
        &self.0
    }

    /// Checks a requested size against the offered ones.
    ///
    /// # Errors
    ///
    /// Returns [`AdminError::InvalidPageSize`] for sizes not on offer.
    pub fn check(&self, size: usize) -> Result<usize> {
        if self.contains(size) {
            Ok(size)
        } else {
            Err(AdminError::InvalidPageSize {
                requested: size,
                allowed: self.0.clone(),
            })
        }
    }
}

impl Default for PageSizeOptions {
    fn default() -> Self {
        Self(vec![5, 10, 25])
    }
}

impl TryFrom<Vec<usize>> for PageSizeOptions {
    type Error = AdminError;

    fn try_from(value: Vec<usize>) -> Result<Self> {
        Self::new(value)
    }
}

impl From<PageSizeOptions> for Vec<usize> {
    fn from(value: PageSizeOptions) -> Self {
        value.0
    }
}

/// What the user currently wants to see.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryState {
    /// Free text matched by the index.
    pub search_term: String,
    /// Extra food-type narrowing applied to the fetched page only.
    pub food_type_filter: String,
    /// Zero-based page index.
    pub page: usize,
    /// Rows per page; always one of the configured options.
    pub page_size: usize,
}

impl QueryState {
    #[must_use]
    pub fn new(page_size: usize) -> Self {
        Self {
            search_term: String::new(),
            food_type_filter: String::new(),
            page: 0,
            page_size,
        }
    }

    /// The projection of this state the index is queried with.
    #[must_use]
    pub fn search_params(&self) -> SearchParams {
        SearchParams {
            term: self.search_term.clone(),
            page: self.page,
            hits_per_page: self.page_size,
        }
    }
}

impl Default for QueryState {
    fn default() -> Self {
        Self::new(DEFAULT_PAGE_SIZE)
    }
}

/// One search request against the index.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchParams {
    #[serde(rename = "query")]
    pub term: String,
    pub page: usize,
    pub hits_per_page: usize,
}

/// Raw answer of the index to a search.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchHits {
    pub hits: Vec<RestaurantRecord>,
    /// Total matches for the term across all pages.
    pub nb_hits: usize,
}

/// The cached outcome of the last applied search.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ResultPage {
    items: Vec<RestaurantRecord>,
    total_count: usize,
}

impl ResultPage {
    /// Builds a page from index hits.
    ///
    /// Hits sharing an id are collapsed to the first occurrence and the page
    /// is capped at `page_size` rows, whatever the index sent.
    #[must_use]
    pub fn from_hits(hits: SearchHits, page_size: usize) -> Self {
        let mut seen = HashSet::new();
        let items: Vec<RestaurantRecord> = hits
            .hits
            .into_iter()
            .filter(|record| seen.insert(record.id.clone()))
            .take(page_size)
            .collect();

        Self {
            items,
            total_count: hits.nb_hits,
        }
    }

    #[must_use]
    pub fn items(&self) -> &[RestaurantRecord] {
        &self.items
    }

    #[must_use]
    pub const fn total_count(&self) -> usize {
        self.total_count
    }

    /// Drops the record with the given id from the cached rows.
    ///
    /// Returns whether a row was removed.
    pub fn remove(&mut self, id: &RecordId) -> bool {
        let before = self.items.len();
        self.items.retain(|record| &record.id != id);
        self.items.len() != before
    }
}
