//! Remote calls requested by the coordinators.
//!
//! Coordinators never touch the index themselves. Each operation that needs
//! the remote side returns an [`Action`]; the [`IndexWorker`](crate::worker::IndexWorker)
//! executes it and reports back with an
//! [`IndexResponse`](crate::worker::IndexResponse).
//!
//! # Example
//!
//! ```
//! use restaurant_admin::app::{Action, QueryCoordinator};
//! use restaurant_admin::domain::PageSizeOptions;
//!
//! let mut query = QueryCoordinator::new(PageSizeOptions::default(), false);
//! let action = query.refresh();
//! assert!(matches!(action, Action::Search(_)));
//! ```

use crate::domain::RecordId;
use crate::index::{SaveObject, SaveOptions};
use crate::worker::QueryTicket;

/// One remote call to execute against the search index.
#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    /// Runs a search; the ticket comes back unchanged with the result.
    Search(QueryTicket),

    /// Upserts records.
    Save {
        /// Correlates the completion with the create that issued it.
        ticket: u64,
        objects: Vec<SaveObject>,
        options: SaveOptions,
    },

    /// Removes one record.
    Delete { id: RecordId },
}

impl Action {
    /// Short name for logging.
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::Search(_) => "search",
            Self::Save { .. } => "save",
            Self::Delete { .. } => "delete",
        }
    }
}
