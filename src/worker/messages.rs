//! Completion messages flowing from the index worker back to the coordinators.
//!
//! Every remote call the coordinators issue comes back as exactly one
//! [`IndexResponse`]. Failures travel as their rendered message: the
//! coordinators only ever show them to the user, and a `String` keeps the
//! response `Clone` + `Eq` for tests.

use crate::domain::{RecordId, SearchHits, SearchParams};
use crate::index::SaveReceipt;

/// Outcome of one remote call, with failures rendered to text.
pub type Outcome<T> = std::result::Result<T, String>;

/// Tag attached to every outgoing search.
///
/// `seq` grows with each issued search; `params` is what was asked for. The
/// query coordinator compares both against its own bookkeeping to decide
/// whether a completion is stale.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct QueryTicket {
    pub seq: u64,
    pub params: SearchParams,
}

/// A finished remote call.
#[derive(Debug, Clone, PartialEq)]
pub enum IndexResponse {
    /// A search finished.
    SearchCompleted {
        ticket: QueryTicket,
        outcome: Outcome<SearchHits>,
    },

    /// A create (batch save) finished.
    SaveCompleted {
        /// Ticket the mutation coordinator issued with the save.
        ticket: u64,
        outcome: Outcome<SaveReceipt>,
    },

    /// A deletion finished.
    DeleteCompleted { id: RecordId, outcome: Outcome<()> },
}

impl IndexResponse {
    /// Short name for logging.
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::SearchCompleted { .. } => "search",
            Self::SaveCompleted { .. } => "save",
            Self::DeleteCompleted { .. } => "delete",
        }
    }

    /// Whether the remote call succeeded.
    #[must_use]
    pub const fn is_success(&self) -> bool {
        match self {
            Self::SearchCompleted { outcome, .. } => outcome.is_ok(),
            Self::SaveCompleted { outcome, .. } => outcome.is_ok(),
            Self::DeleteCompleted { outcome, .. } => outcome.is_ok(),
        }
    }
}
