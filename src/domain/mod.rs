//! Domain layer: restaurant records, view intent, result pages and errors.
//!
//! Nothing in here knows about the hosted index client or about how results
//! reach the screen.
//!
//! # Organization
//!
//! - [`error`]: Error types and result aliases
//! - [`restaurant`]: Restaurant record model and validation
//! - [`query`]: Query state, page sizes and result pages
//!
//! # Examples
//!
//! ```
//! use restaurant_admin::domain::{Restaurant, ValidationProfile};
//!
//! let draft = Restaurant::new("Zuni Café", "Mediterranean");
//! assert!(draft.validate(ValidationProfile::Minimal).is_ok());
//! ```

pub mod error;
pub mod query;
pub mod restaurant;

pub use error::{AdminError, MutationKind, Result, SyncFailure};
pub use query::{
    PageSizeOptions, QueryState, ResultPage, SearchHits, SearchParams, DEFAULT_PAGE_SIZE,
};
pub use restaurant::{Field, RecordId, Restaurant, RestaurantRecord, ValidationProfile};
