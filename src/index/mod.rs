//! Search index clients.
//!
//! # Organization
//!
//! - [`backend`]: The [`SearchIndex`] trait and its request/receipt types
//! - [`algolia`]: [`AlgoliaIndex`], the hosted index over REST
//! - [`json`]: [`JsonIndex`], an in-process index with optional file persistence
//! - [`ranking`]: Relevance scoring used by [`JsonIndex`]

pub mod algolia;
pub mod backend;
pub mod json;
pub mod ranking;

pub use algolia::AlgoliaIndex;
pub use backend::{SaveObject, SaveOptions, SaveReceipt, SearchIndex};
pub use json::JsonIndex;
