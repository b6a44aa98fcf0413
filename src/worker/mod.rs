//! Background execution of remote index calls.
//!
//! The coordinators describe remote calls as [`Action`](crate::app::Action)s;
//! this module runs them concurrently against the injected index and turns
//! each completion into an [`IndexResponse`] for the event handler.
//!
//! # Architecture
//!
//! - `messages`: Completion messages and search tickets
//! - `handler`: [`IndexWorker`], which keeps calls in flight and yields completions

pub mod handler;
pub mod messages;

pub use handler::IndexWorker;
pub use messages::{IndexResponse, Outcome, QueryTicket};
