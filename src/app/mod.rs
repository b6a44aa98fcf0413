//! Application layer: the query and mutation coordinators and the event loop
//! state around them.
//!
//! This layer is sans-IO. Coordinators return [`Action`]s describing remote
//! calls and are told about completions through [`Event::IndexResponse`];
//! nothing in here awaits the index.
//!
//! # Architecture
//!
//! ```text
//! User intent → Event → handle_event → Coordinators → Actions → IndexWorker
//!                  ↑                                                 ↓
//!                  └──────────────── IndexResponse ──────────────────┘
//! ```
//!
//! # Modules
//!
//! - [`actions`]: Remote calls requested by the coordinators
//! - [`handler`]: Event processing and routing
//! - [`local_filter`]: Client-side narrowing of a fetched page
//! - [`modes`]: The deletion flow state machine
//! - [`mutation`]: The mutation coordinator
//! - [`notice`]: Dismissible feedback
//! - [`query`]: The query coordinator
//! - [`state`]: State container and view model computation

pub mod actions;
pub mod handler;
pub mod local_filter;
pub mod modes;
pub mod mutation;
pub mod notice;
pub mod query;
pub mod state;

pub use actions::Action;
pub use handler::{handle_event, Event};
pub use local_filter::LocalFilter;
pub use modes::DeleteFlow;
pub use mutation::MutationCoordinator;
pub use notice::{Notice, NoticeLevel, Notices};
pub use query::{QueryCoordinator, QueryUpdate};
pub use state::AppState;
