//! Presentation layer.
//!
//! The admin page is described, not drawn: this crate computes a
//! [`TableView`] from application state and leaves rendering to whatever
//! front end embeds it.
//!
//! ```text
//! AppState → compute_viewmodel → TableView → front end
//! ```
//!
//! # Modules
//!
//! - [`viewmodel`]: View model types for the table, pagination, dialog and notices

pub mod viewmodel;

pub use viewmodel::{
    DialogView, EmptyState, NoticeView, PaginationInfo, RowView, TableView,
    CONFIRM_DELETE_MESSAGE,
};
