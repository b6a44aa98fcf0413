//! Restaurant admin: a client-side view over a restaurant catalogue kept in a
//! hosted search index.
//!
//! The crate keeps a paginated, searchable, filterable table in sync with the
//! index while records are created and deleted:
//! - Remote full-text search with page and page-size control
//! - A local food-type post-filter applied to the current page
//! - Validated creation with index-assigned ids and a refresh on success
//! - Two-step deletion with optimistic local removal
//! - Out-of-order search responses resolved by staleness tags

#![allow(clippy::multiple_crate_versions)]

//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────┐
//! │  Session (session.rs)                               │  ← Event loop
//! └─────────────────────────────────────────────────────┘
//!                        │
//! ┌─────────────────────────────────────────────────────┐
//! │  Application Layer (app/)                           │
//! │  - Query coordinator (staleness, local filter)      │
//! │  - Mutation coordinator (create, delete flow)       │
//! │  - Notices and view model computation               │
//! └─────────────────────────────────────────────────────┘
//!         │                    │                    │
//! ┌───────────────┐   ┌───────────────┐   ┌───────────────┐
//! │ UI Layer      │   │ Index Layer   │   │ Worker Layer  │
//! │ (ui/)         │   │ (index/)      │   │ (worker/)     │
//! │ - Table view  │   │ - REST client │   │ - In-flight   │
//! │ - Pagination  │   │ - JSON file   │   │   requests    │
//! │ - Dialog      │   │ - Ranking     │   │ - Responses   │
//! └───────────────┘   └───────────────┘   └───────────────┘
//!         │                    │                    │
//! ┌─────────────────────────────────────────────────────┐
//! │  Infrastructure & Domain Layers                     │
//! │  - Platform paths (infrastructure/)                 │
//! │  - Records, query state, errors (domain/)           │
//! └─────────────────────────────────────────────────────┘
//!                        │
//! ┌─────────────────────────────────────────────────────┐
//! │  Observability (observability/)                     │  ← Optional
//! │  - OpenTelemetry tracing, file-based OTLP export    │
//! └─────────────────────────────────────────────────────┘
//! ```
//!
//! The application layer never performs I/O. [`handle_event`] mutates
//! [`AppState`] and returns [`Action`]s; the [`worker`] runs them against a
//! [`SearchIndex`](index::SearchIndex) and feeds completions back as events.
//!
//! # Configuration
//!
//! ```toml
//! app_id = "LATENCY"
//! api_key = "search-and-write-key"
//! index_name = "restaurants"
//! page_size = 10
//! page_size_options = [5, 10, 25]
//! validation = "minimal"
//! trace_level = "debug"
//! ```
//!
//! # Examples
//!
//! ```rust
//! use restaurant_admin::{handle_event, initialize, Config, Event};
//!
//! let mut state = initialize(&Config::default())?;
//!
//! let (_, actions) = handle_event(&mut state, &Event::Mount)?;
//! assert_eq!(actions.len(), 1);
//!
//! let (_, actions) = handle_event(&mut state, &Event::SetFoodTypeFilter("Sushi".into()))?;
//! assert!(actions.is_empty());
//! # Ok::<(), restaurant_admin::AdminError>(())
//! ```
//!
//! Driving a session against the local index:
//!
//! ```rust
//! use restaurant_admin::index::JsonIndex;
//! use restaurant_admin::{connect_with, Config, Event};
//! use std::sync::Arc;
//!
//! let mut session = connect_with(&Config::default(), Arc::new(JsonIndex::in_memory()))?;
//! session.dispatch(&Event::Mount)?;
//! futures::executor::block_on(session.settle())?;
//! assert!(session.view().rows.is_empty());
//! # Ok::<(), restaurant_admin::AdminError>(())
//! ```

pub mod app;
pub mod domain;
pub mod index;
pub mod infrastructure;
pub mod session;
pub mod worker;

pub mod ui;

pub mod observability;

pub use app::{handle_event, Action, AppState, Event, MutationCoordinator, QueryCoordinator};
pub use domain::{
    AdminError, PageSizeOptions, RecordId, Restaurant, RestaurantRecord, Result, SyncFailure,
    ValidationProfile, DEFAULT_PAGE_SIZE,
};
pub use session::Session;
pub use ui::TableView;

use index::{AlgoliaIndex, JsonIndex, SearchIndex};
use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::Path;
use std::sync::Arc;

/// Default name of the hosted index.
pub const DEFAULT_INDEX_NAME: &str = "restaurants";

/// Admin configuration.
///
/// Every field has a default, so a partial TOML document is fine.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Hosted index application id.
    pub app_id: String,

    /// Hosted index API key. Needs search, add and delete rights.
    pub api_key: String,

    /// Index holding the restaurants. Default: `"restaurants"`
    pub index_name: String,

    /// Rows per page on mount. Must be one of `page_size_options`. Default: 5
    pub page_size: usize,

    /// Page sizes the table offers. Default: `[5, 10, 25]`
    pub page_size_options: PageSizeOptions,

    /// Fields a new restaurant must have. Default: strict
    pub validation: ValidationProfile,

    /// Also filter the current page by the search term locally.
    pub local_term_filter: bool,

    /// Local JSON index file used instead of the hosted index.
    ///
    /// Relative paths resolve against the data directory.
    pub index_file: Option<String>,

    /// Tracing level. Options: `trace`, `debug`, `info`, `warn`, `error`.
    pub trace_level: Option<String>,

    /// File receiving OTLP JSON spans. Relative paths resolve against the
    /// data directory.
    pub trace_file: Option<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            app_id: String::new(),
            api_key: String::new(),
            index_name: DEFAULT_INDEX_NAME.to_string(),
            page_size: DEFAULT_PAGE_SIZE,
            page_size_options: PageSizeOptions::default(),
            validation: ValidationProfile::default(),
            local_term_filter: false,
            index_file: None,
            trace_level: None,
            trace_file: None,
        }
    }
}

impl Config {
    /// Parses a TOML document.
    ///
    /// # Errors
    ///
    /// Returns [`AdminError::Config`] for malformed TOML or invalid values.
    pub fn from_toml_str(text: &str) -> Result<Self> {
        toml::from_str(text).map_err(|e| AdminError::Config(e.to_string()))
    }

    /// Reads and parses a TOML file.
    ///
    /// # Errors
    ///
    /// Returns [`AdminError::Io`] if the file cannot be read, or
    /// [`AdminError::Config`] if it does not parse.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)?;
        Self::from_toml_str(&text).map_err(|e| match e {
            AdminError::Config(msg) => AdminError::Config(format!("{}: {msg}", path.display())),
            other => other,
        })
    }

    /// Parses flat key/value configuration, such as environment-derived maps.
    ///
    /// Values that fail to parse fall back to their defaults.
    ///
    /// - `page_size_options`: comma-separated sizes (`"5,10,25"`)
    /// - `page_size`: integer
    /// - `validation`: `minimal` or `strict`
    /// - `local_term_filter`: `true`/`false`
    ///
    /// # Example
    ///
    /// ```rust
    /// use std::collections::BTreeMap;
    /// use restaurant_admin::Config;
    ///
    /// let mut map = BTreeMap::new();
    /// map.insert("page_size_options".to_string(), "10, 20".to_string());
    /// map.insert("page_size".to_string(), "20".to_string());
    ///
    /// let config = Config::from_map(&map);
    /// assert_eq!(config.page_size_options.as_slice(), &[10, 20]);
    /// assert_eq!(config.page_size, 20);
    /// ```
    #[must_use]
    pub fn from_map(config: &BTreeMap<String, String>) -> Self {
        let defaults = Self::default();
        let text = |key: &str| {
            config
                .get(key)
                .map(|s| s.trim())
                .filter(|s| !s.is_empty())
                .map(String::from)
        };

        let page_size_options = config
            .get("page_size_options")
            .map(|s| {
                s.split(',')
                    .map(str::trim)
                    .filter(|p| !p.is_empty())
                    .filter_map(|p| p.parse::<usize>().ok())
                    .collect::<Vec<_>>()
            })
            .and_then(|sizes| PageSizeOptions::new(sizes).ok())
            .unwrap_or(defaults.page_size_options);

        let page_size = config
            .get("page_size")
            .and_then(|s| s.trim().parse::<usize>().ok())
            .unwrap_or(defaults.page_size);

        let validation = config
            .get("validation")
            .and_then(|s| ValidationProfile::from_name(s))
            .unwrap_or(defaults.validation);

        let local_term_filter = config
            .get("local_term_filter")
            .and_then(|s| s.trim().parse::<bool>().ok())
            .unwrap_or(defaults.local_term_filter);

        Self {
            app_id: text("app_id").unwrap_or_default(),
            api_key: text("api_key").unwrap_or_default(),
            index_name: text("index_name").unwrap_or(defaults.index_name),
            page_size,
            page_size_options,
            validation,
            local_term_filter,
            index_file: text("index_file"),
            trace_level: text("trace_level"),
            trace_file: text("trace_file"),
        }
    }
}

/// Builds the initial application state.
///
/// The table starts empty; send [`Event::Mount`] to issue the first search.
///
/// # Errors
///
/// Returns [`AdminError::InvalidPageSize`] if `page_size` is not one of
/// `page_size_options`.
pub fn initialize(config: &Config) -> Result<AppState> {
    tracing::debug!(
        index = %config.index_name,
        page_size = config.page_size,
        validation = ?config.validation,
        "initializing restaurant admin"
    );

    let query = QueryCoordinator::with_page_size(
        config.page_size_options.clone(),
        config.page_size,
        config.local_term_filter,
    )?;
    let mutations = MutationCoordinator::new(config.validation);

    Ok(AppState::new(query, mutations))
}

/// Opens a session over the index the configuration names.
///
/// Uses the local JSON index when `index_file` is set, otherwise the hosted
/// index. Hosted requests need a tokio runtime to be polled on.
///
/// # Errors
///
/// Returns [`AdminError::Config`] for missing credentials,
/// [`AdminError::Storage`] or [`AdminError::Io`] if the index file is
/// unusable, and anything [`initialize`] returns.
pub fn connect(config: &Config) -> Result<Session> {
    let index: Arc<dyn SearchIndex> = match config.index_file.as_deref() {
        Some(file) => {
            let path = infrastructure::resolve_data_file(file);
            tracing::info!(path = %path.display(), "using local index file");
            Arc::new(JsonIndex::open(path)?)
        }
        None => {
            tracing::info!(index = %config.index_name, "using hosted index");
            Arc::new(AlgoliaIndex::new(&config.app_id, &config.api_key, &config.index_name)?)
        }
    };
    connect_with(config, index)
}

/// Opens a session over an already constructed index.
///
/// # Errors
///
/// Returns anything [`initialize`] returns.
pub fn connect_with(config: &Config, index: Arc<dyn SearchIndex>) -> Result<Session> {
    Ok(Session::new(initialize(config)?, index))
}
