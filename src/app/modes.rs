//! The deletion flow state machine.
//!
//! Deleting a restaurant takes two user steps and one remote call:
//!
//! ```text
//! Idle --request(id)--> AwaitingConfirmation{id}
//! AwaitingConfirmation{id} --request(id2)--> AwaitingConfirmation{id2}
//! AwaitingConfirmation{id} --cancel--> Idle
//! AwaitingConfirmation{id} --confirm--> Deleting{id} --completed--> Idle
//! ```
//!
//! Whether the confirmation dialog is open, and what it offers, is derived
//! from this value alone.
//!
//! # Example
//!
//! ```rust
//! use restaurant_admin::app::modes::DeleteFlow;
//! use restaurant_admin::domain::RecordId;
//!
//! let flow = DeleteFlow::AwaitingConfirmation { target: RecordId::from("r1") };
//! assert_eq!(flow.target().map(RecordId::as_str), Some("r1"));
//! ```

use crate::domain::RecordId;

/// Where the single allowed deletion currently stands.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum DeleteFlow {
    /// No deletion requested.
    #[default]
    Idle,

    /// The user picked a record and has not confirmed yet.
    ///
    /// The index has not been touched.
    AwaitingConfirmation { target: RecordId },

    /// The deletion was confirmed and is running against the index.
    ///
    /// Further confirmations are refused until it resolves.
    Deleting { target: RecordId },
}

impl DeleteFlow {
    /// The record this flow is about, if any.
    #[must_use]
    pub const fn target(&self) -> Option<&RecordId> {
        match self {
            Self::Idle => None,
            Self::AwaitingConfirmation { target } | Self::Deleting { target } => Some(target),
        }
    }

    #[must_use]
    pub const fn is_idle(&self) -> bool {
        matches!(self, Self::Idle)
    }

    #[must_use]
    pub const fn is_deleting(&self) -> bool {
        matches!(self, Self::Deleting { .. })
    }

    /// Short state name for logging.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::AwaitingConfirmation { .. } => "awaiting_confirmation",
            Self::Deleting { .. } => "deleting",
        }
    }
}
