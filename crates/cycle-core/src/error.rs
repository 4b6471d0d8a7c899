use std::result::Result as StdResult;

use thiserror::Error;

/// Convenient result type for the core crate.
pub type Result<T> = StdResult<T, Error>;

/// Errors raised while building or validating the candidate model.
///
/// The decision functions themselves never fail; these cover malformed input
/// handed to constructors.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum Error {
    /// A composite identifier could not be parsed.
    #[error("invalid candidate id: {0:?}")]
    InvalidCandidateId(String),

    /// A group lists the same application twice.
    #[error("group {group} lists {bundle_id} more than once")]
    DuplicateApp {
        /// Group that failed validation.
        group: String,
        /// The repeated stable identifier.
        bundle_id: String,
    },

    /// A group has an empty stable identifier in its app list.
    #[error("group {group} has an app with an empty bundle id")]
    EmptyBundleId {
        /// Group that failed validation.
        group: String,
    },
}
