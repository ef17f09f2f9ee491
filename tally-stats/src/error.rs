//! Errors raised while building the classification table and month statistics.
//!
//! - [`ConfigurationError`] is raised before any transaction is looked at.
//! - [`StatsError`] covers the aggregation run itself.

use chrono::NaiveDate;
use tally_core::TimeError;
use thiserror::Error;

use crate::group::GroupKind;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigurationError {
    #[error("'{substring}' is declared in group '{second}' and in previous group '{first}'")]
    DuplicateSubstring {
        substring: String,
        first: String,
        second: String,
    },
    #[error("group '{0}' contains an empty substring")]
    EmptySubstring(String),
    #[error("ignore list contains an empty substring")]
    EmptyIgnoreSubstring,
    #[error("group name '{0}' is reserved for unmatched transactions")]
    ReservedGroupName(String),
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StatsError {
    #[error(transparent)]
    Configuration(#[from] ConfigurationError),
    #[error("no transactions to build statistics from")]
    EmptyInput,
    #[error(transparent)]
    Time(#[from] TimeError),
    #[error("group '{name}' already exists as {existing:?}, cannot reuse it as {requested:?} (transaction on {date})")]
    GroupNameCollision {
        name: String,
        existing: GroupKind,
        requested: GroupKind,
        date: NaiveDate,
    },
}
