//! tally-stats: substring classification, per-month interval statistics and text reports

pub mod category_rules;
pub mod error;
pub mod group;
pub mod interval;
pub mod monthly;
pub mod report;

pub use category_rules::{Classification, ClassificationTable, UnknownPolicy};
pub use error::{ConfigurationError, StatsError};
pub use group::{Group, GroupKind, UNKNOWN_GROUP_NAME};
pub use interval::{IntervalStatistics, IntervalStatisticsBuilder};
pub use monthly::{build_monthly_statistics, build_monthly_statistics_with_day};
pub use report::{ReportOptions, render_interval, render_report};
