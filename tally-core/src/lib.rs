//! tally-core: money, normalized transactions and month-interval time arithmetic

pub mod money;
pub mod time;
pub mod transaction;

pub use money::{Money, MoneyParseError};
pub use time::{MonthInterval, MonthStartDay, TimeError, local_midnight, parse_time_zone};
pub use transaction::Transaction;

pub use chrono_tz::Tz;
