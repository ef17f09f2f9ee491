//! Split a batch of transactions into month intervals and build statistics for each.

use tally_core::{MonthInterval, MonthStartDay, Transaction, Tz, local_midnight};
use tracing::debug;

use crate::category_rules::ClassificationTable;
use crate::error::StatsError;
use crate::interval::{IntervalStatistics, IntervalStatisticsBuilder};

/// Build statistics for every month interval that received transactions.
///
/// Transactions are stably sorted by date first, so same-day transactions
/// keep their input order inside groups. Every interval that was opened by a
/// transaction is kept, except a trailing one left empty because all of its
/// transactions were ignored.
pub fn build_monthly_statistics(
    mut transactions: Vec<Transaction>,
    table: &ClassificationTable,
    month_start_day: MonthStartDay,
    tz: Tz,
) -> Result<Vec<IntervalStatistics>, StatsError> {
    transactions.sort_by_key(|t| t.date);
    let first_date = match transactions.first() {
        Some(first) => first.date,
        None => return Err(StatsError::EmptyInput),
    };

    let mut stats = Vec::new();
    let mut current: IntervalStatisticsBuilder<'_> =
        table.builder(MonthInterval::containing(first_date, month_start_day, tz)?);

    for transaction in transactions {
        let instant = local_midnight(transaction.date, tz)?;
        if instant > current.statistics().end {
            let next = table.builder(MonthInterval::containing(transaction.date, month_start_day, tz)?);
            let done = std::mem::replace(&mut current, next);
            debug!(
                start = %done.statistics().start,
                ignored = done.ignored(),
                "interval closed"
            );
            stats.push(done.finish());
        }
        current.handle_transaction(transaction)?;
    }

    if !current.statistics().is_empty() {
        stats.push(current.finish());
    }
    Ok(stats)
}

/// Same as [`build_monthly_statistics`] with the day given as a plain number.
pub fn build_monthly_statistics_with_day(
    transactions: Vec<Transaction>,
    table: &ClassificationTable,
    month_start_day: u32,
    tz: Tz,
) -> Result<Vec<IntervalStatistics>, StatsError> {
    let day = MonthStartDay::new(month_start_day)?;
    build_monthly_statistics(transactions, table, day, tz)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::category_rules::UnknownPolicy;
    use chrono::{Datelike, NaiveDate};
    use tally_core::{Money, TimeError, parse_time_zone};

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    fn tz() -> Tz {
        parse_time_zone("Asia/Yerevan").unwrap()
    }

    fn taxi_table(ignore: Vec<&str>) -> ClassificationTable {
        ClassificationTable::new(vec![("Taxi", vec!["YANDEX"])], ignore, UnknownPolicy::PerDetails).unwrap()
    }

    #[test]
    fn test_empty_input_fails() {
        let table = taxi_table(vec![]);
        assert_eq!(
            build_monthly_statistics(Vec::new(), &table, MonthStartDay::FIRST, tz()),
            Err(StatsError::EmptyInput)
        );
    }

    #[test]
    fn test_invalid_month_start_day() {
        let table = taxi_table(vec![]);
        let txns = vec![Transaction::expense(d(2024, 1, 1), "x", Money::from_minor(1))];
        assert_eq!(
            build_monthly_statistics_with_day(txns, &table, 0, tz()),
            Err(StatsError::Time(TimeError::InvalidMonthStartDay(0)))
        );
    }

    #[test]
    fn test_unsorted_input_is_sorted_stably() {
        let table = taxi_table(vec![]);
        let txns = vec![
            Transaction::expense(d(2024, 1, 9), "YANDEX late", Money::from_minor(3)),
            Transaction::expense(d(2024, 1, 2), "YANDEX first", Money::from_minor(1)),
            Transaction::expense(d(2024, 1, 2), "YANDEX second", Money::from_minor(2)),
        ];
        let stats = build_monthly_statistics(txns, &table, MonthStartDay::FIRST, tz()).unwrap();
        assert_eq!(stats.len(), 1);
        let details: Vec<_> = stats[0].expense["Taxi"]
            .transactions
            .iter()
            .map(|t| t.details.as_str())
            .collect();
        assert_eq!(details, vec!["YANDEX first", "YANDEX second", "YANDEX late"]);
    }

    #[test]
    fn test_month_boundary_is_inclusive() {
        let table = taxi_table(vec![]);
        let day = MonthStartDay::new(10).unwrap();
        let txns = vec![
            Transaction::expense(d(2024, 3, 10), "YANDEX open", Money::from_minor(1)),
            Transaction::expense(d(2024, 4, 9), "YANDEX last day", Money::from_minor(2)),
            Transaction::expense(d(2024, 4, 10), "YANDEX next", Money::from_minor(4)),
        ];
        let stats = build_monthly_statistics(txns, &table, day, tz()).unwrap();
        assert_eq!(stats.len(), 2);
        assert_eq!(stats[0].start.date_naive(), d(2024, 3, 10));
        assert_eq!(stats[0].end.date_naive(), d(2024, 4, 9));
        assert_eq!(stats[0].expense["Taxi"].total, Money::from_minor(3));
        assert_eq!(stats[1].start.date_naive(), d(2024, 4, 10));
        assert_eq!(stats[1].expense["Taxi"].total, Money::from_minor(4));
    }

    #[test]
    fn test_first_interval_contains_first_transaction() {
        let table = taxi_table(vec![]);
        let day = MonthStartDay::new(15).unwrap();
        let txns = vec![Transaction::expense(d(2024, 1, 5), "YANDEX", Money::from_minor(1))];
        let stats = build_monthly_statistics(txns, &table, day, tz()).unwrap();
        assert_eq!(stats.len(), 1);
        assert_eq!(stats[0].start.date_naive(), d(2023, 12, 15));
        assert_eq!(stats[0].end.date_naive(), d(2024, 1, 14));
    }

    #[test]
    fn test_months_without_transactions_are_skipped() {
        let table = taxi_table(vec![]);
        let txns = vec![
            Transaction::expense(d(2024, 1, 5), "YANDEX", Money::from_minor(1)),
            Transaction::expense(d(2024, 4, 5), "YANDEX", Money::from_minor(1)),
        ];
        let stats = build_monthly_statistics(txns, &table, MonthStartDay::FIRST, tz()).unwrap();
        let months: Vec<_> = stats.iter().map(|s| s.start.month()).collect();
        assert_eq!(months, vec![1, 4]);
    }

    #[test]
    fn test_trailing_interval_with_only_ignored_transactions_is_dropped() {
        let table = taxi_table(vec!["IGNORE"]);
        let txns = vec![
            Transaction::expense(d(2024, 1, 5), "IGNORE me", Money::from_minor(1)),
            Transaction::expense(d(2024, 2, 5), "YANDEX", Money::from_minor(1)),
            Transaction::expense(d(2024, 3, 5), "IGNORE me too", Money::from_minor(1)),
        ];
        let stats = build_monthly_statistics(txns, &table, MonthStartDay::FIRST, tz()).unwrap();
        let months: Vec<_> = stats.iter().map(|s| s.start.month()).collect();
        assert_eq!(months, vec![1, 2]);
        assert!(stats[0].is_empty());
    }

    #[test]
    fn test_group_name_collision_aborts_the_run() {
        let table = taxi_table(vec![]);
        let txns = vec![
            Transaction::expense(d(2024, 1, 5), "YANDEX", Money::from_minor(1)),
            Transaction::expense(d(2024, 1, 6), "Taxi", Money::from_minor(1)),
        ];
        let res = build_monthly_statistics(txns, &table, MonthStartDay::FIRST, tz());
        assert!(matches!(res, Err(StatsError::GroupNameCollision { .. })));
    }
}
