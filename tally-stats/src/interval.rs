//! Per-interval statistics and the builder that fills them.
//!
//! A builder is bound to one [`MonthInterval`] and to the run's
//! [`ClassificationTable`]. Each transaction is classified and filed into
//! the income or expense map of the interval; groups are created on first
//! use and updated in place afterwards.

use std::collections::BTreeMap;
use std::collections::btree_map::Entry;

use chrono::DateTime;
use serde::Serialize;
use tally_core::{Money, MonthInterval, Transaction, Tz};

use crate::category_rules::{Classification, ClassificationTable};
use crate::error::StatsError;
use crate::group::{Group, GroupKind};

/// Income and expense groups of one month interval.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct IntervalStatistics {
    pub start: DateTime<Tz>,
    pub end: DateTime<Tz>,
    pub income: BTreeMap<String, Group>,
    pub expense: BTreeMap<String, Group>,
}

impl IntervalStatistics {
    pub fn new(interval: MonthInterval) -> Self {
        Self {
            start: interval.start,
            end: interval.end,
            income: BTreeMap::new(),
            expense: BTreeMap::new(),
        }
    }

    pub fn interval(&self) -> MonthInterval {
        MonthInterval {
            start: self.start,
            end: self.end,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.income.is_empty() && self.expense.is_empty()
    }

    pub fn income_total(&self) -> Money {
        self.income.values().map(|g| g.total).sum()
    }

    pub fn expense_total(&self) -> Money {
        self.expense.values().map(|g| g.total).sum()
    }

    /// Income minus expenses.
    pub fn balance(&self) -> Money {
        self.income_total() - self.expense_total()
    }

    pub fn transaction_count(&self) -> usize {
        self.income.values().chain(self.expense.values()).map(Group::len).sum()
    }

    fn groups_mut(&mut self, is_expense: bool) -> &mut BTreeMap<String, Group> {
        if is_expense { &mut self.expense } else { &mut self.income }
    }
}

/// Accumulates transactions of one interval. Consumed by [`finish`](Self::finish).
#[derive(Debug)]
pub struct IntervalStatisticsBuilder<'t> {
    table: &'t ClassificationTable,
    stats: IntervalStatistics,
    ignored: usize,
}

impl<'t> IntervalStatisticsBuilder<'t> {
    pub fn new(table: &'t ClassificationTable, interval: MonthInterval) -> Self {
        Self {
            table,
            stats: IntervalStatistics::new(interval),
            ignored: 0,
        }
    }

    /// Classify `transaction` and file it into its group.
    ///
    /// Only fails when a group name is already taken by a group of another
    /// kind, e.g. unmatched details text equal to a configured group name.
    pub fn handle_transaction(&mut self, transaction: Transaction) -> Result<(), StatsError> {
        let (name, kind) = match self.table.classify(&transaction.details) {
            Classification::Ignored => {
                self.ignored += 1;
                return Ok(());
            }
            Classification::Group { name, kind } => (name.to_string(), kind),
        };

        let groups = self.stats.groups_mut(transaction.is_expense);
        let group = match groups.entry(name) {
            Entry::Occupied(entry) => {
                let group = entry.into_mut();
                if group.kind != kind {
                    tracing::warn!(
                        date = %transaction.date,
                        amount = %transaction.amount,
                        details = %transaction.details,
                        group = %group.name,
                        "transaction would land in a group of another kind"
                    );
                    return Err(StatsError::GroupNameCollision {
                        name: group.name.clone(),
                        existing: group.kind,
                        requested: kind,
                        date: transaction.date,
                    });
                }
                group
            }
            Entry::Vacant(entry) => {
                let group = Group::new(entry.key().clone(), kind);
                entry.insert(group)
            }
        };
        group.push(transaction);
        Ok(())
    }

    /// Statistics assembled so far.
    pub fn statistics(&self) -> &IntervalStatistics {
        &self.stats
    }

    /// Number of transactions dropped by the ignore list.
    pub fn ignored(&self) -> usize {
        self.ignored
    }

    pub fn finish(self) -> IntervalStatistics {
        self.stats
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::category_rules::UnknownPolicy;
    use crate::group::UNKNOWN_GROUP_NAME;
    use chrono::NaiveDate;
    use std::collections::BTreeMap;
    use tally_core::{MonthStartDay, parse_time_zone};

    fn date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 5, 10).unwrap()
    }

    fn interval() -> MonthInterval {
        let tz = parse_time_zone("UTC").unwrap();
        MonthInterval::containing(date(), MonthStartDay::FIRST, tz).unwrap()
    }

    /// Details look like "+1a": direction sign, amount, then a letter to match on.
    fn t(amount: i64, is_expense: bool, letter: &str) -> Transaction {
        let sign = if is_expense { "-" } else { "+" };
        Transaction::new(
            date(),
            format!("{sign}{amount}{letter}"),
            is_expense,
            Money::from_minor(amount),
        )
    }

    fn transactions1() -> Vec<Transaction> {
        vec![
            t(1, false, "a"),
            t(1, true, "b"),
            t(1, false, "c"),
            t(1, false, "d"),
            t(1, false, "c"),
            t(1, true, "b"),
            t(1, true, "b"),
            t(1, true, "c"),
            t(1, false, "b"),
            t(2, false, "e"),
            t(2, true, "e"),
            t(1, false, "f"),
            t(1, true, "f"),
        ]
    }

    fn groups1() -> BTreeMap<&'static str, Vec<&'static str>> {
        BTreeMap::from([("g1", vec!["a"]), ("g2", vec!["b", "c"]), ("g3", vec!["d"])])
    }

    fn run(table: &ClassificationTable) -> IntervalStatistics {
        let mut builder = table.builder(interval());
        for trans in transactions1() {
            builder.handle_transaction(trans).unwrap();
        }
        builder.finish()
    }

    fn summary(map: &BTreeMap<String, Group>) -> Vec<(String, i64, Vec<String>)> {
        map.values()
            .map(|g| {
                let details = g.transactions.iter().map(|t| t.details.clone()).collect();
                (g.name.clone(), g.total.minor(), details)
            })
            .collect()
    }

    fn row(name: &str, total: i64, details: &[&str]) -> (String, i64, Vec<String>) {
        (name.to_string(), total, details.iter().map(|s| s.to_string()).collect())
    }

    #[test]
    fn test_no_groups_common_unknown() {
        let none: Vec<(String, Vec<String>)> = Vec::new();
        let table = ClassificationTable::new(none, Vec::<String>::new(), UnknownPolicy::Pooled).unwrap();
        let stats = run(&table);

        assert_eq!(
            summary(&stats.income),
            vec![row(UNKNOWN_GROUP_NAME, 8, &["+1a", "+1c", "+1d", "+1c", "+1b", "+2e", "+1f"])]
        );
        assert_eq!(
            summary(&stats.expense),
            vec![row(UNKNOWN_GROUP_NAME, 7, &["-1b", "-1b", "-1b", "-1c", "-2e", "-1f"])]
        );
        assert_eq!(stats.income[UNKNOWN_GROUP_NAME].kind, GroupKind::Unknown);
    }

    #[test]
    fn test_no_groups_personal_unknowns() {
        let none: Vec<(String, Vec<String>)> = Vec::new();
        let table = ClassificationTable::new(none, Vec::<String>::new(), UnknownPolicy::PerDetails).unwrap();
        let stats = run(&table);

        assert_eq!(
            summary(&stats.income),
            vec![
                row("+1a", 1, &["+1a"]),
                row("+1b", 1, &["+1b"]),
                row("+1c", 2, &["+1c", "+1c"]),
                row("+1d", 1, &["+1d"]),
                row("+1f", 1, &["+1f"]),
                row("+2e", 2, &["+2e"]),
            ]
        );
        assert_eq!(
            summary(&stats.expense),
            vec![
                row("-1b", 3, &["-1b", "-1b", "-1b"]),
                row("-1c", 1, &["-1c"]),
                row("-1f", 1, &["-1f"]),
                row("-2e", 2, &["-2e"]),
            ]
        );
    }

    #[test]
    fn test_many_groups_common_unknown() {
        let table = ClassificationTable::new(groups1(), Vec::<String>::new(), UnknownPolicy::Pooled).unwrap();
        let stats = run(&table);

        assert_eq!(
            summary(&stats.income),
            vec![
                row("g1", 1, &["+1a"]),
                row("g2", 3, &["+1c", "+1c", "+1b"]),
                row("g3", 1, &["+1d"]),
                row(UNKNOWN_GROUP_NAME, 3, &["+2e", "+1f"]),
            ]
        );
        assert_eq!(
            summary(&stats.expense),
            vec![
                row("g2", 4, &["-1b", "-1b", "-1b", "-1c"]),
                row(UNKNOWN_GROUP_NAME, 3, &["-2e", "-1f"]),
            ]
        );
    }

    #[test]
    fn test_many_groups_personal_unknowns() {
        let table = ClassificationTable::new(groups1(), Vec::<String>::new(), UnknownPolicy::PerDetails).unwrap();
        let stats = run(&table);

        assert_eq!(
            summary(&stats.income),
            vec![
                row("+1f", 1, &["+1f"]),
                row("+2e", 2, &["+2e"]),
                row("g1", 1, &["+1a"]),
                row("g2", 3, &["+1c", "+1c", "+1b"]),
                row("g3", 1, &["+1d"]),
            ]
        );
        assert_eq!(
            summary(&stats.expense),
            vec![
                row("-1f", 1, &["-1f"]),
                row("-2e", 2, &["-2e"]),
                row("g2", 4, &["-1b", "-1b", "-1b", "-1c"]),
            ]
        );
    }

    #[test]
    fn test_ignored_transactions_are_not_counted() {
        let table = ClassificationTable::new(groups1(), vec!["b"], UnknownPolicy::Pooled).unwrap();
        let stats = {
            let mut builder = table.builder(interval());
            for trans in transactions1() {
                builder.handle_transaction(trans).unwrap();
            }
            assert_eq!(builder.ignored(), 4);
            builder.finish()
        };
        assert_eq!(stats.transaction_count(), 9);
        assert!(
            stats
                .income
                .values()
                .chain(stats.expense.values())
                .flat_map(|g| &g.transactions)
                .all(|t| !t.details.contains('b'))
        );
        assert_eq!(stats.income_total(), Money::from_minor(7));
        assert_eq!(stats.expense_total(), Money::from_minor(4));
        assert_eq!(stats.balance(), Money::from_minor(3));
    }

    #[test]
    fn test_partial_statistics_are_visible() {
        let table = ClassificationTable::new(groups1(), Vec::<String>::new(), UnknownPolicy::Pooled).unwrap();
        let mut builder = table.builder(interval());
        assert!(builder.statistics().is_empty());
        builder.handle_transaction(t(5, true, "a")).unwrap();
        assert_eq!(builder.statistics().expense["g1"].total, Money::from_minor(5));
        assert!(builder.statistics().income.is_empty());
    }

    #[test]
    fn test_details_equal_to_configured_group_name_collides() {
        let groups = vec![("Taxi", vec!["YANDEX"])];
        let table = ClassificationTable::new(groups, Vec::<String>::new(), UnknownPolicy::PerDetails).unwrap();
        let mut builder = table.builder(interval());
        builder
            .handle_transaction(Transaction::expense(date(), "YANDEX", Money::from_minor(1)))
            .unwrap();
        let err = builder
            .handle_transaction(Transaction::expense(date(), "Taxi", Money::from_minor(1)))
            .unwrap_err();
        assert!(matches!(
            err,
            StatsError::GroupNameCollision {
                existing: GroupKind::Configured,
                requested: GroupKind::Unmatched,
                ..
            }
        ));
        assert!(err.to_string().contains("'Taxi'"));
        // the rejected transaction leaves the group untouched
        let taxi = &builder.statistics().expense["Taxi"];
        assert_eq!(taxi.len(), 1);
        assert_eq!(taxi.total, Money::from_minor(1));
    }

    #[test]
    fn test_same_name_in_both_directions_is_independent() {
        let groups = vec![("Transfers", vec!["TRANSFER"])];
        let table = ClassificationTable::new(groups, Vec::<String>::new(), UnknownPolicy::Pooled).unwrap();
        let mut builder = table.builder(interval());
        builder
            .handle_transaction(Transaction::income(date(), "TRANSFER in", Money::from_minor(10)))
            .unwrap();
        builder
            .handle_transaction(Transaction::expense(date(), "TRANSFER out", Money::from_minor(3)))
            .unwrap();
        let stats = builder.finish();
        assert_eq!(stats.income["Transfers"].total, Money::from_minor(10));
        assert_eq!(stats.expense["Transfers"].total, Money::from_minor(3));
    }
}
