//! Plain-text rendering of interval statistics.

use std::collections::BTreeMap;
use std::fmt::Write;

use tally_core::Money;

use crate::group::Group;
use crate::interval::IntervalStatistics;

pub const DATE_FORMAT: &str = "%Y-%m-%d";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReportOptions {
    /// List member transactions under each group
    pub detailed: bool,
}

/// Groups by total descending, ties by name.
pub fn sorted_groups(groups: &BTreeMap<String, Group>) -> Vec<&Group> {
    let mut list: Vec<&Group> = groups.values().collect();
    list.sort_by(|a, b| b.total.cmp(&a.total).then_with(|| a.name.cmp(&b.name)));
    list
}

fn render_section(out: &mut String, title: &str, groups: &BTreeMap<String, Group>, total: Money, options: ReportOptions) {
    let _ = writeln!(out, "  {title}:");
    for group in sorted_groups(groups) {
        let _ = writeln!(out, "    {:<35}: {:>12}", group.name, group.total);
        if options.detailed {
            for t in &group.transactions {
                let _ = writeln!(out, "      {} {:>12} {}", t.date.format(DATE_FORMAT), t.amount, t.details);
            }
        }
    }
    let _ = writeln!(out, "    {:<35}: {:>12}", "Total", total);
}

/// Render one interval.
pub fn render_interval(stats: &IntervalStatistics, options: ReportOptions) -> String {
    let mut out = String::new();
    let _ = writeln!(
        out,
        "Statistics for {}..{}:",
        stats.start.format(DATE_FORMAT),
        stats.end.format(DATE_FORMAT)
    );
    render_section(&mut out, "Income", &stats.income, stats.income_total(), options);
    render_section(&mut out, "Expenses", &stats.expense, stats.expense_total(), options);
    let _ = writeln!(out, "  {:<37}: {:>12}", "Balance", stats.balance());
    out
}

/// Render all intervals separated by blank lines.
pub fn render_report(stats: &[IntervalStatistics], options: ReportOptions) -> String {
    stats
        .iter()
        .map(|s| render_interval(s, options))
        .collect::<Vec<_>>()
        .join("\n")
}
