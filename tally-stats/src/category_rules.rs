//! Deterministic classification of transaction details into named groups.
//!
//! The table is the inverse of the configured `group -> [substring]` mapping.
//! It is built once per run and only read afterwards. When several substrings
//! occur in the same details text the longest one wins; equal lengths fall
//! back to lexicographic order of the substrings, so the outcome never
//! depends on how the configuration was ordered.

use std::cmp::Reverse;
use std::collections::{BTreeSet, HashMap};

use tally_core::MonthInterval;
use tracing::info;

use crate::error::ConfigurationError;
use crate::group::{GroupKind, UNKNOWN_GROUP_NAME};
use crate::interval::IntervalStatisticsBuilder;

/// What to do with transactions no substring matches.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum UnknownPolicy {
    /// Everything unmatched goes to the single `"unknown"` group
    #[default]
    Pooled,
    /// Each distinct details text becomes its own group
    PerDetails,
}

impl UnknownPolicy {
    pub fn from_group_all(group_all_unknown: bool) -> Self {
        if group_all_unknown { Self::Pooled } else { Self::PerDetails }
    }
}

/// Result of classifying one details text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Classification<'a> {
    /// Contains an ignore substring; the transaction is dropped
    Ignored,
    /// File into the group with this name
    Group { name: &'a str, kind: GroupKind },
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct Rule {
    substring: String,
    group: String,
}

#[derive(Debug, Clone)]
pub struct ClassificationTable {
    /// Sorted by match priority
    rules: Vec<Rule>,
    ignore: Vec<String>,
    unknown: UnknownPolicy,
    group_count: usize,
}

impl ClassificationTable {
    /// Invert `groups` and validate it.
    ///
    /// Fails when a substring is declared under two different groups, when
    /// any substring is empty, or when the pooled policy would clash with a
    /// configured group called `"unknown"`.
    pub fn new<I, K, V, S>(
        groups: I,
        ignore: impl IntoIterator<Item = impl Into<String>>,
        unknown: UnknownPolicy,
    ) -> Result<Self, ConfigurationError>
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut substring_to_group: HashMap<String, String> = HashMap::new();
        let mut rules = Vec::new();
        let mut names = BTreeSet::new();

        for (name, substrings) in groups {
            let name: String = name.into();
            if unknown == UnknownPolicy::Pooled && name == UNKNOWN_GROUP_NAME {
                return Err(ConfigurationError::ReservedGroupName(name));
            }
            for substring in substrings {
                let substring: String = substring.into();
                if substring.is_empty() {
                    return Err(ConfigurationError::EmptySubstring(name));
                }
                match substring_to_group.get(&substring) {
                    Some(first) if *first == name => continue,
                    Some(first) => {
                        return Err(ConfigurationError::DuplicateSubstring {
                            substring,
                            first: first.clone(),
                            second: name,
                        });
                    }
                    None => {}
                }
                substring_to_group.insert(substring.clone(), name.clone());
                rules.push(Rule {
                    substring,
                    group: name.clone(),
                });
            }
            names.insert(name);
        }

        let ignore: Vec<String> = ignore.into_iter().map(Into::into).collect();
        if ignore.iter().any(String::is_empty) {
            return Err(ConfigurationError::EmptyIgnoreSubstring);
        }

        rules.sort_by(|a, b| {
            (Reverse(a.substring.len()), &a.substring).cmp(&(Reverse(b.substring.len()), &b.substring))
        });

        info!(
            groups = names.len(),
            substrings = rules.len(),
            ignored = ignore.len(),
            "Going to separate transactions by {} named groups from {} substrings",
            names.len(),
            rules.len()
        );

        Ok(Self {
            rules,
            ignore,
            unknown,
            group_count: names.len(),
        })
    }

    pub fn group_count(&self) -> usize {
        self.group_count
    }

    pub fn substring_count(&self) -> usize {
        self.rules.len()
    }

    pub fn unknown_policy(&self) -> UnknownPolicy {
        self.unknown
    }

    /// `(substring, group)` pairs in match priority order.
    pub fn rules(&self) -> impl Iterator<Item = (&str, &str)> {
        self.rules.iter().map(|r| (r.substring.as_str(), r.group.as_str()))
    }

    /// Look up the configured group of an exact substring.
    pub fn group_of(&self, substring: &str) -> Option<&str> {
        self.rules
            .iter()
            .find(|r| r.substring == substring)
            .map(|r| r.group.as_str())
    }

    pub fn is_ignored(&self, details: &str) -> bool {
        self.ignore.iter().any(|s| details.contains(s.as_str()))
    }

    /// Ignore check first, then the first matching rule, then the unknown policy.
    pub fn classify<'a>(&'a self, details: &'a str) -> Classification<'a> {
        if self.is_ignored(details) {
            return Classification::Ignored;
        }
        if let Some(rule) = self.rules.iter().find(|r| details.contains(r.substring.as_str())) {
            return Classification::Group {
                name: &rule.group,
                kind: GroupKind::Configured,
            };
        }
        match self.unknown {
            UnknownPolicy::Pooled => Classification::Group {
                name: UNKNOWN_GROUP_NAME,
                kind: GroupKind::Unknown,
            },
            UnknownPolicy::PerDetails => Classification::Group {
                name: details,
                kind: GroupKind::Unmatched,
            },
        }
    }

    /// Open a statistics builder for one interval bound to this table.
    pub fn builder(&self, interval: MonthInterval) -> IntervalStatisticsBuilder<'_> {
        IntervalStatisticsBuilder::new(self, interval)
    }
}
