//! Named accumulators of transactions.

use serde::Serialize;
use tally_core::{Money, Transaction};

/// Name of the pooled group for unmatched transactions.
pub const UNKNOWN_GROUP_NAME: &str = "unknown";

/// How a group came to exist within an interval.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum GroupKind {
    /// Declared in the configuration and reached through a substring match
    Configured,
    /// The pooled `"unknown"` group
    Unknown,
    /// One-off group named after the transaction's own details
    Unmatched,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Group {
    pub name: String,
    pub kind: GroupKind,
    pub total: Money,
    /// In arrival order.
    pub transactions: Vec<Transaction>,
}

impl Group {
    pub fn new(name: impl Into<String>, kind: GroupKind) -> Self {
        Self {
            name: name.into(),
            kind,
            total: Money::ZERO,
            transactions: Vec::new(),
        }
    }

    pub fn push(&mut self, transaction: Transaction) {
        self.total += transaction.amount;
        self.transactions.push(transaction);
    }

    pub fn len(&self) -> usize {
        self.transactions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.transactions.is_empty()
    }
}
