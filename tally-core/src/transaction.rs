//! Normalized transaction records shared by every statement parser.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::money::Money;

/// A single bank transaction after parsing.
///
/// `amount` is never negative; the direction lives in `is_expense`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transaction {
    /// Booking date of the transaction
    pub date: NaiveDate,
    /// Free-text description as exported by the bank
    pub details: String,
    /// True for money leaving the account
    pub is_expense: bool,
    /// Absolute amount
    pub amount: Money,
}

impl Transaction {
    /// Create a transaction. The sign of `amount` is dropped.
    pub fn new(date: NaiveDate, details: impl Into<String>, is_expense: bool, amount: Money) -> Self {
        Self {
            date,
            details: details.into(),
            is_expense,
            amount: amount.abs(),
        }
    }

    pub fn expense(date: NaiveDate, details: impl Into<String>, amount: Money) -> Self {
        Self::new(date, details, true, amount)
    }

    pub fn income(date: NaiveDate, details: impl Into<String>, amount: Money) -> Self {
        Self::new(date, details, false, amount)
    }

    /// Negative amounts become expenses, everything else income.
    pub fn from_signed(date: NaiveDate, details: impl Into<String>, signed: Money) -> Self {
        Self::new(date, details, signed.is_negative(), signed)
    }

    pub fn is_income(&self) -> bool {
        !self.is_expense
    }

    /// Amount with the direction applied: expenses are negative.
    pub fn signed_amount(&self) -> Money {
        if self.is_expense { -self.amount } else { self.amount }
    }
}
