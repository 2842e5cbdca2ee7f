use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::decimal::Money;
use crate::types::TransactionType;

/// one row of the loan ledger
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    pub date: NaiveDate,
    pub transaction_type: TransactionType,
    pub amount: Money,
    /// loan balance after this transaction
    pub loan_balance: Money,
    /// offset balance after this transaction
    pub offset_balance: Money,
}

/// append-only record of every transaction on the loan
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Ledger {
    transactions: Vec<Transaction>,
}

impl Ledger {
    pub fn new() -> Self {
        Self {
            transactions: Vec::new(),
        }
    }

    /// open a ledger with its settlement row
    pub fn settle(date: NaiveDate, principal: Money, offset_balance: Money) -> Self {
        let mut ledger = Self::new();
        ledger.record(Transaction {
            date,
            transaction_type: TransactionType::Settlement,
            amount: principal,
            loan_balance: principal,
            offset_balance,
        });
        ledger
    }

    pub fn record(&mut self, transaction: Transaction) {
        self.transactions.push(transaction);
    }

    pub fn transactions(&self) -> &[Transaction] {
        &self.transactions
    }

    pub fn into_transactions(self) -> Vec<Transaction> {
        self.transactions
    }

    pub fn len(&self) -> usize {
        self.transactions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.transactions.is_empty()
    }

    pub fn last(&self) -> Option<&Transaction> {
        self.transactions.last()
    }

    /// loan balance after the last recorded transaction
    pub fn closing_balance(&self) -> Money {
        self.last().map(|t| t.loan_balance).unwrap_or(Money::ZERO)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Transaction> {
        self.transactions.iter()
    }

    /// transactions of one type, in ledger order
    pub fn of_type(&self, transaction_type: TransactionType) -> impl Iterator<Item = &Transaction> + '_ {
        self.transactions
            .iter()
            .filter(move |t| t.transaction_type == transaction_type)
    }
}

impl<'a> IntoIterator for &'a Ledger {
    type Item = &'a Transaction;
    type IntoIter = std::slice::Iter<'a, Transaction>;

    fn into_iter(self) -> Self::IntoIter {
        self.transactions.iter()
    }
}
