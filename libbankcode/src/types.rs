//! Catalog records

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

/// A bank as listed by `GET /api/banks`.
///
/// The catalog may return several records with the same `bank_code` (one per
/// branch row upstream); use [`distinct_bank_codes`] for the selectable codes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Bank {
    pub bank_code: String,
    pub bank_name: String,
}

/// A branch record, keyed by `(bank_code, branch_code)`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Branch {
    pub bank_code: String,
    pub branch_code: String,
    pub bank_name: String,
    #[serde(default)]
    pub phone: String,
    #[serde(default)]
    pub address: String,
}

impl Branch {
    /// True if this record belongs to the given bank/branch pair
    pub fn matches(&self, bank_code: &str, branch_code: &str) -> bool {
        self.bank_code == bank_code && self.branch_code == branch_code
    }
}

/// Distinct bank codes in first-seen order
pub fn distinct_bank_codes(banks: &[Bank]) -> Vec<String> {
    let mut seen: HashSet<&str> = HashSet::with_capacity(banks.len());
    banks
        .iter()
        .filter(|bank| seen.insert(bank.bank_code.as_str()))
        .map(|bank| bank.bank_code.clone())
        .collect()
}
