//! Mock catalog implementation for testing
//!
//! An in-memory catalog that can simulate per-bank latency, transport
//! failures, and list payloads that omit a branch which is still reachable by
//! direct lookup. Used by the integration tests and by `bankcode-lookup --demo`.

use async_trait::async_trait;
use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::time::sleep;

use super::{CatalogClient, CatalogResult};
use crate::error::CatalogError;
use crate::types::{Bank, Branch};

#[derive(Debug, Default)]
struct Faults {
    banks_unavailable: bool,
    branches_unavailable: HashSet<String>,
    detail_unavailable: bool,
}

/// Number of calls made per operation
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct CallCounts {
    pub list_banks: usize,
    pub list_branches: usize,
    pub get_branch: usize,
}

/// Mock catalog for testing
#[derive(Clone, Default)]
pub struct MockCatalog {
    banks: Vec<Bank>,
    branches: Vec<Branch>,
    /// `(bank_code, branch_code)` pairs left out of `list_branches` payloads
    unlisted: HashSet<(String, String)>,
    latency: HashMap<String, Duration>,
    default_latency: Duration,
    faults: Arc<Mutex<Faults>>,
    calls: Arc<Mutex<CallCounts>>,
}

impl MockCatalog {
    pub fn new(banks: Vec<Bank>, branches: Vec<Branch>) -> Self {
        Self {
            banks,
            branches,
            ..Default::default()
        }
    }

    /// Two banks, one branch under `004`
    pub fn sample() -> Self {
        Self::new(
            vec![
                Bank {
                    bank_code: "004".to_string(),
                    bank_name: "Bank 004 - Taipei".to_string(),
                },
                Bank {
                    bank_code: "007".to_string(),
                    bank_name: "Bank 007 - Kaohsiung".to_string(),
                },
            ],
            vec![Branch {
                bank_code: "004".to_string(),
                branch_code: "0040001".to_string(),
                bank_name: "Taipei HQ".to_string(),
                phone: "02-1234".to_string(),
                address: "No.1 Rd".to_string(),
            }],
        )
    }

    /// Add a branch that `get_branch` finds but `list_branches` leaves out
    pub fn with_unlisted_branch(mut self, branch: Branch) -> Self {
        self.unlisted
            .insert((branch.bank_code.clone(), branch.branch_code.clone()));
        self.branches.push(branch);
        self
    }

    /// Delay every `list_branches`/`get_branch` call for this bank
    pub fn with_bank_latency(mut self, bank_code: &str, delay: Duration) -> Self {
        self.latency.insert(bank_code.to_string(), delay);
        self
    }

    /// Delay every call not covered by a per-bank latency
    pub fn with_default_latency(mut self, delay: Duration) -> Self {
        self.default_latency = delay;
        self
    }

    pub fn set_banks_unavailable(&self, unavailable: bool) {
        self.faults.lock().unwrap().banks_unavailable = unavailable;
    }

    pub fn set_branches_unavailable(&self, bank_code: &str, unavailable: bool) {
        let mut faults = self.faults.lock().unwrap();
        if unavailable {
            faults.branches_unavailable.insert(bank_code.to_string());
        } else {
            faults.branches_unavailable.remove(bank_code);
        }
    }

    pub fn set_detail_unavailable(&self, unavailable: bool) {
        self.faults.lock().unwrap().detail_unavailable = unavailable;
    }

    pub fn calls(&self) -> CallCounts {
        self.calls.lock().unwrap().clone()
    }

    async fn delay_for(&self, bank_code: Option<&str>) {
        let delay = bank_code
            .and_then(|code| self.latency.get(code).copied())
            .unwrap_or(self.default_latency);
        if !delay.is_zero() {
            sleep(delay).await;
        }
    }
}

#[async_trait]
impl CatalogClient for MockCatalog {
    async fn list_banks(&self) -> CatalogResult<Vec<Bank>> {
        self.calls.lock().unwrap().list_banks += 1;
        self.delay_for(None).await;

        if self.faults.lock().unwrap().banks_unavailable {
            return Err(CatalogError::Unavailable("Mock bank list unavailable".to_string()));
        }
        Ok(self.banks.clone())
    }

    async fn list_branches(&self, bank_code: &str) -> CatalogResult<Vec<Branch>> {
        self.calls.lock().unwrap().list_branches += 1;
        self.delay_for(Some(bank_code)).await;

        if self
            .faults
            .lock()
            .unwrap()
            .branches_unavailable
            .contains(bank_code)
        {
            return Err(CatalogError::Unavailable(format!(
                "Mock branch list for {} unavailable",
                bank_code
            )));
        }

        Ok(self
            .branches
            .iter()
            .filter(|b| b.bank_code == bank_code)
            .filter(|b| {
                !self
                    .unlisted
                    .contains(&(b.bank_code.clone(), b.branch_code.clone()))
            })
            .cloned()
            .collect())
    }

    async fn get_branch(&self, bank_code: &str, branch_code: &str) -> CatalogResult<Branch> {
        self.calls.lock().unwrap().get_branch += 1;
        self.delay_for(Some(bank_code)).await;

        if self.faults.lock().unwrap().detail_unavailable {
            return Err(CatalogError::Unavailable("Mock branch lookup unavailable".to_string()));
        }

        self.branches
            .iter()
            .find(|b| b.matches(bank_code, branch_code))
            .cloned()
            .ok_or_else(|| CatalogError::NotFound(format!("{}/{}", bank_code, branch_code)))
    }
}
