//! Side effects requested by the state machine
//!
//! Transitions never perform I/O. They return [`Effect`]s; the session runs
//! the fetches and feeds each [`Completion`] back into the machine.

use crate::catalog::{CatalogClient, CatalogResult};
use crate::sequencer::{QueryClass, RequestToken};
use crate::types::{Bank, Branch};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Query {
    Banks,
    Branches { bank_code: String },
    BranchDetail { bank_code: String, branch_code: String },
}

impl Query {
    pub fn class(&self) -> QueryClass {
        match self {
            Query::Banks => QueryClass::Banks,
            Query::Branches { .. } => QueryClass::Branches,
            Query::BranchDetail { .. } => QueryClass::BranchDetail,
        }
    }
}

/// A fetch the machine wants started, tagged with its sequence token
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchRequest {
    pub token: RequestToken,
    pub query: Query,
}

impl FetchRequest {
    /// Perform the round trip. Never fails; errors travel inside the outcome.
    pub async fn execute(self, client: &dyn CatalogClient) -> Completion {
        let outcome = match self.query {
            Query::Banks => Outcome::Banks(client.list_banks().await),
            Query::Branches { bank_code } => {
                let result = client.list_branches(&bank_code).await;
                Outcome::Branches { bank_code, result }
            }
            Query::BranchDetail {
                bank_code,
                branch_code,
            } => {
                let result = client.get_branch(&bank_code, &branch_code).await;
                Outcome::BranchDetail {
                    bank_code,
                    branch_code,
                    result,
                }
            }
        };
        Completion {
            token: self.token,
            outcome,
        }
    }
}

#[derive(Debug, Clone)]
pub enum Outcome {
    Banks(CatalogResult<Vec<Bank>>),
    Branches {
        bank_code: String,
        result: CatalogResult<Vec<Branch>>,
    },
    BranchDetail {
        bank_code: String,
        branch_code: String,
        result: CatalogResult<Branch>,
    },
}

/// A finished fetch waiting to be applied
#[derive(Debug, Clone)]
pub struct Completion {
    pub token: RequestToken,
    pub outcome: Outcome,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    Fetch(FetchRequest),

    /// The selection now names a complete, authoritative bank/branch pair
    BranchCommitted {
        bank_code: String,
        branch_code: String,
    },

    /// The selection was reset to empty
    Cleared,
}

impl Effect {
    pub fn as_fetch(&self) -> Option<&FetchRequest> {
        match self {
            Effect::Fetch(request) => Some(request),
            _ => None,
        }
    }
}
