//! Selection state and the snapshot handed to readers

use serde::Serialize;
use std::fmt;

use crate::types::{Bank, Branch};

/// What the user has picked so far
///
/// Only [`SelectionStateMachine`](super::SelectionStateMachine) writes this;
/// everyone else reads a cloned [`Snapshot`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Selection {
    /// Empty when no bank is chosen
    pub selected_bank_code: String,

    /// Empty when no branch is chosen
    pub selected_branch_code: String,

    pub selected_branch_info: Option<Branch>,

    /// True while any fetch that affects the selection is outstanding
    pub loading: bool,
}

impl Selection {
    /// The branch detail, but only if it agrees with both selected codes.
    ///
    /// Renderers should always go through this rather than reading
    /// `selected_branch_info` directly.
    pub fn authoritative_branch(&self) -> Option<&Branch> {
        self.selected_branch_info.as_ref().filter(|branch| {
            !self.selected_branch_code.is_empty()
                && branch.matches(&self.selected_bank_code, &self.selected_branch_code)
        })
    }

    pub fn has_bank(&self) -> bool {
        !self.selected_bank_code.is_empty()
    }
}

/// Lifecycle phase, derived from outstanding fetches and committed data
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    Idle,
    LoadingBanks,
    BanksReady,
    LoadingBranches,
    BranchesReady,
    LoadingBranchDetail,
    BranchDetailReady,
}

impl Phase {
    pub fn is_loading(self) -> bool {
        matches!(
            self,
            Phase::LoadingBanks | Phase::LoadingBranches | Phase::LoadingBranchDetail
        )
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Phase::Idle => "idle",
            Phase::LoadingBanks => "loading banks",
            Phase::BanksReady => "banks ready",
            Phase::LoadingBranches => "loading branches",
            Phase::BranchesReady => "branches ready",
            Phase::LoadingBranchDetail => "loading branch detail",
            Phase::BranchDetailReady => "branch detail ready",
        };
        f.write_str(name)
    }
}

/// Committed state as seen by the UI
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Snapshot {
    pub phase: Phase,
    pub selection: Selection,
    pub banks: Vec<Bank>,
    /// Distinct codes of `banks`, in first-seen order
    pub bank_codes: Vec<String>,
    /// Branches of `selection.selected_bank_code`; empty while loading
    pub branches: Vec<Branch>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn taipei_hq() -> Branch {
        Branch {
            bank_code: "004".to_string(),
            branch_code: "0040001".to_string(),
            bank_name: "Taipei HQ".to_string(),
            phone: "02-1234".to_string(),
            address: "No.1 Rd".to_string(),
        }
    }

    #[test]
    fn test_authoritative_branch_requires_matching_codes() {
        let mut selection = Selection {
            selected_bank_code: "004".to_string(),
            selected_branch_code: "0040001".to_string(),
            selected_branch_info: Some(taipei_hq()),
            loading: false,
        };
        assert!(selection.authoritative_branch().is_some());

        selection.selected_bank_code = "007".to_string();
        assert!(selection.authoritative_branch().is_none());

        selection.selected_bank_code = "004".to_string();
        selection.selected_branch_code.clear();
        assert!(selection.authoritative_branch().is_none());
    }

    #[test]
    fn test_loading_phases() {
        assert!(Phase::LoadingBanks.is_loading());
        assert!(Phase::LoadingBranchDetail.is_loading());
        assert!(!Phase::BranchesReady.is_loading());
        assert!(!Phase::Idle.is_loading());
    }

    #[test]
    fn test_phase_serializes_snake_case() {
        let json = serde_json::to_string(&Phase::BranchDetailReady).unwrap();
        assert_eq!(json, "\"branch_detail_ready\"");
    }
}
