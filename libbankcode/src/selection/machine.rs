//! Selection transitions
//!
//! Each transition runs to completion synchronously and returns the effects
//! it wants performed. Fetch completions re-enter through [`SelectionStateMachine::apply`],
//! where stale ones (superseded tokens) are dropped before they can touch state.

use super::effects::{Completion, Effect, FetchRequest, Outcome, Query};
use super::state::{Phase, Selection, Snapshot};
use crate::error::CatalogError;
use crate::sequencer::{QueryClass, RequestSequencer, RequestToken};
use crate::types::{distinct_bank_codes, Bank, Branch};

#[derive(Debug, Default)]
pub struct SelectionStateMachine {
    selection: Selection,
    banks: Vec<Bank>,
    /// Set once any bank-list fetch has resolved, successfully or not
    banks_attempted: bool,
    branches: Vec<Branch>,
    /// Bank whose branch list is committed in `branches`
    branches_bank: Option<String>,
    sequencer: RequestSequencer,
    banks_in_flight: Option<RequestToken>,
    branches_in_flight: Option<RequestToken>,
    detail_in_flight: Option<RequestToken>,
    /// Branch code to select once the pending branch list lands
    hydration_target: Option<String>,
}

impl SelectionStateMachine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn selection(&self) -> &Selection {
        &self.selection
    }

    pub fn banks(&self) -> &[Bank] {
        &self.banks
    }

    pub fn branches(&self) -> &[Branch] {
        &self.branches
    }

    /// The bank-list fetch only drives the phase while no bank is selected
    pub fn phase(&self) -> Phase {
        if self.detail_in_flight.is_some() {
            Phase::LoadingBranchDetail
        } else if self.branches_in_flight.is_some() {
            Phase::LoadingBranches
        } else if self.selection.authoritative_branch().is_some() {
            Phase::BranchDetailReady
        } else if self.selection.has_bank() {
            Phase::BranchesReady
        } else if self.banks_in_flight.is_some() {
            Phase::LoadingBanks
        } else if self.banks_attempted {
            Phase::BanksReady
        } else {
            Phase::Idle
        }
    }

    pub fn is_loading(&self) -> bool {
        self.phase().is_loading()
    }

    /// Any current fetch unresolved, including a bank list behind a selection
    pub fn has_pending_fetch(&self) -> bool {
        self.banks_in_flight.is_some()
            || self.branches_in_flight.is_some()
            || self.detail_in_flight.is_some()
    }

    pub fn snapshot(&self) -> Snapshot {
        Snapshot {
            phase: self.phase(),
            selection: self.selection.clone(),
            banks: self.banks.clone(),
            bank_codes: distinct_bank_codes(&self.banks),
            branches: self.branches.clone(),
        }
    }

    /// Load the bank list
    pub fn init(&mut self) -> Vec<Effect> {
        let token = self.sequencer.issue(QueryClass::Banks);
        self.banks_in_flight = Some(token);
        self.commit();
        tracing::debug!(%token, "Loading banks");
        vec![Effect::Fetch(FetchRequest {
            token,
            query: Query::Banks,
        })]
    }

    /// Choose a bank, discarding any branch selection made under the previous one
    ///
    /// The branch code and detail are cleared before the branch fetch is even
    /// issued. An empty code returns to the bank list without a fetch.
    pub fn select_bank(&mut self, code: &str) -> Vec<Effect> {
        let code = code.trim();

        self.hydration_target = None;
        self.drop_branch_selection();
        self.abandon_detail();
        self.selection.selected_bank_code = code.to_string();
        self.branches.clear();
        self.branches_bank = None;

        if code.is_empty() {
            self.sequencer.invalidate(QueryClass::Branches);
            self.branches_in_flight = None;
            self.commit();
            return Vec::new();
        }

        let token = self.sequencer.issue(QueryClass::Branches);
        self.branches_in_flight = Some(token);
        self.commit();
        tracing::debug!(%token, bank_code = code, "Loading branches");
        vec![Effect::Fetch(FetchRequest {
            token,
            query: Query::Branches {
                bank_code: code.to_string(),
            },
        })]
    }

    /// Choose a branch from the loaded list. No network involved.
    ///
    /// An empty or unknown code clears the branch selection.
    pub fn select_branch(&mut self, code: &str) -> Vec<Effect> {
        self.hydration_target = None;
        self.abandon_detail();

        let effects = match self.find_loaded_branch(code.trim()) {
            Some(branch) => self.commit_branch(branch),
            None => {
                self.drop_branch_selection();
                Vec::new()
            }
        };
        self.commit();
        effects
    }

    /// Reproduce a deep-linked selection
    ///
    /// Loads the bank's branches (unless they are already committed), then
    /// selects the branch. A branch missing from the list is looked up
    /// directly; if that fails the machine settles with no branch selected.
    pub fn hydrate_from_location(&mut self, bank_code: &str, branch_code: &str) -> Vec<Effect> {
        let bank_code = bank_code.trim();
        let branch_code = branch_code.trim();

        if bank_code.is_empty() || branch_code.is_empty() {
            return self.select_bank(bank_code);
        }

        if self.branches_committed_for(bank_code) {
            if self
                .selection
                .authoritative_branch()
                .is_some_and(|b| b.branch_code == branch_code)
            {
                return Vec::new();
            }
            self.abandon_detail();
            let effects = self.resolve_branch(bank_code, branch_code);
            self.commit();
            return effects;
        }

        // Same deep link again while its branch list is still on the way
        if self.branches_in_flight.is_some()
            && self.selection.selected_bank_code == bank_code
            && self.hydration_target.as_deref() == Some(branch_code)
        {
            return Vec::new();
        }

        let effects = self.select_bank(bank_code);
        self.hydration_target = Some(branch_code.to_string());
        effects
    }

    /// Reset everything and reload the bank list
    pub fn clear(&mut self) -> Vec<Effect> {
        self.selection = Selection::default();
        self.banks.clear();
        self.branches.clear();
        self.branches_bank = None;
        self.hydration_target = None;
        self.sequencer.invalidate(QueryClass::Branches);
        self.branches_in_flight = None;
        self.abandon_detail();

        let mut effects = vec![Effect::Cleared];
        effects.extend(self.init());
        effects
    }

    /// Apply a finished fetch. Stale completions are dropped silently.
    pub fn apply(&mut self, completion: Completion) -> Vec<Effect> {
        let token = completion.token;
        let class = token.class();
        if !self.sequencer.is_current(class, token) {
            tracing::debug!(%token, "Dropping stale response");
            return Vec::new();
        }

        match class {
            QueryClass::Banks => self.banks_in_flight = None,
            QueryClass::Branches => self.branches_in_flight = None,
            QueryClass::BranchDetail => self.detail_in_flight = None,
        }

        let effects = match completion.outcome {
            Outcome::Banks(result) => self.apply_banks(result),
            Outcome::Branches { bank_code, result } => self.apply_branches(bank_code, result),
            Outcome::BranchDetail {
                bank_code,
                branch_code,
                result,
            } => self.apply_detail(&bank_code, &branch_code, result),
        };
        self.commit();
        effects
    }

    /// A failed reload drops whatever was selected since, address included
    fn apply_banks(&mut self, result: Result<Vec<Bank>, CatalogError>) -> Vec<Effect> {
        let reload = self.banks_attempted;
        self.banks_attempted = true;
        match result {
            Ok(banks) => {
                tracing::debug!(count = banks.len(), "Banks loaded");
                self.banks = banks;
                Vec::new()
            }
            Err(e) => {
                tracing::warn!(error = %e, "Failed to load bank list");
                self.banks.clear();
                if !reload || !self.selection.has_bank() {
                    return Vec::new();
                }
                self.reset_selection();
                vec![Effect::Cleared]
            }
        }
    }

    fn apply_branches(
        &mut self,
        bank_code: String,
        result: Result<Vec<Branch>, CatalogError>,
    ) -> Vec<Effect> {
        if bank_code != self.selection.selected_bank_code {
            tracing::warn!(bank_code = %bank_code, "Branch list for unselected bank ignored");
            return Vec::new();
        }

        self.branches = match result {
            Ok(branches) => {
                tracing::debug!(bank_code = %bank_code, count = branches.len(), "Branches loaded");
                branches
            }
            Err(e) => {
                tracing::warn!(bank_code = %bank_code, error = %e, "Failed to load branches");
                Vec::new()
            }
        };
        self.branches_bank = Some(bank_code.clone());

        match self.hydration_target.take() {
            Some(branch_code) => self.resolve_branch(&bank_code, &branch_code),
            None => Vec::new(),
        }
    }

    fn apply_detail(
        &mut self,
        bank_code: &str,
        branch_code: &str,
        result: Result<Branch, CatalogError>,
    ) -> Vec<Effect> {
        if bank_code != self.selection.selected_bank_code {
            tracing::warn!(bank_code, branch_code, "Branch detail for unselected bank ignored");
            return Vec::new();
        }

        match result {
            Ok(branch) if branch.matches(bank_code, branch_code) => self.commit_branch(branch),
            Ok(branch) => {
                tracing::warn!(
                    bank_code,
                    branch_code,
                    got_bank = %branch.bank_code,
                    got_branch = %branch.branch_code,
                    "Catalog returned a different branch than requested"
                );
                self.drop_branch_selection();
                Vec::new()
            }
            Err(CatalogError::NotFound(_)) => {
                tracing::info!(bank_code, branch_code, "Linked branch does not exist");
                self.drop_branch_selection();
                Vec::new()
            }
            Err(e) => {
                tracing::warn!(bank_code, branch_code, error = %e, "Failed to load branch detail");
                self.drop_branch_selection();
                Vec::new()
            }
        }
    }

    /// Select from the committed list, falling back to a direct lookup
    fn resolve_branch(&mut self, bank_code: &str, branch_code: &str) -> Vec<Effect> {
        if let Some(branch) = self.find_loaded_branch(branch_code) {
            return self.commit_branch(branch);
        }

        self.drop_branch_selection();
        let token = self.sequencer.issue(QueryClass::BranchDetail);
        self.detail_in_flight = Some(token);
        tracing::debug!(%token, bank_code, branch_code, "Branch not in list, looking it up");
        vec![Effect::Fetch(FetchRequest {
            token,
            query: Query::BranchDetail {
                bank_code: bank_code.to_string(),
                branch_code: branch_code.to_string(),
            },
        })]
    }

    fn find_loaded_branch(&self, branch_code: &str) -> Option<Branch> {
        if branch_code.is_empty() {
            return None;
        }
        let bank_code = &self.selection.selected_bank_code;
        self.branches
            .iter()
            .find(|b| b.matches(bank_code, branch_code))
            .cloned()
    }

    fn commit_branch(&mut self, branch: Branch) -> Vec<Effect> {
        let effect = Effect::BranchCommitted {
            bank_code: branch.bank_code.clone(),
            branch_code: branch.branch_code.clone(),
        };
        self.selection.selected_branch_code = branch.branch_code.clone();
        self.selection.selected_branch_info = Some(branch);
        vec![effect]
    }

    fn branches_committed_for(&self, bank_code: &str) -> bool {
        self.branches_in_flight.is_none()
            && self.selection.selected_bank_code == bank_code
            && self.branches_bank.as_deref() == Some(bank_code)
    }

    fn drop_branch_selection(&mut self) {
        self.selection.selected_branch_code.clear();
        self.selection.selected_branch_info = None;
    }

    fn abandon_detail(&mut self) {
        if self.detail_in_flight.take().is_some() {
            self.sequencer.invalidate(QueryClass::BranchDetail);
        }
    }

    fn reset_selection(&mut self) {
        self.selection = Selection::default();
        self.branches.clear();
        self.branches_bank = None;
        self.hydration_target = None;
        self.sequencer.invalidate(QueryClass::Branches);
        self.branches_in_flight = None;
        self.abandon_detail();
    }

    fn commit(&mut self) {
        self.selection.loading = self.phase().is_loading();
    }
}
