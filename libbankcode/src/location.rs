//! Address synchronization
//!
//! The address is the externally visible location: `/` or
//! `/banks/{bank_code}/{branch_code}`. Inbound changes (startup, back/forward,
//! a pasted link) drive the state machine; committed branch selections and
//! clears are pushed back out as new history entries.

use std::fmt;

use url::Url;

use crate::selection::{Effect, Selection, SelectionStateMachine};

const ROUTE_PREFIX: &str = "banks";

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Location {
    #[default]
    Root,
    /// Bank chosen, no branch. Never produced by an outbound push.
    Bank(String),
    Branch {
        bank_code: String,
        branch_code: String,
    },
}

impl Location {
    pub fn branch(bank_code: impl Into<String>, branch_code: impl Into<String>) -> Self {
        Location::Branch {
            bank_code: bank_code.into(),
            branch_code: branch_code.into(),
        }
    }

    /// Parse a path or absolute URL.
    ///
    /// Accepts `/` and `/banks/{bank}[/{branch}]` only, ignores query strings,
    /// fragments and trailing slashes, and percent-decodes segments. Anything
    /// unrecognised is `Root`.
    pub fn parse(raw: &str) -> Self {
        Self::try_parse(raw).unwrap_or_else(|| {
            tracing::warn!(address = raw, "Unrecognised address, using root");
            Location::Root
        })
    }

    /// Like [`Location::parse`], but `None` for an address of unknown shape
    pub fn try_parse(raw: &str) -> Option<Self> {
        let raw = raw.trim();
        let path = if raw.contains("://") {
            Url::parse(raw).ok()?.path().to_string()
        } else {
            raw.split(['?', '#']).next().unwrap_or_default().to_string()
        };

        let mut segments: Vec<String> = path
            .split('/')
            .filter(|s| !s.is_empty())
            .map(|s| match urlencoding::decode(s) {
                Ok(decoded) => decoded.into_owned(),
                Err(_) => s.to_string(),
            })
            .collect();

        if segments.is_empty() {
            return Some(Location::Root);
        }
        if segments[0] != ROUTE_PREFIX {
            return None;
        }
        segments.remove(0);

        match segments.as_slice() {
            [] => Some(Location::Root),
            [bank] => Some(Location::Bank(bank.clone())),
            [bank, branch] => Some(Location::branch(bank.clone(), branch.clone())),
            _ => None,
        }
    }

    /// The address that represents a selection
    pub fn for_selection(selection: &Selection) -> Self {
        match selection.authoritative_branch() {
            Some(branch) => Location::branch(&branch.bank_code, &branch.branch_code),
            None if selection.has_bank() => Location::Bank(selection.selected_bank_code.clone()),
            None => Location::Root,
        }
    }

    pub fn path(&self) -> String {
        match self {
            Location::Root => "/".to_string(),
            Location::Bank(bank) => format!("/{}/{}", ROUTE_PREFIX, urlencoding::encode(bank)),
            Location::Branch {
                bank_code,
                branch_code,
            } => format!(
                "/{}/{}/{}",
                ROUTE_PREFIX,
                urlencoding::encode(bank_code),
                urlencoding::encode(branch_code)
            ),
        }
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.path())
    }
}

/// The browser-history-like surface the synchronizer writes to
pub trait History {
    fn current(&self) -> &Location;

    /// Install a new current entry, discarding any forward entries
    fn push(&mut self, location: Location);
}

/// In-process history with back/forward navigation
#[derive(Debug, Clone)]
pub struct MemoryHistory {
    entries: Vec<Location>,
    index: usize,
}

impl MemoryHistory {
    pub fn new(initial: Location) -> Self {
        Self {
            entries: vec![initial],
            index: 0,
        }
    }

    /// Step back. Returns the newly current location as an inbound change.
    pub fn back(&mut self) -> Option<Location> {
        if self.index == 0 {
            return None;
        }
        self.index -= 1;
        Some(self.entries[self.index].clone())
    }

    pub fn forward(&mut self) -> Option<Location> {
        if self.index + 1 >= self.entries.len() {
            return None;
        }
        self.index += 1;
        Some(self.entries[self.index].clone())
    }

    pub fn entries(&self) -> &[Location] {
        &self.entries
    }
}

impl Default for MemoryHistory {
    fn default() -> Self {
        Self::new(Location::Root)
    }
}

impl History for MemoryHistory {
    fn current(&self) -> &Location {
        &self.entries[self.index]
    }

    fn push(&mut self, location: Location) {
        self.entries.truncate(self.index + 1);
        self.entries.push(location);
        self.index = self.entries.len() - 1;
    }
}

/// Bridges the selection and the address in both directions
#[derive(Debug, Default)]
pub struct LocationSynchronizer;

impl LocationSynchronizer {
    pub fn new() -> Self {
        Self
    }

    /// React to an address change.
    ///
    /// Does nothing when the selection already represents `location`, so an
    /// address this synchronizer just pushed never feeds back into the machine.
    pub fn inbound(&self, location: &Location, machine: &mut SelectionStateMachine) -> Vec<Effect> {
        if Location::for_selection(machine.selection()) == *location {
            tracing::trace!(%location, "Address already reflects selection");
            return Vec::new();
        }

        tracing::debug!(%location, "Address changed");
        match location {
            Location::Branch {
                bank_code,
                branch_code,
            } => machine.hydrate_from_location(bank_code, branch_code),
            Location::Bank(bank_code) => machine.select_bank(bank_code),
            Location::Root => machine.clear(),
        }
    }

    /// Reflect a committed transition into the address.
    ///
    /// Only complete branch selections and clears produce an address. Returns
    /// the pushed location, or `None` if nothing was pushed.
    pub fn outbound(&self, effect: &Effect, history: &mut dyn History) -> Option<Location> {
        let target = match effect {
            Effect::BranchCommitted {
                bank_code,
                branch_code,
            } => Location::branch(bank_code, branch_code),
            Effect::Cleared => Location::Root,
            Effect::Fetch(_) => return None,
        };

        if history.current() == &target {
            tracing::trace!(%target, "Address unchanged, not pushing");
            return None;
        }

        tracing::debug!(%target, "Pushing address");
        history.push(target.clone());
        Some(target)
    }
}
