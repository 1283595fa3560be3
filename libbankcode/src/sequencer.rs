//! Request sequencing for last-writer-wins fetches
//!
//! Every fetch takes a token from [`RequestSequencer::issue`] before it starts
//! and is checked with [`RequestSequencer::is_current`] when it completes. Only
//! the most recently issued token of a query class is current, so a response
//! for a superseded request is recognised and dropped instead of overwriting
//! newer state.

use std::fmt;

/// Independent sequences. Issuing in one class never invalidates another.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum QueryClass {
    Banks,
    Branches,
    BranchDetail,
}

impl QueryClass {
    fn index(self) -> usize {
        match self {
            QueryClass::Banks => 0,
            QueryClass::Branches => 1,
            QueryClass::BranchDetail => 2,
        }
    }
}

impl fmt::Display for QueryClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            QueryClass::Banks => "banks",
            QueryClass::Branches => "branches",
            QueryClass::BranchDetail => "branch_detail",
        })
    }
}

/// Opaque sequence number for one issued request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RequestToken {
    class: QueryClass,
    seq: u64,
}

impl RequestToken {
    pub fn class(&self) -> QueryClass {
        self.class
    }
}

impl fmt::Display for RequestToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}#{}", self.class, self.seq)
    }
}

#[derive(Debug, Default)]
pub struct RequestSequencer {
    latest: [u64; 3],
}

impl RequestSequencer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a new request of `class`, superseding every earlier one
    pub fn issue(&mut self, class: QueryClass) -> RequestToken {
        let slot = &mut self.latest[class.index()];
        *slot += 1;
        RequestToken { class, seq: *slot }
    }

    /// Supersede outstanding requests of `class` without starting a new one
    pub fn invalidate(&mut self, class: QueryClass) {
        self.latest[class.index()] += 1;
    }

    pub fn is_current(&self, class: QueryClass, token: RequestToken) -> bool {
        token.class == class && self.latest[class.index()] == token.seq
    }
}
