//! Clipboard export of the selected branch
//!
//! Both exports read the selection and never modify it. A refused clipboard
//! is reported as [`ClipboardError::Denied`]; callers surface that to the user.

use std::sync::{Arc, Mutex};

use crate::error::ClipboardError;
use crate::location::Location;
use crate::selection::Selection;

/// Somewhere plain text can be written
pub trait ClipboardSink {
    fn set_text(&mut self, text: &str) -> Result<(), ClipboardError>;
}

/// The desktop clipboard
pub struct SystemClipboard {
    inner: arboard::Clipboard,
}

impl SystemClipboard {
    /// Open the system clipboard.
    ///
    /// Fails with `Denied` when no clipboard is reachable (headless session,
    /// missing display server, sandbox).
    pub fn open() -> Result<Self, ClipboardError> {
        let inner = arboard::Clipboard::new().map_err(|e| ClipboardError::Denied(e.to_string()))?;
        Ok(Self { inner })
    }
}

impl ClipboardSink for SystemClipboard {
    fn set_text(&mut self, text: &str) -> Result<(), ClipboardError> {
        self.inner
            .set_text(text.to_string())
            .map_err(|e| ClipboardError::Denied(e.to_string()))
    }
}

/// In-memory clipboard. Clones share contents.
#[derive(Debug, Clone, Default)]
pub struct MemoryClipboard {
    contents: Arc<Mutex<Option<String>>>,
    deny: bool,
}

impl MemoryClipboard {
    pub fn new() -> Self {
        Self::default()
    }

    /// A clipboard that refuses every write
    pub fn denying() -> Self {
        Self {
            deny: true,
            ..Self::default()
        }
    }

    pub fn contents(&self) -> Option<String> {
        self.contents.lock().ok().and_then(|c| c.clone())
    }
}

impl ClipboardSink for MemoryClipboard {
    fn set_text(&mut self, text: &str) -> Result<(), ClipboardError> {
        if self.deny {
            return Err(ClipboardError::Denied("clipboard write refused".to_string()));
        }
        let mut contents = self
            .contents
            .lock()
            .map_err(|_| ClipboardError::Denied("clipboard poisoned".to_string()))?;
        *contents = Some(text.to_string());
        Ok(())
    }
}

/// Which piece of the selected branch to export
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportKind {
    BranchCode,
    ShareableUrl,
}

impl std::str::FromStr for ExportKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "code" | "branch-code" => Ok(ExportKind::BranchCode),
            "url" | "link" => Ok(ExportKind::ShareableUrl),
            _ => Err(format!("Unknown export '{}'. Valid options: code, url", s)),
        }
    }
}

/// Build `{origin}/banks/{bank}/{branch}` for the selected branch
pub fn shareable_url(selection: &Selection, origin: &str) -> Result<String, ClipboardError> {
    let branch = selection
        .authoritative_branch()
        .ok_or(ClipboardError::NothingSelected)?;
    let location = Location::branch(&branch.bank_code, &branch.branch_code);
    Ok(format!("{}{}", origin.trim_end_matches('/'), location.path()))
}

/// Copy the selected branch code. Returns the text written.
pub fn export_branch_code(
    selection: &Selection,
    sink: &mut dyn ClipboardSink,
) -> Result<String, ClipboardError> {
    let branch = selection
        .authoritative_branch()
        .ok_or(ClipboardError::NothingSelected)?;
    sink.set_text(&branch.branch_code)?;
    tracing::debug!(branch_code = %branch.branch_code, "Branch code copied");
    Ok(branch.branch_code.clone())
}

/// Copy the shareable URL of the selected branch. Returns the text written.
pub fn export_shareable_url(
    selection: &Selection,
    origin: &str,
    sink: &mut dyn ClipboardSink,
) -> Result<String, ClipboardError> {
    let url = shareable_url(selection, origin)?;
    sink.set_text(&url)?;
    tracing::debug!(%url, "Shareable URL copied");
    Ok(url)
}

pub fn export(
    kind: ExportKind,
    selection: &Selection,
    origin: &str,
    sink: &mut dyn ClipboardSink,
) -> Result<String, ClipboardError> {
    match kind {
        ExportKind::BranchCode => export_branch_code(selection, sink),
        ExportKind::ShareableUrl => export_shareable_url(selection, origin, sink),
    }
}
