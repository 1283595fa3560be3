//! Rendering of session state for the terminal

use anyhow::{Context, Result};
use serde::Serialize;

use libbankcode::clipboard::shareable_url;
use libbankcode::{Phase, SessionEvent, Snapshot};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Text,
    Json,
}

impl std::str::FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "text" => Ok(OutputFormat::Text),
            "json" => Ok(OutputFormat::Json),
            _ => Err(format!("Invalid format: '{}'. Valid options: text, json", s)),
        }
    }
}

/// JSON view of a snapshot, with the shareable link when a branch is selected
#[derive(Serialize)]
struct SnapshotView<'a> {
    #[serde(flatten)]
    snapshot: &'a Snapshot,
    link: Option<String>,
}

pub fn render_snapshot(snapshot: &Snapshot, origin: &str, format: OutputFormat) -> Result<String> {
    match format {
        OutputFormat::Json => {
            let view = SnapshotView {
                snapshot,
                link: shareable_url(&snapshot.selection, origin).ok(),
            };
            serde_json::to_string_pretty(&view).context("Failed to serialize snapshot")
        }
        OutputFormat::Text => Ok(render_text(snapshot, origin)),
    }
}

fn render_text(snapshot: &Snapshot, origin: &str) -> String {
    let selection = &snapshot.selection;

    if snapshot.phase.is_loading() {
        return format!("[{}]", snapshot.phase);
    }

    if let Some(branch) = selection.authoritative_branch() {
        let mut out = format!(
            "Bank:    {}\nBranch:  {}\nName:    {}\nPhone:   {}\nAddress: {}",
            branch.bank_code, branch.branch_code, branch.bank_name, branch.phone, branch.address
        );
        if let Ok(url) = shareable_url(selection, origin) {
            out.push_str(&format!("\nLink:    {}", url));
        }
        return out;
    }

    if selection.has_bank() {
        let mut out = format!("Branches of {}:", selection.selected_bank_code);
        if snapshot.branches.is_empty() {
            out.push_str("\n  (no branches)");
        }
        for branch in &snapshot.branches {
            out.push_str(&format!("\n  {}  {}", branch.branch_code, branch.bank_name));
        }
        return out;
    }

    if snapshot.phase == Phase::Idle {
        return "[idle]".to_string();
    }

    let mut out = "Banks:".to_string();
    if snapshot.bank_codes.is_empty() {
        out.push_str("\n  (no banks available)");
    }
    for code in &snapshot.bank_codes {
        let name = snapshot
            .banks
            .iter()
            .find(|b| &b.bank_code == code)
            .map(|b| b.bank_name.as_str())
            .unwrap_or_default();
        out.push_str(&format!("\n  {}  {}", code, name));
    }
    out
}

/// One line (text) or one JSON object (json) per event
pub fn render_event(event: &SessionEvent, origin: &str, format: OutputFormat) -> Result<String> {
    match format {
        OutputFormat::Json => match event {
            SessionEvent::Committed { snapshot } => {
                let view = SnapshotView {
                    snapshot: snapshot.as_ref(),
                    link: shareable_url(&snapshot.selection, origin).ok(),
                };
                serde_json::to_string(&view).context("Failed to serialize snapshot")
            }
            other => serde_json::to_string(other).context("Failed to serialize event"),
        },
        OutputFormat::Text => Ok(match event {
            SessionEvent::Committed { snapshot } => render_text(snapshot, origin),
            SessionEvent::AddressChanged { path } => format!("-> {}", path),
            SessionEvent::Notification(notice) => notice.message.clone(),
        }),
    }
}
